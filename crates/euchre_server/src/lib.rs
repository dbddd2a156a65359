use std::sync::{Mutex, MutexGuard};

pub mod error;
pub mod routes;
pub mod service;

pub use error::ServiceError;
pub use routes::configure;
pub use service::{GameService, HUMAN};

/// Shared by every worker of the http server
#[derive(Default)]
pub struct AppState {
    service: Mutex<GameService>,
}

impl AppState {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            service: Mutex::new(GameService::new(seed)),
        }
    }

    pub fn service(&self) -> Result<MutexGuard<'_, GameService>, ServiceError> {
        self.service.lock().map_err(|_| ServiceError::Poisoned)
    }
}
