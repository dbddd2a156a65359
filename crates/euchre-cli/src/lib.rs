pub mod api;
pub mod input;
pub mod orchestrator;
pub mod render;
pub mod state;

pub use api::{ApiError, EuchreApi, HttpApi};
pub use input::{HumanInput, TerminalInput};
pub use orchestrator::{GameOutcome, Orchestrator, Pacing};
