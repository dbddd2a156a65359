pub mod config;
pub mod forced_ev;
