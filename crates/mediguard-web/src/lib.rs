//! mediguard-web: HTTP API for the MediGuard dashboard.

pub mod handlers;
pub mod prediction;
pub mod rate_limit;
pub mod router;
pub mod security;
pub mod shutdown;
pub mod state;

pub use router::build_router;
pub use state::{AppState, SharedState};
