//! Web layer.
//!
//! Serves the cached snapshot, raw predictions for diagnostics, and the
//! live-update WebSocket.

mod dto;
mod routes;
mod state;
mod ws;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
