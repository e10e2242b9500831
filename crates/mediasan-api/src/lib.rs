//! mediasan API library
//!
//! HTTP surface for the upload sanitizer: the upload handler, error
//! rendering, telemetry and application setup.

mod handlers;
mod telemetry;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
