//! HTTP front door: the link write API and the public redirect route.
//!
//! Redirects are answered from the mirror bucket alone; the record store is
//! only reached through the write API.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
