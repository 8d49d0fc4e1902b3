//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (add request ID)
//!     → quote.rs / status.rs (handlers)
//!     → JSON response to client
//! ```

pub mod quote;
pub mod request;
pub mod server;
pub mod status;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
