//! Process lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Load rate tables → Start watcher → Serve
//!
//! Shutdown:
//!     SIGTERM/SIGINT (signals.rs)
//!     → Shutdown::trigger (shutdown.rs)
//!     → axum drains in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then data, then listeners
//! - A failed table load does not abort startup; the service comes up
//!   degraded and recovers on the next successful reload

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
