//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, routes, layers)
//!     → middleware/ (CORS preamble, OPTIONS gate, request ID)
//!     → relay handler (validate url parameter)
//!     → relay::dispatch (outbound fetch, stream-through)
//!     → Send to client
//! ```

pub mod middleware;
pub mod server;

pub use server::RelayServer;
