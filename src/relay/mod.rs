//! Streaming fetch relay core.
//!
//! # Data Flow
//! ```text
//! url parameter
//!     → normalize.rs (rewrite preview links to direct-download form)
//!     → dispatch.rs (outbound GET, one manual redirect hop, stream-through)
//!     → complete.rs (at-most-once finalization of the inbound response)
//!     → error.rs (failure → JSON envelope + status)
//! ```

pub mod complete;
pub mod dispatch;
pub mod error;
pub mod normalize;

pub use complete::CompletionToken;
pub use dispatch::RelayDispatcher;
pub use error::RelayError;
pub use normalize::normalize_target;
