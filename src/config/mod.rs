//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file
//!     → loader.rs (read, deserialize)
//!     → validation.rs (semantic checks, all errors reported)
//!     → schema.rs types consumed by the rest of the system
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, RelayConfig, TimeoutConfig, UpstreamConfig};
pub use validation::{validate_config, ValidationError};
