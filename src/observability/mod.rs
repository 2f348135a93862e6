//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All stages produce:
//!     → logging.rs (structured log events)
//!     → tracing.rs (deploy span with run id and transaction hash)
//!
//! Consumers:
//!     → stderr/stdout via the fmt layer
//! ```

pub mod logging;
pub mod tracing;
