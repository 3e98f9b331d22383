//! # Edvisa Observability
//!
//! Subscriber setup and HTTP request logging.
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     edvisa_observability::init_tracing()?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `file-logs` (default): daily rolling `edvisa.log` (errors only) and
//!   `edvisa.json` (structured, info and up) under `LOG_DIR`. Without it
//!   only the console layer is installed.

pub mod logging;

pub use logging::{init_tracing, logging_middleware};
