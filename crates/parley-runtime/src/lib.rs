//! # Parley Runtime
//!
//! The process around the dispatch layer:
//! - [`ParleyRuntime`]: builds one turn per inbound activity, runs the
//!   handler under a `turn` span, bounds concurrency and handles shutdown
//! - [`config`]: figment-based configuration (`parley.toml`, `PARLEY_*`)
//! - [`logging`]: `tracing-subscriber` setup driven by that configuration
//!
//! ```rust,ignore
//! use parley_runtime::ParleyRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = ParleyRuntime::builder()
//!         .adapter(ConsoleAdapter::new())
//!         .handler(Greeter)
//!         .build()?;
//!
//!     let (tx, rx) = runtime.inbound_channel();
//!     tokio::spawn(read_stdin(tx));
//!     runtime.run_until_signal(rx).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, ParleyConfig, RuntimeSettings};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, LoggingError, SpanEvents};
pub use runtime::{ParleyRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for handler code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
