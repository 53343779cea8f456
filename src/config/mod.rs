//! Configuration for chirp-client.
//!
//! Settings are loaded from layered TOML files with `CHIRP__`-prefixed
//! environment-variable overrides. Only data-layer concerns are configured
//! here: the API base URL, transport timeouts, the search debounce window,
//! the background refetch interval, and logging.

mod error;
mod loader;
mod settings;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{ApiConfig, LogConfig, SearchConfig, Settings, SyncConfig};
