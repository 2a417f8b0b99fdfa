//! Shared helpers for the command implementations.

pub mod logging;
pub mod settings;

pub use logging::initialize_logging;
pub use settings::{ResolvedSettings, resolve_settings};
