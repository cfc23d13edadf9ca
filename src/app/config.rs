//! Application configuration
//!
//! Settings that belong to a single invocation of the binary rather than to
//! the data production setup.

use std::path::PathBuf;

/// Application configuration structure
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Setup configuration file, if one was given
    pub setup_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            setup_file: None,
        }
    }

    pub fn with_setup_file(mut self, path: Option<PathBuf>) -> Self {
        self.setup_file = path;
        self
    }

    /// Get the log level string based on verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn,keyflow=info",
            1 => "keyflow=debug",
            _ => "keyflow=trace",
        }
    }
}
