use std::path::PathBuf;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// The unified error type for keyflow
#[derive(Error, Debug)]
pub enum KeyflowError {
    /// A filename did not match the template it was parsed against.
    #[error("[E{:04}] '{filename}' does not match template '{template}'", ErrorCode::KEY_TEMPLATE_MISMATCH)]
    TemplateMismatch { filename: String, template: String },

    #[error("[E{:04}] invalid key part '{keypart}'", ErrorCode::KEY_INVALID_KEYPART)]
    InvalidKeyPart { keypart: String },

    #[error("[E{:04}] cannot normalize timestamp '{value}'", ErrorCode::KEY_INVALID_TIMESTAMP)]
    InvalidTimestamp { value: String },

    #[error("[E{:04}] cannot compile template '{template}'", ErrorCode::KEY_INVALID_TEMPLATE)]
    InvalidTemplate {
        template: String,
        #[source]
        source: regex::Error,
    },

    #[error("[E{:04}] invalid tier '{tier}'", ErrorCode::CONFIG_INVALID_TIER)]
    InvalidTier { tier: String },

    #[error(
        "[E{:04}] ignore-keys file {} not in json, yaml or keylist format",
        ErrorCode::CONFIG_INVALID_IGNORE_FORMAT,
        .path.display()
    )]
    InvalidIgnoreFormat { path: PathBuf },

    #[error(
        "[E{:04}] no ignore-keys file found: {}",
        ErrorCode::CONFIG_IGNORE_FILE_NOT_FOUND,
        .path.display()
    )]
    MissingIgnoreFile { path: PathBuf },

    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{:04}] invalid glob pattern '{pattern}'", ErrorCode::FS_INVALID_GLOB)]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("[E{:04}] {message}", ErrorCode::FS_IO_ERROR)]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },
}

impl KeyflowError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn invalid_tier(tier: impl Into<String>) -> Self {
        Self::InvalidTier { tier: tier.into() }
    }

    /// Wrap an I/O failure on a specific path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        Self::Io {
            message: format!("failed to access {}", path.display()),
            path: Some(path),
            source,
        }
    }

    /// Add a source error to a configuration error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        if let Self::Config { source: src, .. } = &mut self {
            *src = Some(source.into());
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::TemplateMismatch { .. } => ErrorCode::KEY_TEMPLATE_MISMATCH,
            Self::InvalidKeyPart { .. } => ErrorCode::KEY_INVALID_KEYPART,
            Self::InvalidTimestamp { .. } => ErrorCode::KEY_INVALID_TIMESTAMP,
            Self::InvalidTemplate { .. } => ErrorCode::KEY_INVALID_TEMPLATE,
            Self::InvalidTier { .. } => ErrorCode::CONFIG_INVALID_TIER,
            Self::InvalidIgnoreFormat { .. } => ErrorCode::CONFIG_INVALID_IGNORE_FORMAT,
            Self::MissingIgnoreFile { .. } => ErrorCode::CONFIG_IGNORE_FILE_NOT_FOUND,
            Self::Config { code, .. } => *code,
            Self::Glob { .. } => ErrorCode::FS_INVALID_GLOB,
            Self::Io { .. } => ErrorCode::FS_IO_ERROR,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.code() {
            1000..=1999 => 2,
            2000..=2999 => 3,
            3000..=3999 => 4,
            _ => 1,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::TemplateMismatch { filename, .. } => {
                format!("File '{}' does not follow the expected naming scheme", filename)
            }
            Self::InvalidKeyPart { keypart } => format!(
                "Key part '{}' must look like -experiment[-detector[-campaign[-measurement[-run[-timestamp]]]]]",
                keypart
            ),
            Self::InvalidTimestamp { value } => {
                format!("Timestamp '{}' is not in a recognized format", value)
            }
            Self::InvalidTier { tier } => format!("Unknown tier '{}'", tier),
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Io { message, path, .. } => match path {
                Some(p) => format!("Filesystem error at {}: {}", p.display(), message),
                None => format!("Filesystem error: {}", message),
            },
            other => other.to_string(),
        }
    }
}

/// Type alias for Results using KeyflowError
pub type Result<T> = std::result::Result<T, KeyflowError>;

impl From<std::io::Error> for KeyflowError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: "IO operation failed".to_string(),
            path: None,
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for KeyflowError {
    fn from(err: serde_yaml::Error) -> Self {
        KeyflowError::config_with_code(ErrorCode::CONFIG_INVALID_YAML, "Invalid YAML syntax")
            .with_source(err)
    }
}

impl From<serde_json::Error> for KeyflowError {
    fn from(err: serde_json::Error) -> Self {
        KeyflowError::config_with_code(ErrorCode::CONFIG_INVALID_JSON, "Invalid JSON syntax")
            .with_source(err)
    }
}
