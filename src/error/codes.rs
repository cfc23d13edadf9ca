/// Error code registry for keyflow
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Key errors
/// - 3000-3999: Filesystem errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_INVALID_TIER: u16 = 1001;
    pub const CONFIG_INVALID_IGNORE_FORMAT: u16 = 1002;
    pub const CONFIG_IGNORE_FILE_NOT_FOUND: u16 = 1003;
    pub const CONFIG_INVALID_YAML: u16 = 1004;
    pub const CONFIG_INVALID_JSON: u16 = 1005;
    pub const CONFIG_NOT_FOUND: u16 = 1006;

    // Key errors (2000-2999)
    pub const KEY_TEMPLATE_MISMATCH: u16 = 2001;
    pub const KEY_INVALID_KEYPART: u16 = 2002;
    pub const KEY_INVALID_TIMESTAMP: u16 = 2003;
    pub const KEY_INVALID_TEMPLATE: u16 = 2004;

    // Filesystem errors (3000-3999)
    pub const FS_IO_ERROR: u16 = 3000;
    pub const FS_INVALID_GLOB: u16 = 3001;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_INVALID_TIER => "Unknown data tier",
        ErrorCode::CONFIG_INVALID_IGNORE_FORMAT => {
            "Ignore-keys file is not in json, yaml or keylist format"
        }
        ErrorCode::CONFIG_IGNORE_FILE_NOT_FOUND => "Ignore-keys file not found",
        ErrorCode::CONFIG_INVALID_YAML => "Invalid YAML syntax",
        ErrorCode::CONFIG_INVALID_JSON => "Invalid JSON syntax",
        ErrorCode::CONFIG_NOT_FOUND => "Setup configuration file not found",
        ErrorCode::KEY_TEMPLATE_MISMATCH => "Filename does not match the template",
        ErrorCode::KEY_INVALID_KEYPART => "Malformed key-part string",
        ErrorCode::KEY_INVALID_TIMESTAMP => "Timestamp cannot be normalized",
        ErrorCode::KEY_INVALID_TEMPLATE => "Template cannot be compiled to a regex",
        ErrorCode::FS_IO_ERROR => "Filesystem operation failed",
        ErrorCode::FS_INVALID_GLOB => "Invalid glob pattern",
        _ => "Unknown error code",
    }
}
