//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";

/// Default request timeout in seconds (0 = transport default)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of forward-geocoding results
pub const DEFAULT_FORWARD_LIMIT: usize = crate::constants::geocode::DEFAULT_FORWARD_LIMIT;

/// Default hover lookup delay in milliseconds
pub const DEFAULT_HOVER_DELAY_MS: u64 = crate::constants::map::HOVER_DELAY_MS;

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Environment variable that overrides the configured token
pub const TOKEN_ENV_VAR: &str = "SAFEZONE_TOKEN";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "safezone";
