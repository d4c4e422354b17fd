// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Latchkey

// Secret Hashing
pub const LATCHKEY_HASH_SECRETS: &str = "LATCHKEY_HASH_SECRETS";
pub const LATCHKEY_HASH_KEY: &str = "LATCHKEY_HASH_KEY";
pub const LATCHKEY_FALLBACK_TO_PLAIN: &str = "LATCHKEY_FALLBACK_TO_PLAIN";

// Database Configuration
pub const LATCHKEY_DATABASE_PATH: &str = "LATCHKEY_DATABASE_PATH";
pub const LATCHKEY_DB_MAX_CONNECTIONS: &str = "LATCHKEY_DB_MAX_CONNECTIONS";
pub const LATCHKEY_DB_BUSY_TIMEOUT_SECS: &str = "LATCHKEY_DB_BUSY_TIMEOUT_SECS";
pub const LATCHKEY_DB_ENABLE_WAL: &str = "LATCHKEY_DB_ENABLE_WAL";

// System Environment Variables
pub const HOME: &str = "HOME";
