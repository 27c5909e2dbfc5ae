/// Capacity of the in-memory error log
pub const ERROR_LOG_CAPACITY: usize = 100;

/// Number of entries reported as "recent" in error statistics
pub const RECENT_ERRORS: usize = 10;

/// Default attempts for a safe API call
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Attempts for AI calls, which are slower and cost more per attempt
pub const AI_MAX_RETRIES: usize = 2;

/// Default base delay for exponential backoff (milliseconds)
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;

/// Quiet period before a debounced save fires (milliseconds)
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Error monitor refresh interval (seconds)
pub const DEFAULT_MONITOR_REFRESH_SECS: u64 = 30;

/// Filename prefix for state backups
pub const BACKUP_FILE_PREFIX: &str = "profitwise-backup";

/// Filename prefix for exported error logs
pub const ERROR_LOG_FILE_PREFIX: &str = "profitwise-errors";
