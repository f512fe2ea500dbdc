use std::time::Duration;

/// Database used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "app.db";
/// Queue size used when `RATINGS_QUEUE_CAPACITY` is not set or invalid.
pub const DEFAULT_RATINGS_QUEUE_CAPACITY: usize = 1024;
/// SQLite lock wait used when `DATABASE_BUSY_TIMEOUT_MS` is not set or invalid.
pub const DEFAULT_DATABASE_BUSY_TIMEOUT_MS: u64 = 5000;

/// Runtime settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Path of the SQLite database.
    pub database_url: String,
    /// Number of review events the rating aggregator buffers.
    pub ratings_queue_capacity: usize,
    /// How long a connection waits for SQLite's write lock, in milliseconds.
    pub database_busy_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            ratings_queue_capacity: DEFAULT_RATINGS_QUEUE_CAPACITY,
            database_busy_timeout_ms: DEFAULT_DATABASE_BUSY_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    /// Read the settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the settings through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            config.database_url = url;
        }

        if let Some(raw) = lookup("RATINGS_QUEUE_CAPACITY") {
            match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => config.ratings_queue_capacity = capacity,
                _ => log::warn!(
                    "ignoring RATINGS_QUEUE_CAPACITY={raw:?}, using {DEFAULT_RATINGS_QUEUE_CAPACITY}"
                ),
            }
        }

        if let Some(raw) = lookup("DATABASE_BUSY_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(timeout) => config.database_busy_timeout_ms = timeout,
                Err(_) => log::warn!(
                    "ignoring DATABASE_BUSY_TIMEOUT_MS={raw:?}, using {DEFAULT_DATABASE_BUSY_TIMEOUT_MS}"
                ),
            }
        }

        config
    }

    /// Lock wait handed to [`crate::db::create_pool`].
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.database_busy_timeout_ms)
    }
}
