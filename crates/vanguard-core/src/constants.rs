//! Tuning constants shared across the decision pipeline.

/// Default event-memory retention (milliseconds).
pub const DEFAULT_RETENTION_MS: i64 = 600_000;

/// Default recent-event window consulted by the pipeline (milliseconds).
pub const DEFAULT_MEMORY_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Default decision-cache TTL (milliseconds).
pub const DEFAULT_CACHE_TTL_MS: i64 = 3_000;

/// Default sliding window for kill-credit attribution (milliseconds).
pub const DEFAULT_KILL_CREDIT_WINDOW_MS: i64 = 120_000;

/// Window for the recent-fire-memory probe in fire summaries (milliseconds).
pub const RECENT_FIRE_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Visibility assumed before any environment report arrives (meters).
pub const DEFAULT_VISIBILITY_M: f64 = 1500.0;
