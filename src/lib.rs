pub mod game;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message once every 100 frames when the `perf_stats` feature is enabled.
///
/// `$frame` is any unsigned frame counter. Without `perf_stats` the macro
/// expands to an empty block and its arguments are never evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(self.frame, "[AGENTS] {} live agents", self.pool.live_count());
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($frame:expr, $($arg:tt)*) => {
        if $frame % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($frame:expr, $($arg:tt)*) => {};
}
