use std::time::Duration;

pub const FLUSH_INTERVAL_ENV: &str = "ZOOMER_FLUSH_INTERVAL_SECS";
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 30;
const MAX_FLUSH_INTERVAL_SECS: u64 = 3_600;

pub fn parse_flush_interval_secs(raw: Option<&str>, default_value: u64) -> u64 {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default_value)
        .clamp(1, MAX_FLUSH_INTERVAL_SECS)
}

/// Flush interval from an explicit override, else the environment, else 30s.
pub fn flush_interval(override_secs: Option<u64>) -> Duration {
    let secs = match override_secs {
        Some(secs) => secs.clamp(1, MAX_FLUSH_INTERVAL_SECS),
        None => {
            let raw = std::env::var(FLUSH_INTERVAL_ENV).ok();
            parse_flush_interval_secs(raw.as_deref(), DEFAULT_FLUSH_INTERVAL_SECS)
        }
    };
    Duration::from_secs(secs)
}
