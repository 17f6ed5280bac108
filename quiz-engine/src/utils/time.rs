/// Format elapsed seconds as `m:ss` for the session timer display.
pub fn format_mm_ss(total_seconds: u64) -> String {
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{}:{:02}", mins, secs)
}

/// Study time is reported in whole minutes, rounded up so a short session
/// still counts as one minute.
pub fn minutes_spent_ceil(seconds: u64) -> u64 {
    seconds.div_ceil(60)
}
