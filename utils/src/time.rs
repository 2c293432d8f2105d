//! Time formatting helpers.

const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

/// Render a span of seconds as its two most significant units, e.g. `"2d 0h"`.
///
/// Spans under a minute render in seconds alone.
pub fn format_duration(secs: u64) -> String {
    let Some(lead) = UNITS.iter().position(|&(size, _)| secs >= size) else {
        return "0s".to_string();
    };
    let (size, suffix) = UNITS[lead];
    match UNITS.get(lead + 1) {
        Some(&(next, next_suffix)) => {
            format!("{}{suffix} {}{next_suffix}", secs / size, secs % size / next)
        }
        None => format!("{secs}{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timelock_scale_durations() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(2 * 86_400), "2d 0h");
        assert_eq!(format_duration(14 * 86_400 + 7_200), "14d 2h");
        assert_eq!(format_duration(3_660), "1h 1m");
    }

    #[test]
    fn unit_boundaries() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(60), "1m 0s");
        assert_eq!(format_duration(86_399), "23h 59m");
        assert_eq!(format_duration(u64::MAX), "213503982334601d 7h");
    }
}
