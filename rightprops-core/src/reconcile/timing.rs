//! Time-base arithmetic shared by the fallback passes.

use std::fmt;

/// Rational number of seconds per tick, as reported in `time_base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
    pub num: i64,
    pub den: i64,
}

impl TimeBase {
    /// Parses `"<num>/<den>"`. A zero denominator is rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let (num, den) = text.trim().split_once('/')?;
        let num = num.trim().parse::<i64>().ok()?;
        let den = den.trim().parse::<i64>().ok()?;
        (den != 0).then_some(Self { num, den })
    }

    /// Converts a tick count to seconds without truncating fractions.
    pub fn ticks_to_seconds(self, ticks: i64) -> f64 {
        ticks as f64 * self.num as f64 / self.den as f64
    }
}

impl fmt::Display for TimeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Parses a declared duration in seconds. `N/A` and other non-numeric
/// values yield `None`.
pub fn parse_seconds(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|secs| secs.is_finite())
}

/// Parses an integer column, treating `N/A` as absent.
pub fn parse_count(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Picks the declared duration when present, otherwise derives it from the
/// summed packet ticks. Returns `None` when neither is usable.
pub fn resolve_duration(
    declared: Option<f64>,
    ticks: i64,
    time_base: Option<TimeBase>,
) -> Option<f64> {
    let seconds = match declared {
        Some(secs) => secs,
        None => time_base?.ticks_to_seconds(ticks),
    };
    (seconds.is_finite() && seconds > 0.0).then_some(seconds)
}

/// Bits per second over `seconds`, rounded half away from zero.
pub fn bits_per_second(bytes: u64, seconds: f64) -> Option<i64> {
    if !(seconds.is_finite() && seconds > 0.0) {
        return None;
    }
    Some((8.0 * bytes as f64 / seconds).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_base_parse() {
        assert_eq!(TimeBase::parse("1/1000"), Some(TimeBase { num: 1, den: 1000 }));
        assert_eq!(TimeBase::parse(" 1001/30000 "), Some(TimeBase { num: 1001, den: 30000 }));
        assert_eq!(TimeBase::parse("1/0"), None);
        assert_eq!(TimeBase::parse("N/A"), None);
        assert_eq!(TimeBase::parse("25"), None);
    }

    #[test]
    fn test_ticks_keep_fractional_seconds() {
        let tb = TimeBase { num: 1, den: 1000 };
        assert_eq!(tb.ticks_to_seconds(1500), 1.5);
        let tb = TimeBase { num: 1, den: 3 };
        assert!((tb.ticks_to_seconds(1) - 0.333_333).abs() < 1e-6);
    }

    #[test]
    fn test_declared_duration_wins() {
        let tb = Some(TimeBase { num: 1, den: 1000 });
        assert_eq!(resolve_duration(Some(8.0), 1, tb), Some(8.0));
        assert_eq!(resolve_duration(None, 8000, tb), Some(8.0));
    }

    #[test]
    fn test_declared_and_derived_give_same_bitrate() {
        let tb = Some(TimeBase { num: 1, den: 90000 });
        let declared = resolve_duration(Some(4.0), 0, tb);
        let derived = resolve_duration(None, 360_000, tb);
        assert_eq!(
            declared.and_then(|s| bits_per_second(500_000, s)),
            derived.and_then(|s| bits_per_second(500_000, s))
        );
    }

    #[test]
    fn test_degenerate_durations() {
        assert_eq!(resolve_duration(None, 0, Some(TimeBase { num: 1, den: 1000 })), None);
        assert_eq!(resolve_duration(None, 100, None), None);
        assert_eq!(resolve_duration(Some(0.0), 100, None), None);
        assert_eq!(parse_seconds("N/A"), None);
        assert_eq!(parse_seconds("inf"), None);
        assert_eq!(parse_seconds("10.010000"), Some(10.01));
    }

    #[test]
    fn test_bits_per_second_rounding() {
        assert_eq!(bits_per_second(1_000_000, 8.0), Some(1_000_000));
        assert_eq!(bits_per_second(125, 1.0), Some(1000));
        // 8 * 1 / 16 = 0.5 rounds away from zero
        assert_eq!(bits_per_second(1, 16.0), Some(1));
        // 8 * 3 / 16 = 1.5
        assert_eq!(bits_per_second(3, 16.0), Some(2));
        assert_eq!(bits_per_second(100, 0.0), None);
        assert_eq!(bits_per_second(100, f64::NAN), None);
    }
}
