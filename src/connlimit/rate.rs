//! Sustained-rate expressions (`limit = "N/T[s|m|h]"`).

use std::str::FromStr;
use std::time::Duration;

/// Error type for rate expression parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateParseError {
    #[error("failed to parse '{0}': expected N[/T(s|m|h)]")]
    Syntax(String),
    #[error("failed to parse '{0}': attempt count must be greater than zero")]
    ZeroCount(String),
    #[error("failed to parse '{0}': period is too long")]
    Overflow(String),
}

/// `count` attempts per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub count: u32,
    pub period_secs: u64,
}

impl RateLimit {
    /// Minimum spacing between accepted attempts once the burst is spent.
    pub fn interval(&self) -> Duration {
        let millis = self.period_secs.saturating_mul(1000);
        Duration::from_millis(millis / u64::from(self.count.max(1)))
    }
}

impl FromStr for RateLimit {
    type Err = RateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || RateParseError::Syntax(s.to_string());
        let s = s.trim();

        let (count, rest) = split_number(s);
        let count: u32 = count.parse().map_err(|_| syntax())?;
        if count == 0 {
            return Err(RateParseError::ZeroCount(s.to_string()));
        }

        // Bare count means "per second".
        if rest.is_empty() {
            return Ok(Self { count, period_secs: 1 });
        }

        let rest = rest.strip_prefix('/').ok_or_else(syntax)?;
        let (period, unit) = split_number(rest);
        let period: u64 = if period.is_empty() {
            1
        } else {
            period.parse().map_err(|_| syntax())?
        };

        let scale = match unit {
            "s" => 1,
            "m" => 60,
            "h" => 3600,
            _ => return Err(syntax()),
        };

        // The interval is kept in milliseconds.
        let period_secs = period
            .checked_mul(scale)
            .filter(|secs| secs.checked_mul(1000).is_some())
            .ok_or_else(|| RateParseError::Overflow(s.to_string()))?;

        Ok(Self { count, period_secs })
    }
}

fn split_number(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval_ms(expr: &str) -> u128 {
        expr.parse::<RateLimit>().unwrap().interval().as_millis()
    }

    #[test]
    fn test_parse_with_units() {
        assert_eq!(interval_ms("10/1s"), 100);
        assert_eq!(interval_ms("1/5m"), 300_000);
        assert_eq!(interval_ms("2/1h"), 1_800_000);
        assert_eq!(interval_ms("4/s"), 250);
    }

    #[test]
    fn test_bare_count_is_per_second() {
        let rate: RateLimit = "5".parse().unwrap();
        assert_eq!(rate, RateLimit { count: 5, period_secs: 1 });
        assert_eq!(rate.interval(), Duration::from_millis(200));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("10/1".parse::<RateLimit>(), Err(RateParseError::Syntax(_))));
        assert!(matches!("10-1s".parse::<RateLimit>(), Err(RateParseError::Syntax(_))));
        assert!(matches!("x/1s".parse::<RateLimit>(), Err(RateParseError::Syntax(_))));
        assert!(matches!("10/1d".parse::<RateLimit>(), Err(RateParseError::Syntax(_))));
        assert!(matches!("0/1s".parse::<RateLimit>(), Err(RateParseError::ZeroCount(_))));
    }

    #[test]
    fn test_period_overflow_is_rejected() {
        assert!(matches!(
            "1/9999999999999999999h".parse::<RateLimit>(),
            Err(RateParseError::Overflow(_))
        ));
        assert!(matches!(
            "1/5124095576030432h".parse::<RateLimit>(),
            Err(RateParseError::Overflow(_))
        ));
        assert!(matches!(
            "1/18446744073709552s".parse::<RateLimit>(),
            Err(RateParseError::Overflow(_))
        ));
        assert_eq!(
            "1/18446744073709551s".parse::<RateLimit>().unwrap().period_secs,
            18_446_744_073_709_551
        );
    }

    #[test]
    fn test_interval_saturates() {
        let rate = RateLimit { count: 1, period_secs: u64::MAX };
        assert_eq!(rate.interval(), Duration::from_millis(u64::MAX));
    }
}
