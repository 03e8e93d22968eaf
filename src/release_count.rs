use std::fmt;
use std::str::FromStr;

use crate::error::RelReportError;

/// Maximum number of releases to report per project.
///
/// Parsed from an integer or decimal string. Fractional counts are truncated
/// toward zero and negative counts clamp to zero, so `2.9` means two releases
/// and `-1` means none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseCount(usize);

impl ReleaseCount {
    pub fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for ReleaseCount {
    fn from(count: usize) -> Self {
        Self(count)
    }
}

impl FromStr for ReleaseCount {
    type Err = RelReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Ok(count) = trimmed.parse::<usize>() {
            return Ok(Self(count));
        }

        let value: f64 = trimmed
            .parse()
            .map_err(|_| RelReportError::InvalidCount(s.to_string()))?;

        if !value.is_finite() {
            return Err(RelReportError::InvalidCount(s.to_string()));
        }

        // `as` saturates, so huge values become usize::MAX
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = value.trunc().max(0.0) as usize;

        Ok(Self(count))
    }
}

impl fmt::Display for ReleaseCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> usize {
        s.parse::<ReleaseCount>().unwrap().get()
    }

    #[test]
    fn test_parse_integers() {
        assert_eq!(parse("3"), 3);
        assert_eq!(parse("0"), 0);
        assert_eq!(parse(" 25 "), 25);
    }

    #[test]
    fn test_parse_decimals_truncate() {
        assert_eq!(parse("2.9"), 2);
        assert_eq!(parse("0.5"), 0);
        assert_eq!(parse("10.0"), 10);
        assert_eq!(parse("1e1"), 10);
    }

    #[test]
    fn test_parse_negative_clamps_to_zero() {
        assert_eq!(parse("-1"), 0);
        assert_eq!(parse("-0.5"), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "three", "3 releases", "NaN", "inf", "-inf"] {
            let result = input.parse::<ReleaseCount>();
            assert!(
                matches!(result, Err(RelReportError::InvalidCount(_))),
                "{input:?} should be rejected"
            );
        }
    }
}
