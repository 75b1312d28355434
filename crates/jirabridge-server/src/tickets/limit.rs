//! Result limit policy
//!
//! Absent limits fall back to the configured default, limits above the
//! configured maximum are clamped, and zero, negative or non-numeric limits
//! are rejected with `InvalidQuery`. Both façades go through these helpers so
//! the policy is identical on every surface.

use jirabridge_core::models::LimitConfig;
use jirabridge_jira::{Error, Result};
use serde_json::Value;

/// Resolve a caller-supplied limit into the value sent to Jira.
pub fn resolve(raw: Option<i64>, limits: &LimitConfig) -> Result<u32> {
    let Some(requested) = raw else {
        return Ok(limits.default_limit);
    };

    if requested <= 0 {
        return Err(Error::InvalidQuery(format!(
            "limit must be a positive integer, got {}",
            requested
        )));
    }

    let max = i64::from(limits.max_limit);
    if requested > max {
        tracing::debug!(requested, max, "clamping limit");
        return Ok(limits.max_limit);
    }

    Ok(requested as u32)
}

/// Parse a textual limit, e.g. from a query string.
pub fn parse(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::InvalidQuery(format!("limit must be a positive integer, got '{}'", raw)))
}

/// Read a limit from a JSON argument. Integers and numeric strings are
/// accepted; `null` means "not given".
pub fn from_json(value: Option<&Value>) -> Result<Option<i64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| {
                Error::InvalidQuery(format!("limit must be a positive integer, got {}", n))
            }),
        Some(Value::String(s)) => parse(s).map(Some),
        Some(other) => Err(Error::InvalidQuery(format!(
            "limit must be a positive integer, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn limits() -> LimitConfig {
        LimitConfig {
            default_limit: 10,
            max_limit: 100,
        }
    }

    #[test]
    fn test_default_when_absent() {
        assert_eq!(resolve(None, &limits()).unwrap(), 10);
    }

    #[test]
    fn test_in_range_passes_through() {
        assert_eq!(resolve(Some(1), &limits()).unwrap(), 1);
        assert_eq!(resolve(Some(5), &limits()).unwrap(), 5);
        assert_eq!(resolve(Some(100), &limits()).unwrap(), 100);
    }

    #[test]
    fn test_clamps_above_max() {
        assert_eq!(resolve(Some(101), &limits()).unwrap(), 100);
        assert_eq!(resolve(Some(i64::MAX), &limits()).unwrap(), 100);
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        for raw in [0, -1, i64::MIN] {
            assert!(matches!(
                resolve(Some(raw), &limits()),
                Err(Error::InvalidQuery(_))
            ));
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse(" 25 ").unwrap(), 25);
        assert_eq!(parse("-3").unwrap(), -3);
        assert!(matches!(parse("ten"), Err(Error::InvalidQuery(_))));
        assert!(matches!(parse(""), Err(Error::InvalidQuery(_))));
        assert!(matches!(parse("2.5"), Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(from_json(None).unwrap(), None);
        assert_eq!(from_json(Some(&json!(null))).unwrap(), None);
        assert_eq!(from_json(Some(&json!(5))).unwrap(), Some(5));
        assert_eq!(from_json(Some(&json!(5.0))).unwrap(), Some(5));
        assert_eq!(from_json(Some(&json!("7"))).unwrap(), Some(7));
        assert!(from_json(Some(&json!(2.5))).is_err());
        assert!(from_json(Some(&json!("many"))).is_err());
        assert!(from_json(Some(&json!(true))).is_err());
    }
}
