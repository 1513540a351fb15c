use serde::{Deserialize, Serialize};
use std::fmt;

/// Precomputed statistics window. Each variant names one document in the
/// urls collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RangeKey {
    #[default]
    #[serde(rename = "lastMonth")]
    LastMonth,
    #[serde(rename = "lastWeek")]
    LastWeek,
    #[serde(rename = "last2days")]
    Last2Days,
}

impl RangeKey {
    pub const ALL: [RangeKey; 3] = [RangeKey::LastMonth, RangeKey::LastWeek, RangeKey::Last2Days];

    pub fn as_str(self) -> &'static str {
        match self {
            RangeKey::LastMonth => "lastMonth",
            RangeKey::LastWeek => "lastWeek",
            RangeKey::Last2Days => "last2days",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RangeKey::LastMonth => "Last Month",
            RangeKey::LastWeek => "Last Week",
            RangeKey::Last2Days => "Last 2 Days",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

impl fmt::Display for RangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the `range` query parameter. Missing or unknown values fall back
/// to the default window.
pub fn resolve_range(raw: Option<&str>) -> RangeKey {
    raw.and_then(RangeKey::parse).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ranges_resolve_to_themselves() {
        for key in RangeKey::ALL {
            assert_eq!(resolve_range(Some(key.as_str())), key);
        }
    }

    #[test]
    fn invalid_ranges_resolve_to_default() {
        for raw in ["", "lastYear", "LASTWEEK", "lastweek", " lastWeek", "last2Days"] {
            assert_eq!(resolve_range(Some(raw)), RangeKey::LastMonth, "input {raw:?}");
        }
        assert_eq!(resolve_range(None), RangeKey::LastMonth);
    }

    #[test]
    fn serde_uses_wire_values() {
        let json = serde_json::to_string(&RangeKey::Last2Days).unwrap();
        assert_eq!(json, "\"last2days\"");
        let parsed: RangeKey = serde_json::from_str("\"lastWeek\"").unwrap();
        assert_eq!(parsed, RangeKey::LastWeek);
    }
}
