//! Channel metadata.
//!
//! Metadata is a string-keyed map over a closed set of value kinds so that
//! consumers can handle every kind exhaustively.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl MetadataValue {
    /// The text, for [`MetadataValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The number, for [`MetadataValue::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The flag, for [`MetadataValue::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The instant, for [`MetadataValue::Timestamp`].
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            MetadataValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) => f.write_str(s),
            MetadataValue::Number(n) => write!(f, "{n}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_owned())
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        MetadataValue::Number(value as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for MetadataValue {
    fn from(value: DateTime<Utc>) -> Self {
        MetadataValue::Timestamp(value)
    }
}

/// Ordered metadata map attached to a [`crate::Channel`].
pub type Metadata = BTreeMap<String, MetadataValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_kind() {
        assert_eq!(MetadataValue::from("ECU1").as_text(), Some("ECU1"));
        assert_eq!(MetadataValue::from(2.5).as_number(), Some(2.5));
        assert_eq!(MetadataValue::from(3usize).as_number(), Some(3.0));
        assert_eq!(MetadataValue::from(true).as_bool(), Some(true));
        assert_eq!(MetadataValue::from(true).as_text(), None);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let ts = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut meta = Metadata::new();
        meta.insert("recorded".into(), ts.into());
        meta.insert("source".into(), "MDF:RecResult".into());

        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains(r#""kind":"timestamp""#));
        assert!(json.contains(r#""kind":"text""#));

        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
        assert_eq!(back["recorded"].as_timestamp(), Some(ts));
    }
}
