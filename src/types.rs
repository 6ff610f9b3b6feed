/// Shared identifier types used across the codebase

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Numeric row identifier for projects and documents.
///
/// Stored as `BIGINT`, but always rendered as a decimal string on the wire:
/// JSON consumers cannot represent the full 64-bit range as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Id(pub i64);

impl Id {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid id '{0}': expected a decimal 64-bit integer")]
pub struct ParseIdError(String);

impl FromStr for Id {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // i64::from_str accepts a leading '+', which is not a canonical id
        if s.is_empty() || s.starts_with('+') {
            return Err(ParseIdError(s.to_string()));
        }
        s.parse::<i64>()
            .map(Id)
            .map_err(|_| ParseIdError(s.to_string()))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl<'de> de::Visitor<'de> for IdVisitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal string or an integer id")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Id, E> {
                Ok(Id(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Id, E> {
                i64::try_from(v)
                    .map(Id)
                    .map_err(|_| E::custom(format!("id {} out of range", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Id, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Identity of an authenticated user, as issued by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_serializes_as_decimal_string() {
        let v = serde_json::to_value(Id(i64::MAX)).unwrap();
        assert_eq!(v, serde_json::json!("9223372036854775807"));
    }

    #[test]
    fn id_deserializes_from_string_or_number() {
        let a: Id = serde_json::from_str("\"42\"").unwrap();
        let b: Id = serde_json::from_str("42").unwrap();
        assert_eq!(a, Id(42));
        assert_eq!(b, Id(42));
    }

    #[test]
    fn id_rejects_non_decimal_path_segments() {
        assert!("abc".parse::<Id>().is_err());
        assert!("".parse::<Id>().is_err());
        assert!("+5".parse::<Id>().is_err());
        assert!("1.5".parse::<Id>().is_err());
        assert!("99999999999999999999".parse::<Id>().is_err());
        assert_eq!("-7".parse::<Id>().unwrap(), Id(-7));
    }
}
