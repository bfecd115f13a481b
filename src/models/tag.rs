// file: src/models/tag.rs
// description: canonical candidate tag variants with prefix:value string form
// reference: internal data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// A canonical searchable tag. Stored and exchanged as `prefix:value`
/// strings; the variant form exists so tag kinds are matched by type,
/// not by string prefix, inside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Dept(String),
    Skill(String),
    Cert(String),
    Exp(String),
}

impl Tag {
    pub fn prefix(&self) -> &'static str {
        match self {
            Tag::Dept(_) => "dept",
            Tag::Skill(_) => "skill",
            Tag::Cert(_) => "cert",
            Tag::Exp(_) => "exp",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Tag::Dept(v) | Tag::Skill(v) | Tag::Cert(v) | Tag::Exp(v) => v,
        }
    }

    /// Parse a `prefix:value` string. Splits on the first `:` only, so
    /// values may themselves contain colons.
    pub fn parse(s: &str) -> Option<Tag> {
        let (prefix, value) = s.split_once(':')?;
        if value.is_empty() {
            return None;
        }
        match prefix {
            "dept" => Some(Tag::Dept(value.to_string())),
            "skill" => Some(Tag::Skill(value.to_string())),
            "cert" => Some(Tag::Cert(value.to_string())),
            "exp" => Some(Tag::Exp(value.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix(), self.value())
    }
}

impl Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Tag::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid tag string: {}", s)))
    }
}
