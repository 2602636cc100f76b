//! Document categories and the labels a classification can carry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A document class the system recognises.
///
/// Declaration order is significant: when two categories score equally the
/// one declared first wins. `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    DriversLicence,
    BankStatement,
    Invoice,
}

impl CategoryId {
    /// All categories in declaration order.
    pub const ALL: [CategoryId; 3] = [Self::DriversLicence, Self::BankStatement, Self::Invoice];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriversLicence => "drivers_licence",
            Self::BankStatement => "bank_statement",
            Self::Invoice => "invoice",
        }
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised document label: {0:?}")]
pub struct ParseLabelError(pub String);

impl FromStr for CategoryId {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ParseLabelError(s.to_string()))
    }
}

/// The `type` of a classification result.
///
/// `Unknown` means every strategy abstained; `Error` is reserved for
/// failures outside the cascade (timeouts, panics in the caller's task).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentLabel {
    Category(CategoryId),
    Unknown,
    Error,
}

impl DocumentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category(id) => id.as_str(),
            Self::Unknown => "unknown",
            Self::Error => "error",
        }
    }

    pub fn category(&self) -> Option<CategoryId> {
        match self {
            Self::Category(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<CategoryId> for DocumentLabel {
    fn from(id: CategoryId) -> Self {
        Self::Category(id)
    }
}

impl From<Option<CategoryId>> for DocumentLabel {
    fn from(id: Option<CategoryId>) -> Self {
        id.map_or(Self::Unknown, Self::Category)
    }
}

impl fmt::Display for DocumentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Self::Unknown),
            "error" => Ok(Self::Error),
            other => other.parse().map(Self::Category),
        }
    }
}

impl Serialize for DocumentLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
