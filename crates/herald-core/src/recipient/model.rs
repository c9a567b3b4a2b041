//! Recipient domain model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two recipient categories the platform exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    Individual,
    Group,
}

impl RecipientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientKind::Individual => "individual",
            RecipientKind::Group => "group",
        }
    }
}

impl fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipientKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" | "individuals" | "friend" | "friends" => Ok(RecipientKind::Individual),
            "group" | "groups" => Ok(RecipientKind::Group),
            other => Err(format!("unknown recipient kind: {}", other)),
        }
    }
}

/// A contact or group that can receive a broadcast.
///
/// `id` is unique within its kind's list only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub name: String,
    pub kind: RecipientKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
}

impl Recipient {
    pub fn individual(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: RecipientKind::Individual,
            picture: None,
            member_count: None,
        }
    }

    pub fn group(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: RecipientKind::Group,
            picture: None,
            member_count: None,
        }
    }

    pub fn with_member_count(mut self, count: u64) -> Self {
        self.member_count = Some(count);
        self
    }
}
