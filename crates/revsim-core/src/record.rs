//! Records as they appear in the line-delimited dataset collections.
//!
//! A [`Record`] is one JSON object per line of `user.json`, `item.json` or
//! `review.json`. Field names are normalized upstream, so the harness only
//! relies on a handful of canonical fields (`user_id`, `item_id`,
//! `review_id`, `stars`, `text`, `date`) and passes everything else through
//! untouched to the agent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The three entity kinds a dataset root provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Item,
    Review,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::User, EntityKind::Item, EntityKind::Review];

    /// Field carrying the identity of a record of this kind.
    #[must_use]
    pub fn id_field(self) -> &'static str {
        match self {
            EntityKind::User => "user_id",
            EntityKind::Item => "item_id",
            EntityKind::Review => "review_id",
        }
    }

    /// File stem of the backing collection inside a dataset root.
    #[must_use]
    pub fn file_stem(self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Item => "item",
            EntityKind::Review => "review",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// One immutable line of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String value of `field`, if present and a string.
    #[must_use]
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Numeric value of `field`. Numbers encoded as strings (common in the
    /// product datasets) are parsed as well.
    #[must_use]
    pub fn f64_field(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Identity of this record for the given kind.
    #[must_use]
    pub fn id(&self, kind: EntityKind) -> Option<&str> {
        self.str_field(kind.id_field())
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.str_field("user_id")
    }

    #[must_use]
    pub fn item_id(&self) -> Option<&str> {
        self.str_field("item_id")
    }

    #[must_use]
    pub fn stars(&self) -> Option<f64> {
        self.f64_field("stars")
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.str_field("text")
    }

    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.str_field("date")
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
