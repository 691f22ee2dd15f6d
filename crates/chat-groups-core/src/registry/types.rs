//! Chat group data types.
//!
//! # Data Model Overview
//!
//! ```text
//! chatGroupIdCounter: 3
//! chatGroups: [
//!   { "id": 1, "title": "Work", "chats": [ { "id": "c1", "grpId": 1, ... } ] },
//!   { "id": 3, "title": "Fun",  "chats": [] }
//! ]
//! ```
//!
//! A [`Chat`] inside a group is a membership copy. The canonical record lives
//! in the caller-owned [`AllChatsMap`]; the registry only updates its `grpId`.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chat group identifier, allocated by [`IdCounter`](crate::id_counter::IdCounter).
pub type GroupId = u64;

/// Externally assigned chat identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub String);

impl ChatId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatId {
    fn from(s: &str) -> Self {
        ChatId(s.to_string())
    }
}

impl From<String> for ChatId {
    fn from(s: String) -> Self {
        ChatId(s)
    }
}

/// A chat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,

    /// Id of the owning group, if any. Lookup only, not ownership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grp_id: Option<GroupId>,

    /// Any other chat fields (title, url, ...), kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Chat {
    pub fn new(id: impl Into<ChatId>) -> Self {
        Self {
            id: id.into(),
            grp_id: None,
            extra: Map::new(),
        }
    }

    pub fn with_group(mut self, grp_id: GroupId) -> Self {
        self.grp_id = Some(grp_id);
        self
    }
}

/// A named, ordered collection of chats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatGroup {
    pub id: GroupId,
    pub title: String,
    #[serde(default)]
    pub chats: Vec<Chat>,
}

impl ChatGroup {
    /// A new, empty group.
    pub fn new(id: GroupId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            chats: Vec::new(),
        }
    }
}

/// Canonical chat records keyed by chat id. Owned by the caller.
pub type AllChatsMap = HashMap<ChatId, Chat>;
