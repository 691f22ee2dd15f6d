//! Error taxonomy for state and registry operations.

use thiserror::Error;

use crate::registry::types::{ChatId, GroupId};

/// Result alias used across the crate.
pub type StateResult<T> = Result<T, StateError>;

#[derive(Error, Debug)]
pub enum StateError {
    /// The storage backend rejected a read or write.
    #[error("Storage IO error: {0}")]
    StorageIo(String),

    /// A stored value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Group title ({0}) already exists")]
    DuplicateTitle(String),

    /// No group with the given id; `None` when the chat carried no group id.
    #[error("Group not found: {}", .0.map(|id| id.to_string()).unwrap_or_else(|| "none".to_string()))]
    GroupNotFound(Option<GroupId>),

    #[error("Chat not found in all chats map: {0}")]
    ChatNotFound(ChatId),

    #[error("Chat {chat} not found in group {group}")]
    ChatNotInGroup { chat: ChatId, group: GroupId },

    /// The id counter has handed out its last id.
    #[error("Chat group ids exhausted at {0}")]
    IdsExhausted(GroupId),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<std::io::Error> for StateError {
    fn from(e: std::io::Error) -> Self {
        StateError::StorageIo(e.to_string())
    }
}
