//! Chat group registry.
//!
//! Groups are stored as one ordered list under `chatGroups`; each group owns
//! an ordered list of chat memberships. The async operations live on
//! [`StateManager`](crate::state::StateManager) (see [`operations`]); the pure
//! list helpers in [`groups`] do the in-memory edits.

pub mod groups;
pub mod operations;
pub mod types;

pub use groups::{find_group, find_group_by_title, find_group_containing, group_contains_chat};
pub use types::{AllChatsMap, Chat, ChatGroup, ChatId, GroupId};
