//! # chat-groups-core
//!
//! Persistent state for the chat organizer: named chat groups, their chat
//! memberships, and the id counter behind group ids.
//!
//! ## Key Concepts
//!
//! - **Storage area**: a `local` or `sync` key-value scope of a [`StorageBackend`]
//! - **StateManager**: the typed facade over one area, with a process-wide instance
//! - **Chat group**: a uniquely titled, ordered list of chats with a counter-assigned id
//! - **Canonical chat record**: the caller-owned entry in an [`AllChatsMap`];
//!   the registry keeps its `grpId` in step with group membership

pub mod config;
pub mod error;
pub mod event_bus;
pub mod id_counter;
pub mod paths;
pub mod registry;
pub mod state;
pub mod storage;

// Re-export commonly used types
pub use config::StoreConfig;
pub use error::{StateError, StateResult};
pub use id_counter::IdCounter;
pub use registry::{AllChatsMap, Chat, ChatGroup, ChatId, GroupId};
pub use state::{StateKey, StateManager, StateManagerCell};
pub use storage::{StorageArea, StorageBackend, StorageChange, StorageChanges};
