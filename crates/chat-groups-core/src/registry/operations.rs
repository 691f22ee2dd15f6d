//! Chat group registry operations on [`StateManager`].
//!
//! Every operation reads the whole `chatGroups` list, edits it in memory and
//! writes the whole list back. There is no locking: two overlapping calls,
//! from this process or from another facade on the same backend, can both read
//! the old list and the later write wins. Callers must not run registry
//! operations concurrently.

use crate::error::{StateError, StateResult};
use crate::state::{StateKey, StateManager};

use super::groups::{
    detach_chat_elsewhere, find_group, find_group_by_title, find_group_mut, group_contains_chat,
    push_chat, remove_chat, remove_group,
};
use super::types::{AllChatsMap, Chat, ChatGroup, GroupId};

impl StateManager {
    /// All persisted groups, or an empty list if none were ever stored.
    pub async fn get_groups(&self) -> StateResult<Vec<ChatGroup>> {
        Ok(self
            .get_state::<Vec<ChatGroup>>(StateKey::ChatGroups)
            .await?
            .unwrap_or_default())
    }

    pub async fn get_group(&self, id: GroupId) -> StateResult<Option<ChatGroup>> {
        let groups = self.get_groups().await?;
        Ok(find_group(&groups, id).cloned())
    }

    /// Create a group with a fresh id.
    ///
    /// The counter is persisted before the group list; a crash between the two
    /// writes leaves the counter ahead of the list, which only skips an id.
    pub async fn add_group(&self, title: &str) -> StateResult<ChatGroup> {
        let mut groups = self.get_groups().await?;

        if find_group_by_title(&groups, title).is_some() {
            return Err(StateError::DuplicateTitle(title.to_string()));
        }

        let group = ChatGroup::new(self.id_counter().next_id()?, title);
        groups.push(group.clone());

        self.update_counter().await?;
        self.set_state(StateKey::ChatGroups, &groups).await?;

        log::debug!("Created chat group {} ({})", group.id, group.title);
        Ok(group)
    }

    /// Remove the group with `group.id`, together with its membership list.
    ///
    /// A group that is not stored is not an error. Canonical chat records that
    /// still point at the group are left to the caller.
    pub async fn remove_group(&self, group: &ChatGroup) -> StateResult<()> {
        let mut groups = self.get_groups().await?;

        if !remove_group(&mut groups, group.id) {
            log::debug!("Chat group {} already removed", group.id);
        }

        self.set_state(StateKey::ChatGroups, &groups).await
    }

    /// Make `chat` a member of `group` and point its canonical record at it.
    ///
    /// Adding a chat that is already in the group is logged and otherwise
    /// ignored. A chat that belongs to another group is moved out of it.
    ///
    /// The stored membership copy carries `grpId`, so it reads
    /// `{"id": "c1", "grpId": 1}` rather than the bare `{"id": "c1"}` the
    /// caller may have passed in.
    pub async fn add_chat_to_group(
        &self,
        chat: &Chat,
        group: &ChatGroup,
        all_chats: &mut AllChatsMap,
    ) -> StateResult<()> {
        let mut groups = self.get_groups().await?;

        let target = groups
            .iter()
            .position(|g| g.id == group.id)
            .ok_or(StateError::GroupNotFound(Some(group.id)))?;

        let canonical = all_chats
            .get_mut(&chat.id)
            .ok_or_else(|| StateError::ChatNotFound(chat.id.clone()))?;
        canonical.grp_id = Some(group.id);

        if group_contains_chat(&groups[target], &chat.id) {
            log::error!("Chat already exists in group {}: {}", group.id, chat.id);
            return Ok(());
        }

        for previous in detach_chat_elsewhere(&mut groups, &chat.id, group.id) {
            log::debug!("Moving chat {} from group {previous} to {}", chat.id, group.id);
        }

        let mut member = chat.clone();
        member.grp_id = Some(group.id);
        push_chat(&mut groups[target], member);

        self.set_state(StateKey::ChatGroups, &groups).await
    }

    /// Remove `chat` from the group named by its `grp_id`.
    pub async fn remove_chat_from_group(&self, chat: &Chat) -> StateResult<()> {
        let mut groups = self.get_groups().await?;

        let group_id = chat.grp_id.ok_or(StateError::GroupNotFound(None))?;
        let group = find_group_mut(&mut groups, group_id)
            .ok_or(StateError::GroupNotFound(Some(group_id)))?;

        if !remove_chat(group, &chat.id) {
            return Err(StateError::ChatNotInGroup {
                chat: chat.id.clone(),
                group: group.id,
            });
        }

        self.set_state(StateKey::ChatGroups, &groups).await
    }

    /// Persist the id counter's current value.
    pub async fn update_counter(&self) -> StateResult<()> {
        let current = self.id_counter().current();
        self.set_state(StateKey::ChatGroupIdCounter, &current).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
