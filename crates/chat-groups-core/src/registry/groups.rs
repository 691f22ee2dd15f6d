//! Lookup and mutation helpers over an in-memory group list.
//!
//! These never touch storage; the async operations in
//! [`operations`](super::operations) load the list, call into here, and write
//! the whole list back.

use super::types::{Chat, ChatGroup, ChatId, GroupId};

// ============================================================================
// Group Operations
// ============================================================================

pub fn find_group(groups: &[ChatGroup], id: GroupId) -> Option<&ChatGroup> {
    groups.iter().find(|g| g.id == id)
}

pub fn find_group_mut(groups: &mut [ChatGroup], id: GroupId) -> Option<&mut ChatGroup> {
    groups.iter_mut().find(|g| g.id == id)
}

pub fn find_group_by_title<'a>(groups: &'a [ChatGroup], title: &str) -> Option<&'a ChatGroup> {
    groups.iter().find(|g| g.title == title)
}

/// Remove the group with `id`. Returns whether anything was removed.
pub fn remove_group(groups: &mut Vec<ChatGroup>, id: GroupId) -> bool {
    let before = groups.len();
    groups.retain(|g| g.id != id);
    groups.len() != before
}

// ============================================================================
// Membership Operations
// ============================================================================

pub fn group_contains_chat(group: &ChatGroup, chat_id: &ChatId) -> bool {
    group.chats.iter().any(|c| &c.id == chat_id)
}

/// The group whose chat list holds `chat_id`, if any.
pub fn find_group_containing<'a>(groups: &'a [ChatGroup], chat_id: &ChatId) -> Option<&'a ChatGroup> {
    groups.iter().find(|g| group_contains_chat(g, chat_id))
}

/// Remove `chat_id` from `group`. Returns whether it was present.
pub fn remove_chat(group: &mut ChatGroup, chat_id: &ChatId) -> bool {
    let before = group.chats.len();
    group.chats.retain(|c| &c.id != chat_id);
    group.chats.len() != before
}

/// Remove `chat_id` from every group except `keep`. Returns the ids of the
/// groups it was taken out of.
pub fn detach_chat_elsewhere(groups: &mut [ChatGroup], chat_id: &ChatId, keep: GroupId) -> Vec<GroupId> {
    groups
        .iter_mut()
        .filter(|g| g.id != keep)
        .filter_map(|g| remove_chat(g, chat_id).then_some(g.id))
        .collect()
}

pub fn push_chat(group: &mut ChatGroup, chat: Chat) {
    group.chats.push(chat);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_group(id: GroupId, title: &str, chats: &[&str]) -> ChatGroup {
        let mut group = ChatGroup::new(id, title);
        for chat in chats {
            push_chat(&mut group, Chat::new(*chat).with_group(id));
        }
        group
    }

    #[test]
    fn find_by_id_and_title() {
        let groups = vec![make_group(1, "Work", &[]), make_group(2, "Fun", &[])];

        assert_eq!(find_group(&groups, 2).unwrap().title, "Fun");
        assert!(find_group(&groups, 3).is_none());

        assert_eq!(find_group_by_title(&groups, "Work").unwrap().id, 1);
        assert!(find_group_by_title(&groups, "work").is_none());
    }

    #[test]
    fn find_group_mut_allows_edit() {
        let mut groups = vec![make_group(1, "Work", &[])];
        find_group_mut(&mut groups, 1).unwrap().title = "Job".to_string();
        assert_eq!(groups[0].title, "Job");
    }

    #[test]
    fn remove_group_reports_presence() {
        let mut groups = vec![make_group(1, "Work", &[]), make_group(2, "Fun", &[])];

        assert!(remove_group(&mut groups, 1));
        assert!(!remove_group(&mut groups, 1));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, 2);
    }

    #[test]
    fn membership_queries() {
        let groups = vec![make_group(1, "Work", &["a"]), make_group(2, "Fun", &["b"])];
        let b = ChatId::from("b");

        assert!(group_contains_chat(&groups[1], &b));
        assert!(!group_contains_chat(&groups[0], &b));
        assert_eq!(find_group_containing(&groups, &b).unwrap().id, 2);
        assert!(find_group_containing(&groups, &ChatId::from("z")).is_none());
    }

    #[test]
    fn remove_chat_reports_presence() {
        let mut group = make_group(1, "Work", &["a", "b"]);

        assert!(remove_chat(&mut group, &ChatId::from("a")));
        assert!(!remove_chat(&mut group, &ChatId::from("a")));
        assert_eq!(group.chats.len(), 1);
        assert_eq!(group.chats[0].id, ChatId::from("b"));
    }

    #[test]
    fn detach_elsewhere_spares_target() {
        let mut groups = vec![
            make_group(1, "Work", &["a"]),
            make_group(2, "Fun", &["a", "b"]),
            make_group(3, "Misc", &[]),
        ];

        let detached = detach_chat_elsewhere(&mut groups, &ChatId::from("a"), 1);

        assert_eq!(detached, vec![2]);
        assert!(group_contains_chat(&groups[0], &ChatId::from("a")));
        assert_eq!(groups[1].chats.len(), 1);
    }
}
