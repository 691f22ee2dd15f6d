use std::fmt;

/// Key of a value in a storage area.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// Last allocated chat group id.
    ChatGroupIdCounter,
    /// The ordered list of chat groups.
    ChatGroups,
    /// Any other key.
    Custom(String),
}

impl StateKey {
    pub fn as_str(&self) -> &str {
        match self {
            StateKey::ChatGroupIdCounter => "chatGroupIdCounter",
            StateKey::ChatGroups => "chatGroups",
            StateKey::Custom(key) => key,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for StateKey {
    fn from(key: &str) -> Self {
        match key {
            "chatGroupIdCounter" => StateKey::ChatGroupIdCounter,
            "chatGroups" => StateKey::ChatGroups,
            other => StateKey::Custom(other.to_string()),
        }
    }
}
