use std::env;
use std::path::PathBuf;

use crate::error::{StateError, StateResult};

/// Directory name under `~/.config` used when no data dir is configured.
const DATA_DIR_NAME: &str = "chat-groups";

/// Return the user's home directory path.
///
/// Uses HOME on Unix-like systems and USERPROFILE on Windows.
pub fn get_home_dir() -> StateResult<PathBuf> {
    for var in ["HOME", "USERPROFILE"] {
        if let Ok(home) = env::var(var) {
            if !home.is_empty() {
                return Ok(PathBuf::from(home));
            }
        }
    }

    Err(StateError::Config("Home directory not set".to_string()))
}

/// `<home>/.config/chat-groups`
pub fn default_data_dir() -> StateResult<PathBuf> {
    Ok(get_home_dir()?.join(".config").join(DATA_DIR_NAME))
}
