/// Offline player identity
use uuid::Uuid;

/// Name used when the requested one is not a valid player name
pub const DEFAULT_USERNAME: &str = "Player";

const OFFLINE_PREFIX: &str = "OfflinePlayer:";

/// Deterministic offline UUID, dashed lowercase hex
pub fn offline_uuid(username: &str) -> String {
    let seed = format!("{}{}", OFFLINE_PREFIX, username);
    Uuid::new_v3(&Uuid::nil(), seed.as_bytes())
        .hyphenated()
        .to_string()
}

/// Keep `username` if it is non-empty and only `[A-Za-z0-9_]`, else fall back
/// to [`DEFAULT_USERNAME`].
pub fn validate_username(username: &str) -> String {
    let valid = !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        username.to_string()
    } else {
        log::warn!("Invalid username {:?}, using {}", username, DEFAULT_USERNAME);
        DEFAULT_USERNAME.to_string()
    }
}
