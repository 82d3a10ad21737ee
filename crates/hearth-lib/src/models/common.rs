use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum GameReleaseType {
    #[serde(rename = "old_alpha")]
    OldAlpha,

    #[serde(rename = "old_beta")]
    OldBeta,

    #[serde(rename = "release")]
    Release,

    #[serde(rename = "snapshot")]
    Snapshot,
}

impl GameReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameReleaseType::OldAlpha => "old_alpha",
            GameReleaseType::OldBeta => "old_beta",
            GameReleaseType::Release => "release",
            GameReleaseType::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for GameReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A downloadable file as it appears in remote metadata
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FileInfo {
    pub url: String,
    pub sha1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}
