// This supports the launcher version manifest (v1 and v2 share these fields).
// Located at https://launchermeta.mojang.com/mc/game/version_manifest.json

use crate::error::{Error, Result};
use crate::models::common::GameReleaseType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Debug)]
struct IndexDocument {
    latest: Latest,
    versions: Vec<IndexEntry>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct Latest {
    release: String,
    snapshot: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct IndexEntry {
    id: String,
    #[serde(rename = "type")]
    release_type: GameReleaseType,
    url: String,
}

/// One version as listed in the remote index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSummary {
    pub id: String,
    pub kind: GameReleaseType,
    pub descriptor_url: String,
}

/// Immutable snapshot of the remote version index.
///
/// Each fetch produces a fresh value; nothing is merged into an older copy.
#[derive(Debug, Clone)]
pub struct VersionIndex {
    latest_release: String,
    latest_snapshot: String,
    versions: Vec<VersionSummary>,
}

impl VersionIndex {
    /// Parse an index document. `origin` names the source in errors.
    pub fn from_json(text: &str, origin: &str) -> Result<Self> {
        let doc: IndexDocument =
            serde_json::from_str(text).map_err(|e| Error::malformed(origin, e))?;

        Ok(Self {
            latest_release: doc.latest.release,
            latest_snapshot: doc.latest.snapshot,
            versions: doc
                .versions
                .into_iter()
                .map(|v| VersionSummary {
                    id: v.id,
                    kind: v.release_type,
                    descriptor_url: v.url,
                })
                .collect(),
        })
    }

    pub fn latest_release(&self) -> &str {
        &self.latest_release
    }

    pub fn latest_snapshot(&self) -> &str {
        &self.latest_snapshot
    }

    /// Versions in index order (newest first for the official index)
    pub fn versions(&self) -> &[VersionSummary] {
        &self.versions
    }

    pub fn get(&self, id: &str) -> Option<&VersionSummary> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Like [`VersionIndex::get`] but fails with `UnknownVersion`
    pub fn require(&self, id: &str) -> Result<&VersionSummary> {
        self.get(id)
            .ok_or_else(|| Error::UnknownVersion(id.to_string()))
    }

    /// Group version ids into the launcher's picker categories.
    ///
    /// The latest release and latest snapshot each sit only in their "Latest"
    /// category, not in the plain one.
    pub fn categories(&self) -> VersionCategories {
        let mut lists: Vec<(VersionCategory, Vec<String>)> = VersionCategory::ALL
            .iter()
            .map(|c| (*c, Vec::new()))
            .collect();

        let mut push = |category: VersionCategory, id: &str| {
            if let Some((_, ids)) = lists.iter_mut().find(|(c, _)| *c == category) {
                ids.push(id.to_string());
            }
        };

        for v in &self.versions {
            let is_latest_release = v.id == self.latest_release;
            let is_latest_snapshot = v.id == self.latest_snapshot;

            if is_latest_release {
                push(VersionCategory::LatestRelease, &v.id);
            } else if is_latest_snapshot {
                push(VersionCategory::LatestSnapshot, &v.id);
            }

            match v.kind {
                GameReleaseType::Release if !is_latest_release => {
                    push(VersionCategory::Release, &v.id)
                }
                GameReleaseType::Snapshot if !is_latest_snapshot => {
                    push(VersionCategory::Snapshot, &v.id)
                }
                GameReleaseType::OldBeta => push(VersionCategory::OldBeta, &v.id),
                GameReleaseType::OldAlpha => push(VersionCategory::OldAlpha, &v.id),
                _ => {}
            }
        }

        VersionCategories { lists }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionCategory {
    LatestRelease,
    LatestSnapshot,
    Release,
    Snapshot,
    OldBeta,
    OldAlpha,
}

impl VersionCategory {
    pub const ALL: [VersionCategory; 6] = [
        VersionCategory::LatestRelease,
        VersionCategory::LatestSnapshot,
        VersionCategory::Release,
        VersionCategory::Snapshot,
        VersionCategory::OldBeta,
        VersionCategory::OldAlpha,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VersionCategory::LatestRelease => "Latest Release",
            VersionCategory::LatestSnapshot => "Latest Snapshot",
            VersionCategory::Release => "Release",
            VersionCategory::Snapshot => "Snapshot",
            VersionCategory::OldBeta => "Old Beta",
            VersionCategory::OldAlpha => "Old Alpha",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        VersionCategory::ALL
            .iter()
            .copied()
            .find(|c| c.label() == label)
    }
}

impl fmt::Display for VersionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only projection of a [`VersionIndex`] into picker categories
#[derive(Debug, Clone)]
pub struct VersionCategories {
    lists: Vec<(VersionCategory, Vec<String>)>,
}

impl VersionCategories {
    pub fn get(&self, category: VersionCategory) -> &[String] {
        self.lists
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, ids)| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (VersionCategory, &[String])> {
        self.lists.iter().map(|(c, ids)| (*c, ids.as_slice()))
    }
}
