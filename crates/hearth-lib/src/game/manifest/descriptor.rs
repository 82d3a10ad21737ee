/// Per-version descriptor (version.json) parsing
use crate::config::GameDirs;
use crate::error::{Error, Result};
use crate::game::platform::{OsFamily, PlatformDescriptor};
use crate::game::rules::{self, Rule};
use crate::game::store::ArtifactRef;
use crate::models::common::FileInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_MAIN_CLASS: &str = "net.minecraft.client.main.Main";

/// Complete version.json document as served remotely
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptorDocument {
    id: String,

    #[serde(default, rename = "type")]
    version_type: Option<String>,

    #[serde(default)]
    main_class: Option<String>,

    #[serde(default)]
    downloads: HashMap<String, FileInfo>,

    #[serde(default)]
    libraries: Vec<LibraryDocument>,

    #[serde(default)]
    arguments: Option<ArgumentsDocument>,

    /// Legacy arguments (pre-1.13)
    #[serde(default)]
    minecraft_arguments: Option<String>,

    #[serde(default)]
    asset_index: Option<AssetIndexDocument>,

    /// Assets version (legacy)
    #[serde(default)]
    assets: Option<String>,

    #[serde(default)]
    java_version: Option<JavaVersionDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArgumentsDocument {
    #[serde(default)]
    game: Option<Vec<Argument>>,

    #[serde(default)]
    jvm: Option<Vec<Argument>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LibraryDocument {
    name: String,

    #[serde(default)]
    downloads: Option<LibraryDownloads>,

    #[serde(default)]
    rules: Option<Vec<Rule>>,

    #[serde(default)]
    natives: Option<HashMap<String, String>>,

    #[serde(default)]
    extract: Option<ExtractRules>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LibraryDownloads {
    #[serde(default)]
    artifact: Option<ArtifactDocument>,

    #[serde(default)]
    classifiers: Option<HashMap<String, ArtifactDocument>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArtifactDocument {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    sha1: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ExtractRules {
    #[serde(default)]
    exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssetIndexDocument {
    id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JavaVersionDocument {
    major_version: u32,
}

/// Argument template entry, decoded once when the descriptor is parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    /// Copied verbatim
    Literal(String),

    /// Included only when its rules allow the platform
    Conditional {
        rules: Vec<Rule>,
        value: ArgumentValue,
    },
}

/// Argument value can be a single string or array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Single(String),
    Multiple(Vec<String>),
}

impl ArgumentValue {
    pub fn values(&self) -> &[String] {
        match self {
            ArgumentValue::Single(s) => std::slice::from_ref(s),
            ArgumentValue::Multiple(v) => v.as_slice(),
        }
    }
}

/// A dependency library with its per-platform applicability
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    /// Maven coordinates
    pub name: String,

    /// Classpath jar, if the library has one
    pub artifact: Option<ArtifactRef>,

    pub rules: Vec<Rule>,

    /// OS family to classifier name, possibly containing `${arch}`
    pub natives: HashMap<OsFamily, String>,

    pub classifiers: HashMap<String, ArtifactRef>,

    /// Archive entry prefixes skipped during native extraction
    pub extract_exclude: Vec<String>,
}

impl LibraryEntry {
    pub fn is_applicable(&self, platform: &PlatformDescriptor) -> bool {
        rules::evaluate(&self.rules, platform)
    }

    /// The native archive for `platform`, if the library ships one
    pub fn native_artifact(&self, platform: &PlatformDescriptor) -> Option<&ArtifactRef> {
        let template = self.natives.get(&platform.os)?;
        let classifier = template.replace("${arch}", platform.arch_bits());

        let artifact = self.classifiers.get(&classifier);
        if artifact.is_none() {
            log::warn!(
                "Library {} declares native classifier {} but has no download for it",
                self.name,
                classifier
            );
        }
        artifact
    }
}

/// Parsed per-version descriptor. Immutable once fetched.
#[derive(Debug, Clone)]
pub struct VersionDescriptor {
    pub id: String,

    /// Release type (release, snapshot, ...)
    pub kind: Option<String>,

    pub main_class: String,

    pub client: ArtifactRef,

    /// In descriptor order
    pub libraries: Vec<LibraryEntry>,

    pub jvm_arguments: Option<Vec<Argument>>,

    pub game_arguments: Option<Vec<Argument>>,

    /// Whitespace-separated legacy arguments (pre-1.13)
    pub legacy_arguments: Option<String>,

    pub asset_index_id: Option<String>,

    pub java_major_version: Option<u32>,
}

impl VersionDescriptor {
    /// Parse a descriptor document. `origin` names the source in errors.
    pub fn from_json(text: &str, origin: &str) -> Result<Self> {
        let doc: DescriptorDocument =
            serde_json::from_str(text).map_err(|e| Error::malformed(origin, e))?;
        Self::from_document(doc, origin)
    }

    fn from_document(doc: DescriptorDocument, origin: &str) -> Result<Self> {
        // Relative layout: paths come out relative to the data root
        let layout = GameDirs::new(PathBuf::new());

        let client_info = doc.downloads.get("client").ok_or_else(|| {
            Error::malformed(origin, format!("descriptor {} has no client download", doc.id))
        })?;
        let client = ArtifactRef::new(
            format!("{} client", doc.id),
            &client_info.url,
            layout.client_jar_path(&doc.id),
            &client_info.sha1,
        );

        let libraries = doc
            .libraries
            .into_iter()
            .map(|lib| convert_library(lib, &layout, origin))
            .collect::<Result<Vec<_>>>()?;

        let (game_arguments, jvm_arguments) = match doc.arguments {
            Some(args) => (args.game, args.jvm),
            None => (None, None),
        };

        Ok(Self {
            main_class: doc
                .main_class
                .unwrap_or_else(|| DEFAULT_MAIN_CLASS.to_string()),
            kind: doc.version_type,
            client,
            libraries,
            jvm_arguments,
            game_arguments,
            legacy_arguments: doc.minecraft_arguments,
            asset_index_id: doc.asset_index.map(|a| a.id).or(doc.assets),
            java_major_version: doc.java_version.map(|j| j.major_version),
            id: doc.id,
        })
    }
}

fn convert_library(lib: LibraryDocument, layout: &GameDirs, origin: &str) -> Result<LibraryEntry> {
    let downloads = lib.downloads.unwrap_or_default();

    let artifact = match downloads.artifact {
        Some(doc) => Some(convert_artifact(&lib.name, &lib.name, doc, layout, origin)?),
        None => None,
    };

    let mut classifiers = HashMap::new();
    for (classifier, doc) in downloads.classifiers.unwrap_or_default() {
        let coords = format!("{}:{}", lib.name, classifier);
        let artifact = convert_artifact(&lib.name, &coords, doc, layout, origin)?;
        classifiers.insert(classifier, artifact);
    }

    let mut natives = HashMap::new();
    for (os_name, classifier) in lib.natives.unwrap_or_default() {
        match OsFamily::from_name(&os_name) {
            Some(os) => {
                natives.insert(os, classifier);
            }
            None => log::debug!("Ignoring natives for unknown OS {} in {}", os_name, lib.name),
        }
    }

    Ok(LibraryEntry {
        name: lib.name,
        artifact,
        rules: lib.rules.unwrap_or_default(),
        natives,
        classifiers,
        extract_exclude: lib.extract.map(|e| e.exclude).unwrap_or_default(),
    })
}

fn convert_artifact(
    library: &str,
    coords: &str,
    doc: ArtifactDocument,
    layout: &GameDirs,
    origin: &str,
) -> Result<ArtifactRef> {
    let missing = |field: &str| {
        Error::malformed(origin, format!("library {} artifact has no {}", library, field))
    };

    let url = doc.url.ok_or_else(|| missing("url"))?;
    let sha1 = doc.sha1.ok_or_else(|| missing("sha1"))?;
    let path = match doc.path {
        Some(path) => path,
        None => maven_to_path(coords).ok_or_else(|| missing("path"))?,
    };

    Ok(ArtifactRef::new(library, url, layout.libraries_dir().join(path), sha1))
}

/// Convert Maven coordinates to a relative path string.
/// Format: group:artifact:version[:classifier][@extension]
/// Example: "com.google.guava:guava:21.0" -> "com/google/guava/guava/21.0/guava-21.0.jar"
pub fn maven_to_path(coords: &str) -> Option<String> {
    let parts: Vec<&str> = coords.split(':').collect();

    if parts.len() < 3 {
        return None;
    }

    let group = parts[0].replace('.', "/");
    let artifact = parts[1];
    let mut version = parts[2];
    let mut classifier = None;
    let mut extension = "jar";

    if parts.len() == 3 {
        if let Some((v, ext)) = version.split_once('@') {
            version = v;
            extension = ext;
        }
    } else if let Some((clf, ext)) = parts[3].split_once('@') {
        classifier = Some(clf);
        extension = ext;
    } else {
        classifier = Some(parts[3]);
    }

    let filename = match classifier {
        Some(clf) => format!("{}-{}-{}.{}", artifact, version, clf, extension),
        None => format!("{}-{}.{}", artifact, version, extension),
    };

    Some(format!("{}/{}/{}/{}", group, artifact, version, filename))
}

/// Read a previously persisted descriptor for `version_id`
pub async fn load_descriptor(dirs: &GameDirs, version_id: &str) -> Result<VersionDescriptor> {
    let path = dirs.descriptor_path(version_id);
    load_descriptor_from(&path, version_id).await
}

pub async fn load_descriptor_from(path: &Path, version_id: &str) -> Result<VersionDescriptor> {
    let unreadable = |message: String| Error::DescriptorUnreadable {
        version: version_id.to_string(),
        path: path.to_path_buf(),
        message,
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;

    VersionDescriptor::from_json(&content, &path.to_string_lossy())
        .map_err(|e| unreadable(e.to_string()))
}
