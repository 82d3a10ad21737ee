use super::arguments::{
    expand_template, has_library_path, split_legacy, strip_classpath_flag, substitute_variables,
    unexpanded_placeholders,
};
use super::classpath::build_classpath;
use super::identity::offline_uuid;
use crate::config::{GameDirs, HearthConfig, DEFAULT_MEMORY_GB, LAUNCHER_NAME, LAUNCHER_VERSION};
use crate::error::{Error, Result};
use crate::game::java::{JavaRuntime, DEFAULT_JAVA_MAJOR};
use crate::game::manifest::{load_descriptor, VersionDescriptor};
use crate::game::platform::{OsFamily, PlatformDescriptor};
use crate::game::resolver::ResolvedLayout;
use dunce::canonicalize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const ACCESS_TOKEN_SENTINEL: &str = "0";
const USER_TYPE_SENTINEL: &str = "legacy";
const DEFAULT_ASSET_INDEX: &str = "legacy";
const DEFAULT_VERSION_TYPE: &str = "release";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub username: String,
    pub memory_gb: u32,
}

impl LaunchOptions {
    pub fn new(username: impl Into<String>, memory_gb: u32) -> Self {
        Self {
            username: username.into(),
            memory_gb,
        }
    }
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self::new(super::identity::DEFAULT_USERNAME, DEFAULT_MEMORY_GB)
    }
}

/// Everything needed to start the game. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub executable: PathBuf,
    /// Arguments after the executable
    pub arguments: Vec<String>,
    /// The game directory
    pub working_dir: PathBuf,
}

impl LaunchPlan {
    /// Executable followed by every argument
    pub fn argument_vector(&self) -> Vec<String> {
        std::iter::once(self.executable.to_string_lossy().into_owned())
            .chain(self.arguments.iter().cloned())
            .collect()
    }
}

impl fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argument_vector().join(" "))
    }
}

/// Builds the launch command for a resolved version
pub struct LaunchPlanner {
    dirs: GameDirs,
    platform: PlatformDescriptor,
    java: Arc<dyn JavaRuntime>,
}

impl LaunchPlanner {
    pub fn new(dirs: GameDirs, platform: PlatformDescriptor, java: Arc<dyn JavaRuntime>) -> Self {
        Self {
            dirs,
            platform,
            java,
        }
    }

    pub fn from_config(
        config: &HearthConfig,
        platform: PlatformDescriptor,
        java: Arc<dyn JavaRuntime>,
    ) -> Self {
        Self::new(config.dirs(), platform, java)
    }

    /// Plan a version that is already on disk, reading its persisted descriptor
    pub async fn plan_version(
        &self,
        version_id: &str,
        options: &LaunchOptions,
    ) -> Result<LaunchPlan> {
        let descriptor = load_descriptor(&self.dirs, version_id).await?;
        let layout = ResolvedLayout::from_descriptor(&self.dirs, &descriptor, &self.platform);
        self.plan(&layout, &descriptor, options)
    }

    pub fn plan(
        &self,
        layout: &ResolvedLayout,
        descriptor: &VersionDescriptor,
        options: &LaunchOptions,
    ) -> Result<LaunchPlan> {
        let required = descriptor.java_major_version.unwrap_or(DEFAULT_JAVA_MAJOR);
        if !self.java.is_available(required) {
            return Err(Error::RuntimeUnavailable(format!(
                "Java {} or newer is required for {}",
                required, descriptor.id
            )));
        }
        let executable = self.java.resolved_executable_path().ok_or_else(|| {
            Error::RuntimeUnavailable(format!("no Java executable to launch {}", descriptor.id))
        })?;

        let classpath = build_classpath(layout, &self.platform);
        let variables = self.variables(layout, descriptor, options, &classpath);

        let mut jvm = descriptor
            .jvm_arguments
            .as_deref()
            .map(|t| expand_template(t, &self.platform))
            .unwrap_or_default();
        jvm = strip_classpath_flag(jvm);

        let first_thread = "-XstartOnFirstThread";
        if self.platform.os == OsFamily::MacOS && !jvm.iter().any(|a| a == first_thread) {
            jvm.push(first_thread.to_string());
        }
        if !has_library_path(&jvm) {
            jvm.push(format!("-Djava.library.path={}", display_path(&layout.natives_dir)));
        }

        let game = match &descriptor.game_arguments {
            Some(template) => expand_template(template, &self.platform),
            None => descriptor
                .legacy_arguments
                .as_deref()
                .map(split_legacy)
                .unwrap_or_default(),
        };

        let mut arguments = Vec::with_capacity(jvm.len() + game.len() + 4);
        arguments.push(format!("-Xmx{}G", options.memory_gb));
        arguments.extend(jvm.iter().map(|a| substitute_variables(a, &variables)));
        arguments.push("-cp".to_string());
        arguments.push(classpath);
        arguments.push(descriptor.main_class.clone());
        arguments.extend(game.iter().map(|a| substitute_variables(a, &variables)));

        let leftovers = unexpanded_placeholders(&arguments);
        if !leftovers.is_empty() {
            log::debug!("Unrecognized placeholders left in arguments: {:?}", leftovers);
        }

        log::info!(
            "Planned launch of {} for {} ({} arguments)",
            descriptor.id,
            options.username,
            arguments.len()
        );

        Ok(LaunchPlan {
            executable,
            arguments,
            working_dir: self.dirs.root().to_path_buf(),
        })
    }

    fn variables(
        &self,
        layout: &ResolvedLayout,
        descriptor: &VersionDescriptor,
        options: &LaunchOptions,
        classpath: &str,
    ) -> HashMap<String, String> {
        let root = self.dirs.root();
        let mut vars = HashMap::new();

        vars.insert("auth_player_name".to_string(), options.username.clone());
        vars.insert("version_name".to_string(), descriptor.id.clone());
        vars.insert("game_directory".to_string(), display_path(root));
        vars.insert("assets_root".to_string(), display_path(&self.dirs.assets_dir()));
        vars.insert(
            "assets_index_name".to_string(),
            descriptor
                .asset_index_id
                .clone()
                .unwrap_or_else(|| DEFAULT_ASSET_INDEX.to_string()),
        );
        vars.insert("auth_uuid".to_string(), offline_uuid(&options.username));
        vars.insert("auth_access_token".to_string(), ACCESS_TOKEN_SENTINEL.to_string());
        vars.insert("user_type".to_string(), USER_TYPE_SENTINEL.to_string());
        vars.insert(
            "version_type".to_string(),
            descriptor
                .kind
                .clone()
                .unwrap_or_else(|| DEFAULT_VERSION_TYPE.to_string()),
        );
        vars.insert("user_properties".to_string(), "{}".to_string());
        vars.insert("quickPlayRealms".to_string(), String::new());

        vars.insert("natives_directory".to_string(), display_path(&layout.natives_dir));
        vars.insert("launcher_name".to_string(), LAUNCHER_NAME.to_string());
        vars.insert("launcher_version".to_string(), LAUNCHER_VERSION.to_string());
        vars.insert("classpath".to_string(), classpath.to_string());
        vars.insert(
            "classpath_separator".to_string(),
            self.platform.classpath_separator().to_string(),
        );
        vars.insert(
            "library_directory".to_string(),
            display_path(&self.dirs.libraries_dir()),
        );

        vars
    }
}

/// Canonical form when the path exists, as given otherwise
fn display_path(path: &Path) -> String {
    canonicalize(path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string_lossy().to_string())
}
