//! Java runtime collaborator.
//!
//! The planner only asks two questions: is a runtime of at least a given major
//! version available, and where is its executable. Provisioning runtimes is
//! somebody else's job.

use crate::error::{Error, Result};
use crate::game::platform::OsFamily;
use crate::utils::process::LauncherCommandExt;
use std::path::{Path, PathBuf};

/// Runtime used when a descriptor does not state a Java requirement
pub const DEFAULT_JAVA_MAJOR: u32 = 8;

pub trait JavaRuntime: Send + Sync {
    fn is_available(&self, min_major: u32) -> bool;

    fn resolved_executable_path(&self) -> Option<PathBuf>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedJava {
    pub path: PathBuf,
    pub major_version: u32,
    pub is_64bit: bool,
}

/// Verify a Java path and return information about it
pub fn verify_java(path: &Path) -> Result<DetectedJava> {
    if !path.exists() {
        return Err(Error::RuntimeUnavailable(format!("Java path does not exist: {:?}", path)));
    }

    // java -version writes to stderr
    let output = std::process::Command::new(path)
        .arg("-version")
        .as_helper()
        .output()
        .map_err(|e| Error::RuntimeUnavailable(format!("failed to run {:?}: {}", path, e)))?;

    let version_str = String::from_utf8_lossy(&output.stderr);

    let major_version = parse_major_version(&version_str).ok_or_else(|| {
        Error::RuntimeUnavailable(format!(
            "could not parse Java version from: {}",
            version_str.trim()
        ))
    })?;

    let is_64bit = version_str.contains("64-Bit")
        || version_str.contains("x86_64")
        || version_str.contains("amd64");

    Ok(DetectedJava {
        path: path.to_path_buf(),
        major_version,
        is_64bit,
    })
}

/// Major version from `java -version` output. "1.8.0_311" is 8.
pub fn parse_major_version(version_output: &str) -> Option<u32> {
    let re = regex::Regex::new(r"version\s+?.\s*?(\d+)(\.(\d+))?").ok()?;
    let caps = re.captures(version_output)?;
    let major = caps.get(1)?.as_str().parse::<u32>().ok()?;
    if major == 1 {
        return caps.get(3)?.as_str().parse::<u32>().ok();
    }
    Some(major)
}

/// Java found on this machine, via an explicit path, `PATH` or `JAVA_HOME`
#[derive(Debug, Clone)]
pub struct HostJava {
    detected: Option<DetectedJava>,
}

impl HostJava {
    pub fn detect() -> Self {
        let detected = find_host_java().and_then(|path| match verify_java(&path) {
            Ok(java) => {
                log::info!("Detected Java {} at {:?}", java.major_version, java.path);
                Some(java)
            }
            Err(e) => {
                log::warn!("Ignoring unusable Java at {:?}: {}", path, e);
                None
            }
        });

        if detected.is_none() {
            log::warn!("No usable Java runtime found on this machine");
        }
        Self { detected }
    }

    /// Use a specific executable
    pub fn at(path: &Path) -> Result<Self> {
        Ok(Self {
            detected: Some(verify_java(path)?),
        })
    }

    pub fn detected(&self) -> Option<&DetectedJava> {
        self.detected.as_ref()
    }
}

impl JavaRuntime for HostJava {
    fn is_available(&self, min_major: u32) -> bool {
        self.detected
            .as_ref()
            .is_some_and(|java| java.major_version >= min_major)
    }

    fn resolved_executable_path(&self) -> Option<PathBuf> {
        self.detected.as_ref().map(|java| java.path.clone())
    }
}

fn find_host_java() -> Option<PathBuf> {
    if let Ok(path) = which::which("java") {
        return Some(path);
    }

    let home = std::env::var_os("JAVA_HOME")?;
    let candidate = PathBuf::from(home)
        .join("bin")
        .join(OsFamily::current().java_binary_name());
    candidate.exists().then_some(candidate)
}
