/// Host platform description shared by rule evaluation, resolution and planning
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system families that descriptors distinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Windows,
    Linux,
    #[serde(rename = "osx", alias = "macos")]
    MacOS,
}

impl OsFamily {
    /// Detect the current OS
    pub fn current() -> Self {
        #[cfg(target_os = "windows")]
        return OsFamily::Windows;

        #[cfg(target_os = "macos")]
        return OsFamily::MacOS;

        #[cfg(target_os = "linux")]
        return OsFamily::Linux;

        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        compile_error!("Unsupported operating system");
    }

    /// Get the OS name as a string (for rule matching and native maps)
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::Linux => "linux",
            OsFamily::MacOS => "osx",
        }
    }

    /// Parse a descriptor OS name. Both "osx" and "macos" mean macOS.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "windows" => Some(OsFamily::Windows),
            "linux" => Some(OsFamily::Linux),
            "osx" | "macos" => Some(OsFamily::MacOS),
            _ => None,
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        OsFamily::from_name(name) == Some(*self)
    }

    /// Get the classpath separator for this OS
    pub fn classpath_separator(&self) -> &'static str {
        match self {
            OsFamily::Windows => ";",
            _ => ":",
        }
    }

    pub fn java_binary_name(&self) -> &'static str {
        match self {
            OsFamily::Windows => "java.exe",
            _ => "java",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The platform a version is resolved and launched for.
///
/// Computed once with [`PlatformDescriptor::current`] and passed explicitly to
/// everything that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub os: OsFamily,
    pub arch: String,
}

impl PlatformDescriptor {
    pub fn new(os: OsFamily, arch: impl Into<String>) -> Self {
        Self {
            os,
            arch: arch.into(),
        }
    }

    pub fn current() -> Self {
        Self::new(OsFamily::current(), std::env::consts::ARCH)
    }

    /// Pointer width used for `${arch}` in native classifiers
    pub fn arch_bits(&self) -> &'static str {
        match normalize_arch(&self.arch).as_str() {
            "x86" | "arm" => "32",
            _ => "64",
        }
    }

    /// Compare a rule's `os.arch` against this platform
    pub fn matches_arch(&self, arch: &str) -> bool {
        normalize_arch(arch) == normalize_arch(&self.arch)
    }

    pub fn classpath_separator(&self) -> &'static str {
        self.os.classpath_separator()
    }
}

fn normalize_arch(arch: &str) -> String {
    match arch.to_lowercase().as_str() {
        "x86" | "i386" | "i586" | "i686" => "x86".to_string(),
        "x86_64" | "amd64" | "x64" => "x86_64".to_string(),
        "aarch64" | "arm64" => "aarch64".to_string(),
        "arm" | "armv7" | "armv7l" | "arm32" => "arm".to_string(),
        other => other.to_string(),
    }
}
