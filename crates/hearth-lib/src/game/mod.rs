pub mod java;
pub mod launcher;
pub mod manifest;
pub mod platform;
pub mod progress;
pub mod resolver;
pub mod rules;
pub mod store;

// Re-export commonly used types
pub use java::{HostJava, JavaRuntime};
pub use launcher::{DetachedSpawner, LaunchOptions, LaunchPlan, LaunchPlanner, ProcessSpawner};
pub use manifest::{ManifestClient, VersionDescriptor, VersionIndex, VersionSummary};
pub use platform::{OsFamily, PlatformDescriptor};
pub use progress::{
    CancelHandle, CancelToken, ChannelProgressReporter, ProgressEvent, ProgressReporter,
    SilentProgressReporter,
};
pub use resolver::{ResolutionEngine, ResolvedLayout};
pub use store::{ArtifactRef, ArtifactStore};
