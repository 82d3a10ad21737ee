use crate::game::platform::PlatformDescriptor;
use crate::game::resolver::ResolvedLayout;
use std::path::PathBuf;

/// Library jars in layout order, then the client jar
pub fn classpath_entries(layout: &ResolvedLayout) -> Vec<PathBuf> {
    let mut entries = layout.classpath_entries.clone();
    entries.push(layout.client_jar_path.clone());
    entries
}

/// Join the classpath with the platform separator
pub fn build_classpath(layout: &ResolvedLayout, platform: &PlatformDescriptor) -> String {
    classpath_entries(layout)
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(platform.classpath_separator())
}
