pub mod client;
pub mod descriptor;
pub mod index;

pub use client::{build_http_client, ManifestClient};
pub use descriptor::{
    load_descriptor, maven_to_path, Argument, ArgumentValue, LibraryEntry, VersionDescriptor,
};
pub use index::{VersionCategories, VersionCategory, VersionIndex, VersionSummary};
