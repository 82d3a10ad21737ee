//! Turns a version id into a complete, verified on-disk layout.
//!
//! Steps run in order and each one is a hard gate: index lookup, descriptor
//! fetch and persist, client jar, libraries and native archives (concurrently),
//! then native extraction. The first failure aborts the run.

use crate::config::{GameDirs, HearthConfig};
use crate::error::{Error, Result};
use crate::game::manifest::{
    build_http_client, LibraryEntry, ManifestClient, VersionDescriptor, VersionIndex,
};
use crate::game::platform::PlatformDescriptor;
use crate::game::progress::{ProgressReporter, SilentProgressReporter};
use crate::game::store::{ArtifactRef, ArtifactStore};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Local paths for one resolved version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    pub version_id: String,
    pub version_dir: PathBuf,
    pub client_jar_path: PathBuf,
    pub natives_dir: PathBuf,
    /// Library jars in descriptor order, without the client jar
    pub classpath_entries: Vec<PathBuf>,
}

impl ResolvedLayout {
    /// Derive the layout for `descriptor` without touching the disk.
    ///
    /// Only applicable libraries with a main artifact contribute, once each,
    /// in descriptor order.
    pub fn from_descriptor(
        dirs: &GameDirs,
        descriptor: &VersionDescriptor,
        platform: &PlatformDescriptor,
    ) -> Self {
        let mut seen = HashSet::new();
        let classpath_entries = descriptor
            .libraries
            .iter()
            .filter(|lib| lib.is_applicable(platform))
            .filter_map(|lib| lib.artifact.as_ref())
            .filter(|artifact| seen.insert(artifact.local_path.clone()))
            .map(|artifact| dirs.root().join(&artifact.local_path))
            .collect();

        Self {
            version_id: descriptor.id.clone(),
            version_dir: dirs.version_dir(&descriptor.id),
            client_jar_path: dirs.root().join(&descriptor.client.local_path),
            natives_dir: dirs.natives_dir(&descriptor.id),
            classpath_entries,
        }
    }
}

/// Native archive scheduled for extraction
struct NativeJob<'a> {
    library: &'a LibraryEntry,
    archive: ArtifactRef,
}

pub struct ResolutionEngine {
    manifest: ManifestClient,
    store: ArtifactStore,
    dirs: GameDirs,
    platform: PlatformDescriptor,
    concurrency: usize,
}

impl ResolutionEngine {
    pub fn new(
        manifest: ManifestClient,
        store: ArtifactStore,
        dirs: GameDirs,
        platform: PlatformDescriptor,
        concurrency: usize,
    ) -> Self {
        Self {
            manifest,
            store,
            dirs,
            platform,
            concurrency: concurrency.max(1),
        }
    }

    /// Engine sharing one HTTP client between manifest fetches and downloads
    pub fn from_config(config: &HearthConfig, platform: PlatformDescriptor) -> Result<Self> {
        let client = build_http_client(config)?;
        Ok(Self::new(
            ManifestClient::new(client.clone(), config.index_url.clone()),
            ArtifactStore::new(client, config.root_dir.clone()),
            config.dirs(),
            platform,
            config.effective_concurrency(),
        ))
    }

    pub fn manifest(&self) -> &ManifestClient {
        &self.manifest
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn dirs(&self) -> &GameDirs {
        &self.dirs
    }

    pub fn platform(&self) -> &PlatformDescriptor {
        &self.platform
    }

    pub async fn resolve(&self, version_id: &str) -> Result<ResolvedLayout> {
        self.resolve_with(version_id, &SilentProgressReporter).await
    }

    /// Resolve with progress reporting and cooperative cancellation.
    ///
    /// Resolutions of the same version must not overlap; the caller serializes them.
    pub async fn resolve_with(
        &self,
        version_id: &str,
        reporter: &dyn ProgressReporter,
    ) -> Result<ResolvedLayout> {
        reporter.start_step("Fetching version index", None);
        let result = match self.manifest.fetch_index().await {
            Ok(index) => self.run(&index, version_id, reporter).await,
            Err(e) => Err(e),
        };
        finish(reporter, version_id, result)
    }

    /// Resolve against an index the caller already holds
    pub async fn resolve_in(
        &self,
        index: &VersionIndex,
        version_id: &str,
        reporter: &dyn ProgressReporter,
    ) -> Result<ResolvedLayout> {
        let result = self.run(index, version_id, reporter).await;
        finish(reporter, version_id, result)
    }

    async fn run(
        &self,
        index: &VersionIndex,
        version_id: &str,
        reporter: &dyn ProgressReporter,
    ) -> Result<ResolvedLayout> {
        let summary = index.require(version_id)?;

        check_cancelled(reporter, version_id)?;
        reporter.start_step("Fetching version descriptor", None);
        let descriptor = self
            .fetch_and_persist(version_id, &summary.descriptor_url)
            .await?;

        check_cancelled(reporter, &descriptor.client.name)?;
        reporter.start_step("Downloading client", None);
        self.store.ensure(&descriptor.client).await?;

        let applicable: Vec<&LibraryEntry> = descriptor
            .libraries
            .iter()
            .filter(|lib| {
                let keep = lib.is_applicable(&self.platform);
                if !keep {
                    log::debug!("Skipping library {} on {}", lib.name, self.platform.os);
                }
                keep
            })
            .collect();

        let natives = self.native_jobs(&descriptor.id, &applicable);

        let downloads: Vec<ArtifactRef> = applicable
            .iter()
            .filter_map(|lib| lib.artifact.clone())
            .chain(natives.iter().map(|job| job.archive.clone()))
            .collect();

        reporter.start_step("Downloading libraries", None);
        self.download_all(downloads, reporter).await?;

        reporter.start_step("Extracting natives", Some(natives.len() as u32));
        self.extract_natives(&descriptor.id, &natives, reporter)
            .await?;

        let layout = ResolvedLayout::from_descriptor(&self.dirs, &descriptor, &self.platform);
        log::info!(
            "Resolved {}: {} classpath entries, {} native archives",
            version_id,
            layout.classpath_entries.len(),
            natives.len()
        );
        Ok(layout)
    }

    /// Fetch the descriptor, then write the exact bytes received to disk.
    /// A descriptor that does not parse is never persisted.
    async fn fetch_and_persist(&self, version_id: &str, url: &str) -> Result<VersionDescriptor> {
        let text = self.manifest.fetch_descriptor_text(url).await?;
        let descriptor = VersionDescriptor::from_json(&text, url)?;

        let path = self.dirs.descriptor_path(version_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }
        tokio::fs::write(&path, text.as_bytes())
            .await
            .map_err(|e| Error::io(&path, e))?;

        log::debug!("Persisted descriptor for {} at {:?}", version_id, path);
        Ok(descriptor)
    }

    /// Native archives for this platform, staged under the version directory.
    /// One job per staged path, in descriptor order.
    fn native_jobs<'a>(
        &self,
        version_id: &str,
        libraries: &[&'a LibraryEntry],
    ) -> Vec<NativeJob<'a>> {
        // Relative layout so staged paths stay relative to the store root
        let relative = GameDirs::new(PathBuf::new());
        let staging = relative.native_staging_dir(version_id);
        let libraries_dir = relative.libraries_dir();
        let mut seen = HashSet::new();

        libraries
            .iter()
            .filter_map(|&lib| {
                let native = lib.native_artifact(&self.platform)?;
                // Keep the maven layout so equal file names from different libraries stay apart
                let within = native
                    .local_path
                    .strip_prefix(&libraries_dir)
                    .unwrap_or(&native.local_path)
                    .to_path_buf();
                let archive = native.relocated(staging.join(within));

                seen.insert(archive.local_path.clone())
                    .then_some(NativeJob { library: lib, archive })
            })
            .collect()
    }

    /// Fetch every artifact on a bounded pool.
    ///
    /// Artifacts are unique by local path before anything starts. The first
    /// error drops the stream, which cancels whatever is still in flight.
    async fn download_all(
        &self,
        artifacts: Vec<ArtifactRef>,
        reporter: &dyn ProgressReporter,
    ) -> Result<()> {
        let mut seen_paths = HashSet::new();
        let unique: Vec<ArtifactRef> = artifacts
            .into_iter()
            .filter(|a| seen_paths.insert(a.local_path.clone()))
            .collect();

        let total = unique.len();
        if total == 0 {
            return Ok(());
        }

        let completed = AtomicUsize::new(0);
        reporter.set_step_count(0, Some(total as u32));

        stream::iter(unique)
            .map(|artifact| {
                let completed = &completed;
                async move {
                    check_cancelled(reporter, &artifact.name)?;

                    self.store.ensure(&artifact).await?;

                    let count = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    reporter.set_step_count(count as u32, Some(total as u32));
                    if count % 10 == 0 || count == total {
                        log::info!("Artifact progress: {}/{}", count, total);
                    }
                    Ok::<(), Error>(())
                }
            })
            .buffer_unordered(self.concurrency)
            .try_collect::<Vec<()>>()
            .await?;

        Ok(())
    }

    /// Rebuild the natives directory from scratch, extracting sequentially in
    /// descriptor order so overlapping file names resolve the same way every run.
    async fn extract_natives(
        &self,
        version_id: &str,
        jobs: &[NativeJob<'_>],
        reporter: &dyn ProgressReporter,
    ) -> Result<()> {
        let natives_dir = self.dirs.natives_dir(version_id);

        if tokio::fs::try_exists(&natives_dir).await.unwrap_or(false) {
            log::warn!("Removing stale natives at {:?}", natives_dir);
            tokio::fs::remove_dir_all(&natives_dir)
                .await
                .map_err(|e| Error::io(&natives_dir, e))?;
        }
        tokio::fs::create_dir_all(&natives_dir)
            .await
            .map_err(|e| Error::io(&natives_dir, e))?;

        for (i, job) in jobs.iter().enumerate() {
            check_cancelled(reporter, &job.library.name)?;

            let archive = self.store.target_path(&job.archive);
            self.store
                .extract_archive(&archive, &natives_dir, &job.library.extract_exclude)
                .await
                .map_err(|e| match e {
                    Error::ExtractionFailure { message, .. } => Error::ExtractionFailure {
                        artifact: job.library.name.clone(),
                        message,
                    },
                    other => other,
                })?;

            reporter.set_step_count((i + 1) as u32, Some(jobs.len() as u32));
        }

        remove_staging(&self.dirs.native_staging_dir(version_id)).await;
        Ok(())
    }
}

fn check_cancelled(reporter: &dyn ProgressReporter, what: &str) -> Result<()> {
    if reporter.is_cancelled() {
        log::warn!("Resolution cancelled before {}", what);
        return Err(Error::Cancelled(what.to_string()));
    }
    Ok(())
}

fn finish(
    reporter: &dyn ProgressReporter,
    version_id: &str,
    result: Result<ResolvedLayout>,
) -> Result<ResolvedLayout> {
    match &result {
        Ok(_) => reporter.done(true, None),
        Err(e) => {
            log::error!("Resolution of {} failed: {}", version_id, e);
            reporter.done(false, Some(&e.to_string()));
        }
    }
    result
}

async fn remove_staging(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::debug!("Could not remove native staging dir {:?}: {}", dir, e);
        }
    }
}
