//! Local artifact cache keyed by path relative to the data root.
//!
//! A file at its target path is either absent or passes its SHA-1 check.
//! Downloads land in a temp file next to the target and are only renamed
//! into place after verification, so an interrupted or corrupt fetch never
//! leaves anything behind that a later run would trust.

mod extract;

use crate::config::HearthConfig;
use crate::error::{Error, Result};
use crate::game::manifest::build_http_client;
use crate::utils::hash::{digest_matches, sha1_file};
use futures::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// A remote file with its expected checksum and cache location.
///
/// Identity is `local_path`: two refs with the same path are the same artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    /// Human-readable name used in logs and errors (usually Maven coordinates)
    pub name: String,
    pub url: String,
    /// Relative to the store root
    pub local_path: PathBuf,
    pub sha1: String,
}

impl ArtifactRef {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        local_path: impl Into<PathBuf>,
        sha1: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            local_path: local_path.into(),
            sha1: sha1.into(),
        }
    }

    /// Same remote file cached somewhere else
    pub fn relocated(&self, local_path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: local_path.into(),
            ..self.clone()
        }
    }
}

#[derive(Clone)]
pub struct ArtifactStore {
    client: Client,
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(client: Client, root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            root: root.into(),
        }
    }

    pub fn from_config(config: &HearthConfig) -> Result<Self> {
        Ok(Self::new(build_http_client(config)?, config.root_dir.clone()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute cache location of `artifact`
    pub fn target_path(&self, artifact: &ArtifactRef) -> PathBuf {
        self.root.join(&artifact.local_path)
    }

    /// Whether the cached file exists and matches its checksum
    pub async fn is_valid(&self, artifact: &ArtifactRef) -> bool {
        let path = self.target_path(artifact);
        match sha1_file(&path).await {
            Ok(actual) => digest_matches(&actual, &artifact.sha1),
            Err(_) => false,
        }
    }

    /// Make sure `artifact` is present and verified, downloading if needed.
    ///
    /// Idempotent: a valid cached file is returned without any network access.
    /// On checksum mismatch nothing is left at the target path and
    /// `ArtifactCorrupt` is returned.
    pub async fn ensure(&self, artifact: &ArtifactRef) -> Result<PathBuf> {
        let target = self.target_path(artifact);

        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            match sha1_file(&target).await {
                Ok(actual) if digest_matches(&actual, &artifact.sha1) => {
                    log::debug!("Cache hit: {} ({:?})", artifact.name, target);
                    return Ok(target);
                }
                Ok(actual) => log::info!(
                    "Cached {} fails verification ({} != {}), re-downloading",
                    artifact.name,
                    actual,
                    artifact.sha1
                ),
                Err(e) => log::warn!("Failed to read cached {:?}: {}, re-downloading", target, e),
            }

            tokio::fs::remove_file(&target)
                .await
                .map_err(|e| Error::io(&target, e))?;
        }

        let parent = target.parent().unwrap_or(&self.root).to_path_buf();
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| Error::io(&parent, e))?;

        self.download_verified(artifact, &parent, &target).await?;
        Ok(target)
    }

    async fn download_verified(
        &self,
        artifact: &ArtifactRef,
        parent: &Path,
        target: &Path,
    ) -> Result<()> {
        log::debug!("Downloading: {} -> {:?}", artifact.url, target);

        let response = self
            .client
            .get(&artifact.url)
            .send()
            .await
            .map_err(|e| Error::transport(&artifact.url, e))?;

        if !response.status().is_success() {
            return Err(Error::NetworkFailure {
                target: artifact.url.clone(),
                message: format!("HTTP {} for {}", response.status(), artifact.name),
            });
        }

        // The temp path deletes itself on drop, which covers every early return
        // below as well as a cancelled future.
        let (file, temp_path) = tempfile::Builder::new()
            .prefix(".download-")
            .tempfile_in(parent)
            .map_err(|e| Error::io(parent, e))?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);
        let mut hasher = Sha1::new();
        let mut written: u64 = 0;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::transport(&artifact.url, e))?;
            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io(&temp_path, e))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| Error::io(&temp_path, e))?;
        drop(file);

        let actual = format!("{:x}", hasher.finalize());
        if !digest_matches(&actual, &artifact.sha1) {
            log::warn!(
                "Checksum mismatch for {} from {}: expected {}, got {}",
                artifact.name,
                artifact.url,
                artifact.sha1,
                actual
            );
            return Err(Error::ArtifactCorrupt {
                artifact: artifact.name.clone(),
                expected: artifact.sha1.clone(),
                actual,
            });
        }

        temp_path
            .persist(target)
            .map_err(|e| Error::io(target, e.error))?;

        log::debug!("Download complete: {:?} ({} bytes)", target, written);
        Ok(())
    }

    /// Unpack a native archive into `dest_dir`, then delete the archive.
    ///
    /// Entries whose path starts with one of `exclude` are skipped. The archive
    /// is fully unpacked into a scratch directory before anything is moved into
    /// `dest_dir`, so a broken archive leaves earlier extractions untouched.
    /// Existing files with the same name are replaced.
    pub async fn extract_archive(
        &self,
        archive: &Path,
        dest_dir: &Path,
        exclude: &[String],
    ) -> Result<usize> {
        let archive_path = archive.to_path_buf();
        let dest = dest_dir.to_path_buf();
        let exclude = exclude.to_vec();

        let count = tokio::task::spawn_blocking(move || {
            extract::extract_into(&archive_path, &dest, &exclude)
        })
        .await
        .map_err(|e| Error::ExtractionFailure {
            artifact: archive.display().to_string(),
            message: e.to_string(),
        })??;

        tokio::fs::remove_file(archive)
            .await
            .map_err(|e| Error::io(archive, e))?;

        log::debug!("Extracted {} files from {:?} into {:?}", count, archive, dest_dir);
        Ok(count)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::utils::hash::sha1_hex;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let f = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(f);
        use zip::write::FileOptions;
        for (name, data) in entries {
            zip.start_file::<&str, ()>(name, FileOptions::default())
                .unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    fn store(root: &Path) -> ArtifactStore {
        ArtifactStore::new(Client::new(), root)
    }

    async fn serve(server: &MockServer, route: &str, body: &[u8], hits: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .expect(hits)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let server = MockServer::start().await;
        let body = b"library bytes";
        serve(&server, "/lib.jar", body, 1).await;

        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let artifact = ArtifactRef::new(
            "com.example:lib:1.0",
            format!("{}/lib.jar", server.uri()),
            "libraries/com/example/lib/1.0/lib-1.0.jar",
            sha1_hex(body),
        );

        let first = store.ensure(&artifact).await.unwrap();
        let second = store.ensure(&artifact).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), body);
        assert!(store.is_valid(&artifact).await);
    }

    #[tokio::test]
    async fn mismatch_leaves_nothing_behind() {
        let server = MockServer::start().await;
        serve(&server, "/client.jar", b"tampered", 1).await;

        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let artifact = ArtifactRef::new(
            "1.20 client",
            format!("{}/client.jar", server.uri()),
            "versions/1.20/1.20.jar",
            sha1_hex(b"genuine"),
        );

        match store.ensure(&artifact).await {
            Err(Error::ArtifactCorrupt {
                artifact: name,
                expected,
                actual,
            }) => {
                assert_eq!(name, "1.20 client");
                assert_eq!(expected, sha1_hex(b"genuine"));
                assert_eq!(actual, sha1_hex(b"tampered"));
            }
            other => panic!("expected ArtifactCorrupt, got {:?}", other),
        }

        let dir = tmp.path().join("versions/1.20");
        assert!(!dir.join("1.20.jar").exists());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn invalid_cached_file_is_replaced() {
        let server = MockServer::start().await;
        let body = b"fresh";
        serve(&server, "/a.jar", body, 1).await;

        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let artifact = ArtifactRef::new(
            "a",
            format!("{}/a.jar", server.uri()),
            "libraries/a.jar",
            sha1_hex(body),
        );

        let target = store.target_path(&artifact);
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"stale").unwrap();
        assert!(!store.is_valid(&artifact).await);

        store.ensure(&artifact).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), body);
    }

    #[tokio::test]
    async fn invalid_cached_file_removed_on_failed_refetch() {
        let server = MockServer::start().await;
        serve(&server, "/a.jar", b"still wrong", 1).await;

        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let artifact = ArtifactRef::new(
            "a",
            format!("{}/a.jar", server.uri()),
            "libraries/a.jar",
            sha1_hex(b"right"),
        );
        let target = store.target_path(&artifact);
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"stale").unwrap();

        assert!(store.ensure(&artifact).await.is_err());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn http_status_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let artifact = ArtifactRef::new(
            "missing",
            format!("{}/missing.jar", server.uri()),
            "libraries/missing.jar",
            "00",
        );
        let err = store(tmp.path()).ensure(&artifact).await.unwrap_err();
        assert!(matches!(err, Error::NetworkFailure { .. }));
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn extract_skips_excluded_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let natives = tmp.path().join("natives");
        std::fs::create_dir_all(&natives).unwrap();
        std::fs::write(natives.join("liblwjgl.so"), b"old").unwrap();

        let archive = tmp.path().join("natives-linux.jar");
        write_zip(
            &archive,
            &[
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
                ("liblwjgl.so", b"new"),
                ("sub/libopenal.so", b"al"),
            ],
        );

        let count = store
            .extract_archive(&archive, &natives, &["META-INF/".to_string()])
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert!(!archive.exists());
        assert_eq!(std::fs::read(natives.join("liblwjgl.so")).unwrap(), b"new");
        assert_eq!(std::fs::read(natives.join("sub/libopenal.so")).unwrap(), b"al");
        assert!(!natives.join("META-INF").exists());
    }

    #[tokio::test]
    async fn broken_archive_keeps_siblings() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let natives = tmp.path().join("natives");
        std::fs::create_dir_all(&natives).unwrap();
        std::fs::write(natives.join("glfw.dll"), b"ok").unwrap();

        let archive = tmp.path().join("broken.jar");
        std::fs::write(&archive, b"this is not a zip").unwrap();

        let err = store
            .extract_archive(&archive, &natives, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExtractionFailure { .. }));

        let names: Vec<_> = std::fs::read_dir(&natives)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("glfw.dll")]);
        assert_eq!(std::fs::read(natives.join("glfw.dll")).unwrap(), b"ok");
    }
}
