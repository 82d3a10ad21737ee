use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

fn should_exclude(entry_name: &str, exclusions: &[String]) -> bool {
    exclusions
        .iter()
        .any(|prefix| entry_name.starts_with(prefix.as_str()))
}

/// Blocking half of `ArtifactStore::extract_archive`
pub(super) fn extract_into(archive: &Path, dest: &Path, exclude: &[String]) -> Result<usize> {
    let failure = |message: String| Error::ExtractionFailure {
        artifact: archive.display().to_string(),
        message,
    };

    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;

    // Scratch space on the same filesystem so the final moves are renames
    let staging = tempfile::Builder::new()
        .prefix(".extract-")
        .tempdir_in(dest)
        .map_err(|e| Error::io(dest, e))?;

    let file = fs::File::open(archive).map_err(|e| Error::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| failure(e.to_string()))?;

    let mut extracted: Vec<PathBuf> = Vec::new();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| failure(e.to_string()))?;

        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if should_exclude(&name, exclude) {
            continue;
        }

        let relative = entry
            .enclosed_name()
            .ok_or_else(|| failure(format!("entry {} escapes the destination", name)))?;

        let out_path = staging.path().join(&relative);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let mut out = fs::File::create(&out_path).map_err(|e| Error::io(&out_path, e))?;
        std::io::copy(&mut entry, &mut out)
            .map_err(|e| failure(format!("{}: {}", name, e)))?;

        extracted.push(relative);
    }

    for relative in &extracted {
        let from = staging.path().join(relative);
        let to = dest.join(relative);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::rename(&from, &to).map_err(|e| Error::io(&to, e))?;
    }

    Ok(extracted.len())
}
