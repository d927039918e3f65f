//! Loading image files from disk for staging.

use std::path::{Path, PathBuf};

use anyhow::Context;

use folio_core::domain::{ImageFile, RejectedFile, RejectionReason};

/// One path given on the command line, read or already ruled out.
#[derive(Debug)]
pub enum Picked {
    Loaded(ImageFile),
    Skipped(RejectedFile),
}

/// Read every path into an [`ImageFile`], in the order given.
///
/// Files over `max_bytes` are skipped by their reported size and never read.
pub async fn load_images(paths: &[PathBuf], max_bytes: usize) -> anyhow::Result<Vec<Picked>> {
    let mut picked = Vec::with_capacity(paths.len());
    for path in paths {
        let file_name = file_name(path);
        let size = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?
            .len();
        let size = usize::try_from(size).unwrap_or(usize::MAX);
        if size > max_bytes {
            picked.push(Picked::Skipped(RejectedFile {
                file_name,
                reason: RejectionReason::TooLarge {
                    size,
                    limit: max_bytes,
                },
            }));
            continue;
        }

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        picked.push(Picked::Loaded(ImageFile::new(file_name, bytes)));
    }
    Ok(picked)
}

/// Files worth staging, and the ones already skipped.
pub fn split(picked: Vec<Picked>) -> (Vec<ImageFile>, Vec<RejectedFile>) {
    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for entry in picked {
        match entry {
            Picked::Loaded(file) => files.push(file),
            Picked::Skipped(file) => skipped.push(file),
        }
    }
    (files, skipped)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Tell the user which files were left out of a batch.
pub fn report_rejections(rejected: &[RejectedFile]) {
    for file in rejected {
        tracing::warn!(file = %file.file_name, reason = %file.reason, "File not staged");
        eprintln!("Skipped {}: {}", file.file_name, file.reason);
    }
}
