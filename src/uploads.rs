//! Placement of admin-uploaded images on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::AppResult;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Public URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/static/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRejection {
    MissingFile,
    UnsupportedType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Stored {
        file_name: String,
        public_path: String,
    },
    Rejected(UploadRejection),
}

/// Lowercased extension of `filename` when it is on the image whitelist.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Reduce a client-supplied filename to a safe ASCII name with no path parts.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Stored name for an upload, or `None` when the type is not accepted.
pub fn normalized_name(filename: &str) -> Option<String> {
    let ext = allowed_extension(filename)?;
    let secured = secure_filename(filename);
    match secured.rsplit_once('.') {
        Some((stem, secured_ext)) if !stem.is_empty() && secured_ext.eq_ignore_ascii_case(&ext) => {
            Some(secured)
        }
        _ => Some(format!("upload.{}", ext)),
    }
}

/// `cup.png` → `cup_<n>.png`
fn numbered(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, n, ext),
        None => format!("{}_{}", name, n),
    }
}

/// Write `data` into `dir` under a name nobody else holds.
///
/// Files are created exclusively, so two uploads racing for the same name
/// end up with distinct suffixes instead of overwriting each other.
pub async fn write_unique(dir: &Path, name: &str, data: &[u8]) -> AppResult<(String, PathBuf)> {
    tokio::fs::create_dir_all(dir).await?;

    let mut candidate = name.to_string();
    let mut counter = 1;
    loop {
        let path = dir.join(&candidate);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                file.write_all(data).await?;
                file.flush().await?;
                return Ok((candidate, path));
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                candidate = numbered(name, counter);
                counter += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Validate and store one uploaded image.
pub async fn store_image(dir: &Path, filename: Option<&str>, data: &[u8]) -> AppResult<UploadOutcome> {
    let Some(filename) = filename.map(str::trim).filter(|f| !f.is_empty()) else {
        return Ok(UploadOutcome::Rejected(UploadRejection::MissingFile));
    };
    let Some(name) = normalized_name(filename) else {
        tracing::info!("Rejected upload with unsupported type: {}", filename);
        return Ok(UploadOutcome::Rejected(UploadRejection::UnsupportedType));
    };

    let (file_name, path) = write_unique(dir, &name, data).await?;
    tracing::info!("Stored upload {} ({} bytes)", path.display(), data.len());

    Ok(UploadOutcome::Stored {
        public_path: format!("{}/{}", PUBLIC_PREFIX, file_name),
        file_name,
    })
}
