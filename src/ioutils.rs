use std::fs::Permissions;
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Checks that the destination is usable as an output root.
///
/// A missing or existing directory is accepted; anything else is not.
pub fn validate_output_dir<P: AsRef<Path>>(output_dir: P) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(Error::OutputDirectoryInvalid {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

pub fn create_dir_all<P: AsRef<Path>>(dest_path: P) -> Result<()> {
    std::fs::create_dir_all(dest_path.as_ref()).map_err(Error::IoError)
}

/// Writes `content` to `dest_path` through a temporary file in the same
/// directory, so the destination is either untouched or fully written.
pub fn atomic_write<P: AsRef<Path>>(
    content: &[u8],
    dest_path: P,
    permissions: Option<Permissions>,
) -> Result<()> {
    let dest_path = dest_path.as_ref();
    let parent = match dest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.flush()?;
    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.persist(dest_path)?;
    Ok(())
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Parses a JSON object, as supplied through `--answers`.
pub fn parse_string_to_json(buf: &str) -> Result<serde_json::Map<String, serde_json::Value>> {
    if buf.trim().is_empty() {
        return Ok(serde_json::Map::new());
    }
    match serde_json::from_str(buf)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(Error::Other(anyhow::anyhow!(
            "Expected a JSON object of answers, got: {other}"
        ))),
    }
}

pub fn read_from(mut reader: impl std::io::Read) -> Result<String> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf).map_err(Error::IoError)?;
    Ok(buf)
}
