// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Archive transfer engine
//!
//! Download side: fetch a code package from its signed URL and extract it
//! into a fresh, uniquely-named temp directory (one per call, never reused).
//! Upload side: walk a working directory and build a deterministic zip in
//! memory. Every directory gets a trailing `"<rel>/."` entry so empty
//! directories survive the round trip; files matching the exclusion patterns
//! are skipped.

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::binding::BINDING_FILENAME;
use crate::error::{Result, SyncError};

pub struct ArchiveEngine {
    patterns: Vec<Pattern>,
    http: reqwest::blocking::Client,
}

impl ArchiveEngine {
    /// Invalid exclusion patterns are skipped with a warning rather than
    /// failing the whole engine.
    pub fn new(exclude: &[String]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(exclude.len());
        for raw in exclude {
            match Pattern::new(raw) {
                Ok(p) => patterns.push(p),
                Err(e) => log::warn!("Ignoring invalid exclude pattern '{}': {}", raw, e),
            }
        }

        Ok(Self {
            patterns,
            http: crate::catalog::build_http_client(&Default::default())?,
        })
    }

    /// Download the archive at `url` and extract it into a fresh temp
    /// directory. Corruption fails the whole call; the partial directory is
    /// removed so nothing looks successful.
    pub fn fetch_and_extract(&self, url: &str) -> Result<PathBuf> {
        let response = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|source| SyncError::Network {
                url: url.to_string(),
                source,
            })?;
        let bytes = response.bytes().map_err(|source| SyncError::Network {
            url: url.to_string(),
            source,
        })?;

        self.extract_to_temp(&bytes)
    }

    /// Extract archive bytes into a new uniquely-named temp directory.
    pub fn extract_to_temp(&self, bytes: &[u8]) -> Result<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix("lamsync-")
            .tempdir()?
            .into_path();

        if let Err(e) = extract_archive(bytes, &dir) {
            let _ = std::fs::remove_dir_all(&dir);
            return Err(e);
        }
        Ok(dir)
    }

    /// Build an in-memory zip of `root`. Deterministic for an unchanged
    /// tree: sorted traversal, fixed entry timestamps. Only a fully built
    /// buffer is ever returned.
    pub fn build_archive(&self, root: &Path) -> Result<Vec<u8>> {
        if !root.is_dir() {
            return Err(SyncError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {}", root.display()),
            )));
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.path() == root || !self.is_excluded(root, e.path()));

        for entry in walker {
            let entry = entry.map_err(|e| {
                SyncError::Io(std::io::Error::other(format!(
                    "Walk failed under {}: {}",
                    root.display(),
                    e
                )))
            })?;
            let rel = entry
                .path()
                .strip_prefix(root)
                .expect("walkdir yields paths under root");
            let rel_name = slash_path(rel);

            if entry.file_type().is_dir() {
                // Trailing "." marker keeps empty directories in the archive.
                let marker = if rel_name.is_empty() {
                    ".".to_string()
                } else {
                    format!("{}/.", rel_name)
                };
                writer.start_file(marker, options).map_err(zip_err)?;
            } else if entry.file_type().is_file() {
                writer.start_file(rel_name, options).map_err(zip_err)?;
                let contents = std::fs::read(entry.path())?;
                writer.write_all(&contents)?;
            }
            // Symlinks and other special files are not part of a code package.
        }

        let cursor = writer.finish().map_err(zip_err)?;
        Ok(cursor.into_inner())
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let rel = match path.strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => return false,
        };
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        // The binding record never travels with the code.
        if name == BINDING_FILENAME {
            return true;
        }

        let rel_name = slash_path(rel);
        self.patterns
            .iter()
            .any(|p| p.matches(name) || p.matches(&rel_name))
    }
}

/// Decompress archive bytes into `dir`. Any malformed or unsafe entry fails
/// the whole extraction.
pub fn extract_archive(bytes: &[u8], dir: &Path) -> Result<()> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SyncError::CorruptArchive(e.to_string()))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| SyncError::CorruptArchive(e.to_string()))?;
        let name = file.name().to_string();

        // Directory markers: "." at the root, "<rel>/." elsewhere, plus
        // conventional trailing-slash entries.
        if name == "." || name.ends_with("/.") || name.ends_with('/') {
            let trimmed = name.trim_end_matches('.').trim_end_matches('/');
            let rel = safe_relative(trimmed)
                .ok_or_else(|| SyncError::CorruptArchive(format!("Unsafe entry path: {}", name)))?;
            std::fs::create_dir_all(dir.join(rel))?;
            continue;
        }

        let rel = safe_relative(&name)
            .ok_or_else(|| SyncError::CorruptArchive(format!("Unsafe entry path: {}", name)))?;
        let target = dir.join(rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        std::io::copy(&mut file, &mut out)
            .map_err(|e| SyncError::CorruptArchive(format!("Truncated entry {}: {}", name, e)))?;
    }

    Ok(())
}

/// Relative path with forward-slash separators, as stored in the archive.
fn slash_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Reject entry names that would escape the extraction root.
fn safe_relative(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

fn zip_err(e: zip::result::ZipError) -> SyncError {
    match e {
        zip::result::ZipError::Io(io) => SyncError::Io(io),
        other => SyncError::Io(std::io::Error::other(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_relative_rejects_traversal() {
        assert!(safe_relative("../evil").is_none());
        assert!(safe_relative("/abs/path").is_none());
        assert_eq!(safe_relative("a/./b").unwrap(), PathBuf::from("a/b"));
    }

    #[test]
    fn slash_path_joins_components() {
        assert_eq!(slash_path(Path::new("a/b/c.txt")), "a/b/c.txt");
        assert_eq!(slash_path(Path::new("")), "");
    }

    #[test]
    fn garbage_bytes_are_a_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_archive(b"this is not a zip", dir.path()).unwrap_err();
        assert!(matches!(err, SyncError::CorruptArchive(_)));
    }
}
