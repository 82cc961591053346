use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::validate::FileDescriptor;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Extensions offered in the file picker.
pub static PICKER_EXTS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp"];

/// Declared content type for a file name, from its extension.
pub fn mime_for_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg" | "jpe") => "image/jpeg",
        Some("png") => "image/png",
        Some("bmp") => "image/bmp",
        Some("gif") => "image/gif",
        Some("tif" | "tiff") => "image/tiff",
        Some("webp") => "image/webp",
        _ => FALLBACK_MIME,
    }
}

#[derive(Clone, Debug)]
enum Origin {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

#[derive(Clone, Debug)]
/// A file the user picked or dropped, not yet read or validated.
pub struct Candidate {
    pub name: String,
    pub mime: String,
    pub size: u64,
    origin: Origin,
}

impl Candidate {
    /// Describes a file on disk without reading its contents.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if !meta.is_file() {
            anyhow::bail!("{} is not a file", path.display());
        }
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        Ok(Self {
            mime: mime_for_name(&name).to_string(),
            name,
            size: meta.len(),
            origin: Origin::Path(path.to_path_buf()),
        })
    }

    /// Wraps bytes handed over directly, e.g. by a drop without a path.
    /// An empty `mime` falls back to the extension of `name`.
    pub fn from_bytes(name: impl Into<String>, mime: &str, bytes: Arc<[u8]>) -> Self {
        let name = name.into();
        let mime = if mime.trim().is_empty() {
            mime_for_name(&name).to_string()
        } else {
            mime.trim().to_string()
        };
        Self {
            name,
            mime,
            size: bytes.len() as u64,
            origin: Origin::Memory(bytes),
        }
    }

    /// Builds a candidate from a file dropped onto the window.
    pub fn from_dropped(file: &egui::DroppedFile) -> anyhow::Result<Self> {
        if let Some(path) = file.path.as_deref() {
            return Self::from_path(path);
        }
        let bytes = file
            .bytes
            .clone()
            .ok_or_else(|| anyhow::anyhow!("dropped file has neither path nor contents"))?;
        let name = if file.name.is_empty() {
            "dropped_image".to_string()
        } else {
            file.name.clone()
        };
        Ok(Self::from_bytes(name, &file.mime, bytes))
    }

    pub fn descriptor(&self) -> FileDescriptor {
        FileDescriptor {
            size: self.size,
            mime: self.mime.clone(),
        }
    }

    /// Directory the candidate came from, if it lives on disk.
    pub fn parent_dir(&self) -> Option<&Path> {
        match &self.origin {
            Origin::Path(p) => p.parent(),
            Origin::Memory(_) => None,
        }
    }

    /// Reads the contents. Only call this after validation passed.
    pub fn load(self) -> anyhow::Result<SelectedFile> {
        let bytes: Arc<[u8]> = match self.origin {
            Origin::Memory(bytes) => bytes,
            Origin::Path(path) => std::fs::read(&path)
                .with_context(|| format!("cannot read {}", path.display()))?
                .into(),
        };
        if bytes.is_empty() {
            anyhow::bail!("Uploaded file is empty, please select a valid image file");
        }
        Ok(SelectedFile {
            name: self.name,
            mime: self.mime,
            bytes,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A validated upload held in memory until the next selection.
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn mime_follows_extension_case_insensitively() {
        assert_eq!(mime_for_name("a.JPG"), "image/jpeg");
        assert_eq!(mime_for_name("a.jpeg"), "image/jpeg");
        assert_eq!(mime_for_name("scan.TIF"), "image/tiff");
        assert_eq!(mime_for_name("x.webp"), "image/webp");
        assert_eq!(mime_for_name("notes.txt"), FALLBACK_MIME);
        assert_eq!(mime_for_name("no_extension"), FALLBACK_MIME);
    }

    #[test]
    fn path_candidate_reports_size_without_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[1, 2, 3, 4, 5])
            .unwrap();

        let c = Candidate::from_path(&path).unwrap();
        assert_eq!(c.name, "photo.png");
        assert_eq!(c.mime, "image/png");
        assert_eq!(c.size, 5);
        assert_eq!(c.parent_dir(), Some(dir.path()));

        let file = c.load().unwrap();
        assert_eq!(&*file.bytes, &[1, 2, 3, 4, 5]);
        assert_eq!(file.size(), 5);
    }

    #[test]
    fn directories_are_not_candidates() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Candidate::from_path(dir.path()).is_err());
    }

    #[test]
    fn empty_files_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::File::create(&path).unwrap();
        let err = Candidate::from_path(&path).unwrap().load().unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn byte_candidate_prefers_declared_mime() {
        let bytes: Arc<[u8]> = Arc::from(vec![9u8; 12]);
        let c = Candidate::from_bytes("clip.bin", "image/gif", bytes.clone());
        assert_eq!(c.mime, "image/gif");
        assert_eq!(c.size, 12);
        assert_eq!(c.parent_dir(), None);

        let c = Candidate::from_bytes("clip.webp", "", bytes);
        assert_eq!(c.mime, "image/webp");
    }

    #[test]
    fn dropped_file_without_path_uses_its_bytes() {
        let dropped = egui::DroppedFile {
            name: String::new(),
            mime: "image/png".to_string(),
            bytes: Some(Arc::from(vec![7u8; 3])),
            ..Default::default()
        };
        let c = Candidate::from_dropped(&dropped).unwrap();
        assert_eq!(c.name, "dropped_image");
        assert_eq!(c.mime, "image/png");
        assert_eq!(c.descriptor().size, 3);
    }

    #[test]
    fn dropped_file_with_nothing_attached_is_rejected() {
        let dropped = egui::DroppedFile::default();
        assert!(Candidate::from_dropped(&dropped).is_err());
    }
}
