/// Largest upload the filter service accepts.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub static ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/bmp",
    "image/gif",
    "image/tiff",
    "image/webp",
];

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Eq)]
/// What the validator needs to know about a candidate upload.
pub struct FileDescriptor {
    pub size: u64,
    pub mime: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "File too large ({:.1}MB), maximum supported: {:.0}MB",
        megabytes(.size),
        megabytes(&MAX_FILE_SIZE)
    )]
    TooLarge { size: u64 },
    #[error(
        "Unsupported file type ({}), supported types: {}",
        display_mime(.mime),
        ALLOWED_MIME_TYPES.join(", ")
    )]
    UnsupportedType { mime: String },
}

fn megabytes(size: &u64) -> f64 {
    *size as f64 / BYTES_PER_MB
}

fn display_mime(mime: &str) -> &str {
    if mime.trim().is_empty() {
        "unknown"
    } else {
        mime
    }
}

pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

/// Checks size first, then declared type; the first failing rule wins.
pub fn validate(file: &FileDescriptor) -> Result<(), ValidationError> {
    if file.size > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge { size: file.size });
    }
    if !is_allowed_mime(&file.mime) {
        return Err(ValidationError::UnsupportedType {
            mime: file.mime.clone(),
        });
    }
    Ok(())
}
