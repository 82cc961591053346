use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Decoded image payload returned by the filter service.
pub struct Payload {
    /// MIME type from the data URL header, if the payload carried one.
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Decodes a `data:<mime>;base64,<data>` URL or a bare base64 string.
pub fn decode(raw: &str) -> anyhow::Result<Payload> {
    let raw = raw.trim();
    let (mime, data) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| anyhow::anyhow!("data URL has no payload separator"))?;
            let Some(mime) = header.strip_suffix(";base64") else {
                anyhow::bail!("only base64 data URLs are supported");
            };
            let mime = (!mime.is_empty()).then(|| mime.to_string());
            (mime, data)
        }
        None => (None, raw),
    };

    // Line breaks are legal inside long base64 bodies.
    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if cleaned.is_empty() {
        anyhow::bail!("image payload is empty");
    }
    let bytes = STANDARD.decode(cleaned.as_bytes())?;
    Ok(Payload { mime, bytes })
}
