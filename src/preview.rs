use std::sync::{Arc, mpsc};

use image::DynamicImage;

use crate::upload::SelectedFile;

/// Downscale the original to this longest-edge size for display.
const PREVIEW_MAX: u32 = 1920;

enum BgResult {
    Decoded {
        generation: u64,
        rgba: Vec<u8>,
        width: usize,
        height: usize,
    },
    Failed {
        generation: u64,
        reason: String,
    },
}

/// What the original pane currently shows.
pub enum OriginalPane {
    Placeholder,
    Loading,
    Ready(egui::TextureHandle),
    Failed(String),
}

/// Decodes the selected file off the UI thread and holds its texture.
pub struct PreviewRenderer {
    generation: u64,
    pane: OriginalPane,
    tx: mpsc::SyncSender<BgResult>,
    rx: mpsc::Receiver<BgResult>,
}

impl PreviewRenderer {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::sync_channel(8);
        Self {
            generation: 0,
            pane: OriginalPane::Placeholder,
            tx,
            rx,
        }
    }

    pub fn pane(&self) -> &OriginalPane {
        &self.pane
    }

    pub fn texture(&self) -> Option<&egui::TextureHandle> {
        match &self.pane {
            OriginalPane::Ready(tex) => Some(tex),
            _ => None,
        }
    }

    /// Starts decoding `file`; anything still decoding for an older file is
    /// discarded when it arrives.
    pub fn render(&mut self, file: &SelectedFile, ctx: &egui::Context) {
        self.generation += 1;
        self.pane = OriginalPane::Loading;

        let generation = self.generation;
        let bytes = Arc::clone(&file.bytes);
        let tx = self.tx.clone();
        let ctx2 = ctx.clone();
        std::thread::spawn(move || {
            let msg = match decode(&bytes) {
                Ok(img) => {
                    let rgba = img.to_rgba8();
                    let width = rgba.width() as usize;
                    let height = rgba.height() as usize;
                    BgResult::Decoded {
                        generation,
                        rgba: rgba.into_raw(),
                        width,
                        height,
                    }
                }
                Err(err) => BgResult::Failed {
                    generation,
                    reason: err.to_string(),
                },
            };
            let _ = tx.send(msg);
            ctx2.request_repaint();
        });
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.pane = OriginalPane::Placeholder;
    }

    pub fn drain(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                BgResult::Decoded {
                    generation,
                    rgba,
                    width,
                    height,
                } if generation == self.generation => {
                    let img = egui::ColorImage::from_rgba_unmultiplied([width, height], &rgba);
                    self.pane = OriginalPane::Ready(ctx.load_texture(
                        "original_preview",
                        img,
                        egui::TextureOptions::LINEAR,
                    ));
                }
                BgResult::Failed { generation, reason } if generation == self.generation => {
                    tracing::warn!(%reason, "preview decode failed");
                    self.pane = OriginalPane::Failed(reason);
                }
                _ => tracing::debug!("stale preview discarded"),
            }
        }
    }
}

fn decode(bytes: &[u8]) -> anyhow::Result<DynamicImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(if img.width() > PREVIEW_MAX || img.height() > PREVIEW_MAX {
        img.thumbnail(PREVIEW_MAX, PREVIEW_MAX)
    } else {
        img
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use image::{ImageBuffer, ImageFormat, Rgba};

    use super::*;

    fn encoded(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(w, h, Rgba([1, 2, 3, 255])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn file(bytes: Vec<u8>) -> SelectedFile {
        SelectedFile {
            name: "a.png".to_string(),
            mime: "image/png".to_string(),
            bytes: Arc::from(bytes),
        }
    }

    fn settle(preview: &mut PreviewRenderer, ctx: &egui::Context) {
        for _ in 0..200 {
            preview.drain(ctx);
            if !matches!(preview.pane(), OriginalPane::Loading) {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn small_images_keep_their_size() {
        let img = decode(&encoded(40, 20)).unwrap();
        assert_eq!((img.width(), img.height()), (40, 20));
    }

    #[test]
    fn large_images_are_downscaled_preserving_aspect() {
        let img = decode(&encoded(3840, 960)).unwrap();
        assert_eq!((img.width(), img.height()), (1920, 480));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(decode(b"definitely not an image").is_err());
    }

    #[test]
    fn render_produces_texture() {
        let ctx = egui::Context::default();
        let mut preview = PreviewRenderer::new();
        preview.render(&file(encoded(4, 3)), &ctx);
        settle(&mut preview, &ctx);

        let tex = preview.texture().expect("decoded preview");
        assert_eq!(tex.size(), [4, 3]);
    }

    #[test]
    fn undecodable_file_reports_failure() {
        let ctx = egui::Context::default();
        let mut preview = PreviewRenderer::new();
        preview.render(&file(b"nope".to_vec()), &ctx);
        settle(&mut preview, &ctx);
        assert!(matches!(preview.pane(), OriginalPane::Failed(_)));
    }

    #[test]
    fn cleared_preview_ignores_late_decode() {
        let ctx = egui::Context::default();
        let mut preview = PreviewRenderer::new();
        preview.render(&file(encoded(4, 3)), &ctx);
        preview.clear();
        std::thread::sleep(Duration::from_millis(200));
        preview.drain(&ctx);
        assert!(matches!(preview.pane(), OriginalPane::Placeholder));
    }
}
