use std::sync::{Arc, mpsc};

use crate::controller::Ticket;
use crate::data_url;
use crate::service::{FilterService, FilteredResult, SubmitError, SubmitRequest};

/// Decoded RGBA pixels ready for texture upload.
pub type Rgba = (Vec<u8>, usize, usize);

/// Outcome of one background request.
pub struct Finished {
    pub ticket: Ticket,
    pub outcome: Result<FilteredResult, SubmitError>,
    /// Present whenever `outcome` is `Ok`.
    pub pixels: Option<Rgba>,
}

/// Runs filter requests off the UI thread and hands results back.
pub struct Dispatcher {
    service: Arc<dyn FilterService>,
    tx: mpsc::Sender<Finished>,
    rx: mpsc::Receiver<Finished>,
}

impl Dispatcher {
    pub fn new(service: Arc<dyn FilterService>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { service, tx, rx }
    }

    pub fn submit(&self, ticket: Ticket, request: SubmitRequest, ctx: &egui::Context) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let ctx2 = ctx.clone();
        std::thread::spawn(move || {
            let finished = run(service.as_ref(), ticket, &request);
            let _ = tx.send(finished);
            ctx2.request_repaint();
        });
    }

    /// Collects everything finished since the last frame.
    pub fn drain(&self) -> Vec<Finished> {
        self.rx.try_iter().collect()
    }
}

/// Calls the service and decodes a successful payload into pixels.
fn run(service: &dyn FilterService, ticket: Ticket, request: &SubmitRequest) -> Finished {
    let outcome = service.apply(request);
    match outcome {
        Ok(result) => match decode_pixels(&result.image_data) {
            Ok(pixels) => Finished {
                ticket,
                outcome: Ok(result),
                pixels: Some(pixels),
            },
            Err(err) => {
                tracing::warn!(%err, "filtered image could not be decoded");
                Finished {
                    ticket,
                    outcome: Err(SubmitError::Payload(err.to_string())),
                    pixels: None,
                }
            }
        },
        Err(err) => Finished {
            ticket,
            outcome: Err(err),
            pixels: None,
        },
    }
}

fn decode_pixels(image_data: &str) -> anyhow::Result<Rgba> {
    let payload = data_url::decode(image_data)?;
    let img = image::load_from_memory(&payload.bytes)?;
    let rgba = img.to_rgba8();
    let w = rgba.width() as usize;
    let h = rgba.height() as usize;
    Ok((rgba.into_raw(), w, h))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::time::Duration;

    use base64::Engine as _;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba as Px};

    use super::*;
    use crate::catalog::FilterId;

    fn png_data_url(w: u32, h: u32) -> String {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(w, h, Px([10, 20, 30, 255])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(out.into_inner())
        )
    }

    struct Canned {
        reply: Result<FilteredResult, SubmitError>,
        calls: Mutex<Vec<String>>,
    }

    impl FilterService for Canned {
        fn apply(&self, request: &SubmitRequest) -> Result<FilteredResult, SubmitError> {
            self.calls
                .lock()
                .unwrap()
                .push(request.filter.as_str().to_string());
            self.reply.clone()
        }
    }

    fn request() -> SubmitRequest {
        SubmitRequest {
            file_name: "a.png".to_string(),
            mime: "image/png".to_string(),
            bytes: Arc::from(vec![1u8, 2, 3]),
            filter: FilterId::find("lomo").unwrap(),
        }
    }

    #[test]
    fn success_is_decoded_into_pixels() {
        let service = Canned {
            reply: Ok(FilteredResult {
                image_data: png_data_url(3, 2),
                filter_name: "lomo".to_string(),
            }),
            calls: Mutex::new(Vec::new()),
        };
        let finished = run(&service, Ticket::default(), &request());
        assert!(finished.outcome.is_ok());
        let (data, w, h) = finished.pixels.expect("pixels for a success");
        assert_eq!((w, h), (3, 2));
        assert_eq!(data.len(), 3 * 2 * 4);
        assert_eq!(&data[..4], &[10, 20, 30, 255]);
        assert_eq!(*service.calls.lock().unwrap(), vec!["lomo".to_string()]);
    }

    #[test]
    fn undecodable_success_becomes_payload_error() {
        let service = Canned {
            reply: Ok(FilteredResult {
                image_data: "data:image/jpeg;base64,AAAA".to_string(),
                filter_name: "lomo".to_string(),
            }),
            calls: Mutex::new(Vec::new()),
        };
        let finished = run(&service, Ticket::default(), &request());
        assert!(matches!(finished.outcome, Err(SubmitError::Payload(_))));
        assert!(finished.pixels.is_none());
    }

    #[test]
    fn failures_pass_through_untouched() {
        let service = Canned {
            reply: Err(SubmitError::Rejected(Some("bad image".to_string()))),
            calls: Mutex::new(Vec::new()),
        };
        let finished = run(&service, Ticket::default(), &request());
        assert_eq!(
            finished.outcome,
            Err(SubmitError::Rejected(Some("bad image".to_string())))
        );
    }

    #[test]
    fn submit_reports_back_through_the_channel() {
        let service = Arc::new(Canned {
            reply: Err(SubmitError::Transport("down".to_string())),
            calls: Mutex::new(Vec::new()),
        });
        let dispatcher = Dispatcher::new(service.clone());
        let ticket = Ticket::default().next();
        dispatcher.submit(ticket, request(), &egui::Context::default());

        let mut got = Vec::new();
        for _ in 0..200 {
            got.extend(dispatcher.drain());
            if !got.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].ticket, ticket);
        assert!(got[0].outcome.is_err());
        assert_eq!(service.calls.lock().unwrap().len(), 1);
    }
}
