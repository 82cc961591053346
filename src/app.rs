use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::{Category, FilterId, FilterPicker};
use crate::config::AppConfig;
use crate::controller::{Command, Controller, Event, Phase, ResultPane};
use crate::dispatch::{Dispatcher, Rgba};
use crate::notify::{Level, Notifier};
use crate::preview::{OriginalPane, PreviewRenderer};
use crate::service::FilterService;
use crate::slider::{self, SliderState};
use crate::upload::{Candidate, PICKER_EXTS};

const PLACEHOLDER_TEXT: &str = "click the generate button to start the journey back to 2000s!";
const DROP_BORDER: egui::Color32 = egui::Color32::from_rgb(0x34, 0x49, 0x5e);
const DROP_BORDER_HOVER: egui::Color32 = egui::Color32::from_rgb(0x2c, 0x3e, 0x50);
const PANE_HEIGHT: f32 = 320.0;

pub struct FilterApp {
    controller: Controller,
    picker: FilterPicker,
    notifier: Notifier,
    preview: PreviewRenderer,
    dispatcher: Dispatcher,
    result_tex: Option<egui::TextureHandle>,
    slider: SliderState,
    /// File name shown in the upload box.
    input_name: Option<String>,
    scroll_to_filters: bool,
    server_label: String,
    config: AppConfig,
}

impl FilterApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        service: Arc<dyn FilterService>,
        server_label: String,
        default_filter: FilterId,
        category: Category,
    ) -> Self {
        Self {
            controller: Controller::new(default_filter),
            picker: FilterPicker::new(category),
            notifier: Notifier::default(),
            preview: PreviewRenderer::new(),
            dispatcher: Dispatcher::new(service),
            result_tex: None,
            slider: SliderState::default(),
            input_name: None,
            scroll_to_filters: false,
            server_label,
            config,
        }
    }

    fn choose(&mut self, candidate: anyhow::Result<Candidate>, ctx: &egui::Context) {
        let candidate = match candidate {
            Ok(c) => c,
            Err(err) => {
                self.notifier
                    .show(format!("{:#}", err), Level::Error, Instant::now());
                return;
            }
        };
        if let Some(dir) = candidate.parent_dir() {
            self.config.browse_path = Some(dir.to_path_buf());
        }
        self.input_name = Some(candidate.name.clone());
        let commands = self.controller.handle(Event::FileChosen(candidate));
        self.run(commands, None, ctx);
    }

    fn pick_file(&mut self, ctx: &egui::Context) {
        let dir = self
            .config
            .browse_path
            .clone()
            .unwrap_or_else(default_browse_dir);
        let picked = rfd::FileDialog::new()
            .add_filter("Images", PICKER_EXTS)
            .set_directory(dir)
            .pick_file();
        if let Some(path) = picked {
            self.choose(Candidate::from_path(&path), ctx);
        }
    }

    fn save_result(&mut self) {
        let Some(result) = self.controller.result() else {
            return;
        };
        let name = result.download_name();
        let dir = self
            .config
            .download_path
            .clone()
            .unwrap_or_else(default_download_dir);
        let Some(path) = rfd::FileDialog::new()
            .set_directory(dir)
            .set_file_name(&name)
            .save_file()
        else {
            return;
        };
        let now = Instant::now();
        match write_download(&path, &result.image_data) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "result saved");
                self.notifier
                    .show(format!("Saved {}", path.display()), Level::Success, now);
                self.config.download_path = path.parent().map(Path::to_path_buf);
            }
            Err(err) => {
                self.notifier
                    .show(format!("Could not save image: {:#}", err), Level::Error, now);
            }
        }
    }

    /// Carries out controller commands. `pixels` belongs to the response that
    /// produced `commands`, if any.
    fn run(&mut self, commands: Vec<Command>, mut pixels: Option<Rgba>, ctx: &egui::Context) {
        for command in commands {
            match command {
                Command::Notify { text, level } => {
                    self.notifier.show(text, level, Instant::now());
                }
                Command::ClearInput => self.input_name = None,
                Command::ShowOriginalPlaceholder => self.preview.clear(),
                Command::RenderPreview(file) => {
                    self.picker.clear_selection();
                    self.preview.render(&file, ctx);
                    self.slider = SliderState::default();
                }
                Command::ScrollToFilters => self.scroll_to_filters = true,
                Command::Submit { ticket, request } => {
                    self.dispatcher.submit(ticket, request, ctx);
                }
                Command::ShowResult => {
                    if let Some((data, w, h)) = pixels.take() {
                        let img = egui::ColorImage::from_rgba_unmultiplied([w, h], &data);
                        self.result_tex = Some(ctx.load_texture(
                            "filtered_result",
                            img,
                            egui::TextureOptions::LINEAR,
                        ));
                    }
                }
            }
        }
    }

    fn poll_background(&mut self, ctx: &egui::Context) {
        self.preview.drain(ctx);
        for finished in self.dispatcher.drain() {
            let commands = self.controller.handle(Event::Finished {
                ticket: finished.ticket,
                outcome: finished.outcome,
            });
            self.run(commands, finished.pixels, ctx);
        }
        if self.controller.result().is_none() {
            self.result_tex = None;
        }
    }

    fn show_upload_box(&mut self, ui: &mut egui::Ui, hovering: bool) -> bool {
        let border = if hovering {
            DROP_BORDER_HOVER
        } else {
            DROP_BORDER
        };
        let frame = egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(2.0, border))
            .inner_margin(16.0);
        let inner = frame.show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Drop an image here or click to browse").strong());
                match (&self.input_name, self.controller.current_file()) {
                    (Some(name), Some(file)) => ui.label(format!(
                        "{} ({:.1}MB)",
                        name,
                        file.size() as f64 / (1024.0 * 1024.0)
                    )),
                    (Some(name), None) => ui.label(name),
                    (None, _) => ui.weak("JPEG, PNG, BMP, GIF, TIFF or WebP, up to 50MB"),
                };
            });
        });
        inner
            .response
            .interact(egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand)
            .clicked()
    }

    fn show_filters(&mut self, ui: &mut egui::Ui) -> Vec<Command> {
        let heading = ui.heading("Choose a filter");
        if self.scroll_to_filters {
            heading.scroll_to_me(Some(egui::Align::TOP));
            self.scroll_to_filters = false;
        }

        ui.horizontal(|ui| {
            for category in Category::ALL {
                let active = self.picker.category() == category;
                if ui.selectable_label(active, category.label()).clicked() && !active {
                    self.picker.set_category(category);
                    self.config.last_category = Some(category.key().to_string());
                }
            }
        });
        ui.add_space(6.0);

        let mut commands = Vec::new();
        let visible: Vec<FilterId> = self.picker.visible().collect();
        ui.horizontal_wrapped(|ui| {
            for id in visible {
                let mut text = id.label();
                if self.controller.current_filter() == Some(id) {
                    text.push_str(" ✓");
                }
                let selected = self.picker.selected() == Some(id);
                if ui.add(egui::Button::new(text).selected(selected)).clicked() {
                    if !self.controller.is_processing() {
                        self.picker.select(id);
                    }
                    commands.extend(self.controller.handle(Event::FilterClicked(id)));
                }
            }
        });

        ui.add_space(8.0);
        let generate = egui::Button::new(self.controller.generate_label())
            .min_size(egui::vec2(140.0, 28.0));
        if ui
            .add_enabled(self.controller.generate_enabled(), generate)
            .clicked()
        {
            commands.extend(
                self.controller
                    .handle(Event::Generate(self.picker.selected())),
            );
        }
        commands
    }

    /// Draws both panes; returns true when the download button was pressed.
    fn show_panes(&self, ui: &mut egui::Ui) -> bool {
        let mut download = false;
        ui.columns(2, |cols| {
            cols[0].vertical_centered(|ui| {
                ui.heading("- Original -");
                match self.preview.pane() {
                    OriginalPane::Placeholder => {
                        ui.weak("Upload an image to see it here");
                    }
                    OriginalPane::Loading => {
                        ui.spinner();
                    }
                    OriginalPane::Ready(tex) => show_texture(ui, tex, PANE_HEIGHT),
                    OriginalPane::Failed(reason) => {
                        ui.label("⚠ Could not preview this image");
                        ui.weak(reason);
                    }
                }
            });
            cols[1].vertical_centered(|ui| {
                ui.heading("- Filtered -");
                match self.controller.result_pane() {
                    ResultPane::Placeholder => {
                        ui.weak(PLACEHOLDER_TEXT);
                    }
                    ResultPane::Generating => {
                        ui.spinner();
                        ui.label("generating...");
                    }
                    ResultPane::Ready(result) => {
                        if let Some(tex) = &self.result_tex {
                            show_texture(ui, tex, PANE_HEIGHT);
                        }
                        ui.add_space(4.0);
                        if ui
                            .button(format!("⬇ Download {}", result.download_name()))
                            .clicked()
                        {
                            download = true;
                        }
                    }
                }
            });
        });
        download
    }

    fn status_line(&self) -> String {
        match self.controller.phase() {
            Phase::Idle => "no image".to_string(),
            Phase::FileSelected => "ready".to_string(),
            Phase::Processing { filter, .. } => format!("applying {}", filter.label()),
            Phase::ResultReady(result) => format!("{} applied", result.filter_name),
        }
    }

    fn show_notice(&mut self, ui: &mut egui::Ui) {
        let now = Instant::now();
        let Some(notice) = self.notifier.current(now).cloned() else {
            ui.weak(format!("Server: {}", self.server_label));
            return;
        };
        let color = match notice.level {
            Level::Info => ui.visuals().text_color(),
            Level::Success => egui::Color32::from_rgb(0x27, 0xae, 0x60),
            Level::Error => ui.visuals().error_fg_color,
        };
        ui.horizontal(|ui| {
            ui.colored_label(color, &notice.text);
            if ui.small_button("✕").clicked() {
                self.notifier.dismiss();
            }
        });
        if let Some(left) = self.notifier.remaining(now) {
            ui.ctx().request_repaint_after(left);
        }
    }
}

fn show_texture(ui: &mut egui::Ui, tex: &egui::TextureHandle, max_h: f32) {
    let tex_size = tex.size_vec2();
    let avail_w = ui.available_width();
    let scale = (avail_w / tex_size.x).min(max_h / tex_size.y);
    let display = tex_size * scale;
    let (img_rect, _) = ui.allocate_exact_size(display, egui::Sense::hover());
    ui.painter().image(
        tex.id(),
        img_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
}

fn default_browse_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::picture_dir)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Decodes the server payload and writes the raw image bytes to `path`.
fn write_download(path: &Path, image_data: &str) -> anyhow::Result<()> {
    let payload = crate::data_url::decode(image_data)?;
    if let Some(mime) = payload.mime.as_deref() {
        tracing::debug!(mime, bytes = payload.bytes.len(), "writing download");
    }
    std::fs::write(path, &payload.bytes)?;
    Ok(())
}

impl eframe::App for FilterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window size for saving on exit
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.config.window_width = Some(rect.width());
            self.config.window_height = Some(rect.height());
        }

        self.poll_background(ctx);

        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(file) = dropped.first() {
            if dropped.len() > 1 {
                tracing::debug!(count = dropped.len(), "only the first dropped file is used");
            }
            self.choose(Candidate::from_dropped(file), ctx);
        }

        egui::TopBottomPanel::top("title_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("retrofilter");
                ui.weak("back to the 2000s");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(self.status_line());
                });
            });
        });

        egui::TopBottomPanel::bottom("notice_bar").show(ctx, |ui| {
            self.show_notice(ui);
        });

        let mut browse = false;
        let mut download = false;
        let mut commands = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    browse = self.show_upload_box(ui, hovering);
                    ui.add_space(12.0);
                    commands = self.show_filters(ui);
                    ui.add_space(12.0);
                    ui.separator();
                    download = self.show_panes(ui);

                    if self.preview.texture().is_some() && self.result_tex.is_some() {
                        ui.add_space(12.0);
                        ui.separator();
                        ui.heading("Compare");
                        ui.weak("Drag the handle to reveal more of either side");
                    }
                    slider::show(
                        ui,
                        "compare",
                        self.preview.texture(),
                        self.result_tex.as_ref(),
                        &mut self.slider,
                        PANE_HEIGHT * 1.5,
                    );
                });
        });

        self.run(commands, None, ctx);
        if browse {
            self.pick_file(ctx);
        }
        if download {
            self.save_result();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.save();
    }
}
