//! Before/after comparison slider.
//!
//! The "after" image is painted over the "before" image, clipped to the
//! reveal percentage of the container width. The handle sits on the clip
//! edge and is the only place a drag can start.

const HANDLE_HIT_WIDTH: f32 = 18.0;
const KNOB_RADIUS: f32 = 10.0;

/// Pointer x as a percentage of the container, clamped to `0..=100`.
pub fn reveal_percentage(pointer_x: f32, left: f32, width: f32) -> f32 {
    if width.is_nan() || width <= 0.0 {
        return 0.0;
    }
    ((pointer_x - left) / width * 100.0).clamp(0.0, 100.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Drag state of one slider instance.
pub struct SliderState {
    dragging: bool,
    reveal: f32,
}

impl Default for SliderState {
    fn default() -> Self {
        Self {
            dragging: false,
            reveal: 50.0,
        }
    }
}

impl SliderState {
    pub fn dragging(&self) -> bool {
        self.dragging
    }

    /// Share of the container, `0..=100`, showing the "after" image.
    pub fn reveal(&self) -> f32 {
        self.reveal
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Follows the pointer. Ignored unless a drag is in progress.
    pub fn drag_to(&mut self, pointer_x: f32, left: f32, width: f32) {
        if self.dragging {
            self.reveal = reveal_percentage(pointer_x, left, width);
        }
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Overlay width and handle offset inside a container of `width`.
    pub fn offset(&self, width: f32) -> f32 {
        width * self.reveal / 100.0
    }
}

/// Largest rect with the texture's aspect ratio that fits `max`.
fn fit(size: egui::Vec2, max: egui::Vec2) -> egui::Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    let scale = (max.x / size.x).min(max.y / size.y);
    size * scale
}

/// Draws one slider. Skipped without error when either image is missing;
/// returns whether anything was drawn.
pub fn show(
    ui: &mut egui::Ui,
    id_salt: impl std::hash::Hash,
    before: Option<&egui::TextureHandle>,
    after: Option<&egui::TextureHandle>,
    state: &mut SliderState,
    max_height: f32,
) -> bool {
    let (Some(before), Some(after)) = (before, after) else {
        state.end_drag();
        return false;
    };

    let size = fit(
        before.size_vec2(),
        egui::vec2(ui.available_width(), max_height),
    );
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    let id = ui.id().with(id_salt);
    let full_uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

    let handle_x = rect.left() + state.offset(rect.width());
    let handle_rect = egui::Rect::from_center_size(
        egui::pos2(handle_x, rect.center().y),
        egui::vec2(HANDLE_HIT_WIDTH, rect.height()),
    );
    let handle = ui.interact(handle_rect, id.with("handle"), egui::Sense::drag());

    if handle.drag_started() {
        state.begin_drag();
    }
    if state.dragging() {
        // Release anywhere ends the drag, not only over the handle.
        let (released, pointer) = ui.input(|i| {
            (
                i.pointer.any_released() || !i.pointer.primary_down(),
                i.pointer.interact_pos(),
            )
        });
        if let Some(pos) = pointer {
            state.drag_to(pos.x, rect.left(), rect.width());
        }
        if released {
            state.end_drag();
        } else {
            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
        }
    } else if handle.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
    }

    let painter = ui.painter_at(rect);
    painter.image(before.id(), rect, full_uv, egui::Color32::WHITE);

    let split = rect.left() + state.offset(rect.width());
    let overlay = egui::Rect::from_min_max(rect.min, egui::pos2(split, rect.bottom()));
    painter
        .with_clip_rect(overlay)
        .image(after.id(), rect, full_uv, egui::Color32::WHITE);

    let stroke = egui::Stroke::new(2.0, egui::Color32::WHITE);
    painter.line_segment(
        [
            egui::pos2(split, rect.top()),
            egui::pos2(split, rect.bottom()),
        ],
        stroke,
    );
    painter.circle(
        egui::pos2(split, rect.center().y),
        KNOB_RADIUS,
        egui::Color32::from_black_alpha(160),
        stroke,
    );

    let label_font = egui::FontId::proportional(12.0);
    painter.text(
        rect.left_top() + egui::vec2(8.0, 6.0),
        egui::Align2::LEFT_TOP,
        "After",
        label_font.clone(),
        egui::Color32::WHITE,
    );
    painter.text(
        rect.right_top() + egui::vec2(-8.0, 6.0),
        egui::Align2::RIGHT_TOP,
        "Before",
        label_font,
        egui::Color32::WHITE,
    );
    true
}
