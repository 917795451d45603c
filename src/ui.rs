// src/ui.rs - Theme, video widget and gesture overlays
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Rounding, Stroke, Vec2};
use gesture_control::landmarks::{FrameDimensions, Point};
use gesture_control::Command;
use image::DynamicImage;

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color32,
    pub secondary: Color32,
    pub success: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub grid: Color32,
    pub marker: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color32::from_rgb(70, 130, 240),
            secondary: Color32::from_rgb(255, 152, 0),
            success: Color32::from_rgb(76, 175, 80),
            text_primary: Color32::WHITE,
            text_secondary: Color32::from_rgb(200, 200, 200),
            grid: Color32::from_rgba_unmultiplied(255, 255, 255, 90),
            marker: Color32::from_rgb(0, 255, 0),
        }
    }
}

pub fn create_visuals() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();

    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(30, 30, 35);
    visuals.widgets.inactive.bg_fill = Color32::from_rgb(45, 45, 52);
    visuals.widgets.hovered.bg_fill = Color32::from_rgb(55, 55, 65);
    visuals.widgets.active.bg_fill = Color32::from_rgb(70, 130, 240);

    visuals.widgets.noninteractive.rounding = Rounding::same(8.0);
    visuals.widgets.inactive.rounding = Rounding::same(8.0);
    visuals.widgets.hovered.rounding = Rounding::same(8.0);
    visuals.widgets.active.rounding = Rounding::same(8.0);
    visuals.window_rounding = Rounding::same(12.0);

    visuals
}

/// Cell of the 3x3 grid bound to a command, in normalized frame units.
///
/// Left and right span the full height; up and down sit in the middle column.
pub fn zone_rect(command: Command) -> Option<Rect> {
    let third = 1.0 / 3.0;
    let two_thirds = 2.0 / 3.0;

    let (min, max) = match command {
        Command::Left => ((0.0, 0.0), (third, 1.0)),
        Command::Right => ((two_thirds, 0.0), (1.0, 1.0)),
        Command::Up => ((third, 0.0), (two_thirds, third)),
        Command::Down => ((third, two_thirds), (two_thirds, 1.0)),
        Command::Action => ((third, third), (two_thirds, two_thirds)),
        Command::None => return None,
    };

    Some(Rect::from_min_max(Pos2::new(min.0, min.1), Pos2::new(max.0, max.1)))
}

/// Maps a normalized rect onto the on-screen video rect.
pub fn to_screen_rect(video: Rect, normalized: Rect) -> Rect {
    Rect::from_min_max(
        video.lerp_inside(normalized.min.to_vec2()),
        video.lerp_inside(normalized.max.to_vec2()),
    )
}

/// Maps a pixel position in frame space onto the on-screen video rect.
pub fn frame_to_screen(video: Rect, dims: FrameDimensions, point: &Point) -> Pos2 {
    let u = (point.x / dims.width.max(1) as f64) as f32;
    let v = (point.y / dims.height.max(1) as f64) as f32;
    video.lerp_inside(Vec2::new(u, v))
}

/// Inverse of the display mapping, `None` outside the video.
pub fn screen_to_normalized(video: Rect, pos: Pos2) -> Option<(f64, f64)> {
    if !video.contains(pos) || video.width() <= 0.0 || video.height() <= 0.0 {
        return None;
    }

    let u = (pos.x - video.min.x) / video.width();
    let v = (pos.y - video.min.y) / video.height();
    Some((u as f64, v as f64))
}

pub fn draw_start_screen(
    painter: &egui::Painter,
    video: Rect,
    theme: &Theme,
    centre_occupied: bool,
    countdown: Option<u64>,
) {
    painter.rect_filled(video, Rounding::ZERO, Color32::from_black_alpha(160));

    painter.text(
        video.center_top() + Vec2::new(0.0, video.height() * 0.1),
        Align2::CENTER_CENTER,
        "GESTURE CONTROL",
        FontId::proportional(32.0),
        theme.text_primary,
    );
    painter.text(
        video.center_top() + Vec2::new(0.0, video.height() * 0.2),
        Align2::CENTER_CENTER,
        "PLACE HAND IN CENTER ZONE TO START",
        FontId::proportional(18.0),
        theme.text_secondary,
    );

    if let Some(centre) = zone_rect(Command::Action) {
        let centre = to_screen_rect(video, centre);
        let (fill, stroke) = if centre_occupied {
            (Color32::from_rgba_unmultiplied(76, 175, 80, 70), theme.success)
        } else {
            (Color32::from_rgba_unmultiplied(255, 255, 255, 20), theme.grid)
        };
        painter.rect_filled(centre, Rounding::same(4.0), fill);
        painter.rect_stroke(centre, Rounding::same(4.0), Stroke::new(3.0, stroke));
    }

    if let Some(n) = countdown {
        painter.text(
            video.center_bottom() - Vec2::new(0.0, video.height() * 0.12),
            Align2::CENTER_CENTER,
            format!("STARTING IN: {}", n),
            FontId::proportional(28.0),
            theme.secondary,
        );
    }
}

pub fn draw_zone_grid(painter: &egui::Painter, video: Rect, theme: &Theme, active: Command) {
    let stroke = Stroke::new(1.5, theme.grid);

    for t in [1.0 / 3.0, 2.0 / 3.0] {
        let x = video.min.x + video.width() * t;
        painter.line_segment([Pos2::new(x, video.min.y), Pos2::new(x, video.max.y)], stroke);
    }
    // Horizontal lines only cross the middle column
    let left = video.min.x + video.width() / 3.0;
    let right = video.min.x + video.width() * 2.0 / 3.0;
    for t in [1.0 / 3.0, 2.0 / 3.0] {
        let y = video.min.y + video.height() * t;
        painter.line_segment([Pos2::new(left, y), Pos2::new(right, y)], stroke);
    }

    if let Some(cell) = zone_rect(active) {
        let cell = to_screen_rect(video, cell);
        painter.rect_filled(cell, Rounding::ZERO, theme.primary.gamma_multiply(0.25));
        painter.rect_stroke(cell, Rounding::ZERO, Stroke::new(2.0, theme.primary));
        painter.text(
            cell.center(),
            Align2::CENTER_CENTER,
            active.label(),
            FontId::proportional(22.0),
            theme.text_primary,
        );
    }
}

pub fn draw_marker(painter: &egui::Painter, pos: Pos2, theme: &Theme) {
    painter.circle_filled(pos, 8.0, theme.marker);
    painter.circle_stroke(pos, 11.0, Stroke::new(2.0, theme.text_primary));
}

pub fn draw_action_label(painter: &egui::Painter, video: Rect, theme: &Theme, action: Command) {
    let anchor = video.left_top() + Vec2::new(16.0, 16.0);
    let galley_rect = Rect::from_min_size(anchor - Vec2::new(8.0, 6.0), Vec2::new(220.0, 40.0));
    painter.rect_filled(galley_rect, Rounding::same(6.0), Color32::from_black_alpha(140));
    painter.text(
        anchor,
        Align2::LEFT_TOP,
        format!("ACTION: {}", action.label()),
        FontId::proportional(22.0),
        theme.text_primary,
    );
}

// Custom widget for video display
pub struct VideoWidget {
    texture: Option<egui::TextureHandle>,
    aspect_ratio: f32,
}

impl VideoWidget {
    pub fn new() -> Self {
        Self {
            texture: None,
            aspect_ratio: 4.0 / 3.0,
        }
    }

    pub fn update_frame(&mut self, ctx: &egui::Context, frame: &DynamicImage) {
        let rgba = frame.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        if size[1] > 0 {
            self.aspect_ratio = size[0] as f32 / size[1] as f32;
        }

        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());

        match &mut self.texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("video_frame", color_image, egui::TextureOptions::LINEAR));
            }
        }
    }

    /// Paints the latest frame, fitted to the available space. Returns the
    /// on-screen rect and the response for pointer queries.
    pub fn show(&self, ui: &mut egui::Ui) -> (Rect, egui::Response) {
        let available = ui.available_size();
        let mut size = Vec2::new(available.x, available.x / self.aspect_ratio);
        if size.y > available.y {
            size = Vec2::new(available.y * self.aspect_ratio, available.y);
        }

        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());

        match &self.texture {
            Some(texture) => {
                ui.painter().image(
                    texture.id(),
                    rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => {
                ui.painter()
                    .rect_filled(rect, Rounding::same(4.0), Color32::from_rgb(50, 50, 55));
                ui.painter().text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "No Video Signal",
                    FontId::proportional(16.0),
                    Color32::from_rgb(150, 150, 155),
                );
            }
        }

        (rect, response)
    }
}
