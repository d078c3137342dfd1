use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::catalog::FieldKind;

pub(super) fn rgb(color: [u8; 3]) -> Color32 {
    Color32::from_rgb(color[0], color[1], color[2])
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        y += step;
    }
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Style color for a field kind row. Unknown kinds get the default style
/// rather than failing anywhere downstream.
pub(super) fn field_kind_color(kind: FieldKind) -> Color32 {
    match kind {
        FieldKind::Time => Color32::from_rgb(255, 212, 59),
        FieldKind::Addr => Color32::from_rgb(77, 171, 247),
        FieldKind::Port => Color32::from_rgb(116, 192, 252),
        FieldKind::Count => Color32::from_rgb(105, 219, 124),
        FieldKind::Bool => Color32::from_rgb(255, 135, 135),
        FieldKind::Interval => Color32::from_rgb(255, 192, 120),
        FieldKind::Enum => Color32::from_rgb(177, 151, 252),
        FieldKind::Vector | FieldKind::Set | FieldKind::Record => Color32::from_rgb(124, 222, 220),
        FieldKind::String | FieldKind::Other => Color32::from_gray(200),
    }
}

/// Edge color under the connection-strength overlay: cool for a lone
/// timestamp pivot, warm for correlation-rich edges.
pub(super) fn strength_color(strength: usize) -> Color32 {
    let t = ((strength.saturating_sub(1)) as f32 / 4.0).clamp(0.0, 1.0);
    let r = (90.0 + (165.0 * t)) as u8;
    let g = (110.0 - (40.0 * t)) as u8;
    let b = (200.0 - (130.0 * t)) as u8;
    Color32::from_rgb(r, g, b)
}
