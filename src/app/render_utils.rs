use std::f32::consts::FRAC_PI_2;

use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, pos2, vec2};

use folio_field::Category;

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

pub(super) fn category_color(category: Option<Category>) -> Color32 {
    match category {
        Some(Category::Frontend) => Color32::from_rgb(94, 178, 241),
        Some(Category::Backend) => Color32::from_rgb(241, 146, 94),
        Some(Category::DevOps) => Color32::from_rgb(129, 210, 140),
        Some(Category::Data) => Color32::from_rgb(196, 140, 236),
        Some(Category::Mobile) => Color32::from_rgb(246, 206, 104),
        Some(Category::Tooling) => Color32::from_rgb(160, 170, 184),
        None => Color32::from_rgb(232, 236, 242),
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = 56.0;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 50));

    let mut x = rect.left() + step;
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + step;
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += step;
    }
}

// Ring arc between `start` and `end` (clockwise from 12 o'clock), drawn as a
// thick polyline along the middle of the band.
pub(super) fn ring_segment(
    painter: &Painter,
    center: Pos2,
    inner_radius: f32,
    thickness: f32,
    angles: (f32, f32),
    color: Color32,
) {
    let (start, end) = angles;
    let sweep = end - start;
    if sweep <= f32::EPSILON || thickness <= 0.0 {
        return;
    }

    let radius = inner_radius + thickness * 0.5;
    let steps = ((sweep * radius / 4.0).ceil() as usize).clamp(2, 256);
    let points = (0..=steps)
        .map(|step| {
            let angle = start + sweep * step as f32 / steps as f32 - FRAC_PI_2;
            center + radius * vec2(angle.cos(), angle.sin())
        })
        .collect::<Vec<_>>();

    painter.add(Shape::line(points, Stroke::new(thickness, color)));
}

pub(super) fn initials(name: &str) -> String {
    let mut letters = name
        .split(|c: char| !c.is_alphanumeric())
        .filter_map(|word| word.chars().next())
        .take(2)
        .collect::<String>();
    if letters.chars().count() < 2 {
        letters = name.chars().filter(|c| c.is_alphanumeric()).take(2).collect();
    }
    letters.to_uppercase()
}
