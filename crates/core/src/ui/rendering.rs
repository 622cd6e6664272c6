//! UI rendering helpers.
//!
//! Reusable drawing functions for the metadata window: the upload drop
//! zone, copyable metadata fields and keyword chips.

use crate::error::Result;
use crate::image_loader::{EncodedImage, UploadPolicy};
use crate::metadata::DESCRIPTION_LIMIT;
use eframe::egui;
use image::DynamicImage;

/// Largest edge of the preview texture, in pixels.
const PREVIEW_MAX_EDGE: u32 = 1600;

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);
pub const MUTED: egui::Color32 = egui::Color32::from_rgb(100, 116, 139);
pub const DANGER: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);
pub const SUCCESS: egui::Color32 = egui::Color32::from_rgb(22, 163, 74);
const CHIP_FILL: egui::Color32 = egui::Color32::from_rgb(239, 246, 255);
const CHIP_TEXT: egui::Color32 = egui::Color32::from_rgb(29, 78, 216);
const FIELD_FILL: egui::Color32 = egui::Color32::from_rgb(248, 250, 252);
const BORDER: egui::Color32 = egui::Color32::from_rgb(226, 232, 240);

/// Converts a decoded photo into texture data, downscaling huge images.
pub fn preview_color_image(image: &DynamicImage) -> egui::ColorImage {
    let scaled;
    let image = if image.width() > PREVIEW_MAX_EDGE || image.height() > PREVIEW_MAX_EDGE {
        scaled = image.thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE);
        &scaled
    } else {
        image
    };

    let image_buffer = image.to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    let pixels = image_buffer.as_flat_samples();
    egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice())
}

/// Decodes an upload straight into preview texture data.
///
/// Runs off the UI thread, since large JPEGs take a while to decode.
pub fn decode_preview(image: &EncodedImage) -> Result<egui::ColorImage> {
    Ok(preview_color_image(&image.decode_image()?))
}

/// Formats and size limit line shown under the upload prompt.
pub fn upload_hint(policy: &UploadPolicy) -> String {
    if !policy.enforce {
        return "Any image file (upload limits off)".to_string();
    }

    const MIB: u64 = 1024 * 1024;
    let limit = if policy.max_bytes % MIB == 0 {
        format!("{}MB", policy.max_bytes / MIB)
    } else {
        format!("{:.1}MB", policy.max_bytes as f64 / MIB as f64)
    };
    format!("PNG, JPG, GIF or WebP (Max {})", limit)
}

/// Draws the dashed-looking upload area and returns its click response.
///
/// `hovering` highlights the zone while files are dragged over the window.
pub fn draw_drop_zone(ui: &mut egui::Ui, height: f32, hovering: bool, hint: &str) -> egui::Response {
    let size = egui::vec2(ui.available_width(), height);
    let response = ui.allocate_response(size, egui::Sense::click());
    let rect = response.rect;
    let painter = ui.painter();

    let highlighted = hovering || response.hovered();
    let fill = if highlighted {
        egui::Color32::from_rgb(239, 246, 255)
    } else {
        FIELD_FILL
    };
    let stroke_color = if highlighted { ACCENT } else { BORDER };

    painter.rect_filled(rect, 12.0, fill);
    painter.rect_stroke(
        rect.shrink(1.0),
        12.0,
        egui::Stroke::new(2.0, stroke_color),
        egui::StrokeKind::Inside,
    );

    painter.circle_filled(rect.center() - egui::vec2(0.0, 40.0), 28.0, egui::Color32::from_rgb(219, 234, 254));
    painter.text(
        rect.center() - egui::vec2(0.0, 40.0),
        egui::Align2::CENTER_CENTER,
        "+",
        egui::FontId::proportional(30.0),
        ACCENT,
    );
    painter.text(
        rect.center() + egui::vec2(0.0, 10.0),
        egui::Align2::CENTER_CENTER,
        "Upload your photo",
        egui::FontId::proportional(18.0),
        egui::Color32::from_rgb(30, 41, 59),
    );
    painter.text(
        rect.center() + egui::vec2(0.0, 34.0),
        egui::Align2::CENTER_CENTER,
        hint,
        egui::FontId::proportional(13.0),
        MUTED,
    );
    painter.text(
        rect.center() + egui::vec2(0.0, 54.0),
        egui::Align2::CENTER_CENTER,
        "Click to browse or drop a file here",
        egui::FontId::proportional(12.0),
        MUTED,
    );

    response.on_hover_cursor(egui::CursorIcon::PointingHand)
}

/// Renders a labelled, copyable metadata field.
///
/// Returns `true` when the copy button was clicked.
pub fn metadata_field(ui: &mut egui::Ui, label: &str, value: &str, multiline: bool, copied: bool) -> bool {
    let mut clicked = false;

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(label.to_uppercase()).small().strong().color(MUTED));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            clicked = copy_button(ui, "Copy", copied);
        });
    });

    let min_height = if multiline { 100.0 } else { 0.0 };
    egui::Frame::new()
        .fill(FIELD_FILL)
        .stroke(egui::Stroke::new(1.0, BORDER))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::same(12))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.set_min_height(min_height);
            let text = if multiline {
                egui::RichText::new(value)
            } else {
                egui::RichText::new(value).strong()
            };
            ui.add(egui::Label::new(text).wrap().selectable(true));
        });

    clicked
}

/// "N / 1000 characters", red once the limit is exceeded.
pub fn description_counter(ui: &mut egui::Ui, len: usize) {
    let color = if len > DESCRIPTION_LIMIT { DANGER } else { MUTED };
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
        ui.label(
            egui::RichText::new(format!("{} / {} characters", len, DESCRIPTION_LIMIT))
                .small()
                .color(color),
        );
    });
}

/// Copy button that reads "Copied!" while `copied` is set.
pub fn copy_button(ui: &mut egui::Ui, label: &str, copied: bool) -> bool {
    let text = if copied {
        egui::RichText::new("✔ Copied!").color(SUCCESS)
    } else {
        egui::RichText::new(format!("📋 {}", label)).color(ACCENT)
    };
    ui.add(egui::Button::new(text).frame(false)).clicked()
}

/// Keywords as wrapped chips, in the order given.
pub fn keyword_chips(ui: &mut egui::Ui, keywords: &[String]) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);
        for keyword in keywords {
            egui::Frame::new()
                .fill(CHIP_FILL)
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(219, 234, 254)))
                .corner_radius(12.0)
                .inner_margin(egui::Margin::symmetric(10, 3))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(keyword).small().color(CHIP_TEXT));
                });
        }
    });
}

/// Rounded panel used for the left and right columns.
pub fn card_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(egui::Color32::WHITE)
        .stroke(egui::Stroke::new(1.0, BORDER))
        .corner_radius(14.0)
        .inner_margin(egui::Margin::same(16))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    #[test]
    fn small_images_keep_their_size() {
        let image = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(8, 5, Rgba([1, 2, 3, 255])));
        let color_image = preview_color_image(&image);
        assert_eq!(color_image.size, [8, 5]);
    }

    #[test]
    fn large_images_are_downscaled_preserving_aspect() {
        let image = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(3200, 1600, Rgba([0, 0, 0, 255])));
        let color_image = preview_color_image(&image);
        assert_eq!(color_image.size, [1600, 800]);
    }

    #[test]
    fn hint_follows_the_active_policy() {
        assert_eq!(upload_hint(&UploadPolicy::default()), "PNG, JPG, GIF or WebP (Max 10MB)");

        let custom = UploadPolicy {
            max_bytes: 25 * 1024 * 1024,
            enforce: true,
        };
        assert_eq!(upload_hint(&custom), "PNG, JPG, GIF or WebP (Max 25MB)");

        let half = UploadPolicy {
            max_bytes: 512 * 1024,
            enforce: true,
        };
        assert_eq!(upload_hint(&half), "PNG, JPG, GIF or WebP (Max 0.5MB)");

        let relaxed = UploadPolicy {
            enforce: false,
            ..UploadPolicy::default()
        };
        assert!(upload_hint(&relaxed).contains("limits off"));
    }

    #[test]
    fn decodes_previews_from_encoded_uploads() {
        let image = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(4, 3, Rgba([9, 9, 9, 255])));
        let mut png = std::io::Cursor::new(Vec::new());
        image.write_to(&mut png, image::ImageFormat::Png).unwrap();
        let encoded = EncodedImage::new(png.get_ref(), "image/png", None);

        assert_eq!(decode_preview(&encoded).unwrap().size, [4, 3]);

        let garbage = EncodedImage::new(b"not an image", "image/jpeg", None);
        assert!(decode_preview(&garbage).is_err());
    }
}
