use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color scales for rates and outcomes
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Sequential blue scale for heatmap cells: pale at 0 %, deep blue at 100 %.
pub fn rate_color(rate: f64) -> Color32 {
    let t = (rate / 100.0).clamp(0.0, 1.0) as f32;
    hsl_to_color32(210.0, 0.70, 0.92 - 0.62 * t)
}

/// Readable text colour on top of [`rate_color`].
pub fn rate_text_color(rate: f64) -> Color32 {
    if rate > 55.0 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}

/// Gauge band: red below 30 %, orange below 60 %, green above.
pub fn gauge_color(rate: f64) -> Color32 {
    if rate < 30.0 {
        Color32::from_rgb(0xff, 0x4d, 0x4d)
    } else if rate < 60.0 {
        Color32::from_rgb(0xff, 0xa6, 0x4d)
    } else {
        Color32::from_rgb(0x4d, 0xff, 0x88)
    }
}

/// Series colour for survivors and casualties in the charts.
pub fn outcome_color(survived: bool) -> Color32 {
    if survived {
        hsl_to_color32(130.0, 0.60, 0.45)
    } else {
        hsl_to_color32(0.0, 0.75, 0.55)
    }
}
