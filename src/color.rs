use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lighten, Srgb};

// ---------------------------------------------------------------------------
// Marker colours
// ---------------------------------------------------------------------------

/// Default marker colour (steel blue).
pub const STEEL_BLUE: Color32 = Color32::from_rgb(0x46, 0x82, 0xb4);

/// Parse a `#rrggbb` colour.
pub fn parse_hex(s: &str) -> Option<Color32> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Lighter variant of `base` used for the hovered marker.
pub fn highlight(base: Color32) -> Color32 {
    let rgb = Srgb::new(
        base.r() as f32 / 255.0,
        base.g() as f32 / 255.0,
        base.b() as f32 / 255.0,
    );
    let hsl: Hsl = rgb.into_color();
    let rgb: Srgb = hsl.lighten(0.35).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colours() {
        assert_eq!(parse_hex("#4682b4"), Some(STEEL_BLUE));
        assert_eq!(parse_hex("#FFFFFF"), Some(Color32::WHITE));
        assert_eq!(parse_hex("4682b4"), None);
        assert_eq!(parse_hex("#4682b"), None);
        assert_eq!(parse_hex("#zz82b4"), None);
        assert_eq!(parse_hex("#+f82b4"), None);
    }

    #[test]
    fn highlight_is_lighter() {
        let light = highlight(STEEL_BLUE);
        let sum = |c: Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
        assert!(sum(light) > sum(STEEL_BLUE));
        assert_eq!(highlight(Color32::WHITE), Color32::WHITE);
    }
}
