//! Background color parsing for the display surface.

use image::Rgba;

/// Surface background used when none is configured.
pub const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([128, 128, 128, 255]);

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("darkgray", [64, 64, 64]),
    ("darkgrey", [64, 64, 64]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("pink", [255, 192, 203]),
    ("transparent", [0, 0, 0]),
];

/// Parse a color string into an RGBA pixel.
///
/// Supports:
/// - Named colors (`gray`, `black`, `magenta`, ..., and `transparent`)
/// - Hex: `#RGB`, `#RRGGBB` and `#RRGGBBAA`
/// - Case-insensitive, trims whitespace
pub fn parse_color(s: &str) -> Option<Rgba<u8>> {
    let s = s.trim();
    match s.strip_prefix('#') {
        Some(hex) => parse_hex(hex),
        None => parse_named(s),
    }
}

/// Parse `s` as a background color, falling back to [`DEFAULT_BACKGROUND`].
pub fn background_or_default(s: Option<&str>) -> Rgba<u8> {
    s.and_then(parse_color).unwrap_or(DEFAULT_BACKGROUND)
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match hex.len() {
        3 => {
            let r = channel(0..1)?;
            let g = channel(1..2)?;
            let b = channel(2..3)?;
            Some(Rgba([r * 17, g * 17, b * 17, 255]))
        }
        6 => Some(Rgba([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255])),
        8 => Some(Rgba([
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        ])),
        _ => None,
    }
}

fn parse_named(s: &str) -> Option<Rgba<u8>> {
    let name = s.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(candidate, [r, g, b])| {
            let alpha = if *candidate == "transparent" { 0 } else { 255 };
            Rgba([*r, *g, *b, alpha])
        })
}
