//! CSS-style color parsing for scene paint attributes.

/// Parse a color specification to RGBA bytes.
///
/// Accepts `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, and
/// `rgba(r, g, b, a)` with a fractional alpha. Malformed values fall
/// back to opaque black, matching what annotation front-ends do.
pub fn parse_color(spec: &str) -> [u8; 4] {
    try_parse_color(spec).unwrap_or([0, 0, 0, 255])
}

fn try_parse_color(spec: &str) -> Option<[u8; 4]> {
    let spec = spec.trim();
    if let Some(hex) = spec.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(body) = spec
        .strip_prefix("rgba(")
        .or_else(|| spec.strip_prefix("rgb("))
    {
        return parse_rgb_call(body.strip_suffix(')')?);
    }
    None
}

fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some([r, g, b, 255])
        }
        8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some([r, g, b, a])
        }
        _ => None,
    }
}

fn parse_rgb_call(body: &str) -> Option<[u8; 4]> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let r = parts[0].parse::<f32>().ok()?;
    let g = parts[1].parse::<f32>().ok()?;
    let b = parts[2].parse::<f32>().ok()?;
    let a = if parts.len() == 4 {
        parts[3].parse::<f32>().ok()?
    } else {
        1.0
    };
    Some([
        channel(r),
        channel(g),
        channel(b),
        (a.clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}

fn channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}
