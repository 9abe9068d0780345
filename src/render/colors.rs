//! Color parsing and HSL adjustments for cell fills.
//!
//! The transform layer works with CSS-ish color strings; the render layer
//! needs normalized RGBA floats. Desaturation (highlight dimming) and
//! lightening (comparison secondary cells) go through HSL.

use crate::error::{Result, TreemapError};

/// Parse `#rgb`, `#rrggbb`, `rgb(r, g, b)` or `transparent` into normalized
/// RGBA with channels in `0..=1`.
pub fn parse_color(color: &str) -> Result<[f32; 4]> {
    let trimmed = color.trim();
    if trimmed.eq_ignore_ascii_case("transparent") {
        return Ok([0.0, 0.0, 0.0, 0.0]);
    }
    let (r, g, b) = parse_rgb8(trimmed)?;
    Ok([
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        1.0,
    ])
}

fn parse_rgb8(color: &str) -> Result<(u8, u8, u8)> {
    if let Some(hex) = color.strip_prefix('#') {
        return match hex.len() {
            3 => {
                let mut channels = [0_u8; 3];
                for (slot, c) in channels.iter_mut().zip(hex.chars()) {
                    let nibble = hex_digit(c, color)?;
                    *slot = nibble * 16 + nibble;
                }
                let [r, g, b] = channels;
                Ok((r, g, b))
            }
            6 => {
                let mut chars = hex.chars();
                let mut channels = [0_u8; 3];
                for slot in &mut channels {
                    let hi = chars.next().map(|c| hex_digit(c, color)).transpose()?;
                    let lo = chars.next().map(|c| hex_digit(c, color)).transpose()?;
                    match (hi, lo) {
                        (Some(hi), Some(lo)) => *slot = hi * 16 + lo,
                        _ => return Err(TreemapError::Parse(format!("bad hex color: {color}"))),
                    }
                }
                let [r, g, b] = channels;
                Ok((r, g, b))
            }
            _ => Err(TreemapError::Parse(format!("bad hex color: {color}"))),
        };
    }
    if let Some(body) = color
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let mut channels = [0_u8; 3];
        let mut parts = body.split(',');
        for slot in &mut channels {
            let part = parts
                .next()
                .ok_or_else(|| TreemapError::Parse(format!("bad rgb color: {color}")))?;
            *slot = part
                .trim()
                .parse::<u8>()
                .map_err(|_| TreemapError::Parse(format!("bad rgb color: {color}")))?;
        }
        if parts.next().is_some() {
            return Err(TreemapError::Parse(format!("bad rgb color: {color}")));
        }
        let [r, g, b] = channels;
        return Ok((r, g, b));
    }
    Err(TreemapError::Parse(format!("unsupported color: {color}")))
}

fn hex_digit(c: char, color: &str) -> Result<u8> {
    c.to_digit(16)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| TreemapError::Parse(format!("bad hex color: {color}")))
}

/// Reduce saturation by `amount` (0..=1), returning a hex string.
///
/// `transparent` has no hue to adjust and passes through unchanged.
pub fn desaturate(color: &str, amount: f64) -> Result<String> {
    if color.trim().eq_ignore_ascii_case("transparent") {
        return Ok(color.to_owned());
    }
    adjust_hsl(color, |_, s, _| ((s - amount).clamp(0.0, 1.0), None))
}

/// Increase lightness by `amount` (0..=1), returning a hex string.
///
/// `transparent` has no hue to adjust and passes through unchanged.
pub fn lighten(color: &str, amount: f64) -> Result<String> {
    if color.trim().eq_ignore_ascii_case("transparent") {
        return Ok(color.to_owned());
    }
    adjust_hsl(color, |_, s, l| (s, Some((l + amount).clamp(0.0, 1.0))))
}

fn adjust_hsl(
    color: &str,
    adjust: impl Fn(f64, f64, f64) -> (f64, Option<f64>),
) -> Result<String> {
    let (r, g, b) = parse_rgb8(color)?;
    let (h, s, l) = rgb_to_hsl(r, g, b);
    let (s, new_l) = adjust(h, s, l);
    let (r, g, b) = hsl_to_rgb(h, s, new_l.unwrap_or(l));
    Ok(format!("#{r:02x}{g:02x}{b:02x}"))
}

fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }
    let delta = max - min;
    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };
    let h = if (max - r).abs() < f64::EPSILON {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    } / 6.0;
    (h, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s <= 0.0 {
        let v = channel_to_u8(l);
        return (v, v, v);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        channel_to_u8(hue_to_channel(p, q, h + 1.0 / 3.0)),
        channel_to_u8(hue_to_channel(p, q, h)),
        channel_to_u8(hue_to_channel(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel_to_u8(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
