//! CSS value parsing for the handful of value kinds the editor reads back:
//! colors (`#hex`, `rgb()`, `rgba()`, a few keywords) and pixel lengths.
//!
//! Built on `winnow` 0.7, in the same style as the rest of the parsers.

use crate::error::{Error, Result};
use crate::model::Color;
use winnow::ascii::space0;
use winnow::combinator::{alt, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// Parse a CSS color value.
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)` (commas optional) and the keywords `transparent`,
/// `black` and `white`. Case-insensitive.
pub fn parse_color(value: &str) -> Result<Color> {
    let lowered = value.trim().to_ascii_lowercase();
    let mut input = lowered.as_str();
    let color = alt((hex_color, rgb_function, color_keyword))
        .parse_next(&mut input)
        .map_err(|_| invalid("color", value))?;
    if !input.trim().is_empty() {
        return Err(invalid("color", value));
    }
    Ok(color)
}

/// Parse a CSS length in pixels: `12px`, `12.5px` or a bare number.
pub fn parse_length(value: &str) -> Result<f64> {
    let trimmed = value.trim();
    let mut input = trimmed;
    let n = (number, opt("px"))
        .map(|(n, _)| n)
        .parse_next(&mut input)
        .map_err(|_| invalid("length", value))?;
    if !input.is_empty() {
        return Err(invalid("length", value));
    }
    Ok(n)
}

/// Parse a font-relative length: `2em`, `0.67em`.
pub fn parse_em(value: &str) -> Result<f64> {
    let trimmed = value.trim();
    let mut input = trimmed;
    let n = (number, "em")
        .map(|(n, _)| n)
        .parse_next(&mut input)
        .map_err(|_| invalid("em length", value))?;
    if !input.is_empty() {
        return Err(invalid("em length", value));
    }
    Ok(n)
}

/// Format a pixel length the way computed styles print it (`12px`,
/// `12.5px`).
pub fn format_px(n: f64) -> String {
    // Two decimals is plenty for editor geometry and keeps output stable.
    let rounded = (n * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}px", rounded as i64)
    } else {
        format!("{rounded}px")
    }
}

/// Convert any parseable color string to `#rrggbb` for color inputs.
/// Unparseable values fall back to black, as a color input would show.
pub fn to_hex(value: &str) -> String {
    parse_color(value)
        .map(|c| c.to_hex())
        .unwrap_or_else(|_| Color::BLACK.to_hex())
}

fn invalid(kind: &'static str, value: &str) -> Error {
    Error::InvalidCss {
        kind,
        value: value.to_string(),
    }
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn backtrack<T>() -> ModalResult<T> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

fn hex_color(input: &mut &str) -> ModalResult<Color> {
    let _ = '#'.parse_next(input)?;
    let digits: &str = take_while(3..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    match Color::from_hex(digits) {
        Some(color) => Ok(color),
        None => backtrack(),
    }
}

fn number(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    if input.starts_with('-') || input.starts_with('+') {
        *input = &input[1..];
    }
    let int: &str = take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let mut frac_len = 0;
    if input.starts_with('.') {
        *input = &input[1..];
        let frac: &str = take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
        frac_len = frac.len();
    }
    if int.is_empty() && frac_len == 0 {
        return backtrack();
    }
    let matched = &start[..start.len() - input.len()];
    matched.parse::<f64>().or_else(|_| backtrack())
}

/// A color channel: 0–255, rounded and clamped.
fn channel(input: &mut &str) -> ModalResult<u8> {
    number
        .map(|n| n.round().clamp(0.0, 255.0) as u8)
        .parse_next(input)
}

fn ws(input: &mut &str) -> ModalResult<()> {
    space0.void().parse_next(input)
}

/// Comma and/or whitespace between function arguments.
fn separator(input: &mut &str) -> ModalResult<()> {
    (space0, opt(','), space0).void().parse_next(input)
}

fn rgb_function(input: &mut &str) -> ModalResult<Color> {
    let _ = alt(("rgba(", "rgb(")).parse_next(input)?;
    ws(input)?;
    let r = channel.parse_next(input)?;
    separator.parse_next(input)?;
    let g = channel.parse_next(input)?;
    separator.parse_next(input)?;
    let b = channel.parse_next(input)?;
    ws(input)?;
    let alpha = opt((alt((",", "/")), space0, number).map(|(_, _, a)| a)).parse_next(input)?;
    ws(input)?;
    let _ = ')'.parse_next(input)?;
    let a = alpha.map_or(1.0, |a| a.clamp(0.0, 1.0) as f32);
    Ok(Color::rgba(r, g, b, a))
}

fn color_keyword(input: &mut &str) -> ModalResult<Color> {
    alt((
        "transparent".value(Color::TRANSPARENT),
        "black".value(Color::BLACK),
        "white".value(Color::WHITE),
    ))
    .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_functions() {
        assert_eq!(parse_color("rgb(255, 0, 0)").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(parse_color("RGB(12 34 56)").unwrap(), Color::rgb(12, 34, 56));
        assert_eq!(
            parse_color("rgba(0, 0, 0, 0)").unwrap(),
            Color::TRANSPARENT
        );
        assert_eq!(
            parse_color("rgb(10 20 30 / 0.5)").unwrap(),
            Color::rgba(10, 20, 30, 0.5)
        );
    }

    #[test]
    fn parses_hex_and_keywords() {
        assert_eq!(parse_color("#ff0000").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(parse_color(" #FFF ").unwrap(), Color::WHITE);
        assert_eq!(parse_color("transparent").unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_color("red-ish").is_err());
        assert!(parse_color("rgb(1, 2)").is_err());
        assert!(parse_color("#ff0000 extra").is_err());
    }

    #[test]
    fn rgb_to_hex_conversion() {
        assert_eq!(to_hex("rgb(255, 0, 0)"), "#ff0000");
        assert_eq!(to_hex("rgba(43, 110, 246, 0.5)"), "#2b6ef6");
        assert_eq!(to_hex("nonsense"), "#000000");
    }

    #[test]
    fn lengths() {
        assert_eq!(parse_length("12px").unwrap(), 12.0);
        assert_eq!(parse_length(" 12.5 ").unwrap(), 12.5);
        assert_eq!(parse_length("-4px").unwrap(), -4.0);
        assert_eq!(parse_length(".5px").unwrap(), 0.5);
        assert!(parse_length("auto").is_err());
        assert!(parse_length("12em").is_err());
        assert!(parse_length("").is_err());
    }

    #[test]
    fn em_lengths() {
        assert_eq!(parse_em("2em").unwrap(), 2.0);
        assert_eq!(parse_em(" 0.67em ").unwrap(), 0.67);
        assert!(parse_em("2px").is_err());
        assert!(parse_em("em").is_err());
    }

    #[test]
    fn px_formatting() {
        assert_eq!(format_px(12.0), "12px");
        assert_eq!(format_px(12.5), "12.5px");
        assert_eq!(format_px(0.0), "0px");
        assert_eq!(format_px(1.0 / 3.0), "0.33px");
    }
}
