//! `color-mod()` evaluation.
//!
//! ```css
//! a { color: color-mod(#3366cc alpha(50%) lightness(+10%)); }
//! /* -> */
//! a { color: rgba(92, 133, 214, 0.5); }
//! ```
//!
//! The base may be any CSS color (hex, named, `rgb()`, `hsl()`, `hwb()`,
//! `lab()` ...). Results are printed in legacy `rgb()`/`rgba()` form with
//! integer channels. A call whose base color cannot be resolved statically
//! (`var()`, `currentColor`, unknown names) is left untouched.

use lightningcss::traits::Parse;
use lightningcss::values::color::{CssColor, HSL, HWB, RGBA, SRGB};

use crate::asset::Asset;
use crate::pipeline::{PipelineError, Stage};

const FUNCTION: &str = "color-mod(";

#[derive(Debug, Default, Clone, Copy)]
pub struct ColorMod;

impl Stage for ColorMod {
    fn name(&self) -> &str {
        "color-mod"
    }

    fn apply(&self, mut asset: Asset) -> Result<Vec<Asset>, PipelineError> {
        let text = asset.text()?;
        if text.contains(FUNCTION) {
            let text = replace_calls(text);
            asset.set_text(text);
        }
        Ok(vec![asset])
    }
}

/// Rewrite every evaluable `color-mod(...)` call in `css`.
pub fn replace_calls(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;

    while let Some(start) = rest.find(FUNCTION) {
        out.push_str(&rest[..start]);
        let after = &rest[start + FUNCTION.len()..];
        let Some(len) = balanced_len(after) else {
            out.push_str(&rest[start..]);
            return out;
        };
        let args = &after[..len];
        match evaluate(&replace_calls(args)) {
            Some(color) => out.push_str(&to_legacy(color)),
            None => {
                out.push_str(FUNCTION);
                out.push_str(args);
                out.push(')');
            }
        }
        rest = &after[len + 1..];
    }

    out.push_str(rest);
    out
}

/// Length of the argument text up to (not including) the closing paren.
fn balanced_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Legacy `rgb()`/`rgba()` text for `color`, alpha to two decimals.
fn to_legacy(color: SRGB) -> String {
    let RGBA {
        red, green, blue, ..
    } = RGBA::from(color);
    let alpha = color.alpha.clamp(0.0, 1.0);
    if alpha >= 1.0 {
        return format!("rgb({red}, {green}, {blue})");
    }
    let a = format!("{alpha:.2}");
    let a = a.trim_end_matches('0').trim_end_matches('.');
    let a = if a.is_empty() { "0" } else { a };
    format!("rgba({red}, {green}, {blue}, {a})")
}

fn mix(color: SRGB, other: SRGB, weight: f32) -> SRGB {
    let lerp = |x: f32, y: f32| x * (1.0 - weight) + y * weight;
    SRGB {
        r: lerp(color.r, other.r),
        g: lerp(color.g, other.g),
        b: lerp(color.b, other.b),
        alpha: lerp(color.alpha, other.alpha),
    }
}

fn evaluate(args: &str) -> Option<SRGB> {
    let args = args.trim();
    let (base, mut rest) = split_color(args)?;
    let mut color = parse_color(base)?;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Some(color);
        }
        let open = rest.find('(')?;
        let name = rest[..open].trim();
        let len = balanced_len(&rest[open + 1..])?;
        let arg = Adjust::parse(&rest[open + 1..open + 1 + len])?;
        color = apply_adjuster(color, name, arg)?;
        rest = &rest[open + 2 + len..];
    }
}

/// Split the base color (a word or a whole function call) from the
/// adjuster list.
fn split_color(args: &str) -> Option<(&str, &str)> {
    match args.find(|c: char| c == '(' || c.is_whitespace()) {
        Some(open) if args[open..].starts_with('(') => {
            let len = balanced_len(&args[open + 1..])?;
            let end = open + len + 2;
            Some((&args[..end], &args[end..]))
        }
        Some(end) => Some((&args[..end], &args[end..])),
        None => Some((args, "")),
    }
}

/// Any CSS color lightningcss understands; `None` for `currentColor`,
/// `var()` and the like.
fn parse_color(text: &str) -> Option<SRGB> {
    let color = CssColor::parse_string(text.trim()).ok()?;
    SRGB::try_from(&color).ok()
}

/// An adjuster argument: `50%`, `+10%`, `- 10%`, `* 1.5`, `0.4`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Adjust {
    Set(f32),
    Add(f32),
    Sub(f32),
    Mul(f32),
}

impl Adjust {
    /// Values are fractions: `50%` and `0.5` both parse to 0.5.
    fn parse(arg: &str) -> Option<Self> {
        let arg = arg.trim();
        let (op, value) = match arg.chars().next()? {
            c @ ('+' | '-' | '*') => (Some(c), arg[1..].trim()),
            _ => (None, arg),
        };
        let number = match value.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f32>().ok()? / 100.0,
            None => value.parse::<f32>().ok()?,
        };
        Some(match op {
            Some('+') => Self::Add(number),
            Some('-') => Self::Sub(number),
            // `* 50%` and `* 0.5` both halve
            Some(_) => Self::Mul(number),
            None => Self::Set(number),
        })
    }

    fn on(self, current: f32) -> f32 {
        let next = match self {
            Self::Set(v) => v,
            Self::Add(v) => current + v,
            Self::Sub(v) => current - v,
            Self::Mul(v) => current * v,
        };
        next.clamp(0.0, 1.0)
    }
}

fn apply_adjuster(color: SRGB, name: &str, adjust: Adjust) -> Option<SRGB> {
    // HSL and HWB channels are percentages, adjusters work on fractions
    let percent = |value: f32| adjust.on(value / 100.0) * 100.0;
    match name {
        "alpha" | "a" => Some(SRGB {
            alpha: adjust.on(color.alpha),
            ..color
        }),
        "lightness" | "l" => {
            let hsl = HSL::from(color);
            Some(SRGB::from(HSL { l: percent(hsl.l), ..hsl }))
        }
        "saturation" | "s" => {
            let hsl = HSL::from(color);
            Some(SRGB::from(HSL { s: percent(hsl.s), ..hsl }))
        }
        "whiteness" | "w" => {
            let hwb = HWB::from(color);
            Some(SRGB::from(HWB { w: percent(hwb.w), ..hwb }))
        }
        "blackness" | "b" => {
            let hwb = HWB::from(color);
            Some(SRGB::from(HWB { b: percent(hwb.b), ..hwb }))
        }
        "tint" => match adjust {
            Adjust::Set(p) => Some(mix(color, SRGB { r: 1.0, g: 1.0, b: 1.0, ..color }, p)),
            _ => None,
        },
        "shade" => match adjust {
            Adjust::Set(p) => Some(mix(color, SRGB { r: 0.0, g: 0.0, b: 0.0, ..color }, p)),
            _ => None,
        },
        _ => None,
    }
}
