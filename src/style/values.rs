//! Normalization of declared values into the form `getComputedStyle`
//! reports: numeric font weights, `rgb()`/`rgba()` for every color syntax.

use cssparser::{ParseError, Parser, ParserInput, Token, color};

pub const DEFAULT_COLOR: &str = "rgb(0, 0, 0)";
pub const TRANSPARENT: &str = "rgba(0, 0, 0, 0)";
pub const NORMAL_WEIGHT: &str = "400";
pub const DEFAULT_DISPLAY: &str = "inline";

/// CSS-wide keywords that control inheritance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WideKeyword {
    Inherit,
    Initial,
    Unset,
}

impl WideKeyword {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "inherit" => Some(Self::Inherit),
            "initial" => Some(Self::Initial),
            "unset" | "revert" => Some(Self::Unset),
            _ => None,
        }
    }
}

/// An sRGB color with straight alpha, as `getComputedStyle` reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        red: 0,
        green: 0,
        blue: 0,
        alpha: 0.0,
    };

    fn new(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Build from sRGB channels in `0..=1`; out-of-gamut channels are clipped.
    fn from_unit([red, green, blue]: [f64; 3], alpha: f64) -> Self {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(red), channel(green), channel(blue), alpha.clamp(0.0, 1.0) as f32)
    }

    /// Serialize as `rgb(r, g, b)`, or `rgba(r, g, b, a)` when translucent.
    pub fn to_css(&self) -> String {
        let Rgba {
            red,
            green,
            blue,
            alpha,
        } = *self;
        if alpha >= 1.0 {
            format!("rgb({red}, {green}, {blue})")
        } else {
            let alpha = (alpha * 1000.0).round() / 1000.0;
            format!("rgba({red}, {green}, {blue}, {alpha})")
        }
    }
}

/// Normalize a declared color to `rgb()`/`rgba()`.
///
/// Returns `None` for values that are not colors, so the declaration is
/// dropped. `currentcolor` is left to the caller.
pub fn normalize_color(value: &str) -> Option<String> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    parser.parse_entirely(parse_color).ok().map(|color| color.to_css())
}

/// Parse one color: a named color, a hex color, or a color function.
pub fn parse_color<'i>(input: &mut Parser<'i, '_>) -> Result<Rgba, ParseError<'i, ()>> {
    let location = input.current_source_location();
    let token = input.next()?.clone();
    let color = match &token {
        Token::Ident(name) if name.eq_ignore_ascii_case("transparent") => Some(Rgba::TRANSPARENT),
        Token::Ident(name) => color::parse_named_color(name)
            .ok()
            .map(|(r, g, b)| Rgba::new(r, g, b, 1.0)),
        Token::Hash(hex) | Token::IDHash(hex) => color::parse_hash_color(hex.as_bytes())
            .ok()
            .map(|(r, g, b, a)| Rgba::new(r, g, b, a)),
        Token::Function(name) => {
            let name = name.to_ascii_lowercase();
            return input.parse_nested_block(|args| parse_color_function(&name, args));
        }
        _ => None,
    };
    color.ok_or_else(|| location.new_custom_error(()))
}

#[derive(Debug, Clone, Copy)]
enum Component {
    Number(f64),
    Percentage(f64),
    None,
}

impl Component {
    /// Numeric value, with 100% mapped to `full`.
    fn value(self, full: f64) -> f64 {
        match self {
            Component::Number(n) => n,
            Component::Percentage(p) => p * full,
            Component::None => 0.0,
        }
    }
}

fn parse_color_function<'i>(
    name: &str,
    args: &mut Parser<'i, '_>,
) -> Result<Rgba, ParseError<'i, ()>> {
    let space = match name {
        "color" => Some(args.expect_ident_cloned()?.to_ascii_lowercase()),
        _ => None,
    };
    let location = args.current_source_location();
    let ([c0, c1, c2], alpha) = parse_components(args)?;
    let alpha = alpha.map_or(1.0, |a| a.value(1.0));

    let rgb = match name {
        "rgb" | "rgba" => Some([c0, c1, c2].map(|c| c.value(255.0) / 255.0)),
        "hsl" | "hsla" => Some(hsl_to_rgb(
            c0.value(1.0),
            c1.value(100.0) / 100.0,
            c2.value(100.0) / 100.0,
        )),
        "hwb" => Some(hwb_to_rgb(
            c0.value(1.0),
            c1.value(100.0) / 100.0,
            c2.value(100.0) / 100.0,
        )),
        "lab" => Some(lab_to_rgb(c0.value(100.0), c1.value(125.0), c2.value(125.0))),
        "lch" => {
            let [a, b] = polar_to_cartesian(c1.value(150.0), c2.value(1.0));
            Some(lab_to_rgb(c0.value(100.0), a, b))
        }
        "oklab" => Some(oklab_to_rgb(c0.value(1.0), c1.value(0.4), c2.value(0.4))),
        "oklch" => {
            let [a, b] = polar_to_cartesian(c1.value(0.4), c2.value(1.0));
            Some(oklab_to_rgb(c0.value(1.0), a, b))
        }
        "color" => space
            .as_deref()
            .and_then(|space| predefined_to_rgb(space, [c0, c1, c2].map(|c| c.value(1.0)))),
        _ => None,
    };
    rgb.map(|rgb| Rgba::from_unit(rgb, alpha))
        .ok_or_else(|| location.new_custom_error(()))
}

/// Read three channels and an optional alpha, in either the comma or the
/// space-and-slash syntax.
fn parse_components<'i>(
    args: &mut Parser<'i, '_>,
) -> Result<([Component; 3], Option<Component>), ParseError<'i, ()>> {
    let mut channels = Vec::with_capacity(4);
    let mut alpha = None;
    let mut after_slash = false;

    while !args.is_exhausted() {
        let location = args.current_source_location();
        let component = match args.next()?.clone() {
            Token::Comma => continue,
            Token::Delim('/') if !after_slash => {
                after_slash = true;
                continue;
            }
            Token::Number { value, .. } => Component::Number(f64::from(value)),
            Token::Percentage { unit_value, .. } => Component::Percentage(f64::from(unit_value)),
            Token::Dimension { value, unit, .. } => angle_degrees(f64::from(value), &unit)
                .map(Component::Number)
                .ok_or_else(|| location.new_custom_error(()))?,
            Token::Ident(ident) if ident.eq_ignore_ascii_case("none") => Component::None,
            _ => return Err(location.new_custom_error(())),
        };
        match (after_slash, alpha) {
            (false, _) => channels.push(component),
            (true, None) => alpha = Some(component),
            (true, Some(_)) => return Err(location.new_custom_error(())),
        }
    }

    if alpha.is_none() && channels.len() == 4 {
        alpha = channels.pop();
    }
    let channels = <[Component; 3]>::try_from(channels).map_err(|_| args.new_custom_error(()))?;
    Ok((channels, alpha))
}

fn angle_degrees(value: f64, unit: &str) -> Option<f64> {
    match unit.to_ascii_lowercase().as_str() {
        "deg" => Some(value),
        "grad" => Some(value * 0.9),
        "rad" => Some(value.to_degrees()),
        "turn" => Some(value * 360.0),
        _ => None,
    }
}

fn polar_to_cartesian(chroma: f64, hue: f64) -> [f64; 2] {
    let hue = hue.to_radians();
    [chroma * hue.cos(), chroma * hue.sin()]
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [f64; 3] {
    let hue = hue.rem_euclid(360.0);
    let saturation = saturation.clamp(0.0, 1.0);
    let lightness = lightness.clamp(0.0, 1.0);
    let a = saturation * lightness.min(1.0 - lightness);
    let f = |n: f64| {
        let k = (n + hue / 30.0) % 12.0;
        lightness - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
    };
    [f(0.0), f(8.0), f(4.0)]
}

fn hwb_to_rgb(hue: f64, whiteness: f64, blackness: f64) -> [f64; 3] {
    let whiteness = whiteness.clamp(0.0, 1.0);
    let blackness = blackness.clamp(0.0, 1.0);
    if whiteness + blackness >= 1.0 {
        let gray = whiteness / (whiteness + blackness);
        return [gray; 3];
    }
    hsl_to_rgb(hue, 1.0, 0.5).map(|c| c * (1.0 - whiteness - blackness) + whiteness)
}

type Matrix = [[f64; 3]; 3];

const D50_TO_D65: Matrix = [
    [0.955473421488075, -0.02309845494876471, 0.06325924320057072],
    [-0.0283697093338637, 1.0099953980813041, 0.021041441191917323],
    [0.012314014864481998, -0.020507649298898964, 1.330365926242124],
];

const XYZ_D65_TO_LINEAR_SRGB: Matrix = [
    [3.2409699419045226, -1.537383177570094, -0.4986107602930034],
    [-0.9692436362808796, 1.8759675015077202, 0.04155505740717559],
    [0.05563007969699366, -0.20397695888897652, 1.0569715142428786],
];

const LINEAR_P3_TO_XYZ_D65: Matrix = [
    [0.4865709486482162, 0.26566769316909306, 0.1982172852343625],
    [0.2289745640697488, 0.6917385218365064, 0.079286914093745],
    [0.0, 0.04511338185890264, 1.043944368900976],
];

fn transform(m: &Matrix, [x, y, z]: [f64; 3]) -> [f64; 3] {
    m.map(|row| row[0] * x + row[1] * y + row[2] * z)
}

fn srgb_encode(c: f64) -> f64 {
    let abs = c.abs();
    if abs > 0.0031308 {
        c.signum() * (1.055 * abs.powf(1.0 / 2.4) - 0.055)
    } else {
        12.92 * c
    }
}

fn srgb_decode(c: f64) -> f64 {
    let abs = c.abs();
    if abs > 0.04045 {
        c.signum() * ((abs + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn xyz_d65_to_rgb(xyz: [f64; 3]) -> [f64; 3] {
    transform(&XYZ_D65_TO_LINEAR_SRGB, xyz).map(srgb_encode)
}

fn lab_to_rgb(lightness: f64, a: f64, b: f64) -> [f64; 3] {
    const KAPPA: f64 = 24389.0 / 27.0;
    const EPSILON: f64 = 216.0 / 24389.0;

    let fy = (lightness + 16.0) / 116.0;
    let fx = a / 500.0 + fy;
    let fz = fy - b / 200.0;
    let x = if fx.powi(3) > EPSILON { fx.powi(3) } else { (116.0 * fx - 16.0) / KAPPA };
    let y = if lightness > KAPPA * EPSILON { fy.powi(3) } else { lightness / KAPPA };
    let z = if fz.powi(3) > EPSILON { fz.powi(3) } else { (116.0 * fz - 16.0) / KAPPA };

    // Scaled by the D50 white point.
    let xyz_d50 = [x * 0.3457 / 0.3585, y, z * (1.0 - 0.3457 - 0.3585) / 0.3585];
    xyz_d65_to_rgb(transform(&D50_TO_D65, xyz_d50))
}

fn oklab_to_rgb(lightness: f64, a: f64, b: f64) -> [f64; 3] {
    let l = (lightness + 0.3963377774 * a + 0.2158037573 * b).powi(3);
    let m = (lightness - 0.1055613458 * a - 0.0638541728 * b).powi(3);
    let s = (lightness - 0.0894841775 * a - 1.2914855480 * b).powi(3);
    [
        4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s,
        -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s,
        -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s,
    ]
    .map(srgb_encode)
}

/// Channels of `color(<space> ...)` in sRGB. Wide-gamut spaces other than
/// display-p3 are not resolved.
fn predefined_to_rgb(space: &str, channels: [f64; 3]) -> Option<[f64; 3]> {
    match space {
        "srgb" => Some(channels),
        "srgb-linear" => Some(channels.map(srgb_encode)),
        "display-p3" => Some(xyz_d65_to_rgb(transform(
            &LINEAR_P3_TO_XYZ_D65,
            channels.map(srgb_decode),
        ))),
        "xyz" | "xyz-d65" => Some(xyz_d65_to_rgb(channels)),
        "xyz-d50" => Some(xyz_d65_to_rgb(transform(&D50_TO_D65, channels))),
        _ => None,
    }
}

/// Numeric weight of an already-normalized value, for relative keywords.
fn weight_number(value: &str) -> u16 {
    value.parse().unwrap_or(400)
}

/// Resolve a declared `font-weight` against the parent's resolved weight.
///
/// Returns `None` for invalid values.
pub fn resolve_font_weight(value: &str, parent: &str) -> Option<String> {
    let value = value.trim().to_ascii_lowercase();
    let parent = weight_number(parent);

    let weight = match value.as_str() {
        "normal" => 400,
        "bold" => 700,
        // Relative weights follow the CSS Fonts table.
        "bolder" => match parent {
            0..350 => 400,
            350..550 => 700,
            550..900 => 900,
            _ => parent,
        },
        "lighter" => match parent {
            0..550 => 100,
            550..750 => 400,
            _ => 700,
        },
        number => {
            let n: f32 = number.parse().ok()?;
            if !(1.0..=1000.0).contains(&n) {
                return None;
            }
            n.round() as u16
        }
    };
    Some(weight.to_string())
}

/// Resolve a declared `display` to its first keyword.
pub fn resolve_display(value: &str) -> Option<String> {
    let keyword = value.split_whitespace().next()?.to_ascii_lowercase();
    keyword
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c == '-')
        .then_some(keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors_become_rgb() {
        assert_eq!(normalize_color("White").as_deref(), Some("rgb(255, 255, 255)"));
        assert_eq!(normalize_color("darkblue").as_deref(), Some("rgb(0, 0, 139)"));
        assert_eq!(normalize_color("LightYellow").as_deref(), Some("rgb(255, 255, 224)"));
        assert_eq!(normalize_color("rebeccapurple").as_deref(), Some("rgb(102, 51, 153)"));
        assert_eq!(normalize_color("transparent").as_deref(), Some(TRANSPARENT));
    }

    #[test]
    fn test_hex_and_rgb_functions() {
        assert_eq!(normalize_color("#0a0a0a").as_deref(), Some("rgb(10, 10, 10)"));
        assert_eq!(normalize_color("#FfF").as_deref(), Some("rgb(255, 255, 255)"));
        assert_eq!(normalize_color("#00000080").as_deref(), Some("rgba(0, 0, 0, 0.502)"));
        assert_eq!(normalize_color(" rgb(1, 2, 3) ").as_deref(), Some("rgb(1, 2, 3)"));
        assert_eq!(normalize_color("rgba(10, 20, 30, 0.5)").as_deref(), Some("rgba(10, 20, 30, 0.5)"));
        assert_eq!(normalize_color("rgb(100% 0% 50% / 25%)").as_deref(), Some("rgba(255, 0, 128, 0.25)"));
        assert_eq!(normalize_color("rgb(300, -5, 0)").as_deref(), Some("rgb(255, 0, 0)"));
    }

    #[test]
    fn test_hsl_and_hwb() {
        assert_eq!(normalize_color("hsl(0, 0%, 5%)").as_deref(), Some("rgb(13, 13, 13)"));
        assert_eq!(normalize_color("hsl(0,0%,95%)").as_deref(), Some("rgb(242, 242, 242)"));
        assert_eq!(normalize_color("hsl(120deg 100% 25%)").as_deref(), Some("rgb(0, 128, 0)"));
        assert_eq!(normalize_color("hsla(0.5turn, 100%, 50%, 0)").as_deref(), Some("rgba(0, 255, 255, 0)"));
        assert_eq!(normalize_color("hwb(0 0% 0%)").as_deref(), Some("rgb(255, 0, 0)"));
        assert_eq!(normalize_color("hwb(90 60% 60%)").as_deref(), Some("rgb(128, 128, 128)"));
    }

    #[test]
    fn test_lab_family_and_color_function() {
        assert_eq!(normalize_color("lab(50 0 0)").as_deref(), Some("rgb(119, 119, 119)"));
        assert_eq!(normalize_color("lab(10% 0 0)").as_deref(), Some("rgb(27, 27, 27)"));
        assert_eq!(normalize_color("lch(100 0 0)").as_deref(), Some("rgb(255, 255, 255)"));
        assert_eq!(normalize_color("oklch(20% 0 0)").as_deref(), Some("rgb(22, 22, 22)"));
        assert_eq!(normalize_color("oklab(1 0 0 / 0.5)").as_deref(), Some("rgba(255, 255, 255, 0.5)"));
        assert_eq!(normalize_color("color(srgb 0 0 1)").as_deref(), Some("rgb(0, 0, 255)"));
        assert_eq!(normalize_color("color(display-p3 1 1 1)").as_deref(), Some("rgb(255, 255, 255)"));
        assert_eq!(normalize_color("color(rec2020 1 1 1)"), None);
    }

    #[test]
    fn test_invalid_colors_are_dropped() {
        assert_eq!(normalize_color("#12"), None);
        assert_eq!(normalize_color("#ggg"), None);
        assert_eq!(normalize_color("bluish"), None);
        assert_eq!(normalize_color("rgb(1, 2)"), None);
        assert_eq!(normalize_color("hsl(10px, 50%, 50%)"), None);
        assert_eq!(normalize_color("red blue"), None);
        assert_eq!(normalize_color("linear-gradient(red, blue)"), None);
        assert_eq!(normalize_color("currentcolor"), None);
    }

    #[test]
    fn test_font_weight_keywords() {
        assert_eq!(resolve_font_weight("bold", "400").as_deref(), Some("700"));
        assert_eq!(resolve_font_weight("normal", "700").as_deref(), Some("400"));
        assert_eq!(resolve_font_weight("600", "400").as_deref(), Some("600"));
        assert_eq!(resolve_font_weight("heavy", "400"), None);
        assert_eq!(resolve_font_weight("0", "400"), None);
    }

    #[test]
    fn test_relative_font_weights() {
        assert_eq!(resolve_font_weight("bolder", "400").as_deref(), Some("700"));
        assert_eq!(resolve_font_weight("bolder", "700").as_deref(), Some("900"));
        assert_eq!(resolve_font_weight("lighter", "700").as_deref(), Some("400"));
        assert_eq!(resolve_font_weight("lighter", "400").as_deref(), Some("100"));
    }

    #[test]
    fn test_display_keyword() {
        assert_eq!(resolve_display("none").as_deref(), Some("none"));
        assert_eq!(resolve_display("Block flow").as_deref(), Some("block"));
        assert_eq!(resolve_display(""), None);
    }

    #[test]
    fn test_wide_keywords() {
        assert_eq!(WideKeyword::parse("INHERIT"), Some(WideKeyword::Inherit));
        assert_eq!(WideKeyword::parse("initial"), Some(WideKeyword::Initial));
        assert_eq!(WideKeyword::parse("red"), None);
    }
}
