//! Parameter extraction.
//!
//! Linear and quadratic coefficients are recovered by probing the compiled expression, which is
//! exact for any algebraically equivalent layout. Everything else, and the probes' failures, fall
//! back to pattern matching over the normalised text. Extraction never fails; a coefficient which
//! cannot be found takes its slider default.

use super::*;
use once_cell::sync::Lazy;
use regex::{Match, Regex};

/// A named coefficient and its slider bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub label: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl Parameter {
    /// Set the value, clamped to the slider bounds.
    pub fn set(&mut self, value: f64) {
        self.value = if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        };
    }

    pub fn reset(&mut self) {
        self.value = self.default;
    }
}

/// The fixed slider description of a parameter.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Slider {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl Slider {
    const fn new(name: &'static str, label: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self {
            name,
            label,
            min,
            max,
            step: 0.1,
            default,
        }
    }

    const fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    fn with(&self, value: f64) -> Parameter {
        Parameter {
            name: self.name.to_string(),
            label: self.label.to_string(),
            value,
            min: self.min,
            max: self.max,
            step: self.step,
            default: self.default,
        }
    }
}

const LINEAR: &[Slider] = &[
    Slider::new("m", "Slope (m)", -10.0, 10.0, 1.0),
    Slider::new("b", "Y-intercept (b)", -10.0, 10.0, 0.0),
];
const QUADRATIC: &[Slider] = &[
    Slider::new("a", "Coefficient a", -10.0, 10.0, 1.0),
    Slider::new("b", "Coefficient b", -10.0, 10.0, 0.0),
    Slider::new("c", "Constant c", -10.0, 10.0, 0.0),
];
const CUBIC: &[Slider] = &[Slider::new("a", "Coefficient a", -5.0, 5.0, 1.0)];
const CIRCLE: &[Slider] = &[Slider::new("r", "Radius (r)", 0.5, 15.0, 5.0).step(0.5)];
const CONIC: &[Slider] = &[
    Slider::new("a", "Semi-major axis (a)", 0.5, 10.0, 3.0),
    Slider::new("b", "Semi-minor axis (b)", 0.5, 10.0, 2.0),
];
const TRIG: &[Slider] = &[
    Slider::new("a", "Amplitude (a)", -5.0, 5.0, 1.0),
    Slider::new("b", "Frequency (b)", 0.1, 5.0, 1.0),
];
const SCALE: &[Slider] = &[Slider::new("a", "Coefficient (a)", -5.0, 5.0, 1.0)];

/// The sliders an equation type carries, in display order.
pub fn sliders(kind: EquationType) -> &'static [Slider] {
    use EquationType::*;
    match kind {
        Linear => LINEAR,
        Quadratic => QUADRATIC,
        Cubic => CUBIC,
        Circle => CIRCLE,
        Ellipse | Hyperbola => CONIC,
        Sine | Cosine | Tangent => TRIG,
        Exponential | Logarithmic => SCALE,
        ThreeD | Unknown => &[],
    }
}

macro_rules! re {
    ($name:ident, $pat:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pat).expect("valid regex"));
    };
}

re!(LINEAR_M, r"(-?\d*\.?\d*)\*?x");
re!(LINEAR_B, r"([+-])(\d+\.?\d*)");
re!(QUAD_A, r"(-?\d*\.?\d*)\*?x\^2");
re!(QUAD_B, r"([+-])(-?\d*\.?\d*)\*?x");
re!(QUAD_C, r"([+-])(\d+\.?\d*)$");
re!(CUBIC_A, r"(-?\d*\.?\d*)\*?x\^3");
re!(CIRCLE_RHS, r"=(\d+\.?\d*)");
re!(CIRCLE_RESIDUAL, r"-(\d+\.?\d*)$");
re!(CONIC_A, r"(?:x\^2|\(x\^2\))/(\d+\.?\d*)");
re!(CONIC_B, r"(?:y\^2|\(y\^2\))/(\d+\.?\d*)");
re!(SIN_A, r"(-?\d*\.?\d*)\*?sin");
re!(SIN_B, r"sin\((-?\d*\.?\d*)\*?x");
re!(COS_A, r"(-?\d*\.?\d*)\*?cos");
re!(COS_B, r"cos\((-?\d*\.?\d*)\*?x");
re!(TAN_A, r"(-?\d*\.?\d*)\*?tan");
re!(TAN_B, r"tan\((-?\d*\.?\d*)\*?x");
re!(EXP_A, r"(-?\d*\.?\d*)\*?(?:exp|e\^)");
re!(LOG_A, r"(-?\d*\.?\d*)\*?(?:log|ln)");

/// Derive the parameters of normalised `text` of type `kind`.
///
/// ```rust
/// use eqplot::{extract, EquationType};
///
/// let params = extract("(x+1)*2-x", EquationType::Linear);
/// assert_eq!(params[0].name, "m");
/// assert!((params[0].value - 1.0).abs() < 1e-9);
/// assert!((params[1].value - 2.0).abs() < 1e-9);
/// ```
pub fn extract(text: &str, kind: EquationType) -> Vec<Parameter> {
    use EquationType::*;
    let text = normalize::assignment_body(text);

    let values = match kind {
        Linear => probe_linear(text).unwrap_or_else(|| {
            debug!("probing '{text}' failed, scraping linear coefficients");
            vec![
                coefficient(&LINEAR_M, text, 1.0),
                signed_constant(&LINEAR_B, text, 0.0, |m| {
                    !matches!(after(text, m), Some('x' | '*'))
                }),
            ]
        }),
        Quadratic => probe_quadratic(text).unwrap_or_else(|| {
            debug!("probing '{text}' failed, scraping quadratic coefficients");
            vec![
                coefficient(&QUAD_A, text, 1.0),
                signed_constant(&QUAD_B, text, 0.0, |m| after(text, m) != Some('^')),
                signed_constant(&QUAD_C, text, 0.0, |_| true),
            ]
        }),
        Cubic => vec![coefficient(&CUBIC_A, text, 1.0)],
        Circle => vec![radius(text)],
        Ellipse | Hyperbola => vec![
            semi_axis(&CONIC_A, text, CONIC[0].default),
            semi_axis(&CONIC_B, text, CONIC[1].default),
        ],
        Sine => vec![coefficient(&SIN_A, text, 1.0), coefficient(&SIN_B, text, 1.0)],
        Cosine => vec![coefficient(&COS_A, text, 1.0), coefficient(&COS_B, text, 1.0)],
        Tangent => vec![coefficient(&TAN_A, text, 1.0), coefficient(&TAN_B, text, 1.0)],
        Exponential => vec![coefficient(&EXP_A, text, 1.0)],
        Logarithmic => vec![coefficient(&LOG_A, text, 1.0)],
        ThreeD | Unknown => Vec::new(),
    };

    sliders(kind)
        .iter()
        .zip(values)
        .map(|(s, v)| s.with(v))
        .collect()
}

/// Evaluate `text` at each `x`, only if every probe is finite.
fn probe<const N: usize>(text: &str, xs: [f64; N]) -> Option<[f64; N]> {
    if normalize::has_bare_equals(text) {
        return None;
    }

    let expr = Expression::compile(text).ok()?;
    let mut ys = [0.0; N];
    for (y, x) in ys.iter_mut().zip(xs) {
        *y = expr.eval(&Scope::new().with("x", x)).filter(|y| y.is_finite())?;
    }
    Some(ys)
}

fn probe_linear(text: &str) -> Option<Vec<f64>> {
    let [f0, f1] = probe(text, [0.0, 1.0])?;
    debug!("probed '{text}' as a line");
    Some(vec![f1 - f0, f0])
}

fn probe_quadratic(text: &str) -> Option<Vec<f64>> {
    let [f0, f1, fm1] = probe(text, [0.0, 1.0, -1.0])?;
    debug!("probed '{text}' as a parabola");
    let c = f0;
    let a = (f1 + fm1 - 2.0 * c) / 2.0;
    let b = (f1 - fm1) / 2.0;
    Some(vec![a, b, c])
}

fn after(text: &str, m: Match) -> Option<char> {
    text[m.end()..].chars().next()
}

/// The leading coefficient captured by `re`.
fn coefficient(re: &Regex, text: &str, default: f64) -> f64 {
    re.captures(text)
        .map(|c| parse_coefficient(c.get(1).map_or("", |m| m.as_str()), default))
        .unwrap_or(default)
}

/// A signed term: group 1 is the sign, group 2 the magnitude. The first match passing `accept` on
/// the whole match is taken.
fn signed_constant<F>(re: &Regex, text: &str, default: f64, accept: F) -> f64
where
    F: Fn(Match) -> bool,
{
    re.captures_iter(text)
        .find(|c| c.get(0).map_or(false, &accept))
        .map(|c| {
            let v = parse_coefficient(c.get(2).map_or("", |m| m.as_str()), default);
            if &c[1] == "-" {
                -v
            } else {
                v
            }
        })
        .unwrap_or(default)
}

/// An empty capture is the default; a lone `-` negates it.
fn parse_coefficient(s: &str, default: f64) -> f64 {
    match s {
        "" => default,
        "-" => -default,
        s => s
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(default),
    }
}

fn radius(text: &str) -> f64 {
    let rsq = CIRCLE_RHS
        .captures(text)
        .or_else(|| CIRCLE_RESIDUAL.captures(text))
        .and_then(|c| c[1].parse::<f64>().ok());

    match rsq {
        Some(v) => v.abs().sqrt(),
        None => CIRCLE[0].default,
    }
}

fn semi_axis(re: &Regex, text: &str, default: f64) -> f64 {
    re.captures(text)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(|v| v.abs().sqrt())
        .unwrap_or(default)
}
