//! Equation classification.
//!
//! A fast heuristic over the textual layout of the normalised expression and its free variables.
//! The rules are not mutually exclusive; their order is the tie-break.

use super::*;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{collections::BTreeSet, f64::consts::PI, fmt};

macro_rules! re {
    ($name:ident, $pat:literal) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pat).expect("valid regex"));
    };
}

re!(Z_ASSIGNMENT, r"^z=");
re!(CIRCLE, r"x\^2.*\+.*y\^2");
re!(
    ELLIPSE,
    r"(?:x\^2|\(x\^2\))/.*\+.*(?:y\^2|\(y\^2\))/"
);
re!(
    HYPERBOLA,
    r"(?:x\^2|\(x\^2\))/.*-.*(?:y\^2|\(y\^2\))/"
);
re!(EXPONENTIAL, r"exp\(|e\^");
re!(LOGARITHMIC, r"log\(|ln\(");

/// The mathematical family of an expression.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquationType {
    Linear,
    Quadratic,
    Cubic,
    Circle,
    Ellipse,
    Hyperbola,
    Exponential,
    Logarithmic,
    Sine,
    Cosine,
    Tangent,
    ThreeD,
    Unknown,
}

/// Display metadata for an [`EquationType`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct TypeInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub standard_form: &'static str,
}

impl EquationType {
    pub const ALL: [EquationType; 13] = [
        Self::Linear,
        Self::Quadratic,
        Self::Cubic,
        Self::Circle,
        Self::Ellipse,
        Self::Hyperbola,
        Self::Exponential,
        Self::Logarithmic,
        Self::Sine,
        Self::Cosine,
        Self::Tangent,
        Self::ThreeD,
        Self::Unknown,
    ];

    /// The tag, as serialised.
    pub fn as_str(self) -> &'static str {
        use EquationType::*;
        match self {
            Linear => "linear",
            Quadratic => "quadratic",
            Cubic => "cubic",
            Circle => "circle",
            Ellipse => "ellipse",
            Hyperbola => "hyperbola",
            Exponential => "exponential",
            Logarithmic => "logarithmic",
            Sine => "sine",
            Cosine => "cosine",
            Tangent => "tangent",
            ThreeD => "three_d",
            Unknown => "unknown",
        }
    }

    pub fn info(self) -> TypeInfo {
        use EquationType::*;
        let (name, description, standard_form) = match self {
            Linear => (
                "Linear Function",
                "A straight line representing a constant rate of change. Linear functions model \
                 proportional relationships and are the foundation of algebra.",
                "y = mx + b",
            ),
            Quadratic => (
                "Quadratic Function",
                "A parabola representing acceleration, projectile motion, and optimization \
                 problems. The vertex represents the maximum or minimum point.",
                "y = ax² + bx + c",
            ),
            Cubic => (
                "Cubic Function",
                "A polynomial of degree 3 with up to two turning points. Cubic functions can \
                 model volume relationships and complex growth patterns.",
                "y = ax³ + bx² + cx + d",
            ),
            Circle => (
                "Circle",
                "The set of all points equidistant from a center point. Circles represent \
                 perfect symmetry and appear in physics, engineering, and nature.",
                "x² + y² = r²",
            ),
            Ellipse => (
                "Ellipse",
                "An oval shape with two focal points. Ellipses describe planetary orbits and \
                 are fundamental in astronomy and optics.",
                "x²/a² + y²/b² = 1",
            ),
            Hyperbola => (
                "Hyperbola",
                "Two mirror-image curves with asymptotes. Hyperbolas model inverse \
                 relationships and appear in navigation systems.",
                "x²/a² - y²/b² = 1",
            ),
            Exponential => (
                "Exponential Function",
                "Rapid growth or decay functions modeling population growth, radioactive \
                 decay, and compound interest. The curve never touches the x-axis.",
                "y = a·eᵇˣ",
            ),
            Logarithmic => (
                "Logarithmic Function",
                "The inverse of exponential functions, modeling phenomena that grow quickly \
                 then level off, like sound intensity and pH scales.",
                "y = a·log(bx)",
            ),
            Sine => (
                "Sine Wave",
                "Periodic oscillation representing sound waves, ocean tides, and alternating \
                 current. The wave repeats every 2π units with smooth peaks and valleys.",
                "y = a·sin(bx + c) + d",
            ),
            Cosine => (
                "Cosine Wave",
                "Similar to sine but shifted by π/2. Cosine waves model periodic motion and \
                 are essential in signal processing and physics.",
                "y = a·cos(bx + c) + d",
            ),
            Tangent => (
                "Tangent Function",
                "A periodic function with vertical asymptotes. Tangent represents the ratio of \
                 sine to cosine and appears in trigonometry and geometry.",
                "y = a·tan(bx + c) + d",
            ),
            ThreeD => (
                "3D Surface",
                "A function of two variables z = f(x,y). These surfaces exist in specific 3D \
                 space and allow visualizing complex relationships.",
                "z = f(x, y)",
            ),
            Unknown => (
                "Custom Function",
                "An expression outside the recognised families. It is plotted as a general \
                 function of x.",
                "y = f(x)",
            ),
        };

        TypeInfo {
            name,
            description,
            standard_form,
        }
    }

    /// The x-domain sampled when the caller supplies no viewport.
    pub fn default_x_range(self) -> Range {
        use EquationType::*;
        match self {
            Logarithmic => Range::new(0.1, 10.0),
            Exponential => Range::new(-5.0, 5.0),
            Sine | Cosine | Tangent => Range::new(-2.0 * PI, 2.0 * PI),
            _ => Range::new(-10.0, 10.0),
        }
    }

    pub fn is_trig(self) -> bool {
        matches!(self, Self::Sine | Self::Cosine | Self::Tangent)
    }

    pub fn is_conic(self) -> bool {
        matches!(self, Self::Circle | Self::Ellipse | Self::Hyperbola)
    }
}

impl fmt::Display for EquationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Rule = fn(&str, &BTreeSet<String>) -> Option<EquationType>;

/// First match wins.
const RULES: &[Rule] = &[
    surface_or_conic,
    |t, _| t.contains("sin(").then_some(EquationType::Sine),
    |t, _| t.contains("cos(").then_some(EquationType::Cosine),
    |t, _| t.contains("tan(").then_some(EquationType::Tangent),
    |t, _| EXPONENTIAL.is_match(t).then_some(EquationType::Exponential),
    |t, _| LOGARITHMIC.is_match(t).then_some(EquationType::Logarithmic),
    polynomial,
];

/// Classify normalised text given its free variables.
///
/// Deterministic and total: anything unrecognised is [`EquationType::Unknown`].
///
/// ```rust
/// use eqplot::{classify, EquationType};
///
/// let vars = ["x", "y"].map(String::from).into_iter().collect();
/// assert_eq!(classify("x^2+y^2==25", &vars), EquationType::Circle);
/// ```
pub fn classify(text: &str, variables: &BTreeSet<String>) -> EquationType {
    let kind = RULES
        .iter()
        .find_map(|rule| rule(text, variables))
        .unwrap_or(EquationType::Unknown);
    debug!("classified '{text}' as {kind}");
    kind
}

fn surface_or_conic(text: &str, vars: &BTreeSet<String>) -> Option<EquationType> {
    if vars.contains("z") || Z_ASSIGNMENT.is_match(text) {
        return Some(EquationType::ThreeD);
    }

    if !(vars.contains("x") && vars.contains("y")) {
        return None;
    }

    let kind = if CIRCLE.is_match(text) && !text.contains('/') {
        EquationType::Circle
    } else if ELLIPSE.is_match(text) {
        EquationType::Ellipse
    } else if HYPERBOLA.is_match(text) {
        EquationType::Hyperbola
    } else {
        EquationType::ThreeD
    };
    Some(kind)
}

fn polynomial(text: &str, vars: &BTreeSet<String>) -> Option<EquationType> {
    if vars.contains("y") {
        return None;
    }

    if text.contains("x^3") {
        Some(EquationType::Cubic)
    } else if text.contains("x^2") {
        Some(EquationType::Quadratic)
    } else if has_plain_x(text) {
        Some(EquationType::Linear)
    } else {
        None
    }
}

/// A standalone `x` token which is not raised to a power. A leading coefficient (`2x`) is fine.
fn has_plain_x(text: &str) -> bool {
    let b = text.as_bytes();
    b.iter().enumerate().any(|(i, c)| {
        let before = i.checked_sub(1).map(|j| b[j]);
        let after = b.get(i + 1);
        *c == b'x'
            && !matches!(before, Some(p) if p.is_ascii_alphabetic() || p == b'_')
            && !matches!(after, Some(n) if n.is_ascii_alphanumeric() || *n == b'_' || *n == b'^')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(raw: &str) -> EquationType {
        let text = normalize(raw);
        let expr = Expression::compile(&text).unwrap();
        classify(&text, expr.variables())
    }

    #[test]
    fn documented_cases() {
        assert_eq!(kind("sin(x)"), EquationType::Sine);
        assert_eq!(kind("2*sin(3*x)"), EquationType::Sine);
        assert_eq!(kind("x^2+y^2-25"), EquationType::Circle);
        assert_eq!(kind("x^2/25+y^2/9-1"), EquationType::Ellipse);
        assert_eq!(kind("x^2/16-y^2/9-1"), EquationType::Hyperbola);
        assert_eq!(kind("2*x+1"), EquationType::Linear);
        assert_eq!(kind("x^3-2*x^2+x-1"), EquationType::Cubic);
        assert_eq!(kind("sin(x)*cos(y)"), EquationType::ThreeD);
        assert_eq!(kind("1"), EquationType::Unknown);
    }

    #[test]
    fn presets() {
        use EquationType::*;
        let cases = [
            ("x^2", Quadratic),
            ("x^2 - 4", Quadratic),
            ("2*x^2 + 3*x - 5", Quadratic),
            ("-x + 3", Linear),
            ("x^3", Cubic),
            ("x^2 + y^2 - 16", Circle),
            ("e^x", Exponential),
            ("2*e^x", Exponential),
            ("e^(-x)", Exponential),
            ("log(x)", Logarithmic),
            ("ln(x)", Logarithmic),
            ("cos(x)", Cosine),
            ("3*cos(2*x)", Cosine),
            ("tan(x)", Tangent),
            ("x^2 + y^2", Circle),
            ("x^2 - y^2", ThreeD),
            ("sin(sqrt(x^2 + y^2))", ThreeD),
            ("(x^2)/16 + (y^2)/9 - 1", Ellipse),
            ("(x^2)/4 - (y^2)/9 - 1", Hyperbola),
        ];

        for (raw, expected) in cases {
            assert_eq!(kind(raw), expected, "{raw}");
        }
    }

    #[test]
    fn equality_forms() {
        assert_eq!(kind("x^2 + y^2 = 25"), EquationType::Circle);
        assert_eq!(kind("x^2/16 + y^2/9 = 1"), EquationType::Ellipse);
        assert_eq!(kind("x^2/16 - y^2/9 = 1"), EquationType::Hyperbola);
    }

    #[test]
    fn surfaces() {
        assert_eq!(kind("z = x + y"), EquationType::ThreeD);
        assert_eq!(kind("x*y"), EquationType::ThreeD);
        assert_eq!(kind("x*y*z"), EquationType::ThreeD);
        // a trig call in two variables is still a surface
        assert_eq!(kind("sin(x+y)"), EquationType::ThreeD);
    }

    #[test]
    fn assignments_classify_by_their_body() {
        assert_eq!(kind("y = 2*x + 1"), EquationType::Linear);
        assert_eq!(kind("y = x^2"), EquationType::Quadratic);
        assert_eq!(kind("f(x) = sin(x)"), EquationType::Sine);
    }

    #[test]
    fn implicit_coefficients() {
        assert_eq!(kind("2x+1"), EquationType::Linear);
        assert_eq!(kind("3x^2"), EquationType::Quadratic);
        assert_eq!(kind("2e^x"), EquationType::Exponential);
        assert_eq!(kind("2log(x)"), EquationType::Logarithmic);
        assert_eq!(kind("3ln(x)"), EquationType::Logarithmic);
        assert_eq!(kind("2sin^2(x)"), EquationType::Sine);
    }

    #[test]
    fn powers_only_are_not_linear() {
        assert_eq!(kind("x^1.5"), EquationType::Unknown);
        assert_eq!(kind("x^1.5+x"), EquationType::Linear);
        assert!(!has_plain_x("exp"));
        assert!(!has_plain_x("x2"));
        assert!(has_plain_x("2x"));
    }

    #[test]
    fn deterministic() {
        let mut rng = fastrand::Rng::with_seed(7);
        let atoms = ["x", "y", "2", "sin(x)", "x^2", "log(x)", "e^x", "(x+1)", "z"];
        let ops = ["+", "-", "*", "/"];

        for _ in 0..200 {
            let mut raw = atoms[rng.usize(..atoms.len())].to_string();
            for _ in 0..rng.usize(1..4) {
                raw.push_str(ops[rng.usize(..ops.len())]);
                raw.push_str(atoms[rng.usize(..atoms.len())]);
            }

            let text = normalize(&raw);
            let vars = Expression::compile(&text).unwrap().variables().clone();
            let a = classify(&text, &vars);
            let b = classify(&normalize(&raw), &vars);
            assert_eq!(a, b, "{raw}");
            assert!(EquationType::ALL.contains(&a));
        }
    }

    #[test]
    fn default_ranges() {
        assert_eq!(
            EquationType::Logarithmic.default_x_range(),
            Range::new(0.1, 10.0)
        );
        assert_eq!(EquationType::Sine.default_x_range().max, 2.0 * PI);
        assert_eq!(
            EquationType::Unknown.default_x_range(),
            Range::new(-10.0, 10.0)
        );
    }

    #[test]
    fn every_type_has_info() {
        for t in EquationType::ALL {
            let info = t.info();
            assert!(!info.name.is_empty());
            assert!(!info.standard_form.is_empty());
        }
    }

    #[test]
    fn serialises_as_tag() {
        assert_eq!(
            serde_json::to_string(&EquationType::ThreeD).unwrap(),
            "\"three_d\""
        );
        assert_eq!(EquationType::ThreeD.to_string(), "three_d");
    }
}
