//! Descriptive properties of an equation, derived from its parameters.

use super::*;
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub name: &'static str,
    pub value: String,
}

/// Parameter values by name, with fallbacks.
pub(crate) struct Values<'a>(pub &'a [Parameter]);

impl Values<'_> {
    pub fn get(&self, name: &str, default: f64) -> f64 {
        self.0
            .iter()
            .find(|p| p.name == name)
            .map_or(default, |p| p.value)
    }
}

/// Two decimal places, without a negative zero.
pub(crate) fn fx(v: f64) -> String {
    fixed(v, 2)
}

pub(crate) fn fixed(v: f64, places: usize) -> String {
    let s = format!("{v:.places$}");
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => s,
    }
}

/// The properties listed for an equation of type `kind`.
///
/// Surfaces and unrecognised expressions have none.
pub fn properties(kind: EquationType, parameters: &[Parameter]) -> Vec<Property> {
    use EquationType::*;
    let p = Values(parameters);

    let list: Vec<(&'static str, String)> = match kind {
        Linear => linear(p.get("m", 1.0), p.get("b", 0.0)),
        Quadratic => quadratic(p.get("a", 1.0), p.get("b", 0.0), p.get("c", 0.0)),
        Cubic => cubic(p.get("a", 1.0), p.get("b", 0.0), p.get("c", 0.0), p.get("d", 0.0)),
        Circle => {
            let r = p.get("r", 5.0);
            vec![
                ("Center", point(p.get("h", 0.0), p.get("k", 0.0))),
                ("Radius", fx(r)),
                ("Diameter", fx(2.0 * r)),
                ("Circumference", fx(2.0 * PI * r)),
                ("Area", fx(PI * r * r)),
            ]
        }
        Ellipse => ellipse(p.get("a", 5.0), p.get("b", 3.0), p.get("h", 0.0), p.get("k", 0.0)),
        Hyperbola => hyperbola(p.get("a", 3.0), p.get("b", 2.0)),
        Exponential => {
            let (a, b) = (p.get("a", 1.0), p.get("b", 1.0));
            vec![
                ("Coefficient", fx(a)),
                ("Growth", if b > 0.0 { "Growth" } else { "Decay" }.into()),
                ("Y-Intercept", fx(a)),
                ("Horizontal Asymptote", "y = 0".into()),
                ("Domain", "All real numbers".into()),
                ("Range", if a > 0.0 { "y > 0" } else { "y < 0" }.into()),
            ]
        }
        Logarithmic => {
            let a = p.get("a", 1.0);
            vec![
                ("Coefficient", fx(a)),
                ("Vertical Asymptote", "x = 0".into()),
                ("Domain", "x > 0".into()),
                ("Range", "All real numbers".into()),
                ("X-Intercept", "1".into()),
                ("Behavior", if a > 0.0 { "Increasing" } else { "Decreasing" }.into()),
            ]
        }
        Sine | Cosine | Tangent => periodic(
            kind,
            p.get("a", 1.0),
            p.get("b", 1.0),
            p.get("c", 0.0),
            p.get("d", 0.0),
        ),
        ThreeD | Unknown => Vec::new(),
    };

    list.into_iter()
        .map(|(name, value)| Property { name, value })
        .collect()
}

fn point(x: f64, y: f64) -> String {
    format!("({}, {})", fx(x), fx(y))
}

fn linear(m: f64, b: f64) -> Vec<(&'static str, String)> {
    let direction = if m > 0.0 {
        "Increasing"
    } else if m < 0.0 {
        "Decreasing"
    } else {
        "Horizontal"
    };

    vec![
        ("Slope", fx(m)),
        ("Y-Intercept", fx(b)),
        (
            "X-Intercept",
            if m != 0.0 {
                fx(-b / m)
            } else {
                "undefined".into()
            },
        ),
        ("Direction", direction.into()),
        ("Angle", format!("{}°", fx(m.atan().to_degrees()))),
    ]
}

fn quadratic(a: f64, b: f64, c: f64) -> Vec<(&'static str, String)> {
    let h = -b / (2.0 * a);
    let k = a * h * h + b * h + c;
    let disc = b * b - 4.0 * a * c;

    let roots = if disc > 0.0 {
        let r1 = (-b + disc.sqrt()) / (2.0 * a);
        let r2 = (-b - disc.sqrt()) / (2.0 * a);
        format!("x = {}, x = {}", fx(r1), fx(r2))
    } else if disc == 0.0 {
        format!("x = {} (double root)", fx(h))
    } else {
        "No real roots".into()
    };

    vec![
        ("Vertex", point(h, k)),
        ("Axis of Symmetry", format!("x = {}", fx(h))),
        (
            "Direction",
            if a > 0.0 { "Opens upward" } else { "Opens downward" }.into(),
        ),
        ("Discriminant", fx(disc)),
        ("Roots", roots),
        ("Y-Intercept", fx(c)),
        ("Vertex Type", if a > 0.0 { "Minimum" } else { "Maximum" }.into()),
    ]
}

fn cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<(&'static str, String)> {
    let x = -b / (3.0 * a);
    let y = a * x.powi(3) + b * x.powi(2) + c * x + d;

    vec![
        ("Inflection Point", point(x, y)),
        ("Y-Intercept", fx(d)),
        (
            "End Behavior",
            if a > 0.0 {
                "Falls left, rises right"
            } else {
                "Rises left, falls right"
            }
            .into(),
        ),
        ("Degree", "3 (cubic)".into()),
    ]
}

fn ellipse(a: f64, b: f64, h: f64, k: f64) -> Vec<(&'static str, String)> {
    let c = (a * a - b * b).abs().sqrt();
    let major = a.max(b);

    vec![
        ("Center", point(h, k)),
        ("Semi-major Axis", fx(major)),
        ("Semi-minor Axis", fx(a.min(b))),
        ("Focal Distance", fx(c)),
        ("Eccentricity", fixed(c / major, 3)),
        ("Area", fx(PI * a * b)),
    ]
}

fn hyperbola(a: f64, b: f64) -> Vec<(&'static str, String)> {
    let c = a.hypot(b);

    vec![
        ("Center", "(0, 0)".into()),
        ("Vertices", format!("(±{}, 0)", fx(a))),
        ("Foci", format!("(±{}, 0)", fx(c))),
        ("Asymptotes", format!("y = ±{}x", fx(b / a))),
        ("Eccentricity", fixed(c / a, 3)),
        ("Transverse Axis", fx(2.0 * a)),
    ]
}

fn periodic(kind: EquationType, a: f64, b: f64, c: f64, d: f64) -> Vec<(&'static str, String)> {
    let amplitude = a.abs();
    let (period, range) = if kind == EquationType::Tangent {
        (PI / b.abs(), "All real numbers".to_string())
    } else {
        (
            2.0 * PI / b.abs(),
            format!("[{}, {}]", fx(d - amplitude), fx(d + amplitude)),
        )
    };

    vec![
        ("Amplitude", fx(amplitude)),
        ("Period", fx(period)),
        ("Frequency", fx(b)),
        ("Phase Shift", fx(-c / b)),
        ("Vertical Shift", fx(d)),
        ("Range", range),
        ("Midline", format!("y = {}", fx(d))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(raw: &str) -> Vec<(&'static str, String)> {
        let eq = Equation::parse(raw).unwrap();
        properties(eq.kind, &eq.parameters)
            .into_iter()
            .map(|p| (p.name, p.value))
            .collect()
    }

    fn get(props: &[(&'static str, String)], name: &str) -> String {
        props
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| panic!("no property {name}"))
    }

    #[test]
    fn fixed_places() {
        assert_eq!(fx(1.0), "1.00");
        assert_eq!(fx(-0.0), "0.00");
        assert_eq!(fx(-0.001), "0.00");
        assert_eq!(fx(-1.5), "-1.50");
        assert_eq!(fixed(0.8, 3), "0.800");
    }

    #[test]
    fn linear() {
        let p = props("2*x+1");
        assert_eq!(get(&p, "Slope"), "2.00");
        assert_eq!(get(&p, "Y-Intercept"), "1.00");
        assert_eq!(get(&p, "X-Intercept"), "-0.50");
        assert_eq!(get(&p, "Direction"), "Increasing");
        assert_eq!(get(&p, "Angle"), "63.43°");

        let p = props("0*x+3");
        assert_eq!(get(&p, "X-Intercept"), "undefined");
        assert_eq!(get(&p, "Direction"), "Horizontal");
    }

    #[test]
    fn quadratic() {
        let p = props("x^2-4");
        assert_eq!(get(&p, "Vertex"), "(0.00, -4.00)");
        assert_eq!(get(&p, "Roots"), "x = 2.00, x = -2.00");
        assert_eq!(get(&p, "Discriminant"), "16.00");
        assert_eq!(get(&p, "Vertex Type"), "Minimum");

        assert_eq!(get(&props("x^2+2*x+1"), "Roots"), "x = -1.00 (double root)");
        assert_eq!(get(&props("-x^2-1"), "Roots"), "No real roots");
        assert_eq!(get(&props("-x^2-1"), "Direction"), "Opens downward");
    }

    #[test]
    fn conics() {
        let p = props("x^2+y^2=25");
        assert_eq!(get(&p, "Radius"), "5.00");
        assert_eq!(get(&p, "Circumference"), "31.42");
        assert_eq!(get(&p, "Area"), "78.54");

        let p = props("x^2/25+y^2/9=1");
        assert_eq!(get(&p, "Focal Distance"), "4.00");
        assert_eq!(get(&p, "Eccentricity"), "0.800");

        let p = props("x^2/9-y^2/16=1");
        assert_eq!(get(&p, "Foci"), "(±5.00, 0)");
        assert_eq!(get(&p, "Asymptotes"), "y = ±1.33x");
        assert_eq!(get(&p, "Eccentricity"), "1.667");
    }

    #[test]
    fn periodic() {
        let p = props("2*sin(3*x)");
        assert_eq!(get(&p, "Amplitude"), "2.00");
        assert_eq!(get(&p, "Period"), "2.09");
        assert_eq!(get(&p, "Range"), "[-2.00, 2.00]");

        let p = props("tan(2*x)");
        assert_eq!(get(&p, "Period"), "1.57");
        assert_eq!(get(&p, "Range"), "All real numbers");
    }

    #[test]
    fn growth_and_logs() {
        assert_eq!(get(&props("-2*e^x"), "Range"), "y < 0");
        assert_eq!(get(&props("3*ln(x)"), "Behavior"), "Increasing");
    }

    #[test]
    fn surfaces_have_none() {
        assert!(props("x*y").is_empty());
        assert!(props("1+x^1.5").is_empty());
    }
}
