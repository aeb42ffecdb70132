//! Worked, step-by-step explanations of an equation.

use super::*;
use crate::properties::{fixed, fx, Values};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub step: String,
    pub explanation: String,
    pub formula: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub title: String,
    pub steps: Vec<Step>,
}

fn step(step: &str, explanation: impl Into<String>, formula: impl Into<String>) -> Step {
    Step {
        step: step.to_string(),
        explanation: explanation.into(),
        formula: formula.into(),
    }
}

/// Explain `text`, an equation of type `kind` with the given parameters.
///
/// Types without a worked form get a single step echoing the equation.
pub fn solution(kind: EquationType, parameters: &[Parameter], text: &str) -> Solution {
    use EquationType::*;
    let p = Values(parameters);

    let (title, steps) = match kind {
        Linear => ("Linear Equation Solution", linear(p.get("m", 1.0), p.get("b", 0.0))),
        Quadratic => (
            "Quadratic Equation Solution",
            quadratic(p.get("a", 1.0), p.get("b", 0.0), p.get("c", 0.0)),
        ),
        Cubic => (
            "Cubic Equation Solution",
            cubic(p.get("a", 1.0), p.get("b", 0.0), p.get("c", 0.0), p.get("d", 0.0)),
        ),
        Circle => (
            "Circle Equation Solution",
            circle(p.get("r", 5.0), p.get("h", 0.0), p.get("k", 0.0)),
        ),
        Ellipse => (
            "Ellipse Equation Solution",
            ellipse(p.get("a", 5.0), p.get("b", 3.0), p.get("h", 0.0), p.get("k", 0.0)),
        ),
        Hyperbola => ("Hyperbola Equation Solution", hyperbola(p.get("a", 3.0), p.get("b", 2.0))),
        Exponential => (
            "Exponential Equation Solution",
            exponential(p.get("a", 1.0), p.get("b", 1.0)),
        ),
        Logarithmic => ("Logarithmic Equation Solution", logarithmic(p.get("a", 1.0))),
        Sine => ("Sine Wave Solution", wave(kind, &p)),
        Cosine => ("Cosine Wave Solution", wave(kind, &p)),
        Tangent => ("Tangent Wave Solution", wave(kind, &p)),
        ThreeD | Unknown => (
            "Equation Analysis",
            vec![step(
                "Equation recognized",
                "This equation type requires manual analysis.",
                text,
            )],
        ),
    };

    debug!("{} step(s) for {kind}", steps.len());
    Solution {
        title: title.to_string(),
        steps,
    }
}

fn linear(m: f64, b: f64) -> Vec<Step> {
    let x_intercept = if m != 0.0 {
        fx(-b / m)
    } else {
        "undefined".to_string()
    };
    let (why, direction) = if m > 0.0 {
        ("Since m > 0, the line rises from left to right (increasing).", "Increasing ↗")
    } else if m < 0.0 {
        ("Since m < 0, the line falls from left to right (decreasing).", "Decreasing ↘")
    } else {
        ("Since m = 0, the line is horizontal.", "Horizontal →")
    };

    vec![
        step(
            "Identify the equation form",
            "A linear equation has the form y = mx + b, where m is the slope and b is the y-intercept.",
            "y = mx + b",
        ),
        step(
            "Extract the slope (m)",
            format!("The slope m determines how steep the line is. Here, m = {}.", fx(m)),
            format!("m = {}", fx(m)),
        ),
        step(
            "Extract the y-intercept (b)",
            format!(
                "The y-intercept b is where the line crosses the y-axis. Here, b = {}.",
                fx(b)
            ),
            format!("b = {}", fx(b)),
        ),
        step(
            "Find the x-intercept",
            "Set y = 0 and solve for x: 0 = mx + b → x = -b/m",
            format!("x-intercept = {x_intercept}"),
        ),
        step(
            "Determine the angle with x-axis",
            "The angle θ = arctan(m)",
            format!("θ = {}°", fx(m.atan().to_degrees())),
        ),
        step("Interpret the slope", why, format!("Direction: {direction}")),
    ]
}

fn quadratic(a: f64, b: f64, c: f64) -> Vec<Step> {
    let d = b * b - 4.0 * a * c;
    let h = -b / (2.0 * a);
    let k = a * h * h + b * h + c;

    let (why, roots) = if d > 0.0 {
        let r1 = (-b + d.sqrt()) / (2.0 * a);
        let r2 = (-b - d.sqrt()) / (2.0 * a);
        (
            "Since D > 0, there are two distinct real roots.",
            format!("x₁ = {}, x₂ = {}", fx(r1), fx(r2)),
        )
    } else if d == 0.0 {
        (
            "Since D = 0, there is exactly one real root (double root).",
            format!("x = {} (double root)", fx(h)),
        )
    } else {
        (
            "Since D < 0, there are no real roots (complex roots only).",
            "No real solutions".to_string(),
        )
    };

    vec![
        step(
            "Identify the standard form",
            "A quadratic equation has the form y = ax² + bx + c, where a ≠ 0.",
            "y = ax² + bx + c",
        ),
        step(
            "Extract coefficients",
            "Identify a, b, and c from your equation.",
            format!("a = {}, b = {}, c = {}", fx(a), fx(b), fx(c)),
        ),
        step(
            "Calculate the discriminant",
            "The discriminant D = b² - 4ac determines the nature of roots.",
            format!("D = ({})² - 4({})({}) = {}", fx(b), fx(a), fx(c), fx(d)),
        ),
        step("Find the roots using quadratic formula", why, roots),
        step(
            "Find the vertex",
            "The vertex (h, k) is at h = -b/(2a) and k = f(h).",
            format!("Vertex = ({}, {})", fx(h), fx(k)),
        ),
        step(
            "Determine the axis of symmetry",
            "The parabola is symmetric about the vertical line x = h.",
            format!("x = {}", fx(h)),
        ),
        if a > 0.0 {
            step(
                "Determine opening direction",
                "Since a > 0, the parabola opens upward (vertex is minimum).",
                "Opens upward ⌣",
            )
        } else {
            step(
                "Determine opening direction",
                "Since a < 0, the parabola opens downward (vertex is maximum).",
                "Opens downward ⌢",
            )
        },
        step(
            "Find the y-intercept",
            "The y-intercept is the value of y when x = 0, which is c.",
            format!("y-intercept = {}", fx(c)),
        ),
    ]
}

fn cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<Step> {
    let x = -b / (3.0 * a);
    let y = a * x.powi(3) + b * x.powi(2) + c * x + d;

    vec![
        step(
            "Identify the standard form",
            "A cubic equation has the form y = ax³ + bx² + cx + d.",
            "y = ax³ + bx² + cx + d",
        ),
        step(
            "Extract coefficients",
            "Identify the coefficients from your equation.",
            format!("a = {}, b = {}, c = {}, d = {}", fx(a), fx(b), fx(c), fx(d)),
        ),
        step(
            "Find the inflection point",
            "The inflection point is where the curve changes concavity. x = -b/(3a)",
            format!("Inflection point = ({}, {})", fx(x), fx(y)),
        ),
        if a > 0.0 {
            step(
                "Determine end behavior",
                "Since a > 0: as x → -∞, y → -∞ and as x → +∞, y → +∞",
                "Falls left ↙, Rises right ↗",
            )
        } else {
            step(
                "Determine end behavior",
                "Since a < 0: as x → -∞, y → +∞ and as x → +∞, y → -∞",
                "Rises left ↖, Falls right ↘",
            )
        },
        step(
            "Find the y-intercept",
            "The y-intercept is the value when x = 0.",
            format!("y-intercept = {}", fx(d)),
        ),
    ]
}

fn circle(r: f64, h: f64, k: f64) -> Vec<Step> {
    vec![
        step(
            "Identify the standard form",
            "A circle has the form (x - h)² + (y - k)² = r², where (h, k) is the center.",
            "(x - h)² + (y - k)² = r²",
        ),
        step(
            "Find the center",
            "The center (h, k) is the point from which all points are equidistant.",
            format!("Center = ({}, {})", fx(h), fx(k)),
        ),
        step(
            "Find the radius",
            "The radius r is the distance from the center to any point on the circle.",
            format!("Radius = {}", fx(r)),
        ),
        step(
            "Calculate the diameter",
            "The diameter is twice the radius: d = 2r",
            format!("Diameter = {}", fx(2.0 * r)),
        ),
        step(
            "Calculate the circumference",
            "The circumference is C = 2πr",
            format!("Circumference = 2π({}) = {}", fx(r), fx(2.0 * PI * r)),
        ),
        step(
            "Calculate the area",
            "The area is A = πr²",
            format!("Area = π({})² = {}", fx(r), fx(PI * r * r)),
        ),
    ]
}

fn ellipse(a: f64, b: f64, h: f64, k: f64) -> Vec<Step> {
    let c = (a * a - b * b).abs().sqrt();
    let e = c / a.max(b);

    // foci lie along the major axis
    let (orientation, foci) = if a > b {
        (
            "For horizontal ellipse, foci are at (h ± c, k)",
            format!("Foci at ({}, {}) and ({}, {})", fx(h - c), fx(k), fx(h + c), fx(k)),
        )
    } else {
        (
            "For vertical ellipse, foci are at (h, k ± c)",
            format!("Foci at ({}, {}) and ({}, {})", fx(h), fx(k - c), fx(h), fx(k + c)),
        )
    };

    vec![
        step(
            "Identify the standard form",
            "An ellipse has the form (x-h)²/a² + (y-k)²/b² = 1",
            "(x-h)²/a² + (y-k)²/b² = 1",
        ),
        step(
            "Find the center",
            "The center is at (h, k).",
            format!("Center = ({}, {})", fx(h), fx(k)),
        ),
        step(
            "Find the semi-axes",
            "a and b are the semi-major and semi-minor axes.",
            format!("a = {}, b = {}", fx(a), fx(b)),
        ),
        step(
            "Calculate the focal distance",
            "c = √|a² - b²|",
            format!("c = √|{}² - {}²| = {}", fx(a), fx(b), fx(c)),
        ),
        step("Find the foci", orientation, foci),
        step(
            "Calculate eccentricity",
            "Eccentricity e = c/a measures how \"stretched\" the ellipse is.",
            format!("e = {}", fixed(e, 3)),
        ),
        step(
            "Calculate the area",
            "Area = πab",
            format!("Area = π({})({}) = {}", fx(a), fx(b), fx(PI * a * b)),
        ),
    ]
}

fn hyperbola(a: f64, b: f64) -> Vec<Step> {
    let c = a.hypot(b);

    vec![
        step(
            "Identify the standard form",
            "A hyperbola has the form x²/a² - y²/b² = 1 (horizontal) or y²/a² - x²/b² = 1 (vertical)",
            "x²/a² - y²/b² = 1",
        ),
        step(
            "Find the center",
            "The center is at the origin (0, 0) for standard form.",
            "Center = (0, 0)",
        ),
        step(
            "Find the vertices",
            "Vertices are at (±a, 0) for horizontal hyperbola.",
            format!("Vertices at (±{}, 0)", fx(a)),
        ),
        step(
            "Calculate the focal distance",
            "c = √(a² + b²) for hyperbola",
            format!("c = √({}² + {}²) = {}", fx(a), fx(b), fx(c)),
        ),
        step(
            "Find the foci",
            "Foci are at (±c, 0) for horizontal hyperbola.",
            format!("Foci at (±{}, 0)", fx(c)),
        ),
        step(
            "Find the asymptotes",
            "Asymptotes are lines the hyperbola approaches but never touches.",
            format!("y = ±({})x", fx(b / a)),
        ),
        step(
            "Calculate eccentricity",
            "Eccentricity e = c/a. For hyperbola, e > 1.",
            format!("e = {}", fixed(c / a, 3)),
        ),
    ]
}

fn exponential(a: f64, b: f64) -> Vec<Step> {
    vec![
        step(
            "Identify the standard form",
            "An exponential function has the form y = a·e^(bx) or y = a·b^x",
            "y = a·e^(bx)",
        ),
        step(
            "Find the initial value",
            "When x = 0, y = a·e^0 = a. This is the y-intercept.",
            format!("y-intercept = {}", fx(a)),
        ),
        if b > 0.0 {
            step(
                "Determine growth or decay",
                "Since b > 0, this is exponential GROWTH.",
                "Type: Growth",
            )
        } else {
            step(
                "Determine growth or decay",
                "Since b < 0, this is exponential DECAY.",
                "Type: Decay",
            )
        },
        step(
            "Find the horizontal asymptote",
            "The curve approaches but never reaches y = 0.",
            "Horizontal asymptote: y = 0",
        ),
        step(
            "Determine the domain and range",
            "Exponential functions are defined for all x, but output is restricted.",
            format!(
                "Domain: All real numbers\nRange: {}",
                if a > 0.0 { "y > 0" } else { "y < 0" }
            ),
        ),
        step(
            "Find the growth/decay rate",
            "The constant b determines how fast the function grows or decays.",
            format!("Rate constant = {}", fx(b)),
        ),
    ]
}

fn logarithmic(a: f64) -> Vec<Step> {
    vec![
        step(
            "Identify the standard form",
            "A logarithmic function has the form y = a·log(x) or y = a·ln(x)",
            "y = a·log(x)",
        ),
        step(
            "Find the x-intercept",
            "When y = 0, log(x) = 0, so x = 1.",
            "x-intercept = 1",
        ),
        step(
            "Find the vertical asymptote",
            "Logarithm is undefined for x ≤ 0, so x = 0 is a vertical asymptote.",
            "Vertical asymptote: x = 0",
        ),
        step(
            "Determine the domain and range",
            "Logarithmic functions are only defined for positive x.",
            "Domain: x > 0\nRange: All real numbers",
        ),
        if a > 0.0 {
            step(
                "Determine increasing or decreasing",
                "Since a > 0, the function is increasing.",
                "Behavior: Increasing ↗",
            )
        } else {
            step(
                "Determine increasing or decreasing",
                "Since a < 0, the function is decreasing.",
                "Behavior: Decreasing ↘",
            )
        },
        step(
            "Understand the inverse relationship",
            "Logarithms are inverses of exponentials.",
            "If y = log(x), then x = e^y",
        ),
    ]
}

fn wave(kind: EquationType, p: &Values) -> Vec<Step> {
    let (a, b, c, d) = (p.get("a", 1.0), p.get("b", 1.0), p.get("c", 0.0), p.get("d", 0.0));
    let (func, noun) = match kind {
        EquationType::Cosine => ("cos", "cosine"),
        EquationType::Tangent => ("tan", "tangent"),
        _ => ("sin", "sine"),
    };
    let amplitude = a.abs();
    let shift = -c / b;

    let mut steps = vec![
        step(
            "Identify the standard form",
            format!("A {noun} function has the form y = a·{func}(bx + c) + d"),
            format!("y = a·{func}(bx + c) + d"),
        ),
        step(
            "Find the amplitude",
            "Amplitude |a| determines the height of the wave.",
            format!("Amplitude = |{}| = {}", fx(a), fx(amplitude)),
        ),
    ];

    if kind == EquationType::Tangent {
        steps.push(step(
            "Calculate the period",
            "Period = π/|b| is the horizontal distance between asymptotes.",
            format!("Period = π/{} = {}", fx(b.abs()), fx(PI / b.abs())),
        ));
    } else {
        steps.push(step(
            "Calculate the period",
            "Period = 2π/|b| is the horizontal length of one complete cycle.",
            format!("Period = 2π/{} = {}", fx(b.abs()), fx(2.0 * PI / b.abs())),
        ));
    }

    steps.extend([
        step(
            "Find the frequency",
            "Frequency = |b| determines how many cycles occur in 2π.",
            format!("Frequency = {}", fx(b.abs())),
        ),
        step(
            "Calculate the phase shift",
            "Phase shift = -c/b moves the graph horizontally.",
            format!(
                "Phase shift = {} ({})",
                fx(shift),
                if shift > 0.0 { "right" } else { "left" }
            ),
        ),
        step(
            "Find the vertical shift",
            "Vertical shift d moves the entire wave up or down.",
            format!("Vertical shift = {}", fx(d)),
        ),
    ]);

    if kind == EquationType::Tangent {
        steps.push(step(
            "Determine the range",
            "Tangent is unbounded between its asymptotes.",
            "Range: All real numbers",
        ));
    } else {
        steps.push(step(
            "Determine the range",
            "The wave oscillates between min and max values.",
            format!("Range: [{}, {}]", fx(d - amplitude), fx(d + amplitude)),
        ));
    }

    steps.push(step(
        "Find the midline",
        "The midline is the horizontal line y = d.",
        format!("Midline: y = {}", fx(d)),
    ));
    steps
}
