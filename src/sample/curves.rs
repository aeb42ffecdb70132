use super::{Curve, Trace};
use std::f64::consts::TAU;

/// A closed ellipse about `centre` with semi-axes `a` and `b`, in `n` steps of θ over `[0, 2π]`.
///
/// A circle is `a == b`. The curve always has `n + 1` points and the last meets the first.
pub fn parametric(centre: (f64, f64), a: f64, b: f64, n: usize) -> Curve {
    let (h, k) = centre;
    let n = n.max(1);
    let mut curve = Curve::with_capacity(n + 1);

    for i in 0..=n {
        let theta = TAU * i as f64 / n as f64;
        curve.push(h + a * theta.cos(), k + b * theta.sin());
    }

    curve
}

/// The four half-branches of `x²/a² - y²/b² = 1`: right upper, right lower, left upper, left lower.
///
/// Each branch runs `span` past its vertex in `n` steps. Points inside the gap between the
/// vertices have no real `y` and are skipped; branches left empty are dropped. Only the first
/// trace is named.
pub fn hyperbola(a: f64, b: f64, span: f64, n: usize) -> Vec<Trace> {
    let n = n.max(1);
    let mut right = (Curve::with_capacity(n + 1), Curve::with_capacity(n + 1));
    let mut left = (Curve::with_capacity(n + 1), Curve::with_capacity(n + 1));

    for i in 0..=n {
        let dx = span * i as f64 / n as f64;
        for (x, (upper, lower)) in [(a + dx, &mut right), (-a - dx, &mut left)] {
            let y_sq = b * b * (x * x / (a * a) - 1.0);
            if y_sq >= 0.0 {
                let y = y_sq.sqrt();
                upper.push(x, y);
                lower.push(x, -y);
            }
        }
    }

    let mut traces = [right.0, right.1, left.0, left.1]
        .into_iter()
        .filter(|c| !c.is_empty())
        .map(|curve| Trace { name: None, curve })
        .collect::<Vec<_>>();

    if let Some(first) = traces.first_mut() {
        first.name = Some("Hyperbola".to_string());
    }

    traces
}
