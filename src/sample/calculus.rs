//! Numeric calculus over sampled values: finite differences, Riemann sums and sign-change roots.

use super::*;

/// The closed outline of the area between a curve and the x-axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaShape {
    #[serde(flatten)]
    pub path: Curve,
    /// Left Riemann sum approximation of the signed area.
    pub area: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Root {
    pub x: f64,
    pub y: f64,
}

impl Root {
    fn at(x: f64) -> Self {
        Self { x, y: 0.0 }
    }
}

impl<'a, E: Evaluate, I: Interrupt> Sampler<'a, E, I> {
    /// `f'(x) ≈ (f(x + h) - f(x - h)) / 2h` at `n` even steps across `range`.
    ///
    /// A point is skipped when either shifted evaluation is undefined.
    pub fn derivative(&self, range: Range, n: usize, h: f64) -> Curve {
        let mut scope = self.scope.clone();
        let mut curve = Curve::with_capacity(n + 1);

        for (i, x) in range.points(n).enumerate() {
            if self.interrupted_at(i) {
                break;
            }

            let (Some(up), Some(down)) = (self.at(&mut scope, x + h), self.at(&mut scope, x - h))
            else {
                continue;
            };

            let d = (up - down) / (2.0 * h);
            if d.is_finite() {
                curve.push(x, d);
            }
        }

        trace!("derivative has {} of {} points", curve.len(), n + 1);
        curve
    }

    /// A polygon outlining `∫ f dx` over `range`, and its approximate area.
    ///
    /// The path starts at `(min, 0)`, follows the defined samples, and closes through `(max, 0)`
    /// back to `(min, 0)`.
    pub fn integral_shape(&self, range: Range, resolution: usize) -> AreaShape {
        let mut scope = self.scope.clone();
        let step = range.step(resolution);
        let mut path = Curve::with_capacity(resolution + 4);
        let mut area = 0.0;

        path.push(range.min, 0.0);

        for (i, x) in range.points(resolution).enumerate() {
            if self.interrupted_at(i) {
                break;
            }

            if let Some(y) = self.at(&mut scope, x) {
                path.push(x, y);
                if i > 0 {
                    area += y * step;
                }
            }
        }

        path.push(range.max, 0.0);
        path.push(range.min, 0.0);

        AreaShape { path, area }
    }

    /// Scan `range` left to right for roots.
    ///
    /// A sample within `zero_tolerance` of zero is a root. Otherwise a root is interpolated
    /// between consecutive samples which change sign, unless the jump between them reaches
    /// `asymptote_guard`, which is taken to be a pole. An undefined sample breaks the scan, so no
    /// root is interpolated across it.
    pub fn roots(
        &self,
        range: Range,
        resolution: usize,
        asymptote_guard: f64,
        zero_tolerance: f64,
    ) -> Vec<Root> {
        let mut scope = self.scope.clone();
        let mut roots = Vec::new();
        let mut prev: Option<(f64, f64)> = None;

        for (i, x) in range.points(resolution).enumerate() {
            if self.interrupted_at(i) {
                break;
            }

            let Some(y) = self.at(&mut scope, x) else {
                prev = None;
                continue;
            };

            if y.abs() < zero_tolerance {
                roots.push(Root::at(x));
            } else if let Some((px, py)) = prev {
                let crossed = py.abs() >= zero_tolerance && py.signum() != y.signum();
                if crossed && (y - py).abs() < asymptote_guard {
                    let slope = (y - py) / (x - px);
                    roots.push(Root::at(px - py / slope));
                }
            }

            prev = Some((x, y));
        }

        debug!("found {} roots in [{}, {}]", roots.len(), range.min, range.max);
        roots
    }
}
