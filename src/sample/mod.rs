//! Numeric sampling.
//!
//! Every sampler is a pure function of its inputs. A point the expression cannot produce a real,
//! finite value for is dropped from a 2D sample and null-marked in a surface grid, it never fails
//! the whole sample.

use super::*;

mod calculus;
mod curves;
mod surface;

pub use calculus::{AreaShape, Root};
pub use curves::{hyperbola, parametric};
pub use surface::Surface;

/// A closed interval on one axis.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// The width of one of `steps` equal steps.
    pub fn step(&self, steps: usize) -> f64 {
        if steps == 0 {
            0.0
        } else {
            self.span() / steps as f64
        }
    }

    /// `steps + 1` evenly spaced points, including both ends.
    pub fn points(&self, steps: usize) -> impl Iterator<Item = f64> {
        let Range { min, max } = *self;
        let step = self.step(steps);
        // the last point is exactly `max`, free of accumulated rounding
        (0..=steps).map(move |i| {
            if i == steps && steps > 0 {
                max
            } else {
                min + i as f64 * step
            }
        })
    }
}

/// An ordered 2D polyline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Curve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Curve {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// One branch of a multi-branch curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    /// Only the first trace of a curve carries a legend entry.
    pub name: Option<String>,
    #[serde(flatten)]
    pub curve: Curve,
}

/// The samples for one plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SampleSet {
    Curve(Curve),
    Traces { traces: Vec<Trace> },
    Surface(Surface),
}

impl SampleSet {
    /// Defined points, across all traces or grid cells.
    pub fn len(&self) -> usize {
        match self {
            SampleSet::Curve(c) => c.len(),
            SampleSet::Traces { traces } => traces.iter().map(|t| t.curve.len()).sum(),
            SampleSet::Surface(s) => s.defined(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Polled by long running samplers; returning `true` stops sampling early.
pub trait Interrupt {
    fn interrupted(&self) -> bool;
}

impl<T: Interrupt + ?Sized> Interrupt for &T {
    fn interrupted(&self) -> bool {
        (**self).interrupted()
    }
}

/// Never interrupts.
#[derive(Debug, Copy, Clone, Default)]
pub struct Never;

impl Interrupt for Never {
    fn interrupted(&self) -> bool {
        false
    }
}

/// How many points are evaluated between interrupt polls.
const POLL_EVERY: usize = 64;

/// Samples one expression under one scope.
///
/// The scope holds the parameter bindings; the samplers bind `x` (and `y` for surfaces) on a
/// private copy for each point.
///
/// ```rust
/// use eqplot::{Expression, Range, Sampler, Scope};
///
/// let expr = Expression::compile("x^2").unwrap();
/// let scope = Scope::new();
/// let curve = Sampler::new(&expr, &scope).explicit(Range::new(-10.0, 10.0), 1000);
/// assert_eq!(curve.len(), 1001);
/// ```
pub struct Sampler<'a, E, I = Never> {
    expr: E,
    scope: &'a Scope,
    stop: I,
}

impl<'a, E: Evaluate> Sampler<'a, E> {
    pub fn new(expr: E, scope: &'a Scope) -> Self {
        Self {
            expr,
            scope,
            stop: Never,
        }
    }
}

impl<'a, E: Evaluate, I: Interrupt> Sampler<'a, E, I> {
    /// Poll `stop` while sampling, returning what has been sampled so far once it trips.
    pub fn interruptible<J: Interrupt>(self, stop: J) -> Sampler<'a, E, J> {
        Sampler {
            expr: self.expr,
            scope: self.scope,
            stop,
        }
    }

    /// Sample `y = f(x)` at `n` even steps across `range`, dropping undefined points.
    pub fn explicit(&self, range: Range, n: usize) -> Curve {
        let mut scope = self.scope.clone();
        let mut curve = Curve::with_capacity(n + 1);

        for (i, x) in range.points(n).enumerate() {
            if self.interrupted_at(i) {
                break;
            }
            if let Some(y) = self.at(&mut scope, x) {
                curve.push(x, y);
            }
        }

        trace!("sampled {} of {} points", curve.len(), n + 1);
        curve
    }

    /// [`Sampler::explicit`] over the trigonometric default domain unless a range is given.
    pub fn trig(&self, range: Option<Range>, n: usize) -> Curve {
        self.explicit(range.unwrap_or(EquationType::Sine.default_x_range()), n)
    }

    /// Sample the plot for an equation of type `kind`.
    ///
    /// `viewport` replaces the type's default x-domain for explicit, trigonometric and surface
    /// plots. Conics are drawn from the `r`, `a`, `b`, `h` and `k` bindings of the scope.
    pub fn plot(&self, kind: EquationType, viewport: Option<Range>, settings: &Settings) -> SampleSet {
        use EquationType::*;

        let x_range = viewport.unwrap_or(kind.default_x_range());
        let set = match kind {
            Linear | Quadratic | Cubic | Exponential | Logarithmic | Unknown => {
                SampleSet::Curve(self.explicit(x_range, settings.curve_points))
            }
            Sine | Cosine | Tangent => {
                SampleSet::Curve(self.trig(Some(x_range), settings.curve_points))
            }
            Circle => {
                let r = binding(self.scope, "r", 5.0);
                SampleSet::Curve(parametric(
                    centre(self.scope),
                    r,
                    r,
                    settings.conic_points,
                ))
            }
            Ellipse => SampleSet::Curve(parametric(
                centre(self.scope),
                binding(self.scope, "a", 5.0),
                binding(self.scope, "b", 3.0),
                settings.conic_points,
            )),
            Hyperbola => SampleSet::Traces {
                traces: hyperbola(
                    binding(self.scope, "a", 3.0),
                    binding(self.scope, "b", 2.0),
                    settings.hyperbola_span,
                    settings.conic_points,
                ),
            },
            ThreeD => SampleSet::Surface(self.surface(
                x_range,
                settings.surface_y_range,
                settings.surface_resolution,
                settings.complex_tolerance,
            )),
        };

        debug!("{kind} plot has {} defined points", set.len());
        set
    }

    /// Real, finite `f(x)`.
    fn at(&self, scope: &mut Scope, x: f64) -> Option<f64> {
        scope.set("x", x);
        self.expr.eval(scope).filter(|y| y.is_finite())
    }

    fn interrupted_at(&self, i: usize) -> bool {
        i % POLL_EVERY == 0 && self.stop.interrupted()
    }
}

/// Sample the plot of `kind` without interruption.
pub fn plot<E: Evaluate>(
    kind: EquationType,
    expr: E,
    scope: &Scope,
    viewport: Option<Range>,
    settings: &Settings,
) -> SampleSet {
    Sampler::new(expr, scope).plot(kind, viewport, settings)
}

/// A non-zero binding, else `default`.
fn binding(scope: &Scope, name: &str, default: f64) -> f64 {
    scope
        .get(name)
        .filter(|v| *v != 0.0 && v.is_finite())
        .unwrap_or(default)
}

fn centre(scope: &Scope) -> (f64, f64) {
    let get = |n| scope.get(n).filter(|v: &f64| v.is_finite()).unwrap_or(0.0);
    (get("h"), get("k"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn compile(text: &str) -> Expression {
        Expression::compile(&normalize(text)).unwrap()
    }

    #[test]
    fn range_points_include_both_ends() {
        let pts = Range::new(-1.0, 1.0).points(4).collect::<Vec<_>>();
        assert_eq!(pts, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(Range::new(2.0, 3.0).points(0).collect::<Vec<_>>(), vec![2.0]);
    }

    #[test]
    fn explicit_keeps_every_defined_point() {
        let e = compile("x^2");
        let scope = Scope::new();
        let c = Sampler::new(&e, &scope).explicit(Range::new(-10.0, 10.0), 1000);
        assert_eq!(c.len(), 1001);
        assert_eq!(c.x.len(), c.y.len());

        let i = c.x.iter().position(|x| (x - 2.0).abs() < 1e-9).unwrap();
        assert!((c.y[i] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_drops_undefined_points() {
        let e = compile("log(x)");
        let scope = Scope::new();
        let c = Sampler::new(&e, &scope).explicit(Range::new(-2.0, 2.0), 4);
        // -2, -1 and 0 are undefined
        assert_eq!(c.x, vec![1.0, 2.0]);

        let e = compile("1/x");
        let c = Sampler::new(&e, &scope).explicit(Range::new(-1.0, 1.0), 2);
        assert_eq!(c.x, vec![-1.0, 1.0]);
    }

    #[test]
    fn explicit_uses_parameters() {
        let e = compile("m*x+b");
        let scope = Scope::new().with("m", 2.0).with("b", 1.0);
        let c = Sampler::new(&e, &scope).explicit(Range::new(0.0, 1.0), 1);
        assert_eq!(c.y, vec![1.0, 3.0]);
    }

    #[test]
    fn unbound_symbols_give_nothing() {
        let e = compile("q*x");
        let scope = Scope::new();
        assert!(Sampler::new(&e, &scope)
            .explicit(Range::new(0.0, 1.0), 10)
            .is_empty());
    }

    #[test]
    fn trig_default_domain() {
        let e = compile("sin(x)");
        let scope = Scope::new();
        let c = Sampler::new(&e, &scope).trig(None, 100);
        assert_eq!(c.x[0], -2.0 * std::f64::consts::PI);
        assert!((c.x[100] - 2.0 * std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn plot_dispatch() {
        let s = Settings::default();

        let e = compile("x^2+y^2=25");
        let scope = Scope::new().with("r", 5.0);
        match plot(EquationType::Circle, &e, &scope, None, &s) {
            SampleSet::Curve(c) => {
                assert_eq!(c.len(), 501);
                assert!((c.x[0] - 5.0).abs() < 1e-12);
            }
            x => panic!("expected a curve, got {x:?}"),
        }

        let scope = Scope::new().with("a", 2.0).with("b", 3.0);
        match plot(EquationType::Hyperbola, &e, &scope, None, &s) {
            SampleSet::Traces { traces } => assert_eq!(traces.len(), 4),
            x => panic!("expected traces, got {x:?}"),
        }

        let e = compile("sin(x)*cos(y)");
        let s = Settings {
            surface_resolution: 10,
            ..Settings::default()
        };
        match plot(EquationType::ThreeD, &e, &Scope::new(), None, &s) {
            SampleSet::Surface(g) => assert_eq!(g.z.len(), 11),
            x => panic!("expected a surface, got {x:?}"),
        }
    }

    #[test]
    fn viewport_replaces_default_domain() {
        let e = compile("2*x+1");
        let s = Settings {
            curve_points: 10,
            ..Settings::default()
        };
        let vp = Range::new(0.0, 1.0);
        match plot(EquationType::Linear, &e, &Scope::new(), Some(vp), &s) {
            SampleSet::Curve(c) => {
                assert_eq!(c.x.first(), Some(&0.0));
                assert_eq!(c.x.last(), Some(&1.0));
            }
            x => panic!("expected a curve, got {x:?}"),
        }
    }

    #[test]
    fn conics_fall_back_to_default_sizes() {
        let e = compile("x^2+y^2=25");
        let s = Settings::default();
        match plot(EquationType::Circle, &e, &Scope::new().with("r", 0.0), None, &s) {
            SampleSet::Curve(c) => assert!((c.x[0] - 5.0).abs() < 1e-12),
            x => panic!("expected a curve, got {x:?}"),
        }
    }

    struct AfterPolls(Cell<usize>);

    impl Interrupt for AfterPolls {
        fn interrupted(&self) -> bool {
            let left = self.0.get();
            self.0.set(left.saturating_sub(1));
            left == 0
        }
    }

    #[test]
    fn interruption_returns_partial_samples() {
        let e = compile("x");
        let scope = Scope::new();
        let c = Sampler::new(&e, &scope)
            .interruptible(AfterPolls(Cell::new(1)))
            .explicit(Range::new(0.0, 1.0), 1000);
        assert_eq!(c.len(), POLL_EVERY);
    }

    #[test]
    fn sampling_is_idempotent() {
        let mut rng = fastrand::Rng::with_seed(42);
        let e = compile("sin(x)/x + sqrt(x)");
        let scope = Scope::new();
        let sampler = Sampler::new(&e, &scope);

        for _ in 0..20 {
            let min = rng.f64() * 20.0 - 10.0;
            let r = Range::new(min, min + rng.f64() * 10.0);
            let n = rng.usize(1..200);
            assert_eq!(sampler.explicit(r, n), sampler.explicit(r, n));
            assert_eq!(sampler.roots(r, n, 10.0, 1e-10), sampler.roots(r, n, 10.0, 1e-10));
            assert_eq!(
                bits(&sampler.derivative(r, n, 1e-3)),
                bits(&sampler.derivative(r, n, 1e-3))
            );

            let a = sampler.integral_shape(r, n);
            let b = sampler.integral_shape(r, n);
            assert_eq!(bits(&a.path), bits(&b.path));
            assert_eq!(a.area.to_bits(), b.area.to_bits());

            let (p, q) = (rng.f64() * 5.0 + 0.5, rng.f64() * 5.0 + 0.5);
            assert_eq!(
                bits(&parametric((min, 1.0), p, q, n)),
                bits(&parametric((min, 1.0), p, q, n))
            );
            let traces = |t: Vec<Trace>| t.iter().map(|t| bits(&t.curve)).collect::<Vec<_>>();
            assert_eq!(traces(hyperbola(p, q, 10.0, n)), traces(hyperbola(p, q, 10.0, n)));
        }
    }

    #[test]
    fn surfaces_are_idempotent() {
        let mut rng = fastrand::Rng::with_seed(43);
        let e = compile("sqrt(x*y)");
        let scope = Scope::new();
        let sampler = Sampler::new(&e, &scope);
        let cells = |s: &Surface| {
            s.z.iter()
                .map(|row| row.iter().map(|z| z.map(f64::to_bits)).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        };

        for _ in 0..10 {
            let min = -rng.f64() * 5.0 - 0.5;
            let r = Range::new(min, -min);
            let n = rng.usize(2..30);
            let a = sampler.surface(r, r, n, 1e-10);
            let b = sampler.surface(r, r, n, 1e-10);
            // the negative quadrants leave holes
            assert!(a.defined() < (n + 1) * (n + 1));
            assert_eq!(cells(&a), cells(&b));
            assert_eq!(a.x, b.x);
            assert_eq!(a.y, b.y);
        }
    }

    fn bits(c: &Curve) -> Vec<(u64, u64)> {
        c.points().map(|(x, y)| (x.to_bits(), y.to_bits())).collect()
    }
}
