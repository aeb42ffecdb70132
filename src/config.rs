//! Sampler tunables.

use super::*;
use std::{fs, path::Path, time::Duration};

/// Sampling settings.
///
/// Every field has a default, so a settings file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Steps across the x-domain of explicit and trigonometric curves.
    pub curve_points: usize,

    /// Steps around a circle or ellipse, and along each hyperbola branch.
    pub conic_points: usize,

    /// How far past each vertex the hyperbola branches are drawn.
    pub hyperbola_span: f64,

    pub derivative_points: usize,
    /// Central difference step.
    pub derivative_step: f64,

    pub integral_resolution: usize,
    pub integral_range: Range,

    pub root_range: Range,
    pub root_resolution: usize,
    /// A sign change with a larger jump than this is taken to be a pole, not a root.
    pub root_asymptote_guard: f64,
    /// A sample closer to zero than this is a root.
    pub root_zero_tolerance: f64,

    /// Grid steps per axis; the grid has `(n + 1)²` cells.
    pub surface_resolution: usize,
    pub surface_y_range: Range,
    /// Imaginary parts up to this magnitude are rounding noise.
    pub complex_tolerance: f64,

    /// Wall-clock budget for one background request, in milliseconds.
    pub budget_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            curve_points: 1000,
            conic_points: 500,
            hyperbola_span: 10.0,
            derivative_points: 500,
            derivative_step: 0.001,
            integral_resolution: 200,
            integral_range: Range::new(0.0, 2.0),
            root_range: Range::new(-20.0, 20.0),
            root_resolution: 500,
            root_asymptote_guard: 10.0,
            root_zero_tolerance: 1e-10,
            surface_resolution: 75,
            surface_y_range: Range::new(-10.0, 10.0),
            complex_tolerance: 1e-10,
            budget_ms: None,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read '{}'", path.display()))?;
        let settings = Self::from_json(&text)
            .wrap_err_with(|| format!("in '{}'", path.display()))?;
        debug!("loaded settings from '{}'", path.display());
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(text)
            .into_diagnostic()
            .wrap_err("invalid settings")?;
        settings.check()?;
        Ok(settings)
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget_ms.map(Duration::from_millis)
    }

    fn check(&self) -> Result<()> {
        let ranges = [
            ("integral_range", self.integral_range),
            ("root_range", self.root_range),
            ("surface_y_range", self.surface_y_range),
        ];
        for (name, r) in ranges {
            ensure!(
                r.min.is_finite() && r.max.is_finite() && r.min < r.max,
                "{name} must be an increasing finite range, found [{}, {}]",
                r.min,
                r.max
            );
        }

        ensure!(
            self.derivative_step > 0.0,
            "derivative_step must be positive"
        );
        ensure!(
            self.complex_tolerance >= 0.0 && self.root_zero_tolerance >= 0.0,
            "tolerances cannot be negative"
        );

        Ok(())
    }
}
