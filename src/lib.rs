use clap::{Parser, ValueEnum};
use log::{debug, trace, warn};
use miette::*;
use serde::{Deserialize, Serialize};
use std::{
    io::{self, Write},
    path::PathBuf,
};

mod classify;
mod config;
mod equation;
mod expr;
mod normalize;
mod params;
mod properties;
mod sample;
mod steps;
mod validate;
mod worker;

pub use classify::{classify, EquationType, TypeInfo};
pub use config::Settings;
pub use equation::{Equation, Form};
pub use expr::{Evaluate, Expression, Scope};
pub use normalize::{normalize, sanitize};
pub use params::{extract, sliders, Parameter, Slider};
pub use properties::{properties, Property};
pub use sample::{
    hyperbola, parametric, plot, AreaShape, Curve, Interrupt, Never, Range, Root, SampleSet,
    Sampler, Surface, Trace,
};
pub use steps::{solution, Solution, Step};
pub use validate::{validate, InputError, MAX_LEN};
pub use worker::{Job, Output, Response, Ticket, Worker};

/// CLI equation visualiser.
/// Classify an equation, derive its parameters and sample it for plotting.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct App {
    /// The equation, such as 'x^2-4', 'x^2+y^2=25' or 'z=sin(x)*cos(y)'.
    #[arg(allow_hyphen_values = true)]
    pub expr: String,

    /// The output format to write to stdout.
    #[arg(short, long, default_value_t, value_enum)]
    pub out: Format,

    /// Include the step-by-step explanation.
    #[arg(long)]
    pub steps: bool,

    /// Sample the numeric derivative.
    #[arg(long)]
    pub derivative: bool,

    /// Scan for roots.
    #[arg(long)]
    pub roots: bool,

    /// Shade the area under the curve between MIN and MAX.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub integral: Option<Vec<f64>>,

    /// Left edge of the x viewport.
    #[arg(long, allow_negative_numbers = true)]
    pub x_min: Option<f64>,

    /// Right edge of the x viewport.
    #[arg(long, allow_negative_numbers = true)]
    pub x_max: Option<f64>,

    /// Surface grid steps per axis.
    #[arg(long)]
    pub resolution: Option<usize>,

    /// Set a parameter before sampling, as NAME=VALUE. May be repeated.
    #[arg(short, long, value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// Reject input which would need correcting, rather than warning.
    #[arg(long)]
    pub strict: bool,

    /// Path to a JSON settings file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, ValueEnum, Default)]
pub enum Format {
    /// Rich table view.
    #[default]
    Table,

    /// Plain, tab separated lines.
    Plain,

    /// The full report as JSON.
    Json,

    /// The sample points of the main plot as CSV.
    Csv,
}

/// Everything the CLI derives from one equation.
#[derive(Debug, Serialize)]
pub struct Report {
    pub equation: Equation,
    pub info: TypeInfo,
    pub properties: Vec<Property>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<Solution>,
    pub plot: SampleSet,
    /// `false` when the plot was cut short by the time budget.
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivative: Option<Curve>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integral: Option<AreaShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roots: Option<Vec<Root>>,
}

impl App {
    pub fn run(self) -> Result<()> {
        let report = self.report()?;
        let w = &mut io::stdout();

        match self.out {
            Format::Table => write_table(w, &report).into_diagnostic(),
            Format::Plain => write_plain(w, &report).into_diagnostic(),
            Format::Json => {
                serde_json::to_writer_pretty(&mut *w, &report).into_diagnostic()?;
                writeln!(w).into_diagnostic()
            }
            Format::Csv => write_csv(w, &report.plot),
        }
    }

    /// Parse, classify and sample the equation with the requested overlays.
    pub fn report(&self) -> Result<Report> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(n) = self.resolution {
            ensure!(n > 0, "resolution must be at least 1");
            settings.surface_resolution = n;
        }

        if let Err(e) = validate(&self.expr) {
            if self.strict {
                return Err(e.into());
            }
            warn!("{e}; continuing with '{}'", normalize(&self.expr));
        }

        let mut eq = Equation::parse(&self.expr).wrap_err_with(|| format!("in '{}'", self.expr))?;
        for s in &self.set {
            let (name, value) = parse_setting(s)?;
            eq = eq.with_parameter(name, value)?;
        }

        let viewport = self.viewport(eq.kind)?;
        let (plot, complete) = sample_in_background(&eq, viewport, &settings)?;

        let overlays = self.derivative || self.roots || self.integral.is_some();
        let curve = !(eq.kind.is_conic() || eq.kind == EquationType::ThreeD);
        if overlays && !curve {
            warn!("derivative, roots and integral apply to y = f(x) curves, not a {}", eq.kind);
        }

        let scope = eq.scope();
        let sampler = Sampler::new(eq.expression(), &scope);

        let derivative = (curve && self.derivative).then(|| {
            sampler.derivative(
                viewport.unwrap_or(eq.kind.default_x_range()),
                settings.derivative_points,
                settings.derivative_step,
            )
        });
        let roots = (curve && self.roots).then(|| {
            sampler.roots(
                settings.root_range,
                settings.root_resolution,
                settings.root_asymptote_guard,
                settings.root_zero_tolerance,
            )
        });
        let integral = match self.integral.as_deref() {
            Some(&[min, max]) if curve => {
                Some(sampler.integral_shape(range(min, max)?, settings.integral_resolution))
            }
            _ => None,
        };

        Ok(Report {
            info: eq.info(),
            properties: properties(eq.kind, &eq.parameters),
            solution: self
                .steps
                .then(|| solution(eq.kind, &eq.parameters, &eq.normalized)),
            plot,
            complete,
            derivative,
            integral,
            roots,
            equation: eq,
        })
    }

    fn viewport(&self, kind: EquationType) -> Result<Option<Range>> {
        if self.x_min.is_none() && self.x_max.is_none() {
            return Ok(None);
        }

        let default = kind.default_x_range();
        range(
            self.x_min.unwrap_or(default.min),
            self.x_max.unwrap_or(default.max),
        )
        .map(Some)
        .wrap_err("invalid viewport")
    }
}

fn range(min: f64, max: f64) -> Result<Range> {
    ensure!(
        min.is_finite() && max.is_finite() && min < max,
        "expecting MIN < MAX, found {min} and {max}"
    );
    Ok(Range::new(min, max))
}

fn parse_setting(s: &str) -> Result<(&str, f64)> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| miette!("expecting NAME=VALUE, found '{s}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .into_diagnostic()
        .wrap_err_with(|| format!("invalid value for '{}'", name.trim()))?;
    Ok((name.trim(), value))
}

/// Sample the main plot on a worker so the settings' time budget applies.
fn sample_in_background(
    eq: &Equation,
    viewport: Option<Range>,
    settings: &Settings,
) -> Result<(SampleSet, bool)> {
    let worker = Worker::spawn(settings.clone())?;
    worker.submit("plot", Job::Plot(eq.clone(), viewport))?;

    let resp = worker
        .recv()
        .ok_or_else(|| miette!("sampling thread stopped without a result"))?;
    if !resp.complete {
        warn!("plot exceeded its time budget, the samples are partial");
    }
    debug!("plot sampled in {:?}", resp.elapsed);

    match resp.output {
        Output::Plot(set) => Ok((set, resp.complete)),
        x => Err(miette!("expecting a plot, the sampler returned {x:?}")),
    }
}

fn write_table<W: Write>(w: &mut W, report: &Report) -> io::Result<()> {
    use comfy_table::{Cell, CellAlignment as CA, Row, Table};

    let Report {
        equation,
        info,
        properties,
        solution,
        plot,
        complete,
        derivative,
        integral,
        roots,
    } = report;

    let mut nfmtr = "[~4]".parse::<numfmt::Formatter>().expect("just fine");

    writeln!(w, "{}: {}", info.name, equation.normalized)?;
    writeln!(w, "  {}", info.description)?;
    writeln!(w, "  Standard form: {}", info.standard_form)?;

    if !equation.parameters.is_empty() {
        let mut table = Table::new();
        table.set_header(["Parameter", "Label", "Value", "Min", "Max", "Step"]);
        for p in &equation.parameters {
            let mut row = Row::new();
            row.add_cell(Cell::new(&p.name))
                .add_cell(Cell::new(&p.label))
                .add_cell(Cell::new(nfmtr.fmt(p.value)).set_alignment(CA::Right))
                .add_cell(Cell::new(nfmtr.fmt(p.min)).set_alignment(CA::Right))
                .add_cell(Cell::new(nfmtr.fmt(p.max)).set_alignment(CA::Right))
                .add_cell(Cell::new(nfmtr.fmt(p.step)).set_alignment(CA::Right));
            table.add_row(row);
        }
        table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
        writeln!(w, "{table}")?;
    }

    if !properties.is_empty() {
        let mut table = Table::new();
        table.set_header(["Property", "Value"]);
        for p in properties {
            table.add_row([p.name, p.value.as_str()]);
        }
        table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
        writeln!(w, "{table}")?;
    }

    if let Some(s) = solution {
        writeln!(w, "{}", s.title)?;
        for (i, step) in s.steps.iter().enumerate() {
            writeln!(w, "  {}. {}", i + 1, step.step)?;
            writeln!(w, "     {}", step.explanation)?;
            for line in step.formula.lines() {
                writeln!(w, "     {line}")?;
            }
        }
    }

    write!(w, "  Plot points: {}", nfmtr.fmt(plot.len() as f64))?;
    if !complete {
        write!(w, " (partial)")?;
    }
    writeln!(w)?;

    if let Some(d) = derivative {
        writeln!(w, "  Derivative points: {}", nfmtr.fmt(d.len() as f64))?;
    }
    if let Some(a) = integral {
        writeln!(w, "  Area: {}", nfmtr.fmt(a.area))?;
    }
    if let Some(roots) = roots {
        if roots.is_empty() {
            writeln!(w, "  Roots: none")?;
        } else {
            let xs = roots
                .iter()
                .map(|r| nfmtr.fmt(r.x).to_string())
                .collect::<Vec<_>>();
            writeln!(w, "  Roots: {}", xs.join(", "))?;
        }
    }

    Ok(())
}

fn write_plain<W: Write>(w: &mut W, report: &Report) -> io::Result<()> {
    let eq = &report.equation;
    writeln!(w, "type\t{}", eq.kind)?;
    writeln!(w, "form\t{}", eq.form)?;
    writeln!(w, "normalized\t{}", eq.normalized)?;

    for p in &eq.parameters {
        writeln!(w, "{}\t{}\t{}\t{}\t{}", p.name, p.value, p.min, p.max, p.step)?;
    }
    for p in &report.properties {
        writeln!(w, "{}\t{}", p.name, p.value)?;
    }
    if let Some(s) = &report.solution {
        for step in &s.steps {
            writeln!(w, "{}\t{}", step.step, step.formula.replace('\n', "; "))?;
        }
    }

    writeln!(w, "points\t{}", report.plot.len())?;
    if let Some(a) = &report.integral {
        writeln!(w, "area\t{}", a.area)?;
    }
    if let Some(roots) = &report.roots {
        for r in roots {
            writeln!(w, "root\t{}", r.x)?;
        }
    }

    Ok(())
}

fn write_csv<W: Write>(w: &mut W, plot: &SampleSet) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);

    match plot {
        SampleSet::Curve(c) => {
            wtr.write_record(["x", "y"]).into_diagnostic()?;
            for (x, y) in c.points() {
                wtr.write_record([x.to_string(), y.to_string()])
                    .into_diagnostic()?;
            }
        }
        SampleSet::Traces { traces } => {
            wtr.write_record(["trace", "x", "y"]).into_diagnostic()?;
            for (i, t) in traces.iter().enumerate() {
                for (x, y) in t.curve.points() {
                    wtr.write_record([i.to_string(), x.to_string(), y.to_string()])
                        .into_diagnostic()?;
                }
            }
        }
        SampleSet::Surface(s) => {
            wtr.write_record(["x", "y", "z"]).into_diagnostic()?;
            for (y, row) in s.y.iter().zip(&s.z) {
                for (x, z) in s.x.iter().zip(row) {
                    let z = z.map(|z| z.to_string()).unwrap_or_default();
                    wtr.write_record([x.to_string(), y.to_string(), z])
                        .into_diagnostic()?;
                }
            }
        }
    }

    trace!("wrote {} csv points", plot.len());
    wtr.flush().into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(args: &[&str]) -> App {
        App::parse_from(std::iter::once("eqplot").chain(args.iter().copied()))
    }

    #[test]
    fn report_with_overlays() {
        let r = app(&["x^2-4", "--roots", "--derivative", "--integral", "0", "2", "--steps"])
            .report()
            .unwrap();
        assert_eq!(r.equation.kind, EquationType::Quadratic);
        assert!(r.complete);
        assert_eq!(r.roots.as_ref().map(Vec::len), Some(2));
        assert_eq!(r.derivative.as_ref().map(Curve::len), Some(501));
        assert!(r.integral.is_some());
        assert!(r.solution.is_some());
    }

    #[test]
    fn overlays_skip_conics() {
        let r = app(&["x^2+y^2=25", "--roots"]).report().unwrap();
        assert!(r.roots.is_none());
        assert!(matches!(r.plot, SampleSet::Curve(_)));
    }

    #[test]
    fn settings_flags() {
        let r = app(&["z=x*y", "--resolution", "4"]).report().unwrap();
        match r.plot {
            SampleSet::Surface(s) => assert_eq!(s.x.len(), 5),
            x => panic!("expected a surface, got {x:?}"),
        }

        let r = app(&["x", "--x-min=-1", "--x-max", "1"]).report().unwrap();
        match r.plot {
            SampleSet::Curve(c) => {
                assert_eq!(c.x.first(), Some(&-1.0));
                assert_eq!(c.x.last(), Some(&1.0));
            }
            x => panic!("expected a curve, got {x:?}"),
        }

        assert!(app(&["x", "--x-min", "2", "--x-max", "1"]).report().is_err());
    }

    #[test]
    fn parameters_can_be_set() {
        let r = app(&["x^2+y^2=25", "--set", "r=2"]).report().unwrap();
        assert_eq!(r.equation.parameter("r").unwrap().value, 2.0);

        assert!(app(&["x", "--set", "r=2"]).report().is_err());
        assert!(app(&["x", "--set", "m"]).report().is_err());
    }

    #[test]
    fn corrections_only_fail_when_strict() {
        assert!(app(&["X^2"]).report().is_ok());
        assert!(app(&["X^2", "--strict"]).report().is_err());
        assert!(app(&["2+2"]).report().is_ok());
        assert!(app(&["2+2", "--strict"]).report().is_err());
    }

    #[test]
    fn csv_surface_leaves_undefined_cells_empty() {
        let r = app(&["z=sqrt(1-x^2-y^2)", "--resolution", "2", "--x-min=0", "--x-max=2"])
            .report()
            .unwrap();
        let mut buf = Vec::new();
        write_csv(&mut buf, &r.plot).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("x,y,z"));
        assert!(text.lines().any(|l| l == "2,10,"), "{text}");
    }

    #[test]
    fn json_report() {
        let r = app(&["sin(x)"]).report().unwrap();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["equation"]["kind"], "sine");
        assert_eq!(v["plot"]["kind"], "curve");
        assert!(v.get("roots").is_none());
    }
}
