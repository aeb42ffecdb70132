//! Background sampling.
//!
//! A [`Worker`] owns one sampling thread. Requests are keyed by the plot they belong to; a newer
//! request for a key supersedes every older one, which is skipped if it has not started,
//! interrupted if it has, and its response dropped if it has already finished.

use super::*;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::{
    cell::Cell,
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// A unit of sampling work.
#[derive(Debug, Clone)]
pub enum Job {
    /// The main plot, optionally over a viewport.
    Plot(Equation, Option<Range>),
    /// `f'(x)`, over the type's default domain unless a range is given.
    Derivative(Equation, Option<Range>),
    /// The shaded area under `f`, over the configured integral range unless one is given.
    IntegralShape(Equation, Option<Range>),
    /// Roots, over the configured scan range unless one is given.
    Roots(Equation, Option<Range>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Output {
    Plot(SampleSet),
    Derivative(Curve),
    IntegralShape(AreaShape),
    Roots(Vec<Root>),
}

impl Job {
    pub fn equation(&self) -> &Equation {
        match self {
            Job::Plot(eq, _)
            | Job::Derivative(eq, _)
            | Job::IntegralShape(eq, _)
            | Job::Roots(eq, _) => eq,
        }
    }

    /// Run the job on the calling thread, polling `stop`.
    pub fn run<I: Interrupt>(&self, settings: &Settings, stop: I) -> Output {
        let eq = self.equation();
        let scope = eq.scope();
        let sampler = Sampler::new(eq.expression(), &scope).interruptible(stop);

        match self {
            Job::Plot(_, viewport) => Output::Plot(sampler.plot(eq.kind, *viewport, settings)),
            Job::Derivative(_, range) => Output::Derivative(sampler.derivative(
                range.unwrap_or(eq.kind.default_x_range()),
                settings.derivative_points,
                settings.derivative_step,
            )),
            Job::IntegralShape(_, range) => Output::IntegralShape(sampler.integral_shape(
                range.unwrap_or(settings.integral_range),
                settings.integral_resolution,
            )),
            Job::Roots(_, range) => Output::Roots(sampler.roots(
                range.unwrap_or(settings.root_range),
                settings.root_resolution,
                settings.root_asymptote_guard,
                settings.root_zero_tolerance,
            )),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Job::Plot(..) => "plot",
            Job::Derivative(..) => "derivative",
            Job::IntegralShape(..) => "integral",
            Job::Roots(..) => "roots",
        }
    }
}

/// Identifies a submitted request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub key: String,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub key: String,
    pub generation: u64,
    pub output: Output,
    /// `false` when sampling was cut short by a newer request or the time budget.
    pub complete: bool,
    #[serde(skip)]
    pub elapsed: Duration,
}

struct Request {
    key: String,
    generation: u64,
    latest: Arc<AtomicU64>,
    job: Job,
}

impl Request {
    fn superseded(&self) -> bool {
        self.latest.load(Ordering::SeqCst) != self.generation
    }
}

/// Trips once the request is superseded or its deadline passes, and remembers that it did.
struct Guard<'a> {
    request: &'a Request,
    deadline: Option<Instant>,
    tripped: Cell<bool>,
}

impl Interrupt for Guard<'_> {
    fn interrupted(&self) -> bool {
        if !self.tripped.get() {
            let late = self.deadline.map_or(false, |d| Instant::now() >= d);
            self.tripped.set(late || self.request.superseded());
        }
        self.tripped.get()
    }
}

type Generations = Arc<Mutex<HashMap<String, Arc<AtomicU64>>>>;

pub struct Worker {
    requests: Option<Sender<Request>>,
    responses: Receiver<Response>,
    generations: Generations,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Start the sampling thread.
    pub fn spawn(settings: Settings) -> Result<Self> {
        let (requests, rx) = unbounded::<Request>();
        let (tx, responses) = unbounded();

        let handle = thread::Builder::new()
            .name("eqplot-sampler".to_string())
            .spawn(move || serve(rx, tx, settings))
            .into_diagnostic()
            .wrap_err("failed to spawn sampling thread")?;

        Ok(Self {
            requests: Some(requests),
            responses,
            generations: Default::default(),
            handle: Some(handle),
        })
    }

    /// Queue `job` under `key`, superseding any earlier request for the same key.
    pub fn submit(&self, key: &str, job: Job) -> Result<Ticket> {
        let latest = self.counter(key)?;
        let generation = latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("submitting {} #{generation} for '{key}'", job.name());

        let requests = self
            .requests
            .as_ref()
            .ok_or_else(|| miette!("sampling thread has shut down"))?;
        requests
            .send(Request {
                key: key.to_string(),
                generation,
                latest,
                job,
            })
            .into_diagnostic()
            .wrap_err("sampling thread has shut down")?;

        Ok(Ticket {
            key: key.to_string(),
            generation,
        })
    }

    /// Whether `ticket` is still the newest request for its key.
    pub fn is_latest(&self, ticket: &Ticket) -> bool {
        self.latest(&ticket.key) == Some(ticket.generation)
    }

    /// Block for the next response which has not been superseded.
    ///
    /// Returns `None` once the sampling thread has stopped.
    pub fn recv(&self) -> Option<Response> {
        loop {
            let resp = self.responses.recv().ok()?;
            if self.current(&resp) {
                return Some(resp);
            }
        }
    }

    /// [`Worker::recv`], giving up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Response> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.responses.recv_deadline(deadline) {
                Ok(resp) if self.current(&resp) => return Some(resp),
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn current(&self, resp: &Response) -> bool {
        let current = self.latest(&resp.key) == Some(resp.generation);
        if !current {
            debug!("dropping stale response #{} for '{}'", resp.generation, resp.key);
        }
        current
    }

    fn latest(&self, key: &str) -> Option<u64> {
        let map = self.generations.lock().ok()?;
        map.get(key).map(|g| g.load(Ordering::SeqCst))
    }

    fn counter(&self, key: &str) -> Result<Arc<AtomicU64>> {
        let mut map = self
            .generations
            .lock()
            .map_err(|_| miette!("generation table poisoned"))?;
        Ok(map.entry(key.to_string()).or_default().clone())
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // closing the request channel ends the serve loop; bumping every key trips the running job
        self.requests.take();
        if let Ok(map) = self.generations.lock() {
            for latest in map.values() {
                latest.fetch_add(1, Ordering::SeqCst);
            }
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("sampling thread panicked");
            }
        }
    }
}

fn serve(rx: Receiver<Request>, tx: Sender<Response>, settings: Settings) {
    while let Ok(request) = rx.recv() {
        if request.superseded() {
            debug!(
                "skipping superseded {} #{} for '{}'",
                request.job.name(),
                request.generation,
                request.key
            );
            continue;
        }

        let started = Instant::now();
        let guard = Guard {
            request: &request,
            deadline: settings.budget().map(|b| started + b),
            tripped: Cell::new(false),
        };
        let output = request.job.run(&settings, &guard);
        let complete = !guard.tripped.get();
        let elapsed = started.elapsed();

        if complete {
            trace!(
                "{} #{} for '{}' took {elapsed:?}",
                request.job.name(),
                request.generation,
                request.key
            );
        } else {
            warn!(
                "{} #{} for '{}' was cut short after {elapsed:?}",
                request.job.name(),
                request.generation,
                request.key
            );
        }

        let response = Response {
            key: request.key,
            generation: request.generation,
            output,
            complete,
            elapsed,
        };
        if tx.send(response).is_err() {
            break;
        }
    }
    debug!("sampling thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(text: &str) -> Equation {
        Equation::parse(text).unwrap()
    }

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn wait(worker: &Worker) -> Response {
        worker
            .recv_timeout(Duration::from_secs(30))
            .expect("a response")
    }

    #[test]
    fn plots_in_the_background() {
        init();
        let worker = Worker::spawn(Settings::default()).unwrap();
        let ticket = worker.submit("main", Job::Plot(eq("x^2"), None)).unwrap();
        assert_eq!(ticket.generation, 1);

        let resp = wait(&worker);
        assert_eq!(resp.key, "main");
        assert!(resp.complete);
        match resp.output {
            Output::Plot(SampleSet::Curve(c)) => assert_eq!(c.len(), 1001),
            x => panic!("unexpected {x:?}"),
        }
    }

    #[test]
    fn last_submitted_wins() {
        let worker = Worker::spawn(Settings::default()).unwrap();
        for text in ["x", "x^2", "x^3"] {
            worker.submit("main", Job::Roots(eq(text), None)).unwrap();
        }
        let last = worker.submit("main", Job::Roots(eq("x-1"), None)).unwrap();
        assert!(worker.is_latest(&last));

        let resp = wait(&worker);
        assert_eq!(resp.generation, last.generation);
        match resp.output {
            Output::Roots(r) => {
                assert_eq!(r.len(), 1);
                assert!((r[0].x - 1.0).abs() < 1e-9);
            }
            x => panic!("unexpected {x:?}"),
        }

        // nothing older follows
        assert!(worker.recv_timeout(Duration::from_millis(200)).is_none());
    }

    #[test]
    fn keys_are_independent() {
        let worker = Worker::spawn(Settings::default()).unwrap();
        let a = worker
            .submit("a", Job::IntegralShape(eq("x"), Some(Range::new(0.0, 1.0))))
            .unwrap();
        let b = worker
            .submit("b", Job::Derivative(eq("x^2"), None))
            .unwrap();
        assert_eq!(a.generation, 1);
        assert_eq!(b.generation, 1);

        let mut got = vec![wait(&worker), wait(&worker)];
        got.sort_by(|x, y| x.key.cmp(&y.key));
        assert!(matches!(got[0].output, Output::IntegralShape(_)));
        assert!(matches!(got[1].output, Output::Derivative(_)));
    }

    #[test]
    fn expired_budget_returns_partial_results() {
        init();
        let settings = Settings {
            budget_ms: Some(0),
            ..Settings::default()
        };
        let worker = Worker::spawn(settings).unwrap();
        worker
            .submit("surface", Job::Plot(eq("z=sin(x)*cos(y)"), None))
            .unwrap();

        let resp = wait(&worker);
        assert!(!resp.complete);
        match resp.output {
            Output::Plot(SampleSet::Surface(s)) => assert!(s.z.is_empty()),
            x => panic!("unexpected {x:?}"),
        }
    }

    #[test]
    fn job_runs_inline() {
        let out = Job::Roots(eq("x^2-4"), Some(Range::new(-5.0, 5.0))).run(&Settings::default(), Never);
        match out {
            Output::Roots(r) => assert_eq!(r.len(), 2),
            x => panic!("unexpected {x:?}"),
        }
    }

    #[test]
    fn drop_stops_the_thread() {
        let worker = Worker::spawn(Settings::default()).unwrap();
        worker.submit("main", Job::Plot(eq("sin(x)"), None)).unwrap();
        drop(worker);
    }

    #[test]
    fn drop_interrupts_a_running_job() {
        init();
        // far more cells than can be sampled before the deadline below
        let settings = Settings {
            surface_resolution: 20_000,
            ..Settings::default()
        };
        let worker = Worker::spawn(settings).unwrap();
        worker
            .submit("surface", Job::Plot(eq("z=sin(x)*cos(y)"), None))
            .unwrap();
        thread::sleep(Duration::from_millis(50));

        let started = Instant::now();
        drop(worker);
        assert!(started.elapsed() < Duration::from_secs(5), "{:?}", started.elapsed());
    }
}
