use std::time::Duration;

use tracing::{debug, info};

use crate::{
    clock::{Clock, ManualClock, SystemClock},
    corpus::Corpus,
    metrics::Metrics,
    session::{Phase, SessionState},
    surface::{
        CellGrid, CellStatus, DisplaySurface, InputBuffer, InputSurface, MetricsBoard,
        MetricsSurface,
    },
    ticker::{ManualTicks, ThreadTicker, TickGuard, TickId, TickScheduler},
    time_series::WpmSample,
};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Controller wired to the terminal front-end
pub type TerminalController =
    SessionController<CellGrid, InputBuffer, MetricsBoard, SystemClock, ThreadTicker>;

/// Controller with a hand-driven clock and tick source
pub type HeadlessController =
    SessionController<CellGrid, InputBuffer, MetricsBoard, ManualClock, ManualTicks>;

/// Owns one typing test: the target text, its counters and timer, and the
/// surfaces it draws on. Every mutation goes through `start`,
/// `on_input_changed`, `on_tick` or `finish`.
#[derive(Debug)]
pub struct SessionController<D, I, M, C, T> {
    corpus: Corpus,
    target: Vec<char>,
    state: SessionState,
    display: D,
    input: I,
    metrics: M,
    clock: C,
    ticks: T,
    tick: Option<TickGuard>,
    tick_interval: Duration,
}

impl<D, I, M, C, T> SessionController<D, I, M, C, T>
where
    D: DisplaySurface,
    I: InputSurface,
    M: MetricsSurface,
    C: Clock,
    T: TickScheduler,
{
    /// Build a controller and start the first test.
    pub fn new(corpus: Corpus, display: D, input: I, metrics: M, clock: C, ticks: T) -> Self {
        let mut controller = Self {
            corpus,
            target: Vec::new(),
            state: SessionState::default(),
            display,
            input,
            metrics,
            clock,
            ticks,
            tick: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
        };
        controller.start();
        controller
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Begin a new test on a text picked at random from the corpus.
    pub fn start(&mut self) {
        let text = self.corpus.select_random_text();
        self.start_with(text);
    }

    /// Begin a new test on the given text.
    pub fn start_with<S: Into<String>>(&mut self, text: S) {
        let text = text.into();
        self.cancel_tick();

        self.target = text.chars().collect();
        self.state = SessionState::default();

        self.display.render_cells(&text);
        self.display.set_status(0, CellStatus::Current);

        self.input.clear();
        self.input.set_max_chars(Some(self.target.len()));
        self.input.enable();
        self.input.focus();

        self.metrics.publish_wpm(0);
        self.metrics.publish_accuracy(0);

        info!(target_len = self.target.len(), "session started");
    }

    /// React to a change of the typed text.
    ///
    /// Only the boundary cell at `typed_count` is touched per call, whatever
    /// the size of the length delta.
    pub fn on_input_changed(&mut self) {
        if self.state.finished {
            return;
        }

        if !self.state.running {
            self.begin_timing();
        }

        let new_len = self.input.value().chars().count();
        let typed_count = self.state.typed_count;

        if new_len > typed_count && typed_count < self.target.len() {
            let typed = self.input.value().chars().nth(typed_count);
            self.advance(typed);
        } else if new_len < typed_count {
            self.retreat();
        }

        debug!(
            new_len,
            typed = self.state.typed_count,
            correct = self.state.correct_count,
            "input changed"
        );

        // surfaces without a length cap can overshoot the target
        if new_len >= self.target.len() {
            self.finish();
            return;
        }

        self.update_metrics();
    }

    /// Periodic refresh so wpm decays while the typist pauses.
    pub fn on_tick(&mut self) {
        if !self.state.running {
            return;
        }
        let metrics = self.update_metrics();
        self.record_sample(metrics);
    }

    /// Tick delivered through an event queue. Ticks from a guard this
    /// controller no longer holds are dropped.
    pub fn on_tick_from(&mut self, id: TickId) {
        if self.tick_id() != Some(id) {
            debug!(id, "stale tick ignored");
            return;
        }
        self.on_tick();
    }

    /// Recompute wpm and accuracy and publish them.
    pub fn update_metrics(&mut self) -> Metrics {
        let elapsed = self.state.elapsed(self.clock.now());
        let metrics = Metrics::compute(self.state.correct_count, self.state.typed_count, elapsed);

        self.metrics.publish_wpm(metrics.wpm);
        self.metrics.publish_accuracy(metrics.accuracy);

        metrics
    }

    pub fn finish(&mut self) {
        self.state.running = false;
        self.state.finished = true;
        self.cancel_tick();
        self.input.disable();

        let metrics = self.update_metrics();
        self.record_sample(metrics);

        let last = self.target.len().checked_sub(1);
        for idx in last.into_iter().chain([self.state.typed_count]) {
            if self.display.status(idx) == Some(CellStatus::Current) {
                self.display.set_status(idx, CellStatus::Pending);
            }
        }

        info!(
            wpm = metrics.wpm,
            accuracy = metrics.accuracy,
            typed = self.state.typed_count,
            correct = self.state.correct_count,
            "session finished"
        );
    }

    fn begin_timing(&mut self) {
        self.state.running = true;
        self.state.elapsed_start = Some(self.clock.now());
        self.cancel_tick();
        self.tick = Some(self.ticks.arm(self.tick_interval));
        debug!(interval_ms = self.tick_interval.as_millis() as u64, "tick armed");
    }

    fn cancel_tick(&mut self) {
        if let Some(guard) = self.tick.take() {
            guard.cancel();
            debug!("tick cancelled");
        }
    }

    fn advance(&mut self, typed: Option<char>) {
        let idx = self.state.typed_count;
        let status = match (typed, self.target.get(idx)) {
            (Some(t), Some(expected)) if t == *expected => {
                self.state.correct_count += 1;
                CellStatus::Correct
            }
            _ => CellStatus::Incorrect,
        };

        self.display.set_status(idx, status);
        self.display.set_status(idx + 1, CellStatus::Current);
        self.state.typed_count += 1;
    }

    fn retreat(&mut self) {
        self.state.typed_count -= 1;
        let idx = self.state.typed_count;

        if self.display.status(idx + 1) == Some(CellStatus::Current) {
            self.display.set_status(idx + 1, CellStatus::Pending);
        }

        if self.display.status(idx) == Some(CellStatus::Correct) {
            self.state.correct_count = self.state.correct_count.saturating_sub(1);
        }
        self.display.set_status(idx, CellStatus::Current);
    }

    fn record_sample(&mut self, metrics: Metrics) {
        if let Some(elapsed) = self.state.elapsed(self.clock.now()) {
            let secs = elapsed.as_secs_f64();
            if secs > 0.0 {
                self.state
                    .wpm_samples
                    .push(WpmSample::new(secs, metrics.wpm as f64));
            }
        }
    }
}

impl<D, I, M, C, T> SessionController<D, I, M, C, T> {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn target_text(&self) -> String {
        self.target.iter().collect()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    pub fn wpm_samples(&self) -> &[WpmSample] {
        &self.state.wpm_samples
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn has_live_tick(&self) -> bool {
        self.tick.as_ref().is_some_and(TickGuard::is_live)
    }

    /// Id carried by ticks of the currently armed guard
    pub fn tick_id(&self) -> Option<TickId> {
        self.tick.as_ref().map(TickGuard::id)
    }
}
