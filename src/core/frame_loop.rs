//=========================================================================
// Frame Loop
//=========================================================================
//
// Fixed-budget frame pacing and the RUNNING → QUIT run state.
//
// Architecture:
// ```text
//   step()
//     ├─ start  = clock.elapsed()
//     ├─ input  ──► FramePhases::input   (may request exit)
//     ├─ update ──► FramePhases::update  (may request exit)
//     ├─ render ──► FramePhases::render
//     ├─ wait until clock.elapsed() >= start + budget   (Pacing)
//     └─ frames += 1, simulation_time = frames / frame_rate
// ```
//
// Key Design Decisions:
// - **No early frames**: a step never returns before its budget elapsed
// - **No catch-up**: long frames are counted as late, never compensated
// - **No mid-frame abort**: an exit request only takes effect once the
//   driver rechecks `is_running()` after the step returns
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::{debug, info, trace};

//=== Internal Dependencies ===============================================

use super::clock::{Clock, Monotonic, TimeSource};

//=== Constants ===========================================================

/// Default target frame rate in frames per second.
pub const DEFAULT_FRAME_RATE: f64 = 60.0;

//=== SimulationState =====================================================

/// Run state of the loop. `Quit` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Running,
    Quit,
}

//=== Control =============================================================

/// Handle through which phases and handlers request exit.
///
/// Borrowed from the frame loop for the duration of one phase. It can
/// only move the state towards `Quit`.
#[derive(Debug)]
pub struct Control<'a> {
    state: &'a mut SimulationState,
}

impl<'a> Control<'a> {
    pub fn new(state: &'a mut SimulationState) -> Self {
        Self { state }
    }

    /// Moves the run state to `Quit`. Repeated requests are harmless.
    pub fn request_exit(&mut self) {
        if *self.state == SimulationState::Running {
            debug!(target: "frame_loop", "Exit requested");
        }
        *self.state = SimulationState::Quit;
    }

    pub fn is_running(&self) -> bool {
        *self.state == SimulationState::Running
    }
}

//=== FrameInfo / FrameTiming =============================================

/// Frame data handed to the update phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Number of frames completed before this one.
    pub frame: u64,

    /// Approximate simulation time in seconds (`frame / frame_rate`).
    pub simulation_time: f64,

    /// Target duration of one frame in seconds.
    pub frame_budget: f64,
}

/// Clock readings for one completed step, in seconds since clock start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    pub started_at: f64,
    pub finished_at: f64,

    /// Time spent in the input, update and render phases.
    pub work_time: f64,

    /// `true` when the phases alone exceeded the frame budget.
    pub overran: bool,
}

//=== Pacing ==============================================================

/// Strategy for the wait at the end of each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Busy-wait on the clock until the deadline.
    #[default]
    Spin,

    /// Sleep until `spin_tail` before the deadline, then busy-wait.
    SleepThenSpin { spin_tail: Duration },

    /// Return immediately; an external host owns pacing.
    Hosted,
}

//=== FramePhases =========================================================

/// The three per-frame phases a [`FrameLoop`] sequences.
pub trait FramePhases {
    fn input(&mut self, control: &mut Control<'_>);
    fn update(&mut self, frame: &FrameInfo, control: &mut Control<'_>);
    fn render(&mut self);
}

//=== FrameLoop ===========================================================

/// Owns the clock, the run state and the frame counter.
///
/// # Examples
///
/// ```
/// use flappy_shell::core::frame_loop::{Control, FrameInfo, FrameLoop, FramePhases, Pacing};
///
/// struct QuitAfterOne;
/// impl FramePhases for QuitAfterOne {
///     fn input(&mut self, control: &mut Control<'_>) { control.request_exit(); }
///     fn update(&mut self, _frame: &FrameInfo, _control: &mut Control<'_>) {}
///     fn render(&mut self) {}
/// }
///
/// let mut frame_loop = FrameLoop::new(60.0, Pacing::Hosted);
/// frame_loop.step(&mut QuitAfterOne);
/// assert!(!frame_loop.is_running());
/// assert_eq!(frame_loop.frame_count(), 1);
/// ```
#[derive(Debug)]
pub struct FrameLoop<T: TimeSource = Monotonic> {
    clock: Clock<T>,
    state: SimulationState,
    pacing: Pacing,
    frame_rate: f64,
    frame_budget: f64,
    frames: u64,
    simulation_time: f64,
    late_frames: u64,
}

impl FrameLoop<Monotonic> {
    /// Creates a loop on the system monotonic clock.
    ///
    /// # Panics
    ///
    /// Panics if `frame_rate` is not strictly positive and finite.
    pub fn new(frame_rate: f64, pacing: Pacing) -> Self {
        Self::with_clock(Clock::new(), frame_rate, pacing)
    }
}

impl<T: TimeSource> FrameLoop<T> {
    /// Creates a loop on a caller-supplied clock.
    ///
    /// # Panics
    ///
    /// Panics if `frame_rate` is not strictly positive and finite.
    pub fn with_clock(mut clock: Clock<T>, frame_rate: f64, pacing: Pacing) -> Self {
        assert!(
            frame_rate.is_finite() && frame_rate > 0.0,
            "Frame rate must be positive, got {}",
            frame_rate
        );

        clock.start();
        info!(
            target: "frame_loop",
            "Frame loop ready ({} fps, budget {:.3} ms, {:?})",
            frame_rate,
            1000.0 / frame_rate,
            pacing
        );

        Self {
            clock,
            state: SimulationState::Running,
            pacing,
            frame_rate,
            frame_budget: 1.0 / frame_rate,
            frames: 0,
            simulation_time: 0.0,
            late_frames: 0,
        }
    }

    //--- Stepping ---------------------------------------------------------

    /// Runs one full frame: input, update, render, then the pacing wait.
    ///
    /// All three phases always run, even if exit was requested earlier in
    /// the same step.
    pub fn step(&mut self, phases: &mut dyn FramePhases) -> FrameTiming {
        let started_at = self.clock.elapsed();

        {
            let mut control = Control::new(&mut self.state);
            phases.input(&mut control);

            let info = FrameInfo {
                frame: self.frames,
                simulation_time: self.simulation_time,
                frame_budget: self.frame_budget,
            };
            phases.update(&info, &mut control);
        }

        phases.render();

        let work_done_at = self.clock.elapsed();
        let target_end = started_at + self.frame_budget;
        let overran = work_done_at > target_end;

        if overran {
            self.late_frames += 1;
            debug!(
                target: "frame_loop",
                "Frame {} overran budget: {:.3} ms of work",
                self.frames,
                (work_done_at - started_at) * 1000.0
            );
        }

        let finished_at = self.wait_until(target_end, work_done_at);

        self.frames += 1;
        self.simulation_time = self.frames as f64 / self.frame_rate;

        trace!(
            target: "frame_loop",
            "Frame {} done in {:.3} ms",
            self.frames,
            (finished_at - started_at) * 1000.0
        );

        FrameTiming {
            started_at,
            finished_at,
            work_time: work_done_at - started_at,
            overran,
        }
    }

    /// Blocks per the pacing policy; returns the last clock reading.
    fn wait_until(&self, target_end: f64, mut now: f64) -> f64 {
        match self.pacing {
            Pacing::Hosted => now,
            Pacing::Spin => {
                while now < target_end {
                    std::hint::spin_loop();
                    now = self.clock.elapsed();
                }
                now
            }
            Pacing::SleepThenSpin { spin_tail } => {
                let remaining = target_end - now;
                let coarse = remaining - spin_tail.as_secs_f64();
                if coarse > 0.0 {
                    std::thread::sleep(Duration::from_secs_f64(coarse));
                    now = self.clock.elapsed();
                }
                while now < target_end {
                    std::hint::spin_loop();
                    now = self.clock.elapsed();
                }
                now
            }
        }
    }

    //--- Run State --------------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Requests exit from outside a step (e.g. a host shutting down).
    pub fn request_exit(&mut self) {
        Control::new(&mut self.state).request_exit();
    }

    //--- Pacing -----------------------------------------------------------

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn set_pacing(&mut self, pacing: Pacing) {
        debug!(target: "frame_loop", "Pacing changed: {:?} -> {:?}", self.pacing, pacing);
        self.pacing = pacing;
    }

    //--- Statistics -------------------------------------------------------

    /// Completed frames.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Approximate simulation time: `frame_count / frame_rate` seconds.
    ///
    /// Drifts from wall-clock time whenever frames run long.
    pub fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Target frame duration in seconds.
    pub fn frame_budget(&self) -> f64 {
        self.frame_budget
    }

    /// Frames whose phases alone exceeded the budget.
    pub fn late_frames(&self) -> u64 {
        self.late_frames
    }

    pub fn clock(&self) -> &Clock<T> {
        &self.clock
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::SteppingSource;

    //--- Fixtures ---------------------------------------------------------

    /// Records phase order and can burn scripted time in the update phase.
    #[derive(Default)]
    struct Script {
        log: Vec<&'static str>,
        exit_on_input: bool,
        burn: Option<(SteppingSource, Duration)>,
        seen_frames: Vec<FrameInfo>,
    }

    impl FramePhases for Script {
        fn input(&mut self, control: &mut Control<'_>) {
            self.log.push("input");
            if self.exit_on_input {
                control.request_exit();
            }
        }

        fn update(&mut self, frame: &FrameInfo, _control: &mut Control<'_>) {
            self.log.push("update");
            self.seen_frames.push(*frame);
            if let Some((source, by)) = &self.burn {
                source.advance(*by);
            }
        }

        fn render(&mut self) {
            self.log.push("render");
        }
    }

    fn stepping_loop(step: Duration, pacing: Pacing) -> (FrameLoop<SteppingSource>, SteppingSource) {
        let source = SteppingSource::new(step);
        let frame_loop = FrameLoop::with_clock(Clock::with_source(source.clone()), 60.0, pacing);
        (frame_loop, source)
    }

    //=====================================================================
    // Construction Tests
    //=====================================================================

    #[test]
    fn defaults_to_running() {
        let frame_loop = FrameLoop::new(DEFAULT_FRAME_RATE, Pacing::Spin);
        assert!(frame_loop.is_running());
        assert_eq!(frame_loop.frame_count(), 0);
        assert_eq!(frame_loop.simulation_time(), 0.0);
        assert!((frame_loop.frame_budget() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "Frame rate must be positive")]
    fn zero_frame_rate_panics() {
        FrameLoop::new(0.0, Pacing::Spin);
    }

    #[test]
    #[should_panic(expected = "Frame rate must be positive")]
    fn negative_frame_rate_panics() {
        FrameLoop::new(-30.0, Pacing::Spin);
    }

    //=====================================================================
    // Phase Order Tests
    //=====================================================================

    #[test]
    fn phases_run_in_order() {
        let (mut frame_loop, _source) = stepping_loop(Duration::from_millis(1), Pacing::Spin);
        let mut script = Script::default();

        frame_loop.step(&mut script);

        assert_eq!(script.log, vec!["input", "update", "render"]);
    }

    #[test]
    fn exit_during_input_still_renders() {
        let (mut frame_loop, _source) = stepping_loop(Duration::from_millis(1), Pacing::Spin);
        let mut script = Script {
            exit_on_input: true,
            ..Script::default()
        };

        frame_loop.step(&mut script);

        assert_eq!(script.log, vec!["input", "update", "render"]);
        assert!(!frame_loop.is_running());
        assert_eq!(frame_loop.frame_count(), 1, "The exiting frame still completes");
    }

    #[test]
    fn quit_is_terminal() {
        let (mut frame_loop, _source) = stepping_loop(Duration::from_millis(1), Pacing::Spin);
        let mut quitter = Script {
            exit_on_input: true,
            ..Script::default()
        };
        frame_loop.step(&mut quitter);

        let mut idle = Script::default();
        for _ in 0..5 {
            frame_loop.step(&mut idle);
            assert!(!frame_loop.is_running());
            assert_eq!(frame_loop.state(), SimulationState::Quit);
        }
    }

    //=====================================================================
    // Pacing Tests
    //=====================================================================

    #[test]
    fn step_never_ends_before_budget() {
        let (mut frame_loop, _source) = stepping_loop(Duration::from_micros(700), Pacing::Spin);
        let mut script = Script::default();

        for _ in 0..20 {
            let timing = frame_loop.step(&mut script);
            assert!(
                timing.finished_at >= timing.started_at + frame_loop.frame_budget(),
                "Frame ended early: {:?}",
                timing
            );
            assert!(!timing.overran);
        }
        assert_eq!(frame_loop.late_frames(), 0);
    }

    #[test]
    fn long_frames_are_not_compensated() {
        let source = SteppingSource::new(Duration::from_micros(100));
        let mut frame_loop =
            FrameLoop::with_clock(Clock::with_source(source.clone()), 60.0, Pacing::Spin);
        let mut slow = Script {
            burn: Some((source.clone(), Duration::from_millis(50))),
            ..Script::default()
        };

        let long = frame_loop.step(&mut slow);
        assert!(long.overran);
        assert!(long.work_time >= 0.05);

        let mut fast = Script::default();
        let next = frame_loop.step(&mut fast);

        assert!(
            next.finished_at - next.started_at >= frame_loop.frame_budget(),
            "The frame after a long one still waits its full budget"
        );
        assert_eq!(frame_loop.late_frames(), 1);
    }

    #[test]
    fn hosted_pacing_does_not_wait() {
        let (mut frame_loop, source) = stepping_loop(Duration::from_micros(10), Pacing::Hosted);
        let mut script = Script::default();

        let timing = frame_loop.step(&mut script);

        assert!(timing.finished_at < timing.started_at + frame_loop.frame_budget());
        assert!(source.queries() < 10, "Hosted pacing must not poll the clock in a loop");
    }

    #[test]
    fn sleep_then_spin_respects_budget() {
        let mut frame_loop = FrameLoop::new(
            240.0,
            Pacing::SleepThenSpin {
                spin_tail: Duration::from_micros(500),
            },
        );
        let mut script = Script::default();

        for _ in 0..5 {
            let timing = frame_loop.step(&mut script);
            assert!(timing.finished_at >= timing.started_at + frame_loop.frame_budget());
        }
    }

    #[test]
    fn spin_respects_budget_on_real_clock() {
        let mut frame_loop = FrameLoop::new(500.0, Pacing::Spin);
        let mut script = Script::default();

        let timing = frame_loop.step(&mut script);

        assert!(timing.finished_at - timing.started_at >= 0.002);
    }

    #[test]
    fn set_pacing_switches_policy() {
        let (mut frame_loop, _source) = stepping_loop(Duration::from_micros(10), Pacing::Spin);
        frame_loop.set_pacing(Pacing::Hosted);
        assert_eq!(frame_loop.pacing(), Pacing::Hosted);
    }

    //=====================================================================
    // Counter Tests
    //=====================================================================

    #[test]
    fn counter_increments_once_per_step() {
        let source = SteppingSource::new(Duration::from_millis(1));
        let mut frame_loop =
            FrameLoop::with_clock(Clock::with_source(source.clone()), 60.0, Pacing::Spin);

        let burns = [0, 1, 40, 200, 3];
        for (i, ms) in burns.iter().enumerate() {
            let mut script = Script {
                burn: Some((source.clone(), Duration::from_millis(*ms))),
                ..Script::default()
            };
            frame_loop.step(&mut script);
            assert_eq!(frame_loop.frame_count(), i as u64 + 1);
        }
    }

    #[test]
    fn simulation_time_is_frames_over_rate() {
        let (mut frame_loop, _source) = stepping_loop(Duration::from_millis(1), Pacing::Spin);
        let mut script = Script::default();

        for _ in 0..30 {
            frame_loop.step(&mut script);
        }

        assert!((frame_loop.simulation_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn update_sees_frame_info_before_increment() {
        let (mut frame_loop, _source) = stepping_loop(Duration::from_millis(1), Pacing::Spin);
        let mut script = Script::default();

        frame_loop.step(&mut script);
        frame_loop.step(&mut script);

        assert_eq!(script.seen_frames[0].frame, 0);
        assert_eq!(script.seen_frames[1].frame, 1);
        assert!((script.seen_frames[1].simulation_time - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn external_exit_request_stops_loop() {
        let (mut frame_loop, _source) = stepping_loop(Duration::from_millis(1), Pacing::Spin);
        frame_loop.request_exit();
        frame_loop.request_exit();
        assert!(!frame_loop.is_running());
    }

    #[test]
    fn source_timeline_advances_with_steps() {
        let (mut frame_loop, source) = stepping_loop(Duration::from_millis(1), Pacing::Spin);
        let mut script = Script::default();

        frame_loop.step(&mut script);

        assert!(source.current() >= Duration::from_secs_f64(1.0 / 60.0));
    }
}
