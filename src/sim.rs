use crate::phase::{adjust, current_phase, phase_index, sequence, Phase, PhaseInfo};
use crate::table::{lifetime_myr, lookup, StellarProperties, TABLE_MAX_MASS, TABLE_MIN_MASS};
use std::time::Duration;
use tracing::{debug, info, warn};

pub(crate) const DEFAULT_MASS: f64 = 1.0;
pub(crate) const SLIDER_MIN_MASS: f64 = 0.5;
pub(crate) const SLIDER_MAX_MASS: f64 = 50.0;
pub(crate) const SLIDER_STEP: f64 = 0.5;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Preset {
    pub(crate) name: &'static str,
    pub(crate) mass: f64,
}

pub(crate) const PRESETS: [Preset; 4] = [
    Preset {
        name: "Red Dwarf",
        mass: 0.5,
    },
    Preset {
        name: "Sun-like",
        mass: 1.0,
    },
    Preset {
        name: "Massive",
        mass: 8.0,
    },
    Preset {
        name: "Supergiant",
        mass: 25.0,
    },
];

/// Snap to the slider grid and keep inside the slider bounds.
pub(crate) fn snap_slider_mass(mass: f64) -> f64 {
    let snapped = (mass / SLIDER_STEP).round() * SLIDER_STEP;
    snapped.clamp(SLIDER_MIN_MASS, SLIDER_MAX_MASS)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ClockConfig {
    pub(crate) tick: Duration,
    pub(crate) phase_span: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            phase_span: Duration::from_millis(5000),
        }
    }
}

impl ClockConfig {
    pub(crate) fn ticks_per_phase(&self) -> u32 {
        if self.tick.is_zero() {
            return 1;
        }
        ((self.phase_span.as_nanos() / self.tick.as_nanos()) as u32).max(1)
    }
}

/// The armed repeating task. Exists only while the simulation runs; taking it
/// out of the session is how ticking stops.
#[derive(Debug)]
struct TickTimer {
    step: Duration,
    accum: Duration,
    increment: f64,
}

#[derive(Clone, Debug)]
pub(crate) struct SimulationState {
    pub(crate) mass: f64,
    pub(crate) age: f64,
    pub(crate) max_age: f64,
    pub(crate) phase: Phase,
    pub(crate) running: bool,
}

/// Everything the presentation layer reads after a state change.
#[derive(Clone, Debug)]
pub(crate) struct Observation {
    pub(crate) mass: f64,
    pub(crate) phase: Phase,
    pub(crate) info: PhaseInfo,
    pub(crate) phase_index: usize,
    pub(crate) sequence: &'static [Phase],
    pub(crate) age: f64,
    pub(crate) max_age: f64,
    pub(crate) properties: StellarProperties,
    pub(crate) progress: f64,
    pub(crate) running: bool,
}

pub(crate) struct Simulation {
    state: SimulationState,
    clock: ClockConfig,
    timer: Option<TickTimer>,
}

impl Simulation {
    pub(crate) fn new(mass: f64, clock: ClockConfig) -> Self {
        let mass = if mass.is_finite() {
            mass.clamp(TABLE_MIN_MASS, TABLE_MAX_MASS)
        } else {
            DEFAULT_MASS
        };
        Self {
            state: SimulationState {
                mass,
                age: 0.0,
                max_age: lifetime_myr(mass),
                phase: Phase::MainSequence,
                running: false,
            },
            clock,
            timer: None,
        }
    }

    pub(crate) fn state(&self) -> &SimulationState {
        &self.state
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state.running
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.state.age >= self.state.max_age
    }

    pub(crate) fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }
        if self.is_complete() {
            debug!("start ignored: run already complete");
            return;
        }
        let phases = sequence(self.state.mass).len() as f64;
        let ticks = self.clock.ticks_per_phase() as f64;
        let increment = self.state.max_age / (phases * ticks);
        self.timer = Some(TickTimer {
            step: self.clock.tick,
            accum: Duration::ZERO,
            increment,
        });
        self.state.running = true;
        info!(
            mass = self.state.mass,
            age = self.state.age,
            increment_myr = increment,
            "simulation started"
        );
    }

    pub(crate) fn pause(&mut self) {
        if self.timer.take().is_some() {
            info!(age = self.state.age, "simulation paused");
        }
        self.state.running = false;
    }

    pub(crate) fn toggle(&mut self) {
        if self.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    pub(crate) fn reset(&mut self) {
        self.pause();
        self.state.age = 0.0;
        self.state.phase = Phase::MainSequence;
        debug!(mass = self.state.mass, "simulation reset");
    }

    pub(crate) fn set_mass(&mut self, mass: f64) {
        if !mass.is_finite() {
            warn!(mass, "ignoring non-finite mass");
            return;
        }
        let mass = mass.clamp(TABLE_MIN_MASS, TABLE_MAX_MASS);
        self.state.mass = mass;
        self.state.max_age = lifetime_myr(mass);
        info!(mass, max_age_myr = self.state.max_age, "mass changed");
        self.reset();
    }

    /// Move along the slider by `steps` notches.
    pub(crate) fn nudge_mass(&mut self, steps: i32) {
        let target = snap_slider_mass(self.state.mass + steps as f64 * SLIDER_STEP);
        if target != self.state.mass {
            self.set_mass(target);
        }
    }

    /// Feed wall-clock time to the armed timer and fire every whole tick that
    /// fits. Returns the number of ticks fired.
    pub(crate) fn advance(&mut self, elapsed: Duration) -> u32 {
        let Some(timer) = self.timer.as_mut() else {
            return 0;
        };
        if timer.step.is_zero() {
            return 0;
        }
        timer.accum = timer.accum.saturating_add(elapsed);

        let mut fired = 0;
        while let Some(t) = self.timer.as_mut() {
            if t.accum < t.step {
                break;
            }
            t.accum -= t.step;
            let increment = t.increment;
            self.tick(increment);
            fired += 1;
        }
        fired
    }

    fn tick(&mut self, increment: f64) {
        let new_age = self.state.age + increment;
        if new_age >= self.state.max_age {
            self.state.age = self.state.max_age;
            self.timer = None;
            self.state.running = false;
            self.sync_phase();
            info!(
                max_age_myr = self.state.max_age,
                phase = self.state.phase.slug(),
                "simulation complete"
            );
        } else {
            self.state.age = new_age;
            self.sync_phase();
        }
    }

    fn sync_phase(&mut self) {
        let st = &self.state;
        let next = current_phase(st.age, st.max_age, st.mass);
        if next != st.phase {
            debug!(
                from = st.phase.slug(),
                to = next.slug(),
                age_myr = st.age,
                "phase transition"
            );
            self.state.phase = next;
        }
    }

    pub(crate) fn progress(&self) -> f64 {
        let st = &self.state;
        if !(st.max_age > 0.0) {
            return 0.0;
        }
        (st.age / st.max_age).clamp(0.0, 1.0)
    }

    pub(crate) fn observe(&self) -> Observation {
        let st = &self.state;
        Observation {
            mass: st.mass,
            phase: st.phase,
            info: st.phase.info(),
            phase_index: phase_index(st.age, st.max_age, st.mass),
            sequence: sequence(st.mass),
            age: st.age,
            max_age: st.max_age,
            properties: adjust(st.phase, lookup(st.mass)),
            progress: self.progress(),
            running: st.running,
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if self.timer.take().is_some() {
            debug!("session dropped with armed timer; cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(mass: f64) -> Simulation {
        Simulation::new(mass, ClockConfig::default())
    }

    #[test]
    fn new_session_defaults() {
        let s = sim(DEFAULT_MASS);
        let st = s.state();
        assert_eq!(st.mass, 1.0);
        assert_eq!(st.age, 0.0);
        assert_eq!(st.max_age, 10_000.0);
        assert_eq!(st.phase, Phase::MainSequence);
        assert!(!st.running);
    }

    #[test]
    fn stopped_clock_ignores_time() {
        let mut s = sim(1.0);
        assert_eq!(s.advance(Duration::from_secs(60)), 0);
        assert_eq!(s.state().age, 0.0);
    }

    #[test]
    fn one_phase_span_reaches_red_giant() {
        let mut s = sim(1.0);
        s.start();
        assert_eq!(s.advance(Duration::from_millis(4900)), 49);
        assert_eq!(s.state().phase, Phase::MainSequence);
        assert_eq!(s.advance(Duration::from_millis(100)), 1);
        assert_eq!(s.state().phase, Phase::RedGiant);
        assert!(s.is_running());
    }

    #[test]
    fn sub_tick_time_carries_over() {
        let mut s = sim(1.0);
        s.start();
        assert_eq!(s.advance(Duration::from_millis(60)), 0);
        assert_eq!(s.advance(Duration::from_millis(60)), 1);
        assert_eq!(s.advance(Duration::from_millis(80)), 1);
    }

    #[test]
    fn completes_and_clamps_to_max_age() {
        let mut s = sim(1.0);
        s.start();
        s.advance(Duration::from_secs(120));
        let st = s.state();
        assert_eq!(st.age, st.max_age);
        assert_eq!(st.phase, Phase::WhiteDwarf);
        assert!(!st.running);
        assert!(s.is_complete());
        assert_eq!(s.progress(), 1.0);
        // timer is gone, further time is ignored
        assert_eq!(s.advance(Duration::from_secs(5)), 0);
    }

    #[test]
    fn full_run_lasts_phase_count_spans() {
        // 25 M☉: five phases, 25 s of wall time
        let mut s = sim(25.0);
        s.start();
        s.advance(Duration::from_millis(24_000));
        assert!(s.is_running());
        s.advance(Duration::from_millis(1_200));
        assert!(!s.is_running());
        assert_eq!(s.state().phase, Phase::BlackHole);
    }

    #[test]
    fn start_is_idempotent() {
        let mut s = sim(1.0);
        s.start();
        s.advance(Duration::from_millis(250));
        let age = s.state().age;
        s.start();
        // the second start must not re-arm or add a second timer
        assert_eq!(s.advance(Duration::from_millis(50)), 1);
        assert!(s.state().age > age);
        assert_eq!(s.advance(Duration::from_millis(100)), 1);
    }

    #[test]
    fn pause_keeps_age_and_is_idempotent() {
        let mut s = sim(1.0);
        s.start();
        s.advance(Duration::from_millis(700));
        s.pause();
        let once = s.state().clone();
        s.pause();
        let twice = s.state().clone();
        assert_eq!(once.age, twice.age);
        assert_eq!(once.phase, twice.phase);
        assert!(!twice.running);
        assert!(twice.age > 0.0);
        assert_eq!(s.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn reset_after_any_sequence() {
        let mut s = sim(1.0);
        s.start();
        s.advance(Duration::from_millis(12_345));
        s.pause();
        s.start();
        s.advance(Duration::from_millis(999));
        s.reset();
        let st = s.state();
        assert_eq!(st.age, 0.0);
        assert_eq!(st.phase, Phase::MainSequence);
        assert!(!st.running);
        assert_eq!(s.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn start_after_completion_does_nothing() {
        let mut s = sim(0.5);
        s.start();
        s.advance(Duration::from_secs(30));
        assert!(s.is_complete());
        s.start();
        assert!(!s.is_running());
        s.reset();
        s.start();
        assert!(s.is_running());
    }

    #[test]
    fn set_mass_recomputes_lifetime_and_resets() {
        let mut s = sim(1.0);
        s.start();
        s.advance(Duration::from_secs(7));
        s.set_mass(8.0);
        let st = s.state();
        assert_eq!(st.mass, 8.0);
        assert!((st.max_age - 30.0).abs() < 1e-9);
        assert_eq!(st.age, 0.0);
        assert_eq!(st.phase, Phase::MainSequence);
        assert!(!st.running);
    }

    #[test]
    fn set_mass_rejects_garbage() {
        let mut s = sim(1.0);
        s.set_mass(f64::NAN);
        assert_eq!(s.state().mass, 1.0);
        s.set_mass(500.0);
        assert_eq!(s.state().mass, TABLE_MAX_MASS);
    }

    #[test]
    fn nudge_follows_slider_grid() {
        let mut s = sim(1.0);
        s.nudge_mass(1);
        assert_eq!(s.state().mass, 1.5);
        s.nudge_mass(-3);
        assert_eq!(s.state().mass, 0.5);
        s.nudge_mass(-1);
        assert_eq!(s.state().mass, 0.5);
        s.set_mass(49.5);
        s.nudge_mass(4);
        assert_eq!(s.state().mass, 50.0);
    }

    #[test]
    fn snap_slider_values() {
        assert_eq!(snap_slider_mass(1.26), 1.5);
        assert_eq!(snap_slider_mass(0.1), 0.5);
        assert_eq!(snap_slider_mass(80.0), 50.0);
    }

    #[test]
    fn observation_reflects_phase_properties() {
        let mut s = sim(1.0);
        s.start();
        s.advance(Duration::from_millis(5_000));
        let o = s.observe();
        assert_eq!(o.phase, Phase::RedGiant);
        assert_eq!(o.phase_index, 1);
        assert_eq!(o.sequence.len(), 6);
        assert_eq!(o.info.title, "Red Giant Phase");
        assert_eq!(o.properties.radius, 10.0);
        assert!(o.progress > 0.16 && o.progress < 0.17);
        assert!(o.running);
    }

    #[test]
    fn custom_cadence() {
        let clock = ClockConfig {
            tick: Duration::from_millis(50),
            phase_span: Duration::from_millis(1_000),
        };
        assert_eq!(clock.ticks_per_phase(), 20);
        let mut s = Simulation::new(1.0, clock);
        s.start();
        assert_eq!(s.advance(Duration::from_millis(1_000)), 20);
        assert_eq!(s.state().phase, Phase::RedGiant);
    }
}
