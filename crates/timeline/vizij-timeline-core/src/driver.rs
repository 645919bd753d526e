//! Reference driver runtime: scalar drivers and the timed, parallel and
//! sequential units that advance them.
//!
//! Playback is tick-driven. The host calls `update(dt)` (milliseconds) once per
//! frame on the outermost animation; composites forward the time to their
//! children. A unit that finishes part-way through a tick reports the unused
//! time as `leftover` so a sequence can hand it to the next unit.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::easing::Easing;

/// Shared scalar position of one property driver.
///
/// Cloning shares the underlying value: the timed unit writes it, the
/// interpolation reads it.
#[derive(Clone, Debug)]
pub struct DriverValue(Arc<AtomicU32>);

impl DriverValue {
    pub fn new(value: f32) -> Self {
        Self(Arc::new(AtomicU32::new(value.to_bits())))
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    /// True when both handles drive the same value.
    pub fn same_as(&self, other: &DriverValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for DriverValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Outcome of advancing an animation by one tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Tick {
    /// Not started (or stopped); time was not consumed.
    Idle,
    Running,
    /// Completed during this tick with `leftover` ms unused.
    Finished { leftover: f32 },
}

impl Tick {
    pub fn is_finished(&self) -> bool {
        matches!(self, Tick::Finished { .. })
    }
}

/// A startable, resettable unit of playback.
pub trait Animation: Send {
    /// Begin (or resume) playback from the current state.
    fn start(&mut self);

    /// Advance by `dt` milliseconds.
    fn update(&mut self, dt: f32) -> Tick;

    /// Halt in place; a later `start` resumes.
    fn stop(&mut self);

    /// Rewind to the initial state.
    fn reset(&mut self);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Done,
}

/// Advance one driver towards `to_value` over `duration` ms.
#[derive(Debug)]
pub struct Timing {
    driver: DriverValue,
    to_value: f32,
    duration: f32,
    easing: Easing,
    from: Option<f32>,
    elapsed: f32,
    phase: Phase,
}

impl Timing {
    pub fn new(driver: DriverValue, to_value: f32, duration: f32, easing: Easing) -> Self {
        Self {
            driver,
            to_value,
            duration,
            easing,
            from: None,
            elapsed: 0.0,
            phase: Phase::Idle,
        }
    }

    pub fn to_value(&self) -> f32 {
        self.to_value
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

impl Animation for Timing {
    fn start(&mut self) {
        if self.phase == Phase::Done {
            return;
        }
        // The start point is captured on the first start only; a resume keeps it.
        if self.from.is_none() {
            self.from = Some(self.driver.get());
        }
        self.phase = Phase::Running;
    }

    fn update(&mut self, dt: f32) -> Tick {
        match self.phase {
            Phase::Idle => return Tick::Idle,
            Phase::Done => return Tick::Finished { leftover: dt },
            Phase::Running => {}
        }
        let from = self.from.unwrap_or(self.to_value);
        self.elapsed += dt.max(0.0);
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            self.driver.set(self.to_value);
            self.phase = Phase::Done;
            let leftover = (self.elapsed - self.duration.max(0.0)).max(0.0);
            return Tick::Finished { leftover };
        }
        let progress = self.easing.apply(self.elapsed / self.duration);
        self.driver.set(from + (self.to_value - from) * progress);
        Tick::Running
    }

    fn stop(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Idle;
        }
    }

    fn reset(&mut self) {
        self.from = None;
        self.elapsed = 0.0;
        self.phase = Phase::Idle;
    }
}

/// Runs its children concurrently; done when the last child is done.
pub struct Parallel {
    children: Vec<Box<dyn Animation>>,
    finished: Vec<bool>,
    running: bool,
}

impl Parallel {
    pub fn new(children: Vec<Box<dyn Animation>>) -> Self {
        let finished = vec![false; children.len()];
        Self {
            children,
            finished,
            running: false,
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Animation for Parallel {
    fn start(&mut self) {
        self.running = true;
        for (child, done) in self.children.iter_mut().zip(&self.finished) {
            if !*done {
                child.start();
            }
        }
    }

    fn update(&mut self, dt: f32) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        // Smallest leftover among the children that finish on this tick is the
        // time left after the slowest one.
        let mut leftover = dt;
        for (child, done) in self.children.iter_mut().zip(self.finished.iter_mut()) {
            if *done {
                continue;
            }
            if let Tick::Finished { leftover: l } = child.update(dt) {
                *done = true;
                leftover = leftover.min(l);
            }
        }
        if self.finished.iter().all(|d| *d) {
            self.running = false;
            Tick::Finished { leftover }
        } else {
            Tick::Running
        }
    }

    fn stop(&mut self) {
        self.running = false;
        for child in &mut self.children {
            child.stop();
        }
    }

    fn reset(&mut self) {
        self.running = false;
        self.finished.iter_mut().for_each(|d| *d = false);
        for child in &mut self.children {
            child.reset();
        }
    }
}

/// Runs its children one after another; child n+1 starts only once child n
/// has finished.
pub struct Sequence {
    children: Vec<Box<dyn Animation>>,
    cursor: usize,
    running: bool,
}

impl Sequence {
    pub fn new(children: Vec<Box<dyn Animation>>) -> Self {
        Self {
            children,
            cursor: 0,
            running: false,
        }
    }

    /// Index of the child currently playing (== len() once complete).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.children.len()
    }
}

impl Animation for Sequence {
    fn start(&mut self) {
        self.running = true;
        if let Some(child) = self.children.get_mut(self.cursor) {
            child.start();
        }
    }

    fn update(&mut self, dt: f32) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        let mut remaining = dt;
        loop {
            let Some(child) = self.children.get_mut(self.cursor) else {
                self.running = false;
                return Tick::Finished {
                    leftover: remaining,
                };
            };
            match child.update(remaining) {
                Tick::Finished { leftover } => {
                    log::trace!("sequence step {} finished", self.cursor);
                    self.cursor += 1;
                    remaining = leftover;
                    if let Some(next) = self.children.get_mut(self.cursor) {
                        next.start();
                    }
                }
                Tick::Running | Tick::Idle => return Tick::Running,
            }
        }
    }

    fn stop(&mut self) {
        self.running = false;
        if let Some(child) = self.children.get_mut(self.cursor) {
            child.stop();
        }
    }

    fn reset(&mut self) {
        self.running = false;
        self.cursor = 0;
        for child in &mut self.children {
            child.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    fn timing(driver: &DriverValue, to: f32, duration: f32) -> Box<dyn Animation> {
        Box::new(Timing::new(driver.clone(), to, duration, Easing::Linear))
    }

    #[test]
    fn driver_value_is_shared_between_clones() {
        let a = DriverValue::new(1.5);
        let b = a.clone();
        b.set(3.0);
        assert_eq!(a.get(), 3.0);
        assert!(a.same_as(&b));
        assert!(!a.same_as(&DriverValue::new(3.0)));
    }

    #[test]
    fn timing_interpolates_and_lands_exactly() {
        let d = DriverValue::new(0.0);
        let mut t = Timing::new(d.clone(), 2.0, 100.0, Easing::Linear);
        assert_eq!(t.update(10.0), Tick::Idle);
        t.start();
        assert_eq!(t.update(50.0), Tick::Running);
        approx(d.get(), 1.0, 1e-6);
        assert_eq!(t.update(70.0), Tick::Finished { leftover: 20.0 });
        assert_eq!(d.get(), 2.0);
    }

    #[test]
    fn timing_starts_from_current_driver_value() {
        let d = DriverValue::new(1.0);
        let mut t = Timing::new(d.clone(), 2.0, 100.0, Easing::Linear);
        t.start();
        t.update(50.0);
        approx(d.get(), 1.5, 1e-6);
    }

    #[test]
    fn zero_duration_finishes_on_first_update() {
        let d = DriverValue::new(0.0);
        let mut t = Timing::new(d.clone(), 1.0, 0.0, Easing::Linear);
        t.start();
        assert_eq!(t.update(16.0), Tick::Finished { leftover: 16.0 });
        assert_eq!(d.get(), 1.0);
    }

    #[test]
    fn parallel_waits_for_slowest_child() {
        let a = DriverValue::new(0.0);
        let b = DriverValue::new(0.0);
        let mut par = Parallel::new(vec![timing(&a, 1.0, 100.0), timing(&b, 1.0, 300.0)]);
        par.start();
        assert_eq!(par.update(150.0), Tick::Running);
        assert_eq!(a.get(), 1.0);
        approx(b.get(), 0.5, 1e-6);
        assert_eq!(par.update(200.0), Tick::Finished { leftover: 50.0 });
        assert_eq!(b.get(), 1.0);
    }

    #[test]
    fn sequence_never_overlaps_and_carries_leftover() {
        let d = DriverValue::new(0.0);
        let mut seq = Sequence::new(vec![timing(&d, 1.0, 100.0), timing(&d, 2.0, 100.0)]);
        seq.start();
        assert_eq!(seq.update(150.0), Tick::Running);
        assert_eq!(seq.cursor(), 1);
        // Second unit started from 1.0 and consumed 50ms of the first tick.
        approx(d.get(), 1.5, 1e-6);
        assert_eq!(seq.update(60.0), Tick::Finished { leftover: 10.0 });
        assert_eq!(d.get(), 2.0);
        assert!(seq.is_complete());
    }

    #[test]
    fn empty_sequence_finishes_immediately() {
        let mut seq = Sequence::new(Vec::new());
        seq.start();
        assert_eq!(seq.update(5.0), Tick::Finished { leftover: 5.0 });
    }

    #[test]
    fn stop_then_start_resumes_in_place() {
        let d = DriverValue::new(0.0);
        let mut seq = Sequence::new(vec![timing(&d, 1.0, 100.0)]);
        seq.start();
        seq.update(40.0);
        seq.stop();
        assert_eq!(seq.update(40.0), Tick::Idle);
        approx(d.get(), 0.4, 1e-6);
        seq.start();
        seq.update(30.0);
        approx(d.get(), 0.7, 1e-6);
    }

    #[test]
    fn reset_rewinds_cursor_and_children() {
        let d = DriverValue::new(0.0);
        let mut seq = Sequence::new(vec![timing(&d, 1.0, 10.0), timing(&d, 2.0, 10.0)]);
        seq.start();
        seq.update(100.0);
        assert!(seq.is_complete());
        seq.reset();
        d.set(0.0);
        assert_eq!(seq.cursor(), 0);
        seq.start();
        seq.update(5.0);
        approx(d.get(), 0.5, 1e-6);
    }
}
