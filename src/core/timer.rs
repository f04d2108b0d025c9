//! Countdown timers with callbacks bound to elapsed-time marks.
//!
//! A [`Timer`] counts up from zero to its duration and stays there. Each
//! [`TimeMarkedRunnable`] attached to it runs when an `update` call moves
//! `elapsed` across the runnable's offset. Several marks crossed by one big
//! step all run, in ascending offset order.
//!
//! The callback context `C` is whatever the owner wants the callbacks to
//! mutate. Plain timers use `C = ()` and [`Timer::tick`].

use std::fmt;

/// Callback bound to a timer mark.
pub type Runnable<C> = Box<dyn FnMut(&mut C) + Send + Sync>;

/// A callback that fires when a timer crosses `offset`.
pub struct TimeMarkedRunnable<C = ()> {
    offset: f32,
    run: Runnable<C>,
    repeatable: bool,
    spent: bool,
}

impl<C> TimeMarkedRunnable<C> {
    /// Fires once per pass through the timer, again after every `reset`.
    pub fn new(offset: f32, run: impl FnMut(&mut C) + Send + Sync + 'static) -> Self {
        Self {
            offset: offset.max(0.0),
            run: Box::new(run),
            repeatable: true,
            spent: false,
        }
    }

    /// Fires on the first crossing only, until [`Timer::rearm`].
    pub fn once(offset: f32, run: impl FnMut(&mut C) + Send + Sync + 'static) -> Self {
        Self {
            repeatable: false,
            ..Self::new(offset, run)
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }
}

impl<C> fmt::Debug for TimeMarkedRunnable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeMarkedRunnable")
            .field("offset", &self.offset)
            .field("repeatable", &self.repeatable)
            .field("spent", &self.spent)
            .finish()
    }
}

/// Countdown timer. `elapsed` always stays within `[0, duration]`.
pub struct Timer<C = ()> {
    duration: f32,
    elapsed: f32,
    just_finished: bool,
    paused: bool,
    runnables: Vec<TimeMarkedRunnable<C>>,
}

impl<C> Timer<C> {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            just_finished: false,
            paused: false,
            runnables: Vec::new(),
        }
    }

    pub fn with_runnables(
        duration: f32,
        runnables: impl IntoIterator<Item = TimeMarkedRunnable<C>>,
    ) -> Self {
        let mut timer = Self::new(duration);
        for runnable in runnables {
            timer.add_runnable(runnable);
        }
        timer
    }

    /// Adds a mark, keeping marks sorted by offset. Equal offsets keep insertion order.
    pub fn add_runnable(&mut self, runnable: TimeMarkedRunnable<C>) -> &mut Self {
        let at = self
            .runnables
            .partition_point(|existing| existing.offset <= runnable.offset);
        self.runnables.insert(at, runnable);
        self
    }

    /// Advances the timer and runs every mark crossed by this step.
    ///
    /// A mark is crossed when its offset lies in `(previous, elapsed]`. The
    /// one exception is a mark at offset zero: no half-open interval can
    /// contain it, so it counts as crossed by the first step that moves the
    /// timer off zero. A zero-length step never fires it.
    pub fn update(&mut self, dt: f32, ctx: &mut C) {
        self.just_finished = false;
        if self.paused {
            return;
        }

        let was_finished = self.is_finished();
        let prev = self.elapsed;
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        let now = self.elapsed;

        for runnable in self.runnables.iter_mut() {
            if runnable.offset > now {
                break;
            }
            let crossed = runnable.offset > prev || (runnable.offset == 0.0 && prev == 0.0 && now > 0.0);
            if crossed && !runnable.spent {
                if !runnable.repeatable {
                    runnable.spent = true;
                }
                (runnable.run)(ctx);
            }
        }

        self.just_finished = !was_finished && self.is_finished();
    }

    /// Back to zero elapsed. Non-repeatable marks that already fired stay spent.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.just_finished = false;
    }

    /// Makes non-repeatable marks eligible to fire again.
    pub fn rearm(&mut self) {
        for runnable in self.runnables.iter_mut() {
            runnable.spent = false;
        }
    }

    /// Changes the duration and keeps `elapsed`, clamped to the new duration.
    pub fn reset_duration(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.elapsed = self.elapsed.min(self.duration);
    }

    /// Jumps to the end without running any mark.
    pub fn set_to_end(&mut self) {
        self.elapsed = self.duration;
        self.just_finished = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// True only for the update that moved the timer onto its end.
    pub fn is_just_finished(&self) -> bool {
        self.just_finished
    }

    pub fn is_at_beginning(&self) -> bool {
        self.elapsed == 0.0
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Elapsed fraction in `[0, 1]`. A zero-length timer reports 1.
    pub fn ratio(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }
}

impl Timer<()> {
    /// `update` for timers without a callback context.
    pub fn tick(&mut self, dt: f32) {
        self.update(dt, &mut ());
    }
}

impl<C> fmt::Debug for Timer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("just_finished", &self.just_finished)
            .field("paused", &self.paused)
            .field("runnables", &self.runnables)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(offsets: &[f32], duration: f32) -> Timer<Vec<f32>> {
        Timer::with_runnables(
            duration,
            offsets
                .iter()
                .map(|&o| TimeMarkedRunnable::new(o, move |log: &mut Vec<f32>| log.push(o))),
        )
    }

    #[test]
    fn full_step_finishes_and_just_finished_clears() {
        let mut timer = Timer::new(1.0);
        timer.reset();
        timer.tick(1.0);
        assert!(timer.is_finished());
        assert!(timer.is_just_finished());

        timer.tick(0.0);
        assert!(timer.is_finished());
        assert!(!timer.is_just_finished());
    }

    #[test]
    fn elapsed_is_clamped() {
        let mut timer = Timer::new(0.5);
        timer.tick(3.0);
        assert_eq!(timer.elapsed(), 0.5);
        timer.tick(-1.0);
        assert_eq!(timer.elapsed(), 0.5);
    }

    #[test]
    fn ten_small_steps_finish_exactly_on_the_tenth() {
        let mut timer = Timer::new(1.0);
        for _ in 0..9 {
            timer.tick(0.1);
            assert!(!timer.is_finished());
        }
        timer.tick(0.1);
        assert!(timer.is_just_finished());
        assert_eq!(timer.elapsed(), 1.0);
    }

    #[test]
    fn large_step_fires_every_crossed_mark_in_order() {
        let mut timer = recorder(&[1.55, 0.35, 0.95], 2.0);
        let mut log = Vec::new();

        timer.update(0.2, &mut log);
        assert!(log.is_empty());

        timer.update(1.5, &mut log);
        assert_eq!(log, vec![0.35, 0.95, 1.55]);

        timer.update(5.0, &mut log);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn mark_fires_once_per_pass_and_again_after_reset() {
        let mut timer = recorder(&[0.35], 1.0);
        let mut log = Vec::new();

        for _ in 0..20 {
            timer.update(0.1, &mut log);
        }
        assert_eq!(log.len(), 1);

        timer.reset();
        timer.update(1.0, &mut log);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn set_to_end_skips_marks() {
        let mut timer = recorder(&[0.25, 0.5], 0.5);
        let mut log = Vec::new();

        timer.set_to_end();
        timer.update(0.1, &mut log);
        assert!(log.is_empty());
        assert!(timer.is_finished());
        assert!(!timer.is_just_finished());
    }

    #[test]
    fn once_marks_stay_spent_until_rearmed() {
        let mut timer: Timer<u32> =
            Timer::with_runnables(1.0, [TimeMarkedRunnable::once(0.5, |n: &mut u32| *n += 1)]);
        let mut fired = 0;

        timer.update(1.0, &mut fired);
        timer.reset();
        timer.update(1.0, &mut fired);
        assert_eq!(fired, 1);

        timer.rearm();
        timer.reset();
        timer.update(1.0, &mut fired);
        assert_eq!(fired, 2);
    }

    #[test]
    fn zero_offset_fires_on_first_update_only() {
        let mut timer = recorder(&[0.0], 1.0);
        let mut log = Vec::new();

        timer.update(0.0, &mut log);
        assert!(log.is_empty());
        timer.update(0.1, &mut log);
        timer.update(0.1, &mut log);
        assert_eq!(log, vec![0.0]);
    }

    #[test]
    fn reset_duration_keeps_elapsed() {
        let mut timer = Timer::new(2.0);
        timer.tick(0.5);
        timer.reset_duration(1.0);
        assert_eq!(timer.elapsed(), 0.5);

        timer.reset_duration(0.25);
        assert!(timer.is_finished());
    }

    #[test]
    fn paused_timer_does_not_advance() {
        let mut timer = Timer::new(1.0);
        timer.pause();
        timer.tick(1.0);
        assert!(timer.is_at_beginning());
        timer.resume();
        timer.tick(1.0);
        assert!(timer.is_just_finished());
    }
}
