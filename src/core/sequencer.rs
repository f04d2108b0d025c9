//! Wrapping cursor over a fixed list of phases.

use super::error::ConfigError;

/// A strict rotation through `phases`. Advancing always succeeds.
#[derive(Debug, Clone)]
pub struct Loop<T> {
    phases: Vec<T>,
    cursor: usize,
}

impl<T> Loop<T> {
    pub fn new(phases: impl IntoIterator<Item = T>) -> Result<Self, ConfigError> {
        let phases: Vec<T> = phases.into_iter().collect();
        if phases.is_empty() {
            return Err(ConfigError::EmptySequence);
        }
        Ok(Self { phases, cursor: 0 })
    }

    pub fn current(&self) -> &T {
        &self.phases[self.cursor]
    }

    /// Advances to the following phase, wrapping to the first.
    pub fn next(&mut self) -> &T {
        self.cursor = (self.cursor + 1) % self.phases.len();
        &self.phases[self.cursor]
    }

    /// The phase `next` would move to.
    pub fn peek(&self) -> &T {
        &self.phases[(self.cursor + 1) % self.phases.len()]
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn index(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn phases(&self) -> &[T] {
        &self.phases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_returns_to_start() {
        let mut phases = Loop::new(["spawn", "climb", "open", "close", "retreat"]).unwrap();
        let start = *phases.current();
        for _ in 0..phases.len() {
            phases.next();
        }
        assert_eq!(*phases.current(), start);
    }

    #[test]
    fn reset_returns_to_first_phase() {
        let mut phases = Loop::new([1, 2, 3]).unwrap();
        phases.next();
        phases.next();
        assert_eq!(*phases.peek(), 1);
        phases.reset();
        assert_eq!(phases.index(), 0);
        assert_eq!(*phases.current(), 1);
    }

    #[test]
    fn single_phase_loops_onto_itself() {
        let mut phases = Loop::new(['a']).unwrap();
        assert_eq!(*phases.next(), 'a');
    }

    #[test]
    fn empty_loop_is_rejected() {
        assert_eq!(Loop::<u8>::new([]).unwrap_err(), ConfigError::EmptySequence);
    }
}
