//! Sprite-sheet timing, used to know which frame a state is showing.
//!
//! Playback belongs to the renderer. Bosses only need the frame index so
//! attack windows can be tied to specific frames.

use serde::Deserialize;

/// Layout and timing of one animation.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct AnimationDef {
    pub rows: usize,
    pub columns: usize,
    /// One entry per frame, or a single entry used for every frame.
    pub durations: Vec<f32>,
    pub looping: bool,
}

impl Default for AnimationDef {
    fn default() -> Self {
        Self::still()
    }
}

impl AnimationDef {
    /// Single frame that never changes.
    pub fn still() -> Self {
        Self::uniform(1, 1, 1.0, true)
    }

    pub fn uniform(rows: usize, columns: usize, duration: f32, looping: bool) -> Self {
        Self {
            rows,
            columns,
            durations: vec![duration],
            looping,
        }
    }

    pub fn timed(rows: usize, columns: usize, durations: Vec<f32>, looping: bool) -> Self {
        Self {
            rows,
            columns,
            durations,
            looping,
        }
    }

    pub fn frame_count(&self) -> usize {
        (self.rows * self.columns).max(1)
    }

    fn frame_duration(&self, frame: usize) -> f32 {
        self.durations
            .get(frame)
            .or(self.durations.last())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn total_duration(&self) -> f32 {
        (0..self.frame_count()).map(|frame| self.frame_duration(frame)).sum()
    }

    /// Frame shown `time` seconds after the animation started.
    pub fn frame_at(&self, time: f32) -> usize {
        let total = self.total_duration();
        let last = self.frame_count() - 1;
        if total <= 0.0 {
            return 0;
        }

        let mut time = time.max(0.0);
        if self.looping {
            time %= total;
        } else if time >= total {
            return last;
        }

        let mut end = 0.0;
        for frame in 0..=last {
            end += self.frame_duration(frame);
            if time < end {
                return frame;
            }
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_frames_advance_with_time() {
        let climb = AnimationDef::uniform(1, 5, 0.1, true);
        assert_eq!(climb.frame_at(0.0), 0);
        assert_eq!(climb.frame_at(0.25), 2);
        assert_eq!(climb.frame_at(0.55), 0);
    }

    #[test]
    fn per_frame_durations_are_honored() {
        let swing = AnimationDef::timed(2, 4, vec![0.1, 0.1, 0.1, 0.1, 0.1, 0.25, 0.1, 0.1], false);
        assert_eq!(swing.frame_at(0.25), 2);
        assert_eq!(swing.frame_at(0.6), 5);
        assert_eq!(swing.frame_at(0.8), 6);
        assert_eq!(swing.frame_at(10.0), 7);
    }

    #[test]
    fn still_animation_is_always_frame_zero() {
        assert_eq!(AnimationDef::still().frame_at(42.0), 0);
    }
}
