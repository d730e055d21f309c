//! Declarative enter transitions.
//!
//! A [`Transition`] describes a hidden-to-visible animation once, as data,
//! instead of scattering start/end values and timings through the code that
//! uses them. Sampling is a pure function of elapsed time and the item's
//! position in a staggered group.
//!
//! ```ignore
//! let intro = Transition::fade_rise(0.5)
//!     .with_delay(0.2)
//!     .with_stagger(0.2);
//!
//! // Third item in the group, 1.1 s after mount:
//! let frame = intro.sample(1.1, 2);
//! ```

/// Interpolated visual state of an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// 0 = invisible, 1 = fully opaque.
    pub opacity: f32,
    /// Vertical offset in world units, subtracted from the item's position.
    pub rise: f32,
}

impl Keyframe {
    /// Fully visible, resting in place.
    pub const VISIBLE: Self = Self { opacity: 1.0, rise: 0.0 };

    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            opacity: self.opacity + (other.opacity - self.opacity) * t,
            rise: self.rise + (other.rise - self.rise) * t,
        }
    }
}

/// Easing curve applied to normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Starts slow (quadratic).
    EaseIn,
    /// Ends slow (quadratic).
    #[default]
    EaseOut,
    /// Slow at both ends (cubic smoothstep).
    EaseInOut,
}

impl Easing {
    /// Map progress in [0, 1] to eased progress in [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// A staggered enter animation from `initial` to `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// State before the transition starts.
    pub initial: Keyframe,
    /// State once it completes.
    pub target: Keyframe,
    /// Seconds from start to finish for a single item.
    pub duration: f32,
    /// Seconds before the first item starts.
    pub delay: f32,
    /// Extra seconds added per item index.
    pub stagger: f32,
    /// Progress curve.
    pub easing: Easing,
}

impl Transition {
    /// Fade in from transparent while rising `rise` units into place.
    pub fn fade_rise(rise: f32) -> Self {
        Self {
            initial: Keyframe { opacity: 0.0, rise },
            target: Keyframe::VISIBLE,
            duration: 0.8,
            delay: 0.0,
            stagger: 0.0,
            easing: Easing::EaseOut,
        }
    }

    /// The hero-banner intro: fade and rise over 0.8 s, 0.2 s apart.
    pub fn hero() -> Self {
        Self::fade_rise(0.5).with_delay(0.2).with_stagger(0.2)
    }

    /// Set the duration of each item's animation.
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration.max(0.0);
        self
    }

    /// Set the delay before the first item.
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    /// Set the per-item stagger.
    pub fn with_stagger(mut self, stagger: f32) -> Self {
        self.stagger = stagger.max(0.0);
        self
    }

    /// Set the easing curve.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Time at which item `index` reaches its target.
    pub fn end_time(&self, index: usize) -> f32 {
        self.delay + self.stagger * index as f32 + self.duration
    }

    /// State of item `index` at elapsed time `t`.
    pub fn sample(&self, t: f32, index: usize) -> Keyframe {
        let start = self.delay + self.stagger * index as f32;
        let progress = if self.duration <= 0.0 {
            if t >= start { 1.0 } else { 0.0 }
        } else {
            (t - start) / self.duration
        };
        self.initial.lerp(self.target, self.easing.apply(progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(-3.0), 0.0);
            assert_eq!(easing.apply(7.0), 1.0);
        }
    }

    #[test]
    fn test_ease_out_leads_linear() {
        assert!(Easing::EaseOut.apply(0.5) > Easing::Linear.apply(0.5));
        assert!(Easing::EaseIn.apply(0.5) < Easing::Linear.apply(0.5));
    }

    #[test]
    fn test_sample_before_and_after() {
        let t = Transition::hero();
        assert_eq!(t.sample(0.0, 0), t.initial);
        assert_eq!(t.sample(t.end_time(0), 0), Keyframe::VISIBLE);
        assert_eq!(t.sample(100.0, 3), Keyframe::VISIBLE);
    }

    #[test]
    fn test_stagger_delays_later_items() {
        let t = Transition::hero();
        let first = t.sample(0.6, 0);
        let third = t.sample(0.6, 2);
        assert!(first.opacity > third.opacity);
        assert_eq!(third.opacity, 0.0);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let t = Transition::fade_rise(1.0).with_duration(0.0).with_delay(1.0);
        assert_eq!(t.sample(0.5, 0).opacity, 0.0);
        assert_eq!(t.sample(1.0, 0).opacity, 1.0);
    }

    #[test]
    fn test_sample_is_pure() {
        let t = Transition::hero();
        assert_eq!(t.sample(0.9, 1), t.sample(0.9, 1));
    }
}
