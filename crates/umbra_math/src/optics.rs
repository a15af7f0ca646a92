//! Optics and per-frame easing
//!
//! Refraction through the prism drives the beam and rainbow materials, and
//! every animated property eases toward its goal with a fixed fraction per
//! frame. That fraction makes convergence exponential and frame-rate
//! dependent: at 120 Hz a property settles twice as fast as at 60 Hz.

use crate::vector::Vec3;

/// Index of refraction used for the prism glass
pub const GLASS_IOR: f32 = 2.5;

/// Index of refraction of air at standard conditions
pub const AIR_IOR: f32 = 1.000293;

/// Fraction of the remaining distance covered per frame by default
pub const DEFAULT_LERP_SPEED: f32 = 0.1;

/// Refraction angle (radians) of a ray entering glass from air.
///
/// Computes `asin(air_ior * sin(incident) / glass_ior)`. Returns `0.0` when
/// the ratio leaves `[-1, 1]` or is NaN, so `0.0` also means "no refraction
/// computed". Use [`try_refraction_angle`] to tell the two apart.
#[inline]
pub fn refraction_angle(incident: f32, glass_ior: f32, air_ior: f32) -> f32 {
    try_refraction_angle(incident, glass_ior, air_ior).unwrap_or(0.0)
}

/// Like [`refraction_angle`] but returns `None` outside the `asin` domain
/// (total internal reflection, zero or non-finite indices).
pub fn try_refraction_angle(incident: f32, glass_ior: f32, air_ior: f32) -> Option<f32> {
    let ratio = (air_ior * incident.sin()) / glass_ior;
    if (-1.0..=1.0).contains(&ratio) {
        Some(ratio.asin())
    } else {
        None
    }
}

/// Move `current` toward `target` by `speed` of the remaining distance.
///
/// For `speed` in `(0, 1]` repeated calls approach `target` monotonically and
/// never overshoot.
#[inline]
pub fn lerp_scalar(current: f32, target: f32, speed: f32) -> f32 {
    current + (target - current) * speed
}

/// In-place form of [`lerp_scalar`] for a single animated property
#[inline]
pub fn lerp_property(property: &mut f32, goal: f32, speed: f32) {
    *property = lerp_scalar(*property, goal, speed);
}

/// Component-wise [`lerp_scalar`]; mutates `current` and returns it
#[inline]
pub fn lerp_vec3(current: &mut Vec3, target: impl Into<Vec3>, speed: f32) -> &mut Vec3 {
    let target = target.into();
    current.x = lerp_scalar(current.x, target.x, speed);
    current.y = lerp_scalar(current.y, target.y, speed);
    current.z = lerp_scalar(current.z, target.z, speed);
    current
}

/// Values an [`AnimationGoal`] can ease
pub trait Interpolate: Copy {
    /// One easing step toward `target`
    fn interpolate(self, target: Self, speed: f32) -> Self;

    /// Distance used to decide when a goal is reached
    fn distance_to(self, other: Self) -> f32;
}

impl Interpolate for f32 {
    #[inline]
    fn interpolate(self, target: Self, speed: f32) -> Self {
        lerp_scalar(self, target, speed)
    }

    #[inline]
    fn distance_to(self, other: Self) -> f32 {
        (other - self).abs()
    }
}

impl Interpolate for Vec3 {
    #[inline]
    fn interpolate(mut self, target: Self, speed: f32) -> Self {
        *lerp_vec3(&mut self, target, speed)
    }

    #[inline]
    fn distance_to(self, other: Self) -> f32 {
        self.distance(other)
    }
}

/// A property easing toward a target, stepped once per frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationGoal<T: Interpolate> {
    /// Value shown this frame
    pub current: T,
    /// Value being approached
    pub target: T,
    speed: f32,
}

impl<T: Interpolate> AnimationGoal<T> {
    /// Create a goal. `speed` is clamped into `(0, 1]`; non-finite input
    /// falls back to [`DEFAULT_LERP_SPEED`].
    pub fn new(current: T, target: T, speed: f32) -> Self {
        let speed = if speed.is_finite() && speed > 0.0 {
            speed.min(1.0)
        } else {
            DEFAULT_LERP_SPEED
        };
        Self { current, target, speed }
    }

    /// Create with [`DEFAULT_LERP_SPEED`]
    pub fn with_default_speed(current: T, target: T) -> Self {
        Self::new(current, target, DEFAULT_LERP_SPEED)
    }

    /// Per-frame fraction
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Advance one frame and return the new value
    pub fn step(&mut self) -> T {
        self.current = self.current.interpolate(self.target, self.speed);
        self.current
    }

    /// Change the target without resetting the current value
    pub fn retarget(&mut self, target: T) {
        self.target = target;
    }

    /// Check whether the current value is within `epsilon` of the target
    pub fn is_settled(&self, epsilon: f32) -> bool {
        self.current.distance_to(self.target) <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_refraction_at_normal_incidence() {
        assert_eq!(refraction_angle(0.0, 2.5, 1.000293), 0.0);
    }

    #[test]
    fn test_refraction_matches_snell() {
        let incident = 0.6_f32;
        let theta = refraction_angle(incident, GLASS_IOR, AIR_IOR);
        assert_relative_eq!(GLASS_IOR * theta.sin(), AIR_IOR * incident.sin(), epsilon = 1e-5);
        assert!(theta > 0.0 && theta < incident);
    }

    #[test]
    fn test_refraction_domain_fallback() {
        // air_ior * sin(incident) > glass_ior
        assert_eq!(refraction_angle(1.2, 0.5, 1.0), 0.0);
        assert_eq!(try_refraction_angle(1.2, 0.5, 1.0), None);
        assert_eq!(refraction_angle(0.3, 0.0, 1.0), 0.0);
        assert_eq!(refraction_angle(f32::NAN, GLASS_IOR, AIR_IOR), 0.0);
    }

    #[test]
    fn test_refraction_negative_angle() {
        let theta = refraction_angle(-0.6, GLASS_IOR, AIR_IOR);
        assert_relative_eq!(theta, -refraction_angle(0.6, GLASS_IOR, AIR_IOR));
    }

    #[test]
    fn test_lerp_scalar_single_step() {
        assert_eq!(lerp_scalar(0.0, 10.0, 0.1), 1.0);
    }

    #[test]
    fn test_lerp_scalar_converges_without_overshoot() {
        let mut value = 0.0;
        let mut previous = value;
        for _ in 0..10 {
            previous = value;
            value = lerp_scalar(value, 10.0, 0.1);
        }
        assert!(value < 10.0);
        assert!(value > previous);
    }

    #[test]
    fn test_lerp_scalar_full_speed_snaps() {
        assert_eq!(lerp_scalar(3.0, 7.0, 1.0), 7.0);
    }

    #[test]
    fn test_lerp_property_in_place() {
        let mut opacity = 0.0;
        lerp_property(&mut opacity, 1.0, 0.5);
        assert_eq!(opacity, 0.5);
    }

    #[test]
    fn test_lerp_vec3_mutates_and_returns() {
        let mut v = Vec3::ZERO;
        let returned = *lerp_vec3(&mut v, [10.0, -10.0, 0.0], 0.1);
        assert_eq!(v, Vec3::new(1.0, -1.0, 0.0));
        assert_eq!(returned, v);
    }

    #[test]
    fn test_animation_goal_settles() {
        let mut goal = AnimationGoal::with_default_speed(Vec3::ZERO, Vec3::ONE);
        for _ in 0..200 {
            goal.step();
        }
        assert!(goal.is_settled(1e-4));
    }

    #[test]
    fn test_animation_goal_speed_is_clamped() {
        assert_eq!(AnimationGoal::new(0.0_f32, 1.0, 4.0).speed(), 1.0);
        assert_eq!(AnimationGoal::new(0.0_f32, 1.0, 0.0).speed(), DEFAULT_LERP_SPEED);
        assert_eq!(AnimationGoal::new(0.0_f32, 1.0, f32::NAN).speed(), DEFAULT_LERP_SPEED);
    }

    #[test]
    fn test_animation_goal_retarget_keeps_current() {
        let mut goal = AnimationGoal::new(0.0_f32, 10.0, 0.5);
        goal.step();
        goal.retarget(0.0);
        assert_eq!(goal.current, 5.0);
        assert_eq!(goal.step(), 2.5);
    }
}
