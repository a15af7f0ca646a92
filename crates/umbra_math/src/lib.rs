//! # umbra_math - Scene Math
//!
//! Stateless numeric helpers pulled by the render loop every frame:
//! a small 3D vector type, Snell's-law refraction and the exponential
//! "move a fraction of the way each frame" interpolation used to animate
//! material properties.

pub mod vector;
pub mod optics;

pub use vector::*;
pub use optics::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const FRAC_PI_2: f32 = PI / 2.0;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
    pub const EPSILON: f32 = 1e-6;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

/// Convert radians to degrees
#[inline]
pub fn degrees(radians: f32) -> f32 {
    radians * consts::RAD_TO_DEG
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub mod prelude {
    pub use crate::vector::Vec3;
    pub use crate::optics::{
        lerp_property, lerp_scalar, lerp_vec3, refraction_angle, try_refraction_angle,
        AnimationGoal, AIR_IOR, DEFAULT_LERP_SPEED, GLASS_IOR,
    };
    pub use crate::{radians, degrees, lerp};
}
