//! # umbra_render - Post-Processing Configuration
//!
//! Declarative description of the per-frame effect chain applied to the
//! rendered scene. The renderer reads it once at pipeline setup.
//!
//! ## Example
//!
//! ```ignore
//! use umbra_render::prelude::*;
//!
//! let pipeline = RenderPipelineConfig::new(FileLutResolver::new("public"));
//! let chain = pipeline.build(&PipelineOptions::default());
//!
//! for effect in chain.iter() {
//!     // bloom first, grading last
//! }
//! ```

pub mod effect;
pub mod lut;
pub mod pipeline;

pub use effect::{BloomParams, EffectDescriptor, EffectKind, EffectParameters, GradingParams};
pub use lut::{identity_cube, parse_cube, CubeLut, FileLutResolver, LutError, LutResolver, MemoryLutResolver};
pub use pipeline::{EffectChainConfig, PipelineOptions, RenderPipelineConfig};

/// Prelude
pub mod prelude {
    pub use crate::effect::{BloomParams, EffectDescriptor, EffectKind, GradingParams};
    pub use crate::lut::{FileLutResolver, LutError, LutResolver, MemoryLutResolver};
    pub use crate::pipeline::{EffectChainConfig, PipelineOptions, RenderPipelineConfig};
}
