//! Effect descriptors
//!
//! One descriptor per post-processing pass. Parameters are validated on
//! construction so a chain never carries out-of-range values.

use serde::{Deserialize, Serialize};

/// Post-processing pass kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// HDR bloom
    Bloom,
    /// Colour grading through a 3D lookup table
    Grading,
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bloom => write!(f, "bloom"),
            Self::Grading => write!(f, "grading"),
        }
    }
}

/// Bloom parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomParams {
    /// Bloom intensity (>= 0)
    pub intensity: f32,

    /// Luminance above which pixels bloom (>= 0)
    pub luminance_threshold: f32,

    /// Softness of the threshold (0.0 - 1.0)
    pub luminance_smoothing: f32,

    /// Mip levels used by the blur chain (1 - 9)
    pub mip_levels: u32,

    /// Blur through the mip chain instead of a kernel
    pub mipmap_blur: bool,
}

impl BloomParams {
    pub const MIN_MIP_LEVELS: u32 = 1;
    pub const MAX_MIP_LEVELS: u32 = 9;

    /// Clamp every field into its valid range. Non-finite floats fall back
    /// to the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        Self {
            intensity: finite_or(self.intensity, defaults.intensity).max(0.0),
            luminance_threshold: finite_or(self.luminance_threshold, defaults.luminance_threshold)
                .max(0.0),
            luminance_smoothing: finite_or(self.luminance_smoothing, defaults.luminance_smoothing)
                .clamp(0.0, 1.0),
            mip_levels: self.mip_levels.clamp(Self::MIN_MIP_LEVELS, Self::MAX_MIP_LEVELS),
            mipmap_blur: self.mipmap_blur,
        }
    }
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            intensity: 1.5,
            luminance_threshold: 1.0,
            luminance_smoothing: 1.0,
            mip_levels: 9,
            mipmap_blur: true,
        }
    }
}

/// Grading parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingParams {
    /// Lookup table source (a `.cube` path or URL)
    pub lut_source: String,

    /// Edge length of the resolved table
    pub lut_size: u32,
}

/// Parameters of one pass
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EffectParameters {
    Bloom(BloomParams),
    Grading(GradingParams),
}

/// One pass of the effect chain.
///
/// Serializes as `{ "kind": ..., "parameters": { ... } }` for the renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EffectDescriptor {
    kind: EffectKind,
    parameters: EffectParameters,
}

impl EffectDescriptor {
    /// Bloom pass with sanitized parameters
    pub fn bloom(params: BloomParams) -> Self {
        Self {
            kind: EffectKind::Bloom,
            parameters: EffectParameters::Bloom(params.sanitized()),
        }
    }

    /// Grading pass for a resolved lookup table
    pub fn grading(params: GradingParams) -> Self {
        Self {
            kind: EffectKind::Grading,
            parameters: EffectParameters::Grading(params),
        }
    }

    /// Pass kind
    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Pass parameters
    pub fn parameters(&self) -> &EffectParameters {
        &self.parameters
    }

    /// Bloom parameters, if this is a bloom pass
    pub fn as_bloom(&self) -> Option<&BloomParams> {
        match &self.parameters {
            EffectParameters::Bloom(params) => Some(params),
            _ => None,
        }
    }

    /// Grading parameters, if this is a grading pass
    pub fn as_grading(&self) -> Option<&GradingParams> {
        match &self.parameters {
            EffectParameters::Grading(params) => Some(params),
            _ => None,
        }
    }
}
