//! Effect chain construction
//!
//! Passes are emitted in a fixed order: bloom, then grading. The chain is
//! never reordered afterwards; results are visually order-dependent.

use serde::{Deserialize, Serialize};

use crate::effect::{BloomParams, EffectDescriptor, EffectKind, GradingParams};
use crate::lut::{LutError, LutResolver};

/// Lookup table the scene ships with
pub const DEFAULT_LUT_SOURCE: &str = "/lut/F-6800-STD.cube";

/// Recognized pipeline options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Bloom parameters
    pub bloom: BloomParams,

    /// Grading lookup table; `None` disables grading
    pub lut_source: Option<String>,

    /// Whether the composer renders a normal buffer (no effect here needs one)
    pub normal_pass: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            bloom: BloomParams::default(),
            lut_source: Some(DEFAULT_LUT_SOURCE.to_string()),
            normal_pass: false,
        }
    }
}

impl PipelineOptions {
    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Options without grading
    pub fn bloom_only(bloom: BloomParams) -> Self {
        Self {
            bloom,
            lut_source: None,
            ..Default::default()
        }
    }
}

/// Ordered post-processing chain handed to the renderer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EffectChainConfig {
    normal_pass: bool,
    effects: Vec<EffectDescriptor>,
    #[serde(skip)]
    fallback: Option<LutError>,
}

impl EffectChainConfig {
    /// Passes in composite order
    pub fn effects(&self) -> &[EffectDescriptor] {
        &self.effects
    }

    /// Iterate passes in composite order
    pub fn iter(&self) -> impl Iterator<Item = &EffectDescriptor> {
        self.effects.iter()
    }

    /// Pass kinds in composite order
    pub fn kinds(&self) -> Vec<EffectKind> {
        self.effects.iter().map(EffectDescriptor::kind).collect()
    }

    /// Position of a pass kind in the chain
    pub fn position(&self, kind: EffectKind) -> Option<usize> {
        self.effects.iter().position(|effect| effect.kind() == kind)
    }

    /// Check whether a pass kind is present
    pub fn contains(&self, kind: EffectKind) -> bool {
        self.position(kind).is_some()
    }

    /// Number of passes
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if the chain has no passes
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Whether the composer should render a normal buffer
    pub fn normal_pass(&self) -> bool {
        self.normal_pass
    }

    /// Grading was requested but dropped
    pub fn is_degraded(&self) -> bool {
        self.fallback.is_some()
    }

    /// Why grading was dropped, if it was
    pub fn fallback_reason(&self) -> Option<&LutError> {
        self.fallback.as_ref()
    }

    /// Serialize for the renderer
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Builds [`EffectChainConfig`]s, resolving lookup tables through `R`
#[derive(Clone, Debug)]
pub struct RenderPipelineConfig<R: LutResolver> {
    resolver: R,
}

impl<R: LutResolver> RenderPipelineConfig<R> {
    /// Create a builder using `resolver` for grading tables
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// The lookup table resolver
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Build the chain. An unresolvable lookup table drops the grading pass
    /// and yields a bloom-only chain instead of failing.
    pub fn build(&self, options: &PipelineOptions) -> EffectChainConfig {
        let mut effects = vec![EffectDescriptor::bloom(options.bloom.clone())];
        let mut fallback = None;

        if let Some(source) = options.lut_source.as_deref() {
            match self.resolver.resolve(source) {
                Ok(lut) => {
                    log::debug!("Resolved grading LUT {} (size {})", source, lut.size);
                    effects.push(EffectDescriptor::grading(GradingParams {
                        lut_source: source.to_string(),
                        lut_size: lut.size,
                    }));
                }
                Err(err) => {
                    log::warn!("Grading disabled, falling back to bloom only: {}", err);
                    fallback = Some(err);
                }
            }
        }

        log::info!(
            "Built effect chain: [{}]",
            effects.iter().map(|e| e.kind().to_string()).collect::<Vec<_>>().join(", ")
        );

        EffectChainConfig {
            normal_pass: options.normal_pass,
            effects,
            fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lut::{identity_cube, MemoryLutResolver};

    fn resolver() -> MemoryLutResolver {
        MemoryLutResolver::new().with_table(DEFAULT_LUT_SOURCE, identity_cube(4))
    }

    #[test]
    fn test_bloom_then_grading() {
        let chain = RenderPipelineConfig::new(resolver()).build(&PipelineOptions::default());

        assert_eq!(chain.kinds(), vec![EffectKind::Bloom, EffectKind::Grading]);
        assert!(!chain.is_degraded());
        assert!(!chain.normal_pass());

        let grading = chain.effects()[1].as_grading().unwrap();
        assert_eq!(grading.lut_source, DEFAULT_LUT_SOURCE);
        assert_eq!(grading.lut_size, 4);
    }

    #[test]
    fn test_missing_lut_falls_back_to_bloom() {
        let options = PipelineOptions {
            lut_source: Some("/lut/missing.cube".into()),
            ..Default::default()
        };
        let chain = RenderPipelineConfig::new(resolver()).build(&options);

        assert_eq!(chain.kinds(), vec![EffectKind::Bloom]);
        assert!(chain.is_degraded());
        assert_eq!(
            chain.fallback_reason(),
            Some(&LutError::NotFound("/lut/missing.cube".into()))
        );
    }

    #[test]
    fn test_malformed_lut_falls_back_to_bloom() {
        let resolver = MemoryLutResolver::new().with_table("/lut/bad.cube", "LUT_3D_SIZE 2\n0 0 0\n");
        let options = PipelineOptions {
            lut_source: Some("/lut/bad.cube".into()),
            ..Default::default()
        };
        let chain = RenderPipelineConfig::new(resolver).build(&options);
        assert!(!chain.contains(EffectKind::Grading));
        assert!(chain.is_degraded());
    }

    #[test]
    fn test_grading_disabled_is_not_degraded() {
        let chain = RenderPipelineConfig::new(resolver())
            .build(&PipelineOptions::bloom_only(BloomParams::default()));
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_degraded());
    }

    #[test]
    fn test_options_from_json() {
        let options = PipelineOptions::from_json(
            r#"{ "bloom": { "intensity": 0.5, "mip_levels": 12 }, "lut_source": null }"#,
        )
        .unwrap();

        assert_eq!(options.lut_source, None);
        let chain = RenderPipelineConfig::new(resolver()).build(&options);
        let bloom = chain.effects()[0].as_bloom().unwrap();
        assert_eq!(bloom.intensity, 0.5);
        assert_eq!(bloom.mip_levels, BloomParams::MAX_MIP_LEVELS);
    }

    #[test]
    fn test_chain_json_shape() {
        let chain = RenderPipelineConfig::new(resolver()).build(&PipelineOptions::default());
        let value: serde_json::Value = serde_json::from_str(&chain.to_json().unwrap()).unwrap();

        assert_eq!(value["effects"][0]["kind"], "bloom");
        assert_eq!(value["effects"][0]["parameters"]["mip_levels"], 9);
        assert_eq!(value["effects"][1]["kind"], "grading");
        assert_eq!(value["effects"][1]["parameters"]["lut_size"], 4);
    }
}
