//! Colour lookup tables
//!
//! Grading reads an Adobe/Resolve `.cube` 3D table. Resolution goes through
//! the [`LutResolver`] trait so the pipeline can fall back to bloom-only when
//! a table is missing or malformed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Lookup table resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LutError {
    /// No table at the given source
    #[error("LUT not found: {0}")]
    NotFound(String),

    /// Reading the table failed
    #[error("Failed to read LUT {path}: {message}")]
    Io { path: String, message: String },

    /// Malformed table
    #[error("Invalid LUT at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Format or table type not supported
    #[error("Unsupported LUT: {0}")]
    Unsupported(String),
}

/// Parsed 3D lookup table
#[derive(Clone, Debug, PartialEq)]
pub struct CubeLut {
    /// Optional `TITLE`
    pub title: Option<String>,
    /// Edge length; the table holds `size^3` entries
    pub size: u32,
    /// Input domain lower bound
    pub domain_min: [f32; 3],
    /// Input domain upper bound
    pub domain_max: [f32; 3],
    /// RGB entries, red varying fastest
    pub data: Vec<[f32; 3]>,
}

impl CubeLut {
    pub const MIN_SIZE: u32 = 2;
    pub const MAX_SIZE: u32 = 256;

    /// Number of entries the header promises
    pub fn expected_len(&self) -> usize {
        (self.size as usize).pow(3)
    }
}

/// Keywords that are accepted and ignored
const IGNORED_KEYWORDS: &[&str] = &[
    "LUT_1D_INPUT_RANGE",
    "LUT_3D_INPUT_RANGE",
    "LUT_IN_VIDEO_RANGE",
    "LUT_OUT_VIDEO_RANGE",
];

fn parse_triplet(parts: &[&str], line: usize) -> Result<[f32; 3], LutError> {
    if parts.len() != 3 {
        return Err(LutError::Parse {
            line,
            message: format!("expected 3 values, found {}", parts.len()),
        });
    }

    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse::<f32>().map_err(|e| LutError::Parse {
            line,
            message: format!("invalid number '{}': {}", part, e),
        })?;
        if !slot.is_finite() {
            return Err(LutError::Parse {
                line,
                message: format!("non-finite value '{}'", part),
            });
        }
    }
    Ok(out)
}

/// Parse the text of a `.cube` file
pub fn parse_cube(text: &str) -> Result<CubeLut, LutError> {
    let mut lut = CubeLut {
        title: None,
        size: 0,
        domain_min: [0.0; 3],
        domain_max: [1.0; 3],
        data: Vec::new(),
    };

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        match parts[0] {
            "TITLE" => {
                let title = trimmed["TITLE".len()..].trim().trim_matches('"');
                lut.title = Some(title.to_string());
            }
            "LUT_3D_SIZE" => {
                let size = parts
                    .get(1)
                    .and_then(|s| s.parse::<u32>().ok())
                    .ok_or_else(|| LutError::Parse {
                        line,
                        message: "LUT_3D_SIZE needs an integer".into(),
                    })?;
                if !(CubeLut::MIN_SIZE..=CubeLut::MAX_SIZE).contains(&size) {
                    return Err(LutError::Unsupported(format!("3D size {} out of range", size)));
                }
                lut.size = size;
                lut.data.reserve((size as usize).pow(3));
            }
            "LUT_1D_SIZE" => {
                return Err(LutError::Unsupported("1D tables are not supported".into()));
            }
            "DOMAIN_MIN" => lut.domain_min = parse_triplet(&parts[1..], line)?,
            "DOMAIN_MAX" => lut.domain_max = parse_triplet(&parts[1..], line)?,
            keyword if IGNORED_KEYWORDS.contains(&keyword) => {
                log::debug!("Skipping LUT keyword '{}' at line {}", keyword, line);
            }
            _ => {
                if lut.size == 0 {
                    return Err(LutError::Parse {
                        line,
                        message: "table data before LUT_3D_SIZE".into(),
                    });
                }
                lut.data.push(parse_triplet(&parts, line)?);
            }
        }
    }

    if lut.size == 0 {
        return Err(LutError::Parse {
            line: text.lines().count(),
            message: "missing LUT_3D_SIZE".into(),
        });
    }

    if lut.data.len() != lut.expected_len() {
        return Err(LutError::Parse {
            line: text.lines().count(),
            message: format!("expected {} entries, found {}", lut.expected_len(), lut.data.len()),
        });
    }

    Ok(lut)
}

fn check_extension(source: &str) -> Result<(), LutError> {
    let path = source.split(['?', '#']).next().unwrap_or(source);
    if path.to_ascii_lowercase().ends_with(".cube") {
        Ok(())
    } else {
        Err(LutError::Unsupported(format!("not a .cube table: {}", source)))
    }
}

/// Turns a LUT source string into a parsed table
pub trait LutResolver {
    /// Resolve and parse `source`
    fn resolve(&self, source: &str) -> Result<CubeLut, LutError>;
}

/// Resolves sources against a directory on disk.
///
/// Site-absolute sources (`/lut/x.cube`) are looked up under the root, the
/// way static assets are served from a public directory.
#[derive(Clone, Debug)]
pub struct FileLutResolver {
    root: PathBuf,
}

impl FileLutResolver {
    /// Create a resolver rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for a source
    pub fn path_for(&self, source: &str) -> PathBuf {
        self.root.join(source.trim_start_matches('/'))
    }
}

impl LutResolver for FileLutResolver {
    fn resolve(&self, source: &str) -> Result<CubeLut, LutError> {
        check_extension(source)?;

        let path = self.path_for(source);
        let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LutError::NotFound(source.to_string()),
            _ => LutError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })?;

        parse_cube(&text)
    }
}

/// Resolves sources from tables registered in memory
#[derive(Clone, Debug, Default)]
pub struct MemoryLutResolver {
    tables: HashMap<String, String>,
}

impl MemoryLutResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `.cube` text under `source`
    pub fn insert(&mut self, source: impl Into<String>, cube_text: impl Into<String>) {
        self.tables.insert(source.into(), cube_text.into());
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_table(mut self, source: impl Into<String>, cube_text: impl Into<String>) -> Self {
        self.insert(source, cube_text);
        self
    }
}

impl LutResolver for MemoryLutResolver {
    fn resolve(&self, source: &str) -> Result<CubeLut, LutError> {
        check_extension(source)?;
        let text = self
            .tables
            .get(source)
            .ok_or_else(|| LutError::NotFound(source.to_string()))?;
        parse_cube(text)
    }
}

/// Identity table text of edge length `size`, handy for tests and defaults
pub fn identity_cube(size: u32) -> String {
    let size = size.clamp(CubeLut::MIN_SIZE, CubeLut::MAX_SIZE);
    let max = (size - 1) as f32;
    let mut out = format!("TITLE \"identity\"\nLUT_3D_SIZE {}\n", size);
    for b in 0..size {
        for g in 0..size {
            for r in 0..size {
                out.push_str(&format!(
                    "{:.6} {:.6} {:.6}\n",
                    r as f32 / max,
                    g as f32 / max,
                    b as f32 / max
                ));
            }
        }
    }
    out
}
