//! Progress snapshots and load events

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Aggregate progress across every asset the loader has seen
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadProgress {
    /// Items finished (successfully or not)
    pub items_loaded: u32,
    /// Items discovered so far; may grow while loading
    pub items_total: u32,
    /// URL of the most recent loader callback
    pub current_url: String,
}

impl LoadProgress {
    /// `items_loaded / max(1, items_total)`, clamped to `[0, 1]`
    pub fn ratio(&self) -> f32 {
        let total = self.items_total.max(1) as f32;
        (self.items_loaded as f32 / total).clamp(0.0, 1.0)
    }

    /// Every discovered item has finished and at least one exists
    pub fn is_complete(&self) -> bool {
        self.items_total > 0 && self.items_loaded == self.items_total
    }
}

/// Load state of a single asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    /// Request issued, not finished
    Loading,
    /// Finished successfully
    Loaded,
    /// Failed; see the record's error
    Failed,
}

/// Broad asset category, derived from the URL extension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// Images used as textures
    Texture,
    /// Meshes and scenes
    Model,
    /// Colour lookup tables for grading
    Lut,
    /// Fonts for 3D text
    Font,
    /// Anything else
    Other,
}

impl AssetKind {
    /// Classify a URL by its extension, ignoring query strings and fragments
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let file = path.rsplit('/').next().unwrap_or(path);
        let ext = match file.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return Self::Other,
        };

        match ext.as_str() {
            "png" | "jpg" | "jpeg" | "webp" | "ktx2" | "hdr" | "exr" => Self::Texture,
            "glb" | "gltf" | "obj" | "fbx" => Self::Model,
            "cube" | "3dl" => Self::Lut,
            "ttf" | "otf" | "woff" | "woff2" => Self::Font,
            // typeface JSON used for extruded text
            "json" if file.contains("typeface") => Self::Font,
            _ => Self::Other,
        }
    }
}

/// Per-URL bookkeeping
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRecord {
    /// Requested URL
    pub url: String,
    /// Category
    pub kind: AssetKind,
    /// Current state
    pub state: LoadState,
    /// Failure reason, when `state == Failed`
    pub error: Option<LoadError>,
}

impl AssetRecord {
    /// Create a record for a request that just started
    pub fn loading(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            kind: AssetKind::from_url(&url),
            url,
            state: LoadState::Loading,
            error: None,
        }
    }
}

/// Event published by the tracker for every loader callback
#[derive(Clone, Debug, PartialEq)]
pub enum LoadEvent {
    /// A request started
    Started {
        url: String,
        progress: LoadProgress,
    },
    /// An item finished
    Progress {
        url: String,
        progress: LoadProgress,
    },
    /// The loader reports every item done
    Completed { progress: LoadProgress },
    /// An item failed
    Failed {
        url: String,
        error: LoadError,
        progress: LoadProgress,
    },
}

impl LoadEvent {
    /// Progress snapshot taken when the event was emitted
    pub fn progress(&self) -> &LoadProgress {
        match self {
            Self::Started { progress, .. }
            | Self::Progress { progress, .. }
            | Self::Completed { progress }
            | Self::Failed { progress, .. } => progress,
        }
    }

    /// URL the event refers to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Started { url, .. } | Self::Progress { url, .. } | Self::Failed { url, .. } => {
                Some(url)
            }
            Self::Completed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_guards_zero_total() {
        let progress = LoadProgress::default();
        assert_eq!(progress.ratio(), 0.0);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_ratio_is_clamped() {
        let progress = LoadProgress {
            items_loaded: 5,
            items_total: 3,
            current_url: String::new(),
        };
        assert_eq!(progress.ratio(), 1.0);
    }

    #[test]
    fn test_asset_kind_from_url() {
        assert_eq!(AssetKind::from_url("/models/prism.glb"), AssetKind::Model);
        assert_eq!(AssetKind::from_url("/lut/F-6800-STD.cube"), AssetKind::Lut);
        assert_eq!(AssetKind::from_url("/textures/lensflare.PNG?v=2"), AssetKind::Texture);
        assert_eq!(AssetKind::from_url("/fonts/Inter_Bold.json"), AssetKind::Other);
        assert_eq!(AssetKind::from_url("/fonts/helvetiker.typeface.json"), AssetKind::Font);
        assert_eq!(AssetKind::from_url("/api/v1/models"), AssetKind::Other);
        assert_eq!(AssetKind::from_url("https://cdn.example.com/v1.2/blob"), AssetKind::Other);
    }

    #[test]
    fn test_progress_serializes_for_ui() {
        let progress = LoadProgress {
            items_loaded: 1,
            items_total: 2,
            current_url: "/a.glb".into(),
        };
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["items_total"], 2);
        assert_eq!(json["current_url"], "/a.glb");
    }
}
