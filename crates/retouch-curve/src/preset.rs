//! YAML curve presets.
//!
//! ```yaml
//! spline: cardinal   # natural | cardinal
//! tension: 0.25      # cardinal only, default 0
//! points:
//!   - { x: 0.0, y: 0.0 }
//!   - { x: 0.5, y: 0.8 }
//!   - { x: 1.0, y: 1.0 }
//! ```
//!
//! The lowest and highest points become the locked `start` and `end`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ControlPointSet, CurveBuilder, CurveError, CurveResult, CurveSession, SplineKind};

/// Spline family as written in preset files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplineName {
    /// Natural cubic.
    #[default]
    Natural,
    /// Cardinal, using the preset's `tension`.
    Cardinal,
}

/// One `{x, y}` entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetPoint {
    /// Input fraction.
    pub x: f32,
    /// Output fraction.
    pub y: f32,
}

/// Serialized curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePreset {
    /// Spline family.
    #[serde(default)]
    pub spline: SplineName,
    /// Cardinal tension.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub tension: f32,
    /// Control points, any order.
    pub points: Vec<PresetPoint>,
}

fn is_zero(v: &f32) -> bool {
    *v == 0.0
}

impl CurvePreset {
    /// Loads a preset file.
    pub fn from_file(path: impl AsRef<Path>) -> CurveResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CurveError::PresetNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let preset = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), points = preset.points.len(), "loaded curve preset");
        Ok(preset)
    }

    /// Parses a preset from YAML text.
    pub fn from_yaml_str(yaml: &str) -> CurveResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serializes to YAML text.
    pub fn to_yaml(&self) -> CurveResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Writes the preset to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> CurveResult<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Interpolation strategy.
    pub fn spline_kind(&self) -> SplineKind {
        match self.spline {
            SplineName::Natural => SplineKind::Natural,
            SplineName::Cardinal => SplineKind::Cardinal {
                tension: self.tension,
            },
        }
    }

    /// Builder for this preset.
    pub fn builder(&self) -> CurveBuilder {
        CurveBuilder::new(self.spline_kind())
    }

    /// Control points with locked endpoints.
    pub fn point_set(&self) -> CurveResult<ControlPointSet> {
        let positions: Vec<(f32, f32)> = self.points.iter().map(|p| (p.x, p.y)).collect();
        ControlPointSet::from_positions(&positions)
    }

    /// Opens an editing session on this preset.
    pub fn session(&self) -> CurveResult<CurveSession> {
        CurveSession::with_points(self.point_set()?, self.builder())
    }

    /// Captures a session's current state.
    pub fn from_session(session: &CurveSession) -> Self {
        let (spline, tension) = match session.builder().kind() {
            SplineKind::Natural => (SplineName::Natural, 0.0),
            SplineKind::Cardinal { tension } => (SplineName::Cardinal, tension),
        };
        Self {
            spline,
            tension,
            points: session
                .points()
                .iter()
                .map(|p| PresetPoint { x: p.x, y: p.y })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PointId;

    const S_CURVE: &str = "
spline: cardinal
tension: 0.5
points:
  - { x: 1.0, y: 1.0 }
  - { x: 0.25, y: 0.15 }
  - { x: 0.0, y: 0.0 }
  - { x: 0.75, y: 0.85 }
";

    #[test]
    fn test_parse() {
        let preset = CurvePreset::from_yaml_str(S_CURVE).unwrap();
        assert_eq!(preset.spline_kind(), SplineKind::Cardinal { tension: 0.5 });

        let set = preset.point_set().unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.as_slice()[0].id, PointId::start());
        assert_eq!(set.as_slice()[3].id, PointId::end());
        assert!(set.as_slice()[0].locked && set.as_slice()[3].locked);
    }

    #[test]
    fn test_defaults_to_natural() {
        let preset = CurvePreset::from_yaml_str("points: [{x: 0, y: 0}, {x: 1, y: 1}]").unwrap();
        assert_eq!(preset.spline_kind(), SplineKind::Natural);
        assert!(preset.session().unwrap().lut().is_identity(1e-6));
    }

    #[test]
    fn test_too_few_points() {
        let preset = CurvePreset::from_yaml_str("points: [{x: 0.5, y: 0.5}]").unwrap();
        assert!(matches!(preset.point_set(), Err(CurveError::InvalidControlSet { .. })));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s-curve.yaml");

        let mut session = CurvePreset::from_yaml_str(S_CURVE).unwrap().session().unwrap();
        session.add_point(0.5, 0.5).unwrap();
        let preset = CurvePreset::from_session(&session);
        preset.save(&path).unwrap();

        let loaded = CurvePreset::from_file(&path).unwrap();
        assert_eq!(loaded, preset);
        assert_eq!(loaded.session().unwrap().lut(), session.lut());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CurvePreset::from_file("/nonexistent/curve.yaml"),
            Err(CurveError::PresetNotFound { .. })
        ));
    }
}
