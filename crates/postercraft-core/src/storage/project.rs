//! Persisted project payload.

use super::{StorageError, StorageResult};
use crate::animation::AnimationItem;
use crate::shapes::Shape;
use crate::store::SafeArea;
use serde::{Deserialize, Serialize};

/// Format version written by this build.
pub const CURRENT_VERSION: u32 = 1;

/// Everything saved for a project.
///
/// Payloads written before versioning carry no `version` and load as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    #[serde(default)]
    pub version: u32,
    /// Id the project was saved under, used to resume the last project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub shapes: Vec<Shape>,
    pub safe_area: SafeArea,
    #[serde(default)]
    pub animations: Vec<AnimationItem>,
}

impl ProjectData {
    pub fn new(shapes: Vec<Shape>, safe_area: SafeArea, animations: Vec<AnimationItem>) -> Self {
        Self {
            version: CURRENT_VERSION,
            project_id: None,
            shapes,
            safe_area,
            animations,
        }
    }

    pub fn with_project_id(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a saved project, rejecting versions newer than this build.
    pub fn from_json(json: &str) -> StorageResult<Self> {
        let data: Self =
            serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))?;
        if data.version > CURRENT_VERSION {
            log::error!("Refusing project format version {}", data.version);
            return Err(StorageError::UnsupportedVersion {
                found: data.version,
                supported: CURRENT_VERSION,
            });
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeType;
    use kurbo::Size;

    #[test]
    fn test_roundtrip() {
        let data = ProjectData::new(
            vec![Shape::new(ShapeType::Star)],
            SafeArea::new(Size::new(800.0, 600.0)),
            Vec::new(),
        )
        .with_project_id("poster");
        let parsed = ProjectData::from_json(&data.to_json().unwrap()).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn test_reloaded_floats_are_exact() {
        let mut star = Shape::new(ShapeType::Star);
        star.rotation = 0.1 + 0.2;
        star.position = kurbo::Point::new(1.0 / 3.0, 40.45084971874736);
        let safe_area = SafeArea::new(Size::new(1.0, 1.0));
        let data = ProjectData::new(vec![star.clone()], safe_area, Vec::new());
        let parsed = ProjectData::from_json(&data.to_json().unwrap()).unwrap();
        assert_eq!(parsed.shapes[0], star);
    }

    #[test]
    fn test_legacy_payload_loads_as_version_zero() {
        let json = r#"{
            "shapes": [],
            "safeArea": {"id": "safe-area", "x": 0, "y": 0, "width": 1080, "height": 1920}
        }"#;
        let data = ProjectData::from_json(json).unwrap();
        assert_eq!(data.version, 0);
        assert!(data.animations.is_empty());
        assert!((data.safe_area.height - 1920.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_future_version_rejected() {
        let mut data =
            ProjectData::new(Vec::new(), SafeArea::new(Size::new(10.0, 10.0)), Vec::new());
        data.version = CURRENT_VERSION + 1;
        let json = serde_json::to_string(&data).unwrap();
        assert!(matches!(
            ProjectData::from_json(&json),
            Err(StorageError::UnsupportedVersion { found, .. }) if found == CURRENT_VERSION + 1
        ));
    }
}
