// Types for project persistence

use crate::project::config::EditorConfig;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Project file format version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProjectVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn current() -> Self {
        Self::new(1, 0, 0)
    }

    /// Files from the same major version can be read
    pub fn is_compatible(&self) -> bool {
        self.major == Self::current().major
    }
}

impl std::fmt::Display for ProjectVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMetadata {
    pub name: String,
    pub version: ProjectVersion,
    /// Creation time, RFC 3339
    pub created: String,
    /// Last save time, RFC 3339
    pub modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProjectMetadata {
    /// Stamp the modification time with the current time
    pub fn touch(&mut self) {
        self.modified = Utc::now().to_rfc3339();
    }

    /// Parsed modification time, if the stored string is valid
    pub fn modified_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.modified).ok()
    }
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            name: "Untitled".to_string(),
            version: ProjectVersion::current(),
            created: now.to_rfc3339(),
            modified: now.to_rfc3339(),
            author: None,
            description: None,
        }
    }
}

/// One set grid cell
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridNote {
    pub beat: usize,
    /// Row index, 0 = lowest pitch
    pub pitch: usize,
}

/// Everything needed to restore an editing session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectFile {
    pub metadata: ProjectMetadata,
    /// Grid shape, tempo base and editor preferences
    pub config: EditorConfig,
    pub beat_count: usize,
    #[serde(default = "default_tempo_multiplier")]
    pub tempo_multiplier: f64,
    pub notes: Vec<GridNote>,
}

fn default_tempo_multiplier() -> f64 {
    1.0
}

impl Default for ProjectFile {
    fn default() -> Self {
        let config = EditorConfig::default();
        Self {
            metadata: ProjectMetadata::default(),
            beat_count: config.initial_beat_count,
            config,
            tempo_multiplier: default_tempo_multiplier(),
            notes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_version() {
        let version = ProjectVersion::current();
        assert_eq!(version.to_string(), "1.0.0");
        assert!(version.is_compatible());
        assert!(!ProjectVersion::new(2, 0, 0).is_compatible());
        assert!(ProjectVersion::new(1, 4, 2).is_compatible());
    }

    #[test]
    fn test_project_defaults() {
        let project = ProjectFile::default();
        assert_eq!(project.metadata.name, "Untitled");
        assert_eq!(project.beat_count, 128);
        assert_eq!(project.tempo_multiplier, 1.0);
        assert!(project.notes.is_empty());
        assert!(DateTime::parse_from_rfc3339(&project.metadata.created).is_ok());
        assert_eq!(project.metadata.created, project.metadata.modified);
    }

    #[test]
    fn test_touch_moves_modified_forward() {
        let mut metadata = ProjectMetadata {
            modified: "2020-01-01T00:00:00+00:00".to_string(),
            ..ProjectMetadata::default()
        };
        let before = metadata.modified_at().unwrap();
        metadata.touch();
        assert!(metadata.modified_at().unwrap() > before);

        metadata.modified = "yesterday".to_string();
        assert!(metadata.modified_at().is_none());
    }

    #[test]
    fn test_missing_tempo_defaults_to_one() {
        let mut value = serde_json::to_value(ProjectFile::default()).unwrap();
        value.as_object_mut().unwrap().remove("tempo_multiplier");
        let project: ProjectFile = serde_json::from_value(value).unwrap();
        assert_eq!(project.tempo_multiplier, 1.0);
    }
}
