// Project manager for loading and saving projects

use crate::project::config::EditorConfig;
use crate::project::serialization::*;
use crate::project::types::*;
use std::path::Path;

/// Project error types
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Invalid project structure: {0}")]
    InvalidStructure(String),

    #[error("Unsupported project format version {0}")]
    InvalidVersion(ProjectVersion),

    #[error("Project validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),
}

/// Options for loading a project
#[derive(Debug, Clone)]
pub struct ProjectLoadOptions {
    /// Whether to validate the project structure
    pub validate: bool,
}

impl Default for ProjectLoadOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

/// On-disk encoding, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    Json,
    Ron,
}

impl ProjectFormat {
    /// `.ron` files are RON, everything else JSON
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => ProjectFormat::Ron,
            _ => ProjectFormat::Json,
        }
    }
}

/// Project manager - handles saving/loading projects
pub struct ProjectManager {
    /// Config given to new projects
    default_config: EditorConfig,
}

impl ProjectManager {
    pub fn new(default_config: EditorConfig) -> Self {
        Self { default_config }
    }

    pub fn default_config(&self) -> &EditorConfig {
        &self.default_config
    }

    /// Create a new empty project
    pub fn create_new_project(&self, name: String) -> ProjectFile {
        let mut project = ProjectFile {
            beat_count: self.default_config.initial_beat_count,
            config: self.default_config.clone(),
            ..ProjectFile::default()
        };
        project.metadata.name = name;
        project
    }

    /// Save a project, creating parent directories as needed
    ///
    /// The modification time is refreshed on the written copy.
    pub fn save_project<P: AsRef<Path>>(
        &self,
        project: &ProjectFile,
        project_path: P,
    ) -> Result<(), ProjectError> {
        let project_path = project_path.as_ref();
        if let Some(parent) = project_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut project = project.clone();
        project.metadata.touch();

        let data = match ProjectFormat::for_path(project_path) {
            ProjectFormat::Json => serialize_to_json(&project)?,
            ProjectFormat::Ron => serialize_to_ron(&project)?,
        };

        // Write next to the target then rename, so a failed save keeps the old file
        let temp_path = project_path.with_extension("tmp");
        std::fs::write(&temp_path, data)?;
        std::fs::rename(&temp_path, project_path)?;

        log::info!(
            "Saved project '{}' ({} notes) to {}",
            project.metadata.name,
            project.notes.len(),
            project_path.display()
        );
        Ok(())
    }

    pub fn load_project<P: AsRef<Path>>(
        &self,
        project_path: P,
        options: &ProjectLoadOptions,
    ) -> Result<ProjectFile, ProjectError> {
        let project_path = project_path.as_ref();
        let data = std::fs::read_to_string(project_path)?;

        let project = match ProjectFormat::for_path(project_path) {
            ProjectFormat::Json => deserialize_from_json(&data)?,
            ProjectFormat::Ron => deserialize_from_ron(&data)?,
        };

        if !project.metadata.version.is_compatible() {
            return Err(ProjectError::InvalidVersion(project.metadata.version));
        }

        if options.validate {
            crate::project::validate_project_structure(&project)
                .map_err(|e| ProjectError::ValidationFailed(e.to_string()))?;
        }

        log::info!(
            "Loaded project '{}' (version {}) from {}",
            project.metadata.name,
            project.metadata.version,
            project_path.display()
        );
        Ok(project)
    }
}

impl Default for ProjectManager {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_manager_creation() {
        let config = EditorConfig {
            initial_beat_count: 64,
            ..EditorConfig::default()
        };
        let manager = ProjectManager::new(config);
        let project = manager.create_new_project("Test Project".to_string());

        assert_eq!(project.metadata.name, "Test Project");
        assert_eq!(project.beat_count, 64);
        assert!(project.notes.is_empty());
    }

    #[test]
    fn test_project_save_load_cycle() {
        let dir = tempdir().unwrap();
        let manager = ProjectManager::default();

        let mut project = manager.create_new_project("Test Save/Load".to_string());
        project.metadata.author = Some("Test Author".to_string());
        project.notes.push(GridNote { beat: 3, pitch: 39 });
        project.tempo_multiplier = 0.5;

        let project_path = dir.path().join("songs").join("test.json");
        manager.save_project(&project, &project_path).unwrap();
        assert!(project_path.exists());
        assert!(!project_path.with_extension("tmp").exists());

        let loaded = manager
            .load_project(&project_path, &ProjectLoadOptions::default())
            .unwrap();
        assert_eq!(loaded.metadata.name, "Test Save/Load");
        assert_eq!(loaded.metadata.author, Some("Test Author".to_string()));
        assert_eq!(loaded.notes, project.notes);
        assert_eq!(loaded.tempo_multiplier, 0.5);
        let saved_at = loaded.metadata.modified_at().unwrap();
        assert!(saved_at >= project.metadata.modified_at().unwrap());
        assert_eq!(loaded.metadata.created, project.metadata.created);
    }

    #[test]
    fn test_ron_extension_round_trip() {
        let dir = tempdir().unwrap();
        let manager = ProjectManager::default();
        let project = manager.create_new_project("Ron".to_string());

        let path = dir.path().join("song.ron");
        manager.save_project(&project, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.trim_start().starts_with('('));

        let loaded = manager
            .load_project(&path, &ProjectLoadOptions::default())
            .unwrap();
        assert_eq!(loaded.metadata.name, "Ron");
    }

    #[test]
    fn test_invalid_project_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "this is not a project").unwrap();

        let manager = ProjectManager::default();
        let result = manager.load_project(&path, &ProjectLoadOptions::default());
        assert!(matches!(result, Err(ProjectError::Json(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let manager = ProjectManager::default();
        let result =
            manager.load_project(dir.path().join("absent.json"), &ProjectLoadOptions::default());
        assert!(matches!(result, Err(ProjectError::Io(_))));
    }

    #[test]
    fn test_project_version_compatibility() {
        let dir = tempdir().unwrap();
        let manager = ProjectManager::default();
        let mut project = manager.create_new_project("Future".to_string());
        project.metadata.version = ProjectVersion::new(2, 0, 0);

        let path = dir.path().join("future.json");
        manager.save_project(&project, &path).unwrap();

        let result = manager.load_project(&path, &ProjectLoadOptions::default());
        assert!(matches!(result, Err(ProjectError::InvalidVersion(_))));
    }

    #[test]
    fn test_validation_can_be_skipped() {
        let dir = tempdir().unwrap();
        let manager = ProjectManager::default();
        let mut project = manager.create_new_project(String::new());
        project.notes.push(GridNote { beat: 1, pitch: 1 });

        let path = dir.path().join("unnamed.json");
        manager.save_project(&project, &path).unwrap();

        let strict = manager.load_project(&path, &ProjectLoadOptions::default());
        assert!(matches!(strict, Err(ProjectError::ValidationFailed(_))));

        let lenient = manager
            .load_project(&path, &ProjectLoadOptions { validate: false })
            .unwrap();
        assert_eq!(lenient.notes.len(), 1);
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(ProjectFormat::for_path(Path::new("a.RON")), ProjectFormat::Ron);
        assert_eq!(ProjectFormat::for_path(Path::new("a.json")), ProjectFormat::Json);
        assert_eq!(ProjectFormat::for_path(Path::new("noext")), ProjectFormat::Json);
    }
}
