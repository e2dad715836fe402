// Project persistence and editor configuration
// Projects are JSON (or RON, by extension); the editor config is RON

pub mod config;
pub mod manager;
pub mod serialization;
pub mod types;

use crate::sequencer::grid::MAX_BEAT_COUNT;

pub use config::EditorConfig;
pub use manager::{ProjectError, ProjectFormat, ProjectLoadOptions, ProjectManager};
pub use serialization::{project_from_timeline, timeline_from_project};
pub use types::{GridNote, ProjectFile, ProjectMetadata, ProjectVersion};

/// Helper function to validate project structure
pub fn validate_project_structure(project: &ProjectFile) -> Result<(), ProjectError> {
    if project.metadata.name.trim().is_empty() {
        return Err(ProjectError::InvalidStructure(
            "Project name cannot be empty".to_string(),
        ));
    }

    if project.metadata.name.len() > 255 {
        return Err(ProjectError::InvalidStructure(
            "Project name cannot exceed 255 characters".to_string(),
        ));
    }

    if !project.metadata.version.is_compatible() {
        return Err(ProjectError::InvalidVersion(
            project.metadata.version.clone(),
        ));
    }

    project.config.validate()?;

    if project.beat_count == 0 || project.beat_count > MAX_BEAT_COUNT {
        return Err(ProjectError::InvalidStructure(format!(
            "Project must have between 1 and {} beats",
            MAX_BEAT_COUNT
        )));
    }

    if !project.tempo_multiplier.is_finite() || project.tempo_multiplier <= 0.0 {
        return Err(ProjectError::InvalidStructure(format!(
            "Tempo multiplier {} must be positive",
            project.tempo_multiplier
        )));
    }

    let mut seen = std::collections::HashSet::new();
    for note in &project.notes {
        if note.beat >= project.beat_count || note.pitch >= project.config.pitch_count {
            return Err(ProjectError::InvalidStructure(format!(
                "Note at beat {} row {} lies outside the {}x{} grid",
                note.beat, note.pitch, project.beat_count, project.config.pitch_count
            )));
        }
        if !seen.insert(*note) {
            return Err(ProjectError::InvalidStructure(format!(
                "Duplicate note at beat {} row {}",
                note.beat, note.pitch
            )));
        }
    }

    Ok(())
}
