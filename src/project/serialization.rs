// Serialization utilities for project persistence

use crate::project::ProjectError;
use crate::project::config::EditorConfig;
use crate::project::types::*;
use crate::sequencer::grid::Timeline;

/// Serialize a project to pretty JSON
pub fn serialize_to_json(project: &ProjectFile) -> Result<String, ProjectError> {
    Ok(serde_json::to_string_pretty(project)?)
}

pub fn deserialize_from_json(json_data: &str) -> Result<ProjectFile, ProjectError> {
    Ok(serde_json::from_str(json_data)?)
}

/// Serialize a project to RON, for hand-edited project files
pub fn serialize_to_ron(project: &ProjectFile) -> Result<String, ProjectError> {
    Ok(ron::ser::to_string_pretty(
        project,
        ron::ser::PrettyConfig::default(),
    )?)
}

pub fn deserialize_from_ron(ron_data: &str) -> Result<ProjectFile, ProjectError> {
    Ok(ron::from_str(ron_data)?)
}

/// Set cells of a timeline, in beat-major order
pub fn timeline_to_notes(timeline: &Timeline) -> Vec<GridNote> {
    timeline
        .active_cells()
        .map(|cell| GridNote {
            beat: cell.beat,
            pitch: cell.pitch,
        })
        .collect()
}

/// Snapshot a timeline into a project
pub fn project_from_timeline(
    name: &str,
    timeline: &Timeline,
    config: &EditorConfig,
    tempo_multiplier: f64,
) -> ProjectFile {
    let mut config = config.clone();
    config.pitch_count = timeline.pitch_count();
    config.lowest_pitch = timeline.lowest_pitch();
    config.lowest_pitch_class = timeline.pitch_class(0);

    let mut project = ProjectFile {
        beat_count: timeline.beat_count(),
        tempo_multiplier,
        notes: timeline_to_notes(timeline),
        config,
        ..ProjectFile::default()
    };
    project.metadata.name = name.to_string();
    project
}

/// Rebuild the timeline stored in a project
///
/// Notes outside the stored grid shape are skipped.
pub fn timeline_from_project(project: &ProjectFile) -> Timeline {
    let mut timeline = Timeline::new(
        project.beat_count,
        project.config.pitch_count,
        project.config.lowest_pitch,
        project.config.lowest_pitch_class,
    );

    let mut skipped = 0;
    for note in &project.notes {
        if timeline.target(note.beat as i64, note.pitch as i64).is_none() {
            skipped += 1;
            continue;
        }
        timeline.toggle_cell(note.beat, note.pitch, true);
    }
    if skipped > 0 {
        log::warn!("Skipped {} notes outside the project grid", skipped);
    }
    timeline
}
