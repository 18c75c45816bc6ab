use serde::Deserialize;

use crate::domain::model::Exercise;

/// One record of the free-exercise-db JSON array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceExercise {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub force: Option<String>,
    #[serde(default)]
    pub mechanic: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub primary_muscles: Vec<String>,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Upstream id rule: spaces and slashes become `_`; `, ( ) '` are dropped.
pub fn string_id(name: &str) -> String {
    name.trim()
        .chars()
        .filter_map(|ch| match ch {
            ' ' | '/' => Some('_'),
            ',' | '(' | ')' | '\'' => None,
            other => Some(other),
        })
        .collect()
}

/// Maps a source record to the stored shape, or explains why it is unusable.
pub fn normalize(source: SourceExercise) -> Result<Exercise, String> {
    let name = source.name.trim().to_string();
    if name.is_empty() {
        return Err("missing name".to_string());
    }
    let level = source.level.trim().to_string();
    if level.is_empty() {
        return Err(format!("'{}' has no level", name));
    }
    let category = source.category.trim().to_string();
    if category.is_empty() {
        return Err(format!("'{}' has no category", name));
    }

    let id = match source.id.trim() {
        "" => string_id(&name),
        raw => raw.to_string(),
    };

    let instructions = source
        .instructions
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Exercise {
        id,
        name,
        level,
        category,
        force: non_empty(source.force),
        mechanic: non_empty(source.mechanic),
        equipment: non_empty(source.equipment),
        instructions: if instructions.is_empty() {
            None
        } else {
            Some(instructions)
        },
        primary_muscles: clean_list(source.primary_muscles),
        secondary_muscles: clean_list(source.secondary_muscles),
    })
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn clean_list(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}
