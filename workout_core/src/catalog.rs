//! Exercise catalog loading.
//!
//! The catalog is read once at startup and never mutated afterwards. A missing
//! or corrupt definition file yields an empty catalog rather than an error.

use crate::equipment::EquipmentLabel;
use crate::{ExerciseRecord, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

/// Definition file compiled into the binary
const BUILTIN_DEFINITIONS: &str = include_str!("../data/exercises.json");

/// Cached built-in catalog - parsed once and reused across all requests
static BUILTIN_CATALOG: Lazy<ExerciseCatalog> =
    Lazy::new(|| ExerciseCatalog::from_json_str(BUILTIN_DEFINITIONS).unwrap_or_else(|e| {
        tracing::error!("Built-in exercise definitions are invalid: {}", e);
        ExerciseCatalog::default()
    }));

/// The full, read-only set of known exercises
#[derive(Clone, Debug, Default)]
pub struct ExerciseCatalog {
    exercises: Vec<ExerciseRecord>,
}

impl ExerciseCatalog {
    pub fn new(exercises: Vec<ExerciseRecord>) -> Self {
        Self { exercises }
    }

    /// Get a reference to the cached built-in catalog
    pub fn builtin() -> &'static ExerciseCatalog {
        &BUILTIN_CATALOG
    }

    /// Parse a JSON array of exercise records
    pub fn from_json_str(json: &str) -> Result<Self> {
        let exercises: Vec<ExerciseRecord> = serde_json::from_str(json)?;
        Ok(Self { exercises })
    }

    /// Load a catalog from a definition file
    ///
    /// Never fails: a missing, unreadable or malformed file is logged once and
    /// an empty catalog is returned.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::error!(
                    "Unable to read exercise catalog at {:?}: {}. Using an empty catalog.",
                    path,
                    e
                );
                return Self::default();
            }
        };

        match Self::from_json_str(&contents) {
            Ok(catalog) => {
                tracing::info!("Loaded {} exercises from {:?}", catalog.len(), path);
                catalog
            }
            Err(e) => {
                tracing::error!(
                    "Invalid JSON in exercise catalog {:?}: {}. Using an empty catalog.",
                    path,
                    e
                );
                Self::default()
            }
        }
    }

    pub fn exercises(&self) -> &[ExerciseRecord] {
        &self.exercises
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Check the catalog for suspicious entries
    ///
    /// Returns a list of findings, or empty Vec if nothing looks off. None of
    /// these stop the catalog from being used.
    pub fn validate(&self) -> Vec<String> {
        let mut findings = Vec::new();
        let mut seen_names = HashSet::new();

        for (idx, exercise) in self.exercises.iter().enumerate() {
            if exercise.name.trim().is_empty() {
                findings.push(format!("Exercise #{} has empty name", idx));
                continue;
            }

            if !seen_names.insert(exercise.name.to_lowercase()) {
                findings.push(format!("Duplicate exercise name '{}'", exercise.name));
            }

            for tag in &exercise.equipment_needed {
                if EquipmentLabel::from_tag(tag).is_none() {
                    findings.push(format!(
                        "Exercise '{}' needs unknown equipment '{}'",
                        exercise.name, tag
                    ));
                }
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExerciseKind;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = ExerciseCatalog::builtin();
        assert_eq!(catalog.len(), 29);
    }

    #[test]
    fn test_builtin_catalog_validates() {
        let findings = ExerciseCatalog::builtin().validate();
        assert!(
            findings.is_empty(),
            "Built-in catalog has findings: {:?}",
            findings
        );
    }

    #[test]
    fn test_builtin_catalog_has_every_role() {
        let catalog = ExerciseCatalog::builtin();
        let bodyweight: Vec<_> = catalog
            .exercises()
            .iter()
            .filter(|e| e.is_bodyweight())
            .collect();

        assert!(bodyweight.iter().any(|e| e.is_warmup_candidate()));
        assert!(bodyweight.iter().any(|e| e.is_cooldown_candidate()));
        assert!(bodyweight.iter().any(|e| e.kind() == ExerciseKind::Strength));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let catalog = ExerciseCatalog::load(&temp_dir.path().join("exercises.json"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("exercises.json");
        std::fs::write(&path, "[{ not json").unwrap();

        let catalog = ExerciseCatalog::load(&path);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_valid_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("exercises.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "Push-ups", "type": "strength", "muscle_group": "chest", "sets": 3, "reps_per_set": 12},
                {"name": "Curls", "type": "strength", "muscle_group": "arms", "equipment_needed": ["dumbbell"]}
            ]"#,
        )
        .unwrap();

        let catalog = ExerciseCatalog::load(&path);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.exercises()[0].name, "Push-ups");
        assert!(catalog.exercises()[1].equipment_needed.contains("dumbbell"));
    }

    #[test]
    fn test_validate_reports_duplicates_and_unknown_tags() {
        let catalog = ExerciseCatalog::new(vec![
            ExerciseRecord::new("Squats", "strength", "legs"),
            ExerciseRecord::new("squats", "strength", "legs"),
            ExerciseRecord::new("Sled Push", "strength", "legs").with_equipment(["sled"]),
            ExerciseRecord::new("  ", "strength", "legs"),
        ]);

        let findings = catalog.validate();
        assert_eq!(findings.len(), 3);
        assert!(findings.iter().any(|f| f.contains("Duplicate")));
        assert!(findings.iter().any(|f| f.contains("sled")));
        assert!(findings.iter().any(|f| f.contains("empty name")));
    }
}
