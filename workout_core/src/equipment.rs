//! Equipment selection and catalog filtering.
//!
//! Users pick equipment by label (`dumbbells`, `pull_up_bar`, ...). Each label
//! resolves to at most one equipment tag as used in `equipment_needed`.
//! `bodyweight` resolves to no tag. Exercises that need nothing are admitted
//! only when `bodyweight` is selected or the selection is empty.

use crate::{ExerciseCatalog, ExerciseRecord};
use std::collections::BTreeSet;
use std::fmt;

/// Equipment a user can select
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EquipmentLabel {
    Bodyweight,
    Dumbbells,
    Kettlebells,
    ResistanceBands,
    PullUpBar,
    Bench,
    Barbell,
    MedicineBall,
}

impl EquipmentLabel {
    pub fn all() -> &'static [EquipmentLabel] {
        &[
            EquipmentLabel::Bodyweight,
            EquipmentLabel::Dumbbells,
            EquipmentLabel::Kettlebells,
            EquipmentLabel::ResistanceBands,
            EquipmentLabel::PullUpBar,
            EquipmentLabel::Bench,
            EquipmentLabel::Barbell,
            EquipmentLabel::MedicineBall,
        ]
    }

    /// Parse a user-facing label; case and surrounding whitespace are ignored
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "bodyweight" => Some(EquipmentLabel::Bodyweight),
            "dumbbells" => Some(EquipmentLabel::Dumbbells),
            "kettlebells" => Some(EquipmentLabel::Kettlebells),
            "resistance_bands" => Some(EquipmentLabel::ResistanceBands),
            "pull_up_bar" => Some(EquipmentLabel::PullUpBar),
            "bench" => Some(EquipmentLabel::Bench),
            "barbell" => Some(EquipmentLabel::Barbell),
            "medicine_ball" => Some(EquipmentLabel::MedicineBall),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentLabel::Bodyweight => "bodyweight",
            EquipmentLabel::Dumbbells => "dumbbells",
            EquipmentLabel::Kettlebells => "kettlebells",
            EquipmentLabel::ResistanceBands => "resistance_bands",
            EquipmentLabel::PullUpBar => "pull_up_bar",
            EquipmentLabel::Bench => "bench",
            EquipmentLabel::Barbell => "barbell",
            EquipmentLabel::MedicineBall => "medicine_ball",
        }
    }

    /// The `equipment_needed` tag this label unlocks
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            EquipmentLabel::Bodyweight => None,
            EquipmentLabel::Dumbbells => Some("dumbbell"),
            EquipmentLabel::Kettlebells => Some("kettlebell"),
            EquipmentLabel::ResistanceBands => Some("resistance_band"),
            EquipmentLabel::PullUpBar => Some("pull_up_bar"),
            EquipmentLabel::Bench => Some("bench"),
            EquipmentLabel::Barbell => Some("barbell"),
            EquipmentLabel::MedicineBall => Some("medicine_ball"),
        }
    }

    /// Reverse lookup from an `equipment_needed` tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|label| label.tag() == Some(tag))
    }
}

impl fmt::Display for EquipmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve selected labels into the set of equipment tags they unlock
pub fn resolve_tags<S: AsRef<str>>(selection: &[S]) -> BTreeSet<&'static str> {
    let mut tags = BTreeSet::new();
    for label in selection {
        match EquipmentLabel::parse(label.as_ref()) {
            Some(parsed) => tags.extend(parsed.tag()),
            None => tracing::debug!("Ignoring unknown equipment label '{}'", label.as_ref()),
        }
    }
    tags
}

/// Whether the selection admits exercises that need no equipment
pub fn admits_bodyweight<S: AsRef<str>>(selection: &[S]) -> bool {
    selection.is_empty()
        || selection
            .iter()
            .any(|label| EquipmentLabel::parse(label.as_ref()) == Some(EquipmentLabel::Bodyweight))
}

/// Catalog exercises that can be performed with the selected equipment
///
/// An exercise that needs nothing is kept when the selection admits
/// bodyweight work; any other exercise is kept when everything it needs is
/// unlocked by the selection. Catalog order is preserved.
pub fn filter_by_equipment<'a, S: AsRef<str>>(
    catalog: &'a ExerciseCatalog,
    selection: &[S],
) -> Vec<&'a ExerciseRecord> {
    let available = resolve_tags(selection);
    let bodyweight = admits_bodyweight(selection);

    let admitted: Vec<_> = catalog
        .exercises()
        .iter()
        .filter(|exercise| {
            if exercise.equipment_needed.is_empty() {
                bodyweight
            } else {
                exercise
                    .equipment_needed
                    .iter()
                    .all(|tag| available.contains(tag.as_str()))
            }
        })
        .collect();

    tracing::debug!(
        "Equipment {:?} admits {} of {} exercises",
        available,
        admitted.len(),
        catalog.len()
    );

    admitted
}
