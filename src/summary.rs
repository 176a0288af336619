//! Header text for a finished board.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::Serialize;

use crate::bank::{Dialect, PositionFilter, ShapeGroup, Sound, WordEntry};
use crate::icons::ColorMode;

/// The words actually pictured for one sound, as listed in the header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TargetGroup {
    /// The sound.
    pub sound: Sound,
    /// Its phonemic label.
    pub ipa: &'static str,
    /// Distinct, alphabetical.
    pub words: Vec<String>,
}

/// Group visible items by sound for the header.
///
/// Sounds appear in `selection_order` first, then any others alphabetically by id. Sounds with no visible words are
/// left out.
pub fn group_targets<'a, I>(visible: I, selection_order: &[Sound]) -> Vec<TargetGroup>
where
    I: IntoIterator<Item = &'a WordEntry>,
{
    let mut by_sound: HashMap<Sound, Vec<&str>> = HashMap::new();
    for entry in visible.into_iter().unique_by(|e| (e.sound, e.orth.as_str())) {
        by_sound.entry(entry.sound).or_default().push(entry.orth.as_str());
    }

    let mut seen = HashSet::new();
    let selected = selection_order.iter().copied().filter(|s| seen.insert(*s)).collect_vec();
    let leftover = by_sound.keys()
        .copied()
        .filter(|s| !seen.contains(s))
        .sorted_by(|a, b| a.as_ref().cmp(b.as_ref()))
        .collect_vec();

    selected.into_iter()
        .chain(leftover)
        .filter_map(|sound| {
            let words = by_sound.get(&sound)?
                .iter()
                .map(|w| w.to_string())
                .sorted()
                .dedup()
                .collect_vec();
            (!words.is_empty()).then(|| TargetGroup { sound, ipa: sound.ipa(), words })
        })
        .collect()
}

/// Header labels describing the settings a board was made with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BoardMeta {
    /// "UK English" or "US English".
    pub dialect_label: &'static str,
    /// IPA of each selected sound, comma separated.
    pub sound_label: String,
    /// Position restriction, or "Any position".
    pub position_label: &'static str,
    /// The selected structure group.
    pub shape_label: String,
    /// "Colour" or "B/W".
    pub theme_label: &'static str,
}

impl BoardMeta {
    /// Header labels for a board built from these settings.
    pub fn new(dialect: Dialect, sounds: &[Sound], position: PositionFilter, shape_group: ShapeGroup, theme: ColorMode) -> Self {
        let sound_label = if sounds.is_empty() {
            "-".to_string()
        } else {
            sounds.iter().map(|s| s.ipa()).join(", ")
        };

        Self {
            dialect_label: match dialect {
                Dialect::UK => "UK English",
                Dialect::US => "US English",
            },
            sound_label,
            position_label: position.label(),
            shape_label: shape_group.to_string(),
            theme_label: theme.label(),
        }
    }
}
