//! Pure projections of the synchronizer's view for rendering.

use std::collections::HashMap;

use crate::mood::{Mood, MoodSelection, Quadrant};

/// Selections grouped by mood, each group in view order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoodGroups {
    groups: HashMap<Mood, Vec<MoodSelection>>,
}

impl MoodGroups {
    /// Selections currently holding `mood`; empty if none.
    pub fn get(&self, mood: Mood) -> &[MoodSelection] {
        self.groups.get(&mood).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of moods held by at least one selection.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

pub fn group_by_mood(view: &[MoodSelection]) -> MoodGroups {
    let mut groups: HashMap<Mood, Vec<MoodSelection>> = HashMap::new();
    for selection in view {
        groups
            .entry(selection.selected_mood)
            .or_default()
            .push(selection.clone());
    }
    MoodGroups { groups }
}

/// One participant in the "who's here" list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub session_id: String,
    pub user_name: String,
    pub user_color: String,
    pub mood: Mood,
}

impl RosterEntry {
    /// e.g. "Feeling at ease"
    pub fn feeling(&self) -> String {
        format!("Feeling {}", self.mood.label().to_lowercase())
    }
}

impl From<&MoodSelection> for RosterEntry {
    fn from(selection: &MoodSelection) -> Self {
        Self {
            session_id: selection.session_id.clone(),
            user_name: selection.user_name.clone(),
            user_color: selection.user_color.clone(),
            mood: selection.selected_mood,
        }
    }
}

/// One entry per session id, placed where the session first appears and
/// holding the last record seen for it.
pub fn roster(view: &[MoodSelection]) -> Vec<RosterEntry> {
    let mut entries: Vec<RosterEntry> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for selection in view {
        match positions.get(selection.session_id.as_str()) {
            Some(&index) => entries[index] = RosterEntry::from(selection),
            None => {
                positions.insert(&selection.session_id, entries.len());
                entries.push(RosterEntry::from(selection));
            }
        }
    }

    entries
}

/// An equal-width colour band of a shared mood cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Stripe {
    pub color: String,
    pub start_percent: f64,
    pub end_percent: f64,
}

/// Splits a cell into one band per selection, left to right in selection order.
pub fn stripes(selections: &[MoodSelection]) -> Vec<Stripe> {
    if selections.is_empty() {
        return Vec::new();
    }

    let width = 100.0 / selections.len() as f64;
    selections
        .iter()
        .enumerate()
        .map(|(index, selection)| Stripe {
            color: selection.user_color.clone(),
            start_percent: index as f64 * width,
            end_percent: (index + 1) as f64 * width,
        })
        .collect()
}

/// A grid cell with the selections holding its mood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodCard {
    pub mood: Mood,
    pub quadrant: Quadrant,
    pub selections: Vec<MoodSelection>,
}

impl MoodCard {
    pub fn is_selected(&self) -> bool {
        !self.selections.is_empty()
    }

    pub fn stripes(&self) -> Vec<Stripe> {
        stripes(&self.selections)
    }
}

/// All grid cells in row-major order.
pub fn mood_cards(view: &[MoodSelection]) -> Vec<MoodCard> {
    let groups = group_by_mood(view);
    Mood::all()
        .map(|mood| MoodCard {
            mood,
            quadrant: mood.quadrant(),
            selections: groups.get(mood).to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UserSession;
    use chrono::Utc;

    fn selection(id: &str, session_id: &str, color: &str, label: &str) -> MoodSelection {
        let identity = UserSession {
            session_id: session_id.to_string(),
            user_name: session_id.to_uppercase(),
            user_color: color.to_string(),
        };
        MoodSelection {
            id: id.to_string(),
            ..MoodSelection::provisional(&identity, Mood::parse(label).unwrap(), Utc::now())
        }
    }

    fn calm() -> Mood {
        Mood::parse("Calm").unwrap()
    }

    #[test]
    fn test_empty_view() {
        assert!(group_by_mood(&[]).is_empty());
        assert!(roster(&[]).is_empty());
        assert!(stripes(&[]).is_empty());
        assert_eq!(mood_cards(&[]).len(), 100);
    }

    #[test]
    fn test_group_preserves_view_order() {
        let a = selection("a", "s1", "red", "Calm");
        let b = selection("b", "s2", "blue", "Calm");
        let groups = group_by_mood(&[a.clone(), b.clone()]);

        assert_eq!(groups.get(calm()), [a, b]);
        assert!(groups.get(Mood::parse("Sad").unwrap()).is_empty());
    }

    #[test]
    fn test_group_order_stable_after_away_and_back() {
        let a = selection("a", "s1", "red", "Calm");
        let b = selection("b", "s2", "blue", "Calm");
        let away = vec![a.with_mood(Mood::parse("Sad").unwrap(), Utc::now()), b.clone()];
        assert_eq!(group_by_mood(&away).get(calm()), [b.clone()]);

        let back = vec![a.with_mood(calm(), Utc::now()), b.clone()];
        let grouped = group_by_mood(&back);
        let ids: Vec<&str> = grouped
            .get(calm())
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_roster_keeps_latest_record_per_session() {
        let view = vec![
            selection("a", "s1", "red", "Calm"),
            selection("b", "s2", "blue", "Sad"),
            selection("c", "s1", "red", "Excited"),
        ];
        let entries = roster(&view);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].session_id, "s1");
        assert_eq!(entries[0].mood.label(), "Excited");
        assert_eq!(entries[1].session_id, "s2");
        assert_eq!(entries[1].feeling(), "Feeling sad");
    }

    #[test]
    fn test_stripes_split_evenly_in_order() {
        let view = vec![
            selection("a", "s1", "red", "Calm"),
            selection("b", "s2", "blue", "Calm"),
            selection("c", "s3", "green", "Calm"),
            selection("d", "s4", "gold", "Calm"),
        ];
        let bands = stripes(&view);

        assert_eq!(bands.len(), 4);
        assert_eq!(bands[0].color, "red");
        assert_eq!(bands[0].start_percent, 0.0);
        assert_eq!(bands[1].start_percent, 25.0);
        assert_eq!(bands[3].end_percent, 100.0);
    }

    #[test]
    fn test_mood_cards_follow_grid() {
        let view = vec![selection("a", "s1", "red", "Calm")];
        let cards = mood_cards(&view);

        assert_eq!(cards[0].mood.label(), "Enraged");
        let calm_card = cards.iter().find(|c| c.mood == calm()).unwrap();
        assert!(calm_card.is_selected());
        assert_eq!(calm_card.quadrant, Quadrant::LowEnergyPleasant);
        assert_eq!(cards.iter().filter(|c| c.is_selected()).count(), 1);
    }
}
