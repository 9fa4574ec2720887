//! Pure reconciliation state.
//!
//! `SyncState` is the pair (confirmed, optimistic). Every change to it goes
//! through [`SyncState::apply`], so the reconciliation rules can be tested
//! without any runtime or datastore.

use chrono::{DateTime, Utc};

use crate::identity::UserSession;
use crate::mood::{Mood, MoodChangeEvent, MoodSelection};

/// A full-replacement overlay installed by a local mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    generation: u64,
    records: Vec<MoodSelection>,
}

impl Overlay {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn records(&self) -> &[MoodSelection] {
        &self.records
    }
}

/// Inputs that move the state forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTransition {
    /// An authoritative full listing (initial load or refetch).
    Snapshot(Vec<MoodSelection>),
    /// One change notification from the feed.
    Remote(MoodChangeEvent),
    /// A locally computed approximation to show until confirmation.
    Optimistic(Vec<MoodSelection>),
    /// Discard the overlay installed with this generation, if still active.
    Revert { generation: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    confirmed: Vec<MoodSelection>,
    overlay: Option<Overlay>,
    generation: u64,
}

impl SyncState {
    /// Starts from an authoritative listing with no overlay.
    pub fn new(confirmed: Vec<MoodSelection>) -> Self {
        let mut state = Self::default();
        state.apply(SyncTransition::Snapshot(confirmed));
        state
    }

    pub fn confirmed(&self) -> &[MoodSelection] {
        &self.confirmed
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// The state the UI reads: the overlay when present and non-empty,
    /// otherwise the confirmed records.
    pub fn current_view(&self) -> &[MoodSelection] {
        match self.overlay {
            Some(ref overlay) if !overlay.records.is_empty() => &overlay.records,
            _ => &self.confirmed,
        }
    }

    /// Applies one transition in place.
    pub fn apply(&mut self, transition: SyncTransition) {
        match transition {
            SyncTransition::Snapshot(mut records) => {
                records.sort_by_key(|r| r.created_at);
                self.confirmed = records;
                self.overlay = None;
            }
            SyncTransition::Remote(event) => {
                self.apply_remote(event);
                self.overlay = None;
            }
            SyncTransition::Optimistic(records) => {
                self.install_overlay(records);
            }
            SyncTransition::Revert { generation } => {
                if self.overlay_generation() == Some(generation) {
                    self.overlay = None;
                }
            }
        }
    }

    /// Installs an overlay and returns the generation that identifies it.
    pub fn install_overlay(&mut self, records: Vec<MoodSelection>) -> u64 {
        self.generation += 1;
        self.overlay = Some(Overlay {
            generation: self.generation,
            records,
        });
        self.generation
    }

    pub fn overlay_generation(&self) -> Option<u64> {
        self.overlay.as_ref().map(|o| o.generation)
    }

    /// Overlay for a newly created identity: confirmed plus the provisional
    /// record (replacing any record already held by that session).
    pub fn optimistic_create(&self, provisional: MoodSelection) -> Vec<MoodSelection> {
        let mut records = self.confirmed.clone();
        upsert(&mut records, provisional);
        records
    }

    /// Overlay for a mood change by an existing identity.
    ///
    /// Patches the confirmed record of the session. When confirmed has no such
    /// record yet (its creation has not been echoed), patches the pending
    /// overlay instead, and failing that appends a provisional record.
    pub fn optimistic_update(
        &self,
        identity: &UserSession,
        mood: Mood,
        now: DateTime<Utc>,
    ) -> Vec<MoodSelection> {
        let patch = |records: &[MoodSelection]| -> Vec<MoodSelection> {
            records
                .iter()
                .map(|r| {
                    if r.belongs_to(&identity.session_id) {
                        r.with_mood(mood, now)
                    } else {
                        r.clone()
                    }
                })
                .collect()
        };

        let owns = |records: &[MoodSelection]| records.iter().any(|r| r.belongs_to(&identity.session_id));

        if owns(&self.confirmed) {
            return patch(&self.confirmed);
        }

        if let Some(ref overlay) = self.overlay
            && owns(&overlay.records)
        {
            return patch(&overlay.records);
        }

        let mut records = self.confirmed.clone();
        records.push(MoodSelection::provisional(identity, mood, now));
        records
    }

    fn apply_remote(&mut self, event: MoodChangeEvent) {
        match event {
            MoodChangeEvent::Inserted { record } | MoodChangeEvent::Updated { record } => {
                upsert(&mut self.confirmed, record);
            }
            MoodChangeEvent::Deleted { id } => {
                self.confirmed.retain(|r| r.id != id);
            }
        }
    }
}

/// Pure form of the reconciliation rule:
/// (confirmed, optimistic) × event → (confirmed', optimistic').
pub fn reconcile(mut state: SyncState, event: MoodChangeEvent) -> SyncState {
    state.apply(SyncTransition::Remote(event));
    state
}

/// Replaces in place by id, then by session id, else appends.
///
/// Matching on session id keeps at most one record per session.
fn upsert(records: &mut Vec<MoodSelection>, record: MoodSelection) {
    let position = records
        .iter()
        .position(|r| r.id == record.id)
        .or_else(|| records.iter().position(|r| r.session_id == record.session_id));

    match position {
        Some(index) => records[index] = record,
        None => records.push(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(session_id: &str, name: &str) -> UserSession {
        UserSession {
            session_id: session_id.to_string(),
            user_name: name.to_string(),
            user_color: "#abc".to_string(),
        }
    }

    fn mood(label: &str) -> Mood {
        Mood::parse(label).unwrap()
    }

    fn record(id: &str, session_id: &str, label: &str, offset_secs: i64) -> MoodSelection {
        let at = DateTime::from_timestamp(1_700_000_000 + offset_secs, 0).unwrap();
        MoodSelection {
            id: id.to_string(),
            ..MoodSelection::provisional(&identity(session_id, session_id), mood(label), at)
        }
    }

    #[test]
    fn test_snapshot_orders_by_creation_time() {
        let state = SyncState::new(vec![record("b", "s2", "Calm", 20), record("a", "s1", "Calm", 10)]);
        let ids: Vec<&str> = state.confirmed().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_view_prefers_non_empty_overlay() {
        let mut state = SyncState::new(vec![record("a", "s1", "Calm", 1)]);
        state.apply(SyncTransition::Optimistic(vec![record("a", "s1", "Excited", 1)]));
        assert_eq!(state.current_view()[0].selected_mood, mood("Excited"));

        state.apply(SyncTransition::Optimistic(Vec::new()));
        assert_eq!(state.current_view(), state.confirmed());
    }

    #[test]
    fn test_any_remote_event_clears_overlay() {
        let mut state = SyncState::new(vec![record("a", "s1", "Calm", 1)]);
        state.apply(SyncTransition::Optimistic(vec![record("a", "s1", "Excited", 1)]));

        let unrelated = MoodChangeEvent::Inserted {
            record: record("z", "s9", "Tired", 5),
        };
        let state = reconcile(state, unrelated);

        assert!(state.overlay().is_none());
        assert_eq!(state.current_view(), state.confirmed());
        assert_eq!(state.confirmed().len(), 2);
    }

    #[test]
    fn test_delete_of_unknown_id_still_clears_overlay() {
        let mut state = SyncState::default();
        state.apply(SyncTransition::Optimistic(vec![record("a", "s1", "Calm", 1)]));

        let state = reconcile(state, MoodChangeEvent::Deleted { id: "ghost".to_string() });
        assert!(state.current_view().is_empty());
    }

    #[test]
    fn test_update_mutates_in_place() {
        let state = SyncState::new(vec![
            record("a", "s1", "Calm", 1),
            record("b", "s2", "Calm", 2),
        ]);
        let state = reconcile(
            state,
            MoodChangeEvent::Updated {
                record: record("a", "s1", "Sad", 1),
            },
        );

        assert_eq!(state.confirmed()[0].id, "a");
        assert_eq!(state.confirmed()[0].selected_mood, mood("Sad"));
        assert_eq!(state.confirmed()[1].id, "b");
    }

    #[test]
    fn test_insert_for_known_session_does_not_duplicate() {
        let state = SyncState::new(vec![record("a", "s1", "Calm", 1)]);
        let state = reconcile(
            state,
            MoodChangeEvent::Inserted {
                record: record("a2", "s1", "Happy", 3),
            },
        );

        assert_eq!(state.confirmed().len(), 1);
        assert_eq!(state.confirmed()[0].id, "a2");
    }

    #[test]
    fn test_revert_only_drops_matching_generation() {
        let mut state = SyncState::default();
        let first = state.install_overlay(vec![record("a", "s1", "Calm", 1)]);
        let second = state.install_overlay(vec![record("a", "s1", "Happy", 1)]);

        state.apply(SyncTransition::Revert { generation: first });
        assert_eq!(state.overlay_generation(), Some(second));

        state.apply(SyncTransition::Revert { generation: second });
        assert!(state.overlay().is_none());
    }

    #[test]
    fn test_optimistic_update_patches_confirmed_record() {
        let state = SyncState::new(vec![
            record("a", "s1", "Calm", 1),
            record("b", "s2", "Calm", 2),
        ]);
        let now = Utc::now();
        let records = state.optimistic_update(&identity("s2", "s2"), mood("Excited"), now);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].selected_mood, mood("Calm"));
        assert_eq!(records[1].selected_mood, mood("Excited"));
        assert_eq!(records[1].updated_at, now);
    }

    #[test]
    fn test_optimistic_update_falls_back_to_pending_overlay() {
        let mut state = SyncState::default();
        let ada = identity("s1", "Ada");
        let created = state.optimistic_create(MoodSelection::provisional(&ada, mood("Calm"), Utc::now()));
        state.apply(SyncTransition::Optimistic(created));

        let records = state.optimistic_update(&ada, mood("Excited"), Utc::now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].selected_mood, mood("Excited"));
    }

    #[test]
    fn test_optimistic_update_without_any_record_appends_provisional() {
        let state = SyncState::new(vec![record("b", "s2", "Calm", 2)]);
        let records = state.optimistic_update(&identity("s1", "Ada"), mood("Excited"), Utc::now());

        assert_eq!(records.len(), 2);
        assert!(records[1].belongs_to("s1"));
    }
}
