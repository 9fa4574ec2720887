//! Interaction controller: turns grid clicks and the name prompt into
//! identity and synchronizer operations.
//!
//! ```text
//! NoIdentity --click--> CapturingName{mood} --submit--> HasIdentity
//!      ^                      |  (click: replace mood)      |  (click: update)
//!      +-------cancel---------+                             |
//!      +-----------------------------reset------------------+
//! ```

use std::sync::Arc;

use moodmeter_core::error::{MoodError, Result};
use moodmeter_core::identity::{SessionContext, UserSession};
use moodmeter_core::mood::Mood;
use moodmeter_core::sync::{MoodSynchronizer, PendingWrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    NoIdentity,
    /// A mood was picked and the name prompt is open.
    CapturingName { mood: Mood },
    HasIdentity,
}

pub struct InteractionController {
    context: SessionContext,
    synchronizer: Arc<MoodSynchronizer>,
    state: InteractionState,
}

impl InteractionController {
    /// Starts in `HasIdentity` if the context already holds a valid identity.
    pub fn new(context: SessionContext, synchronizer: Arc<MoodSynchronizer>) -> Self {
        let state = if context.has_identity() {
            InteractionState::HasIdentity
        } else {
            InteractionState::NoIdentity
        };
        Self {
            context,
            synchronizer,
            state,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn identity(&self) -> Option<&UserSession> {
        self.context.current()
    }

    /// Handles a click on a mood cell.
    ///
    /// Returns the remote write when the click changed an existing identity's
    /// mood; `None` when it only opened (or retargeted) the name prompt.
    pub async fn click(&mut self, mood: Mood) -> Option<PendingWrite> {
        match self.state {
            InteractionState::NoIdentity | InteractionState::CapturingName { .. } => {
                self.state = InteractionState::CapturingName { mood };
                None
            }
            InteractionState::HasIdentity => {
                let identity = self.context.current()?.clone();
                Some(self.synchronizer.update(&identity, mood).await)
            }
        }
    }

    /// Completes the name prompt: creates, persists and publishes the identity.
    ///
    /// # Errors
    ///
    /// - `InvalidName` when the name is blank; the prompt stays open
    /// - `Internal` when no prompt is open
    /// - Storage errors from persisting the identity; the prompt stays open
    pub async fn submit_name(&mut self, name: &str) -> Result<PendingWrite> {
        let InteractionState::CapturingName { mood } = self.state else {
            return Err(MoodError::internal("no mood is waiting for a name"));
        };

        let identity = self.context.establish(UserSession::generate(name)?)?.clone();
        self.state = InteractionState::HasIdentity;
        tracing::info!(
            "[InteractionController] {} joined with mood {}",
            identity.user_name,
            mood
        );

        Ok(self.synchronizer.create(&identity, mood).await)
    }

    /// Closes the name prompt without side effects.
    pub fn cancel(&mut self) {
        if let InteractionState::CapturingName { .. } = self.state {
            self.state = InteractionState::NoIdentity;
        }
    }

    /// Removes the identity locally and requests deletion of its record.
    pub fn reset(&mut self) -> Option<PendingWrite> {
        let pending = self.synchronizer.remove(&mut self.context);
        self.state = InteractionState::NoIdentity;
        pending
    }
}
