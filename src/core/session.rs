/// Playthrough sessions: walks the choice graph of a game copy, applying
/// outcomes and keeping an undoable history of play states.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::EngineConfig;
use crate::core::generator::visible_options;
use crate::core::history::{History, SubscriptionId};
use crate::core::log::{RuleLog, TracingLog};
use crate::core::outcome::OutcomeApplier;
use crate::schema::choice::{Choice, ChoiceOption};
use crate::schema::game::GameData;
use crate::schema::ids::ChoiceId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("start choice not found: {0}")]
    UnknownStartChoice(ChoiceId),
    #[error("the story has ended; there is no current choice")]
    NoCurrentChoice,
    #[error("option {option_id} is not available on choice {choice_id}")]
    OptionNotAvailable {
        choice_id: ChoiceId,
        option_id: String,
    },
}

/// One point in a playthrough: the game state and the node being shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayState {
    pub game: GameData,
    /// `None` once an option without a next node has been taken.
    pub current_choice_id: Option<ChoiceId>,
}

/// A simulator run over its own copy of a game.
pub struct Playthrough {
    history: History<PlayState>,
    opening: PlayState,
    applier: OutcomeApplier,
    log: Box<dyn RuleLog>,
}

/// Builder for constructing a `Playthrough`.
pub struct PlaythroughBuilder {
    seed: Option<u64>,
    start_choice_id: Option<ChoiceId>,
    history_limit: Option<usize>,
    log: Option<Box<dyn RuleLog>>,
}

impl Playthrough {
    pub fn builder() -> PlaythroughBuilder {
        PlaythroughBuilder {
            seed: None,
            start_choice_id: None,
            history_limit: None,
            log: None,
        }
    }

    pub fn state(&self) -> &PlayState {
        self.history.current()
    }

    pub fn game(&self) -> &GameData {
        &self.state().game
    }

    pub fn current_choice(&self) -> Option<&Choice> {
        let state = self.state();
        state
            .current_choice_id
            .as_ref()
            .and_then(|id| state.game.choice(id))
    }

    pub fn is_finished(&self) -> bool {
        self.current_choice().is_none()
    }

    /// Options shown on the current node, computed from the current state.
    pub fn visible_options(&self) -> Vec<ChoiceOption> {
        match self.current_choice() {
            Some(choice) => visible_options(choice, self.game(), &*self.log),
            None => Vec::new(),
        }
    }

    /// Take an option of the current node.
    ///
    /// The option is looked up among the options visible right now, so a
    /// stale option (hidden by a condition, or generated for an entity that
    /// no longer qualifies) is refused. Its outcomes are applied to the
    /// current state, bound to the option's source entity if it has one.
    pub fn choose(&mut self, option_id: &str) -> Result<&PlayState, SessionError> {
        let choice = self.current_choice().ok_or(SessionError::NoCurrentChoice)?;
        let choice_id = choice.id.clone();

        let option = self
            .visible_options()
            .into_iter()
            .find(|o| o.id == option_id)
            .ok_or_else(|| SessionError::OptionNotAvailable {
                choice_id: choice_id.clone(),
                option_id: option_id.to_string(),
            })?;

        let game = self.applier.apply(
            &self.history.current().game,
            &option.outcomes,
            option.source_entity_id.as_ref(),
            &*self.log,
        );

        if let Some(ref next) = option.next_choice_id {
            if game.choice(next).is_none() {
                self.log.warn(&format!(
                    "option {} on {} leads to unknown choice {}",
                    option.id, choice_id, next
                ));
            }
        }

        self.log.debug(&format!("{}: took {}", choice_id, option.id));
        self.history.push(PlayState {
            game,
            current_choice_id: option.next_choice_id,
        });
        Ok(self.state())
    }

    pub fn undo(&mut self) {
        self.history.undo();
    }

    pub fn redo(&mut self) {
        self.history.redo();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of states recorded, including the opening one.
    pub fn steps(&self) -> usize {
        self.history.len()
    }

    /// Back to the opening state, with no way to undo into the old run.
    pub fn restart(&mut self) {
        self.history.clear_and_push(self.opening.clone());
    }

    /// Notified after every change of play state.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PlayState) + 'static,
    {
        self.history.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.history.unsubscribe(id)
    }
}

impl PlaythroughBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn start_at(mut self, choice_id: &str) -> Self {
        self.start_choice_id = Some(ChoiceId::new(choice_id));
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    pub fn log(mut self, log: impl RuleLog + 'static) -> Self {
        self.log = Some(Box::new(log));
        self
    }

    /// Apply settings from an [`EngineConfig`]; only fields set there
    /// override the builder.
    pub fn config(mut self, config: &EngineConfig) -> Self {
        if let Some(seed) = config.seed {
            self.seed = Some(seed);
        }
        if let Some(ref start) = config.start_choice_id {
            self.start_choice_id = Some(ChoiceId::new(start.as_str()));
        }
        if let Some(limit) = config.history_limit {
            self.history_limit = Some(limit);
        }
        self
    }

    /// Start a run on a private copy of `design`.
    pub fn build(self, design: &GameData) -> Result<Playthrough, SessionError> {
        let game = design.clone();

        let current_choice_id = match self.start_choice_id {
            Some(id) => {
                if game.choice(&id).is_none() {
                    return Err(SessionError::UnknownStartChoice(id));
                }
                Some(id)
            }
            None => game.entry_choice().map(|c| c.id.clone()),
        };

        let opening = PlayState {
            game,
            current_choice_id,
        };
        let history = match self.history_limit {
            Some(limit) => History::with_limit(opening.clone(), limit),
            None => History::new(opening.clone()),
        };
        let applier = match self.seed {
            Some(seed) => OutcomeApplier::seeded(seed),
            None => OutcomeApplier::default(),
        };
        let log = self.log.unwrap_or_else(|| Box::new(TracingLog));

        Ok(Playthrough {
            history,
            opening,
            applier,
            log,
        })
    }
}
