use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::choice::Choice;
use super::entity::Entity;
use super::ids::{ChoiceId, EntityId, TemplateId};
use super::template::Template;

#[derive(Debug, Error)]
pub enum GameDataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A full snapshot of design-time or play-time state.
///
/// The engine never mutates a snapshot it was handed; every transform
/// returns a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_choice_id: Option<ChoiceId>,
}

impl GameData {
    pub fn template(&self, id: &TemplateId) -> Option<&Template> {
        self.templates.iter().find(|t| &t.id == id)
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| &e.id == id)
    }

    pub fn entity_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| &e.id == id)
    }

    pub fn choice(&self, id: &ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|c| &c.id == id)
    }

    /// The node a playthrough opens on: the declared start, else the first.
    pub fn entry_choice(&self) -> Option<&Choice> {
        match self.start_choice_id {
            Some(ref id) => self.choice(id),
            None => self.choices.first(),
        }
    }

    /// Entities instantiated directly from `template_id` (no subclass match).
    pub fn entities_of<'a>(&'a self, template_id: &'a TemplateId) -> impl Iterator<Item = &'a Entity> {
        self.entities
            .iter()
            .filter(move |e| &e.template_id == template_id)
    }

    /// Parse a game document as written by the browser editor.
    pub fn from_json_str(input: &str) -> Result<GameData, GameDataError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn load_from_json(path: &Path) -> Result<GameData, GameDataError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String, GameDataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
