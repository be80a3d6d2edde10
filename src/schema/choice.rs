use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::ids::{ChoiceId, EntityId, TemplateId};
use super::outcome::Outcome;

/// Whether a choice carries hand-authored options or generates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    #[default]
    Static,
    Dynamic,
}

/// One selectable option of a story node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub id: String,
    pub text: String,
    /// All must hold for the option to be shown.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_choice_id: Option<ChoiceId>,
    /// Set only on generated options: the entity the option stands for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_entity_id: Option<EntityId>,
}

impl ChoiceOption {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            conditions: Vec::new(),
            outcomes: Vec::new(),
            next_choice_id: None,
            source_entity_id: None,
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn then(mut self, outcome: Outcome) -> Self {
        self.outcomes.push(outcome);
        self
    }

    pub fn leads_to(mut self, next: &str) -> Self {
        self.next_choice_id = Some(ChoiceId::new(next));
        self
    }
}

/// Query describing how a dynamic choice builds its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DynamicChoiceConfig {
    /// Candidate entities come from any of these templates.
    #[serde(default)]
    pub source_template_ids: Vec<TemplateId>,
    /// Candidates must carry every one of these components.
    #[serde(default)]
    pub required_component_ids: Vec<TemplateId>,
    /// Candidates carrying any of these components are dropped.
    #[serde(default)]
    pub excluded_component_ids: Vec<TemplateId>,
    #[serde(default)]
    pub filter_conditions: Vec<Condition>,
    /// Text with `{entity.name}` / `{entity.attributeValues.<key>}` slots.
    #[serde(default)]
    pub option_template: String,
    #[serde(default)]
    pub outcome_templates: Vec<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_choice_id: Option<ChoiceId>,
}

/// A story node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: ChoiceId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: ChoiceKind,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_config: Option<DynamicChoiceConfig>,
}

impl Choice {
    pub fn fixed(id: &str, title: &str, options: Vec<ChoiceOption>) -> Self {
        Self {
            id: ChoiceId::new(id),
            title: title.to_string(),
            description: String::new(),
            kind: ChoiceKind::Static,
            options,
            dynamic_config: None,
        }
    }

    pub fn dynamic(id: &str, title: &str, config: DynamicChoiceConfig) -> Self {
        Self {
            id: ChoiceId::new(id),
            title: title.to_string(),
            description: String::new(),
            kind: ChoiceKind::Dynamic,
            options: Vec::new(),
            dynamic_config: Some(config),
        }
    }
}
