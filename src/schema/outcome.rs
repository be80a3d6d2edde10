use serde::{Deserialize, Serialize};

use super::entity::{AttributeValue, AttributeValues};
use super::ids::{EntityId, TemplateId};

/// Stands for the entity the player picked, in `target_entity_id`.
pub const CHOSEN_ENTITY: &str = "<chosen_entity>";

/// Stands for the picked entity's id, in value positions.
pub const CHOSEN_ENTITY_ID: &str = "<chosen_entity_id>";

/// A state-changing instruction attached to a choice option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    #[serde(rename_all = "camelCase")]
    CreateEntity {
        template_id: TemplateId,
        name: String,
        #[serde(default)]
        attribute_values: AttributeValues,
    },
    #[serde(rename_all = "camelCase")]
    UpdateEntity {
        target_entity_id: EntityId,
        attribute_key: String,
        #[serde(default)]
        value: Option<AttributeValue>,
    },
    /// An outcome tag this build does not understand; applied as a no-op.
    #[serde(other)]
    Unknown,
}

fn is_chosen_id(value: &Option<AttributeValue>) -> bool {
    value.as_ref().and_then(AttributeValue::as_text) == Some(CHOSEN_ENTITY_ID)
}

impl Outcome {
    pub fn create(template: &str, name: &str) -> Self {
        Self::CreateEntity {
            template_id: TemplateId::new(template),
            name: name.to_string(),
            attribute_values: AttributeValues::new(),
        }
    }

    pub fn update(target: &str, key: &str, value: Option<AttributeValue>) -> Self {
        Self::UpdateEntity {
            target_entity_id: EntityId::new(target),
            attribute_key: key.to_string(),
            value,
        }
    }

    /// True when the outcome still carries a `<chosen_entity…>` sentinel.
    pub fn has_placeholder(&self) -> bool {
        match self {
            Self::CreateEntity {
                attribute_values, ..
            } => attribute_values.values().any(is_chosen_id),
            Self::UpdateEntity {
                target_entity_id,
                value,
                ..
            } => {
                target_entity_id.as_str() == CHOSEN_ENTITY
                    || is_chosen_id(value)
            }
            Self::Unknown => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateEntity { .. } => "create_entity",
            Self::UpdateEntity { .. } => "update_entity",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_outcome_json() {
        let json = r#"{"type": "update_entity", "targetEntityId": "<chosen_entity>", "attributeKey": "job", "value": "<chosen_entity_id>"}"#;
        let o: Outcome = serde_json::from_str(json).unwrap();
        assert_eq!(
            o,
            Outcome::update(CHOSEN_ENTITY, "job", Some(AttributeValue::text(CHOSEN_ENTITY_ID)))
        );
        assert!(o.has_placeholder());
    }

    #[test]
    fn create_outcome_json() {
        let json = r#"{"type": "create_entity", "templateId": "raider", "name": "Scout", "attributeValues": {"threat": 2}}"#;
        let o: Outcome = serde_json::from_str(json).unwrap();
        match o {
            Outcome::CreateEntity {
                template_id,
                attribute_values,
                ..
            } => {
                assert_eq!(template_id, TemplateId::new("raider"));
                assert_eq!(attribute_values["threat"], Some(AttributeValue::Number(2.0)));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn placeholder_detection() {
        let mut create = Outcome::create("raider", "Tail");
        assert!(!create.has_placeholder());
        if let Outcome::CreateEntity {
            ref mut attribute_values,
            ..
        } = create
        {
            attribute_values.insert("follows".to_string(), Some(AttributeValue::text(CHOSEN_ENTITY_ID)));
        }
        assert!(create.has_placeholder());

        assert!(!Outcome::update("e1", "job", Some(AttributeValue::text("cook"))).has_placeholder());
        assert!(!Outcome::update("e1", "job", Some(AttributeValue::Number(1.0))).has_placeholder());
        assert!(Outcome::update("e1", "partner", Some(AttributeValue::text(CHOSEN_ENTITY_ID))).has_placeholder());
    }

    #[test]
    fn unknown_outcome_parses() {
        let o: Outcome = serde_json::from_str(r#"{"type": "play_sound", "clip": "thunder"}"#).unwrap();
        assert_eq!(o, Outcome::Unknown);
        assert!(!o.has_placeholder());
    }
}
