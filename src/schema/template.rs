use serde::{Deserialize, Serialize};

use super::entity::AttributeValue;
use super::ids::TemplateId;

/// The declared value kind of an attribute. Informational for the editor;
/// the engine compares stored scalars loosely regardless of kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    #[default]
    Text,
    Number,
}

/// One attribute slot declared by a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: AttributeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<AttributeValue>,
}

impl AttributeDefinition {
    pub fn new(id: &str, name: &str, kind: AttributeKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<AttributeValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// A data blueprint. Templates form a forest through `parent_id`; a
/// template flagged `is_component` is a mixin that other templates include
/// and is never instantiated itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TemplateId>,
    #[serde(default)]
    pub is_component: bool,
    #[serde(default)]
    pub included_component_ids: Vec<TemplateId>,
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,
}

impl Template {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: TemplateId::new(id),
            name: name.to_string(),
            parent_id: None,
            is_component: false,
            included_component_ids: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn component(id: &str, name: &str) -> Self {
        Self {
            is_component: true,
            ..Self::new(id, name)
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent_id = Some(TemplateId::new(parent));
        self
    }

    pub fn including(mut self, component: &str) -> Self {
        self.included_component_ids.push(TemplateId::new(component));
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Key under which a component attribute is stored on an entity.
pub fn composite_key(component_id: &TemplateId, attribute_id: &str) -> String {
    format!("{}_{}", component_id, attribute_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_json_defaults() {
        let t: Template = serde_json::from_str(r#"{"id": "colonist", "name": "Colonist"}"#).unwrap();
        assert!(!t.is_component);
        assert!(t.parent_id.is_none());
        assert!(t.included_component_ids.is_empty());
        assert!(t.attributes.is_empty());
    }

    #[test]
    fn template_json_full() {
        let json = r#"{
            "id": "medic",
            "name": "Medic",
            "parentId": "colonist",
            "isComponent": false,
            "includedComponentIds": ["skilled"],
            "attributes": [{"id": "rank", "name": "Rank", "kind": "number", "defaultValue": 1}]
        }"#;
        let t: Template = serde_json::from_str(json).unwrap();
        assert_eq!(t.parent_id, Some(TemplateId::new("colonist")));
        assert_eq!(t.included_component_ids, vec![TemplateId::new("skilled")]);
        assert_eq!(t.attributes[0].kind, AttributeKind::Number);
        assert_eq!(t.attributes[0].default_value, Some(AttributeValue::Number(1.0)));
    }

    #[test]
    fn composite_key_format() {
        assert_eq!(composite_key(&TemplateId::new("skilled"), "level"), "skilled_level");
    }
}
