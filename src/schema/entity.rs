use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::ids::{EntityId, TemplateId};

/// A scalar stored in an entity attribute slot.
///
/// JSON documents carry plain numbers and strings, so the enum is untagged.
/// An unset slot is `None` at the map level, never a variant here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Numeric view of the value. Text is parsed the way a loosely typed
    /// host would coerce it: surrounding whitespace ignored, empty text is 0.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// True for the empty string, which counts as "unset" in null checks.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            // Whole numbers print without a trailing ".0"
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Attribute slots of an entity, keyed by base attribute id or by
/// component composite key. `None` is an explicit null.
pub type AttributeValues = HashMap<String, Option<AttributeValue>>;

/// A concrete instance of a (non-component) template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    pub template_id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub attribute_values: AttributeValues,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, template_id: impl Into<TemplateId>, name: &str) -> Self {
        Self {
            id: id.into(),
            template_id: template_id.into(),
            name: name.to_string(),
            attribute_values: HashMap::new(),
        }
    }

    /// Builder-style attribute setter, mostly for fixtures.
    pub fn with_value(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.attribute_values
            .insert(key.to_string(), Some(value.into()));
        self
    }

    /// The stored value for `key`; absent keys and explicit nulls both
    /// read as `None`.
    pub fn value(&self, key: &str) -> Option<&AttributeValue> {
        self.attribute_values.get(key).and_then(|v| v.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_json_shape() {
        let json = r#"{
            "id": "e1",
            "templateId": "colonist",
            "name": "Ada",
            "attributeValues": {"health": 7, "mood": "calm", "job": null}
        }"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.id, EntityId::new("e1"));
        assert_eq!(entity.value("health"), Some(&AttributeValue::Number(7.0)));
        assert_eq!(entity.value("mood"), Some(&AttributeValue::text("calm")));
        assert!(entity.attribute_values.contains_key("job"));
        assert_eq!(entity.value("job"), None);
        assert_eq!(entity.value("missing"), None);
    }

    #[test]
    fn missing_attribute_map_defaults_empty() {
        let entity: Entity =
            serde_json::from_str(r#"{"id": "e1", "templateId": "t", "name": "x"}"#).unwrap();
        assert!(entity.attribute_values.is_empty());
    }

    #[test]
    fn number_display() {
        assert_eq!(AttributeValue::Number(3.0).to_string(), "3");
        assert_eq!(AttributeValue::Number(-2.5).to_string(), "-2.5");
        assert_eq!(AttributeValue::text("hi").to_string(), "hi");
    }

    #[test]
    fn loose_numeric_view() {
        assert_eq!(AttributeValue::text(" 12 ").as_number(), Some(12.0));
        assert_eq!(AttributeValue::text("").as_number(), Some(0.0));
        assert_eq!(AttributeValue::text("twelve").as_number(), None);
        assert!(AttributeValue::text("").is_blank());
        assert!(!AttributeValue::Number(0.0).is_blank());
    }
}
