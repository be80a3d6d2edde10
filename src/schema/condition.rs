use serde::{Deserialize, Serialize};

use super::entity::AttributeValue;
use super::ids::{EntityId, TemplateId};

/// Target id used inside dynamic-choice filters to mean "the candidate".
pub const SELF_TARGET: &str = "self";

fn yes() -> bool {
    true
}

/// Comparison operator of an `attribute` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    /// Any operator this build does not know. Always evaluates false.
    #[serde(other)]
    Unknown,
}

impl ComparisonOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Unknown => "?",
        }
    }
}

/// A pure boolean predicate over a game snapshot, used to gate options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Compare one attribute slot of an entity against a value.
    #[serde(rename_all = "camelCase")]
    Attribute {
        target_entity_id: EntityId,
        attribute_key: String,
        operator: ComparisonOperator,
        #[serde(default)]
        value: Option<AttributeValue>,
    },
    /// Whether any entity of a template exists.
    #[serde(rename_all = "camelCase")]
    EntityExists {
        template_id: TemplateId,
        #[serde(default = "yes")]
        exists: bool,
    },
    /// Whether an entity's template carries a component, directly or
    /// through an ancestor.
    #[serde(rename_all = "camelCase")]
    HasStuff {
        target_entity_id: EntityId,
        component_id: TemplateId,
        #[serde(default = "yes")]
        has: bool,
    },
    /// A condition tag this build does not understand.
    #[serde(other)]
    Unknown,
}

impl Condition {
    pub fn attribute(
        target: &str,
        key: &str,
        operator: ComparisonOperator,
        value: Option<AttributeValue>,
    ) -> Self {
        Self::Attribute {
            target_entity_id: EntityId::new(target),
            attribute_key: key.to_string(),
            operator,
            value,
        }
    }

    pub fn entity_exists(template: &str, exists: bool) -> Self {
        Self::EntityExists {
            template_id: TemplateId::new(template),
            exists,
        }
    }

    pub fn has_stuff(target: &str, component: &str, has: bool) -> Self {
        Self::HasStuff {
            target_entity_id: EntityId::new(target),
            component_id: TemplateId::new(component),
            has,
        }
    }

    /// Short tag name, matching the serialized `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Attribute { .. } => "attribute",
            Self::EntityExists { .. } => "entity_exists",
            Self::HasStuff { .. } => "has_stuff",
            Self::Unknown => "unknown",
        }
    }
}
