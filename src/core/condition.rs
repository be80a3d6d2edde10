/// Condition evaluation: pure predicates over a game snapshot.
use std::cmp::Ordering;

use crate::core::hierarchy;
use crate::core::log::{RuleLog, TracingLog};
use crate::schema::condition::{ComparisonOperator, Condition};
use crate::schema::entity::{AttributeValue, Entity};
use crate::schema::game::GameData;
use crate::schema::ids::TemplateId;

/// Evaluates conditions against one snapshot.
///
/// Evaluation never fails: unknown tags, unknown operators, dangling ids
/// and broken hierarchies all come out as a boolean, with the reason sent
/// to the log.
pub struct ConditionEvaluator<'a> {
    game: &'a GameData,
    log: &'a dyn RuleLog,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(game: &'a GameData, log: &'a dyn RuleLog) -> Self {
        Self { game, log }
    }

    pub fn evaluate(&self, condition: &Condition) -> bool {
        match condition {
            Condition::Attribute {
                target_entity_id,
                attribute_key,
                operator,
                value,
            } => {
                let Some(entity) = self.game.entity(target_entity_id) else {
                    self.log.debug(&format!(
                        "attribute {}.{} {}: entity not found, treating value as null",
                        target_entity_id,
                        attribute_key,
                        operator.symbol()
                    ));
                    return self.compare_logged(None, *operator, value.as_ref());
                };
                self.compare_logged(entity.value(attribute_key), *operator, value.as_ref())
            }
            Condition::EntityExists {
                template_id,
                exists,
            } => {
                let found = self
                    .game
                    .entities
                    .iter()
                    .any(|e| &e.template_id == template_id);
                found == *exists
            }
            Condition::HasStuff {
                target_entity_id,
                component_id,
                has,
            } => match self.game.entity(target_entity_id) {
                Some(entity) => self.has_stuff(entity, component_id, *has),
                None => {
                    self.log.debug(&format!(
                        "has_stuff: entity {} not found, treating as no components",
                        target_entity_id
                    ));
                    !*has
                }
            },
            Condition::Unknown => {
                self.log
                    .warn("unknown condition type, evaluating as false");
                false
            }
        }
    }

    /// Logical AND over a condition list; empty passes.
    pub fn evaluate_all(&self, conditions: &[Condition]) -> bool {
        conditions.iter().all(|c| self.evaluate(c))
    }

    /// Evaluate with `entity` as the implicit target of entity-scoped
    /// conditions (`attribute`, `has_stuff`). Global conditions ignore it.
    pub fn evaluate_for(&self, condition: &Condition, entity: &Entity) -> bool {
        match condition {
            Condition::Attribute {
                attribute_key,
                operator,
                value,
                ..
            } => self.compare_logged(entity.value(attribute_key), *operator, value.as_ref()),
            Condition::HasStuff {
                component_id, has, ..
            } => self.has_stuff(entity, component_id, *has),
            Condition::EntityExists { .. } | Condition::Unknown => self.evaluate(condition),
        }
    }

    pub fn evaluate_all_for(&self, conditions: &[Condition], entity: &Entity) -> bool {
        conditions.iter().all(|c| self.evaluate_for(c, entity))
    }

    fn has_stuff(&self, entity: &Entity, component_id: &TemplateId, has: bool) -> bool {
        match hierarchy::component_ids(&entity.template_id, &self.game.templates) {
            Ok(components) => components.contains(component_id) == has,
            Err(e) => {
                self.log.error(&format!(
                    "has_stuff on {}: {}; evaluating as false",
                    entity.id, e
                ));
                false
            }
        }
    }

    fn compare_logged(
        &self,
        actual: Option<&AttributeValue>,
        operator: ComparisonOperator,
        expected: Option<&AttributeValue>,
    ) -> bool {
        if operator == ComparisonOperator::Unknown {
            self.log
                .warn("unknown comparison operator, evaluating as false");
            return false;
        }
        compare(actual, operator, expected)
    }
}

/// Null-aware loose comparison of a stored value against a condition value.
///
/// - expected null: `==` holds when actual is null or empty text, `!=` is
///   its negation, every other operator is false;
/// - actual null, expected set: only `!=` holds;
/// - otherwise loose equality/ordering (see [`loose_eq`], [`loose_cmp`]).
pub fn compare(
    actual: Option<&AttributeValue>,
    operator: ComparisonOperator,
    expected: Option<&AttributeValue>,
) -> bool {
    let Some(expected) = expected else {
        let unset = actual.map_or(true, AttributeValue::is_blank);
        return match operator {
            ComparisonOperator::Eq => unset,
            ComparisonOperator::Ne => !unset,
            _ => false,
        };
    };

    let Some(actual) = actual else {
        return operator == ComparisonOperator::Ne;
    };

    match operator {
        ComparisonOperator::Eq => loose_eq(actual, expected),
        ComparisonOperator::Ne => !loose_eq(actual, expected),
        ComparisonOperator::Gt => loose_cmp(actual, expected) == Some(Ordering::Greater),
        ComparisonOperator::Lt => loose_cmp(actual, expected) == Some(Ordering::Less),
        ComparisonOperator::Ge => matches!(
            loose_cmp(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        ComparisonOperator::Le => matches!(
            loose_cmp(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        ComparisonOperator::Unknown => false,
    }
}

/// Text equals text exactly; anything involving a number compares
/// numerically, and text that is not a number equals nothing numeric.
pub fn loose_eq(a: &AttributeValue, b: &AttributeValue) -> bool {
    match (a, b) {
        (AttributeValue::Text(x), AttributeValue::Text(y)) => x == y,
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Text orders lexicographically against text; otherwise numeric ordering,
/// with `None` when either side is not a number.
pub fn loose_cmp(a: &AttributeValue, b: &AttributeValue) -> Option<Ordering> {
    match (a, b) {
        (AttributeValue::Text(x), AttributeValue::Text(y)) => Some(x.cmp(y)),
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

/// Evaluate one condition, logging through `tracing`.
pub fn evaluate(condition: &Condition, game: &GameData) -> bool {
    ConditionEvaluator::new(game, &TracingLog).evaluate(condition)
}

/// Evaluate a condition list (all must hold), logging through `tracing`.
pub fn evaluate_all(conditions: &[Condition], game: &GameData) -> bool {
    ConditionEvaluator::new(game, &TracingLog).evaluate_all(conditions)
}
