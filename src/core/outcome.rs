/// Outcome application: folds an ordered outcome list into a new snapshot.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::hierarchy;
use crate::core::log::RuleLog;
use crate::schema::entity::{AttributeValue, AttributeValues, Entity};
use crate::schema::game::GameData;
use crate::schema::ids::{EntityId, TemplateId};
use crate::schema::outcome::{Outcome, CHOSEN_ENTITY, CHOSEN_ENTITY_ID};

/// Substitute the player's chosen entity into an outcome.
///
/// `<chosen_entity>` in the target position and `<chosen_entity_id>` in a
/// value position become `bound`. With nothing bound the sentinels are
/// left in place.
pub fn resolve_placeholders(outcome: &Outcome, bound: Option<&EntityId>) -> Outcome {
    let Some(bound) = bound else {
        return outcome.clone();
    };

    match outcome {
        Outcome::UpdateEntity {
            target_entity_id,
            attribute_key,
            value,
        } => {
            let target = if target_entity_id.as_str() == CHOSEN_ENTITY {
                bound.clone()
            } else {
                target_entity_id.clone()
            };
            Outcome::UpdateEntity {
                target_entity_id: target,
                attribute_key: attribute_key.clone(),
                value: value.as_ref().map(|v| resolve_value(v, bound)),
            }
        }
        Outcome::CreateEntity {
            template_id,
            name,
            attribute_values,
        } => Outcome::CreateEntity {
            template_id: template_id.clone(),
            name: name.clone(),
            attribute_values: attribute_values
                .iter()
                .map(|(k, v)| (k.clone(), v.as_ref().map(|v| resolve_value(v, bound))))
                .collect(),
        },
        Outcome::Unknown => Outcome::Unknown,
    }
}

fn resolve_value(value: &AttributeValue, bound: &EntityId) -> AttributeValue {
    match value {
        AttributeValue::Text(s) if s == CHOSEN_ENTITY_ID => AttributeValue::Text(bound.to_string()),
        other => other.clone(),
    }
}

/// Applies outcome lists and mints ids for created entities.
///
/// The RNG only feeds id generation; seeding it makes a playthrough's
/// created ids reproducible.
#[derive(Debug, Clone)]
pub struct OutcomeApplier {
    rng: StdRng,
}

impl Default for OutcomeApplier {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl OutcomeApplier {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Apply `outcomes` in order to a copy of `game`.
    ///
    /// Each outcome sees the effects of the ones before it. The input
    /// snapshot is left untouched.
    pub fn apply(
        &mut self,
        game: &GameData,
        outcomes: &[Outcome],
        bound: Option<&EntityId>,
        log: &dyn RuleLog,
    ) -> GameData {
        let mut next = game.clone();
        for outcome in outcomes {
            let resolved = resolve_placeholders(outcome, bound);
            if resolved.has_placeholder() {
                log.warn(&format!(
                    "{} outcome carries an unbound chosen-entity placeholder",
                    resolved.kind()
                ));
            }
            self.apply_one(&mut next, resolved, log);
        }
        next
    }

    fn apply_one(&mut self, game: &mut GameData, outcome: Outcome, log: &dyn RuleLog) {
        match outcome {
            Outcome::CreateEntity {
                template_id,
                name,
                attribute_values,
            } => self.create_entity(game, template_id, name, attribute_values, log),
            Outcome::UpdateEntity {
                target_entity_id,
                attribute_key,
                value,
            } => match game.entity_mut(&target_entity_id) {
                Some(entity) => {
                    log.debug(&format!(
                        "update {}.{} = {}",
                        target_entity_id,
                        attribute_key,
                        value.as_ref().map_or("null".to_string(), |v| v.to_string())
                    ));
                    entity.attribute_values.insert(attribute_key, value);
                }
                None => log.warn(&format!(
                    "update_entity: entity {} not found, skipping",
                    target_entity_id
                )),
            },
            Outcome::Unknown => log.warn("unknown outcome type, skipping"),
        }
    }

    fn create_entity(
        &mut self,
        game: &mut GameData,
        template_id: TemplateId,
        name: String,
        initial: AttributeValues,
        log: &dyn RuleLog,
    ) {
        match game.template(&template_id) {
            None => {
                log.warn(&format!(
                    "create_entity: template {} not found, skipping",
                    template_id
                ));
                return;
            }
            Some(t) if t.is_component => {
                log.warn(&format!(
                    "create_entity: {} is a component and cannot be instantiated, skipping",
                    template_id
                ));
                return;
            }
            Some(_) => {}
        }

        let mut attribute_values = match hierarchy::resolve(&template_id, &game.templates) {
            Ok(Some(resolved)) => resolved.default_values(),
            Ok(None) => AttributeValues::new(),
            Err(e) => {
                log.error(&format!("create_entity: {}; starting without defaults", e));
                AttributeValues::new()
            }
        };
        attribute_values.extend(initial);

        let id = self.fresh_entity_id(game);
        log.debug(&format!("create {} ({}) from {}", id, name, template_id));
        game.entities.push(Entity {
            id,
            template_id,
            name,
            attribute_values,
        });
    }

    /// A new id not used by any entity of `game`.
    pub fn fresh_entity_id(&mut self, game: &GameData) -> EntityId {
        loop {
            let candidate = EntityId(format!("entity_{:016x}", self.rng.gen::<u64>()));
            if game.entity(&candidate).is_none() {
                return candidate;
            }
        }
    }
}
