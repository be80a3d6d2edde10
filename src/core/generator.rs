/// Dynamic choice generation: entity query, component filtering,
/// condition filtering and per-entity option rendering.
use crate::core::condition::ConditionEvaluator;
use crate::core::hierarchy;
use crate::core::log::{RuleLog, TracingLog};
use crate::core::text::OptionText;
use crate::schema::choice::{Choice, ChoiceKind, ChoiceOption, DynamicChoiceConfig};
use crate::schema::entity::Entity;
use crate::schema::game::GameData;

/// Builds options for dynamic choices from the live entity set.
pub struct DynamicChoiceGenerator<'a> {
    game: &'a GameData,
    log: &'a dyn RuleLog,
}

impl<'a> DynamicChoiceGenerator<'a> {
    pub fn new(game: &'a GameData, log: &'a dyn RuleLog) -> Self {
        Self { game, log }
    }

    /// Entities matching the config's template, component and condition
    /// filters, in entity-list order.
    pub fn matching_entities(&self, config: &DynamicChoiceConfig) -> Vec<&'a Entity> {
        let evaluator = ConditionEvaluator::new(self.game, self.log);
        let game: &'a GameData = self.game;

        game.entities
            .iter()
            .filter(|e| config.source_template_ids.contains(&e.template_id))
            .filter(|e| self.passes_component_filters(e, config))
            .filter(|e| evaluator.evaluate_all_for(&config.filter_conditions, e))
            .collect()
    }

    fn passes_component_filters(&self, entity: &Entity, config: &DynamicChoiceConfig) -> bool {
        if config.required_component_ids.is_empty() && config.excluded_component_ids.is_empty() {
            return true;
        }

        let components = match hierarchy::component_ids(&entity.template_id, &self.game.templates) {
            Ok(components) => components,
            Err(e) => {
                self.log.error(&format!(
                    "dynamic choice: skipping {}: {}",
                    entity.id, e
                ));
                return false;
            }
        };

        config
            .required_component_ids
            .iter()
            .all(|c| components.contains(c))
            && !config
                .excluded_component_ids
                .iter()
                .any(|c| components.contains(c))
    }

    /// One option per matching entity. Outcomes are copied unresolved; the
    /// `<chosen_entity…>` sentinels are bound to `source_entity_id` when the
    /// option is picked.
    pub fn generate(&self, config: &DynamicChoiceConfig) -> Vec<ChoiceOption> {
        let text = OptionText::parse(&config.option_template);
        let options: Vec<ChoiceOption> = self
            .matching_entities(config)
            .into_iter()
            .enumerate()
            .map(|(index, entity)| ChoiceOption {
                id: format!("dynamic_{}_{}", index, entity.id),
                text: text.render(entity),
                conditions: Vec::new(),
                outcomes: config.outcome_templates.clone(),
                next_choice_id: config.next_choice_id.clone(),
                source_entity_id: Some(entity.id.clone()),
            })
            .collect();

        if options.is_empty() {
            self.log.debug("dynamic choice matched no entities");
        }
        options
    }
}

/// Generate dynamic options, logging through `tracing`.
pub fn generate(config: &DynamicChoiceConfig, game: &GameData) -> Vec<ChoiceOption> {
    DynamicChoiceGenerator::new(game, &TracingLog).generate(config)
}

/// The options a player can see on `choice` right now: static options whose
/// conditions all hold, or the generated options of a dynamic choice.
pub fn visible_options(choice: &Choice, game: &GameData, log: &dyn RuleLog) -> Vec<ChoiceOption> {
    match (choice.kind, &choice.dynamic_config) {
        (ChoiceKind::Dynamic, Some(config)) => DynamicChoiceGenerator::new(game, log).generate(config),
        (ChoiceKind::Dynamic, None) => {
            log.warn(&format!(
                "choice {} is dynamic but has no dynamic config",
                choice.id
            ));
            Vec::new()
        }
        (ChoiceKind::Static, _) => {
            let evaluator = ConditionEvaluator::new(game, log);
            choice
                .options
                .iter()
                .filter(|o| evaluator.evaluate_all(&o.conditions))
                .cloned()
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log::{LogLevel, MemoryLog, SilentLog};
    use crate::schema::condition::{ComparisonOperator, Condition};
    use crate::schema::entity::AttributeValue;
    use crate::schema::ids::{ChoiceId, EntityId, TemplateId};
    use crate::schema::outcome::{Outcome, CHOSEN_ENTITY};
    use crate::schema::template::Template;
    use rustc_hash::FxHashSet;

    fn colony() -> GameData {
        let mut game = GameData::default();
        game.templates = vec![
            Template::new("colonist", "Colonist"),
            Template::new("soldier", "Soldier").with_parent("colonist").including("armed"),
            Template::new("veteran", "Veteran").with_parent("soldier"),
            Template::new("medic", "Medic").with_parent("colonist").including("healer"),
            Template::new("animal", "Animal"),
            Template::component("armed", "Armed"),
            Template::component("healer", "Healer"),
        ];
        game.entities = vec![
            Entity::new("c1", "colonist", "Ada").with_value("health", 9i64),
            Entity::new("c2", "soldier", "Bo").with_value("health", 4i64),
            Entity::new("c3", "veteran", "Cy").with_value("health", 8i64),
            Entity::new("c4", "medic", "Di"),
            Entity::new("a1", "animal", "Rex"),
        ];
        game
    }

    fn config(sources: &[&str]) -> DynamicChoiceConfig {
        DynamicChoiceConfig {
            source_template_ids: sources.iter().map(|s| TemplateId::new(*s)).collect(),
            option_template: "Send {entity.name}".to_string(),
            outcome_templates: vec![Outcome::update(
                CHOSEN_ENTITY,
                "job",
                Some(AttributeValue::text("watch")),
            )],
            next_choice_id: Some(ChoiceId::new("night")),
            ..Default::default()
        }
    }

    fn ids(options: &[ChoiceOption]) -> Vec<&str> {
        options
            .iter()
            .filter_map(|o| o.source_entity_id.as_ref().map(|id| id.as_str()))
            .collect()
    }

    #[test]
    fn source_templates_are_ored_by_exact_template() {
        let game = colony();
        let generator = DynamicChoiceGenerator::new(&game, &SilentLog);
        let options = generator.generate(&config(&["colonist", "medic"]));
        assert_eq!(ids(&options), vec!["c1", "c4"]);
    }

    #[test]
    fn required_components_count() {
        let mut game = GameData::default();
        game.templates = vec![
            Template::new("settler", "Settler").including("armed"),
            Template::new("drifter", "Drifter"),
            Template::component("armed", "Armed"),
        ];
        game.entities = vec![
            Entity::new("e1", "settler", "One"),
            Entity::new("e2", "drifter", "Two"),
            Entity::new("e3", "settler", "Three"),
            Entity::new("e4", "drifter", "Four"),
            Entity::new("e5", "settler", "Five"),
        ];
        let mut cfg = config(&["settler", "drifter"]);
        cfg.required_component_ids = vec![TemplateId::new("armed")];

        let options = DynamicChoiceGenerator::new(&game, &SilentLog).generate(&cfg);
        assert_eq!(options.len(), 3);
        let distinct: FxHashSet<_> = options.iter().map(|o| o.source_entity_id.clone()).collect();
        assert_eq!(distinct.len(), 3);
        assert_eq!(ids(&options), vec!["e1", "e3", "e5"]);
    }

    #[test]
    fn required_components_follow_inheritance() {
        let game = colony();
        let mut cfg = config(&["colonist", "soldier", "veteran", "medic"]);
        cfg.required_component_ids = vec![TemplateId::new("armed")];
        let options = DynamicChoiceGenerator::new(&game, &SilentLog).generate(&cfg);
        assert_eq!(ids(&options), vec!["c2", "c3"]);
    }

    #[test]
    fn excluded_components_drop_any_match() {
        let game = colony();
        let mut cfg = config(&["colonist", "soldier", "veteran", "medic"]);
        cfg.excluded_component_ids = vec![TemplateId::new("armed"), TemplateId::new("healer")];
        let options = DynamicChoiceGenerator::new(&game, &SilentLog).generate(&cfg);
        assert_eq!(ids(&options), vec!["c1"]);
    }

    #[test]
    fn filter_conditions_use_candidate_as_self() {
        let game = colony();
        let mut cfg = config(&["colonist", "soldier", "veteran", "medic"]);
        cfg.filter_conditions = vec![
            Condition::attribute("self", "health", ComparisonOperator::Ge, Some(AttributeValue::Number(5.0))),
            Condition::entity_exists("animal", true),
        ];
        let options = DynamicChoiceGenerator::new(&game, &SilentLog).generate(&cfg);
        assert_eq!(ids(&options), vec!["c1", "c3"]);

        cfg.filter_conditions.push(Condition::entity_exists("raider", true));
        assert!(DynamicChoiceGenerator::new(&game, &SilentLog)
            .generate(&cfg)
            .is_empty());
    }

    #[test]
    fn options_carry_text_outcomes_and_next() {
        let game = colony();
        let mut cfg = config(&["soldier", "veteran"]);
        cfg.option_template = "{entity.name} ({entity.attributeValues.health} hp, {entity.attributeValues.rank})".to_string();
        let options = DynamicChoiceGenerator::new(&game, &SilentLog).generate(&cfg);
        assert_eq!(options[0].text, "Bo (4 hp, [rank?])");
        assert_eq!(options[1].text, "Cy (8 hp, [rank?])");
        assert_eq!(options[0].id, "dynamic_0_c2");
        assert_eq!(options[1].id, "dynamic_1_c3");
        assert_eq!(options[0].outcomes, cfg.outcome_templates);
        assert_eq!(options[0].next_choice_id, Some(ChoiceId::new("night")));
        assert_eq!(options[0].source_entity_id, Some(EntityId::new("c2")));
    }

    #[test]
    fn regeneration_is_stable() {
        let game = colony();
        let cfg = config(&["colonist", "soldier"]);
        assert_eq!(generate(&cfg, &game), generate(&cfg, &game));
    }

    #[test]
    fn cyclic_template_entity_is_skipped() {
        let mut game = colony();
        game.templates.push(Template::new("loop", "Loop").with_parent("loop"));
        game.entities.push(Entity::new("z", "loop", "Zed"));
        let mut cfg = config(&["soldier", "loop"]);
        cfg.required_component_ids = vec![TemplateId::new("armed")];
        let log = MemoryLog::new();
        let options = DynamicChoiceGenerator::new(&game, &log).generate(&cfg);
        assert_eq!(ids(&options), vec!["c2"]);
        assert_eq!(log.at_least(LogLevel::Error).len(), 1);
    }

    #[test]
    fn visible_options_for_static_and_dynamic() {
        let game = colony();
        let fixed = Choice::fixed(
            "camp",
            "Camp",
            vec![
                ChoiceOption::new("rest", "Rest"),
                ChoiceOption::new("hunt", "Hunt").when(Condition::entity_exists("animal", true)),
                ChoiceOption::new("flee", "Flee").when(Condition::entity_exists("raider", true)),
            ],
        );
        let shown = visible_options(&fixed, &game, &SilentLog);
        assert_eq!(
            shown.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["rest", "hunt"]
        );

        let dynamic = Choice::dynamic("pick", "Pick", config(&["medic"]));
        let shown = visible_options(&dynamic, &game, &SilentLog);
        assert_eq!(ids(&shown), vec!["c4"]);

        let mut broken = Choice::dynamic("broken", "Broken", config(&["medic"]));
        broken.dynamic_config = None;
        let log = MemoryLog::new();
        assert!(visible_options(&broken, &game, &log).is_empty());
        assert!(log.contains("no dynamic config"));
    }
}
