/// Authoring-time checks for game documents.
///
/// The interpreter tolerates every problem reported here at play time by
/// degrading (hidden options, skipped outcomes). Lint is where those
/// problems are surfaced to the author instead.
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;
use std::hash::Hash;

use crate::core::hierarchy;
use crate::core::text::OptionText;
use crate::schema::choice::{Choice, ChoiceKind};
use crate::schema::condition::Condition;
use crate::schema::game::GameData;
use crate::schema::ids::ChoiceId;
use crate::schema::outcome::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub severity: Severity,
    pub message: String,
}

impl LintIssue {
    fn error(message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
        }
    }

    fn warning(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
        }
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "ERROR: {}", self.message),
            Severity::Warning => write!(f, "WARNING: {}", self.message),
        }
    }
}

/// Run every check over `game`.
pub fn lint(game: &GameData) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    check_duplicates(game, &mut issues);
    check_templates(game, &mut issues);
    check_entities(game, &mut issues);
    check_choices(game, &mut issues);
    issues
}

pub fn has_errors(issues: &[LintIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

fn duplicates<'a, T, I>(ids: I) -> Vec<&'a T>
where
    T: Eq + Hash + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen = FxHashSet::default();
    let mut reported = FxHashSet::default();
    let mut dupes = Vec::new();
    for id in ids {
        if !seen.insert(id) && reported.insert(id) {
            dupes.push(id);
        }
    }
    dupes
}

fn check_duplicates(game: &GameData, issues: &mut Vec<LintIssue>) {
    for id in duplicates(game.templates.iter().map(|t| &t.id)) {
        issues.push(LintIssue::error(format!("duplicate template id '{}'", id)));
    }
    for id in duplicates(game.entities.iter().map(|e| &e.id)) {
        issues.push(LintIssue::error(format!("duplicate entity id '{}'", id)));
    }
    for id in duplicates(game.choices.iter().map(|c| &c.id)) {
        issues.push(LintIssue::error(format!("duplicate choice id '{}'", id)));
    }
}

fn check_templates(game: &GameData, issues: &mut Vec<LintIssue>) {
    for error in hierarchy::find_cycles(&game.templates) {
        issues.push(LintIssue::error(error.to_string()));
    }

    for template in &game.templates {
        if let Some(ref parent) = template.parent_id {
            if game.template(parent).is_none() {
                issues.push(LintIssue::warning(format!(
                    "template '{}' has unknown parent '{}'",
                    template.id, parent
                )));
            }
        }
        for component in &template.included_component_ids {
            match game.template(component) {
                None => issues.push(LintIssue::warning(format!(
                    "template '{}' includes unknown component '{}'",
                    template.id, component
                ))),
                Some(t) if !t.is_component => issues.push(LintIssue::warning(format!(
                    "template '{}' includes '{}', which is not flagged as a component",
                    template.id, component
                ))),
                Some(_) => {}
            }
        }
        for id in duplicates(template.attributes.iter().map(|a| &a.id)) {
            issues.push(LintIssue::warning(format!(
                "template '{}' declares attribute '{}' more than once",
                template.id, id
            )));
        }
    }
}

fn check_entities(game: &GameData, issues: &mut Vec<LintIssue>) {
    for entity in &game.entities {
        match game.template(&entity.template_id) {
            None => issues.push(LintIssue::warning(format!(
                "entity '{}' uses unknown template '{}'",
                entity.id, entity.template_id
            ))),
            Some(t) if t.is_component => issues.push(LintIssue::error(format!(
                "entity '{}' instantiates component '{}'",
                entity.id, entity.template_id
            ))),
            Some(_) => {}
        }
    }
}

fn check_conditions(context: &str, conditions: &[Condition], issues: &mut Vec<LintIssue>) {
    for condition in conditions {
        if matches!(condition, Condition::Unknown) {
            issues.push(LintIssue::warning(format!(
                "{}: unknown condition type (always false)",
                context
            )));
        }
    }
}

fn check_outcomes(context: &str, outcomes: &[Outcome], bound: bool, issues: &mut Vec<LintIssue>) {
    for outcome in outcomes {
        if matches!(outcome, Outcome::Unknown) {
            issues.push(LintIssue::warning(format!(
                "{}: unknown outcome type (ignored)",
                context
            )));
        }
        if !bound && outcome.has_placeholder() {
            issues.push(LintIssue::error(format!(
                "{}: {} uses a chosen-entity placeholder but the option is not generated from an entity",
                context,
                outcome.kind()
            )));
        }
    }
}

fn check_choices(game: &GameData, issues: &mut Vec<LintIssue>) {
    if let Some(ref start) = game.start_choice_id {
        if game.choice(start).is_none() {
            issues.push(LintIssue::warning(format!("start choice '{}' does not exist", start)));
        }
    }

    let next_exists = |next: &Option<ChoiceId>| match next {
        Some(id) => game.choice(id).is_some(),
        None => true,
    };

    for choice in &game.choices {
        check_choice(game, choice, issues);
        for option in &choice.options {
            if !next_exists(&option.next_choice_id) {
                issues.push(LintIssue::warning(format!(
                    "choice '{}' option '{}' leads to unknown choice '{}'",
                    choice.id,
                    option.id,
                    option.next_choice_id.as_ref().map(|c| c.as_str()).unwrap_or_default()
                )));
            }
        }
        if let Some(ref config) = choice.dynamic_config {
            if !next_exists(&config.next_choice_id) {
                issues.push(LintIssue::warning(format!(
                    "dynamic choice '{}' leads to unknown choice '{}'",
                    choice.id,
                    config.next_choice_id.as_ref().map(|c| c.as_str()).unwrap_or_default()
                )));
            }
        }
    }
}

fn check_choice(game: &GameData, choice: &Choice, issues: &mut Vec<LintIssue>) {
    match (choice.kind, &choice.dynamic_config) {
        (ChoiceKind::Dynamic, None) => issues.push(LintIssue::error(format!(
            "choice '{}' is dynamic but has no dynamic config",
            choice.id
        ))),
        (ChoiceKind::Dynamic, Some(config)) => {
            let context = format!("dynamic choice '{}'", choice.id);
            if config.source_template_ids.is_empty() {
                issues.push(LintIssue::warning(format!(
                    "{} has no source templates and will never show options",
                    context
                )));
            }
            for source in &config.source_template_ids {
                if game.template(source).is_none() {
                    issues.push(LintIssue::warning(format!(
                        "{} draws from unknown template '{}'",
                        context, source
                    )));
                }
            }
            for component in config
                .required_component_ids
                .iter()
                .chain(config.excluded_component_ids.iter())
            {
                if game.template(component).is_none() {
                    issues.push(LintIssue::warning(format!(
                        "{} filters on unknown component '{}'",
                        context, component
                    )));
                }
            }
            let declared: FxHashSet<String> = config
                .source_template_ids
                .iter()
                .filter_map(|id| hierarchy::resolve(id, &game.templates).ok().flatten())
                .flat_map(|resolved| resolved.attribute_keys())
                .collect();
            if !declared.is_empty() {
                for key in OptionText::parse(&config.option_template).referenced_keys() {
                    if !declared.contains(key) {
                        issues.push(LintIssue::warning(format!(
                            "{} option text reads '{}', which no source template declares",
                            context, key
                        )));
                    }
                }
            }
            check_conditions(&context, &config.filter_conditions, issues);
            check_outcomes(&context, &config.outcome_templates, true, issues);
        }
        (ChoiceKind::Static, _) => {
            for option in &choice.options {
                let context = format!("choice '{}' option '{}'", choice.id, option.id);
                check_conditions(&context, &option.conditions, issues);
                check_outcomes(&context, &option.outcomes, false, issues);
            }
        }
    }
}
