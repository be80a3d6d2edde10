//! WASM bindings for choicecraft: powers the in-browser story simulator.

use std::rc::Rc;
use wasm_bindgen::prelude::*;

use choicecraft::core::condition::ConditionEvaluator;
use choicecraft::core::generator::DynamicChoiceGenerator;
use choicecraft::core::hierarchy;
use choicecraft::core::lint::lint;
use choicecraft::core::log::{LogLevel, MemoryLog, SilentLog};
use choicecraft::core::outcome::OutcomeApplier;
use choicecraft::core::session::Playthrough;
use choicecraft::schema::choice::{ChoiceOption, DynamicChoiceConfig};
use choicecraft::schema::condition::Condition;
use choicecraft::schema::game::GameData;
use choicecraft::schema::ids::{EntityId, TemplateId};
use choicecraft::schema::outcome::Outcome;

// ---------------------------------------------------------------------------
// Embedded sample story, compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const OUTPOST_STORY: &str = include_str!("../../demos/outpost.json");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct OptionInfo {
    id: String,
    text: String,
    source_entity_id: Option<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AttributeInfo {
    key: String,
    name: String,
    kind: String,
    defined_by: String,
}

#[derive(serde::Serialize)]
struct LogEntry {
    level: &'static str,
    message: String,
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

fn parse_game(game_json: &str) -> Result<GameData, JsError> {
    GameData::from_json_str(game_json).map_err(|e| JsError::new(&format!("Invalid game JSON: {e}")))
}

fn level_label(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "debug",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

fn option_info(option: &ChoiceOption) -> OptionInfo {
    OptionInfo {
        id: option.id.clone(),
        text: option.text.clone(),
        source_entity_id: option.source_entity_id.as_ref().map(|id| id.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Stateless helpers used by the editor panels
// ---------------------------------------------------------------------------

/// Lint a game document. Returns a JSON array of `{severity, message}`.
#[wasm_bindgen]
pub fn lint_game(game_json: &str) -> Result<String, JsError> {
    let game = parse_game(game_json)?;
    to_json(&lint(&game))
}

/// Evaluate a JSON array of conditions against a game document.
#[wasm_bindgen]
pub fn evaluate_conditions(game_json: &str, conditions_json: &str) -> Result<bool, JsError> {
    let game = parse_game(game_json)?;
    let conditions: Vec<Condition> = serde_json::from_str(conditions_json)
        .map_err(|e| JsError::new(&format!("Invalid conditions JSON: {e}")))?;
    Ok(ConditionEvaluator::new(&game, &SilentLog).evaluate_all(&conditions))
}

/// Preview the options a dynamic choice config would produce.
#[wasm_bindgen]
pub fn preview_dynamic_options(game_json: &str, config_json: &str) -> Result<String, JsError> {
    let game = parse_game(game_json)?;
    let config: DynamicChoiceConfig = serde_json::from_str(config_json)
        .map_err(|e| JsError::new(&format!("Invalid dynamic config JSON: {e}")))?;
    let options = DynamicChoiceGenerator::new(&game, &SilentLog).generate(&config);
    to_json(&options.iter().map(option_info).collect::<Vec<_>>())
}

/// Apply a JSON array of outcomes and return the resulting game document.
#[wasm_bindgen]
pub fn apply_outcomes(
    game_json: &str,
    outcomes_json: &str,
    chosen_entity_id: Option<String>,
    seed: u64,
) -> Result<String, JsError> {
    let game = parse_game(game_json)?;
    let outcomes: Vec<Outcome> = serde_json::from_str(outcomes_json)
        .map_err(|e| JsError::new(&format!("Invalid outcomes JSON: {e}")))?;
    let bound = chosen_entity_id.map(EntityId::new);
    let next = OutcomeApplier::seeded(seed).apply(&game, &outcomes, bound.as_ref(), &SilentLog);
    to_json(&next)
}

/// The flattened attribute table of a template, root to leaf, followed by
/// component attributes.
#[wasm_bindgen]
pub fn resolve_template(game_json: &str, template_id: &str) -> Result<String, JsError> {
    let game = parse_game(game_json)?;
    let resolved = hierarchy::resolve(&TemplateId::new(template_id), &game.templates)
        .map_err(|e| JsError::new(&e.to_string()))?
        .ok_or_else(|| JsError::new(&format!("Unknown template: {template_id}")))?;

    let mut rows: Vec<AttributeInfo> = resolved
        .attributes
        .iter()
        .map(|a| AttributeInfo {
            key: a.definition.id.clone(),
            name: a.definition.name.clone(),
            kind: format!("{:?}", a.definition.kind).to_lowercase(),
            defined_by: a.defined_by.to_string(),
        })
        .collect();
    rows.extend(resolved.component_attributes.iter().map(|c| AttributeInfo {
        key: c.key.clone(),
        name: c.definition.name.clone(),
        kind: format!("{:?}", c.definition.kind).to_lowercase(),
        defined_by: c.component_id.to_string(),
    }));
    to_json(&rows)
}

/// The bundled sample story as JSON.
#[wasm_bindgen]
pub fn sample_story() -> String {
    data::OUTPOST_STORY.to_string()
}

// ---------------------------------------------------------------------------
// StoryPlayer: the simulator panel
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct StoryPlayer {
    run: Playthrough,
    log: Rc<MemoryLog>,
}

#[wasm_bindgen]
impl StoryPlayer {
    /// Start a playthrough of a game document.
    #[wasm_bindgen(constructor)]
    pub fn new(game_json: &str, seed: u64) -> Result<StoryPlayer, JsError> {
        let game = parse_game(game_json)?;
        let log = Rc::new(MemoryLog::new());
        let run = Playthrough::builder()
            .seed(seed)
            .log(Rc::clone(&log))
            .build(&game)
            .map_err(|e| JsError::new(&format!("Playthrough error: {e}")))?;
        Ok(StoryPlayer { run, log })
    }

    /// JSON `{id, title, description}` of the current node, or `null` once
    /// the story has ended.
    pub fn current_choice(&self) -> Result<String, JsError> {
        let choice = self.run.current_choice().map(|c| {
            serde_json::json!({
                "id": c.id.as_str(),
                "title": c.title,
                "description": c.description,
            })
        });
        to_json(&choice)
    }

    /// JSON array of the options visible right now.
    pub fn options(&self) -> Result<String, JsError> {
        let options = self.run.visible_options();
        to_json(&options.iter().map(option_info).collect::<Vec<_>>())
    }

    pub fn choose(&mut self, option_id: &str) -> Result<(), JsError> {
        self.run
            .choose(option_id)
            .map(|_| ())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn undo(&mut self) {
        self.run.undo();
    }

    pub fn redo(&mut self) {
        self.run.redo();
    }

    pub fn can_undo(&self) -> bool {
        self.run.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.run.can_redo()
    }

    pub fn restart(&mut self) {
        self.run.restart();
    }

    pub fn is_finished(&self) -> bool {
        self.run.is_finished()
    }

    /// The whole current play state as JSON.
    pub fn state(&self) -> Result<String, JsError> {
        to_json(self.run.state())
    }

    /// Drain diagnostics logged since the last call.
    pub fn take_log(&self) -> Result<String, JsError> {
        let entries: Vec<LogEntry> = self
            .log
            .take()
            .into_iter()
            .map(|(level, message)| LogEntry {
                level: level_label(level),
                message,
            })
            .collect();
        to_json(&entries)
    }
}
