//! Plain data types for game documents: templates, entities, conditions,
//! outcomes and choices, serialized in the editor's JSON shape.

pub mod choice;
pub mod condition;
pub mod entity;
pub mod game;
pub mod ids;
pub mod outcome;
pub mod template;
