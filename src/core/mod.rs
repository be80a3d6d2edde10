//! The rule interpreter: hierarchy resolution, condition evaluation,
//! outcome application, dynamic choices, history and playthroughs.

pub mod condition;
pub mod config;
pub mod generator;
pub mod hierarchy;
pub mod history;
pub mod lint;
pub mod log;
pub mod outcome;
pub mod session;
pub mod text;
