//! Choicecraft: the rule engine behind branching colony-sim stories.
//!
//! Designers describe templates (with single inheritance and component
//! mixins), entities, and choices whose options carry conditions and
//! outcomes. The engine answers read-only questions about a snapshot
//! (which options are visible, which entities a dynamic choice offers),
//! produces new snapshots from outcome lists, and keeps undoable history.

pub mod core;
pub mod schema;
