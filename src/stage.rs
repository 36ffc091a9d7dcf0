//! Release-stage visibility filtering.
//!
//! Schema nodes may carry an `x-stage` marker naming the release stage they
//! ship in. Requesting documentation at a stage shows everything shipped by
//! that stage: a node marked `beta` appears in the `beta` and `stable`
//! views but not in the `draft` view. Unmarked nodes are always visible.

use serde::{Deserialize, Serialize};

use crate::schema::SchemaNode;

/// A release stage, ordered by rollout: `draft` ships first, `stable` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Draft,
    Beta,
    Stable,
}

impl Stage {
    /// Parse a stage token, case-insensitively.
    ///
    /// Returns `None` for unknown values (caller should error).
    pub fn parse(s: &str) -> Option<Stage> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Stage::Draft),
            "beta" => Some(Stage::Beta),
            "stable" => Some(Stage::Stable),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Draft => "draft",
            Stage::Beta => "beta",
            Stage::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a schema node is visible at the requested stage.
///
/// Pure predicate: visible iff the requested stage rank is at least the
/// node's marker rank; absence of a marker means always visible. Applied to
/// property-level entries only; composite branches are always walked.
pub fn should_show_in_stage(stage: Stage, schema: &SchemaNode) -> bool {
    match schema {
        SchemaNode::Boolean(_) => true,
        SchemaNode::Object(obj) => obj.stage.map_or(true, |marker| stage >= marker),
    }
}
