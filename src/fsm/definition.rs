//! Serializable model documents
//! A nested, human editable description of a statechart that builds into a [`StateMachine`]

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Behavior, StateMachine, VertexId};

#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("`{owner}` transitions to unknown vertex `{target}`")]
    UnknownTarget { owner: String, target: String },
    #[error("Vertex `{0}` is declared more than once")]
    DuplicateVertex(String),
    #[error("Invalid model document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not read model document: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// DOCUMENT TYPES
// ============================================================================

/// Top level model document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsmDefinition {
    /// State machine name
    pub name: String,
    /// Optional description (not used by generation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Behaviors owned by the root
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<BehaviorDefinition>,
    /// Children of the root
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<VertexDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VertexDefinition {
    State {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        behaviors: Vec<BehaviorDefinition>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        vertices: Vec<VertexDefinition>,
    },
    InitialState {
        #[serde(default)]
        behaviors: Vec<BehaviorDefinition>,
    },
    ChoicePoint {
        label: String,
        #[serde(default)]
        behaviors: Vec<BehaviorDefinition>,
    },
    EntryPoint {
        label: String,
        #[serde(default)]
        behaviors: Vec<BehaviorDefinition>,
    },
    ExitPoint {
        label: String,
        #[serde(default)]
        behaviors: Vec<BehaviorDefinition>,
    },
    FinalState,
}

/// A behavior. `target` names a vertex by its description (`State2`, `ROOT.InitialState`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorDefinition {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl FsmDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            behaviors: Vec::new(),
            vertices: Vec::new(),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String, DefinitionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the vertex arena, then resolve every transition target
    pub fn build(&self) -> Result<StateMachine, DefinitionError> {
        let mut sm = StateMachine::new(self.name.clone());
        let root = sm.root();

        let mut pending: Vec<(VertexId, &BehaviorDefinition)> = Vec::new();
        pending.extend(self.behaviors.iter().map(|b| (root, b)));
        for vertex in &self.vertices {
            add_vertex_definition(&mut sm, root, vertex, &mut pending);
        }

        let mut by_name: BTreeMap<String, VertexId> = BTreeMap::new();
        for id in sm.vertex_ids() {
            let name = sm.describe(id);
            if by_name.insert(name.clone(), id).is_some() {
                return Err(DefinitionError::DuplicateVertex(name));
            }
        }

        for (owner, def) in pending {
            let behavior = def.to_behavior(&sm, owner, &by_name)?;
            sm.add_behavior(owner, behavior);
        }

        log::debug!(
            "Built state machine `{}` with {} vertices",
            sm.name(),
            sm.vertex_count()
        );
        Ok(sm)
    }
}

impl BehaviorDefinition {
    fn to_behavior(
        &self,
        sm: &StateMachine,
        owner: VertexId,
        by_name: &BTreeMap<String, VertexId>,
    ) -> Result<Behavior, DefinitionError> {
        let mut behavior = Behavior::new();
        for trigger in &self.triggers {
            behavior = behavior.with_trigger(trigger);
        }
        if let Some(guard) = &self.guard {
            behavior = behavior.with_guard(guard.clone());
        }
        if let Some(action) = &self.action {
            behavior = behavior.with_action(action.clone());
        }
        if let Some(target) = &self.target {
            let id = by_name
                .get(target.trim())
                .copied()
                .ok_or_else(|| DefinitionError::UnknownTarget {
                    owner: sm.describe(owner),
                    target: target.clone(),
                })?;
            behavior = behavior.with_transition(id);
        }
        Ok(behavior)
    }
}

fn add_vertex_definition<'a>(
    sm: &mut StateMachine,
    parent: VertexId,
    def: &'a VertexDefinition,
    pending: &mut Vec<(VertexId, &'a BehaviorDefinition)>,
) {
    let (id, behaviors) = match def {
        VertexDefinition::State { name, behaviors, vertices } => {
            let id = sm.add_state(parent, name.clone());
            pending.extend(behaviors.iter().map(|b| (id, b)));
            for child in vertices {
                add_vertex_definition(sm, id, child, pending);
            }
            return;
        }
        VertexDefinition::InitialState { behaviors } => (sm.add_initial_state(parent), behaviors),
        VertexDefinition::ChoicePoint { label, behaviors } => {
            (sm.add_choice_point(parent, label.clone()), behaviors)
        }
        VertexDefinition::EntryPoint { label, behaviors } => {
            (sm.add_entry_point(parent, label.clone()), behaviors)
        }
        VertexDefinition::ExitPoint { label, behaviors } => {
            (sm.add_exit_point(parent, label.clone()), behaviors)
        }
        VertexDefinition::FinalState => {
            sm.add_final_state(parent);
            return;
        }
    };
    pending.extend(behaviors.iter().map(|b| (id, b)));
}
