//! Statechart Data Structures
//! The vertex tree (states and pseudo-states) and the behaviors attached to it

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

mod definition;
pub mod trigger;


pub use definition::{BehaviorDefinition, DefinitionError, FsmDefinition, VertexDefinition};
pub use trigger::{TRIGGER_DO, TRIGGER_ENTER, TRIGGER_EXIT};

/// Stable index of a vertex inside a [`StateMachine`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a vertex is. Each variant only carries the fields meaningful to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexKind {
    /// The state machine itself. Never exited.
    Root { name: String },
    /// A user named state with implicit `enter`/`exit` triggers
    NamedState { name: String },
    /// Initial pseudo-state of its parent
    InitialState,
    /// Choice (junction) pseudo-state
    ChoicePoint { label: String },
    /// Entry point pseudo-state
    EntryPoint { label: String },
    /// Exit point pseudo-state
    ExitPoint { label: String },
    /// Final state marker of its parent
    FinalState,
}

impl VertexKind {
    /// Root, named and final states can be entered, exited and identified at run time.
    pub fn is_state(&self) -> bool {
        matches!(
            self,
            VertexKind::Root { .. } | VertexKind::NamedState { .. } | VertexKind::FinalState
        )
    }

    pub fn is_pseudo_state(&self) -> bool {
        !self.is_state()
    }

    pub fn is_exit_point(&self) -> bool {
        matches!(self, VertexKind::ExitPoint { .. })
    }

    pub fn is_initial_state(&self) -> bool {
        matches!(self, VertexKind::InitialState)
    }
}

/// A node of the state tree
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Vertex variant
    pub kind: VertexKind,
    /// Parent vertex (lookup only, `None` for the root)
    pub parent: Option<VertexId>,
    /// Children in declaration order
    pub children: Vec<VertexId>,
    /// Behaviors in declaration order
    pub behaviors: Vec<Behavior>,
}

/// A reactive rule attached to a vertex: triggers, guard, action and transition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Behavior {
    /// Vertex that owns this behavior
    pub owner: VertexId,
    /// Sanitized trigger names (may include `enter`, `exit`, `do`)
    pub triggers: Vec<String>,
    /// Guard expression source
    pub guard: Option<String>,
    /// Action source
    pub action: Option<String>,
    /// Transition target
    pub target: Option<VertexId>,
}

impl Default for VertexId {
    fn default() -> Self {
        VertexId(0)
    }
}

impl Behavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trigger(mut self, trigger: impl AsRef<str>) -> Self {
        let trigger = trigger::sanitize_trigger_name(trigger.as_ref());
        if !self.triggers.contains(&trigger) {
            self.triggers.push(trigger);
        }
        self
    }

    pub fn with_guard(mut self, guard: impl Into<String>) -> Self {
        self.guard = Some(guard.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_transition(mut self, target: VertexId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn has_transition(&self) -> bool {
        self.target.is_some()
    }

    pub fn has_guard_code(&self) -> bool {
        self.guard.as_deref().is_some_and(|g| !g.trim().is_empty())
    }

    pub fn has_action_code(&self) -> bool {
        self.action.as_deref().is_some_and(|a| !a.trim().is_empty())
    }

    pub fn handles_trigger(&self, trigger: &str) -> bool {
        self.triggers.iter().any(|t| t == trigger)
    }

    /// Action code on one line, for use inside generated comments
    pub fn single_line_action_code(&self) -> String {
        self.action
            .as_deref()
            .unwrap_or("")
            .trim()
            .replace("\r\n", "\\n")
            .replace('\n', "\\n")
    }
}

/// A whole statechart: an arena of vertices rooted at [`StateMachine::root`]
#[derive(Debug, Clone)]
pub struct StateMachine {
    vertices: Vec<Vertex>,
}

impl StateMachine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            vertices: vec![Vertex {
                kind: VertexKind::Root { name: name.into() },
                parent: None,
                children: Vec::new(),
                behaviors: Vec::new(),
            }],
        }
    }

    /// State machine name (the root's name)
    pub fn name(&self) -> &str {
        match &self.vertices[0].kind {
            VertexKind::Root { name } => name,
            _ => "",
        }
    }

    pub fn root(&self) -> VertexId {
        VertexId(0)
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.0]
    }

    pub fn kind(&self, id: VertexId) -> &VertexKind {
        &self.vertex(id).kind
    }

    pub fn parent(&self, id: VertexId) -> Option<VertexId> {
        self.vertex(id).parent
    }

    pub fn children(&self, id: VertexId) -> &[VertexId] {
        &self.vertex(id).children
    }

    pub fn behaviors(&self, id: VertexId) -> &[Behavior] {
        &self.vertex(id).behaviors
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId)
    }

    // ========================================================================
    // BUILDING
    // ========================================================================

    fn add_vertex(&mut self, parent: VertexId, kind: VertexKind) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            behaviors: Vec::new(),
        });
        self.vertices[parent.0].children.push(id);
        id
    }

    pub fn add_state(&mut self, parent: VertexId, name: impl Into<String>) -> VertexId {
        self.add_vertex(parent, VertexKind::NamedState { name: name.into() })
    }

    pub fn add_initial_state(&mut self, parent: VertexId) -> VertexId {
        self.add_vertex(parent, VertexKind::InitialState)
    }

    pub fn add_choice_point(&mut self, parent: VertexId, label: impl Into<String>) -> VertexId {
        self.add_vertex(parent, VertexKind::ChoicePoint { label: label.into() })
    }

    pub fn add_entry_point(&mut self, parent: VertexId, label: impl Into<String>) -> VertexId {
        self.add_vertex(parent, VertexKind::EntryPoint { label: label.into() })
    }

    pub fn add_exit_point(&mut self, parent: VertexId, label: impl Into<String>) -> VertexId {
        self.add_vertex(parent, VertexKind::ExitPoint { label: label.into() })
    }

    pub fn add_final_state(&mut self, parent: VertexId) -> VertexId {
        self.add_vertex(parent, VertexKind::FinalState)
    }

    /// Attach a behavior to `owner`. The behavior's `owner` field is overwritten.
    pub fn add_behavior(&mut self, owner: VertexId, mut behavior: Behavior) {
        behavior.owner = owner;
        self.vertices[owner.0].behaviors.push(behavior);
    }

    // ========================================================================
    // TREE QUERIES
    // ========================================================================

    /// `id` followed by its parent, grandparent... up to the root
    pub fn ancestors_and_self(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        std::iter::successors(Some(id), move |v| self.parent(*v))
    }

    /// Proper ancestors of `id`, nearest first
    pub fn ancestors(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.ancestors_and_self(id).skip(1)
    }

    pub fn depth(&self, id: VertexId) -> usize {
        self.ancestors(id).count()
    }

    /// True if `ancestor` is `id` or above it
    pub fn is_ancestor_or_self(&self, ancestor: VertexId, id: VertexId) -> bool {
        self.ancestors_and_self(id).any(|v| v == ancestor)
    }

    /// Nearest proper ancestor with a behavior reacting to `trigger`
    pub fn first_ancestor_that_handles_event(&self, id: VertexId, trigger: &str) -> Option<VertexId> {
        self.ancestors(id)
            .find(|a| self.behaviors(*a).iter().any(|b| b.handles_trigger(trigger)))
    }

    /// The initial state child of `id`, if any
    pub fn initial_state_of(&self, id: VertexId) -> Option<VertexId> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.kind(*c).is_initial_state())
    }

    /// Behaviors of `id` whose triggers include `trigger`, in declaration order
    pub fn behaviors_with_trigger<'a>(
        &'a self,
        id: VertexId,
        trigger: &'a str,
    ) -> impl Iterator<Item = &'a Behavior> + 'a {
        self.behaviors(id).iter().filter(move |b| b.handles_trigger(trigger))
    }

    /// Events handled by `id`'s own behaviors. Excludes `enter` and `exit`.
    pub fn events_of(&self, id: VertexId) -> BTreeSet<String> {
        self.behaviors(id)
            .iter()
            .flat_map(|b| b.triggers.iter())
            .filter(|t| trigger::is_event(t))
            .cloned()
            .collect()
    }

    /// Every event used anywhere in the machine. `do` is always present.
    pub fn all_events(&self) -> BTreeSet<String> {
        let mut events: BTreeSet<String> = self.vertex_ids().flat_map(|v| self.events_of(v)).collect();
        events.insert(TRIGGER_DO.to_string());
        events
    }

    /// State vertices (root, named, final) depth first, siblings ordered by description
    pub fn states_depth_first(&self) -> Vec<VertexId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if !self.kind(id).is_state() {
                continue;
            }
            out.push(id);
            let mut children: Vec<VertexId> = self.children(id).to_vec();
            children.sort_by_key(|c| self.describe(*c));
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Pseudo-state children of `id` ordered by description
    pub fn pseudo_state_children(&self, id: VertexId) -> Vec<VertexId> {
        let mut children: Vec<VertexId> = self
            .children(id)
            .iter()
            .copied()
            .filter(|c| self.kind(*c).is_pseudo_state())
            .collect();
        children.sort_by_key(|c| self.describe(*c));
        children
    }

    // ========================================================================
    // DESCRIPTIONS
    // ========================================================================

    /// Stable, human readable vertex name. Also used to reference transition targets.
    pub fn describe(&self, id: VertexId) -> String {
        let parent = || {
            self.parent(id)
                .map(|p| self.describe(p))
                .unwrap_or_else(|| "?".to_string())
        };
        match self.kind(id) {
            VertexKind::Root { .. } => "ROOT".to_string(),
            VertexKind::NamedState { name } => name.clone(),
            VertexKind::InitialState => format!("{}.InitialState", parent()),
            VertexKind::ChoicePoint { label } => format!("{}.ChoicePoint({})", parent(), label),
            VertexKind::EntryPoint { label } => format!("{}.EntryPoint({})", parent(), label),
            VertexKind::ExitPoint { label } => format!("{}.ExitPoint({})", parent(), label),
            VertexKind::FinalState => format!("{}.FinalState", parent()),
        }
    }

    /// Format a behavior the way it would be written on a diagram
    pub fn describe_behavior_as_uml(&self, behavior: &Behavior) -> String {
        let mut parts = Vec::new();

        match behavior.triggers.len() {
            0 => {}
            1 => parts.push(behavior.triggers[0].clone()),
            _ => parts.push(format!("({})", behavior.triggers.join(", "))),
        }

        if let Some(guard) = behavior.guard.as_deref().filter(|g| !g.trim().is_empty()) {
            parts.push(format!("[{}]", guard.trim()));
        }

        if behavior.has_action_code() {
            parts.push(format!("/ {{ {} }}", behavior.single_line_action_code()));
        }

        if let Some(target) = behavior.target {
            parts.push(format!("TransitionTo({})", self.describe(target)));
        }

        parts.join(" ")
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    /// Check the structural invariants the compiler relies on
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.initial_state_of(self.root()).is_none() {
            errors.push("State machine root has no initial state".to_string());
        }

        for id in self.vertex_ids() {
            let vertex = self.vertex(id);
            let name = self.describe(id);

            let initial_count = vertex
                .children
                .iter()
                .filter(|c| self.kind(**c).is_initial_state())
                .count();
            if initial_count > 1 {
                errors.push(format!("`{}` has {} initial states", name, initial_count));
            }

            match &vertex.kind {
                VertexKind::Root { .. } | VertexKind::NamedState { .. } => {
                    for behavior in &vertex.behaviors {
                        if behavior.triggers.is_empty() {
                            errors.push(format!(
                                "`{}` behavior `{}` has no trigger",
                                name,
                                self.describe_behavior_as_uml(behavior)
                            ));
                        }
                        if behavior.has_transition() && behavior.handles_trigger(TRIGGER_EXIT) {
                            errors.push(format!(
                                "`{}` behavior `{}` transitions from an exit trigger",
                                name,
                                self.describe_behavior_as_uml(behavior)
                            ));
                        }
                    }
                }
                VertexKind::FinalState => {
                    if !vertex.behaviors.is_empty() {
                        errors.push(format!("Final state `{}` cannot have behaviors", name));
                    }
                }
                _ => {
                    if vertex.behaviors.is_empty() {
                        errors.push(format!("Pseudo state `{}` has no transition", name));
                    }
                    for behavior in &vertex.behaviors {
                        if !behavior.has_transition() {
                            errors.push(format!(
                                "Pseudo state `{}` behavior `{}` must have a transition",
                                name,
                                self.describe_behavior_as_uml(behavior)
                            ));
                        }
                    }
                }
            }

            if !vertex.kind.is_state() || matches!(vertex.kind, VertexKind::FinalState) {
                if !vertex.children.is_empty() {
                    errors.push(format!("`{}` cannot have children", name));
                }
            }

            if vertex.kind.is_initial_state() {
                if let Some(parent) = vertex.parent {
                    for behavior in &vertex.behaviors {
                        let Some(target) = behavior.target else { continue };
                        if target == parent || !self.is_ancestor_or_self(parent, target) {
                            errors.push(format!(
                                "Initial state `{}` must target a vertex inside `{}`, not `{}`",
                                name,
                                self.describe(parent),
                                self.describe(target)
                            ));
                        }
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
