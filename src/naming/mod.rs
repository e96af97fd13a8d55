//! Identifier mangling
//! Every name the generated code declares comes from a [`NameMangler`]

use std::collections::BTreeMap;

use thiserror::Error;

use crate::fsm::{StateMachine, VertexId, VertexKind};


#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("Generated {category} name `{name}` is used by both `{first}` and `{second}`")]
    Collision {
        category: &'static str,
        name: String,
        first: String,
        second: String,
    },
}

pub type NamingResult<T> = Result<T, NamingError>;

/// Names used by the generated state machine.
///
/// Implementors must return stable names: the same input always maps to the same identifier
/// for a whole generation run.
pub trait NameMangler {
    /// snake_case base name of a state vertex (`state1`, `root`, `state1_final`)
    fn state_name(&self, sm: &StateMachine, state: VertexId) -> String;

    fn sm_type_name(&self, sm: &StateMachine) -> String {
        to_pascal_case(&to_snake_case(&sanitize_identifier(sm.name())))
    }

    fn sm_event_enum_type(&self, sm: &StateMachine) -> String {
        format!("{}EventId", self.sm_type_name(sm))
    }

    fn sm_state_enum_type(&self, sm: &StateMachine) -> String {
        format!("{}StateId", self.sm_type_name(sm))
    }

    fn sm_func_enum_type(&self, sm: &StateMachine) -> String {
        format!("{}Func", self.sm_type_name(sm))
    }

    fn sm_vars_type(&self, sm: &StateMachine) -> String {
        format!("{}Vars", self.sm_type_name(sm))
    }

    fn event_id_count_const(&self, sm: &StateMachine) -> String {
        format!("{}_EVENT_ID_COUNT", to_snake_case(&self.sm_type_name(sm)).to_uppercase())
    }

    fn state_id_count_const(&self, sm: &StateMachine) -> String {
        format!("{}_STATE_ID_COUNT", to_snake_case(&self.sm_type_name(sm)).to_uppercase())
    }

    fn state_enum_member(&self, sm: &StateMachine, state: VertexId) -> String {
        to_pascal_case(&self.state_name(sm, state))
    }

    fn event_enum_member(&self, event: &str) -> String {
        to_pascal_case(&event_name(event))
    }

    fn state_enter_fn(&self, sm: &StateMachine, state: VertexId) -> String {
        format!("{}_enter", self.state_name(sm, state))
    }

    fn state_exit_fn(&self, sm: &StateMachine, state: VertexId) -> String {
        format!("{}_exit", self.state_name(sm, state))
    }

    fn trigger_handler_fn(&self, sm: &StateMachine, state: VertexId, event: &str) -> String {
        format!("{}_{}", self.state_name(sm, state), event_name(event))
    }

    /// Handler reference variant for a state's exit function
    fn exit_handler_variant(&self, sm: &StateMachine, state: VertexId) -> String {
        to_pascal_case(&self.state_exit_fn(sm, state))
    }

    /// Handler reference variant for a state's event handler
    fn event_handler_variant(&self, sm: &StateMachine, state: VertexId, event: &str) -> String {
        to_pascal_case(&self.trigger_handler_fn(sm, state, event))
    }

    /// Shared transition function of a pseudo-state
    fn pseudo_state_fn(&self, sm: &StateMachine, pseudo_state: VertexId) -> String {
        let parent = sm
            .parent(pseudo_state)
            .map(|p| self.state_name(sm, p))
            .unwrap_or_else(|| "root".to_string());
        let kind = match sm.kind(pseudo_state) {
            VertexKind::InitialState => "initial_state".to_string(),
            VertexKind::ChoicePoint { label } => format!("choice_point_{}", label_name(label)),
            VertexKind::EntryPoint { label } => format!("entry_point_{}", label_name(label)),
            VertexKind::ExitPoint { label } => format!("exit_point_{}", label_name(label)),
            VertexKind::Root { .. } | VertexKind::NamedState { .. } | VertexKind::FinalState => {
                self.state_name(sm, pseudo_state)
            }
        };
        format!("{}_{}_transition", parent, kind.trim_end_matches('_'))
    }

    fn ancestor_event_handler_field(&self) -> &'static str {
        "ancestor_event_handler"
    }

    fn current_event_handlers_field(&self) -> &'static str {
        "current_event_handlers"
    }

    fn current_state_exit_handler_field(&self) -> &'static str {
        "current_state_exit_handler"
    }

    fn state_id_field(&self) -> &'static str {
        "state_id"
    }

    fn vars_field(&self) -> &'static str {
        "vars"
    }

    fn exit_up_to_state_handler_fn(&self) -> &'static str {
        "exit_up_to_state_handler"
    }

    fn call_handler_fn(&self) -> &'static str {
        "call_handler"
    }

    /// Functions every generated machine declares regardless of its states
    fn fixed_fn_names(&self) -> Vec<&'static str> {
        vec![
            "new",
            "start",
            "dispatch_event",
            self.exit_up_to_state_handler_fn(),
            self.call_handler_fn(),
            "state_id_to_string",
            "event_id_to_string",
        ]
    }
}

/// Rust identifiers: snake_case functions, PascalCase types and variants
#[derive(Debug, Clone, Default)]
pub struct RustNameMangler;

impl NameMangler for RustNameMangler {
    fn state_name(&self, sm: &StateMachine, state: VertexId) -> String {
        match sm.kind(state) {
            VertexKind::Root { .. } => "root".to_string(),
            VertexKind::NamedState { name } => to_snake_case(&sanitize_identifier(name)),
            VertexKind::FinalState => {
                let parent = sm
                    .parent(state)
                    .map(|p| self.state_name(sm, p))
                    .unwrap_or_else(|| "root".to_string());
                format!("{}_final", parent)
            }
            _ => to_snake_case(&sanitize_identifier(&sm.describe(state))),
        }
    }
}

// ============================================================================
// CASE CONVERSION
// ============================================================================

/// Replace every character that cannot appear in an identifier with `_`
pub fn sanitize_identifier(s: &str) -> String {
    let mut out: String = s
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Convert PascalCase/camelCase to snake_case. Runs of capitals stay together (`HTTPServer` -> `http_server`).
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::new();
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    let mut collapsed = String::new();
    for c in result.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }
    let trimmed = collapsed.trim_matches('_');
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("n{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Convert snake_case to PascalCase
pub fn to_pascal_case(s: &str) -> String {
    let mut pascal = String::new();
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            pascal.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            pascal.push(c);
        }
    }
    if pascal.is_empty() {
        "Unnamed".to_string()
    } else {
        pascal
    }
}

fn event_name(event: &str) -> String {
    to_snake_case(&sanitize_identifier(event))
}

fn label_name(label: &str) -> String {
    to_snake_case(&sanitize_identifier(label))
}

// ============================================================================
// COLLISION CHECK
// ============================================================================

struct NameTable {
    category: &'static str,
    owners: BTreeMap<String, String>,
}

impl NameTable {
    fn new(category: &'static str) -> Self {
        Self {
            category,
            owners: BTreeMap::new(),
        }
    }

    fn claim(&mut self, name: String, owner: String) -> NamingResult<()> {
        match self.owners.get(&name) {
            Some(first) if *first != owner => Err(NamingError::Collision {
                category: self.category,
                name,
                first: first.clone(),
                second: owner,
            }),
            Some(_) => Ok(()),
            None => {
                self.owners.insert(name, owner);
                Ok(())
            }
        }
    }
}

/// Fail if two distinct model elements would be given the same generated identifier
pub fn check_name_collisions(sm: &StateMachine, mangler: &dyn NameMangler) -> NamingResult<()> {
    let mut state_members = NameTable::new("state id");
    let mut event_members = NameTable::new("event id");
    let mut functions = NameTable::new("function");
    let mut handler_variants = NameTable::new("handler reference");

    for name in mangler.fixed_fn_names() {
        functions.claim(name.to_string(), format!("built-in `{}`", name))?;
    }

    for event in sm.all_events() {
        event_members.claim(mangler.event_enum_member(&event), format!("event `{}`", event))?;
    }

    for state in sm.states_depth_first() {
        let owner = sm.describe(state);
        state_members.claim(mangler.state_enum_member(sm, state), owner.clone())?;
        functions.claim(mangler.state_enter_fn(sm, state), owner.clone())?;
        functions.claim(mangler.state_exit_fn(sm, state), owner.clone())?;
        handler_variants.claim(mangler.exit_handler_variant(sm, state), owner.clone())?;

        for event in sm.events_of(state) {
            let event_owner = format!("{} ({})", owner, event);
            functions.claim(mangler.trigger_handler_fn(sm, state, &event), event_owner.clone())?;
            handler_variants.claim(mangler.event_handler_variant(sm, state, &event), event_owner)?;
        }

        for pseudo_state in sm.pseudo_state_children(state) {
            functions.claim(mangler.pseudo_state_fn(sm, pseudo_state), sm.describe(pseudo_state))?;
        }
    }

    Ok(())
}
