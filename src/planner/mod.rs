//! Pseudo-State Function Planner
//! Decides, before any handler is compiled, which pseudo-states get a shared transition function

use std::collections::BTreeMap;

use crate::fsm::{StateMachine, VertexId};
use crate::naming::NameMangler;


/// Shared function decision for every reachable pseudo-state
#[derive(Debug, Clone, Default)]
pub struct PseudoStatePlan {
    call_sites: BTreeMap<VertexId, usize>,
    shared: BTreeMap<VertexId, String>,
}

/// The pseudo-state a transition to `target` continues into once the target is entered
pub fn completion_pseudo_state(sm: &StateMachine, target: VertexId) -> Option<VertexId> {
    if sm.kind(target).is_pseudo_state() {
        Some(target)
    } else {
        sm.initial_state_of(target)
    }
}

/// How many handler bodies a behavior is rendered into
fn render_count(sm: &StateMachine, owner: VertexId, triggers: usize) -> usize {
    if sm.kind(owner).is_pseudo_state() {
        1
    } else {
        triggers
    }
}

impl PseudoStatePlan {
    /// Count call sites for every pseudo-state. More than one makes it a shared function.
    ///
    /// A call site is a rendered handler body, not a transition: a state behavior listed under
    /// two triggers is compiled into two event handlers and counts twice.
    pub fn plan(sm: &StateMachine, mangler: &dyn NameMangler) -> Self {
        let mut call_sites: BTreeMap<VertexId, usize> = BTreeMap::new();

        // `start` runs the root's initial transition
        if let Some(initial) = sm.initial_state_of(sm.root()) {
            *call_sites.entry(initial).or_default() += 1;
        }

        for owner in sm.vertex_ids() {
            for behavior in sm.behaviors(owner) {
                let Some(target) = behavior.target else { continue };
                let Some(pseudo_state) = completion_pseudo_state(sm, target) else {
                    continue;
                };
                *call_sites.entry(pseudo_state).or_default() +=
                    render_count(sm, owner, behavior.triggers.len());
            }
        }

        let mut shared = BTreeMap::new();
        for (pseudo_state, count) in &call_sites {
            if *count > 1 {
                let name = mangler.pseudo_state_fn(sm, *pseudo_state);
                log::debug!(
                    "`{}` has {} call sites, sharing it as `{}`",
                    sm.describe(*pseudo_state),
                    count,
                    name
                );
                shared.insert(*pseudo_state, name);
            } else {
                log::trace!("`{}` is inlined at its call site", sm.describe(*pseudo_state));
            }
        }

        Self { call_sites, shared }
    }

    /// Shared function name, or `None` when the pseudo-state is inlined
    pub fn maybe_function_name(&self, pseudo_state: VertexId) -> Option<&str> {
        self.shared.get(&pseudo_state).map(String::as_str)
    }

    pub fn is_shared(&self, pseudo_state: VertexId) -> bool {
        self.shared.contains_key(&pseudo_state)
    }

    pub fn call_site_count(&self, pseudo_state: VertexId) -> usize {
        self.call_sites.get(&pseudo_state).copied().unwrap_or(0)
    }

    pub fn shared_count(&self) -> usize {
        self.shared.len()
    }

    /// Shared pseudo-states that are children of `parent`, ordered by description
    pub fn functions_for_parent(&self, sm: &StateMachine, parent: VertexId) -> Vec<VertexId> {
        sm.pseudo_state_children(parent)
            .into_iter()
            .filter(|p| self.is_shared(*p))
            .collect()
    }
}
