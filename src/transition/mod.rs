//! Transition Path Resolver
//! Least common ancestor and the ordered exit/enter vertex lists of a transition

use crate::fsm::{StateMachine, VertexId};


/// The vertices a transition leaves and enters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPath {
    /// Deepest vertex common to the source and target ancestor chains
    pub least_common_ancestor: VertexId,
    /// From the source upward, LCA excluded
    pub to_exit: Vec<VertexId>,
    /// From just below the LCA down to the target (inclusive)
    pub to_enter: Vec<VertexId>,
}

/// A transition that must exit and re-enter its own target
pub fn is_self_transition(sm: &StateMachine, source: VertexId, target: VertexId) -> bool {
    source == target || (sm.kind(source).is_exit_point() && sm.parent(source) == Some(target))
}

/// Find the path a transition from `source` to `target` walks through the tree
pub fn resolve(sm: &StateMachine, source: VertexId, target: VertexId) -> TransitionPath {
    if is_self_transition(sm, source, target) {
        return match sm.parent(target) {
            Some(parent) => path_through(sm, source, target, parent),
            None => TransitionPath {
                least_common_ancestor: target,
                to_exit: Vec::new(),
                to_enter: Vec::new(),
            },
        };
    }

    let lca = least_common_ancestor(sm, source, target);
    path_through(sm, source, target, lca)
}

/// Deepest vertex on both ancestor chains. Each chain includes the vertex itself.
pub fn least_common_ancestor(sm: &StateMachine, a: VertexId, b: VertexId) -> VertexId {
    let b_chain: Vec<VertexId> = sm.ancestors_and_self(b).collect();
    sm.ancestors_and_self(a)
        .find(|v| b_chain.contains(v))
        .unwrap_or_else(|| sm.root())
}

fn path_through(sm: &StateMachine, source: VertexId, target: VertexId, lca: VertexId) -> TransitionPath {
    let to_exit: Vec<VertexId> = sm.ancestors_and_self(source).take_while(|v| *v != lca).collect();

    let mut to_enter: Vec<VertexId> = sm.ancestors_and_self(target).take_while(|v| *v != lca).collect();
    to_enter.reverse();

    TransitionPath {
        least_common_ancestor: lca,
        to_exit,
        to_enter,
    }
}
