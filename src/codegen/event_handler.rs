//! Event Handler Compiler
//! Per state enter/exit/event functions: guards, actions, transitions and event consumption

use crate::expansion::{references_identifier, ActionExpander, ExpansionContext, CONSUME_EVENT_FLAG};
use crate::fsm::trigger;
use crate::fsm::{Behavior, StateMachine, VertexId, TRIGGER_ENTER, TRIGGER_EXIT};
use crate::naming::NameMangler;
use crate::output::CodeSink;
use crate::planner::PseudoStatePlan;
use crate::transition::{self, TransitionPath};

use super::{CodegenError, CodegenResult};

const BANNER: &str = "////////////////////////////////////////////////////////////////////////////////";

/// Compiles the handlers of one state machine into a [`CodeSink`]
pub struct EventHandlerBuilder<'a, S: CodeSink + ?Sized> {
    sm: &'a StateMachine,
    mangler: &'a dyn NameMangler,
    expander: &'a dyn ActionExpander,
    plan: &'a PseudoStatePlan,
    ctx: &'a ExpansionContext,
    file: &'a mut S,
}

/// Exiting can be skipped only when a pseudo-state routes within its already active parent
pub fn is_exiting_required(
    sm: &StateMachine,
    source: VertexId,
    target: VertexId,
    path: &TransitionPath,
) -> bool {
    if sm.kind(source).is_exit_point() && sm.parent(source) == Some(target) {
        return true;
    }

    if sm.kind(source).is_pseudo_state() && sm.parent(source) == Some(path.least_common_ancestor) {
        return false;
    }

    true
}

/// Whether the single state being exited can be exited by calling its exit function directly.
/// Also returns the state that is effectively being exited (an exit point stands for its parent).
pub fn can_use_single_direct_exit(
    sm: &StateMachine,
    source: VertexId,
    path: &TransitionPath,
) -> CodegenResult<(bool, VertexId)> {
    let mut states_to_exit = path.to_exit.len();
    let source_is_leaf = sm.children(source).is_empty();
    let mut effective_source = source;

    if sm.kind(source).is_exit_point() {
        if path.to_exit.first() != Some(&source) {
            return Err(CodegenError::invariant(
                sm,
                source,
                "expected transition path exit list to start with source vertex",
            ));
        }
        states_to_exit = states_to_exit.saturating_sub(1);
        effective_source = sm
            .parent(source)
            .ok_or_else(|| CodegenError::invariant(sm, source, "exit point has no parent"))?;
    }

    let direct = sm.kind(effective_source).is_state() && source_is_leaf && states_to_exit <= 1;
    Ok((direct, effective_source))
}

impl<'a, S: CodeSink + ?Sized> EventHandlerBuilder<'a, S> {
    pub fn new(
        sm: &'a StateMachine,
        mangler: &'a dyn NameMangler,
        expander: &'a dyn ActionExpander,
        plan: &'a PseudoStatePlan,
        ctx: &'a ExpansionContext,
        file: &'a mut S,
    ) -> Self {
        Self {
            sm,
            mangler,
            expander,
            plan,
            ctx,
            file,
        }
    }

    // ========================================================================
    // NAMES
    // ========================================================================

    fn this(&self) -> &str {
        &self.ctx.sm_access
    }

    fn exit_handler_ref(&self, state: VertexId) -> String {
        format!(
            "{}::{}",
            self.mangler.sm_func_enum_type(self.sm),
            self.mangler.exit_handler_variant(self.sm, state)
        )
    }

    fn event_handler_ref(&self, state: VertexId, event: &str) -> String {
        format!(
            "{}::{}",
            self.mangler.sm_func_enum_type(self.sm),
            self.mangler.event_handler_variant(self.sm, state, event)
        )
    }

    fn event_slot(&self, event: &str) -> String {
        format!(
            "{}.{}[{}::{} as usize]",
            self.this(),
            self.mangler.current_event_handlers_field(),
            self.mangler.sm_event_enum_type(self.sm),
            self.mangler.event_enum_member(event)
        )
    }

    fn ancestor_slot(&self) -> String {
        format!("{}.{}", self.this(), self.mangler.ancestor_event_handler_field())
    }

    fn exit_slot(&self) -> String {
        format!("{}.{}", self.this(), self.mangler.current_state_exit_handler_field())
    }

    fn describe(&self, vertex: VertexId) -> String {
        self.sm.describe(vertex)
    }

    fn expand(&self, behavior: &Behavior, code: &str) -> CodegenResult<String> {
        self.expander
            .expand(code, self.ctx)
            .map_err(|source| CodegenError::Expansion {
                vertex: self.describe(behavior.owner),
                behavior: self.sm.describe_behavior_as_uml(behavior),
                source,
            })
    }

    fn start_function(&mut self, name: &str) {
        self.file.append(&format!("fn {}(&mut self)", name));
        self.file.start_code_block();
    }

    // ========================================================================
    // STATE FUNCTIONS
    // ========================================================================

    /// Enter, exit and event functions of `state`, then its shared pseudo-state functions
    pub fn output_named_state_handlers(&mut self, state: VertexId) -> CodegenResult<()> {
        log::trace!("compiling handlers for `{}`", self.describe(state));

        self.file.request_new_line_before_more_code();
        let title = format!("// event handlers for state {}", self.describe(state));
        self.file.append_line(BANNER);
        self.file.append_line(&title);
        self.file.append_line(BANNER);
        self.file.request_new_line_before_more_code();

        self.output_func_state_enter(state)?;
        self.output_func_state_exit(state)?;

        for event in self.sm.events_of(state) {
            self.start_function(&self.mangler.trigger_handler_fn(self.sm, state, &event));
            self.output_state_behaviors_for_trigger(state, &event)?;
            self.file.finish_code_block("");
            self.file.request_new_line_before_more_code();
        }

        for pseudo_state in self.plan.functions_for_parent(self.sm, state) {
            self.output_pseudo_state_transition_function(pseudo_state)?;
        }

        Ok(())
    }

    pub fn output_func_state_enter(&mut self, state: VertexId) -> CodegenResult<()> {
        self.start_function(&self.mangler.state_enter_fn(self.sm, state));

        self.file.append_line("// setup trigger/event handlers");
        let exit_line = format!("{} = Some({});", self.exit_slot(), self.exit_handler_ref(state));
        self.file.append_line(&exit_line);

        for event in self.sm.events_of(state) {
            let line = format!(
                "{} = Some({});",
                self.event_slot(&event),
                self.event_handler_ref(state, &event)
            );
            self.file.append_line(&line);
        }

        self.file.request_new_line_before_more_code();
        self.output_state_behaviors_for_trigger(state, TRIGGER_ENTER)?;

        self.file.finish_code_block("");
        self.file.request_new_line_before_more_code();
        Ok(())
    }

    pub fn output_func_state_exit(&mut self, state: VertexId) -> CodegenResult<()> {
        self.start_function(&self.mangler.state_exit_fn(self.sm, state));

        self.output_state_behaviors_for_trigger(state, TRIGGER_EXIT)?;

        match self.sm.parent(state) {
            None => {
                self.file
                    .append_line("// State machine root is a special case. It cannot be exited.");
            }
            Some(parent) => {
                if !self.sm.kind(parent).is_state() {
                    return Err(CodegenError::invariant(
                        self.sm,
                        state,
                        "state must be nested in a state",
                    ));
                }

                self.file
                    .append_line("// adjust function pointers for this state's exit");
                let exit_line = format!("{} = Some({});", self.exit_slot(), self.exit_handler_ref(parent));
                self.file.append_line(&exit_line);

                for event in self.sm.events_of(state) {
                    let line = match self.sm.first_ancestor_that_handles_event(state, &event) {
                        Some(ancestor) => format!(
                            "{} = Some({}); // the next ancestor that handles this event is {}",
                            self.event_slot(&event),
                            self.event_handler_ref(ancestor, &event),
                            self.describe(ancestor)
                        ),
                        None => format!(
                            "{} = None; // no ancestor listens to this event",
                            self.event_slot(&event)
                        ),
                    };
                    self.file.append_line(&line);
                }
            }
        }

        self.file.finish_code_block("");
        self.file.request_new_line_before_more_code();
        Ok(())
    }

    /// Shared function holding every outgoing transition of a pseudo-state
    pub fn output_pseudo_state_transition_function(&mut self, pseudo_state: VertexId) -> CodegenResult<()> {
        let name = self
            .plan
            .maybe_function_name(pseudo_state)
            .ok_or_else(|| {
                CodegenError::invariant(self.sm, pseudo_state, "pseudo state has no shared function")
            })?
            .to_string();

        self.start_function(&name);
        // callers may differ in which ancestors handle the event
        self.render_pseudo_state_transitions_inner(pseudo_state, false, 0)?;
        self.file.finish_code_block("");
        self.file.request_new_line_before_more_code();
        Ok(())
    }

    /// Body of `start`: the synthesized transition from the root to its initial state
    pub fn output_start_transition(&mut self) -> CodegenResult<()> {
        let root = self.sm.root();
        let Some(initial) = self.sm.initial_state_of(root) else {
            self.file
                .append_line("// No initial state. Nothing to enter past the root.");
            return Ok(());
        };

        let mut behavior = Behavior::new().with_transition(initial);
        behavior.owner = root;
        self.output_transition_code(&behavior, true, false, 0)
    }

    /// First statements of `start`: enter the root, then follow its initial transition
    pub fn output_start(&mut self) -> CodegenResult<()> {
        self.output_enter_call(self.sm.root(), true);
        self.output_start_transition()
    }

    // ========================================================================
    // BEHAVIORS
    // ========================================================================

    /// All behaviors of `state` reacting to `trigger_name`, in declaration order
    pub fn output_state_behaviors_for_trigger(
        &mut self,
        state: VertexId,
        trigger_name: &str,
    ) -> CodegenResult<()> {
        let mut no_ancestor_handles_event = true;

        if trigger::is_event(trigger_name) {
            no_ancestor_handles_event = self.output_next_ancestor_handler(state, trigger_name);
        }

        let sm = self.sm;
        for behavior in sm.behaviors_with_trigger(state, trigger_name) {
            if behavior.has_transition() {
                self.output_transition_code(behavior, no_ancestor_handles_event, true, 0)?;
            } else {
                self.output_non_transition_code(behavior, trigger_name, no_ancestor_handles_event)?;
            }
            self.file.request_new_line_before_more_code();
        }

        Ok(())
    }

    /// Point the ancestor slot at the next handler up the tree. Returns true if there is none.
    fn output_next_ancestor_handler(&mut self, state: VertexId, trigger_name: &str) -> bool {
        let next = self.sm.first_ancestor_that_handles_event(state, trigger_name);

        match next {
            None => {
                self.file
                    .append_line(&format!("// No ancestor state handles `{}` event.", trigger_name));
            }
            Some(ancestor) => {
                self.file.append_line(&format!(
                    "// Setup handler for next ancestor that listens to `{}` event.",
                    trigger_name
                ));
                let line = format!(
                    "{} = Some({});",
                    self.ancestor_slot(),
                    self.event_handler_ref(ancestor, trigger_name)
                );
                self.file.append_line(&line);
            }
        }

        self.file.request_new_line_before_more_code();
        next.is_none()
    }

    fn output_start_of_behavior_code(&mut self, behavior: &Behavior) -> CodegenResult<()> {
        let owner = format!("// {} behavior", self.describe(behavior.owner));
        let uml = format!("// uml: {}", self.sm.describe_behavior_as_uml(behavior));
        self.file.append_line(&owner);
        self.file.append_line(&uml);

        if let Some(guard) = behavior.guard.as_deref().filter(|_| behavior.has_guard_code()) {
            let expanded = self.expand(behavior, guard.trim())?;
            if expanded.contains('\n') {
                self.file.append_lines(&format!("if {}", expanded));
            } else {
                self.file.append(&format!("if {}", expanded));
            }
        }

        Ok(())
    }

    fn output_end_of_behavior_code(&mut self, behavior: &Behavior) {
        let trailing = format!(" // end of behavior for {}", self.describe(behavior.owner));
        self.file.finish_code_block(&trailing);
    }

    fn output_any_action_code(&mut self, behavior: &Behavior) -> CodegenResult<()> {
        if let Some(action) = behavior.action.as_deref().filter(|_| behavior.has_action_code()) {
            let expanded = self.expand(behavior, action)?;
            self.file.append_lines(&expanded);
            self.file.request_new_line_before_more_code();
        }
        Ok(())
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// Exit, action, enter and completion steps of a transition behavior
    pub fn output_transition_code(
        &mut self,
        behavior: &Behavior,
        no_ancestor_handles_event: bool,
        check_for_exiting: bool,
        depth: usize,
    ) -> CodegenResult<()> {
        let source = behavior.owner;
        let target = behavior.target.ok_or_else(|| {
            CodegenError::invariant(self.sm, source, "transition behavior has no target")
        })?;

        self.output_start_of_behavior_code(behavior)?;
        self.file.start_code_block();

        let path = transition::resolve(self.sm, source, target);

        let step1 = format!(
            "// Step 1: Exit states until we reach `{}` state (Least Common Ancestor for transition).",
            self.describe(path.least_common_ancestor)
        );
        self.file.append(&step1);
        if check_for_exiting && is_exiting_required(self.sm, source, target, &path) {
            self.file.finish_line("");
            self.exit_until_lca_reached(source, &path)?;
        } else {
            self.file.finish_line(" Already at LCA, no exiting required.");
        }
        self.file.request_new_line_before_more_code();

        self.file.append_line(&format!(
            "// Step 2: Transition action: `{}`.",
            behavior.single_line_action_code()
        ));
        self.output_any_action_code(behavior)?;
        self.file.request_new_line_before_more_code();

        let step3 = format!(
            "// Step 3: Enter/move towards transition target `{}`.",
            self.describe(target)
        );
        self.file.append_line(&step3);
        self.enter_towards_target(&path, no_ancestor_handles_event);

        self.finish_transition_or_continue_pseudo(target, no_ancestor_handles_event, depth)?;

        self.output_end_of_behavior_code(behavior);
        Ok(())
    }

    fn exit_until_lca_reached(&mut self, source: VertexId, path: &TransitionPath) -> CodegenResult<()> {
        let (direct, leaf) = can_use_single_direct_exit(self.sm, source, path)?;

        if direct {
            let line = format!("{}.{}();", self.this(), self.mangler.state_exit_fn(self.sm, leaf));
            self.file.append_line(&line);
            return Ok(());
        }

        let lca = path.least_common_ancestor;
        if !self.sm.kind(lca).is_state() {
            return Err(CodegenError::invariant(
                self.sm,
                lca,
                "least common ancestor of a transition must be a state",
            ));
        }
        let line = format!(
            "{}.{}({});",
            self.this(),
            self.mangler.exit_up_to_state_handler_fn(),
            self.exit_handler_ref(lca)
        );
        self.file.append_line(&line);
        Ok(())
    }

    fn enter_towards_target(&mut self, path: &TransitionPath, no_ancestor_handles_event: bool) {
        if path.to_enter.is_empty() {
            self.file
                .append_line("// Already in target. No entering required.");
            return;
        }

        for vertex in &path.to_enter {
            if self.sm.kind(*vertex).is_state() {
                self.output_enter_call(*vertex, no_ancestor_handles_event);
            } else {
                self.file.append_line(&format!(
                    "// {} is a pseudo state and cannot have an `enter` trigger.",
                    self.describe(*vertex)
                ));
            }
        }
        self.file.request_new_line_before_more_code();
    }

    fn enter_has_transition(&self, state: VertexId) -> bool {
        self.sm
            .behaviors_with_trigger(state, TRIGGER_ENTER)
            .any(|behavior| behavior.has_transition())
    }

    /// Call the enter function of `state`. An enter behavior with a transition may already have
    /// completed a transition elsewhere, in which case the caller's transition stops here.
    fn output_enter_call(&mut self, state: VertexId, no_ancestor_handles_event: bool) {
        let line = format!("{}.{}();", self.this(), self.mangler.state_enter_fn(self.sm, state));
        self.file.append_line(&line);

        if !self.enter_has_transition(state) {
            return;
        }

        self.file.append(&format!(
            "if {} != Some({})",
            self.exit_slot(),
            self.exit_handler_ref(state)
        ));
        self.file.start_code_block();
        self.file.append_line(&format!(
            "// `{}` enter behavior already completed a transition.",
            self.describe(state)
        ));
        self.output_ancestor_release(no_ancestor_handles_event);
        self.file.append_line("return;");
        self.file.finish_code_block("");
    }

    /// Ends dispatch for the current event: ancestors must not see it after a transition
    fn output_ancestor_release(&mut self, no_ancestor_handles_event: bool) {
        if no_ancestor_handles_event {
            self.file.append_line(&format!(
                "// No ancestor handles event. Can skip nulling `{}`.",
                self.mangler.ancestor_event_handler_field()
            ));
        } else {
            let line = format!("{} = None;", self.ancestor_slot());
            self.file.append_line(&line);
        }
    }

    fn finish_transition_or_continue_pseudo(
        &mut self,
        target: VertexId,
        no_ancestor_handles_event: bool,
        depth: usize,
    ) -> CodegenResult<()> {
        if self.sm.kind(target).is_pseudo_state() {
            return self.output_transitions_for_pseudo_state(target, no_ancestor_handles_event, depth);
        }

        if let Some(initial) = self.sm.initial_state_of(target) {
            return self.output_transitions_for_pseudo_state(initial, no_ancestor_handles_event, depth);
        }

        self.file.append_line(
            "// Step 4: complete transition. Ends event dispatch. No other behaviors are checked.",
        );
        let state_line = format!(
            "{}.{} = {}::{};",
            self.this(),
            self.mangler.state_id_field(),
            self.mangler.sm_state_enum_type(self.sm),
            self.mangler.state_enum_member(self.sm, target)
        );
        self.file.append_line(&state_line);
        self.output_ancestor_release(no_ancestor_handles_event);
        self.file.append_line("return;");
        Ok(())
    }

    fn output_transitions_for_pseudo_state(
        &mut self,
        pseudo_state: VertexId,
        no_ancestor_handles_event: bool,
        depth: usize,
    ) -> CodegenResult<()> {
        match self.plan.maybe_function_name(pseudo_state) {
            Some(function) => {
                let call = format!("{}.{}();", self.this(), function);
                self.file
                    .append_line("// Finish transition by calling pseudo state transition function.");
                self.file.append_line(&call);
                self.file.append_line(
                    "return; // event processing immediately stops when a transition finishes. No other behaviors for this state are checked.",
                );
                Ok(())
            }
            None => self.render_pseudo_state_transitions_inner(
                pseudo_state,
                no_ancestor_handles_event,
                depth + 1,
            ),
        }
    }

    fn render_pseudo_state_transitions_inner(
        &mut self,
        pseudo_state: VertexId,
        no_ancestor_handles_event: bool,
        depth: usize,
    ) -> CodegenResult<()> {
        if depth > self.sm.vertex_count() {
            return Err(CodegenError::invariant(
                self.sm,
                pseudo_state,
                "inlined pseudo state transitions loop back on themselves",
            ));
        }

        let sm = self.sm;
        for behavior in sm.behaviors(pseudo_state) {
            if behavior.has_transition() {
                self.output_transition_code(behavior, no_ancestor_handles_event, true, depth)?;
                self.file.request_new_line_before_more_code();
            }
        }
        Ok(())
    }

    // ========================================================================
    // ACTIONS AND CONSUMPTION
    // ========================================================================

    fn requires_consume_event_var(&self, behavior: &Behavior) -> CodegenResult<bool> {
        match behavior.action.as_deref().filter(|_| behavior.has_action_code()) {
            Some(action) => {
                let expanded = self.expand(behavior, action)?;
                Ok(references_identifier(&expanded, CONSUME_EVENT_FLAG))
            }
            None => Ok(false),
        }
    }

    fn output_non_transition_code(
        &mut self,
        behavior: &Behavior,
        trigger_name: &str,
        no_ancestor_handles_event: bool,
    ) -> CodegenResult<()> {
        let is_consumable = trigger::is_event(trigger_name);
        let has_consume_event_var = is_consumable && self.requires_consume_event_var(behavior)?;

        self.output_start_of_behavior_code(behavior)?;
        self.file.start_code_block();

        self.maybe_output_consume_event_variable(trigger_name, no_ancestor_handles_event, has_consume_event_var);

        self.file.append_line(&format!(
            "// Step 1: execute action `{}`",
            behavior.single_line_action_code()
        ));
        self.output_any_action_code(behavior)?;

        self.maybe_output_consume_event_code(
            trigger_name,
            no_ancestor_handles_event,
            is_consumable,
            has_consume_event_var,
        );

        self.output_end_of_behavior_code(behavior);
        Ok(())
    }

    fn maybe_output_consume_event_variable(
        &mut self,
        trigger_name: &str,
        no_ancestor_handles_event: bool,
        has_consume_event_var: bool,
    ) {
        if !has_consume_event_var {
            return;
        }

        if no_ancestor_handles_event {
            self.file.append_line(&format!(
                "// note: no ancestor consumes this event, but `{}` is declared anyway because the action uses it.",
                CONSUME_EVENT_FLAG
            ));
        }

        self.file.append(&format!("let mut {} = ", CONSUME_EVENT_FLAG));
        if trigger::is_do_event(trigger_name) {
            self.file
                .finish_line("false; // the `do` event is special in that it normally is not consumed.");
        } else {
            self.file.finish_line(
                "true; // events other than `do` are normally consumed by any event handler. Other event handlers in *this* state may still handle the event though.",
            );
        }
        self.file.request_new_line_before_more_code();
    }

    fn maybe_output_consume_event_code(
        &mut self,
        trigger_name: &str,
        no_ancestor_handles_event: bool,
        is_consumable: bool,
        has_consume_event_var: bool,
    ) {
        if !is_consumable {
            return;
        }

        self.file
            .append_line("// Step 2: determine if ancestor gets to handle event next.");

        if no_ancestor_handles_event {
            if has_consume_event_var {
                self.file.append_line(&format!(
                    "// No ancestor handles event. Ignore `{}` flag.",
                    CONSUME_EVENT_FLAG
                ));
            } else {
                self.file.append_line(&format!(
                    "// No ancestor handles event. Can skip nulling `{}`.",
                    self.mangler.ancestor_event_handler_field()
                ));
            }
        } else if has_consume_event_var {
            self.file.append(&format!("if {}", CONSUME_EVENT_FLAG));
            self.file.start_code_block();
            let line = format!("{} = None; // consume event", self.ancestor_slot());
            self.file.append_line(&line);
            self.file.finish_code_block("");
        } else if trigger::is_do_event(trigger_name) {
            self.file.append_line("// Don't consume special `do` event.");
        } else {
            let line = format!("{} = None; // consume event", self.ancestor_slot());
            self.file.append_line(&line);
        }
    }
}
