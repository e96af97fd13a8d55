//! Rust Code Generator
//! Turns a [`StateMachine`] into a self-contained Rust source file: id enums, the machine struct
//! with its dispatch table, and one function per state handler

use thiserror::Error;

use crate::config::{ConfigError, RenderConfig};
use crate::expansion::{ActionExpander, ExpansionContext, ExpansionError};
use crate::fsm::{StateMachine, VertexId, TRIGGER_DO};
use crate::naming::{check_name_collisions, NameMangler, NamingError, RustNameMangler};
use crate::output::{CodeSink, OutputFile};
use crate::planner::PseudoStatePlan;

pub mod event_handler;


pub use event_handler::EventHandlerBuilder;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Invalid state machine: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("Invariant violated at `{vertex}`: {message}")]
    InvariantViolation { vertex: String, message: String },
    #[error("Could not expand code of `{vertex}` behavior `{behavior}`: {source}")]
    Expansion {
        vertex: String,
        behavior: String,
        source: ExpansionError,
    },
    #[error(transparent)]
    Naming(#[from] NamingError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type CodegenResult<T> = Result<T, CodegenError>;

impl CodegenError {
    pub(crate) fn invariant(sm: &StateMachine, vertex: VertexId, message: &str) -> Self {
        CodegenError::InvariantViolation {
            vertex: sm.describe(vertex),
            message: message.to_string(),
        }
    }
}

const ALLOWED_LINTS: &str = "#[allow(dead_code, unreachable_code, unused_mut, unused_variables, unused_assignments, clippy::needless_return)]";

/// Validate `sm` and generate its Rust source with the default collaborators
pub fn generate_rust_code(sm: &StateMachine, config: &RenderConfig) -> CodegenResult<String> {
    sm.validate().map_err(CodegenError::Validation)?;

    let mangler = RustNameMangler;
    let expander = config.build_expander()?;
    CodeGenerator::new(sm, config, &mangler, &expander).generate()
}

/// Whole file generator. Handler bodies are delegated to [`EventHandlerBuilder`].
pub struct CodeGenerator<'a> {
    sm: &'a StateMachine,
    config: &'a RenderConfig,
    mangler: &'a dyn NameMangler,
    expander: &'a dyn ActionExpander,
    ctx: ExpansionContext,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(
        sm: &'a StateMachine,
        config: &'a RenderConfig,
        mangler: &'a dyn NameMangler,
        expander: &'a dyn ActionExpander,
    ) -> Self {
        Self {
            sm,
            config,
            mangler,
            expander,
            ctx: ExpansionContext::default(),
        }
    }

    pub fn with_context(mut self, ctx: ExpansionContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Generate into a fresh [`OutputFile`]. Nothing is returned unless every state compiled.
    pub fn generate(&self) -> CodegenResult<String> {
        let mut file = OutputFile::new(self.config.code_style());
        self.generate_into(&mut file)?;
        Ok(file.into_string())
    }

    pub fn generate_into<S: CodeSink + ?Sized>(&self, file: &mut S) -> CodegenResult<()> {
        check_name_collisions(self.sm, self.mangler)?;

        let plan = PseudoStatePlan::plan(self.sm, self.mangler);
        let events: Vec<String> = self.sm.all_events().into_iter().collect();
        let states = self.sm.states_depth_first();

        log::info!(
            "Generating `{}`: {} states, {} events, {} shared pseudo state functions",
            self.sm.name(),
            states.len(),
            events.len(),
            plan.shared_count()
        );

        self.output_file_top(file);
        self.output_event_enum(file, &events);
        self.output_state_enum(file, &states);
        self.output_vars_struct(file)?;
        self.output_func_enum(file, &states);
        self.output_sm_struct(file);
        self.output_default_impl(file);

        let sm_type = self.mangler.sm_type_name(self.sm);
        file.append_line(ALLOWED_LINTS);
        file.append(&format!("impl {}", sm_type));
        file.start_code_block();
        {
            self.output_constructor(file);

            file.append_line("/// Enter the root state and follow its initial transition. Call once before dispatching events.");
            file.append("pub fn start(&mut self)");
            file.start_code_block();
            EventHandlerBuilder::new(self.sm, self.mangler, self.expander, &plan, &self.ctx, &mut *file)
                .output_start()?;
            file.finish_code_block("");
            file.request_new_line_before_more_code();

            self.output_dispatch_event(file);
            self.output_exit_up_to(file);
            self.output_call_handler(file, &states);

            let mut builder =
                EventHandlerBuilder::new(self.sm, self.mangler, self.expander, &plan, &self.ctx, &mut *file);
            for state in &states {
                builder.output_named_state_handlers(*state)?;
            }

            self.output_to_string_fns(file, &states, &events);
        }
        file.finish_code_block("");

        log::debug!("Generated `{}`", sm_type);
        Ok(())
    }

    // ========================================================================
    // TYPES
    // ========================================================================

    fn output_file_top<S: CodeSink + ?Sized>(&self, file: &mut S) {
        file.append_line(&format!(
            "// Autogenerated with oxichart {}.",
            env!("CARGO_PKG_VERSION")
        ));
        if !self.config.file_top.trim().is_empty() {
            file.append_lines(&self.config.file_top);
        }
        file.request_new_line_before_more_code();
    }

    fn output_event_enum<S: CodeSink + ?Sized>(&self, file: &mut S, events: &[String]) {
        file.append_line("/// Events the state machine reacts to");
        file.append_line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
        file.append(&format!("pub enum {}", self.mangler.sm_event_enum_type(self.sm)));
        file.start_code_block();
        for (index, event) in events.iter().enumerate() {
            let mut line = format!("{} = {},", self.mangler.event_enum_member(event), index);
            if event == TRIGGER_DO {
                line.push_str(" // The `do` event is special. State event handlers do not consume this event (ancestors all get it too) unless a transition occurs.");
            }
            file.append_line(&line);
        }
        file.finish_code_block("");
        file.request_new_line_before_more_code();

        file.append_line(&format!(
            "pub const {}: usize = {};",
            self.mangler.event_id_count_const(self.sm),
            events.len()
        ));
        file.request_new_line_before_more_code();
    }

    fn output_state_enum<S: CodeSink + ?Sized>(&self, file: &mut S, states: &[VertexId]) {
        file.append_line("/// State identifiers");
        file.append_line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
        file.append(&format!("pub enum {}", self.mangler.sm_state_enum_type(self.sm)));
        file.start_code_block();
        for (index, state) in states.iter().enumerate() {
            file.append_line(&format!(
                "{} = {},",
                self.mangler.state_enum_member(self.sm, *state),
                index
            ));
        }
        file.finish_code_block("");
        file.request_new_line_before_more_code();

        file.append_line(&format!(
            "pub const {}: usize = {};",
            self.mangler.state_id_count_const(self.sm),
            states.len()
        ));
        file.request_new_line_before_more_code();
    }

    fn output_vars_struct<S: CodeSink + ?Sized>(&self, file: &mut S) -> CodegenResult<()> {
        if !self.config.has_vars() {
            return Ok(());
        }

        file.append_line("/// User variables");
        file.append_line("#[derive(Debug, Default)]");
        file.append(&format!("pub struct {}", self.mangler.sm_vars_type(self.sm)));
        file.start_code_block();
        if !self.config.variable_declarations.trim().is_empty() {
            file.append_lines(&self.config.variable_declarations);
        }
        for var in self.config.auto_vars()? {
            file.append_line(&format!("pub {}: {},", var.name, var.ty));
        }
        file.finish_code_block("");
        file.request_new_line_before_more_code();
        Ok(())
    }

    fn output_func_enum<S: CodeSink + ?Sized>(&self, file: &mut S, states: &[VertexId]) {
        file.append_line("/// Handler references stored in the dispatch slots");
        file.append_line("#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
        file.append(&format!("enum {}", self.mangler.sm_func_enum_type(self.sm)));
        file.start_code_block();
        for state in states {
            file.append_line(&format!("{},", self.mangler.exit_handler_variant(self.sm, *state)));
            for event in self.sm.events_of(*state) {
                file.append_line(&format!(
                    "{},",
                    self.mangler.event_handler_variant(self.sm, *state, &event)
                ));
            }
        }
        file.finish_code_block("");
        file.request_new_line_before_more_code();
    }

    fn output_sm_struct<S: CodeSink + ?Sized>(&self, file: &mut S) {
        let func = self.mangler.sm_func_enum_type(self.sm);

        file.append_line("/// Generated state machine. Not thread safe: dispatch one event at a time.");
        file.append_line("#[derive(Debug)]");
        file.append(&format!("pub struct {}", self.mangler.sm_type_name(self.sm)));
        file.start_code_block();
        file.append_line("/// Active state. Read freely, never write.");
        file.append_line(&format!(
            "pub {}: {},",
            self.mangler.state_id_field(),
            self.mangler.sm_state_enum_type(self.sm)
        ));
        file.append_line(&format!(
            "{}: Option<{}>,",
            self.mangler.ancestor_event_handler_field(),
            func
        ));
        file.append_line(&format!(
            "{}: [Option<{}>; {}],",
            self.mangler.current_event_handlers_field(),
            func,
            self.mangler.event_id_count_const(self.sm)
        ));
        file.append_line(&format!(
            "{}: Option<{}>,",
            self.mangler.current_state_exit_handler_field(),
            func
        ));
        if self.config.has_vars() {
            file.append_line(&format!(
                "pub {}: {},",
                self.mangler.vars_field(),
                self.mangler.sm_vars_type(self.sm)
            ));
        }
        file.finish_code_block("");
        file.request_new_line_before_more_code();
    }

    fn output_default_impl<S: CodeSink + ?Sized>(&self, file: &mut S) {
        file.append(&format!("impl Default for {}", self.mangler.sm_type_name(self.sm)));
        file.start_code_block();
        file.append("fn default() -> Self");
        file.start_code_block();
        file.append_line("Self::new()");
        file.finish_code_block("");
        file.finish_code_block("");
        file.request_new_line_before_more_code();
    }

    // ========================================================================
    // FIXED FUNCTIONS
    // ========================================================================

    fn output_constructor<S: CodeSink + ?Sized>(&self, file: &mut S) {
        file.append_line("/// Create the state machine. Call `start` before dispatching events.");
        file.append("pub fn new() -> Self");
        file.start_code_block();
        file.append("Self");
        file.start_code_block();
        file.append_line(&format!(
            "{}: {}::{},",
            self.mangler.state_id_field(),
            self.mangler.sm_state_enum_type(self.sm),
            self.mangler.state_enum_member(self.sm, self.sm.root())
        ));
        file.append_line(&format!("{}: None,", self.mangler.ancestor_event_handler_field()));
        file.append_line(&format!(
            "{}: [None; {}],",
            self.mangler.current_event_handlers_field(),
            self.mangler.event_id_count_const(self.sm)
        ));
        file.append_line(&format!("{}: None,", self.mangler.current_state_exit_handler_field()));
        if self.config.has_vars() {
            file.append_line(&format!(
                "{}: {}::default(),",
                self.mangler.vars_field(),
                self.mangler.sm_vars_type(self.sm)
            ));
        }
        file.finish_code_block("");
        file.finish_code_block("");
        file.request_new_line_before_more_code();
    }

    fn output_dispatch_event<S: CodeSink + ?Sized>(&self, file: &mut S) {
        let this = &self.ctx.sm_access;
        let ancestor = self.mangler.ancestor_event_handler_field();

        file.append_line("/// Dispatch one event. Handlers run to completion before this returns.");
        file.append(&format!(
            "pub fn dispatch_event(&mut self, event_id: {})",
            self.mangler.sm_event_enum_type(self.sm)
        ));
        file.start_code_block();
        file.append_line(&format!(
            "let mut behavior_func = {}.{}[event_id as usize];",
            this,
            self.mangler.current_event_handlers_field()
        ));
        file.request_new_line_before_more_code();
        file.append("while let Some(func) = behavior_func");
        file.start_code_block();
        file.append_line(&format!("{}.{} = None;", this, ancestor));
        file.append_line(&format!("{}.{}(func);", this, self.mangler.call_handler_fn()));
        file.append_line(&format!("behavior_func = {}.{};", this, ancestor));
        file.finish_code_block("");
        file.finish_code_block("");
        file.request_new_line_before_more_code();
    }

    fn output_exit_up_to<S: CodeSink + ?Sized>(&self, file: &mut S) {
        let this = &self.ctx.sm_access;

        file.append_line("// Exits states until `desired_state_exit_handler` is the current exit handler.");
        file.append_line("// Used when the active leaf state is not known at compile time.");
        file.append(&format!(
            "fn {}(&mut self, desired_state_exit_handler: {})",
            self.mangler.exit_up_to_state_handler_fn(),
            self.mangler.sm_func_enum_type(self.sm)
        ));
        file.start_code_block();
        file.append(&format!(
            "while let Some(handler) = {}.{}",
            this,
            self.mangler.current_state_exit_handler_field()
        ));
        file.start_code_block();
        file.append("if handler == desired_state_exit_handler");
        file.start_code_block();
        file.append_line("break;");
        file.finish_code_block("");
        file.append_line(&format!("{}.{}(handler);", this, self.mangler.call_handler_fn()));
        file.finish_code_block("");
        file.finish_code_block("");
        file.request_new_line_before_more_code();
    }

    fn output_call_handler<S: CodeSink + ?Sized>(&self, file: &mut S, states: &[VertexId]) {
        let func = self.mangler.sm_func_enum_type(self.sm);
        let this = &self.ctx.sm_access;

        file.append(&format!(
            "fn {}(&mut self, func: {})",
            self.mangler.call_handler_fn(),
            func
        ));
        file.start_code_block();
        file.append("match func");
        file.start_code_block();
        for state in states {
            file.append_line(&format!(
                "{}::{} => {}.{}(),",
                func,
                self.mangler.exit_handler_variant(self.sm, *state),
                this,
                self.mangler.state_exit_fn(self.sm, *state)
            ));
            for event in self.sm.events_of(*state) {
                file.append_line(&format!(
                    "{}::{} => {}.{}(),",
                    func,
                    self.mangler.event_handler_variant(self.sm, *state, &event),
                    this,
                    self.mangler.trigger_handler_fn(self.sm, *state, &event)
                ));
            }
        }
        file.finish_code_block("");
        file.finish_code_block("");
        file.request_new_line_before_more_code();
    }

    fn output_to_string_fns<S: CodeSink + ?Sized>(&self, file: &mut S, states: &[VertexId], events: &[String]) {
        let state_enum = self.mangler.sm_state_enum_type(self.sm);
        let event_enum = self.mangler.sm_event_enum_type(self.sm);

        file.request_new_line_before_more_code();
        file.append_line("/// State name as written in the model");
        file.append(&format!(
            "pub fn state_id_to_string(id: {}) -> &'static str",
            state_enum
        ));
        file.start_code_block();
        file.append("match id");
        file.start_code_block();
        for state in states {
            file.append_line(&format!(
                "{}::{} => {:?},",
                state_enum,
                self.mangler.state_enum_member(self.sm, *state),
                self.sm.describe(*state)
            ));
        }
        file.finish_code_block("");
        file.finish_code_block("");
        file.request_new_line_before_more_code();

        file.append_line("/// Event name as written in the model");
        file.append(&format!(
            "pub fn event_id_to_string(id: {}) -> &'static str",
            event_enum
        ));
        file.start_code_block();
        file.append("match id");
        file.start_code_block();
        for event in events {
            file.append_line(&format!(
                "{}::{} => {:?},",
                event_enum,
                self.mangler.event_enum_member(event),
                event
            ));
        }
        file.finish_code_block("");
        file.finish_code_block("");
    }
}
