// Autogenerated with oxichart 0.1.0.

/// Events the state machine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnterSmEventId {
    Do = 0, // The `do` event is special. State event handlers do not consume this event (ancestors all get it too) unless a transition occurs.
    Ev = 1,
}

pub const ENTER_SM_EVENT_ID_COUNT: usize = 2;

/// State identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnterSmStateId {
    Root = 0,
    A = 1,
    B = 2,
}

pub const ENTER_SM_STATE_ID_COUNT: usize = 3;

/// User variables
#[derive(Debug, Default)]
pub struct EnterSmVars {
    pub log: Vec<&'static str>,
}

/// Handler references stored in the dispatch slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnterSmFunc {
    RootExit,
    AExit,
    BExit,
    BEv,
}

/// Generated state machine. Not thread safe: dispatch one event at a time.
#[derive(Debug)]
pub struct EnterSm {
    /// Active state. Read freely, never write.
    pub state_id: EnterSmStateId,
    ancestor_event_handler: Option<EnterSmFunc>,
    current_event_handlers: [Option<EnterSmFunc>; ENTER_SM_EVENT_ID_COUNT],
    current_state_exit_handler: Option<EnterSmFunc>,
    pub vars: EnterSmVars,
}

impl Default for EnterSm {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code, unreachable_code, unused_mut, unused_variables, unused_assignments, clippy::needless_return)]
impl EnterSm {
    /// Create the state machine. Call `start` before dispatching events.
    pub fn new() -> Self {
        Self {
            state_id: EnterSmStateId::Root,
            ancestor_event_handler: None,
            current_event_handlers: [None; ENTER_SM_EVENT_ID_COUNT],
            current_state_exit_handler: None,
            vars: EnterSmVars::default(),
        }
    }

    /// Enter the root state and follow its initial transition. Call once before dispatching events.
    pub fn start(&mut self) {
        self.root_enter();
        // ROOT behavior
        // uml: TransitionTo(ROOT.InitialState)
        {
            // Step 1: Exit states until we reach `ROOT` state (Least Common Ancestor for transition). Already at LCA, no exiting required.

            // Step 2: Transition action: ``.

            // Step 3: Enter/move towards transition target `ROOT.InitialState`.
            // ROOT.InitialState is a pseudo state and cannot have an `enter` trigger.

            // ROOT.InitialState behavior
            // uml: TransitionTo(A)
            {
                // Step 1: Exit states until we reach `ROOT` state (Least Common Ancestor for transition). Already at LCA, no exiting required.

                // Step 2: Transition action: ``.

                // Step 3: Enter/move towards transition target `A`.
                self.a_enter();
                if self.current_state_exit_handler != Some(EnterSmFunc::AExit) {
                    // `A` enter behavior already completed a transition.
                    // No ancestor handles event. Can skip nulling `ancestor_event_handler`.
                    return;
                }

                // Step 4: complete transition. Ends event dispatch. No other behaviors are checked.
                self.state_id = EnterSmStateId::A;
                // No ancestor handles event. Can skip nulling `ancestor_event_handler`.
                return;
            } // end of behavior for ROOT.InitialState
        } // end of behavior for ROOT
    }

    /// Dispatch one event. Handlers run to completion before this returns.
    pub fn dispatch_event(&mut self, event_id: EnterSmEventId) {
        let mut behavior_func = self.current_event_handlers[event_id as usize];

        while let Some(func) = behavior_func {
            self.ancestor_event_handler = None;
            self.call_handler(func);
            behavior_func = self.ancestor_event_handler;
        }
    }

    // Exits states until `desired_state_exit_handler` is the current exit handler.
    // Used when the active leaf state is not known at compile time.
    fn exit_up_to_state_handler(&mut self, desired_state_exit_handler: EnterSmFunc) {
        while let Some(handler) = self.current_state_exit_handler {
            if handler == desired_state_exit_handler {
                break;
            }
            self.call_handler(handler);
        }
    }

    fn call_handler(&mut self, func: EnterSmFunc) {
        match func {
            EnterSmFunc::RootExit => self.root_exit(),
            EnterSmFunc::AExit => self.a_exit(),
            EnterSmFunc::BExit => self.b_exit(),
            EnterSmFunc::BEv => self.b_ev(),
        }
    }

    ////////////////////////////////////////////////////////////////////////////////
    // event handlers for state ROOT
    ////////////////////////////////////////////////////////////////////////////////

    fn root_enter(&mut self) {
        // setup trigger/event handlers
        self.current_state_exit_handler = Some(EnterSmFunc::RootExit);

        // ROOT behavior
        // uml: enter / { log.push("ROOT enter"); }
        {
            // Step 1: execute action `log.push("ROOT enter");`
            self.vars.log.push("ROOT enter");
        } // end of behavior for ROOT
    }

    fn root_exit(&mut self) {
        // State machine root is a special case. It cannot be exited.
    }

    ////////////////////////////////////////////////////////////////////////////////
    // event handlers for state A
    ////////////////////////////////////////////////////////////////////////////////

    fn a_enter(&mut self) {
        // setup trigger/event handlers
        self.current_state_exit_handler = Some(EnterSmFunc::AExit);

        // A behavior
        // uml: enter / { log.push("A enter"); }
        {
            // Step 1: execute action `log.push("A enter");`
            self.vars.log.push("A enter");
        } // end of behavior for A

        // A behavior
        // uml: enter TransitionTo(B)
        {
            // Step 1: Exit states until we reach `ROOT` state (Least Common Ancestor for transition).
            self.a_exit();

            // Step 2: Transition action: ``.

            // Step 3: Enter/move towards transition target `B`.
            self.b_enter();

            // Step 4: complete transition. Ends event dispatch. No other behaviors are checked.
            self.state_id = EnterSmStateId::B;
            // No ancestor handles event. Can skip nulling `ancestor_event_handler`.
            return;
        } // end of behavior for A
    }

    fn a_exit(&mut self) {
        // A behavior
        // uml: exit / { log.push("A exit"); }
        {
            // Step 1: execute action `log.push("A exit");`
            self.vars.log.push("A exit");
        } // end of behavior for A

        // adjust function pointers for this state's exit
        self.current_state_exit_handler = Some(EnterSmFunc::RootExit);
    }

    ////////////////////////////////////////////////////////////////////////////////
    // event handlers for state B
    ////////////////////////////////////////////////////////////////////////////////

    fn b_enter(&mut self) {
        // setup trigger/event handlers
        self.current_state_exit_handler = Some(EnterSmFunc::BExit);
        self.current_event_handlers[EnterSmEventId::Ev as usize] = Some(EnterSmFunc::BEv);

        // B behavior
        // uml: enter / { log.push("B enter"); }
        {
            // Step 1: execute action `log.push("B enter");`
            self.vars.log.push("B enter");
        } // end of behavior for B
    }

    fn b_exit(&mut self) {
        // B behavior
        // uml: exit / { log.push("B exit"); }
        {
            // Step 1: execute action `log.push("B exit");`
            self.vars.log.push("B exit");
        } // end of behavior for B

        // adjust function pointers for this state's exit
        self.current_state_exit_handler = Some(EnterSmFunc::RootExit);
        self.current_event_handlers[EnterSmEventId::Ev as usize] = None; // no ancestor listens to this event
    }

    fn b_ev(&mut self) {
        // No ancestor state handles `ev` event.

        // B behavior
        // uml: ev TransitionTo(A)
        {
            // Step 1: Exit states until we reach `ROOT` state (Least Common Ancestor for transition).
            self.b_exit();

            // Step 2: Transition action: ``.

            // Step 3: Enter/move towards transition target `A`.
            self.a_enter();
            if self.current_state_exit_handler != Some(EnterSmFunc::AExit) {
                // `A` enter behavior already completed a transition.
                // No ancestor handles event. Can skip nulling `ancestor_event_handler`.
                return;
            }

            // Step 4: complete transition. Ends event dispatch. No other behaviors are checked.
            self.state_id = EnterSmStateId::A;
            // No ancestor handles event. Can skip nulling `ancestor_event_handler`.
            return;
        } // end of behavior for B
    }

    /// State name as written in the model
    pub fn state_id_to_string(id: EnterSmStateId) -> &'static str {
        match id {
            EnterSmStateId::Root => "ROOT",
            EnterSmStateId::A => "A",
            EnterSmStateId::B => "B",
        }
    }

    /// Event name as written in the model
    pub fn event_id_to_string(id: EnterSmEventId) -> &'static str {
        match id {
            EnterSmEventId::Do => "do",
            EnterSmEventId::Ev => "ev",
        }
    }
}
