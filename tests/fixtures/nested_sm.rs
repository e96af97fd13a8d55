// Autogenerated with oxichart 0.1.0.

/// Events the state machine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NestedSmEventId {
    Do = 0, // The `do` event is special. State event handlers do not consume this event (ancestors all get it too) unless a transition occurs.
    Ev = 1,
    Go = 2,
}

pub const NESTED_SM_EVENT_ID_COUNT: usize = 3;

/// State identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NestedSmStateId {
    Root = 0,
    S = 1,
    S1 = 2,
    S2 = 3,
    T = 4,
    T1 = 5,
}

pub const NESTED_SM_STATE_ID_COUNT: usize = 6;

/// User variables
#[derive(Debug, Default)]
pub struct NestedSmVars {
    pub log: Vec<&'static str>,
    pub count: u8,
}

/// Handler references stored in the dispatch slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NestedSmFunc {
    RootExit,
    SExit,
    SDo,
    SEv,
    S1Exit,
    S1Do,
    S1Ev,
    S1Go,
    S2Exit,
    S2Ev,
    S2Go,
    TExit,
    T1Exit,
    T1Go,
}

/// Generated state machine. Not thread safe: dispatch one event at a time.
#[derive(Debug)]
pub struct NestedSm {
    /// Active state. Read freely, never write.
    pub state_id: NestedSmStateId,
    ancestor_event_handler: Option<NestedSmFunc>,
    current_event_handlers: [Option<NestedSmFunc>; NESTED_SM_EVENT_ID_COUNT],
    current_state_exit_handler: Option<NestedSmFunc>,
    pub vars: NestedSmVars,
}

impl Default for NestedSm {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code, unreachable_code, unused_mut, unused_variables, unused_assignments, clippy::needless_return)]
impl NestedSm {
    /// Create the state machine. Call `start` before dispatching events.
    pub fn new() -> Self {
        Self {
            state_id: NestedSmStateId::Root,
            ancestor_event_handler: None,
            current_event_handlers: [None; NESTED_SM_EVENT_ID_COUNT],
            current_state_exit_handler: None,
            vars: NestedSmVars::default(),
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
            // uml: TransitionTo(S)
            {
                // Step 1: Exit states until we reach `ROOT` state (Least Common Ancestor for transition). Already at LCA, no exiting required.

                // Step 2: Transition action: ``.

                // Step 3: Enter/move towards transition target `S`.
                self.s_enter();

                // S.InitialState behavior
                // uml: TransitionTo(S1)
                {
                    // Step 1: Exit states until we reach `S` state (Least Common Ancestor for transition). Already at LCA, no exiting required.

                    // Step 2: Transition action: ``.

                    // Step 3: Enter/move towards transition target `S1`.
                    self.s1_enter();

                    // Step 4: complete transition. Ends event dispatch. No other behaviors are checked.
                    self.state_id = NestedSmStateId::S1;
                    // No ancestor handles event. Can skip nulling `ancestor_event_handler`.
                    return;
                } // end of behavior for S.InitialState
            } // end of behavior for ROOT.InitialState
        } // end of behavior for ROOT
    }

    /// Dispatch one event. Handlers run to completion before this returns.
    pub fn dispatch_event(&mut self, event_id: NestedSmEventId) {
        let mut behavior_func = self.current_event_handlers[event_id as usize];

        while let Some(func) = behavior_func {
            self.ancestor_event_handler = None;
            self.call_handler(func);
            behavior_func = self.ancestor_event_handler;
        }
    }

    // Exits states until `desired_state_exit_handler` is the current exit handler.
    // Used when the active leaf state is not known at compile time.
    fn exit_up_to_state_handler(&mut self, desired_state_exit_handler: NestedSmFunc) {
        while let Some(handler) = self.current_state_exit_handler {
            if handler == desired_state_exit_handler {
                break;
            }
            self.call_handler(handler);
        }
    }

    fn call_handler(&mut self, func: NestedSmFunc) {
        match func {
            NestedSmFunc::RootExit => self.root_exit(),
            NestedSmFunc::SExit => self.s_exit(),
            NestedSmFunc::SDo => self.s_do(),
            NestedSmFunc::SEv => self.s_ev(),
            NestedSmFunc::S1Exit => self.s1_exit(),
            NestedSmFunc::S1Do => self.s1_do(),
            NestedSmFunc::S1Ev => self.s1_ev(),
            NestedSmFunc::S1Go => self.s1_go(),
            NestedSmFunc::S2Exit => self.s2_exit(),
            NestedSmFunc::S2Ev => self.s2_ev(),
            NestedSmFunc::S2Go => self.s2_go(),
            NestedSmFunc::TExit => self.t_exit(),
            NestedSmFunc::T1Exit => self.t1_exit(),
            NestedSmFunc::T1Go => self.t1_go(),
        }
    }

    ////////////////////////////////////////////////////////////////////////////////
    // event handlers for state ROOT
    ////////////////////////////////////////////////////////////////////////////////

    fn root_enter(&mut self) {
        // setup trigger/event handlers
        self.current_state_exit_handler = Some(NestedSmFunc::RootExit);

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

    fn root_choice_point_route_transition(&mut self) {
        // ROOT.ChoicePoint(route) behavior
        // uml: [count > 0] TransitionTo(T1)
        if self.vars.count > 0 {
            // Step 1: Exit states until we reach `ROOT` state (Least Common Ancestor for transition). Already at LCA, no exiting required.

            // Step 2: Transition action: ``.

            // Step 3: Enter/move towards transition target `T1`.
            self.t_enter();
            self.t1_enter();

            // Step 4: complete transition. Ends event dispatch. No other behaviors are checked.
            self.state_id = NestedSmStateId::T1;
            self.ancestor_event_handler = None;
            return;
        } // end of behavior for ROOT.ChoicePoint(route)

        // ROOT.ChoicePoint(route) behavior
        // uml: / { count += 1; } TransitionTo(S2)
        {
            // Step 1: Exit states until we reach `ROOT` state (Least Common Ancestor for transition). Already at LCA, no exiting required.

            // Step 2: Transition action: `count += 1;`.
            self.vars.count += 1;

            // Step 3: Enter/move towards transition target `S2`.
            self.s_enter();
            self.s2_enter();

            // Step 4: complete transition. Ends event dispatch. No other behaviors are checked.
            self.state_id = NestedSmStateId::S2;
            self.ancestor_event_handler = None;
            return;
        } // end of behavior for ROOT.ChoicePoint(route)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // event handlers for state S
    ////////////////////////////////////////////////////////////////////////////////

    fn s_enter(&mut self) {
        // setup trigger/event handlers
        self.current_state_exit_handler = Some(NestedSmFunc::SExit);
        self.current_event_handlers[NestedSmEventId::Do as usize] = Some(NestedSmFunc::SDo);
        self.current_event_handlers[NestedSmEventId::Ev as usize] = Some(NestedSmFunc::SEv);

        // S behavior
        // uml: enter / { log.push("S enter"); }
        {
            // Step 1: execute action `log.push("S enter");`
            self.vars.log.push("S enter");
        } // end of behavior for S
    }

    fn s_exit(&mut self) {
        // S behavior
        // uml: exit / { log.push("S exit"); }
        {
            // Step 1: execute action `log.push("S exit");`
            self.vars.log.push("S exit");
        } // end of behavior for S

        // adjust function pointers for this state's exit
        self.current_state_exit_handler = Some(NestedSmFunc::RootExit);
        self.current_event_handlers[NestedSmEventId::Do as usize] = None; // no ancestor listens to this event
        self.current_event_handlers[NestedSmEventId::Ev as usize] = None; // no ancestor listens to this event
    }

    fn s_do(&mut self) {
        // No ancestor state handles `do` event.

        // S behavior
        // uml: do / { log.push("S do"); }
        {
            // Step 1: execute action `log.push("S do");`
            self.vars.log.push("S do");

            // Step 2: determine if ancestor gets to handle event next.
            // No ancestor handles event. Can skip nulling `ancestor_event_handler`.
        } // end of behavior for S
    }

    fn s_ev(&mut self) {
        // No ancestor state handles `ev` event.

        // S behavior
        // uml: ev / { log.push("S ev"); }
        {
            // Step 1: execute action `log.push("S ev");`
            self.vars.log.push("S ev");

            // Step 2: determine if ancestor gets to handle event next.
            // No ancestor handles event. Can skip nulling `ancestor_event_handler`.
        } // end of behavior for S
    }

    ////////////////////////////////////////////////////////////////////////////////
    // event handlers for state S1
    ////////////////////////////////////////////////////////////////////////////////

    fn s1_enter(&mut self) {
        // setup trigger/event handlers
        self.current_state_exit_handler = Some(NestedSmFunc::S1Exit);
        self.current_event_handlers[NestedSmEventId::Do as usize] = Some(NestedSmFunc::S1Do);
        self.current_event_handlers[NestedSmEventId::Ev as usize] = Some(NestedSmFunc::S1Ev);
        self.current_event_handlers[NestedSmEventId::Go as usize] = Some(NestedSmFunc::S1Go);

        // S1 behavior
        // uml: enter / { log.push("S1 enter"); }
        {
            // Step 1: execute action `log.push("S1 enter");`
            self.vars.log.push("S1 enter");
        } // end of behavior for S1
    }

    fn s1_exit(&mut self) {
        // S1 behavior
        // uml: exit / { log.push("S1 exit"); }
        {
            // Step 1: execute action `log.push("S1 exit");`
            self.vars.log.push("S1 exit");
        } // end of behavior for S1

        // adjust function pointers for this state's exit
        self.current_state_exit_handler = Some(NestedSmFunc::SExit);
        self.current_event_handlers[NestedSmEventId::Do as usize] = Some(NestedSmFunc::SDo); // the next ancestor that handles this event is S
        self.current_event_handlers[NestedSmEventId::Ev as usize] = Some(NestedSmFunc::SEv); // the next ancestor that handles this event is S
        self.current_event_handlers[NestedSmEventId::Go as usize] = None; // no ancestor listens to this event
    }

    fn s1_do(&mut self) {
        // Setup handler for next ancestor that listens to `do` event.
        self.ancestor_event_handler = Some(NestedSmFunc::SDo);

        // S1 behavior
        // uml: do / { log.push("S1 do"); }
        {
            // Step 1: execute action `log.push("S1 do");`
            self.vars.log.push("S1 do");

            // Step 2: determine if ancestor gets to handle event next.
            // Don't consume special `do` event.
        } // end of behavior for S1
    }

    fn s1_ev(&mut self) {
        // Setup handler for next ancestor that listens to `ev` event.
        self.ancestor_event_handler = Some(NestedSmFunc::SEv);

        // S1 behavior
        // uml: ev / { log.push("S1 ev"); }
        {
            // Step 1: execute action `log.push("S1 ev");`
            self.vars.log.push("S1 ev");

            // Step 2: determine if ancestor gets to handle event next.
            self.ancestor_event_handler = None; // consume event
        } // end of behavior for S1
    }

    fn s1_go(&mut self) {
        // No ancestor state handles `go` event.

        // S1 behavior
        // uml: go TransitionTo(ROOT.ChoicePoint(route))
        {
            // Step 1: Exit states until we reach `ROOT` state (Least Common Ancestor for transition).
            self.exit_up_to_state_handler(NestedSmFunc::RootExit);

            // Step 2: Transition action: ``.

            // Step 3: Enter/move towards transition target `ROOT.ChoicePoint(route)`.
            // ROOT.ChoicePoint(route) is a pseudo state and cannot have an `enter` trigger.

            // Finish transition by calling pseudo state transition function.
            self.root_choice_point_route_transition();
            return; // event processing immediately stops when a transition finishes. No other behaviors for this state are checked.
        } // end of behavior for S1
    }

    ////////////////////////////////////////////////////////////////////////////////
    // event handlers for state S2
    ////////////////////////////////////////////////////////////////////////////////

    fn s2_enter(&mut self) {
        // setup trigger/event handlers
        self.current_state_exit_handler = Some(NestedSmFunc::S2Exit);
        self.current_event_handlers[NestedSmEventId::Ev as usize] = Some(NestedSmFunc::S2Ev);
        self.current_event_handlers[NestedSmEventId::Go as usize] = Some(NestedSmFunc::S2Go);

        // S2 behavior
        // uml: enter / { log.push("S2 enter"); }
        {
            // Step 1: execute action `log.push("S2 enter");`
            self.vars.log.push("S2 enter");
        } // end of behavior for S2
    }

    fn s2_exit(&mut self) {
        // S2 behavior
        // uml: exit / { log.push("S2 exit"); }
        {
            // Step 1: execute action `log.push("S2 exit");`
            self.vars.log.push("S2 exit");
        } // end of behavior for S2

        // adjust function pointers for this state's exit
        self.current_state_exit_handler = Some(NestedSmFunc::SExit);
        self.current_event_handlers[NestedSmEventId::Ev as usize] = Some(NestedSmFunc::SEv); // the next ancestor that handles this event is S
        self.current_event_handlers[NestedSmEventId::Go as usize] = None; // no ancestor listens to this event
    }

    fn s2_ev(&mut self) {
        // Setup handler for next ancestor that listens to `ev` event.
        self.ancestor_event_handler = Some(NestedSmFunc::SEv);

        // S2 behavior
        // uml: ev / { log.push("S2 ev"); consume_event = false; }
        {
            let mut consume_event = true; // events other than `do` are normally consumed by any event handler. Other event handlers in *this* state may still handle the event though.

            // Step 1: execute action `log.push("S2 ev"); consume_event = false;`
            self.vars.log.push("S2 ev"); consume_event = false;

            // Step 2: determine if ancestor gets to handle event next.
            if consume_event {
                self.ancestor_event_handler = None; // consume event
            }
        } // end of behavior for S2
    }

    fn s2_go(&mut self) {
        // No ancestor state handles `go` event.

        // S2 behavior
        // uml: go TransitionTo(S.ExitPoint(done))
        {
            // Step 1: Exit states until we reach `S` state (Least Common Ancestor for transition).
            self.s2_exit();

            // Step 2: Transition action: ``.

            // Step 3: Enter/move towards transition target `S.ExitPoint(done)`.
            // S.ExitPoint(done) is a pseudo state and cannot have an `enter` trigger.

            // S.ExitPoint(done) behavior
            // uml: TransitionTo(T)
            {
                // Step 1: Exit states until we reach `ROOT` state (Least Common Ancestor for transition).
                self.s_exit();

                // Step 2: Transition action: ``.

                // Step 3: Enter/move towards transition target `T`.
                self.t_enter();

                // T.InitialState behavior
                // uml: TransitionTo(T1)
                {
                    // Step 1: Exit states until we reach `T` state (Least Common Ancestor for transition). Already at LCA, no exiting required.

                    // Step 2: Transition action: ``.

                    // Step 3: Enter/move towards transition target `T1`.
                    self.t1_enter();

                    // Step 4: complete transition. Ends event dispatch. No other behaviors are checked.
                    self.state_id = NestedSmStateId::T1;
                    // No ancestor handles event. Can skip nulling `ancestor_event_handler`.
                    return;
                } // end of behavior for T.InitialState
            } // end of behavior for S.ExitPoint(done)
        } // end of behavior for S2
    }

    ////////////////////////////////////////////////////////////////////////////////
    // event handlers for state T
    ////////////////////////////////////////////////////////////////////////////////

    fn t_enter(&mut self) {
        // setup trigger/event handlers
        self.current_state_exit_handler = Some(NestedSmFunc::TExit);

        // T behavior
        // uml: enter / { log.push("T enter"); }
        {
            // Step 1: execute action `log.push("T enter");`
            self.vars.log.push("T enter");
        } // end of behavior for T
    }

    fn t_exit(&mut self) {
        // T behavior
        // uml: exit / { log.push("T exit"); }
        {
            // Step 1: execute action `log.push("T exit");`
            self.vars.log.push("T exit");
        } // end of behavior for T

        // adjust function pointers for this state's exit
        self.current_state_exit_handler = Some(NestedSmFunc::RootExit);
    }

    ////////////////////////////////////////////////////////////////////////////////
    // event handlers for state T1
    ////////////////////////////////////////////////////////////////////////////////

    fn t1_enter(&mut self) {
        // setup trigger/event handlers
        self.current_state_exit_handler = Some(NestedSmFunc::T1Exit);
        self.current_event_handlers[NestedSmEventId::Go as usize] = Some(NestedSmFunc::T1Go);

        // T1 behavior
        // uml: enter / { log.push("T1 enter"); }
        {
            // Step 1: execute action `log.push("T1 enter");`
            self.vars.log.push("T1 enter");
        } // end of behavior for T1
    }

    fn t1_exit(&mut self) {
        // T1 behavior
        // uml: exit / { log.push("T1 exit"); }
        {
            // Step 1: execute action `log.push("T1 exit");`
            self.vars.log.push("T1 exit");
        } // end of behavior for T1

        // adjust function pointers for this state's exit
        self.current_state_exit_handler = Some(NestedSmFunc::TExit);
        self.current_event_handlers[NestedSmEventId::Go as usize] = None; // no ancestor listens to this event
    }

    fn t1_go(&mut self) {
        // No ancestor state handles `go` event.

        // T1 behavior
        // uml: go TransitionTo(ROOT.ChoicePoint(route))
        {
            // Step 1: Exit states until we reach `ROOT` state (Least Common Ancestor for transition).
            self.exit_up_to_state_handler(NestedSmFunc::RootExit);

            // Step 2: Transition action: ``.

            // Step 3: Enter/move towards transition target `ROOT.ChoicePoint(route)`.
            // ROOT.ChoicePoint(route) is a pseudo state and cannot have an `enter` trigger.

            // Finish transition by calling pseudo state transition function.
            self.root_choice_point_route_transition();
            return; // event processing immediately stops when a transition finishes. No other behaviors for this state are checked.
        } // end of behavior for T1
    }

    /// State name as written in the model
    pub fn state_id_to_string(id: NestedSmStateId) -> &'static str {
        match id {
            NestedSmStateId::Root => "ROOT",
            NestedSmStateId::S => "S",
            NestedSmStateId::S1 => "S1",
            NestedSmStateId::S2 => "S2",
            NestedSmStateId::T => "T",
            NestedSmStateId::T1 => "T1",
        }
    }

    /// Event name as written in the model
    pub fn event_id_to_string(id: NestedSmEventId) -> &'static str {
        match id {
            NestedSmEventId::Do => "do",
            NestedSmEventId::Ev => "ev",
            NestedSmEventId::Go => "go",
        }
    }
}
