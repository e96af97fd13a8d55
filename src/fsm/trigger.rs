//! Reserved trigger names and trigger name normalization

pub const TRIGGER_ENTER: &str = "enter";
pub const TRIGGER_EXIT: &str = "exit";
pub const TRIGGER_DO: &str = "do";

/// Trim and lower-case a trigger as written on a diagram
pub fn sanitize_trigger_name(trigger: &str) -> String {
    trigger.trim().to_lowercase()
}

pub fn is_enter(trigger: &str) -> bool {
    trigger == TRIGGER_ENTER
}

pub fn is_exit(trigger: &str) -> bool {
    trigger == TRIGGER_EXIT
}

pub fn is_do_event(trigger: &str) -> bool {
    trigger == TRIGGER_DO
}

/// Anything but `enter`/`exit` is dispatched as an event at run time
pub fn is_event(trigger: &str) -> bool {
    !is_enter(trigger) && !is_exit(trigger)
}
