//! Oxichart - Hierarchical Statechart Compiler
//! Compiles a tree of states, pseudo-states and behaviors into a dependency free Rust state machine
//! with one function per state handler and table driven event dispatch.

pub mod codegen;
pub mod config;
pub mod expansion;
pub mod fsm;
pub mod naming;
pub mod output;
pub mod planner;
pub mod transition;

pub use codegen::{generate_rust_code, CodeGenerator, CodegenError};
pub use config::RenderConfig;
pub use fsm::*;
