//! Action and guard code expansion
//! Rewrites user written snippets (`count += 1`) into code that runs inside the generated machine
//! (`self.vars.count += 1`)

use std::collections::HashMap;
use std::fmt;

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

mod inspect;


pub use inspect::{references_identifier, CONSUME_EVENT_FLAG};

#[derive(Parser)]
#[grammar = "expansion/action.pest"]
pub struct ActionParser;

/// Nested expansions deeper than this are reported instead of followed
pub const MAX_EXPANSION_DEPTH: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    #[error("`{name}` expects {expected} argument(s) but was given {found}")]
    WrongArgCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Call to `{0}` is missing its closing parenthesis")]
    Unterminated(String),
    #[error("Expansion of `{0}` nests too deeply (is it recursive?)")]
    RecursionLimit(String),
    #[error("Could not scan code: {0}")]
    Syntax(#[from] pest::error::Error<Rule>),
}

pub type ExpansionResult<T> = Result<T, ExpansionError>;

/// Where the generated code reaches the state machine from an expanded snippet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionContext {
    /// Expression for the state machine instance
    pub sm_access: String,
    /// Prefix of user variable fields
    pub vars_path: String,
}

impl Default for ExpansionContext {
    fn default() -> Self {
        Self {
            sm_access: "self".to_string(),
            vars_path: "self.vars.".to_string(),
        }
    }
}

/// Turns raw guard/action text into target code
pub trait ActionExpander {
    fn expand(&self, code: &str, ctx: &ExpansionContext) -> ExpansionResult<String>;
}

enum VariableExpansion {
    Text(String),
    VarsField(String),
}

struct FunctionExpansion {
    arity: usize,
    body: Box<dyn Fn(&[String]) -> String>,
}

/// Identifier based expander: `name` and `name(args...)` are replaced, everything else is copied.
///
/// String and char literals, comments and member accesses (`x.name`, `a::name`) are never expanded.
#[derive(Default)]
pub struct Expander {
    variables: HashMap<String, VariableExpansion>,
    functions: HashMap<String, FunctionExpansion>,
}

impl fmt::Debug for Expander {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut variables: Vec<&String> = self.variables.keys().collect();
        let mut functions: Vec<&String> = self.functions.keys().collect();
        variables.sort();
        functions.sort();
        f.debug_struct("Expander")
            .field("variables", &variables)
            .field("functions", &functions)
            .finish()
    }
}

impl Expander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the identifier `name` with `text`
    pub fn add_variable_expansion(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.variables
            .insert(name.into(), VariableExpansion::Text(text.into()));
    }

    /// Replace the identifier `name` with the vars field of the same name
    pub fn add_vars_field_expansion(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.variables
            .insert(name.clone(), VariableExpansion::VarsField(name));
    }

    /// Replace calls `name(a, b, ...)` with `body(&[a, b, ...])`
    pub fn add_function_expansion<F>(&mut self, name: impl Into<String>, arity: usize, body: F)
    where
        F: Fn(&[String]) -> String + 'static,
    {
        self.functions.insert(
            name.into(),
            FunctionExpansion {
                arity,
                body: Box::new(body),
            },
        );
    }

    pub fn has_expansion(&self, name: &str) -> bool {
        self.variables.contains_key(name) || self.functions.contains_key(name)
    }

    fn expand_at_depth(
        &self,
        code: &str,
        ctx: &ExpansionContext,
        depth: usize,
        expanding: &str,
    ) -> ExpansionResult<String> {
        if depth > MAX_EXPANSION_DEPTH {
            return Err(ExpansionError::RecursionLimit(expanding.to_string()));
        }

        let mut out = String::with_capacity(code.len());
        let Some(pieces) = ActionParser::parse(Rule::code, code)?.next() else {
            return Ok(out);
        };

        for piece in pieces.into_inner() {
            match piece.as_rule() {
                Rule::call => self.expand_call(piece, ctx, depth, &mut out)?,
                Rule::ident => {
                    let name = piece.as_str();
                    let following = &code[piece.as_span().end()..];
                    if self.functions.contains_key(name) && following.trim_start().starts_with('(') {
                        return Err(ExpansionError::Unterminated(name.to_string()));
                    }
                    self.expand_name(name, ctx, depth, &mut out)?;
                }
                Rule::EOI => {}
                _ => out.push_str(piece.as_str()),
            }
        }

        Ok(out)
    }

    /// Variable expansion of a bare identifier, or the identifier itself
    fn expand_name(
        &self,
        name: &str,
        ctx: &ExpansionContext,
        depth: usize,
        out: &mut String,
    ) -> ExpansionResult<()> {
        let Some(variable) = self.variables.get(name) else {
            out.push_str(name);
            return Ok(());
        };
        let text = match variable {
            VariableExpansion::Text(text) => text.clone(),
            VariableExpansion::VarsField(field) => format!("{}{}", ctx.vars_path, field),
        };
        out.push_str(&self.expand_at_depth(&text, ctx, depth + 1, name)?);
        Ok(())
    }

    fn expand_call(
        &self,
        call: Pair<'_, Rule>,
        ctx: &ExpansionContext,
        depth: usize,
        out: &mut String,
    ) -> ExpansionResult<()> {
        let text = call.as_str();
        let mut parts = call.into_inner();
        let (Some(name), Some(args)) = (parts.next(), parts.next()) else {
            out.push_str(text);
            return Ok(());
        };
        let name = name.as_str();

        let Some(function) = self.functions.get(name) else {
            // not ours, but its arguments may still name variables
            self.expand_name(name, ctx, depth, out)?;
            out.push_str(&self.expand_at_depth(&text[name.len()..], ctx, depth, name)?);
            return Ok(());
        };

        let mut raw_args: Vec<&str> = args.into_inner().map(|arg| arg.as_str().trim()).collect();
        if raw_args.last().is_some_and(|arg| arg.is_empty()) {
            raw_args.pop();
        }
        if raw_args.len() != function.arity {
            return Err(ExpansionError::WrongArgCount {
                name: name.to_string(),
                expected: function.arity,
                found: raw_args.len(),
            });
        }

        let args = raw_args
            .iter()
            .map(|arg| self.expand_at_depth(arg, ctx, depth + 1, name))
            .collect::<ExpansionResult<Vec<String>>>()?;
        let body = (function.body)(&args);
        out.push_str(&self.expand_at_depth(&body, ctx, depth + 1, name)?);
        Ok(())
    }
}

impl ActionExpander for Expander {
    fn expand(&self, code: &str, ctx: &ExpansionContext) -> ExpansionResult<String> {
        self.expand_at_depth(code, ctx, 0, code.trim())
    }
}
