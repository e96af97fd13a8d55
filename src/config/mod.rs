//! Render configuration
//! User supplied text and variables that are woven into the generated file

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expansion::Expander;
use crate::output::CodeStyle;


#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read render config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid render config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid auto expanded variable on line {line}: `{text}` (expected `name: Type`)")]
    InvalidAutoVar { line: usize, text: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Render settings. Every field is optional in the JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Copied verbatim after the generated file banner (`use` lines, attributes)
    pub file_top: String,
    /// Extra field declarations for the vars struct, e.g. `pub count: u32,`
    pub variable_declarations: String,
    /// `name: Type` lines. Each becomes a vars field and an expansion `name` -> `self.vars.name`.
    pub auto_expanded_vars: String,
    /// One level of indentation in the generated file
    pub indent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            file_top: String::new(),
            variable_declarations: String::new(),
            auto_expanded_vars: String::new(),
            indent: "    ".to_string(),
        }
    }
}

/// A single `name: Type` entry of [`RenderConfig::auto_expanded_vars`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoVar {
    pub name: String,
    pub ty: String,
}

impl RenderConfig {
    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn code_style(&self) -> CodeStyle {
        CodeStyle {
            indent: self.indent.clone(),
            ..CodeStyle::default()
        }
    }

    /// Parse `auto_expanded_vars`. Blank lines and `//` comments are skipped.
    pub fn auto_vars(&self) -> ConfigResult<Vec<AutoVar>> {
        let mut vars = Vec::new();

        for (index, raw) in self.auto_expanded_vars.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            let invalid = || ConfigError::InvalidAutoVar {
                line: index + 1,
                text: raw.to_string(),
            };

            let line = line
                .trim_start_matches("pub ")
                .trim_end_matches([',', ';'])
                .trim();
            let (name, ty) = line.split_once(':').ok_or_else(invalid)?;
            let (name, ty) = (name.trim(), ty.trim());

            let valid_name = name.starts_with(|c: char| c.is_alphabetic() || c == '_')
                && name.chars().all(|c| c.is_alphanumeric() || c == '_');
            if !valid_name || ty.is_empty() {
                return Err(invalid());
            }

            vars.push(AutoVar {
                name: name.to_string(),
                ty: ty.to_string(),
            });
        }

        Ok(vars)
    }

    /// True when the generated machine needs a vars struct
    pub fn has_vars(&self) -> bool {
        !self.variable_declarations.trim().is_empty() || !self.auto_expanded_vars.trim().is_empty()
    }

    /// Register an expansion for every auto expanded var
    pub fn register_expansions(&self, expander: &mut Expander) -> ConfigResult<()> {
        for var in self.auto_vars()? {
            log::trace!("auto expanding `{}` to a vars field", var.name);
            expander.add_vars_field_expansion(var.name);
        }
        Ok(())
    }

    /// Expander preloaded with this config's auto expanded vars
    pub fn build_expander(&self) -> ConfigResult<Expander> {
        let mut expander = Expander::new();
        self.register_expansions(&mut expander)?;
        Ok(expander)
    }
}
