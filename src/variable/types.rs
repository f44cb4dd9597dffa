use std::collections::HashMap;

use crate::workspace::Environment;

/// Variables available for `{{name}}` substitution
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    variables: HashMap<String, String>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active variables of `env`; inactive ones and blank keys are skipped.
    /// A later duplicate key overrides an earlier one.
    pub fn from_environment(env: &Environment) -> Self {
        let mut ctx = Self::new();
        for variable in env.variables.iter().filter(|v| v.active) {
            let key = variable.key.trim();
            if !key.is_empty() {
                ctx.insert(key, variable.value.clone());
            }
        }
        ctx
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
