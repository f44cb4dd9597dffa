use crate::variable::types::VariableContext;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Replaces `{{variable}}` placeholders
pub struct VariableResolver;

impl VariableResolver {
    /// Unknown variables are left as written.
    pub fn substitute(text: &str, context: &VariableContext) -> String {
        static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = VAR_REGEX.get_or_init(|| {
            Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}").expect("valid variable regex")
        });

        if context.is_empty() || !text.contains("{{") {
            return text.to_string();
        }

        re.replace_all(text, |caps: &Captures| {
            let var_name = &caps[1];
            context.get(var_name).unwrap_or(&caps[0]).to_string()
        })
        .to_string()
    }
}
