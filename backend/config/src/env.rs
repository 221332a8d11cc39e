//! `${VAR}` expansion for string values in the config tree.
//!
//! Only uppercase names (`[A-Z_][A-Z0-9_]*`) are recognised. `$${VAR}` is
//! kept as the literal text `${VAR}`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

/// Matches a reference with an optional leading `$` escape.
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

#[derive(Debug, thiserror::Error)]
#[error("environment variable `{var_name}` referenced at `{config_path}` is not set")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Expand references against an explicit variable map.
pub fn resolve_env_vars_with(
    value: &Value,
    env: &HashMap<String, String>,
) -> Result<Value, MissingEnvVarError> {
    let mut resolved = value.clone();
    expand_in_place(&mut resolved, env, &mut String::new())?;
    Ok(resolved)
}

fn expand_in_place(
    value: &mut Value,
    env: &HashMap<String, String>,
    path: &mut String,
) -> Result<(), MissingEnvVarError> {
    match value {
        Value::String(s) => {
            if s.contains("${") {
                *s = expand_str(s, env, path)?;
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                let mark = path.len();
                path.push_str(&format!("[{i}]"));
                expand_in_place(item, env, path)?;
                path.truncate(mark);
            }
        }
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                let mark = path.len();
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(key);
                expand_in_place(item, env, path)?;
                path.truncate(mark);
            }
        }
        _ => {}
    }
    Ok(())
}

fn expand_str(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    let mut missing = None;
    let out = REFERENCE.replace_all(s, |caps: &Captures<'_>| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name).filter(|v| !v.is_empty()) {
            Some(v) => v.clone(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });
    match missing {
        Some(var_name) => Err(MissingEnvVarError { var_name, config_path: path.to_string() }),
        None => Ok(out.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn expands_nested_reference() {
        let value = json!({ "telegram": { "botToken": "${BOT}" } });
        let out = resolve_env_vars_with(&value, &env(&[("BOT", "1:xyz")])).unwrap();
        assert_eq!(out["telegram"]["botToken"], "1:xyz");
    }

    #[test]
    fn escaped_reference_stays_literal() {
        let value = json!({ "menu": { "prompt": "cost $${PRICE}" } });
        let out = resolve_env_vars_with(&value, &env(&[])).unwrap();
        assert_eq!(out["menu"]["prompt"], "cost ${PRICE}");
    }

    #[test]
    fn missing_variable_reports_path() {
        let value = json!({ "telegram": { "botToken": "${NOPE}" } });
        let err = resolve_env_vars_with(&value, &env(&[])).unwrap_err();
        assert_eq!(err.var_name, "NOPE");
        assert_eq!(err.config_path, "telegram.botToken");
    }

    #[test]
    fn empty_variable_counts_as_missing() {
        let value = json!(["${EMPTY}"]);
        let err = resolve_env_vars_with(&value, &env(&[("EMPTY", "")])).unwrap_err();
        assert_eq!(err.config_path, "[0]");
    }

    #[test]
    fn lowercase_names_are_ignored() {
        let value = json!({ "a": "${lower}", "n": 3 });
        let out = resolve_env_vars_with(&value, &env(&[])).unwrap();
        assert_eq!(out, value);
    }
}
