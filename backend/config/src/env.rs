//! `${ENV_VAR}` substitution over the config value tree.

use anyhow::{bail, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Replace every `${VAR}` reference in string leaves with the value of
/// the environment variable. An unset referenced variable is an error.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_with(value, &|name| std::env::var(name).ok())
}

/// Substitution with an injectable lookup, for tests.
pub fn resolve_with(value: &Value, lookup: &dyn Fn(&str) -> Option<String>) -> Result<Value> {
    Ok(match value {
        Value::String(s) => Value::String(resolve_string(s, lookup)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| resolve_with(v, lookup))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), resolve_with(v, lookup)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

fn resolve_string(s: &str, lookup: &dyn Fn(&str) -> Option<String>) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in ENV_VAR_RE.captures_iter(s) {
        let whole = caps.get(0).unwrap();
        let name = &caps[1];
        let Some(value) = lookup(name) else {
            bail!("Config references unset environment variable: {name}");
        };
        out.push_str(&s[last..whole.start()]);
        out.push_str(&value);
        last = whole.end();
    }
    out.push_str(&s[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "KEY" => Some("abc123".into()),
            "PORT" => Some("9000".into()),
            _ => None,
        }
    }

    #[test]
    fn test_substitutes_nested_strings() {
        let value = json!({
            "security": { "encryptionKey": "${KEY}" },
            "note": "port=${PORT} key=${KEY}",
            "untouched": 42
        });
        let resolved = resolve_with(&value, &lookup).unwrap();
        assert_eq!(resolved["security"]["encryptionKey"], "abc123");
        assert_eq!(resolved["note"], "port=9000 key=abc123");
        assert_eq!(resolved["untouched"], 42);
    }

    #[test]
    fn test_unset_variable_is_an_error() {
        let value = json!({ "x": "${MISSING_VAR}" });
        assert!(resolve_with(&value, &lookup).is_err());
    }

    #[test]
    fn test_plain_strings_pass_through() {
        let value = json!({ "x": "no refs here" });
        assert_eq!(resolve_with(&value, &lookup).unwrap(), value);
    }
}
