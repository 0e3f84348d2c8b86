//! Environment variable fallback and `${VAR}` reference resolution.
//!
//! Env vars are **fallback**, not override: they only fill fields that no
//! config file set. A field that only carries its built-in default counts as
//! unset.

use std::collections::HashMap;
use std::fmt::Write as _;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// `ASSENT_*` names first, then the bare names older deployments use.
///
/// When both spellings are set the `ASSENT_*` one wins, since the first
/// mapping to fill a field marks it as set.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "ASSENT_BIND",
        field_path: "server.bind",
    },
    EnvMapping {
        var_name: "ASSENT_PORT",
        field_path: "server.port",
    },
    EnvMapping {
        var_name: "ASSENT_REQUEST_PATH",
        field_path: "server.request_path",
    },
    EnvMapping {
        var_name: "ASSENT_CALLBACK_PATH",
        field_path: "server.callback_path",
    },
    EnvMapping {
        var_name: "ASSENT_SLACK_API_TOKEN",
        field_path: "slack.api_token",
    },
    EnvMapping {
        var_name: "ASSENT_SLACK_VERIFICATION_TOKEN",
        field_path: "slack.verification_token",
    },
    EnvMapping {
        var_name: "ASSENT_SLACK_USERNAME",
        field_path: "slack.username",
    },
    EnvMapping {
        var_name: "ASSENT_SLACK_ICON_EMOJI",
        field_path: "slack.icon_emoji",
    },
    EnvMapping {
        var_name: "ASSENT_SLACK_API_URL",
        field_path: "slack.api_url",
    },
    EnvMapping {
        var_name: "ASSENT_DEFAULT_TIMEOUT_SECS",
        field_path: "approval.default_timeout_secs",
    },
    EnvMapping {
        var_name: "ASSENT_MIN_TIMEOUT_SECS",
        field_path: "approval.min_timeout_secs",
    },
    EnvMapping {
        var_name: "ASSENT_MAX_TIMEOUT_SECS",
        field_path: "approval.max_timeout_secs",
    },
    EnvMapping {
        var_name: "ASSENT_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "ASSENT_LOG_FORMAT",
        field_path: "logging.format",
    },
    // Legacy bare names.
    EnvMapping {
        var_name: "PORT",
        field_path: "server.port",
    },
    EnvMapping {
        var_name: "REQUEST_PATH",
        field_path: "server.request_path",
    },
    EnvMapping {
        var_name: "API_TOKEN",
        field_path: "slack.api_token",
    },
    EnvMapping {
        var_name: "VERIFICATION_TOKEN",
        field_path: "slack.verification_token",
    },
    EnvMapping {
        var_name: "USER_NAME",
        field_path: "slack.username",
    },
    EnvMapping {
        var_name: "ICON_EMOJI",
        field_path: "slack.icon_emoji",
    },
];

/// Apply environment variable fallbacks to fields that no config file set.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let set_by_file = sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults);
        if set_by_file {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );

            set_field_from_string(merged, mapping.field_path, val);
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    count
}

/// Resolve `${VAR}` references within string values in the config tree.
///
/// References that don't resolve are left as-is.
pub fn resolve_env_references<S: ::std::hash::BuildHasher>(
    val: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) {
    match val {
        toml::Value::String(s) => {
            *s = resolve_string_refs(s, env_vars);
        },
        toml::Value::Table(table) => {
            for (_, child) in table.iter_mut() {
                resolve_env_references(child, env_vars);
            }
        },
        toml::Value::Array(arr) => {
            for child in arr.iter_mut() {
                resolve_env_references(child, env_vars);
            }
        },
        _ => {},
    }
}

/// Replace `${VAR}` references in a string with their env var values.
fn resolve_string_refs<S: ::std::hash::BuildHasher>(
    input: &str,
    env_vars: &HashMap<String, String, S>,
) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            let mut closed = false;

            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                var_name.push(ch);
            }

            if closed && !var_name.is_empty() {
                if let Some(val) = env_vars.get(&var_name) {
                    result.push_str(val);
                } else {
                    debug!(var = var_name, "unresolved env var reference in config");
                    let _ = write!(result, "${{{var_name}}}");
                }
            } else {
                // Malformed reference, leave as-is.
                result.push_str("${");
                result.push_str(&var_name);
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Set a dotted field in the TOML tree, creating intermediate tables.
fn set_field_from_string(root: &mut toml::Value, path: &str, val: &str) {
    let toml_val = coerce_to_toml_value(path, val);
    let Some((parents, leaf)) = path.rsplit_once('.') else {
        if let Some(table) = root.as_table_mut() {
            table.insert(path.to_owned(), toml_val);
        }
        return;
    };

    let mut current = root;
    for segment in parents.split('.') {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), toml_val);
    }
}

/// Coerce a string env var value to the TOML type of the target field.
fn coerce_to_toml_value(path: &str, val: &str) -> toml::Value {
    if matches!(
        path,
        "server.port"
            | "slack.request_timeout_secs"
            | "approval.default_timeout_secs"
            | "approval.min_timeout_secs"
            | "approval.max_timeout_secs"
    ) && let Ok(i) = val.trim().parse::<i64>()
    {
        return toml::Value::Integer(i);
    }

    toml::Value::String(val.to_owned())
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_apply_env_fallbacks() {
        let mut merged: toml::Value = toml::from_str("[server]\nport = 8080").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("server.port".to_owned(), ConfigLayer::Defaults);
        let env = make_env(&[("ASSENT_PORT", "9090"), ("ASSENT_SLACK_API_TOKEN", "xoxb-1")]);

        let count = apply_env_fallbacks(&mut merged, &mut sources, &env);

        assert_eq!(count, 2);
        assert_eq!(merged["server"]["port"].as_integer(), Some(9090));
        assert_eq!(merged["slack"]["api_token"].as_str(), Some("xoxb-1"));
        assert_eq!(sources.get("server.port"), Some(&ConfigLayer::Environment));
    }

    #[test]
    fn test_timeout_bounds_from_env() {
        let mut merged: toml::Value = toml::from_str("[approval]\ndefault_timeout_secs = 60").unwrap();
        let mut sources = FieldSources::new();
        let env = make_env(&[
            ("ASSENT_MIN_TIMEOUT_SECS", "5"),
            ("ASSENT_DEFAULT_TIMEOUT_SECS", "30"),
            ("ASSENT_MAX_TIMEOUT_SECS", "120"),
        ]);

        let count = apply_env_fallbacks(&mut merged, &mut sources, &env);

        assert_eq!(count, 3);
        assert_eq!(merged["approval"]["min_timeout_secs"].as_integer(), Some(5));
        assert_eq!(merged["approval"]["default_timeout_secs"].as_integer(), Some(30));
        assert_eq!(merged["approval"]["max_timeout_secs"].as_integer(), Some(120));
        assert_eq!(
            sources.get("approval.min_timeout_secs"),
            Some(&ConfigLayer::Environment)
        );
    }

    #[test]
    fn test_env_fallback_skips_file_values() {
        let mut merged: toml::Value = toml::from_str("[server]\nport = 7000").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("server.port".to_owned(), ConfigLayer::User);

        let env = make_env(&[("PORT", "9090")]);
        let count = apply_env_fallbacks(&mut merged, &mut sources, &env);

        assert_eq!(count, 0);
        assert_eq!(merged["server"]["port"].as_integer(), Some(7000));
    }

    #[test]
    fn test_legacy_names() {
        let mut merged: toml::Value = toml::from_str("").unwrap();
        let mut sources = FieldSources::new();
        let env = make_env(&[
            ("API_TOKEN", "xoxb-legacy"),
            ("VERIFICATION_TOKEN", "verif"),
            ("USER_NAME", "approver"),
            ("ICON_EMOJI", ":lock:"),
            ("REQUEST_PATH", "/approve"),
        ]);

        apply_env_fallbacks(&mut merged, &mut sources, &env);

        assert_eq!(merged["slack"]["api_token"].as_str(), Some("xoxb-legacy"));
        assert_eq!(merged["slack"]["verification_token"].as_str(), Some("verif"));
        assert_eq!(merged["slack"]["username"].as_str(), Some("approver"));
        assert_eq!(merged["slack"]["icon_emoji"].as_str(), Some(":lock:"));
        assert_eq!(merged["server"]["request_path"].as_str(), Some("/approve"));
    }

    #[test]
    fn test_prefixed_name_beats_legacy() {
        let mut merged: toml::Value = toml::from_str("").unwrap();
        let mut sources = FieldSources::new();
        let env = make_env(&[("API_TOKEN", "legacy"), ("ASSENT_SLACK_API_TOKEN", "prefixed")]);

        apply_env_fallbacks(&mut merged, &mut sources, &env);

        assert_eq!(merged["slack"]["api_token"].as_str(), Some("prefixed"));
    }

    #[test]
    fn test_resolve_env_references() {
        let mut val: toml::Value =
            toml::from_str("[slack]\napi_token = \"${SLACK_BOT_TOKEN}\"").unwrap();
        let env = make_env(&[("SLACK_BOT_TOKEN", "xoxb-secret")]);
        resolve_env_references(&mut val, &env);

        assert_eq!(val["slack"]["api_token"].as_str(), Some("xoxb-secret"));
    }

    #[test]
    fn test_resolve_env_references_unresolved_and_malformed() {
        assert_eq!(resolve_string_refs("${MISSING}", &HashMap::new()), "${MISSING}");
        assert_eq!(resolve_string_refs("a${OPEN", &HashMap::new()), "a${OPEN");
        assert_eq!(resolve_string_refs("cost $5", &HashMap::new()), "cost $5");
    }

    #[test]
    fn test_non_numeric_port_stays_string() {
        // Left as a string so deserialization reports the bad value.
        assert_eq!(
            coerce_to_toml_value("server.port", "eighty"),
            toml::Value::String("eighty".to_owned())
        );
        assert_eq!(
            coerce_to_toml_value("server.port", "8081"),
            toml::Value::Integer(8081)
        );
    }
}
