//! Environment variable handling for secrets.
//!
//! Config values written as `"secret_from_env"` are resolved from the
//! environment at load time. Two naming patterns are tried for a path such as
//! `google.key_path`:
//!
//! 1. `MEETSLOT_SECRET_GOOGLE_KEY_PATH`
//! 2. `GOOGLE_KEY_PATH`

use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "MEETSLOT";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "MEETSLOT_SECRET";

/// Marker value that requests injection from the environment
pub const SECRET_MARKER: &str = "secret_from_env";

const SECRET_SEPARATOR: &str = "_";

/// Convert a secret path to an environment variable name
///
/// `google.key_path` becomes `MEETSLOT_SECRET_GOOGLE_KEY_PATH`.
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to its short environment variable name
///
/// `google.key_path` becomes `GOOGLE_KEY_PATH`.
pub fn short_secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

/// Get an environment variable for a secret path, trying the prefixed name first.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    env::var(secret_path_to_env_var(path))
        .or_else(|_| env::var(short_secret_path_to_env_var(path)))
        .ok()
}

/// Replace every `"secret_from_env"` string inside `value` with its environment value.
///
/// Returns `true` if any value was replaced. Markers without a matching
/// variable are left in place and logged.
pub fn inject_env_vars(value: &mut serde_json::Value) -> bool {
    use serde_json::Value;

    fn walk(path: &mut Vec<String>, obj: &mut Value) -> bool {
        let mut replaced = false;

        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    path.push(k.to_string());
                    replaced |= walk(path, v);
                    path.pop();
                }
            }
            Value::Array(arr) => {
                for (i, v) in arr.iter_mut().enumerate() {
                    path.push(i.to_string());
                    replaced |= walk(path, v);
                    path.pop();
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let path_str = path.join(".");
                if let Some(env_val) = get_secret_env_var(&path_str) {
                    *s = env_val;
                    replaced = true;
                } else {
                    warn!("env var for {} not found", path_str);
                }
            }
            _ => {}
        }

        replaced
    }

    walk(&mut Vec::new(), value)
}
