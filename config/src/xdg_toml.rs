//! Load `$XDG_CONFIG_HOME/<app>/config.toml`.
//!
//! Two tables are read: `[env]` (raw variable names) and `[explorer]` (short setting
//! names mapped onto the variables the explorer reads).
//!
//! ```toml
//! [env]
//! OPENAI_API_KEY = "sk-..."
//!
//! [explorer]
//! min_children = 3
//! model = "gpt-4o-mini"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

fn config_home() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default)]
    explorer: HashMap<String, toml::Value>,
}

/// Environment variable for an `[explorer]` key, or `None` for unknown keys.
pub fn explorer_env_key(name: &str) -> Option<&'static str> {
    Some(match name {
        "min_children" => "TOPICGRAPH_MIN_CHILDREN",
        "temperature" => "TOPICGRAPH_TEMPERATURE",
        "max_tokens" => "TOPICGRAPH_MAX_TOKENS",
        "model" => "OPENAI_MODEL",
        "api_base" => "OPENAI_BASE_URL",
        "api_key" => "OPENAI_API_KEY",
        _ => return None,
    })
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Returns env key-value pairs from `[env]` and `[explorer]` of the XDG config file.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let base = config_home()
        .ok_or_else(|| LoadError::XdgPath("no config directory for this platform".to_string()))?;
    load_env_map_from(&base, app_name)
}

/// Reads `<base>/<app_name>/config.toml`. `[explorer]` wins over `[env]` on conflicts.
/// Missing file returns an empty map.
pub fn load_env_map_from(
    base: &Path,
    app_name: &str,
) -> Result<HashMap<String, String>, LoadError> {
    let path = base.join(app_name).join("config.toml");
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;

    let mut out = config.env;
    for (name, value) in &config.explorer {
        let key = explorer_env_key(name).ok_or_else(|| LoadError::UnknownSetting(name.clone()))?;
        let value = scalar_to_string(value).ok_or_else(|| LoadError::UnknownSetting(name.clone()))?;
        out.insert(key.to_string(), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &std::path::Path, app: &str, body: &str) {
        let app_dir = dir.join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
    }

    #[test]
    fn missing_config_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let map = load_env_map_from(dir.path(), "topicgraph").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn reads_env_and_explorer_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "tg-both",
            r#"
[env]
OPENAI_API_KEY = "sk-from-toml"
OPENAI_MODEL = "overridden"

[explorer]
min_children = 3
temperature = 0.5
model = "gpt-4o-mini"
"#,
        );
        let map = load_env_map_from(dir.path(), "tg-both").unwrap();
        assert_eq!(map.get("OPENAI_API_KEY"), Some(&"sk-from-toml".to_string()));
        assert_eq!(map.get("TOPICGRAPH_MIN_CHILDREN"), Some(&"3".to_string()));
        assert_eq!(map.get("TOPICGRAPH_TEMPERATURE"), Some(&"0.5".to_string()));
        assert_eq!(map.get("OPENAI_MODEL"), Some(&"gpt-4o-mini".to_string()));
    }

    #[test]
    fn unknown_explorer_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "tg-unknown", "[explorer]\nlayout = \"radial\"\n");
        let result = load_env_map_from(dir.path(), "tg-unknown");
        assert!(matches!(result, Err(LoadError::UnknownSetting(ref k)) if k == "layout"));
    }

    #[test]
    fn invalid_toml_returns_xdg_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "tg-bad", "not valid toml [[[\n");
        let result = load_env_map_from(dir.path(), "tg-bad");
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }

    #[test]
    fn config_without_known_sections_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "tg-other", "[other]\nkey = \"ignored\"\n");
        let map = load_env_map_from(dir.path(), "tg-other").unwrap();
        assert!(map.is_empty());
    }
}
