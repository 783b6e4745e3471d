//! Load configuration from XDG `config.toml` and project `.env`, then apply it to the
//! process environment with priority: **existing env > .env > XDG**.
//!
//! The explorer reads its settings from the environment afterwards, so every source ends
//! up in one place and a shell `export` always wins.

mod dotenv;
mod xdg_toml;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

pub use xdg_toml::explorer_env_key;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("unknown or non-scalar [explorer] setting: {0}")]
    UnknownSetting(String),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Where an applied value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Dotenv,
    Xdg,
}

/// Picks a value for every key that is not already set: `.env` first, then XDG.
pub fn resolve(
    dotenv: &HashMap<String, String>,
    xdg: &HashMap<String, String>,
    is_set: impl Fn(&str) -> bool,
) -> BTreeMap<String, (String, Source)> {
    let mut out = BTreeMap::new();
    for (key, value) in xdg {
        if !is_set(key) {
            out.insert(key.clone(), (value.clone(), Source::Xdg));
        }
    }
    for (key, value) in dotenv {
        if !is_set(key) {
            out.insert(key.clone(), (value.clone(), Source::Dotenv));
        }
    }
    out
}

/// Loads XDG `config.toml` for `app_name` and the project `.env`, then sets every
/// variable that is not already present in the process environment.
///
/// * `app_name`: e.g. `"topicgraph"`; the XDG path is `~/.config/<app_name>/config.toml`.
/// * `override_dir`: look for `.env` here instead of the current directory.
///
/// Returns the applied keys and their source.
pub fn load_and_apply(
    app_name: &str,
    override_dir: Option<&Path>,
) -> Result<Vec<(String, Source)>, LoadError> {
    let xdg_map = xdg_toml::load_env_map(app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    let resolved = resolve(&dotenv_map, &xdg_map, |k| std::env::var_os(k).is_some());
    let mut applied = Vec::with_capacity(resolved.len());
    for (key, (value, source)) in resolved {
        std::env::set_var(&key, value);
        applied.push((key, source));
    }
    Ok(applied)
}
