use crate::level::LintLevel;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct ActorClippyConfig {
    #[serde(default)]
    pub lints: LintsConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct LintsConfig {
    #[serde(default)]
    pub disabled: Vec<String>,

    #[serde(flatten)]
    pub levels: HashMap<String, LintLevel>,
}

pub const DEFAULT_CONFIG_FILE_NAME: &str = "actor-clippy.toml";

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut cur = Some(start_dir);
    while let Some(dir) = cur {
        let candidate = dir.join(DEFAULT_CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        cur = dir.parent();
    }
    None
}

pub fn load_config_file(path: &Path) -> Result<ActorClippyConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let cfg: ActorClippyConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(cfg)
}

pub fn load_config(
    explicit_path: Option<&Path>,
    start_dir: &Path,
) -> Result<Option<(PathBuf, ActorClippyConfig)>> {
    if let Some(p) = explicit_path {
        let cfg = load_config_file(p)?;
        return Ok(Some((p.to_path_buf(), cfg)));
    }

    let Some(p) = find_config_file(start_dir) else {
        return Ok(None);
    };
    let cfg = load_config_file(&p)?;
    Ok(Some((p, cfg)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parses_levels_and_disabled_list() {
        let cfg: ActorClippyConfig = toml::from_str(
            r#"
            [lints]
            disabled = ["schedule_tell_from_actor"]
            persist_inside_loop = "error"
            stash_more_than_once_per_handler = "allow"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.lints.disabled, vec!["schedule_tell_from_actor"]);
        assert_eq!(
            cfg.lints.levels.get("persist_inside_loop"),
            Some(&LintLevel::Error)
        );
        assert_eq!(
            cfg.lints.levels.get("stash_more_than_once_per_handler"),
            Some(&LintLevel::Allow)
        );
    }

    #[test]
    fn finds_config_in_ancestor_directory() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("workspace").join("src");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            root.path().join(DEFAULT_CONFIG_FILE_NAME),
            "[lints]\ndisabled = []\n",
        )
        .unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, root.path().join(DEFAULT_CONFIG_FILE_NAME));
    }

    #[test]
    fn explicit_path_wins_over_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("custom.toml");
        fs::write(&explicit, "[lints]\npersist_inside_loop = \"warn\"\n").unwrap();

        let (path, cfg) = load_config(Some(&explicit), dir.path()).unwrap().unwrap();
        assert_eq!(path, explicit);
        assert_eq!(
            cfg.lints.levels.get("persist_inside_loop"),
            Some(&LintLevel::Warn)
        );
    }

    #[test]
    fn missing_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(None, dir.path()).unwrap().is_none());
    }
}
