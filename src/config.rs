// Data file location and keymap.toml loading.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use carddeck::store::STORAGE_KEY;
use serde::Deserialize;

pub const DATA_ENV: &str = "CARDDECK_DATA";
const APP_DIR: &str = "carddeck";

/// `--file`, then `$CARDDECK_DATA`, then the platform data dir.
pub fn resolve_data_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    if let Ok(envp) = std::env::var(DATA_ENV) {
        if !envp.trim().is_empty() {
            return PathBuf::from(envp);
        }
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(format!("{STORAGE_KEY}.json"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Reveal,
    Correct,
    Incorrect,
    // study view: the shown card; lists: the selected card
    Archive,
    Delete,
    Edit,
    AddCard,
    ManageList,
    ArchiveList,
    NextTab,
    PrevTab,
    NewTab,
    RenameTab,
    DeleteTab,
    Export,
    Import,
}

#[derive(Deserialize)]
struct KeyMapToml {
    keys: HashMap<String, String>,
}

fn keymap_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("keymap.toml")];
    if let Ok(cwd) = std::env::current_dir() {
        for anc in cwd.ancestors().skip(1) {
            paths.push(anc.join("keymap.toml"));
        }
    }
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR).join("keymap.toml"));
    }
    paths
}

/// Finds the first keymap.toml; `Ok(None)` when there is none.
pub fn load_keymap() -> Result<Option<HashMap<char, KeyAction>>> {
    for p in keymap_candidates() {
        if p.exists() {
            let content = fs::read_to_string(&p)
                .with_context(|| format!("failed to read keymap: {}", p.display()))?;
            let km: KeyMapToml = toml::from_str(&content)
                .with_context(|| format!("failed to parse keymap: {}", p.display()))?;
            log::info!("loaded keymap from {}", p.display());
            return Ok(Some(parse_keymap(km.keys)));
        }
    }
    Ok(None)
}

pub fn parse_keymap(map: HashMap<String, String>) -> HashMap<char, KeyAction> {
    let mut out = HashMap::new();
    for (k, v) in map {
        let mut chars = k.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            match action_from_str(&v) {
                Some(act) => {
                    out.insert(ch, act);
                }
                None => log::warn!("unknown key action `{v}` for `{k}`"),
            }
        }
    }
    if out.is_empty() {
        out = default_keymap();
    }
    out
}

pub fn action_from_str(s: &str) -> Option<KeyAction> {
    use KeyAction::*;
    Some(match s {
        "reveal" => Reveal,
        "correct" => Correct,
        "incorrect" => Incorrect,
        "archive" => Archive,
        "delete" => Delete,
        "edit" => Edit,
        "add_card" => AddCard,
        "manage_list" => ManageList,
        "archive_list" => ArchiveList,
        "next_tab" => NextTab,
        "prev_tab" => PrevTab,
        "new_tab" => NewTab,
        "rename_tab" => RenameTab,
        "delete_tab" => DeleteTab,
        "export" => Export,
        "import" => Import,
        _ => return None,
    })
}

pub fn default_keymap() -> HashMap<char, KeyAction> {
    use KeyAction::*;
    let mut m = HashMap::new();
    m.insert(' ', Reveal);
    m.insert('g', Correct);
    m.insert('z', Incorrect);
    m.insert('a', Archive);
    m.insert('d', Delete);
    m.insert('e', Edit);
    m.insert('n', AddCard);
    m.insert('m', ManageList);
    m.insert('A', ArchiveList);
    m.insert(']', NextTab);
    m.insert('[', PrevTab);
    m.insert('T', NewTab);
    m.insert('r', RenameTab);
    m.insert('X', DeleteTab);
    m.insert('E', Export);
    m.insert('I', Import);
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let p = resolve_data_path(Some(Path::new("/tmp/deck.json")));
        assert_eq!(p, PathBuf::from("/tmp/deck.json"));
    }

    #[test]
    fn default_path_uses_storage_key() {
        if std::env::var(DATA_ENV).is_ok() {
            return;
        }
        let p = resolve_data_path(None);
        assert!(p.ends_with("carddeck/index-card-app-data.json"));
    }

    #[test]
    fn keymap_overrides_and_ignores_junk() {
        let km: KeyMapToml = toml::from_str(
            r#"
            [keys]
            "y" = "correct"
            "xx" = "incorrect"
            "q" = "no_such_action"
            "#,
        )
        .unwrap();
        let map = parse_keymap(km.keys);
        assert_eq!(map.get(&'y'), Some(&KeyAction::Correct));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn empty_keymap_falls_back_to_defaults() {
        let map = parse_keymap(HashMap::new());
        assert_eq!(map.get(&' '), Some(&KeyAction::Reveal));
        assert_eq!(map, default_keymap());
    }
}
