use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const STATE_FILENAME: &str = "state.json";

/// Favorites and the last nickname used for a copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NickState {
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub last_nick: String,
}

impl NickState {
    /// Nickname used by the keyboard shortcut: last used, then the first
    /// favorite, then empty (most recent submission).
    pub fn shortcut_nick(&self) -> String {
        let last = self.last_nick.trim();
        if !last.is_empty() {
            return last.to_string();
        }
        self.favorites
            .first()
            .map(|nick| nick.trim().to_string())
            .unwrap_or_default()
    }
}

pub trait StateStore {
    fn load(&self) -> Result<NickState>;
    fn save(&self, state: &NickState) -> Result<()>;
}

/// JSON file under the state directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(STATE_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<NickState> {
        if !self.path.exists() {
            return Ok(NickState::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    fn save(&self, state: &NickState) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", self.path.display()))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
        let rendered =
            serde_json::to_string_pretty(state).context("failed to serialize nickname state")?;
        fs::write(&self.path, rendered)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<NickState>,
}

impl MemoryStore {
    pub fn with_state(state: NickState) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<NickState> {
        Ok(self.state.borrow().clone())
    }

    fn save(&self, state: &NickState) -> Result<()> {
        *self.state.borrow_mut() = state.clone();
        Ok(())
    }
}

/// Favorites bookkeeping on top of an injected store.
pub struct Favorites<'a> {
    store: &'a dyn StateStore,
}

impl<'a> Favorites<'a> {
    pub fn new(store: &'a dyn StateStore) -> Self {
        Self { store }
    }

    pub fn state(&self) -> Result<NickState> {
        self.store.load()
    }

    /// Adds `nick` once, keeping insertion order, and makes it the last
    /// used nickname. Blank input is ignored.
    pub fn add(&self, nick: &str) -> Result<Option<NickState>> {
        let nick = nick.trim();
        if nick.is_empty() {
            return Ok(None);
        }
        let mut state = self.store.load()?;
        if !state.favorites.iter().any(|existing| existing == nick) {
            state.favorites.push(nick.to_string());
        }
        state.last_nick = nick.to_string();
        self.store.save(&state)?;
        Ok(Some(state))
    }

    /// Removes every favorite equal to `nick`. The last used nickname is kept.
    pub fn remove(&self, nick: &str) -> Result<Option<NickState>> {
        let nick = nick.trim();
        if nick.is_empty() {
            return Ok(None);
        }
        let mut state = self.store.load()?;
        state.favorites.retain(|existing| existing != nick);
        self.store.save(&state)?;
        Ok(Some(state))
    }

    /// Picks a nickname as the last used one. Blank selections change nothing.
    pub fn select(&self, nick: &str) -> Result<Option<NickState>> {
        if nick.is_empty() {
            return Ok(None);
        }
        let mut state = self.store.load()?;
        state.last_nick = nick.to_string();
        self.store.save(&state)?;
        Ok(Some(state))
    }

    /// Stores the (trimmed) nickname of a copy request, even when empty.
    pub fn remember(&self, nick: &str) -> Result<String> {
        let nick = nick.trim().to_string();
        let mut state = self.store.load()?;
        state.last_nick = nick.clone();
        self.store.save(&state)?;
        Ok(nick)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{Favorites, JsonFileStore, MemoryStore, NickState, StateStore};

    fn state(favorites: &[&str], last_nick: &str) -> NickState {
        NickState {
            favorites: favorites.iter().map(ToString::to_string).collect(),
            last_nick: last_nick.to_string(),
        }
    }

    #[test]
    fn shortcut_prefers_last_nick_then_first_favorite() {
        assert_eq!(state(&["fav"], " last ").shortcut_nick(), "last");
        assert_eq!(state(&[" fav ", "other"], "  ").shortcut_nick(), "fav");
        assert_eq!(state(&[], "").shortcut_nick(), "");
    }

    #[test]
    fn add_deduplicates_and_sets_last_nick() {
        let store = MemoryStore::default();
        let favorites = Favorites::new(&store);

        favorites.add(" alice ").expect("add");
        favorites.add("bob").expect("add");
        let updated = favorites.add("alice").expect("add").expect("changed");

        assert_eq!(updated.favorites, vec!["alice", "bob"]);
        assert_eq!(updated.last_nick, "alice");
        assert_eq!(store.load().expect("load"), updated);
    }

    #[test]
    fn blank_add_and_remove_are_ignored() {
        let store = MemoryStore::with_state(state(&["alice"], "alice"));
        let favorites = Favorites::new(&store);

        assert!(favorites.add("   ").expect("add").is_none());
        assert!(favorites.remove("").expect("remove").is_none());
        assert_eq!(store.load().expect("load"), state(&["alice"], "alice"));
    }

    #[test]
    fn remove_keeps_last_nick() {
        let store = MemoryStore::with_state(state(&["alice", "bob"], "alice"));
        let favorites = Favorites::new(&store);

        let updated = favorites.remove("alice").expect("remove").expect("changed");
        assert_eq!(updated, state(&["bob"], "alice"));
    }

    #[test]
    fn remember_stores_empty_nick() {
        let store = MemoryStore::with_state(state(&["alice"], "alice"));
        let favorites = Favorites::new(&store);

        assert_eq!(favorites.remember("  ").expect("remember"), "");
        assert_eq!(store.load().expect("load").last_nick, "");
    }

    #[test]
    fn select_sets_last_nick() {
        let store = MemoryStore::with_state(state(&["alice", "bob"], "alice"));
        let favorites = Favorites::new(&store);

        favorites.select("bob").expect("select");
        assert_eq!(store.load().expect("load").last_nick, "bob");
        assert!(favorites.select("").expect("select").is_none());
    }

    #[test]
    fn json_store_round_trips_camel_case_keys() {
        let temp = tempdir().expect("tempdir");
        let store = JsonFileStore::in_dir(&temp.path().join(".sweacopy"));
        assert_eq!(store.load().expect("load missing"), NickState::default());

        store.save(&state(&["alice"], "alice")).expect("save");
        let raw = fs::read_to_string(store.path()).expect("read");
        assert!(raw.contains("\"lastNick\""));
        assert_eq!(store.load().expect("load"), state(&["alice"], "alice"));
    }

    #[test]
    fn json_store_tolerates_missing_keys() {
        let temp = tempdir().expect("tempdir");
        let store = JsonFileStore::in_dir(temp.path());
        fs::write(store.path(), r#"{"favorites":["kim"]}"#).expect("write");
        assert_eq!(store.load().expect("load"), state(&["kim"], ""));
    }

    #[test]
    fn json_store_reports_corrupt_file() {
        let temp = tempdir().expect("tempdir");
        let store = JsonFileStore::in_dir(temp.path());
        fs::write(store.path(), "{not json").expect("write");
        let error = store.load().expect_err("must fail");
        assert!(error.to_string().contains("failed to parse"));
    }
}
