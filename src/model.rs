//! Tabs, cards and the whole-deck state that is persisted as one document.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Weight given to a freshly created card so it surfaces soon.
pub const NEW_CARD_WEIGHT: u32 = 3;
pub const DEFAULT_TAB_NAME: &str = "General";

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: String,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: i64,
}

impl Tab {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: format!("tab-{}", Uuid::new_v4()),
            name: name.into(),
            created_at: now_millis(),
        }
    }
}

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub tab_id: String,
    pub front: String,
    pub back: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub created_at: i64,
}

impl Card {
    pub fn new(tab_id: impl Into<String>, front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id: format!("card-{}", Uuid::new_v4()),
            tab_id: tab_id.into(),
            front: front.into(),
            back: back.into(),
            weight: NEW_CARD_WEIGHT,
            is_archived: false,
            created_at: now_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub tabs: Vec<Tab>,
    pub cards: Vec<Card>,
    #[serde(default)]
    pub active_tab_id: String,
}

impl Default for AppState {
    fn default() -> Self {
        let tab = Tab::new(DEFAULT_TAB_NAME);
        Self {
            active_tab_id: tab.id.clone(),
            tabs: vec![tab],
            cards: vec![],
        }
    }
}

impl AppState {
    pub fn tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn tab_mut(&mut self, id: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tab(&self.active_tab_id)
    }

    pub fn cards_in_tab<'a>(&'a self, tab_id: &'a str) -> impl Iterator<Item = &'a Card> + 'a {
        self.cards.iter().filter(move |c| c.tab_id == tab_id)
    }

    /// Restores the load-time invariants: at least one tab, a valid
    /// `active_tab_id`, every weight >= 1. Returns whether anything changed.
    pub fn repair(&mut self) -> bool {
        let mut changed = false;
        for c in self.cards.iter_mut().filter(|c| c.weight < 1) {
            c.weight = 1;
            changed = true;
        }
        if self.tab(&self.active_tab_id).is_none() {
            if self.tabs.is_empty() {
                self.tabs.push(Tab::new(DEFAULT_TAB_NAME));
            }
            self.active_tab_id = self.tabs[0].id.clone();
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_has_general_tab() {
        let s = AppState::default();
        assert_eq!(s.tabs.len(), 1);
        assert_eq!(s.tabs[0].name, "General");
        assert_eq!(s.active_tab_id, s.tabs[0].id);
        assert!(s.cards.is_empty());
    }

    #[test]
    fn new_card_starts_boosted_and_live() {
        let c = Card::new("tab-x", "Q", "A");
        assert_eq!(c.weight, 3);
        assert!(!c.is_archived);
        assert!(c.id.starts_with("card-"));
        assert_ne!(c.id, Card::new("tab-x", "Q", "A").id);
    }

    #[test]
    fn repair_points_active_tab_at_first_tab() {
        let mut s = AppState::default();
        let second = Tab::new("Second");
        s.tabs.push(second);
        s.active_tab_id = "missing".into();
        assert!(s.repair());
        assert_eq!(s.active_tab_id, s.tabs[0].id);
        assert_eq!(s.active_tab().unwrap().name, DEFAULT_TAB_NAME);
    }

    #[test]
    fn repair_creates_tab_when_none_exist() {
        let mut s = AppState {
            tabs: vec![],
            cards: vec![],
            active_tab_id: String::new(),
        };
        assert!(s.repair());
        assert_eq!(s.tabs.len(), 1);
        assert_eq!(s.tabs[0].name, DEFAULT_TAB_NAME);
        assert_eq!(s.active_tab_id, s.tabs[0].id);
    }

    #[test]
    fn repair_clamps_zero_weight() {
        let mut s = AppState::default();
        let mut c = Card::new(s.active_tab_id.clone(), "Q", "A");
        c.weight = 0;
        s.cards.push(c);
        assert!(s.repair());
        assert_eq!(s.cards[0].weight, 1);
        assert!(!s.repair());
    }

    #[test]
    fn reads_browser_backup_fields() {
        let json = r#"{
            "tabs": [{"id": "tab-1", "name": "General", "createdAt": 1700000000000}],
            "cards": [{"id": "card-1", "tabId": "tab-1", "front": "Q", "back": "A", "createdAt": 1700000000001}],
            "activeTabId": "tab-1"
        }"#;
        let s: AppState = serde_json::from_str(json).unwrap();
        assert_eq!(s.cards[0].weight, 1);
        assert!(!s.cards[0].is_archived);
        assert_eq!(s.tabs[0].created_at, 1_700_000_000_000);
        let out = serde_json::to_value(&s).unwrap();
        assert_eq!(out["cards"][0]["tabId"], "tab-1");
        assert_eq!(out["cards"][0]["isArchived"], false);
        assert_eq!(out["activeTabId"], "tab-1");
    }
}
