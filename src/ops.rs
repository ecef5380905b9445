//! Card and tab lifecycle as in-memory transitions on [`AppState`].
//!
//! Every function validates first and only then mutates, so an `Err` always
//! leaves the state untouched. Persisting is the caller's job.

use log::info;

use crate::error::{CardError, Result};
use crate::model::{AppState, Card, Tab};

fn required(value: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CardError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Live cards of the active tab, in stored order.
pub fn manage_cards(state: &AppState) -> Vec<&Card> {
    state
        .cards_in_tab(&state.active_tab_id)
        .filter(|c| !c.is_archived)
        .collect()
}

pub fn archived_cards(state: &AppState) -> Vec<&Card> {
    state
        .cards_in_tab(&state.active_tab_id)
        .filter(|c| c.is_archived)
        .collect()
}

/// Adds a card to the active tab and returns its id.
pub fn create_card(state: &mut AppState, front: &str, back: &str) -> Result<String> {
    let tab_id = state.active_tab_id.clone();
    create_card_in(state, &tab_id, front, back)
}

/// Adds a card to `tab_id` without touching the active tab.
pub fn create_card_in(state: &mut AppState, tab_id: &str, front: &str, back: &str) -> Result<String> {
    let front = required(front, "front")?;
    let back = required(back, "back")?;
    if state.tab(tab_id).is_none() {
        return Err(CardError::TabNotFound(tab_id.to_string()));
    }
    let card = Card::new(tab_id, front, back);
    let id = card.id.clone();
    state.cards.push(card);
    info!("created card {id} in tab {tab_id}");
    Ok(id)
}

/// Replaces the text of a card; id and weight are kept.
pub fn edit_card(state: &mut AppState, id: &str, front: &str, back: &str) -> Result<()> {
    let front = required(front, "front")?;
    let back = required(back, "back")?;
    let card = state
        .card_mut(id)
        .ok_or_else(|| CardError::CardNotFound(id.to_string()))?;
    card.front = front;
    card.back = back;
    Ok(())
}

pub fn delete_card(state: &mut AppState, id: &str) -> Result<Card> {
    let pos = state
        .cards
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| CardError::CardNotFound(id.to_string()))?;
    info!("deleted card {id}");
    Ok(state.cards.remove(pos))
}

pub fn set_archived(state: &mut AppState, id: &str, archived: bool) -> Result<()> {
    let card = state
        .card_mut(id)
        .ok_or_else(|| CardError::CardNotFound(id.to_string()))?;
    card.is_archived = archived;
    Ok(())
}

/// Appends a tab, makes it active and returns its id.
pub fn create_tab(state: &mut AppState, name: &str) -> Result<String> {
    let name = required(name, "tab name")?;
    let tab = Tab::new(name);
    let id = tab.id.clone();
    state.tabs.push(tab);
    state.active_tab_id = id.clone();
    info!("created tab {id}");
    Ok(id)
}

pub fn rename_tab(state: &mut AppState, id: &str, name: &str) -> Result<()> {
    let name = required(name, "tab name")?;
    let tab = state
        .tab_mut(id)
        .ok_or_else(|| CardError::TabNotFound(id.to_string()))?;
    tab.name = name;
    Ok(())
}

pub fn switch_tab(state: &mut AppState, id: &str) -> Result<()> {
    if state.tab(id).is_none() {
        return Err(CardError::TabNotFound(id.to_string()));
    }
    state.active_tab_id = id.to_string();
    Ok(())
}

/// Removes a tab together with its cards. Returns how many cards went with it.
///
/// The last remaining tab cannot be deleted. When the active tab goes, the
/// first remaining tab becomes active.
pub fn delete_tab(state: &mut AppState, id: &str) -> Result<usize> {
    if state.tab(id).is_none() {
        return Err(CardError::TabNotFound(id.to_string()));
    }
    if state.tabs.len() <= 1 {
        return Err(CardError::LastTab);
    }
    let before = state.cards.len();
    state.cards.retain(|c| c.tab_id != id);
    let removed = before - state.cards.len();
    state.tabs.retain(|t| t.id != id);
    if state.active_tab_id == id {
        state.active_tab_id = state.tabs[0].id.clone();
    }
    info!("deleted tab {id} with {removed} cards");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_card_trims_and_targets_active_tab() {
        let mut s = AppState::default();
        let id = create_card(&mut s, "  Q1 ", "A1\n").unwrap();
        let c = s.card(&id).unwrap();
        assert_eq!(c.front, "Q1");
        assert_eq!(c.back, "A1");
        assert_eq!(c.tab_id, s.active_tab_id);
        assert_eq!(c.weight, 3);
    }

    #[test]
    fn create_card_rejects_blank_sides_without_mutation() {
        let mut s = AppState::default();
        let before = s.clone();
        assert!(matches!(
            create_card(&mut s, "", "A"),
            Err(CardError::EmptyField("front"))
        ));
        assert!(matches!(
            create_card(&mut s, "Q", "   "),
            Err(CardError::EmptyField("back"))
        ));
        assert_eq!(s, before);
    }

    #[test]
    fn create_card_in_other_tab_keeps_active() {
        let mut s = AppState::default();
        let general = s.tabs[0].id.clone();
        let verbs = create_tab(&mut s, "Verbs").unwrap();
        switch_tab(&mut s, &general).unwrap();
        let id = create_card_in(&mut s, &verbs, "Q", "A").unwrap();
        assert_eq!(s.card(&id).unwrap().tab_id, verbs);
        assert_eq!(s.active_tab_id, general);
        assert!(matches!(
            create_card_in(&mut s, "ghost", "Q", "A"),
            Err(CardError::TabNotFound(_))
        ));
        assert_eq!(s.cards.len(), 1);
    }

    #[test]
    fn edit_keeps_identity_and_weight() {
        let mut s = AppState::default();
        let id = create_card(&mut s, "Q", "A").unwrap();
        s.card_mut(&id).unwrap().weight = 7;
        edit_card(&mut s, &id, "Q2", "A2").unwrap();
        let c = s.card(&id).unwrap();
        assert_eq!((c.front.as_str(), c.back.as_str(), c.weight), ("Q2", "A2", 7));
        assert!(edit_card(&mut s, &id, "", "A3").is_err());
        assert_eq!(s.card(&id).unwrap().back, "A2");
    }

    #[test]
    fn archive_moves_between_lists() {
        let mut s = AppState::default();
        let id = create_card(&mut s, "Q", "A").unwrap();
        set_archived(&mut s, &id, true).unwrap();
        assert!(manage_cards(&s).is_empty());
        assert_eq!(archived_cards(&s)[0].id, id);
        set_archived(&mut s, &id, false).unwrap();
        assert_eq!(manage_cards(&s).len(), 1);
        assert!(archived_cards(&s).is_empty());
    }

    #[test]
    fn delete_card_unknown_id() {
        let mut s = AppState::default();
        assert!(matches!(
            delete_card(&mut s, "nope"),
            Err(CardError::CardNotFound(_))
        ));
    }

    #[test]
    fn create_tab_becomes_active() {
        let mut s = AppState::default();
        let id = create_tab(&mut s, "Spanish").unwrap();
        assert_eq!(s.active_tab_id, id);
        assert_eq!(s.tabs.len(), 2);
        assert!(create_tab(&mut s, " ").is_err());
        assert_eq!(s.tabs.len(), 2);
    }

    #[test]
    fn rename_tab_keeps_id() {
        let mut s = AppState::default();
        let id = s.tabs[0].id.clone();
        rename_tab(&mut s, &id, "Renamed").unwrap();
        assert_eq!(s.tabs[0].id, id);
        assert_eq!(s.tabs[0].name, "Renamed");
    }

    #[test]
    fn only_tab_cannot_be_deleted() {
        let mut s = AppState::default();
        let id = s.tabs[0].id.clone();
        let before = s.clone();
        assert!(matches!(delete_tab(&mut s, &id), Err(CardError::LastTab)));
        assert_eq!(s, before);
    }

    #[test]
    fn delete_tab_cascades_to_its_cards_only() {
        let mut s = AppState::default();
        let first = s.tabs[0].id.clone();
        create_card(&mut s, "keep", "1").unwrap();
        let second = create_tab(&mut s, "Other").unwrap();
        create_card(&mut s, "drop", "1").unwrap();
        create_card(&mut s, "drop", "2").unwrap();

        assert_eq!(delete_tab(&mut s, &second).unwrap(), 2);
        assert_eq!(s.cards.len(), 1);
        assert_eq!(s.cards[0].front, "keep");
        assert_eq!(s.active_tab_id, first);
    }

    #[test]
    fn deleting_inactive_tab_keeps_active() {
        let mut s = AppState::default();
        let first = s.tabs[0].id.clone();
        let second = create_tab(&mut s, "Other").unwrap();
        delete_tab(&mut s, &first).unwrap();
        assert_eq!(s.active_tab_id, second);
        assert_eq!(s.tabs.len(), 1);
    }

    #[test]
    fn switch_tab_requires_known_id() {
        let mut s = AppState::default();
        let first = s.tabs[0].id.clone();
        create_tab(&mut s, "Other").unwrap();
        switch_tab(&mut s, &first).unwrap();
        assert_eq!(s.active_tab_id, first);
        assert!(switch_tab(&mut s, "ghost").is_err());
        assert_eq!(s.active_tab_id, first);
    }
}
