//! The study session: owns the deck, its store and the card on display.
//!
//! Every mutating call runs the matching [`ops`] transition, flushes the
//! whole deck to the store and, where the shown card may have gone stale,
//! draws a new one. A failed flush is returned to the caller while the
//! in-memory change stays applied; the next successful save catches up.
//! Card creation is the exception: it is undone so a retry starts clean.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::codec;
use crate::error::{CardError, Result};
use crate::model::{AppState, Card};
use crate::ops;
use crate::prompt::Prompter;
use crate::rate;
use crate::select;
use crate::store::{load_state, save_state, BlobStore};

pub const NEW_TAB_PROMPT: &str = "Enter new project theme name:";
pub const NEW_TAB_DEFAULT: &str = "New Project";

/// A user intent, decoupled from whatever widget produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SwitchTab(String),
    AddTab,
    RenameTab(String),
    DeleteTab(String),
    AddCard { front: String, back: String },
    EditCard(String),
    DeleteCard(String),
    ArchiveCard(String),
    UnarchiveCard(String),
    Reveal,
    Rate(bool),
    DeleteCurrent,
    ArchiveCurrent,
    Refresh,
    Import(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    /// Declined at a prompt, or nothing to act on.
    Unchanged,
    Created(String),
}

impl From<bool> for Outcome {
    fn from(changed: bool) -> Self {
        if changed {
            Self::Changed
        } else {
            Self::Unchanged
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabStats {
    pub id: String,
    pub name: String,
    pub live: usize,
    pub archived: usize,
    pub total_weight: u64,
}

pub struct Session<S: BlobStore, R: Rng = StdRng> {
    state: AppState,
    store: S,
    rng: R,
    current: Option<String>,
    revealed: bool,
}

impl<S: BlobStore> Session<S, StdRng> {
    pub fn open(store: S) -> Result<Self> {
        Self::open_with_rng(store, StdRng::from_os_rng())
    }
}

impl<S: BlobStore, R: Rng> Session<S, R> {
    /// Loads the deck (writing back any load-time repair) and draws a first card.
    pub fn open_with_rng(mut store: S, rng: R) -> Result<Self> {
        let (state, repaired) = load_state(&store)?;
        if repaired {
            save_state(&mut store, &state)?;
        }
        let mut session = Self {
            state,
            store,
            rng,
            current: None,
            revealed: false,
        };
        session.refresh();
        Ok(session)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.current.as_deref().and_then(|id| self.state.card(id))
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Cards that take part in study for the active tab.
    pub fn active_cards(&self) -> Vec<&Card> {
        ops::manage_cards(&self.state)
    }

    pub fn archived_cards(&self) -> Vec<&Card> {
        ops::archived_cards(&self.state)
    }

    pub fn save(&mut self) -> Result<()> {
        save_state(&mut self.store, &self.state)
    }

    /// Draws the next card to show and hides its back.
    pub fn refresh(&mut self) -> Option<&Card> {
        self.current = select::select_next(
            &self.state.cards,
            &self.state.active_tab_id,
            &mut self.rng,
        )
        .map(|c| c.id.clone());
        self.revealed = false;
        self.current_card()
    }

    fn refresh_if_current(&mut self, id: &str) {
        if self.current.as_deref() == Some(id) {
            self.refresh();
        }
    }

    /// Shows the back of the current card. Returns false when there is none.
    pub fn reveal(&mut self) -> bool {
        if self.current_card().is_none() {
            return false;
        }
        self.revealed = true;
        true
    }

    /// Rates the card on display and moves on to the next one.
    pub fn rate(&mut self, is_correct: bool) -> Result<bool> {
        let Some(id) = self.current.clone() else {
            return Ok(false);
        };
        self.rate_card(&id, is_correct)?;
        Ok(true)
    }

    pub fn rate_card(&mut self, id: &str, is_correct: bool) -> Result<u32> {
        let card = self
            .state
            .card_mut(id)
            .ok_or_else(|| CardError::CardNotFound(id.to_string()))?;
        rate::rate(card, is_correct);
        let weight = card.weight;
        let saved = self.save();
        self.refresh();
        saved.map(|()| weight)
    }

    pub fn create_card(&mut self, front: &str, back: &str) -> Result<String> {
        let tab_id = self.state.active_tab_id.clone();
        self.create_card_in(&tab_id, front, back)
    }

    /// Adds a card to any tab. A failed save takes the card back out, so
    /// retrying does not leave duplicates behind.
    pub fn create_card_in(&mut self, tab_id: &str, front: &str, back: &str) -> Result<String> {
        let id = ops::create_card_in(&mut self.state, tab_id, front, back)?;
        if let Err(e) = self.save() {
            warn!("save failed, dropping new card {id}: {e}");
            self.state.cards.retain(|c| c.id != id);
            return Err(e);
        }
        Ok(id)
    }

    pub fn edit_card_text(&mut self, id: &str, front: &str, back: &str) -> Result<()> {
        ops::edit_card(&mut self.state, id, front, back)?;
        self.save()
    }

    /// Asks for both sides; cancelling either prompt leaves the card alone.
    pub fn edit_card(&mut self, id: &str, prompter: &mut dyn Prompter) -> Result<bool> {
        let card = self
            .state
            .card(id)
            .ok_or_else(|| CardError::CardNotFound(id.to_string()))?;
        let (front, back) = (card.front.clone(), card.back.clone());
        let Some(front) = prompter.prompt_text("Edit Front:", &front) else {
            return Ok(false);
        };
        let Some(back) = prompter.prompt_text("Edit Back:", &back) else {
            return Ok(false);
        };
        self.edit_card_text(id, &front, &back)?;
        Ok(true)
    }

    pub fn delete_card(&mut self, id: &str, prompter: &mut dyn Prompter) -> Result<bool> {
        if self.state.card(id).is_none() {
            return Err(CardError::CardNotFound(id.to_string()));
        }
        if !prompter.confirm("Delete this card permanently?") {
            return Ok(false);
        }
        ops::delete_card(&mut self.state, id)?;
        let saved = self.save();
        self.refresh_if_current(id);
        saved.map(|()| true)
    }

    pub fn delete_current(&mut self, prompter: &mut dyn Prompter) -> Result<bool> {
        let Some(id) = self.current.clone() else {
            return Ok(false);
        };
        if !prompter.confirm("Delete this card?") {
            return Ok(false);
        }
        ops::delete_card(&mut self.state, &id)?;
        let saved = self.save();
        self.refresh();
        saved.map(|()| true)
    }

    pub fn archive_card(&mut self, id: &str) -> Result<()> {
        ops::set_archived(&mut self.state, id, true)?;
        let saved = self.save();
        self.refresh_if_current(id);
        saved
    }

    pub fn archive_current(&mut self) -> Result<bool> {
        let Some(id) = self.current.clone() else {
            return Ok(false);
        };
        self.archive_card(&id)?;
        Ok(true)
    }

    pub fn unarchive_card(&mut self, id: &str) -> Result<()> {
        ops::set_archived(&mut self.state, id, false)?;
        let saved = self.save();
        self.refresh();
        saved
    }

    pub fn create_tab_named(&mut self, name: &str) -> Result<String> {
        let id = ops::create_tab(&mut self.state, name)?;
        let saved = self.save();
        self.refresh();
        saved.map(|()| id)
    }

    pub fn create_tab(&mut self, prompter: &mut dyn Prompter) -> Result<Option<String>> {
        match prompter.prompt_text(NEW_TAB_PROMPT, NEW_TAB_DEFAULT) {
            Some(name) => self.create_tab_named(&name).map(Some),
            None => Ok(None),
        }
    }

    pub fn rename_tab(&mut self, id: &str, name: &str) -> Result<()> {
        ops::rename_tab(&mut self.state, id, name)?;
        self.save()
    }

    pub fn switch_tab(&mut self, id: &str) -> Result<()> {
        ops::switch_tab(&mut self.state, id)?;
        let saved = self.save();
        self.refresh();
        saved
    }

    /// Deletes a tab and its cards after confirmation. The last tab is
    /// refused before anything is asked.
    pub fn delete_tab(&mut self, id: &str, prompter: &mut dyn Prompter) -> Result<bool> {
        if self.state.tab(id).is_none() {
            return Err(CardError::TabNotFound(id.to_string()));
        }
        if self.state.tabs.len() <= 1 {
            return Err(CardError::LastTab);
        }
        if !prompter.confirm("Delete this tab and all its cards?") {
            return Ok(false);
        }
        ops::delete_tab(&mut self.state, id)?;
        let saved = self.save();
        self.refresh();
        saved.map(|()| true)
    }

    pub fn export(&self) -> Result<String> {
        codec::export_json(&self.state)
    }

    /// Writes a dated backup into `dir` and returns its path.
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(codec::backup_file_name(Local::now().date_naive()));
        fs::create_dir_all(dir)?;
        fs::write(&path, self.export()?)?;
        info!("exported deck to {}", path.display());
        Ok(path)
    }

    /// Replaces the whole deck with a backup after confirmation.
    ///
    /// Parse and validation happen before the prompt; any failure leaves the
    /// current deck untouched.
    pub fn import(&mut self, text: &str, prompter: &mut dyn Prompter) -> Result<bool> {
        let incoming = match codec::parse_import(text) {
            Ok(state) => state,
            Err(e) => {
                warn!("rejected import: {e}");
                return Err(e);
            }
        };
        if !prompter.confirm("This will overwrite your current data. Continue?") {
            return Ok(false);
        }
        self.state = incoming;
        self.current = None;
        self.revealed = false;
        let saved = self.save();
        info!(
            "imported {} tabs, {} cards",
            self.state.tabs.len(),
            self.state.cards.len()
        );
        self.refresh();
        saved.map(|()| true)
    }

    pub fn stats(&self) -> Vec<TabStats> {
        self.state
            .tabs
            .iter()
            .map(|tab| {
                let mut st = TabStats {
                    id: tab.id.clone(),
                    name: tab.name.clone(),
                    live: 0,
                    archived: 0,
                    total_weight: 0,
                };
                for c in self.state.cards_in_tab(&tab.id) {
                    if c.is_archived {
                        st.archived += 1;
                    } else {
                        st.live += 1;
                        st.total_weight += u64::from(c.weight);
                    }
                }
                st
            })
            .collect()
    }

    pub fn dispatch(&mut self, action: Action, prompter: &mut dyn Prompter) -> Result<Outcome> {
        Ok(match action {
            Action::SwitchTab(id) => {
                self.switch_tab(&id)?;
                Outcome::Changed
            }
            Action::AddTab => match self.create_tab(prompter)? {
                Some(id) => Outcome::Created(id),
                None => Outcome::Unchanged,
            },
            Action::RenameTab(id) => {
                let current = self
                    .state
                    .tab(&id)
                    .ok_or_else(|| CardError::TabNotFound(id.clone()))?
                    .name
                    .clone();
                match prompter.prompt_text("Rename tab:", &current) {
                    Some(name) => {
                        self.rename_tab(&id, &name)?;
                        Outcome::Changed
                    }
                    None => Outcome::Unchanged,
                }
            }
            Action::DeleteTab(id) => self.delete_tab(&id, prompter)?.into(),
            Action::AddCard { front, back } => Outcome::Created(self.create_card(&front, &back)?),
            Action::EditCard(id) => self.edit_card(&id, prompter)?.into(),
            Action::DeleteCard(id) => self.delete_card(&id, prompter)?.into(),
            Action::ArchiveCard(id) => {
                self.archive_card(&id)?;
                Outcome::Changed
            }
            Action::UnarchiveCard(id) => {
                self.unarchive_card(&id)?;
                Outcome::Changed
            }
            Action::Reveal => self.reveal().into(),
            Action::Rate(correct) => self.rate(correct)?.into(),
            Action::DeleteCurrent => self.delete_current(prompter)?.into(),
            Action::ArchiveCurrent => self.archive_current()?.into(),
            Action::Refresh => {
                self.refresh();
                Outcome::Unchanged
            }
            Action::Import(text) => self.import(&text, prompter)?.into(),
        })
    }
}
