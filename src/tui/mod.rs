// Terminal front end: study view, add form, manage/archive lists.

mod prompt;
mod ui;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use carddeck::error::CardError;
use carddeck::prompt::Prompter;
use carddeck::session::{Action, Outcome, Session};
use carddeck::store::FileStore;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, buffer::Buffer, widgets::ListState, Terminal};
use tui_textarea::TextArea;

use crate::config::KeyAction;
pub use ui::{theme_of, Theme, ThemeKind};

use self::prompt::TerminalPrompter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListMode {
    Manage,
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Study,
    Add,
    List(ListMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddField {
    Front,
    Back,
}

#[derive(Debug, Clone)]
struct Status {
    text: String,
    is_error: bool,
}

pub struct App {
    session: Session<FileStore>,
    view: View,
    list_state: ListState,
    front: TextArea<'static>,
    back: TextArea<'static>,
    add_focus: AddField,
    theme: Theme,
    keymap: HashMap<char, KeyAction>,
    status: Option<Status>,
    export_dir: PathBuf,
}

impl App {
    pub fn new(
        session: Session<FileStore>,
        theme: Theme,
        keymap: HashMap<char, KeyAction>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            session,
            view: View::Study,
            list_state: ListState::default(),
            front: TextArea::default(),
            back: TextArea::default(),
            add_focus: AddField::Front,
            theme,
            keymap,
            status: None,
            export_dir,
        }
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    fn error(&mut self, err: &CardError) {
        if !err.is_user_error() {
            log::error!("{err}");
        }
        self.status = Some(Status {
            text: err.to_string(),
            is_error: true,
        });
    }

    /// Cards shown by the current list view, in stored order.
    fn list_ids(&self) -> Vec<String> {
        let cards = match self.view {
            View::List(ListMode::Manage) => self.session.active_cards(),
            View::List(ListMode::Archive) => self.session.archived_cards(),
            _ => vec![],
        };
        cards.into_iter().map(|c| c.id.clone()).collect()
    }

    fn selected_id(&self) -> Option<String> {
        let idx = self.list_state.selected()?;
        self.list_ids().into_iter().nth(idx)
    }

    fn clamp_selection(&mut self) {
        let n = self.list_ids().len();
        match self.list_state.selected() {
            _ if n == 0 => self.list_state.select(None),
            Some(i) if i >= n => self.list_state.select(Some(n - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let n = self.list_ids().len();
        if n == 0 {
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as isize;
        let next = (cur + delta).clamp(0, n as isize - 1) as usize;
        self.list_state.select(Some(next));
    }

    fn show_study(&mut self) {
        self.view = View::Study;
        self.session.refresh();
    }

    fn open_list(&mut self, mode: ListMode) {
        self.view = View::List(mode);
        self.list_state.select(None);
        self.clamp_selection();
    }

    fn open_add(&mut self) {
        self.view = View::Add;
        self.add_focus = AddField::Front;
    }

    /// Runs an action and reports failures on the status line.
    fn run(&mut self, action: Action, prompter: &mut dyn Prompter) -> Option<Outcome> {
        match self.session.dispatch(action, prompter) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.error(&e);
                None
            }
        }
    }

    fn save_card(&mut self, prompter: &mut dyn Prompter) {
        let front = self.front.lines().join("\n");
        let back = self.back.lines().join("\n");
        if front.trim().is_empty() || back.trim().is_empty() {
            self.status = Some(Status {
                text: "Please fill both sides.".into(),
                is_error: true,
            });
            return;
        }
        if self.run(Action::AddCard { front, back }, prompter).is_some() {
            self.front = TextArea::default();
            self.back = TextArea::default();
            self.add_focus = AddField::Front;
            self.info("Card added.");
        }
    }

    fn step_tab(&mut self, delta: isize, prompter: &mut dyn Prompter) {
        let tabs = &self.session.state().tabs;
        let Some(pos) = tabs
            .iter()
            .position(|t| t.id == self.session.state().active_tab_id)
        else {
            return;
        };
        let n = tabs.len() as isize;
        let next = tabs[(pos as isize + delta).rem_euclid(n) as usize].id.clone();
        self.run(Action::SwitchTab(next), prompter);
        if let View::List(_) = self.view {
            self.list_state.select(None);
            self.clamp_selection();
        }
    }

    fn export(&mut self) {
        match self.session.export_to_dir(&self.export_dir) {
            Ok(path) => self.info(format!("Exported to {}", path.display())),
            Err(e) => self.error(&e),
        }
    }

    fn import(&mut self, prompter: &mut dyn Prompter) {
        let Some(path) = prompter.prompt_text("Import backup from file:", "") else {
            return;
        };
        let path = path.trim();
        if path.is_empty() {
            return;
        }
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                self.error(&CardError::Io(e));
                return;
            }
        };
        if let Some(Outcome::Changed) = self.run(Action::Import(text), prompter) {
            self.view = View::Study;
            self.info("Data restored successfully!");
        }
    }

    fn apply_action(&mut self, action: KeyAction, prompter: &mut dyn Prompter) {
        let tab_id = self.session.state().active_tab_id.clone();
        match (action, self.view) {
            (KeyAction::Reveal, View::Study) => {
                self.run(Action::Reveal, prompter);
            }
            (KeyAction::Correct | KeyAction::Incorrect, View::Study) => {
                if self.session.is_revealed() {
                    self.run(Action::Rate(action == KeyAction::Correct), prompter);
                }
            }
            (KeyAction::Archive, View::Study) => {
                self.run(Action::ArchiveCurrent, prompter);
            }
            (KeyAction::Delete, View::Study) => {
                self.run(Action::DeleteCurrent, prompter);
            }
            (KeyAction::Archive, View::List(mode)) => {
                if let Some(id) = self.selected_id() {
                    if mode == ListMode::Manage {
                        self.run(Action::ArchiveCard(id), prompter);
                    } else if self.run(Action::UnarchiveCard(id), prompter).is_some() {
                        self.info("Card reactivated!");
                    }
                    self.clamp_selection();
                }
            }
            (KeyAction::Delete, View::List(_)) => {
                if let Some(id) = self.selected_id() {
                    self.run(Action::DeleteCard(id), prompter);
                    self.clamp_selection();
                }
            }
            (KeyAction::Edit, View::List(ListMode::Manage)) => {
                if let Some(id) = self.selected_id() {
                    self.run(Action::EditCard(id), prompter);
                }
            }
            (KeyAction::AddCard, _) => self.open_add(),
            (KeyAction::ManageList, _) => self.open_list(ListMode::Manage),
            (KeyAction::ArchiveList, _) => self.open_list(ListMode::Archive),
            (KeyAction::NextTab, _) => self.step_tab(1, prompter),
            (KeyAction::PrevTab, _) => self.step_tab(-1, prompter),
            (KeyAction::NewTab, _) => {
                if let Some(Outcome::Created(_)) = self.run(Action::AddTab, prompter) {
                    self.view = View::Study;
                }
            }
            (KeyAction::RenameTab, _) => {
                self.run(Action::RenameTab(tab_id), prompter);
            }
            (KeyAction::DeleteTab, _) => {
                if let Some(Outcome::Changed) = self.run(Action::DeleteTab(tab_id), prompter) {
                    self.view = View::Study;
                }
            }
            (KeyAction::Export, _) => self.export(),
            (KeyAction::Import, _) => self.import(prompter),
            _ => {}
        }
    }

    fn handle_add_key(&mut self, key: KeyEvent, prompter: &mut dyn Prompter) {
        match key.code {
            KeyCode::Esc => self.show_study(),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.save_card(prompter)
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.add_focus = match self.add_focus {
                    AddField::Front => AddField::Back,
                    AddField::Back => AddField::Front,
                };
            }
            _ => {
                let input = match self.add_focus {
                    AddField::Front => &mut self.front,
                    AddField::Back => &mut self.back,
                };
                input.input(key);
            }
        }
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, key: KeyEvent, prompter: &mut dyn Prompter) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        if self.view == View::Add {
            self.handle_add_key(key, prompter);
            return false;
        }
        self.status = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.view == View::Study {
                    return key.code == KeyCode::Char('q');
                }
                self.show_study();
            }
            KeyCode::Enter if self.view == View::Study => {
                self.run(Action::Reveal, prompter);
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Right => self.step_tab(1, prompter),
            KeyCode::Left => self.step_tab(-1, prompter),
            KeyCode::Char(ch) => {
                if let Some(act) = self.keymap.get(&ch).copied() {
                    self.apply_action(act, prompter);
                }
            }
            _ => {}
        }
        false
    }
}

pub fn run(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        let backdrop: Buffer = terminal.draw(|f| ui::draw(f, app))?.buffer.clone();
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        if let Event::Key(k) = event::read()? {
            if k.kind != KeyEventKind::Press {
                continue;
            }
            let mut prompter = TerminalPrompter::new(terminal, app.theme, &backdrop);
            if app.handle_key(k, &mut prompter) {
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use carddeck::prompt::{AssumeYes, Scripted};

    fn app(dir: &std::path::Path) -> App {
        let session = Session::open(FileStore::new(dir.join("deck.json"))).unwrap();
        App::new(
            session,
            theme_of(ThemeKind::Dark),
            crate::config::default_keymap(),
            dir.to_path_buf(),
        )
    }

    fn press(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE)
    }

    #[test]
    fn add_form_creates_card_and_study_shows_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let mut p = AssumeYes;
        app.handle_key(press('n'), &mut p);
        assert_eq!(app.view, View::Add);
        for ch in "Q1".chars() {
            app.handle_key(press(ch), &mut p);
        }
        app.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE), &mut p);
        for ch in "A1".chars() {
            app.handle_key(press(ch), &mut p);
        }
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), &mut p);
        assert_eq!(app.session.state().cards.len(), 1);
        assert!(app.front.lines().iter().all(|l| l.is_empty()));

        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &mut p);
        assert_eq!(app.view, View::Study);
        assert_eq!(app.session.current_card().unwrap().front, "Q1");
    }

    #[test]
    fn rating_waits_for_reveal() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.session.create_card("Q", "A").unwrap();
        app.session.refresh();
        let mut p = AssumeYes;
        app.handle_key(press('z'), &mut p);
        assert_eq!(app.session.state().cards[0].weight, 3);
        app.handle_key(press(' '), &mut p);
        app.handle_key(press('z'), &mut p);
        assert_eq!(app.session.state().cards[0].weight, 5);
    }

    #[test]
    fn deleting_only_tab_shows_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.handle_key(press('X'), &mut Scripted::new().confirm_with(true));
        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert_eq!(app.session.state().tabs.len(), 1);
    }

    #[test]
    fn archive_list_reactivates_selected() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let id = app.session.create_card("Q", "A").unwrap();
        app.session.archive_card(&id).unwrap();
        let mut p = AssumeYes;
        app.handle_key(press('A'), &mut p);
        assert_eq!(app.list_state.selected(), Some(0));
        app.handle_key(press('a'), &mut p);
        assert!(!app.session.state().card(&id).unwrap().is_archived);
        assert_eq!(app.list_state.selected(), None);
    }

    #[test]
    fn export_writes_dated_backup() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.handle_key(press('E'), &mut AssumeYes);
        let found = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().starts_with("cards_backup_"));
        assert!(found);
    }
}
