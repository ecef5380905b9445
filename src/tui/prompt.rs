// Modal confirm / text dialogs drawn over the last rendered frame.

use carddeck::prompt::Prompter;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tui_textarea::TextArea;

use super::ui::{centered_rect, Theme};

pub struct TerminalPrompter<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    theme: Theme,
    backdrop: &'a Buffer,
}

impl<'a, B: Backend> TerminalPrompter<'a, B> {
    pub fn new(terminal: &'a mut Terminal<B>, theme: Theme, backdrop: &'a Buffer) -> Self {
        Self {
            terminal,
            theme,
            backdrop,
        }
    }

    fn paint_backdrop(f: &mut Frame, backdrop: &Buffer) {
        if backdrop.area == f.area() {
            f.buffer_mut().clone_from(backdrop);
        }
    }

    fn block(theme: Theme, title: &str) -> Block<'static> {
        Block::default()
            .title(Span::styled(
                format!(" {title} "),
                Style::default().fg(theme.accent),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.muted))
    }

    fn next_press() -> std::io::Result<KeyCode> {
        loop {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press {
                    return Ok(k.code);
                }
            }
        }
    }
}

impl<B: Backend> Prompter for TerminalPrompter<'_, B> {
    fn confirm(&mut self, message: &str) -> bool {
        let (theme, backdrop) = (self.theme, self.backdrop);
        loop {
            let drawn = self.terminal.draw(|f| {
                Self::paint_backdrop(f, backdrop);
                let area = centered_rect(50, 20, f.area());
                f.render_widget(Clear, area);
                let body = vec![
                    Line::from(Span::styled(message, Style::default().fg(theme.fg))),
                    Line::from(""),
                    Line::from(Span::styled(
                        "[y] yes   [n/Esc] no",
                        Style::default().fg(theme.muted),
                    )),
                ];
                let para = Paragraph::new(body)
                    .block(Self::block(theme, "Confirm"))
                    .wrap(Wrap { trim: false });
                f.render_widget(para, area);
            });
            if let Err(e) = drawn {
                log::warn!("confirm dialog failed: {e}");
                return false;
            }
            match Self::next_press() {
                Ok(KeyCode::Char('y' | 'Y') | KeyCode::Enter) => return true,
                Ok(KeyCode::Char('n' | 'N') | KeyCode::Esc) => return false,
                Ok(_) => {}
                Err(e) => {
                    log::warn!("confirm dialog failed: {e}");
                    return false;
                }
            }
        }
    }

    fn prompt_text(&mut self, message: &str, default: &str) -> Option<String> {
        let (theme, backdrop) = (self.theme, self.backdrop);
        let mut input = TextArea::new(vec![default.to_string()]);
        input.move_cursor(tui_textarea::CursorMove::End);
        input.set_block(Self::block(theme, message));
        loop {
            let drawn = self.terminal.draw(|f| {
                Self::paint_backdrop(f, backdrop);
                let mut area = centered_rect(60, 20, f.area());
                area.height = area.height.min(3);
                f.render_widget(Clear, area);
                f.render_widget(&input, area);
            });
            if let Err(e) = drawn {
                log::warn!("text dialog failed: {e}");
                return None;
            }
            let ev = match event::read() {
                Ok(ev) => ev,
                Err(e) => {
                    log::warn!("text dialog failed: {e}");
                    return None;
                }
            };
            let Event::Key(k) = ev else { continue };
            if k.kind != KeyEventKind::Press {
                continue;
            }
            match k.code {
                KeyCode::Enter => return Some(input.lines().join(" ")),
                KeyCode::Esc => return None,
                _ => {
                    input.input(k);
                }
            }
        }
    }
}
