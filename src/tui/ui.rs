use clap::ValueEnum;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use std::collections::HashMap;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{AddField, App, ListMode, View};
use crate::config::KeyAction;

// ---------------- theme ----------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeKind {
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub bar_bg: Color,
    pub selection_bg: Color,
    pub good: Color,
    pub warn: Color,
    pub error: Color,
}

pub fn theme_of(kind: ThemeKind) -> Theme {
    match kind {
        ThemeKind::Dark => Theme {
            fg: Color::Rgb(220, 220, 220),
            muted: Color::Rgb(140, 140, 140),
            accent: Color::Rgb(95, 175, 255),
            bar_bg: Color::Rgb(35, 40, 46),
            selection_bg: Color::Rgb(60, 65, 72),
            good: Color::Rgb(130, 200, 120),
            warn: Color::Rgb(255, 200, 110),
            error: Color::Rgb(240, 110, 110),
        },
        ThemeKind::Light => Theme {
            fg: Color::Rgb(30, 30, 30),
            muted: Color::Rgb(120, 120, 120),
            accent: Color::Rgb(0, 122, 255),
            bar_bg: Color::Rgb(235, 240, 245),
            selection_bg: Color::Rgb(210, 220, 235),
            good: Color::Rgb(38, 166, 91),
            warn: Color::Rgb(255, 160, 0),
            error: Color::Rgb(200, 40, 40),
        },
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1]);
    horiz[1]
}

/// Cuts `s` to at most `maxw` terminal columns, marking the cut with `…`.
fn truncate_to_width(s: &str, maxw: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.width() <= maxw {
        return flat;
    }
    let mut out = String::new();
    let mut w = 0;
    for ch in flat.chars() {
        let cw = ch.width().unwrap_or(0);
        if w + cw + 1 > maxw {
            break;
        }
        out.push(ch);
        w += cw;
    }
    out.push('…');
    out
}

pub fn draw(f: &mut Frame, app: &mut App) {
    // tab bar + body + status + footer
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_tabs(f, v[0], app);
    match app.view {
        View::Study => draw_study(f, v[1], app),
        View::Add => draw_add(f, v[1], app),
        View::List(mode) => draw_list(f, v[1], app, mode),
    }
    draw_status(f, v[2], app);
    draw_footer(f, v[3], app);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme;
    let state = app.session.state();
    let mut segs = vec![Span::styled(
        " Cards ",
        Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
    )];
    for tab in &state.tabs {
        let style = if tab.id == state.active_tab_id {
            Style::default()
                .fg(th.fg)
                .bg(th.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(th.muted)
        };
        segs.push(Span::raw(" "));
        segs.push(Span::styled(format!(" {} ", tab.name), style));
    }
    let para = Paragraph::new(Line::from(segs)).style(Style::default().bg(th.bar_bg).fg(th.fg));
    f.render_widget(para, area);
}

/// Label of the key bound to `action`; the smallest char wins when several are.
fn key_label(keymap: &HashMap<char, KeyAction>, action: KeyAction) -> Option<String> {
    let ch = keymap
        .iter()
        .filter(|(_, a)| **a == action)
        .map(|(c, _)| *c)
        .min()?;
    Some(match ch {
        ' ' => "Space".to_string(),
        c => c.to_string(),
    })
}

/// `[key]label`, or nothing when the action has no binding.
fn hint(keymap: &HashMap<char, KeyAction>, action: KeyAction, label: &str) -> Option<String> {
    key_label(keymap, action).map(|k| format!("[{k}]{label}"))
}

fn join_hints<I: IntoIterator<Item = Option<String>>>(hints: I) -> String {
    let parts: Vec<String> = hints.into_iter().flatten().collect();
    format!(" {} ", parts.join("  "))
}

fn draw_study(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme;
    let live = app.session.active_cards().len();
    let tab_name = app
        .session
        .state()
        .active_tab()
        .map(|t| t.name.as_str())
        .unwrap_or("Study");
    let block = Block::default()
        .title(Span::styled(
            format!(" {tab_name} · {live} cards "),
            Style::default().fg(th.accent),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(th.muted));
    let card_area = centered_rect(80, 80, area);

    let Some(card) = app.session.current_card() else {
        let empty = match key_label(&app.keymap, KeyAction::AddCard) {
            Some(k) => format!("No cards yet. Press {k} to add one!"),
            None => "No cards yet.".to_string(),
        };
        let para = Paragraph::new(vec![
            Line::from(Span::styled(empty, Style::default().fg(th.fg))),
            Line::from(Span::styled("...", Style::default().fg(th.muted))),
        ])
        .block(block)
        .wrap(Wrap { trim: false });
        f.render_widget(para, card_area);
        return;
    };

    let mut lines: Vec<Line> = card
        .front
        .lines()
        .map(|l| {
            Line::from(Span::styled(
                l.to_string(),
                Style::default().fg(th.fg).add_modifier(Modifier::BOLD),
            ))
        })
        .collect();
    lines.push(Line::from(""));
    if app.session.is_revealed() {
        lines.push(Line::from(Span::styled(
            "─".repeat(card_area.width.saturating_sub(4) as usize),
            Style::default().fg(th.muted),
        )));
        lines.extend(card.back.lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::from(""));
        let mut spans = Vec::new();
        let ratings = [
            (KeyAction::Correct, " correct", th.good),
            (KeyAction::Incorrect, " missed", th.warn),
        ];
        for (action, label, color) in ratings {
            if let Some(h) = hint(&app.keymap, action, label) {
                spans.push(Span::styled(h, Style::default().fg(color)));
                spans.push(Span::raw("   "));
            }
        }
        spans.push(Span::styled(
            format!("weight {}", card.weight),
            Style::default().fg(th.muted),
        ));
        lines.push(Line::from(spans));
    } else if let Some(h) = hint(&app.keymap, KeyAction::Reveal, " reveal") {
        lines.push(Line::from(Span::styled(h, Style::default().fg(th.muted))));
    }
    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(para, card_area);
}

fn draw_add(f: &mut Frame, area: Rect, app: &mut App) {
    let th = app.theme;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    for (field, title) in [(AddField::Front, " Front "), (AddField::Back, " Back ")] {
        let focused = app.add_focus == field;
        let border = if focused { th.accent } else { th.muted };
        let block = Block::default()
            .title(Span::styled(title, Style::default().fg(border)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let (input, rect) = match field {
            AddField::Front => (&mut app.front, rows[0]),
            AddField::Back => (&mut app.back, rows[1]),
        };
        input.set_block(block);
        input.set_cursor_style(if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        });
        f.render_widget(&*input, rect);
    }
}

fn draw_list(f: &mut Frame, area: Rect, app: &mut App, mode: ListMode) {
    let th = app.theme;
    let title = match mode {
        ListMode::Manage => " Manage Cards ",
        ListMode::Archive => " Archive ",
    };
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(th.accent)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(th.muted));
    let cards = match mode {
        ListMode::Manage => app.session.active_cards(),
        ListMode::Archive => app.session.archived_cards(),
    };
    if cards.is_empty() {
        let para = Paragraph::new(Line::from(Span::styled(
            "No cards found.",
            Style::default().fg(th.muted),
        )))
        .block(block);
        f.render_widget(para, area);
        return;
    }
    let maxw = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = cards
        .iter()
        .map(|c| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    truncate_to_width(&c.front, maxw),
                    Style::default().fg(th.fg).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    truncate_to_width(&c.back, maxw),
                    Style::default().fg(th.muted),
                )),
            ])
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(th.selection_bg));
    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme;
    let Some(st) = &app.status else {
        return;
    };
    let color = if st.is_error { th.error } else { th.good };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", st.text),
            Style::default().fg(color),
        ))),
        area,
    );
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme;
    let tips = footer_tips(&app.view, &app.keymap);
    let help = Paragraph::new(Line::from(vec![Span::styled(
        tips,
        Style::default().fg(th.muted),
    )]))
    .style(Style::default().bg(th.bar_bg));
    f.render_widget(help, area);
}

fn footer_tips(view: &View, km: &HashMap<char, KeyAction>) -> String {
    let fixed = |s: &str| Some(s.to_string());
    match view {
        View::Study => join_hints([
            fixed("[q]quit"),
            hint(km, KeyAction::Reveal, "reveal"),
            hint(km, KeyAction::Correct, "correct"),
            hint(km, KeyAction::Incorrect, "missed"),
            hint(km, KeyAction::Archive, "archive"),
            hint(km, KeyAction::Delete, "delete"),
            hint(km, KeyAction::AddCard, "add"),
            hint(km, KeyAction::ManageList, "manage"),
            hint(km, KeyAction::ArchiveList, "archive list"),
            fixed("[←/→]tab"),
            hint(km, KeyAction::NewTab, "new tab"),
            hint(km, KeyAction::RenameTab, "rename"),
            hint(km, KeyAction::DeleteTab, "delete tab"),
            hint(km, KeyAction::Export, "export"),
            hint(km, KeyAction::Import, "import"),
        ]),
        View::Add => " [Tab]front/back  [Ctrl+S]save  [Esc]back ".to_string(),
        View::List(ListMode::Manage) => join_hints([
            fixed("[j/k]move"),
            hint(km, KeyAction::Edit, "edit"),
            hint(km, KeyAction::Archive, "archive"),
            hint(km, KeyAction::Delete, "delete"),
            fixed("[Esc]back"),
        ]),
        View::List(ListMode::Archive) => join_hints([
            fixed("[j/k]move"),
            hint(km, KeyAction::Archive, "reactivate"),
            hint(km, KeyAction::Delete, "delete"),
            fixed("[Esc]back"),
        ]),
    }
}
