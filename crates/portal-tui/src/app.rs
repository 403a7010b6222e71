use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use portal_core::Severity;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::components::key_list::KeyList;
use crate::controller::{CreationPanel, KeyController, KeyListView};
use crate::notify::Notification;

/// Slow work a key press asks for. The event loop spawns it so input keeps
/// flowing while the service call is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Create,
    ConfirmDelete,
}

impl Command {
    pub async fn run(self, controller: Arc<KeyController>) {
        match self {
            Command::Refresh => controller.refresh().await,
            Command::Create => controller.create_new().await,
            Command::ConfirmDelete => controller.confirm_delete().await,
        }
    }
}

pub struct App {
    controller: Arc<KeyController>,
    list: KeyList,
    api_base_url: String,
    should_quit: bool,
}

impl App {
    pub fn new(controller: Arc<KeyController>, api_base_url: impl Into<String>) -> Self {
        Self {
            controller,
            list: KeyList::new(),
            api_base_url: api_base_url.into(),
            should_quit: false,
        }
    }

    /// Work to kick off as soon as the page is shown.
    pub fn mount(&self) -> Command {
        Command::Refresh
    }

    pub fn controller(&self) -> &Arc<KeyController> {
        &self.controller
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Id of the highlighted key.
    pub fn selected_id(&self) -> Option<String> {
        let view = self.controller.view();
        self.list.selected(&view.keys).map(|row| row.id.clone())
    }

    pub fn is_confirming(&self) -> bool {
        self.controller.view().pending_delete_id.is_some()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        let view = self.controller.view();
        self.list.clamp(view.keys.len());

        // The confirmation dialog is modal: y/Enter deletes, anything else cancels.
        if view.pending_delete_id.is_some() {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Enter => Some(Command::ConfirmDelete),
                _ => {
                    self.controller.cancel_delete();
                    None
                }
            };
        }

        let selected = self.list.selected(&view.keys).map(|row| row.id.clone());

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('j')
            | KeyCode::Char('k')
            | KeyCode::Char('g')
            | KeyCode::Char('G')
            | KeyCode::Up
            | KeyCode::Down => {
                self.list.handle_key(key, view.keys.len());
                None
            }
            KeyCode::Char('n') => match view.pending_creation {
                CreationPanel::Idle => Some(Command::Create),
                _ => None,
            },
            KeyCode::Char('r') => Some(Command::Refresh),
            KeyCode::Char('v') => {
                if let Some(id) = selected {
                    self.controller.toggle_visibility(&id);
                }
                None
            }
            KeyCode::Char('c') => {
                if let Some(id) = selected {
                    self.controller.copy_key(&id);
                }
                None
            }
            KeyCode::Char('d') => {
                if let Some(id) = selected {
                    self.controller.request_delete(&id);
                }
                None
            }
            KeyCode::Char('a') => {
                self.controller.acknowledge_secret();
                None
            }
            KeyCode::Char('C') => {
                self.controller.copy_revealed_secret();
                None
            }
            KeyCode::Char('x') => {
                self.controller.notifier().dismiss_latest();
                None
            }
            KeyCode::Char('e') => {
                self.controller.dismiss_error();
                None
            }
            _ => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let view = self.controller.view();
        self.list.clamp(view.keys.len());
        let area = frame.area();

        let banner_height = if view.error.is_some() { 3 } else { 0 };
        let reveal_height = match view.pending_creation {
            CreationPanel::Idle => 0,
            CreationPanel::Creating => 3,
            CreationPanel::Revealed(_) => 6,
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(banner_height),
                Constraint::Length(reveal_height),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        if let Some(ref error) = view.error {
            render_error_banner(frame, error, layout[1]);
        }
        render_creation_panel(frame, &view.pending_creation, layout[2]);
        self.list
            .render(frame, &view.keys, view.is_loading, layout[3]);
        render_hint_bar(frame, &view, layout[4]);

        // Overlays
        if let Some(ref id) = view.pending_delete_id {
            let name = view
                .keys
                .iter()
                .find(|k| &k.id == id)
                .map(|k| k.name.as_str())
                .unwrap_or(id.as_str());
            render_confirm_delete_dialog(frame, name, area);
        }
        render_notifications(frame, &self.controller.notifier().active(), area);
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled(" API Key Management ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled(&self.api_base_url, Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(title, area);
    }
}

fn render_error_banner(frame: &mut Frame, error: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let paragraph = Paragraph::new(error)
        .block(block)
        .style(Style::default().fg(Color::Red));
    frame.render_widget(paragraph, area);
}

fn render_creation_panel(frame: &mut Frame, panel: &CreationPanel, area: Rect) {
    match panel {
        CreationPanel::Idle => {}
        CreationPanel::Creating => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray));
            frame.render_widget(Paragraph::new("Generating new API key…").block(block), area);
        }
        CreationPanel::Revealed(created) => {
            let block = Block::default()
                .title(" New API Key Generated ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green));
            let text = vec![
                Line::from("Make sure to copy your API key now. You won't be able to see it again!"),
                Line::from(Span::styled(
                    created.secret().to_string(),
                    Style::default().fg(Color::Green).bold(),
                )),
                Line::from(Span::styled(
                    "(C) copy   (a) I've copied my key",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            frame.render_widget(
                Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
                area,
            );
        }
    }
}

fn render_hint_bar(frame: &mut Frame, view: &KeyListView, area: Rect) {
    let hints: &[(&str, &str)] = if view.pending_delete_id.is_some() {
        &[("y", "delete"), ("any", "cancel")]
    } else if matches!(view.pending_creation, CreationPanel::Revealed(_)) {
        &[("C", "copy new key"), ("a", "acknowledge"), ("q", "quit")]
    } else {
        &[
            ("q", "quit"),
            ("j/k", "move"),
            ("n", "new key"),
            ("v", "show/hide"),
            ("c", "copy"),
            ("d", "delete"),
            ("r", "refresh"),
            ("x", "dismiss"),
        ]
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(
            format!(" {key}"),
            Style::default().fg(Color::Cyan).bold(),
        ));
        spans.push(Span::styled(
            format!(":{label}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Line::from(spans), area);
}

fn render_confirm_delete_dialog(frame: &mut Frame, name: &str, area: Rect) {
    let popup = centered_rect(50, 25, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Delete API Key ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = format!(
        "Delete \"{name}\"?\n\nThis cannot be undone. Applications using this key will stop working.\n\n(y)es / (any key) cancel"
    );
    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, popup);
}

fn render_notifications(frame: &mut Frame, notifications: &[Notification], area: Rect) {
    let width = area.width.min(48);
    let mut y = area.y + 1;

    for n in notifications.iter().rev() {
        let height = 3;
        if y + height > area.bottom() {
            break;
        }
        let rect = Rect::new(area.right().saturating_sub(width), y, width, height);
        let color = match n.severity {
            Severity::Info => Color::Blue,
            Severity::Success => Color::Green,
            Severity::Error => Color::Red,
        };
        let title = n
            .title
            .clone()
            .unwrap_or_else(|| n.severity.display_name().to_string());
        let block = Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));

        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(n.text.as_str()).block(block), rect);
        y += height;
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
