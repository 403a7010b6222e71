use crossterm::event::{KeyCode, KeyEvent};
use portal_core::format_date;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::controller::KeyRow;

/// Scrollable list of API keys with a single selected row.
#[derive(Default)]
pub struct KeyList {
    list_state: ListState,
}

impl KeyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the selection inside `len` rows; select the first row when
    /// rows appear and nothing is selected.
    pub fn clamp(&mut self, len: usize) {
        match (self.list_state.selected(), len) {
            (_, 0) => self.list_state.select(None),
            (None, _) => self.list_state.select(Some(0)),
            (Some(i), len) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// The row under the cursor, if any.
    pub fn selected<'a>(&self, rows: &'a [KeyRow]) -> Option<&'a KeyRow> {
        rows.get(self.list_state.selected()?)
    }

    pub fn handle_key(&mut self, key: KeyEvent, len: usize) {
        self.clamp(len);
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < len {
                    self.list_state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    self.list_state.select(Some(current - 1));
                }
            }
            KeyCode::Char('g') => self.list_state.select(Some(0)),
            KeyCode::Char('G') => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, rows: &[KeyRow], is_loading: bool, area: Rect) {
        let title = if is_loading {
            format!(" Your API Keys ({}) · loading… ", rows.len())
        } else {
            format!(" Your API Keys ({}) ", rows.len())
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if rows.is_empty() {
            let text = if is_loading {
                "Loading API keys..."
            } else {
                "You don't have any API keys yet. Press n to generate your first key."
            };
            let paragraph = Paragraph::new(text)
                .block(block)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = rows.iter().map(row_item).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray).bold())
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}

fn row_item(row: &KeyRow) -> ListItem<'static> {
    let eye = if row.visible { "◉" } else { "○" };
    let mut dates = format!("Created: {}", format_date(Some(&row.created_at)));
    if row.last_used_at.is_some() {
        dates.push_str(&format!(
            "    Last used: {}",
            format_date(row.last_used_at.as_ref())
        ));
    }

    ListItem::new(vec![
        Line::from(Span::styled(row.name.clone(), Style::default().bold())),
        Line::from(vec![
            Span::styled(
                row.display_secret.clone(),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(format!(" {eye}"), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(Span::styled(dates, Style::default().fg(Color::DarkGray))),
    ])
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn clamp_tracks_row_count() {
        let mut list = KeyList::new();
        list.clamp(0);
        assert_eq!(list.selected_index(), None);
        list.clamp(3);
        assert_eq!(list.selected_index(), Some(0));
        list.handle_key(key(KeyCode::Char('G')), 3);
        assert_eq!(list.selected_index(), Some(2));
        list.clamp(2);
        assert_eq!(list.selected_index(), Some(1));
        list.clamp(0);
        assert_eq!(list.selected_index(), None);
    }

    #[test]
    fn movement_stops_at_edges() {
        let mut list = KeyList::new();
        list.handle_key(key(KeyCode::Char('k')), 2);
        assert_eq!(list.selected_index(), Some(0));
        list.handle_key(key(KeyCode::Down), 2);
        list.handle_key(key(KeyCode::Down), 2);
        assert_eq!(list.selected_index(), Some(1));
        list.handle_key(key(KeyCode::Char('g')), 2);
        assert_eq!(list.selected_index(), Some(0));
    }
}
