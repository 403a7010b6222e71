//! State machine tests for the TUI App.
//!
//! Each test builds an App over the zero-latency mock service, loads the
//! fixture keys, then simulates key events and runs any returned command.

mod common;

use std::sync::Arc;

use common::{controller, mock_service};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use portal_service::Latency;
use portal_tui::app::{App, Command};
use portal_tui::clipboard::MemoryClipboard;
use portal_tui::controller::CreationPanel;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

async fn make_app() -> (App, Arc<MemoryClipboard>) {
    let (ctrl, clip) = controller(Arc::new(mock_service(Latency::none())));
    let app = App::new(Arc::clone(&ctrl), "http://localhost:3000/api");
    app.mount().run(ctrl).await;
    (app, clip)
}

fn screen_text(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|frame| app.render(frame)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[tokio::test]
async fn mount_asks_for_refresh() {
    let (ctrl, _clip) = controller(Arc::new(mock_service(Latency::none())));
    let app = App::new(ctrl, "http://localhost:3000/api");
    assert_eq!(app.mount(), Command::Refresh);
    assert!(app.selected_id().is_none());
}

#[tokio::test]
async fn navigation_moves_selection() {
    let (mut app, _clip) = make_app().await;
    assert_eq!(app.selected_id().as_deref(), Some("key-1"));

    assert!(app.handle_key(char_key('j')).is_none());
    assert_eq!(app.selected_id().as_deref(), Some("key-2"));

    app.handle_key(char_key('j'));
    assert_eq!(app.selected_id().as_deref(), Some("key-2"), "stays on last row");

    app.handle_key(key(KeyCode::Up));
    assert_eq!(app.selected_id().as_deref(), Some("key-1"));

    app.handle_key(char_key('G'));
    assert_eq!(app.selected_id().as_deref(), Some("key-2"));
}

#[tokio::test]
async fn d_enters_confirm_esc_cancels() {
    let (mut app, _clip) = make_app().await;
    assert!(app.handle_key(char_key('d')).is_none());
    assert!(app.is_confirming());

    assert!(app.handle_key(key(KeyCode::Esc)).is_none());
    assert!(!app.is_confirming());
    assert_eq!(app.controller().view().keys.len(), 2);
}

#[tokio::test]
async fn confirm_dialog_swallows_other_keys() {
    let (mut app, _clip) = make_app().await;
    app.handle_key(char_key('d'));

    // 'q' cancels the dialog instead of quitting
    assert!(app.handle_key(char_key('q')).is_none());
    assert!(!app.is_confirming());
    assert!(!app.should_quit());
}

#[tokio::test]
async fn d_then_y_deletes_selected_key() {
    let (mut app, _clip) = make_app().await;
    app.handle_key(char_key('j'));
    app.handle_key(char_key('d'));

    let command = app.handle_key(char_key('y'));
    assert_eq!(command, Some(Command::ConfirmDelete));
    command.unwrap().run(Arc::clone(app.controller())).await;

    let ids: Vec<String> = app
        .controller()
        .view()
        .keys
        .into_iter()
        .map(|k| k.id)
        .collect();
    assert_eq!(ids, ["key-1"]);
    assert!(!app.is_confirming());
}

#[tokio::test]
async fn enter_confirms_delete() {
    let (mut app, _clip) = make_app().await;
    app.handle_key(char_key('d'));
    assert_eq!(
        app.handle_key(key(KeyCode::Enter)),
        Some(Command::ConfirmDelete)
    );
}

#[tokio::test]
async fn n_creates_until_acknowledged() {
    let (mut app, clip) = make_app().await;

    let command = app.handle_key(char_key('n'));
    assert_eq!(command, Some(Command::Create));
    command.unwrap().run(Arc::clone(app.controller())).await;

    let CreationPanel::Revealed(created) = app.controller().view().pending_creation else {
        panic!("expected revealed panel");
    };
    assert!(app.handle_key(char_key('n')).is_none(), "blocked while revealed");

    app.handle_key(char_key('C'));
    assert_eq!(clip.contents().as_deref(), Some(created.secret()));

    app.handle_key(char_key('a'));
    assert!(matches!(
        app.controller().view().pending_creation,
        CreationPanel::Idle
    ));
    assert_eq!(app.handle_key(char_key('n')), Some(Command::Create));
}

#[tokio::test]
async fn v_toggles_selected_row() {
    let (mut app, _clip) = make_app().await;
    app.handle_key(char_key('v'));
    assert!(app.controller().is_visible("key-1"));
    assert!(!app.controller().is_visible("key-2"));

    app.handle_key(char_key('v'));
    assert!(!app.controller().is_visible("key-1"));
}

#[tokio::test]
async fn c_copies_selected_secret() {
    let (mut app, clip) = make_app().await;
    app.handle_key(char_key('c'));
    assert_eq!(
        clip.contents().as_deref(),
        Some("pk_live_51NBzT8aKZ9DsLExGFhnJYnuSLGTOr5DYKmsNr92XE")
    );
    assert_eq!(app.controller().notifier().active().len(), 1);

    app.handle_key(char_key('x'));
    assert!(app.controller().notifier().active().is_empty());
}

#[tokio::test]
async fn r_refreshes_and_q_quits() {
    let (mut app, _clip) = make_app().await;
    assert_eq!(app.handle_key(char_key('r')), Some(Command::Refresh));
    assert!(!app.should_quit());
    app.handle_key(char_key('q'));
    assert!(app.should_quit());
}

#[tokio::test]
async fn render_masks_secrets_by_default() {
    let (mut app, _clip) = make_app().await;
    let screen = screen_text(&mut app);

    assert!(screen.contains("Production API Key"));
    assert!(screen.contains("pk_l••••••••••92XE"));
    assert!(!screen.contains("pk_live_51NBzT8a"));

    app.handle_key(char_key('v'));
    let screen = screen_text(&mut app);
    assert!(screen.contains("pk_live_51NBzT8aKZ9DsLExGFhnJYnuSLGTOr5DYKmsNr92XE"));
}

#[tokio::test]
async fn render_shows_confirm_dialog() {
    let (mut app, _clip) = make_app().await;
    app.handle_key(char_key('d'));
    let screen = screen_text(&mut app);
    assert!(screen.contains("Delete API Key"));
}

#[tokio::test]
async fn render_empty_store() {
    use portal_service::{MockKeyService, SeededKeyGenerator};
    use portal_store::MemoryKeyStore;

    let service = MockKeyService::new(
        Arc::new(MemoryKeyStore::new()),
        Arc::new(SeededKeyGenerator::new(1)),
        Latency::none(),
    );
    let (ctrl, _clip) = controller(Arc::new(service));
    let mut app = App::new(Arc::clone(&ctrl), "http://localhost:3000/api");
    app.mount().run(ctrl).await;

    let screen = screen_text(&mut app);
    assert!(screen.contains("You don't have any API keys yet"));
    assert!(app.handle_key(char_key('d')).is_none());
    assert!(!app.is_confirming());
}
