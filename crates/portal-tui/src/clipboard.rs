use std::io::{IsTerminal, Write};
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unsupported(String),

    #[error("clipboard write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Somewhere to put a copied secret.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Copies through the terminal with an OSC 52 escape sequence.
///
/// Works over SSH and inside most terminal multiplexers; terminals that do
/// not understand the sequence silently ignore it.
#[derive(Debug, Default)]
pub struct Osc52Clipboard;

impl Osc52Clipboard {
    pub fn sequence(text: &str) -> String {
        format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
    }
}

impl Clipboard for Osc52Clipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = std::io::stdout();
        if !stdout.is_terminal() {
            return Err(ClipboardError::Unsupported("stdout is not a terminal".into()));
        }
        stdout.write_all(Self::sequence(text).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Process-local clipboard, used headless and in tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    unavailable: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that rejects every write.
    pub fn unavailable() -> Self {
        Self {
            contents: Mutex::new(None),
            unavailable: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.unavailable {
            return Err(ClipboardError::Unsupported("permission denied".into()));
        }
        *self.contents.lock().unwrap_or_else(|e| e.into_inner()) = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osc52_sequence_is_base64_payload() {
        assert_eq!(Osc52Clipboard::sequence("hello"), "\x1b]52;c;aGVsbG8=\x07");
    }

    #[test]
    fn memory_clipboard_keeps_last_write() {
        let clip = MemoryClipboard::new();
        assert_eq!(clip.contents(), None);
        clip.write_text("one").unwrap();
        clip.write_text("two").unwrap();
        assert_eq!(clip.contents().as_deref(), Some("two"));
    }

    #[test]
    fn unavailable_clipboard_errors() {
        let clip = MemoryClipboard::unavailable();
        let err = clip.write_text("x").unwrap_err();
        assert!(matches!(err, ClipboardError::Unsupported(_)));
        assert_eq!(clip.contents(), None);
    }
}
