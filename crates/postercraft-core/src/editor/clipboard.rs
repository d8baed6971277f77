//! Copy, cut and paste.
//!
//! The clipboard payload is the JSON form of the copied shapes, so anything
//! able to hold text (an in-process buffer, the OS clipboard) can carry it.

use super::Editor;
use crate::shapes::{Shape, ShapeId};
use kurbo::Vec2;
use thiserror::Error;

/// Clipboard errors.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("Clipboard payload is not a shape list: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Text clipboard backing copy/paste.
pub trait Clipboard {
    fn set_text(&mut self, text: String) -> Result<(), ClipboardError>;
    fn get_text(&mut self) -> Result<Option<String>, ClipboardError>;
}

/// In-process clipboard buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: String) -> Result<(), ClipboardError> {
        self.text = Some(text);
        Ok(())
    }

    fn get_text(&mut self) -> Result<Option<String>, ClipboardError> {
        Ok(self.text.clone())
    }
}

/// The operating system clipboard.
#[cfg(all(feature = "os-clipboard", not(target_arch = "wasm32")))]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(all(feature = "os-clipboard", not(target_arch = "wasm32")))]
impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        arboard::Clipboard::new()
            .map(|inner| Self { inner })
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

#[cfg(all(feature = "os-clipboard", not(target_arch = "wasm32")))]
impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: String) -> Result<(), ClipboardError> {
        self.inner
            .set_text(text)
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }

    fn get_text(&mut self) -> Result<Option<String>, ClipboardError> {
        match self.inner.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(ClipboardError::Unavailable(e.to_string())),
        }
    }
}

impl Editor {
    /// Put the selected shapes on the clipboard. Returns how many were copied.
    pub fn copy(&mut self) -> Result<usize, ClipboardError> {
        let shapes: Vec<&Shape> = self
            .store
            .selected_shapes()
            .iter()
            .map(|s| s.as_ref())
            .collect();
        if shapes.is_empty() {
            return Ok(0);
        }
        let payload = serde_json::to_string(&shapes)?;
        let count = shapes.len();
        self.clipboard.set_text(payload)?;
        log::debug!("Copied {} shape(s)", count);
        Ok(count)
    }

    /// Copy the selection, then remove it immediately.
    pub fn cut(&mut self) -> Result<usize, ClipboardError> {
        let count = self.copy()?;
        if count > 0 {
            let ids = self.selected_ids().to_vec();
            self.clear_selection();
            self.remove_shapes_now(&ids);
        }
        Ok(count)
    }

    /// Append the clipboard shapes with fresh ids, offset by the paste
    /// offset, and select them.
    ///
    /// An empty clipboard or a payload that is not a shape list pastes nothing.
    pub fn paste(&mut self) -> Result<Vec<ShapeId>, ClipboardError> {
        let Some(text) = self.clipboard.get_text()? else {
            return Ok(Vec::new());
        };
        let copies: Vec<Shape> = match serde_json::from_str(&text) {
            Ok(copies) => copies,
            Err(e) => {
                log::debug!("Ignoring clipboard content: {}", e);
                return Ok(Vec::new());
            }
        };
        let offset = self.config().paste_offset;
        Ok(self.append_copies(copies, Vec2::new(offset, offset)))
    }
}
