//! Keyboard shortcuts for page navigation and zoom
//!
//! Keys use DOM `KeyboardEvent.key` names:
//! - `ArrowLeft` / `ArrowRight`: previous / next page
//! - `+` or `=`: zoom in
//! - `-`: zoom out

/// View change triggered by a shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    PreviousPage,
    NextPage,
    ZoomIn,
    ZoomOut,
}

impl ViewCommand {
    /// Map a key name to a command; unbound keys give `None`
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(ViewCommand::PreviousPage),
            "ArrowRight" => Some(ViewCommand::NextPage),
            "+" | "=" => Some(ViewCommand::ZoomIn),
            "-" => Some(ViewCommand::ZoomOut),
            _ => None,
        }
    }
}
