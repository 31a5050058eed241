//! Clipboard via the OSC 52 terminal escape
//!
//! Works over SSH and inside tmux (with `set-clipboard on`), with no
//! platform clipboard daemon required.

use std::io::{self, Write};

use base64::{Engine, engine::general_purpose::STANDARD};
use crossterm::{execute, style::Print};

/// Escape sequence that sets the system clipboard to `text`
pub fn osc52(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

pub fn copy(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Print(osc52(text)))?;
    stdout.flush()
}
