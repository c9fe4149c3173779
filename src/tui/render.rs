//! Frame rendering for the terminal controller.
//!
//! Layout math is pure ([`layout`]); drawing writes crossterm commands to any
//! `Write`, so frames can be captured in tests.

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation)]

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use super::model::{ControllerModel, InputStyle};

pub const PROMPT: &str = "   : ";

pub const HINT_BAR: &str = "q:Quit c:Clear s:Save g:Generate";

pub const COMMAND_HINTS: [&str; 4] = [
    " c : Clear all files from IncludeList",
    " s : Save current file list to source",
    " g : Generate source that statically implements all files in list",
    " q : Quit",
];

// ──────────────────── layout ────────────────────

/// Framed region with inclusive corner coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Region {
    /// Rows available inside the frame.
    #[must_use]
    pub const fn inner_height(&self) -> usize {
        self.y1.saturating_sub(self.y0).saturating_sub(1) as usize
    }

    /// Columns available inside the frame.
    #[must_use]
    pub const fn inner_width(&self) -> usize {
        self.x1.saturating_sub(self.x0).saturating_sub(1) as usize
    }
}

/// Regions of the prompt-style screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub logs: Region,
    pub files: Region,
    pub commands: Region,
    pub prompt_row: u16,
    pub input_col: u16,
}

/// Compute the prompt-style layout for a `cols` x `rows` terminal.
#[must_use]
pub fn layout(cols: u16, rows: u16) -> Layout {
    let max_x = cols;
    let max_y = rows.max(10);
    let right = max_x.saturating_sub(1);
    Layout {
        logs: Region {
            x0: 0,
            y0: 0,
            x1: right,
            y1: max_y - 9,
        },
        files: Region {
            x0: 0,
            y0: max_y - 9,
            x1: right,
            y1: max_y - 7,
        },
        commands: Region {
            x0: 0,
            y0: max_y - 7,
            x1: right,
            y1: max_y - 2,
        },
        prompt_row: max_y - 1,
        input_col: PROMPT.len() as u16,
    }
}

/// Text of the summary line.
#[must_use]
pub fn summary_line(count: usize) -> String {
    format!(" {count} files in the list.")
}

/// The last `height` log lines, formatted and clipped to `width` characters.
#[must_use]
pub fn visible_logs(model: &ControllerModel, height: usize, width: usize) -> Vec<String> {
    let skip = model.logs.len().saturating_sub(height);
    model
        .logs
        .iter()
        .skip(skip)
        .map(|line| clip(&format!(" {} {}", line.stamp, line.text), width))
        .collect()
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

// ──────────────────── drawing ────────────────────

/// Draw a complete frame for the model's input style and flush.
pub fn draw<W: Write>(out: &mut W, model: &ControllerModel) -> io::Result<()> {
    queue!(out, Hide, MoveTo(0, 0), Clear(ClearType::All))?;
    match model.config.input_style {
        InputStyle::Prompt => draw_prompt_screen(out, model)?,
        InputStyle::Hotkeys => draw_hotkey_screen(out, model)?,
    }
    out.flush()
}

fn draw_prompt_screen<W: Write>(out: &mut W, model: &ControllerModel) -> io::Result<()> {
    let (cols, rows) = model.terminal_size;
    let layout = layout(cols, rows);

    draw_frame(out, layout.logs, Color::White)?;
    let logs = layout.logs;
    for (i, line) in visible_logs(model, logs.inner_height(), logs.inner_width())
        .iter()
        .enumerate()
    {
        queue!(out, MoveTo(logs.x0 + 1, logs.y0 + 1 + i as u16))?;
        write!(out, "{line}")?;
    }

    draw_frame(out, layout.files, Color::Green)?;
    let files = layout.files;
    queue!(
        out,
        MoveTo(files.x0 + 1, files.y0 + 1),
        SetForegroundColor(Color::Green)
    )?;
    write!(out, "{}", clip(&summary_line(model.file_count), files.inner_width()))?;
    queue!(out, SetAttribute(Attribute::Reset))?;

    draw_frame(out, layout.commands, Color::Magenta)?;
    let commands = layout.commands;
    queue!(out, SetForegroundColor(Color::Magenta))?;
    for (i, hint) in COMMAND_HINTS.iter().take(commands.inner_height()).enumerate() {
        queue!(out, MoveTo(commands.x0 + 1, commands.y0 + 1 + i as u16))?;
        write!(out, "{}", clip(hint, commands.inner_width()))?;
    }
    queue!(out, SetAttribute(Attribute::Reset))?;

    let input_width = usize::from(cols.saturating_sub(layout.input_col));
    let skip = model.input.chars().count().saturating_sub(input_width.saturating_sub(1));
    let visible: String = model.input.chars().skip(skip).collect();
    queue!(out, MoveTo(0, layout.prompt_row))?;
    write!(out, "{PROMPT}{visible}")?;
    let cursor = layout.input_col + visible.chars().count() as u16;
    queue!(out, MoveTo(cursor, layout.prompt_row), Show)?;
    Ok(())
}

fn draw_hotkey_screen<W: Write>(out: &mut W, model: &ControllerModel) -> io::Result<()> {
    let (cols, rows) = model.terminal_size;
    let width = usize::from(cols);

    let status = visible_logs(model, 1, width).pop().unwrap_or_default();
    queue!(out, MoveTo(0, 0))?;
    write!(out, "{status}")?;

    queue!(out, MoveTo(0, 1), SetForegroundColor(Color::Green))?;
    write!(out, "{}", clip(&summary_line(model.file_count), width))?;

    queue!(
        out,
        MoveTo(0, rows.saturating_sub(1)),
        SetAttribute(Attribute::Reset),
        SetAttribute(Attribute::Reverse)
    )?;
    write!(out, "{:<width$}", clip(HINT_BAR, width))?;
    queue!(out, SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn draw_frame<W: Write>(out: &mut W, region: Region, color: Color) -> io::Result<()> {
    let inner = region.inner_width();
    queue!(out, SetForegroundColor(color), MoveTo(region.x0, region.y0))?;
    write!(out, "┌{}┐", "─".repeat(inner))?;
    for y in region.y0 + 1..region.y1 {
        queue!(out, MoveTo(region.x0, y))?;
        write!(out, "│")?;
        queue!(out, MoveTo(region.x1, y))?;
        write!(out, "│")?;
    }
    queue!(out, MoveTo(region.x0, region.y1))?;
    write!(out, "└{}┘", "─".repeat(inner))?;
    queue!(out, SetAttribute(Attribute::Reset))?;
    Ok(())
}
