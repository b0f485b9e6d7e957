//! Terminal renderer for the interactive chat command

use super::Renderer;
use crate::error::Result;
use crate::session::{Content, ImageRef, Message, Role};

use colored::Colorize;
use prettytable::{format, Cell, Row, Table};
use std::io::Write;

/// Writes messages to a terminal (or any writer)
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl TerminalRenderer<std::io::Stdout> {
    /// Renderer writing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn image_line(image: &ImageRef) -> String {
        let size = image
            .dimensions()
            .map(|(w, h)| format!(" ({}x{})", w, h))
            .unwrap_or_default();
        match image {
            ImageRef::File { path } => format!("[image] {}{}", path.display(), size),
            ImageRef::Inline { mime_type, data } => {
                format!("[image] inline {} ({} bytes){}", mime_type, data.len(), size)
            }
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, message: &Message) -> Result<()> {
        let label = match message.role() {
            Role::User => "You:".cyan().bold(),
            Role::Assistant => "Sheetchat:".green().bold(),
        };
        writeln!(self.out, "{}", label)?;

        match message.content() {
            Content::Text(text) => writeln!(self.out, "{}", text)?,
            Content::Markdown(text) => writeln!(self.out, "{}", text.replace("**", ""))?,
            Content::Table(table) => {
                let mut grid = Table::new();
                grid.set_format(*format::consts::FORMAT_BORDERS_ONLY);
                grid.set_titles(Row::new(
                    table
                        .columns()
                        .iter()
                        .map(|c| Cell::new(c).style_spec("b"))
                        .collect(),
                ));
                for row in table.rows() {
                    grid.add_row(Row::new(row.iter().map(|c| Cell::new(c)).collect()));
                }
                grid.print(&mut self.out)?;
                let noun = if table.row_count() == 1 { "row" } else { "rows" };
                writeln!(self.out, "{} {}", table.row_count(), noun)?;
            }
            Content::Image(image) => writeln!(self.out, "{}", Self::image_line(image).yellow())?,
            Content::Questions(questions) => {
                writeln!(self.out, "Suggested questions:")?;
                for (idx, suggestion) in questions.iter().enumerate() {
                    writeln!(self.out, "  {}. {}", idx + 1, suggestion.question)?;
                }
                writeln!(self.out, "{}", "Use /pick <n> to ask one of them.".dimmed())?;
            }
        }

        writeln!(self.out)?;
        Ok(())
    }
}
