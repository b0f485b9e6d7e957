//! Message rendering
//!
//! A [`Renderer`] draws one message at a time onto some surface. Renderers
//! never touch the message log, so replaying the full history on every
//! redraw only redraws it.

pub mod html;
pub mod terminal;

pub use html::HtmlRenderer;
pub use terminal::TerminalRenderer;

use crate::error::Result;
use crate::session::Message;

/// Draws messages onto a display surface
pub trait Renderer {
    /// Draw a single message
    ///
    /// Implementations match exhaustively on the message content, so every
    /// content kind has a display routine.
    fn render(&mut self, message: &Message) -> Result<()>;

    /// Draw messages in order
    fn render_all(&mut self, messages: &[Message]) -> Result<()> {
        for message in messages {
            self.render(message)?;
        }
        Ok(())
    }
}
