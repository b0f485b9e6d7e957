//! Interactive terminal chat handler
//!
//! Drives one [`Session`] from a readline loop and renders only the messages
//! added since the previous turn.

use super::build_controller;
use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::Result;
use crate::render::{Renderer, TerminalRenderer};
use crate::session::{Session, SessionController, SessionPhase};

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;

/// Incremental view over a session's message log
struct ChatView<W: Write> {
    renderer: TerminalRenderer<W>,
    shown: usize,
}

impl<W: Write> ChatView<W> {
    fn new(renderer: TerminalRenderer<W>) -> Self {
        Self { renderer, shown: 0 }
    }

    /// Render messages appended since the last call, then any warning
    fn show_new(&mut self, session: &mut Session) -> Result<()> {
        let messages = session.messages();
        if messages.len() < self.shown {
            self.shown = 0;
        }
        self.renderer.render_all(messages.since(self.shown))?;
        self.shown = messages.len();

        if let Some(warning) = session.warning() {
            println!("{}", warning.yellow());
            session.clear_warning();
        }
        Ok(())
    }

    fn forget(&mut self) {
        self.shown = 0;
    }
}

/// Start interactive chat mode
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `url` - Optional spreadsheet link to load before the first prompt
pub async fn run_chat(config: Config, url: Option<String>) -> Result<()> {
    tracing::info!("Starting interactive chat mode");

    let controller = build_controller(&config)?;
    let mut session = Session::new();
    let mut view = ChatView::new(TerminalRenderer::stdout());

    print_banner();

    if let Some(url) = url {
        load(&controller, &mut session, &mut view, &url).await?;
    }

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline(&format!("{} ", "sheetchat>".cyan())) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match parse_special_command(trimmed) {
                    Ok(SpecialCommand::Load(url)) => {
                        load(&controller, &mut session, &mut view, &url).await?;
                    }
                    Ok(SpecialCommand::Pick(n)) => {
                        pick(&controller, &mut session, n).await;
                        view.show_new(&mut session)?;
                    }
                    Ok(SpecialCommand::History) => {
                        view.forget();
                        view.show_new(&mut session)?;
                    }
                    Ok(SpecialCommand::ShowStatus) => print_status(&session),
                    Ok(SpecialCommand::Help) => print_help(),
                    Ok(SpecialCommand::Exit) => break,
                    Ok(SpecialCommand::None) => {
                        controller.dispatch(&mut session, trimmed).await;
                        view.show_new(&mut session)?;
                    }
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

async fn load<W: Write>(
    controller: &SessionController,
    session: &mut Session,
    view: &mut ChatView<W>,
    url: &str,
) -> Result<()> {
    println!("{}", "Loading spreadsheet...".dimmed());
    view.forget();
    if controller.submit_url(session, url).await {
        controller.refresh(session).await;
    }
    view.show_new(session)
}

async fn pick(controller: &SessionController, session: &mut Session, n: usize) {
    let key = session
        .suggestions()
        .and_then(|set| set.nth(n - 1))
        .map(|suggestion| suggestion.key.clone());

    match key {
        Some(key) => {
            controller.select_suggestion(session, &key);
            controller.dispatch_pending(session).await;
        }
        None => println!("{}", format!("No suggested question #{}", n).yellow()),
    }
}

fn print_status(session: &Session) {
    match session.phase() {
        SessionPhase::Empty | SessionPhase::Loading => println!("No spreadsheet loaded."),
        SessionPhase::Loaded | SessionPhase::Ready => {
            if let Some(dataset) = session.dataset() {
                println!("Loaded {} tables:", dataset.len());
                for table in dataset.tables() {
                    println!(
                        "  {} ({} columns, {} rows)",
                        table.name().cyan(),
                        table.columns().len(),
                        table.row_count()
                    );
                }
            }
        }
    }
    if let Some(question) = session.last_question() {
        println!("Last question: {}", question);
    }
}

fn print_banner() {
    println!("{}", "Sheetchat".green().bold());
    println!("Load a spreadsheet with /load <url>, then ask questions. Type /help for commands.");
    println!();
}
