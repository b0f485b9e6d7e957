//! Special commands parser for the interactive chat
//!
//! Lines starting with `/` are commands; anything else is a question for the
//! data agent. Command names are case-insensitive, arguments are kept as
//! typed.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands available in the interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Load a spreadsheet, replacing the current conversation
    Load(String),

    /// Ask the n-th (1-based) suggested question
    Pick(usize),

    /// Print the whole conversation again
    History,

    /// Show what is loaded
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a question
    None,
}

/// Parse a line of input
///
/// # Examples
///
/// ```
/// use sheetchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(
///     parse_special_command("/load https://docs.google.com/spreadsheets/d/abc").unwrap(),
///     SpecialCommand::Load("https://docs.google.com/spreadsheets/d/abc".to_string())
/// );
/// assert_eq!(parse_special_command("/PICK 2").unwrap(), SpecialCommand::Pick(2));
/// assert_eq!(parse_special_command("how many rows?").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, arg)) => (name.to_lowercase(), arg.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/load" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/load".to_string(),
            usage: "/load <spreadsheet url>".to_string(),
        }),
        "/load" => Ok(SpecialCommand::Load(arg.to_string())),

        "/pick" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/pick".to_string(),
            usage: "/pick <number>".to_string(),
        }),
        "/pick" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => Ok(SpecialCommand::Pick(n)),
            _ => Err(CommandError::UnsupportedArgument {
                command: "/pick".to_string(),
                arg: arg.to_string(),
            }),
        },

        "/history" => Ok(SpecialCommand::History),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the command help
pub fn print_help() {
    println!(
        r#"
Sheetchat commands:

  /load <url>    Load a spreadsheet (clears the conversation)
  /pick <n>      Ask the n-th suggested question
  /history       Print the whole conversation
  /status        Show what is loaded
  /help          Show this help
  /quit          Leave the chat

Anything else is sent to the data agent as a question.
"#
    );
}
