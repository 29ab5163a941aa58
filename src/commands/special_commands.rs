//! Special commands parser for interactive chat mode
//!
//! Lines starting with `/` are interpreted as commands that manage sessions
//! and provider settings instead of being sent to the assistant. Command
//! names are case-insensitive; arguments keep their case.

use crate::providers::ProviderKind;
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

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new session
    NewSession,

    /// List all sessions
    ListSessions,

    /// Make another session active
    SwitchSession(String),

    /// Delete a session
    DeleteSession(String),

    /// Select a provider; the stored key is discarded
    SwitchProvider(ProviderKind),

    /// Change the model of the selected provider
    SwitchModel(String),

    /// Set the API key for the selected provider
    SetApiKey(String),

    /// List the model catalog of the selected provider
    ListModels,

    /// Display provider, model and session status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a chat message
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not
/// a valid command, `CommandError::MissingArgument` if a required argument is
/// absent, and `CommandError::UnsupportedArgument` for an unknown provider.
///
/// # Examples
///
/// ```
/// use mcpbot::commands::special_commands::{parse_special_command, SpecialCommand};
/// use mcpbot::providers::ProviderKind;
///
/// let cmd = parse_special_command("/provider gemini").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchProvider(ProviderKind::Gemini));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // Bare exit/quit are accepted without the slash
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/new" => Ok(SpecialCommand::NewSession),
        "/sessions" => Ok(SpecialCommand::ListSessions),
        "/switch" => required(arg, "/switch", "/switch <session_id>")
            .map(SpecialCommand::SwitchSession),
        "/delete" => required(arg, "/delete", "/delete <session_id>")
            .map(SpecialCommand::DeleteSession),
        "/provider" => {
            let value = required(arg, "/provider", "/provider <openai|gemini>")?;
            value
                .parse::<ProviderKind>()
                .map(SpecialCommand::SwitchProvider)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/provider".to_string(),
                    arg: value,
                })
        }
        "/model" => required(arg, "/model", "/model <model_name>").map(SpecialCommand::SwitchModel),
        "/key" => required(arg, "/key", "/key <api_key>").map(SpecialCommand::SetApiKey),
        "/models" => Ok(SpecialCommand::ListModels),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(name)),
    }
}

fn required(arg: &str, command: &str, usage: &str) -> Result<String, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(arg.to_string())
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

SESSIONS:
  /new                 - Start a new chat session
  /sessions            - List all sessions
  /switch <id>         - Switch to another session
  /delete <id>         - Delete a session

PROVIDER SETTINGS:
  /provider <name>     - Select provider (openai, gemini); clears the API key
  /key <api_key>       - Set the API key for the selected provider
  /model <name>        - Switch to a different model
  /models              - List models of the selected provider

OTHER:
  /status              - Show provider, model and active session
  /help                - Show this help message
  /exit                - Exit the chat (also: exit, quit)

Anything else is sent to the assistant along with the whole session history.
"#
    );
}
