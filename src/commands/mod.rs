/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`:      Interactive chat loop
- `send`:      One-shot message into the active session
- `configure`: Set provider, API key and model
- `sessions`:  Session listing and management
- `models`:    Model catalog
*/

use crate::app::{ChatApp, SendOutcome};
use crate::error::Result;
use crate::providers::ProviderKind;
use colored::Colorize;

// Special commands parser for the chat loop
pub mod special_commands;

// Model catalog listing
pub mod models;

// Session listing and management
pub mod sessions;

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline-based loop that sends each line through the active
    //! session and handles slash commands locally. Each send is awaited
    //! before the next line is read.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `app` - Opened application
    /// * `session` - Optional session id to resume instead of the active one
    pub async fn run_chat(mut app: ChatApp, session: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        if let Some(id) = &session {
            app.select_session(id)?;
        }

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&app);
        if let Some(current) = app.current_session() {
            sessions::print_transcript(current, app.assistant_name());
        }

        loop {
            let prompt = format_prompt(&app);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    if command != SpecialCommand::None {
                        if command == SpecialCommand::Exit {
                            break;
                        }
                        if let Err(e) = handle_special_command(&mut app, command) {
                            eprintln!("{}\n", format!("Error: {}", e).red());
                        }
                        continue;
                    }

                    rl.add_history_entry(trimmed)?;
                    send_and_print(&mut app, trimmed).await;
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

        println!("Goodbye!");
        Ok(())
    }

    async fn send_and_print(app: &mut ChatApp, text: &str) {
        match app.send_message(text).await {
            Ok(Some(SendOutcome::Replied(reply))) => {
                println!("\n{}\n{}\n", app.assistant_name().cyan().bold(), reply);
            }
            Ok(Some(SendOutcome::Failed { notice })) => {
                eprintln!("\n{}\n", format!("Error: {}", notice).red());
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("{}", format!("Error: {}", e).red());
                if matches!(
                    e.downcast_ref::<crate::error::McpbotError>(),
                    Some(crate::error::McpbotError::Uninitialized)
                ) {
                    println!("Use {} to set one.", "/key <api_key>".cyan());
                }
                println!();
            }
        }
    }

    fn handle_special_command(app: &mut ChatApp, command: SpecialCommand) -> Result<()> {
        match command {
            SpecialCommand::NewSession => {
                let id = app.new_session()?.id.clone();
                println!("{}\n", format!("Started session {}", id).green());
            }
            SpecialCommand::ListSessions => sessions::print_sessions(app),
            SpecialCommand::SwitchSession(id) => {
                app.select_session(&id)?;
                if let Some(current) = app.current_session() {
                    sessions::print_transcript(current, app.assistant_name());
                }
            }
            SpecialCommand::DeleteSession(id) => {
                app.delete_session(&id)?;
                println!("{}\n", format!("Deleted session {}", id).green());
            }
            SpecialCommand::SwitchProvider(kind) => {
                app.switch_provider(kind)?;
                println!(
                    "{}",
                    format!("Switched to {} ({})", kind.display_name(), app.model()).green()
                );
                println!("Set a key with {}\n", "/key <api_key>".cyan());
            }
            SpecialCommand::SwitchModel(model) => {
                app.set_model(&model)?;
                println!("{}\n", format!("Model set to {}", app.model()).green());
            }
            SpecialCommand::SetApiKey(key) => {
                let provider = app.provider();
                let model = app.model().to_string();
                app.on_api_key_set(provider, &key, &model)?;
                println!(
                    "{}\n",
                    format!("API key set for {}", provider.display_name()).green()
                );
            }
            SpecialCommand::ListModels => {
                models::list_models(Some(app.provider()), Some((app.provider(), app.model())));
            }
            SpecialCommand::ShowStatus => print_status_display(app),
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
        Ok(())
    }

    fn format_prompt(app: &ChatApp) -> String {
        let tag = format!("[{}:{}]", app.provider(), app.model());
        let tag = if app.is_configured() {
            tag.green()
        } else {
            tag.yellow()
        };
        format!("{} >> ", tag)
    }

    fn print_welcome_banner(app: &ChatApp) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              MCP Bot Interactive Chat - Welcome!             ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Provider: {} ({})",
            app.provider().display_name().cyan(),
            app.model()
        );
        if !app.is_configured() {
            println!(
                "{}",
                "No API key set. Use /key <api_key> before chatting.".yellow()
            );
        }
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    fn print_status_display(app: &ChatApp) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     MCP Bot Session Status                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Provider:          {}", app.provider().display_name());
        println!("Model:             {}", app.model());
        println!(
            "API Key:           {}",
            if app.is_configured() {
                "set".green()
            } else {
                "not set".yellow()
            }
        );
        if let Some(current) = app.current_session() {
            println!("Session:           {} ({})", current.title, current.id);
            println!("Conversation Size: {} messages", current.messages.len());
        }
        println!("Sessions Stored:   {}", app.sessions().len());
        println!("Prompt Format:     {}", format_prompt(app));
        println!();
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::test_utils::test_config;

        #[test]
        fn test_special_commands_drive_app_state() {
            let dir = tempfile::tempdir().unwrap();
            let mut app = ChatApp::open(test_config(dir.path())).unwrap();

            handle_special_command(&mut app, SpecialCommand::SwitchProvider(ProviderKind::Gemini))
                .unwrap();
            handle_special_command(&mut app, SpecialCommand::SetApiKey("g-key".to_string()))
                .unwrap();
            handle_special_command(
                &mut app,
                SpecialCommand::SwitchModel("gemini-1.5-flash".to_string()),
            )
            .unwrap();

            assert_eq!(app.provider(), ProviderKind::Gemini);
            assert_eq!(app.model(), "gemini-1.5-flash");
            assert!(app.is_configured());
        }

        #[test]
        fn test_switch_to_unknown_session_reports_error() {
            let dir = tempfile::tempdir().unwrap();
            let mut app = ChatApp::open(test_config(dir.path())).unwrap();

            let result =
                handle_special_command(&mut app, SpecialCommand::SwitchSession("nope".to_string()));
            assert!(result.is_err());
        }

        #[test]
        fn test_prompt_shows_provider_and_model() {
            let dir = tempfile::tempdir().unwrap();
            let app = ChatApp::open(test_config(dir.path())).unwrap();

            let prompt = format_prompt(&app);
            assert!(prompt.contains("openai"));
            assert!(prompt.contains("gpt-4.1-2025-04-14"));
        }
    }
}

/// Send one message into the active session and print the reply
///
/// # Errors
///
/// Returns error if no API key is set or the session cannot be persisted.
/// A provider failure is printed and returned as an error so the process
/// exits non-zero.
pub async fn send(app: &mut ChatApp, text: &str) -> Result<()> {
    match app.send_message(text).await? {
        Some(SendOutcome::Replied(reply)) => {
            println!("{}", reply);
            Ok(())
        }
        Some(SendOutcome::Failed { notice }) => Err(anyhow::anyhow!(notice)),
        None => {
            println!("{}", "Nothing to send.".yellow());
            Ok(())
        }
    }
}

/// Set the provider, API key and model
pub fn configure(
    app: &mut ChatApp,
    provider: ProviderKind,
    api_key: &str,
    model: Option<&str>,
) -> Result<()> {
    app.on_api_key_set(provider, api_key, model.unwrap_or(""))?;
    println!(
        "{}",
        format!(
            "Configured {} with model {}",
            provider.display_name(),
            app.model()
        )
        .green()
    );
    Ok(())
}
