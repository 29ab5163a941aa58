use crate::app::ChatApp;
use crate::cli::SessionCommand;
use crate::error::{McpbotError, Result};
use crate::providers::Role;
use crate::session::Session;
use colored::Colorize;
use prettytable::{format, row, Table};

const TITLE_COLUMN_WIDTH: usize = 40;

/// Handle session commands
pub fn handle_sessions(app: &mut ChatApp, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::List => print_sessions(app),
        SessionCommand::New => {
            let id = app.new_session()?.id.clone();
            println!("{}", format!("Started session {}", id).green());
        }
        SessionCommand::Show { id } => {
            let session = match id {
                Some(id) => app
                    .session(&id)
                    .ok_or_else(|| McpbotError::SessionNotFound(id.clone()))?,
                None => app
                    .current_session()
                    .ok_or_else(|| McpbotError::SessionNotFound("(active)".to_string()))?,
            };
            print_transcript(session, app.assistant_name());
        }
        SessionCommand::Select { id } => {
            app.select_session(&id)?;
            println!("{}", format!("Switched to session {}", id).green());
        }
        SessionCommand::Delete { id } => {
            app.delete_session(&id)?;
            println!("{}", format!("Deleted session {}", id).green());
        }
    }

    Ok(())
}

/// Build the session listing table; the active session is marked with `*`
pub fn sessions_table(sessions: &[Session], active: Option<&str>) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.set_titles(row!["", "ID", "Title", "Messages", "Last Updated"]);

    for session in sessions {
        let marker = if Some(session.id.as_str()) == active {
            "*"
        } else {
            ""
        };
        let title = if session.title.chars().count() > TITLE_COLUMN_WIDTH {
            let cut: String = session.title.chars().take(TITLE_COLUMN_WIDTH - 3).collect();
            format!("{}...", cut)
        } else {
            session.title.clone()
        };
        let updated = session
            .updated_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();

        table.add_row(row![marker, session.id, title, session.messages.len(), updated]);
    }

    table
}

/// Print all sessions, newest first
pub fn print_sessions(app: &ChatApp) {
    let sessions = app.sessions();
    if sessions.is_empty() {
        println!("{}", "No chat sessions found.".yellow());
        return;
    }

    let active = app.current_session().map(|s| s.id.as_str());
    println!("\nChat Sessions:");
    sessions_table(sessions, active).printstd();
    println!();
    println!(
        "Use {} to continue a session.",
        "mcpbot chat --session <ID>".cyan()
    );
    println!();
}

/// Print every message of a session
pub fn print_transcript(session: &Session, assistant_name: &str) {
    println!("\n{} {}", session.title.bold(), format!("({})", session.id).dimmed());
    println!();
    for message in &session.messages {
        let time = message
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M");
        let speaker = match message.role {
            Role::User => "You".green().bold(),
            Role::Assistant => assistant_name.cyan().bold(),
            Role::System => "System".yellow().bold(),
        };
        println!("{} {}", speaker, format!("[{}]", time).dimmed());
        println!("{}\n", message.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_config;

    #[test]
    fn test_sessions_table_marks_active() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = ChatApp::open(test_config(dir.path())).unwrap();
        let active = app.current_session().unwrap().id.clone();

        let table = sessions_table(app.sessions(), Some(active.as_str()));
        assert_eq!(table.len(), 1);
        let row = table.get_row(0).unwrap();
        assert_eq!(row.get_cell(0).unwrap().get_content(), "*");
        assert_eq!(row.get_cell(3).unwrap().get_content(), "1");

        app.new_session().unwrap();
        let table = sessions_table(app.sessions(), Some(active.as_str()));
        assert_eq!(table.get_row(0).unwrap().get_cell(0).unwrap().get_content(), "");
    }

    #[test]
    fn test_handle_sessions_select_unknown_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = ChatApp::open(test_config(dir.path())).unwrap();

        let result = handle_sessions(
            &mut app,
            SessionCommand::Select {
                id: "missing".to_string(),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_handle_sessions_new_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = ChatApp::open(test_config(dir.path())).unwrap();

        handle_sessions(&mut app, SessionCommand::New).unwrap();
        assert_eq!(app.sessions().len(), 2);

        let id = app.current_session().unwrap().id.clone();
        handle_sessions(&mut app, SessionCommand::Delete { id }).unwrap();
        assert_eq!(app.sessions().len(), 1);
    }
}
