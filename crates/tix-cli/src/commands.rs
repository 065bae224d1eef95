//! Shell command implementations

use crate::shell::{self, ShellCommand};
use anyhow::Result;
use clap::error::ErrorKind;
use colored::Colorize;
use serde_json::json;
use std::io::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tix_core::{Config, Error, Ticket, TicketDesk, TicketId};

/// Whether the shell keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Session {
    desk: TicketDesk,
    config: Config,
    json: bool,
}

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "Number")]
    id: TicketId,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Processed")]
    processed: bool,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl Session {
    pub fn new(desk: TicketDesk, config: Config, json: bool) -> Self {
        Self { desk, config, json }
    }

    pub fn banner(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", "Helpdesk Ticket Management System".bold())?;
        writeln!(
            out,
            "  1 create <text>  2 process  3 undo  4 list  5 show <n>  6 modify <n> <text>  7 exit"
        )?;
        writeln!(out, "  history, config, help")?;
        Ok(())
    }

    /// Parse and run one input line
    ///
    /// Parse errors and failed operations are reported on `out` and do not
    /// end the session.
    pub fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow> {
        match shell::parse_line(line) {
            Ok(Some(command)) => self.execute(command, out),
            Ok(None) => Ok(Flow::Continue),
            Err(e) if self.json => {
                let text = e.render().to_string();
                let value = match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => json!({ "help": text }),
                    _ => json!({ "error": text.trim_end() }),
                };
                writeln!(out, "{}", value)?;
                Ok(Flow::Continue)
            }
            Err(e) => {
                write!(out, "{}", e.render())?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&mut self, command: ShellCommand, out: &mut dyn Write) -> Result<Flow> {
        let outcome = match command {
            ShellCommand::Create { description } => self.create(&description, out),
            ShellCommand::Process => self.process(out),
            ShellCommand::Undo => self.undo(out),
            ShellCommand::List { pending } => self.list(pending, out),
            ShellCommand::Show { id } => self.show(id, out),
            ShellCommand::Modify { id, description } => self.modify(id, &description, out),
            ShellCommand::History => self.history(out),
            ShellCommand::Config { template } => self.show_config(template, out),
            ShellCommand::Exit => return Ok(Flow::Exit),
        };

        match outcome {
            Ok(()) => {}
            Err(CommandError::Desk(e)) => self.report(&e, out)?,
            Err(CommandError::Output(e)) => return Err(e),
        }
        Ok(Flow::Continue)
    }

    fn create(&mut self, description: &str, out: &mut dyn Write) -> CommandResult {
        let id = self.desk.create(description)?;
        if self.json {
            writeln!(out, "{}", json!({ "id": id }))?;
        } else {
            writeln!(out, "{} Created ticket {}", "✓".green(), id.to_string().cyan())?;
        }
        Ok(())
    }

    fn process(&mut self, out: &mut dyn Write) -> CommandResult {
        match self.desk.process_next() {
            Ok(id) if self.json => writeln!(out, "{}", json!({ "id": id, "found": true }))?,
            Ok(id) => writeln!(out, "{} Ticket {} processed.", "✓".green(), id)?,
            Err(Error::QueueEmpty) if self.json => writeln!(out, "{}", json!({ "found": false }))?,
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn undo(&mut self, out: &mut dyn Write) -> CommandResult {
        match self.desk.undo_last() {
            Ok(undone) if self.json => writeln!(
                out,
                "{}",
                json!({ "found": true, "command": undone.command, "reverted": undone.reverted })
            )?,
            Ok(undone) => {
                writeln!(out, "{} Last action undone.", "✓".green())?;
                if !undone.reverted {
                    writeln!(
                        out,
                        "  {} {} has no inverse; ticket left unchanged",
                        "!".yellow(),
                        undone.command
                    )?;
                }
            }
            Err(Error::NothingToUndo) if self.json => {
                writeln!(out, "{}", json!({ "found": false }))?
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn list(&self, pending: bool, out: &mut dyn Write) -> CommandResult {
        let tickets = if pending {
            self.desk.pending()
        } else {
            self.desk.list_all()
        };

        if self.json {
            writeln!(out, "{}", serde_json::to_string(&tickets)?)?;
        } else if tickets.is_empty() {
            writeln!(out, "No tickets found")?;
        } else {
            let rows: Vec<TicketRow> = tickets.iter().map(|t| self.row(t)).collect();
            writeln!(out, "{}", Table::new(rows).with(Style::rounded()))?;
        }
        Ok(())
    }

    fn row(&self, ticket: &Ticket) -> TicketRow {
        TicketRow {
            id: ticket.id(),
            description: truncate(ticket.description(), self.config.display.max_description_length),
            processed: ticket.is_processed(),
            updated: ticket
                .updated_at()
                .format(&self.config.display.date_format)
                .to_string(),
        }
    }

    fn show(&self, id: TicketId, out: &mut dyn Write) -> CommandResult {
        match self.desk.lookup(id) {
            Ok(ticket) if self.json => writeln!(out, "{}", serde_json::to_string_pretty(ticket)?)?,
            Ok(ticket) => {
                let date_format = &self.config.display.date_format;
                writeln!(out, "{}", ticket)?;
                writeln!(out, "  Created: {}", ticket.created_at().format(date_format))?;
                writeln!(out, "  Updated: {}", ticket.updated_at().format(date_format))?;
            }
            Err(Error::NotFound(_)) if self.json => writeln!(out, "{}", json!({ "found": false }))?,
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn modify(&mut self, id: TicketId, description: &str, out: &mut dyn Write) -> CommandResult {
        match self.desk.modify_description(id, description) {
            Ok(()) if self.json => writeln!(out, "{}", json!({ "found": true }))?,
            Ok(()) => writeln!(out, "{} Ticket {} description modified.", "✓".green(), id)?,
            Err(Error::NotFound(_)) if self.json => writeln!(out, "{}", json!({ "found": false }))?,
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn history(&self, out: &mut dyn Write) -> CommandResult {
        let log = self.desk.log();
        if self.json {
            let entries: Vec<_> = log.entries().collect();
            writeln!(out, "{}", serde_json::to_string(&entries)?)?;
        } else if log.is_empty() {
            writeln!(out, "Nothing to undo.")?;
        } else {
            let policy = self.desk.undo_policy();
            for (depth, command) in log.entries().enumerate() {
                let marker = if command.is_reversible(policy) {
                    "undoable".green()
                } else {
                    "no-op".dimmed()
                };
                writeln!(out, "{:>3}. {} [{}]", depth + 1, command, marker)?;
            }
        }
        Ok(())
    }

    fn show_config(&self, template: bool, out: &mut dyn Write) -> CommandResult {
        if template {
            write!(out, "{}", Config::default_with_comments())?;
        } else if self.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&self.config)?)?;
        } else {
            let rendered = toml::to_string_pretty(&self.config)
                .map_err(|e| CommandError::Output(anyhow::anyhow!("Failed to render config: {}", e)))?;
            write!(out, "{}", rendered)?;
        }
        Ok(())
    }

    fn report(&self, error: &Error, out: &mut dyn Write) -> Result<()> {
        let message = match error {
            Error::NotFound(_) => "Ticket not found.".to_string(),
            Error::QueueEmpty => "No tickets to process.".to_string(),
            Error::NothingToUndo => "Nothing to undo.".to_string(),
            other => other.to_string(),
        };

        if self.json {
            writeln!(out, "{}", json!({ "error": message }))?;
        } else if error.is_outcome() {
            writeln!(out, "{} {}", "!".yellow(), message)?;
        } else {
            writeln!(out, "{} {}", "✗".red(), message)?;
        }
        Ok(())
    }
}

/// Desk failures are reported and the shell goes on; output failures end it
enum CommandError {
    Desk(Error),
    Output(anyhow::Error),
}

type CommandResult = std::result::Result<(), CommandError>;

impl From<Error> for CommandError {
    fn from(e: Error) -> Self {
        CommandError::Desk(e)
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        CommandError::Output(e.into())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(e: serde_json::Error) -> Self {
        CommandError::Output(e.into())
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tix_core::{IdStrategy, SequentialIds};

    fn session(json: bool) -> Session {
        let mut config = Config::default();
        config.ids.strategy = IdStrategy::Sequential;
        let desk = TicketDesk::new(Box::new(SequentialIds::default()));
        Session::new(desk, config, json)
    }

    fn run(session: &mut Session, lines: &[&str]) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        for line in lines {
            session.handle_line(line, &mut out).unwrap();
        }
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_json_scenario_undo_does_not_requeue() {
        let mut s = session(true);
        let out = run(
            &mut s,
            &["create A", "create B", "create C", "process", "undo", "process"],
        );
        assert_eq!(out[0], json!({ "id": 1000 }));
        assert_eq!(out[3], json!({ "id": 1000, "found": true }));
        assert_eq!(out[4]["found"], json!(true));
        assert_eq!(out[4]["command"], json!({ "kind": "process", "id": 1000 }));
        assert_eq!(out[4]["reverted"], json!(true));
        assert_eq!(out[5], json!({ "id": 1001, "found": true }));
    }

    #[test]
    fn test_json_not_found_and_empty() {
        let mut s = session(true);
        let out = run(&mut s, &["process", "undo", "show 1", "modify 1 x"]);
        for value in out {
            assert_eq!(value, json!({ "found": false }));
        }
    }

    #[test]
    fn test_json_list_and_show() {
        let mut s = session(true);
        let out = run(&mut s, &["create printer jammed", "modify 1000 toner empty", "list"]);
        let listed = out[2].as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], json!(1000));
        assert_eq!(listed[0]["description"], json!("toner empty"));
        assert_eq!(listed[0]["processed"], json!(false));
    }

    #[test]
    fn test_json_description_is_stored_verbatim() {
        let mut s = session(true);
        let out = run(
            &mut s,
            &["create  printer   jammed\tfloor 3 ", "create --help", "show 1000", "show 1001"],
        );
        assert_eq!(out[2]["description"], json!(" printer   jammed\tfloor 3 "));
        assert_eq!(out[3]["description"], json!("--help"));
    }

    #[test]
    fn test_json_parse_errors_stay_json() {
        let mut s = session(true);
        let out = run(&mut s, &["frobnicate", "show abc", "help"]);
        assert!(out[0]["error"].as_str().is_some_and(|e| e.contains("frobnicate")));
        assert!(out[1]["error"].is_string());
        assert!(out[2]["help"].is_string());
    }

    #[test]
    fn test_exit_stops_session() {
        let mut s = session(false);
        let mut out = Vec::new();
        assert_eq!(s.handle_line("create a", &mut out).unwrap(), Flow::Continue);
        assert_eq!(s.handle_line("exit", &mut out).unwrap(), Flow::Exit);
        assert_eq!(s.handle_line("7", &mut out).unwrap(), Flow::Exit);
    }

    #[test]
    fn test_bad_line_keeps_session_alive() {
        let mut s = session(false);
        let mut out = Vec::new();
        assert_eq!(s.handle_line("show nope", &mut out).unwrap(), Flow::Continue);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_text_messages() {
        colored::control::set_override(false);
        let mut s = session(false);
        let mut out = Vec::new();
        for line in ["process", "undo", "show 5", "create a", "process", "undo"] {
            s.handle_line(line, &mut out).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No tickets to process."));
        assert!(text.contains("Nothing to undo."));
        assert!(text.contains("Ticket not found."));
        assert!(text.contains("Ticket 1000 processed."));
        assert!(text.contains("Last action undone."));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
