//! Line grammar for the interactive shell
//!
//! The command word (and the ticket number for `modify`) is parsed by clap as
//! if it were a command line without a binary name. For `create` and
//! `modify` the rest of the line after one separator is the description,
//! taken verbatim. The numeric aliases match the classic help-desk menu.

use clap::{Parser, Subcommand};
use tix_core::TicketId;

#[derive(Parser, Debug)]
#[command(name = "tix", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// Create a ticket; the rest of the line is its description
    #[command(visible_alias = "1")]
    Create {
        #[arg(skip)]
        description: String,
    },

    /// Process the oldest waiting ticket
    #[command(visible_alias = "2")]
    Process,

    /// Undo the last action
    #[command(visible_alias = "3")]
    Undo,

    /// List all tickets in creation order
    #[command(visible_alias = "4")]
    List {
        /// Only tickets still waiting to be processed
        #[arg(short, long)]
        pending: bool,
    },

    /// Show one ticket
    #[command(visible_alias = "5")]
    Show {
        /// Ticket number
        id: TicketId,
    },

    /// Change a ticket's description; the rest of the line is the new one
    #[command(visible_alias = "6")]
    Modify {
        /// Ticket number
        id: TicketId,

        #[arg(skip)]
        description: String,
    },

    /// Show the undo history, newest first
    History,

    /// Show the effective configuration
    Config {
        /// Print the commented default config file instead
        #[arg(long)]
        template: bool,
    },

    /// Leave the shell
    #[command(visible_alias = "7", alias = "quit")]
    Exit,
}

/// Parse one input line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let line = line.trim_start();
    if line.trim_end().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = split_word(line);
    let (mut head, text): (Vec<&str>, Option<&str>) = match word {
        "create" | "1" => (vec![word], Some(rest)),
        "modify" | "6" => {
            let (id, description) = split_word(rest.trim_start());
            (vec![word, id], Some(description))
        }
        _ => (line.split_whitespace().collect(), None),
    };
    head.retain(|w| !w.is_empty());

    let mut command = ShellLine::try_parse_from(head)?.command;
    if let Some(text) = text {
        if let ShellCommand::Create { description } | ShellCommand::Modify { description, .. } =
            &mut command
        {
            *description = text.to_string();
        }
    }
    Ok(Some(command))
}

/// Split off the first word and the remainder after exactly one separator
fn split_word(s: &str) -> (&str, &str) {
    match s.char_indices().find(|(_, c)| c.is_whitespace()) {
        Some((pos, sep)) => (&s[..pos], &s[pos + sep.len_utf8()..]),
        None => (s, ""),
    }
}
