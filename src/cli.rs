use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Manage and send messages via Stoat webhooks
#[derive(Parser, Debug)]
#[command(name = "stoat-wh", version, about)]
pub struct Args {
    /// Show raw API output and full error bodies
    #[clap(long, global = true)]
    pub debug: bool,
    /// Subcommand
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch webhook info
    Get {
        /// Either <url> or <id> <token>
        #[clap(value_name = "URL | ID TOKEN")]
        target: Vec<String>,
        /// Print the full response as JSON
        #[clap(long)]
        json: bool,
    },
    /// Edit a webhook
    Edit {
        /// Either <url> or <id> <token>
        #[clap(value_name = "URL | ID TOKEN")]
        target: Vec<String>,
        /// New webhook name
        #[clap(long)]
        name: Option<String>,
    },
    /// Delete a webhook
    Delete {
        /// Either <url> or <id> <token>
        #[clap(value_name = "URL | ID TOKEN")]
        target: Vec<String>,
    },
    /// Send a message
    Send {
        /// Either <url> or <id> <token>
        #[clap(value_name = "URL | ID TOKEN")]
        target: Vec<String>,
        #[clap(flatten)]
        options: SendOptions,
    },
}

#[derive(clap::Args, Debug, Default, Clone, PartialEq)]
pub struct SendOptions {
    /// Message text. If omitted, piped stdin is used
    #[clap(short, long)]
    pub content: Option<String>,
    /// Masquerade display name
    #[clap(long)]
    pub username: Option<String>,
    /// Masquerade avatar URL
    #[clap(long)]
    pub avatar: Option<String>,
    /// Message flag bitfield (unsigned 32-bit integer)
    #[clap(long, value_name = "BITS")]
    pub flags: Option<u32>,
    /// Message IDs to reply to
    #[clap(long = "reply", value_name = "ID", num_args = 1..)]
    pub replies: Vec<String>,
    /// Mention the authors of replied messages
    #[clap(long)]
    pub mention: bool,
    /// Embed JSON string or file path
    #[clap(long = "embed", value_name = "PATH|JSON", num_args = 1..)]
    pub embeds: Vec<String>,
    /// Interactions JSON string or file path
    #[clap(long, value_name = "PATH|JSON")]
    pub interactions: Option<String>,
    /// File to upload with the message
    #[clap(long = "attach", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,
}

/// Per-command options, resolved once from the parsed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOptions {
    Get { json: bool },
    Edit { name: Option<String> },
    Delete,
    Send(SendOptions),
}

impl CommandOptions {
    pub fn name(&self) -> &'static str {
        match self {
            CommandOptions::Get { .. } => "get",
            CommandOptions::Edit { .. } => "edit",
            CommandOptions::Delete => "delete",
            CommandOptions::Send(_) => "send",
        }
    }
}

impl Command {
    /// Split into the webhook positionals and the command's options.
    pub fn into_parts(self) -> (Vec<String>, CommandOptions) {
        match self {
            Command::Get { target, json } => (target, CommandOptions::Get { json }),
            Command::Edit { target, name } => (target, CommandOptions::Edit { name }),
            Command::Delete { target } => (target, CommandOptions::Delete),
            Command::Send { target, options } => (target, CommandOptions::Send(options)),
        }
    }
}
