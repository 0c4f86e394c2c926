use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

/// Relay messages to a conversational backend and decode its patch stream.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Decode a saved response body.
    Decode(DecodeArgs),

    /// Send one message and print the reply.
    Send(SendArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct DecodeArgs {
    /// Response body to decode. Reads stdin when omitted or `-`.
    pub file: Option<PathBuf>,

    /// What to print.
    #[arg(long, short = 'o', value_enum, default_value_t = DecodeOutput::Compact)]
    pub output: DecodeOutput,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutput {
    /// The stream with append runs merged and control lines dropped.
    Compact,
    /// The assistant reply text.
    Reply,
    /// `conversation_id=` and `message_id=` lines.
    Ids,
    /// Reply and identifiers as one JSON object.
    Json,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SendArgs {
    /// Message text.
    pub message: String,

    /// Config file to read and update. Defaults to
    /// `$CHATRELAY_HOME/config.toml`.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Model to request.
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// Backend origin, e.g. `https://chatgpt.com`.
    #[arg(long)]
    pub base_url: Option<String>,
}
