mod cli;

use std::io::IsTerminal;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use chatrelay_core::config::Config;
use chatrelay_core::config::ConfigOverrides;
use chatrelay_core::send_message;
use chatrelay_stream::ConversationState;
use chatrelay_stream::compact;
use chatrelay_stream::extract_ids;
use chatrelay_stream::extract_reply;
pub use cli::Cli;
pub use cli::Command;
pub use cli::DecodeArgs;
pub use cli::DecodeOutput;
pub use cli::SendArgs;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct DecodedJson<'a> {
    reply: &'a str,
    conversation_id: Option<&'a str>,
    message_id: Option<&'a str>,
}

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let default_level = if cli.verbose { "debug" } else { "error" };
    let _ = tracing_subscriber::fmt()
        // Fallback to the `default_level` log filter if the environment
        // variable is not set _or_ contains an invalid value
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Command::Decode(args) => run_decode(args),
        Command::Send(args) => run_send(args).await,
    }
}

fn run_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let body = read_input(args.file.as_deref())?;
    debug!("decoding {} bytes", body.len());
    let rendered = render_decoded(&body, args.output)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

async fn run_send(args: SendArgs) -> anyhow::Result<()> {
    let SendArgs {
        message,
        config,
        model,
        base_url,
    } = args;
    let config = Config::load_with_overrides(ConfigOverrides {
        config_path: config,
        model,
        base_url,
    })
    .context("failed to load config")?;

    let turn = send_message(&config, &message).await?;
    debug!(
        "turn finished; conversation state persisted: {}",
        turn.persisted
    );
    println!("{}", turn.reply);
    Ok(())
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// Format the requested view of `body` exactly as it is printed.
pub fn render_decoded(body: &str, output: DecodeOutput) -> anyhow::Result<String> {
    let rendered = match output {
        DecodeOutput::Compact => compact(body),
        DecodeOutput::Reply => format!("{}\n", extract_reply(&compact(body))),
        DecodeOutput::Ids => {
            let ConversationState {
                conversation_id,
                assistant_message_id,
            } = extract_ids(body);
            format!(
                "conversation_id={}\nmessage_id={}\n",
                conversation_id.unwrap_or_default(),
                assistant_message_id.unwrap_or_default()
            )
        }
        DecodeOutput::Json => {
            let reply = extract_reply(&compact(body));
            let state = extract_ids(body);
            let mut json = serde_json::to_string(&DecodedJson {
                reply: &reply,
                conversation_id: state.conversation_id.as_deref(),
                message_id: state.assistant_message_id.as_deref(),
            })?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}
