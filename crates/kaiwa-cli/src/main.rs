// kaiwa: terminal frontend for the enterprise chat gateway
// Argument parsing, authorization gate, REPL loop, streaming output

mod cli;
mod input;
mod output;
mod sink;

use clap::Parser;
use input::Command;
use kaiwa_core::{Config, Role, Session, StaticTokenProvider, Usage, auth};
use output::OutputHandler;
use sink::CliResponseSink;
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = cli::Cli::parse();
    let output = OutputHandler::new(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let provider = StaticTokenProvider::from_config(&config)?;

    // Group gate: the chat surface is unreachable until this passes
    let claims = auth::decode_claims(provider.token())?;
    if !auth::is_authorized(&claims, &config.auth.allowed_groups) {
        output.error("Not authorized. Ask IT to add you to the allowed group(s).");
        std::process::exit(1);
    }

    let mut session = Session::new(config)?;
    if let Some(model) = &args.model {
        session.select_model(model)?;
    }
    if args.no_stream {
        session.set_streaming(false);
    }

    if args.prompt.is_empty() {
        run_repl(&mut session, &provider, &output).await
    } else {
        let prompt = args.prompt.join(" ");
        let mut sink = CliResponseSink::new(&output);
        if let Err(e) = session.send(&prompt, &provider, &mut sink).await {
            output.error(&format!("API error: {}", e));
            std::process::exit(1);
        }
        Ok(())
    }
}

async fn run_repl(
    session: &mut Session,
    provider: &StaticTokenProvider,
    output: &OutputHandler,
) -> io::Result<()> {
    output.info(&format!(
        "Chatting with {} (/help for commands, /quit to leave)",
        session.model()
    ));

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim_end_matches(['\r', '\n']);

        match Command::parse(line) {
            Some(Command::Quit) => break,
            Some(command) => handle_command(command, session, output),
            None => {
                let mut sink = CliResponseSink::new(output);
                if let Err(e) = session.send(line, provider, &mut sink).await {
                    output.error(&format!("API error: {}", e));
                }
            }
        }
    }
    Ok(())
}

fn handle_command(command: Command, session: &mut Session, output: &OutputHandler) {
    match command {
        Command::Reset => {
            session.reset();
            output.info("Conversation reset.");
        }
        Command::Model(None) => {
            for name in session.models() {
                if name == session.model() {
                    output.info(&format!("* {}", name));
                } else {
                    output.info(&format!("  {}", name));
                }
            }
        }
        Command::Model(Some(name)) => match session.select_model(&name) {
            Ok(()) => output.info(&format!("Model set to {}", session.model())),
            Err(e) => output.error(&e.to_string()),
        },
        Command::StreamOn => {
            session.set_streaming(true);
            output.info("Streaming on.");
        }
        Command::StreamOff => {
            session.set_streaming(false);
            output.info("Streaming off.");
        }
        Command::StreamShow => {
            output.info(if session.streaming() {
                "Streaming is on."
            } else {
                "Streaming is off."
            });
        }
        Command::Usage => match session.usage() {
            Some(usage) => output.info(&format_usage(&usage)),
            None => output.info("No usage reported yet."),
        },
        Command::History => {
            for message in session.transcript().messages() {
                if message.role == Role::System {
                    continue;
                }
                output.info(&format!(
                    "[{}]: {}\n",
                    message.role.as_str().to_uppercase(),
                    message.content
                ));
            }
        }
        Command::Help => {
            output.info("Commands:");
            output.info("  /reset             start the conversation over");
            output.info("  /model [name]      list models, or switch to one");
            output.info("  /stream [on|off]   show or set streaming");
            output.info("  /usage             token usage of the last response");
            output.info("  /history           replay the conversation");
            output.info("  /quit              leave");
        }
        Command::Quit => {} // handled by the caller
        Command::Unknown(name) => {
            output.error(&format!("Unknown command: /{} (try /help)", name));
        }
    }
}

fn format_usage(usage: &Usage) -> String {
    let count = |n: Option<u64>| n.map_or_else(|| "-".to_string(), |n| n.to_string());
    format!(
        "Usage: prompt {} / completion {} / total {} tokens",
        count(usage.prompt_tokens),
        count(usage.completion_tokens),
        count(usage.total_tokens)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_usage_tolerates_missing_fields() {
        let usage = Usage {
            prompt_tokens: Some(5),
            completion_tokens: None,
            total_tokens: Some(12),
        };
        assert_eq!(
            format_usage(&usage),
            "Usage: prompt 5 / completion - / total 12 tokens"
        );
    }
}
