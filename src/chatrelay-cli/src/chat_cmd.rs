//! `stream` and `get` commands.

use std::io::{self, Write};

use anyhow::{Result, bail};
use chatrelay_client::{ChatClient, StreamEvent, StreamOutcome, collect_stream};
use chatrelay_protocol::{ChatMessage, ChatRequest, ChatResponse, Target, UserSecrets};
use futures::StreamExt;
use serde_json::json;
use tracing::{debug, warn};

use crate::cli::ChatArgs;

impl ChatArgs {
    pub fn target(&self) -> Target {
        Target::new(self.kind, self.id.clone())
    }

    /// Build the request body from the command line. Each `--message`
    /// becomes a user turn stamped now.
    pub fn to_request(&self) -> ChatRequest {
        let mut request = ChatRequest::new()
            .with_variables(self.variables.iter().cloned().collect())
            .with_messages(self.messages.iter().map(ChatMessage::user).collect());
        if let Some(user_id) = &self.user_id {
            request = request.with_user_id(user_id.clone());
        }
        if !self.secrets.is_empty() {
            let secrets: UserSecrets = self.secrets.iter().cloned().collect();
            request = request.with_user_secrets(secrets);
        }
        request
    }
}

/// Stream a response to stdout as it arrives.
///
/// Ctrl+C cancels the stream. With `--json`, nothing is printed until the
/// stream closes and a single summary object is written instead.
pub async fn run_stream(client: &ChatClient, args: ChatArgs) -> Result<()> {
    let target = args.target();
    let events = client.stream_chat_events(&target, &args.to_request())?;

    let print_units = !args.json;
    let events = events.inspect(move |event| {
        if print_units && let StreamEvent::Response(response) = event {
            if let Err(e) = write_unit(&mut io::stdout().lock(), &response.new_message.content) {
                debug!(error = %e, "Failed to write stream unit to stdout");
            }
        }
    });

    let outcome = tokio::select! {
        outcome = collect_stream(events) => outcome,
        _ = tokio::signal::ctrl_c() => {
            client.cancel_stream();
            if print_units {
                println!();
            }
            bail!("Interrupted");
        }
    };
    debug!(
        units = outcome.responses.len(),
        errors = outcome.errors.len(),
        finished = outcome.finished,
        "Stream collected"
    );

    for error in outcome.errors.iter().filter(|e| !e.is_terminal()) {
        warn!(error = %error, "Skipped malformed event");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
    } else if !outcome.content.is_empty() {
        println!();
    }

    if let Some(error) = outcome.errors.iter().find(|e| e.is_terminal()) {
        bail!("Stream failed: {error}");
    }
    if !args.json
        && let Some(chat_id) = &outcome.chat_id
    {
        eprintln!("chat id: {chat_id}");
    }
    Ok(())
}

/// Fetch a complete response and print it.
pub async fn run_get(client: &ChatClient, args: ChatArgs) -> Result<()> {
    let response = client.get_chat(&args.target(), &args.to_request()).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }
    Ok(())
}

/// Write one unit's content and flush so it shows up immediately.
fn write_unit(out: &mut impl Write, content: &str) -> io::Result<()> {
    out.write_all(content.as_bytes())?;
    out.flush()
}

fn print_response(response: &ChatResponse) {
    println!("{}", response.new_message.content);
    eprintln!("chat id: {}", response.chat_id);
}

fn outcome_json(outcome: &StreamOutcome) -> serde_json::Value {
    json!({
        "chatId": outcome.chat_id,
        "content": outcome.content,
        "finished": outcome.finished,
        "units": outcome.responses.len(),
        "errors": outcome.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
        "lastResponse": outcome.last_response(),
    })
}
