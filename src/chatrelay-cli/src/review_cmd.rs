//! `review` command.

use anyhow::{Context, Result};
use chatrelay_client::ChatClient;
use chatrelay_protocol::ReviewPayload;

use crate::cli::ReviewArgs;

impl ReviewArgs {
    pub fn to_payload(&self) -> ReviewPayload {
        ReviewPayload {
            chat_id: self.chat_id.clone(),
            user_id: self.user_id.clone(),
            review_score: self.score,
            review_text: self.text.clone(),
        }
    }
}

pub async fn run_review(client: &ChatClient, args: ReviewArgs) -> Result<()> {
    client
        .submit_review(&args.to_payload())
        .await
        .with_context(|| format!("Failed to submit review for chat {}", args.chat_id))?;
    println!("Review submitted for chat {}", args.chat_id);
    Ok(())
}
