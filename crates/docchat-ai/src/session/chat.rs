//! Chat stage: seed question and user questions against the active files.

use tracing::{debug, info};

use crate::{AiClient, Message};

use super::manager::Session;
use super::types::{Phase, QueryError};

impl Session {
    /// Ask the configured seed question if nothing has been asked yet.
    ///
    /// Returns the assistant's reply, or `None` when the transcript
    /// already has messages.
    pub async fn seed(&mut self, client: &dyn AiClient) -> Result<Option<Message>, QueryError> {
        if self.phase != Phase::Ready {
            return Err(QueryError::NotReady);
        }
        if !self.transcript.is_empty() {
            return Ok(None);
        }
        let question = self.settings.seed_question.clone();
        self.run_query(client, question).await.map(Some)
    }

    /// Ask a question about the uploaded documents.
    ///
    /// On success the question and the reply are appended to the
    /// transcript; on failure the transcript is left untouched.
    pub async fn ask(
        &mut self,
        client: &dyn AiClient,
        question: impl Into<String>,
    ) -> Result<Message, QueryError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(QueryError::EmptyQuestion);
        }
        if self.phase != Phase::Ready {
            return Err(QueryError::NotReady);
        }
        self.run_query(client, question).await
    }

    async fn run_query(
        &mut self,
        client: &dyn AiClient,
        question: String,
    ) -> Result<Message, QueryError> {
        let prompt = format!("{question}{}", self.settings.directive);
        let history: &[Message] = if self.settings.replay_history {
            &self.transcript
        } else {
            &[]
        };

        debug!(
            files = self.active_files.len(),
            turns = history.len(),
            "query"
        );
        let response = client
            .generate_content(&self.active_files, history, &prompt)
            .await?;
        self.tracker.record(&response.usage);

        if response.content.trim().is_empty() {
            return Err(QueryError::EmptyResponse);
        }

        let answer = Message::assistant(response.content);
        self.transcript.push(Message::user(question));
        self.transcript.push(answer.clone());

        info!(
            messages = self.transcript.len(),
            tokens = self.tracker.total_tokens(),
            "answer appended"
        );
        Ok(answer)
    }
}
