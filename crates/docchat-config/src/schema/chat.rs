//! Chat stage configuration: seed question and answering directive.

use serde::{Deserialize, Serialize};

/// Appended to every question before it is sent to the model.
pub const DEFAULT_DIRECTIVE: &str = " You are a powerful agent who can read the documents \
provided to you and develop a good understanding of them. Answer any query with the \
knowledge from the documents, and with your own knowledge in case the knowledge from the \
documents is insufficient. You must also Cite your sources should you answer by using \
sources or context from the document, along with your reasoning. Prioritize being \
grounded in the data provided and only use your own knowledge for complex reasoning \
queries and questions not pertaining to the provided documents. Do not refuse to answer \
just because the answer is not in the documents: use your own knowledge, but state \
clearly that you did so because it was not provided in the documents.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Asked automatically once the first batch of files is ready.
    pub seed_question: String,
    pub directive: String,
    /// Resend the transcript as prior turns on every query.
    pub replay_history: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            seed_question: "What is the title of the document(s)?".into(),
            directive: DEFAULT_DIRECTIVE.into(),
            replay_history: true,
        }
    }
}
