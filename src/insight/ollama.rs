//! Ollama-backed summarization collaborator.
//!
//! Sends the filtered record set, pre-aggregated into logistics figures,
//! to a local Ollama chat endpoint and returns the narrative it writes.

use crate::analytics::{summarize, EventFilter};
use crate::insight::{SummarizationError, Summarizer};
use crate::models::Participant;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the Ollama collaborator.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub ollama_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.2:latest".to_string(),
            temperature: 0.2,
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Summarizer speaking the Ollama `/api/chat` API.
pub struct OllamaSummarizer {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaSummarizer {
    pub fn new(config: OllamaConfig) -> Result<Self, SummarizationError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, records: &[Participant]) -> Result<String, SummarizationError> {
        let url = format!("{}/api/chat", self.config.ollama_url);
        let prompt = build_prompt(records);

        info!(
            "Requesting logistics insight from {} ({} records)",
            self.config.model_name,
            records.len()
        );
        debug!("Prompt is {} characters", prompt.len());

        let request = OllamaChatRequest {
            model: self.config.model_name.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SummarizationError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    SummarizationError::Connect(self.config.ollama_url.clone())
                } else {
                    SummarizationError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationError::Api { status, body });
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizationError::Malformed(e.to_string()))?;

        Ok(chat_response.message.content)
    }
}

/// Build the user prompt: aggregate figures first, then one line per
/// record with its accommodation demand.
fn build_prompt(records: &[Participant]) -> String {
    let summary = summarize(records, &EventFilter::All);

    let mut prompt = String::new();
    prompt.push_str("Write a logistics briefing for the following event registrations.\n\n");
    prompt.push_str("=== AGGREGATE FIGURES ===\n");
    prompt.push_str(&format!(
        "Participants: {}\nRoom-nights requested: {}\n",
        summary.total_participants, summary.total_room_nights
    ));

    let mut municipalities: Vec<_> = summary.municipality_stats.iter().collect();
    municipalities.sort();
    for (municipality, count) in municipalities {
        prompt.push_str(&format!("- {}: {} participants\n", municipality, count));
    }

    prompt.push_str("\n=== REGISTRATIONS ===\n");
    for record in records {
        prompt.push_str(&format!(
            "- {} ({}, {}, {}): {} room-nights\n",
            record.name,
            record.designation,
            record.municipality,
            record.event_name,
            record.room_nights()
        ));
    }

    prompt.push_str(
        "\nCover headcounts per municipality, gender balance, total lodging demand, \
         and any day with unusually high accommodation need. Keep it under 250 words.",
    );
    prompt
}

const SYSTEM_PROMPT: &str = "You are a logistics planner for a provincial government events \
office. Write concise, plain-language briefings from registration data. Do not invent \
numbers that are not in the data.";
