use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Boundary to the generative-text backend. Implementations must swallow
/// their own failures: callers always get a string, empty on any error.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, news: &str) -> String;
}

/// Chat-completions client for OpenAI-compatible backends.
#[derive(Clone)]
pub struct OpenAiSummarizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

const SYSTEM_PROMPT: &str = "You are a great news aggregator specializing in \
    food security and factors affecting food prices.";

impl OpenAiSummarizer {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    async fn request_summary(
        &self,
        news: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let prompt = format!(
            "Using all the news provided, generate a comprehensive summary \
             highlighting the parts of the news most relevant to factors that \
             could affect food prices (e.g insecurity, recession, pandemic, \
             fuel scarcity, covid, corona, electricity, etc.). Exclude prayers \
             and other generic statements. Limit the summary to a maximum of \
             150 words in total.\n\nNews: {}",
            news
        );

        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &self.model,
            temperature: 0.4,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(format!("summarizer backend error {}: {}", status, error_text).into());
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let summary = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(summary)
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, news: &str) -> String {
        match self.request_summary(news).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!("News summarization failed: {}", e);
                String::new()
            }
        }
    }
}
