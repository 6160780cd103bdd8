use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{ComponentGenerator, GenerationError, GenerationRequest, system_prompt, user_prompt};

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const TEMPERATURE: f32 = 0.7;

/// Generator backed by an OpenAI-compatible chat completions endpoint (Groq by default).
pub struct HttpComponentGenerator {
    client: Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpComponentGenerator {
    pub fn new(client: Client, api_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client,
            api_url,
            model,
            api_key,
        }
    }

    fn payload(&self, request: &GenerationRequest) -> serde_json::Value {
        json!({
            "model": self.model,
            "temperature": TEMPERATURE,
            "messages": [
                { "role": "system", "content": system_prompt(request) },
                { "role": "user", "content": user_prompt(request) },
            ],
        })
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn first_content(completion: ChatCompletion) -> Result<String, GenerationError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

#[async_trait]
impl ComponentGenerator for HttpComponentGenerator {
    #[tracing::instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        tracing::info!(prompt_len = request.prompt.len(), "requesting component generation");

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&self.payload(request))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = resp.json().await?;
        first_content(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationOptions;

    fn generator(api_key: Option<&str>) -> HttpComponentGenerator {
        HttpComponentGenerator::new(
            Client::new(),
            DEFAULT_API_URL.to_string(),
            DEFAULT_MODEL.to_string(),
            api_key.map(String::from),
        )
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "a login form".into(),
            component_name: Some("LoginForm".into()),
            options: GenerationOptions::default(),
        }
    }

    #[test]
    fn payload_carries_model_and_both_messages() {
        let payload = generator(Some("k")).payload(&request());
        assert_eq!(payload["model"], DEFAULT_MODEL);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "Create a react component: a login form");
        let temperature = payload["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn first_content_extracts_message() {
        let completion: ChatCompletion = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"export const A = () => null"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(completion).unwrap(), "export const A = () => null");
    }

    #[test]
    fn empty_choices_are_an_error() {
        let completion: ChatCompletion = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_content(completion), Err(GenerationError::EmptyResponse)));

        let blank: ChatCompletion =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  "}}]}"#).unwrap();
        assert!(matches!(first_content(blank), Err(GenerationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let err = generator(None).generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));

        let err = generator(Some("")).generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }
}
