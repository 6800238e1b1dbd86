use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::score::MAX_SCORE;

const SYSTEM_PROMPT: &str = "あなたはユーザーに健康アドバイスをする専門家です。";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 150;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub fn build_prompt(score: u32, steps: u32, active_minutes: u32, distance: f64) -> String {
    format!(
        "ユーザーの今日の運動データは以下の通りです：\n\
         - 歩数: {steps}\n\
         - アクティブ時間: {active_minutes}分\n\
         - 移動距離: {distance:?}km\n\
         健康スコアは {score}/{MAX_SCORE} です。\n\
         この情報をもとに、日本語で200文字以内の健康アドバイスをお願いします。"
    )
}

/// Chat-completion client for the daily coaching tip.
/// Failures propagate; there is no fallback text.
pub struct AdviceClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl AdviceClient {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            http: config.http_client()?,
            endpoint: format!(
                "{}/chat/completions",
                config.openai_base_url.trim_end_matches('/')
            ),
            api_key: config.openai_key()?.to_string(),
            model: config.openai_model.clone(),
        })
    }

    pub async fn fetch_advice(
        &self,
        score: u32,
        steps: u32,
        active_minutes: u32,
        distance: f64,
    ) -> anyhow::Result<String> {
        let prompt = build_prompt(score, steps, active_minutes, distance);
        let request = ChatRequest {
            model: &self.model,
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
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "requesting advice");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("advice request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("advice service returned {status}: {body}");
        }

        let reply: ChatResponse = response
            .json()
            .await
            .context("advice service returned malformed JSON")?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("advice service returned no choices")?;

        Ok(content.trim().to_string())
    }
}
