//! External sentiment providers.
//!
//! A provider takes the raw entry text and returns a sentiment score and,
//! optionally, a homesickness level. Whatever it returns is validated into a
//! [`ProviderAssessment`] or rejected as a whole; the orchestrator falls back
//! to the local algorithm on any error.

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::debug;

use super::sentiment::validate_sentiment;
use super::severity::validate_severity;
use crate::error::{EngineError, EngineResult};

/// Validated output of a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderAssessment {
    sentiment: f32,
    severity: Option<u8>,
}

impl ProviderAssessment {
    /// Fails if the sentiment is outside [-1, 1] or the level is outside
    /// 1..=10. Fractional levels are rounded.
    pub fn new(sentiment: f64, severity: Option<f64>) -> EngineResult<Self> {
        // Range check before narrowing, or 1.000000001 would round to 1.0
        if !sentiment.is_finite() || !(-1.0..=1.0).contains(&sentiment) {
            return Err(EngineError::invalid_output(
                "sentiment",
                format!("score {} outside [-1, 1]", sentiment),
            ));
        }
        let sentiment = validate_sentiment(sentiment as f32)?;

        let severity = match severity {
            Some(level) if !level.is_finite() => {
                return Err(EngineError::invalid_output("severity", "level is not a number"))
            }
            Some(level) => Some(validate_severity(level.round() as i64)?),
            None => None,
        };

        Ok(Self { sentiment, severity })
    }

    pub fn sentiment(&self) -> f32 {
        self.sentiment
    }

    pub fn severity(&self) -> Option<u8> {
        self.severity
    }
}

/// An alternate source of sentiment/severity.
#[async_trait]
pub trait SentimentProvider: Send + Sync + 'static {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Assess one entry.
    async fn assess(&self, text: &str) -> EngineResult<ProviderAssessment>;
}

/// Provider backed by a llama.cpp-compatible completion server.
#[derive(Debug, Clone)]
pub struct LlmSentimentProvider {
    client: Client,
    server_url: Url,
    auth_token: Option<String>,
    n_predict: u32,
}

impl LlmSentimentProvider {
    /// * `server_url` - base URL of the server; `/completion` is appended
    /// * `auth_token` - sent as a bearer token when present
    pub fn new(server_url: &str, auth_token: Option<String>) -> EngineResult<Self> {
        let server_url = Url::parse(server_url)
            .map_err(|e| EngineError::ConfigurationInvalid(format!("provider url: {}", e)))?;

        Ok(Self {
            client: Client::new(),
            server_url,
            auth_token,
            n_predict: 256,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.server_url.as_str().trim_end_matches('/'), path)
    }

    fn build_request(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> EngineResult<reqwest::RequestBuilder> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| EngineError::ConfigurationInvalid(format!("provider token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(self
            .client
            .post(self.endpoint(endpoint))
            .headers(headers)
            .json(payload))
    }

    async fn complete(&self, prompt: String) -> EngineResult<String> {
        let payload = serde_json::json!({
            "prompt": prompt,
            "stream": false,
            "n_predict": self.n_predict,
            "temperature": 0.0
        });

        let res = self.build_request("completion", &payload)?.send().await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(EngineError::ProviderUnavailable(format!(
                "Completion request failed with status {}: {}",
                status, body
            )));
        }

        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| EngineError::MalformedResponse(e.to_string()))?;

        json["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| EngineError::MalformedResponse("missing `content` field".to_string()))
    }
}

#[async_trait]
impl SentimentProvider for LlmSentimentProvider {
    fn name(&self) -> &str {
        "llm"
    }

    async fn assess(&self, text: &str) -> EngineResult<ProviderAssessment> {
        debug!(chars = text.chars().count(), "Requesting provider assessment");
        let content = self.complete(build_prompt(text)).await?;
        parse_reply(&content)
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "You are helping an international student reflect on a journal entry.\n\
         Rate the entry and answer with a JSON object only:\n\
         {{\"sentiment_score\": <number from -1 (very negative) to 1 (very positive)>, \
         \"homesickness_level\": <integer from 1 (none) to 10 (severe)>, \
         \"themes\": [<short theme names>]}}\n\n\
         Journal entry:\n{}\n",
        text
    )
}

#[derive(Debug, Deserialize)]
struct RawAssessment {
    #[serde(alias = "sentiment")]
    sentiment_score: f64,
    #[serde(default, alias = "severity_level", alias = "severity")]
    homesickness_level: Option<f64>,
}

// The label may carry a hint before the colon: "Sentiment Score (-1 to 1): -0.4"
static SENTIMENT_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)sentiment[\s_]*score[^:=\n]*[:=]\s*(-?\d+(?:\.\d+)?)").ok()
});

static LEVEL_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)homesickness[\s_]*level[^:=\n]*[:=]\s*(-?\d+(?:\.\d+)?)").ok()
});

/// Parse a provider reply into a validated assessment.
///
/// Accepts a JSON object (bare, fenced, or embedded in prose). Without one,
/// falls back to `sentiment score: x` / `homesickness level: n` lines. A JSON
/// object that parses but carries out-of-range values is rejected outright.
pub fn parse_reply(content: &str) -> EngineResult<ProviderAssessment> {
    if let Some(raw) = embedded_json(content) {
        if let Ok(parsed) = serde_json::from_str::<RawAssessment>(raw) {
            return ProviderAssessment::new(parsed.sentiment_score, parsed.homesickness_level);
        }
    }

    let sentiment = capture_number(&SENTIMENT_LINE, content).ok_or_else(|| {
        EngineError::MalformedResponse("no sentiment score in reply".to_string())
    })?;
    let level = capture_number(&LEVEL_LINE, content);

    ProviderAssessment::new(sentiment, level)
}

/// Outermost `{...}` span of the reply, if any.
fn embedded_json(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

fn capture_number(pattern: &LazyLock<Option<Regex>>, content: &str) -> Option<f64> {
    let re = pattern.as_ref()?;
    re.captures(content)?.get(1)?.as_str().parse().ok()
}
