use crate::config::LlmConfig;
use crate::llm_backend::LlmBackend;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API リクエスト
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

impl GeminiRequest {
    fn new(prompt: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

/// Gemini API レスポンス
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiResponse {
    /// 最初の候補からテキストを取り出す
    fn into_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
    }
}

/// Gemini API バックエンド
pub struct GeminiBackend {
    config: LlmConfig,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            anyhow::bail!("Gemini APIキーが設定されていません");
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .context("Gemini API HTTPクライアント作成失敗")?;

        Ok(Self { config, client })
    }

    /// プロンプトを送信して応答本文を取得
    ///
    /// APIのエラー応答（非2xx）はここでは `Ok(None)` になり、
    /// 各呼び出し口がプレースホルダ／欠如に読み替える。
    /// 通信断・タイムアウトはエラーとして返す。
    async fn request(&self, prompt: &str, timeout_seconds: u64) -> Result<Option<String>> {
        let url = format!("{}?key={}", self.config.api_url, self.config.api_key);
        let body = GeminiRequest::new(prompt);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(Duration::from_secs(timeout_seconds))
            .send()
            .await
            .context("Gemini API リクエスト失敗")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            log::error!("Gemini API エラー応答: {} - {}", status, error_text);
            return Ok(None);
        }

        let parsed: GeminiResponse = response
            .json::<GeminiResponse>()
            .await
            .context("Gemini API レスポンスパース失敗")?;

        Ok(parsed.into_text())
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn explain(&self, word: &str) -> Result<String> {
        let prompt = explanation_prompt(word);
        match self
            .request(&prompt, self.config.request_timeout_seconds)
            .await?
        {
            Some(text) => {
                log::debug!("単語 '{}' の解説を取得: {} 文字", word, text.len());
                Ok(text)
            }
            None => Ok(format!("Error retrieving explanation for: {}", word)),
        }
    }

    async fn monologue(&self, word: &str) -> Result<Option<String>> {
        let prompt = monologue_prompt(word);
        let result = self
            .request(&prompt, self.config.request_timeout_seconds)
            .await?;

        if let Some(text) = &result {
            log::info!("単語 '{}' のモノローグを取得: {} 文字", word, text.len());
        }
        Ok(result)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        match self
            .request(prompt, self.config.generate_timeout_seconds)
            .await?
        {
            Some(text) => {
                log::debug!("コンテンツ生成: {} 文字", text.len());
                Ok(text)
            }
            None => Ok("Error generating content".to_string()),
        }
    }
}

/// 単語解説プロンプト
///
/// パーサが期待するラベル付きセクション構成を指定する。
fn explanation_prompt(word: &str) -> String {
    format!(
        r#"Provide a comprehensive explanation of the English word "{word}" using EXACTLY this format:

**IPA Pronunciation:** /pronunciation here/

**Part of Speech:** (noun/verb/adjective/etc.)

**Simple Definition:** Brief, clear definition

**Advanced Definition:** More detailed, nuanced definition

**Example Sentences:**

1. First example sentence with the word in context.
2. Second example sentence showing different usage.
3. Third example sentence demonstrating another context.

**Common Collocations and Fixed Expressions:**

* **Expression 1:** Explanation of usage
* **Expression 2:** Explanation of usage

**Synonyms & Antonyms:**

* **Synonyms:**
    * **Synonym1:** Brief explanation of difference from main word
    * **Synonym2:** Brief explanation of difference from main word
* **Antonyms:**
    * **Antonym1:** Brief explanation
    * **Antonym2:** Brief explanation

**Commonly Confused Words:**

* **Word1:** Explain how this word differs from "{word}" and when to use each

**Word Family:**

* **Noun:** related noun forms
* **Verb:** related verb forms
* **Adjective:** related adjective forms
* **Adverb:** related adverb forms

**Japanese Translation:**

Primary translation and nuanced explanations of usage differences.

Please follow this EXACT format for consistency and include ALL sections.
"#
    )
}

/// モノローグ生成プロンプト
fn monologue_prompt(word: &str) -> String {
    format!(
        r#"Write a short monologue or speech by one person that uses the word '{word}' multiple times.
The monologue should clearly show the meaning, usage, and context of the word in everyday situations.
Do not shorten, truncate, or add ellipses ("...") in the monologue. Write full sentences and paragraphs.
After the monologue, provide a brief explanation of how the word is used, including common collocations or phrases.
Format the output so that it can be converted into audio for English learners to listen and follow along.

Structure your response as follows:

**Monologue:**
[Write a natural, conversational monologue (2-3 minutes when spoken) that uses '{word}' at least 4-5 times in different contexts.]

**Explanation:**
[Brief explanation of how '{word}' is used in the monologue, including common collocations or phrases.]

**Pronunciation:**
/{word}/ (IPA notation)

Make sure the monologue flows naturally and provides rich context for English learners to understand the word through listening.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_requires_api_key() {
        let config = LlmConfig::default();
        assert!(GeminiBackend::new(config).is_err());

        let mut config = LlmConfig::default();
        config.api_key = "test-key".to_string();
        assert!(GeminiBackend::new(config).is_ok());
    }

    #[test]
    fn test_response_text_extraction() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "explanation body"}]}}
            ]
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("explanation body"));
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_prompts_mention_target_word() {
        let prompt = explanation_prompt("resilient");
        assert!(prompt.contains("\"resilient\""));
        assert!(prompt.contains("**Japanese Translation:**"));

        let prompt = monologue_prompt("resilient");
        assert!(prompt.contains("'resilient'"));
        assert!(prompt.contains("**Monologue:**"));
    }
}
