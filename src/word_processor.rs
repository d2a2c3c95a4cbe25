use crate::audio_service::AudioService;
use crate::llm_backend::LlmBackend;
use crate::parser;
use crate::types::VocabularyRecord;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// 単語リストの並列処理
///
/// 固定サイズのワーカープールに1単語1タスクで流し込み、全タスクの
/// 完了を待ってから結果を束ねる。途中返却やキャンセルはしない。
/// 1タスクの失敗はそのタスク内で握り潰されて「その単語のレコード
/// なし」になり、他のタスクには波及しない。結果リストが唯一の
/// エラー報告チャンネルで、単語ごとの構造化エラーは返さない。
pub struct WordProcessor {
    llm: Arc<dyn LlmBackend>,
    audio: Arc<AudioService>,
    workers: usize,
}

impl WordProcessor {
    pub fn new(llm: Arc<dyn LlmBackend>, audio: Arc<AudioService>, workers: usize) -> Self {
        Self {
            llm,
            audio,
            workers: workers.max(1),
        }
    }

    /// 全単語を処理
    ///
    /// # Returns
    ///
    /// 処理に成功した単語のレコード。入力の部分集合で、重複は
    /// 含まれない。順序は入力順と一致しないことがある。
    pub async fn process_all(&self, words: &[String]) -> Vec<VocabularyRecord> {
        log::info!("{} 語の並列処理を開始 (ワーカー {})", words.len(), self.workers);

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::new();
        let mut queued: HashSet<String> = HashSet::new();

        for word in words {
            // 同一実行内の重複は黙って二重処理しない
            if !queued.insert(word.to_lowercase()) {
                log::warn!("重複した単語をスキップ: {}", word);
                continue;
            }

            let semaphore = semaphore.clone();
            let llm = self.llm.clone();
            let audio = self.audio.clone();
            let word = word.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return None,
                };
                match process_word(llm.as_ref(), &audio, &word).await {
                    Ok(record) => Some(record),
                    Err(e) => {
                        log::error!("単語 '{}' の処理に失敗: {:#}", word, e);
                        None
                    }
                }
            });
            handles.push(handle);
        }

        // 全タスクの完了を待つ。失敗したタスクの単語は結果から落ちる。
        let mut records = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => log::error!("単語処理タスクが異常終了: {}", e),
            }
        }

        log::info!("{} 語中 {} 語の処理に成功", words.len(), records.len());
        records
    }
}

/// 1単語分のステージパイプライン
///
/// 1. 解説の取得（通信断・タイムアウトはエラーとして単語ごと落とす）
/// 2. 解説の解析（失敗しても word + 生テキストのレコードになる）
/// 3. モノローグの取得と生テキストへの追記（失敗は縮退）
/// 4. 音声合成（モノローグ優先、例文フォールバック、失敗は音声なし）
async fn process_word(
    llm: &dyn LlmBackend,
    audio: &AudioService,
    word: &str,
) -> Result<VocabularyRecord> {
    log::info!("単語 '{}' の処理を開始", word);

    // 1. 解説の取得
    let raw = llm
        .explain(word)
        .await
        .with_context(|| format!("単語 '{}' の解説取得に失敗", word))?;

    // 2. 解析
    let mut record = parser::parse(word, &raw);

    // 3. モノローグの取得。応答は生テキストに追記のみ（上書きしない）。
    let mut monologue_body: Option<String> = None;
    match llm.monologue(word).await {
        Ok(Some(text)) => {
            let normalized = parser::normalize_monologue_block(&text);
            record.raw_explanation.push_str("\n\n");
            record.raw_explanation.push_str(&normalized);

            match parser::parse_monologue(&normalized) {
                Some(content) => monologue_body = Some(content.narrative),
                None => log::warn!("単語 '{}': モノローグ本文を解析できず", word),
            }
        }
        Ok(None) => log::warn!("単語 '{}': モノローグなし", word),
        Err(e) => log::warn!("単語 '{}': モノローグ取得に失敗: {:#}", word, e),
    }

    // 4. 音声合成。失敗してもレコードは音声なしで生き残る。
    audio
        .attach_audio(&mut record, monologue_body.as_deref())
        .await;

    log::info!(
        "単語 '{}' の処理を完了 ({} 項目を解析)",
        word,
        record.parsed_field_count()
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AudioConfig;
    use crate::script_tts::ScriptTts;
    use anyhow::Result;
    use async_trait::async_trait;

    /// テスト用の言語モデル
    ///
    /// `fail-` で始まる単語は通信エラー扱いにする。
    struct MockLlm {
        with_monologue: bool,
    }

    #[async_trait]
    impl LlmBackend for MockLlm {
        async fn explain(&self, word: &str) -> Result<String> {
            if word.starts_with("fail-") {
                anyhow::bail!("接続タイムアウト");
            }
            Ok(format!(
                "**IPA Pronunciation:** /{word}/\n\n**Part of Speech:** noun\n\n**Simple Definition:** A test word.\n\n**Example Sentences:**\n\n1. \"This sentence uses {word} naturally.\"\n"
            ))
        }

        async fn monologue(&self, word: &str) -> Result<Option<String>> {
            if !self.with_monologue {
                return Ok(None);
            }
            Ok(Some(format!(
                "**Monologue:**\nA story about {word}.\n**Explanation:**\nNotes.\n**Pronunciation:**\n/{word}/"
            )))
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    /// 音声が常に失敗する構成（スクリプト不在）のサービス
    fn silent_audio() -> Arc<AudioService> {
        let mut config = AudioConfig::default();
        config.script_path = "/nonexistent/tts_generator.py".to_string();
        Arc::new(AudioService::new(Box::new(ScriptTts::new(config.clone())), &config))
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failed_word_is_dropped_and_run_completes() {
        let processor = WordProcessor::new(
            Arc::new(MockLlm { with_monologue: false }),
            silent_audio(),
            4,
        );

        let input = words(&["alpha", "bravo", "fail-charlie", "delta"]);
        let records = processor.process_all(&input).await;

        assert_eq!(records.len(), 3);
        let processed: HashSet<&str> = records.iter().map(|r| r.word.as_str()).collect();
        assert!(!processed.contains("fail-charlie"));
    }

    #[tokio::test]
    async fn test_output_is_subset_without_duplicates() {
        let processor = WordProcessor::new(
            Arc::new(MockLlm { with_monologue: false }),
            silent_audio(),
            2,
        );

        let input = words(&["alpha", "bravo", "Alpha", "alpha"]);
        let records = processor.process_all(&input).await;

        assert_eq!(records.len(), 2);
        let mut seen = HashSet::new();
        for record in &records {
            assert!(seen.insert(record.word.to_lowercase()));
            assert!(input.iter().any(|w| w.eq_ignore_ascii_case(&record.word)));
        }
    }

    #[tokio::test]
    async fn test_monologue_is_appended_not_overwritten() {
        let processor = WordProcessor::new(
            Arc::new(MockLlm { with_monologue: true }),
            silent_audio(),
            2,
        );

        let records = processor.process_all(&words(&["alpha"])).await;
        assert_eq!(records.len(), 1);

        let raw = &records[0].raw_explanation;
        // 元の解説もモノローグも両方残っている
        assert!(raw.contains("**Simple Definition:**"));
        assert!(raw.contains("**Monologue:**"));
        assert!(raw.contains("A story about alpha."));
    }

    #[tokio::test]
    async fn test_audio_failure_is_not_fatal() {
        let processor = WordProcessor::new(
            Arc::new(MockLlm { with_monologue: true }),
            silent_audio(),
            2,
        );

        let records = processor.process_all(&words(&["alpha"])).await;
        assert_eq!(records.len(), 1);
        assert!(records[0].pronunciation_audio_url.is_none());
        assert!(records[0].secondary_audio_url.is_none());
    }

    #[tokio::test]
    async fn test_pool_smaller_than_input_still_processes_all() {
        let processor = WordProcessor::new(
            Arc::new(MockLlm { with_monologue: false }),
            silent_audio(),
            1,
        );

        let input = words(&["one", "two", "three", "four", "five"]);
        let records = processor.process_all(&input).await;
        assert_eq!(records.len(), 5);
    }
}
