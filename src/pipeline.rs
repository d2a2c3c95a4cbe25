use crate::config::SelectionConfig;
use crate::delivery::Delivery;
use crate::document::DocumentBuilder;
use crate::history::HistoryStore;
use crate::types::RunSummary;
use crate::word_processor::WordProcessor;
use crate::word_selector::WordSelector;
use anyhow::Result;
use std::collections::HashSet;

/// 日次パイプラインの最上位オーケストレーション
///
/// 選定 → 並列処理 → ドキュメント生成 → 履歴追記 → 配信、の順で
/// 一方向に流す。処理段までの失敗は縮退で吸収し、処理完了後の
/// 永続化・配信の失敗は実行全体のエラーとして呼び出し元へ伝播する。
pub struct PipelineCoordinator {
    selector: WordSelector,
    processor: WordProcessor,
    history: Box<dyn HistoryStore>,
    document: DocumentBuilder,
    delivery: Box<dyn Delivery>,
    selection: SelectionConfig,
}

impl PipelineCoordinator {
    pub fn new(
        selector: WordSelector,
        processor: WordProcessor,
        history: Box<dyn HistoryStore>,
        document: DocumentBuilder,
        delivery: Box<dyn Delivery>,
        selection: SelectionConfig,
    ) -> Self {
        Self {
            selector,
            processor,
            history,
            document,
            delivery,
            selection,
        }
    }

    /// 日次処理を実行
    ///
    /// 単語の選定から配信まで通しで行う。
    pub async fn run_daily(&self) -> Result<RunSummary> {
        log::info!("日次語彙パイプラインを開始");

        // 既出単語の読み込み。読めなくても実行は止めない（初回実行を含む)。
        let used_words = match self.history.used_words() {
            Ok(words) => words,
            Err(e) => {
                log::warn!("既出単語の読み込みに失敗。空として続行: {:#}", e);
                HashSet::new()
            }
        };

        let mut words = self.selector.select(
            self.selection.total_words,
            self.selection.review_words,
            &used_words,
        );

        if words.is_empty() {
            log::warn!("選定結果が空です。固定の語彙セットで代替します");
            words = self.selector.fallback_set(self.selection.total_words);
        }

        self.run_with_words(words).await
    }

    /// 指定した単語リストで処理を実行
    ///
    /// 手動実行（`--words`）からも使う。選定をスキップする以外は
    /// 日次処理と同じ流れ。
    pub async fn run_with_words(&self, words: Vec<String>) -> Result<RunSummary> {
        log::info!("本日の単語 ({} 語): {:?}", words.len(), words);

        let records = self.processor.process_all(&words).await;
        if records.is_empty() {
            anyhow::bail!("処理に成功した単語がありません");
        }

        // 添付ドキュメント。失敗しても配信は続ける。
        let attachment = match self.document.build(&records) {
            Ok(path) => Some(path),
            Err(e) => {
                log::error!("モノローグドキュメントの生成に失敗: {:#}", e);
                None
            }
        };

        // ここから先の失敗は実行全体のエラーとして伝播する
        self.history.append_summary(&records)?;
        self.history.append_detailed(&records)?;
        self.delivery
            .render_and_deliver(&records, attachment.as_deref())?;

        let summary = RunSummary {
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            requested: words.len(),
            processed: records.len(),
            words: records.iter().map(|r| r.word.clone()).collect(),
            attachment: attachment.map(|p| p.to_string_lossy().to_string()),
        };

        log::info!(
            "日次語彙パイプラインを完了 ({} 語中 {} 語)",
            summary.requested,
            summary.processed
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_service::AudioService;
    use crate::catalogue::WordCatalogue;
    use crate::config::{AudioConfig, DeliveryConfig, HistoryConfig};
    use crate::delivery::EmlDelivery;
    use crate::history::JsonlHistoryStore;
    use crate::llm_backend::LlmBackend;
    use crate::script_tts::ScriptTts;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct MockLlm;

    #[async_trait]
    impl LlmBackend for MockLlm {
        async fn explain(&self, word: &str) -> Result<String> {
            if word == "unreachable" {
                anyhow::bail!("接続タイムアウト");
            }
            Ok(format!(
                "**Simple Definition:** about {word}.\n\n**Example Sentences:**\n\n1. \"A sentence with {word}.\"\n"
            ))
        }

        async fn monologue(&self, word: &str) -> Result<Option<String>> {
            Ok(Some(format!(
                "**Monologue:**\nThinking about {word} all day.\n**Explanation:**\nNotes.\n**Pronunciation:**\n/{word}/"
            )))
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn coordinator(dir: &TempDir) -> PipelineCoordinator {
        let mut audio_config = AudioConfig::default();
        audio_config.script_path = "/nonexistent/tts.py".to_string();
        audio_config.storage_dir = dir.path().join("audio").to_string_lossy().to_string();
        let audio = Arc::new(AudioService::new(
            Box::new(ScriptTts::new(audio_config.clone())),
            &audio_config,
        ));

        let history_config = HistoryConfig {
            summary_path: dir.path().join("summary.jsonl").to_string_lossy().to_string(),
            detailed_path: dir.path().join("detailed.jsonl").to_string_lossy().to_string(),
        };
        let delivery_config = DeliveryConfig {
            outbox_dir: dir.path().join("outbox").to_string_lossy().to_string(),
            ..DeliveryConfig::default()
        };

        PipelineCoordinator::new(
            WordSelector::new(WordCatalogue::new(), SelectionConfig::default()),
            WordProcessor::new(Arc::new(MockLlm), audio, 4),
            Box::new(JsonlHistoryStore::new(&history_config)),
            DocumentBuilder::new(dir.path().join("logs")),
            Box::new(EmlDelivery::new(&delivery_config)),
            SelectionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_manual_run_persists_and_delivers() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir);

        let summary = coordinator
            .run_with_words(vec!["alpha".to_string(), "bravo".to_string()])
            .await
            .unwrap();

        assert_eq!(summary.requested, 2);
        assert_eq!(summary.processed, 2);
        assert!(summary.attachment.is_some());

        // 履歴とアウトボックスができている
        assert!(dir.path().join("summary.jsonl").exists());
        assert!(dir.path().join("detailed.jsonl").exists());
        let outbox: Vec<_> = std::fs::read_dir(dir.path().join("outbox"))
            .unwrap()
            .collect();
        assert_eq!(outbox.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_word_does_not_abort_run() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir);

        let summary = coordinator
            .run_with_words(vec![
                "alpha".to_string(),
                "unreachable".to_string(),
                "bravo".to_string(),
                "charlie".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(summary.requested, 4);
        assert_eq!(summary.processed, 3);
        assert!(!summary.words.contains(&"unreachable".to_string()));
    }

    #[tokio::test]
    async fn test_run_fails_when_no_word_survives() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir);

        let result = coordinator
            .run_with_words(vec!["unreachable".to_string()])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_daily_run_excludes_history_words() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir);

        let first = coordinator.run_daily().await.unwrap();
        let second = coordinator.run_daily().await.unwrap();

        // 復習枠(3語)以外は前回と重複しない
        let first_words: std::collections::HashSet<String> = first
            .words
            .iter()
            .map(|w| w.to_lowercase())
            .collect();
        let repeated = second
            .words
            .iter()
            .filter(|w| first_words.contains(&w.to_lowercase()))
            .count();
        assert!(
            repeated <= SelectionConfig::default().review_words,
            "復習枠を超える重複: {} 語",
            repeated
        );
    }
}
