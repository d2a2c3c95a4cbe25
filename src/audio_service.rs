use crate::config::AudioConfig;
use crate::parser;
use crate::speech_backend::SpeechBackend;
use crate::types::{AudioArtifact, SynthesisPurpose, VocabularyRecord};
use std::path::PathBuf;

/// 音声生成のオーケストレーション
///
/// どのテキストを合成するかを決め、日付パーティションの出力先と
/// 公開URLを組み立てる。合成の失敗はレコードの音声なしに縮退させ、
/// パイプライン全体のエラーにはしない。
pub struct AudioService {
    backend: Box<dyn SpeechBackend>,
    storage_dir: PathBuf,
    base_url: String,
}

impl AudioService {
    pub fn new(backend: Box<dyn SpeechBackend>, config: &AudioConfig) -> Self {
        Self {
            backend,
            storage_dir: PathBuf::from(&config.storage_dir),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// レコードに音声を付与
    ///
    /// 発音クリップは常に生成を試みる。副音声はモノローグ本文を
    /// 優先し、失敗または本文なしの場合は最初の例文にフォールバック
    /// する。どちらも無ければ音声なしのまま返る。
    pub async fn attach_audio(&self, record: &mut VocabularyRecord, monologue_body: Option<&str>) {
        let word = record.word.clone();

        let pronunciation = self
            .synthesize_clip(&word, &word, SynthesisPurpose::Word)
            .await;

        let mut secondary = None;
        if let Some(body) = monologue_body {
            let cleaned = parser::clean_for_speech(body);
            log::info!(
                "単語 '{}': モノローグをTTS用に整形 ({} → {} 文字)",
                word,
                body.chars().count(),
                cleaned.chars().count()
            );
            secondary = self
                .synthesize_clip(&cleaned, &word, SynthesisPurpose::Monologue)
                .await;
            if secondary.is_none() {
                log::warn!("単語 '{}': モノローグ音声に失敗。例文にフォールバック", word);
            }
        }

        if secondary.is_none() {
            let example = record.first_example().map(|s| s.to_string());
            match example {
                Some(sentence) => {
                    secondary = self
                        .synthesize_clip(&sentence, &word, SynthesisPurpose::Sentence)
                        .await;
                }
                None => log::warn!("単語 '{}': 例文が無いため副音声なし", word),
            }
        }

        match &pronunciation {
            Some(artifact) => {
                record.pronunciation_audio_url = Some(artifact.url.clone());
                record.pronunciation_audio_path = Some(artifact.path.clone());
            }
            None => log::warn!("単語 '{}': 発音音声なし", word),
        }

        match &secondary {
            Some(artifact) => {
                record.secondary_audio_url = Some(artifact.url.clone());
                record.secondary_audio_path = Some(artifact.path.clone());
                log::info!(
                    "単語 '{}': 音声を生成 (副音声: {})",
                    word,
                    artifact.purpose.as_str()
                );
            }
            None => log::info!("単語 '{}': 副音声なしで続行", word),
        }
    }

    /// 1クリップ分の合成
    ///
    /// ファイル名は単語と用途から決定的に導出される。同じ日の同じ
    /// 単語・用途は同名ファイルへの上書きになる。
    async fn synthesize_clip(
        &self,
        text: &str,
        word: &str,
        purpose: SynthesisPurpose,
    ) -> Option<AudioArtifact> {
        let date_folder = today_folder();
        let dir = self.storage_dir.join(&date_folder);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            log::error!("音声出力ディレクトリの作成に失敗 {:?}: {}", dir, e);
            return None;
        }

        let filename = format!("{}_{}.mp3", sanitize_filename(word), purpose.file_suffix());
        let output_path = dir.join(&filename);

        match self.backend.synthesize(text, &output_path, purpose).await {
            Ok(()) => Some(AudioArtifact {
                path: output_path.to_string_lossy().to_string(),
                url: format!("{}/{}/{}", self.base_url, date_folder, filename),
                purpose,
            }),
            Err(e) => {
                log::error!(
                    "単語 '{}' の {} 音声合成に失敗: {:#}",
                    word,
                    purpose.as_str(),
                    e
                );
                None
            }
        }
    }
}

/// 実行日の日付フォルダ名 (YYYY-MM-DD)
fn today_folder() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// ファイル名として安全な文字列に変換
///
/// 英数字とドット・ハイフン以外はアンダースコアに置き換え、
/// 小文字に揃える。
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
