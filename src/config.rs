use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// 言語モデルAPI設定
///
/// Gemini APIへの接続に関する設定。
///
/// # デフォルト値
///
/// - `api_url`: Gemini 1.5 Flash の generateContent エンドポイント
/// - `api_key`: "" (環境変数 GEMINI_API_KEY でも指定可能)
/// - `connect_timeout_seconds`: 30 秒
/// - `request_timeout_seconds`: 60 秒 (解説・モノローグ)
/// - `generate_timeout_seconds`: 120 秒 (長いプロンプト向け)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_generate_timeout_seconds")]
    pub generate_timeout_seconds: u64,
}

/// 音声合成設定
///
/// 外部TTSスクリプトの呼び出しと出力先に関する設定。
///
/// # デフォルト値
///
/// - `storage_dir`: "./audio" (日付ディレクトリがこの下に作られる)
/// - `base_url`: "http://localhost:8282/audio"
/// - `python_bin`: "python3"
/// - `script_path`: "scripts/tts_generator.py"
/// - `timeout_seconds`: 30 秒 (単語・例文・パッセージ)
/// - `monologue_timeout_seconds`: 200 秒 (長文モノローグ)
///
/// # 読み上げ速度
///
/// 用途ごとの速度係数。1.0が標準速度。
///
/// - `word_speed`: 1.0 (単語はゆっくり)
/// - `sentence_speed`: 1.2
/// - `passage_speed`: 1.3
/// - `monologue_speed`: 1.25
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioConfig {
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_python_bin")]
    pub python_bin: String,
    #[serde(default = "default_script_path")]
    pub script_path: String,
    #[serde(default = "default_audio_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_monologue_timeout_seconds")]
    pub monologue_timeout_seconds: u64,
    #[serde(default = "default_word_speed")]
    pub word_speed: f64,
    #[serde(default = "default_sentence_speed")]
    pub sentence_speed: f64,
    #[serde(default = "default_passage_speed")]
    pub passage_speed: f64,
    #[serde(default = "default_monologue_speed")]
    pub monologue_speed: f64,
}

/// 単語選定設定
///
/// 1日分の単語セットの構成に関する設定。
///
/// # デフォルト値
///
/// - `total_words`: 10 語
/// - `review_words`: 3 語 (履歴からの復習枠。履歴が空なら新規枠に回る)
/// - `max_attempts`: 5 回 (新規単語の抽選リトライ上限)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionConfig {
    #[serde(default = "default_total_words")]
    pub total_words: usize,
    #[serde(default = "default_review_words")]
    pub review_words: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// 並列処理設定
///
/// # デフォルト値
///
/// - `workers`: 8 (入力単語数によらず固定のワーカープール)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessorConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// 学習履歴設定
///
/// 追記専用のJSON Lines ファイル2本。実行前に既出単語の読み込み、
/// 実行後に追記のみを行う。
///
/// # デフォルト値
///
/// - `summary_path`: "./history/vocabulary_log.jsonl"
/// - `detailed_path`: "./history/vocabulary_detailed.jsonl"
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_summary_path")]
    pub summary_path: String,
    #[serde(default = "default_detailed_path")]
    pub detailed_path: String,
}

/// 配信設定
///
/// 生成したEMLファイルの出力先と送信者/宛先の表示名。
///
/// # デフォルト値
///
/// - `outbox_dir`: "./outbox"
/// - `from_address`: "Eitango Daily <eitango@learning.system>"
/// - `to_address`: "Student <student@example.com>"
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    #[serde(default = "default_outbox_dir")]
    pub outbox_dir: String,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_to_address")]
    pub to_address: String,
}

/// 出力設定
///
/// # デフォルト値
///
/// - `document_dir`: "./logs" (モノローグ転記ドキュメントの出力先)
/// - `log_level`: "info"
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_document_dir")]
    pub document_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default functions
fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        .to_string()
}

fn default_connect_timeout_seconds() -> u64 {
    30
}

fn default_request_timeout_seconds() -> u64 {
    60
}

fn default_generate_timeout_seconds() -> u64 {
    120
}

fn default_storage_dir() -> String {
    "./audio".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8282/audio".to_string()
}

fn default_python_bin() -> String {
    "python3".to_string()
}

fn default_script_path() -> String {
    "scripts/tts_generator.py".to_string()
}

fn default_audio_timeout_seconds() -> u64 {
    30
}

fn default_monologue_timeout_seconds() -> u64 {
    200 // 長文モノローグ向け
}

fn default_word_speed() -> f64 {
    1.0
}

fn default_sentence_speed() -> f64 {
    1.2
}

fn default_passage_speed() -> f64 {
    1.3
}

fn default_monologue_speed() -> f64 {
    1.25
}

fn default_total_words() -> usize {
    10
}

fn default_review_words() -> usize {
    3
}

fn default_max_attempts() -> u32 {
    5
}

fn default_workers() -> usize {
    8
}

fn default_summary_path() -> String {
    "./history/vocabulary_log.jsonl".to_string()
}

fn default_detailed_path() -> String {
    "./history/vocabulary_detailed.jsonl".to_string()
}

fn default_outbox_dir() -> String {
    "./outbox".to_string()
}

fn default_from_address() -> String {
    "Eitango Daily <eitango@learning.system>".to_string()
}

fn default_to_address() -> String {
    "Student <student@example.com>".to_string()
}

fn default_document_dir() -> String {
    "./logs".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            audio: AudioConfig::default(),
            selection: SelectionConfig::default(),
            processor: ProcessorConfig::default(),
            history: HistoryConfig::default(),
            delivery: DeliveryConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            request_timeout_seconds: default_request_timeout_seconds(),
            generate_timeout_seconds: default_generate_timeout_seconds(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            base_url: default_base_url(),
            python_bin: default_python_bin(),
            script_path: default_script_path(),
            timeout_seconds: default_audio_timeout_seconds(),
            monologue_timeout_seconds: default_monologue_timeout_seconds(),
            word_speed: default_word_speed(),
            sentence_speed: default_sentence_speed(),
            passage_speed: default_passage_speed(),
            monologue_speed: default_monologue_speed(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            total_words: default_total_words(),
            review_words: default_review_words(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            summary_path: default_summary_path(),
            detailed_path: default_detailed_path(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            outbox_dir: default_outbox_dir(),
            from_address: default_from_address(),
            to_address: default_to_address(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            document_dir: default_document_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// 設定ファイルから読み込み
    ///
    /// TOML形式の設定ファイルをパースしてConfig構造体を生成する。
    ///
    /// # Arguments
    ///
    /// * `path` - 設定ファイルのパス
    ///
    /// # Errors
    ///
    /// ファイルの読み込みまたはパースに失敗した場合にエラーを返す。
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use eitango_daily::config::Config;
    /// let config = Config::from_file("config.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("設定ファイルの読み込みに失敗: {:?}", path.as_ref()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "設定ファイルのパースに失敗")?;
        Ok(config)
    }

    /// デフォルト設定をファイルに書き出し
    ///
    /// デフォルト値を持つ設定ファイルを生成する。
    /// 既存のファイルは上書きされる。
    ///
    /// # Arguments
    ///
    /// * `path` - 出力先のパス
    ///
    /// # Errors
    ///
    /// ファイルの書き込みに失敗した場合にエラーを返す。
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Config::default();
        let content =
            toml::to_string_pretty(&config).with_context(|| "設定のシリアライズに失敗")?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("設定ファイルの書き込みに失敗: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// 設定ファイルがあれば読み込み、なければデフォルトを使用
    ///
    /// 設定ファイルの存在を確認し、存在する場合は読み込み、
    /// 存在しない場合はデフォルト設定を返す。
    ///
    /// # Errors
    ///
    /// ファイルが存在するがパースに失敗した場合にエラーを返す。
    /// ファイルが存在しない場合はエラーにならず、デフォルト設定を返す。
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            log::warn!(
                "設定ファイルが見つかりません。デフォルト設定を使用します: {:?}",
                path.as_ref()
            );
            Ok(Config::default())
        }
    }
}

impl AudioConfig {
    /// 用途に応じた読み上げ速度係数を取得
    pub fn speed_factor(&self, purpose: crate::types::SynthesisPurpose) -> f64 {
        use crate::types::SynthesisPurpose;
        match purpose {
            SynthesisPurpose::Word => self.word_speed,
            SynthesisPurpose::Sentence => self.sentence_speed,
            SynthesisPurpose::Passage => self.passage_speed,
            SynthesisPurpose::Monologue => self.monologue_speed,
        }
    }

    /// 用途に応じたタイムアウト秒数を取得
    pub fn timeout_for(&self, purpose: crate::types::SynthesisPurpose) -> u64 {
        if purpose.is_extended() {
            self.monologue_timeout_seconds
        } else {
            self.timeout_seconds
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SynthesisPurpose;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.request_timeout_seconds, 60);
        assert_eq!(config.audio.timeout_seconds, 30);
        assert_eq!(config.audio.monologue_timeout_seconds, 200);
        assert_eq!(config.selection.total_words, 10);
        assert_eq!(config.selection.review_words, 3);
        assert_eq!(config.processor.workers, 8);
        assert_eq!(config.output.log_level, "info");
    }

    #[test]
    fn test_write_and_read_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        Config::write_default(path).unwrap();

        let config = Config::from_file(path).unwrap();
        assert_eq!(config.audio.storage_dir, "./audio");
        assert_eq!(config.selection.max_attempts, 5);
    }

    #[test]
    fn test_custom_config() {
        let toml_content = r#"
[llm]
api_key = "test-key"
request_timeout_seconds = 90

[audio]
storage_dir = "/tmp/test-audio"
monologue_speed = 1.5

[selection]
total_words = 4
review_words = 1

[processor]
workers = 2

[delivery]
outbox_dir = "/tmp/outbox"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();

        assert_eq!(config.llm.api_key, "test-key");
        assert_eq!(config.llm.request_timeout_seconds, 90);
        assert_eq!(config.audio.storage_dir, "/tmp/test-audio");
        assert_eq!(config.audio.monologue_speed, 1.5);
        assert_eq!(config.selection.total_words, 4);
        assert_eq!(config.selection.review_words, 1);
        assert_eq!(config.processor.workers, 2);
        assert_eq!(config.delivery.outbox_dir, "/tmp/outbox");
        // 未指定の項目はデフォルト値
        assert_eq!(config.audio.word_speed, 1.0);
        assert_eq!(config.history.summary_path, "./history/vocabulary_log.jsonl");
    }

    #[test]
    fn test_load_or_default_nonexistent() {
        let config = Config::load_or_default("nonexistent_file.toml").unwrap();
        assert_eq!(config.selection.total_words, 10);
    }

    #[test]
    fn test_speed_factor_by_purpose() {
        let config = AudioConfig::default();
        assert_eq!(config.speed_factor(SynthesisPurpose::Word), 1.0);
        assert_eq!(config.speed_factor(SynthesisPurpose::Sentence), 1.2);
        assert_eq!(config.speed_factor(SynthesisPurpose::Passage), 1.3);
        assert_eq!(config.speed_factor(SynthesisPurpose::Monologue), 1.25);
    }

    #[test]
    fn test_timeout_class_by_purpose() {
        let config = AudioConfig::default();
        assert_eq!(config.timeout_for(SynthesisPurpose::Word), 30);
        assert_eq!(config.timeout_for(SynthesisPurpose::Monologue), 200);
    }
}
