use serde::{Deserialize, Serialize};

/// 音声合成の用途
///
/// 合成するテキストの種類を表す。用途によって読み上げ速度の係数と
/// タイムアウトのクラス（標準/延長)が切り替わる。
///
/// # Examples
///
/// ```
/// # use eitango_daily::types::SynthesisPurpose;
/// let purpose = SynthesisPurpose::Monologue;
/// assert!(purpose.is_extended());
/// assert_eq!(purpose.as_str(), "monologue");
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisPurpose {
    /// 単語単体の発音
    Word,
    /// 例文の読み上げ
    Sentence,
    /// モノローグ（長文）の読み上げ
    Monologue,
    /// リーディング用パッセージの読み上げ
    Passage,
}

impl SynthesisPurpose {
    /// 外部合成スクリプトに渡す種別文字列
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisPurpose::Word => "word",
            SynthesisPurpose::Sentence => "sentence",
            SynthesisPurpose::Monologue => "monologue",
            SynthesisPurpose::Passage => "passage",
        }
    }

    /// 出力ファイル名のサフィックス
    ///
    /// ファイル名は単語と用途から決定的に導出される。時刻は含まれないため、
    /// 同じ日の再実行は同じファイルを上書きする。
    pub fn file_suffix(&self) -> &'static str {
        match self {
            SynthesisPurpose::Word => "pronunciation",
            SynthesisPurpose::Sentence => "example",
            SynthesisPurpose::Monologue => "monologue",
            SynthesisPurpose::Passage => "passage",
        }
    }

    /// 延長タイムアウトクラスかどうか
    ///
    /// モノローグは他の用途より一桁長いテキストになるため、
    /// 分単位のタイムアウトを適用する。
    pub fn is_extended(&self) -> bool {
        matches!(self, SynthesisPurpose::Monologue)
    }
}

/// 合成済み音声クリップ
///
/// 1回の音声合成の成果物。出力パスと配信用URLのペアを保持する。
/// 日付パーティションのディレクトリ配下に作られ、作成後に書き換えられる
/// ことはない（同日再実行時の同名上書きを除く）。
#[derive(Clone, Debug)]
pub struct AudioArtifact {
    /// ローカル出力パス
    pub path: String,

    /// 配信用の公開URL
    pub url: String,

    /// 合成時の用途タグ
    pub purpose: SynthesisPurpose,
}

/// モノローグの解析結果
///
/// モノローグ応答から固定マーカーで切り出した3つのスパン。
/// 本文マーカーが無い応答は解析結果なしとして扱う。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonologueContent {
    /// ナレーション本文
    pub narrative: String,

    /// 使い方の解説（無い場合は空文字列）
    pub explanation: String,

    /// 発音メモ（IPA、無い場合は空文字列）
    pub pronunciation: String,
}

/// 1単語分の学習レコード
///
/// AI応答の解析結果と音声参照をまとめた、1実行につき単語ごとに
/// 1件生成される成果物。`word` 以外のフィールドはすべて任意で、
/// 欠けていてもレコードの処理は中断されない。
///
/// # JSON出力例
///
/// ```json
/// {
///   "word": "resilient",
///   "pronunciation": "/rɪˈzɪliənt/",
///   "part_of_speech": "adjective",
///   "simple_definition": "able to recover quickly",
///   "example_sentences": ["She remained resilient after the setback."],
///   "raw_explanation": "**IPA Pronunciation:** ..."
/// }
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VocabularyRecord {
    /// 対象の英単語（常に非空）
    pub word: String,

    /// IPA発音
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,

    /// 品詞
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,

    /// 簡潔な定義
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple_definition: Option<String>,

    /// 詳細な定義
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_definition: Option<String>,

    /// 例文（出現順）
    #[serde(default)]
    pub example_sentences: Vec<String>,

    /// コロケーション・定型表現
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collocations: Option<String>,

    /// 類義語
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<String>,

    /// 対義語
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antonyms: Option<String>,

    /// 混同しやすい単語の解説
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confused_words: Option<String>,

    /// 語族（名詞形・動詞形など）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_family: Option<String>,

    /// 和訳とニュアンスの説明
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,

    /// AI応答の生テキスト
    ///
    /// 解析に失敗しても必ず保持される。モノローグ応答は後から
    /// 追記される（既存内容の上書きはしない）。
    pub raw_explanation: String,

    /// 発音音声の公開URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation_audio_url: Option<String>,

    /// 発音音声のローカルパス
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation_audio_path: Option<String>,

    /// 副音声（モノローグまたは例文）の公開URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_audio_url: Option<String>,

    /// 副音声のローカルパス
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_audio_path: Option<String>,
}

impl VocabularyRecord {
    /// 新しいレコードを作成
    ///
    /// # Arguments
    ///
    /// * `word` - 対象の英単語
    /// * `raw_explanation` - AI応答の生テキスト
    ///
    /// # Examples
    ///
    /// ```
    /// # use eitango_daily::types::VocabularyRecord;
    /// let record = VocabularyRecord::new("resilient", "raw text");
    /// assert_eq!(record.word, "resilient");
    /// assert!(record.pronunciation.is_none());
    /// ```
    pub fn new(word: &str, raw_explanation: &str) -> Self {
        Self {
            word: word.to_string(),
            pronunciation: None,
            part_of_speech: None,
            simple_definition: None,
            advanced_definition: None,
            example_sentences: Vec::new(),
            collocations: None,
            synonyms: None,
            antonyms: None,
            confused_words: None,
            word_family: None,
            translation: None,
            raw_explanation: raw_explanation.to_string(),
            pronunciation_audio_url: None,
            pronunciation_audio_path: None,
            secondary_audio_url: None,
            secondary_audio_path: None,
        }
    }

    /// 最初の例文を取得
    pub fn first_example(&self) -> Option<&str> {
        self.example_sentences.first().map(|s| s.as_str())
    }

    /// 解析済みフィールドの数
    ///
    /// 解析の成否をログに出すためのメトリクス。
    pub fn parsed_field_count(&self) -> usize {
        let mut count = 0;
        if self.pronunciation.is_some() {
            count += 1;
        }
        if self.part_of_speech.is_some() {
            count += 1;
        }
        if self.simple_definition.is_some() {
            count += 1;
        }
        if self.advanced_definition.is_some() {
            count += 1;
        }
        if !self.example_sentences.is_empty() {
            count += 1;
        }
        if self.collocations.is_some() {
            count += 1;
        }
        if self.synonyms.is_some() {
            count += 1;
        }
        if self.antonyms.is_some() {
            count += 1;
        }
        if self.confused_words.is_some() {
            count += 1;
        }
        if self.word_family.is_some() {
            count += 1;
        }
        if self.translation.is_some() {
            count += 1;
        }
        count
    }
}

/// 1実行分のサマリ
///
/// パイプライン完了時にJSON形式で標準出力に出力される。
///
/// # JSON出力例
///
/// ```json
/// {
///   "date": "2025-06-01",
///   "requested": 10,
///   "processed": 9,
///   "words": ["resilient", "meticulous"],
///   "attachment": "logs/vocabulary_monologues_2025-06-01.txt"
/// }
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    /// 実行日（YYYY-MM-DD）
    pub date: String,

    /// 選定された単語数
    pub requested: usize,

    /// 処理に成功した単語数
    pub processed: usize,

    /// 処理に成功した単語
    pub words: Vec<String>,

    /// 添付ドキュメントのパス（生成できなかった場合はnull）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}
