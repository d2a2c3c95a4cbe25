use crate::parser;
use crate::types::VocabularyRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// モノローグ転記ドキュメントの生成
///
/// 音声ファイルを聞きながら読めるように、その日の全モノローグの
/// 全文をひとつのテキストファイルにまとめる。配信メールの添付として
/// 参照される副成果物。
pub struct DocumentBuilder {
    output_dir: PathBuf,
}

impl DocumentBuilder {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// ドキュメントを生成してパスを返す
    ///
    /// ファイル名は日付から決まるため、同じ日の再実行は同じファイルを
    /// 上書きする。
    pub fn build(&self, records: &[VocabularyRecord]) -> Result<PathBuf> {
        let mut document = String::new();
        document.push_str(&header());

        for (index, record) in records.iter().enumerate() {
            document.push_str(&word_section(record, index + 1));
        }

        document.push_str(&footer());

        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("ドキュメント出力先の作成に失敗: {:?}", self.output_dir))?;

        let filename = format!(
            "vocabulary_monologues_{}.txt",
            chrono::Local::now().format("%Y-%m-%d")
        );
        let path = self.output_dir.join(filename);
        fs::write(&path, &document)
            .with_context(|| format!("ドキュメントの書き込みに失敗: {:?}", path))?;

        log::info!(
            "モノローグドキュメントを生成: {:?} ({} 語, {} 文字)",
            path,
            records.len(),
            document.chars().count()
        );
        Ok(path)
    }
}

fn header() -> String {
    format!(
        "{border}\n\
         \x20                       DAILY ENGLISH VOCABULARY\n\
         \x20                       Audio Monologue Transcripts\n\
         \x20                            {date}\n\
         {border}\n\n\
         This document contains the full text of all audio monologues included in\n\
         today's vocabulary email. Use it to follow along while listening to the\n\
         audio files, or to review the content after listening.\n\n\
         {border}\n\n",
        border = "=".repeat(80),
        date = chrono::Local::now().format("%Y-%m-%d (%A)")
    )
}

fn word_section(record: &VocabularyRecord, index: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "{}. WORD: {}\n{}\nPronunciation: {}\nPart of Speech: {}\n\n",
        index,
        record.word.to_uppercase(),
        "=".repeat((record.word.len() + 10).max(20)),
        record.pronunciation.as_deref().unwrap_or("N/A"),
        record.part_of_speech.as_deref().unwrap_or("N/A"),
    ));

    if let Some(definition) = &record.simple_definition {
        section.push_str(&format!("SIMPLE DEFINITION:\n{}\n\n", definition));
    }

    match parser::parse_monologue(&record.raw_explanation) {
        Some(content) => {
            section.push_str("AUDIO MONOLOGUE TRANSCRIPT:\n");
            section.push_str(&format!("{}\n\n", "-".repeat(80)));
            section.push_str(&format!("{}\n\n", format_monologue(&content.narrative)));
            section.push_str(&format!("{}\n\n", "-".repeat(80)));

            section.push_str("USAGE EXPLANATION:\n");
            if content.explanation.is_empty() {
                section.push_str(&format!(
                    "See how the word '{}' is used naturally in different contexts above.\n\n",
                    record.word
                ));
            } else {
                section.push_str(&format!("{}\n\n", content.explanation));
            }
        }
        None => {
            // モノローグが無い単語は例文で代替
            if !record.example_sentences.is_empty() {
                section.push_str("EXAMPLE SENTENCES:\n");
                section.push_str(&format!("{}\n\n", "-".repeat(80)));
                for (i, sentence) in record.example_sentences.iter().enumerate() {
                    section.push_str(&format!("{}. {}\n\n", i + 1, sentence));
                }
            }
        }
    }

    section.push_str(&format!("{}\n\n", "=".repeat(80)));
    section
}

/// ドキュメント表示用のモノローグ整形
///
/// マークダウンの強調を落とし、舞台指示の丸括弧は読みやすいように
/// 角括弧に変える（音声では読まれない部分だとわかるように）。
fn format_monologue(narrative: &str) -> String {
    let mut cleaned = parser::clean_for_speech(narrative);
    cleaned = cleaned.replace('(', "[").replace(')', "]");
    format!("    {}", cleaned)
}

fn footer() -> String {
    format!(
        "{border}\n\
         NOTES\n\
         {border}\n\n\
         - Each monologue uses the target vocabulary word multiple times in natural\n\
         \x20 conversation to demonstrate proper usage and context.\n\
         - Stage directions are shown in [brackets] - these are not spoken in the audio.\n\
         - For pronunciation practice, listen to the audio first, then read along with\n\
         \x20 this transcript.\n\n\
         {border}\n\
         Generated on: {timestamp}\n\
         {border}\n",
        border = "=".repeat(80),
        timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record_with_monologue() -> VocabularyRecord {
        let mut record = VocabularyRecord::new("resilient", "**Simple Definition:** tough.");
        record.simple_definition = Some("Able to recover quickly.".to_string());
        record.raw_explanation.push_str(
            "\n\n**Monologue:**\nLife has taught me to be resilient (smiles).\n\
             **Explanation:**\nThe word describes recovery.\n**Pronunciation:**\n/rɪˈzɪliənt/",
        );
        record
    }

    #[test]
    fn test_build_writes_dated_file() {
        let dir = TempDir::new().unwrap();
        let builder = DocumentBuilder::new(dir.path());

        let path = builder.build(&[record_with_monologue()]).unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("vocabulary_monologues_"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn test_document_contains_transcript_and_stage_directions() {
        let dir = TempDir::new().unwrap();
        let builder = DocumentBuilder::new(dir.path());

        let path = builder.build(&[record_with_monologue()]).unwrap();
        let content = fs::read_to_string(path).unwrap();

        assert!(content.contains("1. WORD: RESILIENT"));
        assert!(content.contains("AUDIO MONOLOGUE TRANSCRIPT:"));
        assert!(content.contains("Life has taught me to be resilient [smiles]."));
        assert!(content.contains("The word describes recovery."));
    }

    #[test]
    fn test_document_falls_back_to_examples() {
        let dir = TempDir::new().unwrap();
        let builder = DocumentBuilder::new(dir.path());

        let mut record = VocabularyRecord::new("meticulous", "raw");
        record
            .example_sentences
            .push("He is meticulous about details.".to_string());

        let path = builder.build(&[record]).unwrap();
        let content = fs::read_to_string(path).unwrap();

        assert!(content.contains("EXAMPLE SENTENCES:"));
        assert!(content.contains("He is meticulous about details."));
        assert!(!content.contains("AUDIO MONOLOGUE TRANSCRIPT:"));
    }

    #[test]
    fn test_same_day_rebuild_overwrites() {
        let dir = TempDir::new().unwrap();
        let builder = DocumentBuilder::new(dir.path());

        let first = builder.build(&[record_with_monologue()]).unwrap();
        let second = builder.build(&[record_with_monologue()]).unwrap();
        assert_eq!(first, second);

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }
}
