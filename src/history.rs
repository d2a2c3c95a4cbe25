use crate::config::HistoryConfig;
use crate::types::VocabularyRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// 学習履歴ストアの共通トレイト
///
/// パイプラインは実行前に既出単語を読み、実行後に追記するだけ。
/// 実行中に他者から見える状態を書き換えることはない。1実行につき
/// 書き手はパイプラインのみという前提で、ロックは要求しない。
pub trait HistoryStore: Send + Sync {
    /// 既出単語の集合を取得（すべて小文字）
    fn used_words(&self) -> Result<HashSet<String>>;

    /// 詳細レコードを追記
    fn append_detailed(&self, records: &[VocabularyRecord]) -> Result<()>;

    /// サマリ行を追記
    fn append_summary(&self, records: &[VocabularyRecord]) -> Result<()>;
}

/// サマリ行の形式
#[derive(Debug, Serialize)]
struct SummaryLine<'a> {
    date: String,
    word: &'a str,
}

/// JSON Lines ファイルに追記する履歴ストア
///
/// サマリと詳細の2ファイル。どちらも追記専用で、既存行を書き換える
/// ことはない。
pub struct JsonlHistoryStore {
    summary_path: PathBuf,
    detailed_path: PathBuf,
}

impl JsonlHistoryStore {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            summary_path: PathBuf::from(&config.summary_path),
            detailed_path: PathBuf::from(&config.detailed_path),
        }
    }

    /// 1ファイル分の単語列を読む
    ///
    /// ファイルが無ければ空。壊れた行は警告して読み飛ばす。
    fn words_from_file(path: &Path, found: &mut HashSet<String>) -> Result<()> {
        if !path.exists() {
            log::warn!("履歴ファイルが見つかりません（初回実行?): {:?}", path);
            return Ok(());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("履歴ファイルの読み込みに失敗: {:?}", path))?;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<serde_json::Value>(line) {
                Ok(value) => {
                    if let Some(word) = value.get("word").and_then(|w| w.as_str()) {
                        found.insert(word.to_lowercase());
                    }
                }
                Err(e) => log::warn!("履歴の行を読み飛ばします ({:?}): {}", path, e),
            }
        }
        Ok(())
    }

    fn append_lines(path: &Path, lines: &[String]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("履歴ディレクトリの作成に失敗: {:?}", parent))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("履歴ファイルのオープンに失敗: {:?}", path))?;

        for line in lines {
            writeln!(file, "{}", line)
                .with_context(|| format!("履歴ファイルへの書き込みに失敗: {:?}", path))?;
        }
        Ok(())
    }
}

impl HistoryStore for JsonlHistoryStore {
    fn used_words(&self) -> Result<HashSet<String>> {
        let mut found = HashSet::new();
        Self::words_from_file(&self.summary_path, &mut found)?;
        Self::words_from_file(&self.detailed_path, &mut found)?;
        log::info!("既出単語 {} 語を読み込み", found.len());
        Ok(found)
    }

    fn append_detailed(&self, records: &[VocabularyRecord]) -> Result<()> {
        let mut lines = Vec::new();
        for record in records {
            let line = serde_json::to_string(record)
                .with_context(|| format!("レコードのシリアライズに失敗: {}", record.word))?;
            lines.push(line);
        }
        Self::append_lines(&self.detailed_path, &lines)?;
        log::info!("詳細履歴に {} 件を追記", records.len());
        Ok(())
    }

    fn append_summary(&self, records: &[VocabularyRecord]) -> Result<()> {
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let mut lines = Vec::new();
        for record in records {
            let line = serde_json::to_string(&SummaryLine {
                date: date.clone(),
                word: &record.word,
            })
            .with_context(|| format!("サマリ行のシリアライズに失敗: {}", record.word))?;
            lines.push(line);
        }
        Self::append_lines(&self.summary_path, &lines)?;
        log::info!("サマリ履歴に {} 件を追記", records.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonlHistoryStore {
        JsonlHistoryStore::new(&HistoryConfig {
            summary_path: dir
                .path()
                .join("summary.jsonl")
                .to_string_lossy()
                .to_string(),
            detailed_path: dir
                .path()
                .join("detailed.jsonl")
                .to_string_lossy()
                .to_string(),
        })
    }

    #[test]
    fn test_used_words_empty_on_first_run() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.used_words().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_read_back_lowercase() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let records = vec![
            VocabularyRecord::new("Resilient", "raw"),
            VocabularyRecord::new("meticulous", "raw"),
        ];
        store.append_summary(&records).unwrap();
        store.append_detailed(&records).unwrap();

        let used = store.used_words().unwrap();
        assert_eq!(used.len(), 2);
        assert!(used.contains("resilient"));
        assert!(used.contains("meticulous"));
    }

    #[test]
    fn test_append_is_cumulative() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store
            .append_summary(&[VocabularyRecord::new("alpha", "")])
            .unwrap();
        store
            .append_summary(&[VocabularyRecord::new("bravo", "")])
            .unwrap();

        let used = store.used_words().unwrap();
        assert!(used.contains("alpha"));
        assert!(used.contains("bravo"));
    }

    #[test]
    fn test_broken_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        fs::write(
            &store.summary_path,
            "{\"date\":\"2025-06-01\",\"word\":\"alpha\"}\nnot-json\n",
        )
        .unwrap();

        let used = store.used_words().unwrap();
        assert_eq!(used.len(), 1);
        assert!(used.contains("alpha"));
    }
}
