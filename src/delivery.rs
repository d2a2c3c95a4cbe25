use crate::config::DeliveryConfig;
use crate::types::VocabularyRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 配信コラボレータの共通トレイト
///
/// 完成したレコード一覧を受け取って成果物を届ける。内部の
/// 整形はパイプラインの関心外。
pub trait Delivery: Send + Sync {
    /// レコードを整形して配信
    ///
    /// # Arguments
    ///
    /// * `records` - 処理済みレコード
    /// * `attachment_path` - 添付ドキュメントのパス（無い場合あり）
    fn render_and_deliver(
        &self,
        records: &[VocabularyRecord],
        attachment_path: Option<&Path>,
    ) -> Result<()>;
}

/// EMLファイルをアウトボックスに書き出す配信実装
///
/// SMTPには接続せず、RFC 5322形式のメールファイルを出力する。
/// メーラーやあとから動く送信ジョブがこのディレクトリを拾う。
pub struct EmlDelivery {
    outbox_dir: PathBuf,
    from_address: String,
    to_address: String,
}

impl EmlDelivery {
    pub fn new(config: &DeliveryConfig) -> Self {
        Self {
            outbox_dir: PathBuf::from(&config.outbox_dir),
            from_address: config.from_address.clone(),
            to_address: config.to_address.clone(),
        }
    }

    fn eml_content(&self, records: &[VocabularyRecord], attachment_path: Option<&Path>) -> String {
        let now = chrono::Local::now();
        let mut eml = String::new();

        eml.push_str(&format!("Date: {}\r\n", now.format("%a, %d %b %Y %H:%M:%S %z")));
        eml.push_str(&format!("From: {}\r\n", self.from_address));
        eml.push_str(&format!("To: {}\r\n", self.to_address));
        eml.push_str(&format!(
            "Subject: Daily English Vocabulary - {} ({} words)\r\n",
            now.format("%Y-%m-%d"),
            records.len()
        ));
        eml.push_str("MIME-Version: 1.0\r\n");
        eml.push_str("Content-Type: text/html; charset=UTF-8\r\n");
        eml.push_str("Content-Transfer-Encoding: 8bit\r\n");
        eml.push_str("\r\n");
        eml.push_str(&render_html(records, attachment_path));

        eml
    }
}

impl Delivery for EmlDelivery {
    fn render_and_deliver(
        &self,
        records: &[VocabularyRecord],
        attachment_path: Option<&Path>,
    ) -> Result<()> {
        fs::create_dir_all(&self.outbox_dir)
            .with_context(|| format!("アウトボックスの作成に失敗: {:?}", self.outbox_dir))?;

        let filename = format!(
            "vocabulary_{}.eml",
            chrono::Local::now().format("%Y-%m-%d")
        );
        let path = self.outbox_dir.join(filename);

        fs::write(&path, self.eml_content(records, attachment_path))
            .with_context(|| format!("EMLファイルの書き込みに失敗: {:?}", path))?;

        log::info!("配信用EMLを作成: {:?} ({} 語)", path, records.len());
        Ok(())
    }
}

fn render_html(records: &[VocabularyRecord], attachment_path: Option<&Path>) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<title>Daily English Vocabulary</title>\n</head>\n<body>\n");
    html.push_str(&format!(
        "<h1>Daily English Vocabulary - {}</h1>\n",
        chrono::Local::now().format("%Y-%m-%d")
    ));

    for (index, record) in records.iter().enumerate() {
        html.push_str("<div class=\"word\">\n");
        html.push_str(&format!(
            "<h2>{}. {}</h2>\n",
            index + 1,
            escape_html(&record.word)
        ));

        if let Some(pronunciation) = &record.pronunciation {
            html.push_str(&format!("<p><em>{}</em></p>\n", escape_html(pronunciation)));
        }
        if let Some(pos) = &record.part_of_speech {
            html.push_str(&format!("<p>{}</p>\n", escape_html(pos)));
        }
        if let Some(definition) = &record.simple_definition {
            html.push_str(&format!(
                "<p><strong>Definition:</strong> {}</p>\n",
                escape_html(definition)
            ));
        }
        if let Some(example) = record.first_example() {
            html.push_str(&format!(
                "<p><strong>Example:</strong> {}</p>\n",
                escape_html(example)
            ));
        }
        if let Some(translation) = &record.translation {
            html.push_str(&format!(
                "<p><strong>和訳:</strong> {}</p>\n",
                escape_html(translation)
            ));
        }

        if let Some(url) = &record.pronunciation_audio_url {
            html.push_str(&format!(
                "<p><a href=\"{}\">発音音声</a></p>\n",
                escape_html(url)
            ));
        }
        if let Some(url) = &record.secondary_audio_url {
            html.push_str(&format!(
                "<p><a href=\"{}\">リスニング音声</a></p>\n",
                escape_html(url)
            ));
        }

        html.push_str("</div>\n<hr/>\n");
    }

    if let Some(path) = attachment_path {
        html.push_str(&format!(
            "<p>モノローグ全文: {}</p>\n",
            escape_html(&path.to_string_lossy())
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
