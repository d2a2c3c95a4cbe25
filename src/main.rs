use anyhow::{Context, Result};
use eitango_daily::audio_service::AudioService;
use eitango_daily::catalogue::WordCatalogue;
use eitango_daily::config::Config;
use eitango_daily::delivery::EmlDelivery;
use eitango_daily::document::DocumentBuilder;
use eitango_daily::gemini_api::GeminiBackend;
use eitango_daily::history::JsonlHistoryStore;
use eitango_daily::pipeline::PipelineCoordinator;
use eitango_daily::script_tts::ScriptTts;
use eitango_daily::word_processor::WordProcessor;
use eitango_daily::word_selector::WordSelector;
use env_logger::Env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // コマンドライン引数をパース
    let args: Vec<String> = std::env::args().collect();

    // 設定ファイル生成モード
    if args.len() > 1 && args[1] == "--generate-config" {
        let config_path = if args.len() > 2 {
            &args[2]
        } else {
            "config.toml"
        };
        Config::write_default(config_path)?;
        println!("設定ファイルを生成しました: {}", config_path);
        return Ok(());
    }

    // 手動実行モード: --words alpha,bravo,charlie
    let mut manual_words: Option<Vec<String>> = None;
    let mut config_path = "config.toml".to_string();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--words" => {
                let list = args
                    .get(i + 1)
                    .with_context(|| "--words には単語のカンマ区切りリストが必要です")?;
                manual_words = Some(
                    list.split(',')
                        .map(|w| w.trim().to_string())
                        .filter(|w| !w.is_empty())
                        .collect(),
                );
                i += 2;
            }
            other if !other.starts_with("--") => {
                config_path = other.to_string();
                i += 1;
            }
            other => {
                anyhow::bail!("不明なオプション: {}", other);
            }
        }
    }

    // 設定を読み込み
    let mut config = Config::load_or_default(&config_path)?;

    // APIキーは環境変数でも指定できる
    if config.llm.api_key.is_empty() {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.llm.api_key = key;
        }
    }

    // ロガーを初期化
    env_logger::Builder::from_env(Env::default().default_filter_or(config.output.log_level.as_str()))
        .format_timestamp(None)
        .init();

    log::info!("eitango-daily を起動します");

    // コンポーネントを組み立て
    let llm = Arc::new(
        GeminiBackend::new(config.llm.clone()).context("言語モデルバックエンドの初期化に失敗")?,
    );
    let audio = Arc::new(AudioService::new(
        Box::new(ScriptTts::new(config.audio.clone())),
        &config.audio,
    ));

    let coordinator = PipelineCoordinator::new(
        WordSelector::new(WordCatalogue::new(), config.selection.clone()),
        WordProcessor::new(llm, audio, config.processor.workers),
        Box::new(JsonlHistoryStore::new(&config.history)),
        DocumentBuilder::new(&config.output.document_dir),
        Box::new(EmlDelivery::new(&config.delivery)),
        config.selection.clone(),
    );

    // 実行
    let summary = match manual_words {
        Some(words) => {
            log::info!("手動実行モード: {} 語", words.len());
            coordinator.run_with_words(words).await?
        }
        None => coordinator.run_daily().await?,
    };

    // 実行サマリをJSONで出力
    println!("{}", serde_json::to_string(&summary)?);

    log::info!("eitango-daily を終了しました");

    Ok(())
}
