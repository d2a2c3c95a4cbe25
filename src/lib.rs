//! eitango-daily - 英単語学習コンテンツの日次自動生成システム
//!
//! このクレートは、語彙の選定からAIによる解説生成、音声合成、
//! 配信物の組み立てまでを行う日次パイプラインを提供します。
//!
//! # 主な機能
//!
//! - **単語選定**: 組み込みの語彙カタログから新規語と復習語をバランスよく抽選
//! - **AI解説**: Gemini APIから自由形式の解説とモノローグを取得し、型付きレコードに解析
//! - **音声合成**: 外部TTSスクリプトをタイムアウト付きで起動し、発音・リスニング音声を生成
//! - **並列処理**: 固定サイズのワーカープールで単語ごとに独立処理。1語の失敗は他に波及しない
//! - **成果物**: JSON Lines履歴、モノローグ転記ドキュメント、配信用EMLファイル
//!
//! # アーキテクチャ
//!
//! ```text
//! [WordSelector] → [WordProcessor (×N workers)]
//!                        ↓ (単語ごと)
//!                 ┌──────┴──────┐
//!                 │             │
//!            [LlmBackend]  [AudioService]
//!                 │             │
//!              [parser]   [SpeechBackend]
//!                 ↓             ↓
//!          [VocabularyRecord + 音声ファイル]
//!                        ↓
//!              [PipelineCoordinator]
//!                        ↓
//!        [履歴追記] [ドキュメント] [EML配信]
//! ```
//!
//! # 使用例
//!
//! ```no_run
//! use eitango_daily::config::Config;
//!
//! // 設定ファイルを読み込み
//! let config = Config::load_or_default("config.toml").unwrap();
//!
//! // またはデフォルト設定を生成
//! Config::write_default("config.toml").unwrap();
//! ```

pub mod audio_service;
pub mod catalogue;
pub mod config;
pub mod delivery;
pub mod document;
pub mod gemini_api;
pub mod history;
pub mod llm_backend;
pub mod parser;
pub mod pipeline;
pub mod script_tts;
pub mod speech_backend;
pub mod types;
pub mod word_processor;
pub mod word_selector;
