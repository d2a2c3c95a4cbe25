use anyhow::Result;
use async_trait::async_trait;

/// 言語モデルバックエンドの共通トレイト
///
/// 各呼び出しはネットワーク越しの単発リクエスト/レスポンスで、
/// 呼び出し側タイムアウトを持つ。失敗は必ずエラーまたは欠如で
/// 通知され、古いデータが黙って返ることはない。
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// 単語の詳細解説を取得
    ///
    /// APIがエラー応答を返した場合はプレースホルダ文字列
    /// （`Error retrieving explanation for: <word>`）を返す。
    /// 通信断・タイムアウトはエラーとして伝播する。
    async fn explain(&self, word: &str) -> Result<String>;

    /// 単語を繰り返し使うモノローグを取得
    ///
    /// APIがエラー応答を返した場合は `None`（モノローグなし）。
    /// 通信断・タイムアウトはエラーとして伝播する。
    async fn monologue(&self, word: &str) -> Result<Option<String>>;

    /// 任意のプロンプトでコンテンツを生成
    async fn generate(&self, prompt: &str) -> Result<String>;
}
