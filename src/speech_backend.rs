use crate::types::SynthesisPurpose;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// 音声合成バックエンドの共通トレイト
///
/// 実装は自前でタイムアウトを強制し、期限切れのプロセスは
/// 強制終了すること。終了コード0でも出力ファイルが存在しないか
/// 空の場合は失敗として扱う。
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// テキストを音声ファイルに合成
    ///
    /// # Arguments
    ///
    /// * `text` - 読み上げるテキスト
    /// * `output_path` - 出力ファイルのパス
    /// * `purpose` - 用途（速度係数とタイムアウトクラスを決める）
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        purpose: SynthesisPurpose,
    ) -> Result<()>;
}
