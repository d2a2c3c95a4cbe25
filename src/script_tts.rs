use crate::config::AudioConfig;
use crate::speech_backend::SpeechBackend;
use crate::types::SynthesisPurpose;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// 外部TTSスクリプトを使う音声合成バックエンド
///
/// `<python_bin> <script> <text> <output> <purpose> <rate>` の形式で
/// サブプロセスを起動する。タイムアウトはこちらで強制し、期限切れの
/// プロセスはkillする。
pub struct ScriptTts {
    config: AudioConfig,
}

impl ScriptTts {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SpeechBackend for ScriptTts {
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        purpose: SynthesisPurpose,
    ) -> Result<()> {
        let script = Path::new(&self.config.script_path);
        if !script.exists() {
            anyhow::bail!("TTSスクリプトが見つかりません: {:?}", script);
        }

        let rate = self.config.speed_factor(purpose);
        let timeout_seconds = self.config.timeout_for(purpose);

        log::debug!(
            "{} 音声を合成 (タイムアウト {} 秒, 速度 {}x, テキスト {} 文字)",
            purpose.as_str(),
            timeout_seconds,
            rate,
            text.chars().count()
        );

        let mut child = Command::new(&self.config.python_bin)
            .arg(script)
            .arg(text)
            .arg(output_path)
            .arg(purpose.as_str())
            .arg(rate.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("TTSプロセスの起動に失敗: {}", self.config.python_bin))?;

        let waited =
            tokio::time::timeout(Duration::from_secs(timeout_seconds), child.wait()).await;
        let status = match waited {
            Ok(finished) => finished.context("TTSプロセスの待機に失敗")?,
            Err(_) => {
                // 期限切れ: プロセスを強制終了
                if let Err(e) = child.kill().await {
                    log::warn!("TTSプロセスのkillに失敗: {}", e);
                }
                anyhow::bail!(
                    "TTSプロセスが {} 秒でタイムアウト ({}, テキスト {} 文字)",
                    timeout_seconds,
                    purpose.as_str(),
                    text.chars().count()
                );
            }
        };

        if !status.success() {
            anyhow::bail!(
                "TTSプロセスが異常終了 (終了コード {:?}, {})",
                status.code(),
                purpose.as_str()
            );
        }

        // 終了コード0でも出力を検証する。音声の無いファイルは失敗。
        let metadata = tokio::fs::metadata(output_path)
            .await
            .with_context(|| format!("音声ファイルが作成されていません: {:?}", output_path))?;
        if metadata.len() == 0 {
            anyhow::bail!("音声ファイルが空です: {:?}", output_path);
        }

        log::debug!(
            "{} 音声を生成: {:?} ({} バイト, 速度 {}x)",
            purpose.as_str(),
            output_path,
            metadata.len(),
            rate
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// シェルスクリプトを外部TTSの代役にしたバックエンドを作る
    fn backend_with_script(dir: &TempDir, script_body: &str) -> ScriptTts {
        let script_path = dir.path().join("fake_tts.sh");
        fs::write(&script_path, script_body).unwrap();
        let mut perms = fs::metadata(&script_path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script_path, perms).unwrap();

        let mut config = AudioConfig::default();
        config.python_bin = "/bin/sh".to_string();
        config.script_path = script_path.to_string_lossy().to_string();
        config.timeout_seconds = 2;
        config.monologue_timeout_seconds = 2;
        ScriptTts::new(config)
    }

    #[tokio::test]
    async fn test_synthesize_success() {
        let dir = TempDir::new().unwrap();
        // $1=テキスト $2=出力先 $3=用途 $4=速度
        let backend = backend_with_script(&dir, "#!/bin/sh\nprintf 'audio' > \"$2\"\n");

        let out = dir.path().join("word.mp3");
        let result = backend
            .synthesize("hello", &out, SynthesisPurpose::Word)
            .await;
        assert!(result.is_ok(), "{:?}", result);
        assert!(out.exists());
    }

    #[tokio::test]
    async fn test_zero_exit_with_empty_file_is_failure() {
        let dir = TempDir::new().unwrap();
        // 終了コード0だが空ファイルしか作らない
        let backend = backend_with_script(&dir, "#!/bin/sh\ntouch \"$2\"\nexit 0\n");

        let out = dir.path().join("empty.mp3");
        let result = backend
            .synthesize("hello", &out, SynthesisPurpose::Word)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_zero_exit_without_file_is_failure() {
        let dir = TempDir::new().unwrap();
        let backend = backend_with_script(&dir, "#!/bin/sh\nexit 0\n");

        let out = dir.path().join("missing.mp3");
        let result = backend
            .synthesize("hello", &out, SynthesisPurpose::Word)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let dir = TempDir::new().unwrap();
        let backend = backend_with_script(&dir, "#!/bin/sh\nprintf 'x' > \"$2\"\nexit 3\n");

        let out = dir.path().join("fail.mp3");
        let result = backend
            .synthesize("hello", &out, SynthesisPurpose::Word)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let dir = TempDir::new().unwrap();
        let backend = backend_with_script(&dir, "#!/bin/sh\nsleep 30\n");

        let out = dir.path().join("slow.mp3");
        let started = std::time::Instant::now();
        let result = backend
            .synthesize("hello", &out, SynthesisPurpose::Word)
            .await;
        assert!(result.is_err());
        // タイムアウト設定(2秒)を大きく超えないこと
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_missing_script_is_failure() {
        let mut config = AudioConfig::default();
        config.script_path = "/nonexistent/tts.py".to_string();
        let backend = ScriptTts::new(config);

        let result = backend
            .synthesize("hello", Path::new("/tmp/out.mp3"), SynthesisPurpose::Word)
            .await;
        assert!(result.is_err());
    }
}
