use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// フィードバック生成の既定モデル
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 評価言語（デフォルト "en-US"）
    pub language: String,
    /// Azure Speech サブスクリプションキー（ローカル SQLite に保存）
    pub azure_speech_key: Option<String>,
    /// Azure Speech リージョン
    pub azure_speech_region: String,
    /// 評価リクエストのタイムアウト秒数
    pub assessment_timeout_secs: u64,
    /// Claude API キー（ローカル SQLite に保存）
    pub claude_api_key: Option<String>,
    /// フィードバック生成に使うモデル
    pub feedback_model: String,
    /// 解析後に自動でフィードバックを生成するか
    pub feedback_enabled: bool,
    /// この値未満の音素を「苦手」として扱う
    pub weak_threshold: f64,
    /// 練習履歴の自動削除（日数、0=無期限）
    pub history_ttl_days: u32,
    /// DBファイルの場所（未指定なら default_db_path）
    pub db_path: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            azure_speech_key: None,
            azure_speech_region: "eastus".to_string(),
            assessment_timeout_secs: 30,
            claude_api_key: None,
            feedback_model: DEFAULT_MODEL.to_string(),
            feedback_enabled: false,
            weak_threshold: 90.0,
            history_ttl_days: 0,
            db_path: None,
        }
    }
}

impl AppSettings {
    /// デフォルト値に環境変数を重ねる
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// `lookup` が返した値で上書きする。空文字は未設定扱い。
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("AZURE_SPEECH_KEY") {
            self.azure_speech_key = Some(v);
        }
        if let Some(v) = get("AZURE_SPEECH_REGION") {
            self.azure_speech_region = v;
        }
        if let Some(v) = get("FF_LANGUAGE") {
            self.language = v;
        }
        if let Some(v) = get("ANTHROPIC_API_KEY") {
            self.claude_api_key = Some(v);
        }
        if let Some(v) = get("FF_DB_PATH") {
            self.db_path = Some(v);
        }
        self
    }

    /// 実際に開くDBパス
    pub fn resolved_db_path(&self) -> PathBuf {
        match &self.db_path {
            Some(path) => PathBuf::from(path),
            None => default_db_path(),
        }
    }
}

/// OS 標準のデータディレクトリ配下の DB パス
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fluentform")
        .join("practice.db")
}
