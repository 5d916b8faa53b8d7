use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use super::{AssessmentError, AssessmentRequest, PronunciationAssessor};
use crate::domain::assessment::{AssessmentResponse, AssessmentResult};

/// Azure Speech の接続設定。
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AzureConfig {
    /// サブスクリプションキー
    pub subscription_key: String,
    /// リージョン (例: "eastus")
    pub region: String,
    /// エンドポイントの上書き（未指定ならリージョンから組み立てる）
    pub endpoint: Option<String>,
    /// タイムアウト秒数
    pub timeout_secs: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            subscription_key: String::new(),
            region: "eastus".into(),
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

impl AzureConfig {
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
                self.region
            ),
        }
    }
}

/// 短い音声向け REST API で発音評価を行う。
pub struct AzureAssessor {
    client: reqwest::Client,
    config: AzureConfig,
}

impl AzureAssessor {
    pub fn new(config: AzureConfig) -> Result<Self, AssessmentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AssessmentError::Request(format!("HTTP client init failed: {e}")))?;

        Ok(Self { client, config })
    }

    /// `Pronunciation-Assessment` ヘッダ値（JSON を base64 化したもの）
    fn assessment_header(reference_text: &str) -> String {
        let params = serde_json::json!({
            "ReferenceText": reference_text,
            "GradingSystem": "HundredMark",
            "Granularity": "Phoneme",
            "Dimension": "Comprehensive",
            "EnableMiscue": true,
        });
        BASE64_STANDARD.encode(params.to_string())
    }
}

/// レスポンス本文を評価結果に変換する。
fn interpret(response: AssessmentResponse) -> Result<AssessmentResult, AssessmentError> {
    match response.recognition_status.as_str() {
        "Success" => AssessmentResult::from_response(response).ok_or(AssessmentError::NoSpeech),
        "NoMatch" | "InitialSilenceTimeout" | "BabbleTimeout" => Err(AssessmentError::NoSpeech),
        other => Err(AssessmentError::Recognition(other.to_string())),
    }
}

#[async_trait]
impl PronunciationAssessor for AzureAssessor {
    async fn assess(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentResult, AssessmentError> {
        if self.config.subscription_key.is_empty() {
            return Err(AssessmentError::NotConfigured(
                "speech subscription key is not set".to_string(),
            ));
        }

        log::debug!(
            "Azure assessment: {} ms audio, language={}",
            request.audio.duration_ms,
            request.language
        );

        let response = self
            .client
            .post(self.config.endpoint_url())
            .query(&[
                ("language", request.language.as_str()),
                ("format", "detailed"),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.config.subscription_key)
            .header("Content-Type", request.audio.content_type())
            .header("Accept", "application/json")
            .header(
                "Pronunciation-Assessment",
                Self::assessment_header(&request.reference_text),
            )
            .body(request.audio.wav_bytes.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssessmentError::Timeout
                } else {
                    AssessmentError::Request(format!("HTTP request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssessmentError::Service { status, body });
        }

        let body: AssessmentResponse = response
            .json()
            .await
            .map_err(|e| AssessmentError::Parse(e.to_string()))?;

        interpret(body)
    }

    fn name(&self) -> &str {
        "azure"
    }
}
