use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::domain::alignment::AlignmentEngine;
use crate::domain::articulation::{mouth_pose, MouthPose};
use crate::domain::error::AppError;
use crate::domain::phoneme::{group_by_word, weak_phonemes, AnnotatedChar, PhonemeScore};
use crate::domain::phoneme_info::{phoneme_info, PhonemeInfo};
use crate::domain::score::PerformanceLevel;
use crate::domain::settings::AppSettings;
use crate::domain::types::{AnalysisReport, HistoryPage, PhonemeProgress, PracticeAttempt};
use crate::infra::assessment::{AssessmentRequest, AzureAssessor, AzureConfig, PronunciationAssessor};
use crate::infra::audio::AudioClip;
use crate::infra::feedback::{ClaudeFeedback, FeedbackContext, FeedbackGenerator, NoopFeedback};
use crate::infra::metrics::{Metrics, MetricsSummary};
use crate::infra::storage::Storage;
use crate::infra::transcript::normalize_transcript;

/// フィードバック生成の上限時間
const FEEDBACK_TIMEOUT: Duration = Duration::from_secs(60);
/// 履歴1ページの最大件数
const MAX_PAGE_SIZE: u32 = 100;

/// 発音解析サービス（評価 → 注釈 → 保存 をまとめる）
pub struct AnalysisService {
    storage: Mutex<Storage>,
    metrics: Metrics,
    assessor: Arc<dyn PronunciationAssessor>,
    feedback: Arc<dyn FeedbackGenerator>,
}

impl AnalysisService {
    pub fn new(
        storage: Storage,
        assessor: Arc<dyn PronunciationAssessor>,
        feedback: Arc<dyn FeedbackGenerator>,
    ) -> Self {
        Self {
            storage: Mutex::new(storage),
            metrics: Metrics::new(),
            assessor,
            feedback,
        }
    }

    /// 設定から DB と各クライアントを組み立てる。
    /// Claude API キーがなければ定型文のフィードバックになる。
    pub fn from_settings(settings: &AppSettings) -> Result<Self, AppError> {
        let db_path = settings.resolved_db_path();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::storage(format!("データディレクトリ作成失敗: {e}")))?;
        }
        let storage = Storage::open(&db_path.to_string_lossy())?;
        storage.save_settings(settings)?;

        let assessor = AzureAssessor::new(azure_config(settings))?;

        let feedback: Arc<dyn FeedbackGenerator> = match &settings.claude_api_key {
            Some(key) => Arc::new(
                ClaudeFeedback::new(key.clone())?.with_model(settings.feedback_model.clone()),
            ),
            None => Arc::new(NoopFeedback),
        };

        log::info!(
            "AnalysisService 初期化: db={}, assessor={}, feedback={}",
            db_path.display(),
            assessor.name(),
            feedback.name()
        );

        Ok(Self::new(storage, Arc::new(assessor), feedback))
    }

    // ==================== Analysis ====================

    /// 録音を評価し、注釈付きの結果を保存して返す
    pub async fn analyze(
        &self,
        audio: AudioClip,
        reference_text: &str,
    ) -> Result<AnalysisReport, AppError> {
        let result = self.analyze_inner(audio, reference_text).await;
        self.track(result)
    }

    async fn analyze_inner(
        &self,
        audio: AudioClip,
        reference_text: &str,
    ) -> Result<AnalysisReport, AppError> {
        let settings = self.get_settings()?;
        let request = AssessmentRequest::new(audio, reference_text, &settings.language);

        let start = Instant::now();
        let timeout = Duration::from_secs(settings.assessment_timeout_secs.max(1));
        let assessed = tokio::time::timeout(timeout, self.assessor.assess(&request))
            .await
            .map_err(|_| AppError::timeout("発音評価がタイムアウトしました"))??;
        self.metrics
            .record_latency("assess", start.elapsed().as_millis() as u64);

        let transcription = normalize_transcript(&assessed.transcription);
        let phonemes = assessed.phoneme_scores();
        let annotation = AlignmentEngine::annotate(&transcription, &phonemes);

        let attempt = PracticeAttempt {
            attempt_id: uuid::Uuid::new_v4().to_string(),
            reference_text: request.reference_text.clone(),
            transcription: transcription.clone(),
            scores: assessed.scores,
            feedback: None,
            created_at: chrono::Utc::now().to_rfc3339(),
            phonemes: phonemes.clone(),
        };
        self.storage.lock().insert_attempt(&attempt)?;
        self.metrics.inc_analyses_completed(phonemes.len());

        log::info!(
            "解析完了: attempt={}, accuracy={:.1}, phonemes={} ({}, {}ms)",
            attempt.attempt_id,
            attempt.scores.accuracy,
            phonemes.len(),
            self.assessor.name(),
            start.elapsed().as_millis()
        );

        let feedback = if settings.feedback_enabled {
            match self.generate_feedback(&attempt.attempt_id).await {
                Ok(text) => Some(text),
                Err(e) => {
                    log::warn!("フィードバック生成に失敗（解析結果は保存済み）: {e}");
                    None
                }
            }
        } else {
            None
        };

        Ok(AnalysisReport {
            attempt_id: attempt.attempt_id,
            reference_text: attempt.reference_text,
            transcription,
            scores: attempt.scores,
            words: group_by_word(&phonemes),
            phonemes,
            annotation,
            assessed_words: assessed.words,
            performance: PerformanceLevel::for_score(attempt.scores.accuracy),
            feedback,
            created_at: attempt.created_at,
        })
    }

    /// 任意のテキストに注釈を付ける（表示を参照文へ切り替えるとき用）
    pub fn annotate_text(&self, text: &str, phonemes: &[PhonemeScore]) -> Vec<AnnotatedChar> {
        AlignmentEngine::annotate(text, phonemes)
    }

    /// 解析結果をクリアした既定注釈
    pub fn reset_annotation(&self, text: &str) -> Vec<AnnotatedChar> {
        AlignmentEngine::reset(text)
    }

    pub fn phoneme_guide(&self, symbol: &str) -> PhonemeInfo {
        phoneme_info(symbol)
    }

    /// 口腔モデルに表示する口の形
    pub fn mouth_pose(&self, symbol: &str) -> MouthPose {
        mouth_pose(symbol)
    }

    // ==================== Feedback ====================

    /// 保存済みの練習結果に講評を生成して保存する
    pub async fn generate_feedback(&self, attempt_id: &str) -> Result<String, AppError> {
        let result = self.generate_feedback_inner(attempt_id).await;
        self.track(result)
    }

    async fn generate_feedback_inner(&self, attempt_id: &str) -> Result<String, AppError> {
        let (attempt, threshold) = {
            let storage = self.storage.lock();
            let attempt = storage
                .get_attempt(attempt_id)?
                .ok_or_else(|| AppError::invalid_input(format!("練習結果が見つかりません: {attempt_id}")))?;
            (attempt, storage.get_settings()?.weak_threshold)
        };

        let ctx = FeedbackContext {
            weak_phonemes: weak_phonemes(&attempt.phonemes, threshold),
            overall_accuracy: attempt.scores.accuracy,
            reference_text: attempt.reference_text,
            transcription: attempt.transcription,
        };

        let start = Instant::now();
        let text = tokio::time::timeout(FEEDBACK_TIMEOUT, self.feedback.generate(&ctx))
            .await
            .map_err(|_| AppError::timeout("フィードバック生成がタイムアウトしました"))??;

        self.storage
            .lock()
            .update_attempt_feedback(attempt_id, &text)?;

        self.metrics.inc_feedback_generated();
        self.metrics
            .record_latency("feedback", start.elapsed().as_millis() as u64);

        Ok(text)
    }

    // ==================== Queries ====================

    pub fn get_history(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<HistoryPage, AppError> {
        if limit == 0 {
            return Err(AppError::invalid_input("limit は 1 以上を指定してください"));
        }
        self.storage
            .lock()
            .list_history(limit.min(MAX_PAGE_SIZE), cursor)
    }

    pub fn get_attempt(&self, attempt_id: &str) -> Result<Option<PracticeAttempt>, AppError> {
        self.storage.lock().get_attempt(attempt_id)
    }

    pub fn get_progress(&self, limit: u32) -> Result<Vec<PhonemeProgress>, AppError> {
        self.storage.lock().phoneme_progress(limit)
    }

    // ==================== Settings ====================

    pub fn get_settings(&self) -> Result<AppSettings, AppError> {
        self.storage.lock().get_settings()
    }

    pub fn update_settings(&self, settings: AppSettings) -> Result<(), AppError> {
        if !(0.0..=100.0).contains(&settings.weak_threshold) {
            return Err(AppError::invalid_input(
                "weak_threshold は 0〜100 の範囲で指定してください",
            ));
        }
        self.storage.lock().save_settings(&settings)
    }

    // ==================== Metrics ====================

    pub fn get_metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    pub fn record_error(&self, code: &str) {
        self.metrics.inc_error(code);
    }

    fn track<T>(&self, result: Result<T, AppError>) -> Result<T, AppError> {
        if let Err(e) = &result {
            log::error!("{e}");
            self.record_error(e.code.as_str());
        }
        result
    }

    // ==================== Data Protection ====================

    /// TTL を過ぎた練習結果を削除する。0 なら何もしない。
    pub fn cleanup_old_data(&self, ttl_days: u32) -> Result<u32, AppError> {
        if ttl_days == 0 {
            return Ok(0);
        }

        // 表現可能な日付範囲を超える TTL は削除対象なし
        let Some(cutoff) =
            chrono::Utc::now().checked_sub_signed(chrono::Duration::days(i64::from(ttl_days)))
        else {
            return Ok(0);
        };
        let cutoff_str = cutoff.to_rfc3339();

        let deleted = self.storage.lock().delete_attempts_before(&cutoff_str)?;

        log::info!("データクリーンアップ: {deleted} 件の練習結果を削除（TTL: {ttl_days}日）");

        Ok(deleted)
    }
}

fn azure_config(settings: &AppSettings) -> AzureConfig {
    AzureConfig {
        subscription_key: settings.azure_speech_key.clone().unwrap_or_default(),
        region: settings.azure_speech_region.clone(),
        endpoint: None,
        timeout_secs: settings.assessment_timeout_secs.max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::infra::assessment::NoopAssessor;
    use crate::infra::audio::clip::tests::silent_wav;

    fn service() -> AnalysisService {
        AnalysisService::new(
            Storage::open_in_memory().unwrap(),
            Arc::new(NoopAssessor),
            Arc::new(NoopFeedback),
        )
    }

    fn clip() -> AudioClip {
        AudioClip::from_wav_bytes(silent_wav(16_000, 1_600)).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_with_noop_assessor() {
        let svc = service();
        let report = svc.analyze(clip(), "Red car").await.unwrap();

        assert_eq!(report.reference_text, "Red car");
        assert_eq!(report.transcription, "Red car");
        assert_eq!(report.annotation.len(), "Red car".chars().count());
        assert_eq!(report.performance, PerformanceLevel::Excellent);
        assert!(report.feedback.is_none());

        let stored = svc.get_attempt(&report.attempt_id).unwrap().unwrap();
        assert_eq!(stored.transcription, "Red car");

        let m = svc.get_metrics();
        assert_eq!(m.analyses_completed, 1);
        assert!(m.avg_latency_ms.assess.is_some());
    }

    #[tokio::test]
    async fn test_generate_feedback_stores_text() {
        let svc = service();
        let report = svc.analyze(clip(), "Sun").await.unwrap();

        let text = svc.generate_feedback(&report.attempt_id).await.unwrap();
        assert_eq!(text, "Excellent pronunciation!");

        let stored = svc.get_attempt(&report.attempt_id).unwrap().unwrap();
        assert_eq!(stored.feedback.as_deref(), Some("Excellent pronunciation!"));
        assert_eq!(svc.get_metrics().feedback_generated, 1);
    }

    #[tokio::test]
    async fn test_feedback_for_unknown_attempt() {
        let svc = service();
        let err = svc.generate_feedback("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(svc.get_metrics().error_counts.input, 1);
    }

    #[tokio::test]
    async fn test_feedback_enabled_runs_inline() {
        let svc = service();
        let settings = AppSettings {
            feedback_enabled: true,
            ..Default::default()
        };
        svc.update_settings(settings).unwrap();

        let report = svc.analyze(clip(), "Sun").await.unwrap();
        assert_eq!(report.feedback.as_deref(), Some("Excellent pronunciation!"));
    }

    #[test]
    fn test_history_limit_validation() {
        let svc = service();
        let err = svc.get_history(0, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(svc.get_history(10, None).unwrap().items.is_empty());
    }

    #[test]
    fn test_update_settings_validation() {
        let svc = service();
        let settings = AppSettings {
            weak_threshold: 120.0,
            ..Default::default()
        };
        assert!(svc.update_settings(settings).is_err());
    }

    #[test]
    fn test_cleanup_zero_ttl_is_noop() {
        let svc = service();
        assert_eq!(svc.cleanup_old_data(0).unwrap(), 0);
        assert_eq!(svc.cleanup_old_data(30).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_huge_ttl_keeps_everything() {
        let svc = service();
        svc.analyze(clip(), "Sun").await.unwrap();

        assert_eq!(svc.cleanup_old_data(u32::MAX).unwrap(), 0);
        assert_eq!(svc.get_history(10, None).unwrap().items.len(), 1);
    }

    #[test]
    fn test_azure_config_timeout_floor() {
        let settings = AppSettings {
            assessment_timeout_secs: 0,
            azure_speech_key: Some("k".to_string()),
            ..Default::default()
        };
        let config = azure_config(&settings);
        assert_eq!(config.timeout_secs, 1);
        assert_eq!(config.subscription_key, "k");
        assert_eq!(config.region, "eastus");
        assert_eq!(azure_config(&AppSettings::default()).timeout_secs, 30);
    }

    #[test]
    fn test_annotation_pass_throughs() {
        let svc = service();
        let scores = vec![PhonemeScore::new("r", "red", 62.0)];
        let out = svc.annotate_text("red", &scores);
        assert_eq!(out[0].accuracy_score(), Some(62.0));
        assert_eq!(svc.reset_annotation("red")[0].accuracy_score(), Some(100.0));
        assert_eq!(svc.phoneme_guide("R").examples[0], "red");
        assert_eq!(svc.mouth_pose("R").lip_aperture, 0.7);
    }
}
