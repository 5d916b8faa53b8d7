use parking_lot::Mutex;
use serde::Serialize;

/// 保持するレイテンシ記録の上限
const MAX_LATENCY_RECORDS: usize = 1000;
/// サマリーに含める直近記録の件数
const RECENT_LATENCIES: usize = 20;

/// ローカルメトリクス収集器
pub struct Metrics {
    counters: Mutex<MetricsCounters>,
    latencies: Mutex<Vec<LatencyRecord>>,
}

#[derive(Debug, Default)]
struct MetricsCounters {
    analyses_completed: u64,
    phonemes_scored: u64,
    feedback_generated: u64,
    errors_input: u64,
    errors_assessment: u64,
    errors_no_speech: u64,
    errors_feedback: u64,
    errors_storage: u64,
    errors_internal: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyRecord {
    pub phase: String,
    pub duration_ms: u64,
    pub timestamp: String,
}

/// メトリクスサマリー（呼び出し元に返す用）
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub analyses_completed: u64,
    pub phonemes_scored: u64,
    pub feedback_generated: u64,
    pub error_counts: ErrorCounts,
    pub avg_latency_ms: AvgLatency,
    pub recent_latencies: Vec<LatencyRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorCounts {
    pub input: u64,
    pub assessment: u64,
    pub no_speech: u64,
    pub feedback: u64,
    pub storage: u64,
    pub internal: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvgLatency {
    pub assess: Option<f64>,
    pub feedback: Option<f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(MetricsCounters::default()),
            latencies: Mutex::new(Vec::new()),
        }
    }

    pub fn inc_analyses_completed(&self, phoneme_count: usize) {
        let mut c = self.counters.lock();
        c.analyses_completed += 1;
        c.phonemes_scored += phoneme_count as u64;
    }

    pub fn inc_feedback_generated(&self) {
        self.counters.lock().feedback_generated += 1;
    }

    pub fn inc_error(&self, code: &str) {
        let mut c = self.counters.lock();
        match code {
            "E_INVALID_INPUT" => c.errors_input += 1,
            "E_ASSESSMENT" | "E_TIMEOUT" | "E_NOT_CONFIGURED" => c.errors_assessment += 1,
            "E_NO_SPEECH" => c.errors_no_speech += 1,
            "E_FEEDBACK" => c.errors_feedback += 1,
            "E_STORAGE" => c.errors_storage += 1,
            _ => c.errors_internal += 1,
        }
    }

    pub fn record_latency(&self, phase: &str, duration_ms: u64) {
        let record = LatencyRecord {
            phase: phase.to_string(),
            duration_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let mut latencies = self.latencies.lock();
        latencies.push(record);
        if latencies.len() > MAX_LATENCY_RECORDS {
            let excess = latencies.len() - MAX_LATENCY_RECORDS;
            latencies.drain(0..excess);
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        let c = self.counters.lock();
        let latencies = self.latencies.lock();

        let avg = |phase: &str| -> Option<f64> {
            let (sum, n) = latencies
                .iter()
                .filter(|r| r.phase == phase)
                .fold((0.0, 0u32), |(sum, n), r| (sum + r.duration_ms as f64, n + 1));
            (n > 0).then(|| sum / n as f64)
        };

        let recent: Vec<LatencyRecord> = latencies
            .iter()
            .rev()
            .take(RECENT_LATENCIES)
            .cloned()
            .collect();

        MetricsSummary {
            analyses_completed: c.analyses_completed,
            phonemes_scored: c.phonemes_scored,
            feedback_generated: c.feedback_generated,
            error_counts: ErrorCounts {
                input: c.errors_input,
                assessment: c.errors_assessment,
                no_speech: c.errors_no_speech,
                feedback: c.errors_feedback,
                storage: c.errors_storage,
                internal: c.errors_internal,
            },
            avg_latency_ms: AvgLatency {
                assess: avg("assess"),
                feedback: avg("feedback"),
            },
            recent_latencies: recent,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let m = Metrics::new();
        m.inc_analyses_completed(3);
        m.inc_analyses_completed(5);
        m.inc_feedback_generated();
        m.inc_error("E_NO_SPEECH");
        m.inc_error("E_TIMEOUT");
        m.inc_error("E_SOMETHING_ELSE");

        let s = m.summary();
        assert_eq!(s.analyses_completed, 2);
        assert_eq!(s.phonemes_scored, 8);
        assert_eq!(s.feedback_generated, 1);
        assert_eq!(s.error_counts.no_speech, 1);
        assert_eq!(s.error_counts.assessment, 1);
        assert_eq!(s.error_counts.internal, 1);
    }

    #[test]
    fn test_latency_recording() {
        let m = Metrics::new();
        m.record_latency("assess", 120);
        m.record_latency("assess", 80);
        m.record_latency("feedback", 200);

        let s = m.summary();
        assert!((s.avg_latency_ms.assess.unwrap() - 100.0).abs() < f64::EPSILON);
        assert!((s.avg_latency_ms.feedback.unwrap() - 200.0).abs() < f64::EPSILON);
        assert_eq!(s.recent_latencies.len(), 3);
        // 新しい順
        assert_eq!(s.recent_latencies[0].phase, "feedback");
    }

    #[test]
    fn test_latency_cap() {
        let m = Metrics::new();
        for i in 0..1100 {
            m.record_latency("assess", i);
        }
        assert_eq!(m.latencies.lock().len(), MAX_LATENCY_RECORDS);
        assert_eq!(m.summary().recent_latencies.len(), RECENT_LATENCIES);
    }
}
