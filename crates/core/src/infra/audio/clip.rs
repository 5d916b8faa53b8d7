use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use crate::infra::assessment::AssessmentError;

/// 評価サービスへ送る録音データ（WAV）。
/// ヘッダは hound で検証済みで、サンプル自体はデコードしない。
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// WAVファイル全体のバイト列
    pub wav_bytes: Vec<u8>,
    /// サンプルレート (Hz)
    pub sample_rate: u32,
    /// チャンネル数
    pub channels: u16,
    /// 量子化ビット数
    pub bits_per_sample: u16,
    /// 長さ (ミリ秒)
    pub duration_ms: u32,
}

impl AudioClip {
    /// WAVバイト列を検証して AudioClip を生成する。
    pub fn from_wav_bytes(wav_bytes: Vec<u8>) -> Result<Self, AssessmentError> {
        if wav_bytes.is_empty() {
            return Err(AssessmentError::AudioFormat("empty audio payload".into()));
        }

        let (spec, frames) = {
            let reader = hound::WavReader::new(Cursor::new(&wav_bytes))
                .map_err(|e| AssessmentError::AudioFormat(format!("invalid WAV: {e}")))?;
            // duration() はチャンネルあたりのサンプル数
            (reader.spec(), reader.duration() as u64)
        };
        if spec.sample_rate == 0 {
            return Err(AssessmentError::AudioFormat("sample rate is zero".into()));
        }

        let duration_ms = (frames * 1000 / spec.sample_rate as u64) as u32;

        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            duration_ms,
            wav_bytes,
        })
    }

    /// ブラウザから届く `data:audio/wav;base64,...` 形式を受け付ける。
    /// プレフィックスがなければ全体を base64 とみなす。
    pub fn from_data_url(data_url: &str) -> Result<Self, AssessmentError> {
        let payload = match data_url.split_once("base64,") {
            Some((_, encoded)) => encoded,
            None => data_url,
        };
        let bytes = BASE64_STANDARD
            .decode(payload.trim())
            .map_err(|e| AssessmentError::AudioFormat(format!("invalid base64 audio: {e}")))?;
        Self::from_wav_bytes(bytes)
    }

    /// 評価サービスへ渡す Content-Type
    pub fn content_type(&self) -> String {
        format!(
            "audio/wav; codecs=audio/pcm; samplerate={}",
            self.sample_rate
        )
    }
}
