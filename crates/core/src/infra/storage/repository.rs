use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::assessment::OverallScores;
use crate::domain::error::AppError;
use crate::domain::phoneme::PhonemeScore;
use crate::domain::settings::AppSettings;
use crate::domain::types::{AttemptSummary, HistoryPage, PhonemeProgress, PracticeAttempt};

/// SQLiteストレージ（attempts + phoneme_scores）
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// 新規接続（ファイルパス指定）
    pub fn open(path: &str) -> Result<Self, AppError> {
        let conn = Connection::open(path)
            .map_err(|e| AppError::storage(format!("DB接続に失敗: {e}")))?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    /// in-memory DB（テスト用）
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::storage(format!("in-memory DB作成に失敗: {e}")))?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    /// スキーママイグレーション
    fn migrate(&self) -> Result<(), AppError> {
        self.conn
            .execute_batch(
                "
                PRAGMA foreign_keys = ON;

                CREATE TABLE IF NOT EXISTS attempts (
                    attempt_id     TEXT PRIMARY KEY,
                    reference_text TEXT NOT NULL,
                    transcription  TEXT NOT NULL DEFAULT '',
                    accuracy       REAL NOT NULL DEFAULT 0.0,
                    fluency        REAL NOT NULL DEFAULT 0.0,
                    completeness   REAL NOT NULL DEFAULT 0.0,
                    prosody        REAL NOT NULL DEFAULT 0.0,
                    pronunciation  REAL NOT NULL DEFAULT 0.0,
                    feedback       TEXT,
                    created_at     TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS phoneme_scores (
                    attempt_id     TEXT NOT NULL,
                    position       INTEGER NOT NULL,
                    word           TEXT,
                    phoneme        TEXT NOT NULL,
                    accuracy_score REAL NOT NULL,
                    PRIMARY KEY (attempt_id, position),
                    FOREIGN KEY (attempt_id) REFERENCES attempts(attempt_id) ON DELETE CASCADE
                );

                CREATE INDEX IF NOT EXISTS idx_attempts_created
                    ON attempts(created_at DESC);
                CREATE INDEX IF NOT EXISTS idx_phoneme_scores_phoneme
                    ON phoneme_scores(phoneme);

                CREATE TABLE IF NOT EXISTS settings (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                ",
            )
            .map_err(|e| AppError::storage(format!("マイグレーション失敗: {e}")))?;
        Ok(())
    }

    // --- Attempts ---

    /// 練習結果と音素スコアを1トランザクションで保存する
    pub fn insert_attempt(&self, attempt: &PracticeAttempt) -> Result<(), AppError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| AppError::storage(format!("トランザクション開始失敗: {e}")))?;

        let s = &attempt.scores;
        tx.execute(
            "INSERT INTO attempts (attempt_id, reference_text, transcription, accuracy, fluency,
                                   completeness, prosody, pronunciation, feedback, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                attempt.attempt_id,
                attempt.reference_text,
                attempt.transcription,
                s.accuracy,
                s.fluency,
                s.completeness,
                s.prosody,
                s.pronunciation,
                attempt.feedback,
                attempt.created_at,
            ],
        )
        .map_err(|e| AppError::storage(format!("練習結果挿入失敗: {e}")))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO phoneme_scores (attempt_id, position, word, phoneme, accuracy_score)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| AppError::storage(format!("クエリ準備失敗: {e}")))?;
            for (position, p) in attempt.phonemes.iter().enumerate() {
                stmt.execute(params![
                    attempt.attempt_id,
                    position as i64,
                    p.from_word,
                    p.phoneme,
                    p.accuracy_score,
                ])
                .map_err(|e| AppError::storage(format!("音素スコア挿入失敗: {e}")))?;
            }
        }

        tx.commit()
            .map_err(|e| AppError::storage(format!("コミット失敗: {e}")))?;
        Ok(())
    }

    /// フィードバック文を保存する。対象がなければ false。
    pub fn update_attempt_feedback(
        &self,
        attempt_id: &str,
        feedback: &str,
    ) -> Result<bool, AppError> {
        let affected = self
            .conn
            .execute(
                "UPDATE attempts SET feedback = ?1 WHERE attempt_id = ?2",
                params![feedback, attempt_id],
            )
            .map_err(|e| AppError::storage(format!("フィードバック更新失敗: {e}")))?;
        Ok(affected > 0)
    }

    pub fn get_attempt(&self, attempt_id: &str) -> Result<Option<PracticeAttempt>, AppError> {
        let attempt = self
            .conn
            .query_row(
                "SELECT attempt_id, reference_text, transcription, accuracy, fluency,
                        completeness, prosody, pronunciation, feedback, created_at
                 FROM attempts WHERE attempt_id = ?1",
                params![attempt_id],
                |row| {
                    Ok(PracticeAttempt {
                        attempt_id: row.get(0)?,
                        reference_text: row.get(1)?,
                        transcription: row.get(2)?,
                        scores: OverallScores {
                            accuracy: row.get(3)?,
                            fluency: row.get(4)?,
                            completeness: row.get(5)?,
                            prosody: row.get(6)?,
                            pronunciation: row.get(7)?,
                        },
                        feedback: row.get(8)?,
                        created_at: row.get(9)?,
                        phonemes: Vec::new(),
                    })
                },
            )
            .optional()
            .map_err(|e| AppError::storage(format!("練習結果取得失敗: {e}")))?;

        let Some(mut attempt) = attempt else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare(
                "SELECT phoneme, word, accuracy_score FROM phoneme_scores
                 WHERE attempt_id = ?1 ORDER BY position",
            )
            .map_err(|e| AppError::storage(format!("クエリ準備失敗: {e}")))?;

        attempt.phonemes = stmt
            .query_map(params![attempt_id], |row| {
                Ok(PhonemeScore {
                    phoneme: row.get(0)?,
                    from_word: row.get(1)?,
                    accuracy_score: row.get(2)?,
                })
            })
            .map_err(|e| AppError::storage(format!("クエリ実行失敗: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage(format!("行読み取り失敗: {e}")))?;

        Ok(Some(attempt))
    }

    // --- Queries ---

    /// 新しい順の履歴。`cursor` は前ページ最後の created_at。
    pub fn list_history(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<HistoryPage, AppError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT a.attempt_id, a.reference_text, a.transcription, a.accuracy,
                        a.pronunciation, a.created_at,
                        (SELECT COUNT(*) FROM phoneme_scores p WHERE p.attempt_id = a.attempt_id)
                 FROM attempts a
                 WHERE ?1 IS NULL OR a.created_at < ?1
                 ORDER BY a.created_at DESC
                 LIMIT ?2",
            )
            .map_err(|e| AppError::storage(format!("クエリ準備失敗: {e}")))?;

        let rows: Vec<AttemptSummary> = stmt
            .query_map(params![cursor, limit + 1], |row| {
                Ok(AttemptSummary {
                    attempt_id: row.get(0)?,
                    reference_text: row.get(1)?,
                    transcription: row.get(2)?,
                    accuracy: row.get(3)?,
                    pronunciation: row.get(4)?,
                    created_at: row.get(5)?,
                    phoneme_count: row.get(6)?,
                })
            })
            .map_err(|e| AppError::storage(format!("クエリ実行失敗: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage(format!("行読み取り失敗: {e}")))?;

        let has_next = rows.len() > limit as usize;
        let items: Vec<AttemptSummary> = rows.into_iter().take(limit as usize).collect();
        let next_cursor = if has_next {
            items.last().map(|a| a.created_at.clone())
        } else {
            None
        };

        Ok(HistoryPage { items, next_cursor })
    }

    /// 音素ごとの集計。平均の低い順（苦手な音素が先）。
    pub fn phoneme_progress(&self, limit: u32) -> Result<Vec<PhonemeProgress>, AppError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT phoneme, AVG(accuracy_score), MAX(accuracy_score),
                        MIN(accuracy_score), COUNT(*)
                 FROM phoneme_scores
                 WHERE phoneme <> ''
                 GROUP BY phoneme
                 ORDER BY AVG(accuracy_score) ASC, phoneme ASC
                 LIMIT ?1",
            )
            .map_err(|e| AppError::storage(format!("クエリ準備失敗: {e}")))?;

        let progress = stmt
            .query_map(params![limit], |row| {
                Ok(PhonemeProgress {
                    phoneme: row.get(0)?,
                    average: row.get(1)?,
                    best: row.get(2)?,
                    worst: row.get(3)?,
                    count: row.get(4)?,
                })
            })
            .map_err(|e| AppError::storage(format!("クエリ実行失敗: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage(format!("行読み取り失敗: {e}")))?;

        Ok(progress)
    }

    // --- Settings ---

    /// 保存済みのキーだけをデフォルト設定に重ねて返す
    pub fn get_settings(&self) -> Result<AppSettings, AppError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM settings")
            .map_err(|e| AppError::storage(format!("クエリ準備失敗: {e}")))?;

        let rows: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| AppError::storage(format!("クエリ実行失敗: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage(format!("行読み取り失敗: {e}")))?;

        if rows.is_empty() {
            return Ok(AppSettings::default());
        }

        let mut merged = serde_json::to_value(AppSettings::default())
            .map_err(|e| AppError::internal(format!("settings serialize: {e}")))?;
        if let Some(obj) = merged.as_object_mut() {
            for (key, value) in rows {
                // JSONとして解析可能ならそのまま、そうでなければ文字列として
                let v = serde_json::from_str(&value)
                    .unwrap_or(serde_json::Value::String(value));
                obj.insert(key, v);
            }
        }

        match serde_json::from_value::<AppSettings>(merged) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                log::warn!("保存済み設定を読み込めないためデフォルトを使用: {e}");
                Ok(AppSettings::default())
            }
        }
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<(), AppError> {
        let json = serde_json::to_value(settings)
            .map_err(|e| AppError::internal(format!("settings serialize: {e}")))?;

        if let Some(obj) = json.as_object() {
            for (key, value) in obj {
                let value_str = value.to_string();
                self.conn
                    .execute(
                        "INSERT INTO settings (key, value) VALUES (?1, ?2)
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                        params![key, value_str],
                    )
                    .map_err(|e| AppError::storage(format!("設定保存失敗: {e}")))?;
            }
        }

        Ok(())
    }

    // --- Data cleanup ---

    /// 期限より古い練習結果を削除する（音素スコアは連動して消える）
    pub fn delete_attempts_before(&self, before_date: &str) -> Result<u32, AppError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM attempts WHERE created_at < ?1",
                params![before_date],
            )
            .map_err(|e| AppError::storage(format!("練習結果削除失敗: {e}")))?;
        Ok(affected as u32)
    }
}
