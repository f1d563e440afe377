// ============================================
// src/store.rs
// 単語・学習記録・ハイスコアの保存 (words / progress / meta)
// ============================================

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bincode::config::standard;
use bincode::{Decode, Encode};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rand::Rng;
use rand::seq::IndexedRandom;
use tokio::fs;

use crate::error::StoreError;
use crate::words::{Progress, Word};

const STORE_FILE: &str = "funwords.bin";

/// ハイスコアなど、1 件だけ持つ値
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Meta {
    pub high_score: u32,
    pub achieved_at: Option<DateTime<Utc>>,
}

/// メモリ上のテーブル一式
#[derive(Debug, Clone, Default)]
struct Tables {
    words: BTreeMap<u32, Word>,
    progress: BTreeMap<u32, Progress>,
    meta: Meta,
}

/// bincode用の内部表現（DateTimeをi64に変換）
#[derive(Encode, Decode)]
struct ProgressBin {
    word_id: u32,
    correct: u32,
    wrong: u32,
    last_answered_secs: Option<i64>,
}

#[derive(Encode, Decode)]
struct MetaBin {
    high_score: u32,
    achieved_at_secs: Option<i64>,
}

#[derive(Encode, Decode)]
struct TablesBin {
    words: Vec<Word>,
    progress: Vec<ProgressBin>,
    meta: MetaBin,
}

fn from_secs(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

impl From<&Tables> for TablesBin {
    fn from(tables: &Tables) -> Self {
        Self {
            words: tables.words.values().cloned().collect(),
            progress: tables
                .progress
                .values()
                .map(|p| ProgressBin {
                    word_id: p.word_id,
                    correct: p.correct,
                    wrong: p.wrong,
                    last_answered_secs: p.last_answered.map(|t| t.timestamp()),
                })
                .collect(),
            meta: MetaBin {
                high_score: tables.meta.high_score,
                achieved_at_secs: tables.meta.achieved_at.map(|t| t.timestamp()),
            },
        }
    }
}

impl From<TablesBin> for Tables {
    fn from(bin: TablesBin) -> Self {
        Self {
            words: bin.words.into_iter().map(|w| (w.id, w)).collect(),
            progress: bin
                .progress
                .into_iter()
                .map(|p| {
                    let progress = Progress {
                        word_id: p.word_id,
                        correct: p.correct,
                        wrong: p.wrong,
                        last_answered: from_secs(p.last_answered_secs),
                    };
                    (p.word_id, progress)
                })
                .collect(),
            meta: Meta {
                high_score: bin.meta.high_score,
                achieved_at: from_secs(bin.meta.achieved_at_secs),
            },
        }
    }
}

/// キー付きの小さな組み込みストア
///
/// 読み込みはメモリ上のテーブルから返し、更新のたびにファイル全体を書き直す。
/// `path` が `None` のときはメモリのみ (保存先が使えないときのフォールバック)。
pub struct Store {
    tables: Tables,
    path: Option<PathBuf>,
}

impl Store {
    /// OS ごとのデータ保存用ディレクトリ
    pub fn default_dir() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("jp", "Fukumoto0141", "FUN_WORDS") {
            return proj_dirs.data_dir().to_path_buf();
        }
        // 万が一取得できなかったらカレントディレクトリに（フォールバック）
        PathBuf::from(".")
    }

    /// `dir` 以下のストアファイルを開く (なければ空で作る)
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", dir.display(), e)))?;

        let path = dir.join(STORE_FILE);
        let tables = match fs::read(&path).await {
            Ok(bytes) => match decode_tables(&bytes) {
                Ok(tables) => tables,
                Err(e) => {
                    // 壊れたファイルは捨てて空から始める (次の書き込みで上書き)
                    log::warn!("{} is unreadable, starting empty: {}", path.display(), e);
                    Tables::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Tables::default(),
            Err(e) => {
                return Err(StoreError::Unavailable(format!("{}: {}", path.display(), e)));
            }
        };

        log::info!(
            "store opened at {} ({} words, high score {})",
            path.display(),
            tables.words.len(),
            tables.meta.high_score
        );
        Ok(Self {
            tables,
            path: Some(path),
        })
    }

    /// ファイルに書き出さないストア
    pub fn in_memory() -> Self {
        Self {
            tables: Tables::default(),
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 単語を id をキーにまとめて登録 (既存は上書き)
    pub async fn put_words(&mut self, words: &[Word]) -> Result<(), StoreError> {
        for word in words {
            self.tables.words.insert(word.id, word.clone());
        }
        self.flush().await
    }

    pub async fn all_words(&self) -> Result<Vec<Word>, StoreError> {
        Ok(self.tables.words.values().cloned().collect())
    }

    /// 重複なしで `count` 語をランダムに取り出す (足りなければ全部)
    pub async fn random_words<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Word>, StoreError> {
        let words: Vec<&Word> = self.tables.words.values().collect();
        Ok(words
            .choose_multiple(rng, count)
            .map(|w| (*w).clone())
            .collect())
    }

    pub async fn progress(&self, word_id: u32) -> Result<Option<Progress>, StoreError> {
        Ok(self.tables.progress.get(&word_id).cloned())
    }

    /// 回答結果を加算し、更新後の記録を返す
    pub async fn record_answer(
        &mut self,
        word_id: u32,
        is_correct: bool,
    ) -> Result<Progress, StoreError> {
        let progress = self
            .tables
            .progress
            .entry(word_id)
            .or_insert_with(|| Progress::new(word_id));
        progress.record(is_correct, Utc::now());
        let updated = progress.clone();

        self.flush().await?;
        Ok(updated)
    }

    pub async fn high_score(&self) -> Result<u32, StoreError> {
        Ok(self.tables.meta.high_score)
    }

    pub async fn meta(&self) -> Result<Meta, StoreError> {
        Ok(self.tables.meta)
    }

    /// 今のハイスコアより大きいときだけ更新する。更新したら true
    pub async fn update_high_score(&mut self, score: u32) -> Result<bool, StoreError> {
        if score <= self.tables.meta.high_score {
            return Ok(false);
        }
        self.tables.meta = Meta {
            high_score: score,
            achieved_at: Some(Utc::now()),
        };
        self.flush().await?;
        Ok(true)
    }

    /// 学習記録とハイスコアを消す (単語は残す)
    pub async fn reset_progress(&mut self) -> Result<(), StoreError> {
        self.tables.progress.clear();
        self.tables.meta = Meta::default();
        self.flush().await
    }

    /// テーブル全体を一時ファイルに書いてから置き換える
    async fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let encoded = bincode::encode_to_vec(TablesBin::from(&self.tables), standard())?;
        let tmp = path.with_extension("bin.tmp");
        fs::write(&tmp, &encoded).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

fn decode_tables(bytes: &[u8]) -> Result<Tables, StoreError> {
    let (bin, _) = bincode::decode_from_slice::<TablesBin, _>(bytes, standard())?;
    Ok(Tables::from(bin))
}
