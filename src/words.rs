/*
 * src/words.rs
 * 単語データと学習記録のモジュール
 */

use bincode::{Decode, Encode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 同梱の単語リスト (ストアが空のときに投入する)
const SEED_WORDS_JSON: &str = include_str!("../data/words.json");

/// 単語 1 件。ロード後は変更しない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: u32,
    pub headword: String, // 英単語 (例: "apple")
    pub meaning: String,  // 意味 (例: "りんご")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_key: Option<String>,
}

/// 単語ごとの正解/不正解の累計
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub word_id: u32,
    pub correct: u32,
    pub wrong: u32,
    /// 最後に回答した時刻
    pub last_answered: Option<DateTime<Utc>>,
}

impl Progress {
    /// まだ一度も回答していない単語の記録
    pub fn new(word_id: u32) -> Self {
        Self {
            word_id,
            correct: 0,
            wrong: 0,
            last_answered: None,
        }
    }

    /// 回答結果を加算する
    pub fn record(&mut self, is_correct: bool, at: DateTime<Utc>) {
        if is_correct {
            self.correct += 1;
        } else {
            self.wrong += 1;
        }
        self.last_answered = Some(at);
    }
}

/// 同梱の単語リストを読み込む
pub fn seed_words() -> Result<Vec<Word>, AppError> {
    Ok(serde_json::from_str(SEED_WORDS_JSON)?)
}
