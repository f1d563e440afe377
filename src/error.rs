// ============================================
// src/error.rs
// エラー型の定義
// ============================================

use thiserror::Error;

/// ストア (words / progress / meta) の操作で発生するエラー
#[derive(Error, Debug)]
pub enum StoreError {
    /// データディレクトリに到達できない
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// アプリ全体のエラー
#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("seed word list is broken: {0}")]
    Seed(#[from] serde_json::Error),

    /// 出題できる単語が 1 つもない
    #[error("word bank is empty")]
    EmptyWordBank,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}
