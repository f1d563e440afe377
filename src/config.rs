// ============================================
// src/config.rs
// コマンドライン設定
// ============================================

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;

use crate::store::Store;

#[derive(Parser, Debug)]
#[command(name = "funwords", version, about = "FUN WORDS - vocabulary quiz in your terminal")]
pub struct Args {
    /// データ保存先 (省略時は OS 標準のデータディレクトリ)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// 乱数シード (出題順を再現したいとき)
    #[arg(long)]
    pub seed: Option<u64>,

    /// 学習記録とハイスコアを消去して終了する
    #[arg(long)]
    pub reset: bool,

    /// --reset の確認を省略する
    #[arg(short = 'y', long, requires = "reset")]
    pub yes: bool,

    /// 聞き取り問題で読み上げない
    #[arg(long)]
    pub no_speech: bool,

    /// ログを詳しくする (-v: info, -vv: debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(Store::default_dir)
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}
