// ============================================
// src/logging.rs
// ログの初期化 (画面は TUI が使うのでファイルに書く)
// ============================================

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use log::LevelFilter;

const LOG_FILE: &str = "funwords.log";

/// `dir/funwords.log` に追記する。RUST_LOG があればそちらを優先
///
/// ログファイルが開けなければ何も出さない (ゲームは続ける)。
pub fn init(dir: &Path, level: LevelFilter) -> Option<PathBuf> {
    let path = dir.join(LOG_FILE);
    let file = fs::create_dir_all(dir)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&path))
        .ok()?;

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .ok()?;

    Some(path)
}
