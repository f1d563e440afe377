// ============================================
// src/speech.rs
// 聞き取り問題の読み上げ (OS の TTS コマンドを起動するだけ)
// ============================================

use std::process::Stdio;

use tokio::process::Command;

/// 読み上げ。失敗しても出題は続ける
pub struct Speaker {
    enabled: bool,
}

impl Speaker {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 起動したら終了を待たない (投げっぱなし)
    pub fn speak(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        let Some((program, args)) = tts_command(text) else {
            log::info!("no text-to-speech command on this platform, speech disabled");
            self.enabled = false;
            return;
        };

        let spawned = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(_child) => log::debug!("speaking {:?} with {}", text, program),
            Err(e) => {
                // 何度も失敗ログを出さないよう、以降は無効にする
                log::warn!("failed to start {}: {}, speech disabled", program, e);
                self.enabled = false;
            }
        }
    }
}

#[cfg(target_os = "macos")]
fn tts_command(text: &str) -> Option<(&'static str, Vec<String>)> {
    Some(("say", vec!["-r".into(), "160".into(), text.to_string()]))
}

#[cfg(target_os = "windows")]
fn tts_command(text: &str) -> Option<(&'static str, Vec<String>)> {
    let script = format!(
        "Add-Type -AssemblyName System.Speech; \
         (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{}')",
        text.replace('\'', "''")
    );
    Some(("powershell", vec!["-NoProfile".into(), "-Command".into(), script]))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn tts_command(text: &str) -> Option<(&'static str, Vec<String>)> {
    Some(("espeak", vec!["-s".into(), "140".into(), text.to_string()]))
}

#[cfg(not(any(unix, target_os = "windows")))]
fn tts_command(_text: &str) -> Option<(&'static str, Vec<String>)> {
    None
}
