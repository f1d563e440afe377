// ============================================
// src/effects.rs
// 回答直後の演出 (一定時間で勝手に消える)
// ============================================

use std::time::{Duration, Instant};

/// コンボ演出の間隔
const COMBO_EVERY: u32 = 3;
/// 連続正解ボーナス演出を出すコンボ数
const STREAK_BONUS_AT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Correct,
    Wrong,
    Combo(u32),
    StreakBonus,
}

impl EffectKind {
    pub fn text(self) -> String {
        match self {
            EffectKind::Correct => "CORRECT!".to_string(),
            EffectKind::Wrong => "MISS...".to_string(),
            EffectKind::Combo(n) => format!("{} COMBO!", n),
            EffectKind::StreakBonus => "STREAK BONUS!".to_string(),
        }
    }

    /// (表示開始までの遅れ, 表示時間)
    fn timing(self) -> (Duration, Duration) {
        match self {
            EffectKind::Correct | EffectKind::Wrong => {
                (Duration::ZERO, Duration::from_millis(1000))
            }
            EffectKind::Combo(_) => (Duration::from_millis(300), Duration::from_millis(1200)),
            EffectKind::StreakBonus => (Duration::from_millis(500), Duration::from_millis(1500)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub kind: EffectKind,
    starts_at: Instant,
    expires_at: Instant,
}

impl Effect {
    fn is_visible(&self, now: Instant) -> bool {
        self.starts_at <= now && now < self.expires_at
    }
}

/// 再生中の演出の一覧。キャンセルはなく、期限が来たら消えるだけ
#[derive(Debug, Default)]
pub struct Effects {
    active: Vec<Effect>,
}

impl Effects {
    pub fn play(&mut self, kind: EffectKind, now: Instant) {
        let (delay, duration) = kind.timing();
        let starts_at = now + delay;
        self.active.push(Effect {
            kind,
            starts_at,
            expires_at: starts_at + duration,
        });
    }

    /// 回答結果に応じた演出を積む (`combo` は回答後の値)
    pub fn on_answer(&mut self, is_correct: bool, combo: u32, now: Instant) {
        if !is_correct {
            self.play(EffectKind::Wrong, now);
            return;
        }
        self.play(EffectKind::Correct, now);
        if combo > 0 && combo % COMBO_EVERY == 0 {
            self.play(EffectKind::Combo(combo), now);
        }
        if combo == STREAK_BONUS_AT {
            self.play(EffectKind::StreakBonus, now);
        }
    }

    /// 期限切れを捨てる
    pub fn prune(&mut self, now: Instant) {
        self.active.retain(|e| now < e.expires_at);
    }

    pub fn visible(&self, now: Instant) -> impl Iterator<Item = EffectKind> + '_ {
        self.active
            .iter()
            .filter(move |e| e.is_visible(now))
            .map(|e| e.kind)
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
