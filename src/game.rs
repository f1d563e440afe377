// ============================================
// src/game.rs
// 1 ラウンド分のゲーム状態 (ライフ・スコア・コンボ・ヒント) と評価
// ============================================

use std::fmt;

/// ラウンドのルール
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    pub total_questions: u32,
    pub lives: u32,
    pub max_hints: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            total_questions: 10,
            lives: 3,
            max_hints: 2,
        }
    }
}

/// ラウンド中の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub current_question: u32, // 今何問目か (0 始まり)
    pub score: u32,
    pub lives: u32,
    /// ラウンド開始時のライフ
    pub max_lives: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub hints_used: u32,
    pub max_hints: u32,
    /// 表示中のヒント (次の回答で消える)
    pub current_hint: Option<String>,
}

impl GameState {
    pub fn new(rules: GameRules) -> Self {
        Self {
            current_question: 0,
            score: 0,
            lives: rules.lives,
            max_lives: rules.lives,
            combo: 0,
            max_combo: 0,
            correct_answers: 0,
            total_questions: rules.total_questions,
            hints_used: 0,
            max_hints: rules.max_hints,
            current_hint: None,
        }
    }

    /// 回答を反映する
    pub fn answer_question(&mut self, is_correct: bool) {
        if is_correct {
            self.combo += 1;
            // 3 連続ごとにボーナス +1
            self.score += 1 + self.combo / 3;
            self.correct_answers += 1;
        } else {
            self.combo = 0;
            self.score = self.score.saturating_sub(1);
            self.lives = self.lives.saturating_sub(1);
        }
        self.max_combo = self.max_combo.max(self.combo);
        self.current_question = (self.current_question + 1).min(self.total_questions);
        self.current_hint = None;
    }

    /// ヒントを使う。上限チェックは呼び出し側 (`can_use_hint`) の責任
    pub fn use_hint(&mut self, hint: String) {
        self.hints_used += 1;
        self.current_hint = Some(hint);
    }

    pub fn can_use_hint(&self) -> bool {
        self.hints_used < self.max_hints
    }

    /// ライフが尽きたか、全問回答したらラウンド終了
    pub fn is_over(&self) -> bool {
        self.lives == 0 || self.current_question >= self.total_questions
    }

    pub fn result(&self) -> GameResult {
        let correct_rate = correct_rate(self.correct_answers, self.total_questions);
        GameResult {
            score: self.score,
            correct_rate,
            max_combo: self.max_combo,
            grade: grade(correct_rate),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameRules::default())
    }
}

/// 評価
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    S,
    A,
    B,
    C,
}

impl Grade {
    /// 結果画面のひとこと
    pub fn message(self) -> &'static str {
        match self {
            Grade::S => "Perfect! You are a word master!",
            Grade::A => "Excellent! Keep it up!",
            Grade::B => "Nice work, push a little further!",
            Grade::C => "Keep practicing, you'll get there!",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
        };
        f.write_str(letter)
    }
}

/// 正答率 (%) から評価を決める
pub fn grade(correct_rate: u32) -> Grade {
    match correct_rate {
        90.. => Grade::S,
        80..=89 => Grade::A,
        70..=79 => Grade::B,
        _ => Grade::C,
    }
}

/// 正答率 (%) を四捨五入で求める
pub fn correct_rate(correct_answers: u32, total_questions: u32) -> u32 {
    if total_questions == 0 {
        return 0;
    }
    (100.0 * correct_answers as f64 / total_questions as f64).round() as u32
}

/// ラウンド終了時の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub score: u32,
    pub correct_rate: u32,
    pub max_combo: u32,
    pub grade: Grade,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_rules() {
        let state = GameState::default();
        assert_eq!(state.lives, 3);
        assert_eq!(state.total_questions, 10);
        assert_eq!(state.max_hints, 2);
        assert_eq!((state.score, state.combo, state.current_question), (0, 0, 0));
        assert!(!state.is_over());
    }

    #[test]
    fn max_lives_follows_custom_rules() {
        let mut state = GameState::new(GameRules {
            total_questions: 5,
            lives: 5,
            max_hints: 1,
        });
        state.answer_question(false);
        assert_eq!(state.lives, 4);
        assert_eq!(state.max_lives, 5);
    }

    #[test]
    fn combo_bonus_every_third_correct_answer() {
        let mut state = GameState::default();
        let mut scores = Vec::new();
        for _ in 0..6 {
            state.answer_question(true);
            scores.push(state.score);
        }
        // +1 +1 +2 +2 +2 +3
        assert_eq!(scores, vec![1, 2, 4, 6, 8, 11]);
        assert_eq!(state.combo, 6);
        assert_eq!(state.max_combo, 6);
        assert_eq!(state.correct_answers, 6);
    }

    #[test]
    fn wrong_answer_resets_combo_and_costs_a_life() {
        let mut state = GameState::default();
        state.answer_question(true);
        state.answer_question(true);
        state.answer_question(false);

        assert_eq!(state.combo, 0);
        assert_eq!(state.max_combo, 2);
        assert_eq!(state.lives, 2);
        assert_eq!(state.score, 1);
        assert_eq!(state.current_question, 3);
    }

    #[test]
    fn score_and_lives_never_go_negative() {
        let mut state = GameState::new(GameRules {
            total_questions: 10,
            lives: 1,
            max_hints: 2,
        });
        state.answer_question(false);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 0);
        assert_eq!(state.max_lives, 1);
        assert!(state.is_over());

        state.answer_question(false);
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn round_ends_after_last_question() {
        let mut state = GameState::default();
        for _ in 0..9 {
            state.answer_question(true);
        }
        assert!(!state.is_over());
        state.answer_question(true);
        assert!(state.is_over());

        state.answer_question(true);
        assert_eq!(state.current_question, state.total_questions);
    }

    #[test]
    fn hints_are_counted_and_cleared_by_the_next_answer() {
        let mut state = GameState::default();
        assert!(state.can_use_hint());
        state.use_hint("Hint: ap___".to_string());
        assert_eq!(state.current_hint.as_deref(), Some("Hint: ap___"));
        state.use_hint("Hint: x".to_string());
        assert!(!state.can_use_hint());
        assert_eq!(state.hints_used, 2);

        state.answer_question(true);
        assert_eq!(state.current_hint, None);
    }

    #[test]
    fn grade_thresholds() {
        assert_eq!(grade(100), Grade::S);
        assert_eq!(grade(90), Grade::S);
        assert_eq!(grade(89), Grade::A);
        assert_eq!(grade(80), Grade::A);
        assert_eq!(grade(79), Grade::B);
        assert_eq!(grade(70), Grade::B);
        assert_eq!(grade(69), Grade::C);
        assert_eq!(grade(0), Grade::C);
    }

    #[test]
    fn result_uses_rounded_correct_rate() {
        assert_eq!(correct_rate(2, 3), 67);
        assert_eq!(correct_rate(1, 8), 13);
        assert_eq!(correct_rate(0, 0), 0);

        let mut state = GameState::default();
        for i in 0..10 {
            state.answer_question(i != 4);
        }
        let result = state.result();
        assert_eq!(result.correct_rate, 90);
        assert_eq!(result.grade, Grade::S);
        assert_eq!(result.max_combo, 5);
        assert_eq!(result.score, state.score);
    }
}
