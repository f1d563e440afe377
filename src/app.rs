// ============================================
// src/app.rs
// 画面遷移とキー入力 (ホーム → 出題 → 結果 → ホーム)
// ============================================

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::effects::Effects;
use crate::game::{GameResult, GameRules, GameState};
use crate::questions::{Question, QuestionGenerator, QuestionKind};
use crate::speech::Speaker;
use crate::store::Store;
use crate::words::{Progress, Word};

/// 正解/不正解を表示しておく時間
const FEEDBACK_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Playing,
    Result,
}

/// 直前の回答の判定。表示中は回答した問題をそのまま見せる
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub question: Question,
    pub is_correct: bool,
    pub correct_answer: String,
    until: Instant,
}

/// アプリ全体の状態を管理する
pub struct App {
    store: Store,
    /// 単語帳全体 (ストアから取れないときの予備)
    words: Vec<Word>,
    rng: StdRng,
    rules: GameRules,
    speaker: Speaker,

    pub screen: Screen,
    pub state: GameState,
    pub questions: Vec<Question>,
    /// 出題中の単語のこれまでの成績
    pub current_progress: Option<Progress>,

    /// スペル問題の入力中の文字列
    pub input: String,
    /// 4 択のカーソル位置
    pub selected: usize,
    pub feedback: Option<Feedback>,
    pub effects: Effects,

    pub high_score: u32,
    pub high_score_at: Option<DateTime<Utc>>,
    pub last_result: Option<GameResult>,
    pub new_record: bool,
    /// ホーム画面に出すお知らせ (出題できなかったときなど)
    pub notice: Option<String>,
    pub should_quit: bool,
}

/// ストアを開き、空なら同梱の単語を入れる。失敗したらメモリだけで動かす
pub async fn open_store(dir: &Path, seed_words: &[Word]) -> (Store, Vec<Word>) {
    let mut store = match Store::open(dir).await {
        Ok(store) => store,
        Err(e) => {
            log::error!("failed to open store, falling back to built-in words: {}", e);
            Store::in_memory()
        }
    };

    let mut words = store.all_words().await.unwrap_or_else(|e| {
        log::error!("failed to read words: {}", e);
        Vec::new()
    });
    if words.is_empty() {
        if let Err(e) = store.put_words(seed_words).await {
            log::error!("failed to save built-in words: {}", e);
        }
        words = match store.all_words().await {
            Ok(stored) if !stored.is_empty() => stored,
            _ => seed_words.to_vec(),
        };
    }

    (store, words)
}

impl App {
    pub fn new(store: Store, words: Vec<Word>, seed: Option<u64>, speaker: Speaker) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            store,
            words,
            rng,
            rules: GameRules::default(),
            speaker,
            screen: Screen::Home,
            state: GameState::default(),
            questions: Vec::new(),
            current_progress: None,
            input: String::new(),
            selected: 0,
            feedback: None,
            effects: Effects::default(),
            high_score: 0,
            high_score_at: None,
            last_result: None,
            new_record: false,
            notice: None,
            should_quit: false,
        }
    }

    /// 起動時の初期化 (ストア準備 + ハイスコア読み込み)
    pub async fn load(dir: &Path, seed_words: &[Word], seed: Option<u64>, speaker: Speaker) -> Self {
        let (store, words) = open_store(dir, seed_words).await;
        let mut app = Self::new(store, words, seed, speaker);
        match app.store.meta().await {
            Ok(meta) => {
                app.high_score = meta.high_score;
                app.high_score_at = meta.achieved_at;
            }
            Err(e) => log::error!("failed to read high score: {}", e),
        }
        app
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn speech_enabled(&self) -> bool {
        self.speaker.is_enabled()
    }

    pub fn is_persistent(&self) -> bool {
        self.store.path().is_some()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.state.current_question as usize)
    }

    /// 新しいラウンドを始める
    pub async fn start_round(&mut self) {
        let count = self.rules.total_questions as usize;
        let words = match self.store.random_words(count, &mut self.rng).await {
            Ok(words) if !words.is_empty() => words,
            Ok(_) => self.fallback_words(count),
            Err(e) => {
                log::error!("failed to pick words from store: {}", e);
                self.fallback_words(count)
            }
        };

        let mut generator = match QuestionGenerator::new(words, StdRng::from_rng(&mut self.rng)) {
            Ok(generator) => generator,
            Err(e) => {
                log::error!("cannot start a round: {}", e);
                self.notice = Some(format!("Cannot start: {}", e));
                self.screen = Screen::Home;
                return;
            }
        };

        self.questions = generator.generate_questions(count);
        self.state = GameState::new(self.rules);
        self.input.clear();
        self.selected = 0;
        self.feedback = None;
        self.effects.clear();
        self.last_result = None;
        self.new_record = false;
        self.notice = None;
        self.screen = Screen::Playing;
        log::info!("round started with {} questions", self.questions.len());
        self.announce_question().await;
    }

    fn fallback_words(&mut self, count: usize) -> Vec<Word> {
        self.words
            .choose_multiple(&mut self.rng, count)
            .cloned()
            .collect()
    }

    /// 出題中の単語の成績を読み込み、聞き取り問題なら読み上げる
    async fn announce_question(&mut self) {
        let Some(question) = self.questions.get(self.state.current_question as usize) else {
            return;
        };
        let word_id = question.word.id;
        let kind = question.kind;
        let headword = question.word.headword.clone();

        self.current_progress = match self.store.progress(word_id).await {
            Ok(progress) => progress,
            Err(e) => {
                log::warn!("failed to read progress for word {}: {}", word_id, e);
                None
            }
        };
        if kind == QuestionKind::Audio {
            self.speaker.speak(&headword);
        }
    }

    /// ヒントを表示する (上限を超えたら何もしない)
    pub fn request_hint(&mut self) {
        if self.feedback.is_some() || !self.state.can_use_hint() {
            return;
        }
        if let Some(hint) = self.current_question().map(Question::hint) {
            self.state.use_hint(hint);
        }
    }

    /// 回答を判定して状態・記録を更新する
    pub async fn submit_answer(&mut self, answer: &str) {
        if self.feedback.is_some() {
            return;
        }
        let Some(question) = self.current_question().cloned() else {
            return;
        };

        let is_correct = question.check_answer(answer);
        let now = Instant::now();
        self.state.answer_question(is_correct);
        self.effects.on_answer(is_correct, self.state.combo, now);

        // 記録に失敗してもラウンドは止めない
        match self.store.record_answer(question.word.id, is_correct).await {
            Ok(progress) => self.current_progress = Some(progress),
            Err(e) => {
                log::warn!("failed to update progress for word {}: {}", question.word.id, e)
            }
        }

        let correct_answer = match question.kind {
            QuestionKind::Spelling => question.word.headword.clone(),
            _ => question.correct_answer.clone(),
        };
        self.feedback = Some(Feedback {
            question,
            is_correct,
            correct_answer,
            until: now + FEEDBACK_DURATION,
        });
    }

    /// 時間経過の処理 (演出の期限切れ、判定表示の自動送り)
    pub async fn tick(&mut self, now: Instant) {
        self.effects.prune(now);
        if self.feedback.as_ref().is_some_and(|f| now >= f.until) {
            self.advance().await;
        }
    }

    /// 判定表示を閉じて次の問題へ (終わっていれば結果へ)
    async fn advance(&mut self) {
        self.feedback = None;
        self.input.clear();
        self.selected = 0;
        if self.state.is_over() {
            self.finish_round().await;
        } else {
            self.announce_question().await;
        }
    }

    async fn finish_round(&mut self) {
        let result = self.state.result();
        let previous = self.high_score;
        if let Err(e) = self.store.update_high_score(result.score).await {
            log::error!("failed to update high score: {}", e);
        }
        self.new_record = result.score > previous;
        if self.new_record {
            self.high_score = result.score;
            self.high_score_at = Some(Utc::now());
        }
        self.last_result = Some(result);
        self.screen = Screen::Result;
        log::info!(
            "round finished: score {} / rate {}% / grade {}",
            result.score,
            result.correct_rate,
            result.grade
        );
    }

    /// ホームに戻る (ラウンドの状態は捨てる)
    pub fn back_to_home(&mut self) {
        self.state = GameState::new(self.rules);
        self.questions.clear();
        self.current_progress = None;
        self.feedback = None;
        self.effects.clear();
        self.input.clear();
        self.screen = Screen::Home;
    }

    /// キー入力の処理
    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Home => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.start_round().await,
                KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            Screen::Result => match key.code {
                KeyCode::Enter | KeyCode::Char('r') => self.start_round().await,
                KeyCode::Esc | KeyCode::Char('h') => self.back_to_home(),
                _ => {}
            },
            Screen::Playing => self.handle_playing_key(key).await,
        }
    }

    async fn handle_playing_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.back_to_home();
            return;
        }
        // 判定表示中は何かキーを押せば次へ
        if self.feedback.is_some() {
            self.advance().await;
            return;
        }
        if key.code == KeyCode::Tab {
            self.request_hint();
            return;
        }

        let Some(question) = self.current_question() else {
            return;
        };
        let kind = question.kind;
        let option_count = question.options.as_ref().map_or(0, Vec::len);

        if kind == QuestionKind::Spelling {
            match key.code {
                KeyCode::Char(c) => self.input.push(c),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Enter if !self.input.trim().is_empty() => {
                    let answer = self.input.clone();
                    self.submit_answer(&answer).await;
                }
                _ => {}
            }
            return;
        }

        if option_count == 0 {
            return;
        }
        match key.code {
            KeyCode::Up | KeyCode::Left => {
                self.selected = (self.selected + option_count - 1) % option_count;
            }
            KeyCode::Down | KeyCode::Right => {
                self.selected = (self.selected + 1) % option_count;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < option_count {
                    self.selected = index;
                }
            }
            KeyCode::Char(c @ 'a'..='z') => {
                let index = c as usize - 'a' as usize;
                if index < option_count {
                    self.selected = index;
                }
            }
            KeyCode::Char(' ') if kind == QuestionKind::Audio => {
                if let Some(question) = self.current_question() {
                    let headword = question.word.headword.clone();
                    self.speaker.speak(&headword);
                }
            }
            KeyCode::Enter => {
                let answer = self
                    .current_question()
                    .and_then(|q| q.options.as_ref())
                    .and_then(|options| options.get(self.selected))
                    .cloned();
                if let Some(answer) = answer {
                    self.submit_answer(&answer).await;
                }
            }
            _ => {}
        }
    }
}
