// ============================================
// src/ui.rs
// UI描画
// ============================================

use std::time::Instant;

use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use crate::app::{App, Screen};
use crate::game::Grade;
use crate::questions::{Question, QuestionKind};

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();
    // 枠線を描画
    let block = Block::default().borders(Borders::ALL).title("Fun Words !");
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    match app.screen {
        Screen::Home => draw_home(f, app, inner_area),
        Screen::Playing => draw_playing(f, app, inner_area),
        Screen::Result => draw_result(f, app, inner_area),
    }
}

// --------------------------------------------------
// ホーム
// --------------------------------------------------

fn draw_home(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // [0] 空白
            Constraint::Length(2), // [1] タイトル
            Constraint::Length(1), // [2] ハイスコア
            Constraint::Length(1), // [3] 単語数
            Constraint::Length(2), // [4] お知らせ
            Constraint::Min(1),    // [5] 操作説明
        ])
        .split(area);

    f.render_widget(
        Paragraph::new("FUN WORDS")
            .style(Style::default().fg(Color::Magenta).bold())
            .centered(),
        chunks[1],
    );
    let high_score = match app.high_score_at {
        Some(at) => format!("HIGH SCORE: {} ({})", app.high_score, at.format("%Y-%m-%d")),
        None => format!("HIGH SCORE: {}", app.high_score),
    };
    f.render_widget(
        Paragraph::new(high_score)
            .style(Style::default().fg(Color::Yellow))
            .centered(),
        chunks[2],
    );

    let storage = if app.is_persistent() { "" } else { " (not saved)" };
    f.render_widget(
        Paragraph::new(format!("{} words{}", app.word_count(), storage))
            .style(Style::default().fg(Color::Gray))
            .centered(),
        chunks[3],
    );

    if let Some(notice) = &app.notice {
        f.render_widget(
            Paragraph::new(notice.as_str())
                .style(Style::default().fg(Color::Red))
                .centered(),
            chunks[4],
        );
    }

    f.render_widget(
        Paragraph::new("[Enter] Start   [Esc] Quit")
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
        chunks[5],
    );
}

// --------------------------------------------------
// 出題中
// --------------------------------------------------

fn draw_playing(f: &mut Frame, app: &App, area: Rect) {
    // 判定表示中は回答した問題を出したままにする
    let Some(question) = app
        .feedback
        .as_ref()
        .map(|f| &f.question)
        .or_else(|| app.current_question())
    else {
        return;
    };
    let state = &app.state;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] ステータスバー (ライフ, スコア, コンボ)
            Constraint::Length(1), // [1] 進行ゲージ
            Constraint::Length(1), // [2] 空白
            Constraint::Length(1), // [3] 問題の種類
            Constraint::Length(3), // [4] 問題文
            Constraint::Length(5), // [5] 選択肢 / 入力欄
            Constraint::Length(1), // [6] ヒント
            Constraint::Length(2), // [7] 判定・演出
            Constraint::Min(1),    // [8] 操作説明
        ])
        .split(area);

    // 0. ステータスバー
    let hearts: String = (0..state.max_lives)
        .map(|i| if i < state.lives { '♥' } else { '♡' })
        .collect();
    let mut status = vec![
        Span::styled(hearts, Style::default().fg(Color::Red)),
        Span::raw("   "),
        Span::styled(
            format!("SCORE: {}", state.score),
            Style::default().fg(Color::White).bold(),
        ),
    ];
    if state.combo > 0 {
        status.push(Span::raw("   "));
        status.push(Span::styled(
            format!("COMBO x{}", state.combo),
            Style::default().fg(Color::Magenta).bold(),
        ));
    }
    if let Some(progress) = &app.current_progress {
        status.push(Span::raw("   "));
        status.push(Span::styled(
            format!("this word: ○{} ×{}", progress.correct, progress.wrong),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(status)), chunks[0]);

    // 1. 進行ゲージ
    let number = if app.feedback.is_some() {
        state.current_question
    } else {
        state.current_question + 1
    }
    .min(state.total_questions);
    let ratio = if state.total_questions > 0 {
        (number as f64 / state.total_questions as f64).min(1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .ratio(ratio)
        .label(format!("{} / {}", number, state.total_questions));
    f.render_widget(gauge, chunks[1]);

    // 3. 問題の種類
    f.render_widget(
        Paragraph::new(question.kind.label())
            .style(Style::default().fg(Color::Gray))
            .centered(),
        chunks[3],
    );

    // 4. 問題文
    f.render_widget(
        prompt(question, app.speech_enabled())
            .centered()
            .wrap(Wrap { trim: true }),
        chunks[4],
    );

    // 5. 選択肢 / 入力欄
    match &question.options {
        Some(options) => {
            let lines: Vec<Line> = options
                .iter()
                .enumerate()
                .map(|(i, option)| {
                    let text = format!("{}. {}", i + 1, option);
                    if i == app.selected {
                        Line::from(Span::styled(
                            format!("> {}", text),
                            Style::default().fg(Color::Black).bg(Color::White),
                        ))
                    } else {
                        Line::from(Span::styled(
                            format!("  {}", text),
                            Style::default().fg(Color::Gray),
                        ))
                    }
                })
                .collect();
            f.render_widget(Paragraph::new(lines), chunks[5]);
        }
        None => {
            let input = Paragraph::new(Line::from(vec![
                Span::styled(app.input.as_str(), Style::default().fg(Color::Green)),
                Span::styled(" ", Style::default().bg(Color::White)), // カーソル
            ]))
            .centered()
            .block(Block::default().borders(Borders::ALL).title("type the word"));
            f.render_widget(input, chunks[5]);
        }
    }

    // 6. ヒント
    if let Some(hint) = &state.current_hint {
        f.render_widget(
            Paragraph::new(hint.as_str())
                .style(Style::default().fg(Color::Cyan))
                .centered(),
            chunks[6],
        );
    }

    // 7. 判定・演出
    let mut lines = Vec::new();
    if let Some(feedback) = &app.feedback {
        let headword = &feedback.question.word.headword;
        let line = if feedback.is_correct {
            Line::from(format!("Correct! {}", headword))
                .style(Style::default().fg(Color::Green).bold())
        } else {
            Line::from(format!("Miss! {}: {}", headword, feedback.correct_answer))
                .style(Style::default().fg(Color::Red).bold())
        };
        lines.push(line);
    }
    let banners: Vec<String> = app
        .effects
        .visible(Instant::now())
        .map(|kind| kind.text())
        .collect();
    if !banners.is_empty() {
        lines.push(Line::from(banners.join("  ")).style(Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(lines).centered(), chunks[7]);

    // 8. 操作説明
    let hint_label = if state.can_use_hint() {
        format!("[Tab] Hint ({} left)", state.max_hints - state.hints_used)
    } else {
        "[Tab] Hint (used up)".to_string()
    };
    let keys = match question.kind {
        QuestionKind::Spelling => "[Enter] Answer",
        QuestionKind::Choice => "[1-4] Select  [Enter] Answer",
        QuestionKind::Audio => "[1-4] Select  [Space] Replay  [Enter] Answer",
    };
    f.render_widget(
        Paragraph::new(vec![
            Line::from(keys),
            Line::from(format!("{}   [Esc] Home", hint_label)),
        ])
        .style(Style::default().fg(Color::DarkGray))
        .centered(),
        chunks[8],
    );
}

/// 問題文 (種類ごとに見せるものが違う)
fn prompt(question: &Question, speech_enabled: bool) -> Paragraph<'_> {
    let word = &question.word;
    match question.kind {
        QuestionKind::Choice => Paragraph::new(Line::from(word.headword.as_str()))
            .style(Style::default().fg(Color::White).bold()),
        QuestionKind::Spelling => {
            let mut lines = vec![Line::from(word.meaning.as_str()).bold()];
            if let Some(example) = &word.example {
                // 例文の中の答えは伏せる
                let masked = example.replace(word.headword.as_str(), "____");
                lines.push(Line::from(masked).style(Style::default().fg(Color::Gray).italic()));
            }
            Paragraph::new(lines)
        }
        QuestionKind::Audio if speech_enabled => Paragraph::new(Line::from("♪ listen ♪"))
            .style(Style::default().fg(Color::White).bold()),
        // 読み上げできないときはヒント頼み
        QuestionKind::Audio => Paragraph::new(vec![
            Line::from("♪ (speech is off) ♪").bold(),
            Line::from("press [Tab] for a hint").style(Style::default().fg(Color::Gray)),
        ]),
    }
}

// --------------------------------------------------
// 結果
// --------------------------------------------------

fn draw_result(f: &mut Frame, app: &App, area: Rect) {
    let Some(result) = app.last_result else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] 空白
            Constraint::Length(1), // [1] 見出し
            Constraint::Length(2), // [2] 評価
            Constraint::Length(1), // [3] ひとこと
            Constraint::Length(1), // [4] 空白
            Constraint::Length(3), // [5] スコア・正答率・最大コンボ
            Constraint::Length(1), // [6] ハイスコア
            Constraint::Min(1),    // [7] 操作説明
        ])
        .split(area);

    f.render_widget(Paragraph::new("GAME OVER").bold().centered(), chunks[1]);

    let grade_color = match result.grade {
        Grade::S => Color::Yellow,
        Grade::A => Color::Gray,
        Grade::B => Color::LightRed,
        Grade::C => Color::Blue,
    };
    f.render_widget(
        Paragraph::new(format!("GRADE {}", result.grade))
            .style(Style::default().fg(grade_color).bold())
            .centered(),
        chunks[2],
    );
    f.render_widget(
        Paragraph::new(result.grade.message())
            .style(Style::default().fg(Color::Gray))
            .centered(),
        chunks[3],
    );

    f.render_widget(
        Paragraph::new(vec![
            Line::from(format!("Score: {}", result.score)),
            Line::from(format!("Correct: {}%", result.correct_rate)),
            Line::from(format!("Max combo: {}", result.max_combo)),
        ])
        .style(Style::default().fg(Color::Yellow))
        .centered(),
        chunks[5],
    );

    let record = if app.new_record {
        Line::from(format!("NEW HIGH SCORE! {}", app.high_score))
            .style(Style::default().fg(Color::Magenta).bold())
    } else {
        Line::from(format!("High score: {}", app.high_score))
            .style(Style::default().fg(Color::Gray))
    };
    f.render_widget(Paragraph::new(record).centered(), chunks[6]);

    f.render_widget(
        Paragraph::new("[Enter] Play again   [Esc] Home")
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
        chunks[7],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::Speaker;
    use crate::store::Store;
    use crate::words::seed_words;
    use ratatui::backend::TestBackend;

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    async fn app() -> App {
        let mut store = Store::in_memory();
        let words = seed_words().unwrap();
        store.put_words(&words).await.unwrap();
        App::new(store, words, Some(5), Speaker::new(false))
    }

    #[tokio::test]
    async fn home_shows_high_score() {
        let mut app = app().await;
        app.high_score = 42;
        let text = screen_text(&app);
        assert!(text.contains("HIGH SCORE: 42"));
        assert!(text.contains("[Enter] Start"));
    }

    #[tokio::test]
    async fn playing_shows_score_and_progress() {
        let mut app = app().await;
        app.start_round().await;
        let text = screen_text(&app);
        assert!(text.contains("SCORE: 0"));
        assert!(text.contains("1 / 10"));
        assert!(text.contains("Hint (2 left)"));
    }

    #[tokio::test]
    async fn feedback_keeps_the_answered_word_on_screen() {
        let mut app = app().await;
        app.start_round().await;
        let question = app.current_question().unwrap().clone();
        app.submit_answer(&question.correct_answer).await;

        let text = screen_text(&app);
        assert!(text.contains(&format!("Correct! {}", question.word.headword)));
        assert!(text.contains("1 / 10"));
    }

    #[tokio::test]
    async fn feedback_for_the_last_question_is_drawn() {
        let mut app = app().await;
        app.start_round().await;
        for _ in 0..9 {
            let answer = app.current_question().unwrap().correct_answer.clone();
            app.submit_answer(&answer).await;
            app.handle_key(crossterm::event::KeyEvent::new(
                crossterm::event::KeyCode::Char('x'),
                crossterm::event::KeyModifiers::NONE,
            ))
            .await;
        }
        let last = app.current_question().unwrap().clone();
        app.submit_answer(&last.correct_answer).await;

        assert_eq!(app.screen, Screen::Playing);
        let text = screen_text(&app);
        assert!(text.contains(&format!("Correct! {}", last.word.headword)));
        assert!(text.contains("10 / 10"));
    }

    #[tokio::test]
    async fn missed_answer_shows_the_word_and_the_answer() {
        let mut app = app().await;
        app.start_round().await;
        let question = app.current_question().unwrap().clone();
        app.submit_answer("???").await;

        let text = screen_text(&app);
        assert!(text.contains(&format!("Miss! {}", question.word.headword)));
        assert!(text.contains("♥♥♡"));
    }

    #[tokio::test]
    async fn hearts_follow_the_round_rules() {
        let mut app = app().await;
        app.start_round().await;
        app.state = crate::game::GameState::new(crate::game::GameRules {
            total_questions: 10,
            lives: 5,
            max_hints: 2,
        });
        assert!(screen_text(&app).contains("♥♥♥♥♥"));

        app.submit_answer("???").await;
        assert!(screen_text(&app).contains("♥♥♥♥♡"));
    }

    #[tokio::test]
    async fn result_shows_grade() {
        let mut app = app().await;
        app.start_round().await;
        for _ in 0..3 {
            app.submit_answer("???").await;
            app.handle_key(crossterm::event::KeyEvent::new(
                crossterm::event::KeyCode::Char('x'),
                crossterm::event::KeyModifiers::NONE,
            ))
            .await;
        }
        let text = screen_text(&app);
        assert!(text.contains("GRADE C"));
        assert!(text.contains("Score: 0"));
    }
}
