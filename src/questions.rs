/*
 * src/questions.rs
 * 出題 (問題の生成・ヒント・正誤判定) を管理するモジュール
 */

use std::collections::HashSet;

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::error::AppError;
use crate::words::Word;

/// 意味の区切り文字 ("川、河川" の "、")
pub const MEANING_DELIMITER: char = '、';
/// スペルヒントで伏せる文字
const MASK_CHAR: char = '_';
/// 選択肢のうちダミーの数
const DISTRACTOR_COUNT: usize = 3;

/// 問題の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// 英単語を見て意味を選ぶ
    Choice,
    /// 意味を見て英単語をタイプする
    Spelling,
    /// 発音を聞いて英単語を選ぶ
    Audio,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 3] = [Self::Choice, Self::Spelling, Self::Audio];

    pub fn label(self) -> &'static str {
        match self {
            Self::Choice => "Pick the meaning",
            Self::Spelling => "Spell the word",
            Self::Audio => "Listen and pick the word",
        }
    }
}

/// 1 問分のデータ。ラウンドごとに作り直す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub kind: QuestionKind,
    pub word: Word,
    /// 4 択の選択肢 (Spelling では None)
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
}

impl Question {
    /// ヒント文字列を返す。同じ問題なら何度呼んでも同じ結果
    pub fn hint(&self) -> String {
        let headword = &self.word.headword;
        match self.kind {
            QuestionKind::Choice => {
                let first: String = headword
                    .chars()
                    .next()
                    .map(|c| c.to_uppercase().collect())
                    .unwrap_or_default();
                format!("Hint: the word starts with \"{}\"", first)
            }
            QuestionKind::Spelling => {
                let len = headword.chars().count();
                // ⌈len/3⌉ 文字 (最低 2 文字) を見せる
                let reveal = len.div_ceil(3).max(2).min(len);
                let shown: String = headword.chars().take(reveal).collect();
                let masked: String = std::iter::repeat_n(MASK_CHAR, len - reveal).collect();
                format!("Hint: {}{}", shown, masked)
            }
            QuestionKind::Audio => {
                let first_meaning = self
                    .word
                    .meaning
                    .split(MEANING_DELIMITER)
                    .next()
                    .unwrap_or_default();
                format!("Hint: it means \"{}\"", first_meaning)
            }
        }
    }

    /// 大文字小文字と前後の空白を無視して完全一致を判定する
    pub fn check_answer(&self, answer: &str) -> bool {
        answer.trim().to_lowercase() == self.correct_answer.trim().to_lowercase()
    }
}

/// 単語リストから問題を作る
pub struct QuestionGenerator {
    words: Vec<Word>,
    rng: StdRng,
}

impl QuestionGenerator {
    /// 単語が 1 つもなければ生成器は作れない
    pub fn new(words: Vec<Word>, rng: StdRng) -> Result<Self, AppError> {
        if words.is_empty() {
            return Err(AppError::EmptyWordBank);
        }
        Ok(Self { words, rng })
    }

    /// `count` 問を生成する
    ///
    /// 単語はプールを使い切るまで重複しないように選ぶ。
    /// 使い切った後は重複を許す (ベストエフォート)。
    pub fn generate_questions(&mut self, count: usize) -> Vec<Question> {
        // id が重複していても無限ループしないよう、異なる id の数で判定する
        let pool_size = self.words.iter().map(|w| w.id).collect::<HashSet<_>>().len();
        let mut used = HashSet::new();
        let mut questions = Vec::with_capacity(count);

        for _ in 0..count {
            let kind = QuestionKind::ALL[self.rng.random_range(0..QuestionKind::ALL.len())];
            let word = loop {
                let candidate = &self.words[self.rng.random_range(0..self.words.len())];
                if !used.contains(&candidate.id) || used.len() >= pool_size {
                    break candidate.clone();
                }
            };
            used.insert(word.id);
            questions.push(self.create_question(kind, word));
        }

        questions
    }

    fn create_question(&mut self, kind: QuestionKind, word: Word) -> Question {
        match kind {
            QuestionKind::Choice => {
                let options = self.shuffled_options(&word, |w| &w.meaning);
                Question {
                    kind,
                    correct_answer: word.meaning.clone(),
                    options: Some(options),
                    word,
                }
            }
            QuestionKind::Spelling => Question {
                kind,
                correct_answer: word.headword.to_lowercase(),
                options: None,
                word,
            },
            QuestionKind::Audio => {
                let options = self.shuffled_options(&word, |w| &w.headword);
                Question {
                    kind,
                    correct_answer: word.headword.clone(),
                    options: Some(options),
                    word,
                }
            }
        }
    }

    /// ダミー 3 つ + 正解 1 つを Fisher-Yates でシャッフルした選択肢
    fn shuffled_options(&mut self, word: &Word, field: fn(&Word) -> &String) -> Vec<String> {
        let others: Vec<&Word> = self.words.iter().filter(|w| w.id != word.id).collect();
        let mut options: Vec<String> = others
            .choose_multiple(&mut self.rng, DISTRACTOR_COUNT)
            .map(|w| field(w).clone())
            .collect();
        options.push(field(word).clone());
        options.shuffle(&mut self.rng);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn word(id: u32, headword: &str, meaning: &str) -> Word {
        Word {
            id,
            headword: headword.to_string(),
            meaning: meaning.to_string(),
            example: None,
            audio_key: None,
        }
    }

    fn sample_words() -> Vec<Word> {
        vec![
            word(1, "Apple", "りんご"),
            word(2, "river", "川、河川"),
            word(3, "library", "図書館、蔵書"),
            word(4, "airport", "空港"),
            word(5, "borrow", "借りる"),
            word(6, "journey", "旅、旅行"),
            word(7, "quiet", "静かな"),
            word(8, "promise", "約束"),
            word(9, "weather", "天気"),
            word(10, "zoo", "動物園"),
        ]
    }

    fn generator(seed: u64) -> QuestionGenerator {
        QuestionGenerator::new(sample_words(), StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn empty_word_bank_is_rejected() {
        let result = QuestionGenerator::new(Vec::new(), StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(AppError::EmptyWordBank)));
    }

    #[test]
    fn generates_requested_count_with_matching_answers() {
        for seed in 0..20 {
            let questions = generator(seed).generate_questions(10);
            assert_eq!(questions.len(), 10);

            for q in &questions {
                let expected = match q.kind {
                    QuestionKind::Choice => q.word.meaning.clone(),
                    QuestionKind::Spelling => q.word.headword.to_lowercase(),
                    QuestionKind::Audio => q.word.headword.clone(),
                };
                assert_eq!(q.correct_answer, expected);
            }
        }
    }

    #[test]
    fn options_hold_three_distinct_distractors_and_the_answer() {
        for seed in 0..20 {
            for q in generator(seed).generate_questions(10) {
                match (&q.kind, &q.options) {
                    (QuestionKind::Spelling, options) => assert!(options.is_none()),
                    (_, Some(options)) => {
                        assert_eq!(options.len(), 4);
                        assert_eq!(options.iter().filter(|o| **o == q.correct_answer).count(), 1);
                        let unique: HashSet<&String> = options.iter().collect();
                        assert_eq!(unique.len(), 4);
                    }
                    (_, None) => panic!("choice/audio question without options"),
                }
            }
        }
    }

    #[test]
    fn no_repeats_until_pool_is_exhausted() {
        let questions = generator(42).generate_questions(10);
        let ids: HashSet<u32> = questions.iter().map(|q| q.word.id).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn repeats_are_allowed_once_pool_is_exhausted() {
        let mut generator =
            QuestionGenerator::new(sample_words()[..3].to_vec(), StdRng::seed_from_u64(1)).unwrap();
        let questions = generator.generate_questions(10);
        assert_eq!(questions.len(), 10);

        let first_three: HashSet<u32> = questions[..3].iter().map(|q| q.word.id).collect();
        assert_eq!(first_three.len(), 3);
    }

    #[test]
    fn duplicated_ids_do_not_hang() {
        let words = vec![word(1, "cat", "猫"), word(1, "cat", "猫")];
        let mut generator = QuestionGenerator::new(words, StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(generator.generate_questions(5).len(), 5);
    }

    #[test]
    fn small_pool_gives_fewer_options() {
        let mut generator =
            QuestionGenerator::new(vec![word(1, "cat", "猫")], StdRng::seed_from_u64(0)).unwrap();
        let q = generator.create_question(QuestionKind::Choice, word(1, "cat", "猫"));
        assert_eq!(q.options, Some(vec!["猫".to_string()]));
    }

    #[test]
    fn same_seed_gives_same_questions() {
        assert_eq!(
            generator(7).generate_questions(10),
            generator(7).generate_questions(10)
        );
    }

    #[test]
    fn hints_per_kind() {
        let mut generator = generator(0);
        let choice = generator.create_question(QuestionKind::Choice, word(1, "apple", "りんご"));
        assert_eq!(choice.hint(), "Hint: the word starts with \"A\"");

        let spelling = generator.create_question(QuestionKind::Spelling, word(1, "apple", "りんご"));
        assert_eq!(spelling.hint(), "Hint: ap___");

        let long = generator.create_question(QuestionKind::Spelling, word(2, "different", "違った"));
        assert_eq!(long.hint(), "Hint: dif______");

        let short = generator.create_question(QuestionKind::Spelling, word(3, "zoo", "動物園"));
        assert_eq!(short.hint(), "Hint: zo_");

        let audio = generator.create_question(QuestionKind::Audio, word(4, "river", "川、河川"));
        assert_eq!(audio.hint(), "Hint: it means \"川\"");
        assert_eq!(audio.hint(), audio.hint());
    }

    #[test]
    fn answers_ignore_case_and_whitespace() {
        let mut generator = generator(0);
        let q = generator.create_question(QuestionKind::Spelling, word(1, "Apple", "りんご"));
        assert_eq!(q.correct_answer, "apple");
        assert!(q.check_answer(" Apple "));
        assert_eq!(q.check_answer(" Apple "), q.check_answer("apple"));
        assert!(!q.check_answer("appl"));

        let audio = generator.create_question(QuestionKind::Audio, word(1, "Apple", "りんご"));
        assert!(audio.check_answer("APPLE"));
    }
}
