//! Question entity and the built-in question bank.

use serde::Serialize;

use crate::domain::error::DomainError;

/// Every question has exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// Lower bound for a question's time limit (seconds).
pub const MIN_TIME_LIMIT_SECONDS: u32 = 10;

/// Upper bound for a question's time limit (seconds).
pub const MAX_TIME_LIMIT_SECONDS: u32 = 300;

/// Unvalidated question as received from a client or the bulk import surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: i64,
    pub time_limit_seconds: i64,
}

/// A validated multiple-choice question. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    text: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
    time_limit_seconds: u32,
}

impl Question {
    /// Validate a draft into a question.
    pub fn new(draft: QuestionDraft) -> Result<Self, DomainError> {
        let text = draft.text.trim();
        if text.is_empty() {
            return Err(DomainError::InvalidQuestion(
                "question text must not be empty".to_string(),
            ));
        }

        let options: [String; OPTION_COUNT] = draft.options.try_into().map_err(|o: Vec<String>| {
            DomainError::InvalidQuestion(format!(
                "expected {} options, got {}",
                OPTION_COUNT,
                o.len()
            ))
        })?;

        if !(0..OPTION_COUNT as i64).contains(&draft.correct_index) {
            return Err(DomainError::InvalidQuestion(format!(
                "correct index {} is outside 0..={}",
                draft.correct_index,
                OPTION_COUNT - 1
            )));
        }

        let limits = MIN_TIME_LIMIT_SECONDS as i64..=MAX_TIME_LIMIT_SECONDS as i64;
        if !limits.contains(&draft.time_limit_seconds) {
            return Err(DomainError::InvalidQuestion(format!(
                "time limit {}s is outside {}..={}s",
                draft.time_limit_seconds, MIN_TIME_LIMIT_SECONDS, MAX_TIME_LIMIT_SECONDS
            )));
        }

        Ok(Self {
            text: text.to_string(),
            options,
            correct_index: draft.correct_index as usize,
            time_limit_seconds: draft.time_limit_seconds as u32,
        })
    }

    /// Validate a whole batch. One bad question rejects the batch.
    ///
    /// The error carries the 1-based position of the first invalid question.
    pub fn batch(drafts: Vec<QuestionDraft>) -> Result<Vec<Self>, DomainError> {
        drafts
            .into_iter()
            .enumerate()
            .map(|(i, draft)| {
                Self::new(draft).map_err(|e| DomainError::InvalidQuestionBatch {
                    number: i + 1,
                    reason: match e {
                        DomainError::InvalidQuestion(reason) => reason,
                        other => other.to_string(),
                    },
                })
            })
            .collect()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn correct_text(&self) -> &str {
        &self.options[self.correct_index]
    }

    pub fn time_limit_seconds(&self) -> u32 {
        self.time_limit_seconds
    }
}

fn bank_entry(text: &str, options: [&str; OPTION_COUNT], correct: usize, limit: u32) -> Question {
    Question {
        text: text.to_string(),
        options: options.map(str::to_string),
        correct_index: correct,
        time_limit_seconds: limit,
    }
}

/// Built-in question bank used when the host starts without custom questions.
pub fn default_bank() -> Vec<Question> {
    vec![
        bank_entry("What is 5 + 3?", ["6", "7", "8", "9"], 2, 15),
        bank_entry(
            "What is the capital of Indonesia?",
            ["Bandung", "Jakarta", "Surabaya", "Medan"],
            1,
            15,
        ),
        bank_entry(
            "Which planet is closest to the sun?",
            ["Venus", "Mercury", "Earth", "Mars"],
            1,
            15,
        ),
        bank_entry(
            "How many days are there in a leap year?",
            ["364", "365", "366", "367"],
            2,
            15,
        ),
        bank_entry("2 x 8 = ?", ["14", "16", "18", "20"], 1, 10),
        bank_entry(
            "Which language runs in the browser frontend?",
            ["Python", "JavaScript", "Java", "C++"],
            1,
            12,
        ),
        bank_entry(
            "What does HTTP stand for?",
            [
                "HyperText Transfer Protocol",
                "High Transfer Text Protocol",
                "HyperText Transport Protocol",
                "High Text Transfer Protocol",
            ],
            0,
            15,
        ),
        bank_entry("What is 12 x 12?", ["124", "144", "154", "164"], 1, 10),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(text: &str, options: usize, correct: i64, limit: i64) -> QuestionDraft {
        QuestionDraft {
            text: text.to_string(),
            options: (0..options).map(|i| format!("opt{i}")).collect(),
            correct_index: correct,
            time_limit_seconds: limit,
        }
    }

    #[test]
    fn test_valid_draft_becomes_question() {
        // テスト項目: 正しいドラフトは Question に変換される
        // given (前提条件):
        let d = draft("  Capital of France?  ", 4, 3, 20);

        // when (操作):
        let q = Question::new(d).unwrap();

        // then (期待する結果):
        assert_eq!(q.text(), "Capital of France?");
        assert_eq!(q.correct_index(), 3);
        assert_eq!(q.correct_text(), "opt3");
        assert_eq!(q.time_limit_seconds(), 20);
    }

    #[test]
    fn test_invalid_drafts_are_rejected() {
        // テスト項目: 各フィールドの境界外の値は拒否される
        assert!(Question::new(draft("", 4, 0, 15)).is_err());
        assert!(Question::new(draft("q", 3, 0, 15)).is_err());
        assert!(Question::new(draft("q", 5, 0, 15)).is_err());
        assert!(Question::new(draft("q", 4, 4, 15)).is_err());
        assert!(Question::new(draft("q", 4, -1, 15)).is_err());
        assert!(Question::new(draft("q", 4, 0, 9)).is_err());
        assert!(Question::new(draft("q", 4, 0, 301)).is_err());

        // 境界値は受け入れられる
        assert!(Question::new(draft("q", 4, 0, 10)).is_ok());
        assert!(Question::new(draft("q", 4, 3, 300)).is_ok());
    }

    #[test]
    fn test_batch_rejects_whole_batch_on_single_error() {
        // テスト項目: 1問でも不正ならバッチ全体が拒否され、位置が報告される
        // given (前提条件):
        let drafts = vec![draft("ok", 4, 0, 15), draft("bad", 4, 7, 15)];

        // when (操作):
        let result = Question::batch(drafts);

        // then (期待する結果):
        match result {
            Err(DomainError::InvalidQuestionBatch { number, .. }) => assert_eq!(number, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_default_bank_is_valid() {
        // テスト項目: 組み込みの問題バンクは 8 問で、全て検証ルールを満たす
        let bank = default_bank();

        assert_eq!(bank.len(), 8);
        assert_eq!(bank[0].time_limit_seconds(), 15);
        for q in &bank {
            let redraft = QuestionDraft {
                text: q.text().to_string(),
                options: q.options().to_vec(),
                correct_index: q.correct_index() as i64,
                time_limit_seconds: q.time_limit_seconds() as i64,
            };
            assert_eq!(Question::new(redraft).as_ref(), Ok(q));
        }
    }
}
