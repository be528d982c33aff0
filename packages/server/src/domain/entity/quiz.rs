//! Quiz session state machine.
//!
//! ```text
//! Waiting ──start──▶ Playing ──advance past last──▶ Finished
//!                     │  ▲
//!                     └──┘ advance / dispatch
//! ```
//!
//! Progression is driven by timers owned by the use case layer, but the
//! session owns the single [`PendingAdvance`] slot. Scheduling a new wait
//! always cancels the previous one, and a timer may only act if its
//! [`AdvanceToken`] still matches the slot, so each question transitions
//! exactly once no matter which trigger wins.

use serde::{Deserialize, Serialize};
use tokio::task::AbortHandle;

use crate::domain::{error::DomainError, value_object::Timestamp};

use super::question::Question;

/// Lifecycle of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    Waiting,
    Playing,
    Finished,
}

/// Why a pending wait was scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceTrigger {
    /// Lead-in after `start`; dispatches the first question.
    LeadIn,
    /// Question time limit (plus buffer) ran out.
    QuestionTimeout,
    /// Everyone answered; grace delay before moving on.
    AllAnswered,
}

/// Identifies one scheduled wait. Stale tokens are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceToken {
    generation: u64,
}

/// The one outstanding wait of a session.
#[derive(Debug)]
pub struct PendingAdvance {
    token: AdvanceToken,
    trigger: AdvanceTrigger,
    abort: Option<AbortHandle>,
}

/// Outcome of [`QuizSession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to this question index; it still needs dispatching.
    Next(usize),
    /// No questions left; the session is now finished.
    Finished,
}

/// Snapshot of a freshly dispatched question.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchedQuestion {
    pub index: usize,
    pub total: usize,
    pub question: Question,
    pub started_at: Timestamp,
    pub expected_answerer_count: usize,
}

#[derive(Debug)]
pub struct QuizSession {
    status: QuizStatus,
    questions: Vec<Question>,
    current_index: Option<usize>,
    /// Index whose `question_started_at` has been stamped.
    dispatched_index: Option<usize>,
    question_started_at: Option<Timestamp>,
    answered_count: usize,
    expected_answerer_count: usize,
    pending: Option<PendingAdvance>,
    generation: u64,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            status: QuizStatus::Waiting,
            questions,
            current_index: None,
            dispatched_index: None,
            question_started_at: None,
            answered_count: 0,
            expected_answerer_count: 0,
            pending: None,
            generation: 0,
        }
    }

    pub fn status(&self) -> QuizStatus {
        self.status
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Current question index, `-1` before the quiz starts.
    pub fn current_index(&self) -> i64 {
        self.current_index.map_or(-1, |i| i as i64)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index.and_then(|i| self.questions.get(i))
    }

    pub fn question_started_at(&self) -> Option<Timestamp> {
        self.question_started_at
    }

    pub fn answered_count(&self) -> usize {
        self.answered_count
    }

    pub fn expected_answerer_count(&self) -> usize {
        self.expected_answerer_count
    }

    pub fn pending_trigger(&self) -> Option<AdvanceTrigger> {
        self.pending.as_ref().map(|p| p.trigger)
    }

    /// Whether the current question is live and accepting answers.
    pub fn is_accepting_answers(&self) -> bool {
        self.status == QuizStatus::Playing
            && self.current_index.is_some()
            && self.dispatched_index == self.current_index
    }

    /// Leave `Waiting`. `custom` replaces the question list when non-empty.
    ///
    /// Returns the number of questions in play.
    pub fn start(&mut self, custom: Option<Vec<Question>>) -> Result<usize, DomainError> {
        if self.status != QuizStatus::Waiting {
            return Err(DomainError::QuizAlreadyStarted);
        }
        if let Some(questions) = custom.filter(|q| !q.is_empty()) {
            self.questions = questions;
        }
        if self.questions.is_empty() {
            return Err(DomainError::InvalidQuestion(
                "no questions to play".to_string(),
            ));
        }

        self.status = QuizStatus::Playing;
        self.current_index = Some(0);
        Ok(self.questions.len())
    }

    /// Stamp the current question as started and snapshot the answerer count.
    ///
    /// A question is dispatched at most once.
    pub fn dispatch_current(
        &mut self,
        player_count: usize,
        now: Timestamp,
    ) -> Result<DispatchedQuestion, DomainError> {
        if self.status != QuizStatus::Playing {
            return Err(DomainError::QuizNotInProgress);
        }
        let index = self.current_index.ok_or(DomainError::QuizNotInProgress)?;
        if self.dispatched_index == Some(index) {
            return Err(DomainError::QuestionClosed {
                question_number: index + 1,
            });
        }
        let question = self
            .questions
            .get(index)
            .cloned()
            .ok_or(DomainError::QuizNotInProgress)?;

        self.dispatched_index = Some(index);
        self.question_started_at = Some(now);
        self.answered_count = 0;
        self.expected_answerer_count = player_count;

        Ok(DispatchedQuestion {
            index,
            total: self.questions.len(),
            question,
            started_at: now,
            expected_answerer_count: player_count,
        })
    }

    /// Move past the current question.
    pub fn advance(&mut self) -> Result<Advance, DomainError> {
        if self.status != QuizStatus::Playing {
            return Err(DomainError::QuizNotInProgress);
        }
        let next = self.current_index.map_or(0, |i| i + 1);
        if next >= self.questions.len() {
            self.finish();
            return Ok(Advance::Finished);
        }
        self.current_index = Some(next);
        self.question_started_at = None;
        self.answered_count = 0;
        Ok(Advance::Next(next))
    }

    /// Terminal transition. Cancels any pending wait.
    pub fn finish(&mut self) {
        self.cancel_pending();
        self.status = QuizStatus::Finished;
        self.question_started_at = None;
    }

    /// Count one accepted answer; `true` when every expected player has answered.
    pub(crate) fn register_answer(&mut self) -> bool {
        self.answered_count += 1;
        self.answered_count == self.expected_answerer_count
    }

    /// Open the pending slot for a new wait, cancelling whatever was there.
    pub fn schedule_advance(&mut self, trigger: AdvanceTrigger) -> AdvanceToken {
        self.cancel_pending();
        self.generation += 1;
        let token = AdvanceToken {
            generation: self.generation,
        };
        self.pending = Some(PendingAdvance {
            token,
            trigger,
            abort: None,
        });
        token
    }

    /// Attach the timer task backing `token`. A handle for a superseded
    /// token is aborted right away.
    pub fn attach_abort_handle(&mut self, token: AdvanceToken, handle: AbortHandle) {
        match self.pending.as_mut() {
            Some(pending) if pending.token == token => pending.abort = Some(handle),
            _ => handle.abort(),
        }
    }

    /// Consume the pending slot if `token` still owns it.
    ///
    /// Returns the trigger the timer was scheduled for, or `None` when the
    /// wait was superseded or cancelled.
    pub fn claim_pending(&mut self, token: AdvanceToken) -> Option<AdvanceTrigger> {
        if self.pending.as_ref().is_some_and(|p| p.token == token) {
            self.pending.take().map(|p| p.trigger)
        } else {
            None
        }
    }

    pub fn cancel_pending(&mut self) {
        if let Some(PendingAdvance {
            abort: Some(handle),
            ..
        }) = self.pending.take()
        {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::question::default_bank;

    fn session() -> QuizSession {
        QuizSession::new(default_bank())
    }

    #[test]
    fn test_new_session_is_waiting() {
        // テスト項目: 新しいセッションは waiting 状態で current_index は -1
        let s = session();

        assert_eq!(s.status(), QuizStatus::Waiting);
        assert_eq!(s.current_index(), -1);
        assert!(!s.is_accepting_answers());
    }

    #[test]
    fn test_start_moves_to_playing_without_opening_question() {
        // テスト項目: start で playing に遷移するが、dispatch までは回答を受け付けない
        // given (前提条件):
        let mut s = session();

        // when (操作):
        let total = s.start(None).unwrap();

        // then (期待する結果):
        assert_eq!(total, 8);
        assert_eq!(s.status(), QuizStatus::Playing);
        assert_eq!(s.current_index(), 0);
        assert!(!s.is_accepting_answers());
    }

    #[test]
    fn test_start_twice_is_conflict() {
        // テスト項目: 既に開始したクイズの再 start は拒否される
        let mut s = session();
        s.start(None).unwrap();

        assert_eq!(s.start(None), Err(DomainError::QuizAlreadyStarted));
    }

    #[test]
    fn test_dispatch_stamps_once() {
        // テスト項目: 同じ問題は一度しか dispatch できない
        // given (前提条件):
        let mut s = session();
        s.start(None).unwrap();

        // when (操作):
        let first = s.dispatch_current(3, Timestamp::new(5_000)).unwrap();
        let second = s.dispatch_current(3, Timestamp::new(6_000));

        // then (期待する結果):
        assert_eq!(first.index, 0);
        assert_eq!(first.expected_answerer_count, 3);
        assert_eq!(s.question_started_at(), Some(Timestamp::new(5_000)));
        assert!(matches!(second, Err(DomainError::QuestionClosed { .. })));
        assert!(s.is_accepting_answers());
    }

    #[test]
    fn test_advance_walks_to_finished() {
        // テスト項目: advance は index を1つずつ進め、最後を超えると finished になる
        // given (前提条件):
        let mut s = session();
        s.start(None).unwrap();

        // when (操作) / then (期待する結果):
        for expected in 1..8 {
            s.dispatch_current(1, Timestamp::new(0)).unwrap();
            assert_eq!(s.advance(), Ok(Advance::Next(expected)));
            assert!(!s.is_accepting_answers());
        }
        s.dispatch_current(1, Timestamp::new(0)).unwrap();
        assert_eq!(s.advance(), Ok(Advance::Finished));
        assert_eq!(s.status(), QuizStatus::Finished);
        assert_eq!(s.advance(), Err(DomainError::QuizNotInProgress));
    }

    #[test]
    fn test_register_answer_reports_all_answered_once() {
        // テスト項目: 回答数が期待数に達した瞬間だけ true を返す
        let mut s = session();
        s.start(None).unwrap();
        s.dispatch_current(2, Timestamp::new(0)).unwrap();

        assert!(!s.register_answer());
        assert!(s.register_answer());
        assert_eq!(s.answered_count(), 2);
    }

    #[test]
    fn test_newer_schedule_supersedes_older_token() {
        // テスト項目: 新しい待機を登録すると古いトークンは無効になる
        // given (前提条件):
        let mut s = session();
        let timeout = s.schedule_advance(AdvanceTrigger::QuestionTimeout);

        // when (操作):
        let grace = s.schedule_advance(AdvanceTrigger::AllAnswered);

        // then (期待する結果):
        assert_eq!(s.claim_pending(timeout), None);
        assert_eq!(s.claim_pending(grace), Some(AdvanceTrigger::AllAnswered));
        // 一度 claim したトークンは再利用できない
        assert_eq!(s.claim_pending(grace), None);
    }

    #[test]
    fn test_finish_cancels_pending() {
        // テスト項目: finish は保留中の待機をキャンセルする
        let mut s = session();
        s.start(None).unwrap();
        let token = s.schedule_advance(AdvanceTrigger::QuestionTimeout);

        s.finish();

        assert_eq!(s.pending_trigger(), None);
        assert_eq!(s.claim_pending(token), None);
    }

    #[tokio::test]
    async fn test_schedule_aborts_previous_task() {
        // テスト項目: 待機を差し替えると、前のタイマータスクが abort される
        // given (前提条件):
        let mut s = session();
        let token = s.schedule_advance(AdvanceTrigger::QuestionTimeout);
        let task = tokio::spawn(std::future::pending::<()>());
        s.attach_abort_handle(token, task.abort_handle());

        // when (操作):
        s.schedule_advance(AdvanceTrigger::AllAnswered);

        // then (期待する結果):
        let err = task.await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_stale_handle_is_aborted_on_attach() {
        // テスト項目: 既に無効なトークンに紐づくハンドルは即座に abort される
        let mut s = session();
        let stale = s.schedule_advance(AdvanceTrigger::QuestionTimeout);
        s.schedule_advance(AdvanceTrigger::AllAnswered);
        let task = tokio::spawn(std::future::pending::<()>());

        s.attach_abort_handle(stale, task.abort_handle());

        assert!(task.await.unwrap_err().is_cancelled());
    }
}
