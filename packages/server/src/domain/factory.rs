//! Identifier factories.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use quizroom_shared::time::Clock;
use rand::Rng;

use super::value_object::{ConnectionId, ROOM_CODE_ALPHABET, ROOM_CODE_LENGTH, RoomCode};

/// Source of candidate room codes.
///
/// Candidates may collide with live rooms; the room store checks and retries.
pub trait RoomCodeGenerator: Send + Sync {
    fn generate(&self) -> RoomCode;
}

/// Uniformly random codes over [`ROOM_CODE_ALPHABET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRoomCodeGenerator;

impl RoomCodeGenerator for RandomRoomCodeGenerator {
    fn generate(&self) -> RoomCode {
        let mut rng = rand::thread_rng();
        let code: String = (0..ROOM_CODE_LENGTH)
            .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        RoomCode::from_generated(code)
    }
}

/// Mints connection identities as `client_<counter>_<millis>`.
///
/// The counter is process-wide and monotonic, so identities never repeat
/// within the process lifetime.
pub struct ConnectionIdFactory {
    counter: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl ConnectionIdFactory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            counter: AtomicU64::new(0),
            clock,
        }
    }

    pub fn mint(&self) -> ConnectionId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        ConnectionId::new(format!("client_{}_{}", n, self.clock.now_millis()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use quizroom_shared::time::FixedClock;

    use super::*;

    #[test]
    fn test_random_codes_are_well_formed() {
        // テスト項目: 生成されるルームコードは 6 文字の英数字大文字
        let generator = RandomRoomCodeGenerator;

        for _ in 0..200 {
            let code = generator.generate();
            assert_eq!(code.as_str().len(), ROOM_CODE_LENGTH);
            assert!(
                code.as_str()
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_minted_identities_are_unique_even_with_frozen_clock() {
        // テスト項目: 時刻が同じでもカウンタにより identity は重複しない
        // given (前提条件):
        let factory = ConnectionIdFactory::new(Arc::new(FixedClock::new(1_700_000_000_000)));

        // when (操作):
        let ids: HashSet<String> = (0..1000).map(|_| factory.mint().into_string()).collect();

        // then (期待する結果):
        assert_eq!(ids.len(), 1000);
        assert!(ids.contains("client_1_1700000000000"));
    }
}
