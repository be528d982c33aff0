//! UseCase: 放置ルームの掃除

use std::{sync::Arc, time::Duration};

use quizroom_shared::time::Clock;

use crate::domain::{RoomCode, RoomRepository, Timestamp};

pub struct SweepIdleRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
    idle_threshold: Duration,
}

impl SweepIdleRoomsUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        clock: Arc<dyn Clock>,
        idle_threshold: Duration,
    ) -> Self {
        Self {
            repository,
            clock,
            idle_threshold,
        }
    }

    /// 接続中のプレイヤーがいないまま閾値を超えたルームを削除する
    pub async fn execute(&self) -> Vec<RoomCode> {
        let now = Timestamp::new(self.clock.now_millis());
        let threshold = i64::try_from(self.idle_threshold.as_millis()).unwrap_or(i64::MAX);
        let evicted = self.repository.evict_idle(now, threshold).await;
        if evicted.is_empty() {
            tracing::debug!("Idle sweep: nothing to evict");
        } else {
            tracing::info!(
                "Idle sweep evicted {} room(s), {} remaining",
                evicted.len(),
                self.repository.count_rooms().await
            );
        }
        evicted
    }
}
