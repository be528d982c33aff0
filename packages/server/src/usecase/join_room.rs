//! UseCase: ルーム参加とルーム情報の取得
//!
//! `join-room` は新規参加または切断後の再参加。`get-room-data` はページの再読み込みなど
//! で新しい接続が同じ表示名を名乗り直すケースを想定し、接続中の名前の付け替えも許可する。
//!
//! ## テスト作業記録
//!
//! ### 何をテストしているか
//! - 新規参加で room-joined と player-joined が届く
//! - 存在しないルーム、使用中の表示名、クイズ進行中の新規参加は拒否される
//! - 再参加では古い接続のバインディングが外れる
//! - get-room-data は名前を付け替え、新規参加のときだけ player-joined を配信する
//! - 別ルームへ移動すると前のルームではオフラインになる
//! - 移動後は前のルームのイベントが届かず、名前を付け替えてもイベントは重複しない

use std::sync::Arc;

use quizroom_shared::time::Clock;

use crate::{
    domain::{
        Admission, AdmissionPolicy, Binding, ConnectionId, ConnectionRegistry, DisplayName, Room,
        RoomCode, RoomRepository, SharedRoom, Timestamp,
    },
    infrastructure::dto::websocket::ServerMessage,
};

use super::{broadcast::Broadcaster, error::SessionError};

pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
    max_players: usize,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
        max_players: usize,
    ) -> Self {
        Self {
            repository,
            registry,
            broadcaster,
            clock,
            max_players,
        }
    }

    /// ルームに参加する（切断済みプレイヤーの再参加を含む）
    pub async fn join(
        &self,
        identity: &ConnectionId,
        room_code: &RoomCode,
        display_name: DisplayName,
    ) -> Result<(), SessionError> {
        let shared = self.find_room(room_code).await?;
        let previous = self.registry.resolve(identity).await;

        {
            let mut room = shared.lock().await;
            self.admit(&mut room, identity, &display_name, false)
                .await?;

            let reply = ServerMessage::RoomJoined {
                room_code: room.code.to_string(),
                is_host: room.is_host(identity),
            };
            self.broadcaster.send_to(identity, &reply).await;
            self.broadcaster
                .to_room(&room, &player_joined(&room, &display_name))
                .await;
        }

        self.leave_previous(identity, previous, room_code).await;
        Ok(())
    }

    /// ルームのスナップショットを返す
    ///
    /// `display_name` があれば、その名前でこの接続をルームにバインドしてから返す。
    pub async fn get_room_data(
        &self,
        identity: &ConnectionId,
        room_code: &RoomCode,
        display_name: Option<DisplayName>,
    ) -> Result<(), SessionError> {
        let shared = self.find_room(room_code).await?;
        let previous = self.registry.resolve(identity).await;

        {
            let mut room = shared.lock().await;
            if let Some(name) = &display_name {
                let admission = self.admit(&mut room, identity, name, true).await?;
                if admission == Admission::Joined {
                    self.broadcaster
                        .to_room(&room, &player_joined(&room, name))
                        .await;
                }
            }

            let reply = ServerMessage::RoomData {
                room: (&*room).into(),
                is_host: room.is_host(identity),
            };
            self.broadcaster.send_to(identity, &reply).await;
        }

        if display_name.is_some() {
            self.leave_previous(identity, previous, room_code).await;
        }
        Ok(())
    }

    async fn find_room(&self, room_code: &RoomCode) -> Result<SharedRoom, SessionError> {
        self.repository
            .get_room(room_code)
            .await
            .ok_or_else(SessionError::room_not_found)
    }

    /// Admit into the locked room and point the registry at it.
    async fn admit(
        &self,
        room: &mut Room,
        identity: &ConnectionId,
        display_name: &DisplayName,
        rebind_live_names: bool,
    ) -> Result<Admission, SessionError> {
        let policy = AdmissionPolicy {
            max_players: self.max_players,
            rebind_live_names,
        };
        let now = Timestamp::new(self.clock.now_millis());
        let admission = room.admit(identity.clone(), display_name.clone(), policy, now)?;

        self.registry
            .bind(
                identity.clone(),
                Binding::new(room.code.clone(), display_name.clone()),
            )
            .await;

        match &admission {
            Admission::Joined => tracing::info!(
                "{} joined room {} ({} players)",
                display_name,
                room.code,
                room.players().len()
            ),
            Admission::Rejoined { previous } => {
                if previous != identity {
                    self.unbind_superseded(previous, &room.code, display_name)
                        .await;
                }
                tracing::info!("{} rejoined room {}", display_name, room.code);
            }
        }
        Ok(admission)
    }

    /// Drop the old connection's binding if it still points at this player.
    async fn unbind_superseded(
        &self,
        previous: &ConnectionId,
        room_code: &RoomCode,
        display_name: &DisplayName,
    ) {
        let still_bound = self.registry.resolve(previous).await.is_some_and(|b| {
            &b.room_code == room_code && &b.display_name == display_name
        });
        if still_bound {
            self.registry.unbind(previous).await;
            tracing::debug!("Connection '{}' superseded as {}", previous, display_name);
        }
    }

    async fn leave_previous(
        &self,
        identity: &ConnectionId,
        previous: Option<Binding>,
        current: &RoomCode,
    ) {
        if let Some(previous) = previous.filter(|b| &b.room_code != current) {
            release_previous_room(self.repository.as_ref(), identity, &previous.room_code).await;
        }
    }
}

/// Mark `identity` offline in a room it has moved away from.
///
/// Called with no room locked.
pub(super) async fn release_previous_room(
    repository: &dyn RoomRepository,
    identity: &ConnectionId,
    room_code: &RoomCode,
) {
    let Some(room) = repository.get_room(room_code).await else {
        return;
    };
    let mut room = room.lock().await;
    if let Some(name) = room.mark_disconnected(identity) {
        tracing::info!("{} moved away from room {}", name, room.code);
    }
}

/// Name the connection plays in `room`: its registry binding when that
/// points here, otherwise the connected player holding the identity.
pub(super) fn sender_name(
    binding: Option<Binding>,
    room: &Room,
    identity: &ConnectionId,
) -> Result<DisplayName, SessionError> {
    binding
        .filter(|b| b.room_code == room.code)
        .map(|b| b.display_name)
        .or_else(|| {
            room.find_player_by_identity(identity)
                .filter(|p| p.is_connected())
                .map(|p| p.display_name().clone())
        })
        .ok_or_else(|| SessionError::NotFound("You are not in this room".to_string()))
}

fn player_joined(room: &Room, display_name: &DisplayName) -> ServerMessage {
    ServerMessage::PlayerJoined {
        display_name: display_name.to_string(),
        players: room.players().iter().map(Into::into).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{Harness, drain, kinds};

    fn usecase(h: &Harness, max_players: usize) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            h.repository.clone(),
            h.registry.clone(),
            h.broadcaster.clone(),
            Arc::new(h.clock.clone()),
            max_players,
        )
    }

    fn name(s: &str) -> DisplayName {
        DisplayName::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_join_notifies_joiner_and_room() {
        // テスト項目: 参加者には room-joined、ルーム全員には player-joined が届く
        // given (前提条件):
        let h = Harness::new();
        let usecase = usecase(&h, 10);
        let (host, mut host_rx) = h.connect(1).await;
        let (ana, mut ana_rx) = h.connect(2).await;
        let room = h.room_with_host(&host, "Host").await;
        let code = room.lock().await.code.clone();

        // when (操作):
        usecase.join(&ana, &code, name("Ana")).await.unwrap();

        // then (期待する結果):
        let to_ana = drain(&mut ana_rx);
        assert_eq!(
            to_ana[0],
            ServerMessage::RoomJoined {
                room_code: code.to_string(),
                is_host: false
            }
        );
        assert_eq!(kinds(&to_ana), vec!["room-joined", "player-joined"]);
        match &drain(&mut host_rx)[..] {
            [ServerMessage::PlayerJoined {
                display_name,
                players,
            }] => {
                assert_eq!(display_name, "Ana");
                let names: Vec<&str> = players.iter().map(|p| p.display_name.as_str()).collect();
                assert_eq!(names, vec!["Host", "Ana"]);
            }
            other => panic!("unexpected messages: {other:?}"),
        }
        assert_eq!(
            h.registry.resolve(&ana).await,
            Some(Binding::new(code, name("Ana")))
        );
    }

    #[tokio::test]
    async fn test_join_rejections() {
        // テスト項目: 存在しないルーム、使用中の表示名、満員のルームへの参加は拒否される
        let h = Harness::new();
        let usecase = usecase(&h, 2);
        let (host, _host_rx) = h.connect(1).await;
        let (ana, _ana_rx) = h.connect(2).await;
        let (ben, _ben_rx) = h.connect(3).await;
        let room = h.room_with_host(&host, "Host").await;
        let code = room.lock().await.code.clone();

        let missing = RoomCode::new("ZZZZZZ".to_string()).unwrap();
        assert_eq!(
            usecase.join(&ana, &missing, name("Ana")).await,
            Err(SessionError::room_not_found())
        );
        assert!(matches!(
            usecase.join(&ana, &code, name("Host")).await,
            Err(SessionError::Conflict(_))
        ));

        usecase.join(&ana, &code, name("Ana")).await.unwrap();
        assert!(matches!(
            usecase.join(&ben, &code, name("Ben")).await,
            Err(SessionError::Conflict(_))
        ));
        assert_eq!(h.registry.resolve(&ben).await, None);
    }

    #[tokio::test]
    async fn test_new_player_cannot_join_running_quiz_but_can_rejoin() {
        // テスト項目: 進行中のクイズには新規参加できないが、既存プレイヤーは再参加できる
        // given (前提条件):
        let h = Harness::new();
        let usecase = usecase(&h, 10);
        let (host, _host_rx) = h.connect(1).await;
        let (ana, _ana_rx) = h.connect(2).await;
        let (ana_again, _again_rx) = h.connect(3).await;
        let (ben, _ben_rx) = h.connect(4).await;
        let room = h.room_with_host(&host, "Host").await;
        let code = room.lock().await.code.clone();
        usecase.join(&ana, &code, name("Ana")).await.unwrap();
        {
            let mut room = room.lock().await;
            room.quiz.start(None).unwrap();
            room.mark_disconnected(&ana);
        }

        // when (操作):
        let newcomer = usecase.join(&ben, &code, name("Ben")).await;
        let returning = usecase.join(&ana_again, &code, name("Ana")).await;

        // then (期待する結果):
        assert!(matches!(newcomer, Err(SessionError::Conflict(_))));
        assert_eq!(returning, Ok(()));
        assert_eq!(room.lock().await.players().len(), 2);
        // 古い接続のバインディングは外れている
        assert_eq!(h.registry.resolve(&ana).await, None);
    }

    #[tokio::test]
    async fn test_get_room_data_rebinds_live_name_without_announcing() {
        // テスト項目: ホストが再読み込みで新しい接続から名乗り直すと、ホスト権限が移り player-joined は出ない
        // given (前提条件):
        let h = Harness::new();
        let usecase = usecase(&h, 10);
        let (host, mut old_rx) = h.connect(1).await;
        let (reloaded, mut new_rx) = h.connect(2).await;
        let room = h.room_with_host(&host, "Host").await;
        let code = room.lock().await.code.clone();

        // when (操作):
        usecase
            .get_room_data(&reloaded, &code, Some(name("Host")))
            .await
            .unwrap();

        // then (期待する結果):
        match &drain(&mut new_rx)[..] {
            [ServerMessage::RoomData { room, is_host }] => {
                assert!(*is_host);
                assert_eq!(room.code, code.to_string());
                assert_eq!(room.players.len(), 1);
            }
            other => panic!("unexpected messages: {other:?}"),
        }
        assert!(drain(&mut old_rx).is_empty());
        assert_eq!(h.registry.resolve(&host).await, None);
        assert!(room.lock().await.is_host(&reloaded));
    }

    #[tokio::test]
    async fn test_get_room_data_with_new_name_announces_join() {
        // テスト項目: get-room-data で新しい名前を名乗ると参加扱いになり player-joined が配信される
        let h = Harness::new();
        let usecase = usecase(&h, 10);
        let (host, mut host_rx) = h.connect(1).await;
        let (ana, mut ana_rx) = h.connect(2).await;
        let room = h.room_with_host(&host, "Host").await;
        let code = room.lock().await.code.clone();

        usecase
            .get_room_data(&ana, &code, Some(name("Ana")))
            .await
            .unwrap();

        assert_eq!(kinds(&drain(&mut host_rx)), vec!["player-joined"]);
        assert_eq!(
            kinds(&drain(&mut ana_rx)),
            vec!["player-joined", "room-data"]
        );
    }

    #[tokio::test]
    async fn test_get_room_data_without_name_is_read_only() {
        // テスト項目: 名前なしの get-room-data はスナップショットを返すだけでバインドしない
        let h = Harness::new();
        let usecase = usecase(&h, 10);
        let (host, _host_rx) = h.connect(1).await;
        let (viewer, mut viewer_rx) = h.connect(2).await;
        let room = h.room_with_host(&host, "Host").await;
        let code = room.lock().await.code.clone();

        usecase.get_room_data(&viewer, &code, None).await.unwrap();

        assert_eq!(kinds(&drain(&mut viewer_rx)), vec!["room-data"]);
        assert_eq!(h.registry.resolve(&viewer).await, None);
        assert_eq!(room.lock().await.players().len(), 1);
    }

    #[tokio::test]
    async fn test_joining_another_room_leaves_previous() {
        // テスト項目: 別のルームに参加すると、前のルームのプレイヤーはオフラインになる
        let h = Harness::new();
        let usecase = usecase(&h, 10);
        let (host_a, _a_rx) = h.connect(1).await;
        let (host_b, _b_rx) = h.connect(2).await;
        let (ana, _ana_rx) = h.connect(3).await;
        let room_a = h.room_with_host(&host_a, "HostA").await;
        let room_b = h.room_with_host(&host_b, "HostB").await;
        let code_a = room_a.lock().await.code.clone();
        let code_b = room_b.lock().await.code.clone();
        usecase.join(&ana, &code_a, name("Ana")).await.unwrap();

        usecase.join(&ana, &code_b, name("Ana")).await.unwrap();

        let room_a = room_a.lock().await;
        assert!(!room_a.find_player(&name("Ana")).unwrap().is_connected());
        assert_eq!(h.registry.resolve(&ana).await.unwrap().room_code, code_b);
    }

    fn announcement() -> ServerMessage {
        ServerMessage::AllAnswered {
            message: "next".to_string(),
        }
    }

    #[tokio::test]
    async fn test_previous_room_events_stop_after_moving() {
        // テスト項目: 別のルームへ移動した接続には、前のルームのイベントが届かない
        // given (前提条件):
        let h = Harness::new();
        let usecase = usecase(&h, 10);
        let (host_a, mut host_a_rx) = h.connect(1).await;
        let (host_b, _b_rx) = h.connect(2).await;
        let (ana, mut ana_rx) = h.connect(3).await;
        let room_a = h.room_with_host(&host_a, "HostA").await;
        let room_b = h.room_with_host(&host_b, "HostB").await;
        let code_a = room_a.lock().await.code.clone();
        let code_b = room_b.lock().await.code.clone();
        usecase.join(&ana, &code_a, name("Ana")).await.unwrap();
        usecase.join(&ana, &code_b, name("Ana")).await.unwrap();
        drain(&mut ana_rx);
        drain(&mut host_a_rx);

        // when (操作):
        h.broadcaster
            .to_room(&*room_a.lock().await, &announcement())
            .await;

        // then (期待する結果):
        assert!(drain(&mut ana_rx).is_empty());
        assert_eq!(kinds(&drain(&mut host_a_rx)), vec!["all-answered"]);
    }

    #[tokio::test]
    async fn test_switching_name_in_same_room_delivers_once() {
        // テスト項目: 同じ接続がルーム内で名前を変えても、イベントは1回だけ届く
        // given (前提条件):
        let h = Harness::new();
        let usecase = usecase(&h, 10);
        let (host, _host_rx) = h.connect(1).await;
        let (ana, mut ana_rx) = h.connect(2).await;
        let room = h.room_with_host(&host, "Host").await;
        let code = room.lock().await.code.clone();
        usecase.join(&ana, &code, name("Ana")).await.unwrap();
        usecase.join(&ana, &code, name("Ben")).await.unwrap();
        drain(&mut ana_rx);

        // when (操作):
        h.broadcaster
            .to_room(&*room.lock().await, &announcement())
            .await;

        // then (期待する結果):
        assert_eq!(kinds(&drain(&mut ana_rx)), vec!["all-answered"]);
        assert_eq!(room.lock().await.players().len(), 3);
    }
}
