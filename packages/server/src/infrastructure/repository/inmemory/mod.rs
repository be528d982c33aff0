mod room;

pub use room::{InMemoryRoomRepository, MAX_CODE_ATTEMPTS};
