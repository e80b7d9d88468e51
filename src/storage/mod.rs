//! 永続化アダプタ
//!
//! ルームディレクトリとアクティブユーザーリストをローカルの key-value
//! ストアにミラーリングします。ストアは [`KeyValueStore`] trait として
//! 抽象化されており、実装はこの層が提供します（依存性の逆転）。
//!
//! 永続化されるのは 2 つの独立した JSON 値のみ:
//!
//! - [`ROOM_MESSAGES_KEY`] — ルーム名をキーとする JSON オブジェクト
//!   （キーの順序 = ルーム作成順、値 = `{user, text, time}` の配列）
//! - [`ACTIVE_USERS_KEY`] — ユーザー名の JSON 配列
//!
//! `current_user` / `current_room` はセッション限りの状態であり、永続化
//! されません。スキーマバージョンフィールドはありません。

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::Room;
use crate::state::ChatState;

/// ルームディレクトリの保存キー
pub const ROOM_MESSAGES_KEY: &str = "room_messages";

/// アクティブユーザーリストの保存キー
pub const ACTIVE_USERS_KEY: &str = "active_users";

/// ストレージ層のエラー
#[derive(Debug, Error)]
pub enum StorageError {
    /// ストアへの読み書きに失敗した
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 状態のシリアライズに失敗した
    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// ローカル key-value ストアの抽象化
///
/// キーごとに 1 つの文字列値を保持する、最小限のストア契約。
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// キーに対応する値を取得（存在しない場合は `None`）
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// キーに値を保存（既存の値は上書き）
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// 起動時にストアから状態を復元する
///
/// 各キーは独立して扱われます。キーが存在すれば対応するインメモリ状態を
/// 丸ごと置き換え、存在しなければシードされたデフォルトを維持します。
/// 不正な JSON は警告ログを出してデフォルトを維持します（状態は再生成
/// 可能な低価値データのため、起動を失敗させません）。
///
/// # Arguments
///
/// * `store` - 読み出し元のストア
/// * `state` - 復元先の状態（シード済み）
///
/// # Returns
///
/// ストアの読み出し自体に失敗した場合のみ `StorageError`
pub fn load<S: KeyValueStore>(store: &S, state: &mut ChatState) -> Result<(), StorageError> {
    if let Some(raw) = store.get(ROOM_MESSAGES_KEY)? {
        match parse_rooms(&raw) {
            Ok(rooms) => state.replace_rooms(rooms),
            Err(e) => {
                tracing::warn!("discarding malformed stored room messages: {}", e);
            }
        }
    }

    if let Some(raw) = store.get(ACTIVE_USERS_KEY)? {
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(users) => state.replace_active_users(users),
            Err(e) => {
                tracing::warn!("discarding malformed stored active users: {}", e);
            }
        }
    }

    Ok(())
}

/// 状態をストアに書き込む
///
/// 変更を伴う全ての操作（ログイン、送信、ルーム作成）の直後に同期的に
/// 呼ばれ、前回の内容を上書きします。
///
/// # Arguments
///
/// * `store` - 書き込み先のストア
/// * `state` - 保存する状態
pub fn save<S: KeyValueStore>(store: &S, state: &ChatState) -> Result<(), StorageError> {
    let mut rooms = Map::new();
    for room in state.rooms() {
        let messages = serde_json::to_value(&room.messages).map_err(StorageError::Serialize)?;
        rooms.insert(room.name.clone(), messages);
    }

    let users =
        serde_json::to_string(state.active_users()).map_err(StorageError::Serialize)?;

    store.set(ROOM_MESSAGES_KEY, &Value::Object(rooms).to_string())?;
    store.set(ACTIVE_USERS_KEY, &users)?;
    Ok(())
}

/// JSON オブジェクトをルームのリストに変換（キーの出現順 = 作成順）
fn parse_rooms(raw: &str) -> Result<Vec<Room>, serde_json::Error> {
    let object: Map<String, Value> = serde_json::from_str(raw)?;
    object
        .into_iter()
        .map(|(name, messages)| {
            Ok(Room {
                name,
                messages: serde_json::from_value(messages)?,
            })
        })
        .collect()
}
