//! Application controller wiring state, storage, clock and view.
//!
//! [`ChatApp`] is the single owner of the session state. Each user action
//! maps to one method: the method mutates the state store, persists what
//! changed, and asks the view to redraw. Storage failures are logged and
//! swallowed; nothing here is fatal.

use crate::common::time::Clock;
use crate::state::{ChatState, CreateRoomOutcome};
use crate::storage::{self, KeyValueStore};
use crate::view::View;

/// Controller for one chat session.
pub struct ChatApp<S: KeyValueStore, V: View, C: Clock> {
    state: ChatState,
    store: S,
    view: V,
    clock: C,
}

impl<S: KeyValueStore, V: View, C: Clock> ChatApp<S, V, C> {
    /// Create a session: seed the defaults, then overwrite them with
    /// whatever the store has from a previous run.
    ///
    /// A store that cannot be read is logged and treated as empty; the
    /// session starts from the seeded defaults.
    pub fn new(store: S, view: V, clock: C) -> Self {
        let mut state = ChatState::new();
        if let Err(e) = storage::load(&store, &mut state) {
            tracing::warn!("failed to read stored state, starting from defaults: {}", e);
        }
        Self {
            state,
            store,
            view,
            clock,
        }
    }

    /// Handle a login attempt with a raw display name.
    ///
    /// On success renders the user list and the current room, persists,
    /// and returns `true`. On validation failure surfaces the message via
    /// the view and returns `false` with no state change.
    pub fn login(&mut self, raw: &str) -> bool {
        match self.state.login(raw).map(|user| user.to_string()) {
            Ok(name) => {
                tracing::info!("logged in as '{}'", name);
                self.render_users();
                self.render_messages("");
                self.persist();
                true
            }
            Err(e) => {
                self.view.show_validation_error(&e.to_string());
                false
            }
        }
    }

    /// Handle raw message input: append to the current room, persist,
    /// redraw. Empty input is ignored; sending before login surfaces a
    /// validation message.
    pub fn send_message(&mut self, raw_text: &str) {
        let time = self.clock.now_hhmm();
        match self.state.send_message(raw_text, time) {
            Ok(Some(_)) => {
                self.render_messages("");
                self.persist();
            }
            Ok(None) => {}
            Err(e) => self.view.show_validation_error(&e.to_string()),
        }
    }

    /// Switch to an existing room and redraw it. Nothing is persisted
    /// (no durable state changed). Unknown rooms surface a validation
    /// message.
    pub fn switch_room(&mut self, name: &str) {
        match self.state.switch_room(name) {
            Ok(()) => self.render_messages(""),
            Err(e) => self.view.show_validation_error(&e.to_string()),
        }
    }

    /// Create a room and switch into it. Empty names and duplicates are
    /// silent no-ops, exactly like a cancelled prompt.
    pub fn create_room(&mut self, name: &str) {
        match self.state.create_room(name) {
            CreateRoomOutcome::Created => {
                tracing::debug!("created room '{}'", name);
                self.render_rooms();
                self.render_messages("");
                self.persist();
            }
            CreateRoomOutcome::AlreadyExists | CreateRoomOutcome::EmptyName => {}
        }
    }

    /// Render the current room filtered by a search term. Pure query; no
    /// state change, no persistence.
    pub fn search(&mut self, term: &str) {
        self.render_messages(term);
    }

    /// Redraw the room list on demand.
    pub fn show_rooms(&mut self) {
        self.render_rooms();
    }

    /// Redraw the active-user list on demand.
    pub fn show_users(&mut self) {
        self.render_users();
    }

    /// Read access to the session state (for prompts and assertions).
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    fn render_messages(&mut self, term: &str) {
        let messages = self.state.filter_messages(term);
        self.view.render(
            self.state.current_room(),
            &messages,
            self.state.current_user().map(|u| u.as_str()),
        );
    }

    fn render_users(&mut self) {
        self.view.render_user_list(
            self.state.active_users(),
            self.state.current_user().map(|u| u.as_str()),
        );
    }

    fn render_rooms(&mut self) {
        let names = self.state.room_names();
        self.view.render_room_list(&names, self.state.current_room());
    }

    fn persist(&self) {
        if let Err(e) = storage::save(&self.store, &self.state) {
            tracing::error!("failed to persist chat state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::common::time::FixedClock;
    use crate::domain::Message;
    use crate::storage::{
        ACTIVE_USERS_KEY, MemoryStore, MockKeyValueStore, ROOM_MESSAGES_KEY, StorageError,
    };

    /// Everything the view was asked to draw, with borrowed arguments
    /// cloned into owned data for later assertions.
    #[derive(Debug, Default)]
    struct ViewLog {
        renders: Vec<(String, Vec<Message>, Option<String>)>,
        user_lists: Vec<(Vec<String>, Option<String>)>,
        room_lists: Vec<(Vec<String>, String)>,
        errors: Vec<String>,
    }

    // Hand-rolled recording view; the View methods take slices of borrowed
    // messages, which generated mocks cannot express.
    #[derive(Default)]
    struct RecordingView {
        log: Rc<RefCell<ViewLog>>,
    }

    impl RecordingView {
        fn new() -> (Self, Rc<RefCell<ViewLog>>) {
            let log = Rc::new(RefCell::new(ViewLog::default()));
            (Self { log: Rc::clone(&log) }, log)
        }
    }

    impl View for RecordingView {
        fn render(&mut self, room: &str, messages: &[&Message], current_user: Option<&str>) {
            self.log.borrow_mut().renders.push((
                room.to_string(),
                messages.iter().map(|m| (*m).clone()).collect(),
                current_user.map(String::from),
            ));
        }

        fn render_user_list(&mut self, users: &[String], current_user: Option<&str>) {
            self.log
                .borrow_mut()
                .user_lists
                .push((users.to_vec(), current_user.map(String::from)));
        }

        fn render_room_list(&mut self, rooms: &[&str], current_room: &str) {
            self.log.borrow_mut().room_lists.push((
                rooms.iter().map(|r| r.to_string()).collect(),
                current_room.to_string(),
            ));
        }

        fn show_validation_error(&mut self, message: &str) {
            self.log.borrow_mut().errors.push(message.to_string());
        }
    }

    fn recording_app(
        store: &MemoryStore,
    ) -> (
        ChatApp<&MemoryStore, RecordingView, FixedClock>,
        Rc<RefCell<ViewLog>>,
    ) {
        let (view, log) = RecordingView::new();
        (ChatApp::new(store, view, FixedClock::new("12:34")), log)
    }

    #[test]
    fn test_invalid_login_shows_error_and_persists_nothing() {
        // テスト項目: 無効なログインはエラー表示のみで、描画も永続化もされない
        // given (前提条件):
        let store = MemoryStore::new();
        let (mut app, log) = recording_app(&store);

        // when (操作):
        let result = app.login("a!");

        // then (期待する結果):
        assert!(!result);
        assert!(app.state().current_user().is_none());
        let log = log.borrow();
        assert_eq!(log.errors.len(), 1);
        assert!(log.renders.is_empty());
        assert!(log.user_lists.is_empty());
        assert!(store.get(ACTIVE_USERS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_valid_login_renders_and_persists() {
        // テスト項目: ログイン成功時にユーザーリストとルームが描画され、状態が永続化される
        // given (前提条件):
        let store = MemoryStore::new();
        let (mut app, log) = recording_app(&store);

        // when (操作):
        let result = app.login("alice_1");

        // then (期待する結果):
        assert!(result);
        assert_eq!(app.state().current_user().unwrap().as_str(), "alice_1");
        let log = log.borrow();
        assert_eq!(
            log.user_lists,
            vec![(vec!["alice_1".to_string()], Some("alice_1".to_string()))]
        );
        assert_eq!(log.renders.len(), 1);
        assert_eq!(log.renders[0].0, "General");
        assert!(log.renders[0].1.is_empty());
        assert_eq!(
            store.get(ACTIVE_USERS_KEY).unwrap().as_deref(),
            Some(r#"["alice_1"]"#)
        );
        assert!(store.get(ROOM_MESSAGES_KEY).unwrap().is_some());
    }

    #[test]
    fn test_send_message_renders_and_persists() {
        // テスト項目: メッセージ送信で再描画と永続化が行われる
        // given (前提条件):
        let store = MemoryStore::new();
        let (mut app, log) = recording_app(&store);
        app.login("alice_1");

        // when (操作):
        app.send_message("hello <b>");

        // then (期待する結果):
        let log = log.borrow();
        assert_eq!(log.renders.len(), 2);
        let (room, messages, _) = &log.renders[1];
        assert_eq!(room, "General");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hello &lt;b&gt;");
        let stored = store.get(ROOM_MESSAGES_KEY).unwrap().unwrap();
        assert!(stored.contains("hello &lt;b&gt;"));
        assert!(stored.contains(r#""time":"12:34""#));
    }

    #[test]
    fn test_send_empty_message_does_nothing() {
        // テスト項目: 空メッセージの送信では描画も永続化も行われない
        // given (前提条件):
        let store = MemoryStore::new();
        let (mut app, log) = recording_app(&store);
        app.login("alice_1");
        let persisted_after_login = store.get(ROOM_MESSAGES_KEY).unwrap();

        // when (操作):
        app.send_message("   ");

        // then (期待する結果):
        assert_eq!(log.borrow().renders.len(), 1); // the login render only
        assert_eq!(store.get(ROOM_MESSAGES_KEY).unwrap(), persisted_after_login);
    }

    #[test]
    fn test_send_message_before_login_shows_error() {
        // テスト項目: ログイン前の送信はバリデーションエラーとして表示される
        // given (前提条件):
        let store = MemoryStore::new();
        let (mut app, log) = recording_app(&store);

        // when (操作):
        app.send_message("hello");

        // then (期待する結果):
        let log = log.borrow();
        assert_eq!(log.errors.len(), 1);
        assert!(log.renders.is_empty());
        assert!(store.get(ROOM_MESSAGES_KEY).unwrap().is_none());
    }

    #[test]
    fn test_switch_room_renders_without_persisting() {
        // テスト項目: ルーム切り替えは再描画のみで永続化しない
        // given (前提条件):
        let store = MemoryStore::new();
        let (mut app, log) = recording_app(&store);

        // when (操作):
        app.switch_room("Design Feedback");

        // then (期待する結果):
        assert_eq!(app.state().current_room(), "Design Feedback");
        let log = log.borrow();
        assert_eq!(log.renders.len(), 1);
        assert_eq!(log.renders[0].0, "Design Feedback");
        assert!(store.get(ROOM_MESSAGES_KEY).unwrap().is_none());
    }

    #[test]
    fn test_switch_to_unknown_room_shows_error() {
        // テスト項目: 存在しないルームへの切り替えはエラー表示になる
        // given (前提条件):
        let store = MemoryStore::new();
        let (mut app, log) = recording_app(&store);

        // when (操作):
        app.switch_room("Nowhere");

        // then (期待する結果):
        assert_eq!(app.state().current_room(), "General");
        let log = log.borrow();
        assert_eq!(log.errors.len(), 1);
        assert!(log.renders.is_empty());
    }

    #[test]
    fn test_create_room_renders_room_list_and_persists() {
        // テスト項目: ルーム作成でルームリストと新ルームが描画され、永続化される
        // given (前提条件):
        let store = MemoryStore::new();
        let (mut app, log) = recording_app(&store);

        // when (操作):
        app.create_room("Random");

        // then (期待する結果):
        assert_eq!(app.state().current_room(), "Random");
        let log = log.borrow();
        assert_eq!(log.room_lists.len(), 1);
        let (rooms, current) = &log.room_lists[0];
        assert_eq!(rooms.len(), 4);
        assert_eq!(current, "Random");
        assert_eq!(log.renders.len(), 1);
        assert_eq!(log.renders[0].0, "Random");
        assert!(
            store
                .get(ROOM_MESSAGES_KEY)
                .unwrap()
                .unwrap()
                .contains("Random")
        );
    }

    #[test]
    fn test_create_duplicate_room_is_silent_noop() {
        // テスト項目: 既存ルームの作成は何も起こさない（描画も永続化もなし）
        // given (前提条件):
        let store = MemoryStore::new();
        let (mut app, log) = recording_app(&store);

        // when (操作):
        app.create_room("General");

        // then (期待する結果):
        assert_eq!(app.state().room_names().len(), 3);
        assert_eq!(app.state().current_room(), "General");
        let log = log.borrow();
        assert!(log.renders.is_empty());
        assert!(log.room_lists.is_empty());
        assert!(log.errors.is_empty());
        assert!(store.get(ROOM_MESSAGES_KEY).unwrap().is_none());
    }

    #[test]
    fn test_search_renders_filtered_subset() {
        // テスト項目: 検索がフィルタ済みのメッセージだけを描画する
        // given (前提条件):
        let store = MemoryStore::new();
        let (mut app, log) = recording_app(&store);
        app.login("alice_1");
        app.send_message("hello world");
        app.send_message("goodbye");

        // when (操作):
        app.search("HELLO");

        // then (期待する結果): ログイン + 送信 2 回 + 検索で 4 回描画され、検索結果は 1 件
        let log = log.borrow();
        assert_eq!(log.renders.len(), 4);
        let (_, messages, _) = &log.renders[3];
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hello world");
    }

    #[test]
    fn test_new_session_restores_persisted_state() {
        // テスト項目: 新しいセッションが前回永続化した状態を復元する
        // given (前提条件):
        let store = MemoryStore::new();
        {
            let (mut app, _log) = recording_app(&store);
            app.login("alice_1");
            app.send_message("remember me");
        }

        // when (操作):
        let (restored, _log) = recording_app(&store);

        // then (期待する結果):
        assert_eq!(
            restored.state().active_users(),
            &["alice_1".to_string()]
        );
        assert_eq!(restored.state().filter_messages("remember").len(), 1);
        // session-only state resets to defaults
        assert!(restored.state().current_user().is_none());
        assert_eq!(restored.state().current_room(), "General");
    }

    #[test]
    fn test_unreadable_store_starts_from_defaults() {
        // テスト項目: ストアが読めない場合でも起動し、シードされたデフォルトで始まる
        // given (前提条件):
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Err(StorageError::Io(std::io::Error::other("disk failure"))));
        let (view, _log) = RecordingView::new();

        // when (操作):
        let app = ChatApp::new(store, view, FixedClock::new("12:34"));

        // then (期待する結果):
        assert_eq!(
            app.state().room_names(),
            vec!["General", "Project Updates", "Design Feedback"]
        );
        assert!(app.state().active_users().is_empty());
    }

    #[test]
    fn test_persist_failure_is_swallowed() {
        // テスト項目: 書き込み失敗でも操作自体は成功し、パニックしない
        // given (前提条件):
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(None));
        store
            .expect_set()
            .returning(|_, _| Err(StorageError::Io(std::io::Error::other("disk full"))));
        let (view, log) = RecordingView::new();
        let mut app = ChatApp::new(store, view, FixedClock::new("12:34"));

        // when (操作):
        let result = app.login("alice_1");

        // then (期待する結果):
        assert!(result);
        assert_eq!(app.state().current_user().unwrap().as_str(), "alice_1");
        assert_eq!(log.borrow().renders.len(), 1);
    }
}
