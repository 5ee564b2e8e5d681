//! End-to-end workflows across the store, driven the way the HTTP layer
//! drives it: resolve a session, run one operation, observe the result.

use loft_store::Store;
use loft_types::{ContainerId, LoftError};

#[test]
fn register_create_send_read() {
    let store = Store::open_in_memory();
    let a = store.register("a@x.com", "password1", "A", "One").unwrap();
    let user = store.resolve_session(&a.token).unwrap();

    let ch = store.create_channel(user, "general", true).unwrap();
    store
        .send_message(user, ContainerId::Channel(ch), "hi")
        .unwrap();

    let page = store.get_messages(user, ContainerId::Channel(ch), 0).unwrap();
    assert_eq!(page.messages.len(), 1);
    assert_eq!(page.messages[0].message, "hi");
    assert_eq!(page.start, 0);
    assert_eq!(page.end, -1);
}

#[test]
fn private_channel_invite_flow() {
    let store = Store::open_in_memory();
    let a = store.register("a@x.com", "password1", "A", "One").unwrap();
    let b = store.register("b@x.com", "password1", "B", "Two").unwrap();

    let ch = store.create_channel(a.user_id, "private", false).unwrap();
    assert!(matches!(
        store.join_channel(b.user_id, ch),
        Err(LoftError::Access(_))
    ));

    store.invite_to_channel(a.user_id, ch, b.user_id).unwrap();
    let listed = store.list_channels(b.user_id).unwrap();
    assert!(listed.iter().any(|c| c.channel_id == ch));
}

#[test]
fn last_global_owner_cannot_be_removed() {
    let store = Store::open_in_memory();
    let a = store.register("a@x.com", "password1", "A", "One").unwrap();
    store.register("b@x.com", "password1", "B", "Two").unwrap();

    assert!(matches!(
        store.admin_remove_user(a.user_id, a.user_id),
        Err(LoftError::Input(_))
    ));
}

#[test]
fn tag_notification_end_to_end() {
    let store = Store::open_in_memory();
    let a = store.register("a@x.com", "password1", "A", "One").unwrap();
    let b = store.register("b@x.com", "password1", "B", "Two").unwrap();

    let ch = store.create_channel(a.user_id, "general", true).unwrap();
    store.join_channel(b.user_id, ch).unwrap();

    let body = "@btwo have a look at this long report";
    store
        .send_message(a.user_id, ContainerId::Channel(ch), body)
        .unwrap();

    let feed = store.notifications(b.user_id).unwrap();
    let snippet: String = body.chars().take(20).collect();
    assert_eq!(
        feed[0].message,
        format!("aone tagged you in general: {snippet}")
    );
    assert_eq!(feed[0].container, ContainerId::Channel(ch));
}

#[test]
fn snapshot_survives_reopen() {
    use loft_store::persist::{MemoryBackend, SnapshotBackend};
    use std::sync::Arc;

    let backend: Arc<MemoryBackend> = Arc::new(MemoryBackend::default());

    struct Shared(Arc<MemoryBackend>);
    impl SnapshotBackend for Shared {
        fn load(&self) -> anyhow::Result<Option<loft_store::snapshot::Workspace>> {
            self.0.load()
        }
        fn save(&self, ws: &loft_store::snapshot::Workspace) -> anyhow::Result<()> {
            self.0.save(ws)
        }
    }

    let (user, token, ch) = {
        let store = Store::open(Box::new(Shared(backend.clone()))).unwrap();
        let a = store.register("a@x.com", "password1", "A", "One").unwrap();
        let ch = store.create_channel(a.user_id, "general", true).unwrap();
        store
            .send_message(a.user_id, ContainerId::Channel(ch), "persisted")
            .unwrap();
        (a.user_id, a.token, ch)
    };

    // A new store over the same backend sees everything, sessions included.
    let store = Store::open(Box::new(Shared(backend))).unwrap();
    assert_eq!(store.resolve_session(&token).unwrap(), user);
    let page = store.get_messages(user, ContainerId::Channel(ch), 0).unwrap();
    assert_eq!(page.messages[0].message, "persisted");

    // Id counters carried over: the next message id keeps ascending.
    let next = store
        .send_message(user, ContainerId::Channel(ch), "after reopen")
        .unwrap();
    assert_eq!(next, 2);
}
