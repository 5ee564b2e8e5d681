use loft_types::api::{MessageView, MessagesPage, ReactionView};
use loft_types::models::{Message, Reaction, Standup, REACT_THUMBS_UP};
use loft_types::{ContainerId, LoftError, Result};

use crate::scheduler::Task;
use crate::snapshot::Workspace;
use crate::{now, Store};

/// Listing page size.
const PAGE_SIZE: u64 = 50;

const BODY_MAX: usize = 1000;

fn check_body(text: &str) -> Result<()> {
    let len = text.chars().count();
    if !(1..=BODY_MAX).contains(&len) {
        return Err(LoftError::input("message must be 1 to 1000 characters"));
    }
    Ok(())
}

/// Insert a fully validated message: global map, newest-first container list,
/// stats, and (for ordinary sends) tag notifications.
fn insert_message(
    ws: &mut Workspace,
    id: u64,
    container: ContainerId,
    author: u64,
    body: String,
    time_sent: i64,
    scan_tags: bool,
) -> Result<()> {
    ws.messages.insert(
        id,
        Message {
            id,
            container,
            author,
            body: body.clone(),
            time_sent,
            reactions: Vec::new(),
            is_pinned: false,
        },
    );
    ws.container_messages_mut(container)?.insert(0, id);
    ws.log_message_sent(author);
    ws.log_messages_exist(1);
    if scan_tags {
        ws.notify_tagged(author, container, &body)?;
    }
    Ok(())
}

/// Standup flush path: posts the buffered summary as the initiator, without
/// tag notifications.
pub(crate) fn insert_standup_summary(
    ws: &mut Workspace,
    id: u64,
    channel_id: u64,
    standup: &Standup,
) -> Result<()> {
    insert_message(
        ws,
        id,
        ContainerId::Channel(channel_id),
        standup.initiator,
        standup.buffer.clone(),
        now(),
        false,
    )
}

fn delete_message(ws: &mut Workspace, message_id: u64) -> Result<()> {
    let container = ws.message(message_id)?.container;
    // A tombstoned DM no longer tracks a visible list; the global record
    // still goes away.
    if ws.container_exists(container) {
        ws.container_messages_mut(container)?.retain(|&id| id != message_id);
        ws.log_messages_exist(-1);
    }
    ws.messages.remove(&message_id);
    Ok(())
}

pub(crate) fn view_of(message: &Message, viewer: u64) -> MessageView {
    MessageView {
        message_id: message.id,
        author_id: message.author,
        message: message.body.clone(),
        time_sent: message.time_sent,
        reactions: message
            .reactions
            .iter()
            .map(|r| ReactionView {
                react_id: r.react_id,
                user_ids: r.user_ids.clone(),
                is_this_user_reacted: r.user_ids.contains(&viewer),
            })
            .collect(),
        is_pinned: message.is_pinned,
    }
}

impl Workspace {
    /// Editor must be the author or hold owner permission over the container.
    fn can_alter_message(&self, user_id: u64, message: &Message) -> Result<bool> {
        if message.author == user_id {
            return Ok(true);
        }
        self.has_container_owner_perms(user_id, message.container)
    }

    /// A message the user can address: it exists and sits in a container the
    /// user has joined. Input error otherwise.
    fn addressable_message(&self, user_id: u64, message_id: u64) -> Result<&Message> {
        let message = self.message(message_id)?;
        if !self.is_container_member(user_id, message.container)? {
            return Err(LoftError::input(
                "message is not in a channel or dm the user has joined",
            ));
        }
        Ok(message)
    }
}

impl Store {
    pub fn send_message(&self, user_id: u64, container: ContainerId, text: &str) -> Result<u64> {
        self.write(|ws| {
            if !ws.container_exists(container) {
                return Err(LoftError::input("channel or dm not found"));
            }
            if !ws.is_container_member(user_id, container)? {
                return Err(LoftError::access("user is not a member of this container"));
            }
            check_body(text)?;

            let id = ws.next_message_id;
            ws.next_message_id += 1;
            insert_message(ws, id, container, user_id, text.to_string(), now(), true)?;
            Ok(id)
        })
    }

    /// One page of up to 50 messages, newest first. `start` 0 is the most
    /// recent; `end` is `-1` once the page reaches the oldest message.
    pub fn get_messages(
        &self,
        user_id: u64,
        container: ContainerId,
        start: u64,
    ) -> Result<MessagesPage> {
        self.read(|ws| {
            if !ws.container_exists(container) {
                return Err(LoftError::input("channel or dm not found"));
            }
            if !ws.is_container_member(user_id, container)? {
                return Err(LoftError::access("user is not a member of this container"));
            }

            let ids = match container {
                ContainerId::Channel(id) => &ws.channel(id)?.messages,
                ContainerId::Dm(id) => &ws.dm(id)?.messages,
            };
            let total = ids.len() as u64;
            if start > total {
                return Err(LoftError::input("start is greater than the message count"));
            }

            let upto = (start + PAGE_SIZE).min(total) as usize;
            let messages = ids[start as usize..upto]
                .iter()
                .map(|&id| Ok(view_of(ws.message(id)?, user_id)))
                .collect::<Result<_>>()?;
            let end = if start + PAGE_SIZE >= total {
                -1
            } else {
                (start + PAGE_SIZE) as i64
            };

            Ok(MessagesPage {
                messages,
                start,
                end,
            })
        })
    }

    /// Editing to an empty body deletes the message, same end state as
    /// `remove_message`.
    pub fn edit_message(&self, user_id: u64, message_id: u64, text: &str) -> Result<()> {
        self.write(|ws| {
            let message = ws.addressable_message(user_id, message_id)?;
            if !ws.can_alter_message(user_id, message)? {
                return Err(LoftError::access(
                    "only the author or a container owner can edit",
                ));
            }
            if text.chars().count() > BODY_MAX {
                return Err(LoftError::input("message must be at most 1000 characters"));
            }

            if text.is_empty() {
                return delete_message(ws, message_id);
            }
            ws.message_mut(message_id)?.body = text.to_string();
            Ok(())
        })
    }

    pub fn remove_message(&self, user_id: u64, message_id: u64) -> Result<()> {
        self.write(|ws| {
            let message = ws.addressable_message(user_id, message_id)?;
            if !ws.can_alter_message(user_id, message)? {
                return Err(LoftError::access(
                    "only the author or a container owner can remove",
                ));
            }
            delete_message(ws, message_id)
        })
    }

    /// Re-send an accessible message into another container, with optional
    /// extra text concatenated onto the original body.
    pub fn share_message(
        &self,
        user_id: u64,
        og_message_id: u64,
        extra: &str,
        target: ContainerId,
    ) -> Result<u64> {
        self.write(|ws| {
            if !ws.container_exists(target) {
                return Err(LoftError::input("target channel or dm not found"));
            }
            if !ws.is_container_member(user_id, target)? {
                return Err(LoftError::access("user is not a member of the target"));
            }
            let og = ws.addressable_message(user_id, og_message_id)?;
            if extra.chars().count() > BODY_MAX {
                return Err(LoftError::input("message must be at most 1000 characters"));
            }

            let body = format!("{}{}", og.body, extra);
            let id = ws.next_message_id;
            ws.next_message_id += 1;
            insert_message(ws, id, target, user_id, body, now(), true)?;
            Ok(id)
        })
    }

    pub fn react(&self, user_id: u64, message_id: u64, react_id: u64) -> Result<()> {
        self.write(|ws| {
            let message = ws.addressable_message(user_id, message_id)?;
            if react_id != REACT_THUMBS_UP {
                return Err(LoftError::input("invalid react id"));
            }
            let (author, container) = (message.author, message.container);

            let message = ws.message_mut(message_id)?;
            match message.reactions.iter_mut().find(|r| r.react_id == react_id) {
                Some(reaction) => {
                    if reaction.user_ids.contains(&user_id) {
                        return Err(LoftError::input("already reacted"));
                    }
                    reaction.user_ids.push(user_id);
                }
                None => message.reactions.push(Reaction {
                    react_id,
                    user_ids: vec![user_id],
                }),
            }

            ws.notify_reacted(user_id, author, container)?;
            Ok(())
        })
    }

    pub fn unreact(&self, user_id: u64, message_id: u64, react_id: u64) -> Result<()> {
        self.write(|ws| {
            ws.addressable_message(user_id, message_id)?;
            if react_id != REACT_THUMBS_UP {
                return Err(LoftError::input("invalid react id"));
            }

            let message = ws.message_mut(message_id)?;
            let reaction = message
                .reactions
                .iter_mut()
                .find(|r| r.react_id == react_id)
                .filter(|r| r.user_ids.contains(&user_id))
                .ok_or_else(|| LoftError::input("no reaction from this user"))?;
            reaction.user_ids.retain(|&id| id != user_id);
            Ok(())
        })
    }

    pub fn pin_message(&self, user_id: u64, message_id: u64) -> Result<()> {
        self.write(|ws| {
            let message = ws.addressable_message(user_id, message_id)?;
            if !ws.has_container_owner_perms(user_id, message.container)? {
                return Err(LoftError::access("owner permission required"));
            }
            if message.is_pinned {
                return Err(LoftError::input("message is already pinned"));
            }
            ws.message_mut(message_id)?.is_pinned = true;
            Ok(())
        })
    }

    pub fn unpin_message(&self, user_id: u64, message_id: u64) -> Result<()> {
        self.write(|ws| {
            let message = ws.addressable_message(user_id, message_id)?;
            if !ws.has_container_owner_perms(user_id, message.container)? {
                return Err(LoftError::access("owner permission required"));
            }
            if !message.is_pinned {
                return Err(LoftError::input("message is not pinned"));
            }
            ws.message_mut(message_id)?.is_pinned = false;
            Ok(())
        })
    }

    /// Validate now, reserve the id now, deliver at the deadline through the
    /// scheduler. The returned id is valid before the message is visible.
    pub fn send_later(
        &self,
        user_id: u64,
        container: ContainerId,
        text: &str,
        time_sent: i64,
    ) -> Result<u64> {
        self.write(|ws| {
            if !ws.container_exists(container) {
                return Err(LoftError::input("channel or dm not found"));
            }
            if !ws.is_container_member(user_id, container)? {
                return Err(LoftError::access("user is not a member of this container"));
            }
            check_body(text)?;
            if time_sent < now() {
                return Err(LoftError::input("time_sent is in the past"));
            }

            let id = ws.next_message_id;
            ws.next_message_id += 1;

            self.scheduler().schedule(
                time_sent,
                Task::DeliverMessage {
                    message_id: id,
                    container,
                    author: user_id,
                    body: text.to_string(),
                    time_sent,
                },
            );
            Ok(id)
        })
    }

    /// Commit a reserved delayed message. A container or author that has
    /// vanished since scheduling drops the delivery.
    pub(crate) fn deliver_scheduled_message(
        &self,
        message_id: u64,
        container: ContainerId,
        author: u64,
        body: String,
        time_sent: i64,
    ) -> Result<()> {
        self.write(|ws| {
            if !ws.container_exists(container) {
                tracing::warn!(message_id, "dropping delayed message: container gone");
                return Ok(());
            }
            if ws.users.get(&author).is_none_or(|u| u.removed) {
                tracing::warn!(message_id, "dropping delayed message: author gone");
                return Ok(());
            }
            insert_message(ws, message_id, container, author, body, time_sent, true)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn seed(store: &Store) -> (u64, u64, u64) {
        let a = store.register("a@x.com", "password1", "A", "One").unwrap();
        let b = store.register("b@x.com", "password1", "B", "Two").unwrap();
        let ch = store.create_channel(a.user_id, "general", true).unwrap();
        store.join_channel(b.user_id, ch).unwrap();
        (a.user_id, b.user_id, ch)
    }

    #[test]
    fn ids_are_globally_monotonic() {
        let store = Store::open_in_memory();
        let (a, b, ch) = seed(&store);
        let dm = store.create_dm(a, &[b]).unwrap();

        let mut ids = Vec::new();
        for i in 0..6 {
            let container = if i % 2 == 0 {
                ContainerId::Channel(ch)
            } else {
                ContainerId::Dm(dm)
            };
            ids.push(store.send_message(a, container, &format!("m{i}")).unwrap());
        }
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn send_guards() {
        let store = Store::open_in_memory();
        let (a, _, ch) = seed(&store);
        let outsider = store.register("c@x.com", "password1", "C", "Three").unwrap();

        assert!(matches!(
            store.send_message(a, ContainerId::Channel(99), "hi"),
            Err(LoftError::Input(_))
        ));
        assert!(matches!(
            store.send_message(outsider.user_id, ContainerId::Channel(ch), "hi"),
            Err(LoftError::Access(_))
        ));
        assert!(matches!(
            store.send_message(a, ContainerId::Channel(ch), ""),
            Err(LoftError::Input(_))
        ));
        assert!(matches!(
            store.send_message(a, ContainerId::Channel(ch), &"x".repeat(1001)),
            Err(LoftError::Input(_))
        ));
        store
            .send_message(a, ContainerId::Channel(ch), &"x".repeat(1000))
            .unwrap();
    }

    #[test]
    fn pagination_windows() {
        let store = Store::open_in_memory();
        let (a, _, ch) = seed(&store);
        let container = ContainerId::Channel(ch);
        for i in 0..124 {
            store.send_message(a, container, &format!("m{i}")).unwrap();
        }

        let page = store.get_messages(a, container, 0).unwrap();
        assert_eq!(page.messages.len(), 50);
        assert_eq!(page.end, 50);
        // Newest first.
        assert_eq!(page.messages[0].message, "m123");

        let page = store.get_messages(a, container, 50).unwrap();
        assert_eq!(page.messages.len(), 50);
        assert_eq!(page.end, 100);

        let page = store.get_messages(a, container, 100).unwrap();
        assert_eq!(page.messages.len(), 24);
        assert_eq!(page.end, -1);
        assert_eq!(page.messages.last().unwrap().message, "m0");

        // start == count is a legal empty page.
        let page = store.get_messages(a, container, 124).unwrap();
        assert!(page.messages.is_empty());
        assert_eq!(page.end, -1);

        assert!(matches!(
            store.get_messages(a, container, 125),
            Err(LoftError::Input(_))
        ));
    }

    #[test]
    fn exactly_fifty_ends_at_minus_one() {
        let store = Store::open_in_memory();
        let (a, _, ch) = seed(&store);
        let container = ContainerId::Channel(ch);
        for i in 0..50 {
            store.send_message(a, container, &format!("m{i}")).unwrap();
        }
        let page = store.get_messages(a, container, 0).unwrap();
        assert_eq!(page.messages.len(), 50);
        assert_eq!(page.end, -1);
    }

    #[test]
    fn edit_and_remove_permissions() {
        let store = Store::open_in_memory();
        let (a, b, ch) = seed(&store);
        let container = ContainerId::Channel(ch);
        let m = store.send_message(b, container, "original").unwrap();

        let outsider = store.register("c@x.com", "password1", "C", "Three").unwrap();
        assert!(matches!(
            store.edit_message(outsider.user_id, m, "nope"),
            Err(LoftError::Input(_))
        ));

        // Author can edit.
        store.edit_message(b, m, "edited").unwrap();
        // Channel owner can edit someone else's message.
        store.edit_message(a, m, "owner edit").unwrap();

        let c = store.register("d@x.com", "password1", "D", "Four").unwrap();
        store.join_channel(c.user_id, ch).unwrap();
        assert!(matches!(
            store.edit_message(c.user_id, m, "member edit"),
            Err(LoftError::Access(_))
        ));
        // Missing permission outranks an oversize body.
        assert!(matches!(
            store.edit_message(c.user_id, m, &"x".repeat(1001)),
            Err(LoftError::Access(_))
        ));

        store.remove_message(b, m).unwrap();
        assert!(matches!(
            store.remove_message(b, m),
            Err(LoftError::Input(_))
        ));
    }

    #[test]
    fn edit_empty_equals_remove() {
        let store = Store::open_in_memory();
        let (a, _, ch) = seed(&store);
        let container = ContainerId::Channel(ch);

        let m1 = store.send_message(a, container, "one").unwrap();
        let m2 = store.send_message(a, container, "two").unwrap();

        store.edit_message(a, m1, "").unwrap();
        store.remove_message(a, m2).unwrap();

        let page = store.get_messages(a, container, 0).unwrap();
        assert!(page.messages.is_empty());
        assert!(matches!(
            store.edit_message(a, m1, "back"),
            Err(LoftError::Input(_))
        ));
    }

    #[test]
    fn share_concatenates_into_target() {
        let store = Store::open_in_memory();
        let (a, b, ch) = seed(&store);
        let dm = store.create_dm(a, &[b]).unwrap();
        let og = store
            .send_message(a, ContainerId::Channel(ch), "original")
            .unwrap();

        let shared = store
            .share_message(a, og, " plus context", ContainerId::Dm(dm))
            .unwrap();
        assert!(shared > og);

        let page = store.get_messages(b, ContainerId::Dm(dm), 0).unwrap();
        assert_eq!(page.messages[0].message, "original plus context");

        // Target must exist and be joined; source must be addressable.
        assert!(matches!(
            store.share_message(a, og, "", ContainerId::Dm(99)),
            Err(LoftError::Input(_))
        ));
        let outsider = store.register("c@x.com", "password1", "C", "Three").unwrap();
        assert!(matches!(
            store.share_message(outsider.user_id, og, "", ContainerId::Dm(dm)),
            Err(LoftError::Access(_))
        ));
        let dm_msg = store
            .send_message(b, ContainerId::Dm(dm), "private")
            .unwrap();
        let ch2 = store.create_channel(b, "second", true).unwrap();
        let other = store.register("e@x.com", "password1", "E", "Five").unwrap();
        store.join_channel(other.user_id, ch2).unwrap();
        assert!(matches!(
            store.share_message(other.user_id, dm_msg, "", ContainerId::Channel(ch2)),
            Err(LoftError::Input(_))
        ));
    }

    #[test]
    fn react_unreact_and_view_flags() {
        let store = Store::open_in_memory();
        let (a, b, ch) = seed(&store);
        let container = ContainerId::Channel(ch);
        let m = store.send_message(a, container, "react to me").unwrap();

        assert!(matches!(store.react(b, m, 7), Err(LoftError::Input(_))));
        store.react(b, m, REACT_THUMBS_UP).unwrap();
        assert!(matches!(
            store.react(b, m, REACT_THUMBS_UP),
            Err(LoftError::Input(_))
        ));

        let page = store.get_messages(b, container, 0).unwrap();
        let view = &page.messages[0];
        assert_eq!(view.reactions.len(), 1);
        assert!(view.reactions[0].is_this_user_reacted);
        assert_eq!(view.reactions[0].user_ids, vec![b]);

        let page = store.get_messages(a, container, 0).unwrap();
        assert!(!page.messages[0].reactions[0].is_this_user_reacted);

        // Author was notified.
        let feed = store.notifications(a).unwrap();
        assert_eq!(feed[0].message, "btwo reacted to your message in general");

        store.unreact(b, m, REACT_THUMBS_UP).unwrap();
        assert!(matches!(
            store.unreact(b, m, REACT_THUMBS_UP),
            Err(LoftError::Input(_))
        ));
    }

    #[test]
    fn pin_requires_owner() {
        let store = Store::open_in_memory();
        let (a, b, ch) = seed(&store);
        let container = ContainerId::Channel(ch);
        let m = store.send_message(b, container, "pin me").unwrap();

        assert!(matches!(store.pin_message(b, m), Err(LoftError::Access(_))));
        store.pin_message(a, m).unwrap();
        assert!(matches!(store.pin_message(a, m), Err(LoftError::Input(_))));
        // Missing permission outranks the already-pinned state.
        assert!(matches!(store.pin_message(b, m), Err(LoftError::Access(_))));

        let page = store.get_messages(a, container, 0).unwrap();
        assert!(page.messages[0].is_pinned);

        assert!(matches!(store.unpin_message(b, m), Err(LoftError::Access(_))));
        store.unpin_message(a, m).unwrap();
        assert!(matches!(store.unpin_message(a, m), Err(LoftError::Input(_))));
        assert!(matches!(store.unpin_message(b, m), Err(LoftError::Access(_))));
    }

    #[test]
    fn send_later_validates_up_front() {
        let store = Store::open_in_memory();
        let (a, _, ch) = seed(&store);
        let container = ContainerId::Channel(ch);

        assert!(matches!(
            store.send_later(a, container, "hi", now() - 10),
            Err(LoftError::Input(_))
        ));
        assert!(matches!(
            store.send_later(a, ContainerId::Channel(99), "hi", now() + 10),
            Err(LoftError::Input(_))
        ));

        let reserved = store.send_later(a, container, "later", now() + 60).unwrap();
        // Id is reserved but the message is not visible yet.
        let next = store.send_message(a, container, "now").unwrap();
        assert_eq!(next, reserved + 1);
        let page = store.get_messages(a, container, 0).unwrap();
        assert_eq!(page.messages.len(), 1);
        assert_eq!(store.scheduler().pending(), 1);
    }

    #[tokio::test]
    async fn send_later_delivers_after_deadline() {
        let store = Arc::new(Store::open_in_memory());
        let (a, b, ch) = seed(&store);
        let container = ContainerId::Channel(ch);

        tokio::spawn(crate::scheduler::run(store.clone()));

        let due = now() + 1;
        let reserved = store.send_later(a, container, "@btwo delayed", due).unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2500)).await;

        let page = store.get_messages(a, container, 0).unwrap();
        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.messages[0].message_id, reserved);
        assert_eq!(page.messages[0].time_sent, due);

        // Tags fire at delivery time.
        let feed = store.notifications(b).unwrap();
        assert_eq!(feed.len(), 1);
        assert!(feed[0].message.contains("tagged you in general"));
    }
}
