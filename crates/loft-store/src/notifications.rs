use std::collections::BTreeSet;

use loft_types::api::NotificationView;
use loft_types::models::Notification;
use loft_types::{ContainerId, Result};

use crate::snapshot::Workspace;
use crate::Store;

/// Only this many of a user's newest notifications are ever read.
const FEED_LIMIT: usize = 20;

/// Tag snippets carry at most this many characters of the message body.
const TAG_SNIPPET_CHARS: usize = 20;

impl Workspace {
    /// Prepend one notification to a user's feed. The feed grows without
    /// bound; reads only ever see the first 20.
    pub(crate) fn notify(&mut self, user_id: u64, container: ContainerId, text: String) {
        self.notifications.entry(user_id).or_default().insert(
            0,
            Notification {
                container,
                message: text,
            },
        );
    }

    pub(crate) fn notify_added(
        &mut self,
        actor_id: u64,
        target_id: u64,
        container: ContainerId,
    ) -> Result<()> {
        let actor = self.user(actor_id)?.handle.clone();
        let name = self.container_name(container)?.to_string();
        self.notify(target_id, container, format!("{actor} added you to {name}"));
        Ok(())
    }

    pub(crate) fn notify_reacted(
        &mut self,
        actor_id: u64,
        author_id: u64,
        container: ContainerId,
    ) -> Result<()> {
        let actor = self.user(actor_id)?.handle.clone();
        let name = self.container_name(container)?.to_string();
        self.notify(
            author_id,
            container,
            format!("{actor} reacted to your message in {name}"),
        );
        Ok(())
    }

    /// Scan a message body for `@handle` tags and notify every distinct,
    /// resolvable handle that belongs to a member of the container.
    pub(crate) fn notify_tagged(
        &mut self,
        sender_id: u64,
        container: ContainerId,
        body: &str,
    ) -> Result<()> {
        let sender = self.user(sender_id)?.handle.clone();
        let name = self.container_name(container)?.to_string();
        let members: Vec<u64> = match container {
            ContainerId::Channel(id) => self.channel(id)?.members.clone(),
            ContainerId::Dm(id) => self.dm(id)?.members.clone(),
        };

        let mut seen = BTreeSet::new();
        let mut targets = Vec::new();
        for candidate in tag_candidates(body) {
            if !seen.insert(candidate.clone()) {
                continue;
            }
            let hit = self
                .users
                .values()
                .find(|u| !u.removed && u.handle == candidate);
            if let Some(user) = hit {
                if members.contains(&user.id) {
                    targets.push(user.id);
                }
            }
        }

        let snippet: String = body.chars().take(TAG_SNIPPET_CHARS).collect();
        let text = format!("{sender} tagged you in {name}: {snippet}");
        for target in targets {
            self.notify(target, container, text.clone());
        }
        Ok(())
    }
}

/// Maximal alphanumeric runs following each '@'. Empty runs are dropped.
fn tag_candidates(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = body;
    while let Some(at) = rest.find('@') {
        rest = &rest[at + 1..];
        let handle: String = rest.chars().take_while(|c| c.is_alphanumeric()).collect();
        if !handle.is_empty() {
            out.push(handle);
        }
    }
    out
}

impl Store {
    /// The user's 20 most recent notifications, newest first.
    pub fn notifications(&self, user_id: u64) -> Result<Vec<NotificationView>> {
        self.read(|ws| {
            let feed = ws.notifications.get(&user_id).map(Vec::as_slice).unwrap_or(&[]);
            Ok(feed
                .iter()
                .take(FEED_LIMIT)
                .map(|n| NotificationView {
                    container: n.container,
                    message: n.message.clone(),
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_candidates_parse() {
        assert_eq!(tag_candidates("hi @joba"), vec!["joba"]);
        assert_eq!(tag_candidates("@a@b"), vec!["a", "b"]);
        assert_eq!(tag_candidates("@joba, @joba0!"), vec!["joba", "joba0"]);
        assert!(tag_candidates("none here").is_empty());
        assert!(tag_candidates("@ @!").is_empty());
    }

    #[test]
    fn tagged_member_is_notified_with_snippet() {
        let store = Store::open_in_memory();
        let a = store.register("a@x.com", "password1", "A", "One").unwrap();
        let b = store.register("b@x.com", "password1", "B", "Two").unwrap();
        let ch = store.create_channel(a.user_id, "general", true).unwrap();
        store.join_channel(b.user_id, ch).unwrap();

        store
            .send_message(
                a.user_id,
                ContainerId::Channel(ch),
                "@btwo this line is well beyond twenty characters",
            )
            .unwrap();

        let feed = store.notifications(b.user_id).unwrap();
        // Newest first: the tag sits above the join-era entries (if any).
        let tag = &feed[0];
        assert_eq!(tag.container, ContainerId::Channel(ch));
        assert_eq!(tag.message, "aone tagged you in general: @btwo this line is w");
    }

    #[test]
    fn tag_of_non_member_is_ignored() {
        let store = Store::open_in_memory();
        let a = store.register("a@x.com", "password1", "A", "One").unwrap();
        let b = store.register("b@x.com", "password1", "B", "Two").unwrap();
        let ch = store.create_channel(a.user_id, "general", true).unwrap();

        store
            .send_message(a.user_id, ContainerId::Channel(ch), "@btwo hello")
            .unwrap();
        assert!(store.notifications(b.user_id).unwrap().is_empty());
    }

    #[test]
    fn duplicate_tags_notify_once() {
        let store = Store::open_in_memory();
        let a = store.register("a@x.com", "password1", "A", "One").unwrap();
        let b = store.register("b@x.com", "password1", "B", "Two").unwrap();
        let ch = store.create_channel(a.user_id, "general", true).unwrap();
        store.join_channel(b.user_id, ch).unwrap();

        store
            .send_message(a.user_id, ContainerId::Channel(ch), "@btwo @btwo")
            .unwrap();
        assert_eq!(store.notifications(b.user_id).unwrap().len(), 1);
    }

    #[test]
    fn feed_reads_are_capped_at_twenty() {
        let store = Store::open_in_memory();
        let a = store.register("a@x.com", "password1", "A", "One").unwrap();
        let b = store.register("b@x.com", "password1", "B", "Two").unwrap();
        let ch = store.create_channel(a.user_id, "general", true).unwrap();
        store.join_channel(b.user_id, ch).unwrap();

        for i in 0..25 {
            store
                .send_message(a.user_id, ContainerId::Channel(ch), &format!("@btwo {i}"))
                .unwrap();
        }

        let feed = store.notifications(b.user_id).unwrap();
        assert_eq!(feed.len(), 20);
        // Newest first.
        assert!(feed[0].message.ends_with("@btwo 24"));
    }
}
