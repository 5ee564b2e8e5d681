use loft_types::api::StandupActiveResponse;
use loft_types::models::Standup;
use loft_types::{LoftError, Result};

use crate::scheduler::Task;
use crate::{now, Store};

impl Store {
    /// Begin buffering standup lines for `length` seconds. One active
    /// standup per channel.
    pub fn start_standup(&self, user_id: u64, channel_id: u64, length: i64) -> Result<i64> {
        self.write(|ws| {
            let channel = ws.channel(channel_id)?;
            if !ws.is_channel_member(user_id, channel) {
                return Err(LoftError::access("user is not a member of this channel"));
            }
            if length < 0 {
                return Err(LoftError::input("standup length cannot be negative"));
            }
            if ws.standups.contains_key(&channel_id) {
                return Err(LoftError::input("a standup is already active"));
            }

            let time_finish = now() + length;
            ws.standups.insert(
                channel_id,
                Standup {
                    initiator: user_id,
                    time_finish,
                    buffer: String::new(),
                },
            );
            self.scheduler()
                .schedule(time_finish, Task::FlushStandup { channel_id });
            tracing::info!(channel_id, user_id, time_finish, "standup started");
            Ok(time_finish)
        })
    }

    pub fn standup_active(&self, user_id: u64, channel_id: u64) -> Result<StandupActiveResponse> {
        self.read(|ws| {
            let channel = ws.channel(channel_id)?;
            if !ws.is_channel_member(user_id, channel) {
                return Err(LoftError::access("user is not a member of this channel"));
            }
            Ok(match ws.standups.get(&channel_id) {
                Some(standup) => StandupActiveResponse {
                    is_active: true,
                    time_finish: Some(standup.time_finish),
                },
                None => StandupActiveResponse {
                    is_active: false,
                    time_finish: None,
                },
            })
        })
    }

    /// Append one "{handle}: {line}" entry to the active standup buffer.
    pub fn standup_send(&self, user_id: u64, channel_id: u64, line: &str) -> Result<()> {
        self.write(|ws| {
            let channel = ws.channel(channel_id)?;
            if !ws.is_channel_member(user_id, channel) {
                return Err(LoftError::access("user is not a member of this channel"));
            }
            if line.chars().count() > 1000 {
                return Err(LoftError::input("message must be at most 1000 characters"));
            }
            if !ws.standups.contains_key(&channel_id) {
                return Err(LoftError::input("no active standup in this channel"));
            }

            let handle = ws.user(user_id)?.handle.clone();
            let standup = ws
                .standups
                .get_mut(&channel_id)
                .ok_or_else(|| LoftError::input("no active standup in this channel"))?;
            if !standup.buffer.is_empty() {
                standup.buffer.push('\n');
            }
            standup.buffer.push_str(&format!("{handle}: {line}"));
            Ok(())
        })
    }

    /// Scheduler callback: tear down the standup and post the buffered
    /// summary (if any) as one ordinary message by the initiator. Standup
    /// summaries do not trigger tag notifications.
    pub(crate) fn flush_standup(&self, channel_id: u64) -> Result<()> {
        self.write(|ws| {
            let Some(standup) = ws.standups.remove(&channel_id) else {
                return Ok(());
            };
            if standup.buffer.is_empty() || !ws.channels.contains_key(&channel_id) {
                return Ok(());
            }

            let id = ws.next_message_id;
            ws.next_message_id += 1;
            crate::messages::insert_standup_summary(ws, id, channel_id, &standup)?;
            tracing::debug!(channel_id, message_id = id, "standup flushed");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loft_types::ContainerId;
    use std::sync::Arc;

    fn seed(store: &Store) -> (u64, u64, u64) {
        let a = store.register("a@x.com", "password1", "A", "One").unwrap();
        let b = store.register("b@x.com", "password1", "B", "Two").unwrap();
        let ch = store.create_channel(a.user_id, "general", true).unwrap();
        store.join_channel(b.user_id, ch).unwrap();
        (a.user_id, b.user_id, ch)
    }

    #[test]
    fn start_guards() {
        let store = Store::open_in_memory();
        let (a, _, ch) = seed(&store);
        let outsider = store.register("c@x.com", "password1", "C", "Three").unwrap();

        assert!(matches!(
            store.start_standup(a, 99, 60),
            Err(LoftError::Input(_))
        ));
        assert!(matches!(
            store.start_standup(outsider.user_id, ch, 60),
            Err(LoftError::Access(_))
        ));
        assert!(matches!(
            store.start_standup(a, ch, -1),
            Err(LoftError::Input(_))
        ));

        store.start_standup(a, ch, 60).unwrap();
        assert!(matches!(
            store.start_standup(a, ch, 60),
            Err(LoftError::Input(_))
        ));
    }

    #[test]
    fn active_reports_deadline() {
        let store = Store::open_in_memory();
        let (a, _, ch) = seed(&store);

        let before = store.standup_active(a, ch).unwrap();
        assert!(!before.is_active);
        assert_eq!(before.time_finish, None);

        let finish = store.start_standup(a, ch, 60).unwrap();
        let during = store.standup_active(a, ch).unwrap();
        assert!(during.is_active);
        assert_eq!(during.time_finish, Some(finish));
    }

    #[test]
    fn send_requires_active_standup() {
        let store = Store::open_in_memory();
        let (a, _, ch) = seed(&store);
        assert!(matches!(
            store.standup_send(a, ch, "hello"),
            Err(LoftError::Input(_))
        ));
    }

    #[test]
    fn initiator_cannot_leave_mid_standup() {
        let store = Store::open_in_memory();
        let (a, b, ch) = seed(&store);
        store.start_standup(a, ch, 60).unwrap();
        assert!(matches!(
            store.leave_channel(a, ch),
            Err(LoftError::Input(_))
        ));
        // Other members can still leave.
        store.leave_channel(b, ch).unwrap();
    }

    #[test]
    fn flush_posts_one_summary_by_initiator() {
        let store = Store::open_in_memory();
        let (a, b, ch) = seed(&store);
        store.start_standup(a, ch, 60).unwrap();
        store.standup_send(a, ch, "did the thing").unwrap();
        store.standup_send(b, ch, "reviewed it").unwrap();

        store.flush_standup(ch).unwrap();

        let page = store.get_messages(a, ContainerId::Channel(ch), 0).unwrap();
        assert_eq!(page.messages.len(), 1);
        let summary = &page.messages[0];
        assert_eq!(summary.author_id, a);
        assert_eq!(summary.message, "aone: did the thing\nbtwo: reviewed it");
        assert!(!store.standup_active(a, ch).unwrap().is_active);
    }

    #[test]
    fn empty_buffer_flushes_to_nothing() {
        let store = Store::open_in_memory();
        let (a, _, ch) = seed(&store);
        store.start_standup(a, ch, 60).unwrap();
        store.flush_standup(ch).unwrap();
        let page = store.get_messages(a, ContainerId::Channel(ch), 0).unwrap();
        assert!(page.messages.is_empty());
    }

    #[tokio::test]
    async fn standup_flushes_via_scheduler() {
        let store = Arc::new(Store::open_in_memory());
        let (a, _, ch) = seed(&store);

        tokio::spawn(crate::scheduler::run(store.clone()));

        store.start_standup(a, ch, 1).unwrap();
        store.standup_send(a, ch, "buffered line").unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2500)).await;

        let page = store.get_messages(a, ContainerId::Channel(ch), 0).unwrap();
        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.messages[0].message, "aone: buffered line");
    }
}
