use loft_types::api::MessageView;
use loft_types::{LoftError, Result};

use crate::messages::view_of;
use crate::Store;

impl Store {
    /// Case-insensitive substring search over every message in the channels
    /// and DMs the user has joined, newest first.
    pub fn search(&self, user_id: u64, query: &str) -> Result<Vec<MessageView>> {
        self.read(|ws| {
            let len = query.chars().count();
            if !(1..=1000).contains(&len) {
                return Err(LoftError::input("query must be 1 to 1000 characters"));
            }
            let needle = query.to_lowercase();

            let mut hits: Vec<MessageView> = ws
                .messages
                .values()
                .filter(|m| {
                    ws.is_container_member(user_id, m.container).unwrap_or(false)
                        && m.body.to_lowercase().contains(&needle)
                })
                .map(|m| view_of(m, user_id))
                .collect();

            hits.sort_by(|x, y| y.message_id.cmp(&x.message_id));
            Ok(hits)
        })
    }
}
