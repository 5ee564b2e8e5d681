use loft_types::api::{UserStatsView, WorkspaceStatsView};
use loft_types::models::StatPoint;
use loft_types::Result;

use crate::snapshot::Workspace;
use crate::{now, Store};

/// Append the next cumulative count to an append-only series. Counts never
/// go below zero.
fn append(series: &mut Vec<StatPoint>, delta: i64, time: i64) {
    let last = series.last().map(|p| p.num).unwrap_or(0) as i64;
    let num = (last + delta).max(0) as u64;
    series.push(StatPoint { num, time });
}

fn latest(series: &[StatPoint]) -> u64 {
    series.last().map(|p| p.num).unwrap_or(0)
}

impl Workspace {
    pub(crate) fn log_channel_membership(&mut self, user_id: u64, delta: i64) {
        if let Some(stats) = self.user_stats.get_mut(&user_id) {
            append(&mut stats.channels_joined, delta, now());
        }
    }

    pub(crate) fn log_dm_membership(&mut self, user_id: u64, delta: i64) {
        if let Some(stats) = self.user_stats.get_mut(&user_id) {
            append(&mut stats.dms_joined, delta, now());
        }
    }

    /// Messages-sent is monotonic: removals never decrement it.
    pub(crate) fn log_message_sent(&mut self, user_id: u64) {
        if let Some(stats) = self.user_stats.get_mut(&user_id) {
            append(&mut stats.messages_sent, 1, now());
        }
    }

    pub(crate) fn log_channels_exist(&mut self, delta: i64) {
        append(&mut self.workspace_stats.channels_exist, delta, now());
    }

    pub(crate) fn log_dms_exist(&mut self, delta: i64) {
        append(&mut self.workspace_stats.dms_exist, delta, now());
    }

    pub(crate) fn log_messages_exist(&mut self, delta: i64) {
        append(&mut self.workspace_stats.messages_exist, delta, now());
    }
}

impl Store {
    /// A user's usage series plus the involvement rate, derived on read.
    pub fn user_stats(&self, user_id: u64) -> Result<UserStatsView> {
        self.read(|ws| {
            ws.active_user(user_id)?;
            let stats = ws
                .user_stats
                .get(&user_id)
                .cloned()
                .unwrap_or_else(|| loft_types::models::UserStats {
                    channels_joined: vec![],
                    dms_joined: vec![],
                    messages_sent: vec![],
                });

            let numerator = latest(&stats.channels_joined)
                + latest(&stats.dms_joined)
                + latest(&stats.messages_sent);
            let denominator = latest(&ws.workspace_stats.channels_exist)
                + latest(&ws.workspace_stats.dms_exist)
                + latest(&ws.workspace_stats.messages_exist);

            let involvement_rate = if denominator == 0 {
                0.0
            } else {
                (numerator as f64 / denominator as f64).min(1.0)
            };

            Ok(UserStatsView {
                channels_joined: stats.channels_joined,
                dms_joined: stats.dms_joined,
                messages_sent: stats.messages_sent,
                involvement_rate,
            })
        })
    }

    /// Workspace-wide series plus the utilization rate: users in at least one
    /// channel or DM over all active users.
    pub fn workspace_stats(&self) -> Result<WorkspaceStatsView> {
        self.read(|ws| {
            let active: Vec<u64> = ws
                .users
                .values()
                .filter(|u| !u.removed)
                .map(|u| u.id)
                .collect();

            let involved = active
                .iter()
                .filter(|&&id| {
                    ws.channels.values().any(|c| c.members.contains(&id))
                        || ws.dms.values().any(|d| !d.removed && d.members.contains(&id))
                })
                .count();

            let utilization_rate = if active.is_empty() {
                0.0
            } else {
                (involved as f64 / active.len() as f64).min(1.0)
            };

            Ok(WorkspaceStatsView {
                channels_exist: ws.workspace_stats.channels_exist.clone(),
                dms_exist: ws.workspace_stats.dms_exist.clone(),
                messages_exist: ws.workspace_stats.messages_exist.clone(),
                utilization_rate,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loft_types::ContainerId;

    #[test]
    fn append_is_cumulative_and_floored() {
        let mut series = vec![StatPoint { num: 0, time: 0 }];
        append(&mut series, 1, 1);
        append(&mut series, 1, 2);
        append(&mut series, -1, 3);
        append(&mut series, -5, 4);
        let nums: Vec<u64> = series.iter().map(|p| p.num).collect();
        assert_eq!(nums, vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn involvement_rate_zero_denominator() {
        let store = Store::open_in_memory();
        let a = store.register("a@x.com", "password1", "A", "One").unwrap();
        let stats = store.user_stats(a.user_id).unwrap();
        assert_eq!(stats.involvement_rate, 0.0);
    }

    #[test]
    fn rates_are_clamped_to_one() {
        let store = Store::open_in_memory();
        let a = store.register("a@x.com", "password1", "A", "One").unwrap();
        let ch = store.create_channel(a.user_id, "general", true).unwrap();
        let m = store
            .send_message(a.user_id, ContainerId::Channel(ch), "hi")
            .unwrap();
        store.remove_message(a.user_id, m).unwrap();

        // messages_sent stays 1 while messages_exist dropped back to 0, so
        // the raw ratio exceeds 1 and must be clamped.
        let stats = store.user_stats(a.user_id).unwrap();
        assert_eq!(stats.involvement_rate, 1.0);

        let wstats = store.workspace_stats().unwrap();
        assert_eq!(wstats.utilization_rate, 1.0);
    }

    #[test]
    fn utilization_counts_only_involved_users() {
        let store = Store::open_in_memory();
        let a = store.register("a@x.com", "password1", "A", "One").unwrap();
        store.register("b@x.com", "password1", "B", "Two").unwrap();
        store.create_channel(a.user_id, "general", true).unwrap();

        let wstats = store.workspace_stats().unwrap();
        assert_eq!(wstats.utilization_rate, 0.5);
    }
}
