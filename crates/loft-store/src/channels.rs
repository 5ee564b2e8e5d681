use loft_types::api::{ChannelDetails, ChannelSummary};
use loft_types::models::Channel;
use loft_types::{ContainerId, LoftError, Result};

use crate::snapshot::Workspace;
use crate::users::profile_of;
use crate::Store;

fn summaries<'a>(channels: impl Iterator<Item = &'a Channel>) -> Vec<ChannelSummary> {
    channels
        .map(|c| ChannelSummary {
            channel_id: c.id,
            name: c.name.clone(),
        })
        .collect()
}

fn member_profiles(ws: &Workspace, ids: &[u64]) -> Result<Vec<loft_types::api::UserProfile>> {
    ids.iter().map(|&id| Ok(profile_of(ws.user(id)?))).collect()
}

impl Store {
    pub fn create_channel(&self, user_id: u64, name: &str, is_public: bool) -> Result<u64> {
        self.write(|ws| {
            let len = name.chars().count();
            if !(1..=20).contains(&len) {
                return Err(LoftError::input("channel name must be 1 to 20 characters"));
            }

            let channel_id = ws.next_channel_id;
            ws.next_channel_id += 1;
            ws.channels.insert(
                channel_id,
                Channel {
                    id: channel_id,
                    name: name.to_string(),
                    is_public,
                    owners: vec![user_id],
                    members: vec![user_id],
                    messages: Vec::new(),
                },
            );

            ws.log_channel_membership(user_id, 1);
            ws.log_channels_exist(1);
            tracing::info!(channel_id, user_id, "created channel");
            Ok(channel_id)
        })
    }

    /// Channels the user is a member of, in creation order.
    pub fn list_channels(&self, user_id: u64) -> Result<Vec<ChannelSummary>> {
        self.read(|ws| {
            Ok(summaries(
                ws.channels.values().filter(|c| c.members.contains(&user_id)),
            ))
        })
    }

    /// Every channel, public and private, in creation order.
    pub fn list_all_channels(&self) -> Result<Vec<ChannelSummary>> {
        self.read(|ws| Ok(summaries(ws.channels.values())))
    }

    pub fn channel_details(&self, user_id: u64, channel_id: u64) -> Result<ChannelDetails> {
        self.read(|ws| {
            let channel = ws.channel(channel_id)?;
            if !ws.is_channel_member(user_id, channel) {
                return Err(LoftError::access("user is not a member of this channel"));
            }
            Ok(ChannelDetails {
                name: channel.name.clone(),
                is_public: channel.is_public,
                owner_members: member_profiles(ws, &channel.owners)?,
                all_members: member_profiles(ws, &channel.members)?,
            })
        })
    }

    /// Global owners may join any channel regardless of visibility.
    pub fn join_channel(&self, user_id: u64, channel_id: u64) -> Result<()> {
        self.write(|ws| {
            let channel = ws.channel(channel_id)?;
            if channel.members.contains(&user_id) {
                return Err(LoftError::input("user is already a member"));
            }
            if !channel.is_public && !ws.is_global_owner(user_id) {
                return Err(LoftError::access("channel is private"));
            }

            ws.channel_mut(channel_id)?.members.push(user_id);
            ws.log_channel_membership(user_id, 1);
            Ok(())
        })
    }

    pub fn invite_to_channel(&self, inviter_id: u64, channel_id: u64, invitee_id: u64) -> Result<()> {
        self.write(|ws| {
            let channel = ws.channel(channel_id)?;
            ws.active_user(invitee_id)?;
            if channel.members.contains(&invitee_id) {
                return Err(LoftError::input("invitee is already a member"));
            }
            if !channel.members.contains(&inviter_id) {
                return Err(LoftError::access("inviter is not a member of this channel"));
            }

            ws.channel_mut(channel_id)?.members.push(invitee_id);
            ws.log_channel_membership(invitee_id, 1);
            ws.notify_added(inviter_id, invitee_id, ContainerId::Channel(channel_id))?;
            Ok(())
        })
    }

    pub fn leave_channel(&self, user_id: u64, channel_id: u64) -> Result<()> {
        self.write(|ws| {
            let channel = ws.channel(channel_id)?;
            if !channel.members.contains(&user_id) {
                return Err(LoftError::access("user is not a member of this channel"));
            }
            // The initiator of a running standup has to see it through.
            if ws
                .standups
                .get(&channel_id)
                .is_some_and(|s| s.initiator == user_id)
            {
                return Err(LoftError::input(
                    "user started an active standup in this channel",
                ));
            }

            let channel = ws.channel_mut(channel_id)?;
            channel.members.retain(|&id| id != user_id);
            channel.owners.retain(|&id| id != user_id);
            ws.log_channel_membership(user_id, -1);
            Ok(())
        })
    }

    pub fn add_channel_owner(&self, actor_id: u64, channel_id: u64, target_id: u64) -> Result<()> {
        self.write(|ws| {
            let channel = ws.channel(channel_id)?;
            ws.active_user(target_id)?;
            if !channel.members.contains(&target_id) {
                return Err(LoftError::input("target is not a member of this channel"));
            }
            if channel.owners.contains(&target_id) {
                return Err(LoftError::input("target is already an owner"));
            }
            if !ws.has_channel_owner_perms(actor_id, channel) {
                return Err(LoftError::access("owner permission required"));
            }

            ws.channel_mut(channel_id)?.owners.push(target_id);
            Ok(())
        })
    }

    /// The last remaining owner can never be removed, whoever asks.
    pub fn remove_channel_owner(
        &self,
        actor_id: u64,
        channel_id: u64,
        target_id: u64,
    ) -> Result<()> {
        self.write(|ws| {
            let channel = ws.channel(channel_id)?;
            ws.active_user(target_id)?;
            if !channel.owners.contains(&target_id) {
                return Err(LoftError::input("target is not an owner"));
            }
            if channel.owners.len() == 1 {
                return Err(LoftError::input("cannot remove the only owner"));
            }
            if !ws.has_channel_owner_perms(actor_id, channel) {
                return Err(LoftError::access("owner permission required"));
            }

            ws.channel_mut(channel_id)?.owners.retain(|&id| id != target_id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(store: &Store) -> (u64, u64) {
        let a = store.register("a@x.com", "password1", "A", "One").unwrap();
        let b = store.register("b@x.com", "password1", "B", "Two").unwrap();
        (a.user_id, b.user_id)
    }

    #[test]
    fn create_validates_name() {
        let store = Store::open_in_memory();
        let (a, _) = seed(&store);
        assert!(store.create_channel(a, "", true).is_err());
        assert!(store.create_channel(a, &"x".repeat(21), true).is_err());
        let ch = store.create_channel(a, "general", true).unwrap();
        assert_eq!(ch, 1);
    }

    #[test]
    fn creator_is_owner_and_member() {
        let store = Store::open_in_memory();
        let (a, _) = seed(&store);
        let ch = store.create_channel(a, "general", true).unwrap();
        let details = store.channel_details(a, ch).unwrap();
        assert_eq!(details.owner_members.len(), 1);
        assert_eq!(details.all_members.len(), 1);
        assert_eq!(details.owner_members[0].user_id, a);
    }

    #[test]
    fn double_join_rejected() {
        let store = Store::open_in_memory();
        let (a, b) = seed(&store);
        let ch = store.create_channel(a, "general", true).unwrap();
        store.join_channel(b, ch).unwrap();
        assert!(matches!(store.join_channel(b, ch), Err(LoftError::Input(_))));
    }

    #[test]
    fn private_channel_needs_invite_or_global_owner() {
        let store = Store::open_in_memory();
        let (a, b) = seed(&store);
        let c = store.register("c@x.com", "password1", "C", "Three").unwrap();
        let ch = store.create_channel(b, "secret", false).unwrap();

        // Ordinary user: access error.
        assert!(matches!(
            store.join_channel(c.user_id, ch),
            Err(LoftError::Access(_))
        ));
        // Global owner override: user A registered first.
        store.join_channel(a, ch).unwrap();
    }

    #[test]
    fn invite_guards() {
        let store = Store::open_in_memory();
        let (a, b) = seed(&store);
        let ch = store.create_channel(a, "general", false).unwrap();

        assert!(matches!(
            store.invite_to_channel(a, 99, b),
            Err(LoftError::Input(_))
        ));
        assert!(matches!(
            store.invite_to_channel(a, ch, 99),
            Err(LoftError::Input(_))
        ));
        assert!(matches!(
            store.invite_to_channel(b, ch, b),
            Err(LoftError::Access(_))
        ));

        store.invite_to_channel(a, ch, b).unwrap();
        assert!(matches!(
            store.invite_to_channel(a, ch, b),
            Err(LoftError::Input(_))
        ));

        // Invitee got a notification and the channel in their listing.
        let feed = store.notifications(b).unwrap();
        assert_eq!(feed[0].message, "aone added you to general");
        assert_eq!(store.list_channels(b).unwrap().len(), 1);
    }

    #[test]
    fn member_order_is_insertion_order() {
        let store = Store::open_in_memory();
        let (a, b) = seed(&store);
        let c = store.register("c@x.com", "password1", "C", "Three").unwrap();
        let ch = store.create_channel(a, "general", true).unwrap();
        store.join_channel(c.user_id, ch).unwrap();
        store.join_channel(b, ch).unwrap();

        let details = store.channel_details(a, ch).unwrap();
        let order: Vec<u64> = details.all_members.iter().map(|p| p.user_id).collect();
        assert_eq!(order, vec![a, c.user_id, b]);
    }

    #[test]
    fn owner_pair_add_remove_roundtrips() {
        let store = Store::open_in_memory();
        let (a, b) = seed(&store);
        let ch = store.create_channel(a, "general", true).unwrap();
        store.join_channel(b, ch).unwrap();

        store.add_channel_owner(a, ch, b).unwrap();
        let details = store.channel_details(a, ch).unwrap();
        assert_eq!(details.owner_members.len(), 2);

        store.remove_channel_owner(a, ch, b).unwrap();
        let details = store.channel_details(a, ch).unwrap();
        let owners: Vec<u64> = details.owner_members.iter().map(|p| p.user_id).collect();
        assert_eq!(owners, vec![a]);
    }

    #[test]
    fn last_owner_cannot_be_removed() {
        let store = Store::open_in_memory();
        let (a, b) = seed(&store);
        let ch = store.create_channel(b, "general", true).unwrap();
        store.join_channel(a, ch).unwrap();

        // Even the global owner cannot strip the sole channel owner.
        assert!(matches!(
            store.remove_channel_owner(a, ch, b),
            Err(LoftError::Input(_))
        ));
    }

    #[test]
    fn add_owner_requires_membership_and_permission() {
        let store = Store::open_in_memory();
        let (a, b) = seed(&store);
        let c = store.register("c@x.com", "password1", "C", "Three").unwrap();
        let ch = store.create_channel(b, "general", true).unwrap();

        // Target not a member: input error.
        assert!(matches!(
            store.add_channel_owner(b, ch, c.user_id),
            Err(LoftError::Input(_))
        ));

        store.join_channel(c.user_id, ch).unwrap();
        // Actor without owner permission: access error.
        assert!(matches!(
            store.add_channel_owner(c.user_id, ch, c.user_id),
            Err(LoftError::Access(_))
        ));

        // Global owner has owner perms only as a member.
        assert!(matches!(
            store.add_channel_owner(a, ch, c.user_id),
            Err(LoftError::Access(_))
        ));
        store.join_channel(a, ch).unwrap();
        store.add_channel_owner(a, ch, c.user_id).unwrap();
    }

    #[test]
    fn leave_drops_membership_and_ownership() {
        let store = Store::open_in_memory();
        let (a, b) = seed(&store);
        let ch = store.create_channel(a, "general", true).unwrap();
        store.join_channel(b, ch).unwrap();
        store.add_channel_owner(a, ch, b).unwrap();

        store.leave_channel(b, ch).unwrap();
        let details = store.channel_details(a, ch).unwrap();
        assert_eq!(details.all_members.len(), 1);
        assert_eq!(details.owner_members.len(), 1);

        assert!(matches!(store.leave_channel(b, ch), Err(LoftError::Access(_))));
    }
}
