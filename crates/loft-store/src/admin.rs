use loft_types::models::PermissionLevel;
use loft_types::{LoftError, Result};

use crate::Store;

/// Sentinel name carried by tombstoned accounts and their messages.
const REMOVED_SENTINEL: (&str, &str) = ("Removed", "user");

impl Store {
    /// Tombstone an account. Historical messages keep a valid author id but
    /// their bodies are replaced; the email becomes reusable immediately.
    /// Admin operations check the caller's permission before looking at the
    /// target.
    pub fn admin_remove_user(&self, actor_id: u64, target_id: u64) -> Result<()> {
        self.write(|ws| {
            if !ws.is_global_owner(actor_id) {
                return Err(LoftError::access("global owner permission required"));
            }
            ws.active_user(target_id)?;
            if ws.is_global_owner(target_id) && ws.global_owners.len() == 1 {
                return Err(LoftError::input("cannot remove the only global owner"));
            }

            let (first, last) = REMOVED_SENTINEL;
            let old_email = {
                let user = ws.user_mut(target_id)?;
                let old_email = std::mem::take(&mut user.email);
                user.handle.clear();
                user.name_first = first.to_string();
                user.name_last = last.to_string();
                user.removed = true;
                old_email
            };

            ws.credentials.remove(&old_email);
            ws.sessions.retain(|_, &mut uid| uid != target_id);
            ws.global_owners.remove(&target_id);

            for channel in ws.channels.values_mut() {
                channel.members.retain(|&id| id != target_id);
                channel.owners.retain(|&id| id != target_id);
            }
            for dm in ws.dms.values_mut() {
                dm.members.retain(|&id| id != target_id);
            }
            for message in ws.messages.values_mut() {
                if message.author == target_id {
                    message.body = format!("{first} {last}");
                }
            }

            tracing::info!(target_id, "removed user");
            Ok(())
        })
    }

    /// Change a user's workspace-wide permission level (1 = global owner,
    /// 2 = member).
    pub fn admin_set_permission(&self, actor_id: u64, target_id: u64, level: u8) -> Result<()> {
        self.write(|ws| {
            if !ws.is_global_owner(actor_id) {
                return Err(LoftError::access("global owner permission required"));
            }
            ws.active_user(target_id)?;
            let level = PermissionLevel::from_id(level)
                .ok_or_else(|| LoftError::input("invalid permission level"))?;

            let is_owner = ws.is_global_owner(target_id);
            match level {
                PermissionLevel::Owner => {
                    if is_owner {
                        return Err(LoftError::input("user is already a global owner"));
                    }
                    ws.global_owners.insert(target_id);
                }
                PermissionLevel::Member => {
                    if !is_owner {
                        return Err(LoftError::input("user is already a member"));
                    }
                    if ws.global_owners.len() == 1 {
                        return Err(LoftError::input("cannot demote the only global owner"));
                    }
                    ws.global_owners.remove(&target_id);
                }
            }
            Ok(())
        })
    }
}
