use std::collections::BTreeSet;

use loft_types::api::{DmDetails, DmSummary};
use loft_types::models::Dm;
use loft_types::{ContainerId, LoftError, Result};

use crate::users::profile_of;
use crate::Store;

impl Store {
    /// Create a DM between the creator and `member_ids`. The conversation
    /// name is derived once: all member handles sorted and ", "-joined.
    pub fn create_dm(&self, creator_id: u64, member_ids: &[u64]) -> Result<u64> {
        self.write(|ws| {
            let mut seen = BTreeSet::from([creator_id]);
            for &id in member_ids {
                ws.active_user(id)?;
                if !seen.insert(id) {
                    return Err(LoftError::input("duplicate member in dm"));
                }
            }

            let mut members = vec![creator_id];
            members.extend_from_slice(member_ids);

            let mut handles: Vec<String> = members
                .iter()
                .map(|&id| Ok(ws.user(id)?.handle.clone()))
                .collect::<Result<_>>()?;
            handles.sort();
            let name = handles.join(", ");

            let dm_id = ws.next_dm_id;
            ws.next_dm_id += 1;
            ws.dms.insert(
                dm_id,
                Dm {
                    id: dm_id,
                    name,
                    creator: creator_id,
                    members: members.clone(),
                    messages: Vec::new(),
                    removed: false,
                },
            );

            for &id in &members {
                ws.log_dm_membership(id, 1);
            }
            ws.log_dms_exist(1);
            for &id in member_ids {
                ws.notify_added(creator_id, id, ContainerId::Dm(dm_id))?;
            }
            tracing::info!(dm_id, creator_id, "created dm");
            Ok(dm_id)
        })
    }

    /// DMs the user is a member of, in creation order. Tombstoned DMs are
    /// excluded.
    pub fn list_dms(&self, user_id: u64) -> Result<Vec<DmSummary>> {
        self.read(|ws| {
            Ok(ws
                .dms
                .values()
                .filter(|dm| !dm.removed && dm.members.contains(&user_id))
                .map(|dm| DmSummary {
                    dm_id: dm.id,
                    name: dm.name.clone(),
                })
                .collect())
        })
    }

    pub fn dm_details(&self, user_id: u64, dm_id: u64) -> Result<DmDetails> {
        self.read(|ws| {
            let dm = ws.dm(dm_id)?;
            if !dm.members.contains(&user_id) {
                return Err(LoftError::access("user is not a member of this dm"));
            }
            Ok(DmDetails {
                name: dm.name.clone(),
                members: dm
                    .members
                    .iter()
                    .map(|&id| Ok(profile_of(ws.user(id)?)))
                    .collect::<Result<_>>()?,
            })
        })
    }

    /// Leaving does not rename the conversation or touch its messages.
    pub fn leave_dm(&self, user_id: u64, dm_id: u64) -> Result<()> {
        self.write(|ws| {
            let dm = ws.dm(dm_id)?;
            if !dm.members.contains(&user_id) {
                return Err(LoftError::access("user is not a member of this dm"));
            }
            ws.dm_mut(dm_id)?.members.retain(|&id| id != user_id);
            ws.log_dm_membership(user_id, -1);
            Ok(())
        })
    }

    /// Creator-only. Tombstones the DM: members are cleared, new activity is
    /// rejected, historical message records are kept.
    pub fn remove_dm(&self, user_id: u64, dm_id: u64) -> Result<()> {
        self.write(|ws| {
            let dm = ws.dm(dm_id)?;
            if dm.creator != user_id || !dm.members.contains(&user_id) {
                return Err(LoftError::access("only the dm creator can remove it"));
            }

            let members = std::mem::take(&mut ws.dm_mut(dm_id)?.members);
            for &id in &members {
                ws.log_dm_membership(id, -1);
            }
            let message_count = ws.dm_mut(dm_id)?.messages.len() as i64;
            ws.dm_mut(dm_id)?.removed = true;
            ws.log_dms_exist(-1);
            if message_count > 0 {
                ws.log_messages_exist(-message_count);
            }
            tracing::info!(dm_id, "removed dm");
            Ok(())
        })
    }
}
