use loft_types::api::UserProfile;
use loft_types::models::User;
use loft_types::{LoftError, Result};

use crate::Store;

pub(crate) fn profile_of(user: &User) -> UserProfile {
    UserProfile {
        user_id: user.id,
        email: user.email.clone(),
        name_first: user.name_first.clone(),
        name_last: user.name_last.clone(),
        handle: user.handle.clone(),
        profile_img_url: user.profile_img_url.clone(),
    }
}

impl Store {
    /// Profile lookup. Works for removed users too: their record survives as
    /// a tombstone with sentinel name values.
    pub fn user_profile(&self, user_id: u64) -> Result<UserProfile> {
        self.read(|ws| Ok(profile_of(ws.user(user_id)?)))
    }

    /// All active users in registration order.
    pub fn all_users(&self) -> Result<Vec<UserProfile>> {
        self.read(|ws| {
            Ok(ws
                .users
                .values()
                .filter(|u| !u.removed)
                .map(profile_of)
                .collect())
        })
    }

    pub fn set_name(&self, user_id: u64, name_first: &str, name_last: &str) -> Result<()> {
        self.write(|ws| {
            for name in [name_first, name_last] {
                if name.is_empty() || name.chars().count() > 50 {
                    return Err(LoftError::input("names must be 1 to 50 characters"));
                }
            }
            let user = ws.user_mut(user_id)?;
            user.name_first = name_first.to_string();
            user.name_last = name_last.to_string();
            Ok(())
        })
    }

    pub fn set_email(&self, user_id: u64, email: &str) -> Result<()> {
        self.write(|ws| {
            if !crate::auth::email_valid(email) {
                return Err(LoftError::input("invalid email"));
            }
            let old_email = ws.user(user_id)?.email.clone();
            if old_email == email {
                return Ok(());
            }
            if ws.credentials.contains_key(email) {
                return Err(LoftError::input("email already in use"));
            }

            // The credential map is keyed by email, so changing it re-keys
            // the entry.
            let cred = ws
                .credentials
                .remove(&old_email)
                .ok_or_else(|| LoftError::input("no credential for user"))?;
            ws.credentials.insert(email.to_string(), cred);
            ws.user_mut(user_id)?.email = email.to_string();
            Ok(())
        })
    }

    pub fn set_handle(&self, user_id: u64, handle: &str) -> Result<()> {
        self.write(|ws| {
            let len = handle.chars().count();
            if !(3..=20).contains(&len) {
                return Err(LoftError::input("handle must be 3 to 20 characters"));
            }
            if !handle.chars().all(|c| c.is_alphanumeric()) {
                return Err(LoftError::input("handle must be alphanumeric"));
            }
            let taken = ws
                .users
                .values()
                .any(|u| !u.removed && u.id != user_id && u.handle == handle);
            if taken {
                return Err(LoftError::input("handle already in use"));
            }
            ws.user_mut(user_id)?.handle = handle.to_string();
            Ok(())
        })
    }
}
