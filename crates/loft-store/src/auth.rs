use std::sync::OnceLock;

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use regex::Regex;
use uuid::Uuid;

use loft_types::api::AuthResponse;
use loft_types::models::{Credential, StatPoint, User, UserStats};
use loft_types::{LoftError, Result};

use crate::snapshot::Workspace;
use crate::{now, Store};

const HANDLE_MAX: usize = 20;

impl Store {
    /// Create an account and mint a session token. The first registered user
    /// becomes a global owner.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        name_first: &str,
        name_last: &str,
    ) -> Result<AuthResponse> {
        self.write(|ws| {
            if !email_valid(email) {
                return Err(LoftError::input("invalid email"));
            }
            if password.len() < 6 {
                return Err(LoftError::input("password must be at least 6 characters"));
            }
            for name in [name_first, name_last] {
                if name.is_empty() || name.chars().count() > 50 {
                    return Err(LoftError::input("names must be 1 to 50 characters"));
                }
            }
            if ws.credentials.contains_key(email) {
                return Err(LoftError::input("email already registered"));
            }

            let password_hash = hash_password(password)?;
            let user_id = ws.next_user_id;
            ws.next_user_id += 1;

            let handle = generate_handle(ws, name_first, name_last);

            // First account administers the workspace.
            if ws.users.is_empty() {
                ws.global_owners.insert(user_id);
            }

            ws.users.insert(
                user_id,
                User {
                    id: user_id,
                    email: email.to_string(),
                    name_first: name_first.to_string(),
                    name_last: name_last.to_string(),
                    handle,
                    profile_img_url: String::new(),
                    removed: false,
                },
            );
            ws.credentials.insert(
                email.to_string(),
                Credential {
                    password_hash,
                    user_id,
                },
            );

            let zero = vec![StatPoint { num: 0, time: now() }];
            ws.user_stats.insert(
                user_id,
                UserStats {
                    channels_joined: zero.clone(),
                    dms_joined: zero.clone(),
                    messages_sent: zero,
                },
            );

            let token = mint_token(ws, user_id);
            tracing::info!(user_id, "registered new user");
            Ok(AuthResponse { user_id, token })
        })
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.write(|ws| {
            let cred = ws
                .credentials
                .get(email)
                .ok_or_else(|| LoftError::input("email not registered"))?;

            let parsed = PasswordHash::new(&cred.password_hash)
                .map_err(|e| LoftError::Internal(anyhow!("stored hash unreadable: {e}")))?;
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .map_err(|_| LoftError::input("incorrect password"))?;

            let user_id = cred.user_id;
            let token = mint_token(ws, user_id);
            Ok(AuthResponse { user_id, token })
        })
    }

    /// Revoke exactly one session token.
    pub fn logout(&self, token: &str) -> Result<()> {
        self.write(|ws| {
            ws.sessions
                .remove(token)
                .map(|_| ())
                .ok_or_else(|| LoftError::access("invalid session token"))
        })
    }

    /// The one canonical token -> identity step; every authenticated request
    /// goes through here and nowhere else.
    pub fn resolve_session(&self, token: &str) -> Result<u64> {
        self.read(|ws| {
            ws.sessions
                .get(token)
                .copied()
                .ok_or_else(|| LoftError::access("invalid session token"))
        })
    }
}

fn mint_token(ws: &mut Workspace, user_id: u64) -> String {
    let token = Uuid::new_v4().to_string();
    ws.sessions.insert(token.clone(), user_id);
    token
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| LoftError::Internal(anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

pub(crate) fn email_valid(email: &str) -> bool {
    email_re().is_match(email)
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]+([._-][A-Za-z0-9]+)*@[A-Za-z0-9]+([.-][A-Za-z0-9]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

fn handle_taken(ws: &Workspace, handle: &str) -> bool {
    ws.users
        .values()
        .any(|u| !u.removed && u.handle == handle)
}

/// Lowercased alphanumeric first+last, truncated to 20 chars. On collision a
/// numeric suffix 0, 1, 2, ... is appended, re-trimming the base so the final
/// handle never exceeds 20 chars.
pub(crate) fn generate_handle(ws: &Workspace, name_first: &str, name_last: &str) -> String {
    let base: String = format!("{name_first}{name_last}")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .take(HANDLE_MAX)
        .collect();

    if !base.is_empty() && !handle_taken(ws, &base) {
        return base;
    }

    let mut n: u64 = 0;
    loop {
        let suffix = n.to_string();
        let keep = HANDLE_MAX.saturating_sub(suffix.len());
        let mut candidate: String = base.chars().take(keep).collect();
        candidate.push_str(&suffix);
        if !handle_taken(ws, &candidate) {
            return candidate;
        }
        n += 1;
    }
}
