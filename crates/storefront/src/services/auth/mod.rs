//! Authentication service.
//!
//! [`SessionStore`] owns the cached user directory and the current
//! [`Session`]. It is the only writer of either; readers take snapshots or
//! subscribe to the replaying change cells.

mod error;
mod password;

pub use error::AuthError;
pub use password::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, PasswordPolicy};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::instrument;

use tienda_core::{Email, PasswordDigest, Role, UserId};

use crate::data::{DataError, UserDirectory};
use crate::models::{Navigation, Session, User, UserRecord};
use crate::observable::{ReplayCell, Subscription};

/// A directory user together with the record it was built from.
///
/// Keeping the record lets a refresh reuse the digest of an unchanged
/// legacy record instead of hashing it again.
struct Ingested {
    record: UserRecord,
    user: User,
}

/// Cached directory contents.
#[derive(Default)]
struct Directory {
    /// Users as last served by the users endpoint.
    remote: Vec<Ingested>,
    /// Users registered in this process that the endpoint has not listed yet.
    local: Vec<User>,
}

impl Directory {
    fn iter(&self) -> impl Iterator<Item = &User> {
        self.remote
            .iter()
            .map(|entry| &entry.user)
            .chain(self.local.iter())
    }
}

/// Session and directory state.
pub struct SessionStore {
    directory: Arc<dyn UserDirectory>,
    passwords: PasswordPolicy,
    users: Mutex<Directory>,
    current: Mutex<Session>,
    session: ReplayCell<Session>,
    authenticated: ReplayCell<bool>,
    display_name: ReplayCell<Option<String>>,
    role: ReplayCell<Option<Role>>,
}

impl SessionStore {
    /// Create a logged-out store with an empty directory cache.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>, passwords: PasswordPolicy) -> Self {
        Self {
            directory,
            passwords,
            users: Mutex::new(Directory::default()),
            current: Mutex::new(Session::logged_out()),
            session: ReplayCell::new(Session::logged_out()),
            authenticated: ReplayCell::new(false),
            display_name: ReplayCell::new(None),
            role: ReplayCell::new(None),
        }
    }

    // =========================================================================
    // Directory
    // =========================================================================

    /// Replace the cached directory with the endpoint's current list.
    ///
    /// Legacy records carrying a cleartext password are hashed on the way
    /// in, on the blocking pool. A record identical to the one cached for
    /// its id keeps its existing digest. Records with a malformed email are
    /// skipped. Locally registered users are kept until the endpoint lists
    /// their email.
    ///
    /// # Errors
    ///
    /// Returns `DataError` if the fetch fails; the cache is left as it was.
    #[instrument(skip(self))]
    pub async fn load_directory(&self) -> Result<usize, DataError> {
        let records = self.directory.fetch_users().await?;

        let (mut remote, changed) = {
            let users = self.lock_users();
            let cached: HashMap<UserId, &Ingested> = users
                .remote
                .iter()
                .map(|entry| (entry.record.id, entry))
                .collect();

            let mut unchanged = Vec::new();
            let mut changed = Vec::new();
            for record in records {
                match cached.get(&record.id) {
                    Some(entry) if entry.record == record => unchanged.push(Ingested {
                        record,
                        user: entry.user.clone(),
                    }),
                    _ => changed.push(record),
                }
            }
            (unchanged, changed)
        };

        let ingested = changed.len();
        remote.extend(self.ingest(changed).await);

        let mut users = self.lock_users();
        users
            .local
            .retain(|pending| !remote.iter().any(|entry| entry.user.email == pending.email));
        users.remote = remote;
        let count = users.remote.len() + users.local.len();
        drop(users);

        tracing::debug!(count, ingested, "Directory refreshed");
        Ok(count)
    }

    async fn ingest(&self, records: Vec<UserRecord>) -> Vec<Ingested> {
        if records.is_empty() {
            return Vec::new();
        }

        let passwords = self.passwords.clone();
        let task = tokio::task::spawn_blocking(move || {
            records
                .into_iter()
                .filter_map(|record| ingest_record(&passwords, record))
                .collect::<Vec<_>>()
        });
        match task.await {
            Ok(ingested) => ingested,
            Err(e) => {
                tracing::error!(error = %e, "Directory ingest task failed");
                Vec::new()
            }
        }
    }

    /// Append a user to the cached directory. Nothing is persisted.
    pub fn register_user(&self, user: User) {
        tracing::debug!(user_id = %user.id, "User added to directory cache");
        self.lock_users().local.push(user);
    }

    /// Add a newly registered user under the next free id.
    ///
    /// `build` receives the assigned id. The email check, the id assignment
    /// and the insert happen under one lock, so concurrent registrations
    /// never share an email or an id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if a cached user has the email.
    pub fn insert_new_user(&self, build: impl FnOnce(UserId) -> User) -> Result<User, AuthError> {
        let mut users = self.lock_users();
        let user = build(UserId::next_after(users.iter().map(|u| u.id)));
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::UserAlreadyExists);
        }
        users.local.push(user.clone());
        drop(users);

        tracing::debug!(user_id = %user.id, "User added to directory cache");
        Ok(user)
    }

    /// Whether a cached user has `email`.
    #[must_use]
    pub fn has_email(&self, email: &Email) -> bool {
        self.lock_users().iter().any(|u| u.email == *email)
    }

    /// Snapshot of every cached user.
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.lock_users().iter().cloned().collect()
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Log in with email and password.
    ///
    /// The directory is refreshed first; if that fails the stale cache is
    /// used. The email must match exactly. Logging in while already logged
    /// in replaces the session. A failed attempt leaves the session as it was.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> bool {
        if let Err(e) = self.load_directory().await {
            tracing::warn!(error = %e, "Directory refresh failed, matching against cached users");
        }

        let candidates: Vec<User> = self
            .lock_users()
            .iter()
            .filter(|u| u.email.as_str() == email)
            .cloned()
            .collect();

        let Some(user) = candidates
            .into_iter()
            .find(|u| self.passwords.verify(password, &u.password))
        else {
            tracing::info!("Login rejected");
            return false;
        };

        tracing::info!(user_id = %user.id, role = %user.role(), "Login succeeded");
        self.replace_session(Session::logged_in(user, Utc::now()));
        true
    }

    /// End the session and return where the client should go next.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Navigation {
        self.replace_session(Session::logged_out());
        tracing::info!("Logged out");
        Navigation::Login
    }

    /// Snapshot of the whole session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.lock_current().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock_current().is_authenticated()
    }

    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.lock_current().display_name().map(str::to_string)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.lock_current().role()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.lock_current().user().cloned()
    }

    /// Session changes, starting with the current session.
    pub fn session_changes(&self) -> Subscription<Session> {
        self.session.subscribe()
    }

    /// Logged-in flag changes, starting with the current flag.
    pub fn authenticated_changes(&self) -> Subscription<bool> {
        self.authenticated.subscribe()
    }

    /// Display name changes, starting with the current name.
    pub fn display_name_changes(&self) -> Subscription<Option<String>> {
        self.display_name.subscribe()
    }

    /// Role changes, starting with the current role.
    pub fn role_changes(&self) -> Subscription<Option<Role>> {
        self.role.subscribe()
    }

    /// Return to the initial state: logged out with an empty directory.
    pub fn reset(&self) {
        *self.lock_users() = Directory::default();
        self.replace_session(Session::logged_out());
    }

    /// The users endpoint this store reads from.
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    /// Password rules and hasher used for this directory.
    #[must_use]
    pub const fn passwords(&self) -> &PasswordPolicy {
        &self.passwords
    }

    /// Swap the session and publish every derived value while still holding
    /// the session lock, so subscribers see transitions in order.
    fn replace_session(&self, session: Session) {
        let mut current = self.lock_current();
        self.authenticated.publish(session.is_authenticated());
        self.display_name
            .publish(session.display_name().map(str::to_string));
        self.role.publish(session.role());
        self.session.publish(session.clone());
        *current = session;
    }

    fn lock_users(&self) -> MutexGuard<'_, Directory> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_current(&self) -> MutexGuard<'_, Session> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn ingest_record(passwords: &PasswordPolicy, record: UserRecord) -> Option<Ingested> {
    if let Err(e) = Email::parse(&record.email) {
        tracing::warn!(user_id = %record.id, error = %e, "Skipping user with invalid email");
        return None;
    }

    let digest = if PasswordPolicy::is_digest(&record.password) {
        PasswordDigest::new(record.password.clone())
    } else {
        match passwords.hash(&record.password) {
            Ok(digest) => digest,
            Err(e) => {
                tracing::warn!(user_id = %record.id, error = %e, "Skipping user, hashing failed");
                return None;
            }
        }
    };

    match User::from_record(record.clone(), digest) {
        Ok(user) => Some(Ingested { record, user }),
        Err(e) => {
            tracing::warn!(user_id = %record.id, error = %e, "Skipping user with invalid email");
            None
        }
    }
}
