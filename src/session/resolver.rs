// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use log::{debug, info, warn};

use crate::{
    client::{Auth, Id, User},
    error::Result,
    notice::{self, Notice, Notify},
    storage::Storage,
};

use super::{Data, Identity};

pub(crate) const DEFAULT_LAST_RESORT_USER_ID: Id = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Options {
    /// The user to look up when neither the token nor the cached hint
    /// identify anyone. `None` skips the lookup entirely.
    pub(crate) last_resort_user_id: Option<Id>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            last_resort_user_id: Some(DEFAULT_LAST_RESORT_USER_ID),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Tier {
    CurrentUser,
    CachedUserId(Id),
    LastResortUserId(Id),
}

impl Tier {
    fn plan(hint: Option<Id>, options: Options) -> Vec<Self> {
        let mut tiers = vec![Self::CurrentUser];
        if let Some(id) = hint {
            tiers.push(Self::CachedUserId(id));
        }
        if let Some(id) = options.last_resort_user_id {
            if hint != Some(id) {
                tiers.push(Self::LastResortUserId(id));
            }
        }
        tiers
    }

    async fn lookup<A: Auth + ?Sized>(self, auth: &A) -> Result<User> {
        match self {
            Self::CurrentUser => auth.current_user().await,
            Self::CachedUserId(id) | Self::LastResortUserId(id) => auth.user(id).await,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentUser => write!(f, "the current-user endpoint"),
            Self::CachedUserId(id) => write!(f, "cached user ID {id}"),
            Self::LastResortUserId(id) => write!(f, "last-resort user ID {id}"),
        }
    }
}

/// Works out who the stored credentials belong to.
///
/// Without a stored token this returns `None` and talks to nobody. With one,
/// each lookup in [`Tier::plan`] is tried in turn until one succeeds, and the
/// resolved user's ID is written back as the hint for the next run. If every
/// lookup fails, the stored session is cleared and the user is told it
/// expired.
pub(crate) async fn resolve<S, A, N>(
    storage: &mut S,
    auth: &mut A,
    notify: &N,
    options: Options,
) -> Option<Identity>
where
    S: Storage<Data> + ?Sized,
    A: Auth + ?Sized,
    N: Notify + ?Sized,
{
    let data = match storage.get().await {
        Ok(data) => data.unwrap_or_default(),
        Err(e) => {
            warn!("We could not read the stored session, so we will treat it as missing: {e}");
            Data::default()
        }
    };

    let Some(token) = data.token().cloned() else {
        debug!("No stored token, so nobody is logged in");
        return None;
    };
    auth.set_token(Some(token));

    for tier in Tier::plan(data.user_id(), options) {
        match tier.lookup(auth).await {
            Ok(user) => {
                let identity = Identity::from(user);
                if let Tier::LastResortUserId(_) = tier {
                    warn!(
                        "We resolved the session to {} only through {}; this user was not derived from the stored credentials",
                        identity.username, tier
                    );
                } else {
                    info!("Resolved the session to {} through {}", identity.username, tier);
                }

                let mut updated = data.clone();
                updated.set_user_id(identity.id);
                if let Err(e) = storage.update(&updated).await {
                    warn!("We could not cache the resolved user ID: {e}");
                }
                return Some(identity);
            }
            Err(e) => warn!("Looking up the session user through {tier} failed: {e}"),
        }
    }

    if let Err(e) = storage.clear().await {
        warn!("We could not remove the expired session: {e}");
    }
    auth.set_token(None);
    notify.notify(Notice::error(notice::SESSION_EXPIRED));
    None
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use crate::{
        client::{
            fake::{user, Call, Fake},
            ROLE_TEAM_MEMBER,
        },
        notice::recorder::Recorder,
        storage::{File, Memory},
    };

    use super::*;

    fn stored(user_id: Option<&str>) -> Memory<Data> {
        Memory::with(Data {
            token: Some(SecretString::new("abc".to_owned())),
            user_id: user_id.map(str::to_owned),
        })
    }

    async fn stored_user_id(storage: &mut Memory<Data>) -> Option<String> {
        storage.get().await.ok().flatten().and_then(|d| d.user_id)
    }

    #[tokio::test]
    async fn no_token_makes_no_calls() {
        let mut storage = Memory::<Data>::new();
        let mut auth = Fake::default().with_current_user(user(7, "ana", &[]));
        let notices = Recorder::default();

        let identity = resolve(&mut storage, &mut auth, &notices, Options::default()).await;

        assert_eq!(identity, None);
        assert!(auth.calls().is_empty());
        assert!(notices.notices().is_empty());
    }

    #[tokio::test]
    async fn blank_token_makes_no_calls() {
        let mut storage = Memory::with(Data {
            token: Some(SecretString::new(String::new())),
            user_id: None,
        });
        let mut auth = Fake::default().with_user(user(1, "admin", &[]));
        let notices = Recorder::default();

        let identity = resolve(&mut storage, &mut auth, &notices, Options::default()).await;

        assert_eq!(identity, None);
        assert!(auth.calls().is_empty());
        assert!(notices.notices().is_empty());
    }

    #[tokio::test]
    async fn unreadable_storage_counts_as_no_token() -> Result<()> {
        let path = std::env::temp_dir()
            .join(format!("teamflow-{}", std::process::id()))
            .join("corrupt-session.json");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, "{\"token\": ")?;

        let mut storage = File::at(&path);
        let mut auth = Fake::default().with_user(user(1, "admin", &[]));
        let notices = Recorder::default();

        let identity = resolve(&mut storage, &mut auth, &notices, Options::default()).await;

        assert_eq!(identity, None);
        assert!(auth.calls().is_empty());
        assert!(notices.notices().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn current_user_wins_and_is_cached() {
        let mut storage = stored(None);
        let mut auth = Fake::default()
            .with_current_user(user(7, "ana", &[ROLE_TEAM_MEMBER]))
            .with_user(user(1, "admin", &[]));
        let notices = Recorder::default();

        let identity = resolve(&mut storage, &mut auth, &notices, Options::default()).await;

        assert_eq!(identity, Some(Identity::from(user(7, "ana", &[ROLE_TEAM_MEMBER]))));
        assert_eq!(auth.calls(), vec![Call::CurrentUser]);
        assert_eq!(auth.token().as_deref(), Some("abc"));
        assert_eq!(stored_user_id(&mut storage).await.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn cached_user_id_is_second() {
        let mut storage = stored(Some("9"));
        let mut auth = Fake::default()
            .with_user(user(9, "bo", &[]))
            .with_user(user(1, "admin", &[]));
        let notices = Recorder::default();

        let identity = resolve(&mut storage, &mut auth, &notices, Options::default()).await;

        assert_eq!(identity.map(|i| i.id), Some(9));
        assert_eq!(auth.calls(), vec![Call::CurrentUser, Call::User(9)]);
        assert_eq!(stored_user_id(&mut storage).await.as_deref(), Some("9"));
    }

    #[tokio::test]
    async fn last_resort_without_hint() {
        let mut storage = stored(None);
        let mut auth = Fake::default().with_user(user(1, "admin", &[]));
        let notices = Recorder::default();

        let identity = resolve(&mut storage, &mut auth, &notices, Options::default()).await;

        assert_eq!(identity.map(|i| i.id), Some(1));
        assert_eq!(auth.calls(), vec![Call::CurrentUser, Call::User(1)]);
        assert_eq!(stored_user_id(&mut storage).await.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn last_resort_after_cached_id_fails() {
        let mut storage = stored(Some("9"));
        let mut auth = Fake::default().with_user(user(1, "admin", &[]));
        let notices = Recorder::default();

        let identity = resolve(&mut storage, &mut auth, &notices, Options::default()).await;

        assert_eq!(identity.map(|i| i.id), Some(1));
        assert_eq!(
            auth.calls(),
            vec![Call::CurrentUser, Call::User(9), Call::User(1)]
        );
    }

    #[tokio::test]
    async fn malformed_hint_goes_straight_to_last_resort() {
        let mut storage = stored(Some("not a number"));
        let mut auth = Fake::default();
        let notices = Recorder::default();

        let _ = resolve(&mut storage, &mut auth, &notices, Options::default()).await;

        assert_eq!(auth.calls(), vec![Call::CurrentUser, Call::User(1)]);
    }

    #[tokio::test]
    async fn hint_equal_to_last_resort_is_tried_once() {
        let mut storage = stored(Some("1"));
        let mut auth = Fake::default();
        let notices = Recorder::default();

        let _ = resolve(&mut storage, &mut auth, &notices, Options::default()).await;

        assert_eq!(auth.calls(), vec![Call::CurrentUser, Call::User(1)]);
    }

    #[tokio::test]
    async fn disabled_last_resort_is_skipped() {
        let mut storage = stored(None);
        let mut auth = Fake::default().with_user(user(1, "admin", &[]));
        let notices = Recorder::default();
        let options = Options {
            last_resort_user_id: None,
        };

        let identity = resolve(&mut storage, &mut auth, &notices, options).await;

        assert_eq!(identity, None);
        assert_eq!(auth.calls(), vec![Call::CurrentUser]);
    }

    #[tokio::test]
    async fn total_failure_clears_session() {
        let mut storage = stored(Some("9"));
        let mut auth = Fake::default();
        let notices = Recorder::default();

        let identity = resolve(&mut storage, &mut auth, &notices, Options::default()).await;

        assert_eq!(identity, None);
        assert!(storage.get().await.ok().flatten().is_none());
        assert_eq!(auth.token(), None);
        assert_eq!(notices.messages(), vec![notice::SESSION_EXPIRED.to_owned()]);
        assert_eq!(notices.notices()[0].level, notice::Level::Error);
    }

    #[test]
    fn plan_orders_tiers() {
        assert_eq!(
            Tier::plan(Some(9), Options::default()),
            vec![
                Tier::CurrentUser,
                Tier::CachedUserId(9),
                Tier::LastResortUserId(DEFAULT_LAST_RESORT_USER_ID)
            ]
        );
        assert_eq!(
            Tier::plan(None, Options { last_resort_user_id: None }),
            vec![Tier::CurrentUser]
        );
    }
}
