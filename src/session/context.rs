// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use log::{debug, info, warn};
use secrecy::SecretString;

use crate::{
    client::Client,
    error::{self, Result},
    notice::{self, Notice, Notify},
    password::{self, Prompt},
    route::{self, Route},
    storage::{IsPersistent as _, Storage},
};

use super::{resolver, Data, Identity};

/// Everything a view needs to know about the session, owned in one place.
///
/// The stored session is only read and written through this type, so the
/// token sent to the backend always matches the identity it resolved to.
pub(crate) struct Context {
    storage: Box<dyn Storage<Data>>,
    client: Box<dyn Client>,
    notifier: Box<dyn Notify>,
    prompt: Box<dyn Prompt>,
    identity: Option<Identity>,
}

impl Context {
    /// Resolves the stored session. This is the only place the resolver runs.
    pub(crate) async fn start(
        mut storage: Box<dyn Storage<Data>>,
        mut client: Box<dyn Client>,
        notifier: Box<dyn Notify>,
        prompt: Box<dyn Prompt>,
        options: resolver::Options,
    ) -> Self {
        let identity = resolver::resolve(&mut *storage, &mut *client, &*notifier, options).await;
        Self {
            storage,
            client,
            notifier,
            prompt,
            identity,
        }
    }

    pub(crate) const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub(crate) fn client(&self) -> &dyn Client {
        &*self.client
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    pub(crate) fn navigate(&self, requested: Route) -> Route {
        route::navigate(self.identity.as_ref(), requested, &*self.notifier)
    }

    pub(crate) async fn password(&self, req: password::Request) -> Result<SecretString> {
        self.prompt
            .prompt(req)
            .await?
            .ok_or_else(|| error::Password::NoPrompt.into())
    }

    pub(crate) async fn login(&mut self, username: &str, password: &SecretString) -> Result<&Identity> {
        let resp = match self.client.login(username, password).await {
            Ok(resp) => resp,
            Err(e) => {
                debug!("Login for {} failed: {}", username, e);
                self.notify(Notice::error("Login failed: Invalid credentials"));
                return Err(e);
            }
        };

        let (token, identity) = resp.into_parts();
        self.storage
            .update(&Data::new(token.clone(), identity.id))
            .await?;
        self.client.set_token(Some(token));
        if !self.storage.is_persistent() {
            warn!("This session is only kept in memory and ends when the command exits");
        }
        info!("Logged in as {}", identity.username);
        self.notify(Notice::success("Logged in successfully!"));
        Ok(self.identity.insert(identity))
    }

    pub(crate) async fn logout(&mut self) -> Result<()> {
        self.forget().await?;
        self.notify(Notice::info("Logged out successfully"));
        Ok(())
    }

    /// Drops the session after the backend refused our token.
    pub(crate) async fn expire(&mut self) {
        if let Err(e) = self.forget().await {
            warn!("We could not remove the expired session: {e}");
        }
        self.notify(Notice::error(notice::SESSION_EXPIRED));
    }

    /// Passes `result` through, expiring the session first if it is an
    /// authorization failure.
    pub(crate) async fn checked<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_unauthorized() {
                self.expire().await;
            }
        }
        result
    }

    async fn forget(&mut self) -> Result<()> {
        self.identity = None;
        self.client.set_token(None);
        self.storage.clear().await
    }
}
