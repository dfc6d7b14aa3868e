// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{ffi::OsString, path::Path};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::task;

use crate::{error::Result, metadata};

#[derive(Debug, Clone)]
pub(crate) struct Request {
    username: String,
    confirm: bool,
}

impl Request {
    pub(crate) fn login(username: &str) -> Self {
        Self {
            username: username.to_owned(),
            confirm: false,
        }
    }

    /// Asks for the password twice, for new accounts.
    pub(crate) fn signup(username: &str) -> Self {
        Self {
            username: username.to_owned(),
            confirm: true,
        }
    }
}

#[async_trait]
pub(crate) trait Prompt: Send + Sync {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>>;
}

#[async_trait]
impl<T: Prompt + ?Sized> Prompt for Box<T> {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        (**self).prompt(req).await
    }
}

#[async_trait]
impl<T: Prompt> Prompt for Vec<T> {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        for candidate in self {
            if let r @ (Ok(Some(_)) | Err(_)) = candidate.prompt(req.clone()).await {
                return r;
            }
        }

        Ok(None)
    }
}

pub(crate) struct PinentryPrompt {
    executable: Option<OsString>,
}

impl PinentryPrompt {
    pub(crate) const fn new() -> Self {
        Self { executable: None }
    }

    pub(crate) fn new_with_executable<P: AsRef<Path>>(executable: P) -> Self {
        Self {
            executable: Some(executable.as_ref().as_os_str().into()),
        }
    }
}

#[async_trait]
impl Prompt for PinentryPrompt {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        fn interact<'input>(
            mut input: pinentry::PassphraseInput<'input>,
            title: &'input str,
            description: &'input str,
            confirm: bool,
        ) -> Result<SecretString> {
            _ = input.required("A password is required to continue.");
            _ = input.with_title(title);
            _ = input.with_description(description);
            _ = input.with_prompt("Password");
            if confirm {
                _ = input.with_confirmation("Repeat", "The passwords do not match.");
            }

            Ok(input.interact()?)
        }

        let title = format!("Password - {}", *metadata::CLIENT_DISPLAY_NAME);
        let description = format!("Enter the password for {}.", req.username);
        let confirm = req.confirm;

        let input = self
            .executable
            .as_ref()
            .and_then(pinentry::PassphraseInput::with_binary)
            .or_else(pinentry::PassphraseInput::with_default_binary)
            .map(|input| {
                task::spawn_blocking(move || interact(input, &title, &description, confirm))
            });

        Ok(match input {
            Some(fut) => Some(fut.await??),
            None => None,
        })
    }
}

pub(crate) struct RpasswordPrompt;

#[async_trait]
impl Prompt for RpasswordPrompt {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        let prompt = format!("Password for {}: ", req.username);
        let password = task::spawn_blocking(move || -> std::io::Result<Option<String>> {
            let first = rpassword::prompt_password(&prompt)?;
            if req.confirm && rpassword::prompt_password("Repeat password: ")? != first {
                eprintln!("Error: The passwords do not match.");
                return Ok(None);
            }
            Ok(Some(first))
        })
        .await??;

        Ok(password.map(SecretString::new))
    }
}

#[cfg(test)]
pub(crate) struct Fixed(pub(crate) &'static str);

#[cfg(test)]
#[async_trait]
impl Prompt for Fixed {
    async fn prompt(&self, _req: Request) -> Result<Option<SecretString>> {
        Ok(Some(SecretString::new(self.0.to_owned())))
    }
}
