// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

mod context;
pub(crate) mod guard;
mod resolver;

use log::debug;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use crate::client::{Id, Roles, User};

pub(crate) use context::Context;
#[cfg(test)]
pub(crate) use context::tests as testing;
pub(crate) use resolver::{Options, DEFAULT_LAST_RESORT_USER_ID};

/// The user the backend has confirmed we are acting as. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Identity {
    pub(crate) id: Id,
    pub(crate) username: String,
    pub(crate) roles: Roles,
}

impl Identity {
    pub(crate) fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl From<User> for Identity {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            username: value.username,
            roles: value.roles,
        }
    }
}

fn serialize_token<S: Serializer>(
    token: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    token
        .as_ref()
        .map(|t| t.expose_secret().as_str())
        .serialize(serializer)
}

/// What survives between runs: the bearer token and the id of the user it
/// last resolved to, kept as a decimal string.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Data {
    #[serde(default, serialize_with = "serialize_token")]
    token: Option<SecretString>,
    #[serde(default)]
    user_id: Option<String>,
}

impl Data {
    pub(crate) fn new(token: SecretString, user_id: Id) -> Self {
        Self {
            token: Some(token),
            user_id: Some(user_id.to_string()),
        }
    }

    /// The stored token, unless it is missing or blank.
    pub(crate) fn token(&self) -> Option<&SecretString> {
        self.token
            .as_ref()
            .filter(|token| !token.expose_secret().trim().is_empty())
    }

    pub(crate) fn user_id(&self) -> Option<Id> {
        let raw = self.user_id.as_deref()?;
        match raw.trim().parse() {
            Ok(id) => Some(id),
            Err(e) => {
                debug!("Ignoring stored user ID {:?}: {}", raw, e);
                None
            }
        }
    }

    pub(crate) fn set_user_id(&mut self, user_id: Id) {
        self.user_id = Some(user_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Result;

    use super::*;

    #[test]
    fn data_keeps_user_id_as_string() -> Result<()> {
        let data = Data::new(SecretString::new("abc".to_owned()), 7);
        assert_eq!(
            serde_json::to_value(&data)?,
            serde_json::json!({"token": "abc", "userId": "7"})
        );
        Ok(())
    }

    #[test]
    fn malformed_user_id_is_no_hint() -> Result<()> {
        let data: Data = serde_json::from_str(r#"{"token": "abc", "userId": "seven"}"#)?;
        assert_eq!(data.token().map(|t| t.expose_secret().as_str()), Some("abc"));
        assert_eq!(data.user_id(), None);
        Ok(())
    }

    #[test]
    fn blank_token_is_no_token() -> Result<()> {
        let data: Data = serde_json::from_str(r#"{"token": "  ", "userId": "7"}"#)?;
        assert!(data.token().is_none());
        Ok(())
    }

    #[test]
    fn empty_record_has_no_token() -> Result<()> {
        let data: Data = serde_json::from_str("{}")?;
        assert!(data.token().is_none());
        assert_eq!(data.user_id(), None);
        Ok(())
    }
}
