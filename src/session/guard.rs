// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use super::Identity;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Decision<'identity> {
    /// Show the view to this user.
    Render(&'identity Identity),
    /// Nobody is logged in.
    RedirectToLogin,
    /// Someone is logged in but lacks the role; send them to the dashboard.
    Deny,
}

pub(crate) fn check<'identity>(
    identity: Option<&'identity Identity>,
    required_role: Option<&str>,
) -> Decision<'identity> {
    match (identity, required_role) {
        (None, _) => Decision::RedirectToLogin,
        (Some(identity), Some(role)) if !identity.has_role(role) => Decision::Deny,
        (Some(identity), _) => Decision::Render(identity),
    }
}
