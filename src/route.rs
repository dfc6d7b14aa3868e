// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use log::{debug, warn};

use crate::{
    client::{Id, ROLE_PROJECT_MANAGER},
    notice::{self, Notice, Notify},
    session::{
        guard::{self, Decision},
        Identity,
    },
};

/// Following more redirects than this means the routing table has a cycle.
const MAX_REDIRECTS: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Route {
    Root,
    Login,
    Signup,
    Dashboard,
    Projects,
    Project(Id),
    Tasks,
    Task(Id),
    Users,
    Profile,
}

impl Route {
    pub(crate) const fn required_role(self) -> Option<&'static str> {
        match self {
            Self::Users => Some(ROLE_PROJECT_MANAGER),
            Self::Root
            | Self::Login
            | Self::Signup
            | Self::Dashboard
            | Self::Projects
            | Self::Project(_)
            | Self::Tasks
            | Self::Task(_)
            | Self::Profile => None,
        }
    }

    fn decide(self, identity: Option<&Identity>) -> Navigation {
        match self {
            Self::Root => Navigation::Redirect(if identity.is_some() {
                Self::Dashboard
            } else {
                Self::Login
            }),
            Self::Login | Self::Signup if identity.is_some() => {
                Navigation::Redirect(Self::Dashboard)
            }
            Self::Login | Self::Signup => Navigation::Render,
            Self::Dashboard
            | Self::Projects
            | Self::Project(_)
            | Self::Tasks
            | Self::Task(_)
            | Self::Users
            | Self::Profile => match guard::check(identity, self.required_role()) {
                Decision::Render(_) => Navigation::Render,
                Decision::RedirectToLogin => Navigation::Redirect(Self::Login),
                Decision::Deny => Navigation::Denied(Self::Dashboard),
            },
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "/"),
            Self::Login => write!(f, "/login"),
            Self::Signup => write!(f, "/signup"),
            Self::Dashboard => write!(f, "/dashboard"),
            Self::Projects => write!(f, "/projects"),
            Self::Project(id) => write!(f, "/projects/{id}"),
            Self::Tasks => write!(f, "/tasks"),
            Self::Task(id) => write!(f, "/tasks/{id}"),
            Self::Users => write!(f, "/users"),
            Self::Profile => write!(f, "/profile"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Navigation {
    Render,
    Redirect(Route),
    Denied(Route),
}

/// Evaluates the guard for `requested` and follows redirects, returning the
/// route whose view should actually run.
pub(crate) fn navigate<N: Notify + ?Sized>(
    identity: Option<&Identity>,
    requested: Route,
    notify: &N,
) -> Route {
    let mut route = requested;
    for _ in 0..MAX_REDIRECTS {
        match route.decide(identity) {
            Navigation::Render => return route,
            Navigation::Redirect(to) => {
                debug!("Redirecting from {} to {}", route, to);
                route = to;
            }
            Navigation::Denied(to) => {
                warn!(
                    "Access to {} requires {}; redirecting to {}",
                    route,
                    route.required_role().unwrap_or_default(),
                    to
                );
                notify.notify(Notice::error(notice::ACCESS_DENIED));
                route = to;
            }
        }
    }

    warn!("Too many redirects starting from {}", requested);
    Route::Login
}

#[cfg(test)]
mod tests {
    use crate::{
        client::{fake::user, ROLE_TEAM_MEMBER},
        notice::recorder::Recorder,
    };

    use super::*;

    #[test]
    fn anonymous_users_land_on_login() {
        let notices = Recorder::default();
        for route in [
            Route::Root,
            Route::Dashboard,
            Route::Project(3),
            Route::Task(4),
            Route::Users,
            Route::Profile,
        ] {
            assert_eq!(navigate(None, route, &notices), Route::Login);
        }
        assert!(notices.notices().is_empty());
    }

    #[test]
    fn team_member_is_denied_user_management() {
        let notices = Recorder::default();
        let member = Identity::from(user(7, "ana", &[ROLE_TEAM_MEMBER]));

        assert_eq!(
            navigate(Some(&member), Route::Users, &notices),
            Route::Dashboard
        );
        assert_eq!(notices.messages(), vec![notice::ACCESS_DENIED.to_owned()]);
    }

    #[test]
    fn manager_reaches_user_management() {
        let notices = Recorder::default();
        let manager = Identity::from(user(2, "max", &[ROLE_PROJECT_MANAGER]));

        assert_eq!(navigate(Some(&manager), Route::Users, &notices), Route::Users);
        assert!(notices.notices().is_empty());
    }

    #[test]
    fn public_routes_bounce_logged_in_users() {
        let notices = Recorder::default();
        let member = Identity::from(user(7, "ana", &[]));

        assert_eq!(navigate(Some(&member), Route::Login, &notices), Route::Dashboard);
        assert_eq!(navigate(Some(&member), Route::Signup, &notices), Route::Dashboard);
        assert_eq!(navigate(Some(&member), Route::Root, &notices), Route::Dashboard);
        assert_eq!(navigate(None, Route::Signup, &notices), Route::Signup);
    }

    #[test]
    fn guard_is_reevaluated_per_navigation() {
        let notices = Recorder::default();
        let member = Identity::from(user(7, "ana", &[]));

        assert_eq!(navigate(Some(&member), Route::Tasks, &notices), Route::Tasks);
        assert_eq!(navigate(None, Route::Tasks, &notices), Route::Login);
    }
}
