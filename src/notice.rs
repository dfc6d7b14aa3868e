// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Short user-facing messages about what just happened to the session or to
//! the data being worked on.

use std::fmt;

pub(crate) const SESSION_EXPIRED: &str = "Session expired. Please log in again.";
pub(crate) const ACCESS_DENIED: &str =
    "Access denied. You do not have permission to view this page.";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Level {
    Info,
    Success,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "Info",
            Self::Success => "Success",
            Self::Error => "Error",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Notice {
    pub(crate) level: Level,
    pub(crate) message: String,
}

impl Notice {
    pub(crate) fn info<S: Into<String>>(message: S) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub(crate) fn success<S: Into<String>>(message: S) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub(crate) fn error<S: Into<String>>(message: S) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

pub(crate) trait Notify: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl<T: Notify + ?Sized> Notify for Box<T> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Writes notices to standard error so they never mix with table output.
pub(crate) struct Terminal;

impl Notify for Terminal {
    fn notify(&self, notice: Notice) {
        eprintln!("{}: {}", notice.level, notice.message);
    }
}

#[cfg(test)]
pub(crate) mod recorder {
    use std::sync::{Arc, Mutex};

    use super::{Notice, Notify};

    #[derive(Clone, Default)]
    pub(crate) struct Recorder {
        notices: Arc<Mutex<Vec<Notice>>>,
    }

    impl Recorder {
        pub(crate) fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }

        pub(crate) fn messages(&self) -> Vec<String> {
            self.notices().into_iter().map(|n| n.message).collect()
        }
    }

    impl Notify for Recorder {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }
}
