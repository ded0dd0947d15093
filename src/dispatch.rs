// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Maps command names to retrievals.
//!
//! The command line names a command and, usually, a query. [`Command::parse`]
//! validates that pair and produces either one of the setup commands or a
//! [`Request`], which carries exactly the arguments its retrieval needs.
//! [`Request::dispatch`] then hands the request to a [`Harvester`], which
//! returns a lazy [`RecordSource`].

use crate::clock::{DateWindow, NaiveDate};
use crate::error::{Error, Result};
use crate::stream::{Limit, RecordSource};
use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

/// How search results are ordered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SearchType {
    /// Newest results first.
    #[default]
    Date,
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchType::Date => write!(f, "date"),
        }
    }
}

/// Something that can retrieve records from Gab, one capability per
/// retrieval command.
pub trait Harvester {
    /// The lazy sequence of records each capability returns.
    type Records: RecordSource;

    /// Posts matching `query`.
    fn search(
        &self,
        query: &str,
        search_type: SearchType,
        limit: Limit,
        window: DateWindow,
    ) -> Self::Records;

    /// A single account's profile.
    fn user(&self, username: &str) -> Self::Records;

    /// An account's posts, newest first, back to `after`.
    fn userposts(&self, username: &str, limit: Limit, after: NaiveDate) -> Self::Records;

    /// An account's comments, newest first, within `window`.
    fn usercomments(&self, username: &str, limit: Limit, window: DateWindow) -> Self::Records;

    /// Accounts following `username`.
    fn followers(&self, username: &str) -> Self::Records;

    /// Accounts `username` follows.
    fn following(&self, username: &str) -> Self::Records;

    /// Popular posts, optionally limited to a timespan.
    fn top(&self, timespan: Option<&str>) -> Self::Records;
}

/// Every command garc understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandName {
    Configure,
    UserAgent,
    Help,
    Version,
    Search,
    User,
    UserPosts,
    UserComments,
    Followers,
    Following,
    Top,
}

impl CommandName {
    /// All commands, in the order they are listed in usage text.
    pub const ALL: [CommandName; 11] = [
        CommandName::Configure,
        CommandName::UserAgent,
        CommandName::Help,
        CommandName::Version,
        CommandName::Search,
        CommandName::User,
        CommandName::UserPosts,
        CommandName::UserComments,
        CommandName::Followers,
        CommandName::Following,
        CommandName::Top,
    ];

    /// The name typed on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::Configure => "configure",
            CommandName::UserAgent => "user_agent",
            CommandName::Help => "help",
            CommandName::Version => "version",
            CommandName::Search => "search",
            CommandName::User => "user",
            CommandName::UserPosts => "userposts",
            CommandName::UserComments => "usercomments",
            CommandName::Followers => "followers",
            CommandName::Following => "following",
            CommandName::Top => "top",
        }
    }

    /// True if the command cannot run without a query.
    pub fn requires_query(&self) -> bool {
        matches!(
            self,
            CommandName::Search
                | CommandName::User
                | CommandName::UserPosts
                | CommandName::UserComments
                | CommandName::Followers
                | CommandName::Following
        )
    }

    /// True if the command's query is a username.
    pub fn takes_username(&self) -> bool {
        self.requires_query() && *self != CommandName::Search
    }
}

impl FromStr for CommandName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CommandName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options shared by the retrieval commands that use them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Maximum number of records to retrieve.
    pub limit: Limit,

    /// Only retrieve records created within this window.
    pub window: DateWindow,

    /// How search results are ordered.
    pub search_type: SearchType,
}

/// A retrieval, with exactly the arguments it needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Search {
        query: String,
        search_type: SearchType,
        limit: Limit,
        window: DateWindow,
    },
    User {
        username: String,
    },
    UserPosts {
        username: String,
        limit: Limit,
        after: NaiveDate,
    },
    UserComments {
        username: String,
        limit: Limit,
        window: DateWindow,
    },
    Followers {
        username: String,
    },
    Following {
        username: String,
    },
    Top {
        timespan: Option<String>,
    },
}

impl Request {
    /// Starts the retrieval on `harvester`.
    ///
    /// No records are fetched until the returned source is read.
    pub fn dispatch<H: Harvester>(&self, harvester: &H) -> H::Records {
        match self {
            Request::Search {
                query,
                search_type,
                limit,
                window,
            } => harvester.search(query, *search_type, *limit, *window),
            Request::User { username } => harvester.user(username),
            Request::UserPosts {
                username,
                limit,
                after,
            } => harvester.userposts(username, *limit, *after),
            Request::UserComments {
                username,
                limit,
                window,
            } => harvester.usercomments(username, *limit, *window),
            Request::Followers { username } => harvester.followers(username),
            Request::Following { username } => harvester.following(username),
            Request::Top { timespan } => harvester.top(timespan.as_deref()),
        }
    }
}

/// A validated command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Interactively store account credentials.
    Configure,

    /// Generate and store a device identifier.
    UserAgent,

    /// Show usage.
    Help,

    /// Show the program version.
    Version,

    /// Retrieve records.
    Retrieve(Request),
}

impl Command {
    /// Validates a command name and query.
    ///
    /// A missing command is treated as `help`. An empty query is treated
    /// as no query at all.
    ///
    /// Returns [`Error::UnknownCommand`] if `name` is not a command,
    /// [`Error::MissingQuery`] if the command needs a query and none was
    /// given, or [`Error::InvalidUsername`] if the query should be a
    /// username and is not.
    pub fn parse(name: Option<&str>, query: Option<&str>, options: &Options) -> Result<Self> {
        let name = match name {
            Some(name) => name.parse()?,
            None => CommandName::Help,
        };
        let query = query.filter(|q| !q.is_empty()).map(String::from);

        let query = match query {
            Some(query) => Some(query),
            None if name.requires_query() => return Err(Error::MissingQuery(name)),
            None => None,
        };
        if let Some(username) = query.as_deref()
            && name.takes_username()
            && !is_username(username)
        {
            return Err(Error::InvalidUsername(username.to_string()));
        }
        // Everything past this point that needs a query has one.
        let required = || query.clone().unwrap_or_default();

        let command = match name {
            CommandName::Configure => Command::Configure,
            CommandName::UserAgent => Command::UserAgent,
            CommandName::Help => Command::Help,
            CommandName::Version => Command::Version,
            CommandName::Search => Command::Retrieve(Request::Search {
                query: required(),
                search_type: options.search_type,
                limit: options.limit,
                window: options.window,
            }),
            CommandName::User => Command::Retrieve(Request::User {
                username: required(),
            }),
            CommandName::UserPosts => Command::Retrieve(Request::UserPosts {
                username: required(),
                limit: options.limit,
                after: options.window.after(),
            }),
            CommandName::UserComments => Command::Retrieve(Request::UserComments {
                username: required(),
                limit: options.limit,
                window: options.window,
            }),
            CommandName::Followers => Command::Retrieve(Request::Followers {
                username: required(),
            }),
            CommandName::Following => Command::Retrieve(Request::Following {
                username: required(),
            }),
            CommandName::Top => Command::Retrieve(Request::Top {
                timespan: query.clone(),
            }),
        };
        Ok(command)
    }
}

/// Gab usernames are made of ASCII letters, digits, and underscores.
fn is_username(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validates `name` and `query` and starts the matching retrieval on
/// `harvester`.
///
/// Setup commands (`configure`, `user_agent`, `help`, `version`) do not
/// retrieve anything and are reported as [`Error::UnknownCommand`] here;
/// callers that handle them should use [`Command::parse`] directly.
pub fn dispatch<H: Harvester>(
    harvester: &H,
    name: &str,
    query: Option<&str>,
    options: &Options,
) -> Result<H::Records> {
    match Command::parse(Some(name), query, options)? {
        Command::Retrieve(request) => Ok(request.dispatch(harvester)),
        _ => Err(Error::UnknownCommand(name.to_string())),
    }
}
