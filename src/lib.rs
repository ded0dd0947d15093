// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! garc is a command-line tool for archiving data from [Gab]. It logs in
//! to a Gab account, pages through search results, timelines, comments,
//! or follower lists, and writes every record it finds as a line of JSON,
//! either to standard output or to a file.
//!
//! When output goes to a file, the file is renamed after the harvest
//! finishes so that its name records how many records it holds:
//! `--output gabs.jsonl` leaves behind `gabs.jsonl_gabCount_40` after
//! harvesting 40 records.
//!
//! # Examples
//!
//! (In all examples, replace `username` with the actual username of a
//! Gab account.)
//!
//! Store your account name and password:
//!
//! ```bash
//! garc configure
//! ```
//!
//! Search for posts:
//!
//! ```bash
//! garc search "make america great again" --output search.jsonl
//! ```
//!
//! Save the text of a user's last 40 comments, without markup:
//!
//! ```bash
//! garc usercomments username --number_gabs=40 --content_key=content
//! ```
//!
//! Save a user's posts since the start of 2020:
//!
//! ```bash
//! garc userposts username --gabs_after=2020-01-01
//! ```
//!
//! Retrieve a user's profile, followers, or the accounts they follow:
//!
//! ```bash
//! garc user username
//! garc followers username
//! garc following username
//! ```
//!
//! Show today's most popular posts:
//!
//! ```bash
//! garc top day
//! ```
//!
//! # Configuration
//!
//! Credentials are read from the command line (`--user_account`,
//! `--user_password`), then from `$GAB_USER_ACCOUNT` and
//! `$GAB_USER_PASSWORD`, then from a profile in `~/.garc.toml`. See
//! [`conf`] for the file format.
//!
//! # License
//!
//! garc is licensed under the terms of the [Apache License 2.0]. Please
//! see the LICENSE file accompanying this source code or visit the previous
//! link for more information on licensing.
//!
//! [Apache License 2.0]: https://www.apache.org/licenses/LICENSE-2.0
//! [Gab]: https://gab.com

pub mod cli;
pub mod clock;
pub mod conf;
pub mod dispatch;
pub mod error;
pub mod gab;
pub mod http;
pub mod logging;
pub mod output;
pub mod record;
pub mod stream;
pub mod text;

pub use error::{Error, Result};

#[cfg(test)]
mod test_utils;
