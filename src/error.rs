// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Errors raised while harvesting.

use crate::dispatch::CommandName;
use crate::http::HTTPError;
use thiserror::Error;

/// A harvesting error.
#[derive(Debug, Error)]
pub enum Error {
    /// The command is not one garc knows how to run.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The command needs a query (usually a username) but none was given.
    #[error("The {0} command requires a query")]
    MissingQuery(CommandName),

    /// The query is not a valid Gab username.
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// A record lacks a field that the active content key needs.
    #[error("Record is missing the '{0}' field")]
    MissingField(String),

    /// A record field holds a value of the wrong JSON type.
    #[error("Record field '{field}' is not a {expected}")]
    UnexpectedFieldType {
        /// Name of the offending field.
        field: String,
        /// The JSON type that was expected.
        expected: &'static str,
    },

    /// No account name or password could be found.
    #[error("Missing {0}; run `garc configure` or pass it on the command line")]
    MissingCredentials(String),

    /// The configuration file could not be read or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error from the underlying HTTP service.
    #[error("Service error: {0}")]
    Http(#[from] HTTPError),

    /// An API response or record could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Output could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Standard result type for garc operations.
pub type Result<T> = std::result::Result<T, Error>;
