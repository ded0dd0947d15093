// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Clients for reading data from the Gab API.

use crate::clock::{DateWindow, NaiveDate};
use crate::conf::{ConfigFile, Credentials};
use crate::dispatch::{Harvester, SearchType};
use crate::error::Result;
use crate::gab::paginate::{Account, Paginator, Resource, Statuses};
use crate::gab::service::{GabService, Service, Tolerance};
use crate::stream::Limit;
use std::path::PathBuf;

/// Everything needed to connect to Gab.
#[derive(Clone, Debug, Default)]
pub struct ClientSettings {
    /// Account name; falls back to the environment and then the profile.
    pub user_account: Option<String>,

    /// Account password; falls back to the environment and then the profile.
    pub user_password: Option<String>,

    /// Retry tolerances for failed requests.
    pub tolerance: Tolerance,

    /// Configuration file; defaults to [`ConfigFile::default_path()`].
    pub config: Option<PathBuf>,

    /// Named profile within the configuration file.
    pub profile: String,
}

/// Retrieves posts, comments, and accounts from Gab.
///
/// Every retrieval method returns a lazy [`Paginator`]; nothing is
/// requested from Gab until records are pulled from it.
#[derive(Clone, Debug)]
pub struct GabClient<S: Service = GabService> {
    service: S,
}

impl GabClient<GabService> {
    /// Logs in to Gab using the credentials in `settings`.
    ///
    /// Returns an [`enum@crate::Error`] if credentials cannot be found or
    /// the login fails.
    pub async fn connect(settings: &ClientSettings) -> Result<Self> {
        let config = ConfigFile::load_or_default(settings.config.as_deref())?;
        let profile = config.profile(&settings.profile);
        let credentials = Credentials::resolve(
            settings.user_account.as_deref(),
            settings.user_password.as_deref(),
            &profile,
        )?;
        let service =
            GabService::login(&credentials, profile.user_agent.as_deref(), settings.tolerance)
                .await?;
        Ok(Self::with_service(service))
    }
}

impl<S: Service> GabClient<S> {
    /// Creates a client that uses `service` to talk to Gab.
    pub fn with_service(service: S) -> Self {
        Self { service }
    }

    fn paginate(&self, resource: Resource) -> Paginator<S> {
        Paginator::new(self.service.clone(), resource)
    }
}

fn account(username: &str) -> Account {
    Account::Name(username.to_string())
}

impl<S: Service> Harvester for GabClient<S> {
    type Records = Paginator<S>;

    fn search(
        &self,
        query: &str,
        search_type: SearchType,
        limit: Limit,
        window: DateWindow,
    ) -> Paginator<S> {
        self.paginate(Resource::Search {
            query: query.to_string(),
            search_type,
        })
        .limit(limit)
        .within(window)
    }

    fn user(&self, username: &str) -> Paginator<S> {
        self.paginate(Resource::Profile(username.to_string()))
    }

    fn userposts(&self, username: &str, limit: Limit, after: NaiveDate) -> Paginator<S> {
        self.paginate(Resource::Statuses(account(username), Statuses::Posts))
            .limit(limit)
            .within(DateWindow::starting(after))
    }

    fn usercomments(&self, username: &str, limit: Limit, window: DateWindow) -> Paginator<S> {
        self.paginate(Resource::Statuses(account(username), Statuses::Comments))
            .limit(limit)
            .within(window)
    }

    fn followers(&self, username: &str) -> Paginator<S> {
        self.paginate(Resource::Followers(account(username)))
    }

    fn following(&self, username: &str) -> Paginator<S> {
        self.paginate(Resource::Following(account(username)))
    }

    fn top(&self, timespan: Option<&str>) -> Paginator<S> {
        self.paginate(Resource::Top(timespan.map(String::from)))
    }
}
