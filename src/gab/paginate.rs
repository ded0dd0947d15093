//! Lazy pagination over Gab API resources.
//!
//! A [`Paginator`] does no work until it is asked for its first record.
//! It then fetches one page at a time, hands records out one by one, and
//! only fetches the next page once the current one has been used up.

use crate::clock::{DateWindow, Position};
use crate::dispatch::SearchType;
use crate::error::Result;
use crate::gab::service::Service;
use crate::record::Record;
use crate::stream::{Limit, RecordSource};
use log::{debug, warn};
use serde_json::Value;
use std::collections::VecDeque;

/// An account, known either by name or (once looked up) by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Account {
    /// The account's username; its id has not been looked up yet.
    Name(String),

    /// The account's numeric id, as a string.
    Id(String),
}

/// Which of an account's statuses are wanted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Statuses {
    /// Top-level posts, without replies.
    Posts,

    /// Only replies to other posts.
    Comments,
}

/// An API resource that can be paged through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    /// Full-text search for posts.
    Search {
        /// Search terms.
        query: String,
        /// How results are ordered.
        search_type: SearchType,
    },

    /// A single account's profile.
    Profile(String),

    /// An account's posts or comments.
    Statuses(Account, Statuses),

    /// Accounts following an account.
    Followers(Account),

    /// Accounts an account follows.
    Following(Account),

    /// Popular posts, optionally for a timespan such as `day` or `week`.
    Top(Option<String>),
}

impl Resource {
    fn account_mut(&mut self) -> Option<&mut Account> {
        match self {
            Resource::Statuses(account, _)
            | Resource::Followers(account)
            | Resource::Following(account) => Some(account),
            _ => None,
        }
    }

    fn path(&self) -> String {
        match self {
            Resource::Search { .. } => String::from("/api/v3/search"),
            Resource::Profile(username) => profile_path(username),
            Resource::Statuses(account, _) => format!("/api/v1/accounts/{}/statuses", account_id(account)),
            Resource::Followers(account) => format!("/api/v1/accounts/{}/followers", account_id(account)),
            Resource::Following(account) => format!("/api/v1/accounts/{}/following", account_id(account)),
            Resource::Top(_) => String::from("/api/v1/timelines/explore"),
        }
    }

    fn params(&self, cursor: &Cursor) -> Vec<(&'static str, String)> {
        let mut params = match self {
            Resource::Search { query, search_type } => vec![
                ("q", query.clone()),
                ("type", String::from("status")),
                ("sort", search_type.to_string()),
            ],
            Resource::Statuses(_, Statuses::Posts) => {
                vec![("exclude_replies", String::from("true"))]
            }
            Resource::Statuses(_, Statuses::Comments) => {
                vec![("exclude_replies", String::from("false"))]
            }
            Resource::Top(Some(timespan)) => vec![("sort_by", format!("top_{timespan}"))],
            _ => vec![],
        };
        match cursor {
            Cursor::Page(page) => params.push(("page", page.to_string())),
            Cursor::MaxId(Some(max_id)) => params.push(("max_id", max_id.clone())),
            _ => {}
        }
        params
    }

    /// Where paging starts for this resource.
    fn first_cursor(&self) -> Cursor {
        match self {
            Resource::Search { .. } => Cursor::Page(1),
            Resource::Profile(_) | Resource::Top(_) => Cursor::Once,
            _ => Cursor::MaxId(None),
        }
    }

    fn extract(&self, body: Value) -> Result<Vec<Record>> {
        let items = match (self, body) {
            (Resource::Search { .. }, Value::Object(mut fields)) => {
                fields.remove("statuses").unwrap_or(Value::Array(vec![]))
            }
            (_, body) => body,
        };
        match items {
            Value::Array(items) => items.into_iter().map(Record::from_value).collect(),
            Value::Null => Ok(vec![]),
            item => Ok(vec![Record::from_value(item)?]),
        }
    }

    fn keeps(&self, record: &Record) -> bool {
        match self {
            Resource::Statuses(_, Statuses::Comments) => record.has("in_reply_to_id"),
            _ => true,
        }
    }
}

fn profile_path(username: &str) -> String {
    format!("/api/v1/account_by_username/{username}")
}

fn account_id(account: &Account) -> &str {
    match account {
        Account::Name(name) | Account::Id(name) => name,
    }
}

/// Position in a paged resource.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Cursor {
    /// The resource is a single response.
    Once,

    /// 1-based page number.
    Page(u32),

    /// Fetch items older than this id (or the newest items if `None`).
    MaxId(Option<String>),

    /// No more pages.
    Done,
}

impl Cursor {
    fn advance(&self, page: &[Record]) -> Cursor {
        if page.is_empty() {
            return Cursor::Done;
        }
        match self {
            Cursor::Page(n) => Cursor::Page(n + 1),
            Cursor::MaxId(_) => match page.last().and_then(|r| r.id().ok()) {
                Some(id) => Cursor::MaxId(Some(id)),
                None => Cursor::Done,
            },
            Cursor::Once | Cursor::Done => Cursor::Done,
        }
    }
}

/// A lazy sequence of records from one API resource.
#[derive(Debug)]
pub struct Paginator<S: Service> {
    service: S,
    resource: Resource,
    cursor: Cursor,
    buffer: VecDeque<Record>,
    window: Option<DateWindow>,
    limit: Limit,
    yielded: usize,
    last_id: Option<String>,
}

impl<S: Service> Paginator<S> {
    /// Creates a paginator over `resource` that has not fetched anything yet.
    pub fn new(service: S, resource: Resource) -> Self {
        let cursor = resource.first_cursor();
        Self {
            service,
            resource,
            cursor,
            buffer: VecDeque::new(),
            window: None,
            limit: Limit::UNBOUNDED,
            yielded: 0,
            last_id: None,
        }
    }

    /// Only yields records created within `window`.
    ///
    /// Resources are assumed to list their newest records first, so the
    /// first record older than the window ends the sequence.
    pub fn within(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Stops fetching pages once `limit` records have been yielded.
    pub fn limit(mut self, limit: Limit) -> Self {
        self.limit = limit;
        self
    }

    /// The resource being paged through.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    async fn resolve_account(&mut self) -> Result<()> {
        let Some(account) = self.resource.account_mut() else {
            return Ok(());
        };
        if let Account::Name(username) = account {
            debug!("looking up account id for {username}");
            let body = self.service.get(&profile_path(username), &[]).await?;
            let profile = Record::from_value(serde_json::from_str(&body)?)?;
            *account = Account::Id(profile.id()?);
        }
        Ok(())
    }

    async fn fetch(&mut self) -> Result<()> {
        self.resolve_account().await?;

        let path = self.resource.path();
        let params = self.resource.params(&self.cursor);
        let body = self.service.get(&path, &params).await?;
        let page = self.resource.extract(serde_json::from_str(&body)?)?;
        debug!("fetched {} records from {path}", page.len());

        // A page ending where the last one did is the same page again.
        let last_id = page.last().and_then(|record| record.id().ok());
        if last_id.is_some() && last_id == self.last_id {
            warn!("{path} repeated its previous page; stopping");
            self.finish();
            return Ok(());
        }
        self.last_id = last_id;

        self.cursor = self.cursor.advance(&page);
        let resource = &self.resource;
        self.buffer
            .extend(page.into_iter().filter(|record| resource.keeps(record)));
        Ok(())
    }

    fn finish(&mut self) {
        self.cursor = Cursor::Done;
        self.buffer.clear();
    }
}

impl<S: Service> RecordSource for Paginator<S> {
    async fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if !self.limit.allows_more(self.yielded) {
                return Ok(None);
            }

            if let Some(record) = self.buffer.pop_front() {
                let position = match (&self.window, record.created_at()) {
                    (Some(window), Some(created_at)) => window.locate(created_at),
                    _ => None,
                };
                match position {
                    Some(Position::Newer) => continue,
                    Some(Position::Older) => {
                        self.finish();
                        return Ok(None);
                    }
                    _ => {
                        self.yielded += 1;
                        return Ok(Some(record));
                    }
                }
            }

            if self.cursor == Cursor::Done {
                return Ok(None);
            }
            self.fetch().await?;
        }
    }
}
