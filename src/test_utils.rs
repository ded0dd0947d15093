use crate::clock::{DateWindow, NaiveDate};
use crate::dispatch::{Harvester, SearchType};
use crate::gab::service::Service;
use crate::http::{HTTPError, HTTPResult};
use crate::error::Result;
use crate::record::Record;
use crate::stream::{Limit, RecordSource};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn do_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A gab with the given id, content, and creation time.
pub fn gab(id: &str, content: &str, created_at: &str) -> Record {
    Record::from_value(json!({"id": id, "content": content, "created_at": created_at}))
        .expect("a gab is an object")
}

/// `n` gabs with ids "1" through `n`, one day apart, newest first.
pub fn gabs(n: usize) -> Vec<Record> {
    (1..=n)
        .map(|i| {
            let day = 28 - (i % 28);
            gab(
                &i.to_string(),
                &format!("<p>gab number <b>{i}</b></p>"),
                &format!("2021-02-{day:02}T12:00:00.000Z"),
            )
        })
        .collect()
}

/// An in-memory stand-in for the Gab API.
///
/// Responses are registered by path plus query string, with parameters in
/// the order the client sends them, e.g. `/api/v1/accounts/1/statuses?max_id=9`.
/// Unregistered routes respond with HTTP 404.
#[derive(Clone, Debug, Default)]
pub struct TestService {
    routes: Arc<HashMap<String, String>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl TestService {
    pub fn route(mut self, route: &str, body: Value) -> Self {
        Arc::make_mut(&mut self.routes).insert(route.to_string(), body.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    fn key(path: &str, params: &[(&str, String)]) -> String {
        if params.is_empty() {
            path.to_string()
        } else {
            let query = params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            format!("{path}?{query}")
        }
    }
}

impl Service for TestService {
    async fn get(&self, path: &str, params: &[(&str, String)]) -> HTTPResult<String> {
        let key = Self::key(path, params);
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(key.clone());
        self.routes
            .get(&key)
            .cloned()
            .ok_or(HTTPError::Http(StatusCode::NOT_FOUND))
    }
}

/// A capability invocation seen by a [`RecordingHarvester`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Search {
        query: String,
        search_type: SearchType,
        limit: Limit,
        window: DateWindow,
    },
    User(String),
    UserPosts(String, Limit, NaiveDate),
    UserComments(String, Limit, DateWindow),
    Followers(String),
    Following(String),
    Top(Option<String>),
}

/// Canned records, optionally followed by a wait that never ends.
#[derive(Debug)]
pub struct Canned {
    records: std::vec::IntoIter<Record>,
    stall: bool,
}

impl RecordSource for Canned {
    async fn next_record(&mut self) -> Result<Option<Record>> {
        match self.records.next() {
            Some(record) => Ok(Some(record)),
            None if self.stall => std::future::pending().await,
            None => Ok(None),
        }
    }
}

/// Records which capability was invoked and returns canned records.
#[derive(Debug, Default)]
pub struct RecordingHarvester {
    calls: Mutex<Vec<Call>>,
    records: Vec<Record>,
    stall: bool,
}

impl RecordingHarvester {
    pub fn returning(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Returns `records`, then never produces another.
    pub fn stalling(records: Vec<Record>) -> Self {
        Self {
            records,
            stall: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    fn record(&self, call: Call) -> Canned {
        self.calls.lock().expect("calls lock poisoned").push(call);
        Canned {
            records: self.records.clone().into_iter(),
            stall: self.stall,
        }
    }
}

impl Harvester for RecordingHarvester {
    type Records = Canned;

    fn search(
        &self,
        query: &str,
        search_type: SearchType,
        limit: Limit,
        window: DateWindow,
    ) -> Self::Records {
        self.record(Call::Search {
            query: query.to_string(),
            search_type,
            limit,
            window,
        })
    }

    fn user(&self, username: &str) -> Self::Records {
        self.record(Call::User(username.to_string()))
    }

    fn userposts(&self, username: &str, limit: Limit, after: NaiveDate) -> Self::Records {
        self.record(Call::UserPosts(username.to_string(), limit, after))
    }

    fn usercomments(&self, username: &str, limit: Limit, window: DateWindow) -> Self::Records {
        self.record(Call::UserComments(username.to_string(), limit, window))
    }

    fn followers(&self, username: &str) -> Self::Records {
        self.record(Call::Followers(username.to_string()))
    }

    fn following(&self, username: &str) -> Self::Records {
        self.record(Call::Following(username.to_string()))
    }

    fn top(&self, timespan: Option<&str>) -> Self::Records {
        self.record(Call::Top(timespan.map(String::from)))
    }
}
