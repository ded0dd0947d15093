// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Streams harvested records to their destination.
//!
//! A [`Streamer`] pulls records one at a time from a [`RecordSource`],
//! stops once it has written as many as it was asked for, reduces each
//! record according to its [`ContentKey`], and writes the result as a line
//! of JSON to an [`OutputTarget`]. When the source runs dry (or the limit
//! is hit) the target is finalized so that its name records the number of
//! records written.

use crate::error::Result;
use crate::output::OutputTarget;
use crate::record::Record;
use crate::text::strip_tags;
use log::{debug, info};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

/// A lazy, forward-only sequence of records.
///
/// Producing the next record may block on the network and may fail.
/// `Ok(None)` signals that the sequence is exhausted.
pub trait RecordSource {
    /// Produces the next record in the sequence.
    fn next_record(&mut self) -> impl Future<Output = Result<Option<Record>>>;
}

impl RecordSource for std::vec::IntoIter<Record> {
    async fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.next())
    }
}

impl RecordSource for VecDeque<Result<Record>> {
    async fn next_record(&mut self) -> Result<Option<Record>> {
        self.pop_front().transpose()
    }
}

/// The maximum number of records to harvest.
///
/// Any negative value means there is no limit.
///
/// # Examples
///
/// ```
/// use garc::stream::Limit;
/// assert!(Limit::new(3).reached(3));
/// assert!(!Limit::new(3).reached(2));
/// assert!(!Limit::UNBOUNDED.reached(usize::MAX));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limit(i64);

impl Limit {
    /// No limit at all.
    pub const UNBOUNDED: Limit = Limit(-1);

    /// Creates a limit of `n` records; negative values are unbounded.
    pub fn new(n: i64) -> Self {
        Self(n)
    }

    /// The limit as a count, or `None` if unbounded.
    pub fn get(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    /// True if `count` records is exactly the limit.
    pub fn reached(&self, count: usize) -> bool {
        self.get() == Some(count)
    }

    /// True if more records may follow once `count` have been produced.
    pub fn allows_more(&self, count: usize) -> bool {
        self.get().is_none_or(|n| count < n)
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl From<i64> for Limit {
    fn from(n: i64) -> Self {
        Self::new(n)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(n) => write!(f, "{n}"),
            None => write!(f, "unbounded"),
        }
    }
}

/// Selects which part of each record is written.
///
/// # Examples
///
/// ```
/// use garc::stream::ContentKey;
/// assert_eq!(ContentKey::from("content"), ContentKey::Content);
/// assert_eq!(ContentKey::from("created_at"), ContentKey::CreatedAt);
/// assert_eq!(ContentKey::from("all"), ContentKey::All);
/// assert_eq!(ContentKey::from("anything else"), ContentKey::All);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentKey {
    /// The whole record, unchanged.
    #[default]
    All,

    /// Only the record's `content`, with markup stripped.
    Content,

    /// Only the record's `created_at` timestamp.
    CreatedAt,
}

impl ContentKey {
    /// Reduces `record` to the value that should be written.
    ///
    /// Fails with [`MissingField`](crate::Error::MissingField) if the
    /// record lacks the selected field.
    pub fn apply(&self, record: Record) -> Result<Value> {
        match self {
            ContentKey::All => Ok(record.into_value()),
            ContentKey::Content => Ok(Value::String(strip_tags(record.str_field("content")?))),
            ContentKey::CreatedAt => Ok(record.field("created_at")?.clone()),
        }
    }
}

impl From<&str> for ContentKey {
    fn from(key: &str) -> Self {
        match key {
            "content" => ContentKey::Content,
            "created_at" => ContentKey::CreatedAt,
            _ => ContentKey::All,
        }
    }
}

/// The result of a completed harvest.
#[derive(Debug, PartialEq, Eq)]
pub struct Harvest {
    /// Number of records written.
    pub count: usize,

    /// Final path of the output file, if output went to a file.
    pub artifact: Option<PathBuf>,
}

/// Writes records from a source to an output target.
#[derive(Clone, Copy, Debug, Default)]
pub struct Streamer {
    limit: Limit,
    content_key: ContentKey,
}

impl Streamer {
    /// Creates a streamer that writes at most `limit` records, reduced
    /// according to `content_key`.
    pub fn new(limit: Limit, content_key: ContentKey) -> Self {
        Self { limit, content_key }
    }

    /// Streams every record from `source` into `target`, up to the limit,
    /// then finalizes `target`.
    ///
    /// Any error aborts the harvest immediately. The target is dropped
    /// without being finalized, so a partially-written file keeps its
    /// original name.
    pub async fn stream<R: RecordSource>(
        &self,
        source: &mut R,
        mut target: OutputTarget,
    ) -> Result<Harvest> {
        let mut count = 0;

        while !self.limit.reached(count) {
            let Some(record) = source.next_record().await? else {
                break;
            };
            let id = record.id()?;
            let value = self.content_key.apply(record)?;
            serde_json::to_writer(&mut target, &value)?;
            target.write_all(b"\n")?;
            count += 1;
            info!("archived {id}");
        }

        debug!("harvested {count} records (limit: {})", self.limit);
        let artifact = target.finalize(count)?;
        Ok(Harvest { count, artifact })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_utils::{do_logging, gab, gabs};
    use serde_json::json;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn target(dir: &TempDir) -> OutputTarget {
        OutputTarget::create(dir.path().join("out.jsonl")).unwrap()
    }

    fn lines(harvest: &Harvest) -> Vec<Value> {
        let path = harvest.artifact.as_ref().unwrap();
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    mod limits {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn it_writes_exactly_the_limit() {
            do_logging();
            let dir = tempdir().unwrap();
            let mut source = gabs(10).into_iter();
            let harvest = Streamer::new(Limit::new(4), ContentKey::All)
                .stream(&mut source, target(&dir))
                .await
                .unwrap();
            assert_eq!(harvest.count, 4);
            let ids: Vec<_> = lines(&harvest).iter().map(|v| v["id"].clone()).collect();
            assert_eq!(ids, vec![json!("1"), json!("2"), json!("3"), json!("4")]);
        }

        #[tokio::test]
        async fn it_stops_when_the_source_runs_out() {
            let dir = tempdir().unwrap();
            let mut source = gabs(3).into_iter();
            let harvest = Streamer::new(Limit::new(7), ContentKey::All)
                .stream(&mut source, target(&dir))
                .await
                .unwrap();
            assert_eq!(harvest.count, 3);
            assert_eq!(lines(&harvest).len(), 3);
        }

        #[tokio::test]
        async fn it_writes_everything_when_unbounded() {
            let dir = tempdir().unwrap();
            let mut source = gabs(25).into_iter();
            let harvest = Streamer::new(Limit::UNBOUNDED, ContentKey::All)
                .stream(&mut source, target(&dir))
                .await
                .unwrap();
            assert_eq!(harvest.count, 25);
        }

        #[tokio::test]
        async fn it_writes_nothing_with_a_zero_limit() {
            let dir = tempdir().unwrap();
            let mut source = gabs(5).into_iter();
            let harvest = Streamer::new(Limit::new(0), ContentKey::All)
                .stream(&mut source, target(&dir))
                .await
                .unwrap();
            assert_eq!(harvest.count, 0);
            assert!(lines(&harvest).is_empty());
            // Nothing should have been pulled from upstream.
            assert_eq!(source.len(), 5);
        }

        #[tokio::test]
        async fn it_does_not_pull_past_the_limit() {
            let dir = tempdir().unwrap();
            let mut source = gabs(5).into_iter();
            Streamer::new(Limit::new(2), ContentKey::All)
                .stream(&mut source, target(&dir))
                .await
                .unwrap();
            assert_eq!(source.len(), 3);
        }
    }

    mod content_keys {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn it_writes_whole_records() {
            let dir = tempdir().unwrap();
            let record = gab("1", "<p>hello</p>", "2020-01-01T00:00:00.000Z");
            let expected = record.clone().into_value();
            let mut source = vec![record].into_iter();
            let harvest = Streamer::default()
                .stream(&mut source, target(&dir))
                .await
                .unwrap();
            assert_eq!(lines(&harvest), vec![expected]);
        }

        #[tokio::test]
        async fn it_preserves_key_order_of_whole_records() {
            let dir = tempdir().unwrap();
            let record = gab("9", "x", "2020-01-01T00:00:00.000Z");
            let mut source = vec![record].into_iter();
            let harvest = Streamer::default()
                .stream(&mut source, target(&dir))
                .await
                .unwrap();
            let raw = fs::read_to_string(harvest.artifact.unwrap()).unwrap();
            assert_eq!(
                raw,
                "{\"id\":\"9\",\"content\":\"x\",\"created_at\":\"2020-01-01T00:00:00.000Z\"}\n"
            );
        }

        #[tokio::test]
        async fn it_writes_cleaned_content() {
            let dir = tempdir().unwrap();
            let mut source = vec![
                gab("1", "<p>Hello <a href=\"/x\">@x</a></p>", "2020-01-01T00:00:00Z"),
                gab("2", "plain", "2020-01-02T00:00:00Z"),
            ]
            .into_iter();
            let harvest = Streamer::new(Limit::UNBOUNDED, ContentKey::Content)
                .stream(&mut source, target(&dir))
                .await
                .unwrap();
            assert_eq!(lines(&harvest), vec![json!("Hello @x"), json!("plain")]);
        }

        #[tokio::test]
        async fn it_writes_creation_times() {
            let dir = tempdir().unwrap();
            let mut source = gabs(3).into_iter();
            let expected: Vec<_> = gabs(3)
                .iter()
                .map(|g| json!(g.created_at().unwrap()))
                .collect();
            let harvest = Streamer::new(Limit::UNBOUNDED, ContentKey::CreatedAt)
                .stream(&mut source, target(&dir))
                .await
                .unwrap();
            assert_eq!(lines(&harvest), expected);
        }
    }

    mod failures {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn it_aborts_when_content_is_missing() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("out.jsonl");
            let mut source = vec![
                gab("1", "fine", "2020-01-01T00:00:00Z"),
                Record::from_value(json!({"id": "2"})).unwrap(),
                gab("3", "never reached", "2020-01-01T00:00:00Z"),
            ]
            .into_iter();
            let result = Streamer::new(Limit::UNBOUNDED, ContentKey::Content)
                .stream(&mut source, OutputTarget::create(&path).unwrap())
                .await;
            assert!(matches!(result, Err(Error::MissingField(f)) if f == "content"));
            // The output is left unfinalized.
            assert!(path.exists());
            assert_eq!(fs::read_to_string(&path).unwrap(), "\"fine\"\n");
        }

        #[tokio::test]
        async fn it_aborts_when_an_id_is_missing() {
            let dir = tempdir().unwrap();
            let mut source = vec![Record::from_value(json!({"content": "x"})).unwrap()].into_iter();
            let result = Streamer::default().stream(&mut source, target(&dir)).await;
            assert!(matches!(result, Err(Error::MissingField(f)) if f == "id"));
        }

        #[tokio::test]
        async fn it_propagates_upstream_errors() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("out.jsonl");
            let mut source: VecDeque<Result<Record>> = VecDeque::from(vec![
                Ok(gab("1", "a", "2020-01-01T00:00:00Z")),
                Err(Error::Config(String::from("upstream went away"))),
            ]);
            let result = Streamer::default()
                .stream(&mut source, OutputTarget::create(&path).unwrap())
                .await;
            assert!(matches!(result, Err(Error::Config(_))));
            assert!(path.exists());
        }
    }
}
