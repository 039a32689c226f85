use super::{SqlExecutor, TextRow};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) enum Reply {
    Rows(Vec<TextRow>),
    Affected(u64),
    Fail(String),
}

/// Executor that records every statement and answers from a queue.
#[derive(Default)]
pub(crate) struct ScriptedExecutor {
    replies: Mutex<VecDeque<Reply>>,
    pub calls: Mutex<Vec<(String, Vec<Option<String>>)>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn rows(self, rows: Vec<TextRow>) -> Self {
        self.reply(Reply::Rows(rows))
    }

    pub fn affected(self, n: u64) -> Self {
        self.reply(Reply::Affected(n))
    }

    pub fn fail(self, message: &str) -> Self {
        self.reply(Reply::Fail(message.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call(&self, index: usize) -> (String, Vec<Option<String>>) {
        self.calls.lock().unwrap()[index].clone()
    }

    fn next(&self, sql: &str, params: &[Option<String>]) -> Reply {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for: {sql}"))
    }
}

/// Builds a text row from `(column, value)` pairs.
pub(crate) fn row(cells: &[(&str, Option<&str>)]) -> TextRow {
    cells
        .iter()
        .map(|(c, v)| (c.to_string(), v.map(str::to_string)))
        .collect()
}

#[async_trait]
impl SqlExecutor for ScriptedExecutor {
    async fn query(&self, sql: &str, params: &[Option<String>]) -> Result<Vec<TextRow>> {
        match self.next(sql, params) {
            Reply::Rows(rows) => Ok(rows),
            Reply::Affected(_) => panic!("expected execute, got query: {sql}"),
            Reply::Fail(message) => Err(Error::Query(message)),
        }
    }

    async fn execute(&self, sql: &str, params: &[Option<String>]) -> Result<u64> {
        match self.next(sql, params) {
            Reply::Affected(n) => Ok(n),
            Reply::Rows(_) => panic!("expected query, got execute: {sql}"),
            Reply::Fail(message) => Err(Error::Query(message)),
        }
    }
}
