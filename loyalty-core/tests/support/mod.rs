#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use loyalty_core::accrual::{AccrualClient, AccrualError, AccrualReply};
use loyalty_core::luhn;

/// Scripted accrual service: pops the next reply off the front of the
/// script, answering `NotFound` once the script runs dry. Every call is
/// recorded with its order number and instant.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<AccrualReply>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedClient {
    pub fn new(replies: impl IntoIterator<Item = AccrualReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AccrualClient for ScriptedClient {
    async fn fetch(&self, order_number: &str) -> Result<AccrualReply, AccrualError> {
        self.calls
            .lock()
            .unwrap()
            .push((order_number.to_owned(), Instant::now()));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(AccrualReply::NotFound);
        Ok(reply)
    }
}

/// Append the check digit that makes `base` a valid order number.
pub fn order_number(base: &str) -> String {
    (0..10)
        .map(|d| format!("{base}{d}"))
        .find(|candidate| luhn::is_valid(candidate))
        .unwrap()
}
