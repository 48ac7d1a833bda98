use std::collections::VecDeque;

use crate::document::{Document, DocumentStatus};
use crate::error::Result;
use crate::server::SearchServer;
use crate::DocId;

/// Minutes in a day; each request advances the clock by one minute.
pub const MIN_IN_DAY: u64 = 1440;

#[derive(Debug, Clone, Copy)]
struct RequestRecord {
    timestamp: u64,
    empty: bool,
}

/// Sliding window over the last day of search requests, counting how many
/// came back empty.
pub struct RequestQueue<'s> {
    server: &'s SearchServer,
    requests: VecDeque<RequestRecord>,
    current_time: u64,
    no_result_requests: usize,
}

impl<'s> RequestQueue<'s> {
    pub fn new(server: &'s SearchServer) -> Self {
        Self { server, requests: VecDeque::new(), current_time: 0, no_result_requests: 0 }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        let found = self.server.find_top_documents(raw_query)?;
        self.record(found.is_empty());
        Ok(found)
    }

    pub fn add_find_request_by_status(&mut self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        let found = self.server.find_top_documents_by_status(raw_query, status)?;
        self.record(found.is_empty());
        Ok(found)
    }

    pub fn add_find_request_with<P>(&mut self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let found = self.server.find_top_documents_with(raw_query, predicate)?;
        self.record(found.is_empty());
        Ok(found)
    }

    /// Empty-result requests still inside the window.
    pub fn no_result_requests(&self) -> usize { self.no_result_requests }

    fn record(&mut self, empty: bool) {
        self.current_time += 1;
        while let Some(front) = self.requests.front() {
            if self.current_time - front.timestamp < MIN_IN_DAY { break; }
            if front.empty { self.no_result_requests -= 1; }
            self.requests.pop_front();
        }
        self.requests.push_back(RequestRecord { timestamp: self.current_time, empty });
        if empty { self.no_result_requests += 1; }
    }
}
