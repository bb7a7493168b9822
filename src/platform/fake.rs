//! In-memory platform for tests

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CreateRequest, MeasurementPlatform, RawResult};
use crate::error::PlatformError;

/// Hands out sequential ids and serves canned results.
///
/// Sources listed in `refuse` are rejected on submit; measurement ids with
/// no canned results answer 404.
pub struct FakePlatform {
    next_id: Mutex<u64>,
    submitted: Mutex<Vec<CreateRequest>>,
    fetched: Mutex<Vec<u64>>,
    results: HashMap<u64, Vec<RawResult>>,
    pub refuse: Vec<&'static str>,
    pub short_reply: bool,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(100),
            submitted: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
            results: HashMap::new(),
            refuse: Vec::new(),
            short_reply: false,
        }
    }

    pub fn with_results(mut self, msm_id: u64, results: Vec<RawResult>) -> Self {
        self.results.insert(msm_id, results);
        self
    }

    pub fn submissions(&self) -> usize {
        self.submitted.lock().len()
    }

    pub fn fetches(&self) -> Vec<u64> {
        self.fetched.lock().clone()
    }
}

#[async_trait]
impl MeasurementPlatform for FakePlatform {
    async fn submit(&self, request: &CreateRequest) -> Result<Vec<u64>, PlatformError> {
        self.submitted.lock().push(request.clone());
        let source = request.probes[0].value.as_str();
        if self.refuse.iter().any(|r| *r == source) {
            return Err(PlatformError::Rejected {
                status: 400,
                body: "not enough probes".into(),
            });
        }
        let mut next = self.next_id.lock();
        let first = *next;
        *next += 2;
        if self.short_reply {
            return Ok(vec![first]);
        }
        Ok(vec![first, first + 1])
    }

    async fn fetch_results(&self, msm_id: u64) -> Result<Vec<RawResult>, PlatformError> {
        self.fetched.lock().push(msm_id);
        self.results
            .get(&msm_id)
            .cloned()
            .ok_or_else(|| PlatformError::Rejected {
                status: 404,
                body: format!("measurement {} not found", msm_id),
            })
    }
}
