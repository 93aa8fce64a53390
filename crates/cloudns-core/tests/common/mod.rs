//! Test doubles and common utilities for reconciler contract tests
//!
//! [`FakeZoneApi`] keeps zones in memory and can be scripted to hide freshly
//! created records for a number of listings, to fail individual calls, or to
//! acknowledge deletes without performing them.

#![allow(dead_code)]

use cloudns_core::error::ApiError;
use cloudns_core::{Reconciler, ReconcilerConfig, WireRecord, ZoneApi};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// How long newly created records stay out of zone listings
#[derive(Debug, Clone, Copy)]
pub enum Visibility {
    /// Listed right away
    Immediate,
    /// Hidden from this many listings, then listed
    AfterListings(usize),
    /// Never listed
    Never,
}

/// In-memory provider
pub struct FakeZoneApi {
    /// All records of all zones
    records: Mutex<Vec<WireRecord>>,
    /// Remaining listings a record stays hidden for (`None` = forever)
    hidden: Mutex<HashMap<String, Option<usize>>>,
    /// Id handed out by the next create
    next_id: AtomicU64,
    /// Visibility applied to newly created records
    visibility: Mutex<Visibility>,
    /// Payloads received by create/update
    received: Mutex<Vec<WireRecord>>,
    /// Instants at which any call was made
    call_times: Mutex<Vec<Instant>>,

    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    destroy_calls: AtomicUsize,

    fail_list: AtomicBool,
    fail_create: AtomicBool,
    fail_update: AtomicBool,
    fail_destroy: AtomicBool,
    /// Acknowledge deletes without removing anything
    ignore_destroy: AtomicBool,
    /// Acknowledge updates, then drop the record as if deleted elsewhere
    vanish_on_update: AtomicBool,
}

impl FakeZoneApi {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            hidden: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(42),
            visibility: Mutex::new(Visibility::Immediate),
            received: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            destroy_calls: AtomicUsize::new(0),
            fail_list: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            fail_destroy: AtomicBool::new(false),
            ignore_destroy: AtomicBool::new(false),
            vanish_on_update: AtomicBool::new(false),
        }
    }

    pub fn with_visibility(self, visibility: Visibility) -> Self {
        *self.visibility.lock().unwrap() = visibility;
        self
    }

    pub fn with_next_id(self, id: u64) -> Self {
        self.next_id.store(id, Ordering::SeqCst);
        self
    }

    /// Put an existing record in the zone
    pub fn seed(&self, record: WireRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    pub fn fail_destroy(&self, fail: bool) {
        self.fail_destroy.store(fail, Ordering::SeqCst);
    }

    pub fn ignore_destroy(&self, ignore: bool) {
        self.ignore_destroy.store(ignore, Ordering::SeqCst);
    }

    pub fn vanish_on_update(&self, vanish: bool) {
        self.vanish_on_update.store(vanish, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.create_calls() + self.update_calls() + self.destroy_calls()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }

    /// Payloads received by create and update, in order
    pub fn received(&self) -> Vec<WireRecord> {
        self.received.lock().unwrap().clone()
    }

    /// Records currently stored in `zone`, hidden or not
    pub fn stored(&self, zone: &str) -> Vec<WireRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.zone == zone)
            .cloned()
            .collect()
    }

    fn note_call(&self, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().unwrap().push(Instant::now());
    }
}

#[async_trait::async_trait]
impl ZoneApi for FakeZoneApi {
    async fn list_zone(&self, zone: &str) -> Result<Vec<WireRecord>, ApiError> {
        self.note_call(&self.list_calls);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ApiError::http("list unavailable"));
        }

        let mut hidden = self.hidden.lock().unwrap();
        let listing = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.zone == zone)
            .filter(|r| {
                let id = r.id.clone().unwrap_or_default();
                !hidden.contains_key(&id)
            })
            .cloned()
            .collect();

        // Count this listing against every hidden record
        hidden.retain(|_, remaining| match remaining {
            None => true,
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                *n > 0
            }
        });

        Ok(listing)
    }

    async fn create_record(&self, record: &WireRecord) -> Result<WireRecord, ApiError> {
        self.note_call(&self.create_calls);
        self.received.lock().unwrap().push(record.clone());
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ApiError::provider("fake", "Invalid record"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let mut created = record.clone();
        created.id = Some(id.clone());

        match *self.visibility.lock().unwrap() {
            Visibility::Immediate | Visibility::AfterListings(0) => {}
            Visibility::AfterListings(n) => {
                self.hidden.lock().unwrap().insert(id.clone(), Some(n));
            }
            Visibility::Never => {
                self.hidden.lock().unwrap().insert(id.clone(), None);
            }
        }

        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_record(&self, record: &WireRecord) -> Result<WireRecord, ApiError> {
        self.note_call(&self.update_calls);
        self.received.lock().unwrap().push(record.clone());
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(ApiError::provider("fake", "Update rejected"));
        }

        let mut records = self.records.lock().unwrap();
        let existing = records
            .iter_mut()
            .find(|r| r.id == record.id && r.zone == record.zone)
            .ok_or_else(|| ApiError::provider("fake", "Invalid record-id param"))?;
        *existing = record.clone();
        if self.vanish_on_update.load(Ordering::SeqCst) {
            records.retain(|r| !(r.zone == record.zone && r.id == record.id));
        }
        Ok(record.clone())
    }

    async fn destroy_record(&self, zone: &str, id: &str) -> Result<(), ApiError> {
        self.note_call(&self.destroy_calls);
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(ApiError::http("HTTP 500"));
        }
        if self.ignore_destroy.load(Ordering::SeqCst) {
            return Ok(());
        }

        self.records
            .lock()
            .unwrap()
            .retain(|r| !(r.zone == zone && r.id.as_deref() == Some(id)));
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// A wire record as the provider would list it
pub fn wire(id: &str, zone: &str, host: &str, record_type: &str, value: &str, ttl: u32) -> WireRecord {
    WireRecord {
        id: Some(id.to_string()),
        zone: zone.to_string(),
        host: host.to_string(),
        record_type: record_type.to_string(),
        record: value.to_string(),
        ttl,
        priority: None,
        weight: None,
        port: None,
    }
}

/// Valid configuration with test credentials
pub fn test_config() -> ReconcilerConfig {
    ReconcilerConfig::primary(1234, "test-password")
}

/// Build a reconciler over `api` with test credentials
pub fn reconciler(api: &Arc<FakeZoneApi>) -> Reconciler {
    let api: Arc<dyn ZoneApi> = api.clone();
    Reconciler::new(api, &test_config()).expect("reconciler construction succeeds")
}
