//! Helpers shared by repository tests.

use std::sync::Arc;
use std::time::Duration;

use super::{Call, MemoryRecordStore, RecordStore};
use crate::types::{BusinessId, RootPatch};

pub type Store = Arc<MemoryRecordStore>;

pub fn store() -> Store {
    Arc::new(MemoryRecordStore::new())
}

/// Inserts a bare business and returns its id.
pub async fn seed(store: &Store, name: &str) -> BusinessId {
    store
        .insert_root(&RootPatch::new(name))
        .await
        .expect("unable to seed business")
        .id()
}

/// Polls `condition` until it holds, panicking after one second.
pub async fn wait_for(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met in time");
}

/// Waits until `call` has been started at least once.
pub async fn wait_for_call(store: &Store, call: Call) {
    wait_for(|| store.calls(call) > 0).await;
}
