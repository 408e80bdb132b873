//! テスト用のインメモリ ConfigStore

use pmk_domain::DomainError;
use pmk_domain::model::{Scope, StoreRoot, Zone, ZoneCode};
use pmk_domain::port::driven::ConfigStore;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    values: HashMap<(StoreRoot, u32), u32>,
    writes: Vec<(StoreRoot, u32, u32)>,
    failing_reads: HashSet<(StoreRoot, u32)>,
    failing_writes: HashSet<(StoreRoot, u32)>,
}

/// クローンは同じ中身を共有する
#[derive(Clone, Default)]
pub(crate) struct MockStore {
    inner: Arc<Mutex<Inner>>,
}

impl MockStore {
    /// 書き込み記録を残さずに値を置く
    pub(crate) fn seed(&self, zone: Zone, scope: Scope, raw: u32) {
        self.inner
            .lock()
            .unwrap()
            .values
            .insert((scope.root(), zone.code().get()), raw);
    }

    pub(crate) fn raw(&self, zone: Zone, scope: Scope) -> Option<u32> {
        self.inner
            .lock()
            .unwrap()
            .values
            .get(&(scope.root(), zone.code().get()))
            .copied()
    }

    pub(crate) fn fail_reads(&self, zone: Zone, scope: Scope) {
        self.inner
            .lock()
            .unwrap()
            .failing_reads
            .insert((scope.root(), zone.code().get()));
    }

    pub(crate) fn fail_writes(&self, zone: Zone, scope: Scope) {
        self.inner
            .lock()
            .unwrap()
            .failing_writes
            .insert((scope.root(), zone.code().get()));
    }

    /// 試行された書き込み（失敗分も含む）
    pub(crate) fn writes(&self) -> Vec<(StoreRoot, u32, u32)> {
        self.inner.lock().unwrap().writes.clone()
    }

    pub(crate) fn write_count(&self) -> usize {
        self.inner.lock().unwrap().writes.len()
    }
}

impl ConfigStore for MockStore {
    fn get_int(&self, root: StoreRoot, zone: ZoneCode) -> Result<u32, DomainError> {
        let inner = self.inner.lock().unwrap();
        let key = (root, zone.get());
        if inner.failing_reads.contains(&key) {
            return Err(DomainError::RegistryAccessDenied(format!("{}\\{}", root, zone)));
        }
        inner
            .values
            .get(&key)
            .copied()
            .ok_or_else(|| DomainError::ValueNotFound(format!("{}\\{}", root, zone)))
    }

    fn set_int(&self, root: StoreRoot, zone: ZoneCode, value: u32) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let key = (root, zone.get());
        inner.writes.push((root, zone.get(), value));
        if inner.failing_writes.contains(&key) {
            return Err(DomainError::RegistryAccessDenied(format!("{}\\{}", root, zone)));
        }
        inner.values.insert(key, value);
        Ok(())
    }
}
