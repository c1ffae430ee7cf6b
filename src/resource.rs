//! Transient binary resources scoped to one render.
//!
//! A backend that needs decoded bytes (an embedded image, say) registers them
//! in the render's [`ResourceScope`] and refers to them by name. Dropping the
//! scope releases everything it holds, whichever way the render ended.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Hands out scopes and counts the resources they still hold.
#[derive(Debug, Clone, Default)]
pub struct ResourcePool {
    live: Arc<AtomicUsize>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh scope for one render.
    pub fn scope(&self) -> ResourceScope {
        ResourceScope {
            live: Arc::clone(&self.live),
            resources: BTreeMap::new(),
        }
    }

    /// Resources registered in scopes that have not been released yet.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

/// Owner of the transient resources of one render.
#[derive(Debug)]
pub struct ResourceScope {
    live: Arc<AtomicUsize>,
    resources: BTreeMap<String, Vec<u8>>,
}

impl ResourceScope {
    /// Register `bytes` under the next free name starting with `prefix`
    /// (`Im1`, `Im2`, ...). Names depend only on registration order.
    pub fn register(&mut self, prefix: &str, bytes: Vec<u8>) -> String {
        let mut index = self.resources.len() + 1;
        let mut name = format!("{prefix}{index}");
        while self.resources.contains_key(&name) {
            index += 1;
            name = format!("{prefix}{index}");
        }
        self.resources.insert(name.clone(), bytes);
        self.live.fetch_add(1, Ordering::AcqRel);
        name
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.resources.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Release every resource now. Also runs on drop.
    pub fn release(&mut self) {
        let count = self.resources.len();
        if count > 0 {
            self.resources.clear();
            self.live.fetch_sub(count, Ordering::AcqRel);
            log::debug!("released {count} transient resources");
        }
    }
}

impl Drop for ResourceScope {
    fn drop(&mut self) {
        self.release();
    }
}
