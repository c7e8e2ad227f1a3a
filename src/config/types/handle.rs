//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads from the request loop and watcher.

use crate::config::StageConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<StageConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(StageConfig::default()));

#[inline]
pub fn cfg() -> Arc<StageConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: StageConfig) -> Arc<StageConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
