//! Process-lifetime dataset cache
//!
//! Each key owns a `OnceCell` slot. The map lock is only held long enough to
//! find or create the slot, so loads of different datasets run in parallel
//! while concurrent first requests for the same key wait on one load.
//! Nothing is ever evicted or replaced.

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

use super::loader::DatasetLoader;
use super::record::Dataset;
use crate::error::{HeatmapError, LoadError};

type Slot = Arc<OnceCell<Arc<Dataset>>>;

pub struct DatasetCache {
    loader: Box<dyn DatasetLoader>,
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl DatasetCache {
    pub fn new(loader: impl DatasetLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<PathBuf, Slot>> {
        // Slots are only ever inserted, so a poisoned map is still consistent
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &Path) -> Slot {
        Arc::clone(self.slots().entry(key.to_path_buf()).or_default())
    }

    /// Drop `slot` from the map if it is still empty and nobody else is
    /// waiting on it. Waiters retry on their own handle.
    fn release(&self, key: &Path, slot: &Slot) {
        let mut slots = self.slots();
        // Held by the map and by `slot`; new handles are only cloned under this lock
        let unused = slots.get(key).is_some_and(|existing| {
            Arc::ptr_eq(existing, slot)
                && existing.get().is_none()
                && Arc::strong_count(existing) == 2
        });
        if unused {
            slots.remove(key);
        }
    }

    /// Return the cached dataset for `key`, loading it on first use.
    ///
    /// A load that fails or yields no episodes leaves the cache untouched.
    pub fn get_or_load(&self, key: &Path) -> Result<Arc<Dataset>, HeatmapError> {
        let slot = self.slot(key);
        let result = slot.get_or_try_init(|| {
            let records = self
                .loader
                .load(key)
                .map_err(|err| HeatmapError::load(key, err))?;
            if records.is_empty() {
                return Err(HeatmapError::load(key, LoadError::Empty));
            }
            let dataset = Dataset::new(key, records);
            info!(
                "{} has been loaded into memory ({} episodes, {} samples)",
                key.display(),
                dataset.len(),
                dataset.total_samples()
            );
            Ok(Arc::new(dataset))
        });
        match result {
            Ok(dataset) => Ok(Arc::clone(dataset)),
            Err(err) => {
                self.release(key, &slot);
                Err(err)
            }
        }
    }

    /// Load every key, collecting failures instead of stopping at the first
    pub fn preload<I, P>(&self, keys: I) -> Vec<HeatmapError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        keys.into_iter()
            .filter_map(|key| match self.get_or_load(key.as_ref()) {
                Ok(_) => None,
                Err(err) => {
                    warn!("Preload skipped: {}", err);
                    Some(err)
                }
            })
            .collect()
    }

    pub fn contains(&self, key: &Path) -> bool {
        self.slots()
            .get(key)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of loaded datasets
    pub fn len(&self) -> usize {
        self.slots()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loaded keys, sorted
    pub fn keys(&self) -> Vec<PathBuf> {
        let mut keys: Vec<PathBuf> = self
            .slots()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episodes::loader::FileDatasetLoader;
    use crate::episodes::record::{EpisodeRecord, Position};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// Serves fixed records for any key ending in "good", counting calls
    struct CountingLoader {
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl CountingLoader {
        fn new(calls: &Arc<AtomicUsize>) -> Self {
            Self {
                calls: Arc::clone(calls),
                delay: Duration::ZERO,
            }
        }
    }

    impl DatasetLoader for CountingLoader {
        fn load(&self, path: &Path) -> Result<Vec<EpisodeRecord>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            let name = path.to_string_lossy();
            if name.ends_with("good") {
                Ok(vec![EpisodeRecord {
                    episode_number: 1,
                    duration: 1.0,
                    reward: 1.0,
                    positions: vec![Position::new(0.0, 0.0)],
                }])
            } else if name.ends_with("empty") {
                Ok(Vec::new())
            } else {
                Err(LoadError::Missing)
            }
        }
    }

    #[test]
    fn test_second_lookup_hits_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(CountingLoader::new(&calls));

        let first = cache.get_or_load(Path::new("a/good")).unwrap();
        let second = cache.get_or_load(Path::new("a/good")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains(Path::new("a/good")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(CountingLoader::new(&calls));

        let err = cache.get_or_load(Path::new("a/missing")).unwrap_err();
        assert!(matches!(
            err,
            HeatmapError::LoadFailure {
                source: LoadError::Missing,
                ..
            }
        ));
        assert!(!cache.contains(Path::new("a/missing")));
        assert!(cache.is_empty());

        // A later request retries instead of remembering the failure
        let _ = cache.get_or_load(Path::new("a/missing"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_loads_leave_no_slots_behind() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(CountingLoader::new(&calls));

        for i in 0..100 {
            let _ = cache.get_or_load(&PathBuf::from(format!("bad/{}/missing", i)));
        }
        let _ = cache.get_or_load(Path::new("bad/empty"));
        assert_eq!(cache.slots().len(), 0);

        cache.get_or_load(Path::new("ok/good")).unwrap();
        assert_eq!(cache.slots().len(), 1);
    }

    #[test]
    fn test_empty_dataset_is_a_load_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(CountingLoader::new(&calls));

        let err = cache.get_or_load(Path::new("a/empty")).unwrap_err();
        assert!(matches!(
            err,
            HeatmapError::LoadFailure {
                source: LoadError::Empty,
                ..
            }
        ));
        assert!(!cache.contains(Path::new("a/empty")));
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(DatasetCache::new(CountingLoader {
            calls: Arc::clone(&calls),
            delay: Duration::from_millis(50),
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get_or_load(Path::new("shared/good")).unwrap())
            })
            .collect();
        let datasets: Vec<Arc<Dataset>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(datasets.iter().all(|d| Arc::ptr_eq(d, &datasets[0])));
    }

    #[test]
    fn test_preload_collects_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(CountingLoader::new(&calls));

        let failures = cache.preload(["x/good", "y/missing", "z/good"]);
        assert_eq!(failures.len(), 1);
        assert_eq!(
            cache.keys(),
            vec![PathBuf::from("x/good"), PathBuf::from("z/good")]
        );
    }

    #[test]
    fn test_nonexistent_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(FileDatasetLoader);
        let key = dir.path().join("Data-404.json");

        assert!(cache.get_or_load(&key).is_err());
        assert!(!cache.contains(&key));
    }
}
