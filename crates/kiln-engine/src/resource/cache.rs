use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

use crate::backend::RenderBackend;

use super::Release;

/// Identity of a cached resource: source path plus creation config.
///
/// Two keys are equal when their fields are equal, independent of where the
/// config value came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey<C> {
    pub path: String,
    pub config: C,
}

impl<C> CacheKey<C> {
    pub fn new(path: impl Into<String>, config: C) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }
}

/// At most one resident resource per key.
///
/// The cache owns its resources: `remove` and `clear` release them through
/// the backend. Dropping a non-empty cache leaks (and logs) its contents, so
/// owners call `clear` at shutdown.
pub struct ResourceCache<R, C = ()> {
    entries: HashMap<CacheKey<C>, R>,
}

impl<R, C> Default for ResourceCache<R, C> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<R: Release, C: Hash + Eq + Clone> ResourceCache<R, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey<C>) -> Option<&R> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &CacheKey<C>) -> bool {
        self.entries.contains_key(key)
    }

    /// Stores `resource` under `key`.
    ///
    /// A resource already stored under `key` is returned, not released; the
    /// caller owns it and must release it.
    #[must_use = "a displaced resource must be released"]
    pub fn put(&mut self, key: CacheKey<C>, resource: R) -> Option<R> {
        let displaced = self.entries.insert(key, resource);
        if displaced.is_some() {
            log::warn!("resource cache: put displaced a resident entry");
        }
        displaced
    }

    /// Releases and erases the entry for `key`. Returns `false` when absent.
    pub fn remove(&mut self, key: &CacheKey<C>, backend: &mut dyn RenderBackend) -> bool {
        match self.entries.remove(key) {
            Some(resource) => {
                log::debug!("resource cache: removed '{}'", key.path);
                resource.release(backend);
                true
            }
            None => false,
        }
    }

    /// Releases every entry, then empties the cache.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        let count = self.entries.len();
        for (_, resource) in self.entries.drain() {
            resource.release(backend);
        }
        if count > 0 {
            log::debug!("resource cache: cleared {count} entries");
        }
    }

    /// Returns the resident entry, or runs `load` and stores its result.
    /// A failed load leaves the cache unchanged.
    pub fn get_or_try_insert_with<E, F>(
        &mut self,
        key: CacheKey<C>,
        backend: &mut dyn RenderBackend,
        load: F,
    ) -> Result<&R, E>
    where
        F: FnOnce(&mut dyn RenderBackend) -> Result<R, E>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                log::debug!("resource cache: hit '{}'", entry.key().path);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let resource = load(backend)?;
                log::debug!("resource cache: loaded '{}'", entry.key().path);
                Ok(entry.insert(resource))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey<C>> {
        self.entries.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessBackend, ObjectKind};
    use crate::mesh::Mesh;
    use crate::EngineError;

    fn key(path: &str) -> CacheKey<u32> {
        CacheKey::new(path, 0)
    }

    #[test]
    fn keys_compare_by_value() {
        assert_eq!(CacheKey::new("a.png", (1, true)), CacheKey::new(String::from("a.png"), (1, true)));
        assert_ne!(CacheKey::new("a.png", 1), CacheKey::new("a.png", 2));
    }

    #[test]
    fn put_then_get() {
        let mut b = HeadlessBackend::new();
        let mut cache = ResourceCache::new();
        let mesh = Mesh::quad(&mut b).unwrap();
        let raw = mesh.raw();

        assert!(cache.put(key("quad"), mesh).is_none());
        assert!(cache.contains(&key("quad")));
        assert_eq!(cache.get(&key("quad")).map(Mesh::raw), Some(raw));
        assert!(cache.get(&key("other")).is_none());

        cache.clear(&mut b);
    }

    #[test]
    fn put_over_existing_key_hands_back_the_old_entry() {
        let mut b = HeadlessBackend::new();
        let mut cache = ResourceCache::new();
        let first = Mesh::quad(&mut b).unwrap();
        let first_raw = first.raw();

        assert!(cache.put(key("quad"), first).is_none());
        let displaced = cache.put(key("quad"), Mesh::quad(&mut b).unwrap());
        let displaced = displaced.unwrap();
        assert_eq!(displaced.raw(), first_raw);
        assert_eq!(cache.len(), 1);

        displaced.release(&mut b);
        cache.clear(&mut b);
        assert_eq!(b.live_count(ObjectKind::Mesh), 0);
    }

    #[test]
    fn remove_releases_exactly_once() {
        let mut b = HeadlessBackend::new();
        let mut cache = ResourceCache::new();
        let mesh = Mesh::quad(&mut b).unwrap();
        let raw = mesh.raw();
        let _ = cache.put(key("quad"), mesh);

        assert!(cache.remove(&key("quad"), &mut b));
        assert!(!cache.remove(&key("quad"), &mut b));
        assert_eq!(b.delete_calls(raw), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_releases_each_entry_once() {
        let mut b = HeadlessBackend::new();
        let mut cache = ResourceCache::new();
        let mut raws = Vec::new();
        for i in 0..3 {
            let mesh = Mesh::quad(&mut b).unwrap();
            raws.push(mesh.raw());
            let _ = cache.put(CacheKey::new("quad", i), mesh);
        }

        cache.clear(&mut b);
        assert!(cache.is_empty());
        for raw in raws {
            assert_eq!(b.delete_calls(raw), 1);
        }

        // Empty cache: no-op.
        cache.clear(&mut b);
        assert_eq!(b.released_count(ObjectKind::Mesh), 3);
    }

    #[test]
    fn failed_load_is_not_inserted() {
        let mut b = HeadlessBackend::new();
        let mut cache: ResourceCache<Mesh, u32> = ResourceCache::new();

        let result = cache.get_or_try_insert_with(key("missing"), &mut b, |_| {
            Err(EngineError::NotFound("missing".into()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn load_runs_once_per_key() {
        let mut b = HeadlessBackend::new();
        let mut cache = ResourceCache::new();
        let mut loads = 0;

        for _ in 0..3 {
            cache
                .get_or_try_insert_with(key("quad"), &mut b, |b| {
                    loads += 1;
                    Mesh::quad(b)
                })
                .unwrap();
        }
        assert_eq!(loads, 1);
        assert_eq!(b.created_count(ObjectKind::Mesh), 1);
        cache.clear(&mut b);
    }
}
