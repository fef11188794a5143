use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tokio::sync::Mutex;
use tracing::debug;

/// Async in-memory cache for fee data keyed by category.
pub struct Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    name: &'static str,
    inner: Mutex<HashMap<K, V>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.inner.lock().await;
        let value = entries.get(key).cloned();
        if value.is_some() {
            debug!(cache = self.name, ?key, "Cache HIT");
        } else {
            debug!(cache = self.name, ?key, "Cache MISS");
        }
        value
    }

    pub async fn put(&self, key: K, value: V) {
        let mut entries = self.inner.lock().await;
        debug!(cache = self.name, ?key, "Cache PUT");
        entries.insert(key, value);
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
