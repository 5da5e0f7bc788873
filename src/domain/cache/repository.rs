//! Cache tier trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// A single cache tier (local in-process or shared remote)
///
/// Values cross the trait as JSON strings so the trait stays dyn-compatible.
/// Use [`CacheExt`] for typed access.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets a raw JSON value from the tier
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Sets a raw JSON value with a TTL
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Deletes a value, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Deletes every key matching a glob pattern (`*` and `?` wildcards)
    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError>;

    /// Checks if a key exists
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get_raw(key).await?.is_some())
    }

    /// Clears all entries owned by this tier
    async fn clear(&self) -> Result<(), DomainError>;

    /// Returns approximate number of entries
    async fn size(&self) -> Result<usize, DomainError>;

    /// Verifies the tier is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the tier
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value with a TTL
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(key, &data, ttl).await
        }
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}

/// Converts a glob pattern into an anchored regex
pub(crate) fn glob_to_regex(pattern: &str) -> Result<regex::Regex, DomainError> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');

    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }

    expr.push('$');

    regex::Regex::new(&expr).map_err(|e| DomainError::cache(format!("Invalid pattern: {}", e)))
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock tier for testing; can be switched into a failing state at runtime
    #[derive(Debug, Default)]
    pub struct MockCache {
        entries: Mutex<HashMap<String, String>>,
        failing: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            let cache = Self::default();
            cache.set_failing(true);
            cache
        }

        pub fn with_raw_entry(self, key: &str, raw: &str) -> Self {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), raw.to_string());
            self
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn contains(&self, key: &str) -> bool {
            self.entries.lock().unwrap().contains_key(key)
        }

        fn check(&self) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.failing.load(Ordering::SeqCst) {
                return Err(DomainError::cache("Connection refused"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Cache for MockCache {
        async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
            self.check()?;
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set_raw(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), DomainError> {
            self.check()?;
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<bool, DomainError> {
            self.check()?;
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
            self.check()?;
            let regex = glob_to_regex(pattern)?;

            let mut entries = self.entries.lock().unwrap();
            let before = entries.len();
            entries.retain(|k, _| !regex.is_match(k));

            Ok(before - entries.len())
        }

        async fn clear(&self) -> Result<(), DomainError> {
            self.check()?;
            self.entries.lock().unwrap().clear();
            Ok(())
        }

        async fn size(&self) -> Result<usize, DomainError> {
            self.check()?;
            Ok(self.entries.lock().unwrap().len())
        }

        async fn ping(&self) -> Result<(), DomainError> {
            self.check()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_cache_set_get() {
            let cache = MockCache::new();
            cache
                .set("key1", &"value1", Duration::from_secs(60))
                .await
                .unwrap();

            let result: Option<String> = cache.get("key1").await.unwrap();
            assert_eq!(result, Some("value1".to_string()));
        }

        #[tokio::test]
        async fn test_mock_cache_failing_toggle() {
            let cache = MockCache::failing();
            assert!(cache.get_raw("key").await.is_err());

            cache.set_failing(false);
            assert!(cache.get_raw("key").await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_mock_cache_delete_pattern() {
            let cache = MockCache::new();
            for key in ["dict:word:run", "dict:word:runner", "dict:search:run"] {
                cache.set_raw(key, "1", Duration::from_secs(60)).await.unwrap();
            }

            let deleted = cache.delete_pattern("dict:word:*").await.unwrap();
            assert_eq!(deleted, 2);
            assert_eq!(cache.size().await.unwrap(), 1);
        }
    }
}
