//! Response Cache
//!
//! Content-addressed store mapping (model, prompt) to a previously generated
//! response, one JSON file per entry.
//!
//! ## Layout
//!
//! `{cache_dir}/{sha256("{model}:{prompt}")}.json` holding
//! `{prompt (first 200 chars), model, response, timestamp}`.
//!
//! ## Eviction
//!
//! - **Count**: before a write, the oldest entries by last-modified time are
//!   removed so that at most `max_entries` remain once the write lands.
//! - **Age**: entries whose last-modified time is older than `max_age` are
//!   removed by the cleanup that runs before each write and by `prune`.
//!   Reads never check age.
//!
//! Every cache fault is logged and degrades to a miss or a skipped write.
//! There is no locking; concurrent writers may duplicate work or lose an
//! update, but each record is written whole through a rename.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::constants::cache as cache_constants;
use crate::types::Result;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub cache_dir: PathBuf,
    pub max_age: Duration,
    pub max_entries: usize,
}

impl CacheConfig {
    pub fn from_agent(agent: &AgentConfig) -> Self {
        Self {
            cache_dir: agent.cache_dir.clone(),
            max_age: agent.cache_max_age(),
            max_entries: agent.cache_max_entries,
        }
    }
}

/// Persisted cache record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Prompt preview, for debugging only
    pub prompt: String,
    pub model: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub entry_count: usize,
    pub total_size_bytes: u64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

/// Outcome of a cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub expired: usize,
    pub evicted: usize,
}

impl PruneReport {
    pub fn total(&self) -> usize {
        self.expired + self.evicted
    }
}

#[derive(Debug)]
struct StoredFile {
    path: PathBuf,
    modified: SystemTime,
    size: u64,
}

/// File-backed response cache
#[derive(Debug, Clone)]
pub struct ResponseCache {
    config: CacheConfig,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Stable key for a (prompt, model) pair
    pub fn key(prompt: &str, model: &str) -> String {
        let digest = Sha256::digest(format!("{}:{}", model, prompt).as_bytes());
        format!("{:x}", digest)
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(format!("{}.{}", key, cache_constants::RECORD_EXTENSION))
    }

    fn is_expired(&self, modified: SystemTime, now: SystemTime) -> bool {
        now.duration_since(modified).unwrap_or_default() > self.config.max_age
    }

    /// Look up a cached response. Never fails: absence, corruption and read
    /// errors are all reported as a miss.
    pub async fn get(&self, prompt: &str, model: &str) -> Option<String> {
        let key = Self::key(prompt, model);
        let path = self.record_path(&key);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Cache read failed for {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<CacheRecord>(&content) {
            Ok(record) if record.model == model => {
                debug!("Cache hit {}", &key[..12]);
                Some(record.response)
            }
            Ok(record) => {
                warn!(
                    "Cache entry {} belongs to model '{}', expected '{}'",
                    &key[..12],
                    record.model,
                    model
                );
                None
            }
            Err(e) => {
                warn!("Corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Store a response, running cleanup first. Failures are logged and the
    /// write is skipped.
    pub async fn set(&self, prompt: &str, model: &str, response: &str) {
        if self.config.max_entries == 0 {
            debug!("Cache write skipped: max_entries is 0");
            return;
        }

        let key = Self::key(prompt, model);
        let path = self.record_path(&key);

        if let Err(e) = tokio::fs::create_dir_all(&self.config.cache_dir).await {
            warn!(
                "Cache write skipped, cannot create {}: {}",
                self.config.cache_dir.display(),
                e
            );
            return;
        }

        // Leave one slot for the incoming record unless it overwrites
        let limit = self.config.max_entries - 1;
        if let Err(e) = self.cleanup(limit, Some(&path)).await {
            warn!("Cache cleanup failed: {}", e);
        }

        let record = CacheRecord {
            prompt: prompt
                .chars()
                .take(cache_constants::PROMPT_PREVIEW_CHARS)
                .collect(),
            model: model.to_string(),
            response: response.to_string(),
            timestamp: Utc::now(),
        };

        if let Err(e) = self.write_record(&path, &record).await {
            warn!("Cache write failed for {}: {}", path.display(), e);
        } else {
            debug!("Cached response {}", &key[..12]);
        }
    }

    async fn write_record(&self, path: &Path, record: &CacheRecord) -> Result<()> {
        let content = serde_json::to_string_pretty(record)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Remove expired entries and evict the oldest beyond `max_entries`.
    pub async fn prune(&self) -> Result<PruneReport> {
        let report = self.cleanup(self.config.max_entries, None).await?;
        if report.total() > 0 {
            info!(
                "Pruned cache: {} expired, {} evicted",
                report.expired, report.evicted
            );
        }
        Ok(report)
    }

    /// Keep at most `limit` entries other than `keep`, newest first, and drop
    /// anything past `max_age`.
    async fn cleanup(&self, limit: usize, keep: Option<&Path>) -> Result<PruneReport> {
        let mut files = self.list_files().await?;
        let mut report = PruneReport::default();

        if let Some(keep) = keep {
            files.retain(|f| f.path != keep);
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified));

        let now = SystemTime::now();
        for (rank, file) in files.iter().enumerate() {
            let expired = self.is_expired(file.modified, now);
            if rank < limit && !expired {
                continue;
            }
            match tokio::fs::remove_file(&file.path).await {
                Ok(()) if expired => report.expired += 1,
                Ok(()) => report.evicted += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Cannot remove cache entry {}: {}", file.path.display(), e),
            }
        }

        Ok(report)
    }

    async fn list_files(&self) -> Result<Vec<StoredFile>> {
        let mut files = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.config.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path
                .extension()
                .is_some_and(|e| e == cache_constants::RECORD_EXTENSION)
            {
                continue;
            }
            match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => files.push(StoredFile {
                    path,
                    modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                    size: metadata.len(),
                }),
                Ok(_) => {}
                Err(e) => warn!("Cannot stat cache entry {}: {}", path.display(), e),
            }
        }

        Ok(files)
    }

    /// Delete every cache record
    pub async fn clear(&self) -> Result<usize> {
        let mut count = 0;
        for file in self.list_files().await? {
            tokio::fs::remove_file(&file.path).await?;
            count += 1;
        }
        info!("Cleared {} cache entries", count);
        Ok(count)
    }

    /// Get cache statistics
    pub async fn stats(&self) -> Result<CacheStats> {
        let files = self.list_files().await?;
        let to_utc = |t: SystemTime| DateTime::<Utc>::from(t);

        Ok(CacheStats {
            entry_count: files.len(),
            total_size_bytes: files.iter().map(|f| f.size).sum(),
            oldest_entry: files.iter().map(|f| f.modified).min().map(to_utc),
            newest_entry: files.iter().map(|f| f.modified).max().map(to_utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir, max_entries: usize) -> ResponseCache {
        ResponseCache::new(CacheConfig {
            cache_dir: dir.path().join("cache"),
            max_age: Duration::from_secs(24 * 3600),
            max_entries,
        })
    }

    fn set_mtime(path: &Path, age: Duration) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    fn count_records(cache: &ResponseCache) -> usize {
        std::fs::read_dir(&cache.config().cache_dir)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .path()
                    .extension()
                    .is_some_and(|x| x == "json")
            })
            .count()
    }

    #[test]
    fn test_key_is_stable_and_model_sensitive() {
        let a = ResponseCache::key("prompt", "model-a");
        assert_eq!(a, ResponseCache::key("prompt", "model-a"));
        assert_ne!(a, ResponseCache::key("prompt", "model-b"));
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        cache.set("Explain main.py", "llama3", "It prints hello").await;
        assert_eq!(
            cache.get("Explain main.py", "llama3").await.as_deref(),
            Some("It prints hello")
        );
        assert_eq!(cache.get("Explain main.py", "mistral").await, None);
    }

    #[tokio::test]
    async fn test_record_truncates_prompt_preview() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);
        let prompt = "x".repeat(500);

        cache.set(&prompt, "m", "r").await;

        let path = cache.record_path(&ResponseCache::key(&prompt, "m"));
        let record: CacheRecord =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(record.prompt.len(), 200);
        assert_eq!(record.response, "r");
        assert_eq!(record.model, "m");
    }

    #[tokio::test]
    async fn test_get_missing_dir_is_miss() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);
        assert_eq!(cache.get("p", "m").await, None);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_miss() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);
        std::fs::create_dir_all(&cache.config().cache_dir).unwrap();
        std::fs::write(cache.record_path(&ResponseCache::key("p", "m")), "{not json").unwrap();

        assert_eq!(cache.get("p", "m").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_readable_until_pruned() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);
        cache.set("old", "m", "stale").await;
        cache.set("new", "m", "fresh").await;
        set_mtime(
            &cache.record_path(&ResponseCache::key("old", "m")),
            Duration::from_secs(25 * 3600),
        );

        assert_eq!(cache.get("old", "m").await.as_deref(), Some("stale"));
        assert_eq!(cache.get("new", "m").await.as_deref(), Some("fresh"));

        let report = cache.prune().await.unwrap();
        assert_eq!(report.expired, 1);
        assert_eq!(count_records(&cache), 1);
        assert_eq!(cache.get("old", "m").await, None);
    }

    #[tokio::test]
    async fn test_zero_max_age_still_round_trips() {
        let dir = TempDir::new().unwrap();
        let cache = ResponseCache::new(CacheConfig {
            cache_dir: dir.path().join("cache"),
            max_age: Duration::ZERO,
            max_entries: 10,
        });

        cache.set("prompt", "model", "response").await;
        assert_eq!(
            cache.get("prompt", "model").await.as_deref(),
            Some("response")
        );
    }

    #[tokio::test]
    async fn test_prune_keeps_most_recent() {
        let dir = TempDir::new().unwrap();
        let filler = cache_in(&dir, 100);
        for i in 0..5 {
            filler.set(&format!("prompt-{}", i), "m", "r").await;
        }
        // prompt-4 is newest, prompt-0 oldest
        for i in 0..5 {
            set_mtime(
                &filler.record_path(&ResponseCache::key(&format!("prompt-{}", i), "m")),
                Duration::from_secs(60 * (10 - i as u64)),
            );
        }

        let cache = cache_in(&dir, 3);
        let report = cache.prune().await.unwrap();
        assert_eq!(report.evicted, 2);
        assert_eq!(count_records(&cache), 3);
        for i in 0..2 {
            assert_eq!(cache.get(&format!("prompt-{}", i), "m").await, None);
        }
        for i in 2..5 {
            assert!(cache.get(&format!("prompt-{}", i), "m").await.is_some());
        }
    }

    #[tokio::test]
    async fn test_set_respects_max_entries() {
        let dir = TempDir::new().unwrap();
        let filler = cache_in(&dir, 100);
        for i in 0..4 {
            filler.set(&format!("prompt-{}", i), "m", "r").await;
            set_mtime(
                &filler.record_path(&ResponseCache::key(&format!("prompt-{}", i), "m")),
                Duration::from_secs(60 * (10 - i as u64)),
            );
        }

        let cache = cache_in(&dir, 3);
        cache.set("incoming", "m", "new").await;

        assert_eq!(count_records(&cache), 3);
        assert_eq!(cache.get("incoming", "m").await.as_deref(), Some("new"));
        assert!(cache.get("prompt-3", "m").await.is_some());
        assert!(cache.get("prompt-2", "m").await.is_some());
        assert_eq!(cache.get("prompt-1", "m").await, None);
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 2);
        cache.set("a", "m", "1").await;
        cache.set("b", "m", "2").await;
        cache.set("b", "m", "3").await;

        assert_eq!(count_records(&cache), 2);
        assert_eq!(cache.get("b", "m").await.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_zero_max_entries_skips_writes() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 0);
        cache.set("p", "m", "r").await;
        assert_eq!(cache.get("p", "m").await, None);
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);
        cache.set("a", "m", "1").await;
        cache.set("b", "m", "2").await;

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entry_count, 2);
        assert!(stats.total_size_bytes > 0);
        assert!(stats.oldest_entry <= stats.newest_entry);

        assert_eq!(cache.clear().await.unwrap(), 2);
        assert_eq!(cache.stats().await.unwrap().entry_count, 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_set_then_get_round_trips(
            prompt in "\\PC{1,300}",
            model in "[a-z0-9:.-]{1,20}",
            response in "\\PC{1,200}",
        ) {
            let dir = TempDir::new().unwrap();
            let cache = cache_in(&dir, 10);
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let got = rt.block_on(async {
                cache.set(&prompt, &model, &response).await;
                cache.get(&prompt, &model).await
            });
            prop_assert_eq!(got, Some(response));
        }
    }
}
