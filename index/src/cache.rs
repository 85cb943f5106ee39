use sha2::{Digest, Sha256};
use socratic_core::Embedder;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{info, warn};

use crate::errors::{IndexError, IndexResult};
use crate::store::VectorIndex;

/// Content fingerprint for a document: SHA-256 over the raw bytes plus the
/// modification time. Keyed strictly on content identity, never the filename.
pub fn fingerprint(path: &Path) -> IndexResult<String> {
    let content = fs::read(path)
        .map_err(|e| IndexError::DocumentError(format!("failed to read document: {}", e)))?;
    let mtime = fs::metadata(path)?
        .modified()?
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(&content);
    hasher.update(mtime.as_nanos().to_le_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

fn cache_path(cache_dir: &Path, fingerprint: &str) -> PathBuf {
    cache_dir.join(format!("index_{}.json", fingerprint))
}

/// Loads a cached index for the given fingerprint. A missing or corrupt
/// entry is not an error: it returns `None` and the caller rebuilds.
pub fn load_cached(cache_dir: &Path, fingerprint: &str) -> Option<VectorIndex> {
    let path = cache_path(cache_dir, fingerprint);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(index) => Some(index),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring corrupt index cache entry");
            None
        }
    }
}

/// Writes the index to the cache. Write failures propagate.
pub fn store_cached(cache_dir: &Path, fingerprint: &str, index: &VectorIndex) -> IndexResult<()> {
    fs::create_dir_all(cache_dir)
        .map_err(|e| IndexError::CacheError(format!("failed to create cache dir: {}", e)))?;
    let content = serde_json::to_string(index)?;
    fs::write(cache_path(cache_dir, fingerprint), content)
        .map_err(|e| IndexError::CacheError(format!("failed to write cache entry: {}", e)))
}

/// Loads the index for `document` from cache, or builds and caches it.
/// The build is the one expensive startup cost per document.
pub async fn load_or_build(
    document: &Path,
    cache_dir: &Path,
    embedder: &dyn Embedder,
) -> IndexResult<VectorIndex> {
    let fp = fingerprint(document)?;

    if let Some(index) = load_cached(cache_dir, &fp) {
        info!(chunks = index.len(), "Loaded knowledge base from cache");
        return Ok(index);
    }

    info!(document = %document.display(), "Building new knowledge base");
    let text = fs::read_to_string(document)
        .map_err(|e| IndexError::DocumentError(format!("failed to read document: {}", e)))?;
    let index = VectorIndex::build(&text, embedder).await?;
    store_cached(cache_dir, &fp, &index)?;
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use socratic_core::CoreResult;

    struct UnitEmbedder;

    #[async_trait]
    impl Embedder for UnitEmbedder {
        async fn embed(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");

        fs::write(&path, "first version").unwrap();
        let fp1 = fingerprint(&path).unwrap();

        fs::write(&path, "second version").unwrap();
        let fp2 = fingerprint(&path).unwrap();

        assert_ne!(fp1, fp2);
    }

    #[test]
    fn missing_cache_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_cached(dir.path(), "deadbeef").is_none());
    }

    #[test]
    fn corrupt_cache_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index_deadbeef.json"), "{ not json").unwrap();
        assert!(load_cached(dir.path(), "deadbeef").is_none());
    }

    #[tokio::test]
    async fn load_or_build_uses_cache_on_second_call() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("paper.txt");
        fs::write(&doc, "a document about retrieval augmented generation").unwrap();
        let cache = dir.path().join("cache");

        let embedder = UnitEmbedder;
        let built = load_or_build(&doc, &cache, &embedder).await.unwrap();
        assert!(!built.is_empty());

        let fp = fingerprint(&doc).unwrap();
        assert!(load_cached(&cache, &fp).is_some());

        let reloaded = load_or_build(&doc, &cache, &embedder).await.unwrap();
        assert_eq!(reloaded.len(), built.len());
    }
}
