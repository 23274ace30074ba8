use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use log::info;

use crate::error::Error;
use crate::tree::{GameTree, ShakmatyApplier};

/// Trees built from PGN files, kept for the life of the process.
///
/// Every caller shares the first tree stored for a path. The file is read and built without holding
/// a map lock, so loads of other paths never wait on it; concurrent first loads of one path may each
/// build, but only one tree is kept. A failed build is not remembered, so the next request tries
/// again.
#[derive(Debug, Default)]
pub struct TreeCache {
    trees: DashMap<PathBuf, Arc<GameTree>>,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, path: &Path) -> Result<Arc<GameTree>, Error> {
        if let Some(tree) = self.trees.get(path) {
            return Ok(tree.clone());
        }
        let pgn = std::fs::read_to_string(path)?;
        let tree = Arc::new(GameTree::from_pgn(&pgn, &ShakmatyApplier)?);
        let entry = self.trees.entry(path.to_path_buf()).or_insert_with(|| {
            info!("Cached game tree for {}", path.display());
            tree
        });
        Ok(entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DEMO_PGN;
    use std::io::Write;

    #[test]
    fn test_tree_is_built_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DEMO_PGN.as_bytes()).unwrap();

        let cache = TreeCache::new();
        let first = cache.get_or_load(file.path()).unwrap();
        let second = cache.get_or_load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 18);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_loads_share_one_tree() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DEMO_PGN.as_bytes()).unwrap();
        let cache = TreeCache::new();

        let trees: Vec<Arc<GameTree>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| cache.get_or_load(file.path()).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let stored = cache.get_or_load(file.path()).unwrap();
        assert!(trees.iter().all(|tree| Arc::ptr_eq(tree, &stored)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_file_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pgn");
        let cache = TreeCache::new();
        assert!(matches!(cache.get_or_load(&path), Err(Error::Io(_))));
        assert!(cache.is_empty());

        std::fs::write(&path, "1. d4 d5 *").unwrap();
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 3);
    }

    #[test]
    fn test_malformed_game_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pgn");
        std::fs::write(&path, "1. e4 e5 2. Ke3 *").unwrap();
        let cache = TreeCache::new();
        assert!(matches!(cache.get_or_load(&path), Err(Error::IllegalSan { .. })));
        assert!(cache.is_empty());
    }
}
