// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::common::{record, temp_persister};
use std::fs;
use vector_store::storage::{PersistenceError, StoreLocation, StorePersister};
use vector_store::VectorStore;

fn sample_store() -> VectorStore {
    let mut store = VectorStore::new();
    store
        .commit(
            vec![
                vec![0.1, -0.2, 0.3, f32::MIN_POSITIVE],
                vec![1.0e-7, 42.5, -0.0, 3.0],
                vec![f32::MAX, f32::MIN, 0.0, -1.5],
            ],
            vec![
                record("doc-a", "travel"),
                record("doc-b", "technology"),
                record("doc-c", "travel"),
            ],
        )
        .unwrap();
    store
}

#[cfg(test)]
mod round_trip_tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_is_bit_exact() {
        let (_dir, persister) = temp_persister();
        let store = sample_store();
        persister.save(&store).await.unwrap();

        let loaded = persister.load().await.unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.dimension(), Some(4));

        let original_bits: Vec<u32> = store.index().as_slice().iter().map(|x| x.to_bits()).collect();
        let loaded_bits: Vec<u32> = loaded.index().as_slice().iter().map(|x| x.to_bits()).collect();
        assert_eq!(original_bits, loaded_bits);

        for (a, b) in store.records().iter().zip(loaded.records().iter()) {
            assert_eq!(a, b);
        }
    }

    #[tokio::test]
    async fn test_load_twice_gives_equal_stores() {
        let (_dir, persister) = temp_persister();
        persister.save(&sample_store()).await.unwrap();

        let first = persister.load().await.unwrap();
        let second = persister.load().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_state() {
        let (_dir, persister) = temp_persister();
        persister.save(&sample_store()).await.unwrap();

        let mut bigger = sample_store();
        bigger
            .commit(vec![vec![9.0; 4]], vec![record("doc-d", "news")])
            .unwrap();
        persister.save(&bigger).await.unwrap();

        let loaded = persister.load().await.unwrap();
        assert_eq!(loaded.len(), 4);
        assert!(loaded.find_by_doc_id("doc-d").is_some());
    }

    #[tokio::test]
    async fn test_no_temporary_files_left_behind() {
        let (dir, persister) = temp_persister();
        persister.save(&sample_store()).await.unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["vector_index.bin", "vector_records.json"]);
    }

    #[tokio::test]
    async fn test_save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let persister = StorePersister::new(StoreLocation::new(&nested));

        persister.save(&sample_store()).await.unwrap();
        assert!(nested.join("vector_index.bin").exists());
    }

    #[tokio::test]
    async fn test_custom_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let location = StoreLocation::with_file_names(dir.path(), "faiss_index.bin", "faiss_metadata.json");
        let persister = StorePersister::new(location);

        persister.save(&sample_store()).await.unwrap();
        assert!(dir.path().join("faiss_metadata.json").exists());
        assert_eq!(persister.load().await.unwrap().len(), 3);
    }
}

#[cfg(test)]
mod failed_save_tests {
    use super::*;

    fn entries(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    // A non-empty directory at the index path makes the index rename fail
    // after the records rename has gone through.
    fn blocked_index(dir: &std::path::Path) {
        fs::create_dir(dir.join("blocked")).unwrap();
        fs::write(dir.join("blocked").join("keep"), b"x").unwrap();
    }

    #[tokio::test]
    async fn test_failed_index_rename_restores_previous_records() {
        let dir = tempfile::tempdir().unwrap();
        let good = StorePersister::new(StoreLocation::with_file_names(
            dir.path(),
            "index.bin",
            "records.json",
        ));
        good.save(&sample_store()).await.unwrap();
        let records_before = fs::read(good.location().records_path()).unwrap();

        blocked_index(dir.path());
        let blocked = StorePersister::new(StoreLocation::with_file_names(
            dir.path(),
            "blocked",
            "records.json",
        ));
        let mut other = VectorStore::new();
        other
            .commit(vec![vec![1.0; 4]], vec![record("doc-z", "misc")])
            .unwrap();

        assert!(matches!(
            blocked.save(&other).await,
            Err(PersistenceError::Io(_))
        ));

        assert_eq!(fs::read(good.location().records_path()).unwrap(), records_before);
        assert_eq!(good.load().await.unwrap(), sample_store());
        assert_eq!(entries(dir.path()), vec!["blocked", "index.bin", "records.json"]);
    }

    #[tokio::test]
    async fn test_failed_first_save_leaves_no_records_behind() {
        let dir = tempfile::tempdir().unwrap();
        blocked_index(dir.path());
        let persister = StorePersister::new(StoreLocation::with_file_names(
            dir.path(),
            "blocked",
            "records.json",
        ));

        assert!(persister.save(&sample_store()).await.is_err());
        assert_eq!(entries(dir.path()), vec!["blocked"]);
    }

    #[tokio::test]
    async fn test_failed_staging_leaves_previous_pair_untouched() {
        let (dir, persister) = temp_persister();
        persister.save(&sample_store()).await.unwrap();
        fs::create_dir(dir.path().join("vector_index.bin.tmp")).unwrap();

        let mut bigger = sample_store();
        bigger
            .commit(vec![vec![9.0; 4]], vec![record("doc-d", "news")])
            .unwrap();

        assert!(persister.save(&bigger).await.is_err());
        assert_eq!(persister.load().await.unwrap(), sample_store());
        assert_eq!(
            entries(dir.path()),
            vec!["vector_index.bin", "vector_index.bin.tmp", "vector_records.json"]
        );
    }
}

#[cfg(test)]
mod missing_and_corrupt_tests {
    use super::*;

    #[tokio::test]
    async fn test_nothing_saved_is_not_found() {
        let (_dir, persister) = temp_persister();
        assert!(matches!(
            persister.load().await,
            Err(PersistenceError::NotFound(_))
        ));

        let empty = persister.load_or_empty().await.unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.dimension(), None);
    }

    #[tokio::test]
    async fn test_one_artifact_missing_is_corrupt() {
        let (_dir, persister) = temp_persister();
        persister.save(&sample_store()).await.unwrap();
        fs::remove_file(persister.location().records_path()).unwrap();

        assert!(matches!(
            persister.load().await,
            Err(PersistenceError::Corrupt(_))
        ));
        // the empty-store fallback only covers a location with nothing in it
        assert!(matches!(
            persister.load_or_empty().await,
            Err(PersistenceError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_edited_records_are_rejected() {
        let (_dir, persister) = temp_persister();
        persister.save(&sample_store()).await.unwrap();

        let path = persister.location().records_path();
        let text = fs::read_to_string(&path).unwrap();
        fs::write(&path, text.replace("technology", "technologx")).unwrap();

        assert!(matches!(
            persister.load().await,
            Err(PersistenceError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_records_from_another_save_are_rejected() {
        let (_dir_a, first) = temp_persister();
        let (_dir_b, second) = temp_persister();
        first.save(&sample_store()).await.unwrap();

        let mut other = VectorStore::new();
        other
            .commit(vec![vec![1.0; 4]], vec![record("doc-z", "misc")])
            .unwrap();
        second.save(&other).await.unwrap();

        fs::copy(
            second.location().records_path(),
            first.location().records_path(),
        )
        .unwrap();

        assert!(matches!(
            first.load().await,
            Err(PersistenceError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_truncated_index_is_rejected() {
        let (_dir, persister) = temp_persister();
        persister.save(&sample_store()).await.unwrap();

        let path = persister.location().index_path();
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

        assert!(matches!(
            persister.load().await,
            Err(PersistenceError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_flipped_vector_bit_is_rejected() {
        let (_dir, persister) = temp_persister();
        persister.save(&sample_store()).await.unwrap();

        let path = persister.location().index_path();
        let mut bytes = fs::read(&path).unwrap();
        bytes[70] ^= 0x01;
        fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            persister.load().await,
            Err(PersistenceError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_garbage_index_is_rejected() {
        let (_dir, persister) = temp_persister();
        persister.save(&sample_store()).await.unwrap();
        fs::write(persister.location().index_path(), b"not an index").unwrap();

        assert!(matches!(
            persister.load().await,
            Err(PersistenceError::Corrupt(_))
        ));
    }
}
