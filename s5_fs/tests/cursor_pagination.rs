//! Testable property 7 (spec §8): paginating a stable listing at any
//! split point and resuming from the returned cursor yields the
//! remaining entries in the same order, for both the inline and the
//! HAMT-sharded directory representations.

use s5_core::crypto::DefaultCrypto;
use s5_core::identity::Identity;
use s5_core::testutil::MemoryNetwork;
use s5_fs::options::{ListItem, ListOptions, PutOptions};
use s5_fs::{Client, Filesystem, FsConfig, PutData};

fn filesystem(seed: u8, mut config: FsConfig) -> Filesystem {
    let identity = Identity::from_bytes(&DefaultCrypto, &[seed; 11 * 32]).unwrap();
    config.hamt_max_inline_entries = config.hamt_max_inline_entries.max(4);
    let client = Client::new(Box::new(MemoryNetwork::new()), Box::new(DefaultCrypto), &identity, config);
    Filesystem::new(client)
}

async fn full_listing(fs: &Filesystem) -> Vec<ListItem> {
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let options = match cursor.take() {
            Some(c) => ListOptions { cursor: Some(c), limit: 1000 },
            None => ListOptions { cursor: None, limit: 1000 },
        };
        let page = fs.list("home", options).await.unwrap();
        if page.is_empty() {
            break;
        }
        cursor = Some(page.last().unwrap().cursor.clone());
        all.extend(page);
    }
    all
}

async fn paginated_at(fs: &Filesystem, split: usize) -> Vec<ListItem> {
    let mut out = Vec::new();
    let first = fs.list("home", ListOptions { cursor: None, limit: split }).await.unwrap();
    let resume_cursor = first.last().map(|item| item.cursor.clone());
    out.extend(first);
    if let Some(c) = resume_cursor {
        let rest = fs.list("home", ListOptions { cursor: Some(c), limit: 1000 }).await.unwrap();
        out.extend(rest);
    }
    out
}

#[tokio::test]
async fn inline_directory_cursor_is_stable_at_every_split_point() {
    let fs = filesystem(10, FsConfig::default());
    for i in 0..9 {
        fs.put(&format!("home/f{i}.txt"), PutData::Bytes(vec![i as u8]), PutOptions::default()).await.unwrap();
    }

    let full = full_listing(&fs).await;
    assert_eq!(full.len(), 9);

    for split in 1..full.len() {
        let paginated = paginated_at(&fs, split).await;
        assert_eq!(
            paginated.iter().map(|i| i.name.clone()).collect::<Vec<_>>(),
            full.iter().map(|i| i.name.clone()).collect::<Vec<_>>(),
            "split at {split} diverged from the unpaginated listing"
        );
    }
}

#[tokio::test]
async fn sharded_directory_cursor_is_stable_at_every_split_point() {
    let mut config = FsConfig::default();
    config.hamt_threshold = 8;
    config.hamt_max_inline_entries = 4;
    let fs = filesystem(11, config);

    for i in 0..40 {
        fs.put(&format!("home/f{i:03}.txt"), PutData::Bytes(vec![i as u8]), PutOptions::default()).await.unwrap();
    }

    let full = full_listing(&fs).await;
    assert_eq!(full.len(), 40);

    for split in [1, 3, 7, 13, 20, 39] {
        let paginated = paginated_at(&fs, split).await;
        assert_eq!(paginated.len(), full.len());
        let full_names: std::collections::HashSet<_> = full.iter().map(|i| i.name.clone()).collect();
        let paginated_names: std::collections::HashSet<_> = paginated.iter().map(|i| i.name.clone()).collect();
        assert_eq!(paginated_names, full_names, "split at {split} lost or duplicated an entry");
    }
}
