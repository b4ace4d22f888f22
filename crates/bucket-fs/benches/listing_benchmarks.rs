use std::sync::Arc;

use bucket_fs::{
    BoundedFilesystem, CacheConfig, CachedAdapter, Classifier, FilesystemConfig, MemoryCache,
    StorePath,
};
use bucket_test_utils::seeded_memory;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn seeded_paths(count: usize) -> Vec<String> {
    let extensions = ["png", "json", "yml", "pdf", "bin"];
    (0..count)
        .map(|i| format!("dir{}/file{i}.{}", i % 10, extensions[i % extensions.len()]))
        .collect()
}

fn listing_benchmark(c: &mut Criterion) {
    let paths = seeded_paths(2_000);
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();

    c.bench_function("list_contents (recursive, limit 1000)", |b| {
        let filesystem = BoundedFilesystem::new(seeded_memory(&refs), FilesystemConfig::default());
        b.iter(|| {
            let handles = filesystem.list_contents(black_box(""), true).unwrap();
            assert_eq!(handles.len(), 1000);
        })
    });

    c.bench_function("list_contents (recursive, cached)", |b| {
        let cached = CachedAdapter::new(
            seeded_memory(&refs),
            Arc::new(MemoryCache::new()),
            CacheConfig::new("bench", 0),
        );
        let filesystem = BoundedFilesystem::new(cached, FilesystemConfig::default());
        b.iter(|| {
            let _ = filesystem.list_contents(black_box(""), true).unwrap();
        })
    });
}

fn classify_benchmark(c: &mut Criterion) {
    let classifier = Classifier::default();
    let entries: Vec<_> = seeded_paths(100)
        .iter()
        .map(|p| bucket_fs::Entry::file(StorePath::parse(p).unwrap(), 0))
        .collect();

    c.bench_function("Classifier::classify (100 entries)", |b| {
        b.iter(|| {
            for entry in &entries {
                black_box(classifier.classify(black_box(entry)));
            }
        })
    });
}

criterion_group!(benches, listing_benchmark, classify_benchmark);
criterion_main!(benches);
