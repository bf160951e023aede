use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use deck::DeckContext;
use deck::config::Config;
use deck::scanner;
use deck::storage::Package;
use deck::utils::hash::hash_file;
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::{TempDir, tempdir};

fn create_tree(root: &Path, dirs: usize, files_per_dir: usize) {
    for d in 0..dirs {
        let dir = root.join(format!("dir_{d}"));
        fs::create_dir_all(&dir).unwrap();
        for f in 0..files_per_dir {
            let content = format!("file {f} in dir {d} with some content to hash");
            fs::write(dir.join(format!("file_{f}.conf")), content).unwrap();
        }
    }
}

fn context(dirs: usize, files_per_dir: usize) -> (TempDir, DeckContext) {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    create_tree(&root, dirs, files_per_dir);
    let config = Config {
        root,
        data: dir.path().join("data"),
        prune: Vec::new(),
        ignore: vec![r"\.swp$".to_string()],
        git_aware: false,
    };
    let ctx = DeckContext::open(config).unwrap();
    (dir, ctx)
}

fn benchmark_hashing(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let small_file = dir.path().join("small.txt");
    let large_file = dir.path().join("large.txt");

    fs::write(&small_file, vec![b'a'; 1024]).unwrap(); // 1KB
    fs::write(&large_file, vec![b'c'; 1024 * 1024 * 10]).unwrap(); // 10MB

    let mut group = c.benchmark_group("file_hashing");

    group.bench_function("hash_1kb", |b| b.iter(|| hash_file(black_box(&small_file))));

    group.bench_function("hash_10mb", |b| {
        b.iter(|| hash_file(black_box(&large_file)));
    });

    group.finish();
}

fn benchmark_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for files in &[100, 1000] {
        let (_dir, ctx) = context(10, files / 10);

        group.bench_with_input(BenchmarkId::new("untracked", files), &ctx, |b, ctx| {
            b.iter(|| scanner::scan(black_box(ctx), false));
        });

        scanner::scan_and_pick(&ctx, true).unwrap();
        deck::commands::commit::commit(&ctx, &Package::new("bench", "1")).unwrap();

        group.bench_with_input(BenchmarkId::new("indexed_size_only", files), &ctx, |b, ctx| {
            b.iter(|| scanner::scan(black_box(ctx), false));
        });

        group.bench_with_input(BenchmarkId::new("indexed_hashed", files), &ctx, |b, ctx| {
            b.iter(|| scanner::scan(black_box(ctx), true));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_hashing, benchmark_scan);
criterion_main!(benches);
