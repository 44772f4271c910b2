use criterion::{criterion_group, criterion_main, Criterion};
use custody::Shared;

#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub fn custody_benchmark(c: &mut Criterion) {
    c.bench_function("clone_drop", |b| {
        let owner = Shared::new(0u64);
        b.iter(|| {
            drop(owner.clone());
        })
    });
    c.bench_function("downgrade_upgrade", |b| {
        let owner = Shared::new(0u64);
        b.iter(|| {
            let observer = Shared::downgrade(&owner);
            drop(observer.upgrade());
        })
    });
    c.bench_function("new_drop", |b| {
        b.iter(|| {
            drop(Shared::new([0u8; 64]));
        })
    });
    c.bench_function("project", |b| {
        let owner = Shared::new([0u8; 64]);
        b.iter(|| {
            drop(Shared::project(owner.clone(), |bytes| &bytes[0]));
        })
    });
}

criterion_group!(benches, custody_benchmark);
criterion_main!(benches);
