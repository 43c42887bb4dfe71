use std::hint::black_box;

use criterion::{
  BenchmarkId,
  Criterion,
  criterion_group,
  criterion_main,
};
use slabcore_alloc::slab::Slab;

fn bench_slab_alloc_free(c: &mut Criterion) {
  let mut group = c.benchmark_group("slab_alloc_free");

  for size in [16usize, 64, 256, 1024] {
    group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &sz| {
      let mut slab = Slab::new(sz).unwrap();
      // Keep the chunk mapped across iterations.
      let pin = slab.alloc().unwrap();

      b.iter(|| {
        let ptr = slab.alloc().unwrap();
        black_box(ptr);
        unsafe { slab.free(ptr) };
      });

      unsafe { slab.free(pin) };
    });
  }

  group.finish();
}

fn bench_slab_reuse(c: &mut Criterion) {
  c.bench_function("slab_reuse_same_slot", |b| {
    let mut slab = Slab::new(64).unwrap();
    let pin = slab.alloc().unwrap();

    b.iter(|| {
      let ptr = slab.alloc().unwrap();
      black_box(ptr);
      unsafe { slab.free(black_box(ptr)) };
    });

    unsafe { slab.free(pin) };
  });
}

fn bench_slab_interleaved(c: &mut Criterion) {
  c.bench_function("slab_interleaved_pattern", |b| {
    let mut slab = Slab::new(128).unwrap();
    let pin = slab.alloc().unwrap();

    b.iter(|| {
      let p1 = slab.alloc().unwrap();
      let p2 = slab.alloc().unwrap();
      let p3 = slab.alloc().unwrap();
      black_box((p1, p2, p3));
      unsafe { slab.free(p2) };
      let p4 = slab.alloc().unwrap();
      black_box(p4);
      unsafe {
        slab.free(p1);
        slab.free(p3);
        slab.free(p4);
      }
    });

    unsafe { slab.free(pin) };
  });
}

fn bench_slab_fill_page(c: &mut Criterion) {
  c.bench_function("slab_fill_drain_page", |b| {
    let mut slab = Slab::new(32).unwrap();
    let pin = slab.alloc().unwrap();
    let item_count = slab.item_count();
    let mut ptrs = Vec::with_capacity(item_count);

    b.iter(|| {
      for _ in 0..item_count - 1 {
        ptrs.push(slab.alloc().unwrap());
      }
      for ptr in ptrs.drain(..) {
        unsafe { slab.free(ptr) };
      }
    });

    unsafe { slab.free(pin) };
  });
}

criterion_group!(
  benches,
  bench_slab_alloc_free,
  bench_slab_reuse,
  bench_slab_interleaved,
  bench_slab_fill_page
);
criterion_main!(benches);
