// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for the stadium engine
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Registry construction and position lookup
//! - Per-tick animation cost with pulse and static groups
//! - Moving every LED between groups
//! - Save document encode/apply

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use stadium::config::SectionConfig;
use stadium::registry::{Point3, SectionOrder};
use stadium::{
    ColorBuffer, EffectKind, EngineSettings, InstallationFile, LedHandle, LedRef, LedRegistry,
    LightEngine,
};

/// Stadium-like layout: `sections` sections of 20 rows x 50 LEDs
fn layout(sections: usize) -> InstallationFile {
    let sections = (0..sections)
        .map(|s| SectionConfig {
            name: format!("Section {}", s + 1),
            rows: (0..20)
                .map(|r| {
                    (0..50)
                        .map(|i| [s as f32 * 100.0 + i as f32, r as f32 * 0.5, r as f32])
                        .collect()
                })
                .collect(),
        })
        .collect();
    InstallationFile {
        name: None,
        sections,
    }
}

/// Engine with every section split across the nine groups
fn busy_engine(sections: usize) -> LightEngine<ColorBuffer> {
    let registry = LedRegistry::build(&layout(sections), SectionOrder::Legacy);
    let len = registry.len();
    let mut engine =
        LightEngine::with_seed(registry, EngineSettings::editor(), ColorBuffer::new(len), 1).unwrap();

    for s in 0..sections {
        let group = (s % 9) as u32 + 1;
        engine.select_group(group).unwrap();
        engine.add_refs(&[LedRef::Range { section: s, offset: 0, length: 1000 }]).unwrap();
        engine.set_effect_flag(EffectKind::Pulse, true).unwrap();
        if group % 2 == 0 {
            engine.set_effect_flag(EffectKind::Static, true).unwrap();
        }
    }
    engine.reset_clock(0.0);
    engine
}

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");

    for sections in [4, 16, 64].iter() {
        let layout = layout(*sections);
        group.bench_with_input(BenchmarkId::new("build", sections), &layout, |b, layout| {
            b.iter(|| black_box(LedRegistry::build(layout, SectionOrder::Legacy).len()))
        });
    }

    let registry = LedRegistry::build(&layout(16), SectionOrder::Legacy);
    group.bench_function("find_position", |b| {
        let point = Point3::new(712.0, 4.5, 9.0);
        b.iter(|| black_box(registry.find(black_box(point))))
    });

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("animate");

    for sections in [4, 16, 64].iter() {
        group.bench_with_input(BenchmarkId::new("tick", sections), sections, |b, &sections| {
            let mut engine = busy_engine(sections);
            let mut real = 0.0;
            b.iter(|| {
                real += 1.0 / 60.0;
                black_box(engine.animate(real))
            })
        });
    }

    group.finish();
}

fn bench_group_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("groups");

    for sections in [4, 16, 64].iter() {
        group.bench_with_input(BenchmarkId::new("move_all", sections), sections, |b, &sections| {
            let mut engine = busy_engine(sections);
            let all: Vec<LedHandle> = engine.registry().handles().collect();
            let mut target = 1;
            b.iter(|| {
                target = target % 9 + 1;
                engine.select_group(target).unwrap();
                black_box(engine.add_to_group(&all).is_ok())
            })
        });
    }

    group.finish();
}

fn bench_persistence(c: &mut Criterion) {
    let mut group = c.benchmark_group("persistence");
    let engine = busy_engine(16);
    let document = engine.save_current_state();

    group.bench_function("encode", |b| b.iter(|| black_box(engine.save_current_state())));

    group.bench_function("json", |b| {
        b.iter(|| black_box(document.to_json().map(|s| s.len())))
    });

    group.bench_function("apply", |b| {
        let mut target = busy_engine(16);
        b.iter(|| black_box(target.load_state(&document).applied))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_registry,
    bench_tick,
    bench_group_moves,
    bench_persistence
);
criterion_main!(benches);
