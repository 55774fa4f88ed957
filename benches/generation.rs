use criterion::{criterion_group, criterion_main, Criterion, black_box};

use sylvan::generation::{GenerationConfig, StemContext, TreeGenerator};
use sylvan::lod::nth_child;
use sylvan::species::{BuiltinSpecies, TreeType};

fn bench_generate_species(c: &mut Criterion) {
    for tree_type in TreeType::ALL {
        let config = GenerationConfig {
            tree_type,
            seed: 42,
            ..GenerationConfig::default()
        };
        let generator = TreeGenerator::new(config, &BuiltinSpecies);

        c.bench_function(&format!("generate_{}", tree_type.name()), |b| {
            b.iter(|| generator.generate());
        });
    }
}

fn bench_generate_low_power(c: &mut Criterion) {
    let config = GenerationConfig {
        tree_type: TreeType::Sassafras,
        seed: 42,
        ..GenerationConfig::low_power()
    };
    let generator = TreeGenerator::new(config, &BuiltinSpecies);

    c.bench_function("generate_sassafras_low_power", |b| {
        b.iter(|| generator.generate());
    });
}

fn bench_walk_trunk(c: &mut Criterion) {
    let config = GenerationConfig {
        tree_type: TreeType::Apple,
        ..GenerationConfig::default()
    };
    let generator = TreeGenerator::new(config, &BuiltinSpecies);
    let camera = generator.camera_state();
    let wind = generator.config().environment.wind_field();
    let ctx = StemContext {
        params: generator.parameters(),
        environment: &generator.config().environment,
        wind: &wind,
        lod: &generator.config().lod,
        camera: &camera,
        capacity: &generator.config().capacity,
        workers: generator.config().workers(),
    };
    let root = generator.root_task();

    c.bench_function("walk_apple_trunk", |b| {
        b.iter(|| ctx.walk(black_box(&root)));
    });
}

fn bench_nth_child(c: &mut Criterion) {
    c.bench_function("nth_child_128_at_0.37", |b| {
        b.iter(|| {
            (0..128).map(|n| nth_child(black_box(n), 128, 0.37).1).sum::<f32>()
        });
    });
}

criterion_group!(
    benches,
    bench_generate_species,
    bench_generate_low_power,
    bench_walk_trunk,
    bench_nth_child,
);
criterion_main!(benches);
