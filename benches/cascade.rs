//! Benchmarks for the message cascade and group arithmetic.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cyclesim::config::NodeStatePolicy;
use cyclesim::group::mod_pow;
use cyclesim::{GroupParams, SimulationConfig, Simulator, Topology};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_mod_pow(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let params = GroupParams::generate(40, 8, &mut rng).unwrap();

    c.bench_function("mod_pow_48bit", |b| {
        b.iter(|| black_box(mod_pow(black_box(params.g), black_box(params.q - 1), params.p)))
    });
}

fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("scale_free_run");
    group.sample_size(20);

    let config = SimulationConfig {
        node_state: NodeStatePolicy::ResetPerRun,
        ..SimulationConfig::default()
    };

    for ttl in [2u32, 3] {
        for degree in [2usize, 3] {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            let params = GroupParams::generate(20, 8, &mut rng).unwrap();
            let graph = Topology::scale_free(degree, degree, 50, &mut rng).unwrap();
            let mut sim = Simulator::new(&graph.topology, params, config.clone(), rng);

            group.bench_with_input(
                BenchmarkId::new(format!("ttl{ttl}"), format!("m{degree}")),
                &ttl,
                |b, &ttl| b.iter(|| black_box(sim.run(ttl).unwrap().total_messages())),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_mod_pow, bench_cascade);
criterion_main!(benches);
