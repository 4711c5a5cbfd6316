//! Benchmarks for agent operations
//!
//! Run with: cargo bench -p agora-core

use agora_core::{build_agents, AgentSpec, Choice, DecisionContext, Personality};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn options(n: usize) -> Vec<Choice> {
    (0..n).map(|i| format!("option-{i}")).collect()
}

fn specs(n: usize, options: &[Choice]) -> Vec<AgentSpec> {
    (0..n)
        .map(|i| AgentSpec {
            name: format!("agent-{i}"),
            personality: Personality::ALL[i % Personality::ALL.len()],
            options: Some(options.to_vec()),
            ..AgentSpec::default()
        })
        .collect()
}

/// Benchmark building agent populations
fn bench_agent_factory(c: &mut Criterion) {
    let mut group = c.benchmark_group("agent_factory");
    let opts = options(5);

    for size in [10, 100, 1000].iter() {
        let records = specs(*size, &opts);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(build_agents(&records, Some(1))))
        });
    }

    group.finish();
}

/// Benchmark a decision round over mixed personalities
fn bench_decide(c: &mut Criterion) {
    let opts = options(5);
    let agents = build_agents(&specs(100, &opts), Some(1)).unwrap();
    let ctx = DecisionContext::new().with_majority_hint("option-2");
    let mut rng = StdRng::seed_from_u64(9);

    c.bench_function("decide_100_agents", |b| {
        b.iter(|| {
            for agent in &agents {
                black_box(agent.decide(&opts, &ctx, &mut rng).ok());
            }
        })
    });
}

/// Benchmark the learning update
fn bench_update_memory(c: &mut Criterion) {
    let opts = options(5);
    let agents = build_agents(&specs(1, &opts), Some(1)).unwrap();
    let ctx = DecisionContext::new();

    c.bench_function("update_memory", |b| {
        b.iter(|| {
            let mut agent = agents[0].clone();
            for round in 0..10 {
                let outcome = &opts[round % opts.len()];
                black_box(agent.update_memory(outcome, outcome, &ctx, &opts));
            }
        })
    });
}

criterion_group!(agent_benches, bench_agent_factory, bench_decide, bench_update_memory);
criterion_main!(agent_benches);
