use std::error::Error;

use criterion::{criterion_group, criterion_main, Criterion};
use osgen_core::{
    generator::{four_center_graph, three_center_graph, two_center_group},
    operator::Operator,
    GenerationRequest,
};

fn bench_two_center(c: &mut Criterion) -> Result<(), Box<dyn Error>> {
    for (operator, angular_momentum) in [
        (Operator::Overlap, [4, 4]),
        (Operator::KineticEnergy, [3, 3]),
        (Operator::NuclearPotential, [3, 3]),
        (Operator::ProjectedEcp, [3, 3]),
    ] {
        let request = GenerationRequest::new(operator, angular_momentum.to_vec());
        two_center_group(&request)?;

        c.bench_function(&format!("Two center {request}"), |b| {
            b.iter(|| two_center_group(&request))
        });
    }

    Ok(())
}

fn bench_graphs(c: &mut Criterion) -> Result<(), Box<dyn Error>> {
    let three = GenerationRequest::new(Operator::ElectronRepulsion, vec![2, 2, 2]);
    three_center_graph(&three)?;
    c.bench_function(&format!("Three center graph {three}"), |b| {
        b.iter(|| three_center_graph(&three))
    });

    for angular_momentum in [[1, 1, 1, 1], [2, 1, 2, 1], [2, 2, 2, 2]] {
        let request = GenerationRequest::new(Operator::ElectronRepulsion, angular_momentum.to_vec());
        four_center_graph(&request)?;

        c.bench_function(&format!("Four center graph {request}"), |b| {
            b.iter(|| four_center_graph(&request))
        });
    }

    Ok(())
}

fn bench_recursions(c: &mut Criterion) {
    if let Err(error) = bench_two_center(c).and_then(|_| bench_graphs(c)) {
        eprintln!("benchmark setup failed: {error}");
    }
}

criterion_group!(benches, bench_recursions);
criterion_main!(benches);
