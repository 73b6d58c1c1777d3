use ndarray::Array1;
use sceua::{
    MaxShuffle, ObjectiveFunctionEvaluator, OptimizationResults, ParallelConfig, ParameterSet, SceConfigBuilder,
    SceOptions, SceParameters, ShuffledComplexEvolution, UniformRandomSampling,
};
use sceua_testfunctions::griewank;

fn run(seed: u64, parallel: ParallelConfig, options: SceOptions) -> OptimizationResults<ParameterSet> {
    let template = ParameterSet::from_bounds(&[(-600.0, 600.0); 3]).unwrap();
    let params = SceParameters { p: 4, pmin: 2, m: 9, q: 5, alpha: 1, beta: 9, ..SceParameters::default() };
    let config = SceConfigBuilder::new()
        .parameters(params)
        .options(options)
        .seed(seed)
        .parallel(parallel)
        .termination(Box::new(MaxShuffle::new(8)))
        .build()
        .unwrap();
    let evaluator = ObjectiveFunctionEvaluator::minimize("griewank", |x: &Array1<f64>| griewank(x));
    let mut sce = ShuffledComplexEvolution::new(evaluator, UniformRandomSampling::new(template), config).unwrap();
    sce.evolve().unwrap()
}

#[test]
fn test_same_seed_same_population() {
    for options in [
        SceOptions::NONE,
        SceOptions::RND_IN_SUB_COMPLEX,
        SceOptions::RND_IN_SUB_COMPLEX | SceOptions::REFLECTION_RANDOMIZATION,
        SceOptions::RANDOM_IN_COMPLEX,
    ] {
        let a = run(42, ParallelConfig::serial(), options);
        let b = run(42, ParallelConfig::serial(), options);
        assert_eq!(a.ranked(), b.ranked(), "options {}", options);
        assert_eq!(a.evaluations, b.evaluations);
    }
}

#[test]
fn test_different_seeds_differ() {
    let a = run(1, ParallelConfig::serial(), SceOptions::NONE);
    let b = run(2, ParallelConfig::serial(), SceOptions::NONE);
    assert_ne!(a.ranked(), b.ranked());
}

#[test]
fn test_parallel_matches_serial() {
    let serial = run(7, ParallelConfig::serial(), SceOptions::NONE);
    let parallel = run(7, ParallelConfig::default(), SceOptions::NONE);
    let capped = run(7, ParallelConfig { enabled: true, num_threads: Some(2) }, SceOptions::NONE);
    assert_eq!(serial.ranked(), parallel.ranked());
    assert_eq!(serial.ranked(), capped.ranked());
    assert_eq!(serial.evaluations, parallel.evaluations);
}

#[test]
fn test_thread_unsafe_evaluator_runs_serially() {
    let template = ParameterSet::from_bounds(&[(-1.0, 1.0); 2]).unwrap();
    let config = SceConfigBuilder::new()
        .parameters(SceParameters { p: 3, pmin: 3, m: 5, q: 3, alpha: 1, beta: 5, ..SceParameters::default() })
        .seed(5)
        .termination(Box::new(MaxShuffle::new(4)))
        .build()
        .unwrap();
    let owner = std::thread::current().id();
    let evaluator = ObjectiveFunctionEvaluator::minimize("sphere", move |x: &Array1<f64>| {
        assert_eq!(std::thread::current().id(), owner);
        x.dot(x)
    })
    .thread_safe(false);
    let mut sce = ShuffledComplexEvolution::new(evaluator, UniformRandomSampling::new(template), config).unwrap();
    assert_eq!(sce.evolve().unwrap().shuffles, 3);
    assert_eq!(sce.current_shuffle(), 4);
}
