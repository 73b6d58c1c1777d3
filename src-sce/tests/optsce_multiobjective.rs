use ndarray::Array1;
use sceua::{
    Configuration, FitnessKind, HyperCube, ObjectiveFunctionEvaluator, ParameterSet, SceConfigBuilder, SceParameters, SceSettings,
    ShuffledComplexEvolution, TerminationConfig, UniformRandomSampling, ZitlerThieleFitnessAssignment,
};
use sceua_testfunctions::{on_sch1_front, sch1};
use std::sync::Arc;

fn sch1_evaluator() -> ObjectiveFunctionEvaluator {
    ObjectiveFunctionEvaluator::multi(&[("f1", false), ("f2", false)], |x: &Array1<f64>| sch1(x))
}

fn parameters() -> SceParameters {
    SceParameters { p: 4, pmin: 4, m: 10, q: 5, alpha: 1, beta: 10, ..SceParameters::default() }
}

#[test]
fn test_sch1_converges_to_front() {
    let template = ParameterSet::from_bounds(&[(-10.0, 10.0)]).unwrap();
    let config = SceConfigBuilder::new()
        .parameters(parameters())
        .seed(21)
        .fitness(Arc::new(ZitlerThieleFitnessAssignment::new()))
        .termination(Box::new(sceua::MaxShuffle::new(10)))
        .build()
        .unwrap();
    let mut sce = ShuffledComplexEvolution::new(sch1_evaluator(), UniformRandomSampling::new(template), config).unwrap();
    let result = sce.evolve().unwrap();
    assert_eq!(result.len(), 40);

    let on_front = |s: &sceua::ScoredPoint<ParameterSet>| {
        let f1 = s.objective(0).unwrap().value;
        let f2 = s.objective(1).unwrap().value;
        on_sch1_front(f1, f2, 1e-9)
    };
    let best = result.best().unwrap();
    assert!(on_front(best), "best point {}", best.point().describe());
    // non-dominated points have a strength below one
    assert!(result.best_fitness().unwrap() < 1.0);

    let population = result.into_population();
    let count = population.iter().filter(|s| on_front(s)).count();
    assert!(count * 10 >= population.len() * 8, "{} of {} on the front", count, population.len());
    for s in &population {
        let x = s.point().value("x0").unwrap();
        assert!((-10.0..=10.0).contains(&x));
    }
}

#[test]
fn test_zitler_thiele_from_settings() {
    let settings = SceSettings {
        parameters: parameters(),
        seed: Some(8),
        fitness: FitnessKind::ZitlerThiele,
        termination: TerminationConfig::MaxShuffle { max_shuffle: 5 },
        ..SceSettings::default()
    };
    let template = ParameterSet::from_bounds(&[(-10.0, 10.0)]).unwrap();
    let config = SceConfigBuilder::from_settings(&settings).build().unwrap();
    let mut sce = ShuffledComplexEvolution::new(sch1_evaluator(), UniformRandomSampling::new(template), config).unwrap();
    let result = sce.evolve().unwrap();
    assert_eq!(result.shuffles, 4);
    // ranked best first
    let fitness: Vec<f64> = result.ranked().iter().map(|f| f.fitness).collect();
    assert!(fitness.windows(2).all(|w| w[0] <= w[1]));
}
