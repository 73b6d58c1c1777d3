//! Run the SCE-UA optimiser on a benchmark function from the command line.
//!
//! ```text
//! run_sce --function rastrigin --dims 5 --seed 1 --termination cv --record
//! run_sce --function sch1 --max-shuffle 20
//! run_sce --config settings.yaml --function rosenbrock --dims 3
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use log::{info, warn};
use ndarray::Array1;
use sceua::{
    CandidateFactory, EventSink, FitnessKind, LatinHypercubeSampling, ObjectiveFunctionEvaluator,
    OptimizationRecorder, ParameterSet, SceConfigBuilder, SceOptions, SceSettings, ShuffledComplexEvolution,
    TerminationConfig, UniformRandomSampling,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TerminationKind {
    /// Fixed number of shuffles
    MaxShuffle,
    /// Parameter coefficient of variation below a threshold
    Cv,
    /// Best fitness stops improving
    Marginal,
    /// Wall clock limit only
    Walltime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Sampling {
    Uniform,
    Latin,
}

#[derive(Parser, Debug)]
#[command(name = "run_sce")]
#[command(about = "Shuffled Complex Evolution on benchmark functions", long_about = None)]
struct Args {
    /// Benchmark function; `sch1` runs the two-objective SCH1 problem
    #[arg(short, long, default_value = "paraboloid")]
    function: String,

    /// Number of dimensions (ignored by sch1)
    #[arg(short, long, default_value_t = 2)]
    dims: usize,

    /// Settings file (.json, .yaml or .yml); command line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// Termination condition; defaults to the settings file or max-shuffle
    #[arg(long, value_enum)]
    termination: Option<TerminationKind>,

    #[arg(long)]
    max_shuffle: Option<usize>,

    /// Coefficient of variation threshold
    #[arg(long, default_value_t = 2.5e-2)]
    cv_threshold: f64,

    /// Marginal improvement tolerance and window
    #[arg(long, default_value_t = 1e-6)]
    tolerance: f64,
    #[arg(long, default_value_t = 5)]
    cutoff: usize,

    /// Wall clock limit in hours
    #[arg(long)]
    max_hours: Option<f64>,

    /// SCE options, e.g. `rnd_in_sub_complex|reflection_randomization`
    #[arg(long)]
    options: Option<SceOptions>,

    #[arg(long, value_enum, default_value_t = Sampling::Uniform)]
    sampling: Sampling,

    /// Cap on evaluation threads
    #[arg(long)]
    threads: Option<usize>,

    /// Evaluate everything on the main thread
    #[arg(long)]
    serial: bool,

    /// Write a CSV record of the run
    #[arg(long)]
    record: bool,

    /// Directory for the record; defaults to $SCEUA_DIR/data_generated/records
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print per-shuffle progress
    #[arg(long)]
    disp: bool,
}

fn settings_from_args(args: &Args) -> Result<SceSettings, Box<dyn Error>> {
    let mut settings = match &args.config {
        Some(path) => SceSettings::from_path(path)?,
        None => SceSettings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if let Some(options) = args.options {
        settings.options = options;
    }
    if let Some(n) = args.max_shuffle {
        settings.parameters.num_shuffle = n;
    }
    let max_shuffle = settings.parameters.num_shuffle;
    match args.termination {
        Some(TerminationKind::MaxShuffle) => settings.termination = TerminationConfig::MaxShuffle { max_shuffle },
        Some(TerminationKind::Cv) => {
            settings.termination = TerminationConfig::CoefficientOfVariation {
                threshold: args.cv_threshold,
                max_hours: args.max_hours,
                max_shuffle,
            }
        }
        Some(TerminationKind::Marginal) => {
            settings.termination = TerminationConfig::MarginalImprovement {
                tolerance: args.tolerance,
                cutoff: args.cutoff,
                max_hours: args.max_hours,
            }
        }
        Some(TerminationKind::Walltime) => {
            settings.termination = TerminationConfig::MaxWalltime { max_hours: args.max_hours }
        }
        None if args.config.is_none() || args.max_shuffle.is_some() => {
            settings.termination = TerminationConfig::MaxShuffle { max_shuffle }
        }
        None => {}
    }
    if let Some(n) = args.threads {
        settings.parallel.num_threads = Some(n);
    }
    if args.serial {
        settings.parallel.enabled = false;
    }
    settings.disp |= args.disp;
    Ok(settings)
}

fn run<F: CandidateFactory<ParameterSet>>(
    args: &Args,
    settings: &SceSettings,
    evaluator: ObjectiveFunctionEvaluator,
    factory: F,
) -> Result<(), Box<dyn Error>> {
    let recorder = args.record.then(|| Arc::new(OptimizationRecorder::new(&format!("sce_{}", args.function))));
    let mut builder = SceConfigBuilder::from_settings(settings);
    if let Some(r) = &recorder {
        builder = builder.sink(r.clone() as Arc<dyn EventSink<ParameterSet>>);
    }
    let mut sce = ShuffledComplexEvolution::new(evaluator, factory, builder.build()?)?;

    // an unset SCEUA_DIR aborts here, before any evaluation
    let record_dir = match (&recorder, &args.output_dir) {
        (None, _) => None,
        (Some(_), Some(dir)) => Some(dir.clone()),
        (Some(_), None) => {
            sceua_env::check_sceua_env()?;
            Some(sceua_env::get_records_dir()?)
        }
    };

    let token = sce.cancellation_token();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived Ctrl+C, stopping after the current step...");
        token.cancel();
    })
    .map_err(|e| format!("Failed to set Ctrl+C handler: {}", e))?;

    let results = sce.evolve()?;
    println!("{}", results);

    if let (Some(recorder), Some(dir)) = (recorder, record_dir) {
        let path = recorder.save_to_csv(&dir)?;
        info!("{} records written", recorder.num_records());
        println!("Record saved to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let mut settings = settings_from_args(&args)?;

    let (template, evaluator) = if args.function == "sch1" {
        if settings.fitness != FitnessKind::ZitlerThiele {
            warn!("sch1 has two objectives, switching to Zitler-Thiele fitness");
            settings.fitness = FitnessKind::ZitlerThiele;
        }
        let template = ParameterSet::from_bounds(&[(-10.0, 10.0)])?;
        let evaluator = ObjectiveFunctionEvaluator::multi(&[("f1", false), ("f2", false)], |x: &Array1<f64>| {
            sceua_testfunctions::sch1(x)
        });
        (template, evaluator)
    } else {
        let meta = sceua_testfunctions::get_function_metadata();
        let meta = meta.get(&args.function).ok_or_else(|| {
            format!(
                "unknown function '{}', expected sch1 or one of: {}",
                args.function,
                sceua_testfunctions::function_names().join(", ")
            )
        })?;
        let template = ParameterSet::from_bounds(&meta.bounds(args.dims))?;
        let f = meta.function;
        (template, ObjectiveFunctionEvaluator::minimize(&args.function, move |x: &Array1<f64>| f(x)))
    };

    info!(
        "SCE on {} with {} variables, termination {:?}",
        args.function,
        template.variables().len(),
        settings.termination
    );
    match args.sampling {
        Sampling::Uniform => run(&args, &settings, evaluator, UniformRandomSampling::new(template)),
        Sampling::Latin => {
            let factory = LatinHypercubeSampling::new(template, LatinHypercubeSampling::<ParameterSet>::DEFAULT_DIVISIONS)?;
            run(&args, &settings, evaluator, factory)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let args = Args::parse_from([
            "run_sce",
            "--termination",
            "cv",
            "--max-shuffle",
            "7",
            "--seed",
            "3",
            "--options",
            "rnd_in_sub_complex",
            "--serial",
        ]);
        let settings = settings_from_args(&args).unwrap();
        assert_eq!(settings.seed, Some(3));
        assert_eq!(settings.options, SceOptions::RND_IN_SUB_COMPLEX);
        assert!(!settings.parallel.enabled);
        assert_eq!(
            settings.termination,
            TerminationConfig::CoefficientOfVariation { threshold: 2.5e-2, max_hours: None, max_shuffle: 7 }
        );
    }
}
