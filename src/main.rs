use clap::{Parser, ValueEnum};
use rand::prelude::*;
use std::io::Write;
use timetable_genetic::algo::{self, GeneticConfig, Registration};
use timetable_genetic::data::{self, GenerateConfig};
use timetable_genetic::run_reader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug)]
struct Algorithm(&'static Registration);

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

impl ValueEnum for Algorithm {
    fn value_variants<'a>() -> &'a [Self] {
        static ALGORITHMS: std::sync::LazyLock<Vec<Algorithm>> =
            std::sync::LazyLock::new(|| algo::SCHEDULERS.iter().map(Algorithm).collect());

        ALGORITHMS.as_slice()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.0.name))
    }
}

/// Application building weekly class timetables.
#[derive(Debug, Parser)]
struct Application {
    /// Log every generation.
    #[clap(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Schedule the catalog read from stdin.
    Run {
        #[clap(default_value = "genetic")]
        algorithm: Algorithm,
        /// Print the schedule as JSON instead of a table.
        #[clap(short, long)]
        json: bool,
        #[command(flatten)]
        config: GeneticConfig,
    },
    /// Run every scheduler on a directory of catalogs.
    Bench {
        /// The input directory.
        input: String,
        /// Exclude scheduling algorithms.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Algorithm>,
        #[command(flatten)]
        config: GeneticConfig,
    },
    /// Generate random catalogs.
    Gen {
        #[command(flatten)]
        config: GenerateConfig,
        /// Number of catalogs to generate.
        #[clap(long, default_value = "1")]
        amount: std::num::NonZero<u64>,
        /// Path to output the generated catalogs. If the directory does not exist, it will be created.
        #[clap(short, long, default_value = "output")]
        output: String,
        /// Random seed.
        #[clap(long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let application = Application::parse();

    let filter = if application.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match application.command {
        Command::Run {
            algorithm,
            json,
            config,
        } => {
            let mut scheduler = (algorithm.0.init)(&config)?;
            run_reader(scheduler.as_mut(), &mut std::io::stdin().lock(), json)
        }
        Command::Bench {
            input,
            exclude,
            config,
        } => {
            let registrations = algo::SCHEDULERS.iter();
            let excluded = |r: &&Registration| exclude.iter().any(|e| e.0.name == r.name);
            for registration in registrations.filter(|r| !excluded(r)) {
                let mut scheduler = (registration.init)(&config)?;
                print!("{}", data::run(&input, scheduler.as_mut())?);
            }
            Ok(())
        }
        Command::Gen {
            config,
            amount,
            output,
            seed,
        } => {
            let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

            let output = std::path::Path::new(&output);
            if !output.try_exists()? {
                std::fs::create_dir_all(output)?;
            }

            for i in 0..amount.get() {
                let catalog = data::gen_catalog(&config, &mut rng)?;
                let filename = format!("{}_{}_{i}.json", config.groups, config.subjects);
                std::fs::File::create(output.join(&filename))?
                    .write_all(data::to_string(&catalog)?.as_bytes())?;
                info!(file = %filename, sessions = catalog.required_sessions(), "catalog generated");
            }
            Ok(())
        }
    }
}
