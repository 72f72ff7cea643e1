use super::Registration;
use crate::core::{Catalog, Outcome, Schedule, ScheduleBuilder, Scheduler, Slot};
use clap::Args;
use rand::prelude::*;
use std::cmp::Reverse;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Parameters of the genetic search.
#[derive(Args, Clone, Debug, PartialEq)]
pub struct GeneticConfig {
    /// Number of schedules evolved together. Must be even and at least 2.
    #[arg(short, long, default_value_t = 50)]
    pub population_size: usize,
    /// Number of generations to evolve.
    #[arg(short, long, default_value_t = 100)]
    pub generations: usize,
    /// Probability that a child gets one lesson moved to a random slot.
    #[arg(short, long, default_value_t = 0.1)]
    pub mutation_rate: f64,
    /// Seed of the random generator. Drawn from entropy when missing.
    #[arg(short, long)]
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.1,
            seed: None,
        }
    }
}

impl GeneticConfig {
    /// Checks that the parameters describe a runnable search.
    ///
    /// # Errors
    /// - If the population size is odd or smaller than 2.
    /// - If the mutation rate is not within `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 || self.population_size % 2 != 0 {
            return Err(ConfigError::PopulationSize(self.population_size));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRate(self.mutation_rate));
        }
        Ok(())
    }
}

/// Invalid genetic search parameters.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("population size must be even and at least 2, got {0}")]
    PopulationSize(usize),
    #[error("mutation rate must be within [0, 1], got {0}")]
    MutationRate(f64),
}

/// Evolves a population of random schedules towards fewer conflicts.
#[derive(Clone, Debug)]
pub struct Genetic {
    config: GeneticConfig,
    rng: StdRng,
}

impl Genetic {
    /// Creates a new genetic algorithm.
    ///
    /// # Errors
    /// - If the configuration is invalid.
    pub fn new(config: GeneticConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Ok(Self { config, rng })
    }
}

impl Default for Genetic {
    fn default() -> Self {
        let config = GeneticConfig::default();
        let rng = StdRng::from_entropy();
        Self { config, rng }
    }
}

impl Scheduler for Genetic {
    fn schedule<'a>(&mut self, catalog: &'a Catalog) -> Outcome<'a> {
        Evolution::unchecked(catalog, &self.config, &mut self.rng).run()
    }

    fn name(&self) -> &'static str {
        "genetic"
    }
}

fn init(config: &GeneticConfig) -> Result<Box<dyn Scheduler>, ConfigError> {
    Ok(Box::new(Genetic::new(config.clone())?))
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: Registration = Registration {
    name: "genetic",
    init,
};

/// Stage of an evolution run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Initializing,
    Evaluating { generation: usize },
    Terminated,
}

/// A single run of the genetic search over one catalog.
pub struct Evolution<'a, 'r, R: Rng> {
    catalog: &'a Catalog,
    config: GeneticConfig,
    rng: &'r mut R,
    phase: Phase,
    population: Vec<Schedule<'a>>,
    dropped: usize,
}

impl<'a, 'r, R: Rng> Evolution<'a, 'r, R> {
    /// Creates a run that has not built its population yet.
    ///
    /// # Errors
    /// - If the configuration is invalid.
    pub fn new(
        catalog: &'a Catalog,
        config: &GeneticConfig,
        rng: &'r mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::unchecked(catalog, config, rng))
    }

    /// Creates a run that evolves the given population instead of building one.
    /// The population size of `config` is replaced by the size of `population`.
    ///
    /// # Errors
    /// - If the population is odd or smaller than 2.
    /// - If the mutation rate is invalid.
    pub fn with_population(
        catalog: &'a Catalog,
        config: &GeneticConfig,
        rng: &'r mut R,
        population: Vec<Schedule<'a>>,
    ) -> Result<Self, ConfigError> {
        let config = GeneticConfig {
            population_size: population.len(),
            ..config.clone()
        };
        let mut evolution = Self::new(catalog, &config, rng)?;
        evolution.population = population;
        evolution.phase = evolution.after(0);
        Ok(evolution)
    }

    fn unchecked(catalog: &'a Catalog, config: &GeneticConfig, rng: &'r mut R) -> Self {
        Self {
            catalog,
            config: config.clone(),
            rng,
            phase: Phase::Initializing,
            population: Vec::new(),
            dropped: 0,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn population(&self) -> &[Schedule<'a>] {
        &self.population
    }

    /// Advances the run by one stage and returns the new phase.
    pub fn step(&mut self) -> Phase {
        self.phase = match self.phase {
            Phase::Initializing => {
                self.initialize();
                self.after(0)
            }
            Phase::Evaluating { generation } => {
                self.evolve(generation);
                self.after(generation + 1)
            }
            Phase::Terminated => Phase::Terminated,
        };
        self.phase
    }

    /// Runs every generation and returns the fittest schedule of the last one.
    pub fn run(mut self) -> Outcome<'a> {
        while self.step() != Phase::Terminated {}

        let scores = score(&self.population);
        let best = scores
            .iter()
            .enumerate()
            .min_by_key(|&(_, &score)| Reverse(score))
            .map(|(index, _)| index);

        let outcome = match best {
            Some(index) => Outcome {
                schedule: self.population.swap_remove(index),
                fitness: scores[index],
                dropped: self.dropped,
            },
            None => Outcome::new(Schedule::new(), self.dropped),
        };

        info!(
            fitness = outcome.fitness,
            lessons = outcome.schedule.len(),
            dropped = outcome.dropped,
            generations = self.config.generations,
            "evolution finished"
        );

        outcome
    }

    const fn after(&self, generation: usize) -> Phase {
        if generation < self.config.generations {
            Phase::Evaluating { generation }
        } else {
            Phase::Terminated
        }
    }

    fn initialize(&mut self) {
        let builder = ScheduleBuilder::new(self.catalog);
        let mut population = Vec::with_capacity(self.config.population_size);

        // The catalog alone decides which sessions are dropped, so the count
        // is the same for every schedule.
        for _ in 0..self.config.population_size {
            let built = builder.build(&mut *self.rng);
            self.dropped = built.dropped;
            population.push(built.schedule);
        }

        if self.dropped > 0 {
            warn!(
                dropped = self.dropped,
                "sessions without an auditorium or lecturer were left out"
            );
        }

        self.population = population;
    }

    fn evolve(&mut self, generation: usize) {
        let scores = score(&self.population);
        let Some((first, second)) = select(&scores) else {
            return;
        };

        let parents = (&self.population[first], &self.population[second]);
        let rate = self.config.mutation_rate;
        let mut next = Vec::with_capacity(self.population.len());

        for _ in 0..self.population.len() / 2 {
            next.push(mutate(crossover(parents.0, parents.1), rate, &mut *self.rng));
            next.push(mutate(crossover(parents.1, parents.0), rate, &mut *self.rng));
        }

        debug!(
            generation,
            best = scores[first],
            runner_up = scores[second],
            lessons = parents.0.len(),
            "generation evolved"
        );

        self.population = next;
    }
}

/// Scores every schedule of the population once.
#[must_use]
pub fn score(population: &[Schedule]) -> Vec<i64> {
    population.iter().map(Schedule::fitness).collect()
}

/// Returns the indices of the two fittest schedules given their scores.
/// Ties keep population order. Returns `None` for fewer than two schedules.
#[must_use]
pub fn select(scores: &[i64]) -> Option<(usize, usize)> {
    let mut order: Vec<_> = (0..scores.len()).collect();
    order.sort_by_key(|&index| Reverse(scores[index]));

    match order[..] {
        [first, second, ..] => Some((first, second)),
        _ => None,
    }
}

/// Joins the first half of `first` with the rest of `second`.
/// The cut is taken from `first`, so the child may be shorter or longer than both.
#[must_use]
pub fn crossover<'a>(first: &Schedule<'a>, second: &Schedule<'a>) -> Schedule<'a> {
    let cut = first.len() / 2;
    let head = &first.lessons()[..cut];
    let tail = second.lessons().get(cut..).unwrap_or_default();
    head.iter().chain(tail).copied().collect()
}

/// With probability `rate` moves one random lesson to a random slot.
pub fn mutate<'a>(mut schedule: Schedule<'a>, rate: f64, rng: &mut impl Rng) -> Schedule<'a> {
    if rng.gen::<f64>() < rate {
        if let Some(lesson) = schedule.lessons_mut().choose_mut(rng) {
            lesson.slot = Slot::random(rng);
        }
    }
    schedule
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::catalog::test::{auditorium, group, lecturer, subject};
    use crate::core::{ClassFormat, Lesson};
    use crate::data::samples;

    fn lessons(count: u8, lecturer: &str) -> Schedule<'_> {
        (1..=count)
            .map(|day| Lesson {
                group_id: "G1",
                subject: "S1",
                auditorium_id: "A1",
                lecturer_id: lecturer,
                slot: Slot::new(day, 1),
                class_format: ClassFormat::Lecture,
            })
            .collect()
    }

    fn catalog() -> anyhow::Result<Catalog> {
        Ok(Catalog::new(
            vec![group("G1", 10), group("G2", 30)],
            vec![auditorium("A1", 20), auditorium("A2", 40)],
            vec![
                lecturer("L1", "S1, S2", "Lecture, Exercise"),
                lecturer("L2", "S2, S3", "Lecture"),
                lecturer("L3", "S3", "Exercise"),
            ],
            vec![
                subject("S1", "G1", 2, 2),
                subject("S2", "G1", 1, 2),
                subject("S3", "G2", 2, 1),
            ],
        )?)
    }

    #[test]
    fn config_should_be_validated() {
        let config = |population_size, mutation_rate| GeneticConfig {
            population_size,
            mutation_rate,
            ..GeneticConfig::default()
        };

        assert_eq!(config(50, 0.1).validate(), Ok(()));
        assert_eq!(config(2, 1.0).validate(), Ok(()));
        assert_eq!(config(0, 0.1).validate(), Err(ConfigError::PopulationSize(0)));
        assert_eq!(config(7, 0.1).validate(), Err(ConfigError::PopulationSize(7)));
        assert_eq!(config(4, 1.5).validate(), Err(ConfigError::MutationRate(1.5)));
        assert!(Genetic::new(config(3, 0.1)).is_err());
    }

    #[test]
    fn crossover_should_splice_at_half_of_first() {
        let first = lessons(5, "L1");
        let second = lessons(4, "L2");

        let child = crossover(&first, &second);
        assert_eq!(child.len(), 2 + 2);
        assert_eq!(&child.lessons()[..2], &first.lessons()[..2]);
        assert_eq!(&child.lessons()[2..], &second.lessons()[2..]);

        let child = crossover(&second, &first);
        assert_eq!(child.len(), 2 + 3);

        let short = lessons(1, "L2");
        let child = crossover(&first, &short);
        assert_eq!(child.lessons(), &first.lessons()[..2]);

        assert!(crossover(&Schedule::new(), &Schedule::new()).is_empty());
    }

    #[test]
    fn mutation_should_move_at_most_one_lesson() {
        let mut rng = StdRng::seed_from_u64(5);
        let original = lessons(5, "L1");

        for _ in 0..200 {
            let mutated = mutate(original.clone(), 1.0, &mut rng);
            let changed = original
                .lessons()
                .iter()
                .zip(mutated.lessons())
                .filter(|(before, after)| before != after)
                .count();
            assert_eq!(mutated.len(), original.len());
            assert!(changed <= 1);
        }

        for _ in 0..200 {
            assert_eq!(mutate(original.clone(), 0.0, &mut rng), original);
        }

        assert!(mutate(Schedule::new(), 1.0, &mut rng).is_empty());
    }

    #[test]
    fn selection_should_pick_two_fittest() {
        assert_eq!(select(&[-5, 0, -3, -1]), Some((1, 3)));
        assert_eq!(select(&[-2, -1, -1, -2]), Some((1, 2)));
        assert_eq!(select(&[0, 0]), Some((0, 1)));
        assert_eq!(select(&[0]), None);

        let scores = [-9, -4, -7, -4, -12];
        let Some((first, second)) = select(&scores) else {
            panic!("two schedules expected");
        };
        for (index, &score) in scores.iter().enumerate() {
            if index != first && index != second {
                assert!(scores[first] >= score && scores[second] >= score);
            }
        }
    }

    #[test]
    fn evolution_should_walk_through_phases() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let config = GeneticConfig {
            population_size: 6,
            generations: 2,
            ..GeneticConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let mut evolution = Evolution::new(&catalog, &config, &mut rng)?;

        assert_eq!(evolution.phase(), Phase::Initializing);
        assert_eq!(evolution.step(), Phase::Evaluating { generation: 0 });
        assert_eq!(evolution.population().len(), 6);
        assert!(evolution
            .population()
            .iter()
            .all(|schedule| schedule.len() == catalog.required_sessions()));

        assert_eq!(evolution.step(), Phase::Evaluating { generation: 1 });
        assert_eq!(evolution.step(), Phase::Terminated);
        assert_eq!(evolution.population().len(), 6);
        assert_eq!(evolution.step(), Phase::Terminated);

        let outcome = evolution.run();
        assert_eq!(outcome.fitness, outcome.schedule.fitness());
        assert_eq!(outcome.dropped, 0);
        Ok(())
    }

    #[test]
    fn evolution_without_generations_should_return_initial_best() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let config = GeneticConfig {
            population_size: 4,
            generations: 0,
            ..GeneticConfig::default()
        };

        let mut rng = StdRng::seed_from_u64(3);
        let mut evolution = Evolution::new(&catalog, &config, &mut rng)?;
        assert_eq!(evolution.step(), Phase::Terminated);
        let scores = score(evolution.population());
        let best = scores.iter().copied().max();

        assert_eq!(Some(evolution.run().fitness), best);
        Ok(())
    }

    fn clashing(count: u8, lecturer: &str) -> Schedule<'_> {
        (0..count)
            .map(|_| Lesson {
                group_id: "G1",
                subject: "S1",
                auditorium_id: "A1",
                lecturer_id: lecturer,
                slot: Slot::new(1, 1),
                class_format: ClassFormat::Lecture,
            })
            .collect()
    }

    #[test]
    fn generation_should_breed_from_two_fittest() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let config = GeneticConfig {
            generations: 1,
            mutation_rate: 0.0,
            ..GeneticConfig::default()
        };
        let population = vec![
            clashing(4, "L0"),
            lessons(4, "L1"),
            clashing(4, "L2"),
            lessons(4, "L3"),
        ];
        let (best, runner_up) = (population[1].clone(), population[3].clone());
        assert!(population[0].fitness() < 0 && population[2].fitness() < 0);
        assert_eq!((best.fitness(), runner_up.fitness()), (0, 0));

        let mut rng = StdRng::seed_from_u64(6);
        let mut evolution = Evolution::with_population(&catalog, &config, &mut rng, population)?;
        assert_eq!(evolution.phase(), Phase::Evaluating { generation: 0 });
        assert_eq!(evolution.step(), Phase::Terminated);

        let forward = crossover(&best, &runner_up);
        let backward = crossover(&runner_up, &best);
        assert_ne!(forward, backward);

        let children = evolution.population();
        assert_eq!(children.len(), 4);
        for pair in children.chunks(2) {
            assert_eq!(pair, [forward.clone(), backward.clone()]);
        }
        Ok(())
    }

    #[test]
    fn final_pick_should_prefer_first_maximum() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let config = GeneticConfig {
            generations: 0,
            ..GeneticConfig::default()
        };
        let population = vec![
            clashing(3, "L0"),
            lessons(3, "L1"),
            lessons(3, "L2"),
            lessons(2, "L3"),
        ];
        let first = population[1].clone();

        let mut rng = StdRng::seed_from_u64(4);
        let evolution = Evolution::with_population(&catalog, &config, &mut rng, population)?;
        assert_eq!(evolution.phase(), Phase::Terminated);

        let outcome = evolution.run();
        assert_eq!(outcome.fitness, 0);
        assert_eq!(outcome.schedule, first);
        Ok(())
    }

    #[test]
    fn evolution_should_reject_invalid_config() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let mut rng = StdRng::seed_from_u64(1);
        let config = GeneticConfig {
            population_size: 5,
            ..GeneticConfig::default()
        };
        assert!(Evolution::new(&catalog, &config, &mut rng).is_err());

        let odd = vec![lessons(1, "L1"), lessons(1, "L2"), lessons(1, "L3")];
        let result = Evolution::with_population(&catalog, &GeneticConfig::default(), &mut rng, odd);
        assert_eq!(result.err(), Some(ConfigError::PopulationSize(3)));
        Ok(())
    }

    #[test]
    fn dropped_sessions_should_be_counted_once_per_schedule() -> anyhow::Result<()> {
        let catalog = Catalog::new(
            vec![group("G1", 50), group("G2", 5)],
            vec![auditorium("A1", 20)],
            vec![lecturer("L1", "S1, S2", "Lecture, Exercise")],
            vec![subject("S1", "G1", 2, 1), subject("S2", "G2", 1, 1)],
        )?;
        let config = GeneticConfig {
            population_size: 8,
            generations: 3,
            mutation_rate: 0.1,
            seed: Some(5),
        };

        let outcome = Genetic::new(config)?.schedule(&catalog);
        assert_eq!(outcome.dropped, 3);
        assert_eq!(outcome.schedule.len() + outcome.dropped, catalog.required_sessions());
        Ok(())
    }

    #[test]
    fn seeded_runs_should_repeat() -> anyhow::Result<()> {
        let catalog = catalog()?;
        let config = GeneticConfig {
            population_size: 2,
            generations: 1,
            mutation_rate: 0.1,
            seed: Some(42),
        };

        let first = Genetic::new(config.clone())?.schedule(&catalog);
        let second = Genetic::new(config)?.schedule(&catalog);
        assert_eq!(first, second);
        assert!(first.fitness <= 0);
        Ok(())
    }

    #[test]
    fn evolution_should_not_lose_fitness_on_conflict_free_catalog() -> anyhow::Result<()> {
        let catalog = Catalog::new(
            vec![group("G1", 10)],
            vec![auditorium("A1", 20)],
            vec![lecturer("L1", "S1", "Lecture")],
            vec![subject("S1", "G1", 1, 0)],
        )?;
        let config = GeneticConfig {
            population_size: 4,
            generations: 5,
            mutation_rate: 0.5,
            seed: Some(1),
        };

        let outcome = Genetic::new(config)?.schedule(&catalog);
        assert_eq!(outcome.fitness, 0);
        assert_eq!(outcome.schedule.len(), 1);
        Ok(())
    }

    #[test]
    fn registry_should_build_genetic() -> anyhow::Result<()> {
        let registration = super::super::find("genetic").ok_or_else(|| anyhow::anyhow!("missing"))?;
        let scheduler = (registration.init)(&GeneticConfig::default())?;
        assert_eq!(scheduler.name(), "genetic");
        Ok(())
    }

    #[test]
    fn test_genetic() -> anyhow::Result<()> {
        let config = GeneticConfig {
            population_size: 10,
            generations: 20,
            mutation_rate: 0.1,
            seed: Some(10),
        };
        let report = samples(&mut Genetic::new(config)?)?;
        assert!(report.entries().iter().all(|entry| entry.fitness <= 0));
        Ok(())
    }
}
