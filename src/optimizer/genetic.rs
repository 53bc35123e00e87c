//! Genetic-search variant over the same weight simplex.
//!
//! A fixed-size population evolves by tournament selection, single-point
//! crossover (two children per parent pair), and low-probability Gaussian
//! mutation. Fitness is the Sharpe ratio minus a linear penalty for
//! max/min-weight constraint violations, so infeasible candidates survive
//! only when their raw Sharpe dominates the penalty.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::objective::{
    OptimizationConstraints, clip_and_renormalize, normalize, random_simplex_weights,
    weight_metrics,
};
use crate::portfolio::Portfolio;

/// Per-unit-violation penalty applied to the fitness.
const CONSTRAINT_PENALTY: f64 = 100.0;

/// Genetic schedule configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneticOptions {
    pub population_size: usize,
    pub generations: usize,
    pub tournament_size: usize,
    pub mutation_probability: f64,
    pub mutation_scale: f64,
}

impl Default for GeneticOptions {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            tournament_size: 3,
            mutation_probability: 0.1,
            mutation_scale: 0.1,
        }
    }
}

fn fitness(portfolio: &Portfolio, constraints: &OptimizationConstraints, weights: &[f64]) -> f64 {
    let sharpe = weight_metrics(portfolio, weights).sharpe_ratio;
    let violation: f64 = weights
        .iter()
        .map(|&w| (w - constraints.max_weight).max(0.0) + (constraints.min_weight - w).max(0.0))
        .sum();
    sharpe - violation * CONSTRAINT_PENALTY
}

fn tournament_select<R: Rng>(fitnesses: &[f64], size: usize, rng: &mut R) -> usize {
    let mut winner = rng.random_range(0..fitnesses.len());
    for _ in 1..size {
        let challenger = rng.random_range(0..fitnesses.len());
        if fitnesses[challenger] > fitnesses[winner] {
            winner = challenger;
        }
    }
    winner
}

fn crossover<R: Rng>(a: &[f64], b: &[f64], rng: &mut R) -> (Vec<f64>, Vec<f64>) {
    let n = a.len();
    let point = rng.random_range(1..n);
    let mut child_a = Vec::with_capacity(n);
    let mut child_b = Vec::with_capacity(n);
    child_a.extend_from_slice(&a[..point]);
    child_a.extend_from_slice(&b[point..]);
    child_b.extend_from_slice(&b[..point]);
    child_b.extend_from_slice(&a[point..]);
    (child_a, child_b)
}

fn mutate<R: Rng>(weights: &mut [f64], options: &GeneticOptions, rng: &mut R) {
    for w in weights.iter_mut() {
        if rng.random::<f64>() < options.mutation_probability {
            let z: f64 = StandardNormal.sample(rng);
            *w += options.mutation_scale * z;
        }
        if *w < 0.0 {
            *w = 0.0;
        }
    }
    normalize(weights);
}

/// Evolves the population and returns the best weight vector found,
/// clipped and renormalized to the shared constraint discipline.
pub fn evolve<R: Rng>(
    portfolio: &Portfolio,
    constraints: &OptimizationConstraints,
    options: &GeneticOptions,
    rng: &mut R,
) -> Vec<f64> {
    let n = portfolio.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }

    let pop_size = options.population_size.max(2);
    let mut population: Vec<Vec<f64>> = (0..pop_size)
        .map(|_| random_simplex_weights(n, rng))
        .collect();
    let mut fitnesses: Vec<f64> = population
        .iter()
        .map(|w| fitness(portfolio, constraints, w))
        .collect();

    let mut best = population[0].clone();
    let mut best_fitness = fitnesses[0];
    for (candidate, &f) in population.iter().zip(fitnesses.iter()) {
        if f > best_fitness {
            best = candidate.clone();
            best_fitness = f;
        }
    }

    for _ in 0..options.generations {
        let mut next = Vec::with_capacity(pop_size);
        while next.len() < pop_size {
            let a = tournament_select(&fitnesses, options.tournament_size, rng);
            let b = tournament_select(&fitnesses, options.tournament_size, rng);
            let (mut child_a, mut child_b) = crossover(&population[a], &population[b], rng);

            mutate(&mut child_a, options, rng);
            mutate(&mut child_b, options, rng);
            next.push(child_a);
            if next.len() < pop_size {
                next.push(child_b);
            }
        }

        population = next;
        fitnesses = population
            .iter()
            .map(|w| fitness(portfolio, constraints, w))
            .collect();

        for (candidate, &f) in population.iter().zip(fitnesses.iter()) {
            if f > best_fitness {
                best = candidate.clone();
                best_fitness = f;
            }
        }
    }

    clip_and_renormalize(&mut best, constraints.min_weight, constraints.max_weight);
    best
}
