//! Trust-based coalitions and Shapley payoffs

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

use agora_core::{Agent, Choice};

/// Greedily partition `agents` into coalitions.
///
/// Agents are taken in order; each unassigned agent seeds a coalition and
/// pulls in every later unassigned agent whose trust toward the seed
/// exceeds `threshold`. Every agent ends up in exactly one coalition,
/// possibly alone. Coalition labels are written to `Agent::coalition`.
pub fn form_coalitions(agents: &mut [Agent], threshold: f64) -> Vec<Vec<usize>> {
    agents.iter_mut().for_each(|a| a.coalition = None);

    let mut assigned = vec![false; agents.len()];
    let mut coalitions = Vec::new();
    for seed in 0..agents.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut members = vec![seed];
        for candidate in seed + 1..agents.len() {
            if !assigned[candidate] && agents[candidate].trust_in(&agents[seed].name) > threshold {
                assigned[candidate] = true;
                members.push(candidate);
            }
        }

        let label = format!("coalition-{}", coalitions.len());
        for &i in &members {
            agents[i].coalition = Some(label.clone());
        }
        coalitions.push(members);
    }

    tracing::debug!(
        coalitions = coalitions.len(),
        largest = coalitions.iter().map(Vec::len).max().unwrap_or(0),
        "Coalitions formed"
    );
    coalitions
}

/// Payoff division strategy actually used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapleyMode {
    Exact,
    Sampled(usize),
}

/// Shapley value of each of `n` players under the characteristic function
/// `value`, which maps a set of player indices to its worth.
///
/// Up to `exact_limit` players every ordering is enumerated. Larger games
/// average the marginals of `samples` random orderings (at least one);
/// each ordering's marginals telescope to `value(all)`, so payoffs still
/// sum to it.
pub fn shapley_values<F, R>(n: usize, value: F, exact_limit: usize, samples: usize, rng: &mut R) -> (Vec<f64>, ShapleyMode)
where
    F: Fn(&[usize]) -> f64 + Sync,
    R: Rng + ?Sized,
{
    if n == 0 {
        return (Vec::new(), ShapleyMode::Exact);
    }
    if n <= exact_limit {
        return (exact_shapley(n, &value), ShapleyMode::Exact);
    }
    if samples == 0 {
        tracing::warn!(players = n, exact_limit, "Shapley sampling disabled above the exact limit, using one ordering");
    }
    let samples = samples.max(1);
    (sampled_shapley(n, &value, samples, rng), ShapleyMode::Sampled(samples))
}

fn factorial(k: usize) -> f64 {
    (1..=k).map(|i| i as f64).product()
}

fn exact_shapley<F: Fn(&[usize]) -> f64 + Sync>(n: usize, value: &F) -> Vec<f64> {
    let empty = value(&[]);
    // one subtree per first player, summed in order
    let partials: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|first| {
            let mut totals = vec![0.0; n];
            let mut prefix = vec![first];
            let mut remaining: Vec<usize> = (0..n).filter(|&p| p != first).collect();
            let worth = value(&prefix);
            totals[first] += (worth - empty) * factorial(n - 1);
            walk(&mut prefix, &mut remaining, worth, value, &mut totals);
            totals
        })
        .collect();

    let orderings = factorial(n);
    let mut payoffs = vec![0.0; n];
    for partial in partials {
        for (p, v) in payoffs.iter_mut().zip(partial) {
            *p += v;
        }
    }
    payoffs.iter_mut().for_each(|p| *p /= orderings);
    payoffs
}

/// Visit every extension of `prefix`. A player joining at this node
/// contributes its marginal once per ordering passing through the node.
fn walk<F: Fn(&[usize]) -> f64>(
    prefix: &mut Vec<usize>,
    remaining: &mut Vec<usize>,
    prefix_worth: f64,
    value: &F,
    totals: &mut [f64],
) {
    for i in 0..remaining.len() {
        let player = remaining.swap_remove(i);
        prefix.push(player);
        let worth = value(prefix);
        totals[player] += (worth - prefix_worth) * factorial(remaining.len());
        walk(prefix, remaining, worth, value, totals);
        prefix.pop();
        remaining.push(player);
        let last = remaining.len() - 1;
        remaining.swap(i, last);
    }
}

fn sampled_shapley<F: Fn(&[usize]) -> f64, R: Rng + ?Sized>(
    n: usize,
    value: &F,
    samples: usize,
    rng: &mut R,
) -> Vec<f64> {
    let mut totals = vec![0.0; n];
    let mut order: Vec<usize> = (0..n).collect();
    for _ in 0..samples {
        order.shuffle(rng);
        let mut previous = value(&[]);
        for k in 1..=n {
            let worth = value(&order[..k]);
            totals[order[k - 1]] += worth - previous;
            previous = worth;
        }
    }
    totals.iter_mut().for_each(|t| *t /= samples as f64);
    totals
}

/// Shapley payoffs for one coalition, where a coalition's worth is the
/// number of its members whose top preference is `winner`
pub fn coalition_payoffs<R: Rng + ?Sized>(
    tops: &[&Choice],
    winner: &str,
    exact_limit: usize,
    samples: usize,
    rng: &mut R,
) -> Vec<f64> {
    let value = |members: &[usize]| members.iter().filter(|&&m| tops[m] == winner).count() as f64;
    let (payoffs, mode) = shapley_values(tops.len(), value, exact_limit, samples, rng);
    tracing::debug!(members = tops.len(), ?mode, "Shapley payoffs computed");
    payoffs
}
