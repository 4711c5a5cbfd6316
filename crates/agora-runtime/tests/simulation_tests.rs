use agora_adversarial::{GovernanceMethod, ManipulationKind};
use agora_core::{build_agents, Agent, AgentSpec, Choice, DecisionContext, Personality};
use agora_runtime::{
    fairness_index, shapley_values, stability, summarize_results, Orchestrator, RobustnessSuite, Scenario,
    SimulationResult,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn specs(rankings: &[Vec<&str>]) -> Vec<AgentSpec> {
    rankings
        .iter()
        .enumerate()
        .map(|(i, r)| AgentSpec::new(format!("a{i}"), Personality::Stubborn, r))
        .collect()
}

fn stubborn(rankings: &[Vec<&str>]) -> Vec<Agent> {
    build_agents(&specs(rankings), Some(0)).unwrap()
}

fn fully_connected(n: usize) -> DecisionContext {
    DecisionContext::new().with_adjacency(vec![vec![1.0; n]; n])
}

fn with_satisfaction(satisfaction: &[f64], winner: &str) -> SimulationResult {
    let mut agents = stubborn(&[vec!["X", "Y"]]);
    let mut result = Orchestrator::seeded(0)
        .simulate(&mut agents, &Scenario::new(&["X", "Y"]), GovernanceMethod::Majority)
        .unwrap();
    result.satisfaction = satisfaction.to_vec();
    result.winner = winner.to_string();
    result
}

#[test]
fn stubborn_trio_end_to_end() {
    let mut agents = stubborn(&[vec!["X", "Y"], vec!["Y", "X"], vec!["X", "Y"]]);
    let result = Orchestrator::seeded(2024)
        .simulate(&mut agents, &Scenario::new(&["X", "Y"]), GovernanceMethod::Majority)
        .unwrap();

    assert_eq!(result.winner, "X");
    assert_eq!(result.votes, vec!["X", "Y", "X"]);
    assert_eq!(result.satisfaction, vec![1.0, 0.0, 1.0]);
}

#[test]
fn byzantine_minority_cannot_overturn_honest_majority() {
    let mut rankings = vec![vec!["A", "B"]; 4];
    rankings.push(vec!["B", "A"]);
    let scenario = Scenario::new(&["A", "B"]).with_context(DecisionContext::new().with_byzantine_ratio(0.2));

    for seed in 0..64 {
        let mut agents = stubborn(&rankings);
        let result = Orchestrator::seeded(seed)
            .simulate(&mut agents, &scenario, GovernanceMethod::Byzantine)
            .unwrap();
        assert_eq!(result.method_winner, "A");
        assert_eq!(result.winner, "A");
    }
}

#[test]
fn stability_and_fairness_bounds() {
    let same = vec![with_satisfaction(&[], "X"), with_satisfaction(&[], "X")];
    assert_eq!(stability(&same), 1.0);
    let mixed = vec![with_satisfaction(&[], "X"), with_satisfaction(&[], "X"), with_satisfaction(&[], "Y")];
    assert!(stability(&mixed) < 1.0);

    assert_eq!(fairness_index(&with_satisfaction(&[1.0, 1.0, 1.0, 1.0], "X")), 1.0);
    let four = fairness_index(&with_satisfaction(&[0.0, 0.0, 0.0, 1.0], "X"));
    assert!((four - 0.25).abs() < 1e-12);
    let mut lopsided = vec![0.0; 99];
    lopsided.push(1.0);
    assert!(fairness_index(&with_satisfaction(&lopsided, "X")) < four);
}

#[test]
fn bribery_toward_the_winner_changes_nothing() {
    // a, b and c form one bloc around a; d and e vote alone
    let mut agents = stubborn(&[vec!["X", "Y"], vec!["X", "Y"], vec!["X", "Y"], vec!["Y", "X"], vec!["X", "Y"]]);
    agents[1].trust.insert("a0".into(), 0.9);
    agents[2].trust.insert("a0".into(), 0.9);
    let scenario = Scenario::new(&["X", "Y"]);

    for seed in 0..16 {
        let results = RobustnessSuite::new()
            .with_target("X")
            .run(&mut Orchestrator::seeded(seed), &agents, &scenario, GovernanceMethod::Majority)
            .unwrap();
        assert_eq!(results[0].winner, "X");
        assert_eq!(results[0].coalitions.as_ref().map(Vec::len), Some(3));
        for r in results.iter().filter(|r| r.manipulation_type == Some(ManipulationKind::Bribery)) {
            assert_eq!(r.winner, "X");
        }
    }
}

#[test]
fn bribery_toward_the_runner_up_can_flip_the_outcome() {
    let mut agents = stubborn(&[vec!["X", "Y"], vec!["X", "Y"], vec!["X", "Y"], vec!["Y", "X"], vec!["X", "Y"]]);
    agents[1].trust.insert("a0".into(), 0.9);
    agents[2].trust.insert("a0".into(), 0.9);
    let scenario = Scenario::new(&["X", "Y"]);

    let flipped = (0..32).any(|seed| {
        let results = RobustnessSuite::new()
            .run(&mut Orchestrator::seeded(seed), &agents, &scenario, GovernanceMethod::Majority)
            .unwrap();
        // bribery(2) is the fifth result
        results[4].bribery_budget == Some(2) && results[4].winner == "Y"
    });
    assert!(flipped);
}

#[test]
fn learning_accumulates_across_rounds() {
    let mut agents = stubborn(&[vec!["X", "Y"], vec!["Y", "X"], vec!["X", "Y"]]);
    let scenario = Scenario::new(&["X", "Y"]);
    let mut orchestrator = Orchestrator::seeded(8);
    let results: Vec<SimulationResult> = (0..4)
        .map(|_| orchestrator.simulate(&mut agents, &scenario, GovernanceMethod::Majority).unwrap())
        .collect();

    assert_eq!(agents[1].satisfaction_history, vec![0.0; 4]);
    // persistently unhappy stubborn agent turns flexible after three rounds
    assert_eq!(agents[1].personality, Personality::Flexible);
    assert_eq!(agents[1].adapted_from, Some(Personality::Stubborn));
    assert_eq!(agents[0].personality, Personality::Stubborn);

    let summary = summarize_results(&results, 10);
    assert_eq!(summary.runs, 4);
    assert_eq!(summary.stability, 1.0);
}

fn rankings() -> impl Strategy<Value = Vec<Vec<&'static str>>> {
    prop::collection::vec(Just(vec!["A", "B", "C"]).prop_shuffle(), 1..10)
}

proptest! {
    #[test]
    fn shapley_payoffs_sum_to_grand_coalition_value(
        weights in prop::collection::vec(0.0f64..5.0, 1..7),
        seed in any::<u64>(),
    ) {
        // superadditive game: worth is the square of total weight
        let value = |s: &[usize]| {
            let total: f64 = s.iter().map(|&p| weights[p]).sum();
            total * total
        };
        let grand: f64 = weights.iter().sum::<f64>().powi(2);
        let mut rng = StdRng::seed_from_u64(seed);

        let (exact, _) = shapley_values(weights.len(), &value, 8, 0, &mut rng);
        prop_assert!((exact.iter().sum::<f64>() - grand).abs() < 1e-6 * grand.max(1.0));

        let (sampled, _) = shapley_values(weights.len(), &value, 0, 25, &mut rng);
        prop_assert!((sampled.iter().sum::<f64>() - grand).abs() < 1e-6 * grand.max(1.0));
    }

    #[test]
    fn gossip_on_complete_graph_matches_majority(rankings in rankings(), seed in any::<u64>()) {
        let options: Vec<Choice> = vec!["A".into(), "B".into(), "C".into()];
        let scenario = Scenario {
            options: options.clone(),
            context: fully_connected(rankings.len()),
            ..Scenario::default()
        };
        let mut agents = stubborn(&rankings);
        let majority = GovernanceMethod::Majority
            .run(&agents, &options, &DecisionContext::new(), &mut StdRng::seed_from_u64(seed))
            .unwrap();

        let result = Orchestrator::seeded(seed)
            .simulate(&mut agents, &scenario, GovernanceMethod::Majority)
            .unwrap();
        prop_assert!(result.networked);
        prop_assert_eq!(&result.winner, &majority);
        // one round to agree, one more to observe the fixed point
        prop_assert!(result.rounds <= 2);
        prop_assert!(result.votes.iter().all(|v| *v == majority));
    }

    #[test]
    fn coalition_payoffs_sum_to_members_backing_winner(rankings in rankings(), seed in any::<u64>()) {
        let mut agents = stubborn(&rankings);
        // chain everyone's trust onto the first agent to form one large bloc
        for agent in agents.iter_mut().skip(1) {
            agent.trust.insert("a0".into(), 0.95);
        }
        let result = Orchestrator::seeded(seed)
            .simulate(&mut agents, &Scenario::new(&["A", "B", "C"]), GovernanceMethod::Borda)
            .unwrap();

        let backing = agents.iter().filter(|a| a.preferences[0] == result.winner).count() as f64;
        let paid: f64 = result.coalition_payoffs.as_ref().unwrap().values().sum();
        prop_assert!((paid - backing).abs() < 1e-9);
        prop_assert_eq!(result.coalitions.as_ref().map(Vec::len), Some(1));
    }
}
