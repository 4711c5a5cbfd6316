use agora_adversarial::consensus::{borda_count, condorcet, condorcet_winner, majority, plurality};
use agora_adversarial::{
    detect_conflicts, resolve_all, GovernanceMethod, ManipulationKind, ManipulationPlan, MediationStrategy,
};
use agora_core::{Agent, Choice, DecisionContext, Personality};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn agent(name: &str, personality: Personality, prefs: &[&str]) -> Agent {
    Agent::new(name, personality, prefs.iter().map(|p| p.to_string()).collect()).unwrap()
}

fn options(names: &[&str]) -> Vec<Choice> {
    names.iter().map(|s| s.to_string()).collect()
}

fn population() -> impl Strategy<Value = Vec<Agent>> {
    let member = (
        prop_oneof![Just(Personality::Stubborn), Just(Personality::Flexible), Just(Personality::Strategic)],
        Just(vec!["A", "B", "C"]).prop_shuffle(),
    );
    prop::collection::vec(member, 1..12).prop_map(|members| {
        members
            .into_iter()
            .enumerate()
            .map(|(i, (personality, prefs))| agent(&format!("a{i}"), personality, &prefs))
            .collect()
    })
}

proptest! {
    #[test]
    fn majority_and_plurality_agree(agents in population(), hint in prop_oneof![Just("A"), Just("B"), Just("C")]) {
        let opts = options(&["A", "B", "C"]);
        let ctx = DecisionContext::new().with_majority_hint(hint);
        let mut rng = StdRng::seed_from_u64(0);
        let m = majority(&agents, &opts, &ctx, &mut rng).unwrap();
        let p = plurality(&agents, &opts, &ctx, &mut rng).unwrap();
        prop_assert_eq!(m, p);
    }

    #[test]
    fn borda_agrees_with_condorcet_winner_on_two_options(flips in prop::collection::vec(any::<bool>(), 1..15)) {
        let agents: Vec<Agent> = flips
            .iter()
            .enumerate()
            .map(|(i, &flip)| {
                let prefs = if flip { ["B", "A"] } else { ["A", "B"] };
                agent(&format!("a{i}"), Personality::Stubborn, &prefs)
            })
            .collect();
        let opts = options(&["A", "B"]);
        if let Some(winner) = condorcet_winner(&agents, &opts) {
            prop_assert_eq!(borda_count(&agents, &opts).unwrap(), winner);
        }
    }

    #[test]
    fn every_method_picks_a_listed_option(agents in population(), seed in any::<u64>()) {
        let opts = options(&["A", "B", "C"]);
        for method in GovernanceMethod::ALL {
            let mut rng = StdRng::seed_from_u64(seed);
            let winner = method.run(&agents, &opts, &DecisionContext::new(), &mut rng).unwrap();
            prop_assert!(opts.contains(&winner));
        }
    }
}

#[test]
fn test_borda_and_condorcet_can_diverge_on_three_options() {
    // A beats B and C 3-2 pairwise, yet B has the higher Borda score (7 vs 6)
    let mut agents: Vec<Agent> = (0..3).map(|i| agent(&format!("x{i}"), Personality::Stubborn, &["A", "B", "C"])).collect();
    agents.extend((0..2).map(|i| agent(&format!("y{i}"), Personality::Stubborn, &["B", "C", "A"])));
    let opts = options(&["A", "B", "C"]);

    assert_eq!(condorcet(&agents, &opts).unwrap(), "A");
    assert_eq!(borda_count(&agents, &opts).unwrap(), "B");
}

#[test]
fn test_byzantine_four_honest_of_five() {
    let mut agents: Vec<Agent> = (0..4).map(|i| agent(&format!("h{i}"), Personality::Stubborn, &["A", "B"])).collect();
    agents.push(agent("d", Personality::Stubborn, &["B", "A"]));
    let opts = options(&["A", "B"]);

    for seed in 0..100 {
        let mut rng = StdRng::seed_from_u64(seed);
        let winner = GovernanceMethod::Byzantine
            .run(&agents, &opts, &DecisionContext::new(), &mut rng)
            .unwrap();
        assert_eq!(winner, "A");
    }
}

#[test]
fn test_flexible_follows_hint_into_majority() {
    let agents = vec![
        agent("a", Personality::Flexible, &["A", "B"]),
        agent("b", Personality::Flexible, &["A", "B"]),
        agent("c", Personality::Stubborn, &["B", "A"]),
    ];
    let opts = options(&["A", "B"]);
    let ctx = DecisionContext::new().with_majority_hint("B");
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(GovernanceMethod::Majority.run(&agents, &opts, &ctx, &mut rng).unwrap(), "B");
    // Borda reads true rankings and ignores the hint
    assert_eq!(GovernanceMethod::Borda.run(&agents, &opts, &ctx, &mut rng).unwrap(), "A");
}

#[test]
fn test_bribery_flips_narrow_majority() {
    let mut agents = vec![
        agent("a", Personality::Stubborn, &["A", "B"]),
        agent("b", Personality::Stubborn, &["A", "B"]),
        agent("c", Personality::Stubborn, &["B", "A"]),
    ];
    let opts = options(&["A", "B"]);
    let mut rng = StdRng::seed_from_u64(3);

    let bribed = ManipulationPlan::bribery("B", 2).apply(&mut agents, &mut rng);
    assert_eq!(bribed.len(), 2);
    let winner = GovernanceMethod::Majority
        .run(&agents, &opts, &DecisionContext::new(), &mut rng)
        .unwrap();
    assert_eq!(winner, "B");
}

#[test]
fn test_conflicts_resolve_with_configured_strategy() {
    let positions = vec![
        ("a".to_string(), "X".to_string()),
        ("b".to_string(), "Y".to_string()),
        ("c".to_string(), "Z".to_string()),
    ];
    let conflicts = detect_conflicts(&positions);
    assert_eq!(conflicts.len(), 3);

    let resolved = resolve_all(&conflicts, "compromise");
    assert!(resolved.iter().all(|r| r.resolution_type == MediationStrategy::Compromise));
    assert!(resolved.iter().all(|r| (r.success_probability - 0.7).abs() < 1e-12));
}

#[test]
fn test_plan_serializes_with_snake_case_kind() {
    let json = serde_json::to_value(ManipulationPlan::false_coalition("Y")).unwrap();
    assert_eq!(json["kind"], "false_coalition");
    assert_eq!(json["target"], "Y");
    assert!(json.get("noise_level").is_none());

    let plan: ManipulationPlan = serde_json::from_value(json).unwrap();
    assert_eq!(plan.kind, ManipulationKind::FalseCoalition);
}
