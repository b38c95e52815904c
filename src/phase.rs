use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};

/// Where the table is within a single turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    AwaitingAction,
    AwaitingChallenges,
    // the actor's claim is being checked
    BluffResolution,
    AwaitingCounters,
    // the actor decides whether to challenge the counter
    AwaitingCounterChallenge,
    // the counterer's claim is being checked
    CounterBluffResolution,
    ApplyEffect,
    AdvanceTurn,
    GameOver,
}

pub static PHASE_VARIANTS: [Phase; 9] = [
    Phase::AwaitingAction,
    Phase::AwaitingChallenges,
    Phase::BluffResolution,
    Phase::AwaitingCounters,
    Phase::AwaitingCounterChallenge,
    Phase::CounterBluffResolution,
    Phase::ApplyEffect,
    Phase::AdvanceTurn,
    Phase::GameOver,
];

static TRANSITIONS: [(Phase, Phase); 19] = [
    (Phase::AwaitingAction, Phase::AwaitingChallenges),
    (Phase::AwaitingAction, Phase::AwaitingCounters),
    (Phase::AwaitingAction, Phase::ApplyEffect),
    (Phase::AwaitingChallenges, Phase::BluffResolution),
    (Phase::AwaitingChallenges, Phase::AwaitingCounters),
    (Phase::AwaitingChallenges, Phase::ApplyEffect),
    // bluff caught, the action is dropped
    (Phase::BluffResolution, Phase::AdvanceTurn),
    (Phase::BluffResolution, Phase::AwaitingCounters),
    (Phase::BluffResolution, Phase::ApplyEffect),
    (Phase::BluffResolution, Phase::GameOver),
    (Phase::AwaitingCounters, Phase::AwaitingCounterChallenge),
    (Phase::AwaitingCounters, Phase::ApplyEffect),
    // the counter stands
    (Phase::AwaitingCounterChallenge, Phase::AdvanceTurn),
    (Phase::AwaitingCounterChallenge, Phase::CounterBluffResolution),
    (Phase::CounterBluffResolution, Phase::ApplyEffect),
    (Phase::CounterBluffResolution, Phase::AdvanceTurn),
    (Phase::CounterBluffResolution, Phase::GameOver),
    (Phase::ApplyEffect, Phase::AdvanceTurn),
    (Phase::ApplyEffect, Phase::GameOver),
];

/// Every legal phase change. `AdvanceTurn -> AwaitingAction` closes the loop
/// into the next turn, `AdvanceTurn -> GameOver` ends the game.
#[derive(Clone, Debug)]
pub struct PhaseGraph {
    graph: DiGraphMap<Phase, ()>,
}

impl PhaseGraph {
    pub fn new() -> Self {
        let mut graph = DiGraphMap::with_capacity(PHASE_VARIANTS.len(), TRANSITIONS.len() + 2);
        for phase in PHASE_VARIANTS {
            graph.add_node(phase);
        }
        for (from, to) in TRANSITIONS.iter().copied() {
            graph.add_edge(from, to, ());
        }
        graph.add_edge(Phase::AdvanceTurn, Phase::AwaitingAction, ());
        graph.add_edge(Phase::AdvanceTurn, Phase::GameOver, ());

        Self { graph }
    }

    pub fn allows(&self, from: Phase, to: Phase) -> bool {
        self.graph.contains_edge(from, to)
    }

    pub fn successors(&self, phase: Phase) -> impl Iterator<Item=Phase> + '_ {
        self.graph.neighbors(phase)
    }

    pub fn is_reachable(&self, from: Phase, to: Phase) -> bool {
        has_path_connecting(&self.graph, from, to, None)
    }

    pub fn transition_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for PhaseGraph {
    fn default() -> Self {
        Self::new()
    }
}
