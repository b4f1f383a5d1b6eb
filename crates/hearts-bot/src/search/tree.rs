//! Arena-allocated UCT tree over one determinized deal.

use super::SearchConfig;
use super::node::{Node, NodeId};
use crate::policy::RolloutPolicy;
use crate::reward::RewardModel;
use hearts_core::model::card::Card;
use hearts_core::model::player::PlayerPosition;
use hearts_core::model::round::RoundState;
use rand::Rng;
use tracing::{Level, event};

/// Visit and reward totals for one root move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveStat {
    pub card: Card,
    pub visits: u32,
    pub total_reward: f64,
}

impl MoveStat {
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward / f64::from(self.visits)
        }
    }
}

/// Root children after a search, in expansion order.
#[derive(Debug, Clone, PartialEq)]
pub struct RootStats {
    pub iterations: u32,
    pub moves: Vec<MoveStat>,
}

pub struct SearchTree {
    nodes: Vec<Node>,
    seat: PlayerPosition,
    exploration: f64,
    max_selection_depth: usize,
    max_rollout_steps: usize,
}

impl SearchTree {
    /// Tree rooted at `state`, scoring outcomes for `seat`.
    pub fn new(state: RoundState, seat: PlayerPosition, config: &SearchConfig) -> Self {
        Self {
            nodes: vec![Node::new(state, None, None)],
            seat,
            exploration: config.exploration,
            max_selection_depth: config.max_selection_depth,
            max_rollout_steps: config.max_rollout_steps,
        }
    }

    pub fn seat(&self) -> PlayerPosition {
        self.seat
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn root(&self) -> &Node {
        self.node(NodeId::ROOT)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Runs `iterations` select/expand/simulate/backpropagate passes.
    pub fn run<R: Rng>(
        &mut self,
        iterations: u32,
        policy: &dyn RolloutPolicy,
        reward: &RewardModel,
        rng: &mut R,
    ) -> RootStats {
        for _ in 0..iterations {
            self.iterate(policy, reward, rng);
        }

        let stats = self.root_stats();
        event!(
            target: "hearts_bot::search",
            Level::DEBUG,
            seat = self.seat.label(),
            iterations,
            nodes = self.nodes.len(),
            root_children = stats.moves.len(),
            policy = policy.name(),
            reward = reward.label(),
        );
        stats
    }

    pub fn root_stats(&self) -> RootStats {
        let root = self.root();
        let moves = root
            .children()
            .iter()
            .filter_map(|&id| {
                let child = self.node(id);
                child.card().map(|card| MoveStat {
                    card,
                    visits: child.visits(),
                    total_reward: child.total_reward(),
                })
            })
            .collect();
        RootStats {
            iterations: root.visits(),
            moves,
        }
    }

    fn iterate<R: Rng>(&mut self, policy: &dyn RolloutPolicy, reward: &RewardModel, rng: &mut R) {
        let leaf = self.select();
        let node = self.expand(leaf, rng);
        let terminal = self.simulate(node, policy, rng);
        let value = reward.evaluate(&terminal, self.seat);
        self.backpropagate(node, value);
    }

    fn select(&self) -> NodeId {
        let mut current = NodeId::ROOT;
        for _ in 0..self.max_selection_depth {
            let node = self.node(current);
            if !node.is_fully_expanded() || node.children().is_empty() {
                return current;
            }
            match self.best_child(current) {
                Some(child) => current = child,
                None => return current,
            }
        }
        event!(
            target: "hearts_bot::search",
            Level::WARN,
            depth = self.max_selection_depth,
            "selection depth cap reached"
        );
        current
    }

    /// Highest UCT child; the first one wins ties.
    fn best_child(&self, parent: NodeId) -> Option<NodeId> {
        let node = self.node(parent);
        let parent_visits = node.visits();
        let mut best: Option<(NodeId, f64)> = None;
        for &child in node.children() {
            let score = self.node(child).uct(parent_visits, self.exploration);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    fn expand<R: Rng>(&mut self, leaf: NodeId, rng: &mut R) -> NodeId {
        let remaining = self.node(leaf).unexpanded().len();
        if remaining == 0 {
            return leaf;
        }

        let card = self.nodes[leaf.0].take_unexpanded(rng.gen_range(0..remaining));
        let next = match self.node(leaf).state().play(card) {
            Ok(next) => next,
            Err(err) => {
                event!(
                    target: "hearts_bot::search",
                    Level::ERROR,
                    card = %card,
                    error = %err,
                    "expansion produced an illegal move"
                );
                return leaf;
            }
        };

        let child = NodeId(self.nodes.len());
        self.nodes.push(Node::new(next, Some(card), Some(leaf)));
        self.nodes[leaf.0].push_child(child);
        child
    }

    fn simulate<R: Rng>(&self, from: NodeId, policy: &dyn RolloutPolicy, rng: &mut R) -> RoundState {
        let mut state = self.node(from).state().clone();
        let mut steps = 0;
        while !state.is_terminal() && steps < self.max_rollout_steps {
            let legal = state.legal_moves();
            let Some(card) = policy.choose(&state, &legal, rng) else {
                break;
            };
            if let Err(err) = state.apply(card) {
                event!(
                    target: "hearts_bot::search",
                    Level::ERROR,
                    policy = policy.name(),
                    card = %card,
                    error = %err,
                    "rollout policy chose an illegal card"
                );
                break;
            }
            steps += 1;
        }
        state
    }

    fn backpropagate(&mut self, from: NodeId, reward: f64) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            node.record(reward);
            current = node.parent();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SearchTree;
    use crate::policy::GreedyRollout;
    use crate::reward::RewardModel;
    use crate::search::{NodeId, SearchConfig};
    use hearts_core::model::deck::Deck;
    use hearts_core::model::round::RoundState;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn tree(seed: u64) -> SearchTree {
        let mut round = RoundState::deal(&Deck::shuffled_with_seed(seed));
        // Past the forced two of clubs so the root has real choices.
        for _ in 0..5 {
            let card = round.legal_moves()[0];
            round = round.play(card).unwrap();
        }
        let seat = round.to_act();
        SearchTree::new(round, seat, &SearchConfig::default())
    }

    #[test]
    fn root_visits_equal_iterations() {
        let mut tree = tree(21);
        let mut rng = StdRng::seed_from_u64(4);
        let stats = tree.run(120, &GreedyRollout, &RewardModel::Differential, &mut rng);

        assert_eq!(stats.iterations, 120);
        assert_eq!(tree.root().visits(), 120);
        let child_visits: u32 = stats.moves.iter().map(|m| m.visits).sum();
        assert_eq!(child_visits, 120);
    }

    #[test]
    fn children_never_outvisit_parents() {
        let mut tree = tree(34);
        let mut rng = StdRng::seed_from_u64(9);
        tree.run(200, &GreedyRollout, &RewardModel::Differential, &mut rng);

        for (index, node) in tree.nodes().iter().enumerate() {
            let child_sum: u32 = node.children().iter().map(|&c| tree.node(c).visits()).sum();
            assert!(child_sum <= node.visits());
            for &child in node.children() {
                assert!(tree.node(child).visits() <= node.visits());
                assert_eq!(tree.node(child).parent().map(NodeId::index), Some(index));
            }
        }
    }

    #[test]
    fn each_root_move_is_expanded_once() {
        let mut tree = tree(55);
        let legal = tree.root().state().legal_moves();
        let mut rng = StdRng::seed_from_u64(2);
        let stats = tree.run(legal.len() as u32, &GreedyRollout, &RewardModel::Differential, &mut rng);

        let mut seen: Vec<_> = stats.moves.iter().map(|m| m.card).collect();
        seen.sort();
        assert_eq!(seen, legal);
        assert!(stats.moves.iter().all(|m| m.visits == 1));
    }

    #[test]
    fn zero_iterations_leave_the_root_untouched() {
        let mut tree = tree(1);
        let mut rng = StdRng::seed_from_u64(0);
        let stats = tree.run(0, &GreedyRollout, &RewardModel::Differential, &mut rng);
        assert_eq!(stats.iterations, 0);
        assert!(stats.moves.is_empty());
        assert_eq!(tree.len(), 1);
    }
}
