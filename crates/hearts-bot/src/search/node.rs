use hearts_core::model::card::Card;
use hearts_core::model::round::RoundState;

/// Index into a [`SearchTree`](super::SearchTree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// One searched position. Owns its state snapshot; the parent link is a
/// plain index used for backpropagation only.
#[derive(Debug, Clone)]
pub struct Node {
    state: RoundState,
    card: Option<Card>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    unexpanded: Vec<Card>,
    visits: u32,
    total_reward: f64,
}

impl Node {
    pub(crate) fn new(state: RoundState, card: Option<Card>, parent: Option<NodeId>) -> Self {
        let unexpanded = if state.is_terminal() {
            Vec::new()
        } else {
            state.legal_moves()
        };
        Self {
            state,
            card,
            parent,
            children: Vec::new(),
            unexpanded,
            visits: 0,
            total_reward: 0.0,
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Card whose play produced this node; `None` at the root.
    pub fn card(&self) -> Option<Card> {
        self.card
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn unexpanded(&self) -> &[Card] {
        &self.unexpanded
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    /// 0.0 for a node that has never been visited.
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward / f64::from(self.visits)
        }
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.unexpanded.is_empty()
    }

    /// Upper confidence bound seen from a parent with `parent_visits`.
    pub fn uct(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let explore = (f64::from(parent_visits).ln() / f64::from(self.visits)).sqrt();
        self.mean_reward() + exploration * explore
    }

    pub(crate) fn take_unexpanded(&mut self, index: usize) -> Card {
        self.unexpanded.swap_remove(index)
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn record(&mut self, reward: f64) {
        self.visits += 1;
        self.total_reward += reward;
    }
}

#[cfg(test)]
mod tests {
    use super::Node;
    use hearts_core::model::deck::Deck;
    use hearts_core::model::round::RoundState;

    fn root() -> Node {
        Node::new(RoundState::deal(&Deck::standard()), None, None)
    }

    #[test]
    fn fresh_node_lists_legal_moves() {
        let node = root();
        assert_eq!(node.unexpanded(), node.state().legal_moves().as_slice());
        assert_eq!(node.visits(), 0);
        assert_eq!(node.mean_reward(), 0.0);
        assert!(node.children().is_empty());
    }

    #[test]
    fn unvisited_node_has_unbounded_uct() {
        assert_eq!(root().uct(10, 1.41), f64::INFINITY);
    }

    #[test]
    fn uct_adds_exploration_to_the_mean() {
        let mut node = root();
        node.record(4.0);
        node.record(2.0);
        assert_eq!(node.mean_reward(), 3.0);
        let expected = 3.0 + 1.41 * ((8f64).ln() / 2.0).sqrt();
        assert!((node.uct(8, 1.41) - expected).abs() < 1e-12);
    }
}
