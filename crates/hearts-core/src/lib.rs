//! Card model and rules for four-seat Hearts.
//!
//! Everything here is plain data plus [`rules`], the single legal-move
//! evaluator used both at the table and inside search.

pub mod game;
pub mod model;
pub mod rules;

pub use model::card::Card;
pub use model::player::PlayerPosition;
pub use model::round::RoundState;
