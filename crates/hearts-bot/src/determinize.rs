//! Samples complete deals consistent with one seat's view of the round.
//!
//! Opponents receive uniformly shuffled slices of the unseen cards. No void
//! inference is drawn from past play.

use crate::request::{DecisionRequest, RequestError};
use hearts_core::model::card::Card;
use hearts_core::model::deck::Deck;
use hearts_core::model::hand::Hand;
use hearts_core::model::round::{RoundParts, RoundState};
use hearts_core::model::trick::Trick;
use rand::Rng;
use rand::seq::SliceRandom;
use std::array;

#[derive(Debug, Clone, Copy, Default)]
pub struct Determinizer;

impl Determinizer {
    /// Cards neither in the acting hand nor anywhere on the public record.
    pub fn unseen(request: &DecisionRequest) -> Vec<Card> {
        let mut known = 0u64;
        let public = request
            .hand
            .iter()
            .copied()
            .chain(request.trick.iter().map(|(_, card)| *card))
            .chain(request.played.iter().copied());
        for card in public {
            known |= 1u64 << card.id();
        }
        Deck::standard()
            .cards()
            .iter()
            .copied()
            .filter(|card| known & (1u64 << card.id()) == 0)
            .collect()
    }

    /// One full-information state; the acting hand and public record are kept
    /// verbatim and the rest is dealt from a fresh shuffle.
    pub fn sample<R: Rng + ?Sized>(
        request: &DecisionRequest,
        rng: &mut R,
    ) -> Result<RoundState, RequestError> {
        let mut pool = Self::unseen(request);
        pool.shuffle(rng);

        let mut hands: [Hand; 4] = array::from_fn(|_| Hand::new());
        hands[request.seat.index()] = Hand::with_cards(request.hand.clone());

        let mut offset = 0;
        for seat in request.seat.clockwise().skip(1) {
            let size = request.expected_hand_size(seat);
            let slice = pool
                .get(offset..offset + size)
                .ok_or(RequestError::CardCountMismatch(
                    request.hand.len() + request.trick.len() + request.played.len() + pool.len(),
                ))?;
            hands[seat.index()] = Hand::with_cards(slice.to_vec());
            offset += size;
        }
        if offset != pool.len() {
            return Err(RequestError::CardCountMismatch(
                request.hand.len() + request.trick.len() + request.played.len() + offset,
            ));
        }

        let current_trick = Trick::from_plays(request.leader(), request.trick.iter().copied())?;
        let state = RoundState::from_parts(RoundParts {
            hands,
            current_trick,
            hearts_broken: request.hearts_broken,
            played: request.played.clone(),
            won: request.won.clone(),
        })?;
        Ok(state)
    }
}
