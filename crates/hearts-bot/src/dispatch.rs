//! Runs a decision on a worker thread so the caller's loop stays responsive.

use crate::request::{DecisionRequest, RequestError};
use crate::selector::{Choice, Selector};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{Level, event};

pub type DecisionResult = Result<Option<Choice>, RequestError>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to start decision worker: {0}")]
    Spawn(#[from] io::Error),
    #[error("decision worker exited without reporting")]
    Disconnected,
}

/// Handle to a decision running off the caller's thread.
pub struct PendingDecision {
    receiver: Receiver<DecisionResult>,
    handle: Option<JoinHandle<()>>,
}

impl PendingDecision {
    /// Non-blocking poll; `Ok(None)` while the search is still running.
    pub fn try_take(&mut self) -> Result<Option<DecisionResult>, DispatchError> {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.join();
                Ok(Some(result))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.join();
                Err(DispatchError::Disconnected)
            }
        }
    }

    /// Blocks until the worker reports.
    pub fn wait(mut self) -> Result<DecisionResult, DispatchError> {
        let result = self.receiver.recv();
        self.join();
        result.map_err(|_| DispatchError::Disconnected)
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            reap(handle);
        }
    }
}

/// Joins a finished worker; a panic is logged and its message returned.
fn reap(handle: JoinHandle<()>) -> Option<String> {
    let name = handle.thread().name().unwrap_or("decision worker").to_string();
    let payload = handle.join().err()?;
    let message = payload
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    event!(
        target: "hearts_bot::selector",
        Level::ERROR,
        worker = %name,
        panic = %message,
        "decision worker panicked"
    );
    Some(message)
}

/// Starts `selector.choose(request)` on a named worker seeded with `seed`.
pub fn spawn_decision(
    selector: Arc<Selector>,
    request: DecisionRequest,
    seed: u64,
) -> Result<PendingDecision, DispatchError> {
    let (sender, receiver) = mpsc::channel();
    let seat = request.seat;
    let handle = thread::Builder::new()
        .name(format!("hearts-decision-{}", seat.label()))
        .spawn(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = selector.choose(&request, &mut rng);
            if sender.send(result).is_err() {
                event!(
                    target: "hearts_bot::selector",
                    Level::DEBUG,
                    seat = seat.label(),
                    "decision dropped before delivery"
                );
            }
        })?;

    Ok(PendingDecision {
        receiver,
        handle: Some(handle),
    })
}

#[cfg(test)]
mod tests {
    use super::{reap, spawn_decision};
    use crate::request::DecisionRequest;
    use crate::search::SearchConfig;
    use crate::selector::Selector;
    use hearts_core::model::deck::Deck;
    use hearts_core::model::round::RoundState;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;
    use std::time::Duration;

    fn request() -> DecisionRequest {
        let mut round = RoundState::deal(&Deck::shuffled_with_seed(40));
        for _ in 0..5 {
            let card = round.legal_moves()[0];
            round = round.play(card).unwrap();
        }
        DecisionRequest::from_round(&round, round.to_act())
    }

    #[test]
    fn worker_matches_inline_choice() {
        let config = SearchConfig::default().with_iterations(60).with_samples(3);
        let selector = Arc::new(Selector::new(config));
        let request = request();

        let inline = selector
            .choose(&request, &mut StdRng::seed_from_u64(77))
            .unwrap();
        let pending = spawn_decision(Arc::clone(&selector), request, 77).unwrap();
        let remote = pending.wait().unwrap().unwrap();

        assert_eq!(remote, inline);
    }

    #[test]
    fn polling_eventually_yields_the_result() {
        let config = SearchConfig::default().with_iterations(20).with_samples(2);
        let selector = Arc::new(Selector::new(config));
        let mut pending = spawn_decision(selector, request(), 5).unwrap();
        let result = loop {
            if let Some(result) = pending.try_take().unwrap() {
                break result;
            }
            std::thread::sleep(Duration::from_millis(1));
        };
        assert!(result.unwrap().is_some());
    }

    #[test]
    fn panicking_worker_is_reported() {
        let handle = std::thread::Builder::new()
            .name("hearts-decision-test".into())
            .spawn(|| panic!("search blew up"))
            .unwrap();
        assert_eq!(reap(handle).as_deref(), Some("search blew up"));

        let clean = std::thread::spawn(|| {});
        assert_eq!(reap(clean), None);
    }
}
