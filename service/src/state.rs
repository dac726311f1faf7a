//! The receive/send state machine: a two-state FSM that the dispatch loop threads through
//! every request so that receive/send misuse is caught as a typed [`StateViolation`] rather than
//! silently tolerated.

/// The two states of the service loop's FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Receiving,
    Sending,
}

/// The FSM invariant was broken: a receive was attempted while `Sending`, or a send while
/// `Receiving`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("state violation: attempted {attempted:?} while in state {current:?}")]
pub struct StateViolation {
    pub current: State,
    pub attempted: State,
}

/// Tracks the loop's current state and enforces the alternation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fsm {
    state: State,
}

impl Default for Fsm {
    fn default() -> Self {
        Self {
            state: State::Receiving,
        }
    }
}

impl Fsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Transitions `Receiving -> Sending`, after a message has been received. Errors (without
    /// changing state) if the loop was not `Receiving`.
    pub fn finish_receive(&mut self) -> Result<(), StateViolation> {
        if self.state != State::Receiving {
            return Err(StateViolation {
                current: self.state,
                attempted: State::Receiving,
            });
        }
        self.state = State::Sending;
        Ok(())
    }

    /// Transitions `Sending -> Receiving`, after a reply has been sent. Errors (without changing
    /// state) if the loop was not `Sending`.
    pub fn finish_send(&mut self) -> Result<(), StateViolation> {
        if self.state != State::Sending {
            return Err(StateViolation {
                current: self.state,
                attempted: State::Sending,
            });
        }
        self.state = State::Receiving;
        Ok(())
    }
}
