//! Yield-from composition as an explicit state machine.
//!
//! A [`Delegator`] owns at most one inner generator and forwards every resumption
//! to it. When the inner generator returns, its completion value is handed to the
//! delegator's handler and a fresh inner generator takes its place.

use crate::error::{GenError, GenResult};
use crate::resumable::{GenState, ResumeResult, Resumable};

/// Completion value of a [`Downloader`].
pub const DOWNLOAD_DONE: &str = "ok";

/// Sub-generator that runs its action on every received url and finishes on a
/// resumption without a value.
pub struct Downloader<A> {
    action: A,
    state: GenState,
}

impl<A: FnMut(&str)> Downloader<A> {
    pub fn new(action: A) -> Self {
        Downloader {
            action,
            state: GenState::Created,
        }
    }
}

impl<A: FnMut(&str)> Resumable for Downloader<A> {
    type Yield = ();
    type Return = &'static str;
    type Send = String;

    fn resume(&mut self, send: Option<String>) -> GenResult<ResumeResult<(), &'static str>> {
        match self.state {
            GenState::Completed => Err(GenError::Exhausted),
            GenState::Created => {
                if send.is_some() {
                    return Err(GenError::SendToCreated);
                }
                self.state = GenState::Suspended;
                Ok(ResumeResult::Yield(()))
            }
            GenState::Suspended => match send {
                Some(url) => {
                    (self.action)(&url);
                    Ok(ResumeResult::Yield(()))
                }
                None => {
                    self.state = GenState::Completed;
                    Ok(ResumeResult::Return(DOWNLOAD_DONE))
                }
            },
        }
    }

    fn close(&mut self) -> Option<&'static str> {
        self.state = GenState::Completed;
        None
    }

    fn state(&self) -> GenState {
        self.state
    }
}

/// Proxy forwarding resumptions to generators made by `factory`, one after another.
pub struct Delegator<G: Resumable, F, H> {
    factory: F,
    on_return: H,
    inner: Option<G>,
    state: GenState,
    rounds: usize,
}

impl<G, F, H> Delegator<G, F, H>
where
    G: Resumable,
    F: FnMut() -> G,
    H: FnMut(G::Return),
{
    pub fn new(factory: F, on_return: H) -> Self {
        Delegator {
            factory,
            on_return,
            inner: None,
            state: GenState::Created,
            rounds: 0,
        }
    }

    /// Number of inner generators that ran to completion.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn inner_state(&self) -> Option<GenState> {
        self.inner.as_ref().map(|inner| inner.state())
    }

    fn start_inner(&mut self) -> GenResult<ResumeResult<G::Yield, G::Return>> {
        let mut inner = (self.factory)();
        debug!("delegating to inner generator #{}", self.rounds + 1);
        match inner.resume(None)? {
            ResumeResult::Yield(y) => {
                self.inner = Some(inner);
                Ok(ResumeResult::Yield(y))
            }
            ResumeResult::Return(r) => {
                // a fresh inner generator that never suspends would restart forever
                warn!("inner generator finished while being started, completing delegator");
                self.state = GenState::Completed;
                Ok(ResumeResult::Return(r))
            }
        }
    }
}

impl<G, F, H> Resumable for Delegator<G, F, H>
where
    G: Resumable,
    F: FnMut() -> G,
    H: FnMut(G::Return),
{
    type Yield = G::Yield;
    type Return = G::Return;
    type Send = G::Send;

    fn resume(&mut self, send: Option<G::Send>) -> GenResult<ResumeResult<G::Yield, G::Return>> {
        match self.state {
            GenState::Completed => return Err(GenError::Exhausted),
            GenState::Created => {
                if send.is_some() {
                    return Err(GenError::SendToCreated);
                }
                self.state = GenState::Suspended;
                return self.start_inner();
            }
            GenState::Suspended => {}
        }

        let inner = match self.inner.as_mut() {
            Some(inner) => inner,
            None => return self.start_inner(),
        };
        match inner.resume(send)? {
            ResumeResult::Yield(y) => Ok(ResumeResult::Yield(y)),
            ResumeResult::Return(r) => {
                self.inner = None;
                self.rounds += 1;
                debug!("inner generator #{} returned", self.rounds);
                (self.on_return)(r);
                self.start_inner()
            }
        }
    }

    fn close(&mut self) -> Option<G::Return> {
        if let Some(mut inner) = self.inner.take() {
            inner.close();
        }
        if self.state != GenState::Completed {
            debug!("delegator closed after {} rounds", self.rounds);
        }
        self.state = GenState::Completed;
        None
    }

    fn state(&self) -> GenState {
        self.state
    }
}
