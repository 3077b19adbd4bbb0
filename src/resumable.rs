//! The resume contract shared by state machine generators and closure generators.
//!
//! A generator is created suspended before its first instruction. Every call to
//! [`Resumable::resume`] runs it until the next suspension point, returning the
//! yielded item, or until it finishes, returning its completion value once.

use crate::error::GenResult;

/// Lifecycle of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenState {
    /// Constructed, body not started yet.
    Created,
    /// Paused at a suspension point.
    Suspended,
    /// Returned its completion value or was closed.
    Completed,
}

/// Outcome of a single resumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeResult<Yield, Return> {
    Yield(Yield),
    /// Terminal signal carrying the completion value.
    Return(Return),
}

impl<Yield, Return> ResumeResult<Yield, Return> {
    pub fn is_yield(&self) -> bool {
        match self {
            ResumeResult::Yield(_) => true,
            ResumeResult::Return(_) => false,
        }
    }

    pub fn yielded(self) -> Option<Yield> {
        match self {
            ResumeResult::Yield(y) => Some(y),
            ResumeResult::Return(_) => None,
        }
    }

    pub fn returned(self) -> Option<Return> {
        match self {
            ResumeResult::Yield(_) => None,
            ResumeResult::Return(r) => Some(r),
        }
    }
}

pub trait Resumable {
    type Yield;
    type Return;
    type Send;

    /// Runs the generator to its next suspension point.
    ///
    /// `send` becomes the value of the suspension point the generator is paused at;
    /// `None` selects the default behaviour. Fails with `Exhausted` once the terminal
    /// value was returned and with `SendToCreated` when a value is sent before the first
    /// suspension point was reached.
    fn resume(&mut self, send: Option<Self::Send>) -> GenResult<ResumeResult<Self::Yield, Self::Return>>;

    /// Forces completion, closing delegated generators first.
    ///
    /// Closing an already completed generator does nothing and returns `None`.
    fn close(&mut self) -> Option<Self::Return>;

    fn state(&self) -> GenState;

    fn advance(&mut self) -> GenResult<ResumeResult<Self::Yield, Self::Return>> {
        self.resume(None)
    }

    fn send(&mut self, value: Self::Send) -> GenResult<ResumeResult<Self::Yield, Self::Return>> {
        self.resume(Some(value))
    }

    fn is_completed(&self) -> bool {
        self.state() == GenState::Completed
    }

    /// Iterates the yielded items, resuming with whatever `receive_source` produces.
    fn build_iterator<RF>(&mut self, receive_source: RF) -> GeneratorIterator<'_, Self, RF>
    where
        Self: Sized,
        RF: FnMut() -> Option<Self::Send>,
    {
        GeneratorIterator {
            generator: self,
            receive_source,
            returned: None,
        }
    }

    fn iter(&mut self) -> GeneratorIterator<'_, Self, fn() -> Option<Self::Send>>
    where
        Self: Sized,
    {
        self.build_iterator(no_send::<Self::Send> as fn() -> Option<Self::Send>)
    }
}

fn no_send<S>() -> Option<S> {
    None
}

impl<G: Resumable + ?Sized> Resumable for Box<G> {
    type Yield = G::Yield;
    type Return = G::Return;
    type Send = G::Send;

    fn resume(&mut self, send: Option<Self::Send>) -> GenResult<ResumeResult<Self::Yield, Self::Return>> {
        (**self).resume(send)
    }

    fn close(&mut self) -> Option<Self::Return> {
        (**self).close()
    }

    fn state(&self) -> GenState {
        (**self).state()
    }
}

pub struct GeneratorIterator<'a, G: Resumable, RF> {
    generator: &'a mut G,
    receive_source: RF,
    returned: Option<G::Return>,
}

impl<'a, G: Resumable, RF> GeneratorIterator<'a, G, RF> {
    /// Completion value, available once the iterator ran dry on the terminal value.
    pub fn into_return(self) -> Option<G::Return> {
        self.returned
    }
}

impl<'a, G, RF> Iterator for GeneratorIterator<'a, G, RF>
where
    G: Resumable,
    RF: FnMut() -> Option<G::Send>,
{
    type Item = G::Yield;

    fn next(&mut self) -> Option<Self::Item> {
        if self.generator.is_completed() {
            return None;
        }
        match self.generator.resume((self.receive_source)()) {
            Ok(ResumeResult::Yield(y)) => Some(y),
            Ok(ResumeResult::Return(r)) => {
                self.returned = Some(r);
                None
            }
            Err(e) => {
                warn!("generator iteration stopped: {}", e);
                None
            }
        }
    }
}
