//! Cursor walk over a finite sequence where every suspension point accepts a jump.
//!
//! The first resumption emits the element at index 0. Every following resumption
//! first moves the cursor by the jump received at the previous suspension point
//! (1 when nothing was sent) and then emits the element under the cursor, so a
//! sent jump decides the position of the element returned by that same call,
//! counted from the element returned by the call before it.

use crate::error::{GenError, GenResult};
use crate::resumable::{GenState, ResumeResult, Resumable};

/// How a received jump moves the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// The jump replaces the default step of 1.
    Replace,
    /// The jump is counted from the element following the current one.
    SkipAhead,
}

impl Default for StepMode {
    fn default() -> Self {
        StepMode::Replace
    }
}

pub struct SequenceGenerator<T> {
    items: Vec<T>,
    cursor: usize,
    state: GenState,
    mode: StepMode,
    on_receive: Option<Box<dyn FnMut(Option<usize>)>>,
}

impl<T: Clone> SequenceGenerator<T> {
    pub fn new<I: IntoIterator<Item = T>>(source: I) -> Self {
        SequenceGenerator {
            items: source.into_iter().collect(),
            cursor: 0,
            state: GenState::Created,
            mode: StepMode::default(),
            on_receive: None,
        }
    }

    pub fn with_step_mode(mut self, mode: StepMode) -> Self {
        self.mode = mode;
        self
    }

    /// Registers a hook observing every value received at a suspension point.
    pub fn on_receive<F: FnMut(Option<usize>) + 'static>(mut self, hook: F) -> Self {
        self.on_receive = Some(Box::new(hook));
        self
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn emit(&mut self) -> ResumeResult<T, ()> {
        match self.items.get(self.cursor) {
            Some(item) => ResumeResult::Yield(item.clone()),
            None => {
                trace!("sequence exhausted at cursor {}", self.cursor);
                self.state = GenState::Completed;
                ResumeResult::Return(())
            }
        }
    }

    fn step_for(&self, jump: Option<usize>) -> usize {
        match (self.mode, jump) {
            (_, None) => 1,
            (StepMode::Replace, Some(jump)) => jump,
            (StepMode::SkipAhead, Some(jump)) => jump.saturating_add(1),
        }
    }
}

impl SequenceGenerator<char> {
    /// Walks the characters of `source`.
    pub fn of_str(source: &str) -> Self {
        SequenceGenerator::new(source.chars())
    }
}

impl<T: Clone> Resumable for SequenceGenerator<T> {
    type Yield = T;
    type Return = ();
    type Send = usize;

    fn resume(&mut self, send: Option<usize>) -> GenResult<ResumeResult<T, ()>> {
        match self.state {
            GenState::Completed => Err(GenError::Exhausted),
            GenState::Created => {
                if send.is_some() {
                    return Err(GenError::SendToCreated);
                }
                self.state = GenState::Suspended;
                Ok(self.emit())
            }
            GenState::Suspended => {
                trace!("jump received {:?}", send);
                if let Some(hook) = self.on_receive.as_mut() {
                    hook(send);
                }
                let step = self.step_for(send);
                self.cursor = self.cursor.saturating_add(step).min(self.items.len());
                Ok(self.emit())
            }
        }
    }

    fn close(&mut self) -> Option<()> {
        self.state = GenState::Completed;
        None
    }

    fn state(&self) -> GenState {
        self.state
    }
}
