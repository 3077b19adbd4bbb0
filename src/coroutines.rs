//! Stackful coroutines on top of the `context` crate.
//!
//! A coroutine runs its routine on a dedicated protected stack. Values move between
//! the caller stack and the coroutine stack through [`ExchangingTransfer`]s, one on
//! each side. Dropping or closing a suspended coroutine unwinds its stack so
//! everything the routine owns is dropped.

use std::any::Any;
use std::marker::PhantomData;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

use context::stack::ProtectedFixedSizeStack;
use context::{Context, Transfer};

use crate::config::config;
use crate::error::{GenError, GenResult};
use crate::resumable::ResumeResult;
use crate::transfer::{ExchangingTransfer, ValueExchangeContainer};

type PanicData = Box<dyn Any + Send + 'static>;

/// Unwind payload used to tear down a suspended coroutine stack.
struct DropUnwind;

enum UnwindReason {
    Panic(PanicData),
    Drop,
}

enum CompleteType<Return> {
    Return(Return),
    Unwind(UnwindReason),
}

enum SuspenseType<Yield, Return> {
    Yield(Yield),
    Complete(CompleteType<Return>),
}

enum ResumeType<Receive> {
    Yield(Receive),
    Drop,
}

pub struct CoroutineFactory<Yield, Return, Receive, F>(F, Option<usize>, PhantomData<fn(Receive) -> (Yield, Return)>)
where
    F: FnOnce(&mut CoroutineChannel<Yield, Return, Receive>, Receive) -> Return;

/// Maps a protected stack of `size` bytes, or of the configured size.
pub(crate) fn allocate_stack(size: Option<usize>) -> GenResult<ProtectedFixedSizeStack> {
    let stack_size = match size {
        Some(size) if size > 0 => size,
        _ => config().get_stack_size(),
    };
    let stack = ProtectedFixedSizeStack::new(stack_size).map_err(|e| {
        warn!("failed to map a {} byte coroutine stack: {:?}", stack_size, e);
        GenError::StackAllocation(format!("{:?}", e))
    })?;
    trace!("mapped coroutine stack, size={}", stack_size);
    Ok(stack)
}

impl<Yield, Return, Receive, F> CoroutineFactory<Yield, Return, Receive, F>
where
    F: FnOnce(&mut CoroutineChannel<Yield, Return, Receive>, Receive) -> Return,
{
    pub fn new(handler: F) -> Self {
        Self(handler, None, PhantomData)
    }

    /// Overrides the configured stack size for this coroutine only.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.1 = Some(size);
        self
    }

    /// Maps a stack and moves the routine onto it. The routine itself starts with the first `resume`.
    pub fn build<'a>(self) -> GenResult<Coroutine<'a, Yield, Return, Receive>>
    where
        F: 'a,
    {
        let stack = allocate_stack(self.1)?;
        Ok(self.build_on(stack))
    }

    /// Moves the routine onto an already mapped stack.
    pub(crate) fn build_on<'a>(self, stack: ProtectedFixedSizeStack) -> Coroutine<'a, Yield, Return, Receive>
    where
        F: 'a,
    {
        let mut handler = ValueExchangeContainer::prepare_exchange(self.0);
        let transfer = unsafe {
            Context::new(&stack, run_co_context::<Yield, Return, Receive, F>).resume(handler.make_pointer())
        };
        debug!("coroutine context created");
        Coroutine {
            state: InvocationState::Running(
                InvocationChannel(ExchangingTransfer::create_with_send(transfer)),
                stack,
            ),
            _routine: PhantomData,
        }
    }
}

enum InvocationState<Yield, Return, Receive> {
    Running(InvocationChannel<Yield, Return, Receive>, ProtectedFixedSizeStack),
    Completed,
}

pub struct Coroutine<'a, Yield, Return, Receive> {
    state: InvocationState<Yield, Return, Receive>,
    _routine: PhantomData<&'a mut ()>,
}

impl<'a, Yield, Return, Receive> Drop for Coroutine<'a, Yield, Return, Receive> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<'a, Yield, Return, Receive> Coroutine<'a, Yield, Return, Receive> {
    /// Switches into the coroutine until it suspends or returns.
    ///
    /// The first call passes `send` as the routine's initial argument. A panic inside the
    /// routine is resumed on the caller's stack.
    pub fn resume(&mut self, send: Receive) -> GenResult<ResumeResult<Yield, Return>> {
        let rec = match &mut self.state {
            InvocationState::Running(channel, _) => channel.suspend(send),
            InvocationState::Completed => return Err(GenError::Exhausted),
        };
        self.receive(rec)
    }

    pub fn is_completed(&self) -> bool {
        match self.state {
            InvocationState::Completed => true,
            _ => false,
        }
    }

    /// Unwinds a running coroutine; returns whether there was anything to unwind.
    pub fn close(&mut self) -> bool {
        match &mut self.state {
            InvocationState::Running(channel, _) => {
                channel.unwind();
                self.state = InvocationState::Completed;
                true
            }
            InvocationState::Completed => false,
        }
    }

    fn receive(&mut self, rec: SuspenseType<Yield, Return>) -> GenResult<ResumeResult<Yield, Return>> {
        match rec {
            SuspenseType::Yield(y) => Ok(ResumeResult::Yield(y)),
            SuspenseType::Complete(ct) => {
                self.state = InvocationState::Completed;
                match ct {
                    CompleteType::Return(r) => Ok(ResumeResult::Return(r)),
                    CompleteType::Unwind(UnwindReason::Panic(p)) => resume_unwind(p),
                    CompleteType::Unwind(UnwindReason::Drop) => Err(GenError::Exhausted),
                }
            }
        }
    }
}

/// Coroutine side of the exchange, handed to the routine.
pub struct CoroutineChannel<Yield, Return, Receive>(ExchangingTransfer<SuspenseType<Yield, Return>, ResumeType<Receive>>);

struct InvocationChannel<Yield, Return, Receive>(ExchangingTransfer<ResumeType<Receive>, SuspenseType<Yield, Return>>);

impl<Yield, Return, Receive> CoroutineChannel<Yield, Return, Receive> {
    /// Hands `send` to the caller and waits for the next resumption.
    pub fn suspend(&mut self, send: Yield) -> Receive {
        let received = self.0.yield_with(SuspenseType::Yield(send));
        Self::receive(received)
    }

    fn receive(r: ResumeType<Receive>) -> Receive {
        match r {
            ResumeType::Yield(y) => y,
            ResumeType::Drop => resume_unwind(Box::new(DropUnwind)),
        }
    }
}

impl<Yield, Return, Receive> InvocationChannel<Yield, Return, Receive> {
    fn suspend(&mut self, send: Receive) -> SuspenseType<Yield, Return> {
        self.0.yield_with(ResumeType::Yield(send))
    }

    fn unwind(&mut self) {
        match self.0.yield_with(ResumeType::Drop) {
            SuspenseType::Complete(CompleteType::Unwind(UnwindReason::Drop)) => {
                trace!("coroutine stack unwound");
            }
            SuspenseType::Complete(CompleteType::Unwind(UnwindReason::Panic(_))) => {
                error!("coroutine panicked while unwinding");
            }
            SuspenseType::Complete(CompleteType::Return(_)) => {
                warn!("coroutine returned instead of unwinding");
            }
            SuspenseType::Yield(_) => {
                error!("coroutine suspended while unwinding, releasing its stack anyway");
            }
        }
    }
}

extern "C" fn run_co_context<Yield, Return, Receive, F>(raw_transfer: Transfer) -> !
where
    F: FnOnce(&mut CoroutineChannel<Yield, Return, Receive>, Receive) -> Return,
{
    let (mut exchange_transfer, routine_fn) =
        unsafe { ExchangingTransfer::<SuspenseType<Yield, Return>, ResumeType<Receive>>::create_receiving::<F>(raw_transfer) };
    let initial = exchange_transfer.suspend();
    let mut channel = CoroutineChannel(exchange_transfer);
    let result = catch_unwind(AssertUnwindSafe(|| {
        let initial = CoroutineChannel::<Yield, Return, Receive>::receive(initial);
        routine_fn(&mut channel, initial)
    }));
    let complete = match result {
        Ok(ret) => CompleteType::Return(ret),
        Err(p) if p.is::<DropUnwind>() => CompleteType::Unwind(UnwindReason::Drop),
        Err(p) => CompleteType::Unwind(UnwindReason::Panic(p)),
    };
    channel.0.dispose_with(SuspenseType::Complete(complete))
}
