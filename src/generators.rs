//! Generators whose body is an ordinary closure running on its own stack.

use std::mem::replace;

use crate::coroutines::{allocate_stack, Coroutine, CoroutineChannel, CoroutineFactory};
use crate::error::{GenError, GenResult};
use crate::resumable::{GenState, ResumeResult, Resumable};

type GeneratorBody<'a, Yield, Return, Send> = Box<dyn FnOnce(&mut GeneratorChannel<'_, Yield, Return, Send>) -> Return + 'a>;

pub struct Generator<'a, Yield, Return = (), Send = ()> {
    state: GeneratorState<'a, Yield, Return, Send>,
    stack_size: Option<usize>,
}

enum GeneratorState<'a, Yield, Return, Send> {
    Init(GeneratorBody<'a, Yield, Return, Send>),
    Run(Coroutine<'a, Yield, Return, Option<Send>>),
    Returned,
}

/// Handle the generator body suspends through.
pub struct GeneratorChannel<'c, Yield, Return, Send>(&'c mut CoroutineChannel<Yield, Return, Option<Send>>);

impl<'c, Yield, Return, Send> GeneratorChannel<'c, Yield, Return, Send> {
    /// Suspends with `val`; evaluates to the value the next resumption sends.
    pub fn yield_val(&mut self, val: Yield) -> Option<Send> {
        self.0.suspend(val)
    }

    /// Yields every item of `items`, ignoring sent values.
    pub fn yield_all<I: IntoIterator<Item = Yield>>(&mut self, items: I) {
        for item in items {
            self.yield_val(item);
        }
    }

    /// Forwards resumptions to `inner` until it returns, evaluating to its completion value.
    ///
    /// When the outer generator is closed meanwhile, `inner` is dropped while this
    /// stack unwinds, before the outer generator completes.
    pub fn yield_from<G>(&mut self, mut inner: G) -> GenResult<G::Return>
    where
        G: Resumable<Yield = Yield, Send = Send>,
    {
        let mut send = None;
        loop {
            match inner.resume(send)? {
                ResumeResult::Yield(y) => send = self.yield_val(y),
                ResumeResult::Return(r) => return Ok(r),
            }
        }
    }
}

impl<'a, Yield: 'a, Return: 'a, Send: 'a> Generator<'a, Yield, Return, Send> {
    /// Wraps `body`; nothing runs and no stack is mapped before the first resumption.
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce(&mut GeneratorChannel<'_, Yield, Return, Send>) -> Return + 'a,
    {
        Generator {
            state: GeneratorState::Init(Box::new(body)),
            stack_size: None,
        }
    }

    /// Overrides the configured stack size for this generator.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    fn start(&mut self) -> GenResult<()> {
        // map the stack first so a failed allocation leaves the body in place
        let stack = allocate_stack(self.stack_size)?;
        if let GeneratorState::Init(body) = replace(&mut self.state, GeneratorState::Returned) {
            let coroutine = CoroutineFactory::new(
                move |chan: &mut CoroutineChannel<Yield, Return, Option<Send>>, _: Option<Send>| {
                    body(&mut GeneratorChannel(chan))
                },
            )
            .build_on(stack);
            trace!("generator started");
            self.state = GeneratorState::Run(coroutine);
        }
        Ok(())
    }
}

impl<'a, Yield: 'a, Return: 'a, Send: 'a> Resumable for Generator<'a, Yield, Return, Send> {
    type Yield = Yield;
    type Return = Return;
    type Send = Send;

    fn resume(&mut self, send: Option<Send>) -> GenResult<ResumeResult<Yield, Return>> {
        if let GeneratorState::Init(_) = self.state {
            if send.is_some() {
                return Err(GenError::SendToCreated);
            }
            self.start()?;
        }
        let step = match &mut self.state {
            GeneratorState::Run(coroutine) => coroutine.resume(send)?,
            _ => return Err(GenError::Exhausted),
        };
        if let ResumeResult::Return(_) = step {
            trace!("generator returned");
            self.state = GeneratorState::Returned;
        }
        Ok(step)
    }

    fn close(&mut self) -> Option<Return> {
        if let GeneratorState::Run(mut coroutine) = replace(&mut self.state, GeneratorState::Returned) {
            if coroutine.close() {
                debug!("generator closed while suspended");
            }
        }
        None
    }

    fn state(&self) -> GenState {
        match &self.state {
            GeneratorState::Init(_) => GenState::Created,
            GeneratorState::Run(coroutine) if !coroutine.is_completed() => GenState::Suspended,
            _ => GenState::Completed,
        }
    }
}

impl<'a, Yield: 'a, Return: 'a, Send: 'a> Iterator for Generator<'a, Yield, Return, Send> {
    type Item = Yield;

    fn next(&mut self) -> Option<Yield> {
        if self.is_completed() {
            return None;
        }
        match self.advance() {
            Ok(step) => step.yielded(),
            Err(e) => {
                warn!("generator iteration stopped: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::delegate::{Downloader, DOWNLOAD_DONE};
    use crate::sequence::SequenceGenerator;

    #[test]
    fn fibonacci_take() {
        let fib: Vec<u64> = Generator::<u64, ()>::new(|g| {
            let mut current = (0, 1);
            loop {
                g.yield_val(current.0);
                current = (current.1, current.0 + current.1);
            }
        })
        .take(8)
        .collect();
        assert_eq!(fib, vec![0, 1, 1, 2, 3, 5, 8, 13]);
    }

    #[test]
    fn body_is_lazy() {
        let started = Cell::new(false);
        let mut gen = Generator::<u8, ()>::new(|g| {
            started.set(true);
            g.yield_val(1);
        });
        assert_eq!(gen.state(), GenState::Created);
        assert!(!started.get());
        assert_eq!(gen.advance(), Ok(ResumeResult::Yield(1)));
        assert!(started.get());
        assert_eq!(gen.state(), GenState::Suspended);
        assert_eq!(gen.advance(), Ok(ResumeResult::Return(())));
        assert_eq!(gen.state(), GenState::Completed);
        assert_eq!(gen.advance(), Err(GenError::Exhausted));
    }

    #[test]
    fn walks_like_the_sequence_state_machine() {
        let mut gen = Generator::<char, (), usize>::new(|g| {
            let name: Vec<char> = "Nick".chars().collect();
            let mut index = 0;
            while index < name.len() {
                let jump = g.yield_val(name[index]);
                index += jump.unwrap_or(1);
            }
        });
        let mut machine = SequenceGenerator::of_str("Nick");

        for send in vec![None, Some(2), None, None] {
            assert_eq!(gen.resume(send), machine.resume(send));
        }
        assert_eq!(gen.advance(), Err(GenError::Exhausted));
    }

    #[test]
    fn send_before_start_is_rejected() {
        let mut gen = Generator::<u8, (), u8>::new(|g| {
            g.yield_val(0);
        });
        assert_eq!(gen.send(3), Err(GenError::SendToCreated));
        assert_eq!(gen.state(), GenState::Created);
        assert_eq!(gen.advance(), Ok(ResumeResult::Yield(0)));
    }

    #[test]
    fn yield_from_state_machine_returns_its_value() {
        let downloads = Rc::new(RefCell::new(Vec::new()));
        let results = Rc::new(RefCell::new(Vec::new()));
        let (d, r) = (downloads.clone(), results.clone());
        let mut proxy = Generator::<(), (), String>::new(move |g| loop {
            let d = d.clone();
            let downloader = Downloader::new(move |url: &str| d.borrow_mut().push(url.to_string()));
            match g.yield_from(downloader) {
                Ok(result) => r.borrow_mut().push(result),
                Err(_) => return,
            }
        });

        assert_eq!(proxy.advance(), Ok(ResumeResult::Yield(())));
        assert_eq!(proxy.send("www.gmail.com".into()), Ok(ResumeResult::Yield(())));
        assert_eq!(*downloads.borrow(), vec!["www.gmail.com".to_string()]);
        assert_eq!(proxy.advance(), Ok(ResumeResult::Yield(())));
        assert_eq!(*results.borrow(), vec![DOWNLOAD_DONE]);
        assert_eq!(proxy.state(), GenState::Suspended);
    }

    #[test]
    fn nested_stackful_delegation() {
        let mut outer = Generator::<u32, u32>::new(|g| {
            let inner = Generator::<u32, u32>::new(|g| {
                g.yield_all(vec![1, 2]);
                10
            });
            let from_inner = g.yield_from(inner).unwrap_or(0);
            g.yield_val(3);
            from_inner + 1
        });
        let mut iter = outer.iter();
        let items: Vec<u32> = iter.by_ref().collect();
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(iter.into_return(), Some(11));
    }

    #[test]
    fn close_drops_owned_values_inner_first() {
        struct Noisy(&'static str, Rc<RefCell<Vec<&'static str>>>);
        impl Drop for Noisy {
            fn drop(&mut self) {
                self.1.borrow_mut().push(self.0);
            }
        }

        let order = Rc::new(RefCell::new(Vec::new()));
        let (outer_log, inner_log) = (order.clone(), order.clone());
        let mut outer = Generator::<u8, ()>::new(move |g| {
            let _outer = Noisy("outer", outer_log);
            let inner = Generator::<u8, ()>::new(move |g| {
                let _inner = Noisy("inner", inner_log);
                loop {
                    g.yield_val(7);
                }
            });
            let _ = g.yield_from(inner);
        });

        assert_eq!(outer.advance(), Ok(ResumeResult::Yield(7)));
        assert!(order.borrow().is_empty());
        assert_eq!(outer.close(), None);
        assert_eq!(*order.borrow(), vec!["inner", "outer"]);
        assert_eq!(outer.state(), GenState::Completed);
        assert_eq!(outer.close(), None);
        assert_eq!(outer.advance(), Err(GenError::Exhausted));
    }

    #[test]
    fn failed_stack_allocation_keeps_generator_startable() {
        let mut gen = Generator::<u8, ()>::new(|g| {
            g.yield_val(1);
        })
        .stack_size(usize::MAX / 2);
        match gen.advance() {
            Err(GenError::StackAllocation(_)) => {}
            other => panic!("unexpected resume result {:?}", other),
        }
        assert_eq!(gen.state(), GenState::Created);

        gen = gen.stack_size(0x20000);
        assert_eq!(gen.advance(), Ok(ResumeResult::Yield(1)));
        assert_eq!(gen.advance(), Ok(ResumeResult::Return(())));
    }

    #[test]
    fn iteration_stops_on_failed_start() {
        let gen = Generator::<u8, ()>::new(|g| g.yield_all(vec![1, 2])).stack_size(usize::MAX / 2);
        let items: Vec<u8> = gen.collect();
        assert!(items.is_empty());
    }

    #[test]
    fn close_unstarted_generator() {
        let mut gen = Generator::<u8, ()>::new(|g| {
            g.yield_val(1);
        });
        assert_eq!(gen.close(), None);
        assert!(gen.is_completed());
        assert_eq!(gen.advance(), Err(GenError::Exhausted));
    }
}
