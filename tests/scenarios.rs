extern crate sendgen;

use std::cell::RefCell;
use std::rc::Rc;

use sendgen::{
    Delegator, Downloader, GenError, GenState, Generator, ResumeResult, Resumable, SequenceGenerator, StepMode,
};

#[test]
fn default_resumption_yields_every_element_then_terminal() {
    for source in &["", "a", "Nick", "generators"] {
        let mut gen = SequenceGenerator::of_str(source);
        for expected in source.chars() {
            assert_eq!(gen.advance(), Ok(ResumeResult::Yield(expected)));
        }
        assert_eq!(gen.advance(), Ok(ResumeResult::Return(())));
        assert_eq!(gen.advance(), Err(GenError::Exhausted));
    }
}

#[test]
fn jump_applies_to_the_following_emission() {
    let source: Vec<u32> = (0..20).collect();
    for jump in 0..5 {
        let mut gen = SequenceGenerator::new(source.clone());
        assert_eq!(gen.advance(), Ok(ResumeResult::Yield(0)));
        assert_eq!(gen.advance(), Ok(ResumeResult::Yield(1)));
        let cursor = gen.cursor();
        assert_eq!(gen.send(jump), Ok(ResumeResult::Yield(source[cursor + jump])));

        let mut skipping = SequenceGenerator::new(source.clone()).with_step_mode(StepMode::SkipAhead);
        skipping.advance().unwrap();
        assert_eq!(skipping.send(jump), Ok(ResumeResult::Yield(source[1 + jump])));
    }
}

#[test]
fn variable_step_walkthrough() {
    let mut gen = SequenceGenerator::of_str("Nick");
    assert_eq!(gen.advance(), Ok(ResumeResult::Yield('N')));
    assert_eq!(gen.send(2), Ok(ResumeResult::Yield('c')));
    assert_eq!(gen.advance(), Ok(ResumeResult::Yield('k')));
    assert_eq!(gen.advance(), Ok(ResumeResult::Return(())));

    let mut gen = SequenceGenerator::of_str("Nick").with_step_mode(StepMode::SkipAhead);
    assert_eq!(gen.advance(), Ok(ResumeResult::Yield('N')));
    assert_eq!(gen.send(2), Ok(ResumeResult::Yield('k')));
    assert_eq!(gen.advance(), Ok(ResumeResult::Return(())));
    assert_eq!(gen.advance(), Err(GenError::Exhausted));
}

#[test]
fn delegation_walkthrough() {
    let downloads = Rc::new(RefCell::new(Vec::<String>::new()));
    let results = Rc::new(RefCell::new(Vec::new()));
    let starts = Rc::new(RefCell::new(0));

    let (d, s, r) = (downloads.clone(), starts.clone(), results.clone());
    let mut proxy = Delegator::new(
        move || {
            *s.borrow_mut() += 1;
            let d = d.clone();
            Downloader::new(move |url: &str| d.borrow_mut().push(url.to_string()))
        },
        move |result| r.borrow_mut().push(result),
    );
    assert_eq!(*starts.borrow(), 0);

    assert_eq!(proxy.advance(), Ok(ResumeResult::Yield(())));
    assert_eq!(*starts.borrow(), 1);
    assert!(downloads.borrow().is_empty());

    assert_eq!(proxy.send("www.gmail.com".to_string()), Ok(ResumeResult::Yield(())));
    assert_eq!(*downloads.borrow(), vec!["www.gmail.com".to_string()]);

    assert_eq!(proxy.advance(), Ok(ResumeResult::Yield(())));
    assert_eq!(*results.borrow(), vec!["ok"]);
    assert_eq!(*starts.borrow(), 2);

    assert_eq!(proxy.close(), None);
    assert_eq!(proxy.close(), None);
    assert_eq!(proxy.state(), GenState::Completed);
}

#[test]
fn closure_generators_match_state_machines() {
    let results = Rc::new(RefCell::new(Vec::new()));
    let r = results.clone();
    let mut stackful = Generator::<(), (), String>::new(move |g| loop {
        let downloader = Generator::<(), &'static str, String>::new(|g| {
            while g.yield_val(()).is_some() {}
            "ok"
        });
        match g.yield_from(downloader) {
            Ok(result) => r.borrow_mut().push(result),
            Err(_) => return,
        }
    });
    let mut machine = Delegator::new(|| Downloader::new(|_: &str| {}), |_| {});

    let sends = vec![None, Some("a".to_string()), Some("b".to_string()), None, Some("c".to_string())];
    for send in sends {
        let stackful_step = stackful.resume(send.clone()).map(ResumeResult::yielded);
        assert_eq!(stackful_step, machine.resume(send).map(ResumeResult::yielded));
    }
    assert_eq!(*results.borrow(), vec!["ok"]);
    assert_eq!(machine.rounds(), 1);
}

#[test]
fn closing_completed_generators_is_a_no_op() {
    let mut seq = SequenceGenerator::of_str("x");
    seq.advance().unwrap();
    seq.advance().unwrap();
    assert!(seq.is_completed());
    assert_eq!(seq.close(), None);

    let mut gen = Generator::<u8, u8>::new(|_| 5);
    assert_eq!(gen.advance(), Ok(ResumeResult::Return(5)));
    assert_eq!(gen.close(), None);
    assert_eq!(gen.close(), None);
    assert_eq!(gen.advance(), Err(GenError::Exhausted));
}
