use std::panic::{catch_unwind, AssertUnwindSafe};

use sendgen::{GenState, Generator, Resumable};

fn main() {
    let mut g = Generator::<u32, ()>::new(|g| {
        g.yield_val(0);
        let _ = g.yield_from(Generator::<u32, ()>::new(|_| panic!("inner generator failed")));
    });
    let catch_result = catch_unwind(AssertUnwindSafe(|| {
        for i in g.iter() {
            println!("value {}", i)
        }
    }));

    println!("result: {:?} completed: {}", catch_result.is_ok(), g.state() == GenState::Completed);
}
