use sendgen::coroutines::{CoroutineChannel, CoroutineFactory};

fn main() {
    let mut coroutine = CoroutineFactory::new(|chan: &mut CoroutineChannel<std::cmp::Ordering, u32, i32>, mut i: i32| {
        let mut counter = 0;
        while i != 10 {
            counter += 1;
            i = chan.suspend(i.cmp(&10));
        }
        counter
    })
    .build()
    .expect("coroutine stack");

    for i in 5..11 {
        println!("{:?}", coroutine.resume(i));
    }
}
