extern crate sendgen;
use sendgen::Generator;

fn main() {
    for f in Generator::<u64, ()>::new(|g| {
        let mut current = (0, 1);
        loop {
            g.yield_val(current.0);
            current = (current.1, current.0 + current.1);
        }
    })
    .take(42)
    {
        println!("{}", f)
    }
}
