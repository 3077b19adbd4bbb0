//! The delegation walkthrough with a closure generator as proxy and a
//! closure generator as downloader.
use sendgen::{Generator, Resumable};

fn downloader<'a>() -> Generator<'a, (), &'static str, String> {
    Generator::new(|g| {
        println!("start downloader");
        while let Some(url) = g.yield_val(()) {
            println!("download {}", url);
        }
        "ok"
    })
}

fn main() {
    env_logger::init();

    let mut proxy = Generator::<(), (), String>::new(|g| loop {
        match g.yield_from(downloader()) {
            Ok(result) => println!("downloader returned {}", result),
            Err(e) => {
                eprintln!("{}", e);
                return;
            }
        }
    });

    proxy.advance().expect("start proxy");
    proxy.send("www.gmail.com".to_string()).expect("forward url");
    proxy.advance().expect("finish downloader");
    proxy.close();
}
