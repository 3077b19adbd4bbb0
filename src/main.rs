#[macro_use]
extern crate log;

use std::process;

use docopt::Docopt;
use serde::Deserialize;

use sendgen::{
    config, Delegator, Downloader, GenResult, Generator, ResumeResult, Resumable, SequenceGenerator, StepMode,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "
Generator walkthroughs.

Usage:
  sendgen fixed [--source=<s>]
  sendgen variable [--source=<s>] [--jump=<n>] [--skip-ahead]
  sendgen delegate [--stackful] [--stack-size=<bytes>] [<url>...]
  sendgen (-h | --help)
  sendgen (-v | --version)

Options:
  -h --help             Show this screen.
  -v --version          Show version.
  --source=<s>          Sequence to walk [default: Nick].
  --jump=<n>            Jump sent at the second resumption [default: 2].
  --skip-ahead          Count the jump from the element after the current one.
  --stackful            Run the proxy as a closure generator.
  --stack-size=<bytes>  Stack size of closure generators, 0 for the default [default: 0].
";

#[derive(Debug, Deserialize)]
struct Args {
    cmd_fixed: bool,
    cmd_variable: bool,
    cmd_delegate: bool,
    flag_source: String,
    flag_jump: usize,
    flag_skip_ahead: bool,
    flag_stackful: bool,
    flag_stack_size: usize,
    arg_url: Vec<String>,
}

fn show_jump(jump: Option<usize>) {
    match jump {
        Some(jump) => println!("jump assigned {}", jump),
        None => println!("jump assigned None"),
    }
}

fn show<Y: std::fmt::Display, R>(step: ResumeResult<Y, R>) {
    match step {
        ResumeResult::Yield(y) => println!("{}", y),
        ResumeResult::Return(_) => println!("<exhausted>"),
    }
}

/// every element by plain resumption
fn fixed_step(source: &str) -> GenResult<()> {
    let mut gen = SequenceGenerator::of_str(source).on_receive(show_jump);
    loop {
        let step = gen.advance()?;
        let done = !step.is_yield();
        show(step);
        if done {
            return Ok(());
        }
    }
}

/// next, send(jump), next, next
fn variable_step(source: &str, jump: usize, mode: StepMode) -> GenResult<()> {
    let mut gen = SequenceGenerator::of_str(source)
        .with_step_mode(mode)
        .on_receive(show_jump);
    show(gen.advance()?);
    show(gen.send(jump)?);
    while !gen.is_completed() {
        show(gen.advance()?);
    }
    Ok(())
}

fn new_downloader() -> Downloader<fn(&str)> {
    println!("downloader started");
    Downloader::new(|url| println!("download {}", url))
}

fn drive_proxy<P>(proxy: &mut P, urls: Vec<String>) -> GenResult<()>
where
    P: Resumable<Yield = (), Send = String>,
{
    proxy.advance()?;
    for url in urls {
        proxy.send(url)?;
    }
    proxy.advance()?;
    proxy.close();
    Ok(())
}

fn delegation(urls: Vec<String>, stackful: bool) -> GenResult<()> {
    let urls = if urls.is_empty() {
        vec!["www.gmail.com".to_string()]
    } else {
        urls
    };
    if stackful {
        let mut proxy = Generator::<(), (), String>::new(|g| loop {
            match g.yield_from(new_downloader()) {
                Ok(result) => println!("{}", result),
                Err(e) => {
                    error!("delegation failed: {}", e);
                    return;
                }
            }
        });
        drive_proxy(&mut proxy, urls)
    } else {
        let mut proxy = Delegator::new(new_downloader, |result| println!("{}", result));
        drive_proxy(&mut proxy, urls)
    }
}

fn run(args: Args) -> GenResult<()> {
    if args.cmd_fixed {
        fixed_step(&args.flag_source)
    } else if args.cmd_variable {
        let mode = if args.flag_skip_ahead {
            StepMode::SkipAhead
        } else {
            StepMode::Replace
        };
        variable_step(&args.flag_source, args.flag_jump, mode)
    } else {
        config().set_stack_size(args.flag_stack_size);
        delegation(args.arg_url, args.flag_stackful)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.version(Some(VERSION.into())).deserialize())
        .unwrap_or_else(|e| e.exit());
    debug!("{:?}", args);

    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}
