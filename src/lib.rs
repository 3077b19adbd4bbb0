//! # sendgen
//!
//! Resumable generators that yield values, receive values through `send` and
//! delegate to sub-generators.
//!
//! Two flavours share the [`Resumable`] contract:
//!
//! * explicit state machines such as [`SequenceGenerator`], [`Downloader`] and
//!   the yield-from proxy [`Delegator`]
//! * closure bodied [`Generator`]s running on their own stack, which delegate
//!   with [`GeneratorChannel::yield_from`]
//!
//! ```no_run
//! use sendgen::{Resumable, ResumeResult, SequenceGenerator};
//!
//! let mut gen = SequenceGenerator::of_str("Nick");
//! assert_eq!(gen.advance(), Ok(ResumeResult::Yield('N')));
//! assert_eq!(gen.send(2), Ok(ResumeResult::Yield('c')));
//! ```

#[macro_use]
extern crate log;

pub mod config;
pub mod coroutines;
pub mod delegate;
pub mod error;
pub mod generators;
pub mod resumable;
pub mod sequence;
mod transfer;

pub use crate::config::{config, Config};
pub use crate::delegate::{Delegator, Downloader, DOWNLOAD_DONE};
pub use crate::error::{GenError, GenResult};
pub use crate::generators::{Generator, GeneratorChannel};
pub use crate::resumable::{GenState, GeneratorIterator, ResumeResult, Resumable};
pub use crate::sequence::{SequenceGenerator, StepMode};
