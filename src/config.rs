//! Process wide generator configuration
//!

use std::sync::atomic::{AtomicUsize, Ordering};

// default stack size of a closure generator, in bytes
const DEFAULT_STACK_SIZE: usize = 0x20000;

static STACK_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_STACK_SIZE);

/// `sendgen` Configuration type
pub struct Config;

/// get the configuration instance
pub fn config() -> Config {
    Config
}

/// settings only affect generators whose stack is created afterwards
impl Config {
    /// set the stack size of closure generators in bytes
    ///
    /// if you pass 0 to it, will use internal default
    pub fn set_stack_size(&self, size: usize) -> &Self {
        let size = if size == 0 { DEFAULT_STACK_SIZE } else { size };
        info!("set stack size={:?}", size);
        STACK_SIZE.store(size, Ordering::Release);
        self
    }

    /// get the stack size of closure generators in bytes
    pub fn get_stack_size(&self) -> usize {
        STACK_SIZE.load(Ordering::Acquire)
    }
}
