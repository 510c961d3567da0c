//! Synchronization primitives built entirely as data-structure operations
//! around [`crate::scheduler::park`]/[`crate::scheduler::unpark`].
//!
//! Both primitives here are single-threaded: they coordinate fibers
//! cooperatively scheduled on the same OS thread, not OS threads
//! themselves. Calling either from outside a running fiber is undefined
//! behavior, checked by debug assertion.

pub mod mutex;
pub mod semaphore;

#[doc(inline)]
pub use mutex::{Mutex, MutexGuard};
#[doc(inline)]
pub use semaphore::Semaphore;
