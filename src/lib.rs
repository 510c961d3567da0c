pub mod cell;
pub mod container;
pub mod error;
pub mod fiber;
pub mod log;
pub mod macros;
pub mod opt;
pub mod pointer;
pub mod runtime;
pub mod scheduler;
pub mod sync;

pub extern crate ctor;
pub extern crate lazy_static;
