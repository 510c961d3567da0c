//! Raw, non-dereferenceable pointer wrappers.
//!
//! `Ptr<T>` / `MutPtr<T>` stand in for `*const T` / `*mut T` everywhere the
//! scheduler, fiber and container code need a handle to data it does not
//! own outright (the other side of an intrusive link, the fiber currently
//! running, a waiter queued on a mutex). They carry no lifetime and no
//! aliasing guarantee; turning one into a reference is always an `unsafe`
//! step performed at the point where the caller can justify it.

use std::cmp;
use std::fmt::{self, Debug, Formatter, Result};
use std::ptr::{self, null_mut};

use crate::macros::assert_unsafe_precondition;

#[doc(hidden)]
pub mod internal;
pub mod pin;
pub mod ptr;

#[doc(inline)]
pub use pin::*;
#[doc(inline)]
pub use ptr::*;
