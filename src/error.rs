//! A single alias over [`std::io`]'s error type.
//!
//! Nothing in this runtime needs a bespoke error taxonomy: the only
//! fallible operation exposed to callers is fiber creation, and the only
//! way that fails is the underlying `mmap`/`mprotect` calls for a new
//! stack running out of memory or address space. We report that the same
//! way the rest of the ecosystem reports OS failures.

pub type Result<T> = std::io::Result<T>;
