use std::io::{Error, Result};
use std::ptr::null_mut;

use crate::pointer::*;

/// Default stack size for a fiber that doesn't ask for a specific one.
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024;

fn page_size() -> usize {
	/* Safety: sysconf with _SC_PAGESIZE never fails on a sane target */
	let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

	usize::try_from(size).unwrap_or(4096)
}

fn round_up(value: usize, to: usize) -> usize {
	(value + to - 1) / to * to
}

/// An anonymous, guard-paged stack mapping for a single fiber.
///
/// The mapping reserves one extra page below the usable region and leaves
/// it unreadable and unwritable: a stack overflow faults there instead of
/// silently corrupting whatever the allocator placed below it.
pub struct Stack {
	map: *mut libc::c_void,
	map_len: usize,
	usable: MutPtr<u8>,
	usable_len: usize
}

impl Stack {
	/// A placeholder standing in for the host OS thread's own call stack.
	///
	/// Used only by the main-proxy fiber, whose [`Context`](super::x64::Context)
	/// is never built from scratch with [`Context::set_start`](super::x64::Context::set_start) —
	/// it's a destination fibers switch *back* into, never a stack the
	/// runtime allocates or frees.
	#[must_use]
	pub const fn main_proxy() -> Self {
		Self { map: null_mut(), map_len: 0, usable: MutPtr::null(), usable_len: 0 }
	}

	pub fn new(size: usize) -> Result<Self> {
		let page = page_size();
		let usable_len = round_up(size.max(page), page);
		let map_len = usable_len + page;

		/* Safety: PROT_NONE reservation, no memory is touched yet */
		let map = unsafe {
			libc::mmap(
				null_mut(),
				map_len,
				libc::PROT_NONE,
				libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
				-1,
				0
			)
		};

		if map == libc::MAP_FAILED {
			return Err(Error::last_os_error());
		}

		/* Safety: `map` is a fresh mapping of at least `map_len` bytes; the
		 * usable region starts one guard page in */
		let usable = unsafe { map.cast::<u8>().add(page) };

		/* Safety: `usable` lies entirely within the mapping just created */
		let rc = unsafe {
			libc::mprotect(
				usable.cast(),
				usable_len,
				libc::PROT_READ | libc::PROT_WRITE
			)
		};

		if rc != 0 {
			let err = Error::last_os_error();

			/* Safety: undoes the mmap above */
			unsafe { libc::munmap(map, map_len) };

			return Err(err);
		}

		Ok(Self { map, map_len, usable: MutPtr::from(usable), usable_len })
	}

	#[must_use]
	pub fn base(&self) -> MutPtr<u8> {
		self.usable
	}

	#[must_use]
	pub const fn len(&self) -> usize {
		self.usable_len
	}

	/// Address one past the highest usable byte: the initial stack pointer
	/// for a downward-growing stack on both of our supported targets.
	#[must_use]
	pub fn top(&self) -> usize {
		#[allow(clippy::arithmetic_side_effects)]
		(self.usable.addr() + self.usable_len)
	}

	/// Release pages back to the kernel without unmapping them.
	///
	/// # Safety
	/// The fiber owning this stack must not be running.
	pub unsafe fn advise_free(&mut self) {
		/* Safety: advisory only, failure is not observable */
		unsafe {
			libc::madvise(self.usable.as_mut_ptr().cast(), self.usable_len, libc::MADV_DONTNEED);
		}
	}
}

impl Drop for Stack {
	fn drop(&mut self) {
		if self.map.is_null() {
			return;
		}

		/* Safety: `map`/`map_len` describe the mapping created in `new` */
		unsafe {
			libc::munmap(self.map, self.map_len);
		}
	}
}

/* Safety: the mapping is exclusively owned by the Stack that holds it */
unsafe impl Send for Stack {}
