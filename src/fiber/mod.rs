#![allow(unreachable_pub, clippy::multiple_unsafe_ops_per_block)]

use std::io::Result;
use std::mem::ManuallyDrop;

use crate::cell::Cell;
use crate::container::Node;
use crate::macros::{assert_unsafe_precondition, import_sysdeps, ptr};
use crate::pointer::*;

mod stack;

pub use stack::{Stack, DEFAULT_STACK_SIZE};

import_sysdeps!();

/// The entry point and opaque argument a freshly created fiber starts at.
///
/// Stored in the fiber itself rather than on its stack, and read back out
/// by [`trampoline`] the very first time the fiber is switched to.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Start {
	start: unsafe fn(Ptr<()>),
	arg: Ptr<()>
}

impl Start {
	/// # Safety
	/// `start` must never panic, and must exit the fiber (see
	/// [`Fiber::exit`]) rather than returning.
	#[must_use]
	pub const unsafe fn new(start: unsafe fn(Ptr<()>), arg: Ptr<()>) -> Self {
		Self { start, arg }
	}
}

/// Runs as the very first code any freshly created fiber executes. Reads
/// its own entry point and argument back out of the fiber the scheduler
/// says is currently running, calls it, then exits.
///
/// Installed as the return address of a fiber's synthesized initial stack
/// frame by [`Stack`]'s architecture-specific `Context::set_start`.
unsafe extern "C" fn trampoline() -> ! {
	let fiber = crate::scheduler::current().as_fiber();

	/* Safety: `fiber` is the one fiber running on this thread right now;
	 * its `start` was written once, before it first ran, and is read
	 * back here exactly once */
	let start = unsafe { fiber.as_ref() }.start();

	/* Safety: contract upheld by whoever constructed `start` */
	unsafe { (start.start)(start.arg) };

	crate::scheduler::exit();
}

unsafe extern "C" fn exit_fiber(arg: *mut ()) {
	/* Safety: guaranteed by caller, see Fiber::exit — `arg` names a live
	 * `ManuallyDrop<Fiber>` on the exiting fiber's now-inactive stack */
	let fiber = unsafe { &mut *arg.cast::<ManuallyDrop<Fiber>>() };

	/* Safety: the fiber has already switched off of its own stack */
	drop(unsafe { ManuallyDrop::take(fiber) });
}

/// A cooperatively scheduled unit of control with its own stack.
///
/// Consists of a saved register context (everything needed to resume
/// execution), the guard-paged stack memory that context's stack pointer
/// lives inside, and the entry point it starts at. Fibers never run
/// concurrently with each other; exactly one is running on the host OS
/// thread at a time, and the rest are suspended mid-function, their state
/// entirely captured by `context`.
#[repr(C)]
pub struct Fiber {
	context: Context,
	stack: Stack,
	start: Cell<Option<Start>>,
	/// Link used by whichever list currently holds this fiber: the ready
	/// queue, or a synchronizer's wait list. Never both at once.
	pub link: Node
}

impl Fiber {
	/// Build a descriptor for the fiber the host OS thread is already
	/// running on. It owns no stack of its own — its context is only ever
	/// a destination to switch *into*, never a source to resume from a
	/// trampoline.
	#[must_use]
	pub fn main() -> Self {
		Self {
			context: Context::default(),
			stack: Stack::main_proxy(),
			start: Cell::new(None),
			link: Node::new()
		}
	}

	pub fn new(stack_size: usize) -> Result<Self> {
		let stack = Stack::new(stack_size)?;

		Ok(Self {
			/* all-zero context: never started, no saved registers yet */
			context: Context::default(),
			stack,
			start: Cell::new(None),
			link: Node::new()
		})
	}

	pub fn new_with_start(stack_size: usize, start: Start) -> Result<Self> {
		let mut this = Self::new(stack_size)?;

		/* Safety: the fiber was never started */
		unsafe { this.set_start(start) };

		Ok(this)
	}

	/// Set the entry point of the fiber, (re)initializing its stack
	/// pointer to the top of its stack.
	///
	/// # Safety
	/// The fiber must not be running.
	pub unsafe fn set_start(&mut self, start: Start) {
		self.start.set(Some(start));
		self.context.set_start(&self.stack, trampoline);
	}

	/// The entry point this fiber starts at, set by [`Fiber::set_start`].
	///
	/// # Panics
	/// If called on a fiber that was never given an entry point (the
	/// main-proxy).
	#[must_use]
	#[allow(clippy::expect_used)]
	fn start(&self) -> Start {
		self.start.get().expect("fiber has no entry point")
	}

	/// Switch from the currently running fiber `this` to `to`.
	///
	/// # Safety
	/// `this` must be the fiber currently running on this OS thread.
	pub unsafe fn switch(this: MutPtr<Self>, to: MutPtr<Self>) {
		/* Safety: guaranteed by caller */
		unsafe { assert_unsafe_precondition!(!this.is_null() && !to.is_null()) };

		/* note for arch specific implementations: every register not
		 * preserved across a C call must be declared clobbered. letting
		 * the compiler save what it knows it's using is cheaper than
		 * hand-saving everything in the assembly routine. */

		/* Safety: guaranteed by caller */
		unsafe {
			switch(
				ptr!(&mut this=>context).as_mut(),
				ptr!(&mut to=>context).as_mut()
			);
		}
	}

	/// # Safety
	/// The fiber must not be running.
	pub unsafe fn clear_stack(&mut self) {
		/* Safety: guaranteed by caller */
		unsafe { self.stack.advise_free() };
	}

	/// Switch away from `self` to `to`, freeing `self`'s stack and
	/// descriptor once `to`'s stack is current. `self` never runs again.
	///
	/// # Safety
	/// Same as [`Fiber::switch`].
	pub unsafe fn exit(self, to: MutPtr<Self>) -> ! {
		/* Safety: guaranteed by caller */
		unsafe { assert_unsafe_precondition!(!to.is_null()) };

		let mut fiber = ManuallyDrop::new(self);
		let ptr = ptr!(&mut fiber);
		let arg: Ptr<()> = ptr.cast_const().cast();

		/* Safety: contract upheld by caller; `exit_fiber` only touches
		 * `arg` once `to`'s stack is current, see `exit_switch` */
		unsafe { exit_switch(ptr!(&mut to=>context).as_mut(), exit_fiber, arg) }
	}
}

/* Safety: the stack mapping is owned exclusively by the fiber */
unsafe impl Send for Fiber {}

#[cfg(test)]
mod test {
	use std::cell::RefCell;
	use std::rc::Rc;

	use crate::scheduler;

	/* a bare two-fiber switch can't be exercised below the scheduler: the
	 * entry trampoline reads its `Start` back out through
	 * `scheduler::current()`, so even this "just the fiber layer" test
	 * goes through `create`/`run` rather than hand-driving `Fiber::switch`
	 * the way a descriptor with no trampoline dependency could */
	#[test]
	fn alternating_fibers_each_see_their_own_state() {
		let trace = Rc::new(RefCell::new(Vec::new()));

		for id in 0..2 {
			let trace = Rc::clone(&trace);

			scheduler::create(move || {
				for step in 0..3 {
					trace.borrow_mut().push((id, step));
					scheduler::yield_now();
				}
			})
			.unwrap();
		}

		scheduler::run();

		assert_eq!(
			*trace.borrow(),
			vec![(0, 0), (1, 0), (0, 1), (1, 1), (0, 2), (1, 2)]
		);
	}
}
