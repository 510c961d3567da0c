//! The ready-queue scheduler: `run`/`create`/`yield_now`/`exit`/`current`,
//! and the `park`/`unpark` pair every synchronizer in [`crate::sync`] is
//! built from.
//!
//! One [`Scheduler`] exists per OS thread that ever calls [`run`], reached
//! through a `thread_local!`. Two independent threads each running fibers
//! share no state; a fiber created on one must never be handed to the
//! other.

use std::fmt::{self, Debug, Formatter};
use std::io::Result;

use crate::cell::{Cell, UnsafeCell};
use crate::container::LinkedList;
use crate::container_of;
use crate::fiber::{Fiber, Start, DEFAULT_STACK_SIZE};
use crate::macros::ptr;
use crate::pointer::*;
use crate::trace;

/// Opaque identity of a fiber. Comparable and copyable, but offers no way
/// to reach the fiber's fields outside this module and [`crate::sync`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FiberHandle(Ptr<Fiber>);

impl FiberHandle {
	pub(crate) fn from_fiber(fiber: MutPtr<Fiber>) -> Self {
		Self(fiber.cast_const())
	}

	pub(crate) fn as_fiber(self) -> MutPtr<Fiber> {
		self.0.cast_mut()
	}
}

impl Debug for FiberHandle {
	fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
		fmt.debug_tuple("FiberHandle").field(&self.0).finish()
	}
}

/// Reconstructs the `Box<F>` leaked by [`Scheduler::create`] and runs it.
/// Monomorphized once per closure type `F`, so this is the concrete
/// `unsafe fn(Ptr<()>)` a generic-closure fiber's [`Start`] points at.
///
/// # Safety
/// `arg` must be a pointer obtained from `Box::into_raw(Box::<F>::new(_))`,
/// and this must be the only time it is reconstructed.
unsafe fn call_closure<F: FnOnce()>(arg: Ptr<()>) {
	/* Safety: guaranteed by caller */
	let closure = unsafe { Box::from_raw(arg.cast::<F>().cast_mut().as_mut_ptr()) };

	(*closure)();
}

struct Scheduler {
	ready: LinkedList,
	running: Cell<MutPtr<Fiber>>,
	main_proxy: UnsafeCell<Fiber>,
	live: Cell<usize>,
	entered: Cell<bool>
}

thread_local! {
	static INSTANCE: Scheduler = Scheduler::new();
}

impl Scheduler {
	fn new() -> Self {
		Self {
			ready: LinkedList::new(),
			running: Cell::new(MutPtr::null()),
			main_proxy: UnsafeCell::new(Fiber::main()),
			live: Cell::new(0),
			entered: Cell::new(false)
		}
	}

	fn main_proxy(&self) -> MutPtr<Fiber> {
		self.main_proxy.get()
	}

	/// Head of the ready queue if non-empty, else the main-proxy. The
	/// only scheduling policy in this runtime (§4.3).
	fn successor(&self) -> MutPtr<Fiber> {
		match self.ready.pop_front() {
			Some(node) => container_of!(node, Fiber: link),
			None => self.main_proxy()
		}
	}

	fn switch_to(&self, next: MutPtr<Fiber>) {
		let current = self.running.get();

		self.running.set(next);

		/* Safety: `current` is the fiber running on this thread; `next`
		 * is either the popped head of the ready queue or the
		 * main-proxy, both of which are live as long as this thread is */
		unsafe { Fiber::switch(current, next) };
	}

	fn create_raw(&self, start: Start, stack_size: usize) -> Result<FiberHandle> {
		let fiber = Box::new(Fiber::new_with_start(stack_size, start)?);
		let mut fiber: MutPtr<Fiber> = MutPtr::from(Box::into_raw(fiber));

		self.live.set(self.live.get() + 1);

		/* Safety: `fiber` was just allocated and its link is unlinked */
		unsafe { self.ready.push_back(ptr!(&mut fiber=>link)) };

		trace!("++ fiber {:?} created, {} live", fiber, self.live.get());

		Ok(FiberHandle::from_fiber(fiber))
	}

	fn create<F>(&self, f: F) -> Result<FiberHandle>
	where
		F: FnOnce() + 'static
	{
		let arg = Ptr::from(Box::into_raw(Box::new(f))).cast::<()>();

		/* Safety: `call_closure::<F>` reconstructs exactly the box just
		 * leaked above, and only once, the first time this fiber runs */
		let start = unsafe { Start::new(call_closure::<F>, arg) };

		self.create_raw(start, DEFAULT_STACK_SIZE)
	}

	fn run(&self) {
		debug_assert!(!self.entered.get(), "scheduler is already running");

		let Some(head) = self.ready.pop_front() else {
			return;
		};

		self.entered.set(true);

		let head: MutPtr<Fiber> = container_of!(head, Fiber: link);
		let main = self.main_proxy();

		self.running.set(head);

		trace!("-> entering scheduler loop");

		/* Safety: `main` is this thread's native stack, never freed;
		 * `head` was just taken off the ready queue */
		unsafe { Fiber::switch(main, head) };

		self.entered.set(false);

		trace!("<- scheduler loop returned, no fibers remain");
	}

	fn yield_now(&self) {
		let Some(next) = self.ready.pop_front() else {
			return;
		};

		let next: MutPtr<Fiber> = container_of!(next, Fiber: link);
		let mut current = self.running.get();

		/* Safety: `current` is running, so its link is not in any list */
		unsafe { self.ready.push_back(ptr!(&mut current=>link)) };

		self.switch_to(next);
	}

	fn current(&self) -> FiberHandle {
		FiberHandle::from_fiber(self.running.get())
	}

	fn park(&self) {
		self.switch_to(self.successor());
	}

	fn unpark(&self, handle: FiberHandle) {
		let mut fiber = handle.as_fiber();

		/* Safety: a parked fiber's link is not in any list; the caller
		 * is responsible for having already unlinked its wait block */
		unsafe { self.ready.push_back(ptr!(&mut fiber=>link)) };

		trace!("~~ fiber {:?} unparked", fiber);
	}

	fn exit(&self) -> ! {
		let current = self.running.get();
		let next = self.successor();

		self.live.set(self.live.get() - 1);
		self.running.set(next);

		trace!("-- fiber {:?} exiting, {} live", current, self.live.get());

		/* Safety: `current` was heap-allocated by `create_raw` via
		 * `Box::into_raw` and has not been freed or reused */
		let fiber = unsafe { *Box::from_raw(current.as_mut_ptr()) };

		/* Safety: `next` is ready or the main-proxy; `fiber` never runs
		 * again after this call */
		unsafe { fiber.exit(next) }
	}
}

/// Called by the host OS thread. Returns immediately if no fibers have
/// been [`create`]d. Otherwise installs a main-proxy fiber representing
/// this call's own native stack, switches into the head of the ready
/// queue, and returns only once every fiber has [`exit`]ed.
pub fn run() {
	INSTANCE.with(Scheduler::run);
}

/// Schedule a new fiber that runs `f` to completion, then exits. May be
/// called before [`run`] or from within another fiber.
///
/// # Errors
/// Propagates failure to map the new fiber's stack (see [`crate::fiber`]).
pub fn create<F>(f: F) -> Result<FiberHandle>
where
	F: FnOnce() + 'static
{
	INSTANCE.with(|s| s.create(f))
}

/// Cooperatively reschedule: if the ready queue is empty, returns
/// immediately; otherwise enqueues the running fiber at the tail and
/// switches to the new head.
pub fn yield_now() {
	INSTANCE.with(Scheduler::yield_now);
}

/// Divergent: terminate the calling fiber. Its stack and descriptor are
/// freed once its successor's stack is current.
pub fn exit() -> ! {
	INSTANCE.with(Scheduler::exit)
}

/// Identity of the fiber currently running on this thread.
#[must_use]
pub fn current() -> FiberHandle {
	INSTANCE.with(Scheduler::current)
}

/// Suspend the running fiber without placing it on the ready queue. The
/// caller must have already linked a wait block into some synchronizer's
/// wait list before calling this — [`park`] only performs the switch.
///
/// Used by [`crate::sync`] primitives; not useful on its own.
pub fn park() {
	INSTANCE.with(Scheduler::park);
}

/// Mark `handle` ready by placing it at the tail of the ready queue. Does
/// not yield. The caller must have already unlinked its wait block from
/// whatever synchronizer's list held it.
///
/// Used by [`crate::sync`] primitives; not useful on its own.
pub fn unpark(handle: FiberHandle) {
	INSTANCE.with(|s| s.unpark(handle));
}

#[cfg(test)]
mod test {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn run_with_no_fibers_returns_immediately() {
		run();
	}

	#[test]
	fn created_fibers_run_to_completion() {
		let ran = Rc::new(Cell::new(0u32));

		for _ in 0..5 {
			let ran = Rc::clone(&ran);

			create(move || ran.set(ran.get() + 1)).unwrap();
		}

		run();

		assert_eq!(ran.get(), 5);
	}

	#[test]
	fn current_changes_across_a_switch() {
		let seen = Rc::new(Cell::new(None));

		{
			let seen = Rc::clone(&seen);

			create(move || seen.set(Some(current()))).unwrap();
		}

		let before = current();

		run();

		assert_ne!(seen.get(), Some(before));
	}
}
