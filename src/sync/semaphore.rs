use std::fmt::{self, Debug, Formatter};

use crate::cell::Cell;
use crate::container::{LinkedList, Node};
use crate::container_of;
use crate::macros::ptr;
use crate::pointer::*;
use crate::scheduler::{self, FiberHandle};
use crate::trace;

/// Queue node for a fiber blocked on [`Semaphore::acquire`], recording how
/// many permits it's waiting for.
struct WaitBlock {
	link: Node,
	fiber: FiberHandle,
	requested: usize
}

/// A counting, bounded semaphore with FIFO head-of-line-blocking wakeups.
///
/// `release` only ever satisfies waiters starting from the head of the
/// queue: if the waiter at the head requested more permits than are
/// available, it blocks every waiter behind it even if one of them could
/// be satisfied with what's on hand. This avoids starving a large request
/// in favor of smaller, later ones.
pub struct Semaphore {
	wait: LinkedList,
	permits: Cell<usize>,
	limit: usize
}

impl Semaphore {
	/// Construct a semaphore starting with `initial` permits available,
	/// never to exceed `limit` after any [`Semaphore::release`].
	///
	/// # Panics
	/// If `initial` exceeds `limit`.
	#[must_use]
	pub fn new(initial: usize, limit: usize) -> Self {
		assert!(initial <= limit, "initial permit count exceeds limit");

		Self { wait: LinkedList::new(), permits: Cell::new(initial), limit }
	}

	#[must_use]
	pub fn available(&self) -> usize {
		self.permits.get()
	}

	#[must_use]
	pub fn limit(&self) -> usize {
		self.limit
	}

	/// Acquire `count` permits, blocking the calling fiber until they're
	/// available. A request only ever succeeds once it reaches the head
	/// of an empty or fully-drained wait list — it can never jump ahead
	/// of an earlier, still-unsatisfied waiter.
	///
	/// # Panics
	/// If `count` exceeds [`Semaphore::limit`] (it could never be
	/// satisfied).
	pub fn acquire(&self, count: usize) {
		assert!(count <= self.limit, "requested more permits than the semaphore's limit");

		if self.wait.is_empty() && count <= self.permits.get() {
			self.permits.set(self.permits.get() - count);
			return;
		}

		let me = scheduler::current();
		let mut block = WaitBlock { link: Node::new(), fiber: me, requested: count };

		/* Safety: `block` was just constructed and is unlinked */
		unsafe { self.wait.push_back(ptr!(&mut block=>link)) };

		trace!(
			".. fiber {:?} blocking on semaphore {:?} for {} permits",
			me,
			Ptr::from(self),
			count
		);

		scheduler::park();

		debug_assert!(self.permits.get() <= self.limit);
	}

	/// Release `count` permits, then wake as many head-of-line waiters as
	/// the now-available permits satisfy, stopping at the first waiter
	/// (if any) whose request still can't be met.
	///
	/// Silently clamps to [`Semaphore::limit`] rather than failing: a
	/// release that would overshoot just tops the semaphore off.
	pub fn release(&self, count: usize) {
		let permits = self.permits.get().saturating_add(count).min(self.limit);

		self.permits.set(permits);

		while let Some(node) = self.wait.head() {
			let block: MutPtr<WaitBlock> = container_of!(node, WaitBlock: link);

			/* Safety: `block` belongs to a fiber parked in `acquire`, whose
			 * stack (and therefore this wait block) is still live */
			let requested = unsafe { block.as_ref() }.requested;

			if requested > self.permits.get() {
				break;
			}

			self.permits.set(self.permits.get() - requested);

			let popped = self.wait.pop_front();

			debug_assert!(popped.is_some());

			/* Safety: same as above */
			let waiter = unsafe { block.as_ref() }.fiber;

			trace!(
				"~~ semaphore {:?} granting {} permits to fiber {:?}",
				Ptr::from(self),
				requested,
				waiter
			);

			scheduler::unpark(waiter);
		}
	}
}

impl Debug for Semaphore {
	fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
		fmt.debug_struct("Semaphore")
			.field("permits", &self.permits.get())
			.field("limit", &self.limit)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod test {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::scheduler;

	#[test]
	fn uncontended_acquire_release() {
		let sem = Rc::new(Semaphore::new(2, 2));

		{
			let sem = Rc::clone(&sem);

			scheduler::create(move || {
				sem.acquire(2);
				assert_eq!(sem.available(), 0);
				sem.release(2);
				assert_eq!(sem.available(), 2);
			})
			.unwrap();
		}

		scheduler::run();
	}

	#[test]
	fn head_of_line_blocks_smaller_waiter() {
		let sem = Rc::new(Semaphore::new(0, 10));
		let order = Rc::new(RefCell::new(Vec::new()));

		{
			let sem = Rc::clone(&sem);
			let order = Rc::clone(&order);

			scheduler::create(move || {
				sem.acquire(10);
				order.borrow_mut().push("big");
			})
			.unwrap();
		}

		{
			let sem = Rc::clone(&sem);
			let order = Rc::clone(&order);

			scheduler::create(move || {
				sem.acquire(1);
				order.borrow_mut().push("small");
			})
			.unwrap();
		}

		{
			let sem = Rc::clone(&sem);

			scheduler::create(move || {
				/* enough for "small" alone, not for "big" ahead of it */
				sem.release(1);
			})
			.unwrap();
		}

		scheduler::run();

		/* neither waiter has run yet: "big" still blocks the head */
		assert!(order.borrow().is_empty());
		assert_eq!(sem.available(), 1);

		{
			let sem = Rc::clone(&sem);

			scheduler::create(move || {
				sem.release(10);
			})
			.unwrap();
		}

		scheduler::run();

		assert_eq!(*order.borrow(), vec!["big", "small"]);
	}
}
