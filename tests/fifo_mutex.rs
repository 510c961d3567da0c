//! Five fibers queue up on a held mutex in a known order; releasing it
//! five times must wake them in exactly that order, never letting a
//! later arrival barge ahead of an earlier one.

use std::cell::RefCell;
use std::rc::Rc;

use filament::scheduler;
use filament::sync::Mutex;

#[test]
fn waiters_wake_in_enqueue_order() {
	let mutex = Rc::new(Mutex::new(()));
	let order = Rc::new(RefCell::new(Vec::new()));

	let holder_mutex = Rc::clone(&mutex);
	let holder_order = Rc::clone(&order);

	scheduler::create(move || {
		holder_mutex.acquire();

		for id in 0..5 {
			let mutex = Rc::clone(&holder_mutex);
			let order = Rc::clone(&holder_order);

			scheduler::create(move || {
				mutex.acquire();
				order.borrow_mut().push(id);
				mutex.release();
			})
			.unwrap();
		}

		/* let all five waiters enqueue behind us before we release */
		scheduler::yield_now();
		holder_mutex.release();
	})
	.unwrap();

	scheduler::run();

	assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4]);
}
