//! Three fibers contend for one mutex; a shared counter incremented on
//! entry and decremented before release must never be observed above 1,
//! and fiber 0 additionally re-enters recursively without deadlocking
//! itself.

use std::cell::Cell;
use std::rc::Rc;

use filament::scheduler;
use filament::sync::Mutex;

#[test]
fn at_most_one_fiber_in_critical_section() {
	let mutex = Rc::new(Mutex::new(()));
	let inside = Rc::new(Cell::new(0u32));
	let max_inside = Rc::new(Cell::new(0u32));
	let exits = Rc::new(Cell::new(0u32));

	for id in 0..3 {
		let mutex = Rc::clone(&mutex);
		let inside = Rc::clone(&inside);
		let max_inside = Rc::clone(&max_inside);
		let exits = Rc::clone(&exits);

		scheduler::create(move || {
			mutex.acquire();

			if id == 1 {
				mutex.acquire();
				mutex.acquire();
			}

			inside.set(inside.get() + 1);
			max_inside.set(max_inside.get().max(inside.get()));

			scheduler::yield_now();

			inside.set(inside.get() - 1);

			if id == 1 {
				mutex.release();
				mutex.release();
			}

			mutex.release();

			exits.set(exits.get() + 1);
		})
		.unwrap();
	}

	scheduler::run();

	assert_eq!(exits.get(), 3);
	assert_eq!(max_inside.get(), 1);

	/* mutex must be unowned now, or this would deadlock the test process */
	drop(mutex.lock());
}
