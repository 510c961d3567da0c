//! A semaphore waiter requesting more permits than are available blocks
//! every waiter queued behind it, even one whose smaller request could
//! otherwise be satisfied immediately.

use std::cell::Cell;
use std::rc::Rc;

use filament::scheduler;
use filament::sync::Semaphore;

#[test]
fn unsatisfiable_head_blocks_satisfiable_tail() {
	let sem = Rc::new(Semaphore::new(0, 11));
	let a_acquired = Rc::new(Cell::new(false));
	let b_acquired = Rc::new(Cell::new(false));

	{
		let sem = Rc::clone(&sem);
		let a_acquired = Rc::clone(&a_acquired);

		scheduler::create(move || {
			sem.acquire(10);
			a_acquired.set(true);
		})
		.unwrap();
	}

	{
		let sem = Rc::clone(&sem);
		let b_acquired = Rc::clone(&b_acquired);

		scheduler::create(move || {
			sem.acquire(1);
			b_acquired.set(true);
		})
		.unwrap();
	}

	{
		let sem = Rc::clone(&sem);

		scheduler::create(move || sem.release(5)).unwrap();
	}

	scheduler::run();

	assert!(!a_acquired.get());
	assert!(!b_acquired.get());
	assert_eq!(sem.available(), 5);

	{
		let sem = Rc::clone(&sem);

		scheduler::create(move || sem.release(6)).unwrap();
	}

	scheduler::run();

	assert!(a_acquired.get());
	assert!(b_acquired.get());
	assert_eq!(sem.available(), 0);
}
