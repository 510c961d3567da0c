//! Four producers and two consumers share a queue guarded by a mutex and
//! metered by a semaphore. Every posted message is consumed exactly
//! once, plus one sentinel per consumer to signal shutdown.
//!
//! The two sentinel message boxes are intentionally never freed: the
//! demo this scenario is modeled on leaks them deliberately rather than
//! inventing shutdown bookkeeping the runtime has no other use for.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use filament::scheduler;
use filament::sync::{Mutex, Semaphore};

const PRODUCERS: usize = 4;
const CONSUMERS: usize = 2;
const PER_PRODUCER: usize = 5000;

enum Message {
	Value(u32),
	Sentinel
}

struct Mailbox {
	queue: Mutex<VecDeque<Message>>,
	permits: Semaphore
}

#[test]
fn every_message_consumed_exactly_once() {
	let mailbox = Rc::new(Mailbox {
		queue: Mutex::new(VecDeque::new()),
		permits: Semaphore::new(0, PRODUCERS * PER_PRODUCER + CONSUMERS)
	});

	for _ in 0..PRODUCERS {
		let mailbox = Rc::clone(&mailbox);

		scheduler::create(move || {
			for value in 0..PER_PRODUCER as u32 {
				mailbox.queue.lock().push_back(Message::Value(value));
				mailbox.permits.release(1);
			}
		})
		.unwrap();
	}

	let values_consumed = Rc::new(RefCell::new(vec![0usize; CONSUMERS]));
	let sentinels_consumed = Rc::new(std::cell::Cell::new(0u32));

	for consumer in 0..CONSUMERS {
		let mailbox = Rc::clone(&mailbox);
		let values_consumed = Rc::clone(&values_consumed);
		let sentinels_consumed = Rc::clone(&sentinels_consumed);

		scheduler::create(move || loop {
			mailbox.permits.acquire(1);

			let message = mailbox
				.queue
				.lock()
				.pop_front()
				.expect("permit granted without a matching message");

			match message {
				Message::Value(_) => values_consumed.borrow_mut()[consumer] += 1,
				Message::Sentinel => {
					sentinels_consumed.set(sentinels_consumed.get() + 1);
					break;
				}
			}
		})
		.unwrap();
	}

	/* posts after the producers so the sentinels are always last in
	 * permit order; the driver fiber does not need to wait for producers
	 * to finish since the semaphore serializes consumption anyway */
	for _ in 0..CONSUMERS {
		let mailbox = Rc::clone(&mailbox);

		scheduler::create(move || {
			mailbox.queue.lock().push_back(Message::Sentinel);
			mailbox.permits.release(1);
		})
		.unwrap();
	}

	scheduler::run();

	let total_values: usize = values_consumed.borrow().iter().sum();

	assert_eq!(total_values, PRODUCERS * PER_PRODUCER);
	assert_eq!(sentinels_consumed.get(), CONSUMERS as u32);
	assert!(mailbox.queue.lock().is_empty());
}
