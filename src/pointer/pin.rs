/// Marks a type that must not move once it has started linking itself to
/// other objects by raw pointer (our intrusive list nodes, chiefly).
///
/// Every container we build on top of this lives behind a `Box`, a `'static`,
/// or a `thread_local!`, so the address is already stable before `pin` is
/// ever called; the method exists to give self-linking a well defined place
/// to run rather than to police callers the way `std::pin` does.
///
/// # Safety
/// Implementors must not be moved after `pin` has been called.
pub trait Pin {
	/// # Safety
	/// Must not be called more than once, and the value must not move after.
	unsafe fn pin(&mut self) {}
}
