use super::*;
use crate::cell::UnsafeCell;

pub trait AsPointer {
	type Target;

	fn as_pointer(&self) -> Self::Target;
}

impl<T: ?Sized> AsPointer for Ptr<T> {
	type Target = *const T;

	fn as_pointer(&self) -> *const T {
		self.ptr
	}
}

impl<T: ?Sized> AsPointer for MutPtr<T> {
	type Target = *mut T;

	fn as_pointer(&self) -> *mut T {
		self.ptr()
	}
}

impl<T: ?Sized> AsPointer for UnsafeCell<T> {
	type Target = *mut T;

	fn as_pointer(&self) -> *mut T {
		self.get().as_pointer()
	}
}
