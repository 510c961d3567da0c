use std::arch::{asm, global_asm};

use super::stack::Stack;
use crate::pointer::*;

/// Everything a suspended x86-64 fiber needs to resume: the stack pointer
/// at the moment it called `switch`. The callee-saved registers
/// (`rbp`, `rbx`, `r12..r15`) live on the stack itself, pushed by
/// `xx_fiber_x64_switch` just below the return address.
#[repr(C)]
#[derive(Default)]
pub(super) struct Context {
	sp: usize
}

global_asm!(include_str!("x64.s"));

extern "C" {
	fn xx_fiber_x64_switch(from: *mut Context, to: *mut Context);
	fn xx_fiber_x64_exit(
		to: *mut Context, arg: *mut (), cleanup: unsafe extern "C" fn(*mut ())
	);
}

/// Number of callee-saved 8-byte slots a suspended context occupies on its
/// own stack, below the return address: rbp, rbx, r12, r13, r14, r15.
const SAVED_REGS: usize = 6;

impl Context {
	/// Synthesize the initial frame a never-run fiber resumes into:
	/// popping `SAVED_REGS` (all zero, don't-cares) and then `ret`'ing
	/// lands on `trampoline`.
	pub(super) fn set_start(&mut self, stack: &Stack, trampoline: unsafe extern "C" fn() -> !) {
		let top = stack.top();
		let frame = MutPtr::<usize>::from_addr(top);

		/* Safety: `frame` addresses the top of the stack just allocated;
		 * the writes below stay within it (SAVED_REGS + the terminator
		 * and return-address words are a small fraction of a 64 KiB
		 * default stack) */
		unsafe {
			frame.sub(1).write(0); // debugger frame-walk terminator
			frame.sub(2).write(trampoline as usize); // return address
			frame.sub(3).write(0); // rbp
			frame.sub(4).write(0); // rbx
			frame.sub(5).write(0); // r12
			frame.sub(6).write(0); // r13
			frame.sub(7).write(0); // r14
			frame.sub(8).write(0); // r15
		}

		self.sp = frame.sub(2 + SAVED_REGS).addr();
	}
}

/// # Safety
/// `from` must be the context of the fiber currently running on this OS
/// thread; `to` must be a context previously saved by this function or
/// set up by [`Context::set_start`].
#[inline(always)]
pub(super) unsafe fn switch(from: &mut Context, to: &mut Context) {
	/* Safety: guaranteed by caller */
	unsafe {
		asm!(
			"call {}",
			sym xx_fiber_x64_switch,
			in("rdi") from as *mut Context,
			in("rsi") to as *mut Context,
			lateout("rbp") _,
			lateout("rbx") _,
			lateout("r12") _,
			lateout("r13") _,
			lateout("r14") _,
			lateout("r15") _,
			clobber_abi("C")
		);
	}
}

/// Switches to `to` and, once its stack is current, calls
/// `cleanup(arg)` there. Never returns to the caller.
///
/// # Safety
/// Same as [`switch`]; additionally `cleanup` must not panic.
#[inline(always)]
pub(super) unsafe fn exit_switch(
	to: &mut Context, cleanup: unsafe extern "C" fn(*mut ()), arg: Ptr<()>
) -> ! {
	/* Safety: guaranteed by caller */
	unsafe {
		asm!(
			"call {}",
			sym xx_fiber_x64_exit,
			in("rdi") to as *mut Context,
			in("rsi") arg.cast_mut().as_mut_ptr(),
			in("rdx") cleanup as usize,
			lateout("rbp") _,
			lateout("rbx") _,
			lateout("r12") _,
			lateout("r13") _,
			lateout("r14") _,
			lateout("r15") _,
			clobber_abi("C"),
			options(noreturn)
		);
	}
}
