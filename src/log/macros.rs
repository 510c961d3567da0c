#[macro_export]
macro_rules! log {
	($level: expr, target: $target: expr, $($arg: tt)+) => {
		if $crate::opt::hint::unlikely(::log::log_enabled!($level)) {
			::log::log!(target: $target, $level, $($arg)+);
		}
	};

	($level: expr, $($arg: tt)+) => {
		$crate::log!($level, target: module_path!(), $($arg)+)
	};
}

pub use log;

#[macro_export]
macro_rules! error {
	($($arg: tt)+) => {
		$crate::log!($crate::log::Level::Error, $($arg)+)
	}
}

pub use error;

#[macro_export]
macro_rules! warn {
	($($arg: tt)+) => {
		$crate::log!($crate::log::Level::Warn, $($arg)+)
	}
}

pub use warn;

#[macro_export]
macro_rules! info {
	($($arg: tt)+) => {
		$crate::log!($crate::log::Level::Info, $($arg)+)
	}
}

pub use info;

#[macro_export]
macro_rules! debug {
	($($arg: tt)+) => {
		$crate::log!($crate::log::Level::Debug, $($arg)+)
	}
}

pub use debug;

#[macro_export]
macro_rules! trace {
	($($arg: tt)+) => {
		$crate::log!($crate::log::Level::Trace, $($arg)+)
	}
}

pub use trace;
