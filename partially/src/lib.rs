#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

macro_rules! trace {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        {
            log::trace!($($tt)*);
        }
    };
}

mod error;
pub use error::*;

mod field;
pub use field::*;

mod cell;

mod partial;
pub use partial::*;

mod convertible;
pub use convertible::*;

mod subscription;
pub use subscription::*;

mod builder;
pub use builder::*;

mod built;
pub use built::*;

mod keyed;
pub use keyed::*;
