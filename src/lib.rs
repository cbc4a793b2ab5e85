//! Pure Rust library for interacting with the [udev](https://www.kernel.org/doc/ols/2003/ols2003-pages-249-257.pdf) userspace `devfs`.
//!
//! Uses the [`libc`](https://crates.io/crates/libc) and [`nix`](https://crates.io/crates/nix) crate to make syscalls to Linux.

#[macro_use]
extern crate bitflags;

mod context;
mod device;
mod enumerate;
mod error;
mod evdev;
mod file;
mod hash_list;
mod hwdb;
mod list;
mod log;
mod mode;
mod monitor;
mod murmur_hash;
mod socket;
mod util;

pub use context::*;
pub use device::*;
pub use enumerate::*;
pub use error::*;
pub use file::*;
pub use hash_list::*;
pub use hwdb::*;
pub use list::*;
pub use log::*;
pub use mode::*;
pub use monitor::*;
pub use murmur_hash::*;
pub use socket::*;
pub use util::*;
