#![forbid(unsafe_code)]

//! Borrow guard for browser callbacks.
//!
//! Listeners, observer callbacks, animation frames and timeouts all reach the
//! mounted page through one `RefCell`. A callback that fires while another
//! still holds it is dropped with a warning instead of panicking across the
//! wasm boundary.

use std::cell::{RefCell, RefMut};

use tracing::warn;

/// Mutably borrow `cell`, or log and return `None` when it is already borrowed.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub fn borrow_or_drop<'a, T>(cell: &'a RefCell<T>, what: &str) -> Option<RefMut<'a, T>> {
    match cell.try_borrow_mut() {
        Ok(guard) => Some(guard),
        Err(_) => {
            warn!(callback = what, "re-entrant host callback dropped");
            None
        }
    }
}
