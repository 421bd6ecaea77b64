//! Platform-aware primitives shared by the sitar crates.
//!
//! # Synchronization
//!
//! On native targets the [`parking_lot`] mutex is re-exported as is.
//!
//! On `wasm32` a thin wrapper replaces the blocking `lock()` with a
//! `try_lock()` spin, because `Atomics.wait()` panics on the browser main
//! thread.
//!
//! # Conditional trait bounds
//!
//! [`MaybeSend`] equals `Send` on native targets and is blanket-implemented
//! for every type on `wasm32`. Frame sources use it so one trait definition
//! serves both targets.

#![forbid(unsafe_code)]

mod maybe_send;

pub use maybe_send::MaybeSend;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    pub use parking_lot::{Mutex, MutexGuard};
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::*;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn mutex_serializes_writers() {
        let counter = Arc::new(Mutex::new(0u64));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        *counter.lock() += 1;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*counter.lock(), 4000);
    }

    #[test]
    fn maybe_send_is_send_on_native() {
        fn assert_send<T: Send>() {}
        fn assert_maybe_send<T: MaybeSend>() {
            assert_send::<T>();
        }
        assert_maybe_send::<Vec<u8>>();
    }
}
