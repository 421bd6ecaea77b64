//! Conditional `Send` bound for wasm32 builds.
//!
//! Native: `MaybeSend` = `Send`.
//! wasm32: implemented for every type.
//!
//! Only usable as trait bounds. `dyn Trait + MaybeSend` is not allowed, since
//! only auto traits may follow `dyn Trait +`.

#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}
