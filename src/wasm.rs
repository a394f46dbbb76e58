//! WebAssembly support. A bare Rust panic in WASM just calls `abort`; installing the hook
//! routes the panic message to the browser console where it can actually be read.

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}
