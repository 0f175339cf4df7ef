//! WASM module: browser client over the injected wallet
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          BlogClient (JS API)            │
//! │  connect, silentReconnect, publishBlog  │
//! │  purchaseBlog, addComment, vote...      │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │     WalletSession + BlogContract        │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │  InjectedCapability (window.ethereum)   │
//! └─────────────────────────────────────────┘
//! ```

mod client;
mod injected;

pub use client::BlogClient;
pub use injected::InjectedCapability;

use wasm_bindgen::prelude::*;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;
