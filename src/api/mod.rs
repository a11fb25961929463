//! HTTP API
//!
//! JSON marshalling between the configuration store / sensor cache and the
//! HTTP surface. Handlers are plain functions over the store so they run in
//! host tests without a network stack; the socket loop lives behind the
//! `pico2_w` feature.

pub mod handlers;
pub mod json;

#[cfg(feature = "pico2_w")]
pub mod http;

pub use handlers::{
    handle_patch_device_info, handle_post_ap_config, render_device_info, render_network_status,
    render_root, ApiError,
};
