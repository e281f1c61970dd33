//! Inbound surfaces. The CLI lives in `main.rs`; everything HTTP is here.

pub mod http;
