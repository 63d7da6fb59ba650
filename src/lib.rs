//! Headless engine for the Aboki token→fiat off-ramp.
//!
//! Wraps the remote Aboki REST API and the on-chain gateway contract
//! behind one orchestrated flow: estimate the stable-asset output, gate on
//! a verified bank destination, approve and submit the swap, then poll the
//! fiat settlement to a terminal state.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod onchain;
pub mod services;
pub mod storage;
pub mod tokens;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
