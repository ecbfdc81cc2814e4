//! # otpd-client
//!
//! Client library for otpd.
//!
//! This crate provides:
//! - Local input loading and validation (before any network activity)
//! - An async TCP connection driving exactly one decrypt exchange
//! - Detection of the server's rejection sentinel

pub mod connection;
pub mod error;
pub mod input;

pub use connection::{ClientConfig, Connection};
pub use error::ClientError;
pub use input::PadInput;
