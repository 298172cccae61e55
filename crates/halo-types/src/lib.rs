//! # halo-types
//!
//! Core data model for the Halo chain family.
//!
//! This crate provides:
//! - Block headers with RLP encoding and Keccak-256 hashing
//! - Block bodies (transactions + uncle headers)
//! - Chain configuration with centralized chain-profile dispatch
//! - Halo network genesis parameters
//!
//! The consensus rules that operate on these types live in `halo-consensus`.

pub mod block;
pub mod config;
pub mod genesis;
pub mod header;

pub use block::{Block, Transaction, Withdrawal};
pub use config::{ChainConfig, ChainProfile, ConfigError, HALO_CHAIN_ID};
pub use genesis::{halo_genesis, Genesis};
pub use header::{Header, EMPTY_OMMERS_HASH};
