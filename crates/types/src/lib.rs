//! Core types for shardline consensus.
//!
//! This crate provides the foundational types used throughout the consensus
//! implementation:
//!
//! - **Primitives**: `Hash`, cryptographic keys and signatures
//! - **Identifiers**: `ShardId`, `ChainId`, `RoundIndex`
//! - **Chain types**: `BlockHeader`, `BlockBody`, the chain-tip seam
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend
//! on any other workspace crates, making it the foundation layer.

mod block;
mod chain;
mod crypto;
mod hash;
mod identifiers;

pub use block::{BlockBody, BlockHeader, MiniBlock};
pub use chain::{Blockchain, InMemoryBlockchain};
pub use crypto::{KeyPair, PublicKey, Signature};
pub use hash::Hash;
pub use identifiers::{ChainId, RoundIndex, ShardId};
