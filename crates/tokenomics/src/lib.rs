//! Tokenomics — Epoch Mint Provision & Claims Decay
//!
//! Pure, deterministic token-economics logic consumed by every validating
//! node during block execution:
//! - exponential per-period issuance split evenly across epochs
//! - three-phase airdrop decay (full value → linear decay → expired)
//! - parameter and genesis validation, single-field governance updates
//!
//! Every fractional quantity is a fixed-point [`rust_decimal::Decimal`]
//! quantized to 18 places. No function here reads the wall clock; time is
//! always supplied by the caller from the block header.

pub mod claims;
pub mod decay;
pub mod denom;
pub mod distribution;
pub mod emission;
pub mod errors;
pub mod genesis;
pub mod governance;
pub mod inflation;
pub mod store;
pub mod types;

pub use claims::*;
pub use decay::*;
pub use denom::*;
pub use distribution::*;
pub use emission::*;
pub use errors::*;
pub use genesis::*;
pub use governance::*;
pub use inflation::*;
pub use store::*;
pub use types::*;

/// Module version for API introspection
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
