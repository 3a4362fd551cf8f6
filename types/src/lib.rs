//! Fundamental types for the AEGIS shield.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, identifiers, timestamps, fixed-point decimals, and shield parameters.

pub mod address;
pub mod dec;
pub mod id;
pub mod params;
pub mod time;

pub use address::Address;
pub use dec::{mul_div_floor, Dec, DEC_SCALE};
pub use id::{PoolId, ProposalId};
pub use params::{bps_amount, ShieldParams, BPS_DENOM};
pub use time::Timestamp;
