pub mod bond;
pub mod error;
pub mod types;

#[cfg(feature = "credit")]
pub mod credit;

#[cfg(feature = "market")]
pub mod market;

pub use error::BondSimError;
pub use types::*;

/// Standard result type for all bond-sim operations
pub type BondSimResult<T> = Result<T, BondSimError>;
