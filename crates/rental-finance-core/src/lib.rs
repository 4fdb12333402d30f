pub mod error;
pub mod property;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "forecast")]
pub mod forecast;

pub use error::RentalFinanceError;
pub use types::*;

/// Standard result type for all rental-finance operations
pub type RentalResult<T> = Result<T, RentalFinanceError>;
