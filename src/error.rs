//! Errors raised while deriving features and pricing lots.
use thiserror::Error;

/// Result type alias for pricing operations
pub type PricingResult<T> = std::result::Result<T, PricingError>;

/// The ways in which turning raw records into prices can fail
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// A record whose numeric fields cannot produce an occupancy ratio
    #[error("Invalid record for lot {lot_id}: {reason}")]
    InvalidRecord {
        /// The lot the record belongs to
        lot_id: String,
        /// What is wrong with the record
        reason: String,
    },

    /// A categorical value which has no entry in the relevant mapping
    #[error("Unknown {field} '{value}'")]
    UnknownCategory {
        /// The name of the categorical field
        field: &'static str,
        /// The value found in the input
        value: String,
    },

    /// A date and time which could not be parsed
    #[error("Malformed timestamp '{value}' (expected format DD-MM-YYYY HH:MM:SS)")]
    MalformedTimestamp {
        /// The combined date and time string
        value: String,
    },

    /// A lot series with no observations
    #[error("Lot series contains no observations")]
    EmptyLotSeries,
}
