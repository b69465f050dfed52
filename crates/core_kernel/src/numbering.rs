//! Human-readable document numbers
//!
//! Bilty, voucher, and trip numbers are the identifiers printed on the
//! paperwork that travels with the freight, so their formats are fixed:
//!
//! - Bilty:   `BLT-YYYYMMDD-N` with `N` the per-day serial
//! - Voucher: `VCH-YYYY-MMDD-RRR` with a random zero-padded 3-digit suffix
//! - Trip:    `TRIP-` followed by a random alphanumeric token
//!
//! Serials come from a [`crate::ports::SerialSequence`] so concurrent
//! creation never derives the next number by parsing the previous record.

use chrono::{Datelike, NaiveDate};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when parsing a document number
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberError {
    #[error("Invalid bilty number: {0}")]
    InvalidBilty(String),

    #[error("Invalid voucher number: {0}")]
    InvalidVoucher(String),

    #[error("Invalid trip number: {0}")]
    InvalidTrip(String),
}

/// A bilty (shipment) number: `BLT-YYYYMMDD-N`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BiltyNumber(String);

impl BiltyNumber {
    /// Builds the number for a given issue date and per-day serial
    pub fn from_parts(date: NaiveDate, serial: u64) -> Self {
        Self(format!(
            "BLT-{:04}{:02}{:02}-{}",
            date.year(),
            date.month(),
            date.day(),
            serial
        ))
    }

    /// Returns the per-day sequence scope for an issue date (`bilty:YYYYMMDD`)
    pub fn day_scope(date: NaiveDate) -> String {
        format!(
            "bilty:{:04}{:02}{:02}",
            date.year(),
            date.month(),
            date.day()
        )
    }

    /// Returns the issue date and serial encoded in this number
    pub fn parts(&self) -> Result<(NaiveDate, u64), NumberError> {
        let invalid = || NumberError::InvalidBilty(self.0.clone());
        let rest = self.0.strip_prefix("BLT-").ok_or_else(invalid)?;
        let (datepart, serial) = rest.split_once('-').ok_or_else(invalid)?;
        if datepart.len() != 8 {
            return Err(invalid());
        }
        let year: i32 = datepart[0..4].parse().map_err(|_| invalid())?;
        let month: u32 = datepart[4..6].parse().map_err(|_| invalid())?;
        let day: u32 = datepart[6..8].parse().map_err(|_| invalid())?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        let serial: u64 = serial.parse().map_err(|_| invalid())?;
        Ok((date, serial))
    }

    /// Returns the number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BiltyNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BiltyNumber {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let candidate = Self(s.to_string());
        candidate.parts()?;
        Ok(candidate)
    }
}

/// A voucher (consolidated invoice) number: `VCH-YYYY-MMDD-RRR`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoucherNumber(String);

impl VoucherNumber {
    /// Generates a number for the given date with a random 3-digit suffix
    ///
    /// Uniqueness is NOT guaranteed here; callers must check the store and
    /// reject on collision.
    pub fn generate(date: NaiveDate) -> Self {
        let suffix: u16 = rand::thread_rng().gen_range(0..1000);
        Self(format!(
            "VCH-{:04}-{:02}{:02}-{:03}",
            date.year(),
            date.month(),
            date.day(),
            suffix
        ))
    }

    /// Validates and wraps a caller-supplied voucher number
    pub fn parse(s: &str) -> Result<Self, NumberError> {
        s.parse()
    }

    /// Returns the number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoucherNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VoucherNumber {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NumberError::InvalidVoucher(s.to_string());
        let rest = s.strip_prefix("VCH-").ok_or_else(invalid)?;
        let mut segments = rest.split('-');
        let year = segments.next().ok_or_else(invalid)?;
        let monthday = segments.next().ok_or_else(invalid)?;
        let suffix = segments.next().ok_or_else(invalid)?;
        if segments.next().is_some() {
            return Err(invalid());
        }
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if monthday.len() != 4 || !monthday.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if suffix.len() != 3 || !suffix.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        Ok(Self(s.to_string()))
    }
}

/// A trip number: `TRIP-` plus a random alphanumeric token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripNumber(String);

const TRIP_TOKEN_LEN: usize = 8;

impl TripNumber {
    /// Generates a fresh trip number
    pub fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TRIP_TOKEN_LEN)
            .map(|b| (b as char).to_ascii_uppercase())
            .collect();
        Self(format!("TRIP-{}", token))
    }

    /// Returns the number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TripNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TripNumber {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("TRIP-")
            .ok_or_else(|| NumberError::InvalidTrip(s.to_string()))?;
        if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(NumberError::InvalidTrip(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bilty_number_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let number = BiltyNumber::from_parts(date, 12);
        assert_eq!(number.as_str(), "BLT-20240307-12");
        assert_eq!(number.parts().unwrap(), (date, 12));
    }

    #[test]
    fn test_bilty_day_scope() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(BiltyNumber::day_scope(date), "bilty:20240307");
    }

    #[test]
    fn test_bilty_number_rejects_garbage() {
        assert!("BLT-garbage-1".parse::<BiltyNumber>().is_err());
        assert!("VCH-20240307-1".parse::<BiltyNumber>().is_err());
        assert!("BLT-20241399-1".parse::<BiltyNumber>().is_err());
    }

    #[test]
    fn test_voucher_number_generate() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let number = VoucherNumber::generate(date);
        assert!(number.as_str().starts_with("VCH-2024-0307-"));
        assert!(number.as_str().parse::<VoucherNumber>().is_ok());
    }

    #[test]
    fn test_voucher_number_parse() {
        assert!("VCH-2024-0307-007".parse::<VoucherNumber>().is_ok());
        assert!("VCH-2024-0307-7".parse::<VoucherNumber>().is_err());
        assert!("VCH-24-0307-007".parse::<VoucherNumber>().is_err());
        assert!("BLT-2024-0307-007".parse::<VoucherNumber>().is_err());
    }

    #[test]
    fn test_trip_number_generate() {
        let number = TripNumber::generate();
        assert!(number.as_str().starts_with("TRIP-"));
        assert_eq!(number.as_str().len(), "TRIP-".len() + TRIP_TOKEN_LEN);
        assert!(number.as_str().parse::<TripNumber>().is_ok());
    }
}
