//! Canonical ABO/Rh blood-type codes.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One of the 8 canonical ABO/Rh groups.
///
/// Serialized as its code string (`"A+"`, `"AB-"`, ...), which is also the
/// value stored in the `blood_type` column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    /// All blood types, in the conventional display order.
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    pub fn code(self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }

    /// Compare by code string, matching `ORDER BY blood_type` in the store.
    pub fn cmp_code(&self, other: &Self) -> core::cmp::Ordering {
        self.code().cmp(other.code())
    }
}

impl core::fmt::Display for BloodType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BloodType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        BloodType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| DomainError::validation(format!("unknown blood type '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_round_trips_through_from_str() {
        for t in BloodType::ALL {
            assert_eq!(t.code().parse::<BloodType>().unwrap(), t);
        }
    }

    #[test]
    fn parsing_is_case_and_whitespace_tolerant() {
        assert_eq!(" ab- ".parse::<BloodType>().unwrap(), BloodType::AbNegative);
        assert_eq!("o+".parse::<BloodType>().unwrap(), BloodType::OPositive);
    }

    #[test]
    fn unknown_codes_are_rejected() {
        for bad in ["", "C+", "A", "AB", "O*", "A++"] {
            assert!(matches!(bad.parse::<BloodType>(), Err(DomainError::Validation(_))), "{bad}");
        }
    }

    #[test]
    fn code_order_is_lexicographic() {
        let mut types = BloodType::ALL.to_vec();
        types.sort_by(BloodType::cmp_code);
        let codes: Vec<_> = types.iter().map(|t| t.code()).collect();
        assert_eq!(codes, vec!["A+", "A-", "AB+", "AB-", "B+", "B-", "O+", "O-"]);
    }

    #[test]
    fn serde_uses_codes() {
        assert_eq!(serde_json::to_string(&BloodType::AbPositive).unwrap(), "\"AB+\"");
        let t: BloodType = serde_json::from_str("\"O-\"").unwrap();
        assert_eq!(t, BloodType::ONegative);
        assert!(serde_json::from_str::<BloodType>("\"Z+\"").is_err());
    }
}
