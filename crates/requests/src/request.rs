use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use bloodbank_core::{BloodType, DomainError, RequestId, Row, StoreError};

/// Whether a submission offers blood or asks for it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Donate,
    Receive,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Donate => "donate",
            RequestKind::Receive => "receive",
        }
    }
}

impl core::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "donate" => Ok(RequestKind::Donate),
            "receive" => Ok(RequestKind::Receive),
            other => Err(DomainError::validation(format!("unknown request kind '{other}'"))),
        }
    }
}

/// Lifecycle status of a request.
///
/// `pending → approved → completed`, and `pending | approved → cancelled`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Approved, Completed) | (Pending, Cancelled) | (Approved, Cancelled)
        )
    }
}

impl core::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission as supplied by the caller.
///
/// Identity, status and creation time are not part of the input; any such
/// keys in a JSON payload are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDonationRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub blood_type: BloodType,
    pub address: String,
    pub preferred_date: NaiveDate,
    pub request_type: RequestKind,
}

/// A persisted donation/receive request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRequest {
    pub id: RequestId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub blood_type: BloodType,
    pub address: String,
    pub preferred_date: NaiveDate,
    pub request_type: RequestKind,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl DonationRequest {
    /// A freshly persisted request: always `pending`.
    pub fn pending(id: RequestId, input: NewDonationRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            blood_type: input.blood_type,
            address: input.address,
            preferred_date: input.preferred_date,
            request_type: input.request_type,
            status: RequestStatus::Pending,
            created_at,
        }
    }

    /// Decode a `donation_requests` row.
    pub fn from_row(row: Row) -> Result<Self, StoreError> {
        serde_json::from_value(serde_json::Value::Object(row))
            .map_err(|e| StoreError::decode(format!("donation_requests row: {e}")))
    }

    /// The caller-supplied part of the request.
    pub fn submission(&self) -> NewDonationRequest {
        NewDonationRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            blood_type: self.blood_type,
            address: self.address.clone(),
            preferred_date: self.preferred_date,
            request_type: self.request_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn lifecycle_transitions() {
        use RequestStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Pending));
        assert!(Completed.is_terminal() && Cancelled.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn kind_parses() {
        assert_eq!("Donate".parse::<RequestKind>().unwrap(), RequestKind::Donate);
        assert_eq!(" receive".parse::<RequestKind>().unwrap(), RequestKind::Receive);
        assert!("give".parse::<RequestKind>().is_err());
    }

    #[test]
    fn new_request_ignores_server_assigned_keys() {
        let input: NewDonationRequest = serde_json::from_value(json!({
            "id": 99,
            "name": "Ada",
            "email": "ada@example.com",
            "phone": "555-0100",
            "blood_type": "O-",
            "address": "1 Main St",
            "preferred_date": "2026-11-01",
            "request_type": "donate",
            "status": "approved",
            "created_at": "2001-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(input.blood_type, BloodType::ONegative);
        let v = serde_json::to_value(&input).unwrap();
        assert!(v.get("status").is_none());
        assert!(v.get("created_at").is_none());
        assert!(v.get("id").is_none());
    }

    #[test]
    fn row_decoding_accepts_offset_timestamps() {
        let row = match json!({
            "id": 5,
            "name": "Bo",
            "email": "bo@example.com",
            "phone": "1",
            "blood_type": "AB+",
            "address": "x",
            "preferred_date": "2026-11-02",
            "request_type": "receive",
            "status": "pending",
            "created_at": "2026-10-18T09:30:00.123456+02:00"
        }) {
            serde_json::Value::Object(m) => m,
            _ => unreachable!(),
        };

        let r = DonationRequest::from_row(row).unwrap();
        assert_eq!(r.id, RequestId::new(5));
        assert_eq!(r.request_type, RequestKind::Receive);
        assert_eq!(r.created_at.to_rfc3339(), "2026-10-18T07:30:00.123456+00:00");
    }
}
