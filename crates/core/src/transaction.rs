use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::{AccountId, OperationTypeId, TransactionId};
use crate::operation::classify;

/// A persisted, signed ledger entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "transaction_id")]
    pub id: TransactionId,
    pub account_id: AccountId,
    pub operation_type_id: OperationTypeId,
    pub amount: f64,
    pub event_date: DateTime<Utc>,
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A validated, sign-normalised transaction that has not been stored yet.
///
/// `event_date: None` leaves the timestamp to the backend, which stamps the
/// current UTC time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub account_id: AccountId,
    pub operation_type_id: OperationTypeId,
    pub amount: f64,
    pub event_date: Option<DateTime<Utc>>,
}

impl NewTransaction {
    /// Attach the storage-assigned id, defaulting the event date to `now`.
    pub fn into_stored(self, id: TransactionId, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            account_id: self.account_id,
            operation_type_id: self.operation_type_id,
            amount: self.amount,
            event_date: self.event_date.unwrap_or(now),
        }
    }
}

/// `0001-01-01T00:00:00Z` as seconds from the Unix epoch. Callers send this
/// zero instant to mean "no event time".
const ZERO_INSTANT_SECS: i64 = -62_135_596_800;

/// Convert a caller-supplied event time to UTC.
///
/// An absent time and the zero instant both yield `None`, which leaves the
/// backend to stamp the current time.
pub fn normalize_event_time<Tz: TimeZone>(time: Option<DateTime<Tz>>) -> Option<DateTime<Utc>> {
    time.map(|t| t.with_timezone(&Utc))
        .filter(|t| !(t.timestamp() == ZERO_INSTANT_SECS && t.timestamp_subsec_nanos() == 0))
}

/// Compute the stored amount for an operation.
///
/// The caller's sign is discarded: the magnitude must be a finite number
/// above zero, and the sign comes from the operation's classification.
pub fn signed_amount(operation: OperationTypeId, raw: f64) -> DomainResult<f64> {
    let magnitude = raw.abs();
    if !magnitude.is_finite() || magnitude <= 0.0 {
        return Err(DomainError::InvalidAmount);
    }

    let kind = classify(operation).ok_or(DomainError::InvalidOperationType(operation))?;
    Ok(kind.apply(magnitude))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn op(id: i32) -> OperationTypeId {
        OperationTypeId::new(id)
    }

    #[test]
    fn zero_amount_is_rejected_for_every_operation() {
        for id in 1..=4 {
            assert_eq!(signed_amount(op(id), 0.0), Err(DomainError::InvalidAmount));
            assert_eq!(signed_amount(op(id), -0.0), Err(DomainError::InvalidAmount));
        }
    }

    #[test]
    fn non_finite_amounts_are_rejected() {
        assert_eq!(signed_amount(op(1), f64::NAN), Err(DomainError::InvalidAmount));
        assert_eq!(signed_amount(op(4), f64::INFINITY), Err(DomainError::InvalidAmount));
    }

    #[test]
    fn unclassified_operation_is_rejected_after_amount_check() {
        assert_eq!(
            signed_amount(op(5), 10.0),
            Err(DomainError::InvalidOperationType(op(5)))
        );
        // amount is validated first
        assert_eq!(signed_amount(op(5), 0.0), Err(DomainError::InvalidAmount));
    }

    #[test]
    fn missing_event_date_defaults_to_now() {
        let now = Utc::now();
        let stored = NewTransaction {
            account_id: AccountId::new(1),
            operation_type_id: op(1),
            amount: -1.0,
            event_date: None,
        }
        .into_stored(TransactionId::new(7), now);
        assert_eq!(stored.id, TransactionId::new(7));
        assert_eq!(stored.event_date, now);
    }

    #[test]
    fn zero_instant_counts_as_unset() {
        let zero = DateTime::parse_from_rfc3339("0001-01-01T00:00:00Z").unwrap();
        assert_eq!(normalize_event_time(Some(zero)), None);

        // same instant written with an offset
        let shifted = DateTime::parse_from_rfc3339("0001-01-01T02:00:00+02:00").unwrap();
        assert_eq!(normalize_event_time(Some(shifted)), None);

        assert_eq!(normalize_event_time::<Utc>(None), None);
    }

    #[test]
    fn other_instants_are_converted_to_utc() {
        let just_after = DateTime::parse_from_rfc3339("0001-01-01T00:00:00.000000001Z").unwrap();
        assert!(normalize_event_time(Some(just_after)).is_some());

        let epoch = DateTime::parse_from_rfc3339("1970-01-01T00:00:00Z").unwrap();
        assert_eq!(
            normalize_event_time(Some(epoch)),
            Some(Utc.timestamp_opt(0, 0).unwrap())
        );

        let local = DateTime::parse_from_rfc3339("2024-05-10T15:00:00+03:00").unwrap();
        assert_eq!(
            normalize_event_time(Some(local)),
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap())
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Debit operations always store -|m| whatever sign the caller sent.
        #[test]
        fn debit_operations_store_negative_magnitude(
            id in 1i32..=3,
            m in prop_oneof![0.01f64..1.0e9, -1.0e9f64..-0.01],
        ) {
            let stored = signed_amount(op(id), m).unwrap();
            prop_assert_eq!(stored, -m.abs());
        }

        /// Credit operations always store +|m| whatever sign the caller sent.
        #[test]
        fn credit_operations_store_positive_magnitude(
            m in prop_oneof![0.01f64..1.0e9, -1.0e9f64..-0.01],
        ) {
            let stored = signed_amount(op(4), m).unwrap();
            prop_assert_eq!(stored, m.abs());
        }
    }
}
