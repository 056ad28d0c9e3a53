//! Operation types and their debit/credit classification.
//!
//! [`KnownOperation`] is the one table both the existence check (seeding) and
//! the sign classification are derived from, so an id that is seeded always
//! classifies and an id that classifies is always seeded.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::OperationTypeId;

/// Whether an operation's amount is stored negative (debit) or positive (credit).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Debit,
    Credit,
}

impl OperationKind {
    /// Apply this kind's sign to a non-negative magnitude.
    pub fn apply(self, magnitude: f64) -> f64 {
        match self {
            OperationKind::Debit => -magnitude,
            OperationKind::Credit => magnitude,
        }
    }
}

/// The closed set of operation types recognised by the ledger.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KnownOperation {
    CashPurchase,
    InstallmentPurchase,
    Withdrawal,
    Payment,
}

impl KnownOperation {
    pub const ALL: [KnownOperation; 4] = [
        KnownOperation::CashPurchase,
        KnownOperation::InstallmentPurchase,
        KnownOperation::Withdrawal,
        KnownOperation::Payment,
    ];

    pub const fn id(self) -> OperationTypeId {
        OperationTypeId::new(match self {
            KnownOperation::CashPurchase => 1,
            KnownOperation::InstallmentPurchase => 2,
            KnownOperation::Withdrawal => 3,
            KnownOperation::Payment => 4,
        })
    }

    pub const fn description(self) -> &'static str {
        match self {
            KnownOperation::CashPurchase => "CASH PURCHASE",
            KnownOperation::InstallmentPurchase => "INSTALLMENT PURCHASE",
            KnownOperation::Withdrawal => "WITHDRAWAL",
            KnownOperation::Payment => "PAYMENT",
        }
    }

    pub const fn kind(self) -> OperationKind {
        match self {
            KnownOperation::Payment => OperationKind::Credit,
            _ => OperationKind::Debit,
        }
    }

    pub fn from_id(id: OperationTypeId) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.id() == id)
    }
}

/// Classify an operation type id. `None` means unclassified (must be rejected).
pub fn classify(id: OperationTypeId) -> Option<OperationKind> {
    KnownOperation::from_id(id).map(KnownOperation::kind)
}

pub fn is_debit_operation(id: OperationTypeId) -> bool {
    classify(id) == Some(OperationKind::Debit)
}

pub fn is_credit_operation(id: OperationTypeId) -> bool {
    classify(id) == Some(OperationKind::Credit)
}

/// A seeded operation type row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationType {
    pub id: OperationTypeId,
    pub description: String,
}

impl OperationType {
    /// The rows every backend seeds at construction.
    pub fn canonical() -> impl Iterator<Item = OperationType> {
        KnownOperation::ALL.into_iter().map(OperationType::from)
    }
}

impl From<KnownOperation> for OperationType {
    fn from(op: KnownOperation) -> Self {
        Self {
            id: op.id(),
            description: op.description().to_string(),
        }
    }
}

impl Entity for OperationType {
    type Id = OperationTypeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
