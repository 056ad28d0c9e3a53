use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::AccountId;

/// A monetary account identified by its holder's document number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "account_id")]
    pub id: AccountId,
    pub document_number: String,
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Trim a caller-supplied document number and reject it if nothing is left.
///
/// The document is otherwise opaque: no format validation is applied.
pub fn normalize_document(raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidDocument);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_documents_are_rejected() {
        assert_eq!(normalize_document(""), Err(DomainError::InvalidDocument));
        assert_eq!(normalize_document("   "), Err(DomainError::InvalidDocument));
        assert_eq!(normalize_document("\t\n"), Err(DomainError::InvalidDocument));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(normalize_document(" x ").unwrap(), "x");
        assert_eq!(normalize_document("12345").unwrap(), "12345");
    }

    #[test]
    fn account_serializes_with_account_id_field() {
        let acc = Account {
            id: AccountId::new(1),
            document_number: "12345".to_string(),
        };
        let json = serde_json::to_value(&acc).unwrap();
        assert_eq!(json, serde_json::json!({"account_id": 1, "document_number": "12345"}));
    }
}
