//! Quote models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::calculators::PriceCalculation;
use crate::pricing::services::SelectedComponents;

/// Quote lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Active,
    Expired,
    Converted,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Active => "active",
            QuoteStatus::Expired => "expired",
            QuoteStatus::Converted => "converted",
        }
    }

    /// Draft becomes active when saved; an active quote either expires or is
    /// converted into an order. Expired and converted are final.
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        matches!(
            (self, next),
            (QuoteStatus::Draft, QuoteStatus::Active)
                | (QuoteStatus::Active, QuoteStatus::Expired)
                | (QuoteStatus::Active, QuoteStatus::Converted)
        )
    }
}

/// Client contact details captured with the quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientContact {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ClientContact {
    /// Check the fields a reseller must fill in. Returns one message per problem.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("client name is required".to_string());
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if !email.contains('@') {
                errors.push(format!("'{}' is not an email address", email));
            }
        }
        let has_email = self.email.as_deref().is_some_and(|e| !e.trim().is_empty());
        let has_phone = self.phone.as_deref().is_some_and(|p| !p.trim().is_empty());
        if !has_email && !has_phone {
            errors.push("an email address or phone number is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Quote built in the calculator, not yet saved
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDraft {
    pub client: ClientContact,
    pub components: SelectedComponents,
    pub calculation: PriceCalculation,
}

/// Saved quote
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteData {
    pub client: ClientContact,
    pub components: SelectedComponents,
    pub calculation: PriceCalculation,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: QuoteStatus,
}

impl QuoteData {
    /// Check if the quote has run past its expiry at the given time
    pub fn is_expired_at(&self, check_time: DateTime<Utc>) -> bool {
        check_time >= self.expires_at
    }
}
