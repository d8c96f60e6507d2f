//! Quote saving.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use super::models::{QuoteData, QuoteDraft, QuoteStatus};
use super::QuoteStore;

/// A quote stays valid for this many working days
pub const QUOTE_VALIDITY_BUSINESS_DAYS: u32 = 7;

/// Outcome of a save, reported once to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveQuoteResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Move forward `days` working days, stepping one calendar day at a time and
/// counting only Monday to Friday. The time of day is kept.
pub fn add_business_days(start: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    let mut date = start;
    let mut remaining = days;
    while remaining > 0 {
        date += Duration::days(1);
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    date
}

/// Stamp a draft as an active quote created at `now`
pub fn activate(draft: QuoteDraft, now: DateTime<Utc>) -> QuoteData {
    QuoteData {
        client: draft.client,
        components: draft.components,
        calculation: draft.calculation,
        created_at: now,
        expires_at: add_business_days(now, QUOTE_VALIDITY_BUSINESS_DAYS),
        status: QuoteStatus::Active,
    }
}

/// Save a quote created now
pub async fn save_quote(store: &dyn QuoteStore, draft: QuoteDraft) -> SaveQuoteResult {
    save_quote_at(store, draft, Utc::now()).await
}

/// Save a quote as of `now`. No retry: a failure is logged and returned.
pub async fn save_quote_at(
    store: &dyn QuoteStore,
    draft: QuoteDraft,
    now: DateTime<Utc>,
) -> SaveQuoteResult {
    let quote = activate(draft, now);

    match store.save_quote(&quote).await {
        Ok(id) => {
            info!(
                "Saved quote {} for {} (final price {}, expires {})",
                id, quote.client.name, quote.calculation.final_price, quote.expires_at
            );
            SaveQuoteResult {
                success: true,
                id: Some(id),
                error: None,
                expires_at: Some(quote.expires_at),
            }
        }
        Err(e) => {
            error!("Failed to save quote for {}: {}", quote.client.name, e);
            SaveQuoteResult {
                success: false,
                id: None,
                error: Some(e.to_string()),
                expires_at: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::calculators::{calculate_price, ComponentSelection, MarginPercent};
    use crate::pricing::services::SelectedComponents;
    use crate::pricing::static_catalog::*;
    use crate::quotes::models::ClientContact;
    use crate::quotes::testing::{FailingQuoteStore, MemoryQuoteStore};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn draft() -> QuoteDraft {
        let catalog = StaticCatalog::sample();
        let selection = ComponentSelection {
            panel: &catalog.panels[0],
            panel_count: 10,
            inverter: &catalog.inverters[0],
            optimizer: None,
            mounting: &catalog.mounting_systems[0],
            storage: None,
        };
        QuoteDraft {
            client: ClientContact {
                name: "Jan Kowalski".to_string(),
                email: Some("jan@example.com".to_string()),
                phone: None,
                address: Some("ul. Słoneczna 5, Kraków".to_string()),
                notes: None,
            },
            components: SelectedComponents {
                panel_id: JINKO_420_ID,
                panel_count: 10,
                inverter_id: FRONIUS_SYMO_ID,
                optimizer_id: None,
                mounting_system_id: PITCHED_ROOF_ID,
                storage_id: None,
            },
            calculation: calculate_price(&selection, &catalog.accessories, MarginPercent::new(dec!(20))),
        }
    }

    #[test]
    fn test_business_days_from_monday() {
        // 2026-10-19 is a Monday
        assert_eq!(add_business_days(at(2026, 10, 19, 9), 7), at(2026, 10, 28, 9));
    }

    #[test]
    fn test_business_days_from_friday() {
        assert_eq!(add_business_days(at(2026, 10, 23, 15), 7), at(2026, 11, 3, 15));
    }

    #[test]
    fn test_business_days_from_weekend() {
        assert_eq!(add_business_days(at(2026, 10, 24, 12), 7), at(2026, 11, 3, 12));
        assert_eq!(add_business_days(at(2026, 10, 25, 12), 7), at(2026, 11, 3, 12));
    }

    #[test]
    fn test_business_days_never_land_on_weekend() {
        for offset in 0..14 {
            let start = at(2026, 10, 19, 8) + Duration::days(offset);
            let end = add_business_days(start, QUOTE_VALIDITY_BUSINESS_DAYS);
            assert!(!matches!(end.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(end - start >= Duration::days(9));
        }
    }

    #[test]
    fn test_zero_business_days() {
        let start = at(2026, 10, 24, 12);
        assert_eq!(add_business_days(start, 0), start);
    }

    #[tokio::test]
    async fn test_save_quote_stamps_and_stores() {
        let store = MemoryQuoteStore::default();
        let now = at(2026, 10, 19, 10);

        let result = save_quote_at(&store, draft(), now).await;

        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.expires_at, Some(at(2026, 10, 28, 10)));

        let saved = store.saved.lock().await;
        assert_eq!(saved.len(), 1);
        let (id, quote) = &saved[0];
        assert_eq!(result.id, Some(*id));
        assert_eq!(quote.status, QuoteStatus::Active);
        assert_eq!(quote.created_at, now);
        assert_eq!(quote.expires_at, at(2026, 10, 28, 10));
        assert!(!quote.is_expired_at(at(2026, 10, 28, 9)));
        assert!(quote.is_expired_at(at(2026, 10, 28, 10)));
    }

    #[tokio::test]
    async fn test_save_quote_failure_is_reported() {
        let result = save_quote_at(&FailingQuoteStore, draft(), at(2026, 10, 19, 10)).await;

        assert!(!result.success);
        assert!(result.id.is_none());
        assert!(result.error.unwrap().contains("disk full"));
    }
}
