//! Orders, order items and delivery estimates.

use core::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::OrderItemId;
use super::money::format_inr;
use super::product::Product;

/// Days between placing an order and its estimated delivery.
pub const DELIVERY_DAYS: i64 = 7;

const MISSING: &str = "N/A";

/// Human-facing order reference (e.g. `ORD1A2B3C`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One purchased line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub product: Product,
}

impl OrderItem {
    #[must_use]
    pub fn unit_price_display(&self) -> String {
        format_inr(self.unit_price)
    }
}

/// An order as returned by the order endpoints.
///
/// Place-order responses may carry only `order_id`, so every field has a
/// default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub order_id: OrderId,
    pub status: String,
    pub delivery_status: String,
    pub amount: Decimal,
    pub subtotal: Decimal,
    pub delivery_charge: Decimal,
    pub currency: String,
    pub created_at: Option<String>,
    pub buyer_name: String,
    pub phone: Option<String>,
    pub address_line: String,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub payment_method: String,
    pub otp_sent_at: Option<String>,
    pub is_received: bool,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Whether the order has been delivered (case-insensitive).
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.delivery_status.eq_ignore_ascii_case("delivered")
    }

    /// Whether a delivery OTP has already been sent.
    #[must_use]
    pub const fn otp_requested(&self) -> bool {
        self.otp_sent_at.is_some()
    }

    /// Parsed creation time, if present and valid.
    #[must_use]
    pub fn created(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    /// Estimated delivery date: creation date plus [`DELIVERY_DAYS`].
    #[must_use]
    pub fn estimated_delivery(&self) -> Option<NaiveDate> {
        self.created()
            .and_then(|created| created.checked_add_signed(TimeDelta::days(DELIVERY_DAYS)))
            .map(|eta| eta.date_naive())
    }

    /// Estimated delivery as `M/D/YYYY`, or `N/A`.
    #[must_use]
    pub fn estimated_delivery_display(&self) -> String {
        self.estimated_delivery()
            .map_or_else(|| MISSING.to_owned(), |date| date.format("%-m/%-d/%Y").to_string())
    }

    /// Creation time as `M/D/YYYY, h:mm:ss AM`, or `N/A`.
    #[must_use]
    pub fn created_display(&self) -> String {
        self.created().map_or_else(
            || MISSING.to_owned(),
            |created| created.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        )
    }

    #[must_use]
    pub fn amount_display(&self) -> String {
        format_inr(self.amount)
    }

    #[must_use]
    pub fn subtotal_display(&self) -> String {
        format_inr(self.subtotal)
    }

    #[must_use]
    pub fn delivery_charge_display(&self) -> String {
        format_inr(self.delivery_charge)
    }
}

/// Accepts RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS[.f]` values
/// (treated as UTC).
fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value).ok().or_else(|| {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}
