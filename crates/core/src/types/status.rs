//! Enums for checkout and order filtering.

use serde::{Deserialize, Serialize};

use super::order::Order;

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// Hosted card checkout.
    Card,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::Card => "CARD",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orders list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryFilter {
    #[default]
    All,
    Delivered,
    NotDelivered,
}

impl DeliveryFilter {
    /// Every filter, in the order the tabs are shown.
    pub const ALL: [Self; 3] = [Self::All, Self::Delivered, Self::NotDelivered];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Delivered => "delivered",
            Self::NotDelivered => "not_delivered",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Delivered => "Delivered",
            Self::NotDelivered => "Not Delivered",
        }
    }

    /// Whether the order passes this filter.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            Self::All => true,
            Self::Delivered => order.is_delivered(),
            Self::NotDelivered => !order.is_delivered(),
        }
    }

    /// Orders that pass this filter, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|order| self.matches(order)).collect()
    }
}

impl std::str::FromStr for DeliveryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "delivered" => Ok(Self::Delivered),
            "not_delivered" => Ok(Self::NotDelivered),
            _ => Err(format!("unknown delivery filter: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::order::OrderId;

    fn order(id: &str, delivery_status: &str) -> Order {
        Order {
            order_id: OrderId::new(id),
            delivery_status: delivery_status.to_owned(),
            ..Order::default()
        }
    }

    #[test]
    fn test_filter_partitions_orders() {
        let orders = vec![
            order("A", "delivered"),
            order("B", "pending"),
            order("C", "Delivered"),
            order("D", ""),
        ];
        let all = DeliveryFilter::All.apply(&orders);
        let delivered = DeliveryFilter::Delivered.apply(&orders);
        let pending = DeliveryFilter::NotDelivered.apply(&orders);

        assert_eq!(all.len(), delivered.len() + pending.len());
        assert!(delivered.iter().all(|o| !pending.contains(o)));
        assert_eq!(
            delivered.iter().map(|o| o.order_id.as_str()).collect::<Vec<_>>(),
            vec!["A", "C"]
        );
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("all".parse::<DeliveryFilter>().unwrap(), DeliveryFilter::All);
        assert_eq!(
            "not_delivered".parse::<DeliveryFilter>().unwrap(),
            DeliveryFilter::NotDelivered
        );
        assert!("shipped".parse::<DeliveryFilter>().is_err());
    }

    #[test]
    fn test_payment_method_wire_format() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"COD\"");
        let card: PaymentMethod = serde_json::from_str("\"CARD\"").unwrap();
        assert_eq!(card, PaymentMethod::Card);
    }
}
