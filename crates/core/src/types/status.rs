//! Status enums for orders and payments.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order status as reported by the backend (`estado`).
///
/// The backend uses Spanish labels. Unknown labels are preserved verbatim so a
/// new backend state never makes an order list unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Shipped,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// The label the backend uses for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pendiente",
            Self::Completed => "Completada",
            Self::Shipped => "Enviada",
            Self::Cancelled => "Cancelada",
            Self::Other(label) => label,
        }
    }

    /// Whether the order has been cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<String> for OrderStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Pendiente" => Self::Pending,
            "Completada" => Self::Completed,
            "Enviada" => Self::Shipped,
            "Cancelada" => Self::Cancelled,
            _ => Self::Other(label),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(label) => label,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Payment through a QR code wallet.
    #[default]
    Qr,
    /// Card payment.
    Card,
}

impl PaymentMethod {
    /// Wire value of this payment method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Qr => "qr",
            Self::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qr" => Ok(Self::Qr),
            "card" => Ok(Self::Card),
            _ => Err(format!("unknown payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_known_labels() {
        let status: OrderStatus = serde_json::from_str("\"Cancelada\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
        assert!(status.is_cancelled());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Cancelada\"");
    }

    #[test]
    fn test_order_status_unknown_label_round_trips() {
        let status: OrderStatus = serde_json::from_str("\"En revisión\"").unwrap();
        assert_eq!(status, OrderStatus::Other("En revisión".to_string()));
        assert!(!status.is_cancelled());
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            "\"En revisión\""
        );
    }

    #[test]
    fn test_payment_method_wire_values() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Qr).unwrap(), "\"qr\"");
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Card).unwrap(),
            "\"card\""
        );
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert!("cash".parse::<PaymentMethod>().is_err());
    }
}
