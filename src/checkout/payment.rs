use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Hosted checkout sessions expire this long after creation.
pub const SESSION_TTL_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cod,
    Stripe,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Stripe => "stripe",
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
        match s.to_ascii_lowercase().as_str() {
            "cod" => Ok(PaymentMethod::Cod),
            "stripe" => Ok(PaymentMethod::Stripe),
            other => Err(format!("unknown payment method {other}")),
        }
    }
}

/// When the buyer's cart is emptied and the ordered stock is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartClearing {
    Immediate,
    /// Waits for the payment provider to confirm the session.
    OnPaymentConfirmed,
}

pub fn cart_clearing(method: PaymentMethod) -> CartClearing {
    match method {
        PaymentMethod::Cod => CartClearing::Immediate,
        PaymentMethod::Stripe => CartClearing::OnPaymentConfirmed,
    }
}
