use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    #[error("coupon not found or expired")]
    NotFound,

    #[error("coupon valid for new users only")]
    NewUsersOnly,

    #[error("coupon valid for plus members only")]
    MembersOnly,
}

impl CouponError {
    pub fn is_ineligible(&self) -> bool {
        matches!(self, CouponError::NewUsersOnly | CouponError::MembersOnly)
    }
}

/// The parts of a coupon that decide whether it may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouponTerms {
    pub discount_percent: i32,
    pub for_new_user: bool,
    pub for_member: bool,
    pub expires_at: DateTime<Utc>,
}

/// Codes are stored upper-case.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn check_coupon(
    terms: &CouponTerms,
    now: DateTime<Utc>,
    prior_orders: u64,
    is_member: bool,
) -> Result<(), CouponError> {
    if terms.expires_at <= now {
        return Err(CouponError::NotFound);
    }
    if terms.for_new_user && prior_orders > 0 {
        return Err(CouponError::NewUsersOnly);
    }
    if terms.for_member && !is_member {
        return Err(CouponError::MembersOnly);
    }
    Ok(())
}
