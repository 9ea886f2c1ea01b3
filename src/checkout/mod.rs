//! Pure checkout rules: coupon eligibility, per-store totals and the
//! payment dispatch plan. Nothing in here touches the database.

pub mod coupon;
pub mod payment;
pub mod pricing;

pub use coupon::{CouponError, CouponTerms, check_coupon, normalize_code};
pub use payment::{CartClearing, PaymentMethod, SESSION_TTL_MINUTES, cart_clearing};
pub use pricing::{CheckoutError, CheckoutTotals, LineItem, StoreOrder, compute_totals};
