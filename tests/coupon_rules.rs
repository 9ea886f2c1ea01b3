use chrono::{Duration, Utc};
use gocart_api::checkout::{CouponError, CouponTerms, check_coupon, normalize_code};

fn terms(for_new_user: bool, for_member: bool) -> CouponTerms {
    CouponTerms {
        discount_percent: 10,
        for_new_user,
        for_member,
        expires_at: Utc::now() + Duration::days(1),
    }
}

#[test]
fn codes_are_trimmed_and_upper_cased() {
    assert_eq!(normalize_code("  welcome10 "), "WELCOME10");
    assert_eq!(normalize_code("Plus15"), "PLUS15");
}

#[test]
fn open_coupon_is_accepted() {
    assert_eq!(check_coupon(&terms(false, false), Utc::now(), 7, false), Ok(()));
}

#[test]
fn expired_coupon_reads_as_not_found() {
    let now = Utc::now();
    let mut expired = terms(false, false);
    expired.expires_at = now;

    let err = check_coupon(&expired, now, 0, true).unwrap_err();
    assert_eq!(err, CouponError::NotFound);
    assert!(!err.is_ineligible());
}

#[test]
fn new_user_coupon_requires_no_prior_orders() {
    let coupon = terms(true, false);
    let now = Utc::now();

    assert_eq!(check_coupon(&coupon, now, 0, false), Ok(()));
    let err = check_coupon(&coupon, now, 1, false).unwrap_err();
    assert_eq!(err, CouponError::NewUsersOnly);
    assert!(err.is_ineligible());
}

#[test]
fn member_coupon_requires_membership() {
    let coupon = terms(false, true);
    let now = Utc::now();

    assert_eq!(check_coupon(&coupon, now, 3, true), Ok(()));
    assert_eq!(
        check_coupon(&coupon, now, 3, false),
        Err(CouponError::MembersOnly)
    );
}
