use chrono::Duration;
use rust_decimal::Decimal;

use admin::model::{
    DiscountCodeModel, DiscountInvalidReason, DiscountKind, MemberPromotionModel,
};

use super::super::ut_time;

fn ut_discount(kind: DiscountKind, value: Decimal) -> DiscountCodeModel {
    let starts = ut_time(2025, 5, 1);
    DiscountCodeModel {
        code: "MERDEKA10".to_string(),
        kind,
        value,
        min_order_total: Some(Decimal::new(5000, 2)),
        max_discount_amount: Some(Decimal::new(2000, 2)),
        usage_limit: Some(500),
        times_used: 12,
        starts_at: starts,
        expires_at: starts + Duration::days(60),
        member_only: false,
    }
}

#[test]
fn discount_percentage_within_range() {
    let d = ut_discount(DiscountKind::Percentage, Decimal::new(10, 0));
    assert!(d.validate().is_empty());
}

#[test]
fn discount_percentage_out_of_range() {
    let d = ut_discount(DiscountKind::Percentage, Decimal::new(120, 0));
    let reasons = d.validate();
    assert_eq!(reasons.len(), 1);
    assert!(matches!(
        reasons[0],
        DiscountInvalidReason::PercentOutOfRange(_)
    ));
}

#[test]
fn discount_fixed_amount_must_be_positive() {
    let d = ut_discount(DiscountKind::FixedAmount, Decimal::ZERO);
    let reasons = d.validate();
    assert!(matches!(
        reasons[0],
        DiscountInvalidReason::NonPositiveValue(_)
    ));
}

#[test]
fn discount_free_shipping_ignores_value() {
    let d = ut_discount(DiscountKind::FreeShipping, Decimal::ZERO);
    assert!(d.validate().is_empty());
}

#[test]
fn discount_window_must_be_ordered() {
    let mut d = ut_discount(DiscountKind::Percentage, Decimal::new(10, 0));
    d.expires_at = d.starts_at - Duration::days(1);
    let reasons = d.validate();
    assert!(reasons.contains(&DiscountInvalidReason::WindowReversed));
}

#[test]
fn discount_usage_limit_below_consumed() {
    let mut d = ut_discount(DiscountKind::Percentage, Decimal::new(10, 0));
    d.usage_limit = Some(5); // 12 redemptions already made
    let reasons = d.validate();
    assert!(reasons.contains(&DiscountInvalidReason::UsageBelowConsumed {
        limit: 5,
        used: 12
    }));
}

#[test]
fn discount_blank_code_rejected() {
    let mut d = ut_discount(DiscountKind::Percentage, Decimal::new(10, 0));
    d.code = "   ".to_string();
    let reasons = d.validate();
    assert!(reasons.contains(&DiscountInvalidReason::EmptyCode));
}

fn ut_promo(regular: Decimal, member: Decimal) -> MemberPromotionModel {
    let starts = ut_time(2025, 5, 1);
    MemberPromotionModel {
        product_id: 7731,
        regular_price: regular,
        member_price: member,
        starts_at: starts,
        expires_at: starts + Duration::days(30),
    }
}

#[test]
fn member_price_strictly_below_regular() {
    let ok = ut_promo(Decimal::new(9900, 2), Decimal::new(7900, 2));
    assert!(ok.validate().is_empty());
}

#[test]
fn member_price_equal_to_regular_rejected() {
    let bad = ut_promo(Decimal::new(9900, 2), Decimal::new(9900, 2));
    let reasons = bad.validate();
    assert!(reasons.iter().any(|r| matches!(
        r,
        DiscountInvalidReason::MemberPriceNotBelowRegular { .. }
    )));
}

#[test]
fn member_price_above_regular_rejected() {
    let bad = ut_promo(Decimal::new(7900, 2), Decimal::new(9900, 2));
    let reasons = bad.validate();
    assert!(reasons.iter().any(|r| matches!(
        r,
        DiscountInvalidReason::MemberPriceNotBelowRegular { .. }
    )));
}

#[test]
fn promo_prices_must_be_positive() {
    let bad = ut_promo(Decimal::new(-100, 2), Decimal::new(-200, 2));
    let reasons = bad.validate();
    let num_price_errors = reasons
        .iter()
        .filter(|r| matches!(r, DiscountInvalidReason::NonPositivePrice(_)))
        .count();
    assert_eq!(num_price_errors, 2);
}
