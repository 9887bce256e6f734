use chrono::NaiveDate;
use rust_decimal::Decimal;

use admin::model::{FulfillmentGuardError, OrderModelError, OrderStatus};

use super::super::ut_paid_order;

#[test]
fn booking_guard_accepts_paid_order() {
    let order = ut_paid_order("f00d01");
    assert!(order.check_ready_for_booking().is_ok());
}

#[test]
fn booking_guard_rejects_unpaid_status() {
    let mut order = ut_paid_order("f00d02");
    order.status = OrderStatus::Pending;
    let result = order.check_ready_for_booking();
    assert_eq!(
        result.err().unwrap(),
        FulfillmentGuardError::InvalidStatus(OrderStatus::Pending)
    );
}

#[test]
fn booking_guard_rejects_fulfilled_order() {
    let mut order = ut_paid_order("f00d03");
    order.booking.tracking_number = Some("TRK123".to_string());
    order.booking.airway_bill_number = Some("AWB123".to_string());
    let result = order.check_ready_for_booking();
    assert_eq!(result.err().unwrap(), FulfillmentGuardError::AlreadyFulfilled);
}

#[test]
fn booking_guard_tracking_alone_is_not_fulfilled() {
    let mut order = ut_paid_order("f00d04");
    // a tracking number without the airway bill means payment never
    // went through, the booking may be retried
    order.booking.tracking_number = Some("TRK123".to_string());
    assert!(order.check_ready_for_booking().is_ok());
}

#[test]
fn booking_guard_rejects_missing_address() {
    let mut order = ut_paid_order("f00d05");
    order.recipient = None;
    let result = order.check_ready_for_booking();
    assert_eq!(
        result.err().unwrap(),
        FulfillmentGuardError::MissingShipAddress
    );
}

#[test]
fn booking_guard_rejects_zero_weight() {
    let mut order = ut_paid_order("f00d06");
    order.shipping_weight_kg = Decimal::ZERO;
    let result = order.check_ready_for_booking();
    assert!(matches!(
        result.err().unwrap(),
        FulfillmentGuardError::NonPositiveWeight(_)
    ));
}

#[test]
fn confirm_booking_clears_failure_counters() {
    let mut order = ut_paid_order("f00d07");
    let _num = order.booking.record_failure("aggregator timeout".to_string());
    let _num = order.booking.record_failure("aggregator timeout again".to_string());
    assert_eq!(order.booking.failed_attempts, 2u32);
    let pickup = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    order.confirm_booking(
        "Skynet Express".to_string(),
        "EP100".to_string(),
        pickup,
        "MY2025XYZ".to_string(),
        "AWB-889900".to_string(),
        None,
    );
    assert_eq!(order.status, OrderStatus::ReadyToShip);
    assert_eq!(order.booking.failed_attempts, 0u32);
    assert!(order.booking.last_error.is_none());
    assert_eq!(order.booking.tracking_number.as_deref(), Some("MY2025XYZ"));
    assert_eq!(
        order.booking.scheduled_pickup_date.unwrap(),
        pickup
    );
}

#[test]
fn admin_transition_regular_path() {
    let mut order = ut_paid_order("f00d08");
    let result = order.admin_transition(OrderStatus::Cancelled, false, None);
    assert!(result.is_ok());
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert!(!order.override_audit.overridden);
}

#[test]
fn admin_transition_irregular_needs_override() {
    let mut order = ut_paid_order("f00d09");
    let result = order.admin_transition(OrderStatus::Delivered, false, None);
    assert_eq!(
        result.err().unwrap(),
        OrderModelError::InvalidTransition {
            from: OrderStatus::Paid,
            to: OrderStatus::Delivered,
        }
    );
}

#[test]
fn admin_transition_override_requires_reason() {
    let mut order = ut_paid_order("f00d0a");
    let result = order.admin_transition(OrderStatus::Delivered, true, Some("  ".to_string()));
    assert_eq!(result.err().unwrap(), OrderModelError::MissingOverrideReason);
    let result = order.admin_transition(
        OrderStatus::Delivered,
        true,
        Some("customer picked up at warehouse".to_string()),
    );
    assert!(result.is_ok());
    assert!(order.override_audit.overridden);
}

#[test]
fn delete_only_before_payment_or_after_cancel() {
    let mut order = ut_paid_order("f00d0b");
    assert!(!order.deletable());
    order.status = OrderStatus::Cancelled;
    assert!(order.deletable());
    order.status = OrderStatus::Pending;
    assert!(order.deletable());
}
