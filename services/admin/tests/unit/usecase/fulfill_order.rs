use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use admin::adapter::shipping::{
    AppAggregatorError, AppAggregatorErrorReason, AppAggregatorFnLabel, ShipmentQuoteModel,
    ShipmentReceiptModel,
};
use admin::model::OrderStatus;
use admin::usecase::{FulfillOrderRequest, FulfillOrderUcError, FulfillOrderUseCase};

use super::super::{ut_logctx, ut_paid_order, ut_pickup_address};
use super::{
    MockChatNotifier, MockMailSender, MockOrderRepo, MockSettingsRepo, MockShipmentAggregator,
};

fn ut_request() -> FulfillOrderRequest {
    FulfillOrderRequest {
        service_id: "EP100".to_string(),
        pickup_date: "2099-03-10".to_string(),
        overridden_by_admin: false,
        admin_override_reason: None,
    }
}

fn ut_quote() -> ShipmentQuoteModel {
    ShipmentQuoteModel {
        aggregator_order_no: "EP-777".to_string(),
        courier_name: "Skynet Express".to_string(),
        price: Decimal::new(850, 2),
    }
}

fn ut_receipt() -> ShipmentReceiptModel {
    ShipmentReceiptModel {
        tracking_number: "MY2025XYZ".to_string(),
        awb_number: "AWB-889900".to_string(),
        awb_url: Some("https://cdn.courier.example/awb/889900.pdf".to_string()),
    }
}

struct UtFixture {
    uc: FulfillOrderUseCase,
    aggregator: (Arc<std::sync::atomic::AtomicU32>, Arc<std::sync::atomic::AtomicU32>),
    booking_failures: Arc<Mutex<Vec<(String, u32, String)>>>,
    saved_bookings: Arc<Mutex<Vec<(String, String, String)>>>,
    num_mails: Arc<std::sync::atomic::AtomicU32>,
}

fn ut_fixture(
    repo: MockOrderRepo,
    settings: MockSettingsRepo,
    aggregator: MockShipmentAggregator,
) -> UtFixture {
    let mailer = MockMailSender::default();
    let num_mails = mailer.num_sent.clone();
    let num_creates = aggregator.num_create_calls.clone();
    let num_pays = aggregator.num_pay_calls.clone();
    let booking_failures = repo.booking_failures.clone();
    let saved_bookings = repo.saved_bookings.clone();
    let uc = FulfillOrderUseCase {
        repo: Box::new(repo),
        settings_repo: Box::new(settings),
        aggregator: Arc::new(Box::new(aggregator)),
        mailer: Arc::new(Box::new(mailer)),
        notifier: Arc::new(Box::new(MockChatNotifier::default())),
        logctx: ut_logctx(),
    };
    UtFixture {
        uc,
        aggregator: (num_creates, num_pays),
        booking_failures,
        saved_bookings,
        num_mails,
    }
} // end of fn ut_fixture

#[tokio::test]
async fn reject_unpaid_order_without_external_call() {
    let mut order = ut_paid_order("0a1b2c");
    order.status = OrderStatus::Pending;
    let repo = MockOrderRepo {
        fetch_results: Mutex::new(vec![Ok(Some(order))]),
        ..Default::default()
    };
    let fixture = ut_fixture(repo, MockSettingsRepo::default(), Default::default());
    let result = fixture.uc.execute("0a1b2c", ut_request()).await;
    assert!(matches!(
        result.err().unwrap(),
        FulfillOrderUcError::InvalidOrderStatus(OrderStatus::Pending)
    ));
    assert_eq!(fixture.aggregator.0.load(Ordering::Relaxed), 0u32);
    assert_eq!(fixture.aggregator.1.load(Ordering::Relaxed), 0u32);
}

#[tokio::test]
async fn reject_order_already_fulfilled() {
    let mut order = ut_paid_order("0a1b2d");
    order.booking.tracking_number = Some("TRK-1".to_string());
    order.booking.airway_bill_number = Some("AWB-1".to_string());
    let repo = MockOrderRepo {
        fetch_results: Mutex::new(vec![Ok(Some(order))]),
        ..Default::default()
    };
    let fixture = ut_fixture(repo, MockSettingsRepo::default(), Default::default());
    let result = fixture.uc.execute("0a1b2d", ut_request()).await;
    assert!(matches!(
        result.err().unwrap(),
        FulfillOrderUcError::AlreadyFulfilled
    ));
    assert_eq!(fixture.aggregator.0.load(Ordering::Relaxed), 0u32);
}

#[tokio::test]
async fn reject_when_order_missing() {
    let repo = MockOrderRepo {
        fetch_results: Mutex::new(vec![Ok(None)]),
        ..Default::default()
    };
    let fixture = ut_fixture(repo, MockSettingsRepo::default(), Default::default());
    let result = fixture.uc.execute("deadbeef", ut_request()).await;
    assert!(matches!(
        result.err().unwrap(),
        FulfillOrderUcError::OrderNotFound
    ));
}

#[tokio::test]
async fn reject_malformed_request_before_any_io() {
    let fixture = ut_fixture(
        MockOrderRepo::default(),
        MockSettingsRepo::default(),
        Default::default(),
    );
    let req = FulfillOrderRequest {
        service_id: "  ".to_string(),
        pickup_date: "10-03-2099".to_string(),
        overridden_by_admin: false,
        admin_override_reason: None,
    };
    let result = fixture.uc.execute("0a1b2e", req).await;
    let Some(FulfillOrderUcError::ValidationError(detail)) = result.err() else {
        panic!("validation error expected");
    };
    assert_eq!(detail.len(), 2);
}

#[tokio::test]
async fn reject_when_pickup_address_unconfigured() {
    let repo = MockOrderRepo {
        fetch_results: Mutex::new(vec![Ok(Some(ut_paid_order("0a1b2f")))]),
        ..Default::default()
    };
    let settings = MockSettingsRepo {
        pickup_result: Mutex::new(Some(Ok(None))),
        ..Default::default()
    };
    let fixture = ut_fixture(repo, settings, Default::default());
    let result = fixture.uc.execute("0a1b2f", ut_request()).await;
    assert!(matches!(
        result.err().unwrap(),
        FulfillOrderUcError::NotConfigured
    ));
    assert_eq!(fixture.aggregator.0.load(Ordering::Relaxed), 0u32);
}

#[tokio::test]
async fn booking_complete_order_ready_to_ship() {
    let repo = MockOrderRepo {
        fetch_results: Mutex::new(vec![Ok(Some(ut_paid_order("0a1b30")))]),
        ..Default::default()
    };
    let settings = MockSettingsRepo {
        pickup_result: Mutex::new(Some(Ok(Some(ut_pickup_address())))),
        ..Default::default()
    };
    let aggregator = MockShipmentAggregator {
        create_result: Mutex::new(Some(Ok(ut_quote()))),
        pay_result: Mutex::new(Some(Ok(ut_receipt()))),
        ..Default::default()
    };
    let fixture = ut_fixture(repo, settings, aggregator);
    let result = fixture.uc.execute("0a1b30", ut_request()).await;
    let out = result.ok().unwrap();
    assert_eq!(out.tracking_number.as_str(), "MY2025XYZ");
    assert_eq!(out.awb_number.as_str(), "AWB-889900");
    assert_eq!(out.aggregator_order_no.as_str(), "EP-777");
    let saved = fixture.saved_bookings.lock().unwrap();
    assert_eq!(saved.len(), 1);
    let (oid, status, tracking) = &saved[0];
    assert_eq!(oid.as_str(), "0a1b30");
    assert_eq!(status.as_str(), "READY_TO_SHIP");
    assert_eq!(tracking.as_str(), "MY2025XYZ");
    assert_eq!(fixture.num_mails.load(Ordering::Relaxed), 1u32);
    assert!(fixture.booking_failures.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_failure_persists_attempt_counter() {
    let repo = MockOrderRepo {
        fetch_results: Mutex::new(vec![Ok(Some(ut_paid_order("0a1b31")))]),
        ..Default::default()
    };
    let settings = MockSettingsRepo {
        pickup_result: Mutex::new(Some(Ok(Some(ut_pickup_address())))),
        ..Default::default()
    };
    let aggregator = MockShipmentAggregator {
        create_result: Mutex::new(Some(Err(AppAggregatorError {
            reason: AppAggregatorErrorReason::RemoteRejected {
                error_code: "422".to_string(),
                detail: "postcode outside coverage".to_string(),
            },
            fn_label: AppAggregatorFnLabel::CreateShipment,
        }))),
        ..Default::default()
    };
    let fixture = ut_fixture(repo, settings, aggregator);
    let result = fixture.uc.execute("0a1b31", ut_request()).await;
    assert!(matches!(
        result.err().unwrap(),
        FulfillOrderUcError::CreateShipmentFailure(_)
    ));
    let failures = fixture.booking_failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    let (oid, attempts, detail) = &failures[0];
    assert_eq!(oid.as_str(), "0a1b31");
    assert_eq!(*attempts, 1u32);
    assert!(detail.contains("postcode outside coverage"));
    assert!(fixture.saved_bookings.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_failure_low_credit_carries_balance() {
    let repo = MockOrderRepo {
        fetch_results: Mutex::new(vec![Ok(Some(ut_paid_order("0a1b32")))]),
        ..Default::default()
    };
    let settings = MockSettingsRepo {
        pickup_result: Mutex::new(Some(Ok(Some(ut_pickup_address())))),
        ..Default::default()
    };
    let aggregator = MockShipmentAggregator {
        create_result: Mutex::new(Some(Err(AppAggregatorError {
            reason: AppAggregatorErrorReason::InsufficientBalance(Decimal::new(123, 2)),
            fn_label: AppAggregatorFnLabel::CreateShipment,
        }))),
        ..Default::default()
    };
    let fixture = ut_fixture(repo, settings, aggregator);
    let result = fixture.uc.execute("0a1b32", ut_request()).await;
    let Some(FulfillOrderUcError::InsufficientBalance(balance)) = result.err() else {
        panic!("insufficient-balance error expected");
    };
    assert_eq!(balance, Decimal::new(123, 2));
    assert_eq!(fixture.booking_failures.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn payment_failure_keeps_order_paid_and_surfaces_unpaid_id() {
    let repo = MockOrderRepo {
        fetch_results: Mutex::new(vec![Ok(Some(ut_paid_order("0a1b33")))]),
        ..Default::default()
    };
    let settings = MockSettingsRepo {
        pickup_result: Mutex::new(Some(Ok(Some(ut_pickup_address())))),
        ..Default::default()
    };
    let aggregator = MockShipmentAggregator {
        create_result: Mutex::new(Some(Ok(ut_quote()))),
        pay_result: Mutex::new(Some(Err(AppAggregatorError {
            reason: AppAggregatorErrorReason::RemoteRejected {
                error_code: "500".to_string(),
                detail: "wallet service down".to_string(),
            },
            fn_label: AppAggregatorFnLabel::PayShipment,
        }))),
        ..Default::default()
    };
    let fixture = ut_fixture(repo, settings, aggregator);
    let result = fixture.uc.execute("0a1b33", ut_request()).await;
    let Some(FulfillOrderUcError::PayShipmentFailure {
        aggregator_order_no,
        detail,
    }) = result.err()
    else {
        panic!("pay-shipment failure expected");
    };
    assert_eq!(aggregator_order_no.as_str(), "EP-777");
    assert!(detail.contains("wallet service down"));
    let failures = fixture.booking_failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].2.contains("EP-777"));
    // booking success was never written back, the order stays PAID
    assert!(fixture.saved_bookings.lock().unwrap().is_empty());
    assert_eq!(fixture.num_mails.load(Ordering::Relaxed), 0u32);
}
