mod cfg;
mod model;
mod usecase;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use bazaar_common::api::dto::{CountryCode, CurrencyDto, PhoneNumberDto, PhyAddrDto};
use bazaar_common::config::{AppBasepathCfg, AppLoggingCfg};
use bazaar_common::logging::AppLogContext;

use admin::model::{
    AdminOverrideModel, ChatSessionModel, ChatSessionStatus, CourierBookingModel, OrderModel,
    OrderStatus, PaymentStatus, PickupAddressModel, RecipientModel,
};

pub(crate) const EXAMPLE_REL_PATH: &str = "/tests/unit/examples/";

pub(crate) fn ut_example_path(fname: &str) -> String {
    env!("CARGO_MANIFEST_DIR").to_string() + EXAMPLE_REL_PATH + fname
}

pub(crate) fn ut_logctx() -> Arc<AppLogContext> {
    let serial = json!({
        "handlers": [
            {"alias": "console-hdlr", "min_level": "INFO", "destination": "console", "path": null}
        ],
        "loggers": [
            {"alias": "admin", "handlers": ["console-hdlr"], "level": "WARNING"}
        ]
    });
    let cfg = serde_json::from_value::<AppLoggingCfg>(serial).unwrap();
    let basepath = AppBasepathCfg {
        system: "/tmp".to_string(),
        service: "/tmp".to_string(),
    };
    Arc::new(AppLogContext::new(&basepath, &cfg))
}

pub(crate) fn ut_time(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
}

pub(crate) fn ut_shipping_address() -> PhyAddrDto {
    PhyAddrDto {
        country: CountryCode::MY,
        state: "Selangor".to_string(),
        city: "Petaling Jaya".to_string(),
        postcode: "47301".to_string(),
        street_name: Some("Jalan SS2/24".to_string()),
        detail: "No 18, first floor".to_string(),
    }
}

pub(crate) fn ut_paid_order(oid: &str) -> OrderModel {
    OrderModel {
        id: oid.to_string(),
        order_number: format!("ORD-{oid}"),
        status: OrderStatus::Paid,
        payment_status: PaymentStatus::Paid,
        currency: CurrencyDto::MYR,
        subtotal: Decimal::new(14900, 2),
        tax: Decimal::new(894, 2),
        shipping_fee: Decimal::new(850, 2),
        total: Decimal::new(16644, 2),
        shipping_weight_kg: Decimal::new(12, 1), // 1.2 kg
        recipient: Some(RecipientModel {
            name: "Aminah binti Yusof".to_string(),
            email: "aminah@example.my".to_string(),
            phone: Some(PhoneNumberDto {
                nation: 60,
                number: "123456789".to_string(),
            }),
            address: ut_shipping_address(),
        }),
        booking: CourierBookingModel::default(),
        override_audit: AdminOverrideModel::default(),
        lines: Vec::new(),
        create_time: ut_time(2025, 2, 20),
    }
} // end of fn ut_paid_order

pub(crate) fn ut_pickup_address() -> PickupAddressModel {
    PickupAddressModel {
        sender_name: "Kedai Maju Online".to_string(),
        phone: "+60387654321".to_string(),
        address: ut_shipping_address(),
    }
}

pub(crate) fn ut_chat_session(
    sid: &str,
    status: ChatSessionStatus,
    last_activity: DateTime<Utc>,
) -> ChatSessionModel {
    ChatSessionModel {
        session_id: sid.to_string(),
        status,
        usr_id: None,
        guest_email: Some("guest@example.my".to_string()),
        created_at: last_activity - chrono::Duration::hours(2),
        last_activity,
        archived_at: None,
        retention_until: None,
        metadata: json!({}),
    }
}
