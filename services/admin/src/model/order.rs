use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use bazaar_common::api::dto::{CurrencyDto, PhoneNumberDto, PhyAddrDto};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    ReadyToShip,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::ReadyToShip => "READY_TO_SHIP",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn try_from_raw(raw: &str) -> Result<Self, OrderModelError> {
        match raw {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "READY_TO_SHIP" => Ok(Self::ReadyToShip),
            "IN_TRANSIT" => Ok(Self::InTransit),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            _others => Err(OrderModelError::CorruptedRow(format!("status:{raw}"))),
        }
    }

    fn transition_allowed(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid)
                | (Self::Pending, Self::Cancelled)
                | (Self::Paid, Self::ReadyToShip)
                | (Self::Paid, Self::Cancelled)
                | (Self::ReadyToShip, Self::InTransit)
                | (Self::InTransit, Self::Delivered)
        )
    }
} // end of impl OrderStatus

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::Paid => "PAID",
            Self::Refunded => "REFUNDED",
        }
    }
    pub fn try_from_raw(raw: &str) -> Result<Self, OrderModelError> {
        match raw {
            "UNPAID" => Ok(Self::Unpaid),
            "PAID" => Ok(Self::Paid),
            "REFUNDED" => Ok(Self::Refunded),
            _others => Err(OrderModelError::CorruptedRow(format!("pay-status:{raw}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecipientModel {
    pub name: String,
    pub email: String,
    pub phone: Option<PhoneNumberDto>,
    pub address: PhyAddrDto,
}

/// pickup (sender) address resolved from the business profile, required
/// before any shipment can be booked
#[derive(Debug, Clone)]
pub struct PickupAddressModel {
    pub sender_name: String,
    pub phone: String,
    pub address: PhyAddrDto,
}

#[derive(Debug, Clone, Default)]
pub struct CourierBookingModel {
    pub tracking_number: Option<String>,
    pub airway_bill_number: Option<String>,
    pub airway_bill_url: Option<String>,
    pub courier_name: Option<String>,
    pub courier_service_id: Option<String>,
    pub scheduled_pickup_date: Option<NaiveDate>,
    pub failed_attempts: u32,
    pub last_error: Option<String>,
}

impl CourierBookingModel {
    /// an order counts as fulfilled only once the aggregator handed out
    /// both the tracking number and the airway bill
    pub fn is_fulfilled(&self) -> bool {
        self.tracking_number.is_some() && self.airway_bill_number.is_some()
    }

    pub fn record_failure(&mut self, detail: String) -> u32 {
        self.failed_attempts += 1;
        self.last_error = Some(detail);
        self.failed_attempts
    }
} // end of impl CourierBookingModel

#[derive(Debug, Clone)]
pub struct OrderLineModel {
    pub product_id: u64,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct AdminOverrideModel {
    pub overridden: bool,
    pub reason: Option<String>,
}

pub struct OrderModel {
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub currency: CurrencyDto,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub shipping_weight_kg: Decimal,
    pub recipient: Option<RecipientModel>,
    pub booking: CourierBookingModel,
    pub override_audit: AdminOverrideModel,
    pub lines: Vec<OrderLineModel>,
    pub create_time: DateTime<Utc>,
}

#[derive(Debug, PartialEq)]
pub enum FulfillmentGuardError {
    InvalidStatus(OrderStatus),
    AlreadyFulfilled,
    MissingShipAddress,
    NonPositiveWeight(Decimal),
}

#[derive(Debug, PartialEq)]
pub enum OrderModelError {
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },
    MissingOverrideReason,
    DeleteNotAllowed(OrderStatus),
    CorruptedRow(String),
}

impl OrderModel {
    /// preconditions checked before any call leaves for the courier
    /// aggregator, ordering matters, the caller maps each variant to its
    /// own application error code
    pub fn check_ready_for_booking(&self) -> Result<(), FulfillmentGuardError> {
        if self.status != OrderStatus::Paid {
            return Err(FulfillmentGuardError::InvalidStatus(self.status));
        }
        if self.booking.is_fulfilled() {
            return Err(FulfillmentGuardError::AlreadyFulfilled);
        }
        if self.recipient.is_none() {
            return Err(FulfillmentGuardError::MissingShipAddress);
        }
        if self.shipping_weight_kg <= Decimal::ZERO {
            return Err(FulfillmentGuardError::NonPositiveWeight(
                self.shipping_weight_kg,
            ));
        }
        Ok(())
    } // end of fn check_ready_for_booking

    #[allow(clippy::too_many_arguments)]
    pub fn confirm_booking(
        &mut self,
        courier_name: String,
        service_id: String,
        pickup_date: NaiveDate,
        tracking_number: String,
        awb_number: String,
        awb_url: Option<String>,
    ) {
        self.booking = CourierBookingModel {
            tracking_number: Some(tracking_number),
            airway_bill_number: Some(awb_number),
            airway_bill_url: awb_url,
            courier_name: Some(courier_name),
            courier_service_id: Some(service_id),
            scheduled_pickup_date: Some(pickup_date),
            failed_attempts: 0,
            last_error: None,
        };
        self.status = OrderStatus::ReadyToShip;
    }

    /// admin-initiated status change, a transition outside the regular
    /// lifecycle requires the override flag plus a reason for audit
    pub fn admin_transition(
        &mut self,
        next: OrderStatus,
        overridden: bool,
        reason: Option<String>,
    ) -> Result<(), OrderModelError> {
        let regular = self.status.transition_allowed(&next);
        if !regular {
            if !overridden {
                return Err(OrderModelError::InvalidTransition {
                    from: self.status,
                    to: next,
                });
            }
            if reason.as_deref().map_or(true, |r| r.trim().is_empty()) {
                return Err(OrderModelError::MissingOverrideReason);
            }
        }
        self.status = next;
        if overridden {
            self.override_audit = AdminOverrideModel {
                overridden: true,
                reason,
            };
        }
        Ok(())
    } // end of fn admin_transition

    /// deletion cascades to order lines, allowed only before payment or
    /// after cancellation
    pub fn deletable(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Cancelled)
    }
} // end of impl OrderModel
