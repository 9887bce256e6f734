use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use mysql_async::prelude::{Query, Queryable, WithParams};
use mysql_async::{params, Conn, IsolationLevel, Row, TxOpts};
use rust_decimal::Decimal;

use bazaar_common::api::dto::{CountryCode, CurrencyDto, PhoneNumberDto, PhyAddrDto};
use bazaar_common::error::AppErrorCode;

use super::super::{
    AbstractOrderRepo, AppRepoError, AppRepoErrorDetail, AppRepoErrorFnLabel,
};
use super::{log_and_wrap_err, raw_column_to_date, raw_column_to_datetime};
use crate::adapter::datastore::{AppDStoreMariaDB, AppDataStoreContext};
use crate::model::{
    AdminOverrideModel, CourierBookingModel, OrderLineModel, OrderModel, OrderStatus,
    PaymentStatus, RecipientModel,
};

const FETCH_ORDER_SQL: &str = "SELECT `o_id`,`order_number`,`status`,`payment_status`,`currency`,\
 `subtotal`,`tax`,`shipping_fee`,`total`,`ship_weight_kg`,`recipient_name`,`recipient_email`,\
 `phone_nation`,`phone_number`,`ship_country`,`ship_state`,`ship_city`,`ship_postcode`,\
 `ship_street`,`ship_detail`,`tracking_number`,`awb_number`,`awb_url`,`courier_name`,\
 `courier_service_id`,`scheduled_pickup_date`,`failed_booking_attempts`,`last_booking_error`,\
 `overridden_by_admin`,`admin_override_reason`,`create_time` FROM `order_toplvl` WHERE `o_id`=?";

const FETCH_OLINES_SQL: &str = "SELECT `product_id`,`product_name`,`quantity`,`unit_price`,\
 `total_price` FROM `order_line` WHERE `o_id`=?";

type OlineRowType = (u64, String, u32, Decimal, Decimal);

pub(crate) struct MariadbOrderRepo {
    _dstore: Arc<AppDStoreMariaDB>,
}

fn row_parse_fail(column: &str) -> (AppErrorCode, AppRepoErrorDetail) {
    (
        AppErrorCode::DataCorruption,
        AppRepoErrorDetail::DataRowParse(column.to_string()),
    )
}

fn order_from_row(mut row: Row) -> Result<OrderModel, (AppErrorCode, AppRepoErrorDetail)> {
    let id = row
        .take::<String, _>("o_id")
        .ok_or(row_parse_fail("o_id"))?;
    let order_number = row
        .take::<String, _>("order_number")
        .ok_or(row_parse_fail("order_number"))?;
    let status = {
        let raw = row
            .take::<String, _>("status")
            .ok_or(row_parse_fail("status"))?;
        OrderStatus::try_from_raw(raw.as_str())
            .map_err(|e| row_parse_fail(format!("{e:?}").as_str()))?
    };
    let payment_status = {
        let raw = row
            .take::<String, _>("payment_status")
            .ok_or(row_parse_fail("payment_status"))?;
        PaymentStatus::try_from_raw(raw.as_str())
            .map_err(|e| row_parse_fail(format!("{e:?}").as_str()))?
    };
    let currency = {
        let raw = row
            .take::<String, _>("currency")
            .ok_or(row_parse_fail("currency"))?;
        CurrencyDto::from(&raw)
    };
    let subtotal = row
        .take::<Decimal, _>("subtotal")
        .ok_or(row_parse_fail("subtotal"))?;
    let tax = row.take::<Decimal, _>("tax").ok_or(row_parse_fail("tax"))?;
    let shipping_fee = row
        .take::<Decimal, _>("shipping_fee")
        .ok_or(row_parse_fail("shipping_fee"))?;
    let total = row
        .take::<Decimal, _>("total")
        .ok_or(row_parse_fail("total"))?;
    let shipping_weight_kg = row
        .take::<Decimal, _>("ship_weight_kg")
        .ok_or(row_parse_fail("ship_weight_kg"))?;
    let recipient = {
        let name = row.take::<Option<String>, _>("recipient_name").flatten();
        let email = row.take::<Option<String>, _>("recipient_email").flatten();
        let phone = {
            let nation = row.take::<Option<u16>, _>("phone_nation").flatten();
            let number = row.take::<Option<String>, _>("phone_number").flatten();
            match (nation, number) {
                (Some(nation), Some(number)) => Some(PhoneNumberDto { nation, number }),
                _others => None,
            }
        };
        let country = row.take::<Option<String>, _>("ship_country").flatten();
        let state = row.take::<Option<String>, _>("ship_state").flatten();
        let city = row.take::<Option<String>, _>("ship_city").flatten();
        let postcode = row.take::<Option<String>, _>("ship_postcode").flatten();
        let street_name = row.take::<Option<String>, _>("ship_street").flatten();
        let detail = row.take::<Option<String>, _>("ship_detail").flatten();
        match (name, email, country, state, city, postcode, detail) {
            (
                Some(name),
                Some(email),
                Some(country),
                Some(state),
                Some(city),
                Some(postcode),
                Some(detail),
            ) => Some(RecipientModel {
                name,
                email,
                phone,
                address: PhyAddrDto {
                    country: CountryCode::from(country.as_str()),
                    state,
                    city,
                    postcode,
                    street_name,
                    detail,
                },
            }),
            _others => None,
        }
    };
    let booking = CourierBookingModel {
        tracking_number: row.take::<Option<String>, _>("tracking_number").flatten(),
        airway_bill_number: row.take::<Option<String>, _>("awb_number").flatten(),
        airway_bill_url: row.take::<Option<String>, _>("awb_url").flatten(),
        courier_name: row.take::<Option<String>, _>("courier_name").flatten(),
        courier_service_id: row
            .take::<Option<String>, _>("courier_service_id")
            .flatten(),
        scheduled_pickup_date: {
            let raw = row
                .take::<mysql_async::Value, _>("scheduled_pickup_date")
                .ok_or(row_parse_fail("scheduled_pickup_date"))?;
            match raw {
                mysql_async::Value::NULL => None,
                _others => Some(raw_column_to_date(_others)?),
            }
        },
        failed_attempts: row
            .take::<u32, _>("failed_booking_attempts")
            .ok_or(row_parse_fail("failed_booking_attempts"))?,
        last_error: row
            .take::<Option<String>, _>("last_booking_error")
            .flatten(),
    };
    let override_audit = AdminOverrideModel {
        overridden: row
            .take::<bool, _>("overridden_by_admin")
            .ok_or(row_parse_fail("overridden_by_admin"))?,
        reason: row
            .take::<Option<String>, _>("admin_override_reason")
            .flatten(),
    };
    let create_time = {
        let raw = row
            .take::<mysql_async::Value, _>("create_time")
            .ok_or(row_parse_fail("create_time"))?;
        raw_column_to_datetime(raw)?
    };
    Ok(OrderModel {
        id,
        order_number,
        status,
        payment_status,
        currency,
        subtotal,
        tax,
        shipping_fee,
        total,
        shipping_weight_kg,
        recipient,
        booking,
        override_audit,
        lines: Vec::new(),
        create_time,
    })
} // end of fn order_from_row

impl MariadbOrderRepo {
    pub(crate) fn new(ds: Arc<AppDataStoreContext>) -> Result<Self, AppRepoError> {
        ds.mariadb(None)
            .map(|found| Self { _dstore: found })
            .ok_or(AppRepoError {
                fn_label: AppRepoErrorFnLabel::InitRepo,
                code: AppErrorCode::MissingDataStore,
                detail: AppRepoErrorDetail::Unknown,
            })
    }

    fn _err(
        &self,
        fn_label: AppRepoErrorFnLabel,
        code: AppErrorCode,
        detail: AppRepoErrorDetail,
    ) -> AppRepoError {
        log_and_wrap_err(&self._dstore, fn_label, code, detail)
    }

    async fn _acquire(&self, fn_label: AppRepoErrorFnLabel) -> Result<Conn, AppRepoError> {
        self._dstore.acquire().await.map_err(|e| {
            log_and_wrap_err(
                &self._dstore,
                fn_label,
                AppErrorCode::DatabaseServerBusy,
                AppRepoErrorDetail::DataStore(e),
            )
        })
    }
} // end of impl MariadbOrderRepo

#[async_trait]
impl AbstractOrderRepo for MariadbOrderRepo {
    async fn fetch_order(&self, oid: &str) -> Result<Option<OrderModel>, AppRepoError> {
        let mut conn = self._acquire(AppRepoErrorFnLabel::FetchOrder).await?;
        let exec = &mut conn;
        let maybe_row = FETCH_ORDER_SQL
            .with((oid,))
            .first::<Row, &mut Conn>(exec)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::FetchOrder,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        let mut order = match maybe_row {
            Some(row) => order_from_row(row)
                .map_err(|(code, detail)| self._err(AppRepoErrorFnLabel::FetchOrder, code, detail))?,
            None => return Ok(None),
        };
        let line_rows = FETCH_OLINES_SQL
            .with((order.id.as_str(),))
            .fetch::<OlineRowType, &mut Conn>(exec)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::FetchOrder,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        order.lines = line_rows
            .into_iter()
            .map(
                |(product_id, product_name, quantity, unit_price, total_price)| OrderLineModel {
                    product_id,
                    product_name,
                    quantity,
                    unit_price,
                    total_price,
                },
            )
            .collect();
        Ok(Some(order))
    } // end of fn fetch_order

    async fn record_booking_failure(
        &self,
        oid: &str,
        attempts: u32,
        detail: &str,
    ) -> Result<(), AppRepoError> {
        let stmt = "UPDATE `order_toplvl` SET `failed_booking_attempts`=:attempts,\
 `last_booking_error`=:detail WHERE `o_id`=:oid";
        let params_arg = params! {
            "attempts" => attempts,
            "detail" => detail,
            "oid" => oid,
        };
        let mut conn = self
            ._acquire(AppRepoErrorFnLabel::RecordBookingFailure)
            .await?;
        stmt.with(params_arg)
            .run::<&mut Conn>(&mut conn)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::RecordBookingFailure,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        Ok(())
    } // end of fn record_booking_failure

    async fn save_booking_success(&self, order: &OrderModel) -> Result<(), AppRepoError> {
        let b = &order.booking;
        let stmt = "UPDATE `order_toplvl` SET `status`=:status,`tracking_number`=:tracking,\
 `awb_number`=:awb,`awb_url`=:awb_url,`courier_name`=:courier,`courier_service_id`=:service,\
 `scheduled_pickup_date`=:pickup,`failed_booking_attempts`=0,`last_booking_error`=NULL \
 WHERE `o_id`=:oid";
        let params_arg = params! {
            "status" => order.status.as_str(),
            "tracking" => b.tracking_number.clone(),
            "awb" => b.airway_bill_number.clone(),
            "awb_url" => b.airway_bill_url.clone(),
            "courier" => b.courier_name.clone(),
            "service" => b.courier_service_id.clone(),
            "pickup" => b.scheduled_pickup_date.map(|d| d.format("%Y-%m-%d").to_string()),
            "oid" => order.id.as_str(),
        };
        let mut conn = self
            ._acquire(AppRepoErrorFnLabel::SaveBookingSuccess)
            .await?;
        let result = stmt
            .with(params_arg)
            .run::<&mut Conn>(&mut conn)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::SaveBookingSuccess,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        let num_affected = result.affected_rows();
        if num_affected == 1u64 {
            Ok(())
        } else {
            let msg = format!("num-affected-rows : {num_affected}");
            Err(self._err(
                AppRepoErrorFnLabel::SaveBookingSuccess,
                AppErrorCode::OrderNotExist,
                AppRepoErrorDetail::DatabaseExec(msg),
            ))
        }
    } // end of fn save_booking_success

    async fn update_order_status(&self, order: &OrderModel) -> Result<(), AppRepoError> {
        let stmt = "UPDATE `order_toplvl` SET `status`=:status,\
 `overridden_by_admin`=:overridden,`admin_override_reason`=:reason WHERE `o_id`=:oid";
        let params_arg = params! {
            "status" => order.status.as_str(),
            "overridden" => order.override_audit.overridden,
            "reason" => order.override_audit.reason.clone(),
            "oid" => order.id.as_str(),
        };
        let mut conn = self._acquire(AppRepoErrorFnLabel::UpdateOrderStatus).await?;
        let result = stmt
            .with(params_arg)
            .run::<&mut Conn>(&mut conn)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::UpdateOrderStatus,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        if result.affected_rows() == 1u64 {
            Ok(())
        } else {
            Err(self._err(
                AppRepoErrorFnLabel::UpdateOrderStatus,
                AppErrorCode::OrderNotExist,
                AppRepoErrorDetail::Unknown,
            ))
        }
    } // end of fn update_order_status

    async fn discard_order(&self, oid: &str) -> Result<(), AppRepoError> {
        let mut conn = self._acquire(AppRepoErrorFnLabel::DiscardOrder).await?;
        let mut options = TxOpts::default();
        options.with_isolation_level(IsolationLevel::RepeatableRead);
        let mut tx = conn.start_transaction(options).await.map_err(|e| {
            self._err(
                AppRepoErrorFnLabel::DiscardOrder,
                AppErrorCode::RemoteDbServerFailure,
                AppRepoErrorDetail::DatabaseTxStart(e.to_string()),
            )
        })?;
        // order lines removed ahead of the order row, referential
        // integrity guaranteed within the transaction
        tx.exec_drop("DELETE FROM `order_line` WHERE `o_id`=?", (oid,))
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::DiscardOrder,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        let result = tx
            .exec_iter("DELETE FROM `order_toplvl` WHERE `o_id`=?", (oid,))
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::DiscardOrder,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        let num_deleted = result.affected_rows();
        drop(result);
        if num_deleted == 0u64 {
            let _ = tx.rollback().await;
            return Err(self._err(
                AppRepoErrorFnLabel::DiscardOrder,
                AppErrorCode::OrderNotExist,
                AppRepoErrorDetail::Unknown,
            ));
        }
        tx.commit().await.map_err(|e| {
            self._err(
                AppRepoErrorFnLabel::DiscardOrder,
                AppErrorCode::RemoteDbServerFailure,
                AppRepoErrorDetail::DatabaseTxCommit(e.to_string()),
            )
        })
    } // end of fn discard_order
} // end of impl MariadbOrderRepo
