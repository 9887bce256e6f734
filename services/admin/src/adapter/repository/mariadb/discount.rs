use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use mysql_async::prelude::{Query, Queryable, WithParams};
use mysql_async::{params, Conn};
use rust_decimal::Decimal;

use bazaar_common::api::dto::ListWindowDto;
use bazaar_common::error::AppErrorCode;

use super::super::{
    AbstractDiscountRepo, AppRepoError, AppRepoErrorDetail, AppRepoErrorFnLabel,
};
use super::{fmt_datetime, log_and_wrap_err, raw_column_to_datetime};
use crate::adapter::datastore::{AppDStoreMariaDB, AppDataStoreContext};
use crate::model::{DiscountCodeModel, DiscountKind, MemberPromotionModel};

const DISCOUNT_COLUMNS: &str = "`code`,`kind`,`value`,`min_order_total`,`max_discount_amount`,\
 `usage_limit`,`times_used`,`starts_at`,`expires_at`,`member_only`";

#[rustfmt::skip]
type DiscountRowType = (
    String,                     // `code`
    String,                     // `kind`
    Decimal,                    // `value`
    Option<Decimal>,            // `min_order_total`
    Option<Decimal>,            // `max_discount_amount`
    Option<u32>,                // `usage_limit`
    u32,                        // `times_used`
    mysql_async::Value,         // `starts_at`
    mysql_async::Value,         // `expires_at`
    bool,                       // `member_only`
);

fn discount_from_row(
    row: DiscountRowType,
) -> Result<DiscountCodeModel, (AppErrorCode, AppRepoErrorDetail)> {
    let (code, kind_raw, value, min_order_total, max_discount_amount, usage_limit, times_used, starts_raw, expires_raw, member_only) =
        row;
    let kind = DiscountKind::try_from_raw(kind_raw.as_str()).map_err(|e| {
        (
            AppErrorCode::DataCorruption,
            AppRepoErrorDetail::DataRowParse(format!("{e:?}")),
        )
    })?;
    Ok(DiscountCodeModel {
        code,
        kind,
        value,
        min_order_total,
        max_discount_amount,
        usage_limit,
        times_used,
        starts_at: raw_column_to_datetime(starts_raw)?,
        expires_at: raw_column_to_datetime(expires_raw)?,
        member_only,
    })
}

pub(crate) struct MariadbDiscountRepo {
    _dstore: Arc<AppDStoreMariaDB>,
}

impl MariadbDiscountRepo {
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
} // end of impl MariadbDiscountRepo

#[async_trait]
impl AbstractDiscountRepo for MariadbDiscountRepo {
    async fn fetch_discount(
        &self,
        code: &str,
    ) -> Result<Option<DiscountCodeModel>, AppRepoError> {
        let stmt = format!("SELECT {DISCOUNT_COLUMNS} FROM `discount_code` WHERE `code`=?");
        let mut conn = self._acquire(AppRepoErrorFnLabel::FetchDiscount).await?;
        let exec = &mut conn;
        let maybe_row = stmt
            .with((code,))
            .first::<DiscountRowType, &mut Conn>(exec)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::FetchDiscount,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        match maybe_row {
            Some(row) => {
                let obj = discount_from_row(row).map_err(|(code, detail)| {
                    self._err(AppRepoErrorFnLabel::FetchDiscount, code, detail)
                })?;
                Ok(Some(obj))
            }
            None => Ok(None),
        }
    } // end of fn fetch_discount

    async fn save_discount(&self, discount: &DiscountCodeModel) -> Result<(), AppRepoError> {
        let stmt = "INSERT INTO `discount_code`(`code`,`kind`,`value`,`min_order_total`,\
 `max_discount_amount`,`usage_limit`,`times_used`,`starts_at`,`expires_at`,`member_only`) \
 VALUES (:code,:kind,:value,:min_total,:max_amount,:usage_limit,:times_used,:starts_at,\
 :expires_at,:member_only) ON DUPLICATE KEY UPDATE `kind`=:kind,`value`=:value,\
 `min_order_total`=:min_total,`max_discount_amount`=:max_amount,`usage_limit`=:usage_limit,\
 `starts_at`=:starts_at,`expires_at`=:expires_at,`member_only`=:member_only";
        let params_arg = params! {
            "code" => discount.code.as_str(),
            "kind" => discount.kind.as_str(),
            "value" => discount.value,
            "min_total" => discount.min_order_total,
            "max_amount" => discount.max_discount_amount,
            "usage_limit" => discount.usage_limit,
            "times_used" => discount.times_used,
            "starts_at" => fmt_datetime(discount.starts_at),
            "expires_at" => fmt_datetime(discount.expires_at),
            "member_only" => discount.member_only,
        };
        let mut conn = self._acquire(AppRepoErrorFnLabel::SaveDiscount).await?;
        stmt.with(params_arg)
            .run::<&mut Conn>(&mut conn)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::SaveDiscount,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        Ok(())
    } // end of fn save_discount

    async fn list_discounts(
        &self,
        window: ListWindowDto,
    ) -> Result<Vec<DiscountCodeModel>, AppRepoError> {
        let stmt = format!(
            "SELECT {} FROM `discount_code` ORDER BY `expires_at` DESC LIMIT {},{}",
            DISCOUNT_COLUMNS, window.offset, window.limit
        );
        let mut conn = self._acquire(AppRepoErrorFnLabel::ListDiscounts).await?;
        let exec = &mut conn;
        let rows = stmt
            .with(mysql_async::Params::Empty)
            .fetch::<DiscountRowType, &mut Conn>(exec)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::ListDiscounts,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let obj = discount_from_row(row).map_err(|(code, detail)| {
                self._err(AppRepoErrorFnLabel::ListDiscounts, code, detail)
            })?;
            out.push(obj);
        }
        Ok(out)
    } // end of fn list_discounts

    async fn save_member_promotion(
        &self,
        promo: &MemberPromotionModel,
    ) -> Result<(), AppRepoError> {
        let stmt = "INSERT INTO `member_promotion`(`product_id`,`regular_price`,`member_price`,\
 `starts_at`,`expires_at`) VALUES (:product_id,:regular,:member,:starts_at,:expires_at) \
 ON DUPLICATE KEY UPDATE `regular_price`=:regular,`member_price`=:member,\
 `starts_at`=:starts_at,`expires_at`=:expires_at";
        let params_arg = params! {
            "product_id" => promo.product_id,
            "regular" => promo.regular_price,
            "member" => promo.member_price,
            "starts_at" => fmt_datetime(promo.starts_at),
            "expires_at" => fmt_datetime(promo.expires_at),
        };
        let mut conn = self
            ._acquire(AppRepoErrorFnLabel::SaveMemberPromotion)
            .await?;
        stmt.with(params_arg)
            .run::<&mut Conn>(&mut conn)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::SaveMemberPromotion,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        Ok(())
    } // end of fn save_member_promotion
} // end of impl MariadbDiscountRepo
