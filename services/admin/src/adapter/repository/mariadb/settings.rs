use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use mysql_async::prelude::{Query, Queryable, WithParams};
use mysql_async::{params, Conn};

use bazaar_common::api::dto::{CountryCode, PhyAddrDto};
use bazaar_common::error::AppErrorCode;

use super::super::{
    AbstractSettingsRepo, AppRepoError, AppRepoErrorDetail, AppRepoErrorFnLabel,
};
use super::log_and_wrap_err;
use crate::adapter::datastore::{AppDStoreMariaDB, AppDataStoreContext};
use crate::model::{ChannelPurpose, PickupAddressModel, TelegramChannelModel};

#[rustfmt::skip]
type ProfileRowType = (
    String,                     // `sender_name`
    String,                     // `phone`
    String,                     // `country`
    String,                     // `state`
    String,                     // `city`
    String,                     // `postcode`
    Option<String>,             // `street`
    String,                     // `detail`
);

type ChannelRowType = (String, i64, bool);

pub(crate) struct MariadbSettingsRepo {
    _dstore: Arc<AppDStoreMariaDB>,
}

impl MariadbSettingsRepo {
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
} // end of impl MariadbSettingsRepo

#[async_trait]
impl AbstractSettingsRepo for MariadbSettingsRepo {
    async fn fetch_pickup_address(&self) -> Result<Option<PickupAddressModel>, AppRepoError> {
        let stmt = "SELECT `sender_name`,`phone`,`country`,`state`,`city`,`postcode`,`street`,\
 `detail` FROM `store_profile` LIMIT 1";
        let mut conn = self
            ._acquire(AppRepoErrorFnLabel::FetchPickupAddress)
            .await?;
        let exec = &mut conn;
        let maybe_row = stmt
            .with(mysql_async::Params::Empty)
            .first::<ProfileRowType, &mut Conn>(exec)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::FetchPickupAddress,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        let out = maybe_row.map(
            |(sender_name, phone, country, state, city, postcode, street_name, detail)| {
                PickupAddressModel {
                    sender_name,
                    phone,
                    address: PhyAddrDto {
                        country: CountryCode::from(country.as_str()),
                        state,
                        city,
                        postcode,
                        street_name,
                        detail,
                    },
                }
            },
        );
        Ok(out)
    } // end of fn fetch_pickup_address

    async fn fetch_channels(&self) -> Result<Vec<TelegramChannelModel>, AppRepoError> {
        let stmt = "SELECT `purpose`,`chat_id`,`enabled` FROM `telegram_channel`";
        let mut conn = self
            ._acquire(AppRepoErrorFnLabel::FetchNotifyChannels)
            .await?;
        let exec = &mut conn;
        let rows = stmt
            .with(mysql_async::Params::Empty)
            .fetch::<ChannelRowType, &mut Conn>(exec)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::FetchNotifyChannels,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        let mut out = Vec::with_capacity(rows.len());
        for (purpose_raw, chat_id, enabled) in rows {
            let purpose = ChannelPurpose::try_from_raw(purpose_raw.as_str()).map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::FetchNotifyChannels,
                    AppErrorCode::DataCorruption,
                    AppRepoErrorDetail::DataRowParse(format!("{e:?}")),
                )
            })?;
            out.push(TelegramChannelModel {
                purpose,
                chat_id,
                enabled,
            });
        }
        Ok(out)
    } // end of fn fetch_channels

    async fn save_channel(&self, channel: &TelegramChannelModel) -> Result<(), AppRepoError> {
        let stmt = "INSERT INTO `telegram_channel`(`purpose`,`chat_id`,`enabled`) VALUES \
 (:purpose,:chat_id,:enabled) ON DUPLICATE KEY UPDATE `chat_id`=:chat_id,`enabled`=:enabled";
        let params_arg = params! {
            "purpose" => channel.purpose.as_str(),
            "chat_id" => channel.chat_id,
            "enabled" => channel.enabled,
        };
        let mut conn = self._acquire(AppRepoErrorFnLabel::SaveNotifyChannel).await?;
        stmt.with(params_arg)
            .run::<&mut Conn>(&mut conn)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::SaveNotifyChannel,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        Ok(())
    } // end of fn save_channel
} // end of impl MariadbSettingsRepo
