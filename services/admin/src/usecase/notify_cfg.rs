use std::boxed::Box;
use std::sync::Arc;

use crate::adapter::notify::AbstractChatNotifier;
use crate::adapter::repository::{AbstractSettingsRepo, AppRepoError};
use crate::model::{ChannelPurpose, NotifyChannelError, TelegramChannelModel};

pub enum NotifyCfgUcError {
    ValidationFailure(Vec<String>),
    TestMessageFailed(String),
    DataStoreError(AppRepoError),
}

impl From<AppRepoError> for NotifyCfgUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

pub struct NotifyCfgUseCase {
    pub repo: Box<dyn AbstractSettingsRepo>,
    pub notifier: Arc<Box<dyn AbstractChatNotifier>>,
}

impl NotifyCfgUseCase {
    pub async fn read_channels(&self) -> Result<Vec<TelegramChannelModel>, NotifyCfgUcError> {
        let out = self.repo.fetch_channels().await?;
        Ok(out)
    }

    pub async fn save_channel(
        &self,
        purpose_raw: &str,
        chat_id: i64,
        enabled: bool,
        send_test_message: bool,
    ) -> Result<TelegramChannelModel, NotifyCfgUcError> {
        let purpose = ChannelPurpose::try_from_raw(purpose_raw)
            .map_err(|e| NotifyCfgUcError::ValidationFailure(vec![Self::describe(e)]))?;
        let channel = TelegramChannelModel {
            purpose,
            chat_id,
            enabled,
        };
        channel
            .validate()
            .map_err(|e| NotifyCfgUcError::ValidationFailure(vec![Self::describe(e)]))?;
        self.repo.save_channel(&channel).await?;
        if send_test_message && enabled {
            let text = format!(
                "notification channel `{}` configured",
                channel.purpose.as_str()
            );
            self.notifier
                .send_message(channel.chat_id, text.as_str())
                .await
                .map_err(|e| NotifyCfgUcError::TestMessageFailed(format!("{:?}", e.reason)))?;
        }
        Ok(channel)
    } // end of fn save_channel

    fn describe(e: NotifyChannelError) -> String {
        match e {
            NotifyChannelError::UnknownPurpose(p) => format!("unknown channel purpose `{p}`"),
            NotifyChannelError::InvalidChatId(id) => format!("invalid telegram chat id {id}"),
        }
    }
} // end of impl NotifyCfgUseCase
