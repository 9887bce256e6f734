#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPurpose {
    Orders,
    Chat,
    System,
}

impl ChannelPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orders => "ORDERS",
            Self::Chat => "CHAT",
            Self::System => "SYSTEM",
        }
    }
    pub fn try_from_raw(raw: &str) -> Result<Self, NotifyChannelError> {
        match raw {
            "ORDERS" => Ok(Self::Orders),
            "CHAT" => Ok(Self::Chat),
            "SYSTEM" => Ok(Self::System),
            _others => Err(NotifyChannelError::UnknownPurpose(raw.to_string())),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum NotifyChannelError {
    UnknownPurpose(String),
    InvalidChatId(i64),
}

/// one Telegram destination per purpose, the bot token itself never
/// lands in the database, it stays in the confidentiality store
pub struct TelegramChannelModel {
    pub purpose: ChannelPurpose,
    pub chat_id: i64,
    pub enabled: bool,
}

impl TelegramChannelModel {
    /// group / supergroup ids are negative (supergroups start with -100),
    /// direct-message ids are positive, zero is never valid
    pub fn validate(&self) -> Result<(), NotifyChannelError> {
        if self.chat_id == 0 {
            Err(NotifyChannelError::InvalidChatId(self.chat_id))
        } else {
            Ok(())
        }
    }
}
