use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    Percentage,
    FixedAmount,
    FreeShipping,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "PERCENTAGE",
            Self::FixedAmount => "FIXED_AMOUNT",
            Self::FreeShipping => "FREE_SHIPPING",
        }
    }
    pub fn try_from_raw(raw: &str) -> Result<Self, DiscountInvalidReason> {
        match raw {
            "PERCENTAGE" => Ok(Self::Percentage),
            "FIXED_AMOUNT" => Ok(Self::FixedAmount),
            "FREE_SHIPPING" => Ok(Self::FreeShipping),
            _others => Err(DiscountInvalidReason::UnknownKind(raw.to_string())),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum DiscountInvalidReason {
    EmptyCode,
    UnknownKind(String),
    PercentOutOfRange(Decimal),
    NonPositiveValue(Decimal),
    WindowReversed,
    UsageBelowConsumed { limit: u32, used: u32 },
    NonPositivePrice(Decimal),
    MemberPriceNotBelowRegular { member: Decimal, regular: Decimal },
}

impl DiscountInvalidReason {
    /// human-readable form rendered directly in admin screens
    pub fn describe(&self) -> String {
        match self {
            Self::EmptyCode => "discount code must not be empty".to_string(),
            Self::UnknownKind(k) => format!("unknown discount type: {k}"),
            Self::PercentOutOfRange(v) => {
                format!("percentage discount must lie in 1..=100, given {v}")
            }
            Self::NonPositiveValue(v) => format!("discount value must be positive, given {v}"),
            Self::WindowReversed => "validity window ends before it starts".to_string(),
            Self::UsageBelowConsumed { limit, used } => {
                format!("usage limit {limit} lies below the {used} redemptions already made")
            }
            Self::NonPositivePrice(v) => format!("price must be positive, given {v}"),
            Self::MemberPriceNotBelowRegular { member, regular } => {
                format!("member price {member} must be less than regular price {regular}")
            }
        }
    } // end of fn describe
}

pub struct DiscountCodeModel {
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_order_total: Option<Decimal>,
    pub max_discount_amount: Option<Decimal>,
    pub usage_limit: Option<u32>,
    pub times_used: u32,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub member_only: bool,
}

impl DiscountCodeModel {
    pub fn validate(&self) -> Vec<DiscountInvalidReason> {
        let mut out = Vec::new();
        if self.code.trim().is_empty() {
            out.push(DiscountInvalidReason::EmptyCode);
        }
        match self.kind {
            DiscountKind::Percentage => {
                let hundred = Decimal::new(100, 0);
                if self.value < Decimal::ONE || self.value > hundred {
                    out.push(DiscountInvalidReason::PercentOutOfRange(self.value));
                }
            }
            DiscountKind::FixedAmount => {
                if self.value <= Decimal::ZERO {
                    out.push(DiscountInvalidReason::NonPositiveValue(self.value));
                }
            }
            DiscountKind::FreeShipping => {} // value unused for this kind
        }
        if self.starts_at >= self.expires_at {
            out.push(DiscountInvalidReason::WindowReversed);
        }
        if let Some(limit) = self.usage_limit {
            if limit < self.times_used {
                out.push(DiscountInvalidReason::UsageBelowConsumed {
                    limit,
                    used: self.times_used,
                });
            }
        }
        out
    } // end of fn validate
}

/// product-scoped price tier for members, the member price MUST stay
/// strictly below the regular price
pub struct MemberPromotionModel {
    pub product_id: u64,
    pub regular_price: Decimal,
    pub member_price: Decimal,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl MemberPromotionModel {
    pub fn validate(&self) -> Vec<DiscountInvalidReason> {
        let mut out = Vec::new();
        if self.regular_price <= Decimal::ZERO {
            out.push(DiscountInvalidReason::NonPositivePrice(self.regular_price));
        }
        if self.member_price <= Decimal::ZERO {
            out.push(DiscountInvalidReason::NonPositivePrice(self.member_price));
        }
        if self.member_price >= self.regular_price {
            out.push(DiscountInvalidReason::MemberPriceNotBelowRegular {
                member: self.member_price,
                regular: self.regular_price,
            });
        }
        if self.starts_at >= self.expires_at {
            out.push(DiscountInvalidReason::WindowReversed);
        }
        out
    } // end of fn validate
}
