use serde::{Deserialize, Serialize};

#[rustfmt::skip]
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum CountryCode { MY, SG, TH, ID, BN, Unknown }

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> String {
        let out = match value {
            CountryCode::MY => "MY",
            CountryCode::SG => "SG",
            CountryCode::TH => "TH",
            CountryCode::ID => "ID",
            CountryCode::BN => "BN",
            CountryCode::Unknown => "Unknown",
        };
        out.to_string()
    }
}
impl From<&str> for CountryCode {
    fn from(value: &str) -> Self {
        match value {
            "MY" => Self::MY,
            "SG" => Self::SG,
            "TH" => Self::TH,
            "ID" => Self::ID,
            "BN" => Self::BN,
            _others => Self::Unknown,
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[rustfmt::skip]
#[derive(Deserialize, Serialize, Debug, Clone, Hash, Eq, PartialEq)]
pub enum CurrencyDto { MYR, SGD, USD, Unknown }

impl CurrencyDto {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MYR => "MYR",
            Self::SGD => "SGD",
            Self::USD => "USD",
            Self::Unknown => "Unknown",
        }
    }

    /// number of digits allowed in the fraction part of an amount,
    /// sen / cents for all currencies this platform accepts
    pub fn amount_fraction_scale(&self) -> u32 {
        match self {
            Self::MYR | Self::SGD | Self::USD => 2,
            Self::Unknown => 0,
        }
    }
}

impl From<&String> for CurrencyDto {
    fn from(value: &String) -> Self {
        match value.as_str() {
            "MYR" => Self::MYR,
            "SGD" => Self::SGD,
            "USD" => Self::USD,
            _others => Self::Unknown,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PhoneNumberDto {
    pub nation: u16,
    pub number: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ContactDto {
    pub first_name: String,
    pub last_name: String,
    pub emails: Vec<String>,
    pub phones: Vec<PhoneNumberDto>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PhyAddrDto {
    pub country: CountryCode,
    pub state: String,
    pub city: String,
    pub postcode: String,
    pub street_name: Option<String>,
    pub detail: String,
}

/// paging window shared by admin listing endpoints
#[derive(Deserialize, Serialize)]
pub struct ListWindowDto {
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "ListWindowDto::default_limit")]
    pub limit: u16,
}

impl ListWindowDto {
    fn default_limit() -> u16 {
        25
    }
}

#[derive(Deserialize, Serialize)]
pub struct GenericRangeErrorDto {
    pub max_: u16,
    pub min_: u16,
    pub given: u32,
}
