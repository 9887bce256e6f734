use serde::{Deserialize, Serialize};

// wire types of the courier aggregator's bulk-order API, all requests go
// out form-encoded with the account API key as an ordinary field

pub(super) const API_STATUS_OK: &str = "Success";
pub(super) const ERROR_CODE_OK: &str = "0";
// credit too low to pay the quoted shipment
pub(super) const ERROR_CODE_INSUFFICIENT_CREDIT: &str = "1001";

#[derive(Serialize)]
pub(super) struct SubmitShipmentReq {
    pub api: String,
    pub service_id: String,
    pub collect_date: String, // YYYY-MM-DD
    pub weight: String,       // kilograms
    pub reference: String,    // platform order number
    pub pick_name: String,
    pub pick_contact: String,
    pub pick_addr1: String,
    pub pick_addr2: Option<String>,
    pub pick_city: String,
    pub pick_state: String,
    pub pick_code: String,
    pub pick_country: String,
    pub send_name: String,
    pub send_contact: Option<String>,
    pub send_email: String,
    pub send_addr1: String,
    pub send_addr2: Option<String>,
    pub send_city: String,
    pub send_state: String,
    pub send_code: String,
    pub send_country: String,
}

#[derive(Deserialize)]
pub(super) struct SubmitShipmentResp {
    pub api_status: String,
    pub error_code: String,
    pub error_remark: String,
    pub result: Option<SubmitShipmentResult>,
}

#[derive(Deserialize)]
pub(super) struct SubmitShipmentResult {
    pub order_no: String,
    pub courier: String,
    pub price: String,
}

#[derive(Serialize)]
pub(super) struct PayShipmentReq {
    pub api: String,
    pub order_no: String,
}

#[derive(Deserialize)]
pub(super) struct PayShipmentResp {
    pub api_status: String,
    pub error_code: String,
    pub error_remark: String,
    pub result: Option<PayShipmentResult>,
}

#[derive(Deserialize)]
pub(super) struct PayShipmentResult {
    pub order_no: String,
    pub parcels: Vec<ParcelReceipt>,
}

#[derive(Deserialize)]
pub(super) struct ParcelReceipt {
    pub parcel_no: String,
    pub awb: String,
    pub awb_id_link: Option<String>,
    pub tracking_no: String,
}

#[derive(Serialize)]
pub(super) struct CheckBalanceReq {
    pub api: String,
}

#[derive(Deserialize)]
pub(super) struct CheckBalanceResp {
    pub api_status: String,
    pub error_code: String,
    pub error_remark: String,
    pub result: Option<String>, // stringified decimal credit balance
}
