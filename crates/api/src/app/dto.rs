use serde::Deserialize;

use voucherdesk_customers::Customer;
use voucherdesk_vouchers::{Voucher, VoucherType};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateVoucherRequest {
    pub voucher_type: VoucherType,
    pub value: i64,
    pub customer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeOwnerRequest {
    pub customer_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterCustomerRequest {
    pub name: String,
    pub email: String,
}

// -------------------------
// Response mapping
// -------------------------

pub fn voucher_to_json(v: &Voucher) -> serde_json::Value {
    serde_json::json!({
        "id": v.id_typed().map(|id| id.to_string()),
        "voucher_type": v.voucher_type().as_str(),
        "value": v.value(),
        "created_at": v.created_at().to_rfc3339(),
        "customer_id": v.customer_id().map(|id| id.to_string()),
    })
}

pub fn customer_to_json(c: &Customer) -> serde_json::Value {
    serde_json::json!({
        "id": c.id_typed().to_string(),
        "name": c.name(),
        "email": c.email(),
        "created_at": c.created_at().to_rfc3339(),
    })
}
