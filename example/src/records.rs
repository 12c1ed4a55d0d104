//! Credit-card account records for the demo dataset.

use gower::schema::Attribute;
use serde::Deserialize;

/// One account row from the demo JSON dataset. `null` fields are missing
/// values to be imputed before clustering.
#[derive(Clone, Debug, Deserialize)]
pub struct CustomerAccount {
    pub customer_id: String,
    pub balance: Option<f64>,
    pub purchases: Option<f64>,
    pub cash_advance: Option<f64>,
    pub credit_limit: Option<f64>,
    pub payments: Option<f64>,
    pub cash_advance_trx: Option<i64>,
    pub purchase_trx: Option<i64>,
    pub tenure: Option<i64>,
    #[serde(default)]
    pub label: Option<usize>,
    #[serde(default)]
    pub is_center: bool,
}

/// Attribute declarations for the schema. Declaration order fixes feature
/// order.
pub fn attributes() -> Vec<Attribute<CustomerAccount>> {
    vec![
        Attribute::Text {
            name: "customer_id",
            get: |r| r.customer_id.clone(),
        },
        Attribute::Float {
            name: "balance",
            get: |r| r.balance,
            set: |r, v| r.balance = Some(v),
        },
        Attribute::Float {
            name: "purchases",
            get: |r| r.purchases,
            set: |r, v| r.purchases = Some(v),
        },
        Attribute::Float {
            name: "cash_advance",
            get: |r| r.cash_advance,
            set: |r, v| r.cash_advance = Some(v),
        },
        Attribute::Float {
            name: "credit_limit",
            get: |r| r.credit_limit,
            set: |r, v| r.credit_limit = Some(v),
        },
        Attribute::Float {
            name: "payments",
            get: |r| r.payments,
            set: |r, v| r.payments = Some(v),
        },
        Attribute::Integer {
            name: "cash_advance_trx",
            get: |r| r.cash_advance_trx,
            set: |r, v| r.cash_advance_trx = Some(v),
        },
        Attribute::Integer {
            name: "purchase_trx",
            get: |r| r.purchase_trx,
            set: |r, v| r.purchase_trx = Some(v),
        },
        Attribute::Integer {
            name: "tenure",
            get: |r| r.tenure,
            set: |r, v| r.tenure = Some(v),
        },
        Attribute::Label {
            name: "label",
            get: |r| r.label,
            set: |r, v| r.label = Some(v),
        },
        Attribute::Flag {
            name: "is_center",
            get: |r| r.is_center,
            set: |r, v| r.is_center = v,
        },
    ]
}

/// Blank record for synthetic centroids.
pub fn blank() -> CustomerAccount {
    CustomerAccount {
        customer_id: String::new(),
        balance: None,
        purchases: None,
        cash_advance: None,
        credit_limit: None,
        payments: None,
        cash_advance_trx: None,
        purchase_trx: None,
        tenure: None,
        label: None,
        is_center: false,
    }
}
