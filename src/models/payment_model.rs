use crate::forms::FormValues;
use crate::models::error_model::{add_reason, required, FieldErrors};
use crate::models::ref_data_model::{self, RefDataItem};
use crate::types::{DateString, MoneyError, Pence};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Source recorded against a payment that is really a fee reduction.
pub const FEE_REDUCTION_SOURCE: &str = "FEE_REDUCTION";

/// A payment or fee reduction recorded against a case.
///
/// # Fields
/// - `id` - The payment id
/// - `case` - The case the payment belongs to
/// - `source` - Handle of the payment source, `FEE_REDUCTION` for reductions
/// - `amount` - Amount in pence; reductions have none
/// - `payment_date` - When the payment was made
/// - `fee_reduction_type` - Handle of the reduction type, for reductions
/// - `payment_evidence` - Free text evidence, for reductions
/// - `locked` - Locked payments can no longer be edited
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,
    #[serde(default, skip_serializing)]
    pub case: PaymentCase,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub amount: Option<Pence>,
    #[serde(default)]
    pub payment_date: DateString,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fee_reduction_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payment_evidence: String,
    #[serde(default, skip_serializing)]
    pub locked: bool,
}

fn is_zero(id: &i64) -> bool {
    *id == 0
}

/// The case reference embedded in a payment.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCase {
    pub id: i64,
}

impl Payment {
    pub fn is_fee_reduction(&self) -> bool {
        self.source == FEE_REDUCTION_SOURCE
    }
}

/// Payments for a case split into money received and fee reductions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PaymentSummary {
    pub payments: Vec<Payment>,
    pub fee_reductions: Vec<Payment>,
    pub total_paid: Pence,
}

impl PaymentSummary {
    pub fn from_payments(all: Vec<Payment>) -> Self {
        let (fee_reductions, payments): (Vec<Payment>, Vec<Payment>) =
            all.into_iter().partition(Payment::is_fee_reduction);

        let total_paid = payments.iter().filter_map(|payment| payment.amount).sum();

        Self {
            payments,
            fee_reductions,
            total_paid,
        }
    }
}

/// A fee reduction to apply to a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeReduction {
    pub source: &'static str,
    pub fee_reduction_type: String,
    pub payment_evidence: String,
    pub payment_date: DateString,
}

impl FeeReduction {
    pub fn from_form(form: &FormValues) -> Self {
        Self {
            source: FEE_REDUCTION_SOURCE,
            fee_reduction_type: form.post_string("feeReductionType"),
            payment_evidence: form.post_string("paymentEvidence"),
            payment_date: form.post_date("paymentDate"),
        }
    }

    /// The editable part of an existing fee reduction.
    pub fn from_payment(payment: &Payment) -> Self {
        Self {
            source: FEE_REDUCTION_SOURCE,
            fee_reduction_type: payment.fee_reduction_type.clone(),
            payment_evidence: payment.payment_evidence.clone(),
            payment_date: payment.payment_date.clone(),
        }
    }
}

/// Checks a fee reduction before it is sent to the API.
///
/// The type must be one of `types`, evidence must be given and the date must
/// be a real date no later than `today`.
pub fn validate_fee_reduction(
    reduction: &FeeReduction,
    types: &[RefDataItem],
    today: NaiveDate,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if reduction.fee_reduction_type.is_empty() {
        required(&mut errors, "feeReductionType");
    } else if !ref_data_model::contains(types, &reduction.fee_reduction_type) {
        add_reason(&mut errors, "feeReductionType", "Please select a valid fee reduction type");
    }

    if reduction.payment_evidence.is_empty() {
        required(&mut errors, "paymentEvidence");
    }

    if reduction.payment_date.is_empty() {
        required(&mut errors, "paymentDate");
    } else {
        match reduction.payment_date.as_naive_date() {
            Ok(date) if date > today => {
                add_reason(&mut errors, "paymentDate", "Date must not be in the future")
            }
            Ok(_) => {}
            Err(_) => add_reason(&mut errors, "paymentDate", "Please enter a valid date"),
        }
    }

    errors
}

/// Checks a new payment, returning the amount in pence when it is valid.
///
/// An invalid amount is reported together with any missing source or date.
pub fn validate_new_payment(
    amount: &str,
    source: &str,
    payment_date: &DateString,
) -> Result<Pence, FieldErrors> {
    match Pence::parse_pounds(amount) {
        Ok(pence) => Ok(pence),
        Err(MoneyError::InvalidAmount) => {
            let mut errors = FieldErrors::new();
            add_reason(&mut errors, "amount", &MoneyError::InvalidAmount.to_string());
            if source.is_empty() {
                required(&mut errors, "source");
            }
            if payment_date.is_empty() {
                required(&mut errors, "paymentDate");
            }
            Err(errors)
        }
    }
}
