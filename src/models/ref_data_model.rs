use serde::{Deserialize, Serialize};

pub const PAYMENT_SOURCE_CATEGORY: &str = "paymentSource";
pub const FEE_REDUCTION_TYPE_CATEGORY: &str = "feeReductionType";
pub const COMPLAINANT_CATEGORY: &str = "complainantCategory";
pub const COMPLAINT_ORIGIN_CATEGORY: &str = "complaintOrigin";
pub const COMPENSATION_TYPE_CATEGORY: &str = "compensationType";

/// A reference data entry: a stable `handle` and its display `label`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefDataItem {
    pub handle: String,
    pub label: String,
    #[serde(default, rename = "userSelectable")]
    pub user_selectable: bool,
}

impl RefDataItem {
    pub fn new(handle: &str, label: &str) -> Self {
        Self {
            handle: handle.to_string(),
            label: label.to_string(),
            user_selectable: true,
        }
    }
}

/// The label for `handle`, or the handle itself when it is not in `items`.
pub fn translate<'a>(items: &'a [RefDataItem], handle: &'a str) -> &'a str {
    items
        .iter()
        .find(|item| item.handle == handle)
        .map(|item| item.label.as_str())
        .unwrap_or(handle)
}

pub fn contains(items: &[RefDataItem], handle: &str) -> bool {
    items.iter().any(|item| item.handle == handle)
}
