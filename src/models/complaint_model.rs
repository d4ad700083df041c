use crate::forms::FormValues;
use crate::models::error_model::{add_reason, required, FieldErrors};
use crate::types::DateString;
use serde::{Deserialize, Serialize};

const NOT_APPLICABLE: &str = "NOT_APPLICABLE";

/// Fields that must be filled in before a complaint can be resolved.
pub const RESOLUTION_REQUIRED_FIELDS: [&str; 10] = [
    "category",
    "severity",
    "investigatingOfficer",
    "complainantName",
    "origin",
    "compensationType",
    "summary",
    "resolutionDate",
    "receivedDate",
    "complainantCategory",
];

/// A complaint category and the subcategories that may be filed under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplaintCategory {
    pub code: &'static str,
    pub label: &'static str,
    pub subcategories: &'static [(&'static str, &'static str)],
}

pub static COMPLAINT_CATEGORIES: &[ComplaintCategory] = &[
    ComplaintCategory {
        code: "01",
        label: "Correspondence",
        subcategories: &[
            ("01", "Letter not received"),
            ("02", "Incorrect information"),
            ("07", "Delay in response"),
            ("08", "Tone of letter"),
        ],
    },
    ComplaintCategory {
        code: "02",
        label: "OPG Decisions",
        subcategories: &[
            ("18", "Fee Decision"),
            ("19", "Registration Decision"),
            ("20", "Investigation Decision"),
            ("21", "Refusal to Register"),
        ],
    },
    ComplaintCategory {
        code: "03",
        label: "Quality of Service",
        subcategories: &[
            ("24", "Staff Conduct"),
            ("25", "Telephone Service"),
            ("26", "Website"),
            ("27", "Processing Delay"),
        ],
    },
    ComplaintCategory {
        code: "04",
        label: "Data Protection",
        subcategories: &[
            ("31", "Disclosure of Information"),
            ("32", "Subject Access Request"),
            ("33", "Data Breach"),
            ("34", "Data Accuracy"),
        ],
    },
    ComplaintCategory {
        code: "05",
        label: "Other",
        subcategories: &[("40", "Policy"), ("41", "Legislation"), ("42", "Other")],
    },
];

/// Looks up a complaint category by its code.
pub fn complaint_category(code: &str) -> Option<&'static ComplaintCategory> {
    COMPLAINT_CATEGORIES.iter().find(|category| category.code == code)
}

impl ComplaintCategory {
    pub fn has_subcategory(&self, code: &str) -> bool {
        self.subcategories.iter().any(|(sub, _)| *sub == code)
    }

    pub fn subcategory_label(&self, code: &str) -> Option<&'static str> {
        self.subcategories
            .iter()
            .find(|(sub, _)| *sub == code)
            .map(|(_, label)| *label)
    }
}

/// Picks the submitted subcategory that belongs to `category`.
///
/// The form posts one subcategory select per category, so several values can
/// arrive; only one of them can be under the chosen category.
pub fn valid_subcategory<'a>(category: &str, submitted: &[&'a str]) -> Option<&'a str> {
    let category = complaint_category(category)?;

    submitted.iter().copied().find(|code| category.has_subcategory(code))
}

/// A complaint as sent to and received from the API.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub received_date: DateString,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub investigating_officer: String,
    #[serde(default)]
    pub complainant_name: String,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default)]
    pub complainant_category: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub compensation_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub compensation_amount: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resolution: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resolution_info: String,
    #[serde(default, skip_serializing_if = "DateString::is_empty")]
    pub resolution_date: DateString,
}

impl Complaint {
    /// Builds a complaint from a posted add or edit form.
    ///
    /// The compensation amount field is named after the compensation type
    /// (`compensationAmountCOMPENSATORY`, ...) and is ignored when no
    /// compensation applies.
    pub fn from_form(form: &FormValues) -> Self {
        let category = form.post_string("category");
        let sub_category = valid_subcategory(&category, &form.post_all("subCategory"))
            .unwrap_or_default()
            .to_string();
        let compensation_type = form.post_string("compensationType");
        let compensation_amount =
            if compensation_type.is_empty() || compensation_type == NOT_APPLICABLE {
                String::new()
            } else {
                form.post_string(&format!("compensationAmount{compensation_type}"))
            };

        Self {
            category,
            description: form.post_string("description"),
            received_date: form.post_date("receivedDate"),
            severity: form.post_string("severity"),
            investigating_officer: form.post_string("investigatingOfficer"),
            complainant_name: form.post_string("complainantName"),
            sub_category,
            complainant_category: form.post_string("complainantCategory"),
            origin: form.post_string("origin"),
            compensation_type,
            compensation_amount,
            summary: form.post_string("summary"),
            resolution: form.post_string("resolution"),
            resolution_info: form.post_string("resolutionInfo"),
            resolution_date: form.post_date("resolutionDate"),
        }
    }

    pub fn category_label(&self) -> &str {
        complaint_category(&self.category)
            .map(|category| category.label)
            .unwrap_or(self.category.as_str())
    }
}

/// Checks a posted complaint form before it is sent to the API.
///
/// A resolved complaint needs every field in [`RESOLUTION_REQUIRED_FIELDS`];
/// a chosen category needs a subcategory that belongs to it.
pub fn validate_complaint_form(form: &FormValues) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if !form.post_string("resolution").is_empty() {
        for field in RESOLUTION_REQUIRED_FIELDS {
            if form.post_string(field).is_empty() {
                required(&mut errors, field);
            }
        }
    }

    let category = form.post_string("category");
    if !category.is_empty()
        && valid_subcategory(&category, &form.post_all("subCategory")).is_none()
    {
        add_reason(&mut errors, "subCategory", "Please select a subcategory");
    }

    errors
}
