use crate::types::DateString;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const DIGITAL_LPA: &str = "DIGITAL_LPA";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CaseErr {
    #[error("could not parse case type {0:?}")]
    UnknownCaseType(String),
    #[error("no cases selected")]
    NoCasesSelected,
}

/// The kind of case a complaint or allocation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseType {
    Lpa,
    Epa,
    DigitalLpa,
}

impl CaseType {
    /// Parses the `case` request parameter (`lpa`, `epa` or `digital_lpa`).
    pub fn parse(raw: &str) -> Result<Self, CaseErr> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lpa" => Ok(CaseType::Lpa),
            "epa" => Ok(CaseType::Epa),
            "digital_lpa" => Ok(CaseType::DigitalLpa),
            _ => Err(CaseErr::UnknownCaseType(raw.to_string())),
        }
    }

    /// Path segment used by the API for this case type.
    pub fn api_path(self) -> &'static str {
        match self {
            CaseType::Lpa => "lpas",
            CaseType::Epa => "epas",
            CaseType::DigitalLpa => "digital-lpas",
        }
    }
}

impl Display for CaseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CaseType::Lpa => "LPA",
            CaseType::Epa => "EPA",
            CaseType::DigitalLpa => DIGITAL_LPA,
        };
        f.write_str(name)
    }
}

/// A case as returned by the API.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: i64,
    #[serde(rename = "uId", default)]
    pub uid: String,
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub receipt_date: DateString,
    #[serde(default)]
    pub registration_date: DateString,
}

impl Case {
    /// How the case is referred to on pages, e.g. `LPA 7000-0000-0000`.
    pub fn entity(&self) -> String {
        format!("{} {}", self.case_type, self.uid)
    }

    pub fn is_digital_lpa(&self) -> bool {
        self.case_type == DIGITAL_LPA
    }

    /// The payments page for this case.
    pub fn payments_url(&self) -> String {
        if self.is_digital_lpa() {
            format!("/lpa/{}/payments", self.uid)
        } else {
            format!("/payments/{}", self.id)
        }
    }
}

/// One case in a bulk allocation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAllocation {
    pub id: i64,
    pub case_type: String,
}

impl From<&Case> for CaseAllocation {
    fn from(case: &Case) -> Self {
        Self {
            id: case.id,
            case_type: case.case_type.clone(),
        }
    }
}

/// A team cases can be allocated to.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    #[serde(default)]
    pub display_name: String,
}

/// Who a set of cases is being allocated to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignee {
    User { id: i64, name: String },
    Team { id: i64 },
    Unset,
}

impl Assignee {
    /// Reads the assignee from the `assignTo` choice and the matching field.
    ///
    /// A user is posted as `id:display name`; a team as its id. Anything that
    /// does not parse is `Unset` and left for the API to reject.
    pub fn from_form(assign_to: &str, assignee_user: &str, assignee_team: &str) -> Self {
        match assign_to {
            "user" => assignee_user
                .split_once(':')
                .and_then(|(id, name)| {
                    id.trim().parse().ok().map(|id| Assignee::User {
                        id,
                        name: name.to_string(),
                    })
                })
                .unwrap_or(Assignee::Unset),
            "team" => assignee_team
                .trim()
                .parse()
                .map(|id| Assignee::Team { id })
                .unwrap_or(Assignee::Unset),
            _ => Assignee::Unset,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Assignee::User { id, .. } | Assignee::Team { id } => *id,
            Assignee::Unset => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_type() {
        assert_eq!(CaseType::parse("lpa"), Ok(CaseType::Lpa));
        assert_eq!(CaseType::parse("EPA"), Ok(CaseType::Epa));
        assert_eq!(CaseType::parse("digital_lpa"), Ok(CaseType::DigitalLpa));
        assert_eq!(
            CaseType::parse("deputyship"),
            Err(CaseErr::UnknownCaseType("deputyship".to_string()))
        );
        assert_eq!(CaseType::DigitalLpa.to_string(), "DIGITAL_LPA");
    }

    #[test]
    fn test_deserialize_case() {
        let case: Case = serde_json::from_str(
            r#"{"id":800,"uId":"7000-0000-0000","caseType":"LPA","receiptDate":"05\/04\/2022"}"#,
        )
        .unwrap();

        assert_eq!(case.entity(), "LPA 7000-0000-0000");
        assert_eq!(case.receipt_date.as_str(), "2022-04-05");
        assert!(case.registration_date.is_empty());
    }

    #[test]
    fn test_payments_url() {
        let lpa = Case {
            id: 4,
            uid: "7000-0000-0001".to_string(),
            case_type: "LPA".to_string(),
            ..Default::default()
        };
        let digital = Case {
            id: 5,
            uid: "M-AAAA-BBBB-CCCC".to_string(),
            case_type: DIGITAL_LPA.to_string(),
            ..Default::default()
        };

        assert_eq!(lpa.payments_url(), "/payments/4");
        assert_eq!(digital.payments_url(), "/lpa/M-AAAA-BBBB-CCCC/payments");
    }

    #[test]
    fn test_assignee_from_form() {
        assert_eq!(
            Assignee::from_form("user", "47:Some User", ""),
            Assignee::User { id: 47, name: "Some User".to_string() }
        );
        assert_eq!(Assignee::from_form("team", "", "66"), Assignee::Team { id: 66 });
        assert_eq!(Assignee::from_form("user", "Some User", ""), Assignee::Unset);
        assert_eq!(Assignee::from_form("", "47:Some User", "66"), Assignee::Unset);
        assert_eq!(Assignee::Unset.id(), 0);
    }
}
