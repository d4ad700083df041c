use crate::forms::FormValues;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Results shown per search page.
pub const SEARCH_PAGE_SIZE: u32 = 10;

/// Shortest search term the API accepts.
pub const MIN_TERM_LENGTH: usize = 3;

pub const ALL_PERSON_TYPES: [&str; 9] = [
    "Donor",
    "Client",
    "Attorney",
    "Deputy",
    "Replacement Attorney",
    "Trust Corporation",
    "Notified Person",
    "Certificate Provider",
    "Correspondent",
];

/// A case summary attached to a person search hit.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonCase {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "uId", default)]
    pub uid: String,
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub status: String,
}

/// A person returned by search.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "uId", default)]
    pub uid: String,
    #[serde(default)]
    pub person_type: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub cases: Vec<PersonCase>,
}

impl Person {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.surname).trim().to_string()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTotal {
    pub count: u32,
}

/// One page of person search results.
///
/// `aggregations` counts hits per person type across every page. The API
/// sends an empty list rather than an empty object when there are none.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Person>,
    #[serde(default, deserialize_with = "aggregations")]
    pub aggregations: BTreeMap<String, u32>,
    #[serde(default)]
    pub total: SearchTotal,
}

fn aggregations<'de, D>(deserializer: D) -> Result<BTreeMap<String, u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Object {
            #[serde(rename = "personType", default)]
            person_type: BTreeMap<String, u32>,
        },
        List(Vec<serde_json::Value>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Object { person_type } => person_type,
        Raw::List(_) => BTreeMap::new(),
    })
}

pub fn total_pages(total_items: u32) -> u32 {
    total_items.div_ceil(SEARCH_PAGE_SIZE)
}

/// Person type filters chosen on the search page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchFilters {
    pub person_types: Vec<String>,
}

impl SearchFilters {
    /// Reads `person-type` values, keeping only known person types.
    pub fn from_form(form: &FormValues) -> Self {
        let person_types = form
            .all("person-type")
            .into_iter()
            .filter(|selected| ALL_PERSON_TYPES.contains(selected))
            .map(str::to_string)
            .collect();

        Self { person_types }
    }

    pub fn is_set(&self) -> bool {
        !self.person_types.is_empty()
    }

    pub fn is_selected(&self, person_type: &str) -> bool {
        self.person_types.iter().any(|selected| selected == person_type)
    }

    /// The filters as a query string, empty when none are set.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for person_type in &self.person_types {
            serializer.append_pair("person-type", person_type);
        }
        serializer.finish()
    }
}

/// Encodes the search term as a query string.
pub fn encode_term(term: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("term", term)
        .finish()
}

/// The case uid a search term refers to, if it is one.
///
/// Separators are ignored, so `7000-0000-0001` and `700000000001` both count;
/// what remains must be exactly twelve digits.
pub fn deleted_case_uid(term: &str) -> Option<String> {
    let digits: String = term.chars().filter(char::is_ascii_digit).collect();

    (digits.len() == 12).then_some(digits)
}

/// A case that has been deleted, returned when searching for its uid.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCase {
    #[serde(rename = "uId", default)]
    pub uid: String,
    #[serde(default)]
    pub online_lpa_id: String,
    #[serde(default, rename = "type")]
    pub case_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub deletion_reason: String,
    #[serde(default)]
    pub deleted_at: String,
}
