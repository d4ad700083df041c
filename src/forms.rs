use crate::types::DateString;
use url::form_urlencoded;

pub const DEFAULT_MAX_FIELDS: usize = 1000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("form has more than {0} fields")]
    TooManyFields(usize),
    #[error("{field} must be a whole number, got {value:?}")]
    NotAnInteger { field: String, value: String },
    #[error("{0} is required")]
    Missing(String),
}

/// Decodes `application/x-www-form-urlencoded` data into [`FormValues`].
///
/// Built once at start-up and shared through the application state.
#[derive(Debug, Clone)]
pub struct FormDecoder {
    max_fields: usize,
}

impl Default for FormDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FIELDS)
    }
}

impl FormDecoder {
    pub fn new(max_fields: usize) -> Self {
        Self { max_fields }
    }

    /// Decodes a query string or request body into name/value pairs.
    pub fn decode(&self, input: &[u8]) -> Result<Vec<(String, String)>, FormError> {
        let mut pairs = Vec::new();

        for (name, value) in form_urlencoded::parse(input) {
            if pairs.len() == self.max_fields {
                return Err(FormError::TooManyFields(self.max_fields));
            }
            pairs.push((name.into_owned(), value.into_owned()));
        }

        Ok(pairs)
    }

    /// Decodes the query string and, when present, the posted body of a request.
    pub fn decode_request(
        &self,
        query: &[u8],
        body: Option<&[u8]>,
    ) -> Result<FormValues, FormError> {
        let query = self.decode(query)?;
        let post = match body {
            Some(body) => self.decode(body)?,
            None => Vec::new(),
        };

        Ok(FormValues { query, post })
    }
}

/// The parameters of a single request, keeping query string and posted body apart.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormValues {
    query: Vec<(String, String)>,
    post: Vec<(String, String)>,
}

impl FormValues {
    #[cfg(test)]
    pub fn from_pairs(query: &[(&str, &str)], post: &[(&str, &str)]) -> Self {
        let owned = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect()
        };

        Self {
            query: owned(query),
            post: owned(post),
        }
    }

    fn first<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The first posted value for `name`, falling back to the query string.
    pub fn value(&self, name: &str) -> Option<&str> {
        Self::first(&self.post, name).or_else(|| Self::first(&self.query, name))
    }

    /// Parses a required integer parameter such as a case `id`.
    pub fn id(&self, name: &str) -> Result<i64, FormError> {
        let raw = self.value(name).ok_or_else(|| FormError::Missing(name.to_string()))?;
        raw.trim().parse().map_err(|_| FormError::NotAnInteger {
            field: name.to_string(),
            value: raw.to_string(),
        })
    }

    /// The first posted value for `name` with surrounding whitespace removed.
    pub fn post_string(&self, name: &str) -> String {
        Self::first(&self.post, name).map(str::trim).unwrap_or_default().to_string()
    }

    pub fn post_int(&self, name: &str) -> Result<i64, FormError> {
        let raw = self.post_string(name);
        raw.parse().map_err(|_| FormError::NotAnInteger {
            field: name.to_string(),
            value: raw,
        })
    }

    pub fn post_date(&self, name: &str) -> DateString {
        DateString::new(self.post_string(name))
    }

    /// Whether a checkbox named `name` was posted with `value` ticked.
    pub fn post_checked(&self, name: &str, value: &str) -> bool {
        self.post.iter().any(|(key, posted)| key == name && posted == value)
    }

    /// Every posted value for `name`.
    pub fn post_all(&self, name: &str) -> Vec<&str> {
        self.post
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Every value for `name`, posted values first.
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.post
            .iter()
            .chain(self.query.iter())
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}
