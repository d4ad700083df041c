use axum::http::StatusCode;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// An HTTP status as carried in error bodies and upstream status errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiStatusCode(pub u16);

impl ApiStatusCode {
    pub fn new(status: StatusCode) -> Self {
        Self(status.as_u16())
    }

    pub fn as_status_code(self) -> StatusCode {
        StatusCode::from_u16(self.0).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn is_server_error(self) -> bool {
        self.as_status_code().is_server_error()
    }
}

impl Serialize for ApiStatusCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(self.0)
    }
}

impl From<StatusCode> for ApiStatusCode {
    fn from(status: StatusCode) -> Self {
        Self::new(status)
    }
}

impl From<ApiStatusCode> for StatusCode {
    fn from(status: ApiStatusCode) -> Self {
        status.as_status_code()
    }
}

impl Display for ApiStatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
