mod date_string;
mod money;
mod status_code;

pub use date_string::{DateError, DateString};
pub use money::{MoneyError, Pence};
pub use status_code::ApiStatusCode;
