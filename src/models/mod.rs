pub mod case_model;
pub mod complaint_model;
pub mod error_model;
pub mod payment_model;
pub mod ref_data_model;
pub mod search_model;
