pub mod company_details;

pub use company_details::{company_key, CompanyDetails};
