pub mod company_details;

pub use company_details::{derive_brand_domain, get_or_fetch_company_details};
