pub mod checkout;
pub mod tax;

pub use crate::domain::model::{Cart, LineItem, Receipt, TaxRequest, TaxResult};
pub use crate::domain::ports::{ConfigProvider, TaxService, TaxTransport};
pub use crate::utils::error::Result;
