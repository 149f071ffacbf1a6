mod audit_log;
mod credential;
mod device;
mod license;
mod operator;
mod organization;

pub use audit_log::*;
pub use credential::*;
pub use device::*;
pub use license::*;
pub use operator::*;
pub use organization::*;
