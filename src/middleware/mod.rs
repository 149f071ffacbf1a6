mod operator_auth;

pub use operator_auth::*;
