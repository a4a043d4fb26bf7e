//! Business-key validation scoped to the version partition.

mod validator;

pub use validator::UniquenessValidator;
