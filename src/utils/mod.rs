pub mod error;
pub mod helpers;
pub mod permissions;
pub mod validation;
