//! Error taxonomy and wire types shared by the `aes-cipher` and `pgp-submit` binaries.

pub mod error;
pub mod protocol;

pub use error::WorkflowError;
