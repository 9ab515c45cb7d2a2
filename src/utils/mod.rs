//! Small shared utilities.

pub mod json_ext;
