pub mod assertion;
pub mod contract;
pub mod error;
pub mod json_path;
pub mod matcher;
pub mod value;
