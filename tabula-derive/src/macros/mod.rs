pub mod field_utils;
pub mod record;
