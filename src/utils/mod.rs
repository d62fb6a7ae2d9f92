pub mod object_key;
pub mod validation;
