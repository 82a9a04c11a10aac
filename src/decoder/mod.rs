pub mod date;
pub mod json_decoder;
