pub mod astrometrica_log;
pub mod constants;
pub mod designation;
pub mod errors;
pub mod obs_context;
pub mod psv;
pub mod record;
pub mod sexagesimal;
