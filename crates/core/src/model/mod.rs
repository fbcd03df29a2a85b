pub mod extra;
pub mod record;
