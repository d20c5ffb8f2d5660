pub mod checksum;
pub mod commands;
pub mod lookup;
pub mod rate_limit;
pub mod validation;
