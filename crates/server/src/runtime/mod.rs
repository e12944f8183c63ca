pub mod boot;
pub mod serve;
