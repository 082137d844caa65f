pub mod browse;
pub mod operator;
