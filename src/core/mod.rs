pub mod db;
pub mod error;
pub mod gateway;
pub mod session;
pub mod sqlx_utils;
#[cfg(test)]
pub mod test_utils;
pub mod utils;
