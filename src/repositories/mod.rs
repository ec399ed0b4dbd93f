pub(crate) mod attempts;
pub(crate) mod batches;
pub(crate) mod contracts;
pub(crate) mod health;
pub(crate) mod postgres;
pub(crate) mod questions;
pub(crate) mod test_cases;
pub(crate) mod users;
