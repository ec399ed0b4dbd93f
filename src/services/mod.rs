pub(crate) mod attempt_timing;
pub(crate) mod attempts;
pub(crate) mod errors;
pub(crate) mod grading;
pub(crate) mod judge;
pub(crate) mod status_report;
pub(crate) mod test_cases;
