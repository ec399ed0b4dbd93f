use std::fmt;

use time::{Duration, PrimitiveDateTime};

use crate::core::time::format_primitive;
use crate::db::models::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowViolation {
    NotYetOpen { opens_at: PrimitiveDateTime },
    Closed { closed_at: PrimitiveDateTime },
}

impl fmt::Display for WindowViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowViolation::NotYetOpen { opens_at } => write!(
                f,
                "this question is not available yet, it will be available from {}",
                format_primitive(*opens_at)
            ),
            WindowViolation::Closed { closed_at } => write!(
                f,
                "this question is no longer available, it ended at {}",
                format_primitive(*closed_at)
            ),
        }
    }
}

/// Both bounds are inclusive; an unset bound does not restrict.
pub(crate) fn check_window(question: &Question, now: PrimitiveDateTime) -> Result<(), WindowViolation> {
    if let Some(opens_at) = question.start_time {
        if now < opens_at {
            return Err(WindowViolation::NotYetOpen { opens_at });
        }
    }
    if let Some(closed_at) = question.end_time {
        if now > closed_at {
            return Err(WindowViolation::Closed { closed_at });
        }
    }
    Ok(())
}

pub(crate) fn elapsed_seconds(started_at: PrimitiveDateTime, now: PrimitiveDateTime) -> i64 {
    (now - started_at).whole_seconds().max(0)
}

pub(crate) fn time_limit_seconds(time_limit_minutes: i32) -> i64 {
    i64::from(time_limit_minutes) * 60
}

pub(crate) fn exceeds_time_limit(
    elapsed_seconds: i64,
    time_limit_minutes: i32,
    grace_period_seconds: i64,
) -> bool {
    elapsed_seconds > time_limit_seconds(time_limit_minutes) + grace_period_seconds
}

pub(crate) fn deadline(started_at: PrimitiveDateTime, time_limit_minutes: i32) -> PrimitiveDateTime {
    started_at + Duration::seconds(time_limit_seconds(time_limit_minutes))
}

pub(crate) fn remaining_seconds(
    started_at: PrimitiveDateTime,
    time_limit_minutes: i32,
    now: PrimitiveDateTime,
) -> i64 {
    (deadline(started_at, time_limit_minutes) - now).whole_seconds().max(0)
}
