// Publish date parsing and validation for scheduled (pro) uploads.

use crate::ui::Prompter;
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc};
use thiserror::Error;

/// Format the user types the date in, local time.
pub const INPUT_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, Error, PartialEq)]
pub enum DateError {
    #[error("Incorrect date format - expected DD/MM/YYYY HH:MM, got {0:?}")]
    InvalidFormat(String),
    #[error("Date {0} does not exist in the local timezone")]
    NonexistentLocalTime(String),
    #[error("Date {} is not in the future", .0.to_rfc2822())]
    NotInFuture(DateTime<Local>),
}

/// Parse `DD/MM/YYYY HH:MM` as a local time. Ambiguous times (DST fold)
/// resolve to the earlier instant.
pub fn parse_local(input: &str) -> Result<DateTime<Local>, DateError> {
    let input = input.trim();
    let naive = NaiveDateTime::parse_from_str(input, INPUT_FORMAT)
        .map_err(|_| DateError::InvalidFormat(input.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| DateError::NonexistentLocalTime(input.to_string()))
}

/// Accept `date` only if it lies strictly after `now`; returns the RFC-3339
/// UTC form sent to the API.
pub fn ensure_future(date: DateTime<Local>, now: DateTime<Local>) -> Result<String, DateError> {
    if date <= now {
        return Err(DateError::NotInFuture(date));
    }
    Ok(date
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Prompt naming the zone and its whole-hour offset, e.g.
/// `Enter a publish date in CET (+1 GMT) [DD/MM/YYYY HH:MM]`.
pub fn date_prompt<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let hours = now.offset().fix().local_minus_utc() / 3600;
    format!(
        "Enter a publish date in {} ({:+} GMT) [DD/MM/YYYY HH:MM]",
        now.format("%Z"),
        hours
    )
}

/// Ask until a future date is given. A malformed date aborts; a date that
/// is not in the future is reported and asked again.
pub fn prompt_publish_date<P: Prompter + ?Sized>(
    prompter: &mut P,
    now: impl Fn() -> DateTime<Local>,
) -> Result<String> {
    loop {
        let current = now();
        let input = prompter.input(&date_prompt(&current), None)?;
        let date = parse_local(&input)?;
        match ensure_future(date, current) {
            Ok(utc) => return Ok(utc),
            Err(e @ DateError::NotInFuture(_)) => prompter.warn(&e.to_string()),
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ScriptedPrompter;

    fn expected_utc(input: &str) -> String {
        let naive = NaiveDateTime::parse_from_str(input, INPUT_FORMAT).unwrap();
        Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    #[test]
    fn parses_day_month_year() {
        let d = parse_local(" 31/12/2099 10:00\n").unwrap();
        assert_eq!(d.format("%Y-%m-%d %H:%M").to_string(), "2099-12-31 10:00");
    }

    #[test]
    fn rejects_other_formats() {
        for bad in ["2099-12-31 10:00", "31/12/2099", "12/31/2099 10:00", ""] {
            assert!(
                matches!(parse_local(bad), Err(DateError::InvalidFormat(_))),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn future_date_is_sent_as_utc() {
        let date = parse_local("31/12/2099 10:00").unwrap();
        let utc = ensure_future(date, Local::now()).unwrap();
        assert_eq!(utc, expected_utc("31/12/2099 10:00"));
        assert!(utc.ends_with('Z'));
    }

    #[test]
    fn now_is_not_the_future() {
        let now = Local::now();
        assert!(matches!(ensure_future(now, now), Err(DateError::NotInFuture(_))));
    }

    #[test]
    fn prompt_names_zone_and_hour_offset() {
        let cet = chrono::FixedOffset::east_opt(3600).unwrap();
        let now = cet.with_ymd_and_hms(2030, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(
            date_prompt(&now),
            "Enter a publish date in +01:00 (+1 GMT) [DD/MM/YYYY HH:MM]"
        );

        let now = Utc.with_ymd_and_hms(2030, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(
            date_prompt(&now),
            "Enter a publish date in UTC (+0 GMT) [DD/MM/YYYY HH:MM]"
        );

        let pst = chrono::FixedOffset::west_opt(8 * 3600).unwrap();
        let now = pst.with_ymd_and_hms(2030, 1, 15, 12, 0, 0).unwrap();
        assert!(date_prompt(&now).contains("(-8 GMT)"));
    }

    #[test]
    fn past_date_is_asked_again() {
        let mut prompter = ScriptedPrompter::new(&["01/01/2000 10:00", "31/12/2099 10:00"], &[]);
        let utc = prompt_publish_date(&mut prompter, Local::now).unwrap();
        assert_eq!(utc, expected_utc("31/12/2099 10:00"));
        assert_eq!(prompter.warnings.len(), 1);
        assert!(prompter.warnings[0].contains("is not in the future"));
    }

    #[test]
    fn malformed_date_aborts() {
        let mut prompter = ScriptedPrompter::new(&["tomorrow", "31/12/2099 10:00"], &[]);
        let err = prompt_publish_date(&mut prompter, Local::now).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DateError>(),
            Some(DateError::InvalidFormat(_))
        ));
    }
}
