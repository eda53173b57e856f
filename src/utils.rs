/// Declares one `GET` handler per report period. Each handler anchors the
/// report to the local calendar date at call time.
#[macro_export]
macro_rules! report_funcs {
    ( $( ( $func_name:ident, $url:literal, $period:expr ) ),+ $(,)? ) => {
        $(
            #[get($url)]
            async fn $func_name(
                reports: web::Data<ReportService>,
            ) -> Result<HttpResponse, ApiError> {
                let today = chrono::Local::now().date_naive();
                let message = reports
                    .generate($period, today)
                    .await
                    .map_err(ApiError::internal)?;
                Ok(HttpResponse::Ok().json(MessageResponse { message }))
            }
        )+
    };
}

use anyhow::{bail, Context};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

const DATE_FMT: &str = "%Y-%m-%d";

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r".+@.+\..+").unwrap());

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

/// Parses a strict `YYYY-MM-DD` date. Unpadded forms such as `2024-5-1` are
/// rejected, since stored dates are compared as text.
pub fn parse_date_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDate> {
    let s = s.as_ref();
    if s.len() != 10 {
        bail!("date must be formatted as YYYY-MM-DD");
    }
    NaiveDate::parse_from_str(s, DATE_FMT).context("date must be formatted as YYYY-MM-DD")
}

/// Loose `local@domain.tld` check: something, an `@`, something, a dot,
/// something.
pub fn is_email_shaped(s: &str) -> bool {
    EMAIL_SHAPE.is_match(s)
}
