//! Calendar date query parsing helpers.

use jiff::civil::Date;
use salvo::oapi::extract::QueryParam;

use crate::envelope::ApiError;

pub(crate) trait DateQueryExt {
    fn into_date(self, name: &str) -> Result<Option<Date>, ApiError>;
}

impl DateQueryExt for QueryParam<String, false> {
    fn into_date(self, name: &str) -> Result<Option<Date>, ApiError> {
        self.into_inner()
            .map(|value| value.parse::<Date>())
            .transpose()
            .map_err(|_parse| {
                ApiError::bad_request(format!("could not parse \"{name}\" query parameter"))
            })
    }
}

/// Parse a `YYYY-MM-DD` body field.
pub(crate) fn parse_date(field: &str, value: &str) -> Result<Date, ApiError> {
    value
        .trim()
        .parse::<Date>()
        .map_err(|_parse| ApiError::bad_request(format!("{field} must be a YYYY-MM-DD date")))
}
