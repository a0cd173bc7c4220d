/// Field validators shared by the request payloads
///
/// Used through `#[validate(custom(function = "..."))]` on the request
/// structs in [`crate::routes`].

use std::borrow::Cow;

use recipebox_shared::auth::password::validate_password_length;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::error::{ApiError, ApiResult, ValidationErrorDetail};

/// Largest price a `NUMERIC(5, 2)` column holds
pub const MAX_PRICE: Decimal = Decimal::from_parts(99999, 0, 0, false, 2);

fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Rejects empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "This field may not be blank."));
    }
    Ok(())
}

pub fn password(value: &str) -> Result<(), ValidationError> {
    validate_password_length(value).map_err(|msg| error("min_length", msg))
}

/// Non-negative, below 1000, at most two decimal places
pub fn price(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(error(
            "min_value",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    if value.normalize().scale() > 2 {
        return Err(error(
            "max_decimal_places",
            "Ensure that there are no more than 2 decimal places.",
        ));
    }
    if *value > MAX_PRICE {
        return Err(error(
            "max_whole_digits",
            "Ensure that there are no more than 3 digits before the decimal point.",
        ));
    }
    Ok(())
}

/// Fails with one "required" detail per field whose flag is `false`
///
/// ```
/// use recipebox_api::validation::require_fields;
///
/// let title: Option<String> = None;
/// let price = Some(5);
/// assert!(require_fields(&[("title", title.is_some()), ("price", price.is_some())]).is_err());
/// ```
pub fn require_fields(fields: &[(&str, bool)]) -> ApiResult<()> {
    let missing: Vec<ValidationErrorDetail> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(field, _)| ValidationErrorDetail {
            field: field.to_string(),
            message: "This field is required.".to_string(),
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationError(missing))
    }
}
