use std::str::FromStr;

use axum::body::Bytes;
use rust_decimal::Decimal;

use crate::{
    error::{AppError, FieldErrors, Result},
    models::{DEFAULT_PRODUCT_NAME, NewProduct},
    utils::extractors::{FieldInput, ProductPayload, UploadedFile},
};

const NAME_MAX_LENGTH: usize = 200;
const PRICE_MAX_DIGITS: usize = 10;
const PRICE_DECIMAL_PLACES: usize = 2;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const INVALID_NUMBER: &str = "A valid number is required.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const NOT_A_FILE: &str = "The submitted data was not a file. Check the encoding type on the form.";
const EMPTY_FILE: &str = "The submitted file is empty.";
const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

type FieldResult<T> = std::result::Result<T, String>;

/// An uploaded image whose contents were recognised as a supported format.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub extension: &'static str,
}

#[derive(Debug, Clone)]
pub enum ImageChange {
    /// No `image` field was submitted.
    Keep,
    Clear,
    Upload(UploadedImage),
}

/// A product record that passed validation but has not been stored yet.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image: ImageChange,
}

impl ProductDraft {
    pub fn into_new_product(self, image: Option<String>) -> NewProduct {
        NewProduct {
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            image,
        }
    }
}

/// Validates every field of `payload`, collecting all failures into one
/// [`AppError::ValidationError`].
pub fn validate_product(mut payload: ProductPayload) -> Result<ProductDraft> {
    let mut errors = FieldErrors::new();

    let name = record(&mut errors, "name", validate_name(payload.take("name")));
    let description = record(
        &mut errors,
        "description",
        validate_description(payload.take("description")),
    );
    let price = record(&mut errors, "price", validate_price(payload.take("price")));
    let stock = record(&mut errors, "stock", validate_stock(payload.take("stock")));
    let image = record(&mut errors, "image", validate_image(payload.take("image")));

    match (name, description, price, stock, image) {
        (Some(name), Some(description), Some(price), Some(stock), Some(image))
            if errors.is_empty() =>
        {
            Ok(ProductDraft {
                name,
                description,
                price,
                stock,
                image,
            })
        }
        _ => Err(AppError::ValidationError(errors)),
    }
}

fn record<T>(errors: &mut FieldErrors, field: &str, result: FieldResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.entry(field.to_string()).or_default().push(message);
            None
        }
    }
}

fn text_value(input: FieldInput) -> FieldResult<String> {
    match input {
        FieldInput::Text(s) => Ok(s.trim().to_string()),
        FieldInput::Number(n) => Ok(n.to_string()),
        _ => Err(NOT_A_STRING.to_string()),
    }
}

fn validate_name(input: Option<FieldInput>) -> FieldResult<String> {
    let name = match input {
        None | Some(FieldInput::Null) => String::new(),
        Some(input) => text_value(input)?,
    };

    if name.is_empty() {
        return Ok(DEFAULT_PRODUCT_NAME.to_string());
    }

    if name.chars().count() > NAME_MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            NAME_MAX_LENGTH
        ));
    }

    Ok(name)
}

fn validate_description(input: Option<FieldInput>) -> FieldResult<String> {
    let description = match input {
        None => return Err(REQUIRED.to_string()),
        Some(FieldInput::Null) => return Err(NOT_NULL.to_string()),
        Some(input) => text_value(input)?,
    };

    if description.is_empty() {
        return Err(NOT_BLANK.to_string());
    }

    Ok(description)
}

fn validate_price(input: Option<FieldInput>) -> FieldResult<Decimal> {
    let raw = match input {
        None => return Err(REQUIRED.to_string()),
        Some(FieldInput::Null) => return Err(NOT_NULL.to_string()),
        Some(FieldInput::Text(s)) => s.trim().to_string(),
        Some(FieldInput::Number(n)) => n.to_string(),
        Some(_) => return Err(INVALID_NUMBER.to_string()),
    };

    if !is_decimal_literal(&raw) {
        return Err(INVALID_NUMBER.to_string());
    }

    let value = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| INVALID_NUMBER.to_string())?;

    check_price_precision(value)?;

    let mut value = value;
    value.rescale(PRICE_DECIMAL_PLACES as u32);
    Ok(value)
}

/// `[+-]digits[.digits][(e|E)[+-]digits]`, with digits on at least one side of the point.
fn is_decimal_literal(raw: &str) -> bool {
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let exponent_ok = exponent.is_none_or(|e| {
        let e = e.strip_prefix(['+', '-']).unwrap_or(e);
        !e.is_empty() && all_digits(e)
    });

    !(whole.is_empty() && fraction.is_empty())
        && all_digits(whole)
        && all_digits(fraction)
        && exponent_ok
}

/// Digits are counted as written, so trailing zeros after the point count
/// towards both limits.
fn check_price_precision(value: Decimal) -> FieldResult<()> {
    let decimal_places = value.scale() as usize;
    let digits = value.mantissa().unsigned_abs().to_string().len();
    let total_digits = digits.max(decimal_places);
    let whole_digits = total_digits - decimal_places;

    if total_digits > PRICE_MAX_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {} digits in total.",
            PRICE_MAX_DIGITS
        ));
    }

    if decimal_places > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} decimal places.",
            PRICE_DECIMAL_PLACES
        ));
    }

    let max_whole_digits = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;
    if whole_digits > max_whole_digits {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            max_whole_digits
        ));
    }

    Ok(())
}

fn validate_stock(input: Option<FieldInput>) -> FieldResult<i32> {
    let value = match input {
        None => return Ok(0),
        Some(FieldInput::Null) => return Err(NOT_NULL.to_string()),
        Some(FieldInput::Text(s)) => parse_integer(s.trim())?,
        Some(FieldInput::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
            _ => return Err(INVALID_INTEGER.to_string()),
        },
        Some(_) => return Err(INVALID_INTEGER.to_string()),
    };

    if value < 0 {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }

    i32::try_from(value).map_err(|_| {
        format!(
            "Ensure this value is less than or equal to {}.",
            i32::MAX
        )
    })
}

/// Accepts plain integers and integers with an all-zero fraction such as `"3.00"`.
fn parse_integer(raw: &str) -> FieldResult<i64> {
    let digits = match raw.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        Some(_) => return Err(INVALID_INTEGER.to_string()),
        None => raw,
    };

    digits
        .parse::<i64>()
        .map_err(|_| INVALID_INTEGER.to_string())
}

fn validate_image(input: Option<FieldInput>) -> FieldResult<ImageChange> {
    match input {
        None => Ok(ImageChange::Keep),
        Some(FieldInput::Null) => Ok(ImageChange::Clear),
        Some(FieldInput::Text(s)) if s.is_empty() => Ok(ImageChange::Clear),
        Some(FieldInput::File(file)) => validate_upload(file).map(ImageChange::Upload),
        Some(_) => Err(NOT_A_FILE.to_string()),
    }
}

fn validate_upload(file: UploadedFile) -> FieldResult<UploadedImage> {
    if file.bytes.is_empty() {
        return Err(EMPTY_FILE.to_string());
    }

    let extension = detect_image_extension(&file.bytes).ok_or_else(|| INVALID_IMAGE.to_string())?;

    Ok(UploadedImage {
        bytes: file.bytes,
        extension,
    })
}

fn detect_image_extension(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("jpg"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("webp"),
        [b'B', b'M', ..] => Some("bmp"),
        _ => None,
    }
}
