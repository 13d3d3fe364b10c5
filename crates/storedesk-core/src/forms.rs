//! Form input validation and request payloads
//!
//! Forms hold raw text the way an admin typed it. `validate` either yields a
//! typed payload ready to send or a [`FieldErrors`] map; a failed validation
//! never reaches the network.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{
    Coupon, CouponType, MAX_PRODUCT_IMAGES, Product, ProductImage, ShippingZone, Staff,
};

/// Per-field validation messages in the order the checks ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: IndexMap<String, String>,
}

impl FieldErrors {
    /// Record a message for a field; the first message per field wins
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Message for a field, if it failed
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Names of the failed fields
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.errors.keys().map(String::as_str).collect()
    }

    /// `(field, message)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether no field failed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    fn into_result<T>(self, value: T) -> crate::Result<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self.into())
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (_, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
        }
        Ok(())
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Parse a number the way a browser number input would, `None` if unparsable
fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse `YYYY-MM-DD`, treating blank as absent
///
/// # Errors
///
/// Returns a validation error naming `field` when the text is not a date.
pub fn parse_form_date(field: &str, value: &str) -> crate::Result<Option<NaiveDate>> {
    if blank(value) {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|_| crate::Error::validation(field, format!("Expected YYYY-MM-DD, got '{}'", value.trim())))
}

/// Product create/edit form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    /// Display name
    pub name: String,
    /// Price as typed
    pub price: String,
    /// Category
    pub category: String,
    /// Stock as typed
    pub stock: String,
    /// Brand
    pub brand: String,
    /// Description
    pub description: String,
    /// Frame dimensions
    pub frame_dimensions: String,
    /// Product information
    pub product_information: String,
    /// New arrival flag
    pub new_arrival: bool,
    /// Hot seller flag
    pub hot_seller: bool,
    /// Men flag
    pub men: bool,
    /// Women flag
    pub women: bool,
    /// Kids flag
    pub kids: bool,
    /// Images already stored on the backend that the admin kept
    pub existing_images: Vec<ProductImage>,
}

/// Product fields that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPayload {
    /// Display name
    pub name: String,
    /// Unit price, greater than zero
    pub price: f64,
    /// Category
    pub category: String,
    /// Stock count
    pub stock: u32,
    /// Brand
    pub brand: String,
    /// Description
    pub description: String,
    /// Frame dimensions
    pub frame_dimensions: String,
    /// Product information
    pub product_information: String,
    /// New arrival flag
    pub new_arrival: bool,
    /// Hot seller flag
    pub hot_seller: bool,
    /// Men flag
    pub men: bool,
    /// Women flag
    pub women: bool,
    /// Kids flag
    pub kids: bool,
    /// Retained existing images
    pub existing_images: Vec<ProductImage>,
}

impl ProductForm {
    /// Prefill the form from a stored product
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
            stock: product.stock.to_string(),
            brand: product.brand.clone(),
            description: product.description.clone(),
            frame_dimensions: product.frame_dimensions.clone(),
            product_information: product.product_information.clone(),
            new_arrival: product.new_arrival,
            hot_seller: product.hot_seller,
            men: product.men,
            women: product.women,
            kids: product.kids,
            existing_images: product.images.clone(),
        }
    }

    /// Reject an image selection that would push the total above four
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileRejected`]; the caller keeps its staged images unchanged.
    pub fn check_image_capacity(&self, staged_new: usize, incoming: usize) -> crate::Result<()> {
        if self.existing_images.len() + staged_new + incoming > MAX_PRODUCT_IMAGES {
            return Err(crate::Error::file_rejected(format!(
                "You can only have up to {MAX_PRODUCT_IMAGES} images total"
            )));
        }
        Ok(())
    }

    /// Drop a retained existing image by index; out-of-range indices are ignored
    pub fn remove_existing_image(&mut self, index: usize) -> Option<ProductImage> {
        (index < self.existing_images.len()).then(|| self.existing_images.remove(index))
    }

    /// Validate the form given the number of newly attached images
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidForm`] listing every failing field.
    pub fn validate(&self, new_images: usize) -> crate::Result<ProductPayload> {
        let mut errors = FieldErrors::default();

        if blank(&self.name) {
            errors.insert("name", "Product name is required");
        }
        let price = parse_number(&self.price).filter(|p| *p > 0.0);
        if price.is_none() {
            errors.insert("price", "Valid price is required");
        }
        if blank(&self.category) {
            errors.insert("category", "Category is required");
        }
        let stock = parse_number(&self.stock)
            .filter(|s| *s >= 0.0 && s.fract() == 0.0 && *s <= f64::from(u32::MAX));
        if stock.is_none() {
            errors.insert("stock", "Valid stock quantity is required");
        }
        if blank(&self.brand) {
            errors.insert("brand", "Brand is required");
        }
        if blank(&self.description) {
            errors.insert("description", "Description is required");
        }
        if self.existing_images.len() + new_images == 0 {
            errors.insert("images", "At least one image is required");
        }

        let (Some(price), Some(stock)) = (price, stock) else {
            return Err(errors.into());
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let stock = stock as u32;

        errors.into_result(ProductPayload {
            name: self.name.trim().to_string(),
            price,
            category: self.category.trim().to_string(),
            stock,
            brand: self.brand.trim().to_string(),
            description: self.description.trim().to_string(),
            frame_dimensions: self.frame_dimensions.trim().to_string(),
            product_information: self.product_information.trim().to_string(),
            new_arrival: self.new_arrival,
            hot_seller: self.hot_seller,
            men: self.men,
            women: self.women,
            kids: self.kids,
            existing_images: self.existing_images.clone(),
        })
    }
}

impl ProductPayload {
    /// Scalar fields as multipart text parts, flags as `true`/`false`
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("price", self.price.to_string()),
            ("category", self.category.clone()),
            ("stock", self.stock.to_string()),
            ("brand", self.brand.clone()),
            ("description", self.description.clone()),
            ("frameDimensions", self.frame_dimensions.clone()),
            ("productInformation", self.product_information.clone()),
            ("newArrival", self.new_arrival.to_string()),
            ("hotSeller", self.hot_seller.to_string()),
            ("men", self.men.to_string()),
            ("women", self.women.to_string()),
            ("kids", self.kids.to_string()),
        ]
    }
}

/// Coupon create/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponForm {
    /// Display name
    pub name: String,
    /// Checkout code
    pub code: String,
    /// Discount kind
    pub kind: CouponType,
    /// Amount as typed
    pub amount: String,
    /// Minimum order value as typed
    pub min_value: String,
    /// Maximum discount as typed
    pub max_value: String,
    /// Usage limit as typed
    pub usage_limit: String,
    /// Start date (`YYYY-MM-DD` or blank)
    pub start_date: String,
    /// Expiry date (`YYYY-MM-DD` or blank)
    pub expiry_date: String,
}

/// JSON body for coupon create/update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponPayload {
    /// Display name
    pub name: String,
    /// Checkout code
    pub code: String,
    /// Discount kind
    #[serde(rename = "type")]
    pub kind: CouponType,
    /// Discount amount
    pub amount: f64,
    /// Minimum order value
    pub min_value: f64,
    /// Maximum discount
    pub max_value: f64,
    /// Usage limit
    pub usage_limit: f64,
    /// Start date, `null` when blank
    pub start_date: Option<NaiveDate>,
    /// Expiry date, `null` when blank
    pub expiry_date: Option<NaiveDate>,
}

impl CouponForm {
    /// Prefill the form from a stored coupon
    #[must_use]
    pub fn from_coupon(coupon: &Coupon) -> Self {
        let date = |d: Option<DateTime<Utc>>| {
            d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
        };
        Self {
            name: coupon.name.clone(),
            code: coupon.code.clone(),
            kind: coupon.kind,
            amount: coupon.amount.to_string(),
            min_value: coupon.min_value.to_string(),
            max_value: coupon.max_value.to_string(),
            usage_limit: coupon.usage_limit.to_string(),
            start_date: date(coupon.start_date),
            expiry_date: date(coupon.expiry_date),
        }
    }

    /// Convert to the wire payload; blank numbers become 0, blank dates `null`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidForm`] when name/code are blank or a number or
    /// date does not parse.
    pub fn validate(&self) -> crate::Result<CouponPayload> {
        let mut errors = FieldErrors::default();

        if blank(&self.name) {
            errors.insert("name", "Coupon name is required");
        }
        if blank(&self.code) {
            errors.insert("code", "Coupon code is required");
        }

        let mut number = |field: &'static str, raw: &str| -> f64 {
            if blank(raw) {
                return 0.0;
            }
            parse_number(raw).unwrap_or_else(|| {
                errors.insert(field, format!("{field} must be a number"));
                0.0
            })
        };
        let amount = number("amount", &self.amount);
        let min_value = number("minValue", &self.min_value);
        let max_value = number("maxValue", &self.max_value);
        let usage_limit = number("usageLimit", &self.usage_limit);

        let mut date = |field: &'static str, raw: &str| match parse_form_date(field, raw) {
            Ok(d) => d,
            Err(err) => {
                errors.insert(field, err.to_string());
                None
            }
        };
        let start_date = date("startDate", &self.start_date);
        let expiry_date = date("expiryDate", &self.expiry_date);

        errors.into_result(CouponPayload {
            name: self.name.trim().to_string(),
            code: self.code.trim().to_string(),
            kind: self.kind,
            amount,
            min_value,
            max_value,
            usage_limit,
            start_date,
            expiry_date,
        })
    }
}

/// Staff create/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffForm {
    /// Full name
    pub name: String,
    /// Phone
    pub phone: String,
    /// Gender
    pub gender: String,
    /// Job title
    pub designation: String,
    /// Advance as typed
    pub advance: String,
    /// Monthly salary as typed
    pub monthly_salary: String,
    /// Commission enabled
    pub set_commission: bool,
    /// Commission percent as typed
    pub commission_percent: String,
    /// Commission threshold as typed
    pub commission_bill_threshold: String,
    /// Joining date (`YYYY-MM-DD` or blank)
    pub date_of_joining: String,
    /// Postal address
    pub address: String,
}

/// JSON body for staff create/update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffPayload {
    /// Full name
    pub name: String,
    /// Phone
    pub phone: String,
    /// Gender
    pub gender: String,
    /// Job title
    pub designation: String,
    /// Advance, 0 when unparsable
    pub advance: f64,
    /// Monthly salary, 0 when unparsable
    pub monthly_salary: f64,
    /// Commission enabled
    pub set_commission: bool,
    /// Commission percent, 0 when unparsable
    pub commission_percent: f64,
    /// Commission threshold, 0 when unparsable
    pub commission_bill_threshold: f64,
    /// Joining date at midnight UTC; omitted when blank
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_joining: Option<DateTime<Utc>>,
    /// Postal address
    pub address: String,
}

impl StaffForm {
    /// Prefill the form from a stored record
    #[must_use]
    pub fn from_staff(staff: &Staff) -> Self {
        Self {
            name: staff.name.clone(),
            phone: staff.phone.clone(),
            gender: staff.gender.clone(),
            designation: staff.designation.clone(),
            advance: staff.advance.to_string(),
            monthly_salary: staff.monthly_salary.to_string(),
            set_commission: staff.set_commission,
            commission_percent: staff.commission_percent.to_string(),
            commission_bill_threshold: staff.commission_bill_threshold.to_string(),
            date_of_joining: staff
                .date_of_joining
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            address: staff.address.clone(),
        }
    }

    /// Convert to the wire payload
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidForm`] when the name is blank or the joining
    /// date is not a date.
    pub fn validate(&self) -> crate::Result<StaffPayload> {
        let mut errors = FieldErrors::default();
        if blank(&self.name) {
            errors.insert("name", "Name is required");
        }

        let date_of_joining = match parse_form_date("dateOfJoining", &self.date_of_joining) {
            Ok(date) => date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc()),
            Err(err) => {
                errors.insert("dateOfJoining", err.to_string());
                None
            }
        };
        let number = |raw: &str| parse_number(raw).unwrap_or(0.0);

        errors.into_result(StaffPayload {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            gender: self.gender.trim().to_string(),
            designation: self.designation.trim().to_string(),
            advance: number(&self.advance),
            monthly_salary: number(&self.monthly_salary),
            set_commission: self.set_commission,
            commission_percent: number(&self.commission_percent),
            commission_bill_threshold: number(&self.commission_bill_threshold),
            date_of_joining,
            address: self.address.trim().to_string(),
        })
    }
}

/// Shipping zone form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingZoneForm {
    /// Postal code
    pub zip_code: String,
    /// Charge as typed
    pub charges: String,
    /// Threshold as typed
    pub price_less_than: String,
    /// State name
    pub state: String,
    /// State code
    pub state_code: String,
    /// GST code
    pub gst_code: String,
}

/// JSON body for zone creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingZonePayload {
    /// Postal code
    pub zip_code: String,
    /// Shipping charge
    pub charges: f64,
    /// Threshold
    pub price_less_than: f64,
    /// State name
    pub state: String,
    /// State code
    pub state_code: String,
    /// GST code
    pub gst_code: String,
}

impl ShippingZoneForm {
    /// Every field is required; charges and threshold must be numbers
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] with "Please fill in all fields." when
    /// anything is blank, or a per-field error for a non-numeric amount.
    pub fn validate(&self) -> crate::Result<ShippingZonePayload> {
        let fields = [
            ("zipCode", &self.zip_code),
            ("charges", &self.charges),
            ("priceLessThan", &self.price_less_than),
            ("state", &self.state),
            ("stateCode", &self.state_code),
            ("gstCode", &self.gst_code),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, v)| blank(v)) {
            return Err(crate::Error::validation(*field, "Please fill in all fields."));
        }

        let charges = parse_number(&self.charges)
            .ok_or_else(|| crate::Error::validation("charges", "Charges must be a number"))?;
        let price_less_than = parse_number(&self.price_less_than).ok_or_else(|| {
            crate::Error::validation("priceLessThan", "Price threshold must be a number")
        })?;

        Ok(ShippingZonePayload {
            zip_code: self.zip_code.trim().to_string(),
            charges,
            price_less_than,
            state: self.state.trim().to_string(),
            state_code: self.state_code.trim().to_string(),
            gst_code: self.gst_code.trim().to_string(),
        })
    }
}

impl From<&ShippingZone> for ShippingZoneForm {
    fn from(zone: &ShippingZone) -> Self {
        Self {
            zip_code: zone.zip_code.clone(),
            charges: zone.charges.to_string(),
            price_less_than: zone.price_less_than.to_string(),
            state: zone.state.clone(),
            state_code: zone.state_code.clone(),
            gst_code: zone.gst_code.clone(),
        }
    }
}

/// Admin login body
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Admin email
    pub email: String,
    /// Admin password
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginRequest {
    /// Both fields must be present
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidForm`] naming the blank fields.
    pub fn validate(&self) -> crate::Result<()> {
        let mut errors = FieldErrors::default();
        if blank(&self.email) {
            errors.insert("email", "Email is required");
        }
        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        }
        errors.into_result(())
    }
}
