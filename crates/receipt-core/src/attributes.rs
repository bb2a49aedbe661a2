//! # Attribute Decoding
//!
//! Converts loosely typed host records (`serde_json::Value`) into the typed
//! [`Order`] and [`LineItem`] the pipeline works on.
//!
//! ## Record Shape
//! ```text
//! {
//!   "grand_total": "9373.19",           ─► Order.grand_total
//!   "shipping_incl_tax": 4287,          ─► Order.shipping_amount
//!   "shipping_description": "Courier",  ─► Order.shipping_description
//!   "items": [
//!     {
//!       "id": 153,                      ─► LineItem.id (number or string)
//!       "name": "Tea",
//!       "qty": 3,
//!       "row_total_incl_tax": 35.00,
//!       "price_incl_tax": 11.6667,      ─► kept only when exact
//!       "discount_amount": 3.21,
//!       "tax_rate": "vat20",
//!       "tax_amount": 5.30,
//!       "<flag_field>": true,           ─► LineItem.has_marking
//!       "<list_field>": ["M1", "M2"]    ─► LineItem.marking_codes
//!     }
//!   ]
//! }
//! ```
//!
//! Amounts go through their exact decimal text, never through `f64` math.

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{MarkingFields, RecalcConfig};
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{LineItem, Order};
use crate::validation::{validate_field_name, ValidationResult};

// =============================================================================
// Attribute Mapping
// =============================================================================

/// Which host attributes carry the marking flag and the marking list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMapping {
    flag_field: String,
    list_field: String,
}

impl AttributeMapping {
    pub fn from_fields(fields: &MarkingFields) -> ValidationResult<Self> {
        validate_field_name("marking.flag_field", &fields.flag_field)?;
        validate_field_name("marking.list_field", &fields.list_field)?;

        Ok(AttributeMapping {
            flag_field: fields.flag_field.trim().to_string(),
            list_field: fields.list_field.trim().to_string(),
        })
    }

    pub fn flag_field(&self) -> &str {
        &self.flag_field
    }

    pub fn list_field(&self) -> &str {
        &self.list_field
    }
}

// =============================================================================
// Order Decoder
// =============================================================================

/// Decodes host records with a mapping fixed at construction.
#[derive(Debug, Clone)]
pub struct OrderDecoder {
    mapping: AttributeMapping,
}

impl OrderDecoder {
    pub fn new(config: &RecalcConfig) -> ValidationResult<Self> {
        config.validate()?;
        Ok(OrderDecoder {
            mapping: AttributeMapping::from_fields(&config.marking)?,
        })
    }

    pub fn mapping(&self) -> &AttributeMapping {
        &self.mapping
    }

    /// Decodes a whole order record.
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::attributes::OrderDecoder;
    /// use receipt_core::RecalcConfig;
    ///
    /// let record = serde_json::json!({
    ///     "grand_total": "31.79",
    ///     "items": [{
    ///         "id": 153, "name": "Tea", "qty": 3,
    ///         "row_total_incl_tax": 35, "discount_amount": "3.21",
    ///         "marking": true, "marking_list": ["M1", "M2", "M3"]
    ///     }]
    /// });
    ///
    /// let decoder = OrderDecoder::new(&RecalcConfig::default()).unwrap();
    /// let order = decoder.decode_order(&record).unwrap();
    /// assert_eq!(order.lines[0].id, "153");
    /// assert_eq!(order.lines[0].nominal_total().cents(), 3179);
    /// assert_eq!(order.lines[0].codes().len(), 3);
    /// ```
    pub fn decode_order(&self, record: &Value) -> ValidationResult<Order> {
        let object = as_object(record, "order")?;

        let items = object
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| required("items"))?;

        let lines = items
            .iter()
            .map(|item| self.decode_line(item))
            .collect::<ValidationResult<Vec<_>>>()?;

        let shipping_description = match object.get("shipping_description") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(invalid("shipping_description", "must be a string")),
        };

        let order = Order {
            lines,
            shipping_amount: optional_money(object, "shipping_incl_tax")?.unwrap_or_default(),
            shipping_description,
            grand_total: required_money(object, "grand_total")?,
        };

        debug!(
            lines = order.lines.len(),
            grand_total = %order.grand_total,
            "Decoded order record"
        );

        Ok(order)
    }

    /// Decodes one line record.
    pub fn decode_line(&self, record: &Value) -> ValidationResult<LineItem> {
        let object = as_object(record, "items[]")?;

        let id = match object.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(required("id")),
        };

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| required("name"))?;

        let quantity = decode_quantity(object.get("qty"))?;
        let row_total = required_money(object, "row_total_incl_tax")?;

        let mut line = LineItem::new(id, name, quantity, row_total);

        // Informational; an inexact value keeps the derived default.
        match optional_money(object, "price_incl_tax") {
            Ok(Some(unit_price)) => line.unit_price = unit_price,
            Ok(None) => {}
            Err(err) => debug!(line_id = %line.id, error = %err, "Ignoring inexact unit price"),
        }
        line.discount = optional_money(object, "discount_amount")?.unwrap_or_default();
        line.tax_amount = optional_money(object, "tax_amount")?.unwrap_or_default();
        line.tax_rate = match object.get("tax_rate") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => return Err(invalid("tax_rate", "must be a string")),
        };

        line.has_marking = decode_flag(self.mapping.flag_field(), object.get(self.mapping.flag_field()))?;
        line.marking_codes = decode_codes(self.mapping.list_field(), object.get(self.mapping.list_field()))?;

        Ok(line)
    }
}

// =============================================================================
// Field Helpers
// =============================================================================

fn as_object<'a>(value: &'a Value, field: &str) -> ValidationResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| invalid(field, "must be an object"))
}

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Parses a JSON number or decimal string into [`Money`].
fn decode_money(field: &str, value: &Value) -> ValidationResult<Money> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => return Err(invalid(field, "must be a number or decimal string")),
    };

    Money::parse_decimal(&text).map_err(|err| match err {
        ValidationError::InvalidFormat { reason, .. } => invalid(field, reason),
        other => other,
    })
}

fn optional_money(object: &Map<String, Value>, field: &str) -> ValidationResult<Option<Money>> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => decode_money(field, value).map(Some),
    }
}

fn required_money(object: &Map<String, Value>, field: &str) -> ValidationResult<Money> {
    optional_money(object, field)?.ok_or_else(|| required(field))
}

fn decode_quantity(value: Option<&Value>) -> ValidationResult<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid("qty", "is not representable")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("qty", format!("'{}' is not a number", s))),
        _ => Err(required("qty")),
    }
}

/// Accepts booleans, `0`/`1` and their string forms.
fn decode_flag(field: &str, value: Option<&Value>) -> ValidationResult<bool> {
    match value {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(invalid(field, format!("'{}' is not a flag", n))),
        },
        Some(Value::String(s)) => match s.trim() {
            "" | "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            other => Err(invalid(field, format!("'{}' is not a flag", other))),
        },
        Some(_) => Err(invalid(field, "must be a boolean")),
    }
}

fn decode_codes(field: &str, value: Option<&Value>) -> ValidationResult<Option<Vec<String>>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid(field, "must be a list of codes")),
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(code) => Ok(code.clone()),
            _ => Err(invalid(field, "codes must be strings")),
        })
        .collect::<ValidationResult<Vec<_>>>()
        .map(Some)
}

// =============================================================================
// Unit Tests
// =============================================================================
