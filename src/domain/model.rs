use crate::utils::error::{CartTaxError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;
use std::str::FromStr;

/// One cart line. The price is never negative once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLineItem")]
pub struct LineItem {
    id: String,
    quantity: u32,
    unit_price: Decimal,
}

// Missing quantity or price counts as zero.
#[derive(Deserialize)]
struct RawLineItem {
    id: String,
    #[serde(default)]
    quantity: u32,
    #[serde(default)]
    unit_price: Decimal,
}

impl TryFrom<RawLineItem> for LineItem {
    type Error = CartTaxError;

    fn try_from(raw: RawLineItem) -> Result<Self> {
        Self::new(raw.id, raw.quantity, raw.unit_price)
    }
}

impl LineItem {
    pub fn new(id: impl Into<String>, quantity: u32, unit_price: Decimal) -> Result<Self> {
        let id = id.into();
        if unit_price < Decimal::ZERO {
            return Err(CartTaxError::ValidationError {
                message: format!("line item '{}' has negative unit price {}", id, unit_price),
            });
        }

        Ok(Self {
            id,
            quantity,
            unit_price,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// `None` when quantity × price does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

/// Parses the CLI form `id:quantity:unit_price`, e.g. `book:2:12.50`.
impl FromStr for LineItem {
    type Err = CartTaxError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| CartTaxError::ValidationError {
            message: format!("invalid line item '{}': {}", s, reason),
        };

        // split from the right so ids may contain ':'
        let mut parts = s.rsplitn(3, ':');
        let price = parts.next().ok_or_else(|| invalid("missing unit price"))?;
        let quantity = parts.next().ok_or_else(|| invalid("missing quantity"))?;
        let id = parts.next().ok_or_else(|| invalid("missing id"))?;

        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(&format!("quantity: {}", e)))?;
        let unit_price = Decimal::from_str(price.trim())
            .map_err(|e| invalid(&format!("unit price: {}", e)))?;

        Self::new(id.trim(), quantity, unit_price)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Saturates at `Decimal::MAX`; use [`Cart::checked_subtotal`] where an
    /// overflow must be reported.
    pub fn subtotal(&self) -> Decimal {
        self.checked_subtotal().unwrap_or(Decimal::MAX)
    }

    pub fn checked_subtotal(&self) -> Result<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |acc, item| {
            item.line_total()
                .and_then(|line| acc.checked_add(line))
                .ok_or_else(|| CartTaxError::ValidationError {
                    message: format!("cart subtotal overflows at line item '{}'", item.id),
                })
        })
    }
}

impl FromIterator<LineItem> for Cart {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// Writes the decimal digits as a bare JSON number, no f64 round trip.
fn serialize_exact<S: Serializer>(
    value: &Decimal,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let raw = RawValue::from_string(value.to_string()).map_err(serde::ser::Error::custom)?;
    raw.serialize(serializer)
}

/// What goes to the tax service. Only the subtotal is put on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxRequest {
    #[serde(serialize_with = "serialize_exact")]
    pub subtotal: Decimal,
    #[serde(skip_serializing)]
    pub jurisdiction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxResult {
    #[serde(serialize_with = "serialize_exact")]
    pub amount: Decimal,
}

impl TaxResult {
    pub fn zero() -> Self {
        Self {
            amount: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Receipt {
    /// Fails with `InvalidTaxResponse` when the tax pushes the total past `Decimal::MAX`.
    pub fn new(subtotal: Decimal, tax: TaxResult) -> Result<Self> {
        let total = subtotal
            .checked_add(tax.amount)
            .ok_or_else(|| CartTaxError::InvalidTaxResponse {
                message: format!("tax amount {} overflows total for subtotal {}", tax.amount, subtotal),
            })?;

        Ok(Self {
            subtotal,
            tax: tax.amount,
            total,
        })
    }
}
