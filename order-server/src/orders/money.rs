//! Money calculation utilities using rust_decimal for precision
//!
//! Totals are computed on `Decimal` and rounded to 2 places before being
//! stored as `f64`. Line-item prices are snapshots supplied with the
//! request (already catalog-validated upstream) and are never recomputed.

use rust_decimal::prelude::*;
use shared::order::OrderItemDto;

use crate::common::AppError;

/// Rounding strategy for monetary values (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 9_999;

pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

pub fn to_f64(value: Decimal) -> f64 {
    value.round_dp(DECIMAL_PLACES).to_f64().unwrap_or(0.0)
}

/// Validate a line item before it is frozen onto an order.
pub fn validate_item(item: &OrderItemDto) -> Result<(), AppError> {
    if !item.price.is_finite() {
        return Err(AppError::validation(format!(
            "price must be a finite number, got {}",
            item.price
        )));
    }
    if item.price < 0.0 {
        return Err(AppError::validation(format!(
            "price must be non-negative, got {}",
            item.price
        )));
    }
    if item.price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "price exceeds maximum allowed ({MAX_PRICE}), got {}",
            item.price
        )));
    }
    if item.quantity <= 0 {
        return Err(AppError::validation(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {}",
            item.quantity
        )));
    }
    Ok(())
}

/// Order total: Σ unit price × quantity over the line items.
pub fn order_total(items: &[OrderItemDto]) -> f64 {
    let total = items.iter().fold(Decimal::ZERO, |acc, item| {
        acc + to_decimal(item.price) * Decimal::from(item.quantity)
    });
    to_f64(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, quantity: i32) -> OrderItemDto {
        OrderItemDto {
            menu_item_id: 1,
            item_name: "Test item".to_string(),
            quantity,
            price,
        }
    }

    #[test]
    fn test_order_total() {
        // (10 × 2) + (5 × 3) = 35
        let items = [item(10.0, 2), item(5.0, 3)];
        assert_eq!(order_total(&items), 35.0);
    }

    #[test]
    fn test_order_total_rounds_to_cents() {
        let items = [item(0.1, 3)];
        assert_eq!(order_total(&items), 0.3);

        let items = [item(1.005, 2)];
        assert_eq!(order_total(&items), 2.01);
    }

    #[test]
    fn test_order_total_empty() {
        assert_eq!(order_total(&[]), 0.0);
    }

    #[test]
    fn test_validate_item_bounds() {
        assert!(validate_item(&item(10.0, 1)).is_ok());
        assert!(validate_item(&item(-1.0, 1)).is_err());
        assert!(validate_item(&item(f64::NAN, 1)).is_err());
        assert!(validate_item(&item(f64::INFINITY, 1)).is_err());
        assert!(validate_item(&item(2_000_000.0, 1)).is_err());
        assert!(validate_item(&item(10.0, 0)).is_err());
        assert!(validate_item(&item(10.0, -2)).is_err());
        assert!(validate_item(&item(10.0, 10_000)).is_err());
    }
}
