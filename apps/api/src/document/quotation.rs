//! Quotation: cost line items for a plan, with derived totals.
//!
//! Produced by the quotation collaborator and hand-edited by the operator. On arrival
//! and after every edit the derived fields are recomputed from the items.

use serde::{Deserialize, Serialize};

/// Defaults for a manually added line.
const NEW_ITEM_CATEGORY: &str = "其他";
const NEW_ITEM_NAME: &str = "新項目";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationItem {
    pub category: String,
    pub item: String,
    pub unit_price: f64,
    pub quantity: f64,
    #[serde(default)]
    pub note: String,
}

impl QuotationItem {
    pub fn subtotal(&self) -> f64 {
        self.unit_price * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    pub items: Vec<QuotationItem>,
    pub total_cost: f64,
    pub suggested_selling_price: f64,
    pub profit_margin: f64,
}

/// One manual edit to a quotation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum QuotationEdit {
    AddItem,
    UpdateItem { index: usize, item: QuotationItem },
    RemoveItem { index: usize },
    SetSellingPrice { price: f64 },
}

impl Quotation {
    /// Builds a quotation whose derived fields are consistent with `items`.
    pub fn from_items(items: Vec<QuotationItem>, selling_price: f64) -> Self {
        let total_cost = items.iter().map(QuotationItem::subtotal).sum();
        Quotation {
            items,
            total_cost,
            suggested_selling_price: selling_price,
            profit_margin: profit_margin(selling_price, total_cost),
        }
    }

    /// Applies an edit and returns the recomputed quotation. Out-of-range indices
    /// leave the items untouched.
    pub fn apply(&self, edit: QuotationEdit) -> Quotation {
        let mut items = self.items.clone();
        let mut price = self.suggested_selling_price;
        match edit {
            QuotationEdit::AddItem => items.push(QuotationItem {
                category: NEW_ITEM_CATEGORY.to_string(),
                item: NEW_ITEM_NAME.to_string(),
                unit_price: 0.0,
                quantity: 1.0,
                note: String::new(),
            }),
            QuotationEdit::UpdateItem { index, item } => {
                if let Some(slot) = items.get_mut(index) {
                    *slot = item;
                }
            }
            QuotationEdit::RemoveItem { index } => {
                if index < items.len() {
                    items.remove(index);
                }
            }
            QuotationEdit::SetSellingPrice { price: p } => price = p,
        }
        Quotation::from_items(items, price)
    }
}

/// `(price - cost) / price`, or 0 when the price is not positive.
pub fn profit_margin(selling_price: f64, total_cost: f64) -> f64 {
    if selling_price > 0.0 {
        (selling_price - total_cost) / selling_price
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, qty: f64) -> QuotationItem {
        QuotationItem {
            category: "住宿".to_string(),
            item: "Hotel".to_string(),
            unit_price: price,
            quantity: qty,
            note: String::new(),
        }
    }

    #[test]
    fn test_from_items_derives_totals() {
        let q = Quotation::from_items(vec![item(1000.0, 2.0), item(500.0, 1.0)], 3000.0);
        assert_eq!(q.total_cost, 2500.0);
        assert!((q.profit_margin - 500.0 / 3000.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_price_has_zero_margin() {
        assert_eq!(profit_margin(0.0, 100.0), 0.0);
    }

    #[test]
    fn test_add_item_uses_defaults() {
        let q = Quotation::from_items(vec![], 100.0).apply(QuotationEdit::AddItem);
        assert_eq!(q.items.len(), 1);
        assert_eq!(q.items[0].category, "其他");
        assert_eq!(q.items[0].quantity, 1.0);
        assert_eq!(q.total_cost, 0.0);
    }

    #[test]
    fn test_update_and_remove_recompute() {
        let q = Quotation::from_items(vec![item(100.0, 1.0), item(200.0, 1.0)], 400.0);
        let q = q.apply(QuotationEdit::UpdateItem {
            index: 0,
            item: item(150.0, 2.0),
        });
        assert_eq!(q.total_cost, 500.0);
        let q = q.apply(QuotationEdit::RemoveItem { index: 1 });
        assert_eq!(q.total_cost, 300.0);
        assert!((q.profit_margin - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_generated_values_are_replaced_on_first_edit() {
        let generated = Quotation {
            items: vec![item(100.0, 3.0)],
            total_cost: 999.0,
            suggested_selling_price: 400.0,
            profit_margin: 0.9,
        };
        let q = generated.apply(QuotationEdit::SetSellingPrice { price: 600.0 });
        assert_eq!(q.total_cost, 300.0);
        assert!((q.profit_margin - 0.5).abs() < 1e-9);
    }
}
