//! The invoice state manager.
//!
//! [`InvoiceForm`] owns the invoice, the pending item buffer used while a row
//! is being composed or edited, and the edit session. Every mutation leaves
//! the derived totals consistent with the item list.
use log::{debug, info, warn};

use crate::error::FormError;
use crate::model::{Invoice, Item};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormOptions {
    /// Put an edited row back at its original index on update or cancel.
    /// When false the row is appended at the end of the list.
    pub keep_row_position: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self { keep_row_position: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum EditState {
    Idle,
    Editing { index: usize, snapshot: Item },
}

#[derive(Debug, Clone)]
pub struct InvoiceForm {
    invoice: Invoice,
    pending: Item,
    edit: EditState,
    options: FormOptions,
}

impl Default for InvoiceForm {
    fn default() -> Self {
        Self::new(FormOptions::default())
    }
}

impl InvoiceForm {
    pub fn new(options: FormOptions) -> Self {
        Self {
            invoice: Invoice::default(),
            pending: Item::default(),
            edit: EditState::Idle,
            options,
        }
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    /// Direct access for binding the header, party and notes fields.
    /// Call [`InvoiceForm::recompute_balance`] after touching numbers here.
    pub fn invoice_mut(&mut self) -> &mut Invoice {
        &mut self.invoice
    }

    pub fn items(&self) -> &[Item] {
        &self.invoice.items
    }

    pub fn pending(&self) -> &Item {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut Item {
        &mut self.pending
    }

    pub fn clear_pending(&mut self) {
        self.pending = Item::default();
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.edit, EditState::Editing { .. })
    }

    /// Index the row being edited came from, if any.
    pub fn editing_index(&self) -> Option<usize> {
        match self.edit {
            EditState::Editing { index, .. } => Some(index),
            EditState::Idle => None,
        }
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    // ==========================================
    // Item workflow
    // ==========================================

    /// Appends the pending item to the list and clears the buffer.
    pub fn add_item(&mut self) -> Result<(), FormError> {
        if self.is_editing() {
            warn!("add_item rejected: an edit session is open");
            return Err(FormError::EditInProgress);
        }
        self.commit_pending(None);
        Ok(())
    }

    /// Moves the item at `index` out of the list and into the pending buffer.
    pub fn begin_edit(&mut self, index: usize) -> Result<(), FormError> {
        if self.is_editing() {
            warn!("begin_edit({index}) rejected: an edit session is open");
            return Err(FormError::EditInProgress);
        }
        self.check_index(index)?;

        let item = self.invoice.items.remove(index);
        self.pending = item.clone();
        self.edit = EditState::Editing { index, snapshot: item };
        debug!("editing item {index}, {} items left in list", self.invoice.items.len());
        Ok(())
    }

    /// Writes the pending buffer back into the list and leaves edit mode.
    pub fn commit_edit(&mut self) -> Result<(), FormError> {
        let index = match std::mem::replace(&mut self.edit, EditState::Idle) {
            EditState::Editing { index, .. } => index,
            EditState::Idle => return Err(FormError::NotEditing),
        };
        let at = self.options.keep_row_position.then_some(index);
        self.commit_pending(at);
        Ok(())
    }

    /// Restores the item as it was before [`InvoiceForm::begin_edit`].
    pub fn cancel_edit(&mut self) -> Result<(), FormError> {
        let (index, snapshot) = match std::mem::replace(&mut self.edit, EditState::Idle) {
            EditState::Editing { index, snapshot } => (index, snapshot),
            EditState::Idle => return Err(FormError::NotEditing),
        };
        if self.options.keep_row_position {
            let at = index.min(self.invoice.items.len());
            self.invoice.items.insert(at, snapshot);
        } else {
            self.invoice.items.push(snapshot);
        }
        self.clear_pending();
        self.recompute_balance();
        debug!("edit of item {index} cancelled");
        Ok(())
    }

    /// Removes the item at `index`. The caller is responsible for asking the
    /// user to confirm first.
    pub fn delete_item(&mut self, index: usize) -> Result<Item, FormError> {
        if self.is_editing() {
            warn!("delete_item({index}) rejected: an edit session is open");
            return Err(FormError::EditInProgress);
        }
        self.check_index(index)?;

        let removed = self.invoice.items.remove(index);
        self.recompute_balance();

        if self.invoice.items.is_empty() {
            self.reset_item_options();
        }
        debug!("deleted item {index}, {} items left", self.invoice.items.len());
        Ok(removed)
    }

    fn commit_pending(&mut self, at: Option<usize>) {
        self.recompute_line_total();
        let item = std::mem::take(&mut self.pending);
        match at {
            Some(index) => {
                let index = index.min(self.invoice.items.len());
                self.invoice.items.insert(index, item);
            }
            None => self.invoice.items.push(item),
        }
        self.recompute_balance();
    }

    fn check_index(&self, index: usize) -> Result<(), FormError> {
        let len = self.invoice.items.len();
        if index >= len {
            warn!("item index {index} out of range ({len} items)");
            return Err(FormError::OutOfRange { index, len });
        }
        Ok(())
    }

    // No items left: the options no longer apply to anything.
    fn reset_item_options(&mut self) {
        let invoice = &mut self.invoice;
        invoice.sub_total_less_discount = None;
        invoice.shipping = None;
        invoice.discount = None;
        invoice.total_tax = None;
        invoice.tax_rate = None;
        invoice.balance_paid = invoice.sub_total;
    }

    // ==========================================
    // Totals
    // ==========================================

    pub fn set_discount(&mut self, discount: Option<f64>) {
        self.invoice.discount = discount;
        self.recompute_balance();
    }

    pub fn set_tax_rate(&mut self, tax_rate: Option<f64>) {
        self.invoice.tax_rate = tax_rate;
        self.recompute_balance();
    }

    pub fn set_shipping(&mut self, shipping: Option<f64>) {
        self.invoice.shipping = shipping;
        self.recompute_balance();
    }

    pub fn recompute_line_total(&mut self) {
        self.pending.total = Some(self.pending.line_total());
    }

    pub fn recompute_subtotal(&mut self) -> f64 {
        let sub_total: f64 = self
            .invoice
            .items
            .iter()
            .map(|item| item.total.unwrap_or(0.0))
            .sum();
        self.invoice.sub_total = Some(sub_total);
        sub_total
    }

    /// balance = subtotal - discount + tax + shipping, where each unset
    /// term is left out.
    pub fn recompute_balance(&mut self) {
        let sub_total = self.recompute_subtotal();
        let invoice = &mut self.invoice;

        let less_discount = match invoice.discount {
            Some(discount) => sub_total - discount,
            None => sub_total,
        };
        invoice.sub_total_less_discount = Some(less_discount);
        invoice.total_tax = invoice.tax_rate.map(|rate| less_discount * (rate / 100.0));

        let mut balance = sub_total;
        if let Some(discount) = invoice.discount {
            balance -= discount;
        }
        if let Some(tax) = invoice.total_tax {
            balance += tax;
        }
        if let Some(shipping) = invoice.shipping {
            balance += shipping;
        }
        invoice.balance_paid = Some(balance);

        debug!(
            "recomputed: {} items, subtotal {:.2}, balance {:.2}",
            invoice.items.len(),
            sub_total,
            balance
        );
    }

    // ==========================================
    // Import / Export
    // ==========================================

    /// Replaces the whole invoice with the one parsed from `json`. On a parse
    /// failure the current invoice is left untouched.
    pub fn import_invoice(&mut self, json: &str) -> Result<(), FormError> {
        let invoice: Invoice = serde_json::from_str(json).map_err(FormError::Parse)?;
        info!("imported invoice with {} items", invoice.items.len());
        self.invoice = invoice;
        self.pending = Item::default();
        self.edit = EditState::Idle;
        Ok(())
    }

    /// Fails with [`FormError::NonFinite`] rather than writing an overflowed
    /// amount, which JSON would turn into `null`.
    pub fn export_invoice(&self) -> Result<String, FormError> {
        if let Some(field) = first_non_finite(&self.invoice) {
            warn!("export rejected: {field} is not a finite number");
            return Err(FormError::NonFinite { field });
        }
        serde_json::to_string_pretty(&self.invoice).map_err(FormError::Serialize)
    }
}

fn first_non_finite(invoice: &Invoice) -> Option<String> {
    let totals = [
        ("subTotal", invoice.sub_total),
        ("discount", invoice.discount),
        ("subTotalLessDiscount", invoice.sub_total_less_discount),
        ("taxRate", invoice.tax_rate),
        ("totalTax", invoice.total_tax),
        ("shipping", invoice.shipping),
        ("balancePaid", invoice.balance_paid),
    ];
    let items = invoice.items.iter().enumerate().flat_map(|(i, item)| {
        [
            (format!("items[{i}].qty"), item.qty),
            (format!("items[{i}].unitPrice"), item.unit_price),
            (format!("items[{i}].total"), item.total),
        ]
    });

    totals
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .chain(items)
        .find(|(_, value)| value.is_some_and(|v| !v.is_finite()))
        .map(|(name, _)| name)
}
