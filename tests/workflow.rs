use invoice_form::{FormError, FormOptions, Invoice, InvoiceForm, Item};

fn stage(form: &mut InvoiceForm, description: &str, qty: f64, unit_price: f64) {
    let pending = form.pending_mut();
    pending.description = Some(description.to_string());
    pending.qty = Some(qty);
    pending.unit_price = Some(unit_price);
    form.recompute_line_total();
}

#[test]
fn test_build_invoice_from_scratch() {
    let mut form = InvoiceForm::default();

    stage(&mut form, "Consulting", 4.0, 20.0);
    form.add_item().expect("add consulting");
    stage(&mut form, "Travel", 1.0, 20.0);
    form.add_item().expect("add travel");

    form.set_discount(Some(10.0));
    form.set_tax_rate(Some(10.0));
    form.set_shipping(Some(5.0));

    let invoice = form.invoice();
    assert_eq!(invoice.items.len(), 2);
    assert_eq!(invoice.sub_total, Some(100.0));
    assert_eq!(invoice.sub_total_less_discount, Some(90.0));
    assert_eq!(invoice.total_tax, Some(9.0));
    assert_eq!(invoice.balance_paid, Some(104.0));
}

#[test]
fn test_totals_follow_item_changes() {
    let mut form = InvoiceForm::default();
    form.set_tax_rate(Some(10.0));

    stage(&mut form, "Widget", 2.0, 5.0);
    form.add_item().unwrap();
    assert_eq!(form.invoice().balance_paid, Some(11.0));

    stage(&mut form, "Gadget", 9.0, 10.0);
    form.add_item().unwrap();
    assert_eq!(form.invoice().sub_total, Some(100.0));
    assert_eq!(form.invoice().balance_paid, Some(110.0));

    form.begin_edit(1).unwrap();
    form.pending_mut().qty = Some(4.0);
    form.commit_edit().unwrap();
    assert_eq!(form.invoice().sub_total, Some(50.0));
    assert_eq!(form.invoice().balance_paid, Some(55.0));
    assert_eq!(form.items()[1].description.as_deref(), Some("Gadget"));

    form.delete_item(0).unwrap();
    assert_eq!(form.invoice().sub_total, Some(40.0));
    assert_eq!(form.invoice().tax_rate, Some(10.0));

    form.delete_item(0).unwrap();
    assert_eq!(form.invoice().tax_rate, None);
    assert_eq!(form.invoice().total_tax, None);
    assert_eq!(form.invoice().balance_paid, Some(0.0));
}

#[test]
fn test_edit_then_cancel_restores_item() {
    let mut form = InvoiceForm::default();
    stage(&mut form, "A", 1.0, 3.0);
    form.add_item().unwrap();
    stage(&mut form, "B", 2.0, 3.0);
    form.add_item().unwrap();
    let before: Vec<Item> = form.items().to_vec();

    form.begin_edit(0).unwrap();
    assert_eq!(form.items().len(), 1);
    form.pending_mut().description = Some("changed".into());
    form.cancel_edit().unwrap();

    assert_eq!(form.items(), before.as_slice());
    assert_eq!(form.invoice().sub_total, Some(9.0));
}

#[test]
fn test_legacy_row_order_appends_edited_row() {
    let mut form = InvoiceForm::new(FormOptions { keep_row_position: false });
    stage(&mut form, "A", 1.0, 1.0);
    form.add_item().unwrap();
    stage(&mut form, "B", 1.0, 2.0);
    form.add_item().unwrap();

    form.begin_edit(0).unwrap();
    form.commit_edit().unwrap();

    let order: Vec<_> = form.items().iter().map(|i| i.description.as_deref()).collect();
    assert_eq!(order, vec![Some("B"), Some("A")]);
}

#[test]
fn test_errors_do_not_mutate() {
    let mut form = InvoiceForm::default();
    stage(&mut form, "A", 1.0, 1.0);
    form.add_item().unwrap();
    let snapshot = form.invoice().clone();

    assert!(matches!(form.delete_item(1), Err(FormError::OutOfRange { index: 1, len: 1 })));
    assert!(matches!(form.begin_edit(5), Err(FormError::OutOfRange { .. })));
    assert!(matches!(form.commit_edit(), Err(FormError::NotEditing)));
    assert!(matches!(form.import_invoice("not json at all"), Err(FormError::Parse(_))));
    assert_eq!(form.invoice(), &snapshot);
}

#[test]
fn test_export_import_round_trip() {
    let mut form = InvoiceForm::default();
    {
        let invoice = form.invoice_mut();
        invoice.company_name = Some("Acme Corp".into());
        invoice.company_address = Some("1 Main St".into());
        invoice.zip_code = Some("02134".into());
        invoice.date = Some("2024-03-01".into());
        invoice.receipt_no = Some(17);
        invoice.notes = Some("Net 30".into());
        invoice.bill_to_mut().contact_name = Some("Jo".into());
        invoice.bill_to_mut().phone = Some("+1 555 0100".into());
        invoice.ship_to_mut().name_dep = Some("Receiving".into());
    }
    stage(&mut form, "Widget", 3.0, 12.25);
    form.add_item().unwrap();
    form.set_discount(Some(1.5));
    form.set_tax_rate(Some(8.875));

    let json = form.export_invoice().unwrap();

    let mut other = InvoiceForm::default();
    other.import_invoice(&json).unwrap();
    assert_eq!(other.invoice(), form.invoice());
}

#[test]
fn test_import_legacy_document() {
    let json = r#"{
        "items": [{ "description": "Paint", "qty": 2, "unitPrice": 15, "total": 30 }],
        "shipping": null,
        "taxRate": 10,
        "discount": null,
        "shipTo": { "phone": null, "address": "", "clientCompanyName": "", "nameDep": "" },
        "notes": "",
        "billTo": { "email": "", "phone": 5550100, "address": "", "clientCompanyName": "", "contactName": "" },
        "receiptNo": 3,
        "date": "2019-06-01",
        "zipCode": 12345,
        "companyAddress": "",
        "companyName": "Painters",
        "balancePaid": 33,
        "subTotal": 30,
        "subTotalLessDiscount": 30,
        "totalTax": 3
    }"#;

    let mut form = InvoiceForm::default();
    form.import_invoice(json).unwrap();

    let invoice: &Invoice = form.invoice();
    assert_eq!(invoice.company_name.as_deref(), Some("Painters"));
    assert_eq!(invoice.zip_code.as_deref(), Some("12345"));
    assert_eq!(invoice.bill_to.as_ref().and_then(|b| b.phone.as_deref()), Some("5550100"));
    assert_eq!(invoice.items[0].unit_price, Some(15.0));
    assert_eq!(invoice.balance_paid, Some(33.0));

    stage(&mut form, "Primer", 1.0, 10.0);
    form.add_item().unwrap();
    assert_eq!(form.invoice().balance_paid, Some(44.0));
}
