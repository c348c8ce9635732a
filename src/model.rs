use serde::{Deserialize, Deserializer, Serialize};

// Every field is optional: `None` means "not applicable", never zero.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub zip_code: Option<String>,
    pub date: Option<String>, // YYYY-MM-DD
    pub receipt_no: Option<u64>,
    pub bill_to: Option<BillTo>,
    pub ship_to: Option<ShipTo>,
    #[serde(deserialize_with = "null_as_empty")]
    pub items: Vec<Item>,
    pub notes: Option<String>,
    pub sub_total: Option<f64>,
    pub discount: Option<f64>,
    pub sub_total_less_discount: Option<f64>,
    pub tax_rate: Option<f64>, // percent
    pub total_tax: Option<f64>,
    pub shipping: Option<f64>,
    pub balance_paid: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BillTo {
    pub contact_name: Option<String>,
    pub client_company_name: Option<String>,
    pub address: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ShipTo {
    pub name_dep: Option<String>, // recipient name or department
    pub client_company_name: Option<String>,
    pub address: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    pub description: Option<String>,
    pub qty: Option<f64>,
    pub unit_price: Option<f64>,
    pub total: Option<f64>,
}

impl Item {
    /// `qty * unit_price` when both are present and non-zero, otherwise `0`.
    pub fn line_total(&self) -> f64 {
        match (self.qty, self.unit_price) {
            (Some(qty), Some(price)) if qty != 0.0 && price != 0.0 => qty * price,
            _ => 0.0,
        }
    }
}

impl Invoice {
    pub fn bill_to_mut(&mut self) -> &mut BillTo {
        self.bill_to.get_or_insert_with(BillTo::default)
    }

    pub fn ship_to_mut(&mut self) -> &mut ShipTo {
        self.ship_to.get_or_insert_with(ShipTo::default)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

// Phone numbers and zip codes show up as JSON numbers in older exports.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<TextOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Unsigned(n) => n.to_string(),
        TextOrNumber::Signed(n) => n.to_string(),
        TextOrNumber::Float(n) => n.to_string(),
    }))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Item>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Item>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_needs_both_operands() {
        let item = Item { qty: Some(3.0), unit_price: Some(10.0), ..Default::default() };
        assert_eq!(item.line_total(), 30.0);

        let zero_qty = Item { qty: Some(0.0), unit_price: Some(10.0), ..Default::default() };
        assert_eq!(zero_qty.line_total(), 0.0);

        let zero_price = Item { qty: Some(4.0), unit_price: Some(0.0), ..Default::default() };
        assert_eq!(zero_price.line_total(), 0.0);

        let missing = Item { qty: Some(4.0), ..Default::default() };
        assert_eq!(missing.line_total(), 0.0);
    }

    #[test]
    fn numeric_phone_and_zip_are_read_as_text() {
        let json = r#"{
            "zipCode": 10001,
            "billTo": { "phone": 5551234, "email": "a@b.c" },
            "shipTo": { "phone": "+1 555 0100" }
        }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.zip_code.as_deref(), Some("10001"));
        assert_eq!(invoice.bill_to.as_ref().unwrap().phone.as_deref(), Some("5551234"));
        assert_eq!(invoice.ship_to.as_ref().unwrap().phone.as_deref(), Some("+1 555 0100"));
    }

    #[test]
    fn missing_and_null_fields_are_absent() {
        let json = r#"{ "companyName": "Acme", "discount": null, "shipTo": null, "items": null, "extra": [1, 2] }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.company_name.as_deref(), Some("Acme"));
        assert_eq!(invoice.discount, None);
        assert_eq!(invoice.ship_to, None);
        assert_eq!(invoice.zip_code, None);
        assert!(invoice.items.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let invoice = Invoice {
            sub_total_less_discount: Some(90.0),
            items: vec![Item { unit_price: Some(5.0), ..Default::default() }],
            ..Default::default()
        };
        let json = serde_json::to_value(&invoice).unwrap();
        assert_eq!(json["subTotalLessDiscount"], 90.0);
        assert_eq!(json["items"][0]["unitPrice"], 5.0);
        assert!(json["balancePaid"].is_null());
    }
}
