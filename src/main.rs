use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use comfy_table::{Attribute, Cell, Color, Table};
use inquire::{Confirm, DateSelect, InquireError, Select, Text};
use log::{LevelFilter, debug, info};

use invoice_form::config::{self, AppSettings};
use invoice_form::model::Invoice;
use invoice_form::{InvoiceForm, store};

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Parser)]
#[command(name = "invoice-form")]
#[command(about = "Fill in an invoice, keep its totals right, save it as JSON")]
struct Cli {
    /// Log at info level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a blank invoice
    New,
    /// Load an invoice JSON file and keep editing it
    Open {
        /// File to load (opens a file picker when omitted)
        file: Option<PathBuf>,
    },
    /// Print an invoice JSON file
    Show { file: PathBuf },
    /// Configure export directory and editing behavior
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Company,
    BillTo,
    ShipTo,
    Notes,
    AddItem,
    EditItem,
    DeleteItem,
    Discount,
    TaxRate,
    Shipping,
    Show,
    Import,
    Export,
    Quit,
}

const ACTIONS: [Action; 14] = [
    Action::AddItem,
    Action::EditItem,
    Action::DeleteItem,
    Action::Discount,
    Action::TaxRate,
    Action::Shipping,
    Action::Company,
    Action::BillTo,
    Action::ShipTo,
    Action::Notes,
    Action::Show,
    Action::Import,
    Action::Export,
    Action::Quit,
];

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Company => "Company details",
            Action::BillTo => "Bill to",
            Action::ShipTo => "Ship to",
            Action::Notes => "Notes",
            Action::AddItem => "➕ Add item",
            Action::EditItem => "✏️  Edit item",
            Action::DeleteItem => "🗑  Delete item",
            Action::Discount => "Discount",
            Action::TaxRate => "Tax rate %",
            Action::Shipping => "Shipping",
            Action::Show => "Show invoice",
            Action::Import => "Import JSON",
            Action::Export => "Export JSON",
            Action::Quit => "Quit",
        };
        f.write_str(label)
    }
}

// ==========================================
// Main Function
// ==========================================

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::New => {
            let settings = config::load_settings()?;
            let mut form = InvoiceForm::new(settings.form_options());
            run_editor(&mut form, &settings)?;
        }
        Commands::Open { file } => {
            let settings = config::load_settings()?;
            let path = match file {
                Some(path) => path,
                None => match pick_import_file()? {
                    Some(path) => path,
                    None => {
                        println!("❌ No file selected.");
                        return Ok(());
                    }
                },
            };
            let mut form = InvoiceForm::new(settings.form_options());
            store::import_file(&mut form, &path)?;
            println!("✅ Loaded {}", path.display());
            run_editor(&mut form, &settings)?;
        }
        Commands::Show { file } => {
            let mut form = InvoiceForm::default();
            store::import_file(&mut form, &file)?;
            print_invoice(form.invoice());
        }
        Commands::Config => {
            setup_config_wizard()?;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    if verbose {
        env_logger::builder().filter_level(LevelFilter::Info).init();
        info!("Verbose output enabled (ignoring RUST_LOG environment variable)");
    } else {
        env_logger::init();
        debug!("Logging configured from environment variables");
    }
}

// ==========================================
// 1. Editor Loop
// ==========================================

fn run_editor(form: &mut InvoiceForm, settings: &AppSettings) -> Result<()> {
    println!("\n--- Invoice Editor ---");
    println!("(Esc cancels the current step, Ctrl-C leaves the editor)");

    loop {
        let choice = match Select::new("What next?", ACTIONS.to_vec())
            .with_page_size(ACTIONS.len())
            .prompt()
        {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled) => Action::Quit,
            Err(InquireError::OperationInterrupted) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let result = match choice {
            Action::Company => edit_company(form),
            Action::BillTo => edit_bill_to(form),
            Action::ShipTo => edit_ship_to(form),
            Action::Notes => edit_notes(form),
            Action::AddItem => add_item(form),
            Action::EditItem => edit_item(form),
            Action::DeleteItem => delete_item(form),
            Action::Discount => {
                prompt_number("Discount (empty = none):", form.invoice().discount)
                    .map(|v| form.set_discount(v))
            }
            Action::TaxRate => {
                prompt_number("Tax Rate % (empty = none):", form.invoice().tax_rate)
                    .map(|v| form.set_tax_rate(v))
            }
            Action::Shipping => {
                prompt_number("Shipping (empty = none):", form.invoice().shipping)
                    .map(|v| form.set_shipping(v))
            }
            Action::Show => {
                print_invoice(form.invoice());
                Ok(())
            }
            Action::Import => import_invoice(form),
            Action::Export => export_invoice(form, settings),
            Action::Quit => {
                let leave = Confirm::new("Quit? Changes that were not exported are lost.")
                    .with_default(false)
                    .prompt();
                match leave {
                    Ok(true) | Err(InquireError::OperationInterrupted) => return Ok(()),
                    _ => Ok(()),
                }
            }
        };

        report(result)?;

        if matches!(
            choice,
            Action::AddItem | Action::EditItem | Action::DeleteItem | Action::Discount | Action::TaxRate | Action::Shipping
        ) {
            print_totals(form.invoice());
        }
    }
}

// Esc on a prompt only abandons the current step; Ctrl-C ends the session.
fn report(result: Result<()>) -> Result<()> {
    let Err(e) = result else {
        return Ok(());
    };
    match e.downcast_ref::<InquireError>() {
        Some(InquireError::OperationCanceled) => {
            println!("Cancelled");
            Ok(())
        }
        Some(_) => Err(e),
        None => {
            println!("❌ {e:#}");
            Ok(())
        }
    }
}

// ==========================================
// 2. Header & Party Fields
// ==========================================

fn edit_company(form: &mut InvoiceForm) -> Result<()> {
    println!("\n--- Company Details ---");
    let invoice = form.invoice_mut();

    invoice.company_name = prompt_text("Company Name:", invoice.company_name.as_deref())?;

    invoice.zip_code = prompt_text("Zip Code (Leave empty to skip lookup):", invoice.zip_code.as_deref())?;
    if let Some(zip) = &invoice.zip_code {
        if let Ok(results) = zipcodes::matching(zip, None) {
            if let Some(info) = results.first() {
                println!("🚀 Found: {}, {}", info.city, info.state);
            }
        }
    }

    invoice.company_address = prompt_text("Company Address:", invoice.company_address.as_deref())?;

    let default_date = invoice
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Local::now().date_naive());
    let date = DateSelect::new("Invoice Date:").with_default(default_date).prompt()?;
    invoice.date = Some(date.format("%Y-%m-%d").to_string());

    invoice.receipt_no = prompt_receipt_no(invoice.receipt_no)?;
    Ok(())
}

fn edit_bill_to(form: &mut InvoiceForm) -> Result<()> {
    println!("\n--- Bill To ---");
    let bill_to = form.invoice_mut().bill_to_mut();
    bill_to.contact_name = prompt_text("Contact Name:", bill_to.contact_name.as_deref())?;
    bill_to.client_company_name = prompt_text("Client Company Name:", bill_to.client_company_name.as_deref())?;
    bill_to.address = prompt_text("Address:", bill_to.address.as_deref())?;
    bill_to.phone = prompt_text("Phone:", bill_to.phone.as_deref())?;
    bill_to.email = prompt_text("Email:", bill_to.email.as_deref())?;
    Ok(())
}

fn edit_ship_to(form: &mut InvoiceForm) -> Result<()> {
    println!("\n--- Ship To ---");
    let ship_to = form.invoice_mut().ship_to_mut();
    ship_to.name_dep = prompt_text("Name / Department:", ship_to.name_dep.as_deref())?;
    ship_to.client_company_name = prompt_text("Client Company Name:", ship_to.client_company_name.as_deref())?;
    ship_to.address = prompt_text("Address:", ship_to.address.as_deref())?;
    ship_to.phone = prompt_text("Phone:", ship_to.phone.as_deref())?;
    Ok(())
}

fn edit_notes(form: &mut InvoiceForm) -> Result<()> {
    let invoice = form.invoice_mut();
    invoice.notes = prompt_text("Notes:", invoice.notes.as_deref())?;
    Ok(())
}

// ==========================================
// 3. Line Items
// ==========================================

fn fill_pending(form: &mut InvoiceForm) -> Result<()> {
    let pending = form.pending_mut();
    pending.description = prompt_text("Description:", pending.description.as_deref())?;
    pending.qty = prompt_number("Qty:", pending.qty)?;
    pending.unit_price = prompt_number("Unit Price:", pending.unit_price)?;

    form.recompute_line_total();
    println!("Line total: {}", money(form.pending().total));
    Ok(())
}

fn add_item(form: &mut InvoiceForm) -> Result<()> {
    println!("\n--- New Item ---");
    form.clear_pending();
    if let Err(e) = fill_pending(form) {
        form.clear_pending();
        return Err(e);
    }

    if Confirm::new("Add this item?").with_default(true).prompt()? {
        form.add_item()?;
        println!("✅ Item added.");
    } else {
        form.clear_pending();
    }
    Ok(())
}

fn edit_item(form: &mut InvoiceForm) -> Result<()> {
    let Some(index) = select_item(form, "Select Item to Edit:")? else {
        return Ok(());
    };
    form.begin_edit(index)?;

    let update = fill_pending(form)
        .and_then(|()| Ok(Confirm::new("Update item?").with_default(true).prompt()?));

    match update {
        Ok(true) => {
            form.commit_edit()?;
            println!("✅ Item updated.");
            Ok(())
        }
        Ok(false) => {
            form.cancel_edit()?;
            println!("↩️  Item left unchanged.");
            Ok(())
        }
        Err(e) => {
            form.cancel_edit()?;
            Err(e)
        }
    }
}

fn delete_item(form: &mut InvoiceForm) -> Result<()> {
    let Some(index) = select_item(form, "Select Item to Delete:")? else {
        return Ok(());
    };
    let confirmed = Confirm::new("Do you want to delete this item?")
        .with_default(false)
        .prompt()?;
    if confirmed {
        form.delete_item(index)?;
        println!("✅ Item deleted.");
    }
    Ok(())
}

fn select_item(form: &InvoiceForm, prompt: &str) -> Result<Option<usize>> {
    if form.items().is_empty() {
        println!("❌ No items yet.");
        return Ok(None);
    }
    let options: Vec<String> = form
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}. {} | {} x {} = {}",
                i + 1,
                item.description.as_deref().unwrap_or("(no description)"),
                number(item.qty),
                money(item.unit_price),
                money(item.total)
            )
        })
        .collect();

    let choice = Select::new(prompt, options).with_page_size(10).raw_prompt()?;
    Ok(Some(choice.index))
}

// ==========================================
// 4. Import / Export
// ==========================================

fn pick_import_file() -> Result<Option<PathBuf>> {
    println!("📂 Opening file picker...");
    let picked = rfd::FileDialog::new()
        .set_title("Select Invoice JSON")
        .add_filter("JSON", &["json"])
        .pick_file();
    if picked.is_some() {
        return Ok(picked);
    }

    println!("❌ No file selected. Falling back to manual input.");
    let input = Text::new("Invoice file path (leave empty to cancel):").prompt()?;
    let input = input.trim();
    Ok((!input.is_empty()).then(|| PathBuf::from(config::expand_home_dir(input))))
}

fn import_invoice(form: &mut InvoiceForm) -> Result<()> {
    let Some(path) = pick_import_file()? else {
        return Ok(());
    };
    store::import_file(form, &path)?;
    println!("✅ Loaded {}", path.display());
    print_invoice(form.invoice());
    Ok(())
}

fn export_invoice(form: &InvoiceForm, settings: &AppSettings) -> Result<()> {
    let default_stem = store::default_file_stem(form.invoice());
    let name = Text::new("Enter File Name:").with_default(&default_stem).prompt()?;
    let dir = settings.export_root();
    let path = store::export_file(form, &dir, &name)
        .with_context(|| format!("exporting to {}", dir.display()))?;
    println!("✅ Saved: {}", path.display());
    Ok(())
}

// ==========================================
// 5. Rendering
// ==========================================

fn print_invoice(invoice: &Invoice) {
    println!();
    println!("🧾 {}", invoice.company_name.as_deref().unwrap_or("(no company name)"));
    if let Some(address) = &invoice.company_address {
        println!("   {} {}", address, invoice.zip_code.as_deref().unwrap_or(""));
    }
    println!(
        "   Date: {}   Receipt #: {}",
        invoice.date.as_deref().unwrap_or("-"),
        invoice.receipt_no.map(|n| n.to_string()).unwrap_or_else(|| "-".into())
    );

    if let Some(bill_to) = &invoice.bill_to {
        println!(
            "   Bill To: {} / {} / {} / {} / {}",
            text(&bill_to.contact_name),
            text(&bill_to.client_company_name),
            text(&bill_to.address),
            text(&bill_to.phone),
            text(&bill_to.email)
        );
    }
    if let Some(ship_to) = &invoice.ship_to {
        println!(
            "   Ship To: {} / {} / {} / {}",
            text(&ship_to.name_dep),
            text(&ship_to.client_company_name),
            text(&ship_to.address),
            text(&ship_to.phone)
        );
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Description"),
        Cell::new("Qty"),
        Cell::new("Unit Price"),
        Cell::new("Total"),
    ]);
    for (i, item) in invoice.items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(item.description.as_deref().unwrap_or("")),
            Cell::new(number(item.qty)),
            Cell::new(money(item.unit_price)),
            Cell::new(money(item.total)),
        ]);
    }
    println!("{table}");

    print_totals(invoice);

    if let Some(notes) = &invoice.notes {
        println!("Notes: {notes}");
    }
}

fn print_totals(invoice: &Invoice) {
    let mut table = Table::new();
    table.add_row(vec![Cell::new("Subtotal"), Cell::new(money(invoice.sub_total))]);
    table.add_row(vec![Cell::new("Discount"), Cell::new(money(invoice.discount))]);
    table.add_row(vec![
        Cell::new("Subtotal less discount"),
        Cell::new(money(invoice.sub_total_less_discount)),
    ]);
    table.add_row(vec![
        Cell::new("Tax rate"),
        Cell::new(invoice.tax_rate.map(|r| format!("{r}%")).unwrap_or_else(|| "-".into())),
    ]);
    table.add_row(vec![Cell::new("Total tax"), Cell::new(money(invoice.total_tax))]);
    table.add_row(vec![Cell::new("Shipping"), Cell::new(money(invoice.shipping))]);

    let balance = Cell::new(money(invoice.balance_paid)).add_attribute(Attribute::Bold);
    let balance = match invoice.balance_paid {
        Some(b) if b < 0.0 => balance.fg(Color::Rgb { r: 185, g: 28, b: 28 }),
        _ => balance,
    };
    table.add_row(vec![Cell::new("Balance").add_attribute(Attribute::Bold), balance]);
    println!("{table}");
}

fn money(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

// ==========================================
// 6. Prompt Helpers
// ==========================================

// Empty input clears the field.
fn prompt_text(label: &str, current: Option<&str>) -> Result<Option<String>> {
    let input = Text::new(label)
        .with_initial_value(current.unwrap_or(""))
        .prompt()?;
    let input = input.trim();
    Ok((!input.is_empty()).then(|| input.to_string()))
}

fn prompt_number(label: &str, current: Option<f64>) -> Result<Option<f64>> {
    let initial = current.map(|n| n.to_string()).unwrap_or_default();
    loop {
        let input = Text::new(label).with_initial_value(&initial).prompt()?;
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        match input.parse::<f64>() {
            Ok(n) if n.is_finite() => return Ok(Some(n)),
            _ => println!("⚠️  '{input}' is not a number, try again."),
        }
    }
}

fn prompt_receipt_no(current: Option<u64>) -> Result<Option<u64>> {
    let initial = current.map(|n| n.to_string()).unwrap_or_default();
    loop {
        let input = Text::new("Receipt No:").with_initial_value(&initial).prompt()?;
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        match input.parse::<u64>() {
            Ok(n) => return Ok(Some(n)),
            Err(_) => println!("⚠️  '{input}' is not a whole number, try again."),
        }
    }
}

// ==========================================
// 7. Config
// ==========================================

fn setup_config_wizard() -> Result<AppSettings> {
    println!("\n⚙️  --- Configuration Setup ---");
    let (current, broken) = config::load_settings_or_default_from(&config::config_path());
    if let Some(e) = broken {
        println!("⚠️  {e}");
        println!("Starting from default settings; saving will replace that file.");
    }

    println!("📂 Opening folder picker...");
    let picked_path = rfd::FileDialog::new()
        .set_title("Select Export Directory")
        .pick_folder();

    let export_dir = if let Some(path) = picked_path {
        path.to_string_lossy().to_string()
    } else {
        println!("❌ No folder selected. Falling back to manual input.");
        Text::new("Export Directory:")
            .with_default(&current.export_dir)
            .prompt()?
    };

    let keep_row_position = Confirm::new("Keep an edited item at its original row?")
        .with_default(current.keep_row_position)
        .prompt()?;

    let settings = AppSettings { export_dir, keep_row_position };
    config::save_settings(&settings)?;
    println!("✅ Settings saved to {}", config::config_path().display());
    Ok(settings)
}
