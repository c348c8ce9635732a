//! Reading and writing invoice JSON files.
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::info;
use slug::slugify;

use crate::error::StoreError;
use crate::form::InvoiceForm;
use crate::model::Invoice;

/// Appends `.json` unless the name already carries it. The name must be a
/// bare file name so the export stays inside the export directory.
pub fn export_file_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::EmptyFileName);
    }
    let mut components = Path::new(name).components();
    let bare = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !bare || name.contains(['/', '\\']) {
        return Err(StoreError::InvalidFileName(name.to_string()));
    }
    if name.to_ascii_lowercase().ends_with(".json") {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}.json"))
    }
}

/// Suggested file stem, e.g. `acme-corp-42`.
pub fn default_file_stem(invoice: &Invoice) -> String {
    let base = invoice
        .company_name
        .as_deref()
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "invoice".to_string());

    match invoice.receipt_no {
        Some(no) => format!("{base}-{no}"),
        None => base,
    }
}

/// Loads `path` into the form. The form is only replaced if the whole file
/// reads and parses.
pub fn import_file(form: &mut InvoiceForm, path: &Path) -> Result<(), StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    form.import_invoice(&text)?;
    info!("loaded invoice from {}", path.display());
    Ok(())
}

/// Writes the form's invoice to `dir/name` and returns the full path.
pub fn export_file(form: &InvoiceForm, dir: &Path, name: &str) -> Result<PathBuf, StoreError> {
    let file_name = export_file_name(name)?;
    let json = form.export_invoice()?;

    fs::create_dir_all(dir).map_err(|source| StoreError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(file_name);
    fs::write(&path, json).map_err(|source| StoreError::Write {
        path: path.clone(),
        source,
    })?;

    info!("saved invoice to {}", path.display());
    Ok(path)
}
