use super::{render_table, report, HmsStore, Session};
use crate::console::Console;
use hms_core::supplies::{SupplyBatch, SupplyType};
use hms_core::validation::{parse_date, parse_future_date, parse_positive, validate_batch_number};
use hms_core::workflows::{NewSupply, SupplyManager};
use hms_core::{HmsError, HmsResult, NonEmptyText};
use std::io::{BufRead, Write};
use std::sync::Arc;

const OPTIONS: [&str; 4] = [
    "Add supply batch",
    "Remove most recently added batch",
    "View inventory",
    "Reconcile supply usage",
];

pub fn run<S, R, W>(console: &mut Console<R, W>, session: &Session<S>) -> HmsResult<()>
where
    S: HmsStore,
    R: BufRead,
    W: Write,
{
    let mut manager = SupplyManager::open(Arc::clone(&session.repo), Arc::clone(&session.clock))?;
    let today = session.clock.today();

    loop {
        match console.menu("Medical Supply Manager", &OPTIONS, "Back")? {
            0 => return Ok(()),
            1 => {
                let supply_type = console.prompt_validated("Supply type (MED/EQP/PPE): ", |raw| {
                    let parsed = SupplyType::parse(raw);
                    if parsed.is_recognised() {
                        Ok(parsed)
                    } else {
                        Err(HmsError::InvalidInput("supply type must be MED, EQP or PPE".into()))
                    }
                })?;
                let name = console.prompt_validated("Supply name: ", |raw| Ok(NonEmptyText::new(raw)?))?;
                let batch_number = console.prompt_validated("4-digit batch number: ", |raw| {
                    validate_batch_number(raw).map(str::to_string)
                })?;
                let quantity =
                    console.prompt_validated("Quantity: ", |raw| parse_positive(raw, "quantity"))?;
                let supplier = console.prompt_validated("Supplier: ", |raw| Ok(NonEmptyText::new(raw)?))?;
                let received = console.prompt_validated("Received date (YYYY-MM-DD): ", parse_date)?;
                let expiry = console.prompt_validated("Expiry date (YYYY-MM-DD): ", |raw| {
                    parse_future_date(raw, today)
                })?;

                let new = NewSupply {
                    supply_type,
                    name,
                    batch_number,
                    quantity,
                    supplier,
                    received,
                    expiry,
                };
                if let Some(batch) = report(console, manager.add_supply(new))? {
                    console.say(format!("Added batch {}.", batch.supply_batch_id))?;
                }
            }
            2 => match report(console, manager.remove_last())?.flatten() {
                Some(batch) => console.say(format!(
                    "Removed batch {} ({}).",
                    batch.supply_batch_id, batch.name
                ))?,
                None => console.say("Inventory is empty.")?,
            },
            3 => {
                let rows: Vec<Vec<String>> = manager.inventory().map(batch_row).collect();
                if rows.is_empty() {
                    console.say("Inventory is empty.")?;
                } else {
                    console.say(render_table(
                        &["Batch ID", "Name", "Type", "Qty", "Status", "Supplier", "Added", "Expires"],
                        &rows,
                    ))?;
                }
            }
            _ => {
                if let Some(summary) = report(console, manager.reconcile())? {
                    console.say(format!(
                        "Deducted {} usage entries ({} insufficient, {} missing).",
                        summary.deducted,
                        summary.insufficient.len(),
                        summary.missing.len()
                    ))?;
                }
            }
        }
    }
}

fn batch_row(b: &SupplyBatch) -> Vec<String> {
    vec![
        b.supply_batch_id.clone(),
        b.name.clone(),
        b.supply_type.to_string(),
        b.quantity.to_string(),
        b.status.clone(),
        b.supplier_name.clone(),
        b.timestamp_added.clone(),
        b.expiry_date.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use crate::menus::tests::{drive, session};
    use hms_core::repositories::{MemoryRepository, SupplyRepository};
    use tempfile::TempDir;

    #[test]
    fn add_view_and_remove() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp, MemoryRepository::new());

        let input = [
            "3", "1", "DRUG", "med", "Saline", "12", "0042", "0", "20", "Acme", "2025-3-1",
            "2025-03-01", "2025-03-09", "2026-03-09", "3", "2", "2", "0", "0",
        ]
        .join("\n")
            + "\n";

        let (result, out) = drive(&session, &input);
        assert!(result.is_ok(), "{out}");
        assert!(out.contains("Added batch MED-SAL-0042."));
        assert!(out.contains("MED-SAL-0042  Saline"));
        assert!(out.contains("Removed batch MED-SAL-0042 (Saline)."));
        assert!(out.contains("Inventory is empty."));

        assert!(session.repo.load_supplies().unwrap().is_empty());
        assert_eq!(session.repo.removed_supplies()[0].1, "2025-03-09");
    }
}
