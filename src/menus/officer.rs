use super::{render_table, report, HmsStore, Session};
use crate::console::Console;
use hms_core::catalog::TypeChoice;
use hms_core::emergency::{CaseStatus, EmergencyCase};
use hms_core::supplies::{SupplyCatalog, SupplyType};
use hms_core::validation::parse_positive;
use hms_core::workflows::{EmergencyOfficer, NewCase, UsageRequest};
use hms_core::{HmsResult, NonEmptyText, PriorityLevel};
use std::io::{BufRead, Write};
use std::sync::Arc;

const OPTIONS: [&str; 7] = [
    "View all emergency cases",
    "View cases by status",
    "Add new emergency case",
    "View next pending case",
    "Process next pending case",
    "Complete a processing case",
    "Reconcile supply usage",
];

const CASE_HEADERS: [&str; 8] = [
    "Case ID", "Patient", "Name", "Type", "Priority", "Status", "Logged", "Ambulance",
];

pub fn run<S, R, W>(console: &mut Console<R, W>, session: &Session<S>) -> HmsResult<()>
where
    S: HmsStore,
    R: BufRead,
    W: Write,
{
    let mut officer = EmergencyOfficer::open(
        Arc::clone(&session.repo),
        Arc::clone(&session.cfg),
        Arc::clone(&session.clock),
    )?;

    loop {
        match console.menu("Emergency Department Officer", &OPTIONS, "Back")? {
            0 => return Ok(()),
            1 => view_all(console, &officer)?,
            2 => view_by_status(console, &officer)?,
            3 => add_case(console, &mut officer)?,
            4 => match officer.peek_next_pending() {
                Some(case) => console.say(case_table(&[case]))?,
                None => console.say("No pending cases.")?,
            },
            5 => process_next(console, &mut officer)?,
            6 => complete_case(console, &mut officer)?,
            _ => {
                if let Some(summary) = report(console, officer.reconcile_supplies())? {
                    console.say(format!("Deducted {} usage entries.", summary.deducted))?;
                    for id in &summary.insufficient {
                        console.say(format!("  insufficient stock in {id}"))?;
                    }
                    for id in &summary.missing {
                        console.say(format!("  batch {id} not in inventory"))?;
                    }
                }
            }
        }
    }
}

fn case_row(case: &EmergencyCase) -> Vec<String> {
    vec![
        case.case_id.clone(),
        case.patient_id.clone(),
        case.patient_name.clone(),
        case.emergency_type.clone(),
        case.priority.to_string(),
        case.status.to_string(),
        case.timestamp_logged.clone(),
        case.ambulance_id.clone().unwrap_or_else(|| "-".into()),
    ]
}

fn case_table(cases: &[&EmergencyCase]) -> String {
    let rows: Vec<Vec<String>> = cases.iter().map(|c| case_row(c)).collect();
    render_table(&CASE_HEADERS, &rows)
}

fn view_all<S: HmsStore, R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    officer: &EmergencyOfficer<S>,
) -> HmsResult<()> {
    if officer.store().is_empty() {
        return console.say("No emergency cases.");
    }
    console.say(case_table(&officer.store().display_order()))
}

fn view_by_status<S: HmsStore, R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    officer: &EmergencyOfficer<S>,
) -> HmsResult<()> {
    for status in [CaseStatus::Pending, CaseStatus::Processing, CaseStatus::Completed] {
        let cases: Vec<&EmergencyCase> = officer.store().iter_by_status(&status).collect();
        console.say(format!("\n{status} ({})", cases.len()))?;
        if !cases.is_empty() {
            console.say(case_table(&cases))?;
        }
    }

    let odd: Vec<&EmergencyCase> = officer.store().unrecognised().collect();
    if !odd.is_empty() {
        console.say(format!("\nUnrecognised status ({})", odd.len()))?;
        console.say(case_table(&odd))?;
    }
    Ok(())
}

fn add_case<S: HmsStore, R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    officer: &mut EmergencyOfficer<S>,
) -> HmsResult<()> {
    let patient_id = console.prompt_validated("Enter Patient ID: ", |raw| {
        Ok(NonEmptyText::new(raw)?)
    })?;

    console.say("Emergency types:")?;
    for (i, label) in officer.types().iter().enumerate() {
        console.say(format!("{}. {label}", i + 1))?;
    }
    let new_index = officer.types().len() + 1;
    console.say(format!("{new_index}. Enter a new type"))?;
    let index = console.choose("Select emergency type: ", new_index)?;
    let emergency_type = match officer.types().choice(index) {
        Some(TypeChoice::Existing(label)) => NonEmptyText::new(label)?,
        _ => console.prompt_validated("Enter new emergency type: ", |raw| {
            Ok(NonEmptyText::new(raw)?)
        })?,
    };

    let priority = console.prompt_validated("Enter Priority Level (1-5): ", |raw| {
        Ok(raw.parse::<PriorityLevel>()?)
    })?;

    let new = NewCase {
        patient_id,
        emergency_type,
        priority,
    };
    if let Some(case) = report(console, officer.add_case(new))? {
        console.say(format!(
            "Case {} logged for {} ({}).",
            case.case_id, case.patient_name, case.patient_id
        ))?;
    }
    Ok(())
}

fn process_next<S: HmsStore, R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    officer: &mut EmergencyOfficer<S>,
) -> HmsResult<()> {
    let Some(next) = officer.peek_next_pending() else {
        return console.say("No pending cases.");
    };
    console.say(case_table(&[next]))?;
    let assign = console.confirm("Assign an ambulance? (y/n): ")?;

    if let Some(promotion) = report(console, officer.promote_next(assign))?.flatten() {
        console.say(format!("Case {} is now Processing.", promotion.case.case_id))?;
        match (&promotion.case.ambulance_id, promotion.no_ambulance_available) {
            (Some(ambulance), _) => console.say(format!("Ambulance {ambulance} assigned."))?,
            (None, true) => console.say("No ambulance available; none assigned.")?,
            (None, false) => {}
        }
    }
    Ok(())
}

fn complete_case<S: HmsStore, R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    officer: &mut EmergencyOfficer<S>,
) -> HmsResult<()> {
    let processing: Vec<&EmergencyCase> = officer.processing_cases();
    if processing.is_empty() {
        return console.say("No cases are being processed.");
    }
    console.say(case_table(&processing))?;
    let index = console.choose("Select case to complete: ", processing.len())?;
    let case_id = processing[index - 1].case_id.clone();

    let Some(catalog) = report(console, officer.supply_catalog())? else {
        return Ok(());
    };
    let mut usage = Vec::new();
    while console.confirm("Record a supply used for this case? (y/n): ")? {
        if let Some(request) = pick_usage(console, &catalog)? {
            usage.push(request);
        }
    }

    if let Some(done) = report(console, officer.complete_case(&case_id, &usage))? {
        console.say(format!(
            "Case {} completed; {} supply entries logged.",
            done.case.case_id,
            done.logged.len()
        ))?;
        if let Some(ambulance) = done.released_ambulance {
            console.say(format!("Ambulance {ambulance} released."))?;
        }
    }
    Ok(())
}

/// Type, then name, then batch, then quantity.
fn pick_usage<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    catalog: &SupplyCatalog,
) -> HmsResult<Option<UsageRequest>> {
    let types = catalog.types();
    if types.is_empty() {
        console.say("No supplies in inventory.")?;
        return Ok(None);
    }
    for (i, supply_type) in types.iter().enumerate() {
        console.say(format!("{}. {supply_type}", i + 1))?;
    }
    let supply_type = &types[console.choose("Select supply type: ", types.len())? - 1];

    let names = catalog.names_for(supply_type);
    for (i, name) in names.iter().enumerate() {
        console.say(format!("{}. {name}", i + 1))?;
    }
    let name = names[console.choose("Select supply: ", names.len())? - 1];

    let batches = catalog.batches_for(name, supply_type);
    if batches.is_empty() {
        console.say(format!("No stock left for {name}."))?;
        return Ok(None);
    }
    for (i, batch) in batches.iter().enumerate() {
        console.say(format!(
            "{}. {} (qty {}, expires {})",
            i + 1,
            batch.supply_batch_id,
            batch.quantity,
            batch.expiry_date
        ))?;
    }
    let batch = batches[console.choose("Select batch: ", batches.len())? - 1];

    let quantity = if batch.supply_type == SupplyType::Eqp {
        console.say("Equipment is recorded as 1 unit.")?;
        1
    } else {
        let requested =
            console.prompt_validated("Quantity used: ", |raw| parse_positive(raw, "quantity"))?;
        let clamped = batch.clamp_usage(requested);
        if clamped < requested {
            console.say(format!("Only {clamped} in stock; recording {clamped}."))?;
        }
        clamped
    };

    Ok(Some(UsageRequest {
        supply_batch_id: batch.supply_batch_id.clone(),
        quantity,
    }))
}

#[cfg(test)]
mod tests {
    use crate::menus::tests::{drive, session};
    use hms_core::emergency::CaseStatus;
    use hms_core::repositories::{CaseRepository, MemoryRepository, UsageLogRepository};
    use hms_core::supplies::{SupplyBatch, SupplyType};
    use tempfile::TempDir;

    #[test]
    fn add_process_and_complete_a_case() {
        let temp = TempDir::new().unwrap();
        let repo = MemoryRepository::new().with_supplies(vec![SupplyBatch {
            supply_batch_id: "MED-PAR-0001".into(),
            name: "Paracetamol".into(),
            supply_type: SupplyType::Med,
            quantity: 10,
            status: "Available".into(),
            supplier_name: "Acme".into(),
            timestamp_added: "2025-01-01".into(),
            expiry_date: "2027-01-01".into(),
        }]);
        let session = session(&temp, repo);

        let input = [
            "1",            // officer
            "3",            // add case
            "PAT-0001",     // patient id
            "1",            // new type
            "trauma",       // type label
            "9",            // rejected priority
            "2",            // priority
            "5",            // process next
            "n",            // no ambulance
            "6",            // complete
            "1",            // the processing case
            "y",            // record supply
            "1",            // MED
            "1",            // Paracetamol
            "1",            // MED-PAR-0001
            "4",            // quantity
            "n",            // done
            "0",            // back
            "0",            // exit
        ]
        .join("\n")
            + "\n";

        let (result, out) = drive(&session, &input);
        assert!(result.is_ok(), "{out}");
        assert!(out.contains("Case CASE-3351 logged for Unknown (PAT-0001)."));
        assert!(out.contains("Case CASE-3351 completed; 1 supply entries logged."));

        let cases = session.repo.load_cases().unwrap();
        assert_eq!(cases[0].status, CaseStatus::Completed);
        assert_eq!(cases[0].emergency_type, "TRAUMA");
        assert_eq!(session.repo.load_usage_log().unwrap()[0].quantity_used, 4);
    }
}
