use super::{render_table, report, HmsStore, Session};
use crate::console::Console;
use hms_core::patients::PatientForm;
use hms_core::validation::parse_measurement;
use hms_core::workflows::AdmissionClerk;
use hms_core::{HmsError, HmsResult, NonEmptyText};
use std::io::{BufRead, Write};
use std::sync::Arc;

const OPTIONS: [&str; 5] = [
    "Admit new patient",
    "Admit existing patient",
    "View admission queue",
    "View patient",
    "Discharge next patient",
];

pub fn run<S, R, W>(console: &mut Console<R, W>, session: &Session<S>) -> HmsResult<()>
where
    S: HmsStore,
    R: BufRead,
    W: Write,
{
    let mut clerk = AdmissionClerk::open(Arc::clone(&session.repo), Arc::clone(&session.clock))?;

    loop {
        match console.menu("Patient Admission Clerk", &OPTIONS, "Back")? {
            0 => return Ok(()),
            1 => {
                let form = patient_form(console)?;
                if let Some(patient) = report(console, clerk.admit_new(form))? {
                    console.say(format!(
                        "Admitted {} as {} (BMI {}).",
                        patient.name, patient.patient_id, patient.bmi
                    ))?;
                }
            }
            2 => {
                let id = console.read_line("Enter Patient ID: ")?;
                let condition = text(console, "Current condition: ")?;
                if let Some(entry) = report(console, clerk.admit_existing(&id, condition))? {
                    let position = clerk.queue_position(&entry.patient_id).unwrap_or_default();
                    console.say(format!(
                        "{} queued at position {position}.",
                        entry.patient_id
                    ))?;
                }
            }
            3 => {
                let queue = clerk.queue();
                if queue.is_empty() {
                    console.say("The admission queue is empty.")?;
                    continue;
                }
                let rows: Vec<Vec<String>> = queue
                    .into_iter()
                    .map(|q| {
                        vec![
                            q.position.to_string(),
                            q.patient_id,
                            q.name,
                            q.condition,
                            q.admission_time,
                        ]
                    })
                    .collect();
                console.say(render_table(
                    &["#", "Patient ID", "Name", "Condition", "Admitted"],
                    &rows,
                ))?;
            }
            4 => {
                let id = console.read_line("Enter Patient ID: ")?;
                match clerk.find_patient(&id) {
                    Some(p) => console.say(format!(
                        "{} | {} | {}",
                        p.patient_id, p.name, p.condition
                    ))?,
                    None => console.say("Patient not found.")?,
                }
            }
            _ => match report(console, clerk.discharge_next())?.flatten() {
                Some(entry) => console.say(format!(
                    "Discharged {} at {}.",
                    entry.patient_id,
                    entry.discharge_field()
                ))?,
                None => console.say("No patients to discharge.")?,
            },
        }
    }
}

fn text<R: BufRead, W: Write>(console: &mut Console<R, W>, prompt: &str) -> HmsResult<NonEmptyText> {
    console.prompt_validated(prompt, |raw| Ok(NonEmptyText::new(raw)?))
}

fn number<T, R, W>(console: &mut Console<R, W>, prompt: &str, what: &str) -> HmsResult<T>
where
    T: std::str::FromStr + PartialOrd + Default,
    R: BufRead,
    W: Write,
{
    console.prompt_validated(prompt, |raw| match raw.parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(HmsError::InvalidInput(format!("{what} must be a positive whole number"))),
    })
}

fn patient_form<R: BufRead, W: Write>(console: &mut Console<R, W>) -> HmsResult<PatientForm> {
    Ok(PatientForm {
        name: text(console, "Name: ")?,
        age: number(console, "Age: ", "age")?,
        gender: text(console, "Gender: ")?,
        blood_type: text(console, "Blood type: ")?,
        height_cm: console.prompt_validated("Height (cm): ", |raw| parse_measurement(raw, "height"))?,
        weight_kg: console.prompt_validated("Weight (kg): ", |raw| parse_measurement(raw, "weight"))?,
        temperature_c: console
            .prompt_validated("Temperature (C): ", |raw| parse_measurement(raw, "temperature"))?,
        heart_rate_bpm: number(console, "Heart rate (bpm): ", "heart rate")?,
        blood_pressure: text(console, "Blood pressure: ")?,
        condition: text(console, "Condition: ")?,
    })
}

#[cfg(test)]
mod tests {
    use crate::menus::tests::{drive, session};
    use hms_core::repositories::{AdmissionRepository, MemoryRepository, PatientRepository};
    use tempfile::TempDir;

    #[test]
    fn admit_view_and_discharge() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp, MemoryRepository::new());

        let input = [
            "2", "1", "Ada Lovelace", "abc", "36", "F", "O+", "170", "65", "37.0", "72",
            "120/80", "Fever", "3", "4", "PAT-0001", "5", "5", "0", "0",
        ]
        .join("\n")
            + "\n";

        let (result, out) = drive(&session, &input);
        assert!(result.is_ok(), "{out}");
        assert!(out.contains("Admitted Ada Lovelace as PAT-0001 (BMI 22.49)."));
        assert!(out.contains("PAT-0001 | Ada Lovelace | Fever"));
        assert!(out.contains("Discharged PAT-0001 at 2025-03-09 08:00:00."));
        assert!(out.contains("No patients to discharge."));

        assert_eq!(session.repo.load_patients().unwrap().len(), 1);
        assert_eq!(session.repo.load_admissions().unwrap().len(), 1);
    }
}
