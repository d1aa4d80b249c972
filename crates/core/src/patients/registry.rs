use super::directory::PatientRecord;
use crate::constants::PATIENT_ID_PREFIX;
use hms_types::NonEmptyText;
use serde::Serialize;

/// A registered patient as stored in `patient_data.csv`.
///
/// Vitals are kept as the text that was recorded; only the admission form
/// parses them.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Patient {
    pub patient_id: String,
    pub name: String,
    pub age: String,
    pub gender: String,
    pub blood_type: String,
    pub height_cm: String,
    pub weight_kg: String,
    pub bmi: String,
    pub temperature_c: String,
    pub heart_rate_bpm: String,
    pub blood_pressure: String,
    pub condition: String,
}

impl Patient {
    pub fn record(&self) -> PatientRecord {
        PatientRecord {
            patient_id: self.patient_id.clone(),
            patient_name: self.name.clone(),
        }
    }
}

/// Validated input for admitting a new patient.
#[derive(Clone, Debug)]
pub struct PatientForm {
    pub name: NonEmptyText,
    pub age: u8,
    pub gender: NonEmptyText,
    pub blood_type: NonEmptyText,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub temperature_c: f64,
    pub heart_rate_bpm: u16,
    pub blood_pressure: NonEmptyText,
    pub condition: NonEmptyText,
}

impl PatientForm {
    pub(crate) fn into_patient(self, patient_id: String) -> Patient {
        let bmi = body_mass_index(self.height_cm, self.weight_kg)
            .map(|bmi| format!("{bmi:.2}"))
            .unwrap_or_default();
        Patient {
            patient_id,
            name: self.name.into_string(),
            age: self.age.to_string(),
            gender: self.gender.into_string(),
            blood_type: self.blood_type.into_string(),
            height_cm: format!("{:.2}", self.height_cm),
            weight_kg: format!("{:.2}", self.weight_kg),
            bmi,
            temperature_c: format!("{:.2}", self.temperature_c),
            heart_rate_bpm: self.heart_rate_bpm.to_string(),
            blood_pressure: self.blood_pressure.into_string(),
            condition: self.condition.into_string(),
        }
    }
}

/// Weight in kilograms over height in metres squared.
pub fn body_mass_index(height_cm: f64, weight_kg: f64) -> Option<f64> {
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    Some(weight_kg / (height_m * height_m))
}

#[derive(Clone, Debug, Default)]
pub struct PatientRegistry {
    patients: Vec<Patient>,
}

impl PatientRegistry {
    pub fn from_patients(patients: Vec<Patient>) -> Self {
        Self { patients }
    }

    /// `PAT-` followed by one more than the highest existing number, zero-padded
    /// to four digits.
    pub fn next_patient_id(&self) -> String {
        let max = self
            .patients
            .iter()
            .filter_map(|p| p.patient_id.strip_prefix(PATIENT_ID_PREFIX))
            .filter_map(|digits| digits.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("{PATIENT_ID_PREFIX}{:04}", max + 1)
    }

    pub fn find(&self, patient_id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.patient_id == patient_id)
    }

    pub fn find_mut(&mut self, patient_id: &str) -> Option<&mut Patient> {
        self.patients.iter_mut().find(|p| p.patient_id == patient_id)
    }

    pub fn push(&mut self, patient: Patient) {
        self.patients.push(patient);
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn as_slice(&self) -> &[Patient] {
        &self.patients
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: &str) -> Patient {
        Patient {
            patient_id: id.into(),
            name: "Test".into(),
            ..Patient::default()
        }
    }

    #[test]
    fn bmi_uses_metres() {
        let bmi = body_mass_index(180.0, 81.0).unwrap();
        assert!((bmi - 25.0).abs() < 1e-9);
        assert!(body_mass_index(0.0, 70.0).is_none());
    }

    #[test]
    fn next_patient_id_is_padded_and_skips_gaps() {
        let mut registry = PatientRegistry::default();
        assert_eq!(registry.next_patient_id(), "PAT-0001");

        registry.push(patient("PAT-0001"));
        registry.push(patient("PAT-0007"));
        registry.push(patient("LEGACY-3"));
        assert_eq!(registry.next_patient_id(), "PAT-0008");
    }

    #[test]
    fn form_rounds_measurements_and_computes_bmi() {
        let form = PatientForm {
            name: NonEmptyText::new("Grace Hopper").unwrap(),
            age: 40,
            gender: NonEmptyText::new("F").unwrap(),
            blood_type: NonEmptyText::new("O+").unwrap(),
            height_cm: 165.0,
            weight_kg: 60.0,
            temperature_c: 36.6,
            heart_rate_bpm: 72,
            blood_pressure: NonEmptyText::new("120/80").unwrap(),
            condition: NonEmptyText::new("Fever").unwrap(),
        };

        let p = form.into_patient("PAT-0002".into());
        assert_eq!(p.bmi, "22.04");
        assert_eq!(p.height_cm, "165.00");
        assert_eq!(p.temperature_c, "36.60");
        assert_eq!(p.record().patient_name, "Grace Hopper");
    }
}
