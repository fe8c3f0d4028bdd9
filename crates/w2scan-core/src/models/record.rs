//! W-2 record model: a fixed set of string fields, all present even when empty.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Scalar fields of a W-2 record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    EmployeeName,
    EmployeeSsn,
    EmployeeAddress,
    EmployeeCityStateZip,
    EmployerName,
    EmployerEin,
    EmployerAddress,
    EmployerCityStateZip,
    /// Box 1.
    WagesTips,
    /// Box 2.
    FederalIncomeTax,
    /// Box 3.
    SocialSecurityWages,
    /// Box 4.
    SocialSecurityTax,
    /// Box 5.
    MedicareWages,
    /// Box 6.
    MedicareTax,
    /// Box 16.
    StateWages,
    /// Box 17.
    StateIncomeTax,
    /// Box 18.
    LocalWages,
    /// Box 19.
    LocalIncomeTax,
    /// Box d.
    ControlNumber,
}

impl FieldName {
    /// Every scalar field, in canonical order.
    pub const ALL: [FieldName; 19] = [
        FieldName::EmployeeName,
        FieldName::EmployeeSsn,
        FieldName::EmployeeAddress,
        FieldName::EmployeeCityStateZip,
        FieldName::EmployerName,
        FieldName::EmployerEin,
        FieldName::EmployerAddress,
        FieldName::EmployerCityStateZip,
        FieldName::WagesTips,
        FieldName::FederalIncomeTax,
        FieldName::SocialSecurityWages,
        FieldName::SocialSecurityTax,
        FieldName::MedicareWages,
        FieldName::MedicareTax,
        FieldName::StateWages,
        FieldName::StateIncomeTax,
        FieldName::LocalWages,
        FieldName::LocalIncomeTax,
        FieldName::ControlNumber,
    ];

    /// Canonical snake_case key, as used in JSON and in the model prompt.
    pub fn key(&self) -> &'static str {
        match self {
            FieldName::EmployeeName => "employee_name",
            FieldName::EmployeeSsn => "employee_ssn",
            FieldName::EmployeeAddress => "employee_address",
            FieldName::EmployeeCityStateZip => "employee_city_state_zip",
            FieldName::EmployerName => "employer_name",
            FieldName::EmployerEin => "employer_ein",
            FieldName::EmployerAddress => "employer_address",
            FieldName::EmployerCityStateZip => "employer_city_state_zip",
            FieldName::WagesTips => "wages_tips",
            FieldName::FederalIncomeTax => "federal_income_tax",
            FieldName::SocialSecurityWages => "social_security_wages",
            FieldName::SocialSecurityTax => "social_security_tax",
            FieldName::MedicareWages => "medicare_wages",
            FieldName::MedicareTax => "medicare_tax",
            FieldName::StateWages => "state_wages",
            FieldName::StateIncomeTax => "state_income_tax",
            FieldName::LocalWages => "local_wages",
            FieldName::LocalIncomeTax => "local_income_tax",
            FieldName::ControlNumber => "control_number",
        }
    }

    /// Parse a canonical key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Whether the field holds a dollar amount.
    pub fn is_monetary(&self) -> bool {
        matches!(
            self,
            FieldName::WagesTips
                | FieldName::FederalIncomeTax
                | FieldName::SocialSecurityWages
                | FieldName::SocialSecurityTax
                | FieldName::MedicareWages
                | FieldName::MedicareTax
                | FieldName::StateWages
                | FieldName::StateIncomeTax
                | FieldName::LocalWages
                | FieldName::LocalIncomeTax
        )
    }
}

/// Fields extracted from one W-2 form.
///
/// Every field is always serialized, empty when not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct W2Record {
    pub employee_name: String,
    pub employee_ssn: String,
    pub employee_address: String,
    pub employee_city_state_zip: String,
    pub employer_name: String,
    pub employer_ein: String,
    pub employer_address: String,
    pub employer_city_state_zip: String,
    pub wages_tips: String,
    pub federal_income_tax: String,
    pub social_security_wages: String,
    pub social_security_tax: String,
    pub medicare_wages: String,
    pub medicare_tax: String,
    pub state_wages: String,
    pub state_income_tax: String,
    pub local_wages: String,
    pub local_income_tax: String,
    pub control_number: String,

    /// Residual content no field claimed. Currently never populated.
    pub other_info: Vec<String>,
}

impl W2Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a scalar field.
    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::EmployeeName => &self.employee_name,
            FieldName::EmployeeSsn => &self.employee_ssn,
            FieldName::EmployeeAddress => &self.employee_address,
            FieldName::EmployeeCityStateZip => &self.employee_city_state_zip,
            FieldName::EmployerName => &self.employer_name,
            FieldName::EmployerEin => &self.employer_ein,
            FieldName::EmployerAddress => &self.employer_address,
            FieldName::EmployerCityStateZip => &self.employer_city_state_zip,
            FieldName::WagesTips => &self.wages_tips,
            FieldName::FederalIncomeTax => &self.federal_income_tax,
            FieldName::SocialSecurityWages => &self.social_security_wages,
            FieldName::SocialSecurityTax => &self.social_security_tax,
            FieldName::MedicareWages => &self.medicare_wages,
            FieldName::MedicareTax => &self.medicare_tax,
            FieldName::StateWages => &self.state_wages,
            FieldName::StateIncomeTax => &self.state_income_tax,
            FieldName::LocalWages => &self.local_wages,
            FieldName::LocalIncomeTax => &self.local_income_tax,
            FieldName::ControlNumber => &self.control_number,
        }
    }

    /// Set a scalar field.
    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        let slot = match field {
            FieldName::EmployeeName => &mut self.employee_name,
            FieldName::EmployeeSsn => &mut self.employee_ssn,
            FieldName::EmployeeAddress => &mut self.employee_address,
            FieldName::EmployeeCityStateZip => &mut self.employee_city_state_zip,
            FieldName::EmployerName => &mut self.employer_name,
            FieldName::EmployerEin => &mut self.employer_ein,
            FieldName::EmployerAddress => &mut self.employer_address,
            FieldName::EmployerCityStateZip => &mut self.employer_city_state_zip,
            FieldName::WagesTips => &mut self.wages_tips,
            FieldName::FederalIncomeTax => &mut self.federal_income_tax,
            FieldName::SocialSecurityWages => &mut self.social_security_wages,
            FieldName::SocialSecurityTax => &mut self.social_security_tax,
            FieldName::MedicareWages => &mut self.medicare_wages,
            FieldName::MedicareTax => &mut self.medicare_tax,
            FieldName::StateWages => &mut self.state_wages,
            FieldName::StateIncomeTax => &mut self.state_income_tax,
            FieldName::LocalWages => &mut self.local_wages,
            FieldName::LocalIncomeTax => &mut self.local_income_tax,
            FieldName::ControlNumber => &mut self.control_number,
        };
        *slot = value.into();
    }

    /// Number of scalar fields with a non-blank value.
    pub fn filled_count(&self) -> usize {
        FieldName::ALL
            .iter()
            .filter(|f| !self.get(**f).trim().is_empty())
            .count()
    }

    /// True when no field carries data.
    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0 && self.other_info.is_empty()
    }

    /// Build a record from a loosely-typed JSON object.
    ///
    /// Known keys are copied, unknown keys are dropped and missing keys stay
    /// empty. Strings are trimmed, numbers rendered as text, nulls ignored.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut record = Self::new();

        for (key, value) in object {
            let Some(field) = FieldName::from_key(key) else {
                if key != "other_info" {
                    debug!("Ignoring unknown field in model output: {}", key);
                }
                continue;
            };

            let text = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => continue,
                other => {
                    debug!("Ignoring non-scalar value for {}: {}", key, other);
                    continue;
                }
            };
            record.set(field, text);
        }

        record
    }
}
