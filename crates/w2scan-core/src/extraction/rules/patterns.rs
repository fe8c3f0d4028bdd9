//! Regex table for W-2 field extraction.
//!
//! Patterns run against whitespace-collapsed text, case-insensitively. The
//! regex crate has no look-ahead, so free-text captures are lazy and end at a
//! trailing label group; only group 1 is used.

use lazy_static::lazy_static;
use regex::Regex;

use super::{CaptureKind, FieldPatterns, FieldRule};
use crate::models::record::FieldName;

/// Dollar amount: optional `$`, digits with thousands commas, optional cents.
const AMOUNT: &str = r"[:\s]*\$?(\d[\d,]*(?:\.\d+)?)";

/// Employee-side free text ends at one of these labels.
const PERSON_END: &str = r"\s*(?:\b(?:SSN|Address|Box)\b|$)";

/// Employer-side free text ends at one of these labels.
const EMPLOYER_END: &str = r"\s*(?:\b(?:EIN|Address|Box)\b|$)";

/// Address lines end at the next address-block label.
const ADDRESS_END: &str =
    r"\s*(?:\b(?:City|State|ZIP|Box|Employer|Employee|SSN|EIN|Control)\b|$)";

const ADDRESS_CAPTURE: &str = r"([A-Za-z0-9\s.,#'/-]+?)";

const CITY_STATE_ZIP_CAPTURE: &str = r"([A-Za-z\s,.]+?\d{5}(?:-\d{4})?)";

fn rule(pattern: &str, kind: CaptureKind) -> FieldRule {
    FieldRule::new(Regex::new(&format!("(?i){}", pattern)).unwrap(), kind)
}

fn amount_rules(box_label: &str, caption: &str) -> Vec<FieldRule> {
    vec![
        rule(&format!(r"\bBox {}\b{}", box_label, AMOUNT), CaptureKind::Amount),
        rule(&format!(r"{}{}", caption, AMOUNT), CaptureKind::Amount),
    ]
}

lazy_static! {
    /// Whitespace runs, collapsed to a single space before matching.
    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Ordered rules per field, in output order.
    pub static ref FIELD_PATTERNS: Vec<FieldPatterns> = vec![
        FieldPatterns {
            field: FieldName::EmployeeName,
            rules: vec![
                rule(&format!(r"Employee['’]?s name[:\s]*([A-Za-z\s]+?){}", PERSON_END), CaptureKind::Name),
                rule(&format!(r"\bName[:\s]*([A-Za-z\s]+?){}", PERSON_END), CaptureKind::Name),
            ],
        },
        FieldPatterns {
            field: FieldName::EmployeeSsn,
            rules: vec![
                rule(r"\bSSN[:\s]*(\d{3}-\d{2}-\d{4})\b", CaptureKind::Identifier),
                rule(r"Social Security Number[:\s]*(\d{3}-\d{2}-\d{4})\b", CaptureKind::Identifier),
            ],
        },
        FieldPatterns {
            field: FieldName::EmployeeAddress,
            rules: vec![
                rule(&format!(r"Employee['’]?s address[:\s]*{}{}", ADDRESS_CAPTURE, ADDRESS_END), CaptureKind::Address),
                rule(&format!(r"\bAddress[:\s]*{}{}", ADDRESS_CAPTURE, ADDRESS_END), CaptureKind::Address),
            ],
        },
        FieldPatterns {
            field: FieldName::EmployeeCityStateZip,
            rules: vec![
                rule(&format!(r"Employee['’]?s City,? State,?(?: and)? ZIP(?: code)?[:\s]*{}", CITY_STATE_ZIP_CAPTURE), CaptureKind::Address),
                rule(&format!(r"City,? State,?(?: and)? ZIP(?: code)?[:\s]*{}", CITY_STATE_ZIP_CAPTURE), CaptureKind::Address),
                // Bare "words then ZIP" anywhere in the text. Not anchored to an
                // address block, so it can pick up unrelated text that happens to
                // precede five digits.
                rule(&format!(r"{}\b", CITY_STATE_ZIP_CAPTURE), CaptureKind::Address),
            ],
        },
        FieldPatterns {
            field: FieldName::EmployerName,
            rules: vec![
                rule(&format!(r"Employer['’]?s name[:\s]*([A-Za-z\s&.,]+?){}", EMPLOYER_END), CaptureKind::Name),
                rule(&format!(r"\bEmployer[:\s]*([A-Za-z\s&.,]+?){}", EMPLOYER_END), CaptureKind::Name),
            ],
        },
        FieldPatterns {
            field: FieldName::EmployerEin,
            rules: vec![
                rule(r"\bEIN[:\s]*(\d{2}-\d{7})\b", CaptureKind::Identifier),
                rule(r"Employer identification number(?:\s*\(EIN\))?[:\s]*(\d{2}-\d{7})\b", CaptureKind::Identifier),
            ],
        },
        FieldPatterns {
            field: FieldName::EmployerAddress,
            rules: vec![
                rule(&format!(r"Employer['’]?s address[:\s]*{}{}", ADDRESS_CAPTURE, ADDRESS_END), CaptureKind::Address),
            ],
        },
        FieldPatterns {
            field: FieldName::EmployerCityStateZip,
            rules: vec![
                rule(&format!(r"Employer['’]?s City,? State,?(?: and)? ZIP(?: code)?[:\s]*{}", CITY_STATE_ZIP_CAPTURE), CaptureKind::Address),
            ],
        },
        FieldPatterns {
            field: FieldName::WagesTips,
            rules: amount_rules("1", r"Wages, tips, other comp(?:\.|ensation)"),
        },
        FieldPatterns {
            field: FieldName::FederalIncomeTax,
            rules: amount_rules("2", r"Federal income tax withheld"),
        },
        FieldPatterns {
            field: FieldName::SocialSecurityWages,
            rules: amount_rules("3", r"Social security wages"),
        },
        FieldPatterns {
            field: FieldName::SocialSecurityTax,
            rules: amount_rules("4", r"Social security tax withheld"),
        },
        FieldPatterns {
            field: FieldName::MedicareWages,
            rules: amount_rules("5", r"Medicare wages and tips"),
        },
        FieldPatterns {
            field: FieldName::MedicareTax,
            rules: amount_rules("6", r"Medicare tax withheld"),
        },
        FieldPatterns {
            field: FieldName::StateWages,
            rules: amount_rules("16", r"State wages, tips, etc\."),
        },
        FieldPatterns {
            field: FieldName::StateIncomeTax,
            rules: amount_rules("17", r"State income tax"),
        },
        FieldPatterns {
            field: FieldName::LocalWages,
            rules: amount_rules("18", r"Local wages, tips, etc\."),
        },
        FieldPatterns {
            field: FieldName::LocalIncomeTax,
            rules: amount_rules("19", r"Local income tax"),
        },
        FieldPatterns {
            field: FieldName::ControlNumber,
            rules: vec![
                rule(r"\bBox d\b[:\s]*([A-Za-z0-9]+)", CaptureKind::Code),
                rule(r"Control number[:\s]*([A-Za-z0-9]+)", CaptureKind::Code),
            ],
        },
    ];
}
