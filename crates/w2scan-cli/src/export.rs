//! CSV and JSON export of batch results.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::debug;

use w2scan_core::BatchResult;

/// Summary CSV header, in column order.
pub const CSV_COLUMNS: [&str; 17] = [
    "Filename",
    "Employee Name",
    "Employee SSN",
    "Employer Name",
    "Employer EIN",
    "Wages/Tips",
    "Federal Tax",
    "SS Wages",
    "SS Tax",
    "Medicare Wages",
    "Medicare Tax",
    "State Wages",
    "State Tax",
    "Local Wages",
    "Local Tax",
    "Control Number",
    "Processing Time",
];

fn csv_row(result: &BatchResult) -> [&str; 17] {
    let r = &result.record;
    [
        result.filename.as_str(),
        r.employee_name.as_str(),
        r.employee_ssn.as_str(),
        r.employer_name.as_str(),
        r.employer_ein.as_str(),
        r.wages_tips.as_str(),
        r.federal_income_tax.as_str(),
        r.social_security_wages.as_str(),
        r.social_security_tax.as_str(),
        r.medicare_wages.as_str(),
        r.medicare_tax.as_str(),
        r.state_wages.as_str(),
        r.state_income_tax.as_str(),
        r.local_wages.as_str(),
        r.local_income_tax.as_str(),
        r.control_number.as_str(),
        result.processing_timestamp.as_str(),
    ]
}

/// Write the summary CSV (header plus one row per result).
pub fn write_csv<W: Write>(writer: W, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_COLUMNS)?;
    for result in results {
        wtr.write_record(csv_row(result))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Summary CSV as a string.
pub fn csv_string(results: &[BatchResult]) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, results)?;
    Ok(String::from_utf8(buf)?)
}

/// Results as a pretty-printed JSON array.
pub fn json_string(results: &[BatchResult]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// `{prefix}_{YYYYMMDD_HHMMSS}.{ext}`
pub fn timestamped_name(prefix: &str, ext: &str, at: &DateTime<Local>) -> String {
    format!("{}_{}.{}", prefix, at.format("%Y%m%d_%H%M%S"), ext)
}

/// Which export files to write and where.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub csv: bool,
    pub json: bool,
}

/// Write the requested exports and return the paths written.
pub fn export_results(
    results: &[BatchResult],
    options: &ExportOptions,
    at: &DateTime<Local>,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(&options.output_dir)?;
    let mut written = Vec::new();

    if options.csv {
        let path = options
            .output_dir
            .join(timestamped_name(&options.file_prefix, "csv", at));
        write_csv(fs::File::create(&path)?, results)?;
        written.push(path);
    }

    if options.json {
        let path = options
            .output_dir
            .join(timestamped_name(&options.file_prefix, "json", at));
        fs::write(&path, json_string(results)?)?;
        written.push(path);
    }

    for path in &written {
        debug!("Wrote {}", path.display());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use w2scan_core::W2Record;

    fn sample() -> BatchResult {
        let mut record = W2Record::new();
        record.employee_name = "Doe, Jane".to_string();
        record.employee_ssn = "123-45-6789".to_string();
        record.wages_tips = "75,000.00".to_string();
        BatchResult {
            record,
            filename: "w2.pdf".to_string(),
            file_size: "1.00 KB".to_string(),
            processing_timestamp: "2024-02-01 09:30:00".to_string(),
            extracted_by: "pattern".to_string(),
        }
    }

    #[test]
    fn test_csv_header_and_quoting() {
        let csv = csv_string(&[sample()]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Filename,Employee Name,Employee SSN,Employer Name,Employer EIN,Wages/Tips,\
Federal Tax,SS Wages,SS Tax,Medicare Wages,Medicare Tax,State Wages,State Tax,\
Local Wages,Local Tax,Control Number,Processing Time"
        );
        assert_eq!(
            lines.next().unwrap(),
            "w2.pdf,\"Doe, Jane\",123-45-6789,,,\"75,000.00\",,,,,,,,,,,2024-02-01 09:30:00"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_csv_has_header_only() {
        let csv = csv_string(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_json_is_flat_and_indented() {
        let json = json_string(&[sample()]).unwrap();
        assert!(json.starts_with("[\n  {\n    \""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let item = &value[0];
        assert_eq!(item["employee_ssn"], "123-45-6789");
        assert_eq!(item["filename"], "w2.pdf");
        assert_eq!(item["file_size"], "1.00 KB");
        assert_eq!(item["other_info"], serde_json::json!([]));
    }

    #[test]
    fn test_timestamped_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(timestamped_name("w2_data", "csv", &at), "w2_data_20240305_070809.csv");
    }

    #[test]
    fn test_export_writes_requested_files() {
        let dir = tempfile::tempdir().unwrap();
        let at = Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let options = ExportOptions {
            output_dir: dir.path().join("out"),
            file_prefix: "w2_data".to_string(),
            csv: false,
            json: true,
        };

        let written = export_results(&[sample()], &options, &at).unwrap();
        assert_eq!(written, vec![dir.path().join("out/w2_data_20240305_070809.json")]);

        let parsed: Vec<BatchResult> =
            serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(parsed, vec![sample()]);
    }
}
