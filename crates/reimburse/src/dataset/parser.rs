use super::ReferenceCase;
use crate::engine::TripRecord;
use serde::Deserialize;
use std::io::Read;

pub(crate) fn parse_json<R: Read>(reader: R) -> Result<Vec<ReferenceCase>, serde_json::Error> {
    serde_json::from_reader(reader)
}

pub(crate) fn parse_csv<R: Read>(reader: R) -> Result<Vec<ReferenceCase>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut cases = Vec::new();

    for row in csv_reader.deserialize::<CaseRow>() {
        cases.push(row?.into());
    }

    Ok(cases)
}

#[derive(Debug, Deserialize)]
struct CaseRow {
    trip_duration_days: i64,
    miles_traveled: f64,
    total_receipts_amount: f64,
    expected_output: f64,
}

impl From<CaseRow> for ReferenceCase {
    fn from(row: CaseRow) -> Self {
        ReferenceCase {
            input: TripRecord {
                trip_duration_days: row.trip_duration_days,
                miles_traveled: row.miles_traveled,
                total_receipts_amount: row.total_receipts_amount,
            },
            expected_output: row.expected_output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_legacy_json_cases() {
        let json = r#"[
            {"input": {"trip_duration_days": 3, "miles_traveled": 93, "total_receipts_amount": 1.42}, "expected_output": 364.51},
            {"input": {"trip_duration_days": 1, "miles_traveled": 55, "total_receipts_amount": 3.6}, "expected_output": 126.06}
        ]"#;

        let cases = parse_json(Cursor::new(json)).expect("json parses");
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].input.trip_duration_days, 3);
        assert_eq!(cases[0].input.miles_traveled, 93.0);
        assert_eq!(cases[1].expected_output, 126.06);
    }

    #[test]
    fn parses_trimmed_csv_rows() {
        let csv = "trip_duration_days, miles_traveled, total_receipts_amount, expected_output\n5, 130, 306.9 , 574.1\n";

        let cases = parse_csv(Cursor::new(csv)).expect("csv parses");
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].input.total_receipts_amount, 306.9);
        assert_eq!(cases[0].expected_output, 574.1);
    }

    #[test]
    fn csv_rejects_non_numeric_fields() {
        let csv = "trip_duration_days,miles_traveled,total_receipts_amount,expected_output\nfive,130,306.9,574.1\n";
        assert!(parse_csv(Cursor::new(csv)).is_err());
    }
}
