use chrono::{NaiveDate, Timelike, Utc};
use csv_live::{
    ColumnType, SourceError,
    data::{Cell, coerce, parse_utc_datetime},
    schema::parse_header,
    snapshot::build_snapshot,
};
use encoding_rs::UTF_8;
use proptest::prelude::*;

fn datetime_strategy() -> impl Strategy<Value = chrono::NaiveDateTime> {
    (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, mo, d, h, mi, s)| {
            NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap()
        },
    )
}

proptest! {
    #[test]
    fn unannotated_headers_are_strings(name in "[A-Za-z][A-Za-z0-9 _:]{0,12}") {
        prop_assume!(!name.contains("::"));
        let header = parse_header(&[name.as_str()]).unwrap();
        prop_assert_eq!(header.columns[0].column_type, ColumnType::String);
        prop_assert_eq!(&header.columns[0].name, &name);
    }

    #[test]
    fn datetime_keeps_wall_clock_under_any_offset(naive in datetime_strategy(),
                                                  offset_hours in -12i32..=12) {
        let sign = if offset_hours < 0 { '-' } else { '+' };
        let text = format!(
            "{}{}{:02}:00",
            naive.format("%Y-%m-%dT%H:%M:%S"),
            sign,
            offset_hours.abs()
        );
        let parsed = parse_utc_datetime(&text).unwrap();
        prop_assert_eq!(parsed.timezone(), Utc);
        prop_assert_eq!(parsed.naive_utc(), naive);
        prop_assert_eq!(parsed.hour(), naive.hour());
    }

    #[test]
    fn invariant_us_format_round_trips(naive in datetime_strategy()) {
        let text = naive.format("%m/%d/%Y %H:%M:%S").to_string();
        prop_assert_eq!(parse_utc_datetime(&text).unwrap().naive_utc(), naive);
    }

    #[test]
    fn non_numeric_text_never_coerces_to_numbers(raw in "[a-zA-Z ]{1,10}") {
        prop_assume!(!raw.trim().eq_ignore_ascii_case("inf")
            && !raw.trim().eq_ignore_ascii_case("infinity")
            && !raw.trim().eq_ignore_ascii_case("nan"));
        let is_conversion = |result: Result<Cell, SourceError>| {
            matches!(result, Err(SourceError::TypeConversion { .. }))
        };
        prop_assert!(is_conversion(coerce(&raw, 0, ColumnType::Integer)));
        prop_assert!(is_conversion(coerce(&raw, 0, ColumnType::Double)));
    }
}

#[test]
fn bad_boolean_aborts_the_pass_without_rows() {
    let err = build_snapshot(
        "Name,Active::bool\na,true\nb,maybe\n".as_bytes(),
        b',',
        UTF_8,
    )
    .unwrap_err();
    assert!(matches!(
        err.root_cause(),
        SourceError::TypeConversion {
            column: 1,
            target: ColumnType::Boolean,
            ..
        }
    ));
}

#[test]
fn unknown_type_tokens_fall_back_to_string() {
    let header = parse_header(&["Price::money", "When::date", "Id::key"]).unwrap();
    assert!(header.column_types().all(|ty| ty == ColumnType::String));
    assert_eq!(header.key_column_index, Some(2));
}

#[test]
fn key_column_does_not_drive_identity() {
    let snapshot = build_snapshot("Id::key,Name\n42,a\n7,b\n".as_bytes(), b',', UTF_8).unwrap();
    let identities = snapshot
        .rows
        .iter()
        .map(|row| row.identity.as_str())
        .collect::<Vec<_>>();
    assert_eq!(identities, vec!["0", "1"]);
    assert_eq!(snapshot.rows[0].cells[0], Cell::String("42".into()));
}
