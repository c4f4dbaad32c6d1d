use super::*;
use super::record::HUMAN_TIME_FORMAT;
use chrono::{Local, TimeZone};
use std::io::Write;
use tempfile::NamedTempFile;

fn row(timestamp: &str, suspicious: &str) -> RawRow {
    RawRow {
        ip: "203.0.113.9".to_string(),
        latitude: "51.5".to_string(),
        longitude: "-0.12".to_string(),
        timestamp: timestamp.to_string(),
        suspicious: suspicious.to_string(),
    }
}

#[test]
fn test_decode_valid_row() {
    let package = decode(&row("1700000000", "1")).unwrap();

    let expected_time = Local
        .timestamp_opt(1_700_000_000, 0)
        .unwrap()
        .format(HUMAN_TIME_FORMAT)
        .to_string();

    assert_eq!(package.ip, "203.0.113.9");
    assert_eq!(package.latitude, 51.5);
    assert_eq!(package.longitude, -0.12);
    assert_eq!(package.timestamp, 1_700_000_000);
    assert_eq!(package.suspicious, 1);
    assert_eq!(package.human_readable_time, expected_time);
}

#[test]
fn test_decode_suspicious_labels() {
    assert_eq!(decode(&row("1", "0")).unwrap().suspicious, 0);
    assert_eq!(decode(&row("1", "1.0")).unwrap().suspicious, 1);
    assert_eq!(decode(&row("1", "0.0")).unwrap().suspicious, 0);
    assert!(decode(&row("1", "maybe")).is_err());
}

#[test]
fn test_decode_rejects_non_integer_timestamp() {
    for bad in ["", "abc", "1700000000.5", "17e8"] {
        let err = decode(&row(bad, "0")).unwrap_err();
        assert!(matches!(err, DecodeError::Timestamp(_)), "{:?} -> {:?}", bad, err);
    }
}

#[test]
fn test_decode_rejects_bad_coordinates() {
    let mut bad = row("1", "0");
    bad.latitude = "north".to_string();

    let err = decode(&bad).unwrap_err();
    assert!(matches!(err, DecodeError::Number { field: "latitude", .. }));
}

#[test]
fn test_wire_package_json_shape() {
    let package = decode(&row("100", "1")).unwrap();
    let json = serde_json::to_value(&package).unwrap();

    assert_eq!(json["ip"], "203.0.113.9");
    assert_eq!(json["timestamp"], 100);
    assert_eq!(json["suspicious"], 1);
    assert!(json["human_readable_time"].is_string());
}

#[test]
fn test_rows_from_file_by_header_name() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "ip address,Latitude,Longitude,Timestamp,suspicious,notes").unwrap();
    writeln!(file, "198.51.100.1, 40.7,-74.0,100,0,first").unwrap();
    writeln!(file, "198.51.100.2,48.8,2.3,oops,1.0,bad timestamp").unwrap();
    writeln!(file, "198.51.100.3,35.6,139.7,107,1,third").unwrap();
    file.flush().unwrap();

    let decoded: Vec<_> = rows(open(file.path()).unwrap())
        .map(|r| r.and_then(|raw| decode(&raw)))
        .collect();

    assert_eq!(decoded.len(), 3);
    let first = decoded[0].as_ref().unwrap();
    assert_eq!(first.ip, "198.51.100.1");
    assert_eq!(first.latitude, 40.7);
    assert!(decoded[1].is_err());
    assert_eq!(decoded[2].as_ref().unwrap().timestamp, 107);
}

#[test]
fn test_short_row_is_an_error_not_a_stop() {
    let data = "ip address,Latitude,Longitude,Timestamp,suspicious\n\
                198.51.100.1,1,2\n\
                198.51.100.2,1,2,5,0\n";

    let raw: Vec<_> = rows(reader(data.as_bytes())).collect();

    assert_eq!(raw.len(), 2);
    assert!(matches!(raw[0], Err(DecodeError::Row(_))));
    assert_eq!(raw[1].as_ref().unwrap().timestamp, "5");
}
