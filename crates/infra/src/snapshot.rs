//! Plain-text files: voucher snapshots and the customer blacklist.
//!
//! A voucher snapshot is a sequence of [`Voucher::to_file_string`] blocks
//! separated by one blank line. The blacklist is a CSV file with the columns
//! `id,name,email,created_at` (RFC 3339); a header row is optional. A field may
//! be wrapped in double quotes to hold commas, with `""` standing for one quote.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use voucherdesk_core::{CustomerId, DomainError};
use voucherdesk_customers::Customer;
use voucherdesk_vouchers::Voucher;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `index` is 1-based.
    #[error("voucher block #{index} is malformed: {source}")]
    Block {
        index: usize,
        #[source]
        source: DomainError,
    },

    /// `line` is 1-based.
    #[error("blacklist line {line} is malformed: {reason}")]
    Blacklist { line: usize, reason: String },
}

pub fn render_vouchers(vouchers: &[Voucher]) -> String {
    let mut out = vouchers
        .iter()
        .map(Voucher::to_file_string)
        .collect::<Vec<_>>()
        .join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

pub fn parse_vouchers(text: &str) -> Result<Vec<Voucher>, SnapshotError> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
        .iter()
        .enumerate()
        .map(|(i, lines)| {
            Voucher::from_file_block(&lines.join("\n"))
                .map_err(|source| SnapshotError::Block { index: i + 1, source })
        })
        .collect()
}

pub fn write_vouchers(path: impl AsRef<Path>, vouchers: &[Voucher]) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    fs::write(path, render_vouchers(vouchers)).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), count = vouchers.len(), "voucher snapshot written");
    Ok(())
}

pub fn read_vouchers(path: impl AsRef<Path>) -> Result<Vec<Voucher>, SnapshotError> {
    let text = read_to_string(path.as_ref())?;
    parse_vouchers(&text)
}

pub fn read_blacklist(path: impl AsRef<Path>) -> Result<Vec<Customer>, SnapshotError> {
    let text = read_to_string(path.as_ref())?;
    parse_blacklist(&text)
}

pub fn parse_blacklist(text: &str) -> Result<Vec<Customer>, SnapshotError> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .filter(|(n, line)| !(*n == 1 && line.to_ascii_lowercase().starts_with("id,")))
        .map(|(n, line)| {
            parse_blacklist_line(line).map_err(|reason| SnapshotError::Blacklist { line: n, reason })
        })
        .collect()
}

fn parse_blacklist_line(line: &str) -> Result<Customer, String> {
    let fields = split_csv_line(line)?;
    let [id, name, email, created_at] = fields.as_slice() else {
        return Err(format!("expected 4 columns, found {}", fields.len()));
    };

    let id: CustomerId = id.parse().map_err(|e: DomainError| e.to_string())?;
    let created_at = DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid created_at '{created_at}': {e}"))?;

    Customer::new(id, name.as_str(), email.as_str(), created_at).map_err(|e| e.to_string())
}

/// Split one CSV record into trimmed fields, honouring double-quoted fields.
fn split_csv_line(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' if quoted => quoted = false,
            '"' if field.trim().is_empty() => {
                field.clear();
                quoted = true;
            }
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }

    if quoted {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field.trim().to_string());
    Ok(fields)
}

fn read_to_string(path: &Path) -> Result<String, SnapshotError> {
    fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use voucherdesk_core::{timestamp_now, VoucherId};
    use voucherdesk_vouchers::VoucherType;

    fn sample() -> Vec<Voucher> {
        vec![
            Voucher::fixed_amount(Some(VoucherId::new()), 5000, timestamp_now()).unwrap(),
            Voucher::percent_discount(Some(VoucherId::new()), 50, timestamp_now()).unwrap(),
            Voucher::issue(VoucherType::FixedAmount, 7).unwrap(),
        ]
    }

    #[test]
    fn snapshot_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vouchers.txt");
        let vouchers = sample();

        write_vouchers(&path, &vouchers).unwrap();
        assert_eq!(read_vouchers(&path).unwrap(), vouchers);
    }

    #[test]
    fn blocks_are_separated_by_a_blank_line() {
        let text = render_vouchers(&sample()[..2]);
        assert_eq!(text.matches("\n\n").count(), 1);
        assert_eq!(text.lines().count(), 9);
        assert_eq!(render_vouchers(&[]), "");
    }

    #[test]
    fn extra_blank_lines_are_tolerated() {
        let vouchers = sample();
        let text = format!("\n\n{}\n\n\n", render_vouchers(&vouchers).replace("\n\n", "\n\n\n"));
        assert_eq!(parse_vouchers(&text).unwrap(), vouchers);
    }

    #[test]
    fn malformed_block_names_its_index() {
        let good = sample()[0].to_file_string();
        let text = format!("{good}\n\nFixedAmount\n0\n2026-10-19T09:30:00+00:00\n");

        match parse_vouchers(&text) {
            Err(SnapshotError::Block { index, source }) => {
                assert_eq!(index, 2);
                assert!(matches!(source, DomainError::ValueRange(_)));
            }
            other => panic!("expected block error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_vouchers(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }

    #[test]
    fn blacklist_is_read_with_or_without_header() {
        let id = CustomerId::new();
        let body = format!("{id},tester,tester@mail.com,2026-10-19T09:30:00+00:00\n");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blacklist.csv");
        std::fs::write(&path, format!("id,name,email,created_at\n{body}")).unwrap();

        let customers = read_blacklist(&path).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].id_typed(), id);
        assert_eq!(customers[0].email(), "tester@mail.com");

        assert_eq!(parse_blacklist(&body).unwrap(), customers);
    }

    #[test]
    fn blacklist_reports_the_bad_line() {
        let text = format!(
            "id,name,email,created_at\n{},ok,ok@mail.com,2026-10-19T09:30:00+00:00\nbroken line\n",
            CustomerId::new()
        );
        match parse_blacklist(&text) {
            Err(SnapshotError::Blacklist { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected blacklist error, got {other:?}"),
        }
    }

    #[test]
    fn blacklist_names_may_be_quoted() {
        let id = CustomerId::new();
        let text = format!(r#"{id}, "Doe, ""JJ"" Jane" ,jane@mail.com,2026-10-19T09:30:00+00:00"#);

        let customers = parse_blacklist(&text).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name(), r#"Doe, "JJ" Jane"#);
        assert_eq!(customers[0].email(), "jane@mail.com");
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let text = format!(r#"{},"Doe, Jane,jane@mail.com,2026-10-19T09:30:00+00:00"#, CustomerId::new());
        match parse_blacklist(&text) {
            Err(SnapshotError::Blacklist { line, reason }) => {
                assert_eq!(line, 1);
                assert!(reason.contains("unterminated"));
            }
            other => panic!("expected blacklist error, got {other:?}"),
        }
    }
}
