//! Line-oriented textual form of a voucher.
//!
//! A block is the voucher id, the variant tag, the value and the creation time,
//! one per line and always in that order:
//!
//! ```text
//! 3f2c8b1e-9d4a-4c6e-8f0a-2b7d5e1c9a34
//! FixedAmount
//! 5000
//! 2026-10-19T09:30:00+00:00
//! ```
//!
//! Unsaved vouchers have no id and are written as three lines. The owner
//! reference is not part of the form.

use chrono::{DateTime, Utc};

use voucherdesk_core::{DomainError, DomainResult, VoucherId};

use crate::voucher::{Voucher, VoucherType};

impl VoucherType {
    /// Inverse of [`VoucherType::file_tag`].
    pub fn from_file_tag(tag: &str) -> DomainResult<Self> {
        VoucherType::ALL
            .into_iter()
            .find(|t| t.file_tag() == tag.trim())
            .ok_or_else(|| DomainError::validation(format!("unknown voucher tag '{}'", tag.trim())))
    }
}

impl Voucher {
    /// Render the voucher as a three- or four-line block (no trailing newline).
    pub fn to_file_string(&self) -> String {
        let body = format!(
            "{}\n{}\n{}",
            self.voucher_type().file_tag(),
            self.value(),
            self.created_at().to_rfc3339()
        );
        match self.id_typed() {
            Some(id) => format!("{id}\n{body}"),
            None => body,
        }
    }

    /// Parse a block produced by [`Voucher::to_file_string`].
    ///
    /// The value is validated exactly like a constructor call.
    pub fn from_file_block(block: &str) -> DomainResult<Self> {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let (id, rest) = match lines.as_slice() {
            [id, rest @ ..] if rest.len() == 3 => (Some(id.parse::<VoucherId>()?), rest),
            rest if rest.len() == 3 => (None, rest),
            other => {
                return Err(DomainError::validation(format!(
                    "voucher block must have 3 or 4 lines, found {}",
                    other.len()
                )));
            }
        };

        let voucher_type = VoucherType::from_file_tag(rest[0])?;
        let value: i64 = rest[1]
            .parse()
            .map_err(|_| DomainError::validation(format!("invalid voucher value '{}'", rest[1])))?;
        let created_at = DateTime::parse_from_rfc3339(rest[2])
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DomainError::validation(format!("invalid created_at '{}': {e}", rest[2])))?;

        Voucher::new(voucher_type, id, value, created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voucherdesk_core::timestamp_now;

    #[test]
    fn renders_fields_in_fixed_order() {
        let id = VoucherId::new();
        let created_at = timestamp_now();
        let voucher = Voucher::fixed_amount(Some(id), 5000, created_at).unwrap();

        let text = voucher.to_file_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                id.to_string(),
                "FixedAmount".to_string(),
                "5000".to_string(),
                created_at.to_rfc3339(),
            ]
        );
    }

    #[test]
    fn parses_back_the_same_fields() {
        let voucher = Voucher::percent_discount(Some(VoucherId::new()), 50, timestamp_now()).unwrap();

        let parsed = Voucher::from_file_block(&voucher.to_file_string()).unwrap();

        assert_eq!(parsed.id_typed(), voucher.id_typed());
        assert_eq!(parsed.voucher_type(), VoucherType::PercentDiscount);
        assert_eq!(parsed.value(), 50);
        assert_eq!(parsed.created_at(), voucher.created_at());
    }

    #[test]
    fn unsaved_voucher_uses_three_lines() {
        let voucher = Voucher::issue(VoucherType::FixedAmount, 700).unwrap();
        let text = voucher.to_file_string();

        assert_eq!(text.lines().count(), 3);
        let parsed = Voucher::from_file_block(&text).unwrap();
        assert_eq!(parsed.id_typed(), None);
        assert_eq!(parsed.value(), 700);
    }

    #[test]
    fn out_of_range_value_in_file_is_rejected() {
        let block = format!("{}\nPercentDiscount\n150\n{}", VoucherId::new(), timestamp_now().to_rfc3339());
        assert!(matches!(
            Voucher::from_file_block(&block),
            Err(DomainError::ValueRange(_))
        ));
    }

    #[test]
    fn malformed_blocks_are_rejected() {
        assert!(Voucher::from_file_block("").is_err());
        assert!(Voucher::from_file_block("FixedAmount\n5000").is_err());
        assert!(Voucher::from_file_block("Coupon\n5000\n2026-10-19T09:30:00+00:00").is_err());
        assert!(Voucher::from_file_block("FixedAmount\nlots\n2026-10-19T09:30:00+00:00").is_err());
        assert!(Voucher::from_file_block("FixedAmount\n5000\nyesterday").is_err());
        assert!(matches!(
            Voucher::from_file_block("nope\nFixedAmount\n5000\n2026-10-19T09:30:00+00:00"),
            Err(DomainError::InvalidId(_))
        ));
    }
}
