//! State reports carried inside notification frames

use crate::{CATEGORY_FIELD, CATEGORY_SNAPSHOT, Condition};

/// Semantic payload of a validated frame, after the `00 20` prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateReport {
    pub category: u8,
    pub fields: Vec<u8>,
}

/// A state report with its category interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Category 0x02: one field changed
    Field { key: u8, value: i8 },
    /// Category 0x03: the whole state. `unknown` is kept as received.
    Snapshot {
        power: i8,
        unknown: i8,
        brightness: i8,
        temperature_code: i8,
    },
}

impl StateReport {
    pub fn new(category: u8, fields: &[u8]) -> Self {
        Self { category, fields: fields.to_vec() }
    }

    /// Split a report payload (category byte first). Empty payloads have no report.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        let (&category, fields) = payload.split_first()?;
        Some(Self::new(category, fields))
    }

    pub fn to_payload(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.fields.len());
        buf.push(self.category);
        buf.extend_from_slice(&self.fields);
        buf
    }

    pub fn field(key: u8, value: i8) -> Self {
        Self::new(CATEGORY_FIELD, &[key, value as u8])
    }

    pub fn snapshot(power: i8, unknown: i8, brightness: i8, temperature_code: i8) -> Self {
        Self::new(
            CATEGORY_SNAPSHOT,
            &[power as u8, unknown as u8, brightness as u8, temperature_code as u8],
        )
    }

    pub fn parse(&self) -> Result<Report, Condition> {
        let f = &self.fields;
        let short = || Condition::ShortReport { category: self.category, len: f.len() };
        match self.category {
            CATEGORY_FIELD => match f.as_slice() {
                [key, value, ..] => Ok(Report::Field { key: *key, value: *value as i8 }),
                _ => Err(short()),
            },
            CATEGORY_SNAPSHOT => match f.as_slice() {
                [power, unknown, brightness, temperature_code, ..] => Ok(Report::Snapshot {
                    power: *power as i8,
                    unknown: *unknown as i8,
                    brightness: *brightness as i8,
                    temperature_code: *temperature_code as i8,
                }),
                _ => Err(short()),
            },
            other => Err(Condition::UnrecognizedCategory(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field() {
        let report = StateReport::from_payload(&[0x02, 0x03, 40]).unwrap();
        assert_eq!(report.parse(), Ok(Report::Field { key: 0x03, value: 40 }));
    }

    #[test]
    fn parse_snapshot_keeps_unknown() {
        let report = StateReport::snapshot(1, -7, 75, 50);
        assert_eq!(
            report.parse(),
            Ok(Report::Snapshot { power: 1, unknown: -7, brightness: 75, temperature_code: 50 })
        );
        assert_eq!(report.to_payload(), vec![0x03, 0x01, 0xF9, 75, 50]);
    }

    #[test]
    fn short_and_unknown() {
        assert_eq!(
            StateReport::new(0x02, &[0x00]).parse(),
            Err(Condition::ShortReport { category: 0x02, len: 1 })
        );
        assert_eq!(
            StateReport::new(0x03, &[1, 0, 75]).parse(),
            Err(Condition::ShortReport { category: 0x03, len: 3 })
        );
        assert_eq!(
            StateReport::new(0x09, &[1]).parse(),
            Err(Condition::UnrecognizedCategory(0x09))
        );
        assert_eq!(StateReport::from_payload(&[]), None);
    }
}
