//! Source-list models: rows from the national lists awaiting a mapping.

use serde::{Deserialize, Serialize};

use crate::matcher::{normalize, LabelRule};

/// Which national list a record came from. Selects the normalization rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// SSA diagnosis list (labels are undotted ICD codes).
    Diagnosis,
    /// SSA medication list (labels are verbose drug names).
    SsaMedication,
    /// CES medication list (name-only rows).
    CesMedication,
}

impl SourceKind {
    /// Normalization rule applied to this list's labels.
    pub fn label_rule(self) -> LabelRule {
        match self {
            SourceKind::Diagnosis => LabelRule::IcdCode,
            SourceKind::SsaMedication => LabelRule::SsaDrug,
            SourceKind::CesMedication => LabelRule::CesDrug,
        }
    }

    /// Short tag used in log output and checkpoint directory names.
    pub fn tag(self) -> &'static str {
        match self {
            SourceKind::Diagnosis => "diagnosis",
            SourceKind::SsaMedication => "ssa",
            SourceKind::CesMedication => "ces",
        }
    }
}

/// One row from a national source list.
///
/// `normalized_label` is derived once at construction and never mutated;
/// matching is keyed on it exclusively (never on `id`, which some lists
/// leave empty).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRecord {
    /// Source-list identifier; `-` when the list has none.
    pub id: String,
    /// The label as it appears in the source file.
    pub raw_label: String,
    /// Extra columns carried through to the output (e.g. mechanism of action,
    /// or the diagnosis display name).
    pub attributes: Vec<String>,
    /// Comparable key derived from `raw_label` by the normalizer.
    pub normalized_label: String,
}

impl SourceRecord {
    /// Build a record, deriving the normalized label for `kind`.
    pub fn new(id: String, raw_label: String, attributes: Vec<String>, kind: SourceKind) -> Self {
        let normalized_label = normalize(&raw_label, kind.label_rule());
        Self {
            id,
            raw_label,
            attributes,
            normalized_label,
        }
    }

    /// Flatten to the persisted row shape: `[id, raw_label, attributes..]`.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![self.id.clone(), self.raw_label.clone()];
        row.extend(self.attributes.iter().cloned());
        row
    }

    /// Rebuild from a persisted row. The normalized label is recomputed
    /// (normalization is pure, so this round-trips exactly).
    pub fn from_row(row: &[String], kind: SourceKind) -> Option<Self> {
        if row.len() < 2 {
            return None;
        }
        Some(Self::new(
            row[0].clone(),
            row[1].clone(),
            row[2..].to_vec(),
            kind,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_at_construction() {
        let record = SourceRecord::new(
            "42".into(),
            "K730".into(),
            vec!["Hepatitis cronica".into()],
            SourceKind::Diagnosis,
        );
        assert_eq!(record.normalized_label, "K73.0");
    }

    #[test]
    fn test_row_round_trip() {
        let record = SourceRecord::new(
            "7".into(),
            "PARACETAMOL, tabletas 500 mg".into(),
            vec!["analgesico".into()],
            SourceKind::SsaMedication,
        );
        let row = record.to_row();
        assert_eq!(row, vec!["7", "PARACETAMOL, tabletas 500 mg", "analgesico"]);

        let rebuilt = SourceRecord::from_row(&row, SourceKind::SsaMedication).unwrap();
        assert_eq!(rebuilt, record);
    }

    #[test]
    fn test_from_row_rejects_short_rows() {
        assert!(SourceRecord::from_row(&["only-id".into()], SourceKind::Diagnosis).is_none());
    }
}
