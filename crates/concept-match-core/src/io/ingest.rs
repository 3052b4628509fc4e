//! Column layouts of the national lists and terminology exports.
//!
//! Field positions here are a contract with the upstream exports, not
//! incidental. A row too short for its layout is a data-quality problem:
//! it is skipped with a warning, never fatal.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::models::{ReferenceEntry, ReferenceSet, SourceKind, SourceRecord};

use super::{drop_header_and_blanks, load_json_array, read_rows, IoResult};

/// SSA diagnosis export: undotted ICD code in column 2, display name in
/// column 4.
pub fn ssa_diagnoses(path: &Path) -> IoResult<Vec<SourceRecord>> {
    let rows = drop_header_and_blanks(read_rows(path)?);
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            if row.len() < 5 {
                warn!(?row, "skipping short SSA diagnosis row");
                return None;
            }
            Some(SourceRecord::new(
                row[0].clone(),
                row[2].clone(),
                vec![row[4].clone()],
                SourceKind::Diagnosis,
            ))
        })
        .collect())
}

/// PIH or CIEL diagnosis export: `[concept_code, icd_code]`. ICD codes in
/// these exports are already dotted.
pub fn concept_diagnoses(path: &Path) -> IoResult<ReferenceSet> {
    let rows = drop_header_and_blanks(read_rows(path)?);
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            if row.len() < 2 {
                warn!(?row, "skipping short diagnosis concept row");
                return None;
            }
            Some(ReferenceEntry::new(
                row[0].clone(),
                row[1].clone(),
                crate::matcher::LabelRule::Verbatim,
            ))
        })
        .collect())
}

/// One mapping in the WHO/OCL ICD cross-reference feed.
#[derive(Debug, Deserialize)]
struct IcdCrossRef {
    from_concept_code: String,
    to_concept_code: String,
}

/// WHO/OCL cross-reference: maps ICD codes (`from`) to CIEL concept codes
/// (`to`). The ICD code becomes the matchable label.
pub fn who_crossref(path: &Path) -> IoResult<ReferenceSet> {
    let refs: Vec<IcdCrossRef> = load_json_array(path)?;
    Ok(refs
        .into_iter()
        .map(|r| {
            ReferenceEntry::new(
                r.to_concept_code,
                r.from_concept_code,
                crate::matcher::LabelRule::Verbatim,
            )
        })
        .collect())
}

/// SSA medication list: `[code, name, mechanism_of_action]`.
pub fn ssa_medications(path: &Path) -> IoResult<Vec<SourceRecord>> {
    let rows = drop_header_and_blanks(read_rows(path)?);
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            if row.len() < 3 {
                warn!(?row, "skipping short SSA medication row");
                return None;
            }
            Some(SourceRecord::new(
                row[0].clone(),
                row[1].clone(),
                vec![row[2].clone()],
                SourceKind::SsaMedication,
            ))
        })
        .collect())
}

/// CES medication list: name-only rows. Id and mechanism-of-action columns
/// are recorded as `-` so all match files share one shape.
pub fn ces_medications(path: &Path) -> IoResult<Vec<SourceRecord>> {
    let rows = drop_header_and_blanks(read_rows(path)?);
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let Some(name) = row.first() else {
                warn!("skipping CES medication row with no fields");
                return None;
            };
            if name.is_empty() {
                warn!(?row, "skipping empty CES medication row");
                return None;
            }
            Some(SourceRecord::new(
                "-".to_string(),
                name.clone(),
                vec!["-".to_string()],
                SourceKind::CesMedication,
            ))
        })
        .collect())
}

/// HUM drug list export: drug name in column 2, concept code in column 3.
pub fn hum_catalog(path: &Path) -> IoResult<ReferenceSet> {
    let rows = drop_header_and_blanks(read_rows(path)?);
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            if row.len() < 4 {
                warn!(?row, "skipping short HUM drug row");
                return None;
            }
            Some(ReferenceEntry::new(
                row[3].clone(),
                row[2].clone(),
                crate::matcher::LabelRule::HumDrug,
            ))
        })
        .collect())
}

/// One concept in the CIEL dictionary feed.
#[derive(Debug, Deserialize)]
struct CielConcept {
    id: i64,
    display_name: String,
}

/// CIEL dictionary: JSON concepts become `CIEL:{id}` entries.
pub fn ciel_dictionary(path: &Path) -> IoResult<ReferenceSet> {
    let concepts: Vec<CielConcept> = load_json_array(path)?;
    Ok(concepts
        .into_iter()
        .map(|c| {
            ReferenceEntry::new(
                format!("CIEL:{}", c.id),
                c.display_name,
                crate::matcher::LabelRule::CielDrug,
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_ssa_diagnoses_layout_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ssa-diagnoses.csv");
        fs::write(
            &path,
            "h1,h2,h3,h4,h5\n1,x,K730,y,Hepatitis cronica\nshort,row\n2,x,B99,y,Otras infecciones\n",
        )
        .unwrap();

        let records = ssa_diagnoses(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].normalized_label, "K73.0");
        assert_eq!(records[0].attributes, vec!["Hepatitis cronica"]);
        assert_eq!(records[1].normalized_label, "B99");
    }

    #[test]
    fn test_hum_catalog_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hum.csv");
        fs::write(
            &path,
            "a,b,name,code\nx,y,\"Amoxicillin, 500mg tablet\",3057\nx,y,\"Amoxicillin, 250mg capsule\",3057\n",
        )
        .unwrap();

        let refs = hum_catalog(&path).unwrap();
        // duplicate concept code collapses, first occurrence wins
        assert_eq!(refs.len(), 1);
        let entry = refs.iter().next().unwrap();
        assert_eq!(entry.concept_code, "3057");
        assert_eq!(entry.normalized_label, "amoxicillin");
        assert_eq!(entry.raw_label, "Amoxicillin, 500mg tablet");
    }

    #[test]
    fn test_ciel_dictionary_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meds-ciel.json");
        fs::write(
            &path,
            r#"[{"id": 71160, "display_name": "Amoxicillin"}, {"id": 77897, "display_name": "Ibuprofen"}]"#,
        )
        .unwrap();

        let refs = ciel_dictionary(&path).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs.iter().next().unwrap().concept_code, "CIEL:71160");
        assert_eq!(refs.iter().next().unwrap().normalized_label, "amoxicillin");
    }

    #[test]
    fn test_who_crossref_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("who-diagnoses.json");
        fs::write(
            &path,
            r#"[{"from_concept_code": "K73.0", "to_concept_code": "CIEL:1234"}]"#,
        )
        .unwrap();

        let refs = who_crossref(&path).unwrap();
        assert_eq!(refs.len(), 1);
        let entry = refs.iter().next().unwrap();
        assert_eq!(entry.concept_code, "CIEL:1234");
        assert_eq!(entry.normalized_label, "K73.0");
    }

    #[test]
    fn test_ces_medications_placeholder_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meds-ces.csv");
        fs::write(&path, "nombre\nibuprofeno-400\n,comentario sin nombre\n").unwrap();

        let records = ces_medications(&path).unwrap();
        // the nameless row is skipped (with a warning)
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "-");
        assert_eq!(records[0].attributes, vec!["-"]);
        assert_eq!(records[0].normalized_label, "ibuprofeno");
    }
}
