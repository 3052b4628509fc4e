//! Label normalization.
//!
//! Each list has its own quirks:
//! - SSA diagnosis codes lack the decimal point standard ICD-10 codes carry
//!   (`K730` vs `K73.0`).
//! - Drug names bury the substance in dose/form noise (`PARACETAMOL,
//!   tabletas 500 mg`), with a different separator vocabulary per list.
//!
//! Normalization is pure and total over non-empty labels: malformed input
//! gets a diagnostic warning and a deterministic fallback, never an error,
//! so one bad row cannot halt a pipeline run.

use tracing::warn;

/// Which normalization rule to apply to a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelRule {
    /// SSA ICD code fixup: insert `.` after the third character.
    IcdCode,
    /// SSA drug names: cut at `,`, `de`, `-`, `(` or any digit.
    SsaDrug,
    /// CES drug names: cut at `,`, `-` or any digit.
    CesDrug,
    /// HUM drug list names: cut at `,` or any digit.
    HumDrug,
    /// CIEL display names: lowercase only.
    CielDrug,
    /// Already-comparable labels (e.g. dotted ICD codes in reference exports).
    Verbatim,
}

/// Separator vocabulary for the drug-name rules.
struct Separators {
    chars: &'static [char],
    digits: bool,
    /// The SSA list uses `de` as a connective; the original data shows it
    /// cutting anywhere in the string, not only at word boundaries.
    word_de: bool,
}

impl LabelRule {
    fn separators(self) -> Option<Separators> {
        match self {
            LabelRule::SsaDrug => Some(Separators {
                chars: &[',', '-', '('],
                digits: true,
                word_de: true,
            }),
            LabelRule::CesDrug => Some(Separators {
                chars: &[',', '-'],
                digits: true,
                word_de: false,
            }),
            LabelRule::HumDrug => Some(Separators {
                chars: &[','],
                digits: true,
                word_de: false,
            }),
            _ => None,
        }
    }
}

/// Canonicalize a raw label into a comparable key.
pub fn normalize(raw: &str, rule: LabelRule) -> String {
    match rule {
        LabelRule::IcdCode => fix_icd_code(raw),
        LabelRule::CielDrug => raw.to_lowercase(),
        LabelRule::Verbatim => raw.to_string(),
        LabelRule::SsaDrug | LabelRule::CesDrug | LabelRule::HumDrug => {
            let seps = rule.separators().unwrap_or(Separators {
                chars: &[],
                digits: false,
                word_de: false,
            });
            clean_drug_name(raw, &seps)
        }
    }
}

/// Insert the missing decimal point into an undotted SSA ICD code.
///
/// Codes of three characters or fewer are already category-level and pass
/// through. Codes longer than four characters are malformed in the source
/// data; they are flagged but still processed with the same rule.
fn fix_icd_code(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() > 4 {
        warn!(code, "unusually long SSA ICD code");
    }
    if chars.len() <= 3 {
        return code.to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[3..].iter().collect();
    format!("{}.{}", head, tail)
}

/// Lowercase, cut at the earliest separator, trim. Falls back to the first
/// whitespace token when the separators consume the whole label (e.g. a name
/// that starts with a digit), so the key is never empty.
fn clean_drug_name(raw: &str, seps: &Separators) -> String {
    let lower = raw.to_lowercase();
    let cut = lower
        .char_indices()
        .find(|&(i, ch)| {
            (seps.digits && ch.is_ascii_digit())
                || seps.chars.contains(&ch)
                || (seps.word_de && lower[i..].starts_with("de"))
        })
        .map_or(lower.len(), |(i, _)| i);

    let head = lower[..cut].trim();
    if !head.is_empty() {
        return head.to_string();
    }

    let fallback = lower
        .split_whitespace()
        .next()
        .unwrap_or(lower.trim())
        .to_string();
    warn!(
        raw,
        fallback, "drug name reduced to empty key; using first token"
    );
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icd_code_fixup() {
        assert_eq!(normalize("K730", LabelRule::IcdCode), "K73.0");
        assert_eq!(normalize("A150", LabelRule::IcdCode), "A15.0");
        assert_eq!(normalize("B99", LabelRule::IcdCode), "B99");
        assert_eq!(normalize("J45", LabelRule::IcdCode), "J45");
    }

    #[test]
    fn test_icd_code_long_still_processed() {
        // len > 4 warns but applies the same rule
        assert_eq!(normalize("K73001", LabelRule::IcdCode), "K73.001");
    }

    #[test]
    fn test_icd_code_short_unchanged() {
        assert_eq!(normalize("K7", LabelRule::IcdCode), "K7");
    }

    #[test]
    fn test_ssa_drug_cut_at_comma() {
        assert_eq!(
            normalize("PARACETAMOL, tabletas 500 mg", LabelRule::SsaDrug),
            "paracetamol"
        );
    }

    #[test]
    fn test_ssa_drug_cut_at_de_substring() {
        // "de" cuts anywhere, so the whole label collapses and the fallback
        // keeps the first token
        assert_eq!(
            normalize("DEXAMETASONA 8 mg", LabelRule::SsaDrug),
            "dexametasona"
        );
    }

    #[test]
    fn test_ssa_drug_cut_at_paren() {
        assert_eq!(
            normalize("ibuprofeno (suspension)", LabelRule::SsaDrug),
            "ibuprofeno"
        );
    }

    #[test]
    fn test_ces_drug_keeps_de() {
        // CES rule has no "de" separator
        assert_eq!(
            normalize("sulfato de magnesio", LabelRule::CesDrug),
            "sulfato de magnesio"
        );
    }

    #[test]
    fn test_ces_drug_cut_at_hyphen_and_digit() {
        assert_eq!(normalize("ibuprofeno-400", LabelRule::CesDrug), "ibuprofeno");
        assert_eq!(normalize("amoxicilina 500mg", LabelRule::CesDrug), "amoxicilina");
    }

    #[test]
    fn test_digit_prefix_falls_back_to_first_token() {
        // separators consume everything; first whitespace token survives
        assert_eq!(normalize("123, tab", LabelRule::CesDrug), "123,");
    }

    #[test]
    fn test_fallback_never_empty() {
        assert_eq!(normalize("500", LabelRule::SsaDrug), "500");
    }

    #[test]
    fn test_hum_drug_keeps_hyphens() {
        assert_eq!(
            normalize("Amoxicillin-Clavulanate, 500mg tablet", LabelRule::HumDrug),
            "amoxicillin-clavulanate"
        );
    }

    #[test]
    fn test_ciel_lowercase_only() {
        assert_eq!(
            normalize("Amoxicillin 500 mg Tablet", LabelRule::CielDrug),
            "amoxicillin 500 mg tablet"
        );
    }

    #[test]
    fn test_verbatim() {
        assert_eq!(normalize("K73.0", LabelRule::Verbatim), "K73.0");
    }
}
