//! Row labels that tell the variants of one gene apart.

use phenomap_protocol::VariantHeader;

/// Labels longer than this fall back to the 1-based row index.
pub const MAX_LABEL_CHARS: usize = 32;

/// Which attributes differ between the variants of the displayed gene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantDiff {
    pub allele: bool,
    pub strain: bool,
    /// Centres are compared on their ILAR code.
    pub centre: bool,
}

impl VariantDiff {
    /// True for an attribute when any variant differs from the first one.
    pub fn of(variants: &[VariantHeader]) -> Self {
        let Some((first, rest)) = variants.split_first() else {
            return Self::default();
        };
        Self {
            allele: rest.iter().any(|v| v.allele != first.allele),
            strain: rest.iter().any(|v| v.strain != first.strain),
            centre: rest.iter().any(|v| v.ilar != first.ilar),
        }
    }
}

/// Derived per-variant display data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantLabels {
    /// Gene symbol of the first variant.
    pub title: String,
    pub labels: Vec<String>,
    /// Allele text with markup stripped (the superscripted part).
    pub alleles: Vec<String>,
}

/// Superscripted allele part of an allele symbol such as
/// `Cib2<sup>tm1a(EUCOMM)Wtsi</sup>`. Symbols without markup yield `""`.
pub fn superscript(allele: &str) -> &str {
    let Some(start) = allele.rfind("<sup>") else {
        return "";
    };
    let inner = &allele[start + "<sup>".len()..];
    match inner.rfind("</sup>") {
        Some(end) => &inner[..end],
        None => "",
    }
}

/// Allele designation before the first `(`: `tm1a(EUCOMM)Wtsi` → `tm1a`.
pub fn short_allele(allele: &str) -> &str {
    allele.split('(').next().unwrap_or_default()
}

const ALLELE_KINDS: [(&str, &str); 7] = [
    ("tm1a(", "Conditional ready"),
    ("tm1b(", "Cre-excised deletion"),
    ("tm1c(", "Conditional"),
    ("tm1d(", "Deletion"),
    ("tm1e(", "Targeted non-conditional"),
    ("tm1.1(", "Cre-excised deletion"),
    ("tm1(", "Deletion"),
];

/// Human description of a known targeted allele, else the allele itself.
pub fn allele_kind(allele: &str) -> &str {
    ALLELE_KINDS
        .iter()
        .find(|(pattern, _)| allele.contains(pattern))
        .map_or(allele, |(_, kind)| kind)
}

/// Derive a label for every variant from the attributes that differ.
pub fn derive_labels(variants: &[VariantHeader]) -> VariantLabels {
    let title = variants
        .first()
        .map(|v| v.symbol.clone())
        .unwrap_or_default();
    let alleles: Vec<String> = variants
        .iter()
        .map(|v| superscript(&v.allele).to_string())
        .collect();

    if variants.len() == 1 {
        return VariantLabels {
            labels: vec![title.clone()],
            title,
            alleles,
        };
    }

    let diff = VariantDiff::of(variants);
    let labels = variants
        .iter()
        .zip(&alleles)
        .enumerate()
        .map(|(i, (variant, allele))| {
            let label = label_for(diff, variant, allele);
            match label {
                Some(label) if label.chars().count() <= MAX_LABEL_CHARS => label,
                _ => (i + 1).to_string(),
            }
        })
        .collect();

    VariantLabels {
        title,
        labels,
        alleles,
    }
}

fn label_for(diff: VariantDiff, variant: &VariantHeader, allele: &str) -> Option<String> {
    let short = short_allele(allele);
    let label = match (diff.allele, diff.strain, diff.centre) {
        (true, false, false) => allele_kind(allele).to_string(),
        (false, false, true) => {
            if variant.centre.chars().count() > MAX_LABEL_CHARS {
                variant.ilar.clone()
            } else {
                variant.centre.clone()
            }
        }
        (false, true, false) => variant.strain.clone(),
        (true, _, true) => format!("{short} ({})", variant.ilar),
        (true, true, false) => format!("{short} ({})", variant.strain),
        (false, true, true) => format!("{} ({})", variant.strain, variant.ilar),
        (false, false, false) => return None,
    };
    Some(label)
}
