//! Vector Index — one L2-normalized bag-of-skills vector per career.
//!
//! Vectors are stored sparsely as `(vocabulary index, weight)` pairs sorted by
//! index. Career and query vectors only ever hold a handful of set entries, so
//! the dot product is a linear merge rather than a scan of the whole vocabulary.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::matching::catalog::{CareerRecord, Vocabulary};

/// A sparse indicator vector over the vocabulary, unit-normalized unless empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillVector {
    entries: Vec<(usize, f32)>,
}

impl SkillVector {
    /// Sets 1.0 at every given index (duplicates collapse) and normalizes.
    /// No indices yields the zero vector, which is left unnormalized.
    pub fn from_indicators(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut entries: Vec<(usize, f32)> = indices
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|i| (i, 1.0))
            .collect();

        let norm = l2_norm(&entries);
        if norm > 0.0 {
            for (_, weight) in &mut entries {
                *weight /= norm;
            }
        }

        Self { entries }
    }

    #[cfg(test)]
    pub fn norm(&self) -> f32 {
        l2_norm(&self.entries)
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vocabulary indices with a non-zero entry, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(i, _)| *i)
    }

    /// Cosine similarity for unit vectors: a merge over the two sorted entry lists.
    pub fn dot(&self, other: &SkillVector) -> f32 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0_f32;

        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }

    /// Expands into a dense vector of length `dims`.
    #[cfg(test)]
    pub fn to_dense(&self, dims: usize) -> Vec<f32> {
        let mut dense = vec![0.0; dims];
        for &(i, w) in &self.entries {
            if i < dims {
                dense[i] = w;
            }
        }
        dense
    }
}

fn l2_norm(entries: &[(usize, f32)]) -> f32 {
    entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
}

/// Career vectors in catalog order. Built once; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct CareerIndex {
    vectors: Vec<SkillVector>,
}

impl CareerIndex {
    /// Exact lower-cased lookup only; no fuzzy matching at build time.
    pub fn build(records: &[CareerRecord], vocabulary: &Vocabulary) -> Self {
        let vectors = records
            .iter()
            .map(|record| {
                SkillVector::from_indicators(
                    record
                        .skills
                        .iter()
                        .filter_map(|s| vocabulary.position(&s.to_lowercase())),
                )
            })
            .collect();

        Self { vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[cfg(test)]
    pub fn vectors(&self) -> &[SkillVector] {
        &self.vectors
    }

    /// Similarity of `query` against every career, in catalog order.
    pub fn similarities(&self, query: &SkillVector) -> Vec<f32> {
        self.vectors.iter().map(|v| v.dot(query)).collect()
    }
}
