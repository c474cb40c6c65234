use std::collections::HashSet;

use crate::model::{Finding, StudentBooks};
use crate::options::SimilarityThreshold;
use crate::similarity::ratio;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFindings {
    pub duplicates: Vec<Finding>,
    pub similar: Vec<Finding>,
}

/// Scans one student's entries in order against every distinct entry seen before it.
///
/// A repeat of an earlier text yields one duplicate finding per repeated occurrence.
/// Independently, each entry is scored against every distinct earlier text and a
/// similar finding is emitted when the score reaches `threshold` and the texts differ.
#[must_use]
pub fn detect_student(books: &StudentBooks, threshold: SimilarityThreshold) -> StudentFindings {
    let mut findings = StudentFindings::default();
    let mut seen_order: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for entry in &books.entries {
        for &earlier in &seen_order {
            if earlier == entry.as_str() {
                continue;
            }

            let score = ratio(entry, earlier);
            if score >= threshold.value() {
                findings.similar.push(Finding::Similar {
                    student: books.student.clone(),
                    entry: entry.clone(),
                    seen: earlier.to_string(),
                    score,
                });
            }
        }

        if seen.insert(entry) {
            seen_order.push(entry);
        } else {
            findings.duplicates.push(Finding::Duplicate {
                student: books.student.clone(),
                entry: entry.clone(),
            });
        }
    }

    findings
}
