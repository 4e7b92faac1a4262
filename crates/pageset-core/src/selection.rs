//! Page selection parsing and validation
//!
//! A selection is an ordered sequence of zero-based page indices. Order is
//! meaningful (it becomes output page order) and duplicates are legal (a
//! page may be copied more than once).

use crate::error::TransformError;
use serde::{Deserialize, Serialize};

/// Ordered, possibly-duplicated sequence of zero-based page indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSelection(Vec<u32>);

impl PageSelection {
    /// Parse a human-entered range expression like `"1-3, 5, 8-10"` against
    /// a document with `page_count` pages.
    ///
    /// Tokens are comma-separated; a token with a `-` is an inclusive
    /// 1-based range (expanded low to high even if written reversed), any
    /// other token is a single 1-based page number. Malformed or
    /// out-of-range entries are dropped rather than treated as fatal, so
    /// `"2, oops, 99"` against a 5-page document selects only page 2.
    /// Duplicates and token order pass through untouched: `"3, 1, 1"`
    /// selects page 3 first, then page 1 twice.
    pub fn parse(input: &str, page_count: u32) -> Result<Self, TransformError> {
        let mut indices = Vec::new();

        for token in input.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            if let Some((start, end)) = token.split_once('-') {
                let (Ok(start), Ok(end)) = (start.trim().parse::<u32>(), end.trim().parse::<u32>())
                else {
                    continue;
                };
                let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
                for page in lo..=hi {
                    if (1..=page_count).contains(&page) {
                        indices.push(page - 1);
                    }
                }
            } else if let Ok(page) = token.parse::<u32>() {
                if (1..=page_count).contains(&page) {
                    indices.push(page - 1);
                }
            }
        }

        if indices.is_empty() {
            return Err(TransformError::NoValidPages);
        }

        Ok(Self(indices))
    }

    /// Build a selection from a checkbox-style set of toggled indices.
    ///
    /// Set membership carries no interaction order, so the result is
    /// ascending and deduplicated.
    pub fn from_toggled(toggled: &[u32], page_count: u32) -> Result<Self, TransformError> {
        let mut indices: Vec<u32> = toggled.to_vec();
        indices.sort_unstable();
        indices.dedup();

        if indices.is_empty() {
            return Err(TransformError::NoValidPages);
        }
        Self::check_bounds(&indices, page_count)?;

        Ok(Self(indices))
    }

    /// Build a selection from an explicit caller-supplied order, e.g. a
    /// drag-reorder tool. Order and duplicates pass through untouched.
    pub fn from_order(order: &[u32], page_count: u32) -> Result<Self, TransformError> {
        if order.is_empty() {
            return Err(TransformError::NoValidPages);
        }
        Self::check_bounds(order, page_count)?;

        Ok(Self(order.to_vec()))
    }

    /// Invert the selection: every page of the document NOT selected here,
    /// in ascending order. Used by delete-semantics callers, where the
    /// selection names pages to remove and the complement is what survives.
    pub fn complement(&self, page_count: u32) -> Result<Self, TransformError> {
        let kept: Vec<u32> = (0..page_count).filter(|i| !self.0.contains(i)).collect();

        if kept.is_empty() {
            return Err(TransformError::InvalidSelection(
                "cannot delete all pages".into(),
            ));
        }

        Ok(Self(kept))
    }

    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn check_bounds(indices: &[u32], page_count: u32) -> Result<(), TransformError> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= page_count) {
            return Err(TransformError::InvalidSelection(format!(
                "page index {} out of range (document has {} pages)",
                bad, page_count
            )));
        }
        Ok(())
    }
}
