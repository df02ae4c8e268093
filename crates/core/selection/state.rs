//! Inclusion state of the codes in the current result.
//!
//! Each prefix control keeps a count of how many of its distinct codes are
//! included. A control's [`CheckState`] is derived from that count, so setting
//! a code updates every ancestor and setting a prefix drives all of its
//! descendants to the same value without a separate propagation pass.

use crate::compute::spatial::QueryResult;
use crate::error::{Result, ZipError};
use crate::selection::tree::GROUP_DEPTH;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::BTreeMap;
use zipscope_types::record::ZipCode;

/// Checkbox state of a prefix control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Checked,
    Unchecked,
    /// Some, but not all, codes below the prefix are included.
    Mixed,
}

impl CheckState {
    fn from_bool(included: bool) -> Self {
        if included {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct GroupCount {
    total: usize,
    included: usize,
}

impl GroupCount {
    fn state(&self) -> CheckState {
        if self.included == self.total {
            CheckState::Checked
        } else if self.included == 0 {
            CheckState::Unchecked
        } else {
            CheckState::Mixed
        }
    }
}

/// Which codes of the current result are included.
///
/// Built fresh for every result, so codes from an earlier query can never
/// linger. Every code starts out included.
///
/// # Examples
///
/// ```
/// use zipscope::selection::{CheckState, SelectionState};
///
/// let mut selection = SelectionState::from_codes(["10115", "10117", "50667"]);
/// selection.set_prefix("1", false)?;
///
/// assert_eq!(selection.state_of("101"), Some(CheckState::Unchecked));
/// assert_eq!(selection.state_of("5"), Some(CheckState::Checked));
///
/// selection.set_code("10115", true)?;
/// assert_eq!(selection.state_of("1011"), Some(CheckState::Mixed));
/// # Ok::<(), zipscope::ZipError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    /// Distinct visible codes in result order.
    codes: Vec<ZipCode>,
    included: FxHashSet<ZipCode>,
    groups: BTreeMap<String, GroupCount>,
}

impl SelectionState {
    /// Selection over the distinct codes of `result`, all included.
    pub fn for_result(result: &QueryResult) -> Self {
        Self::from_code_iter(result.codes().cloned())
    }

    /// Selection over arbitrary codes, all included. Codes are taken verbatim.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_code_iter(
            codes
                .into_iter()
                .filter_map(|raw| ZipCode::normalize(raw.as_ref(), 0)),
        )
    }

    fn from_code_iter<I: Iterator<Item = ZipCode>>(codes: I) -> Self {
        let mut state = Self::default();
        for code in codes {
            if !state.included.insert(code.clone()) {
                continue;
            }
            for prefix in ancestors(&code) {
                let count = state.groups.entry(prefix.to_string()).or_default();
                count.total += 1;
                count.included += 1;
            }
            state.codes.push(code);
        }
        state
    }

    /// Distinct visible codes in result order.
    pub fn codes(&self) -> &[ZipCode] {
        &self.codes
    }

    pub fn visible_count(&self) -> usize {
        self.codes.len()
    }

    pub fn included_count(&self) -> usize {
        self.included.len()
    }

    pub fn is_visible(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c.as_str() == code)
    }

    pub fn is_included(&self, code: &str) -> bool {
        self.included.contains(code)
    }

    /// Included codes in result order.
    pub fn included_codes(&self) -> Vec<&ZipCode> {
        self.codes
            .iter()
            .filter(|code| self.included.contains(code.as_str()))
            .collect()
    }

    pub fn all_included(&self) -> bool {
        self.included.len() == self.codes.len()
    }

    /// State of a group prefix (1 to 4 characters) or of a single code.
    pub fn state_of(&self, prefix: &str) -> Option<CheckState> {
        if let Some(count) = self.groups.get(prefix) {
            return Some(count.state());
        }
        self.is_visible(prefix)
            .then(|| CheckState::from_bool(self.is_included(prefix)))
    }

    /// Every group prefix with its state, ordered by prefix.
    pub fn group_states(&self) -> impl Iterator<Item = (&str, CheckState)> + '_ {
        self.groups
            .iter()
            .map(|(prefix, count)| (prefix.as_str(), count.state()))
    }

    /// Include or exclude one code. Ancestor controls follow.
    ///
    /// Returns whether anything changed.
    pub fn set_code(&mut self, code: &str, included: bool) -> Result<bool> {
        let code = self
            .codes
            .iter()
            .find(|c| c.as_str() == code)
            .cloned()
            .ok_or_else(|| ZipError::CodeNotFound(code.to_string()))?;
        Ok(self.apply(&code, included))
    }

    /// Include or exclude every code starting with `prefix`, forcing every
    /// nested control to the same state.
    ///
    /// Returns the number of codes whose inclusion changed.
    pub fn set_prefix(&mut self, prefix: &str, included: bool) -> Result<usize> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(ZipError::InvalidInput("prefix must not be empty".to_string()));
        }

        let matching: Vec<ZipCode> = self
            .codes
            .iter()
            .filter(|code| code.starts_with(prefix))
            .cloned()
            .collect();
        if matching.is_empty() {
            return Err(ZipError::PrefixNotFound(prefix.to_string()));
        }

        let changed = matching
            .iter()
            .filter(|code| self.apply(code, included))
            .count();
        log::debug!(
            "prefix {} set to {}: {} of {} codes changed",
            prefix,
            included,
            changed,
            matching.len()
        );
        Ok(changed)
    }

    pub fn select_all(&mut self) {
        self.set_all(true);
    }

    pub fn deselect_all(&mut self) {
        self.set_all(false);
    }

    /// Select everything unless everything already is, in which case clear.
    /// Returns the new state of every code.
    pub fn toggle_all(&mut self) -> bool {
        let target = !self.all_included();
        self.set_all(target);
        target
    }

    fn set_all(&mut self, included: bool) {
        if included {
            self.included.extend(self.codes.iter().cloned());
        } else {
            self.included.clear();
        }
        for count in self.groups.values_mut() {
            count.included = if included { count.total } else { 0 };
        }
    }

    fn apply(&mut self, code: &ZipCode, included: bool) -> bool {
        let changed = if included {
            self.included.insert(code.clone())
        } else {
            self.included.remove(code.as_str())
        };
        if !changed {
            return false;
        }

        for prefix in ancestors(code) {
            if let Some(count) = self.groups.get_mut(prefix) {
                if included {
                    count.included += 1;
                } else {
                    count.included -= 1;
                }
            }
        }
        true
    }
}

/// Group prefixes above a code, shortest first. Codes no longer than a group
/// prefix do not get a group equal to themselves.
fn ancestors(code: &ZipCode) -> impl Iterator<Item = &str> + '_ {
    (1..=GROUP_DEPTH)
        .filter(move |&depth| depth < code.len())
        .map(move |depth| code.prefix(depth))
}
