//! Book-level shared string table.
//!
//! Repeated cell text registers once and is referenced by a dense integer id.
//! The table is budget-bounded: once any limit would be exceeded,
//! `try_register` declines and the caller writes the string inline instead
//! (`t="inlineStr"`), which is a normal code path, not an error.

use std::collections::HashMap;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;

/// Dense id of a registered string; doubles as the index into the table.
pub type SharedStringId = usize;

/// Capacity limits for the table.
#[derive(Debug, Clone, Copy)]
pub struct SharedStringBudget {
    /// Maximum number of distinct strings.
    pub max_count: usize,
    /// Maximum length of a single registered string, in bytes.
    pub max_entry_len: usize,
    /// Maximum cumulative length of all registered strings, in bytes.
    pub max_total_len: usize,
}

impl Default for SharedStringBudget {
    fn default() -> Self {
        Self {
            max_count: 1 << 20,
            // Host format caps cell text at 32767 characters.
            max_entry_len: 32_767,
            max_total_len: 64 << 20,
        }
    }
}

/// String → id dedup table shared by all sheets of one book.
#[derive(Debug)]
pub struct SharedStrings {
    ids: HashMap<String, SharedStringId>,
    // Dense id order; ids are indices, gap-free by construction.
    entries: Vec<String>,
    total_len: usize,
    budget: SharedStringBudget,
}

impl Default for SharedStrings {
    fn default() -> Self {
        Self::with_budget(SharedStringBudget::default())
    }
}

impl SharedStrings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_budget(budget: SharedStringBudget) -> Self {
        Self {
            ids: HashMap::new(),
            entries: Vec::new(),
            total_len: 0,
            budget,
        }
    }

    /// Register `s`, unless doing so would exceed a budget limit.
    ///
    /// Returns the existing id for an already-seen string regardless of
    /// budgets; returns `None` when a new entry would not fit, in which case
    /// the caller falls back to inline content.
    pub fn try_register(&mut self, s: &str) -> Option<SharedStringId> {
        if let Some(&id) = self.ids.get(s) {
            return Some(id);
        }
        if self.entries.len() >= self.budget.max_count
            || s.len() > self.budget.max_entry_len
            || self.total_len + s.len() > self.budget.max_total_len
        {
            return None;
        }
        Some(self.insert(s))
    }

    /// Register `s` unconditionally, ignoring budgets.
    ///
    /// Used when the caller has decided dedup benefit outweighs budget risk,
    /// e.g. one large string repeated many times.
    pub fn force_register(&mut self, s: &str) -> SharedStringId {
        if let Some(&id) = self.ids.get(s) {
            return id;
        }
        self.insert(s)
    }

    fn insert(&mut self, s: &str) -> SharedStringId {
        let id = self.entries.len();
        self.entries.push(s.to_string());
        self.ids.insert(s.to_string(), id);
        self.total_len += s.len();
        id
    }

    /// Entries in dense ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (SharedStringId, &str)> {
        self.entries.iter().enumerate().map(|(id, s)| (id, s.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the table as `xl/sharedStrings.xml`.
    ///
    /// # Errors
    /// Propagates XML/IO failures from the sink.
    pub fn write_xml<W: Write>(&self, writer: W) -> Result<()> {
        let mut xml = Writer::new(writer);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let count = self.entries.len().to_string();
        let mut sst = BytesStart::new("sst");
        sst.push_attribute((
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        ));
        sst.push_attribute(("count", count.as_str()));
        sst.push_attribute(("uniqueCount", count.as_str()));
        xml.write_event(Event::Start(sst))?;

        for entry in &self.entries {
            xml.write_event(Event::Start(BytesStart::new("si")))?;
            let mut t = BytesStart::new("t");
            if needs_space_preserve(entry) {
                t.push_attribute(("xml:space", "preserve"));
            }
            xml.write_event(Event::Start(t))?;
            xml.write_event(Event::Text(BytesText::new(entry)))?;
            xml.write_event(Event::End(BytesEnd::new("t")))?;
            xml.write_event(Event::End(BytesEnd::new("si")))?;
        }

        xml.write_event(Event::End(BytesEnd::new("sst")))?;
        Ok(())
    }
}

/// Leading/trailing whitespace would be stripped by XML normalization.
fn needs_space_preserve(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace)
}
