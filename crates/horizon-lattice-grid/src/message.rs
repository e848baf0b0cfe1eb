//! Structured diagnostic messages and their aggregation per row and column.
//!
//! Row callbacks report problems through the `add_*` helpers of
//! [`RowAttributeContext`](crate::resolve::RowAttributeContext). Each message
//! lands once in the row-level list and, when column names are given, once in
//! the queue of every named visible column. Cell resolution reads the column
//! queues to escalate color; the collection queries read the row-level list.

use std::collections::HashMap;
use std::fmt;

use crate::column::ColumnSet;
use crate::types::SeverityKind;

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMessage {
    /// Severity.
    pub severity: SeverityKind,
    /// Human-readable text.
    pub text: String,
    /// Application-defined code.
    pub code: Option<String>,
    /// Row the message belongs to.
    pub row: usize,
    /// Column the message was routed to, `None` for the row-level copy.
    pub column: Option<usize>,
}

impl GridMessage {
    /// Creates a row-level message.
    pub fn new(severity: SeverityKind, text: impl Into<String>, row: usize) -> Self {
        Self {
            severity,
            text: text.into(),
            code: None,
            row,
            column: None,
        }
    }

    /// Sets the code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns a copy routed to `column`.
    pub fn for_column(&self, column: usize) -> Self {
        Self {
            column: Some(column),
            ..self.clone()
        }
    }
}

impl fmt::Display for GridMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// An ordered list of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageList {
    messages: Vec<GridMessage>,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: GridMessage) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Removes all messages, keeping the allocation.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GridMessage> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[GridMessage] {
        &self.messages
    }

    /// The most severe severity in the list, `None` when empty.
    pub fn worst_severity(&self) -> SeverityKind {
        self.messages
            .iter()
            .map(|m| m.severity)
            .max()
            .unwrap_or_default()
    }

    /// Number of messages with exactly `severity`.
    pub fn count(&self, severity: SeverityKind) -> usize {
        self.messages.iter().filter(|m| m.severity == severity).count()
    }

    /// Message texts joined by line breaks.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for message in &self.messages {
            append_line(&mut text, &message.text);
        }
        text
    }
}

impl<'a> IntoIterator for &'a MessageList {
    type Item = &'a GridMessage;
    type IntoIter = std::slice::Iter<'a, GridMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Appends `line` to `text`, separated by a line break when `text` is non-empty.
pub(crate) fn append_line(text: &mut String, line: &str) {
    if !text.is_empty() {
        text.push('\n');
    }
    text.push_str(line);
}

/// Accumulates the messages of one row, keyed by column.
#[derive(Debug, Clone, Default)]
pub struct MessageAggregator {
    row_messages: MessageList,
    by_column: HashMap<usize, MessageList>,
}

impl MessageAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every message. Column queues keep their allocations.
    pub fn clear(&mut self) {
        self.row_messages.clear();
        for list in self.by_column.values_mut() {
            list.clear();
        }
    }

    /// Records `message` at row level and routes a copy to each column named
    /// in the comma-separated `column_names`.
    ///
    /// Names that do not resolve to a visible column are ignored.
    pub fn add_message(&mut self, message: GridMessage, column_names: &str, columns: &ColumnSet) {
        if !column_names.trim().is_empty() {
            let mut routed = 0usize;
            for column in columns.resolve_list(column_names) {
                self.by_column
                    .entry(column)
                    .or_default()
                    .push(message.for_column(column));
                routed += 1;
            }
            if routed == 0 {
                tracing::trace!(
                    target: crate::logging::targets::MESSAGES,
                    row = message.row,
                    column_names,
                    "message routed to no visible column"
                );
            }
        }
        self.row_messages.push(message);
    }

    /// Row-level messages in insertion order.
    pub fn row_messages(&self) -> &MessageList {
        &self.row_messages
    }

    /// Messages routed to `column`; empty if none.
    pub fn messages_for(&self, column: usize) -> &[GridMessage] {
        self.by_column
            .get(&column)
            .map(MessageList::as_slice)
            .unwrap_or(&[])
    }

    /// The most severe message severity routed to `column`.
    pub fn worst_for(&self, column: usize) -> SeverityKind {
        self.by_column
            .get(&column)
            .map(MessageList::worst_severity)
            .unwrap_or_default()
    }

    /// Returns `true` if any message was added since the last clear.
    pub fn has_messages(&self) -> bool {
        !self.row_messages.is_empty()
    }

    fn routed(&self) -> impl Iterator<Item = (&usize, &MessageList)> {
        self.by_column.iter().filter(|(_, list)| !list.is_empty())
    }

    /// Appends the row's messages to `out`.
    ///
    /// When `severity` is not `None` but no message was added (the row only
    /// set its icon), a single message is synthesized from `tooltip`, or from
    /// `fallback_text` when the tooltip is empty. With `row_id` set, every
    /// appended message is prefixed with `"<row_id> - "`.
    pub fn collect_for_row(
        &self,
        row: usize,
        severity: SeverityKind,
        tooltip: &str,
        fallback_text: &str,
        row_id: Option<&str>,
        out: &mut Vec<GridMessage>,
    ) {
        let first = out.len();
        if self.row_messages.is_empty() {
            if severity != SeverityKind::None {
                let text = if tooltip.is_empty() { fallback_text } else { tooltip };
                out.push(GridMessage::new(severity, text, row));
            }
        } else {
            out.extend(self.row_messages.iter().cloned());
        }

        if let Some(id) = row_id {
            for message in &mut out[first..] {
                message.text = format!("{id} - {}", message.text);
            }
        }
    }
}

// Emptied column queues are kept for reuse and must not affect equality.
impl PartialEq for MessageAggregator {
    fn eq(&self, other: &Self) -> bool {
        self.row_messages == other.row_messages
            && self.routed().count() == other.routed().count()
            && self
                .routed()
                .all(|(column, list)| other.by_column.get(column) == Some(list))
    }
}

impl Eq for MessageAggregator {}
