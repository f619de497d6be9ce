//! Ordering of the visible list.

use std::cmp::Ordering;

use super::PortProcess;

/// Column the list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    #[default]
    Port,
    Pid,
    Name,
}

impl SortField {
    /// Cycle order used by the sort toggle.
    pub const ALL: [SortField; 3] = [SortField::Port, SortField::Pid, SortField::Name];

    pub fn next(self) -> Self {
        let idx = SortField::ALL.iter().position(|f| *f == self).unwrap_or(0);
        SortField::ALL[(idx + 1) % SortField::ALL.len()]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortField::Port => "port",
            SortField::Pid => "pid",
            SortField::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "↑",
            SortOrder::Descending => "↓",
        }
    }
}

/// Compare names the way a human-facing collation would: case-folded first,
/// then lower case before upper case, then by code point.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

fn compare(a: &PortProcess, b: &PortProcess, field: SortField) -> Ordering {
    match field {
        SortField::Port => a.port.cmp(&b.port).then(a.pid.cmp(&b.pid)),
        SortField::Pid => a.pid.cmp(&b.pid).then(a.port.cmp(&b.port)),
        SortField::Name => compare_names(&a.process_name, &b.process_name)
            .then(a.port.cmp(&b.port))
            .then(a.pid.cmp(&b.pid)),
    }
}

/// Sort entities in place by `field`, reversed for [`SortOrder::Descending`].
///
/// Equal keys fall back to port and pid, so over a merged snapshot the order
/// is total.
pub fn sort_entities(entities: &mut [PortProcess], field: SortField, order: SortOrder) {
    entities.sort_by(|a, b| {
        let cmp = compare(a, b, field);
        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}
