//! Skip/limit windows and page navigation links.

use serde::Serialize;

/// Navigation links for a paged listing. Absent links are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// Requested window. A `limit` of 0 means "no limit".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paginator {
    pub skip: usize,
    pub limit: usize,
}

impl Paginator {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }

    /// Apply the window to an already ordered list.
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.skip);
        if self.limit == 0 {
            iter.collect()
        } else {
            iter.take(self.limit).collect()
        }
    }

    /// Offset of the final page, if paging applies and there is anything to page.
    pub fn last_offset(&self, total: usize) -> Option<usize> {
        if self.limit == 0 || total == 0 {
            return None;
        }
        Some(((total - 1) / self.limit) * self.limit)
    }

    /// Build prev/next/last links by rewriting `skip` on `base_url`.
    ///
    /// Without a limit there is only one page, so no links are produced.
    /// `last` is emitted whenever the listing spans more than one page,
    /// including when the current window already is the last page.
    pub fn links(&self, total: usize, base_url: &str) -> PageLinks {
        if self.limit == 0 {
            return PageLinks::default();
        }
        let prev = (self.skip > 0).then(|| self.skip.saturating_sub(self.limit));
        let next = self
            .skip
            .checked_add(self.limit)
            .filter(|&end| end < total);
        let last = if total > self.limit {
            self.last_offset(total)
        } else {
            None
        };

        PageLinks {
            prev: prev.map(|skip| with_skip(base_url, skip)),
            next: next.map(|skip| with_skip(base_url, skip)),
            last: last.map(|skip| with_skip(base_url, skip)),
        }
    }
}

/// Replace (or append) the `skip` query parameter of `url`.
///
/// Every other `key=value` segment is kept byte for byte and in order; a
/// `#fragment` stays at the end.
pub fn with_skip(url: &str, skip: usize) -> String {
    let (without_fragment, fragment) = match url.find('#') {
        Some(i) => url.split_at(i),
        None => (url, ""),
    };
    let (path, query) = match without_fragment.split_once('?') {
        Some((path, query)) => (path, query),
        None => (without_fragment, ""),
    };

    let replacement = format!("skip={}", skip);
    let mut replaced = false;
    let mut segments: Vec<&str> = Vec::new();
    for segment in query.split('&').filter(|s| !s.is_empty()) {
        let key = segment.split_once('=').map_or(segment, |(k, _)| k);
        if key == "skip" {
            if !replaced {
                segments.push(&replacement);
                replaced = true;
            }
        } else {
            segments.push(segment);
        }
    }
    if !replaced {
        segments.push(&replacement);
    }

    format!("{}?{}{}", path, segments.join("&"), fragment)
}
