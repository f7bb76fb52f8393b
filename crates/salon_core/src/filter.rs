use thiserror::Error;

/// Longest search term accepted by the list endpoints.
pub const MAX_SEARCH_LEN: usize = 200;
const MAX_STATUS_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("search term is longer than {max} characters")]
    SearchTooLong { max: usize },
    #[error("invalid status filter {0:?}: expected lowercase letters, digits or '_'")]
    InvalidStatus(String),
    #[error("filter kind {0} given more than once")]
    Duplicate(&'static str),
}

/// Trimmed, non-empty free-text search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Returns `Ok(None)` for blank input: an empty search means "no filter".
    pub fn parse(raw: &str) -> Result<Option<Self>, FilterError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > MAX_SEARCH_LEN {
            return Err(FilterError::SearchTooLong {
                max: MAX_SEARCH_LEN,
            });
        }
        Ok(Some(Self(trimmed.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Status token such as `active`, `scheduled` or `sent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusFilter(String);

impl StatusFilter {
    pub fn parse(raw: &str) -> Result<Self, FilterError> {
        let token = raw.trim();
        let valid = !token.is_empty()
            && token.len() <= MAX_STATUS_LEN
            && token
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if valid {
            Ok(Self(token.to_string()))
        } else {
            Err(FilterError::InvalidStatus(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One supported filter kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Search(SearchTerm),
    Status(StatusFilter),
}

impl FilterKind {
    fn name(&self) -> &'static str {
        match self {
            FilterKind::Search(_) => "search",
            FilterKind::Status(_) => "status",
        }
    }
}

/// Validated filter descriptor handed to page requests. Holds each kind at
/// most once; an absent filter is `Option::<ListFilter>::None`, never an empty
/// descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListFilter {
    kinds: Vec<FilterKind>,
}

impl ListFilter {
    /// Builds a filter from kinds, returning `None` when no kind is given.
    pub fn from_kinds(
        kinds: impl IntoIterator<Item = FilterKind>,
    ) -> Result<Option<Self>, FilterError> {
        let mut collected: Vec<FilterKind> = Vec::new();
        for kind in kinds {
            if collected.iter().any(|k| k.name() == kind.name()) {
                return Err(FilterError::Duplicate(kind.name()));
            }
            collected.push(kind);
        }
        if collected.is_empty() {
            Ok(None)
        } else {
            collected.sort_by_key(FilterKind::name);
            Ok(Some(Self { kinds: collected }))
        }
    }

    /// Convenience for raw user input; blank values are treated as absent.
    pub fn from_input(
        search: Option<&str>,
        status: Option<&str>,
    ) -> Result<Option<Self>, FilterError> {
        let mut kinds = Vec::new();
        if let Some(term) = search.map(SearchTerm::parse).transpose()?.flatten() {
            kinds.push(FilterKind::Search(term));
        }
        if let Some(raw) = status.filter(|s| !s.trim().is_empty()) {
            kinds.push(FilterKind::Status(StatusFilter::parse(raw)?));
        }
        Self::from_kinds(kinds)
    }

    pub fn kinds(&self) -> &[FilterKind] {
        &self.kinds
    }

    pub fn search(&self) -> Option<&SearchTerm> {
        self.kinds.iter().find_map(|k| match k {
            FilterKind::Search(term) => Some(term),
            FilterKind::Status(_) => None,
        })
    }

    pub fn status(&self) -> Option<&StatusFilter> {
        self.kinds.iter().find_map(|k| match k {
            FilterKind::Status(status) => Some(status),
            FilterKind::Search(_) => None,
        })
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.kinds
            .iter()
            .map(|kind| match kind {
                FilterKind::Search(term) => ("search", term.as_str().to_string()),
                FilterKind::Status(status) => ("status", status.as_str().to_string()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_no_filter() {
        assert_eq!(ListFilter::from_input(Some("   "), None), Ok(None));
        assert_eq!(ListFilter::from_input(None, Some("")), Ok(None));
    }

    #[test]
    fn search_is_trimmed_and_forwarded() {
        let filter = ListFilter::from_input(Some("  Anna "), Some("active"))
            .unwrap()
            .unwrap();
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("search", "Anna".to_string()),
                ("status", "active".to_string())
            ]
        );
    }

    #[test]
    fn rejects_long_search() {
        let long = "x".repeat(MAX_SEARCH_LEN + 1);
        assert_eq!(
            ListFilter::from_input(Some(&long), None),
            Err(FilterError::SearchTooLong {
                max: MAX_SEARCH_LEN
            })
        );
    }

    #[test]
    fn rejects_malformed_status() {
        assert!(matches!(
            StatusFilter::parse("Active; drop"),
            Err(FilterError::InvalidStatus(_))
        ));
    }

    #[test]
    fn rejects_duplicate_kinds() {
        let a = FilterKind::Status(StatusFilter::parse("sent").unwrap());
        let b = FilterKind::Status(StatusFilter::parse("draft").unwrap());
        assert_eq!(
            ListFilter::from_kinds([a, b]),
            Err(FilterError::Duplicate("status"))
        );
    }
}
