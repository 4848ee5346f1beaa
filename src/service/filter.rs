//! Listing filter validation
//!
//! Query parameters arrive as raw strings. Every violation is collected so a
//! single bad-request response names all of them, and nothing reaches the
//! database until the whole filter is valid.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

use crate::entity::{AttachmentType, DocumentType, Organization};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("organization must be sccu or sgcu")]
    InvalidOrg,
    #[error("document type must be one of announcement/budget/statistic")]
    InvalidDocumentType,
    #[error("attachment type must be image or docs")]
    InvalidAttachmentType,
    #[error("page must be a positive number within range")]
    InvalidPage,
    #[error("page size must be between 1 and 100")]
    InvalidPageSize,
    #[error("invalid time format, expected RFC3339")]
    InvalidTimeFormat,
}

/// All violations found in one filter, rendered `; `-separated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct FilterErrors(pub Vec<FilterError>);

impl fmt::Display for FilterErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Page window shared by every listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    /// Rows to skip. Validated windows always fit in `i64`.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Pages needed for `count` rows
    pub fn total_pages(&self, count: usize) -> u64 {
        (count as u64).div_ceil(self.page_size)
    }
}

/// Inclusive creation-time window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Raw `page` / `page_size` query string for plain paged listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageParams {
    pub fn validate(&self) -> Result<Pagination, FilterErrors> {
        let mut errors = Vec::new();
        match parse_pagination(&self.page, &self.page_size, &mut errors) {
            Some(pagination) if errors.is_empty() => Ok(pagination),
            _ => Err(FilterErrors(errors)),
        }
    }
}

/// Raw `GET /documents` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub title: Option<String>,
    pub organization: Option<String>,
    pub document_type: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    pub pagination: Pagination,
    /// Lower-cased, matched as a substring of the title
    pub title: String,
    pub organization: Option<Organization>,
    pub document_type: Option<DocumentType>,
    pub range: TimeRange,
}

/// Raw `GET /attachments` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub name: Option<String>,
    pub attachment_type: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFilter {
    pub pagination: Pagination,
    /// Lower-cased, matched as a substring of the display name
    pub name: String,
    pub attachment_type: Option<AttachmentType>,
    pub range: TimeRange,
}

impl DocumentListParams {
    pub fn validate(&self) -> Result<DocumentFilter, FilterErrors> {
        let mut errors = Vec::new();

        let organization = match non_empty(&self.organization) {
            None => None,
            Some(org) => match org.parse::<Organization>() {
                Ok(org) => Some(org),
                Err(_) => {
                    errors.push(FilterError::InvalidOrg);
                    None
                }
            },
        };

        let document_type = match non_empty(&self.document_type) {
            None => None,
            Some(t) => match t.parse::<DocumentType>() {
                Ok(t) => Some(t),
                Err(_) => {
                    errors.push(FilterError::InvalidDocumentType);
                    None
                }
            },
        };

        let pagination = parse_pagination(&self.page, &self.page_size, &mut errors);
        let range = parse_range(&self.start_time, &self.end_time, &mut errors);

        match (pagination, range) {
            (Some(pagination), Some(range)) if errors.is_empty() => Ok(DocumentFilter {
                pagination,
                title: non_empty(&self.title).unwrap_or_default().to_lowercase(),
                organization,
                document_type,
                range,
            }),
            _ => Err(FilterErrors(errors)),
        }
    }
}

impl AttachmentListParams {
    pub fn validate(&self) -> Result<AttachmentFilter, FilterErrors> {
        let mut errors = Vec::new();

        let attachment_type = match non_empty(&self.attachment_type) {
            None => None,
            Some(t) => match t.parse::<AttachmentType>() {
                Ok(t) => Some(t),
                Err(_) => {
                    errors.push(FilterError::InvalidAttachmentType);
                    None
                }
            },
        };

        let pagination = parse_pagination(&self.page, &self.page_size, &mut errors);
        let range = parse_range(&self.start_time, &self.end_time, &mut errors);

        match (pagination, range) {
            (Some(pagination), Some(range)) if errors.is_empty() => Ok(AttachmentFilter {
                pagination,
                name: non_empty(&self.name).unwrap_or_default().to_lowercase(),
                attachment_type,
                range,
            }),
            _ => Err(FilterErrors(errors)),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_pagination(
    page: &Option<String>,
    page_size: &Option<String>,
    errors: &mut Vec<FilterError>,
) -> Option<Pagination> {
    let page = match non_empty(page) {
        None => Some(1),
        Some(p) => p.parse::<u64>().ok().filter(|p| *p >= 1),
    };
    if page.is_none() {
        errors.push(FilterError::InvalidPage);
    }

    let page_size = match non_empty(page_size) {
        None => Some(DEFAULT_PAGE_SIZE),
        Some(s) => s
            .parse::<u64>()
            .ok()
            .filter(|s| (1..=MAX_PAGE_SIZE).contains(s)),
    };
    if page_size.is_none() {
        errors.push(FilterError::InvalidPageSize);
    }

    let pagination = Pagination {
        page: page?,
        page_size: page_size?,
    };

    // OFFSET is a signed 64-bit value in Postgres
    let offset = (pagination.page - 1).checked_mul(pagination.page_size);
    if !offset.is_some_and(|o| o <= i64::MAX as u64) {
        errors.push(FilterError::InvalidPage);
        return None;
    }
    Some(pagination)
}

fn parse_range(
    start: &Option<String>,
    end: &Option<String>,
    errors: &mut Vec<FilterError>,
) -> Option<TimeRange> {
    let parse = |value: &Option<String>, default: DateTime<Utc>| match non_empty(value) {
        None => Some(default),
        Some(v) => DateTime::parse_from_rfc3339(v)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
    };

    let start = parse(start, DateTime::<Utc>::UNIX_EPOCH);
    let end = parse(end, Utc::now());

    match (start, end) {
        (Some(start), Some(end)) => Some(TimeRange { start, end }),
        _ => {
            errors.push(FilterError::InvalidTimeFormat);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(org: &str, doc_type: &str) -> DocumentListParams {
        DocumentListParams {
            organization: Some(org.to_string()),
            document_type: Some(doc_type.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let filter = DocumentListParams::default().validate().unwrap();
        assert_eq!(filter.pagination, Pagination { page: 1, page_size: 10 });
        assert_eq!(filter.organization, None);
        assert_eq!(filter.document_type, None);
        assert_eq!(filter.range.start, DateTime::<Utc>::UNIX_EPOCH);
        assert!(filter.range.end <= Utc::now());
    }

    #[test]
    fn test_organization_values() {
        assert_eq!(
            params("sgcu", "").validate().unwrap().organization,
            Some(Organization::Sgcu)
        );
        assert_eq!(
            params("sccu", "").validate().unwrap().organization,
            Some(Organization::Sccu)
        );
        assert_eq!(params("", "").validate().unwrap().organization, None);

        let err = params("sucu", "").validate().unwrap_err();
        assert_eq!(err.0, vec![FilterError::InvalidOrg]);
    }

    #[test]
    fn test_document_type_values() {
        for t in ["announcement", "budget", "statistic"] {
            assert!(params("", t).validate().is_ok());
        }
        let err = params("", "memo").validate().unwrap_err();
        assert_eq!(err.0, vec![FilterError::InvalidDocumentType]);
    }

    #[test]
    fn test_page_size_bounds() {
        let with_size = |size: &str| DocumentListParams {
            page_size: Some(size.to_string()),
            ..Default::default()
        };
        assert!(with_size("1").validate().is_ok());
        assert!(with_size("100").validate().is_ok());
        for bad in ["0", "101", "-1", "ten"] {
            let err = with_size(bad).validate().unwrap_err();
            assert_eq!(err.0, vec![FilterError::InvalidPageSize], "page_size={bad}");
        }
    }

    #[test]
    fn test_page_must_be_positive() {
        let filter = DocumentListParams {
            page: Some("0".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.validate().unwrap_err().0, vec![FilterError::InvalidPage]);
    }

    #[test]
    fn test_time_range_parsing() {
        let filter = DocumentListParams {
            start_time: Some("2024-01-01T00:00:00Z".to_string()),
            end_time: Some("2024-12-31T23:59:59+07:00".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(filter.range.start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(filter.range.end.to_rfc3339(), "2024-12-31T16:59:59+00:00");

        let err = DocumentListParams {
            end_time: Some("yesterday".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.0, vec![FilterError::InvalidTimeFormat]);
    }

    #[test]
    fn test_all_violations_reported() {
        let err = DocumentListParams {
            page_size: Some("500".to_string()),
            organization: Some("abc".to_string()),
            document_type: Some("xyz".to_string()),
            start_time: Some("bad".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            err.0,
            vec![
                FilterError::InvalidOrg,
                FilterError::InvalidDocumentType,
                FilterError::InvalidPageSize,
                FilterError::InvalidTimeFormat,
            ]
        );
        let message = err.to_string();
        assert_eq!(message.matches("; ").count(), 3);
        assert!(!message.contains(", "));
    }

    #[test]
    fn test_page_beyond_addressable_offset() {
        let err = DocumentListParams {
            page: Some(u64::MAX.to_string()),
            page_size: Some("10".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.0, vec![FilterError::InvalidPage]);

        // Largest page whose offset still fits in i64
        let last = (i64::MAX as u64) / 10 + 1;
        let ok = PageParams {
            page: Some(last.to_string()),
            page_size: Some("10".to_string()),
        }
        .validate()
        .unwrap();
        assert!(ok.offset() <= i64::MAX as u64);

        let err = PageParams {
            page: Some((last + 1).to_string()),
            page_size: Some("10".to_string()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.0, vec![FilterError::InvalidPage]);
    }

    #[test]
    fn test_title_is_lowercased() {
        let filter = DocumentListParams {
            title: Some("Budget Report".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(filter.title, "budget report");
    }

    #[test]
    fn test_attachment_filter() {
        let filter = AttachmentListParams {
            name: Some("Report".to_string()),
            attachment_type: Some("docs".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(filter.name, "report");
        assert_eq!(filter.attachment_type, Some(AttachmentType::Docs));

        let err = AttachmentListParams {
            attachment_type: Some("video".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.0, vec![FilterError::InvalidAttachmentType]);
    }

    #[test]
    fn test_page_params() {
        let pagination = PageParams {
            page: Some("3".to_string()),
            page_size: Some("20".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(pagination.offset(), 40);

        let err = PageParams {
            page: Some("-2".to_string()),
            page_size: Some("0".to_string()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.0, vec![FilterError::InvalidPage, FilterError::InvalidPageSize]);
    }

    #[test]
    fn test_total_pages() {
        let p = Pagination { page: 1, page_size: 10 };
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(3), 1);
        assert_eq!(p.total_pages(10), 1);
        let p = Pagination { page: 2, page_size: 3 };
        assert_eq!(p.total_pages(3), 1);
        assert_eq!(p.offset(), 3);
    }
}
