//! Search filter handed to the question fetcher, one per category.

use crate::ConfigError;

/// Largest page size the search endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Immutable search criteria for one paginated question query.
///
/// Construct with [`SearchFilter::new`] (explicit paging) or
/// [`SearchFilter::for_count`] (paging derived from a result budget). Both
/// validate, so a `SearchFilter` in hand always has at least one tag, a page
/// size in `1..=100`, and `max_pages >= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    tags: Vec<String>,
    min_score: u32,
    require_accepted_answer: bool,
    page_size: u32,
    max_pages: u32,
}

impl SearchFilter {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the tag list is empty (after
    /// trimming and dropping blanks), `page_size` is outside `1..=100`, or
    /// `max_pages` is zero.
    pub fn new<I, S>(
        tags: I,
        min_score: u32,
        require_accepted_answer: bool,
        page_size: u32,
        max_pages: u32,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().trim();
            if tag.is_empty() {
                return Err(ConfigError::Validation(
                    "search tags must be non-empty strings".to_string(),
                ));
            }
            if !cleaned.iter().any(|t| t == tag) {
                cleaned.push(tag.to_string());
            }
        }
        if cleaned.is_empty() {
            return Err(ConfigError::Validation(
                "search filter needs at least one tag".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::Validation(format!(
                "page_size {page_size} out of range; must be 1..={MAX_PAGE_SIZE}"
            )));
        }
        if max_pages == 0 {
            return Err(ConfigError::Validation(
                "max_pages must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            tags: cleaned,
            min_score,
            require_accepted_answer,
            page_size,
            max_pages,
        })
    }

    /// Builds a filter sized to collect roughly `count` results: the page
    /// size is `min(count, 100)` and one page is allowed per 20 results, plus
    /// one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a zero `count` or an invalid
    /// tag list.
    pub fn for_count<I, S>(
        tags: I,
        count: u32,
        min_score: u32,
        require_accepted_answer: bool,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if count == 0 {
            return Err(ConfigError::Validation(
                "count must be at least 1".to_string(),
            ));
        }
        Self::new(
            tags,
            min_score,
            require_accepted_answer,
            count.min(MAX_PAGE_SIZE),
            count / 20 + 1,
        )
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Tags joined with `;`, the separator the `tagged` parameter expects.
    #[must_use]
    pub fn tagged(&self) -> String {
        self.tags.join(";")
    }

    #[must_use]
    pub fn min_score(&self) -> u32 {
        self.min_score
    }

    #[must_use]
    pub fn require_accepted_answer(&self) -> bool {
        self.require_accepted_answer
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }
}
