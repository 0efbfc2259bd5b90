use serde::Serialize;

use crate::language::Language;

/// Sort used by exports: complete and independent of relevance.
pub const EXPORT_SORT: &str = "id asc";

/// Sort orders a visitor may pick on the search page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Relevance,
    DateReceivedDesc,
    TitleAsc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 3] = [
        SortOrder::Relevance,
        SortOrder::DateReceivedDesc,
        SortOrder::TitleAsc,
    ];

    /// Engine sort string. Titles sort on the language's own string field.
    pub fn as_param(self, language: Language) -> String {
        match self {
            SortOrder::Relevance => "score desc".to_string(),
            SortOrder::DateReceivedDesc => "date_received_dt desc".to_string(),
            SortOrder::TitleAsc => format!("title_{}_s asc", language.code()),
        }
    }

    /// Resolve the `sort` parameter against the language's allow-list.
    /// Absent and unknown values both mean relevance.
    pub fn from_param(value: Option<&str>, language: Language) -> Self {
        let Some(value) = value.map(str::trim) else {
            return SortOrder::Relevance;
        };
        Self::ALL
            .into_iter()
            .find(|order| order.as_param(language) == value)
            .unwrap_or(SortOrder::Relevance)
    }
}
