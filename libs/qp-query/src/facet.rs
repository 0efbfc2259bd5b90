//! Facet codec.
//!
//! Facet selections travel as pipe-delimited query parameters
//! (`qp-search-year=2020|2021`). Each facet with at least one value becomes a
//! tagged filter clause, and each facet field is declared with a matching
//! exclusion tag so a facet never narrows its own counts: values are OR'ed
//! within a facet and facets are AND'ed together.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::language::Language;

/// Separator between selected values in a facet parameter.
pub const VALUE_SEPARATOR: &str = "|";

/// The fixed set of facets offered by the search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    Minister,
    MinisterPosition,
    MinisterStatus,
    Year,
    Month,
    Organization,
}

impl FacetKind {
    pub const ALL: [FacetKind; 6] = [
        FacetKind::Minister,
        FacetKind::MinisterPosition,
        FacetKind::MinisterStatus,
        FacetKind::Year,
        FacetKind::Month,
        FacetKind::Organization,
    ];

    /// Inbound query parameter carrying this facet's selection.
    pub fn param(self) -> &'static str {
        match self {
            FacetKind::Minister => "qp-search-minister",
            FacetKind::MinisterPosition => "qp-search-minister-positions",
            FacetKind::MinisterStatus => "qp-search-minister-status",
            FacetKind::Year => "qp-search-year",
            FacetKind::Month => "qp-search-month",
            FacetKind::Organization => "qp-search-orgs",
        }
    }

    pub fn from_param(param: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.param() == param)
    }

    fn field_template(self) -> &'static str {
        match self {
            FacetKind::Minister => "minister_{l}_s",
            FacetKind::MinisterPosition => "minister_position_{l}_s",
            FacetKind::MinisterStatus => "minister_status_{l}_s",
            FacetKind::Year => "year_i",
            FacetKind::Month => "month_i",
            FacetKind::Organization => "owner_org_{l}_s",
        }
    }

    /// Engine field holding this facet's values.
    pub fn field(self, language: Language) -> String {
        language.field(self.field_template())
    }

    pub fn tag(self, language: Language) -> String {
        format!("tag_{}", self.field(language))
    }

    /// Facet field declaration excluding this facet's own filter from its counts.
    pub fn exclusion_field(self, language: Language) -> String {
        format!("{{!ex={}}}{}", self.tag(language), self.field(language))
    }
}

/// The selected values of one facet, decoded from its wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetSelection {
    raw: String,
    values: Vec<String>,
}

impl FacetSelection {
    pub const fn empty() -> Self {
        Self {
            raw: String::new(),
            values: Vec::new(),
        }
    }

    /// Decode a pipe-delimited parameter.
    ///
    /// Empty segments carry no selection: `""` and `"A||B"` only yield the
    /// non-empty values. Duplicates are dropped, first occurrence wins.
    pub fn decode(raw: &str) -> Self {
        let mut values: Vec<String> = Vec::new();
        for part in raw.split(VALUE_SEPARATOR) {
            if !part.is_empty() && !values.iter().any(|v| v == part) {
                values.push(part.to_string());
            }
        }
        Self {
            raw: raw.to_string(),
            values,
        }
    }

    /// The parameter exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The literal split of the raw parameter. An empty parameter yields `[""]`.
    pub fn segments(&self) -> Vec<&str> {
        self.raw.split(VALUE_SEPARATOR).collect()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn encode(&self) -> String {
        self.values.join(VALUE_SEPARATOR)
    }

    /// Filter clause for this selection, or `None` when nothing is selected.
    pub fn to_filter(&self, kind: FacetKind, language: Language) -> Option<FilterClause> {
        if self.is_empty() {
            return None;
        }
        Some(FilterClause {
            tag: kind.tag(language),
            field: kind.field(language),
            values: self.values.clone(),
        })
    }
}

static NO_SELECTION: FacetSelection = FacetSelection::empty();

/// Selections for every facet of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetFilters {
    selections: BTreeMap<FacetKind, FacetSelection>,
}

impl FacetFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect facet selections from decoded query pairs. For a repeated
    /// parameter the last occurrence wins.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut filters = Self::new();
        for (name, value) in pairs {
            if let Some(kind) = FacetKind::from_param(name) {
                filters.set(kind, FacetSelection::decode(value));
            }
        }
        filters
    }

    pub fn set(&mut self, kind: FacetKind, selection: FacetSelection) {
        self.selections.insert(kind, selection);
    }

    pub fn get(&self, kind: FacetKind) -> &FacetSelection {
        self.selections.get(&kind).unwrap_or(&NO_SELECTION)
    }

    /// One clause per facet with a selection, in [`FacetKind::ALL`] order.
    pub fn clauses(&self, language: Language) -> Vec<FilterClause> {
        FacetKind::ALL
            .iter()
            .filter_map(|kind| self.get(*kind).to_filter(*kind, language))
            .collect()
    }
}

/// A tagged boolean-OR filter over one facet field:
/// `{!tag=tag_year_i}year_i:("2020" OR "2021")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub tag: String,
    pub field: String,
    pub values: Vec<String>,
}

impl fmt::Display for FilterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{!tag={}}}{}:(", self.tag, self.field)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(" OR ")?;
            }
            f.write_str(&quote(value))?;
        }
        f.write_str(")")
    }
}

impl FromStr for FilterClause {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |pos: usize, message: &'static str| Error::InvalidFilterClause { pos, message };

        let rest = s
            .strip_prefix("{!tag=")
            .ok_or_else(|| invalid(0, "expected '{!tag='"))?;
        let offset = s.len() - rest.len();
        let close = rest
            .find('}')
            .ok_or_else(|| invalid(offset, "unterminated local params"))?;
        let tag = &rest[..close];

        let rest = &rest[close + 1..];
        let offset = s.len() - rest.len();
        let (field, body) = rest
            .split_once(":(")
            .ok_or_else(|| invalid(offset, "expected 'field:('"))?;
        let body = body
            .strip_suffix(')')
            .ok_or_else(|| invalid(s.len(), "expected closing ')'"))?;
        let body_offset = offset + field.len() + 2;

        Ok(FilterClause {
            tag: tag.to_string(),
            field: field.to_string(),
            values: parse_quoted_values(body, body_offset)?,
        })
    }
}

pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn parse_quoted_values(body: &str, offset: usize) -> Result<Vec<String>> {
    let invalid = |pos: usize, message: &'static str| Error::InvalidFilterClause {
        pos: offset + pos,
        message,
    };

    let mut values = Vec::new();
    let mut chars = body.char_indices().peekable();
    loop {
        while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            Some((_, '"')) => {}
            Some((pos, _)) => return Err(invalid(pos, "expected '\"'")),
            None if values.is_empty() => return Err(invalid(0, "empty value list")),
            None => return Err(invalid(body.len(), "dangling 'OR'")),
        }

        let mut value = String::new();
        loop {
            match chars.next() {
                Some((_, '\\')) => match chars.next() {
                    Some((_, c)) => value.push(c),
                    None => return Err(invalid(body.len(), "dangling escape")),
                },
                Some((_, '"')) => break,
                Some((_, c)) => value.push(c),
                None => return Err(invalid(body.len(), "unterminated value")),
            }
        }
        values.push(value);

        while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => return Ok(values),
            Some((pos, 'O')) => match chars.next() {
                Some((_, 'R')) => {}
                _ => return Err(invalid(pos, "expected 'OR'")),
            },
            Some((pos, _)) => return Err(invalid(pos, "expected 'OR'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parameter_emits_no_clause() {
        let selection = FacetSelection::decode("");
        assert!(selection.is_empty());
        assert_eq!(selection.segments(), vec![""]);
        assert!(selection.to_filter(FacetKind::Year, Language::En).is_none());
    }

    #[test]
    fn two_values_become_an_or_clause() {
        let clause = FacetSelection::decode("A|B")
            .to_filter(FacetKind::Minister, Language::En)
            .unwrap();
        assert_eq!(
            clause.to_string(),
            r#"{!tag=tag_minister_en_s}minister_en_s:("A" OR "B")"#
        );
    }

    #[test]
    fn empty_segments_and_duplicates_are_dropped() {
        let selection = FacetSelection::decode("A||B|A|");
        assert_eq!(selection.values(), &["A".to_string(), "B".to_string()]);
        assert_eq!(selection.segments(), vec!["A", "", "B", "A", ""]);
        assert_eq!(selection.encode(), "A|B");
    }

    #[test]
    fn multi_word_values_are_quoted_and_escaped() {
        let clause = FacetSelection::decode(r#"Treasury Board|the "big" one"#)
            .to_filter(FacetKind::Organization, Language::Fr)
            .unwrap();
        assert_eq!(
            clause.to_string(),
            r#"{!tag=tag_owner_org_fr_s}owner_org_fr_s:("Treasury Board" OR "the \"big\" one")"#
        );
    }

    #[test]
    fn rendered_clause_parses_back() {
        let selection = FacetSelection::decode(r#"2021|St. John's|back\slash|"q""#);
        let clause = selection.to_filter(FacetKind::Year, Language::En).unwrap();
        let parsed: FilterClause = clause.to_string().parse().unwrap();
        assert_eq!(parsed, clause);
        assert_eq!(parsed.values, selection.values());
    }

    #[test]
    fn malformed_clauses_are_rejected() {
        assert!("year_i:(\"2020\")".parse::<FilterClause>().is_err());
        assert!("{!tag=t}year_i:()".parse::<FilterClause>().is_err());
        assert!("{!tag=t}year_i:(\"2020\" OR)".parse::<FilterClause>().is_err());
        assert!("{!tag=t}year_i:(\"2020\" AND \"2021\")"
            .parse::<FilterClause>()
            .is_err());
        assert!("{!tag=t}year_i:(\"2020)".parse::<FilterClause>().is_err());
    }

    #[test]
    fn filters_skip_facets_without_selection() {
        let pairs = vec![
            ("qp-search-year".to_string(), "2020|2021".to_string()),
            ("qp-search-month".to_string(), "".to_string()),
            ("qp-search-orgs".to_string(), "tbs-sct".to_string()),
            ("unrelated".to_string(), "x".to_string()),
        ];
        let filters = FacetFilters::from_pairs(&pairs);
        let clauses = filters.clauses(Language::En);

        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].field, "year_i");
        assert_eq!(clauses[1].field, "owner_org_en_s");
        assert!(filters.get(FacetKind::Minister).is_empty());
    }

    #[test]
    fn last_repeated_parameter_wins() {
        let pairs = vec![
            ("qp-search-year".to_string(), "2019".to_string()),
            ("qp-search-year".to_string(), "2020".to_string()),
        ];
        let filters = FacetFilters::from_pairs(&pairs);
        assert_eq!(filters.get(FacetKind::Year).values(), &["2020".to_string()]);
    }

    #[test]
    fn every_param_maps_back_to_its_kind() {
        for kind in FacetKind::ALL {
            assert_eq!(FacetKind::from_param(kind.param()), Some(kind));
        }
        assert_eq!(FacetKind::from_param("qp-search"), None);
    }
}
