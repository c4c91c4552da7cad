//! Parser for the tabular campaign definition file.
//!
//! The input is plain text organized into named sections ("Campaigns",
//! "Ad Groups", "Keywords"), each holding pipe-delimited rows. Header and
//! separator rows are skipped, short rows are dropped, and parsing stops
//! at the first section header that is not one of the three known names.

use crate::models::{
    AdGroupDefinition, BiddingStrategy, CampaignDefinition, CampaignKind, KeywordDefinition,
    MatchType,
};

/// Minimum populated cells for a campaign row to be accepted.
const CAMPAIGN_MIN_CELLS: usize = 6;
/// Minimum populated cells for an ad-group row to be accepted.
const AD_GROUP_MIN_CELLS: usize = 3;
/// Minimum populated cells for a keyword row to be accepted.
const KEYWORD_MIN_CELLS: usize = 4;

/// Everything extracted from one definition file.
///
/// Output order is stable and matches input row order; no deduplication is
/// performed here.
#[derive(Debug, Clone, Default)]
pub struct ParsedDefinitions {
    pub campaigns: Vec<CampaignDefinition>,
    pub ad_groups: Vec<AdGroupDefinition>,
    pub keywords: Vec<KeywordDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Campaigns,
    AdGroups,
    Keywords,
}

/// Parses the raw definition text into structured records.
///
/// Pure and infallible by contract: malformed rows are dropped, numeric
/// fields coerce to 0, and an unrecognized section header ends the scan
/// with whatever was collected so far.
pub fn parse(raw_text: &str) -> ParsedDefinitions {
    let mut parsed = ParsedDefinitions::default();
    let mut section = Section::None;

    for line in raw_text.lines() {
        let line = line.trim();

        if let Some(header) = section_header(line) {
            section = match header.to_lowercase().as_str() {
                "campaigns" => Section::Campaigns,
                "ad groups" => Section::AdGroups,
                "keywords" => Section::Keywords,
                // The three known sections always precede any other
                // content; a different header ends the scan.
                _ => break,
            };
            continue;
        }

        if !line.starts_with('|') {
            continue;
        }

        let cells = split_row(line);
        if cells.is_empty() || is_header_row(&cells) || is_separator_row(&cells) {
            continue;
        }

        match section {
            Section::Campaigns => {
                if cells.len() >= CAMPAIGN_MIN_CELLS {
                    parsed.campaigns.push(campaign_from_cells(&cells));
                }
            }
            Section::AdGroups => {
                if cells.len() >= AD_GROUP_MIN_CELLS {
                    parsed.ad_groups.push(AdGroupDefinition {
                        campaign_name: cells[0].clone(),
                        name: cells[1].clone(),
                        final_url: cells[2].clone(),
                    });
                }
            }
            Section::Keywords => {
                if cells.len() >= KEYWORD_MIN_CELLS {
                    parsed.keywords.push(KeywordDefinition {
                        campaign_name: cells[0].clone(),
                        ad_group_name: cells[1].clone(),
                        text: cells[2].clone(),
                        match_type: MatchType::parse(&cells[3]),
                        final_url: cells.get(4).filter(|u| !u.is_empty()).cloned(),
                    });
                }
            }
            Section::None => {}
        }
    }

    parsed
}

/// Returns the header text if the line is a section header. Sections are
/// level-2+ markdown headers; a single `#` is the document title and is
/// ignored.
fn section_header(line: &str) -> Option<&str> {
    if !line.starts_with("##") {
        return None;
    }
    Some(line.trim_start_matches('#').trim())
}

/// Splits a pipe-delimited row into trimmed cells, dropping the empty
/// artifacts produced by the leading and trailing delimiters.
fn split_row(line: &str) -> Vec<String> {
    let mut cells: Vec<&str> = line.split('|').map(str::trim).collect();
    if cells.first() == Some(&"") {
        cells.remove(0);
    }
    if cells.last() == Some(&"") {
        cells.pop();
    }
    cells.into_iter().map(str::to_string).collect()
}

/// A header row starts with a known column-name token.
fn is_header_row(cells: &[String]) -> bool {
    let first = cells[0].to_lowercase();
    matches!(
        first.as_str(),
        "campaign" | "campaign name" | "name" | "owning campaign" | "ad group" | "keyword"
    )
}

/// A separator row is all dash-only cells (markdown table rules).
fn is_separator_row(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'))
}

fn campaign_from_cells(cells: &[String]) -> CampaignDefinition {
    let name = cells[0].clone();
    let kind = if name.to_lowercase().contains("brand") {
        CampaignKind::Brand
    } else {
        CampaignKind::LocationTargeted
    };

    CampaignDefinition {
        kind,
        campaign_type: cells[1].clone(),
        daily_budget: parse_budget(&cells[2]),
        bidding_strategy: BiddingStrategy::parse(&cells[3]),
        networks: cells[4].clone(),
        languages: cells[5].clone(),
        locations: cells.get(6).cloned().unwrap_or_default(),
        name,
    }
}

/// Budget cells parse permissively: currency symbols and thousands
/// separators are stripped, and non-numeric content coerces to 0.
fn parse_budget(cell: &str) -> f64 {
    let cleaned: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}
