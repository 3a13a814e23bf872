//! Year-grouped course requirement extraction from program detail pages.

use coursesched_core::{MarkerProfile, RequirementBlock};
use regex::Regex;

use crate::markup::{normalize_entities, split_ci, strip_tags_to_lines};

/// Extracts requirement lines per program year, in page order.
///
/// A line is kept when it matches the profile's line pattern. Scanning a
/// year stops once `requirement_reach` lines pass without a kept line, which
/// keeps trailing page boilerplate out of the last year.
#[must_use]
pub fn extract_requirements(html: &str, profile: &MarkerProfile) -> Vec<RequirementBlock> {
    let pattern = match Regex::new(&profile.requirement_line_pattern) {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::error!(error = %e, "requirement line pattern does not compile");
            return Vec::new();
        }
    };

    split_ci(html, &profile.requirement_year_token)
        .into_iter()
        .skip(1)
        .map(|fragment| {
            let fragment = normalize_entities(fragment);
            let (year, rest) = fragment.split_at(fragment.find('<').unwrap_or(fragment.len()));
            let text = strip_tags_to_lines(rest);

            let mut lines = Vec::new();
            let mut last_kept = 0;
            for (index, line) in text.split('\n').enumerate() {
                if index - last_kept >= profile.requirement_reach {
                    break;
                }
                let line = line.trim();
                if pattern.is_match(line) {
                    lines.push(line.to_string());
                    last_kept = index;
                }
            }

            RequirementBlock {
                year: year.trim().to_string(),
                lines,
            }
        })
        .collect()
}

/// Renders blocks as a `<th>Year N</th>` line followed by the kept lines.
#[must_use]
pub fn render_requirements(blocks: &[RequirementBlock]) -> String {
    blocks
        .iter()
        .map(|block| format!("<th>Year {}</th>\n{}\n", block.year, block.lines.join("\n")))
        .collect()
}
