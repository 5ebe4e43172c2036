use std::collections::HashMap;
use std::io::Write;

use lexa_archive::ArchivePath;
use tracing::{debug, warn};

use crate::config::Capabilities;
use crate::error::{Capability, Error, Result};
use crate::outcome::{LeafResult, TraversalOutcome};
use crate::present::{ResultView, format_score, format_size};

/// The results currently shown to the user.
///
/// Owns every preview handle of the installed outcome. Installing a new
/// outcome, clearing, or dropping the set releases all of them.
#[derive(Debug, Default)]
pub struct ResultSet {
    capabilities: Capabilities,
    outcome: Option<TraversalOutcome>,
    person_names: HashMap<ArchivePath, String>,
}

impl ResultSet {
    pub const EXPORT_HEADERS: [&str; 4] = ["Name", "Score", "Size", "Person name"];

    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    pub fn outcome(&self) -> Option<&TraversalOutcome> {
        self.outcome.as_ref()
    }

    pub fn leaves(&self) -> &[LeafResult] {
        self.outcome
            .as_ref()
            .map(|o| o.leaves.as_slice())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves().is_empty()
    }

    /// Install `outcome`, releasing every handle of the previous one first.
    pub fn replace(&mut self, outcome: TraversalOutcome) {
        self.release();
        debug!(leaves = outcome.leaves.len(), "result set replaced");
        self.outcome = Some(outcome);
    }

    /// Discard the current results.
    pub fn clear(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.person_names.clear();
        let Some(outcome) = self.outcome.take() else {
            return;
        };
        for leaf in outcome.leaves {
            if let Err(e) = leaf.preview.revoke() {
                warn!(path = %leaf.path, error = %e, "failed to release preview");
            }
        }
    }

    /// Attach a person name to the result at `path`. An empty name removes it.
    pub fn annotate(&mut self, path: &ArchivePath, name: impl Into<String>) -> Result<()> {
        if !self.capabilities.annotations {
            return Err(Error::CapabilityDisabled(Capability::Annotations));
        }
        if self.outcome.as_ref().and_then(|o| o.find(path)).is_none() {
            return Err(Error::UnknownResult(path.to_string()));
        }
        let name = name.into();
        if name.trim().is_empty() {
            self.person_names.remove(path);
        } else {
            self.person_names.insert(path.clone(), name);
        }
        Ok(())
    }

    pub fn person_name(&self, path: &ArchivePath) -> Option<&str> {
        self.person_names.get(path).map(String::as_str)
    }

    /// Rows of the current results as selected by `view`.
    pub fn rows(&self, view: &ResultView) -> Vec<&LeafResult> {
        view.apply(self.leaves())
    }

    /// Write the rows selected by `view` as an HTML table spreadsheet
    /// readable by Excel and LibreOffice as `.xls`.
    pub fn export_xls<W: Write>(&self, view: &ResultView, mut out: W) -> Result<()> {
        if !self.capabilities.export {
            return Err(Error::CapabilityDisabled(Capability::Export));
        }

        let mut html = String::from(r#"<!DOCTYPE html><html><head><meta charset="utf-8"></head><body><table><tr>"#);
        for header in Self::EXPORT_HEADERS {
            html.push_str("<th>");
            html.push_str(&escape_html(header));
            html.push_str("</th>");
        }
        html.push_str("</tr>");

        let rows = self.rows(view);
        for leaf in &rows {
            let cells = [
                leaf.display_name.clone(),
                format_score(leaf.score),
                format_size(leaf.size_bytes),
                self.person_name(&leaf.path).unwrap_or_default().to_string(),
            ];
            html.push_str("<tr>");
            for cell in &cells {
                html.push_str("<td>");
                html.push_str(&escape_html(cell));
                html.push_str("</td>");
            }
            html.push_str("</tr>");
        }
        html.push_str("</table></body></html>");

        out.write_all(html.as_bytes())?;
        out.flush()?;
        debug!(rows = rows.len(), "results exported");
        Ok(())
    }

    /// Conventional file name for an export made at `timestamp_ms`.
    pub fn export_file_name(timestamp_ms: u128) -> String {
        format!("lexa-guard-export-{timestamp_ms}.xls")
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
