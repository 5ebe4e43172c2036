use lexa_pipeline::{LeafResult, ResultSet, RiskLevel, format_score, format_size};
use tabled::{
    Table, Tabled,
    settings::{Panel, Style},
};

#[derive(Debug, Clone, Default)]
pub struct Formatter {
    pub header: Option<String>,
    pub footer: Option<String>,
}

impl Formatter {
    pub fn build<T: Tabled, I: IntoIterator<Item = T>>(self, data: I) -> Table {
        let mut table = Table::new(data);
        if let Some(header) = self.header {
            table.with(Panel::header(header));
        }
        if let Some(footer) = self.footer {
            table.with(Panel::footer(footer));
        }

        table.with(Style::blank());
        table
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct ResultRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Score")]
    pub score: String,
    #[tabled(rename = "Risk")]
    pub risk: String,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Person")]
    pub person: String,
    #[tabled(rename = "Path")]
    pub path: String,
}

impl ResultRow {
    pub fn new(leaf: &LeafResult, set: &ResultSet) -> Self {
        let risk = match leaf.score.map(RiskLevel::of) {
            Some(RiskLevel::High) => "high",
            Some(RiskLevel::Elevated) => "elevated",
            Some(RiskLevel::Low) => "low",
            None if !leaf.is_scorable => "unsupported",
            None => "",
        };
        Self {
            name: leaf.display_name.clone(),
            score: format_score(leaf.score),
            risk: risk.to_string(),
            size: format_size(leaf.size_bytes),
            person: set.person_name(&leaf.path).unwrap_or_default().to_string(),
            path: leaf.path.to_string(),
        }
    }
}
