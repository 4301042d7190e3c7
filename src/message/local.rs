use crate::domain::{ChangeEntry, ChangeSummary, SemanticVersion};
use crate::message::MessageGenerator;

/// Deterministic commit message built from change counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMessageGenerator;

impl LocalMessageGenerator {
    /// Render the template for a change summary.
    pub fn render(summary: &ChangeSummary, version: &SemanticVersion) -> String {
        let mut lines = vec![
            format!("release: publish v{}", version),
            String::new(),
            format!("- Modified files: {}", summary.modified),
            format!("- Added files: {}", summary.added),
            format!("- Deleted files: {}", summary.deleted),
        ];
        if summary.renamed > 0 {
            lines.push(format!("- Renamed files: {}", summary.renamed));
        }
        lines.push("- Automated version release, see change history for details".to_string());
        lines.join("\n")
    }
}

impl MessageGenerator for LocalMessageGenerator {
    fn generate(&self, changes: &[ChangeEntry], version: &SemanticVersion) -> String {
        Self::render(&ChangeSummary::from_changes(changes), version)
    }

    fn kind(&self) -> &'static str {
        "local"
    }
}
