use super::*;
use itertools::Itertools;
use std::collections::HashMap;

/// # Human readable report of the properties of the tree
impl<W: Weight> Tree<W> {
    /// Returns report relative to the tree metrics.
    ///
    /// The report includes the leaf, component and root counts, the
    /// height, the number of degenerate components and the level range.
    pub fn report(&self) -> HashMap<&str, String> {
        let mut report: HashMap<&str, String> = HashMap::new();
        report.insert("leaves_number", self.get_leaves_number().to_string());
        report.insert("components_number", self.get_components_number().to_string());
        report.insert("nodes_number", self.get_nodes_number().to_string());
        report.insert("roots_number", self.get_roots_number().to_string());
        report.insert("height", self.get_height().to_string());
        report.insert(
            "degenerate_components_number",
            self.get_degenerate_components_number().to_string(),
        );
        if let Some((min_level, max_level)) = self
            .comp_level
            .iter()
            .minmax_by(|a, b| a.cmp_weight(b))
            .into_option()
        {
            report.insert("min_level", format!("{:?}", min_level));
            report.insert("max_level", format!("{:?}", max_level));
        }
        report
    }

    /// Returns a one line summary in the report's key order.
    pub fn textual_report(&self) -> String {
        format!(
            "Tree with {} leaves, {} components over {} roots, height {}.",
            self.get_leaves_number(),
            self.get_components_number(),
            self.get_roots_number(),
            self.get_height()
        )
    }
}
