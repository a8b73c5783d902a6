//! Plain text rendering of a [`SimStats`] snapshot.

use crate::SimStats;
use std::fmt;

/// Renders a [`SimStats`] as the two tables a dashboard would show: the
/// queue of every node and the load of every link.
///
/// ```
/// use trafficsim::{Report, Scenario, Simulation};
///
/// let mut simulation = Simulation::from_scenario(Scenario::demo());
/// simulation.step();
///
/// let text = Report::new(&simulation.stats()).to_string();
/// assert!(text.starts_with("slot 08:00"));
/// assert!(text.contains("A-B"));
/// ```
pub struct Report<'a> {
    stats: &'a SimStats,
}

impl<'a> Report<'a> {
    pub fn new(stats: &'a SimStats) -> Self {
        Self { stats }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;

        match &stats.slot {
            Some(slot) => writeln!(f, "slot {slot} (step {})", stats.steps)?,
            None => writeln!(f, "no slot processed yet")?,
        }

        writeln!(f, "node queues:")?;
        let width = stats
            .nodes
            .iter()
            .map(|node| node.name.len())
            .max()
            .unwrap_or_default();
        for node in &stats.nodes {
            writeln!(f, "  {:<width$}  {:>8}", node.name, node.queue_length)?;
        }

        writeln!(f, "link loads:")?;
        let labels: Vec<_> = stats
            .links
            .iter()
            .map(|link| format!("{}-{}", link.names.0, link.names.1))
            .collect();
        let width = labels.iter().map(String::len).max().unwrap_or_default();
        for (label, link) in labels.iter().zip(&stats.links) {
            let marker = if link.is_saturated() {
                " saturated"
            } else {
                ""
            };
            writeln!(
                f,
                "  {label:<width$}  {:>6}/{:<6} {:>5.1}%{marker}",
                link.load,
                link.capacity,
                link.utilisation() * 100.0,
            )?;
        }

        let packets = &stats.packets;
        write!(
            f,
            "packets: generated {} | delivered {} | queued {} | dropped {} | retried {}",
            packets.generated, packets.delivered, packets.queued, packets.dropped, packets.retried,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Scenario, Simulation};

    #[test]
    fn before_first_step() {
        let simulation = Simulation::from_scenario(Scenario::demo());
        let text = Report::new(&simulation.stats()).to_string();

        assert!(text.starts_with("no slot processed yet"));
        assert!(text.ends_with("retried 0"));
    }

    #[test]
    fn every_node_and_link_listed() {
        let mut simulation = Simulation::from_scenario(Scenario::demo());
        simulation.step();
        let stats = simulation.stats();
        let text = Report::new(&stats).to_string();

        // header, 2 titles, 5 nodes, 6 links, counters
        assert_eq!(text.lines().count(), 1 + 2 + 5 + 6 + 1);
        for name in ["A", "B", "C", "D", "E"] {
            assert!(
                text.lines().any(|line| line.trim_start().starts_with(name)),
                "{name} missing from\n{text}"
            );
        }
        assert!(text.contains("C-E"));
        assert!(text.contains("generated 200"));
    }

    #[test]
    fn saturated_links_are_flagged() {
        let scenario: Scenario = "node A B\nlink A B 2\nslot 1 A=3".parse().unwrap();
        let mut simulation = Simulation::from_scenario(scenario);
        simulation.step();
        let text = Report::new(&simulation.stats()).to_string();

        let line = text.lines().find(|line| line.contains("A-B")).unwrap();
        assert!(line.contains("2/2"), "{line}");
        assert!(line.ends_with("saturated"), "{line}");
    }
}
