use crate::{node::NodeId, topology::Topology};
use thiserror::Error;

/// Error returned when a [`Schedule`] cannot be built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The schedule has no time slot at all.
    #[error("The schedule needs at least one time slot")]
    Empty,
    /// A generation rate was declared before any time slot.
    #[error("Rate for node ({node}) declared outside of a time slot")]
    RateOutsideSlot { node: String },
    /// A generation rate references a node absent from the topology.
    #[error("Slot ({slot}) references unknown node ({node})")]
    UnknownNode { slot: String, node: String },
    /// A generation rate is negative.
    #[error("Slot ({slot}) has a negative generation rate for node ({node})")]
    NegativeRate { slot: String, node: String },
    /// The same node was given two generation rates in one slot.
    #[error("Slot ({slot}) declares node ({node}) more than once")]
    DuplicateRate { slot: String, node: String },
    /// The schedule was built against another topology and rates a node
    /// this one does not have.
    #[error("Slot ({slot}) rates node ({node}) which is not part of the topology")]
    ForeignNode { slot: String, node: NodeId },
}

/// One discrete tick of the simulation.
///
/// A time slot has a label (typically a time of the day, e.g. `"08:00"`)
/// and, for some nodes, the number of packets they originate during the
/// slot. A node without an entry generates nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    label: String,
    rates: Vec<(NodeId, u64)>,
}

impl TimeSlot {
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// the `(node, generation_rate)` entries of the slot, in declaration order
    pub fn rates(&self) -> impl ExactSizeIterator<Item = (NodeId, u64)> + '_ {
        self.rates.iter().copied()
    }

    /// the generation rate of `node` during this slot
    pub fn rate(&self, node: NodeId) -> u64 {
        self.rates
            .iter()
            .find_map(|(id, rate)| (*id == node).then_some(*rate))
            .unwrap_or(0)
    }

    /// total number of packets generated during this slot
    pub fn total(&self) -> u64 {
        self.rates.iter().map(|(_, rate)| rate).sum()
    }
}

/// The ordered, non-empty, cyclic list of [`TimeSlot`]s.
///
/// The [`Schedule`] is static: the position of the simulation within it
/// is tracked separately by a [`Cursor`].
///
/// # Example
///
/// ```
/// use trafficsim_core::{schedule::Schedule, topology::Topology};
///
/// let topology = Topology::builder()
///     .node("A")
///     .node("B")
///     .link("A", "B", 10)
///     .build()
///     .unwrap();
///
/// let schedule = Schedule::builder(&topology)
///     .slot("08:00")
///     .rate("A", 5)
///     .rate("B", 3)
///     .slot("08:15")
///     .rate("A", 7)
///     .build()
///     .unwrap();
///
/// assert_eq!(schedule.len(), 2);
/// assert_eq!(schedule.slots().nth(1).unwrap().total(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    slots: Vec<TimeSlot>,
}

/// Builder for a [`Schedule`].
///
/// Obtained via [`Schedule::builder`]. [`slot`](ScheduleBuilder::slot)
/// opens a new time slot and every following [`rate`](ScheduleBuilder::rate)
/// is added to it. Node names are resolved against the [`Topology`] in
/// [`build`](ScheduleBuilder::build).
pub struct ScheduleBuilder<'a> {
    topology: &'a Topology,
    slots: Vec<(String, Vec<(String, u64)>)>,
    orphans: Vec<String>,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(topology: &'a Topology) -> Self {
        Self {
            topology,
            slots: Vec::new(),
            orphans: Vec::new(),
        }
    }

    /// Open a new time slot.
    pub fn slot(mut self, label: impl Into<String>) -> Self {
        self.slots.push((label.into(), Vec::new()));
        self
    }

    /// Have `node` generate `rate` packets during the last opened slot.
    pub fn rate(mut self, node: impl Into<String>, rate: u64) -> Self {
        match self.slots.last_mut() {
            Some((_, rates)) => rates.push((node.into(), rate)),
            None => self.orphans.push(node.into()),
        }
        self
    }

    /// Validate the declarations and build the [`Schedule`].
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::Empty`] if no slot was declared.
    /// - [`ScheduleError::RateOutsideSlot`] if a rate precedes every slot.
    /// - [`ScheduleError::UnknownNode`] if a node is not in the topology.
    /// - [`ScheduleError::DuplicateRate`] if a node is rated twice in a slot.
    pub fn build(self) -> Result<Schedule, ScheduleError> {
        let Self {
            topology,
            slots: declared,
            orphans,
        } = self;

        if let Some(node) = orphans.into_iter().next() {
            return Err(ScheduleError::RateOutsideSlot { node });
        }
        if declared.is_empty() {
            return Err(ScheduleError::Empty);
        }

        let mut slots = Vec::with_capacity(declared.len());
        for (label, declared_rates) in declared {
            let mut rates: Vec<(NodeId, u64)> = Vec::with_capacity(declared_rates.len());
            for (node, rate) in declared_rates {
                let Some(id) = topology.node_id(&node) else {
                    return Err(ScheduleError::UnknownNode { slot: label, node });
                };
                if rates.iter().any(|(other, _)| *other == id) {
                    return Err(ScheduleError::DuplicateRate { slot: label, node });
                }
                rates.push((id, rate));
            }
            slots.push(TimeSlot { label, rates });
        }

        Ok(Schedule { slots })
    }
}

impl Schedule {
    /// Start declaring a schedule for the given [`Topology`].
    pub fn builder(topology: &Topology) -> ScheduleBuilder<'_> {
        ScheduleBuilder::new(topology)
    }

    pub fn slots(&self) -> impl ExactSizeIterator<Item = &TimeSlot> {
        self.slots.iter()
    }

    /// Number of time slots in one cycle. Never zero.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check that every node rated by the schedule belongs to `topology`.
    ///
    /// Always true for the topology the schedule was built against.
    pub fn check(&self, topology: &Topology) -> Result<(), ScheduleError> {
        for slot in &self.slots {
            for (node, _) in slot.rates() {
                if !topology.contains(node) {
                    return Err(ScheduleError::ForeignNode {
                        slot: slot.label.clone(),
                        node,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Position of the simulation within a [`Schedule`].
///
/// The cursor only knows the length of the schedule it walks: it moves
/// forward one slot at a time and wraps around to the first slot after
/// the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    /// a cursor on the first slot of `schedule`
    pub fn new(schedule: &Schedule) -> Self {
        Self {
            index: 0,
            len: schedule.len(),
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// the [`TimeSlot`] the cursor points at
    ///
    /// `schedule` must be the schedule the cursor was created from.
    pub fn current<'a>(&self, schedule: &'a Schedule) -> &'a TimeSlot {
        debug_assert_eq!(self.len, schedule.len());
        &schedule.slots[self.index % schedule.slots.len()]
    }

    /// move to the next slot, wrapping around after the last one
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % self.len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> Topology {
        Topology::builder()
            .node("A")
            .node("B")
            .node("C")
            .link("A", "B", 1)
            .link("B", "C", 1)
            .build()
            .unwrap()
    }

    fn three_slots(topology: &Topology) -> Schedule {
        Schedule::builder(topology)
            .slot("08:00")
            .rate("A", 1)
            .slot("08:15")
            .rate("B", 2)
            .slot("08:30")
            .rate("C", 3)
            .build()
            .unwrap()
    }

    #[test]
    fn slot_rates() {
        let topology = topology();
        let schedule = Schedule::builder(&topology)
            .slot("morning")
            .rate("C", 4)
            .rate("A", 0)
            .build()
            .unwrap();

        let slot = schedule.slots().next().unwrap();
        assert_eq!(slot.label(), "morning");
        assert_eq!(slot.rate(topology.node_id("C").unwrap()), 4);
        assert_eq!(slot.rate(topology.node_id("A").unwrap()), 0);
        // absent from the slot: generates nothing
        assert_eq!(slot.rate(topology.node_id("B").unwrap()), 0);
        assert_eq!(slot.total(), 4);

        let order: Vec<_> = slot.rates().map(|(id, _)| id).collect();
        assert_eq!(order, [NodeId::new(2), NodeId::ZERO]);
    }

    #[test]
    fn cursor_wraps_around() {
        let topology = topology();
        let schedule = three_slots(&topology);
        let mut cursor = Cursor::new(&schedule);

        let mut labels = Vec::new();
        for _ in 0..4 {
            labels.push(cursor.current(&schedule).label().to_owned());
            cursor.advance();
        }
        assert_eq!(labels, ["08:00", "08:15", "08:30", "08:00"]);
    }

    #[test]
    fn single_slot_cursor_stays() {
        let topology = topology();
        let schedule = Schedule::builder(&topology).slot("only").build().unwrap();
        let mut cursor = Cursor::new(&schedule);

        cursor.advance();
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.current(&schedule).label(), "only");
    }

    #[test]
    fn check_against_topology() {
        let topology = topology();
        let schedule = three_slots(&topology);
        assert_eq!(schedule.check(&topology), Ok(()));

        let smaller = Topology::builder().node("A").node("B").build().unwrap();
        assert_eq!(
            schedule.check(&smaller),
            Err(ScheduleError::ForeignNode {
                slot: "08:30".to_owned(),
                node: NodeId::new(2)
            })
        );
    }

    #[test]
    fn empty() {
        let topology = topology();
        let err = Schedule::builder(&topology).build().unwrap_err();
        assert_eq!(err, ScheduleError::Empty);
    }

    #[test]
    fn unknown_node() {
        let topology = topology();
        let err = Schedule::builder(&topology)
            .slot("08:00")
            .rate("Z", 1)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ScheduleError::UnknownNode {
                slot: "08:00".to_owned(),
                node: "Z".to_owned()
            }
        );
    }

    #[test]
    fn rate_outside_slot() {
        let topology = topology();
        let err = Schedule::builder(&topology)
            .rate("A", 1)
            .slot("08:00")
            .build()
            .unwrap_err();
        assert!(matches!(err, ScheduleError::RateOutsideSlot { .. }));
    }

    #[test]
    fn duplicate_rate() {
        let topology = topology();
        let err = Schedule::builder(&topology)
            .slot("08:00")
            .rate("A", 1)
            .rate("A", 2)
            .build()
            .unwrap_err();
        assert!(matches!(err, ScheduleError::DuplicateRate { .. }));
    }
}
