use crate::{
    accountant::{Accountant, DrainPolicy, Transmission},
    defaults::DEFAULT_SEED,
    link::LinkId,
    node::NodeId,
    route::{RouteError, Router},
    scenario::Scenario,
    schedule::{Cursor, Schedule, ScheduleError, TimeSlot},
    stats::{LinkStats, NodeStats, PacketCounters, SimStats},
    topology::Topology,
};
use rand_chacha::ChaChaRng;
use rand_core::{Rng, SeedableRng as _};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// This is the entry point for running a traffic simulation.
///
/// The [`Simulation`] owns the static inputs (the [`Topology`] and the
/// [`Schedule`]), the position within the schedule, the books kept by the
/// [`Accountant`] and the random source used to pick the destination of
/// every generated packet.
///
/// It is an ordinary value owned by the caller: a presentation layer keeps
/// one around for as long as it wants the simulation to live and calls
/// [`step`](Simulation::step) whenever the next slot should be processed.
/// `step` takes `&mut self`, so two steps can never interleave on the same
/// simulation.
///
/// # Example
///
/// ```
/// use trafficsim_core::{schedule::Schedule, simulation::Simulation, topology::Topology};
///
/// let topology = Topology::builder()
///     .node("A")
///     .node("B")
///     .link("A", "B", 10)
///     .build()
///     .unwrap();
/// let schedule = Schedule::builder(&topology)
///     .slot("08:00")
///     .rate("A", 12)
///     .build()
///     .unwrap();
///
/// let mut simulation = Simulation::new(topology, schedule).unwrap();
/// assert_eq!(simulation.step(), "08:00");
///
/// let a = simulation.topology().node_id("A").unwrap();
/// // 10 packets crossed A–B, the 2 others are waiting at A
/// assert_eq!(simulation.link_loads().values().sum::<u64>(), 10);
/// assert_eq!(simulation.queue_lengths()[&a], 2);
/// ```
pub struct Simulation<R = ChaChaRng> {
    topology: Topology,

    schedule: Schedule,

    cursor: Cursor,

    accountant: Accountant,

    drain_policy: DrainPolicy,

    /// Source of every random decision of the simulation.
    ///
    /// A single source guarantees the simulation is reproducible when
    /// seeded via [`Simulation::set_seed`].
    rng: R,

    last_slot: Option<String>,

    steps: u64,

    packets: PacketCounters,
}

impl Simulation<ChaChaRng> {
    /// Create a simulation of `schedule` over `topology`.
    ///
    /// The random source is a [`ChaChaRng`] seeded with [`DEFAULT_SEED`],
    /// so two simulations created with the same inputs behave the same.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::ForeignNode`] if `schedule` rates a node that is not
    /// part of `topology`.
    pub fn new(topology: Topology, schedule: Schedule) -> Result<Self, ScheduleError> {
        Self::with_rng(topology, schedule, ChaChaRng::seed_from_u64(DEFAULT_SEED))
    }

    /// Create a simulation from a parsed [`Scenario`].
    ///
    /// A scenario's schedule is always built against its own topology, so
    /// this cannot fail.
    pub fn from_scenario(scenario: Scenario) -> Self {
        let (topology, schedule) = scenario.into_parts();
        Self::assemble(topology, schedule, ChaChaRng::seed_from_u64(DEFAULT_SEED))
    }

    /// Re-seed the simulation's random-number generator.
    ///
    /// Every destination is drawn from a single [`ChaChaRng`]. Calling
    /// `set_seed` before running a simulation makes the whole run, i.e.
    /// every link load and queue length of every step, reproducible.
    ///
    /// The default seed is [`DEFAULT_SEED`].
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = ChaChaRng::seed_from_u64(seed);
    }
}

impl<R> Simulation<R>
where
    R: Rng,
{
    /// Create a simulation drawing its random decisions from `rng`.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::ForeignNode`] if `schedule` rates a node that is not
    /// part of `topology`.
    pub fn with_rng(
        topology: Topology,
        schedule: Schedule,
        rng: R,
    ) -> Result<Self, ScheduleError> {
        schedule.check(&topology)?;
        Ok(Self::assemble(topology, schedule, rng))
    }

    fn assemble(topology: Topology, schedule: Schedule, rng: R) -> Self {
        let cursor = Cursor::new(&schedule);
        let accountant = Accountant::new(&topology);
        Self {
            topology,
            schedule,
            cursor,
            accountant,
            drain_policy: DrainPolicy::default(),
            rng,
            last_slot: None,
            steps: 0,
            packets: PacketCounters::default(),
        }
    }

    /// Select what happens to the backlogs at the start of every slot.
    ///
    /// Defaults to [`DrainPolicy::Retain`].
    pub fn set_drain_policy(&mut self, policy: DrainPolicy) {
        self.drain_policy = policy;
    }

    pub fn drain_policy(&self) -> DrainPolicy {
        self.drain_policy
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn accountant(&self) -> &Accountant {
        &self.accountant
    }

    /// The slot the next call to [`step`](Simulation::step) will process.
    pub fn current_slot(&self) -> &TimeSlot {
        self.cursor.current(&self.schedule)
    }

    /// Label of the last processed slot, `None` before the first step.
    pub fn last_slot(&self) -> Option<&str> {
        self.last_slot.as_deref()
    }

    /// Process one time slot and return its label.
    ///
    /// 1. every link load goes back to zero;
    /// 2. the backlogs are handled according to the [`DrainPolicy`];
    /// 3. every node of the slot originates its packets, each one to a
    ///    destination picked uniformly among the other nodes;
    /// 4. each packet is routed and handed to the [`Accountant`]. Packets
    ///    with no route to their destination are dropped;
    /// 5. the schedule moves on to the next slot.
    pub fn step(&mut self) -> String {
        let slot = self.cursor.current(&self.schedule);
        let label = slot.label().to_owned();

        self.accountant.reset_loads();

        let drained = self.accountant.drain(self.drain_policy);
        self.packets.retried += drained.retried;
        self.packets.delivered += drained.delivered;

        let router = Router::new(&self.topology);
        let candidates = self.topology.len() as u64;
        let mut slot_packets = PacketCounters::default();

        for (origin, rate) in slot.rates() {
            for _ in 0..rate {
                let Some(destination) = pick_destination(&mut self.rng, origin, candidates) else {
                    break;
                };
                slot_packets.generated += 1;

                match router.route(origin, destination) {
                    Ok(path) => match self.accountant.transmit(&path) {
                        Transmission::Delivered => slot_packets.delivered += 1,
                        Transmission::Queued { .. } => slot_packets.queued += 1,
                        Transmission::Dropped { .. } => slot_packets.dropped += 1,
                    },
                    Err(RouteError::NoPath { .. }) => {
                        trace!(%origin, %destination, "unreachable destination, packet dropped");
                        slot_packets.dropped += 1;
                    }
                    Err(error) => {
                        warn!(%error, "packet dropped");
                        slot_packets.dropped += 1;
                    }
                }
            }
        }

        self.packets.generated += slot_packets.generated;
        self.packets.delivered += slot_packets.delivered;
        self.packets.queued += slot_packets.queued;
        self.packets.dropped += slot_packets.dropped;

        debug!(
            slot = %label,
            generated = slot_packets.generated,
            delivered = slot_packets.delivered,
            queued = slot_packets.queued,
            dropped = slot_packets.dropped,
            retried = drained.retried,
            backlog = self.accountant.queued(),
            "slot processed"
        );

        self.cursor.advance();
        self.steps += 1;
        self.last_slot = Some(label.clone());

        label
    }

    /// Load of every link during the last processed slot.
    pub fn link_loads(&self) -> BTreeMap<LinkId, u64> {
        self.accountant.link_loads()
    }

    /// Number of undelivered packets waiting at every node.
    pub fn queue_lengths(&self) -> BTreeMap<NodeId, usize> {
        self.accountant.queue_lengths()
    }

    /// Packet counters accumulated since the simulation started.
    pub fn packets(&self) -> PacketCounters {
        self.packets
    }

    /// Returns a point-in-time snapshot of the simulation state.
    pub fn stats(&self) -> SimStats {
        let name = |id: NodeId| self.topology.name(id).unwrap_or_default().to_owned();

        let queues = self.accountant.queue_lengths();
        let nodes = self
            .topology
            .nodes()
            .map(|node| NodeStats {
                id: node.id(),
                name: node.name().to_owned(),
                queue_length: queues.get(&node.id()).copied().unwrap_or_default(),
            })
            .collect();

        let links = self
            .topology
            .links()
            .map(|link| {
                let (a, b) = link.nodes();
                LinkStats {
                    id: link.id(),
                    names: (name(a), name(b)),
                    capacity: link.capacity(),
                    load: self
                        .accountant
                        .link_load(link.id())
                        .map(|load| load.used())
                        .unwrap_or_default(),
                }
            })
            .collect();

        SimStats {
            slot: self.last_slot.clone(),
            steps: self.steps,
            nodes,
            links,
            packets: self.packets,
        }
    }
}

/// Pick a node uniformly among the `candidates` nodes of the topology,
/// `origin` excluded.
///
/// Returns `None` when there is no other node to pick.
fn pick_destination<R: Rng>(rng: &mut R, origin: NodeId, candidates: u64) -> Option<NodeId> {
    let others = candidates.checked_sub(1).filter(|others| *others > 0)?;
    let pick = uniform(rng, others);
    let pick = if pick >= origin.into_u64() {
        pick + 1
    } else {
        pick
    };
    Some(NodeId::new(pick))
}

/// Uniform sample in `0..bound`, `bound` must not be zero.
///
/// Samples falling in the last, incomplete, bucket of the `u64` range are
/// rejected so every value is equally likely.
fn uniform<R: Rng>(rng: &mut R, bound: u64) -> u64 {
    let limit = u64::MAX - u64::MAX % bound;
    loop {
        let sample = rng.next_u64();
        if sample < limit {
            return sample % bound;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(text: &str) -> Scenario {
        text.parse().unwrap()
    }

    const FIVE_NODES: &str = "
        node A B C D E
        link A B 100
        link A C 80
        link B D 70
        link C D 90
        link C E 100
        link D E 60
    ";

    const PEAK: &str = "
        slot peak A=200 B=150 C=180 D=120 E=250
        slot calm A=5
    ";

    fn demo() -> Simulation {
        Simulation::from_scenario(Scenario::demo())
    }

    /// slot label, link loads and queue lengths after a step
    type Snapshot = (String, BTreeMap<LinkId, u64>, BTreeMap<NodeId, usize>);

    fn snapshots<R: Rng>(simulation: &mut Simulation<R>, steps: usize) -> Vec<Snapshot> {
        (0..steps)
            .map(|_| {
                let label = simulation.step();
                (label, simulation.link_loads(), simulation.queue_lengths())
            })
            .collect()
    }

    #[test]
    fn step_returns_slot_labels_and_cycles() {
        let mut simulation = demo();
        let labels: Vec<_> = (0..5).map(|_| simulation.step()).collect();
        assert_eq!(labels, ["08:00", "08:15", "08:30", "08:45", "08:00"]);
    }

    #[test]
    fn cursor_back_to_first_slot_after_a_cycle() {
        let mut simulation = demo();
        let first = simulation.current_slot().label().to_owned();
        for _ in 0..simulation.schedule().len() {
            simulation.step();
        }
        assert_eq!(simulation.current_slot().label(), first);
        assert_eq!(simulation.last_slot(), Some("08:45"));
    }

    #[test]
    fn loads_never_exceed_capacity() {
        let mut simulation = Simulation::from_scenario(scenario(&format!("{FIVE_NODES}{PEAK}")));
        for _ in 0..12 {
            simulation.step();
            for (id, load) in simulation.link_loads() {
                let capacity = simulation.topology().link(id).unwrap().capacity();
                assert!(load <= capacity, "{id}: {load} > {capacity}");
            }
        }
    }

    #[test]
    fn loads_reset_every_step() {
        let scenario = scenario(&format!("{FIVE_NODES}\nslot busy A=300 E=300\nslot quiet"));
        let mut simulation = Simulation::from_scenario(scenario);

        simulation.step();
        assert!(simulation.link_loads().values().any(|load| *load > 0));

        // nothing is generated during the quiet slot
        simulation.step();
        assert!(simulation.link_loads().values().all(|load| *load == 0));
    }

    #[test]
    fn queues_never_shrink() {
        let mut simulation = Simulation::from_scenario(scenario(&format!("{FIVE_NODES}{PEAK}")));
        let mut previous = simulation.queue_lengths();
        for _ in 0..12 {
            simulation.step();
            let current = simulation.queue_lengths();
            for (node, length) in &current {
                assert!(*length >= previous[node]);
            }
            previous = current;
        }
        assert!(previous.values().sum::<usize>() > 0);
    }

    #[test]
    fn same_seed_same_run() {
        let mut first = demo();
        let mut second = demo();
        first.set_seed(42);
        second.set_seed(42);

        assert_eq!(snapshots(&mut first, 8), snapshots(&mut second, 8));
        assert_eq!(first.packets(), second.packets());
    }

    #[test]
    fn different_seeds_differ() {
        let mut first = demo();
        let mut second = demo();
        first.set_seed(1);
        second.set_seed(2);

        assert_ne!(snapshots(&mut first, 4), snapshots(&mut second, 4));
    }

    #[test]
    fn single_packet_a_to_e() {
        // A–E is the only destination from A crossing both A–C and C–E
        let text = format!("{FIVE_NODES}\nslot 08:00 A=1");
        let mut found = false;
        for seed in 0..100 {
            let (topology, schedule) = scenario(&text).into_parts();
            let rng = ChaChaRng::seed_from_u64(seed);
            let mut simulation = Simulation::with_rng(topology, schedule, rng).unwrap();

            assert_eq!(simulation.step(), "08:00");
            assert!(simulation.queue_lengths().values().all(|q| *q == 0));

            let topology = simulation.topology();
            let id = |name: &str| topology.node_id(name).unwrap();
            let loads = simulation.link_loads();
            if loads[&LinkId::new((id("A"), id("C")))] == 1
                && loads[&LinkId::new((id("C"), id("E")))] == 1
            {
                assert_eq!(loads.values().sum::<u64>(), 2);
                assert_eq!(
                    simulation.packets(),
                    PacketCounters {
                        generated: 1,
                        delivered: 1,
                        ..PacketCounters::default()
                    }
                );
                found = true;
                break;
            }
        }
        assert!(found, "no seed sent the packet from A to E");
    }

    #[test]
    fn one_more_than_capacity_queues_one() {
        let scenario = scenario(
            "
            node A B
            link A B 5
            slot 08:00 A=6
            ",
        );
        let mut simulation = Simulation::from_scenario(scenario);
        simulation.step();

        let a = simulation.topology().node_id("A").unwrap();
        let b = simulation.topology().node_id("B").unwrap();
        assert_eq!(simulation.link_loads()[&LinkId::new((a, b))], 5);
        assert_eq!(simulation.queue_lengths()[&a], 1);
        assert_eq!(simulation.queue_lengths()[&b], 0);
    }

    #[test]
    fn unreachable_destinations_are_dropped() {
        let scenario = scenario(
            "
            node A B C
            link A B 10
            slot 08:00 A=50
            ",
        );
        let mut simulation = Simulation::from_scenario(scenario);
        simulation.step();

        let packets = simulation.packets();
        assert_eq!(packets.generated, 50);
        assert!(packets.dropped > 0);
        assert_eq!(
            packets.delivered + packets.queued + packets.dropped,
            packets.generated
        );
        // dropped packets leave no trace in the books
        let a = simulation.topology().node_id("A").unwrap();
        let b = simulation.topology().node_id("B").unwrap();
        let loads = simulation.link_loads();
        let ab = loads[&LinkId::new((a, b))];
        assert_eq!(ab + simulation.queue_lengths()[&a] as u64, 50 - packets.dropped);
    }

    #[test]
    fn lone_node_generates_nothing() {
        let scenario = scenario("node A\nslot 08:00 A=10");
        let mut simulation = Simulation::from_scenario(scenario);

        assert_eq!(simulation.step(), "08:00");
        assert_eq!(simulation.packets(), PacketCounters::default());
    }

    #[test]
    fn destinations_never_the_origin() {
        let mut rng = ChaChaRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let picked = pick_destination(&mut rng, NodeId::new(2), 5).unwrap();
            assert_ne!(picked, NodeId::new(2));
            assert!(picked.into_u64() < 5);
        }
        assert_eq!(pick_destination(&mut rng, NodeId::ZERO, 1), None);
        assert_eq!(pick_destination(&mut rng, NodeId::ZERO, 0), None);
    }

    #[test]
    fn destinations_cover_every_other_node() {
        let mut rng = ChaChaRng::seed_from_u64(7);
        let mut seen = [0u32; 5];
        for _ in 0..5_000 {
            let picked = pick_destination(&mut rng, NodeId::ZERO, 5).unwrap();
            seen[picked.index()] += 1;
        }
        assert_eq!(seen[0], 0);
        for count in &seen[1..] {
            // 1_250 expected for each
            assert!((1_000..1_500).contains(count), "{seen:?}");
        }
    }

    #[test]
    fn retry_policy_drains_backlogs() {
        let scenario = scenario(
            "
            node A B
            link A B 5
            slot busy A=8
            slot quiet
            ",
        );
        let mut simulation = Simulation::from_scenario(scenario);
        simulation.set_drain_policy(DrainPolicy::Retry);
        let a = simulation.topology().node_id("A").unwrap();

        simulation.step();
        assert_eq!(simulation.queue_lengths()[&a], 3);

        simulation.step();
        assert_eq!(simulation.queue_lengths()[&a], 0);
        assert_eq!(simulation.link_loads().values().sum::<u64>(), 3);
        assert_eq!(simulation.packets().retried, 3);
        assert_eq!(simulation.packets().delivered, 8);
    }

    #[test]
    fn schedule_of_another_topology_is_rejected() {
        let pair = Topology::builder()
            .node("A")
            .node("B")
            .link("A", "B", 1)
            .build()
            .unwrap();
        let text = format!("{FIVE_NODES}\nslot 08:00 E=1");
        let (_, schedule) = scenario(&text).into_parts();

        assert_eq!(
            Simulation::new(pair, schedule).err(),
            Some(ScheduleError::ForeignNode {
                slot: "08:00".to_owned(),
                node: NodeId::new(4)
            })
        );
    }

    #[test]
    fn stats_snapshot() {
        let mut simulation = demo();
        let before = simulation.stats();
        assert_eq!(before.slot, None);
        assert_eq!(before.steps, 0);
        assert_eq!(before.nodes.len(), 5);
        assert_eq!(before.links.len(), 6);

        simulation.step();
        let stats = simulation.stats();
        assert_eq!(stats.slot.as_deref(), Some("08:00"));
        assert_eq!(stats.steps, 1);
        assert_eq!(stats.queued(), simulation.accountant().queued());
        for link in &stats.links {
            assert_eq!(link.load, simulation.link_loads()[&link.id]);
        }
        assert_eq!(stats.packets.generated, 200);
    }
}
