/// Default seed of the [`Simulation`]'s random source.
///
/// See [`Simulation::set_seed`] to use another one.
///
/// [`Simulation`]: crate::simulation::Simulation
/// [`Simulation::set_seed`]: crate::simulation::Simulation::set_seed
pub const DEFAULT_SEED: u64 = 0;

/// Default number of slots processed by a run when none is given:
/// one full cycle of the [`DEMO_SCENARIO`].
pub const DEFAULT_STEPS: u64 = 4;

/// A small five node network and a morning of traffic.
///
/// ```text
///       A
///  100 / \ 80
///     B   C
///   70 \ / 90 \ 100
///       D ---- E
///          60
/// ```
///
/// Parse it with [`Scenario::demo`]. The format is described in
/// [`Scenario`].
///
/// ```
/// # use trafficsim_core::defaults::*;
/// assert!(DEMO_SCENARIO.contains("link C E 100"));
/// ```
///
/// [`Scenario`]: crate::scenario::Scenario
/// [`Scenario::demo`]: crate::scenario::Scenario::demo
pub const DEMO_SCENARIO: &str = "\
node A B C D E

link A B 100
link A C 80
link B D 70
link C D 90
link C E 100
link D E 60

slot 08:00 A=50 B=30 C=40 D=20 E=60
slot 08:15 A=55 B=35 C=45 D=25 E=65
slot 08:30 A=60 B=40 C=50 D=30 E=70
slot 08:45 A=55 B=35 C=45 D=25 E=65
";
