use crate::{
    defaults::DEMO_SCENARIO,
    schedule::{Schedule, ScheduleError},
    topology::{Topology, TopologyError},
};
use logos::{Lexer, Logos};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing a [`Scenario`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    /// The text does not follow the scenario format.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    /// The declared topology is invalid.
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// The declared schedule is invalid.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// The static inputs of a simulation: a [`Topology`] and the [`Schedule`]
/// of the traffic generated over it.
///
/// # Format
///
/// A scenario is written one statement per line. Everything following a
/// `#` is a comment.
///
/// | Statement | Meaning |
/// |-----------|---------|
/// | `node A B C` | declare one or more nodes |
/// | `link A B 100` | link `A` and `B` with a capacity of 100 packets per slot |
/// | `slot 08:00 A=50 B=30` | a time slot and the packets each node originates |
///
/// Slots are cycled through in declaration order. Slot labels are a word,
/// a time (`08:00`), a number or a `"quoted label"`. `node` and `link`
/// statements may appear anywhere in the text.
///
/// # Example
///
/// ```
/// use trafficsim_core::Scenario;
///
/// let scenario: Scenario = "
///     node A B
///     link A B 10   # a narrow link
///     slot 08:00 A=5 B=5
///     slot 08:15 A=20
/// "
/// .parse()
/// .unwrap();
///
/// assert_eq!(scenario.topology().len(), 2);
/// assert_eq!(scenario.schedule().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Scenario {
    topology: Topology,
    schedule: Schedule,
}

impl Scenario {
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Split the scenario into its topology and the schedule built against it.
    pub fn into_parts(self) -> (Topology, Schedule) {
        (self.topology, self.schedule)
    }

    /// The five node network A to E with its four morning slots.
    ///
    /// See [`DEMO_SCENARIO`].
    pub fn demo() -> Self {
        // the embedded text is covered by the tests of this module
        match DEMO_SCENARIO.parse() {
            Ok(scenario) => scenario,
            Err(error) => unreachable!("invalid demo scenario: {error}"),
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
enum Token {
    #[token("node")]
    Node,
    #[token("link")]
    Link,
    #[token("slot")]
    Slot,
    #[token("=")]
    Equals,

    #[regex("-?[0-9]+")]
    Integer,
    #[regex("[0-9]+:[0-9]+")]
    Time,
    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Name,
    #[regex(r#""[^"]*""#)]
    Quoted,
}

/// The tokens of one line of a scenario.
struct Statement<'a> {
    lex: Lexer<'a, Token>,
    line: usize,
}

impl<'a> Statement<'a> {
    fn new(text: &'a str, line: usize) -> Self {
        Self {
            lex: Token::lexer(text),
            line,
        }
    }

    fn error(&self, message: impl Into<String>) -> ScenarioError {
        ScenarioError::Syntax {
            line: self.line,
            message: message.into(),
        }
    }

    fn next(&mut self) -> Result<Option<(Token, &'a str)>, ScenarioError> {
        match self.lex.next() {
            None => Ok(None),
            Some(Ok(token)) => Ok(Some((token, self.lex.slice()))),
            Some(Err(())) => Err(self.error(format!("unexpected `{}`", self.lex.slice()))),
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<&'a str, ScenarioError> {
        match self.next()? {
            Some((token, slice)) if token == expected => Ok(slice),
            Some((_, slice)) => Err(self.error(format!("expecting {what}, found `{slice}`"))),
            None => Err(self.error(format!("expecting {what}"))),
        }
    }

    fn integer(&self, slice: &str) -> Result<i128, ScenarioError> {
        slice
            .parse()
            .map_err(|error| self.error(format!("invalid number `{slice}`: {error}")))
    }

    fn end(&mut self) -> Result<(), ScenarioError> {
        match self.next()? {
            None => Ok(()),
            Some((_, slice)) => Err(self.error(format!("unexpected `{slice}`"))),
        }
    }
}

type DeclaredSlot = (String, Vec<(String, u64)>);

impl FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut topology = Topology::builder();
        let mut slots: Vec<DeclaredSlot> = Vec::new();

        for (index, text) in s.lines().enumerate() {
            let text = text.split('#').next().unwrap_or_default();
            let mut statement = Statement::new(text, index + 1);

            let Some((keyword, slice)) = statement.next()? else {
                continue;
            };
            match keyword {
                Token::Node => {
                    let mut declared = 0;
                    while let Some((token, name)) = statement.next()? {
                        if token != Token::Name {
                            return Err(statement.error(format!("invalid node name `{name}`")));
                        }
                        topology = topology.node(name);
                        declared += 1;
                    }
                    if declared == 0 {
                        return Err(statement.error("expecting at least one node name"));
                    }
                }
                Token::Link => {
                    let a = statement.expect(Token::Name, "a node name")?;
                    let b = statement.expect(Token::Name, "a node name")?;
                    let capacity = statement.expect(Token::Integer, "a capacity")?;
                    let capacity = statement.integer(capacity)?;
                    statement.end()?;

                    if capacity <= 0 {
                        return Err(TopologyError::NonPositiveCapacity {
                            a: a.to_owned(),
                            b: b.to_owned(),
                        }
                        .into());
                    }
                    let capacity = u64::try_from(capacity)
                        .map_err(|_| statement.error(format!("capacity {capacity} too large")))?;
                    topology = topology.link(a, b, capacity);
                }
                Token::Slot => {
                    let label = match statement.next()? {
                        Some((Token::Name | Token::Time | Token::Integer, label)) => label,
                        Some((Token::Quoted, label)) => label.trim_matches('"'),
                        Some((_, slice)) => {
                            return Err(statement.error(format!("invalid slot label `{slice}`")));
                        }
                        None => return Err(statement.error("expecting a slot label")),
                    };
                    let mut rates = Vec::new();
                    while let Some((token, node)) = statement.next()? {
                        if token != Token::Name {
                            return Err(statement.error(format!(
                                "expecting a node name, found `{node}`"
                            )));
                        }
                        statement.expect(Token::Equals, "`=`")?;
                        let rate = statement.expect(Token::Integer, "a generation rate")?;
                        let rate = statement.integer(rate)?;
                        if rate < 0 {
                            return Err(ScheduleError::NegativeRate {
                                slot: label.to_owned(),
                                node: node.to_owned(),
                            }
                            .into());
                        }
                        let rate = u64::try_from(rate)
                            .map_err(|_| statement.error(format!("rate {rate} too large")))?;
                        rates.push((node.to_owned(), rate));
                    }
                    slots.push((label.to_owned(), rates));
                }
                _ => {
                    return Err(statement.error(format!(
                        "expecting `node`, `link` or `slot`, found `{slice}`"
                    )));
                }
            }
        }

        let topology = topology.build()?;
        let mut schedule = Schedule::builder(&topology);
        for (label, rates) in slots {
            schedule = schedule.slot(label);
            for (node, rate) in rates {
                schedule = schedule.rate(node, rate);
            }
        }
        let schedule = schedule.build()?;

        Ok(Self { topology, schedule })
    }
}
