#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Program controller that drives the agent with a small Karel language.
//!
//! Programs consist of the primitive commands (`step`, `turn_left`,
//! `turn_right`, `put_marker`, `pick_marker`, `power_off`) combined with
//! `repeat N { ... }`, `while <sensor> { ... }` and
//! `if <sensor> { ... } else { ... }`. A `#` starts a comment that runs to
//! the end of the line.

mod parser;

pub use self::parser::{ParseError, MAX_NESTING};

use std::ops::ControlFlow;

use karel_agent::{Agent, Renderer};
use karel_core::{Sensor, Status};
use thiserror::Error;
use tracing::debug;

/// Statement budget applied when callers do not configure one.
pub const DEFAULT_FUEL: u64 = 100_000;

/// Primitive command issued to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Move one corner forward.
    Step,
    /// Quarter turn counterclockwise.
    TurnLeft,
    /// Quarter turn clockwise, issued as three left turns.
    TurnRight,
    /// Drop a marker on the current corner.
    PutMarker,
    /// Pick a marker from the current corner.
    PickMarker,
    /// Shut the agent down.
    PowerOff,
}

impl Instruction {
    /// Name used in program text.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::TurnLeft => "turn_left",
            Self::TurnRight => "turn_right",
            Self::PutMarker => "put_marker",
            Self::PickMarker => "pick_marker",
            Self::PowerOff => "power_off",
        }
    }

    /// Looks an instruction up by its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Step,
            Self::TurnLeft,
            Self::TurnRight,
            Self::PutMarker,
            Self::PickMarker,
            Self::PowerOff,
        ]
        .into_iter()
        .find(|instruction| instruction.name() == name)
    }

    /// Issues the instruction to the agent.
    pub fn apply<R: Renderer>(self, agent: &mut Agent<R>) -> Status {
        match self {
            Self::Step => agent.step(),
            Self::TurnLeft => agent.turn_left(),
            Self::TurnRight => agent.turn_right(),
            Self::PutMarker => agent.put_marker(),
            Self::PickMarker => agent.pick_marker(),
            Self::PowerOff => agent.power_off(),
        }
    }
}

/// Node of a parsed program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    /// Primitive command.
    Command(Instruction),
    /// Runs the body a fixed number of times.
    Repeat {
        /// Number of iterations.
        times: u32,
        /// Statements executed on every iteration.
        body: Vec<Statement>,
    },
    /// Runs the body while the sensor reads true.
    While {
        /// Sensor checked before every iteration.
        condition: Sensor,
        /// Statements executed on every iteration.
        body: Vec<Statement>,
    },
    /// Runs one of two branches depending on a sensor.
    If {
        /// Sensor selecting the branch.
        condition: Sensor,
        /// Statements executed when the sensor reads true.
        then_branch: Vec<Statement>,
        /// Statements executed otherwise.
        else_branch: Vec<Statement>,
    },
}

/// Parsed Karel program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    /// Parses program text.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Ok(Self {
            statements: parser::parse(source)?,
        })
    }

    /// Top-level statements in source order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Executes the program until it ends, the agent halts, or `fuel`
    /// statements have been executed.
    pub fn run<R: Renderer>(&self, agent: &mut Agent<R>, fuel: u64) -> Result<RunSummary, RunError> {
        let mut execution = Execution {
            agent,
            fuel,
            executed: 0,
            last_status: None,
        };
        let _ = execution.block(&self.statements)?;
        debug!(executed = execution.executed, "program_finished");
        Ok(RunSummary {
            executed: execution.executed,
            last_status: execution.last_status,
        })
    }
}

/// Outcome of a program run that stayed within its budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of statements and loop iterations executed.
    pub executed: u64,
    /// Status of the last command issued, if any.
    pub last_status: Option<Status>,
}

/// Errors raised while running a program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RunError {
    /// The statement budget ran out before the program finished.
    #[error("program exhausted its budget after {executed} statements")]
    OutOfFuel {
        /// Number of statements executed before stopping.
        executed: u64,
    },
}

struct Execution<'a, R> {
    agent: &'a mut Agent<R>,
    fuel: u64,
    executed: u64,
    last_status: Option<Status>,
}

impl<R: Renderer> Execution<'_, R> {
    fn block(&mut self, statements: &[Statement]) -> Result<ControlFlow<()>, RunError> {
        for statement in statements {
            if self.statement(statement)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn statement(&mut self, statement: &Statement) -> Result<ControlFlow<()>, RunError> {
        self.burn()?;
        match statement {
            Statement::Command(instruction) => {
                let status = instruction.apply(self.agent);
                self.last_status = Some(status);
                if self.agent.is_running() {
                    Ok(ControlFlow::Continue(()))
                } else {
                    Ok(ControlFlow::Break(()))
                }
            }
            Statement::Repeat { times, body } => {
                for _ in 0..*times {
                    self.burn()?;
                    if self.block(body)?.is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
                Ok(ControlFlow::Continue(()))
            }
            Statement::While { condition, body } => {
                while self.agent.sense(*condition) {
                    self.burn()?;
                    if self.block(body)?.is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
                Ok(ControlFlow::Continue(()))
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if self.agent.sense(*condition) {
                    then_branch
                } else {
                    else_branch
                };
                self.block(branch)
            }
        }
    }

    fn burn(&mut self) -> Result<(), RunError> {
        if self.executed >= self.fuel {
            return Err(RunError::OutOfFuel {
                executed: self.executed,
            });
        }
        self.executed += 1;
        Ok(())
    }
}
