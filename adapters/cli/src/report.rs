use std::{io::Write, process::ExitCode};

use anyhow::{Context, Result};
use clap::ValueEnum;
use karel_core::{AgentSnapshot, Status};
use karel_system_program::{RunError, RunSummary};
use serde::Serialize;

/// Output format of the final session report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

/// How a program run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Outcome {
    /// The program finished without a fault.
    Completed,
    /// A command failed and the agent halted.
    ErrorShutoff,
    /// The statement budget ran out.
    OutOfFuel,
}

impl Outcome {
    const fn name(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::ErrorShutoff => "error_shutoff",
            Self::OutOfFuel => "out_of_fuel",
        }
    }

    /// Process exit code reported for the outcome.
    pub(crate) fn exit_code(self) -> ExitCode {
        match self {
            Self::Completed => ExitCode::SUCCESS,
            Self::ErrorShutoff => ExitCode::from(1),
            Self::OutOfFuel => ExitCode::from(2),
        }
    }
}

/// Summary printed once the session ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct SessionReport {
    /// How the run ended.
    pub(crate) outcome: Outcome,
    /// Statements and loop iterations executed.
    pub(crate) executed: u64,
    /// Message of the fault that halted the agent.
    pub(crate) fault: Option<String>,
    /// Final state of the agent.
    pub(crate) agent: AgentSnapshot,
}

impl SessionReport {
    /// Builds the report from the result of a program run.
    pub(crate) fn new(run: &Result<RunSummary, RunError>, agent: AgentSnapshot) -> Self {
        match run {
            Ok(summary) => {
                let fault = match summary.last_status {
                    Some(Status::Shutoff(fault)) => Some(fault.to_string()),
                    _ => None,
                };
                Self {
                    outcome: if fault.is_some() {
                        Outcome::ErrorShutoff
                    } else {
                        Outcome::Completed
                    },
                    executed: summary.executed,
                    fault,
                    agent,
                }
            }
            Err(RunError::OutOfFuel { executed }) => Self {
                outcome: Outcome::OutOfFuel,
                executed: *executed,
                fault: None,
                agent,
            },
        }
    }

    /// Writes the report in the requested format.
    pub(crate) fn write_to(&self, format: ReportFormat, out: &mut impl Write) -> Result<()> {
        match format {
            ReportFormat::Text => out
                .write_all(self.to_text().as_bytes())
                .context("failed to write report")?,
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self).context("failed to encode report")?;
                writeln!(out).context("failed to write report")?;
            }
        }
        out.flush().context("failed to flush report")
    }

    fn to_text(&self) -> String {
        let agent = &self.agent;
        let mut text = format!(
            "outcome: {}\nexecuted: {}\n",
            self.outcome.name(),
            self.executed
        );
        if let Some(fault) = &self.fault {
            text.push_str(&format!("fault: {fault}\n"));
        }
        text.push_str(&format!(
            "corner: {} facing {}\nbag: {}  markers: {}\nsteps: {}  last: {}\n",
            agent.corner,
            agent.heading,
            agent.markers_in_bag,
            agent.markers_on_corner,
            agent.steps,
            agent.last_command
        ));
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use karel_core::{CommandKind, Corner, Fault, Heading, RunState};

    fn snapshot() -> AgentSnapshot {
        AgentSnapshot {
            corner: Corner::new(2, 1),
            heading: Heading::East,
            markers_in_bag: 1,
            markers_on_corner: 0,
            steps: 3,
            last_command: CommandKind::Step,
            state: RunState::Halted,
        }
    }

    #[test]
    fn shutoff_status_maps_to_error_outcome() {
        let run = Ok(RunSummary {
            executed: 3,
            last_status: Some(Status::Shutoff(Fault::IllegalMove)),
        });

        let report = SessionReport::new(&run, snapshot());

        assert_eq!(report.outcome, Outcome::ErrorShutoff);
        assert_eq!(report.fault.as_deref(), Some("Can't move this way"));
        assert_eq!(report.outcome.exit_code(), ExitCode::from(1));
    }

    #[test]
    fn exhausted_budget_maps_to_out_of_fuel() {
        let run = Err(RunError::OutOfFuel { executed: 10 });

        let report = SessionReport::new(&run, snapshot());

        assert_eq!(report.outcome, Outcome::OutOfFuel);
        assert_eq!(report.executed, 10);
        assert_eq!(report.fault, None);
    }

    #[test]
    fn text_report_lists_agent_state() {
        let run = Ok(RunSummary {
            executed: 4,
            last_status: Some(Status::Completed),
        });
        let mut out = Vec::new();

        SessionReport::new(&run, snapshot())
            .write_to(ReportFormat::Text, &mut out)
            .expect("report written");

        let text = String::from_utf8(out).expect("utf-8 report");
        assert_eq!(
            text,
            "outcome: completed\nexecuted: 4\ncorner: (2, 1) facing east\n\
             bag: 1  markers: 0\nsteps: 3  last: step\n"
        );
    }

    #[test]
    fn json_report_serialises_snapshot() {
        let run = Ok(RunSummary {
            executed: 4,
            last_status: None,
        });
        let mut out = Vec::new();

        SessionReport::new(&run, snapshot())
            .write_to(ReportFormat::Json, &mut out)
            .expect("report written");

        let value: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
        assert_eq!(value["outcome"], "completed");
        assert_eq!(value["agent"]["corner"]["avenue"], 2);
        assert_eq!(value["agent"]["state"], "halted");
    }
}
