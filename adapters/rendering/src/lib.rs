#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text renderers for the Karel simulator.
//!
//! [`TextRenderer`] redraws the whole world after every agent update and
//! waits for the configured step delay, which is the only place pacing
//! happens. [`SummaryRenderer`] stays silent until the agent shuts off with
//! an error.

use std::{fmt::Write as _, io::Write, thread, time::Duration};

use anyhow::{Context, Result as AnyResult};
use karel_agent::Renderer;
use karel_core::{Cell, CommandKind, Event, GridCoord, Pose};
use karel_world::World;
use tracing::warn;

/// Delay applied after each frame unless configured otherwise.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(1000);

/// Agent state shown alongside the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameView {
    /// Pose of the agent.
    pub pose: Pose,
    /// Markers carried in the bag.
    pub markers_in_bag: u32,
    /// Number of commands attempted.
    pub steps: u64,
    /// Most recent command.
    pub last_command: CommandKind,
}

/// Draws the world and the agent status as text, north up.
///
/// Every doubled-grid cell takes two characters. Corners show the agent
/// glyph, their marker count (`*` above 99) or `.` when empty; walls are
/// drawn with `|`, `--` and `+`.
#[must_use]
pub fn draw_frame(world: &World, view: &FrameView) -> String {
    let (columns, rows) = world.extent();
    let corner = view.pose.corner();
    let markers_here = world.markers_at(view.pose.position);
    let border = format!("   +{}+", "-".repeat(columns as usize * 2 + 1));

    let mut frame = String::new();
    let _ = writeln!(frame, "{} {}", view.steps, view.last_command);
    let _ = writeln!(
        frame,
        "CORNER {corner}  FACING {}  BAG {}  MARKERS {markers_here}",
        view.pose.heading, view.markers_in_bag
    );
    let _ = writeln!(frame, "ST.");
    let _ = writeln!(frame, "{border}");

    for row in (0..rows).rev() {
        if row % 2 == 0 {
            let _ = write!(frame, "{:>2} |", row / 2 + 1);
        } else {
            frame.push_str("   |");
        }
        for column in 0..columns {
            let coord = GridCoord::new(column, row);
            let cell = world.cell_at(coord).unwrap_or(Cell::EMPTY);
            frame.push_str(&cell_text(coord, cell, view.pose));
        }
        frame.push_str(" |\n");
    }

    let _ = writeln!(frame, "{border}");
    frame.push_str("    ");
    for column in 0..columns {
        if column % 2 == 0 {
            let _ = write!(frame, "{:>2}", column / 2 + 1);
        } else {
            frame.push_str("  ");
        }
    }
    frame.push_str("  AVE.\n");
    frame
}

fn cell_text(coord: GridCoord, cell: Cell, pose: Pose) -> String {
    let odd_column = coord.column() % 2 == 1;
    let odd_row = coord.row() % 2 == 1;
    match (odd_column, odd_row, cell) {
        (false, false, _) if coord == pose.position => format!(" {}", pose.heading.glyph()),
        (false, false, Cell::Markers(0)) => " .".to_owned(),
        (false, false, Cell::Markers(count)) if count < 100 => format!("{count:>2}"),
        (false, false, _) => " *".to_owned(),
        (true, false, Cell::Wall) => " |".to_owned(),
        (false, true, Cell::Wall) => "--".to_owned(),
        (true, true, Cell::Wall) => " +".to_owned(),
        _ => "  ".to_owned(),
    }
}

/// Formats the banner shown when the agent halts on an error.
#[must_use]
pub fn shutoff_banner(fault: &dyn std::fmt::Display) -> String {
    format!("Error Shutoff! ({fault})")
}

/// Renderer that prints a full text frame after every agent update.
#[derive(Debug)]
pub struct TextRenderer<W> {
    out: W,
    step_delay: Duration,
}

impl<W: Write> TextRenderer<W> {
    /// Creates a renderer writing to `out` with the default step delay.
    pub fn new(out: W) -> Self {
        Self {
            out,
            step_delay: DEFAULT_STEP_DELAY,
        }
    }

    /// Replaces the delay applied after each frame.
    #[must_use]
    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Delay applied after each frame.
    #[must_use]
    pub const fn step_delay(&self) -> Duration {
        self.step_delay
    }

    /// Adjusts the delay applied after each frame.
    pub fn set_step_delay(&mut self, step_delay: Duration) {
        self.step_delay = step_delay;
    }

    /// Consumes the renderer, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn present(&mut self, world: &World, event: &Event) -> AnyResult<()> {
        match event {
            Event::AgentUpdated {
                pose,
                markers_in_bag,
                steps,
                last_command,
                ..
            } => {
                let view = FrameView {
                    pose: *pose,
                    markers_in_bag: *markers_in_bag,
                    steps: *steps,
                    last_command: *last_command,
                };
                self.out
                    .write_all(draw_frame(world, &view).as_bytes())
                    .context("failed to write frame")?;
                self.out.flush().context("failed to flush frame")?;
                if !self.step_delay.is_zero() {
                    thread::sleep(self.step_delay);
                }
            }
            Event::ErrorShutoff { fault } => {
                writeln!(self.out, "{}", shutoff_banner(fault))
                    .context("failed to write shutoff banner")?;
            }
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, world: &World, event: &Event) {
        if let Err(error) = self.present(world, event) {
            warn!(error = %format!("{error:#}"), "text_render_failed");
        }
    }
}

/// Renderer that only reports error shutoffs.
#[derive(Debug)]
pub struct SummaryRenderer<W> {
    out: W,
}

impl<W: Write> SummaryRenderer<W> {
    /// Creates a renderer writing shutoff banners to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the renderer, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for SummaryRenderer<W> {
    fn render(&mut self, _world: &World, event: &Event) {
        if let Event::ErrorShutoff { fault } = event {
            if let Err(error) = writeln!(self.out, "{}", shutoff_banner(fault)) {
                warn!(%error, "summary_render_failed");
            }
        }
    }
}
