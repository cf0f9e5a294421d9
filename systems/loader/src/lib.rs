#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! World loader that turns textual world files into directive lists.
//!
//! A world file starts with a header line
//! `<avenues> <streets> <avenue> <street> <heading> <bag>` followed by one
//! directive per line: `W <avenue> <street> <side>` places a wall and
//! `B <avenue> <street> <count>` stacks markers. Tokens are case-insensitive
//! and blank lines are ignored.

pub mod templates;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use karel_agent::{Agent, Renderer};
use karel_core::{
    ConstructionError, Corner, Heading, MarkerDirective, Pose, Side, WallDirective,
};
use karel_world::World;
use thiserror::Error;
use tracing::debug;

const HEADER_FIELDS: usize = 6;
const DIRECTIVE_FIELDS: usize = 4;

/// Parsed contents of a world file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldDefinition {
    /// Number of avenues (logical columns).
    pub avenues: u32,
    /// Number of streets (logical rows).
    pub streets: u32,
    /// Corner the agent starts on.
    pub start: Corner,
    /// Heading the agent starts with.
    pub heading: Heading,
    /// Markers the agent carries at power-on.
    pub markers_in_bag: u32,
    /// Wall directives in file order.
    pub walls: Vec<WallDirective>,
    /// Marker directives in file order.
    pub markers: Vec<MarkerDirective>,
}

impl WorldDefinition {
    /// Parses the textual world description.
    pub fn parse(source: &str) -> Result<Self, LoadError> {
        let mut lines = source
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line));
        let (line, header) = lines.next().ok_or(LoadError::MissingHeader)?;
        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() != HEADER_FIELDS {
            return Err(LoadError::MalformedHeader {
                line,
                fields: fields.len(),
            });
        }

        let mut definition = Self {
            avenues: parse_number(line, fields[0])?,
            streets: parse_number(line, fields[1])?,
            start: Corner::new(parse_number(line, fields[2])?, parse_number(line, fields[3])?),
            heading: single_letter(fields[4])
                .and_then(Heading::from_letter)
                .ok_or_else(|| LoadError::UnknownHeading {
                    line,
                    token: fields[4].to_owned(),
                })?,
            markers_in_bag: parse_number(line, fields[5])?,
            walls: Vec::new(),
            markers: Vec::new(),
        };

        for (line, content) in lines {
            definition.parse_directive(line, content)?;
        }

        debug!(
            avenues = definition.avenues,
            streets = definition.streets,
            walls = definition.walls.len(),
            markers = definition.markers.len(),
            "world_definition_parsed"
        );
        Ok(definition)
    }

    fn parse_directive(&mut self, line: usize, content: &str) -> Result<(), LoadError> {
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.is_empty() {
            return Ok(());
        }
        if fields.len() != DIRECTIVE_FIELDS {
            return Err(LoadError::MalformedLine {
                line,
                fields: fields.len(),
            });
        }

        let avenue = parse_number(line, fields[1])?;
        let street = parse_number(line, fields[2])?;
        let corner = Corner::new(avenue, street);
        match fields[0].to_ascii_uppercase().as_str() {
            "W" => {
                let letter = single_letter(fields[3]).ok_or_else(|| LoadError::MalformedLine {
                    line,
                    fields: fields.len(),
                })?;
                let side = Side::from_letter(letter).ok_or(LoadError::InvalidWall {
                    line,
                    source: ConstructionError::InvalidWallPlacement {
                        avenue,
                        street,
                        side: letter,
                    },
                })?;
                self.walls.push(WallDirective { corner, side });
            }
            "B" => {
                let count = parse_number(line, fields[3])?;
                self.markers.push(MarkerDirective { corner, count });
            }
            _ => {
                return Err(LoadError::UnknownBlock {
                    line,
                    token: fields[0].to_owned(),
                })
            }
        }
        Ok(())
    }

    /// Constructs the world described by the definition.
    pub fn build_world(&self) -> Result<World, ConstructionError> {
        World::new(self.avenues, self.streets, &self.walls, &self.markers)
    }

    /// Constructs the world and powers the agent on inside it.
    pub fn power_on<R: Renderer>(&self, renderer: R) -> Result<Agent<R>, ConstructionError> {
        let world = self.build_world()?;
        let pose = Pose::at_corner(self.start, self.heading).ok_or(
            ConstructionError::InvalidAgentPlacement {
                avenue: self.start.avenue(),
                street: self.start.street(),
            },
        )?;
        Agent::power_on(world, pose, self.markers_in_bag, renderer)
    }
}

/// Reads and parses a world file from disk.
pub fn load_path(path: impl AsRef<Path>) -> Result<WorldDefinition, LoadError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    WorldDefinition::parse(&source)
}

/// Errors raised while reading world files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The world file could not be read.
    #[error("failed to read world file {}: {source}", .path.display())]
    Io {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The world file is empty.
    #[error("world file is missing its header line")]
    MissingHeader,
    /// The header does not carry exactly six fields.
    #[error("line {line}: header has {fields} fields, expected 6")]
    MalformedHeader {
        /// 1-based line number.
        line: usize,
        /// Number of fields found.
        fields: usize,
    },
    /// A directive does not carry exactly four fields.
    #[error("line {line}: directive has {fields} fields, expected 4")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// Number of fields found.
        fields: usize,
    },
    /// A numeric field could not be parsed.
    #[error("line {line}: '{token}' is not a non-negative number")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// The header names an unknown heading.
    #[error("line {line}: unknown heading '{token}'")]
    UnknownHeading {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A directive starts with an unknown block kind.
    #[error("line {line}: unknown block kind '{token}'")]
    UnknownBlock {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A wall directive names an unknown side.
    #[error("line {line}: {source}")]
    InvalidWall {
        /// 1-based line number.
        line: usize,
        /// Construction failure describing the wall.
        #[source]
        source: ConstructionError,
    },
}

fn parse_number(line: usize, token: &str) -> Result<u32, LoadError> {
    token.parse().map_err(|_| LoadError::InvalidNumber {
        line,
        token: token.to_owned(),
    })
}

fn single_letter(token: &str) -> Option<char> {
    let mut chars = token.chars();
    let letter = chars.next()?;
    chars.next().is_none().then_some(letter)
}
