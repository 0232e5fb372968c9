use derive_more::Display;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::filesystem::{FileSystem, NavigationError, SizeOverflowError};
use crate::transcript::parser::{CommandRecord, TranscriptError, TranscriptParser};

const PROMPT_TOKEN: &str = "$";
const DIR_MARKER: &str = "dir";

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CdTarget {
    #[display("/")]
    Root,
    #[display("..")]
    Parent,
    #[display("{_0}")]
    Child(String),
}

impl From<&str> for CdTarget {
    fn from(arg: &str) -> Self {
        match arg {
            "/" => CdTarget::Root,
            ".." => CdTarget::Parent,
            name => CdTarget::Child(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Command {
    #[display("cd {_0}")]
    Cd(CdTarget),
    #[display("ls")]
    Ls,
}

impl Command {
    pub fn parse(command_line: &str) -> Result<Self, CommandError> {
        let mut tokens = command_line.split_whitespace();

        match tokens.next() {
            Some(PROMPT_TOKEN) => {}
            _ => {
                return Err(CommandError::MissingPrompt {
                    line: command_line.to_string(),
                });
            }
        }

        let name = tokens.next().ok_or_else(|| CommandError::MissingCommand {
            line: command_line.to_string(),
        })?;
        let args = tokens.collect::<Vec<_>>();

        match name {
            "cd" => match args.as_slice() {
                [target] => Ok(Command::Cd(CdTarget::from(*target))),
                _ => Err(CommandError::CdArgumentCount {
                    found: args.len(),
                    line: command_line.to_string(),
                }),
            },
            "ls" if args.is_empty() => Ok(Command::Ls),
            "ls" => Err(CommandError::LsArguments {
                line: command_line.to_string(),
            }),
            other => Err(CommandError::UnknownCommand {
                command: other.to_string(),
            }),
        }
    }

    /// Applies the command to `fs`, `output` being the lines it printed
    pub fn apply<S: AsRef<str>>(
        &self,
        fs: &mut FileSystem,
        output: &[S],
    ) -> Result<(), CommandError> {
        match self {
            Command::Cd(target) => {
                if let Some(line) = output.first() {
                    return Err(CommandError::UnexpectedOutput {
                        command: self.to_string(),
                        line: line.as_ref().to_string(),
                    });
                }
                Self::change_dir(fs, target)
            }
            Command::Ls => {
                for line in output {
                    Self::add_entry(fs, line.as_ref())?;
                }
                Ok(())
            }
        }
    }

    fn change_dir(fs: &mut FileSystem, target: &CdTarget) -> Result<(), CommandError> {
        match target {
            CdTarget::Root => {
                fs.cd_root();
                Ok(())
            }
            CdTarget::Parent => fs.cd_parent().context(NavigationSnafu),
            CdTarget::Child(name) => fs.cd_child(name).context(NavigationSnafu),
        }
    }

    fn add_entry(fs: &mut FileSystem, line: &str) -> Result<(), CommandError> {
        let fields = line.split_whitespace().collect::<Vec<_>>();
        let [kind, name] = fields.as_slice() else {
            return Err(CommandError::FieldCount {
                found: fields.len(),
                line: line.to_string(),
            });
        };

        if *kind == DIR_MARKER {
            fs.add_dir(*name);
        } else {
            let size = kind.parse::<u64>().context(InvalidSizeSnafu {
                line: line.to_string(),
            })?;
            fs.add_file(*name, size).context(SizeOverflowSnafu {
                line: line.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Parses and applies a single record
pub fn apply_record(fs: &mut FileSystem, record: &CommandRecord) -> Result<(), CommandError> {
    let command = Command::parse(&record.command_line)?;
    debug!(
        "Applying '{}' with {} output lines in {}",
        command,
        record.output_lines.len(),
        fs.path_of(fs.current_dir())
    );
    command.apply(fs, record.output_lines.as_slice())
}

/// Replays a whole transcript into a fresh [`FileSystem`]
pub fn build_file_system<L: AsRef<str>>(
    lines: impl IntoIterator<Item = L>,
    disk_capacity: u64,
) -> Result<FileSystem, BuildError> {
    let mut fs = FileSystem::new(disk_capacity);

    for (index, record) in TranscriptParser::new(lines).enumerate() {
        let record = record.context(TranscriptSnafu)?;
        apply_record(&mut fs, &record).context(CommandSnafu {
            record_number: index + 1,
            command_line: record.command_line.clone(),
        })?;
    }

    debug!(
        "Built tree of {} directories, {} bytes used",
        fs.dir_count(),
        fs.used_space()
    );
    Ok(fs)
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum CommandError {
    #[snafu(display("Expected command line to start with '$', found '{}'", line))]
    MissingPrompt { line: String },
    #[snafu(display("Expected a command after '$' in '{}'", line))]
    MissingCommand { line: String },
    #[snafu(display("Unknown command '{}', expected 'cd' or 'ls'", command))]
    UnknownCommand { command: String },
    #[snafu(display("Expected exactly one argument for cd, found {} in '{}'", found, line))]
    CdArgumentCount { found: usize, line: String },
    #[snafu(display("Expected no arguments for ls in '{}'", line))]
    LsArguments { line: String },
    #[snafu(display("Expected no output from '{}', found '{}'", command, line))]
    UnexpectedOutput { command: String, line: String },
    #[snafu(display("Expected two fields in ls output, found {} in '{}'", found, line))]
    FieldCount { found: usize, line: String },
    #[snafu(display("Expected 'dir' or a file size in ls output '{}'", line))]
    InvalidSize {
        line: String,
        source: std::num::ParseIntError,
    },
    #[snafu(display("File size in ls output '{}' does not fit the directory totals", line))]
    SizeOverflow {
        line: String,
        source: SizeOverflowError,
    },
    #[snafu(display("Failed to change directory"))]
    Navigation { source: NavigationError },
}

#[derive(Debug, Snafu)]
pub enum BuildError {
    #[snafu(display("Malformed transcript"))]
    Transcript { source: TranscriptError },
    #[snafu(display("Failed to apply command #{} '{}'", record_number, command_line))]
    Command {
        record_number: usize,
        command_line: String,
        source: CommandError,
    },
}
