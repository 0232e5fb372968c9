use snafu::Snafu;

const PROMPT: char = '$';

/// A command line together with the lines it printed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandRecord {
    pub command_line: String,
    pub output_lines: Vec<String>,
}

/// Groups transcript lines into [`CommandRecord`]s as they are read.
///
/// A record is yielded once the next command line (or the end of input) is
/// reached. After an error the parser yields nothing more.
pub struct TranscriptParser<I> {
    lines: I,
    line_number: usize,
    pending: Option<CommandRecord>,
    failed: bool,
}

impl<I> TranscriptParser<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    pub fn new(lines: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            lines: lines.into_iter(),
            line_number: 0,
            pending: None,
            failed: false,
        }
    }

    fn next_record(&mut self) -> Result<Option<CommandRecord>, TranscriptError> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line.as_ref();

            match line.chars().next() {
                None => {
                    return Err(TranscriptError::EmptyLine {
                        line_number: self.line_number,
                    });
                }
                Some(PROMPT) => {
                    let started = CommandRecord {
                        command_line: line.to_string(),
                        output_lines: Vec::new(),
                    };
                    if let Some(finished) = self.pending.replace(started) {
                        return Ok(Some(finished));
                    }
                }
                Some(_) => match self.pending.as_mut() {
                    Some(record) => record.output_lines.push(line.to_string()),
                    None => {
                        return Err(TranscriptError::OutputBeforeCommand {
                            line_number: self.line_number,
                            line: line.to_string(),
                        });
                    }
                },
            }
        }

        Ok(self.pending.take())
    }
}

impl<I> Iterator for TranscriptParser<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<CommandRecord, TranscriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_record() {
            Ok(record) => record.map(Ok),
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum TranscriptError {
    #[snafu(display("Line {} is empty, expected a command or its output", line_number))]
    EmptyLine { line_number: usize },
    #[snafu(display(
        "Line {} ('{}') is output, but no command has been issued yet",
        line_number,
        line
    ))]
    OutputBeforeCommand { line_number: usize, line: String },
}
