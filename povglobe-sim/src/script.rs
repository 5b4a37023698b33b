//! Text command scripts driving the simulator
//!
//! One step per line, `#` starts a comment:
//!
//! ```text
//! position 30
//! reticle 10 10
//! target 0 12 20
//! scanner 10 10
//! render
//! bytes 21 01 05 00 06 00
//! ```

use derive_more::{Display, Error};

/// One parsed script line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Position(i32),
    Reticle { x: i32, y: i32 },
    ClearReticle,
    Target { id: usize, x: i32, y: i32 },
    ClearTarget(usize),
    Abduction { x: i32, y: i32 },
    Scanner { x: i32, y: i32 },
    ClearAnimation,
    /// Advance the animation without rendering
    Advance(u32),
    /// Render (and print) the given number of revolutions
    Render(u32),
    Blank,
    Reset,
    /// Raw wire bytes fed through the command decoder
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Display, Error)]
pub enum ScriptError {
    #[display("line {line}: unknown command '{word}'")]
    UnknownCommand { line: usize, word: String },
    #[display("line {line}: '{command}' expects {expected} argument(s), got {actual}")]
    WrongArgumentCount {
        line: usize,
        command: &'static str,
        expected: usize,
        actual: usize,
    },
    #[display("line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },
    #[display("line {line}: invalid hex: {source}")]
    InvalidHex {
        line: usize,
        source: hex::FromHexError,
    },
}

/// Splits a line into its arguments and checks the count
struct Args<'a> {
    line: usize,
    words: Vec<&'a str>,
}

impl<'a> Args<'a> {
    fn exactly(
        line: usize,
        command: &'static str,
        words: Vec<&'a str>,
        expected: usize,
    ) -> Result<Self, ScriptError> {
        if words.len() != expected {
            return Err(ScriptError::WrongArgumentCount {
                line,
                command,
                expected,
                actual: words.len(),
            });
        }
        Ok(Self { line, words })
    }

    /// Accepts zero or one argument
    fn optional(
        line: usize,
        command: &'static str,
        words: Vec<&'a str>,
    ) -> Result<Self, ScriptError> {
        if words.len() > 1 {
            return Err(ScriptError::WrongArgumentCount {
                line,
                command,
                expected: 1,
                actual: words.len(),
            });
        }
        Ok(Self { line, words })
    }

    fn number<T: std::str::FromStr>(&self, index: usize) -> Result<T, ScriptError> {
        let value = self.words[index];
        value.parse().map_err(|_| ScriptError::InvalidNumber {
            line: self.line,
            value: value.to_string(),
        })
    }

    fn count_or_one(&self) -> Result<u32, ScriptError> {
        if self.words.is_empty() {
            Ok(1)
        } else {
            self.number(0)
        }
    }

    fn point(&self, first: usize) -> Result<(i32, i32), ScriptError> {
        Ok((self.number(first)?, self.number(first + 1)?))
    }
}

fn parse_line(line: usize, text: &str) -> Result<Option<Step>, ScriptError> {
    let text = text.split('#').next().unwrap_or_default().trim();
    let mut words = text.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let step = match word.to_lowercase().as_str() {
        "position" => Step::Position(Args::exactly(line, "position", rest, 1)?.number(0)?),
        "reticle" => {
            let (x, y) = Args::exactly(line, "reticle", rest, 2)?.point(0)?;
            Step::Reticle { x, y }
        }
        "clear-reticle" => {
            Args::exactly(line, "clear-reticle", rest, 0)?;
            Step::ClearReticle
        }
        "target" => {
            let args = Args::exactly(line, "target", rest, 3)?;
            let (x, y) = args.point(1)?;
            Step::Target {
                id: args.number(0)?,
                x,
                y,
            }
        }
        "clear-target" => {
            Step::ClearTarget(Args::exactly(line, "clear-target", rest, 1)?.number(0)?)
        }
        "abduction" => {
            let (x, y) = Args::exactly(line, "abduction", rest, 2)?.point(0)?;
            Step::Abduction { x, y }
        }
        "scanner" => {
            let (x, y) = Args::exactly(line, "scanner", rest, 2)?.point(0)?;
            Step::Scanner { x, y }
        }
        "clear-animation" => {
            Args::exactly(line, "clear-animation", rest, 0)?;
            Step::ClearAnimation
        }
        "advance" => Step::Advance(Args::optional(line, "advance", rest)?.count_or_one()?),
        "render" => Step::Render(Args::optional(line, "render", rest)?.count_or_one()?),
        "blank" => {
            Args::exactly(line, "blank", rest, 0)?;
            Step::Blank
        }
        "reset" => {
            Args::exactly(line, "reset", rest, 0)?;
            Step::Reset
        }
        "bytes" => {
            let digits: String = rest.concat();
            let bytes =
                hex::decode(digits).map_err(|source| ScriptError::InvalidHex { line, source })?;
            Step::Bytes(bytes)
        }
        _ => {
            return Err(ScriptError::UnknownCommand {
                line,
                word: word.to_string(),
            })
        }
    };
    Ok(Some(step))
}

/// Parse a whole script. Line numbers in errors are 1-based.
pub fn parse_script(text: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(step) = parse_line(index + 1, line)? {
            steps.push(step);
        }
    }
    Ok(steps)
}
