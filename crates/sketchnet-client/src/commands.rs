//! Shell command vocabulary and its help registry.

use sketchnet_core::shapes::ParseColorError;
use sketchnet_core::{Color, Mode, ShapeKind, Vertex};
use thiserror::Error;

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mode(Mode),
    Color(Color),
    Press(Vertex),
    Drag(Vertex),
    Release(Vertex),
    /// A whole gesture: press on the first point, drag through the middle,
    /// release on the last.
    Stroke(Vec<Vertex>),
    Hit(Vertex),
    Cancel,
    List,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("unexpected argument: {0}")]
    Unexpected(String),
    #[error("not a coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("unknown shape type: {0}")]
    UnknownShape(String),
    #[error("unknown mode: {0}")]
    UnknownMode(String),
    #[error("stroke needs at least one x y pair")]
    EmptyStroke,
    #[error(transparent)]
    Color(#[from] ParseColorError),
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        if head.starts_with('#') {
            return Ok(None);
        }
        let args: Vec<&str> = words.collect();

        let command = match head.to_ascii_lowercase().as_str() {
            "mode" | "m" => Command::Mode(parse_mode(&args)?),
            "color" | "c" => {
                let [hex] = exact::<1>(&args, "color")?;
                Command::Color(hex.parse()?)
            }
            "press" | "p" => Command::Press(parse_point(&args)?),
            "drag" | "d" => Command::Drag(parse_point(&args)?),
            "release" | "r" => Command::Release(parse_point(&args)?),
            "stroke" | "s" => Command::Stroke(parse_points(&args)?),
            "hit" => Command::Hit(parse_point(&args)?),
            "cancel" => no_args(&args, Command::Cancel)?,
            "list" | "ls" => no_args(&args, Command::List)?,
            "status" => no_args(&args, Command::Status)?,
            "help" | "?" => no_args(&args, Command::Help)?,
            "quit" | "exit" | "q" => no_args(&args, Command::Quit)?,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn ensure_empty(args: &[&str]) -> Result<(), CommandError> {
    match args.first() {
        Some(extra) => Err(CommandError::Unexpected(extra.to_string())),
        None => Ok(()),
    }
}

fn no_args(args: &[&str], command: Command) -> Result<Command, CommandError> {
    ensure_empty(args).map(|()| command)
}

fn exact<'a, const N: usize>(
    args: &[&'a str],
    what: &'static str,
) -> Result<[&'a str; N], CommandError> {
    if args.len() > N {
        return Err(CommandError::Unexpected(args[N].to_string()));
    }
    args.try_into().map_err(|_| CommandError::Missing(what))
}

fn parse_mode(args: &[&str]) -> Result<Mode, CommandError> {
    let Some((&name, rest)) = args.split_first() else {
        return Err(CommandError::Missing("mode"));
    };
    let name = name.to_ascii_lowercase();
    if name == "draw" {
        let [kind] = exact::<1>(rest, "shape type")?;
        return ShapeKind::from_keyword(&kind.to_ascii_lowercase())
            .map(Mode::Draw)
            .ok_or_else(|| CommandError::UnknownShape(kind.to_string()));
    }

    let mode = match name.as_str() {
        "move" => Mode::Move,
        "recolor" => Mode::Recolor,
        "delete" => Mode::Delete,
        // `mode ellipse` is shorthand for `mode draw ellipse`
        other => ShapeKind::from_keyword(other)
            .map(Mode::Draw)
            .ok_or_else(|| CommandError::UnknownMode(other.to_string()))?,
    };
    ensure_empty(rest)?;
    Ok(mode)
}

fn parse_coord(token: &str) -> Result<i32, CommandError> {
    token
        .parse()
        .map_err(|_| CommandError::InvalidCoordinate(token.to_string()))
}

fn parse_point(args: &[&str]) -> Result<Vertex, CommandError> {
    let [x, y] = exact::<2>(args, "x y")?;
    Ok(Vertex::new(parse_coord(x)?, parse_coord(y)?))
}

fn parse_points(args: &[&str]) -> Result<Vec<Vertex>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::EmptyStroke);
    }
    if args.len() % 2 != 0 {
        return Err(CommandError::Missing("y coordinate"));
    }
    args.chunks(2)
        .map(|pair| Ok(Vertex::new(parse_coord(pair[0])?, parse_coord(pair[1])?)))
        .collect()
}

/// Help entry for one command.
#[derive(Debug, Clone)]
pub struct CommandHelp {
    pub usage: &'static str,
    pub description: &'static str,
}

impl CommandHelp {
    pub const fn new(usage: &'static str, description: &'static str) -> Self {
        Self { usage, description }
    }
}

/// Registry of all shell commands.
pub struct CommandRegistry;

impl CommandRegistry {
    /// Get all registered commands.
    pub fn all() -> Vec<CommandHelp> {
        vec![
            CommandHelp::new(
                "mode draw <ellipse|rectangle|segment|freehand>",
                "Draw new shapes",
            ),
            CommandHelp::new("mode move|recolor|delete", "Pick existing shapes"),
            CommandHelp::new("color #rrggbb", "Set the drawing color"),
            CommandHelp::new("press x y", "Start a gesture"),
            CommandHelp::new("drag x y", "Continue the gesture"),
            CommandHelp::new("release x y", "Finish the gesture and send it"),
            CommandHelp::new("stroke x y [x y ...]", "Press, drag and release in one go"),
            CommandHelp::new("hit x y", "Show the topmost shape at a point"),
            CommandHelp::new("cancel", "Abandon the current gesture"),
            CommandHelp::new("list", "Show shapes in paint order"),
            CommandHelp::new("status", "Show mode, color and connection"),
            CommandHelp::new("quit", "Disconnect and exit"),
        ]
    }

    /// Format the help text.
    pub fn help_text() -> String {
        let mut text = String::from("Commands:\n");
        for entry in Self::all() {
            text.push_str(&format!("  {:48} {}\n", entry.usage, entry.description));
        }
        text
    }
}
