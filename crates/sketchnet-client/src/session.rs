//! Editor session: the local mirror plus the gesture tools.

use std::fmt::Write as _;

use sketchnet_core::{
    Mirror, MirrorEvent, ProtocolError, Shape, ShapeId, ToolManager, Vertex, encode_shape,
};

use crate::commands::{Command, CommandRegistry};

/// Result of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Silent,
    Text(String),
    Quit,
}

/// Everything the shell knows about the canvas.
#[derive(Debug, Default)]
pub struct Session {
    mirror: Mirror,
    tools: ToolManager,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    /// Apply a line received from the server.
    pub fn apply_server_line(&mut self, line: &str) -> Result<MirrorEvent, ProtocolError> {
        self.mirror.handle_line(line)
    }

    /// Lines produced by gestures, ready to send.
    pub fn take_outgoing(&mut self) -> Vec<String> {
        self.mirror.take_outgoing()
    }

    pub fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::Mode(mode) => {
                self.tools.set_mode(&mut self.mirror, mode);
                Reply::Text(format!("mode: {mode}"))
            }
            Command::Color(color) => {
                self.tools.set_color(color);
                Reply::Text(format!("color: {color}"))
            }
            Command::Press(at) => self.press(at),
            Command::Drag(to) => {
                if !self.tools.is_active() {
                    return Reply::Text("no gesture in progress".into());
                }
                self.tools.drag(&mut self.mirror, to);
                Reply::Silent
            }
            Command::Release(at) => {
                if !self.tools.is_active() {
                    return Reply::Text("no gesture in progress".into());
                }
                self.tools.release(&mut self.mirror, at);
                Reply::Silent
            }
            Command::Stroke(points) => self.stroke(&points),
            Command::Hit(at) => match self.mirror.hit_test(at.x, at.y) {
                Some(id) => Reply::Text(self.describe(id)),
                None => Reply::Text("nothing there".into()),
            },
            Command::Cancel => {
                self.tools.cancel(&mut self.mirror);
                Reply::Silent
            }
            Command::List => Reply::Text(self.listing()),
            Command::Status => Reply::Text(self.status()),
            Command::Help => Reply::Text(CommandRegistry::help_text()),
            Command::Quit => Reply::Quit,
        }
    }

    fn press(&mut self, at: Vertex) -> Reply {
        if self.tools.press(&mut self.mirror, at) {
            Reply::Silent
        } else {
            Reply::Text("nothing there".into())
        }
    }

    fn stroke(&mut self, points: &[Vertex]) -> Reply {
        let Some((&first, rest)) = points.split_first() else {
            return Reply::Silent;
        };
        if let reply @ Reply::Text(_) = self.press(first) {
            return reply;
        }
        for &point in rest {
            self.tools.drag(&mut self.mirror, point);
        }
        let last = rest.last().copied().unwrap_or(first);
        self.tools.release(&mut self.mirror, last);
        Reply::Silent
    }

    fn describe(&self, id: ShapeId) -> String {
        match self.mirror.sketch().get(id) {
            Some(shape) => format_shape(Some(id), shape),
            None => format!("{id}: gone"),
        }
    }

    /// Shapes in paint order, bottom first. The edit in progress is marked.
    pub fn listing(&self) -> String {
        let order = self.mirror.paint_order();
        if order.is_empty() {
            return "(empty)".into();
        }
        let pending = self.mirror.pending().map(|p| (p.id, &p.shape));
        let mut text = String::new();
        for (id, shape) in order {
            let marker = if pending == Some((id, shape)) { "* " } else { "  " };
            let _ = writeln!(text, "{marker}{}", format_shape(id, shape));
        }
        text.trim_end().to_string()
    }

    pub fn status(&self) -> String {
        format!(
            "mode: {}, color: {}, shapes: {}, gesture: {:?}",
            self.tools.mode(),
            self.tools.color(),
            self.mirror.sketch().len(),
            self.tools.state()
        )
    }
}

fn format_shape(id: Option<ShapeId>, shape: &Shape) -> String {
    let label = id.map_or_else(|| "new".to_string(), |id| id.to_string());
    format!("{label:>4}  {} {}", shape.color(), encode_shape(shape, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchnet_core::{Mode, ShapeKind};

    fn run(session: &mut Session, line: &str) -> Reply {
        let command = Command::parse(line).unwrap().unwrap();
        session.execute(command)
    }

    #[test]
    fn test_stroke_sends_new_shape() {
        let mut session = Session::new();
        run(&mut session, "mode draw rectangle");
        run(&mut session, "stroke 40 40 20 20 10 10");
        assert_eq!(
            session.take_outgoing(),
            vec!["rectangle 10 10 40 40 -16777216 -1".to_string()]
        );
        assert_eq!(session.listing(), "(empty)");
    }

    #[test]
    fn test_echo_shows_in_listing() {
        let mut session = Session::new();
        session
            .apply_server_line("segment 0 0 10 10 -16777216 0")
            .unwrap();
        let listing = session.listing();
        assert!(listing.contains("segment 0 0 10 10 -16777216 0"), "{listing}");
        assert_eq!(
            run(&mut session, "hit 5 5"),
            Reply::Text("   0  #000000 segment 0 0 10 10 -16777216 0".into())
        );
        assert_eq!(
            run(&mut session, "hit 50 5"),
            Reply::Text("nothing there".into())
        );
    }

    #[test]
    fn test_pending_edit_is_marked() {
        let mut session = Session::new();
        run(&mut session, "press 1 1");
        run(&mut session, "drag 2 2");
        assert!(session.listing().starts_with("*  new"));
        run(&mut session, "cancel");
        assert!(session.take_outgoing().is_empty());
    }

    #[test]
    fn test_delete_mode_on_empty_canvas() {
        let mut session = Session::new();
        run(&mut session, "mode delete");
        assert_eq!(
            run(&mut session, "press 3 3"),
            Reply::Text("nothing there".into())
        );
        assert_eq!(
            run(&mut session, "release 3 3"),
            Reply::Text("no gesture in progress".into())
        );
    }

    #[test]
    fn test_mode_color_and_quit() {
        let mut session = Session::new();
        assert_eq!(
            run(&mut session, "mode segment"),
            Reply::Text("mode: draw segment".into())
        );
        assert_eq!(session.tools().mode(), Mode::Draw(ShapeKind::Segment));
        assert_eq!(
            run(&mut session, "color #00ff00"),
            Reply::Text("color: #00ff00".into())
        );
        assert!(session.status().contains("draw segment"));
        assert_eq!(run(&mut session, "quit"), Reply::Quit);
    }
}
