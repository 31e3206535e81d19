//! Records skrifa draw callbacks as glint contours

use glint_core::types::{Contour, GlyphOutline, Point};
use skrifa::outline::OutlinePen;

/// Collects an outline in design units, y up
#[derive(Default)]
pub(crate) struct RecordingPen {
    contours: Vec<Contour>,
    current: Option<Contour>,
}

impl RecordingPen {
    pub(crate) fn finish(mut self) -> GlyphOutline {
        self.flush();
        GlyphOutline {
            contours: self.contours,
        }
    }

    fn flush(&mut self) {
        if let Some(contour) = self.current.take() {
            if contour.commands.len() > 1 {
                self.contours.push(contour);
            }
        }
    }

    fn contour(&mut self) -> &mut Contour {
        // Drawing without a move starts at the origin
        self.current
            .get_or_insert_with(|| Contour::starting_at(Point::default()))
    }
}

impl OutlinePen for RecordingPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        self.current = Some(Contour::starting_at(Point::new(x, y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.contour().line_to(Point::new(x, y));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.contour()
            .quad_to(Point::new(cx0, cy0), Point::new(x, y));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.contour().cubic_to(
            Point::new(cx0, cy0),
            Point::new(cx1, cy1),
            Point::new(x, y),
        );
    }

    fn close(&mut self) {
        self.flush();
    }
}
