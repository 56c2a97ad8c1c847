//! Plotters-powered chart widget for Ratatui.
//!
//! The same drawing routines as the SVG files are rendered into the Ratatui
//! buffer using `plotters-ratatui-backend`.

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::{ChartKind, ChartSet, ChartStyle, draw_chart};

/// Render-only chart: all series are computed up front in `ChartSet`.
pub struct CovidChart<'a> {
    pub set: &'a ChartSet,
    pub kind: ChartKind,
}

impl<'a> Widget for CovidChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let style = ChartStyle::terminal();
        let widget = widget_fn(move |root| {
            draw_chart(&root, self.set, self.kind, &style)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}
