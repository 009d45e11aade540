use eframe::egui::{self, Sense, Ui};
use egui_plot::{MarkerShape, Plot, PlotBounds, PlotPoints, Points};

use crate::chart::{hit_test, tooltip_text};
use crate::color;
use crate::scale::wheel_zoom_factor;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Emissions scatter plot (central panel)
// ---------------------------------------------------------------------------

/// Render the scatter plot and apply wheel / drag / double-click zoom.
pub fn emissions_plot(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.is_loading() {
                ui.heading("Loading data…");
            } else {
                ui.heading("Open a file to view emissions  (File → Open…)");
            }
        });
        return;
    };

    let points: Vec<(usize, [f64; 2])> = state
        .visible_indices
        .iter()
        .filter_map(|&i| Some((i, dataset.get(i)?.point()?)))
        .collect();
    let (min, max) = state.chart.visible_bounds();
    let radius = state.marker_radius;
    let color = state.point_color;
    let hovered_point = state
        .hovered
        .and_then(|i| points.iter().find(|(idx, _)| *idx == i))
        .map(|&(_, p)| p);

    // Zoom is driven by `ChartView`; the plot's own navigation stays off.
    let plot = Plot::new("emissions_plot")
        .x_axis_label("Year")
        .y_axis_label("Greenhouse Gas Emissions")
        .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
        .show_x(false)
        .show_y(false)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(min, max));

            let series: Vec<[f64; 2]> = points.iter().map(|&(_, p)| p).collect();
            plot_ui.points(
                Points::new(PlotPoints::from(series))
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(radius)
                    .color(color),
            );

            if let Some(p) = hovered_point {
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![p]))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(radius + 1.5)
                        .color(color::highlight(color)),
                );
            }
        });

    let frame = *plot.transform.frame();
    state
        .chart
        .set_size(frame.width() as f64, frame.height() as f64);

    let response = ui.interact(frame, ui.id().with("emissions_zoom"), Sense::click_and_drag());
    let to_local = |pos: egui::Pos2| -> [f64; 2] {
        let v = pos - frame.min;
        [v.x as f64, v.y as f64]
    };

    if let Some(pos) = response.hover_pos() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            state.zoom_at(wheel_zoom_factor(scroll as f64), to_local(pos));
        }
    }
    if response.dragged() {
        let d = response.drag_delta();
        state.pan_by(d.x as f64, d.y as f64);
    }
    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let factor = if ui.input(|i| i.modifiers.shift) { 0.5 } else { 2.0 };
            state.zoom_at(factor, to_local(pos));
        }
    }

    // Hover uses the transform as it stands after this frame's input.
    let hovered = response.hover_pos().and_then(|pos| {
        let chart = &state.chart;
        hit_test(
            points.iter().map(|&(i, p)| (i, chart.point_px(p))),
            to_local(pos),
            radius as f64,
        )
    });
    if hovered != state.hovered {
        state.hovered = hovered;
        ui.ctx().request_repaint();
    }

    if let Some(obs) = hovered.and_then(|i| state.dataset.as_ref()?.get(i)) {
        let text = tooltip_text(obs);
        response.on_hover_ui_at_pointer(|ui: &mut Ui| {
            ui.label(text);
        });
    }
}
