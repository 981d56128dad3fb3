use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};

use crate::state::AppState;

/// Radius in points of the most populous visible country.
const MAX_RADIUS: f32 = 30.0;
/// Smallest radius, so tiny countries stay clickable.
const MIN_RADIUS: f32 = 2.0;

// ---------------------------------------------------------------------------
// Bubble chart (central panel)
// ---------------------------------------------------------------------------

/// Bubble area is proportional to population, relative to the largest shown.
pub fn bubble_radius(population: f64, max_population: f64) -> f32 {
    if max_population <= 0.0 || population <= 0.0 {
        return MIN_RADIUS;
    }
    (MAX_RADIUS * (population / max_population).sqrt() as f32).max(MIN_RADIUS)
}

/// Short axis label for an income: `850`, `12.5k`, `3.2M`, `1.1B`.
pub fn format_income(value: f64) -> String {
    if value >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.1}k", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}

/// Render income (log x) vs. life expectancy, one bubble per visible country.
pub fn bubble_chart(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(filter)) = (&state.dataset, &state.filter) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data folder to view the chart  (File → Open data folder…)");
        });
        return;
    };

    ui.heading(format!("Bubble Chart for {}", filter.year));

    let max_population = state
        .visible_indices
        .iter()
        .map(|&i| dataset.records[i].population)
        .fold(0.0, f64::max);

    // x range is fixed over all years so bubbles move, not the axis
    let (x_min, x_max) = dataset
        .income_range()
        .map_or((0.0, 1.0), |(lo, hi)| (lo.log10(), (hi * 1.1).log10()));

    Plot::new("bubble_chart")
        .legend(Legend::default())
        .x_axis_label("Gross National Income per Capita (log scale)")
        .y_axis_label("Life Expectancy")
        .x_axis_formatter(|mark, _range| format_income(10f64.powf(mark.value)))
        .label_formatter(|name, value| {
            if name.is_empty() {
                return String::new();
            }
            format!(
                "{name}\nincome: {}\nlife expectancy: {:.1}",
                format_income(10f64.powf(value.x)),
                value.y
            )
        })
        .include_x(x_min)
        .include_x(x_max)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for &idx in &state.visible_indices {
                let record = &dataset.records[idx];
                if record.income <= 0.0 {
                    continue;
                }

                let color = state
                    .color_map
                    .as_ref()
                    .map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(&record.country));

                let points = PlotPoints::from(vec![[record.income.log10(), record.life_expectancy]]);
                let bubble = Points::new(points)
                    .name(&record.country)
                    .color(color.gamma_multiply(0.8))
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(bubble_radius(record.population, max_population));

                plot_ui.points(bubble);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_scales_with_square_root() {
        assert_eq!(bubble_radius(100.0, 100.0), MAX_RADIUS);
        assert_eq!(bubble_radius(25.0, 100.0), MAX_RADIUS / 2.0);
        assert_eq!(bubble_radius(0.0, 100.0), MIN_RADIUS);
        assert_eq!(bubble_radius(1.0, 0.0), MIN_RADIUS);
    }

    #[test]
    fn income_labels() {
        assert_eq!(format_income(850.0), "850");
        assert_eq!(format_income(12_500.0), "12.5k");
        assert_eq!(format_income(3_200_000.0), "3.2M");
        assert_eq!(format_income(1.1e9), "1.1B");
    }
}
