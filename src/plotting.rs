use textplots::{Chart, Plot, Shape};

use crate::error::ScpiError;
use crate::waveform::WaveformDataPoint;

/// Determine the best scale and unit prefix for a given maximum magnitude
fn determine_scale(max_value: f64) -> (f64, &'static str) {
    if max_value == 0.0 || max_value >= 1.0 {
        (1.0, "")
    } else if max_value >= 1e-3 {
        (1e3, "m")
    } else if max_value >= 1e-6 {
        (1e6, "μ")
    } else if max_value >= 1e-9 {
        (1e9, "n")
    } else {
        (1e12, "p")
    }
}

fn max_abs(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

/// Plot a captured waveform in the terminal.
///
/// Time and voltage axes are scaled to engineering units independently.
///
/// # Arguments
/// * `points` - Samples as returned by `read_waveform`
/// * `title` - Optional title for the plot
/// * `width` - Optional plot width (default: 140)
/// * `height` - Optional plot height (default: 60)
///
/// # Examples
/// ```
/// use rusty_scpi::plotting::plot_waveform;
/// use rusty_scpi::WaveformDataPoint;
///
/// let points: Vec<WaveformDataPoint> = (0..100)
///     .map(|i| WaveformDataPoint {
///         time: i as f64 * 1e-6,
///         voltage: (i as f64 / 10.0).sin(),
///     })
///     .collect();
/// plot_waveform(&points, Some("CH1"), None, None)?;
/// # Ok::<(), rusty_scpi::ScpiError>(())
/// ```
pub fn plot_waveform(
    points: &[WaveformDataPoint],
    title: Option<&str>,
    width: Option<usize>,
    height: Option<usize>,
) -> Result<(), ScpiError> {
    if points.len() < 2 {
        return Err(ScpiError::InvalidParameter(
            "Cannot plot a waveform with fewer than two points".to_string(),
        ));
    }

    let width = width.unwrap_or(140);
    let height = height.unwrap_or(60);

    let (time_scale, time_unit) = determine_scale(max_abs(points.iter().map(|p| p.time)));
    let (volt_scale, volt_unit) = determine_scale(max_abs(points.iter().map(|p| p.voltage)));

    let frame: Vec<(f32, f32)> = points
        .iter()
        .map(|p| ((p.time * time_scale) as f32, (p.voltage * volt_scale) as f32))
        .collect();

    let t_min = frame.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
    let t_max = frame.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
    let v_min = frame.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
    let v_max = frame.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);

    println!("{}", title.unwrap_or("Waveform"));
    println!("X-axis: {time_unit}s | Y-axis: {volt_unit}V");
    println!(
        "{} points | {:.3} to {:.3} {volt_unit}V",
        points.len(),
        v_min,
        v_max
    );
    println!("{}", "─".repeat(width));

    let t_max = if t_max > t_min { t_max } else { t_min + 1.0 };
    Chart::new(width as u32, height as u32, t_min, t_max)
        .lineplot(&Shape::Lines(&frame))
        .nice();

    println!("Time [{time_unit}s] →");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_scale() {
        assert_eq!(determine_scale(5.0), (1.0, ""));
        assert_eq!(determine_scale(0.005), (1e3, "m"));
        assert_eq!(determine_scale(5e-6), (1e6, "μ"));
        assert_eq!(determine_scale(5e-9), (1e9, "n"));
        assert_eq!(determine_scale(5e-12), (1e12, "p"));
        assert_eq!(determine_scale(0.0), (1.0, ""));
    }

    #[test]
    fn test_plot_waveform_basic() {
        let points: Vec<WaveformDataPoint> = [0.0, 1.0, 0.5, -1.0]
            .iter()
            .enumerate()
            .map(|(i, &voltage)| WaveformDataPoint {
                time: i as f64 * 1e-3,
                voltage,
            })
            .collect();
        assert!(plot_waveform(&points, Some("Test"), Some(60), Some(20)).is_ok());
    }

    #[test]
    fn test_plot_needs_two_points() {
        let single = [WaveformDataPoint {
            time: 0.0,
            voltage: 1.0,
        }];
        assert!(matches!(
            plot_waveform(&single, None, None, None),
            Err(ScpiError::InvalidParameter(_))
        ));
        assert!(plot_waveform(&[], None, None, None).is_err());
    }
}
