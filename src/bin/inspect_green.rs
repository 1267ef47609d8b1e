use breakline::terrain::{BandPalette, ShapeParams, SlopeBand};
use breakline::{GreenConfig, GreenSession};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut green = GreenSession::new(GreenConfig::default())?;

    // Kick up a ridge through the middle of the green
    let resolution = green.config().control_resolution;
    let centre = (resolution / 2) * resolution + resolution / 2;
    if green.begin_drag(centre) {
        let height = green.markers()[centre].height;
        green.drag_to(height + 0.15);
        green.end_drag();
    }

    let field = green.field();
    let (min, max) = field.height_range();
    let avg = field.heights().iter().sum::<f32>() / field.vertex_count() as f32;

    println!("Height stats:");
    println!("  Vertices: {}", field.vertex_count());
    println!("  Min: {:.4}", min);
    println!("  Max: {:.4}", max);
    println!("  Avg: {:.4}", avg);

    let boundary = green.boundary();
    println!("Outline:");
    println!("  Points: {}", boundary.len());
    if let Some((min_x, max_x, min_z, max_z)) = boundary.bounds() {
        println!("  Extent: {:.3} x {:.3}", max_x - min_x, max_z - min_z);
    }

    let palette = BandPalette::default();
    let histogram = green.slope().band_histogram();
    println!("Slope bands:");
    for band in SlopeBand::ALL {
        let count = histogram[band.index()];
        let [r, g, b, _] = palette.color(band);
        println!(
            "  {:?} (#{:02X}{:02X}{:02X}): {} ({:.1}%)",
            band,
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
            count,
            count as f32 * 100.0 / field.vertex_count() as f32
        );
    }
    println!("  Puttable inside outline: {:.1}%", green.puttable_percentage());

    let contours = green.contours();
    println!("Contours:");
    println!("  Step: {}", contours.step());
    println!("  Levels: {}", contours.levels().len());
    println!("  Segments: {}", contours.len());

    green.regenerate_shape(ShapeParams {
        irregularity: 0.0,
        ..Default::default()
    });
    println!("Smooth outline: {} points", green.boundary().len());

    Ok(())
}
