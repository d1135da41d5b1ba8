use plotters::prelude::*;
use voroinc::{BoundingBox, Diagram};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Define the output file and dimensions
    let filename = "triangulation.svg";
    let root = SVGBackend::new(filename, (1024, 768)).into_drawing_area();

    root.fill(&WHITE)?;

    // Create a 3D chart context
    let mut chart = ChartBuilder::on(&root)
        .caption("Delaunay triangulation and Voronoi edges", ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(30)
        .build_cartesian_3d(0.0..100.0, 0.0..100.0, 0.0..100.0)?;

    chart.configure_axes().draw()?;

    // Setup the diagram
    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [100.0, 100.0, 100.0]);
    let mut diagram = Diagram::new(bounds)?;
    diagram.insert_random(60, 2024);

    let position = |id| {
        let p = diagram.position(id).unwrap_or_default();
        (p[0], p[1], p[2])
    };

    // Delaunay edges in light grey
    for (a, b) in diagram.edges() {
        chart.draw_series(LineSeries::new([position(a), position(b)], BLACK.mix(0.15)))?;
    }

    // Voronoi edges clipped to the box
    for (a, b) in diagram.voronoi_edges() {
        if bounds.contains(&a, 0.0) && bounds.contains(&b, 0.0) {
            chart.draw_series(LineSeries::new([(a[0], a[1], a[2]), (b[0], b[1], b[2])], BLUE.mix(0.5)))?;
        }
    }

    // Hull sites in red, interior sites in black
    for (id, site) in diagram.sites() {
        let colour = if site.is_on_hull() { RED } else { BLACK };
        chart.draw_series(std::iter::once(Circle::new(position(id), 3, colour.filled())))?;
    }

    root.present()?;
    println!("Example output saved to {}", filename);
    Ok(())
}
