use voroinc::{BoundingBox, SampleOptions, TorusSolid, sample_solid};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [10.0, 10.0, 10.0]);
    let torus = TorusSolid::new([5.0, 5.0, 5.0], [0.0, 0.0, 1.0], 3.0, 1.0);
    let diagram = sample_solid(&torus, bounds, SampleOptions::with_spacing(0.4))?;

    println!("sites:            {}", diagram.point_count());
    println!("tetrahedra:       {}", diagram.interior_count());
    println!("hull triangles:   {}", diagram.sentinel_count());
    println!("delaunay edges:   {}", diagram.edges().len());
    println!("violations:       {}", diagram.delaunay_violations().len());

    // the cell of a site on the outer rim of the torus
    let rim = diagram.nearest_site(&[9.0, 5.0, 5.0])?;
    println!(
        "site {:?} has {} neighbours and {} territory vertices",
        rim,
        diagram.neighbours(rim)?.len(),
        diagram.territory(rim)?.len()
    );

    std::fs::write("torus.json", diagram.dump()?)?;
    println!("Dump saved to torus.json");
    Ok(())
}
