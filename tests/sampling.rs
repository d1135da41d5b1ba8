use voroinc::solid::boundary_samples;
use voroinc::{
    BoundingBox, CylinderSolid, DiagramError, HalfSpaceSolid, Intersection, OwnerTag, SampleOptions, Solid,
    SphereSolid, TorusSolid, sample_solid,
};

fn unit_box() -> BoundingBox<3> {
    BoundingBox::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])
}

#[test]
fn test_sampled_sphere_is_delaunay() {
    let sphere = SphereSolid::new([0.5, 0.5, 0.5], 0.4);
    let d = sample_solid(&sphere, unit_box(), SampleOptions::with_spacing(0.08)).unwrap();
    assert!(d.exists());
    assert!(d.point_count() > 100);
    d.check_links().unwrap();
    d.check_territory_cache().unwrap();
    assert!(d.delaunay_violations().is_empty());
}

#[test]
fn test_sampled_torus_keeps_its_hole() {
    let torus = TorusSolid::new([0.5, 0.5, 0.5], [0.0, 0.0, 1.0], 0.3, 0.1);
    let d = sample_solid(&torus, unit_box(), SampleOptions::with_spacing(0.04)).unwrap();
    assert!(d.exists());
    // no site near the axis of the torus
    for (_, site) in d.sites() {
        let [x, y, _] = site.position;
        let r = ((x - 0.5).powi(2) + (y - 0.5).powi(2)).sqrt();
        assert!(r > 0.1, "site {:?} inside the hole", site.position);
    }
}

#[test]
fn test_owner_tag_is_carried() {
    let half_cylinder = Intersection::default()
        .with(CylinderSolid::new([0.5, 0.5, 0.5], [1.0, 0.0, 0.0], 0.3, 0.35))
        .with(HalfSpaceSolid::new([0.5, 0.5, 0.5], [0.0, 0.0, 1.0]));
    let owner = OwnerTag { set: 1, model: 42 };
    let options = SampleOptions {
        owner,
        seed: 7,
        ..SampleOptions::with_spacing(0.05)
    };
    let d = sample_solid(&half_cylinder, unit_box(), options).unwrap();
    assert!(d.point_count() > 0);
    for (_, site) in d.sites() {
        assert_eq!(site.owner, owner);
        assert!(site.position[2] >= 0.5 - 0.05);
    }
}

#[test]
fn test_samples_lie_in_bounds() {
    // the solid covers the whole box, so only the box faces are sampled
    let everything = HalfSpaceSolid::new([0.0, 0.0, -10.0], [0.0, 0.0, 1.0]);
    let samples = boundary_samples(&everything, &unit_box(), &SampleOptions::with_spacing(0.1)).unwrap();
    assert!(!samples.is_empty());
    assert!(samples.iter().all(|p| unit_box().contains(p, 0.0)));
    assert!(samples.iter().all(|p| everything.contains(p)));
}

#[test]
fn test_bad_spacing() {
    let sphere = SphereSolid::new([0.5, 0.5, 0.5], 0.4);
    let res = sample_solid(&sphere, unit_box(), SampleOptions::with_spacing(f64::NAN));
    assert!(matches!(res, Err(DiagramError::InvalidParameter { name: "spacing", .. })));

    // a tiny but positive spacing asks for more lattice points than fit in memory
    let res = sample_solid(&sphere, unit_box(), SampleOptions::with_spacing(1e-300));
    assert!(matches!(res, Err(DiagramError::InvalidParameter { name: "spacing", .. })));
}
