use crate::accuracy::Accuracy;
use crate::bounds::BoundingBox;
use crate::diagram::Diagram;
use crate::error::DiagramError;
use crate::site::SiteId;
use crate::solid::geometries::*;
use crate::solid::{SampleOptions, Solid, sample_solid};
use crate::vertex::VertexKey;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

fn to_js(err: DiagramError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// --- Bounding Box ---

/// Represents an axis-aligned bounding box in 3D space.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug)]
pub struct BoundingBox3D {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

#[wasm_bindgen]
impl BoundingBox3D {
    #[wasm_bindgen(constructor)]
    pub fn new(min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) -> BoundingBox3D {
        BoundingBox3D {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }
    }
}

impl From<BoundingBox3D> for BoundingBox<3> {
    fn from(b: BoundingBox3D) -> Self {
        Self {
            min: [b.min_x, b.min_y, b.min_z],
            max: [b.max_x, b.max_y, b.max_z],
        }
    }
}

// --- Solid ---

/// WASM wrapper for solids that can be sampled into a diagram.
#[wasm_bindgen]
pub struct Solid3D {
    inner: Box<dyn Solid>,
}

#[wasm_bindgen]
impl Solid3D {
    /// Wraps a JavaScript object with a `contains(x, y, z)` method.
    #[wasm_bindgen(js_name = newCustom)]
    pub fn new_custom(val: JsValue) -> Solid3D {
        Solid3D {
            inner: Box::new(JsSolid { val }),
        }
    }

    pub fn contains(&self, x: f64, y: f64, z: f64) -> bool {
        self.inner.contains(&[x, y, z])
    }

    pub fn new_sphere(cx: f64, cy: f64, cz: f64, radius: f64) -> Solid3D {
        Solid3D {
            inner: Box::new(SphereSolid::new([cx, cy, cz], radius)),
        }
    }

    pub fn new_cuboid(min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) -> Solid3D {
        Solid3D {
            inner: Box::new(CuboidSolid::new([min_x, min_y, min_z], [max_x, max_y, max_z])),
        }
    }

    pub fn new_cylinder(cx: f64, cy: f64, cz: f64, ax: f64, ay: f64, az: f64, radius: f64, half_length: f64) -> Solid3D {
        Solid3D {
            inner: Box::new(CylinderSolid::new([cx, cy, cz], [ax, ay, az], radius, half_length)),
        }
    }

    pub fn new_torus(cx: f64, cy: f64, cz: f64, ax: f64, ay: f64, az: f64, major: f64, minor: f64) -> Solid3D {
        Solid3D {
            inner: Box::new(TorusSolid::new([cx, cy, cz], [ax, ay, az], major, minor)),
        }
    }

    pub fn new_half_space(px: f64, py: f64, pz: f64, nx: f64, ny: f64, nz: f64) -> Solid3D {
        Solid3D {
            inner: Box::new(HalfSpaceSolid::new([px, py, pz], [nx, ny, nz])),
        }
    }

    /// Intersection of this solid with `other`.
    pub fn intersect(self, other: Solid3D) -> Solid3D {
        Solid3D {
            inner: Box::new(Intersection::new(vec![self.inner, other.inner])),
        }
    }
}

struct JsSolid {
    val: JsValue,
}

unsafe impl Send for JsSolid {}
unsafe impl Sync for JsSolid {}

impl std::fmt::Debug for JsSolid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsSolid")
    }
}

impl Solid for JsSolid {
    fn contains(&self, point: &[f64; 3]) -> bool {
        if let Ok(func) = Reflect::get(&self.val, &"contains".into()).and_then(|f| f.dyn_into::<Function>()) {
            let args = Array::of3(&point[0].into(), &point[1].into(), &point[2].into());
            if let Ok(res) = func.apply(&self.val, &args) {
                return res.as_bool().unwrap_or(false);
            }
        }
        false
    }
}

// --- Diagram ---

#[wasm_bindgen(js_name = Diagram)]
pub struct DiagramWasm {
    inner: Diagram,
}

#[wasm_bindgen(js_class = Diagram)]
impl DiagramWasm {
    /// Creates an empty diagram; `accuracy` defaults to the process-wide tolerance.
    #[wasm_bindgen(constructor)]
    pub fn new(bounds: BoundingBox3D, accuracy: Option<f64>) -> Result<DiagramWasm, JsValue> {
        let accuracy = match accuracy {
            Some(value) => Accuracy::new(value).map_err(to_js)?,
            None => Accuracy::global(),
        };
        let inner = Diagram::with_accuracy(bounds.into(), accuracy).map_err(to_js)?;
        Ok(DiagramWasm { inner })
    }

    /// Builds a diagram from the boundary of `solid`.
    #[wasm_bindgen(js_name = fromSolid)]
    pub fn from_solid(solid: &Solid3D, bounds: BoundingBox3D, spacing: f64, jitter: f64) -> Result<DiagramWasm, JsValue> {
        let options = SampleOptions {
            spacing,
            jitter,
            seed: get_seed(),
            ..SampleOptions::default()
        };
        let inner = sample_solid(solid.inner.as_ref(), bounds.into(), options).map_err(to_js)?;
        Ok(DiagramWasm { inner })
    }

    pub fn insert(&mut self, x: f64, y: f64, z: f64) -> Result<u32, JsValue> {
        self.inner.insert([x, y, z]).map(|id| id.0).map_err(to_js)
    }

    /// Inserts a flat `[x, y, z, ...]` buffer; failed points get id -1.
    pub fn insert_points(&mut self, points: &[f64]) -> Vec<i32> {
        points
            .chunks_exact(3)
            .map(|p| match self.inner.insert([p[0], p[1], p[2]]) {
                Ok(id) => id.0 as i32,
                Err(_) => -1,
            })
            .collect()
    }

    pub fn random_points(&mut self, count: usize) -> Vec<u32> {
        self.inner.insert_random(count, get_seed()).into_iter().map(|id| id.0).collect()
    }

    #[wasm_bindgen(getter)]
    pub fn exists(&self) -> bool {
        self.inner.exists()
    }

    #[wasm_bindgen(getter)]
    pub fn count_points(&self) -> usize {
        self.inner.point_count()
    }

    #[wasm_bindgen(getter)]
    pub fn count_vertices(&self) -> usize {
        self.inner.vertex_count()
    }

    /// Flat `[x, y, z, ...]` site positions in id order.
    #[wasm_bindgen(getter)]
    pub fn sites(&self) -> Vec<f64> {
        self.inner.sites().flat_map(|(_, s)| s.position).collect()
    }

    #[wasm_bindgen(getter)]
    pub fn hull_sites(&self) -> Vec<u32> {
        self.inner.hull_sites().into_iter().map(|id| id.0).collect()
    }

    pub fn nearest(&self, x: f64, y: f64, z: f64) -> Result<u32, JsValue> {
        self.inner.nearest_site(&[x, y, z]).map(|id| id.0).map_err(to_js)
    }

    pub fn neighbours(&self, site: u32) -> Result<Vec<u32>, JsValue> {
        let sites = self.inner.neighbours(SiteId(site)).map_err(to_js)?;
        Ok(sites.into_iter().map(|id| id.0).collect())
    }

    /// Flat circumcentres of the finite vertices of the site's cell.
    pub fn territory(&self, site: u32) -> Result<Vec<f64>, JsValue> {
        let keys = self.inner.territory(SiteId(site)).map_err(to_js)?;
        Ok(self.centres(&keys))
    }

    /// Flat circumcentres of the finite vertices shared by two cells.
    pub fn contiguity(&self, a: u32, b: u32) -> Result<Vec<f64>, JsValue> {
        let keys = self.inner.contiguity(SiteId(a), SiteId(b)).map_err(to_js)?;
        Ok(self.centres(&keys))
    }

    /// Delaunay edges as flat site id pairs.
    #[wasm_bindgen(getter)]
    pub fn edges(&self) -> Vec<u32> {
        self.inner.edges().into_iter().flat_map(|(a, b)| [a.0, b.0]).collect()
    }

    /// Finite Voronoi edges as flat `[x0, y0, z0, x1, y1, z1, ...]`.
    #[wasm_bindgen(getter)]
    pub fn voronoi_edges(&self) -> Vec<f64> {
        self.inner
            .voronoi_edges()
            .into_iter()
            .flat_map(|(a, b)| a.into_iter().chain(b))
            .collect()
    }

    /// Flat circumcentres of all finite vertices.
    #[wasm_bindgen(getter)]
    pub fn vertex_centres(&self) -> Vec<f64> {
        self.inner.vertices().filter_map(|v| v.position).flatten().collect()
    }

    /// Squared circumradii of all finite vertices, in the order of `vertex_centres`.
    #[wasm_bindgen(getter)]
    pub fn vertex_radii_sq(&self) -> Vec<f64> {
        self.inner.vertices().filter_map(|v| v.radius_sq).collect()
    }

    pub fn dump(&self) -> Result<String, JsValue> {
        self.inner.dump().map_err(to_js)
    }

    pub fn restore(json: &str) -> Result<DiagramWasm, JsValue> {
        let inner = Diagram::restore(json).map_err(to_js)?;
        Ok(DiagramWasm { inner })
    }
}

impl DiagramWasm {
    fn centres(&self, keys: &[VertexKey]) -> Vec<f64> {
        keys.iter()
            .filter_map(|&k| self.inner.vertex(k).and_then(|v| v.centre()))
            .flatten()
            .collect()
    }
}

fn get_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * 4294967296.0) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        123456789 // Fixed seed for tests
    }
}
