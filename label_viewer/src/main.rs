//! Label viewer demo
//!
//! Labels a random point cloud and "renders" it through a console backend
//! that logs every draw call. An optional settings file (`.toml` or `.ron`)
//! configures the mapper:
//!
//! ```text
//! cargo run -p label_viewer -- settings.toml
//! ```

use label_mapper::foundation::logging;
use label_mapper::prelude::*;
use label_mapper::render::BackendError;
use rand::prelude::*;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

const POINT_COUNT: usize = 12;
const FRAMES: usize = 3;

#[derive(Error, Debug)]
enum ViewerError {
    #[error("failed to load settings: {0}")]
    Settings(#[from] ConfigError),

    #[error("failed to build dataset: {0}")]
    Data(#[from] label_mapper::data::DataError),

    #[error("label rebuild failed: {0}")]
    Labels(#[from] LabelError),
}

/// Backend that writes label draws to the log
#[derive(Default)]
struct ConsoleBackend {
    next_resource: u64,
    resources: HashMap<TextResourceId, String>,
    draws_this_pass: usize,
}

impl LabelRenderBackend for ConsoleBackend {
    fn begin_pass(&mut self, pass: RenderPass, viewport: &Viewport) -> Result<(), BackendError> {
        log::info!("{pass:?} pass on {}x{} viewport", viewport.width, viewport.height);
        self.draws_this_pass = 0;
        Ok(())
    }

    fn prepare_text(&mut self, text: &str, style: &TextProperty) -> Result<TextResourceId, BackendError> {
        self.next_resource += 1;
        let resource = TextResourceId(self.next_resource);
        log::debug!("Prepared '{text}' as {resource:?} ({} {}pt)", style.font_family, style.font_size);
        self.resources.insert(resource, text.to_string());
        Ok(resource)
    }

    fn draw_text(
        &mut self,
        _pass: RenderPass,
        resource: TextResourceId,
        text: &str,
        position: &Point3,
        style: &TextProperty,
    ) -> Result<(), BackendError> {
        if !self.resources.contains_key(&resource) {
            return Err(format!("unknown text resource {resource:?}").into());
        }
        log::info!(
            "  '{text}' at ({:8.2}, {:8.2}, {:8.2}) color {:?}",
            position.x,
            position.y,
            position.z,
            style.color
        );
        self.draws_this_pass += 1;
        Ok(())
    }

    fn release_text(&mut self, resource: TextResourceId) {
        self.resources.remove(&resource);
    }

    fn end_pass(&mut self, pass: RenderPass) -> Result<(), BackendError> {
        log::info!("{pass:?} pass drew {} labels", self.draws_this_pass);
        Ok(())
    }
}

fn random_cloud(rng: &mut impl Rng) -> Result<PointSet, ViewerError> {
    let points: Vec<Point3> = (0..POINT_COUNT)
        .map(|_| {
            Point3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            )
        })
        .collect();
    let temperatures: Vec<f32> = (0..POINT_COUNT).map(|_| rng.gen_range(15.0..30.0)).collect();
    let velocities: Vec<f64> = (0..POINT_COUNT * 3).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let kinds: Vec<i32> = (0..POINT_COUNT).map(|_| rng.gen_range(0..2)).collect();

    let mut cloud = PointSet::new(points);
    cloud.set_point_ids((100..).take(POINT_COUNT).collect())?;
    cloud.set_attribute(AttributeKind::Vectors, DataArray::named("velocity", 3, velocities)?);
    cloud.add_point_array(DataArray::named("kind", 1, kinds)?);
    cloud.add_field_array(DataArray::named("temp", 1, temperatures)?);
    Ok(cloud)
}

fn run() -> Result<(), ViewerError> {
    let settings = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading settings from {path}");
            MapperSettings::load_from_file(&path)?
        }
        None => MapperSettings {
            label_mode: LabelMode::FieldData,
            label_format: Some("%.1f C".to_string()),
            field_data: FieldDataRef::Name("temp".to_string()),
            coordinate_system: CoordinateSystem::Display,
            label_type_array: Some("kind".to_string()),
            ..Default::default()
        },
    };

    let mut rng = thread_rng();
    let input = DataObject::from(random_cloud(&mut rng)?).into_shared();

    let mut mapper = LabeledDataMapper::new();
    settings.apply_to(&mut mapper)?;
    mapper.set_input(Some(Rc::clone(&input)));
    mapper.set_label_text_property(1, TextProperty::with_color([1.0, 0.3, 0.2]));

    let viewport = Viewport::new(800, 600);
    let camera = Mat4::look_at(Point3::new(0.0, 0.0, 40.0), Point3::origin(), Vec3::y());
    let mut transform = LabelTransform::from_matrix(camera);
    transform.post_multiply(&Mat4::perspective(std::f64::consts::FRAC_PI_4, viewport.aspect(), 0.1, 100.0));
    transform.post_multiply(&Mat4::viewport(f64::from(viewport.width), f64::from(viewport.height)));
    mapper.set_transform(Some(transform.into_shared()));

    log::info!("{mapper}");

    let mut backend = ConsoleBackend::default();
    for frame in 0..FRAMES {
        log::info!("Frame {frame} (stale: {})", mapper.is_stale());
        mapper.render_opaque_geometry(&viewport, &mut backend);
        mapper.render_overlay(&viewport, &mut backend);

        // fresh data so the next opaque pass rebuilds
        *input.borrow_mut() = DataObject::from(random_cloud(&mut rng)?);
    }

    mapper.build_labels()?;
    mapper.release_graphics_resources(&mut backend);
    log::info!("Released graphics resources, {} still held", backend.resources.len());
    Ok(())
}

fn main() {
    logging::init_with_default_level(log::LevelFilter::Info);

    log::info!("Starting label viewer");
    if let Err(err) = run() {
        log::error!("Label viewer failed: {err}");
        std::process::exit(1);
    }
}
