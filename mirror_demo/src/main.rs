//! Mirror reflection demo
//!
//! Orbits a viewer in front of a tilted mirror, drives the reflection rig
//! once per frame against the threaded reference backend, and reallocates
//! the offscreen targets halfway through to exercise rebinding.
//!
//! Usage: `mirror_demo [config.toml|config.ron]`

use std::time::Duration;

use mirror_engine::foundation::logging;
use mirror_engine::prelude::*;

const FRAME_COUNT: u32 = 120;
const ORBIT_RADIUS: f32 = 4.0;
const REFLECTION_CAMERA: CameraId = CameraId(1);

fn load_config() -> Result<ReflectionConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => ReflectionConfig::load_from_file(path),
        None => Ok(ReflectionConfig::default()),
    }
}

fn viewer_at(frame: u32) -> CameraPose {
    let angle = frame as f32 / FRAME_COUNT as f32 * std::f32::consts::PI - std::f32::consts::FRAC_PI_2;
    let eye = Vec3::new(ORBIT_RADIUS * angle.sin(), 1.7, ORBIT_RADIUS * angle.cos());
    let look = Quat::face_towards(&-eye, &Vec3::y());
    CameraPose::perspective(eye, 60.0, 16.0 / 9.0, 0.1, 200.0).with_rotation(look)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_level(&config.engine.log_filter());
    config.validate()?;

    log::info!("Starting mirror demo ({} frames)", FRAME_COUNT);

    let kind = BackendKind::platform_default();
    let mut backend = ThreadedBackend::spawn(kind, |kind, color, depth| {
        log::info!("Creating {} renderer for targets ({color}, {depth})", kind.name());
        Ok(Box::new(ConstantBufferRenderer::new(color, depth)) as Box<dyn FrameRenderer>)
    })?;
    let mut queue = backend.graphics_queue();
    let mut rig = MirrorRig::new(REFLECTION_CAMERA, &config)?;

    let mirror = MirrorSurface::new(Transform::new(
        Vec3::new(0.0, 1.5, 0.0),
        Quat::from_euler_angles(0.1, 0.0, 0.0),
        Vec3::new(2.0, 1.5, 1.0),
    ));

    let mut presented = 0;
    for frame in 0..FRAME_COUNT {
        // Host reallocates its offscreen targets mid-run
        let targets = if frame < FRAME_COUNT / 2 {
            RenderTargetHandle::from_raw(0x1000, 0x1001)
        } else {
            RenderTargetHandle::from_raw(0x2000, 0x1001)
        };

        let primary = viewer_at(frame);
        let snapshot = SceneSnapshot {
            mirror: mirror.clone(),
            reflection: ReflectionCameraSlot::mirroring(REFLECTION_CAMERA, &primary).with_targets(targets),
            primary,
        };

        let output = rig.tick(&snapshot, &mut backend, &mut queue);
        if output.presented() {
            presented += 1;
        }
        if let Some(reflection) = &output.reflection {
            log::debug!(
                "Frame {frame}: reflected eye {:?}, fov {:.1}, flipped {}",
                reflection.pose.position,
                reflection.pose.fov_degrees,
                reflection.solution.back_face_flipped
            );
        }
        if let Some(reason) = &output.skipped {
            log::info!("Frame {frame} skipped: {reason:?}");
        }

        for completion in backend.drain_completions() {
            log::trace!(
                "Render thread finished frame {} (renderer generation {})",
                completion.frame,
                completion.renderer_generation
            );
        }
    }

    // Let the render thread catch up before shutting it down
    let mut completed = 0;
    while backend.wait_for_completion(Duration::from_millis(50)).is_some() {
        completed += 1;
    }

    log::info!("Presented {presented} of {FRAME_COUNT} frames ({completed} completions after the loop)");
    Ok(())
}
