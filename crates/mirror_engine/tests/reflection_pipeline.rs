//! End-to-end frames through the rig and the threaded backend
//!
//! Drives whole frames the way a host would: snapshot in, boundary calls out,
//! completions back from the render thread.

use std::time::Duration;

use approx::assert_relative_eq;
use mirror_engine::bridge::world_view_projection;
use mirror_engine::prelude::*;

const TIMEOUT: Duration = Duration::from_secs(5);
const CAMERA: CameraId = CameraId(1);

fn spawn_backend() -> ThreadedBackend {
    ThreadedBackend::spawn(BackendKind::platform_default(), |_, color, depth| {
        Ok(Box::new(ConstantBufferRenderer::new(color, depth)) as Box<dyn FrameRenderer>)
    })
    .expect("platform backend")
}

fn tilted_mirror() -> MirrorSurface {
    MirrorSurface::new(Transform::new(
        Vec3::new(0.0, 1.5, -2.0),
        Quat::from_euler_angles(0.15, 0.3, 0.0),
        Vec3::new(2.0, 1.2, 1.0),
    ))
}

fn snapshot(eye: Vec3, targets: RenderTargetHandle) -> SceneSnapshot {
    let primary = CameraPose::perspective(eye, 60.0, 16.0 / 9.0, 0.1, 200.0);
    SceneSnapshot {
        mirror: tilted_mirror(),
        reflection: ReflectionCameraSlot::mirroring(CAMERA, &primary).with_targets(targets),
        primary,
    }
}

#[test]
fn test_presented_frames_reach_render_thread_in_order() {
    let mut backend = spawn_backend();
    let mut queue = backend.graphics_queue();
    let mut rig = MirrorRig::new(CAMERA, &ReflectionConfig::default()).expect("rig");
    let targets = RenderTargetHandle::from_raw(0x100, 0x200);

    let eyes = [Vec3::new(0.0, 1.7, 3.0), Vec3::new(0.5, 1.7, 2.5), Vec3::new(1.0, 1.6, 2.0)];
    let mut sent = Vec::new();
    for eye in eyes {
        let output = rig.tick(&snapshot(eye, targets), &mut backend, &mut queue);
        let BridgeOutcome::Presented { message, .. } = output.bridge else {
            panic!("frame was not presented: {:?}", output.skipped);
        };
        sent.push(message.world_view_projection);
    }

    for (frame, expected) in sent.iter().enumerate() {
        let completion = backend.wait_for_completion(TIMEOUT).expect("completion");
        assert_eq!(completion.frame, frame as u64 + 1);
        assert_eq!(&completion.world_view_projection, expected);
        assert_eq!(completion.renderer_generation, 1);
        assert_eq!(completion.event_id, 1);
    }
}

#[test]
fn test_handle_churn_recreates_renderer() {
    let mut backend = spawn_backend();
    let mut queue = backend.graphics_queue();
    let mut rig = MirrorRig::new(CAMERA, &ReflectionConfig::default()).expect("rig");
    let eye = Vec3::new(0.2, 1.7, 3.0);

    let frames = [
        RenderTargetHandle::NULL,
        RenderTargetHandle::NULL,
        RenderTargetHandle::from_raw(1, 11),
        RenderTargetHandle::from_raw(1, 11),
        RenderTargetHandle::from_raw(2, 11),
    ];

    let presented: Vec<bool> = frames
        .iter()
        .map(|targets| rig.tick(&snapshot(eye, *targets), &mut backend, &mut queue).presented())
        .collect();
    assert_eq!(presented, vec![false, false, true, true, true]);
    assert_eq!(rig.bridge().state(), BridgeState::Bound);

    let completions: Vec<FrameCompletion> = (0..3)
        .map(|_| backend.wait_for_completion(TIMEOUT).expect("completion"))
        .collect();
    let generations: Vec<u64> = completions.iter().map(|c| c.renderer_generation).collect();
    assert_eq!(generations, vec![1, 1, 2]);
    assert_eq!(completions[2].color.raw(), 2);
}

#[test]
fn test_degenerate_frame_sends_nothing() {
    let mut backend = spawn_backend();
    let mut queue = backend.graphics_queue();
    let mut rig = MirrorRig::new(CAMERA, &ReflectionConfig::default()).expect("rig");
    let mirror = tilted_mirror();
    let targets = RenderTargetHandle::from_raw(5, 6);

    // Eye inside the mirror plane, offset along the quad's right axis
    let on_plane = mirror.position() + mirror.corners().right_edge() * 0.25;
    let output = rig.tick(&snapshot(on_plane, targets), &mut backend, &mut queue);

    assert!(!output.presented());
    assert!(output.reflection.is_none());
    assert!(matches!(output.skipped, Some(SkipReason::Solver(SolverError::DegenerateGeometry(_)))));
    assert!(backend.wait_for_completion(Duration::from_millis(100)).is_none());

    let output = rig.tick(&snapshot(Vec3::new(0.0, 1.7, 3.0), targets), &mut backend, &mut queue);
    assert!(output.presented());
    assert!(backend.wait_for_completion(TIMEOUT).is_some());
}

#[test]
fn test_reflection_matches_direct_solve() {
    let mut backend = spawn_backend();
    let mut queue = backend.graphics_queue();
    let config = ReflectionConfig {
        bridge: BridgeConfig::for_backend(BackendKind::platform_default()).with_flip_vertical(true),
        ..ReflectionConfig::default()
    };
    let mut rig = MirrorRig::new(CAMERA, &config).expect("rig");
    let frame = snapshot(Vec3::new(-0.4, 1.8, 2.2), RenderTargetHandle::from_raw(7, 8));

    let output = rig.tick(&frame, &mut backend, &mut queue);
    let reflection = output.reflection.expect("reflection");
    let direct = MirrorFrustumSolver::new(config.solver.clone())
        .solve(&frame.mirror, frame.primary.position, frame.reflection.near, frame.reflection.far)
        .expect("solve");
    assert_eq!(reflection.solution, direct);

    // Reflected eye is mirror-symmetric to the primary eye
    let (p, n) = (frame.mirror.position(), frame.mirror.normal());
    assert_relative_eq!(n.dot(&(reflection.pose.position - p)), -n.dot(&(frame.primary.position - p)), epsilon = 1e-4);

    let expected = world_view_projection(&frame.reflection.model_to_world, &direct.world_to_camera, &direct.projection, true);
    let completion = backend.wait_for_completion(TIMEOUT).expect("completion");
    assert_eq!(completion.world_view_projection, expected);

    let cull = output.cull.expect("cull estimate");
    for corner in direct.corners.all() {
        assert!(cull.contains(direct.eye, corner));
    }
}
