//! In-process reference backend with its own render thread
//!
//! Every boundary call becomes a [`BackendCommand`] on one channel, so the
//! render thread sees pushes in exactly the order they were issued. Render
//! events use whatever transform and targets were pushed last when they run.
//!
//! The render thread owns a [`FrameRenderer`], created lazily on the first
//! event with usable targets and dropped whenever the targets change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::bridge::backend::{BackendKind, BackendResult, BridgeError, GraphicsQueue, RenderBackend};
use crate::bridge::handles::{NativeHandle, RenderEventToken};
use crate::bridge::message::RowMajorMatrix;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Completions buffered for the host before newer ones are dropped
pub const COMPLETION_CAPACITY: usize = 64;

/// Ordered command consumed by the render thread
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    /// Replace the current world-view-projection matrix
    SetViewProjection(RowMajorMatrix),
    /// Replace the current render targets
    SetRenderTargets {
        /// Color target, `None` when not available
        color: Option<NativeHandle>,
        /// Depth target, `None` when not available
        depth: Option<NativeHandle>,
    },
    /// Drop every reference derived from the current targets
    InvalidateTargets,
    /// Run one render event
    RenderEvent {
        /// Token handed out by the backend
        token: RenderEventToken,
        /// Event identifier from the host
        event_id: i32,
    },
    /// Release the renderer and stop the thread
    Shutdown,
}

/// State a [`FrameRenderer`] draws with for one event
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// API being driven
    pub kind: BackendKind,
    /// Sequence number of the executed event
    pub frame: u64,
    /// Most recently pushed matrix
    pub world_view_projection: &'a RowMajorMatrix,
    /// Color target
    pub color: NativeHandle,
    /// Depth target
    pub depth: NativeHandle,
}

/// Draw callback living on the render thread
pub trait FrameRenderer: Send {
    /// Render one frame into the context's targets
    fn render(&mut self, frame: &FrameContext<'_>) -> BackendResult<()>;
}

/// Reference renderer that uploads the matrix into a constant buffer
#[derive(Debug)]
pub struct ConstantBufferRenderer {
    color: NativeHandle,
    depth: NativeHandle,
    constants: Vec<u8>,
}

impl ConstantBufferRenderer {
    /// Create a renderer attached to `color` and `depth`
    pub fn new(color: NativeHandle, depth: NativeHandle) -> Self {
        Self {
            color,
            depth,
            constants: Vec::with_capacity(std::mem::size_of::<RowMajorMatrix>()),
        }
    }

    /// Bytes uploaded by the last frame
    pub fn constants(&self) -> &[u8] {
        &self.constants
    }
}

impl FrameRenderer for ConstantBufferRenderer {
    fn render(&mut self, frame: &FrameContext<'_>) -> BackendResult<()> {
        if (frame.color, frame.depth) != (self.color, self.depth) {
            return Err(BridgeError::Rejected(format!(
                "renderer attached to ({}, {}) asked to draw into ({}, {})",
                self.color, self.depth, frame.color, frame.depth
            )));
        }
        self.constants.clear();
        self.constants.extend_from_slice(frame.world_view_projection.as_bytes());
        log::trace!("{} frame {} uploaded {} constant bytes", frame.kind.name(), frame.frame, self.constants.len());
        Ok(())
    }
}

/// Report of one executed render event
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCompletion {
    /// Sequence number of the event
    pub frame: u64,
    /// Event identifier from the host
    pub event_id: i32,
    /// Matrix the frame was drawn with
    pub world_view_projection: RowMajorMatrix,
    /// Color target drawn into
    pub color: NativeHandle,
    /// Depth target drawn into
    pub depth: NativeHandle,
    /// Increments every time the renderer is recreated
    pub renderer_generation: u64,
}

/// Channel-backed [`RenderBackend`] running its own render thread
pub struct ThreadedBackend {
    kind: BackendKind,
    token: RenderEventToken,
    commands: mpsc::Sender<BackendCommand>,
    completions: mpsc::Receiver<FrameCompletion>,
    thread: Option<JoinHandle<()>>,
}

impl ThreadedBackend {
    /// Start the render thread
    ///
    /// `factory` builds a renderer for a pair of targets; it runs on the
    /// render thread every time the renderer has to be (re)created.
    ///
    /// # Errors
    /// [`BridgeError::BackendUnavailable`] when `kind` cannot run on this
    /// platform or the thread cannot be started.
    pub fn spawn<F>(kind: BackendKind, factory: F) -> BackendResult<Self>
    where
        F: FnMut(BackendKind, NativeHandle, NativeHandle) -> BackendResult<Box<dyn FrameRenderer>> + Send + 'static,
    {
        if !kind.is_available() {
            return Err(BridgeError::BackendUnavailable(format!(
                "{} is not supported on this platform",
                kind.name()
            )));
        }

        let token = RenderEventToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed));
        let (commands, command_rx) = mpsc::channel();
        let (completion_tx, completions) = mpsc::sync_channel(COMPLETION_CAPACITY);

        let mut render_thread = RenderThread {
            kind,
            token,
            factory: Box::new(factory),
            completions: completion_tx,
            world_view_projection: RowMajorMatrix([0.0; 16]),
            color: None,
            depth: None,
            renderer: None,
            generation: 0,
            frame: 0,
        };

        let thread = std::thread::Builder::new()
            .name(format!("render-{}", kind.name()))
            .spawn(move || render_thread.run(&command_rx))
            .map_err(|e| BridgeError::BackendUnavailable(format!("failed to start render thread: {e}")))?;

        log::info!("{} backend started (token {:#x})", kind.name(), token.0);
        Ok(Self {
            kind,
            token,
            commands,
            completions,
            thread: Some(thread),
        })
    }

    /// Host-side queue feeding this backend's render thread
    pub fn graphics_queue(&self) -> RenderThreadQueue {
        RenderThreadQueue {
            commands: self.commands.clone(),
        }
    }

    /// Completions reported since the last call, oldest first
    ///
    /// At most [`COMPLETION_CAPACITY`] are buffered; events that finish while
    /// the buffer is full are not reported.
    pub fn drain_completions(&self) -> Vec<FrameCompletion> {
        self.completions.try_iter().collect()
    }

    /// Block until the next completion arrives or `timeout` elapses
    pub fn wait_for_completion(&self, timeout: Duration) -> Option<FrameCompletion> {
        self.completions.recv_timeout(timeout).ok()
    }

    fn send(&self, command: BackendCommand) -> BackendResult<()> {
        self.commands.send(command).map_err(|_| BridgeError::Disconnected)
    }
}

impl RenderBackend for ThreadedBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn set_view_projection(&mut self, matrix: [f32; 16]) -> BackendResult<()> {
        self.send(BackendCommand::SetViewProjection(RowMajorMatrix(matrix)))
    }

    fn set_render_targets(&mut self, color: Option<NativeHandle>, depth: Option<NativeHandle>) -> BackendResult<()> {
        self.send(BackendCommand::SetRenderTargets { color, depth })
    }

    fn invalidate_targets(&mut self) -> BackendResult<()> {
        self.send(BackendCommand::InvalidateTargets)
    }

    fn render_event_token(&self) -> RenderEventToken {
        self.token
    }
}

impl Drop for ThreadedBackend {
    fn drop(&mut self) {
        // The thread may already be gone; joining is still required
        let _ = self.commands.send(BackendCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("{} render thread panicked", self.kind.name());
            }
        }
    }
}

/// [`GraphicsQueue`] that schedules events on a [`ThreadedBackend`]
#[derive(Debug, Clone)]
pub struct RenderThreadQueue {
    commands: mpsc::Sender<BackendCommand>,
}

impl GraphicsQueue for RenderThreadQueue {
    fn enqueue_event(&mut self, token: RenderEventToken, event_id: i32) -> BackendResult<()> {
        self.commands
            .send(BackendCommand::RenderEvent { token, event_id })
            .map_err(|_| BridgeError::Disconnected)
    }
}

type BoxedFactory =
    Box<dyn FnMut(BackendKind, NativeHandle, NativeHandle) -> BackendResult<Box<dyn FrameRenderer>> + Send>;

struct RenderThread {
    kind: BackendKind,
    token: RenderEventToken,
    factory: BoxedFactory,
    completions: mpsc::SyncSender<FrameCompletion>,
    world_view_projection: RowMajorMatrix,
    color: Option<NativeHandle>,
    depth: Option<NativeHandle>,
    renderer: Option<Box<dyn FrameRenderer>>,
    generation: u64,
    frame: u64,
}

impl RenderThread {
    fn run(&mut self, commands: &mpsc::Receiver<BackendCommand>) {
        while let Ok(command) = commands.recv() {
            match command {
                BackendCommand::SetViewProjection(matrix) => self.world_view_projection = matrix,
                BackendCommand::SetRenderTargets { color, depth } => {
                    if (color, depth) != (self.color, self.depth) {
                        self.release_renderer("render targets changed");
                        self.color = color;
                        self.depth = depth;
                    }
                }
                BackendCommand::InvalidateTargets => self.release_renderer("targets invalidated"),
                BackendCommand::RenderEvent { token, event_id } => self.render_event(token, event_id),
                BackendCommand::Shutdown => break,
            }
        }

        // Device shutdown: the renderer goes before the backend
        self.release_renderer("shutdown");
        log::info!("{} render thread stopped after {} frames", self.kind.name(), self.frame);
    }

    fn release_renderer(&mut self, reason: &str) {
        if self.renderer.take().is_some() {
            log::debug!("{} renderer released: {reason}", self.kind.name());
        }
    }

    fn render_event(&mut self, token: RenderEventToken, event_id: i32) {
        if token != self.token {
            log::warn!("Ignoring render event with foreign token {:#x}", token.0);
            return;
        }
        let (Some(color), Some(depth)) = (self.color, self.depth) else {
            log::trace!("Render event {event_id} skipped: no render targets");
            return;
        };

        if self.renderer.is_none() {
            match (self.factory)(self.kind, color, depth) {
                Ok(renderer) => {
                    self.generation += 1;
                    log::debug!("{} renderer created for ({color}, {depth})", self.kind.name());
                    self.renderer = Some(renderer);
                }
                Err(err) => {
                    log::error!("Failed to create {} renderer: {err}", self.kind.name());
                    return;
                }
            }
        }

        self.frame += 1;
        let context = FrameContext {
            kind: self.kind,
            frame: self.frame,
            world_view_projection: &self.world_view_projection,
            color,
            depth,
        };
        if let Some(renderer) = self.renderer.as_mut() {
            if let Err(err) = renderer.render(&context) {
                log::error!("{} frame {} failed: {err}", self.kind.name(), self.frame);
                self.renderer = None;
                return;
            }
        }

        let completion = FrameCompletion {
            frame: self.frame,
            event_id,
            world_view_projection: self.world_view_projection,
            color,
            depth,
            renderer_generation: self.generation,
        };
        // Never block the render thread on a host that is not draining
        if let Err(mpsc::TrySendError::Full(_)) = self.completions.try_send(completion) {
            log::trace!("Completion buffer full; frame {} not reported", self.frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Instant;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn handle(raw: u64) -> NativeHandle {
        NativeHandle::new(raw).expect("non-zero")
    }

    fn spawn() -> ThreadedBackend {
        ThreadedBackend::spawn(BackendKind::platform_default(), |_, color, depth| {
            Ok(Box::new(ConstantBufferRenderer::new(color, depth)) as Box<dyn FrameRenderer>)
        })
        .expect("spawn")
    }

    #[test]
    fn test_event_uses_latest_pushed_transform() {
        let mut backend = spawn();
        let mut queue = backend.graphics_queue();
        let token = backend.render_event_token();

        backend.set_render_targets(Some(handle(1)), Some(handle(2))).expect("targets");
        backend.set_view_projection([1.0; 16]).expect("matrix");
        backend.set_view_projection([2.0; 16]).expect("matrix");
        queue.enqueue_event(token, 1).expect("event");
        backend.set_view_projection([3.0; 16]).expect("matrix");
        queue.enqueue_event(token, 1).expect("event");

        let first = backend.wait_for_completion(TIMEOUT).expect("first frame");
        let second = backend.wait_for_completion(TIMEOUT).expect("second frame");
        assert_eq!(first.world_view_projection, RowMajorMatrix([2.0; 16]));
        assert_eq!(second.world_view_projection, RowMajorMatrix([3.0; 16]));
        assert_eq!((first.frame, second.frame), (1, 2));
    }

    #[test]
    fn test_renderer_recreated_after_target_change() {
        let mut backend = spawn();
        let mut queue = backend.graphics_queue();
        let token = backend.render_event_token();

        backend.set_render_targets(Some(handle(1)), Some(handle(2))).expect("targets");
        queue.enqueue_event(token, 1).expect("event");
        backend.set_render_targets(Some(handle(1)), Some(handle(2))).expect("same targets");
        queue.enqueue_event(token, 1).expect("event");
        backend.set_render_targets(Some(handle(3)), Some(handle(2))).expect("new targets");
        queue.enqueue_event(token, 1).expect("event");

        let generations: Vec<u64> = (0..3)
            .map(|_| backend.wait_for_completion(TIMEOUT).expect("frame").renderer_generation)
            .collect();
        assert_eq!(generations, vec![1, 1, 2]);
    }

    #[test]
    fn test_invalidate_recreates_renderer() {
        let mut backend = spawn();
        let mut queue = backend.graphics_queue();
        let token = backend.render_event_token();

        backend.set_render_targets(Some(handle(1)), Some(handle(2))).expect("targets");
        queue.enqueue_event(token, 1).expect("event");
        backend.invalidate_targets().expect("invalidate");
        queue.enqueue_event(token, 1).expect("event");

        assert_eq!(backend.wait_for_completion(TIMEOUT).map(|c| c.renderer_generation), Some(1));
        assert_eq!(backend.wait_for_completion(TIMEOUT).map(|c| c.renderer_generation), Some(2));
    }

    #[test]
    fn test_events_without_targets_are_skipped() {
        let mut backend = spawn();
        let mut queue = backend.graphics_queue();
        let token = backend.render_event_token();

        queue.enqueue_event(token, 1).expect("event");
        backend.set_render_targets(Some(handle(1)), None).expect("half targets");
        queue.enqueue_event(token, 1).expect("event");
        backend.set_render_targets(Some(handle(1)), Some(handle(2))).expect("targets");
        queue.enqueue_event(token, 7).expect("event");

        let completion = backend.wait_for_completion(TIMEOUT).expect("frame");
        assert_eq!(completion.frame, 1);
        assert_eq!(completion.event_id, 7);
    }

    #[test]
    fn test_foreign_token_is_ignored() {
        let mut backend = spawn();
        let mut queue = backend.graphics_queue();
        let token = backend.render_event_token();

        backend.set_render_targets(Some(handle(1)), Some(handle(2))).expect("targets");
        queue.enqueue_event(RenderEventToken(token.0 + 1000), 1).expect("event");
        queue.enqueue_event(token, 2).expect("event");

        assert_eq!(backend.wait_for_completion(TIMEOUT).map(|c| c.event_id), Some(2));
        assert!(backend.drain_completions().is_empty());
    }

    #[test]
    fn test_failed_renderer_creation_is_not_fatal() {
        let mut attempts = 0;
        let mut backend = ThreadedBackend::spawn(BackendKind::platform_default(), move |_, color, depth| {
            attempts += 1;
            if attempts == 1 {
                Err(BridgeError::Rejected("out of memory".into()))
            } else {
                Ok(Box::new(ConstantBufferRenderer::new(color, depth)) as Box<dyn FrameRenderer>)
            }
        })
        .expect("spawn");
        let mut queue = backend.graphics_queue();
        let token = backend.render_event_token();

        backend.set_render_targets(Some(handle(1)), Some(handle(2))).expect("targets");
        queue.enqueue_event(token, 1).expect("event");
        queue.enqueue_event(token, 2).expect("event");

        let completion = backend.wait_for_completion(TIMEOUT).expect("frame");
        assert_eq!(completion.event_id, 2);
        assert_eq!(completion.renderer_generation, 1);
    }

    struct CountingRenderer {
        rendered: Arc<AtomicUsize>,
    }

    impl FrameRenderer for CountingRenderer {
        fn render(&mut self, _frame: &FrameContext<'_>) -> BackendResult<()> {
            self.rendered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_undrained_completions_are_capped() {
        let rendered = Arc::new(AtomicUsize::new(0));
        let counter = rendered.clone();
        let mut backend = ThreadedBackend::spawn(BackendKind::platform_default(), move |_, _, _| {
            Ok(Box::new(CountingRenderer { rendered: counter.clone() }) as Box<dyn FrameRenderer>)
        })
        .expect("spawn");
        let mut queue = backend.graphics_queue();
        let token = backend.render_event_token();

        const EVENTS: usize = 1000;
        backend.set_render_targets(Some(handle(1)), Some(handle(2))).expect("targets");
        for _ in 0..EVENTS {
            queue.enqueue_event(token, 1).expect("event");
        }

        let deadline = Instant::now() + TIMEOUT;
        while rendered.load(Ordering::SeqCst) < EVENTS {
            assert!(Instant::now() < deadline, "render thread stalled");
            std::thread::sleep(Duration::from_millis(1));
        }

        let buffered = backend.drain_completions();
        assert_eq!(buffered.len(), COMPLETION_CAPACITY);
        // The oldest reports are the ones kept
        assert_eq!(buffered.first().map(|c| c.frame), Some(1));
    }

    #[test]
    fn test_unavailable_backend_fails_at_spawn() {
        let foreign = if cfg!(target_os = "windows") {
            BackendKind::Metal
        } else {
            BackendKind::Direct3D11
        };
        let result = ThreadedBackend::spawn(foreign, |_, color, depth| {
            Ok(Box::new(ConstantBufferRenderer::new(color, depth)) as Box<dyn FrameRenderer>)
        });
        assert!(matches!(result, Err(BridgeError::BackendUnavailable(_))));
    }

    #[test]
    fn test_queue_reports_disconnect_after_drop() {
        let backend = spawn();
        let mut queue = backend.graphics_queue();
        let token = backend.render_event_token();
        drop(backend);

        assert_eq!(queue.enqueue_event(token, 1), Err(BridgeError::Disconnected));
    }

    #[test]
    fn test_constant_buffer_holds_matrix_bytes() {
        let mut renderer = ConstantBufferRenderer::new(handle(1), handle(2));
        let matrix = RowMajorMatrix(std::array::from_fn(|i| i as f32));
        let context = FrameContext {
            kind: BackendKind::OpenGLCore,
            frame: 1,
            world_view_projection: &matrix,
            color: handle(1),
            depth: handle(2),
        };

        renderer.render(&context).expect("render");
        assert_eq!(renderer.constants(), bytemuck::bytes_of(&matrix));

        let wrong_target = FrameContext { color: handle(9), ..context };
        assert!(renderer.render(&wrong_target).is_err());
    }
}
