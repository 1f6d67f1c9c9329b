//! The public player: owns the loaded video item and wires clock advances to render passes.

use std::rc::Rc;
use std::sync::mpsc;

use crate::{
    foundation::{
        core::{FrameIndex, TargetFrame},
        error::PlayerError,
    },
    layout::{
        fit::{ContentMode, FitTransform, fit},
        mask::{MaskDescriptor, compute_mask, mask_changed},
    },
    model::video_item::VideoItem,
    overrides::store::{DynamicOverrideStore, ImageSource, TextInput},
    playback::{
        clock::{ClockPhase, ClockTiming, PlaybackClock, TickOutcome},
        ticker::TickSource,
    },
    player::{
        collab::{
            DisplaySurface, LayerHandle, LoadCompletion, LoadId, LoadReply, LoadSource, Renderer,
            VideoParser,
        },
        config::{FillMode, PlayerConfig},
    },
};

type ErrorHook = Box<dyn FnMut(&PlayerError)>;
type FinishedHook = Box<dyn FnMut()>;
type FrameHook = Box<dyn FnMut(FrameIndex)>;
type PercentageHook = Box<dyn FnMut(f64)>;

#[derive(Clone, Copy, Debug)]
struct PendingLoad {
    id: LoadId,
    autoplay: bool,
}

#[derive(Default)]
struct Hooks {
    error: Option<ErrorHook>,
    finished: Option<FinishedHook>,
    frame: Option<FrameHook>,
    percentage: Option<PercentageHook>,
}

/// Animation playback controller.
///
/// A `Player` is driven cooperatively from a single thread: the host calls [`Player::on_tick`]
/// once per host frame while the player holds a live tick subscription, and calls
/// [`Player::poll_loads`] (or keeps ticking) to apply finished loads.
///
/// Every public operation absorbs its own failures. Load and validation failures are reported
/// through the [`Player::on_error`] hook; geometry failures and out-of-range seeks are logged and
/// otherwise ignored.
pub struct Player<R, S> {
    renderer: R,
    surface: S,
    ticker: Rc<dyn TickSource>,
    config: PlayerConfig,
    clock: PlaybackClock,
    video_item: Option<VideoItem>,
    overrides: DynamicOverrideStore,
    layers: Vec<LayerHandle>,
    transform: Option<FitTransform>,
    mask: Option<MaskDescriptor>,
    load_tx: mpsc::Sender<LoadCompletion>,
    load_rx: mpsc::Receiver<LoadCompletion>,
    next_load_id: u64,
    pending_load: Option<PendingLoad>,
    hooks: Hooks,
}

impl<R: Renderer, S: DisplaySurface> Player<R, S> {
    /// Player with default configuration and nothing loaded.
    pub fn new(renderer: R, surface: S, ticker: Rc<dyn TickSource>) -> Self {
        Self::with_config(renderer, surface, ticker, PlayerConfig::default())
    }

    /// Player with an explicit configuration.
    pub fn with_config(
        renderer: R,
        surface: S,
        ticker: Rc<dyn TickSource>,
        config: PlayerConfig,
    ) -> Self {
        let (load_tx, load_rx) = mpsc::channel();
        let mut clock = PlaybackClock::new();
        clock.set_loops(config.loops);
        Self {
            renderer,
            surface,
            ticker,
            config,
            clock,
            video_item: None,
            overrides: DynamicOverrideStore::new(),
            layers: Vec::new(),
            transform: None,
            mask: None,
            load_tx,
            load_rx,
            next_load_id: 0,
            pending_load: None,
            hooks: Hooks::default(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn video_item(&self) -> Option<&VideoItem> {
        self.video_item.as_ref()
    }

    pub fn overrides(&self) -> &DynamicOverrideStore {
        &self.overrides
    }

    /// Layers built for the current item, in draw order.
    pub fn layers(&self) -> &[LayerHandle] {
        &self.layers
    }

    pub fn current_frame(&self) -> FrameIndex {
        self.clock.current_frame()
    }

    pub fn loop_count(&self) -> u32 {
        self.clock.loop_count()
    }

    pub fn phase(&self) -> ClockPhase {
        self.clock.phase()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Transform applied by the most recent successful render pass.
    pub fn transform(&self) -> Option<FitTransform> {
        self.transform
    }

    /// Clip installed by the most recent render pass.
    pub fn mask(&self) -> Option<MaskDescriptor> {
        self.mask
    }

    /// Load currently awaited by [`Player::poll_loads`], if any.
    pub fn pending_load(&self) -> Option<LoadId> {
        self.pending_load.map(|p| p.id)
    }

    pub fn set_loops(&mut self, loops: u32) {
        self.config.loops = loops;
        self.clock.set_loops(loops);
    }

    pub fn set_clears_after_stop(&mut self, clears: bool) {
        self.config.clears_after_stop = clears;
    }

    pub fn set_fill_mode(&mut self, mode: FillMode) {
        self.config.fill_mode = mode;
    }

    pub fn set_content_mode(&mut self, mode: ContentMode) {
        self.config.content_mode = mode;
        self.render();
    }

    pub fn set_clips_to_bounds(&mut self, clips: bool) {
        self.config.clips_to_bounds = clips;
        self.render();
    }

    pub fn set_frame(&mut self, frame: TargetFrame) {
        self.config.frame = frame;
        self.render();
    }

    /// Hand `source` to `parser`. The result is applied by a later [`Player::poll_loads`].
    ///
    /// Starting a new load supersedes any load still in flight; its result is discarded when it
    /// arrives.
    pub fn load(
        &mut self,
        parser: &dyn VideoParser,
        source: impl Into<LoadSource>,
        autoplay: bool,
    ) -> LoadId {
        self.next_load_id += 1;
        let id = LoadId(self.next_load_id);
        if let Some(prev) = self.pending_load.replace(PendingLoad { id, autoplay }) {
            tracing::debug!(superseded = prev.id.0, load = id.0, "load superseded");
        }
        parser.parse(source.into(), LoadReply::new(id, self.load_tx.clone()));
        id
    }

    /// Apply finished loads. Returns `true` if a new video item was installed.
    pub fn poll_loads(&mut self) -> bool {
        let mut installed = false;
        while let Ok(done) = self.load_rx.try_recv() {
            let Some(pending) = self.pending_load.filter(|p| p.id == done.id) else {
                tracing::debug!(load = done.id.0, "discarding stale load result");
                continue;
            };
            self.pending_load = None;
            match done.result {
                Ok(item) => {
                    tracing::info!(
                        load = done.id.0,
                        frames = item.frame_count,
                        fps = item.fps.as_f64(),
                        sprites = item.sprites.len(),
                        "video item loaded"
                    );
                    if self.install_video_item(item) {
                        installed = true;
                        if pending.autoplay {
                            self.start();
                        }
                    }
                }
                Err(err) => self.emit_error(&err),
            }
        }
        installed
    }

    /// Replace the loaded item, rebuild layers and rewind to frame 0.
    ///
    /// Invalid items are reported through the error hook and leave the player untouched.
    pub fn set_video_item(&mut self, item: VideoItem) {
        if self.install_video_item(item) {
            // An explicit item supersedes any load still in flight.
            self.pending_load = None;
        }
    }

    fn install_video_item(&mut self, item: VideoItem) -> bool {
        if let Err(err) = item.validate() {
            tracing::warn!(error = %err, "rejecting video item");
            self.emit_error(&err);
            return false;
        }
        self.clock.load(Some(ClockTiming {
            frame_count: item.frame_count,
            fps: item.fps,
        }));
        self.video_item = Some(item);
        self.rebuild_layers(false);
        true
    }

    /// Rewind and start playing.
    pub fn start(&mut self) {
        self.surface.set_visible(true);
        self.clock.start(&*self.ticker);
    }

    /// Stop advancing, keeping the current frame.
    pub fn pause(&mut self) {
        self.clock.pause(&*self.ticker);
    }

    /// Stop advancing. `clear = None` follows [`PlayerConfig::clears_after_stop`].
    pub fn stop(&mut self, clear: Option<bool>) {
        self.clock.stop(&*self.ticker);
        if let Some(pending) = self.pending_load.as_mut() {
            pending.autoplay = false;
        }
        if clear.unwrap_or(self.config.clears_after_stop) {
            self.clear();
        }
    }

    /// Hide the surface until the next start or seek.
    pub fn clear(&mut self) {
        self.surface.set_visible(false);
        if self.surface.is_attached() {
            self.surface.request_repaint();
        }
    }

    /// Pause at `frame`, render it, and resume when `and_play` is set.
    ///
    /// Frames outside the loaded item are ignored.
    pub fn seek(&mut self, frame: FrameIndex, and_play: bool) {
        if !self.video_item.as_ref().is_some_and(|v| v.contains(frame)) {
            tracing::debug!(frame = frame.0, "ignoring out-of-range seek");
            return;
        }
        self.surface.set_visible(true);
        match self.clock.seek(&*self.ticker, frame, and_play) {
            Ok(_) => self.render(),
            Err(err) => tracing::debug!(error = %err, "ignoring seek"),
        }
    }

    /// Seek to `floor(fraction * frame_count)`, clamped to the last frame.
    pub fn seek_fraction(&mut self, fraction: f64, and_play: bool) {
        let frame_count = self.video_item.as_ref().map_or(0, |v| v.frame_count);
        match crate::playback::clock::frame_for_fraction(fraction, frame_count) {
            Ok(frame) => self.seek(frame, and_play),
            Err(err) => tracing::debug!(error = %err, "ignoring seek"),
        }
    }

    /// Substitute an image into the layer named `key`.
    ///
    /// A transform that is not exactly six components is dropped; the image is still applied.
    pub fn set_image(
        &mut self,
        key: impl Into<String>,
        image: impl Into<ImageSource>,
        transform: Option<&[f64]>,
    ) {
        let key: String = key.into();
        if let Err(err) = self.overrides.set_image(key.as_str(), image, transform) {
            tracing::warn!(key = %key, error = %err, "dropping image override transform");
        }
        self.rebuild_layers(true);
    }

    /// Substitute text into the layer named `key`.
    pub fn set_text(&mut self, key: impl Into<String>, text: impl Into<TextInput>) {
        self.overrides.set_text(key, text);
        self.rebuild_layers(true);
    }

    /// Forget every image and text override. Takes effect at the next layer rebuild.
    pub fn clear_dynamic_objects(&mut self) {
        self.overrides.clear_all();
    }

    /// Rebuild one layer per sprite in declared order, then render.
    ///
    /// With `preserve_frame` the current frame survives the rebuild; otherwise playback rewinds
    /// to frame 0. No-op when nothing is loaded.
    pub fn rebuild_layers(&mut self, preserve_frame: bool) {
        let Some(item) = self.video_item.as_ref() else {
            return;
        };
        let frame = self.clock.current_frame();

        self.surface.remove_all_layers();
        self.layers.clear();
        for sprite in &item.sprites {
            let layer = self
                .renderer
                .request_layer(sprite, self.overrides.for_layer(&sprite.image_key));
            self.surface.add_layer(layer);
            self.layers.push(layer);
        }

        self.clock.set_current_frame(if preserve_frame {
            frame
        } else {
            FrameIndex::ZERO
        });
        self.render();
    }

    /// Feed one host tick at `now_ms` (host clock, milliseconds).
    pub fn on_tick(&mut self, now_ms: f64) {
        self.poll_loads();
        let Some(sub) = self.clock.subscription() else {
            return;
        };
        if !self.ticker.is_active(sub) {
            return;
        }
        match self.clock.on_tick(&*self.ticker, now_ms) {
            TickOutcome::Idle => {}
            TickOutcome::Advanced {
                frame, percentage, ..
            } => {
                self.render();
                if let Some(hook) = self.hooks.frame.as_mut() {
                    hook(frame);
                }
                if let Some(hook) = self.hooks.percentage.as_mut() {
                    hook(percentage);
                }
            }
            TickOutcome::Finished { loops } => self.finish(loops),
        }
    }

    fn finish(&mut self, loops: u32) {
        tracing::info!(loops, "playback finished");
        // The clock has already unsubscribed itself.
        self.stop(None);
        if !self.config.clears_after_stop && self.config.fill_mode == FillMode::Backward {
            self.seek(FrameIndex::ZERO, false);
        }
        if let Some(hook) = self.hooks.finished.as_mut() {
            hook();
        }
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn render(&mut self) {
        let Some(item) = self.video_item.as_ref() else {
            return;
        };
        let transform = match fit(item.canvas, self.config.frame, self.config.content_mode) {
            Ok(t) => t,
            Err(err) => {
                tracing::debug!(error = %err, "skipping render pass");
                return;
            }
        };
        self.transform = Some(transform);
        self.surface.set_transform(transform.to_affine());

        let mask = compute_mask(self.config.clips_to_bounds, self.config.frame, self.mask);
        if mask_changed(self.mask, mask) {
            self.surface.set_mask(mask);
            self.mask = mask;
        }

        self.renderer.draw_frame(self.clock.current_frame());
        if self.surface.is_attached() {
            self.surface.request_repaint();
        }
    }

    fn emit_error(&mut self, err: &PlayerError) {
        match self.hooks.error.as_mut() {
            Some(hook) => hook(err),
            None => tracing::warn!(error = %err, "unhandled player error"),
        }
    }

    /// Register the error hook. Replaces any previous one.
    pub fn on_error(&mut self, hook: impl FnMut(&PlayerError) + 'static) {
        self.hooks.error = Some(Box::new(hook));
    }

    /// Register the finished hook. Replaces any previous one.
    pub fn on_finished(&mut self, hook: impl FnMut() + 'static) {
        self.hooks.finished = Some(Box::new(hook));
    }

    /// Register the per-frame hook. Replaces any previous one.
    pub fn on_frame(&mut self, hook: impl FnMut(FrameIndex) + 'static) {
        self.hooks.frame = Some(Box::new(hook));
    }

    /// Register the percentage hook. Replaces any previous one.
    pub fn on_percentage(&mut self, hook: impl FnMut(f64) + 'static) {
        self.hooks.percentage = Some(Box::new(hook));
    }
}

impl<R, S> Drop for Player<R, S> {
    fn drop(&mut self) {
        self.clock.stop(&*self.ticker);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/controller.rs"]
mod tests;
