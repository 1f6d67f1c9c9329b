use super::*;
use std::cell::RefCell;

use crate::{
    foundation::core::{Affine, Size},
    model::video_item::SpriteDescriptor,
    overrides::store::{LayerOverrides, TextStyle},
    playback::ticker::SharedTicker,
};

#[derive(Default)]
struct RecRenderer {
    next: u64,
    requested: Vec<(String, Option<TextStyle>, Option<ImageSource>)>,
    draws: Vec<FrameIndex>,
}

impl Renderer for RecRenderer {
    fn request_layer(
        &mut self,
        sprite: &SpriteDescriptor,
        overrides: LayerOverrides<'_>,
    ) -> LayerHandle {
        self.next += 1;
        self.requested.push((
            sprite.image_key.clone(),
            overrides.text.cloned(),
            overrides.image.cloned(),
        ));
        LayerHandle(self.next)
    }

    fn draw_frame(&mut self, frame: FrameIndex) {
        self.draws.push(frame);
    }
}

#[derive(Default)]
struct RecSurface {
    visible: bool,
    layers: Vec<LayerHandle>,
    transform: Option<Affine>,
    masks: Vec<Option<MaskDescriptor>>,
    repaints: usize,
}

impl DisplaySurface for RecSurface {
    fn remove_all_layers(&mut self) {
        self.layers.clear();
    }

    fn add_layer(&mut self, layer: LayerHandle) {
        self.layers.push(layer);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = Some(transform);
    }

    fn set_mask(&mut self, mask: Option<MaskDescriptor>) {
        self.masks.push(mask);
    }

    fn request_repaint(&mut self) {
        self.repaints += 1;
    }
}

/// Holds replies until the test releases them.
#[derive(Default)]
struct DeferredParser {
    replies: RefCell<Vec<LoadReply>>,
}

impl VideoParser for DeferredParser {
    fn parse(&self, _source: LoadSource, reply: LoadReply) {
        self.replies.borrow_mut().push(reply);
    }
}

impl DeferredParser {
    fn take(&self, idx: usize) -> LoadReply {
        self.replies.borrow_mut().remove(idx)
    }
}

type TestPlayer = Player<RecRenderer, RecSurface>;

fn item(frame_count: u32, keys: &[&str]) -> VideoItem {
    VideoItem::new(
        Size::new(100.0, 100.0),
        10.0,
        frame_count,
        keys.iter()
            .map(|k| SpriteDescriptor {
                image_key: (*k).to_owned(),
                ..SpriteDescriptor::default()
            })
            .collect(),
    )
    .unwrap()
}

fn player() -> (TestPlayer, Rc<SharedTicker>) {
    let ticker = Rc::new(SharedTicker::new());
    let p = Player::new(RecRenderer::default(), RecSurface::default(), ticker.clone());
    (p, ticker)
}

/// Ticks 100 ms apart starting at `from`; every one is due at 10 fps.
fn tick_n(p: &mut TestPlayer, from: u32, n: u32) {
    for i in from..from + n {
        p.on_tick(f64::from(i) * 100.0);
    }
}

#[test]
fn set_video_item_builds_layers_in_order_and_renders_frame_zero() {
    let (mut p, _t) = player();
    p.set_video_item(item(5, &["bg", "mid", "top"]));

    let keys: Vec<_> = p.renderer().requested.iter().map(|r| r.0.as_str()).collect();
    assert_eq!(keys, vec!["bg", "mid", "top"]);
    assert_eq!(p.surface().layers, p.layers().to_vec());
    assert_eq!(p.layers().len(), 3);
    assert_eq!(p.renderer().draws, vec![FrameIndex(0)]);
    // Zero-size default frame: identity scale at the origin.
    assert_eq!(p.transform(), Some(FitTransform::IDENTITY));
    assert_eq!(p.surface().transform, Some(Affine::IDENTITY));
}

#[test]
fn render_pass_is_noop_without_item() {
    let (mut p, _t) = player();
    p.set_frame(TargetFrame::new(0.0, 0.0, 200.0, 100.0));
    p.set_clips_to_bounds(true);
    assert!(p.renderer().draws.is_empty());
    assert_eq!(p.transform(), None);
    assert!(p.surface().masks.is_empty());
}

#[test]
fn ticks_render_and_notify() {
    let (mut p, _t) = player();
    p.set_video_item(item(4, &["a"]));
    let frames = Rc::new(RefCell::new(Vec::new()));
    let pcts = Rc::new(RefCell::new(Vec::new()));
    {
        let frames = frames.clone();
        p.on_frame(move |f| frames.borrow_mut().push(f.0));
    }
    {
        let pcts = pcts.clone();
        p.on_percentage(move |v| pcts.borrow_mut().push(v));
    }

    p.start();
    assert!(p.surface().visible);
    tick_n(&mut p, 0, 5);

    assert_eq!(*frames.borrow(), vec![1, 2, 3, 0, 1]);
    assert_eq!(*pcts.borrow(), vec![0.5, 0.75, 1.0, 0.25, 0.5]);
    assert_eq!(p.loop_count(), 1);
    assert_eq!(&p.renderer().draws[1..], &[1, 2, 3, 0, 1].map(FrameIndex));
}

#[test]
fn ticks_are_ignored_when_not_subscribed() {
    let (mut p, t) = player();
    p.set_video_item(item(4, &["a"]));
    tick_n(&mut p, 0, 3);
    assert_eq!(p.current_frame(), FrameIndex(0));

    p.start();
    // Host dropped the listener behind the player's back.
    t.unsubscribe(p.clock.subscription().unwrap());
    tick_n(&mut p, 0, 3);
    assert_eq!(p.current_frame(), FrameIndex(0));
}

#[test]
fn finite_loops_fire_finished_once_and_clear() {
    let (mut p, t) = player();
    p.set_loops(2);
    p.set_video_item(item(3, &["a"]));
    let finished = Rc::new(RefCell::new(0));
    let frames = Rc::new(RefCell::new(0));
    {
        let finished = finished.clone();
        p.on_finished(move || *finished.borrow_mut() += 1);
    }
    {
        let frames = frames.clone();
        p.on_frame(move |_| *frames.borrow_mut() += 1);
    }

    p.start();
    tick_n(&mut p, 0, 12);

    assert_eq!(*finished.borrow(), 1);
    // The terminating advance does not report a frame.
    assert_eq!(*frames.borrow(), 5);
    assert!(!p.is_playing());
    assert!(!p.surface().visible);
    assert_eq!(t.listener_count(), 0);
}

#[test]
fn backward_fill_rewinds_to_first_frame_when_not_clearing() {
    let (mut p, _t) = player();
    p.set_loops(1);
    p.set_clears_after_stop(false);
    p.set_fill_mode(FillMode::Backward);
    p.set_video_item(item(3, &["a"]));
    p.start();
    tick_n(&mut p, 0, 3);

    assert!(!p.is_playing());
    assert!(p.surface().visible);
    assert_eq!(p.current_frame(), FrameIndex(0));
    assert_eq!(p.renderer().draws.last(), Some(&FrameIndex(0)));
    assert_eq!(p.phase(), ClockPhase::Paused);
}

#[test]
fn forward_fill_without_clear_keeps_surface_visible() {
    let (mut p, _t) = player();
    p.set_loops(1);
    p.set_clears_after_stop(false);
    p.set_video_item(item(3, &["a"]));
    p.start();
    tick_n(&mut p, 0, 3);
    assert!(p.surface().visible);
    assert_eq!(p.phase(), ClockPhase::Stopped);
}

#[test]
fn stop_respects_explicit_and_default_clear() {
    let (mut p, _t) = player();
    p.set_video_item(item(3, &["a"]));
    p.start();
    p.stop(Some(false));
    assert!(p.surface().visible);
    p.start();
    p.stop(None);
    assert!(!p.surface().visible);

    p.set_clears_after_stop(false);
    p.start();
    p.stop(None);
    assert!(p.surface().visible);
}

#[test]
fn seek_is_idempotent_and_ignores_out_of_range() {
    let (mut p, _t) = player();
    p.set_frame(TargetFrame::new(0.0, 0.0, 200.0, 100.0));
    p.set_clips_to_bounds(true);
    p.set_video_item(item(10, &["a"]));

    p.seek(FrameIndex(4), false);
    let (t1, m1) = (p.transform(), p.mask());
    let masks_after_first = p.surface().masks.len();
    p.seek(FrameIndex(4), false);
    assert_eq!(p.transform(), t1);
    assert_eq!(p.mask(), m1);
    assert_eq!(p.surface().masks.len(), masks_after_first);
    assert_eq!(p.current_frame(), FrameIndex(4));

    let draws = p.renderer().draws.len();
    p.seek(FrameIndex(10), false);
    assert_eq!(p.current_frame(), FrameIndex(4));
    assert_eq!(p.renderer().draws.len(), draws);
}

#[test]
fn seek_fraction_scenarios() {
    let (mut p, _t) = player();
    p.set_video_item(item(10, &["a"]));
    p.seek_fraction(0.55, false);
    assert_eq!(p.current_frame(), FrameIndex(5));
    p.seek_fraction(1.0, false);
    assert_eq!(p.current_frame(), FrameIndex(9));
    p.seek_fraction(-1.0, false);
    assert_eq!(p.current_frame(), FrameIndex(9));
}

#[test]
fn seek_and_play_resumes_from_target() {
    let (mut p, t) = player();
    p.set_video_item(item(10, &["a"]));
    p.stop(Some(true));
    assert!(!p.surface().visible);

    p.seek(FrameIndex(7), true);
    assert!(p.surface().visible);
    assert!(p.is_playing());
    assert_eq!(t.listener_count(), 1);
    tick_n(&mut p, 0, 1);
    assert_eq!(p.current_frame(), FrameIndex(8));
}

#[test]
fn aspect_fit_transform_reaches_surface() {
    let (mut p, _t) = player();
    p.set_video_item(item(10, &["a"]));
    p.set_frame(TargetFrame::new(0.0, 0.0, 200.0, 100.0));
    let t = p.transform().unwrap();
    assert_eq!((t.scale_x, t.scale_y), (1.0, 1.0));
    assert_eq!((t.translate_x, t.translate_y), (50.0, 0.0));
    assert_eq!(p.surface().transform, Some(t.to_affine()));

    p.set_content_mode(ContentMode::AspectFill);
    let t = p.transform().unwrap();
    assert_eq!((t.scale_x, t.translate_y), (2.0, -50.0));
}

#[test]
fn mask_is_installed_once_per_size_and_removed_when_disabled() {
    let (mut p, _t) = player();
    p.set_video_item(item(10, &["a"]));
    p.set_frame(TargetFrame::new(0.0, 0.0, 200.0, 100.0));
    p.set_clips_to_bounds(true);
    p.seek(FrameIndex(1), false);
    p.seek(FrameIndex(2), false);
    p.set_frame(TargetFrame::new(50.0, 50.0, 200.0, 100.0));
    assert_eq!(
        p.surface().masks,
        vec![Some(MaskDescriptor {
            width: 200.0,
            height: 100.0
        })]
    );

    p.set_frame(TargetFrame::new(0.0, 0.0, 300.0, 100.0));
    p.set_clips_to_bounds(false);
    assert_eq!(p.surface().masks.len(), 3);
    assert_eq!(p.surface().masks[2], None);
    assert_eq!(p.mask(), None);
}

#[test]
fn text_override_rebuilds_layers_and_keeps_frame() {
    let (mut p, _t) = player();
    p.set_video_item(item(10, &["bg", "title"]));
    p.seek(FrameIndex(6), false);

    p.set_text("title", "Hello");
    assert_eq!(p.current_frame(), FrameIndex(6));
    assert_eq!(p.renderer().draws.last(), Some(&FrameIndex(6)));

    let rebuilt = &p.renderer().requested[2..];
    assert_eq!(rebuilt.len(), 2);
    assert_eq!(rebuilt[0].1, None);
    let style = rebuilt[1].1.as_ref().unwrap();
    assert_eq!(style.text, "Hello");
    assert_eq!(style.size, "14px");
    assert_eq!(style.family, "");
    assert_eq!(style.color, "#000000");
    assert_eq!(style.offset, crate::Vec2::ZERO);

    // Overrides survive a later rebuild.
    p.rebuild_layers(true);
    assert!(p.renderer().requested.last().unwrap().1.is_some());
}

#[test]
fn image_override_with_bad_transform_still_applies_image() {
    let (mut p, _t) = player();
    p.set_video_item(item(10, &["avatar"]));
    p.set_image("avatar", "face.png", Some(&[1.0, 2.0, 3.0][..]));
    let last = p.renderer().requested.last().unwrap();
    assert_eq!(last.2, Some(ImageSource::from("face.png")));
    assert_eq!(p.overrides().image_transform("avatar"), None);
}

#[test]
fn overrides_before_load_apply_at_first_build() {
    let (mut p, _t) = player();
    p.set_text("title", "Hi");
    assert!(p.renderer().requested.is_empty());
    p.set_video_item(item(10, &["title"]));
    assert_eq!(p.renderer().requested[0].1.as_ref().unwrap().text, "Hi");

    p.clear_dynamic_objects();
    p.rebuild_layers(true);
    assert!(p.renderer().requested.last().unwrap().1.is_none());
}

#[test]
fn load_success_installs_and_autoplays() {
    let (mut p, _t) = player();
    let parser = DeferredParser::default();
    let id = p.load(&parser, "a.svga", true);
    assert_eq!(p.pending_load(), Some(id));
    assert!(!p.poll_loads());

    parser.take(0).succeed(item(8, &["a"]));
    assert!(p.poll_loads());
    assert!(p.is_playing());
    assert_eq!(p.video_item().unwrap().frame_count, 8);
    assert_eq!(p.pending_load(), None);
}

#[test]
fn load_without_autoplay_stays_stopped() {
    let (mut p, _t) = player();
    let parser = DeferredParser::default();
    p.load(&parser, "a.svga", false);
    parser.take(0).succeed(item(8, &["a"]));
    p.poll_loads();
    assert!(p.video_item().is_some());
    assert!(!p.is_playing());
}

#[test]
fn load_failure_reports_error_and_mutates_nothing() {
    let (mut p, _t) = player();
    p.set_video_item(item(4, &["a"]));
    let errors = Rc::new(RefCell::new(Vec::new()));
    {
        let errors = errors.clone();
        p.on_error(move |e| errors.borrow_mut().push(e.to_string()));
    }
    let parser = DeferredParser::default();
    p.load(&parser, "broken.svga", true);
    parser.take(0).fail(PlayerError::parse("bad magic"));
    assert!(!p.poll_loads());

    assert_eq!(*errors.borrow(), vec!["parse error: bad magic".to_owned()]);
    assert_eq!(p.video_item().unwrap().frame_count, 4);
    assert!(!p.is_playing());
}

#[test]
fn superseded_load_result_is_discarded() {
    let (mut p, _t) = player();
    let parser = DeferredParser::default();
    p.load(&parser, "old.svga", true);
    p.load(&parser, "new.svga", true);

    // Old result arrives late, after the new one.
    parser.take(1).succeed(item(5, &["new"]));
    parser.take(0).succeed(item(9, &["old"]));
    p.poll_loads();
    assert_eq!(p.video_item().unwrap().frame_count, 5);

    // And again on its own.
    let (mut p, _t) = player();
    let parser = DeferredParser::default();
    p.load(&parser, "old.svga", true);
    p.load(&parser, "new.svga", true);
    parser.take(0).succeed(item(9, &["old"]));
    p.poll_loads();
    assert!(p.video_item().is_none());
}

#[test]
fn explicit_item_supersedes_pending_load() {
    let (mut p, _t) = player();
    let parser = DeferredParser::default();
    p.load(&parser, "a.svga", true);
    p.set_video_item(item(7, &["explicit"]));

    parser.take(0).succeed(item(3, &["late"]));
    p.on_tick(0.0);
    assert_eq!(p.video_item().unwrap().frame_count, 7);
    assert!(!p.is_playing());
}

#[test]
fn stop_cancels_autoplay_of_pending_load() {
    let (mut p, _t) = player();
    let parser = DeferredParser::default();
    p.load(&parser, "a.svga", true);
    p.stop(None);
    parser.take(0).succeed(item(5, &["a"]));
    p.on_tick(0.0);
    assert!(p.video_item().is_some());
    assert!(!p.is_playing());
}

#[test]
fn invalid_item_goes_to_error_hook() {
    let (mut p, _t) = player();
    let seen = Rc::new(RefCell::new(0));
    {
        let seen = seen.clone();
        p.on_error(move |_| *seen.borrow_mut() += 1);
    }
    let mut bad = item(4, &["a"]);
    bad.frame_count = 0;
    p.set_video_item(bad);
    assert_eq!(*seen.borrow(), 1);
    assert!(p.video_item().is_none());
}

#[test]
fn zero_canvas_skips_render_silently() {
    let (mut p, _t) = player();
    let mut it = item(4, &["a"]);
    it.canvas = Size::new(0.0, 100.0);
    p.set_video_item(it);
    assert!(p.renderer().draws.is_empty());
    assert_eq!(p.transform(), None);
    assert_eq!(p.layers().len(), 1);
}

#[test]
fn last_registered_hook_wins() {
    let (mut p, _t) = player();
    p.set_video_item(item(4, &["a"]));
    let first = Rc::new(RefCell::new(0));
    let second = Rc::new(RefCell::new(0));
    {
        let first = first.clone();
        p.on_frame(move |_| *first.borrow_mut() += 1);
    }
    {
        let second = second.clone();
        p.on_frame(move |_| *second.borrow_mut() += 1);
    }
    p.start();
    tick_n(&mut p, 0, 2);
    assert_eq!(*first.borrow(), 0);
    assert_eq!(*second.borrow(), 2);
}

#[test]
fn drop_releases_tick_subscription() {
    let (mut p, t) = player();
    p.set_video_item(item(4, &["a"]));
    p.start();
    assert_eq!(t.listener_count(), 1);
    drop(p);
    assert_eq!(t.listener_count(), 0);
}
