//! Top-level reading session: wires resolution, placement, lookups and
//! playback together behind pointer-level operations.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::audio::{PlaybackController, PlaybackError};
use crate::domain::{LookupState, PlaybackOutcome, Point, Rect};
use crate::popover::{apply_drag, compute_anchor, DragState, PlacementConfig, PopoverAnchor, RenderPosition};
use crate::resolver::{
    resolve_at_point, resolve_from_selection, resolve_with_context, Document, Layout,
    MonospaceLayout, Resolution, SelectionRange,
};
use crate::session::ReadingSettings;

use super::presentation::{Presentation, PresentationSnapshot};
use super::sequencer::{LookupSequencer, LookupSettings};

/// Default popover width in layout units
pub const DEFAULT_POPOVER_WIDTH: f64 = 320.0;

/// Where the popover may be drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Reference container, viewport coordinates
    pub container: Rect,
    pub width: f64,
    pub popover_width: f64,
}

impl Viewport {
    /// A viewport exactly covering `bounds`
    pub fn covering(bounds: Rect) -> Self {
        Self {
            container: bounds,
            width: bounds.right(),
            popover_width: DEFAULT_POPOVER_WIDTH,
        }
    }
}

/// One article open for reading
pub struct Reader<L: Layout = MonospaceLayout> {
    document: Document,
    layout: L,
    sequencer: Arc<LookupSequencer>,
    settings: ReadingSettings,
    placement: PlacementConfig,
    viewport: Viewport,
    current: Option<Resolution>,
    anchor: Option<PopoverAnchor>,
    drag: DragState,
    /// Definition generation the drag offset belongs to
    drag_generation: u64,
}

impl<L: Layout> Reader<L> {
    pub fn new(
        document: Document,
        layout: L,
        sequencer: Arc<LookupSequencer>,
        settings: ReadingSettings,
        placement: PlacementConfig,
    ) -> Self {
        let viewport = Viewport::covering(layout.bounds());
        let reader = Self {
            document,
            layout,
            sequencer,
            settings,
            placement,
            viewport,
            current: None,
            anchor: None,
            drag: DragState::new(),
            drag_generation: 0,
        };
        reader.push_settings();
        reader
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn settings(&self) -> &ReadingSettings {
        &self.settings
    }

    pub fn presentation(&self) -> &Arc<Presentation> {
        self.sequencer.presentation()
    }

    fn playback(&self) -> &Arc<PlaybackController> {
        self.sequencer.playback()
    }

    /// The span and context the popover currently refers to
    pub fn current(&self) -> Option<&Resolution> {
        self.current.as_ref()
    }

    pub fn anchor(&self) -> Option<&PopoverAnchor> {
        self.anchor.as_ref()
    }

    pub fn set_settings(&mut self, settings: ReadingSettings) {
        self.settings = settings;
        self.push_settings();
    }

    fn push_settings(&self) {
        let mut lookup: LookupSettings = self.sequencer.settings();
        lookup.auto_play_count = self.settings.auto_play_count;
        lookup.playback_speed = self.settings.playback_speed;
        self.sequencer.set_settings(lookup);
    }

    /// Look up the word under `point`.
    ///
    /// A click that lands on no word clears the popover and returns `None`.
    pub fn click(&mut self, point: Point) -> Option<JoinHandle<LookupState>> {
        let root = self.document.root();
        match resolve_at_point(&self.document, &self.layout, point, root) {
            Some(span) => {
                let resolution = resolve_with_context(&self.document, span);
                Some(self.submit(resolution, false))
            }
            None => {
                debug!(x = point.x, y = point.y, "Click resolved to nothing");
                self.clear();
                None
            }
        }
    }

    /// Look up a drag-selected phrase verbatim; never auto-played
    pub fn select(&mut self, range: SelectionRange) -> Option<JoinHandle<LookupState>> {
        let root = self.document.root();
        match resolve_from_selection(&self.document, &range, root) {
            Some(span) => {
                let resolution = resolve_with_context(&self.document, span);
                Some(self.submit(resolution, true))
            }
            None => {
                self.clear();
                None
            }
        }
    }

    fn submit(&mut self, resolution: Resolution, is_phrase: bool) -> JoinHandle<LookupState> {
        self.anchor = self.compute_anchor(&resolution);
        let handle = self.sequencer.submit(
            resolution.span.clone(),
            resolution.context.clone(),
            &self.settings.source_language,
            &self.settings.target_language,
            self.settings.detailed,
            is_phrase,
        );
        self.current = Some(resolution);
        handle
    }

    fn compute_anchor(&self, resolution: &Resolution) -> Option<PopoverAnchor> {
        let span_rect = self.layout.span_rect(&resolution.span)?;
        Some(compute_anchor(
            span_rect,
            self.viewport.container,
            self.viewport.width,
            self.viewport.popover_width,
            &self.placement,
        ))
    }

    /// Dismiss the popover and stop audio
    pub fn clear(&mut self) {
        self.presentation().clear();
        self.playback().stop_all();
        self.current = None;
        self.anchor = None;
        self.drag.reset();
    }

    /// Viewport changed; re-anchor without touching the drag offset
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(resolution) = self.current.clone() {
            self.anchor = self.compute_anchor(&resolution);
        }
    }

    /// Where to draw the popover, if anything is shown
    pub fn popover_position(&mut self) -> Option<RenderPosition> {
        self.sync_drag();
        let anchor = self.anchor.as_ref()?;
        Some(apply_drag(anchor, &self.drag, &self.placement))
    }

    /// Drop the drag offset once a newer definition is on screen
    fn sync_drag(&mut self) {
        let shown = self.presentation().snapshot().definition_generation;
        if shown != self.drag_generation {
            self.drag.reset();
            self.drag_generation = shown;
        }
    }

    pub fn begin_drag(&mut self, point: Point, handle: Rect) -> bool {
        self.sync_drag();
        self.drag.begin(point, handle)
    }

    pub fn drag_to(&mut self, point: Point) {
        self.sync_drag();
        self.drag.update(point);
    }

    pub fn end_drag(&mut self) {
        self.drag.end();
    }

    /// Replay the pronunciation of the current span.
    ///
    /// A failure of both speech paths is shown as a warning and also
    /// returned.
    pub async fn play_current(&self) -> Result<PlaybackOutcome, PlaybackError> {
        let Some(resolution) = self.current.as_ref() else {
            return Ok(PlaybackOutcome::Completed);
        };
        let voice = self
            .presentation()
            .snapshot()
            .definition
            .map(|d| d.source_language)
            .unwrap_or_else(|| self.settings.source_language.clone());

        let result = self
            .playback()
            .play(&resolution.span.text, &voice, self.settings.playback_speed)
            .await;
        if let Err(e) = &result {
            warn!(error = %e, "Pronunciation unavailable");
            self.presentation().warn(e.to_string());
        }
        result
    }

    pub fn stop_audio(&self) {
        self.playback().stop_all();
    }

    pub fn snapshot(&self) -> PresentationSnapshot {
        self.presentation().snapshot()
    }
}
