//! Annotation registry
//!
//! Owns the attached surfaces and every marker drawn on them, keyed by
//! (surface, annotation). A key holds at most one marker.

use crate::annotation::error::{RegistryError, RegistryResult};
use crate::annotation::marker::{AnnotationMarker, MarkerState};
use crate::annotation::surface::{LabelStyle, Surface};
use crate::segment::TimeSegment;
use crate::storage::{AnnotationId, AnnotationRecord, TimeSeriesStore};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Identifier issued by [`AnnotationRegistry::attach`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SurfaceId(pub usize);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of [`AnnotationRegistry::sync`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub added: usize,
    pub removed: usize,
    pub kept: usize,
    /// Kept markers drawn again at a new position or binding
    pub redrawn: usize,
}

impl SyncReport {
    /// Nothing was drawn or erased
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.redrawn == 0
    }
}

struct SurfaceSlot {
    surface: Box<dyn Surface>,
    /// Sample times of the displayed segment; moves snap to these
    grid: Vec<f64>,
}

/// Markers across all attached surfaces
#[derive(Default)]
pub struct AnnotationRegistry {
    surfaces: BTreeMap<SurfaceId, SurfaceSlot>,
    markers: BTreeMap<(SurfaceId, AnnotationId), AnnotationMarker>,
    next_surface: usize,
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a surface
    pub fn attach(&mut self, surface: Box<dyn Surface>) -> SurfaceId {
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;

        tracing::info!(surface = %id, name = surface.name(), "Surface attached");
        self.surfaces.insert(
            id,
            SurfaceSlot {
                surface,
                grid: Vec::new(),
            },
        );
        id
    }

    /// Remove every marker of a surface and hand the surface back
    pub fn detach(&mut self, surface: SurfaceId) -> Option<Box<dyn Surface>> {
        self.remove_all_on(surface);
        let slot = self.surfaces.remove(&surface)?;
        tracing::info!(surface = %surface, "Surface detached");
        Some(slot.surface)
    }

    pub fn surface(&self, surface: SurfaceId) -> Option<&dyn Surface> {
        match self.surfaces.get(&surface) {
            Some(slot) => Some(slot.surface.as_ref()),
            None => None,
        }
    }

    pub fn surface_mut(&mut self, surface: SurfaceId) -> Option<&mut dyn Surface> {
        match self.surfaces.get_mut(&surface) {
            Some(slot) => Some(slot.surface.as_mut()),
            None => None,
        }
    }

    /// Attached surfaces in attach order
    pub fn surface_ids(&self) -> Vec<SurfaceId> {
        self.surfaces.keys().copied().collect()
    }

    /// Set the sampling grid used to snap moved markers
    pub fn set_grid(&mut self, surface: SurfaceId, times: Vec<f64>) -> RegistryResult<()> {
        let slot = self
            .surfaces
            .get_mut(&surface)
            .ok_or(RegistryError::UnknownSurface(surface))?;
        slot.grid = times;
        Ok(())
    }

    /// Draw a marker for `record` on `surface`
    ///
    /// Fails with `Duplicate` and changes nothing when the key is taken.
    pub fn add(
        &mut self,
        surface: SurfaceId,
        record: &AnnotationRecord,
        id: AnnotationId,
        show_label: bool,
        style: &LabelStyle,
    ) -> RegistryResult<()> {
        let slot = self
            .surfaces
            .get_mut(&surface)
            .ok_or(RegistryError::UnknownSurface(surface))?;
        if self.markers.contains_key(&(surface, id)) {
            return Err(RegistryError::Duplicate { surface, id });
        }

        let mut marker = AnnotationMarker::new(id, record, show_label, style);
        marker.draw(slot.surface.as_mut());

        tracing::debug!(
            surface = %surface,
            annotation = %id,
            time = marker.time(),
            x = marker.display_x(),
            "Marker added"
        );
        self.markers.insert((surface, id), marker);
        Ok(())
    }

    /// Move a marker to display position `x`
    ///
    /// The new time is the inverse transform of `x`, snapped to the nearest
    /// sample of the surface's grid. Returns the committed time.
    pub fn move_marker(
        &mut self,
        surface: SurfaceId,
        id: AnnotationId,
        x: f64,
    ) -> RegistryResult<f64> {
        if !x.is_finite() {
            return Err(RegistryError::InvalidPosition(x));
        }
        let slot = self
            .surfaces
            .get_mut(&surface)
            .ok_or(RegistryError::UnknownSurface(surface))?;
        let marker = self
            .markers
            .get_mut(&(surface, id))
            .ok_or(RegistryError::NotFound { surface, id })?;

        let raw = slot.surface.display_to_time(x);
        if !raw.is_finite() {
            return Err(RegistryError::InvalidPosition(x));
        }
        let time = snap_to_grid(&slot.grid, raw);
        marker.rebind(slot.surface.as_mut(), time);

        tracing::debug!(
            surface = %surface,
            annotation = %id,
            x,
            time,
            "Marker moved"
        );
        Ok(time)
    }

    /// Remove one marker; returns whether it existed
    pub fn remove(&mut self, surface: SurfaceId, id: AnnotationId) -> bool {
        let Some(mut marker) = self.markers.remove(&(surface, id)) else {
            return false;
        };
        if let Some(slot) = self.surfaces.get_mut(&surface) {
            marker.release(slot.surface.as_mut());
        }
        tracing::debug!(surface = %surface, annotation = %id, "Marker removed");
        true
    }

    /// Remove every marker on one surface
    pub fn remove_all_on(&mut self, surface: SurfaceId) -> usize {
        let ids: Vec<AnnotationId> = self.ids_on(surface);
        ids.into_iter().filter(|&id| self.remove(surface, id)).count()
    }

    /// Remove every marker on every surface
    pub fn remove_all(&mut self) -> usize {
        let keys: Vec<_> = self.markers.keys().copied().collect();
        keys.into_iter()
            .filter(|&(surface, id)| self.remove(surface, id))
            .count()
    }

    /// Reconcile a surface's markers with the visible annotations
    ///
    /// Newly visible annotations get a marker and markers whose annotation
    /// is no longer visible are removed. A kept marker takes the record's
    /// current time and text unless it has an uncommitted move, and is
    /// redrawn only when its binding or its display position changed.
    pub fn sync(
        &mut self,
        surface: SurfaceId,
        visible: &[(AnnotationId, &AnnotationRecord)],
        show_labels: bool,
        style: &LabelStyle,
    ) -> RegistryResult<SyncReport> {
        if !self.surfaces.contains_key(&surface) {
            return Err(RegistryError::UnknownSurface(surface));
        }

        let wanted: HashSet<AnnotationId> = visible.iter().map(|(id, _)| *id).collect();
        let mut report = SyncReport::default();

        for id in self.ids_on(surface) {
            if !wanted.contains(&id) && self.remove(surface, id) {
                report.removed += 1;
            }
        }

        let mut seen = HashSet::with_capacity(visible.len());
        for (id, record) in visible {
            // Same id listed twice in `visible`
            if !seen.insert(*id) {
                continue;
            }
            if let Some(marker) = self.markers.get_mut(&(surface, *id)) {
                report.kept += 1;
                let Some(slot) = self.surfaces.get_mut(&surface) else {
                    continue;
                };
                if marker.follow(record) || marker.is_stale(slot.surface.as_ref()) {
                    marker.redraw(slot.surface.as_mut());
                    report.redrawn += 1;
                }
                continue;
            }
            self.add(surface, record, *id, show_labels, style)?;
            report.added += 1;
        }

        tracing::debug!(
            surface = %surface,
            added = report.added,
            removed = report.removed,
            kept = report.kept,
            redrawn = report.redrawn,
            "Markers synced"
        );
        Ok(report)
    }

    /// Show a segment on a surface
    ///
    /// Retargets the surface at the segment's window, uses its times as the
    /// snapping grid and syncs with its annotations.
    pub fn show_segment(
        &mut self,
        surface: SurfaceId,
        segment: &TimeSegment<'_>,
        show_labels: bool,
        style: &LabelStyle,
    ) -> RegistryResult<SyncReport> {
        let slot = self
            .surfaces
            .get_mut(&surface)
            .ok_or(RegistryError::UnknownSurface(surface))?;
        slot.grid = segment.times().to_vec();
        slot.surface.set_window(segment);
        self.sync(surface, segment.annotations(), show_labels, style)
    }

    /// Add a marker on every attached surface, skipping duplicates
    pub fn add_everywhere(
        &mut self,
        record: &AnnotationRecord,
        id: AnnotationId,
        show_label: bool,
        style: &LabelStyle,
    ) -> usize {
        let mut added = 0;
        for surface in self.surface_ids() {
            if self.add(surface, record, id, show_label, style).is_ok() {
                added += 1;
            }
        }
        added
    }

    /// Remove an annotation's marker from every surface
    pub fn remove_everywhere(&mut self, id: AnnotationId) -> usize {
        self.surface_ids()
            .into_iter()
            .filter(|&surface| self.remove(surface, id))
            .count()
    }

    pub fn marker(&self, surface: SurfaceId, id: AnnotationId) -> Option<&AnnotationMarker> {
        self.markers.get(&(surface, id))
    }

    pub fn contains(&self, surface: SurfaceId, id: AnnotationId) -> bool {
        self.markers.contains_key(&(surface, id))
    }

    /// Markers on one surface, ordered by annotation id
    pub fn markers_on(&self, surface: SurfaceId) -> impl Iterator<Item = &AnnotationMarker> {
        self.markers
            .range((surface, AnnotationId(0))..=(surface, AnnotationId(usize::MAX)))
            .map(|(_, marker)| marker)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Times of markers moved since they were drawn or last committed
    pub fn committed_times(&self, surface: SurfaceId) -> Vec<(AnnotationId, f64)> {
        self.markers_on(surface)
            .filter(|m| m.state() == MarkerState::Moved)
            .map(|m| (m.id(), m.time()))
            .collect()
    }

    /// Write moved marker times into the store's annotation table
    ///
    /// Markers of the same annotations on other surfaces follow the new
    /// times, except those with a move of their own still pending.
    pub fn commit_to_store(
        &mut self,
        surface: SurfaceId,
        store: &mut TimeSeriesStore,
    ) -> RegistryResult<usize> {
        let moved = self.committed_times(surface);
        let mut followed = 0;
        for &(id, time) in &moved {
            store.retime_annotation(id, time)?;
            if let Some(marker) = self.markers.get_mut(&(surface, id)) {
                marker.settle();
            }
            if let Some(record) = store.annotation(id) {
                followed += self.follow_elsewhere(surface, id, record);
            }
        }

        tracing::info!(
            surface = %surface,
            committed = moved.len(),
            followed,
            "Marker times committed"
        );
        Ok(moved.len())
    }

    /// Rebind markers of `id` on every surface but `except` to `record`
    fn follow_elsewhere(
        &mut self,
        except: SurfaceId,
        id: AnnotationId,
        record: &AnnotationRecord,
    ) -> usize {
        let mut updated = 0;
        for (&(surface, marker_id), marker) in self.markers.iter_mut() {
            if marker_id != id || surface == except {
                continue;
            }
            let Some(slot) = self.surfaces.get_mut(&surface) else {
                continue;
            };
            if marker.follow(record) {
                marker.redraw(slot.surface.as_mut());
                updated += 1;
            }
        }
        updated
    }

    fn ids_on(&self, surface: SurfaceId) -> Vec<AnnotationId> {
        self.markers_on(surface).map(|m| m.id()).collect()
    }
}

/// Nearest grid time; ties go to the earlier sample
fn snap_to_grid(grid: &[f64], time: f64) -> f64 {
    if grid.is_empty() {
        return time;
    }
    let i = grid.partition_point(|&t| t < time);
    if i == 0 {
        return grid[0];
    }
    if i == grid.len() {
        return grid[i - 1];
    }
    let (before, after) = (grid[i - 1], grid[i]);
    if time - before <= after - time {
        before
    } else {
        after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::surface::{AxisKind, Handle};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        next: u64,
        live: HashMap<Handle, (f64, f64, Option<String>)>,
        draws: usize,
    }

    /// x = time * 10, values 0..100
    struct TestSurface {
        log: Rc<RefCell<Log>>,
        kind: AxisKind,
    }

    impl TestSurface {
        fn new(kind: AxisKind) -> (Self, Rc<RefCell<Log>>) {
            let log = Rc::new(RefCell::new(Log::default()));
            (
                Self {
                    log: log.clone(),
                    kind,
                },
                log,
            )
        }

        fn issue(&mut self, x: f64, y: f64, text: Option<String>) -> Handle {
            let mut log = self.log.borrow_mut();
            log.next += 1;
            log.draws += 1;
            let handle = Handle(log.next);
            log.live.insert(handle, (x, y, text));
            handle
        }
    }

    impl Surface for TestSurface {
        fn draw_vertical_marker(&mut self, x: f64) -> Handle {
            self.issue(x, 0.0, None)
        }

        fn draw_text(&mut self, x: f64, y: f64, text: &str, _style: &LabelStyle) -> Handle {
            self.issue(x, y, Some(text.to_string()))
        }

        fn remove(&mut self, handle: Handle) {
            self.log.borrow_mut().live.remove(&handle);
        }

        fn time_to_display(&self, time: f64) -> f64 {
            time * 10.0
        }

        fn display_to_time(&self, x: f64) -> f64 {
            x / 10.0
        }

        fn visible_value_range(&self) -> (f64, f64) {
            (0.0, 100.0)
        }

        fn axis_kind(&self) -> AxisKind {
            self.kind
        }
    }

    fn record(time: f64, text: &str) -> AnnotationRecord {
        AnnotationRecord::new(time, text)
    }

    fn setup() -> (AnnotationRegistry, SurfaceId, Rc<RefCell<Log>>) {
        let mut registry = AnnotationRegistry::new();
        let (surface, log) = TestSurface::new(AxisKind::Value);
        let id = registry.attach(Box::new(surface));
        (registry, id, log)
    }

    #[test]
    fn test_add_draws_marker_and_label() {
        let (mut registry, surface, log) = setup();
        let style = LabelStyle::default();

        registry
            .add(surface, &record(1.5, "Bolus"), AnnotationId(0), true, &style)
            .unwrap();

        let marker = registry.marker(surface, AnnotationId(0)).unwrap();
        assert_eq!(marker.display_x(), 15.0);
        assert_eq!(marker.state(), MarkerState::Positioned);
        let label = marker.label().unwrap();
        assert_eq!((label.x, label.y), (21.0, 75.0));
        assert_eq!(log.borrow().live.len(), 2);
    }

    #[test]
    fn test_duplicate_add_changes_nothing() {
        let (mut registry, surface, log) = setup();
        let style = LabelStyle::default();
        let r = record(1.0, "A");

        registry.add(surface, &r, AnnotationId(3), false, &style).unwrap();
        let err = registry
            .add(surface, &r, AnnotationId(3), true, &style)
            .unwrap_err();

        assert!(err.is_duplicate());
        assert_eq!(registry.len(), 1);
        assert_eq!(log.borrow().live.len(), 1);
        assert_eq!(log.borrow().draws, 1);
        assert!(registry.marker(surface, AnnotationId(3)).unwrap().label().is_none());
    }

    #[test]
    fn test_unknown_surface() {
        let mut registry = AnnotationRegistry::new();
        let err = registry
            .add(
                SurfaceId(7),
                &record(1.0, "A"),
                AnnotationId(0),
                false,
                &LabelStyle::default(),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownSurface(SurfaceId(7))));
    }

    #[test]
    fn test_move_snaps_to_grid_and_is_stable() {
        let (mut registry, surface, log) = setup();
        registry
            .add(
                surface,
                &record(1.0, "A"),
                AnnotationId(0),
                true,
                &LabelStyle::default(),
            )
            .unwrap();
        registry
            .set_grid(surface, vec![1.0, 1.01, 1.02, 1.03])
            .unwrap();

        let first = registry.move_marker(surface, AnnotationId(0), 10.14).unwrap();
        assert_eq!(first, 1.01);
        for _ in 0..5 {
            let again = registry.move_marker(surface, AnnotationId(0), 10.14).unwrap();
            assert_eq!(again, first);
        }

        let marker = registry.marker(surface, AnnotationId(0)).unwrap();
        assert_eq!(marker.time(), 1.01);
        assert_eq!(marker.display_x(), 1.01 * 10.0);
        assert_eq!(marker.state(), MarkerState::Moved);
        assert_eq!(log.borrow().live.len(), 2);
    }

    #[test]
    fn test_move_without_grid_uses_inverse_transform() {
        let (mut registry, surface, _log) = setup();
        registry
            .add(
                surface,
                &record(1.0, "A"),
                AnnotationId(0),
                false,
                &LabelStyle::default(),
            )
            .unwrap();

        assert_eq!(
            registry.move_marker(surface, AnnotationId(0), 25.0).unwrap(),
            2.5
        );
        assert!(matches!(
            registry.move_marker(surface, AnnotationId(1), 25.0),
            Err(RegistryError::NotFound { .. })
        ));
        assert!(matches!(
            registry.move_marker(surface, AnnotationId(0), f64::NAN),
            Err(RegistryError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (mut registry, surface, log) = setup();
        let style = LabelStyle::default();
        registry
            .add(surface, &record(1.0, "A"), AnnotationId(0), true, &style)
            .unwrap();
        registry
            .add(surface, &record(2.0, "B"), AnnotationId(1), true, &style)
            .unwrap();

        assert!(registry.remove(surface, AnnotationId(0)));
        assert!(!registry.remove(surface, AnnotationId(0)));
        assert_eq!(log.borrow().live.len(), 2);

        assert_eq!(registry.remove_all_on(surface), 1);
        assert_eq!(registry.remove_all_on(surface), 0);
        assert_eq!(registry.remove_all(), 0);
        assert!(log.borrow().live.is_empty());
    }

    #[test]
    fn test_remove_all_across_surfaces() {
        let (mut registry, first, first_log) = setup();
        let (other, other_log) = TestSurface::new(AxisKind::Categorical);
        let second = registry.attach(Box::new(other));
        let r = record(1.0, "A");

        assert_eq!(
            registry.add_everywhere(&r, AnnotationId(0), true, &LabelStyle::default()),
            2
        );
        assert_eq!(
            registry.add_everywhere(&r, AnnotationId(0), true, &LabelStyle::default()),
            0
        );
        assert!(registry.contains(first, AnnotationId(0)));
        assert!(registry.contains(second, AnnotationId(0)));

        assert_eq!(registry.remove_all(), 2);
        assert!(registry.is_empty());
        assert!(first_log.borrow().live.is_empty());
        assert!(other_log.borrow().live.is_empty());
    }

    #[test]
    fn test_remove_everywhere() {
        let (mut registry, _first, _) = setup();
        let (other, _) = TestSurface::new(AxisKind::Value);
        registry.attach(Box::new(other));
        let style = LabelStyle::default();

        registry.add_everywhere(&record(1.0, "A"), AnnotationId(0), false, &style);
        registry.add_everywhere(&record(2.0, "B"), AnnotationId(1), false, &style);

        assert_eq!(registry.remove_everywhere(AnnotationId(0)), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_sync_adds_removes_and_keeps() {
        let (mut registry, surface, log) = setup();
        let style = LabelStyle::default();
        let a = record(1.0, "A");
        let b = record(2.0, "B");
        let c = record(3.0, "C");

        let report = registry
            .sync(
                surface,
                &[(AnnotationId(0), &a), (AnnotationId(1), &b)],
                false,
                &style,
            )
            .unwrap();
        assert_eq!(
            report,
            SyncReport {
                added: 2,
                removed: 0,
                kept: 0,
                redrawn: 0
            }
        );

        let before = registry.marker(surface, AnnotationId(1)).unwrap().handles();
        let report = registry
            .sync(
                surface,
                &[(AnnotationId(1), &b), (AnnotationId(2), &c)],
                false,
                &style,
            )
            .unwrap();
        assert_eq!(
            report,
            SyncReport {
                added: 1,
                removed: 1,
                kept: 1,
                redrawn: 0
            }
        );
        assert_eq!(
            registry.marker(surface, AnnotationId(1)).unwrap().handles(),
            before
        );
        assert!(!registry.contains(surface, AnnotationId(0)));
        assert_eq!(log.borrow().live.len(), 2);
    }

    #[test]
    fn test_sync_twice_is_noop() {
        let (mut registry, surface, log) = setup();
        let style = LabelStyle::default();
        let a = record(1.0, "A");
        let visible = [(AnnotationId(0), &a)];

        registry.sync(surface, &visible, true, &style).unwrap();
        let draws = log.borrow().draws;
        let report = registry.sync(surface, &visible, true, &style).unwrap();

        assert!(report.is_noop());
        assert_eq!(report.kept, 1);
        assert_eq!(log.borrow().draws, draws);
    }

    #[test]
    fn test_sync_follows_changed_record() {
        let (mut registry, surface, log) = setup();
        let style = LabelStyle::default();
        let a = record(1.0, "A");
        registry
            .sync(surface, &[(AnnotationId(0), &a)], true, &style)
            .unwrap();

        let renamed = record(2.0, "A2");
        let report = registry
            .sync(surface, &[(AnnotationId(0), &renamed)], true, &style)
            .unwrap();
        assert_eq!(report.kept, 1);
        assert_eq!(report.redrawn, 1);

        let marker = registry.marker(surface, AnnotationId(0)).unwrap();
        assert_eq!(marker.time(), 2.0);
        assert_eq!(marker.text(), "A2");
        assert_eq!(marker.display_x(), 20.0);
        assert_eq!(marker.state(), MarkerState::Positioned);
        assert_eq!(log.borrow().live.len(), 2);
    }

    #[test]
    fn test_sync_keeps_pending_move() {
        let (mut registry, surface, _log) = setup();
        let style = LabelStyle::default();
        let a = record(1.0, "A");
        registry
            .sync(surface, &[(AnnotationId(0), &a)], false, &style)
            .unwrap();
        registry.move_marker(surface, AnnotationId(0), 30.0).unwrap();

        let report = registry
            .sync(surface, &[(AnnotationId(0), &a)], false, &style)
            .unwrap();
        assert!(report.is_noop());
        assert_eq!(registry.marker(surface, AnnotationId(0)).unwrap().time(), 3.0);
    }

    #[test]
    fn test_commit_moves_markers_on_other_surfaces() {
        let mut store = TimeSeriesStore::default();
        store
            .import_text("Time\t1\n1.0\t0\n1.1\t0\n1.2\t0\nAnnotations:\n1.0\tA\n1.2\tB\n")
            .unwrap();
        let style = LabelStyle::default();
        let sensors = crate::segment::parse_sensors(&[1]).unwrap();

        let (mut registry, a, _) = setup();
        let (surface, log_b) = TestSurface::new(AxisKind::Categorical);
        let b = registry.attach(Box::new(surface));
        {
            let segment = crate::segment::Segmenter::new(&store)
                .get_segment((0.0, 5.0), &sensors)
                .unwrap();
            registry.show_segment(a, &segment, false, &style).unwrap();
            registry.show_segment(b, &segment, false, &style).unwrap();
        }

        registry.move_marker(a, AnnotationId(0), 11.2).unwrap();
        registry.commit_to_store(a, &mut store).unwrap();

        let marker = registry.marker(b, AnnotationId(0)).unwrap();
        assert_eq!(marker.time(), 1.1);
        assert_eq!(marker.state(), MarkerState::Positioned);
        let line = marker.handles()[0];
        let (x, _, _) = log_b.borrow().live[&line].clone();
        assert!((x - 11.0).abs() < 1e-9);
        assert_eq!(log_b.borrow().live.len(), 2);

        // Showing the segment again finds everything in place
        let segment = crate::segment::Segmenter::new(&store)
            .get_segment((0.0, 5.0), &sensors)
            .unwrap();
        let report = registry.show_segment(b, &segment, false, &style).unwrap();
        assert!(report.is_noop());
        assert_eq!(report.kept, 2);
    }

    #[test]
    fn test_sync_repeated_id_added_once() {
        let (mut registry, surface, _log) = setup();
        let style = LabelStyle::default();
        let a = record(1.0, "A");
        let visible = [(AnnotationId(0), &a), (AnnotationId(0), &a)];

        let report = registry.sync(surface, &visible, false, &style).unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(report.kept, 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_detach_releases_markers() {
        let (mut registry, surface, log) = setup();
        registry
            .add(
                surface,
                &record(1.0, "A"),
                AnnotationId(0),
                true,
                &LabelStyle::default(),
            )
            .unwrap();

        assert!(registry.detach(surface).is_some());
        assert!(registry.detach(surface).is_none());
        assert!(registry.is_empty());
        assert!(log.borrow().live.is_empty());
        assert!(registry.surface(surface).is_none());
    }

    #[test]
    fn test_commit_to_store() {
        let mut store = TimeSeriesStore::default();
        store
            .import_text("Time\t1\n1.0\t0\n1.1\t0\n1.2\t0\nAnnotations:\n1.0\tA\n1.2\tB\n")
            .unwrap();

        let (mut registry, surface, _) = setup();
        {
            let segment = crate::segment::Segmenter::new(&store)
                .get_segment((0.0, 5.0), &crate::segment::parse_sensors(&[1]).unwrap())
                .unwrap();
            registry
                .show_segment(surface, &segment, false, &LabelStyle::default())
                .unwrap();
        }
        assert_eq!(registry.len(), 2);

        let time = registry.move_marker(surface, AnnotationId(0), 11.2).unwrap();
        assert_eq!(time, 1.1);
        assert_eq!(registry.committed_times(surface), vec![(AnnotationId(0), 1.1)]);

        assert_eq!(registry.commit_to_store(surface, &mut store).unwrap(), 1);
        assert_eq!(store.annotation(AnnotationId(0)).unwrap().time, 1.1);
        assert!(registry.committed_times(surface).is_empty());
    }

    #[test]
    fn test_snap_to_grid() {
        let grid = [0.0, 1.0, 2.0];
        assert_eq!(snap_to_grid(&grid, -5.0), 0.0);
        assert_eq!(snap_to_grid(&grid, 0.4), 0.0);
        assert_eq!(snap_to_grid(&grid, 0.5), 0.0);
        assert_eq!(snap_to_grid(&grid, 0.6), 1.0);
        assert_eq!(snap_to_grid(&grid, 9.0), 2.0);
        assert_eq!(snap_to_grid(&[], 0.37), 0.37);
    }
}
