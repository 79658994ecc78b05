//! Component tagging: which logical part each triangle belongs to.
//!
//! Multi-material serializers group triangles by tag into separately colored
//! objects. The map is append-only while a builder runs and is read-only
//! afterwards.

use std::ops::Range;

use crate::types::VertexColor;

/// Semantic tag for a run of mesh triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentTag {
    /// Base plate geometry.
    Base,
    /// A raised QR module.
    QrModule,
    /// Border frame geometry.
    Frame,
    /// Vertical wall between height tiers (surface strategy only).
    Wall,
    /// Keychain mount tab.
    Mount,
}

impl std::fmt::Display for ComponentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ComponentTag::Base => "base",
            ComponentTag::QrModule => "qr-module",
            ComponentTag::Frame => "frame",
            ComponentTag::Wall => "wall",
            ComponentTag::Mount => "mount",
        };
        write!(f, "{}", name)
    }
}

/// Maps contiguous triangle index ranges to component tags.
///
/// Spans are recorded in ascending, non-overlapping order as builders emit
/// geometry; each recorded span is kept verbatim (one span per emitted
/// object), so a serializer can also use span boundaries as object
/// boundaries.
#[derive(Debug, Clone, Default)]
pub struct TriangleComponentMap {
    spans: Vec<(Range<usize>, ComponentTag)>,
}

impl TriangleComponentMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a triangle range as belonging to `tag`. Empty ranges are ignored.
    pub fn record(&mut self, tag: ComponentTag, triangles: Range<usize>) {
        if triangles.is_empty() {
            return;
        }
        debug_assert!(
            self.spans
                .last()
                .map_or(true, |(prev, _)| prev.end <= triangles.start),
            "spans must be recorded in ascending order"
        );
        self.spans.push((triangles, tag));
    }

    /// Tag of the triangle at `index`, if it was recorded.
    pub fn lookup(&self, index: usize) -> Option<ComponentTag> {
        let probe = self
            .spans
            .partition_point(|(range, _)| range.end <= index);
        self.spans
            .get(probe)
            .filter(|(range, _)| range.contains(&index))
            .map(|&(_, tag)| tag)
    }

    /// Iterate over all recorded spans in order.
    pub fn spans(&self) -> impl Iterator<Item = (Range<usize>, ComponentTag)> + '_ {
        self.spans.iter().map(|(range, tag)| (range.clone(), *tag))
    }

    /// Number of recorded spans.
    #[inline]
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Total triangles recorded under `tag`.
    pub fn triangle_count(&self, tag: ComponentTag) -> usize {
        self.spans
            .iter()
            .filter(|&&(_, t)| t == tag)
            .map(|(range, _)| range.len())
            .sum()
    }

    /// Append another map whose triangle indices start at `face_offset` in
    /// the combined mesh.
    pub fn extend_offset(&mut self, other: &TriangleComponentMap, face_offset: usize) {
        for (range, tag) in other.spans() {
            self.record(tag, range.start + face_offset..range.end + face_offset);
        }
    }
}

/// Caller-supplied tag-to-color mapping handed to multi-material serializers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialMap {
    pub base: VertexColor,
    pub qr_module: VertexColor,
    pub frame: VertexColor,
    pub wall: VertexColor,
    pub mount: VertexColor,
}

impl MaterialMap {
    /// Color assigned to the given tag.
    pub fn color_of(&self, tag: ComponentTag) -> VertexColor {
        match tag {
            ComponentTag::Base => self.base,
            ComponentTag::QrModule => self.qr_module,
            ComponentTag::Frame => self.frame,
            ComponentTag::Wall => self.wall,
            ComponentTag::Mount => self.mount,
        }
    }
}

impl Default for MaterialMap {
    /// White base and mount, black modules and frame, as a scannable QR
    /// print wants by default.
    fn default() -> Self {
        Self {
            base: VertexColor::WHITE,
            qr_module: VertexColor::BLACK,
            frame: VertexColor::BLACK,
            wall: VertexColor::WHITE,
            mount: VertexColor::WHITE,
        }
    }
}
