/// Half-open integer pixel rectangle `[x0, x1) × [y0, y1)`.
///
/// Top-left origin, +Y down. A rect with `x0 >= x1` or `y0 >= y1` is empty.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelRect {
    #[inline]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Far edges saturate at `i32::MAX`.
    #[inline]
    pub const fn from_size(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self::new(x, y, x.saturating_add_unsigned(w), y.saturating_add_unsigned(h))
    }

    /// Builds a rect covering two inclusive corners given in any order.
    #[inline]
    pub fn from_corners(ax: i32, ay: i32, bx: i32, by: i32) -> Self {
        Self::new(
            ax.min(bx),
            ay.min(by),
            ax.max(bx).saturating_add(1),
            ay.max(by).saturating_add(1),
        )
    }

    #[inline]
    pub fn width(self) -> u32 {
        if self.x1 > self.x0 { self.x1.abs_diff(self.x0) } else { 0 }
    }

    #[inline]
    pub fn height(self) -> u32 {
        if self.y1 > self.y0 { self.y1.abs_diff(self.y0) } else { 0 }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    #[inline]
    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x0 && y >= self.y0 && x < self.x1 && y < self.y1
    }

    #[inline]
    pub fn intersect(self, other: PixelRect) -> Option<PixelRect> {
        let r = PixelRect::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        );
        (!r.is_empty()).then_some(r)
    }

    /// Intersects with a `width × height` canvas anchored at the origin.
    #[inline]
    pub fn clamp_to(self, width: u32, height: u32) -> Option<PixelRect> {
        self.intersect(PixelRect::from_size(0, 0, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── from_corners ──────────────────────────────────────────────────────

    #[test]
    fn corners_are_inclusive() {
        let r = PixelRect::from_corners(2, 3, 4, 5);
        assert_eq!(r, PixelRect::new(2, 3, 5, 6));
        assert_eq!((r.width(), r.height()), (3, 3));
    }

    #[test]
    fn corners_in_any_order() {
        assert_eq!(
            PixelRect::from_corners(9, 9, 1, 4),
            PixelRect::from_corners(1, 4, 9, 9)
        );
    }

    #[test]
    fn single_pixel() {
        let r = PixelRect::from_corners(7, 7, 7, 7);
        assert_eq!((r.width(), r.height()), (1, 1));
        assert!(r.contains(7, 7));
    }

    // ── clamp / intersect ─────────────────────────────────────────────────

    #[test]
    fn clamp_inside_is_identity() {
        let r = PixelRect::new(1, 1, 4, 4);
        assert_eq!(r.clamp_to(10, 10), Some(r));
    }

    #[test]
    fn clamp_cuts_overhang() {
        let r = PixelRect::from_corners(-5, -5, 20, 3);
        assert_eq!(r.clamp_to(10, 10), Some(PixelRect::new(0, 0, 10, 4)));
    }

    #[test]
    fn clamp_fully_outside_is_none() {
        assert_eq!(PixelRect::new(10, 0, 12, 2).clamp_to(10, 10), None);
        assert_eq!(PixelRect::new(-4, -4, 0, 0).clamp_to(10, 10), None);
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = PixelRect::new(0, 0, 10, 10);
        let b = PixelRect::new(10, 0, 20, 10);
        assert!(a.intersect(b).is_none());
    }

    #[test]
    fn contains_is_half_open() {
        let r = PixelRect::new(0, 0, 4, 4);
        assert!(r.contains(0, 0));
        assert!(r.contains(3, 3));
        assert!(!r.contains(4, 3));
        assert!(!r.contains(-1, 0));
    }

    // ── extremes ──────────────────────────────────────────────────────────

    #[test]
    fn size_saturates_at_the_edge() {
        let r = PixelRect::from_size(i32::MAX, 0, 1, 1);
        assert!(r.is_empty());
        assert_eq!(r.clamp_to(10, 10), None);
        assert_eq!(PixelRect::from_size(0, 0, u32::MAX, 2).x1, i32::MAX);
    }

    #[test]
    fn width_spans_the_full_range() {
        let r = PixelRect::new(i32::MIN, 0, i32::MAX, 1);
        assert_eq!(r.width(), u32::MAX);
        assert_eq!(PixelRect::new(5, 5, 1, 1).width(), 0);
    }
}
