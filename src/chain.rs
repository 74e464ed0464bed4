use crate::render::{Rgb, Stroke, Surface};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Point {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Point {
    pub(crate) const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub(crate) fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// One rigid link. `position` is the trailing end; the leading end is
/// whatever point the segment last followed.
#[derive(Clone, Debug)]
pub(crate) struct Segment {
    pub(crate) position: Point,
    length: f32,
    pub(crate) color: Rgb,
    pub(crate) width: f32,
}

impl Segment {
    pub(crate) fn new(position: Point, length: f32, color: Rgb, width: f32) -> Self {
        Self {
            position,
            length,
            color,
            width,
        }
    }

    pub(crate) fn length(&self) -> f32 {
        self.length
    }

    /// Swing this segment so it sits exactly `length` away from `target`,
    /// keeping the direction it currently has relative to the target.
    ///
    /// A segment sitting on its target gets `atan2(0, 0) == 0` and lands
    /// `length` to the left of it.
    pub(crate) fn follow(&mut self, target: Point) {
        let dx = target.x - self.position.x;
        let dy = target.y - self.position.y;
        let angle = dy.atan2(dx);

        self.position.x = target.x - angle.cos() * self.length;
        self.position.y = target.y - angle.sin() * self.length;
    }

    pub(crate) fn draw<S: Surface>(&self, next: &Segment, surface: &mut S) {
        surface.stroke_line(
            self.position,
            next.position,
            Stroke {
                color: self.color,
                width: self.width,
            },
        );
    }
}

/// Index 0 is the tip, the last index is the root.
#[derive(Clone, Debug)]
pub(crate) struct Chain {
    segments: Vec<Segment>,
}

impl Chain {
    /// Lay `count` segments on a vertical line going up from `origin`.
    /// Lightness fades from 100% at the tip toward 50% at the root and the
    /// width grows from 1 at the tip toward `base_width + 1` at the root.
    pub(crate) fn new(count: usize, segment_length: f32, base_width: f32, hue: f32, origin: Point) -> Self {
        let count = count.max(1);
        let segments = (0..count)
            .map(|i| {
                let t = i as f32 / count as f32;
                let lightness = 1.0 - t * 0.5;
                let color = hsl_to_rgb(hue, 1.0, lightness);
                let width = t * base_width + 1.0;
                let position = Point::new(origin.x, origin.y - i as f32 * segment_length);
                Segment::new(position, segment_length, color, width)
            })
            .collect();

        Self { segments }
    }

    pub(crate) fn len(&self) -> usize {
        self.segments.len()
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    /// Longest possible tip-to-root distance.
    pub(crate) fn reach(&self) -> f32 {
        self.segments.iter().map(Segment::length).sum()
    }

    pub(crate) fn tip(&self) -> &Segment {
        &self.segments[0]
    }

    pub(crate) fn root(&self) -> &Segment {
        &self.segments[self.segments.len() - 1]
    }

    pub(crate) fn root_mut(&mut self) -> &mut Segment {
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }
}

/// `h` in degrees, `s` and `l` in 0..=1.
pub(crate) fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb {
        r: to_u8(r1),
        g: to_u8(g1),
        b: to_u8(b1),
    }
}
