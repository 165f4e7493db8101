//! Viewport description supplied by the host window

/// Size of the target the labels are drawn into, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether nothing can be drawn into this viewport
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width / height, or 1.0 for an empty viewport
    pub fn aspect(&self) -> f64 {
        if self.is_empty() {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        assert!((Viewport::new(800, 600).aspect() - 4.0 / 3.0).abs() < 1e-12);
        assert!((Viewport::new(0, 600).aspect() - 1.0).abs() < f64::EPSILON);
    }
}
