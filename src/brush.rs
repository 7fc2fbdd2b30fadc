/// Brush falloff model consumed by [`crate::LayerSet::paint`].
///
/// Only the radius and a distance-to-weight query are needed; shapes and UI state live with the
/// caller.
pub trait Brush {
    /// Influence radius in world units.
    fn radius(&self) -> f32;

    /// Weight in `[0, 1]` at `distance` from the brush centre.
    fn value(&self, distance: f32) -> f32;
}

/// Round brush with a fully weighted core and a linear falloff to its edge.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FalloffBrush {
    /// Influence radius in world units.
    pub radius: f32,
    /// Fraction of the radius with full weight, in `[0, 1]`.
    pub hardness: f32,
}

impl FalloffBrush {
    /// Create a brush, clamping `hardness` into `[0, 1]` and `radius` to non-negative.
    pub fn new(radius: f32, hardness: f32) -> Self {
        Self {
            radius: radius.max(0.0),
            hardness: hardness.clamp(0.0, 1.0),
        }
    }

    /// Brush with full weight everywhere inside `radius`.
    pub fn hard(radius: f32) -> Self {
        Self::new(radius, 1.0)
    }
}

impl Brush for FalloffBrush {
    fn radius(&self) -> f32 {
        self.radius
    }

    fn value(&self, distance: f32) -> f32 {
        if distance > self.radius {
            return 0.0;
        }
        let inner = self.radius * self.hardness;
        if distance <= inner {
            return 1.0;
        }
        (1.0 - (distance - inner) / (self.radius - inner)).clamp(0.0, 1.0)
    }
}

impl<B: Brush + ?Sized> Brush for &B {
    fn radius(&self) -> f32 {
        (**self).radius()
    }

    fn value(&self, distance: f32) -> f32 {
        (**self).value(distance)
    }
}

#[cfg(test)]
#[path = "../tests/unit/brush.rs"]
mod tests;
