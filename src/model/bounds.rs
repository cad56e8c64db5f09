use nalgebra_glm as glm;

/// Axis-aligned bounds of the loaded scene in world space. Computed once
/// after import; read-only afterwards.
#[derive(Debug, Clone, Copy)]
pub struct ModelBounds {
    pub center: glm::Vec3,
    pub size: glm::Vec3,
}

impl ModelBounds {
    /// Comfortable starting camera distance for a model this size.
    pub fn view_distance(&self) -> f32 {
        self.size.x.max(self.size.y).max(self.size.z) * 1.5
    }

    pub fn min(&self) -> glm::Vec3 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> glm::Vec3 {
        self.center + self.size * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_distance_scales_with_the_largest_extent() {
        let bounds = ModelBounds {
            center: glm::vec3(0.0, 0.0, 0.0),
            size: glm::vec3(7.0, 2.0, 2.0),
        };
        assert!((bounds.view_distance() - 10.5).abs() < 1e-6);
    }

    #[test]
    fn min_max_are_centered() {
        let bounds = ModelBounds {
            center: glm::vec3(1.0, 2.0, 3.0),
            size: glm::vec3(2.0, 4.0, 6.0),
        };
        assert!(glm::length(&(bounds.min() - glm::vec3(0.0, 0.0, 0.0))) < 1e-6);
        assert!(glm::length(&(bounds.max() - glm::vec3(2.0, 4.0, 6.0))) < 1e-6);
    }
}
