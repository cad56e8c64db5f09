// Keyframe track sampling. Times before the first key or after the last
// clamp to the end values, matching glTF animation semantics.

use nalgebra_glm as glm;

use crate::model::Interpolation;

/// Indices of the keyframe span containing `t`, plus the blend factor inside
/// it. Degenerate spans (duplicate times) blend at 0.
fn span(times: &[f32], t: f32) -> (usize, usize, f32) {
    let last = times.len() - 1;
    if t <= times[0] {
        return (0, 0, 0.0);
    }
    if t >= times[last] {
        return (last, last, 0.0);
    }
    let next = times.partition_point(|&key| key <= t);
    let prev = next - 1;
    let width = times[next] - times[prev];
    let blend = if width > 0.0 {
        (t - times[prev]) / width
    } else {
        0.0
    };
    (prev, next, blend)
}

pub fn sample_vec3(
    times: &[f32],
    values: &[glm::Vec3],
    interpolation: Interpolation,
    t: f32,
) -> Option<glm::Vec3> {
    if times.is_empty() || times.len() != values.len() {
        return None;
    }
    let (prev, next, blend) = span(times, t);
    Some(match interpolation {
        Interpolation::Step => values[prev],
        Interpolation::Linear => glm::lerp(&values[prev], &values[next], blend),
    })
}

pub fn sample_quat(
    times: &[f32],
    values: &[glm::Quat],
    interpolation: Interpolation,
    t: f32,
) -> Option<glm::Quat> {
    if times.is_empty() || times.len() != values.len() {
        return None;
    }
    let (prev, next, blend) = span(times, t);
    let a = values[prev];
    let mut b = values[next];
    Some(match interpolation {
        Interpolation::Step => a,
        Interpolation::Linear => {
            // Take the short way around; antipodal quaternions encode the
            // same rotation.
            if a.coords.dot(&b.coords) < 0.0 {
                b = -b;
            }
            glm::quat_slerp(&a, &b, blend)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 1e-5;

    fn times() -> Vec<f32> {
        vec![0.0, 1.0, 2.0]
    }

    fn positions() -> Vec<glm::Vec3> {
        vec![
            glm::vec3(0.0, 0.0, 0.0),
            glm::vec3(2.0, 0.0, 0.0),
            glm::vec3(2.0, 4.0, 0.0),
        ]
    }

    #[test]
    fn linear_interpolates_inside_a_span() {
        let v = sample_vec3(&times(), &positions(), Interpolation::Linear, 0.5).unwrap();
        assert!(glm::length(&(v - glm::vec3(1.0, 0.0, 0.0))) < TOL);
    }

    #[test]
    fn step_holds_the_previous_key() {
        let v = sample_vec3(&times(), &positions(), Interpolation::Step, 1.9).unwrap();
        assert!(glm::length(&(v - glm::vec3(2.0, 0.0, 0.0))) < TOL);
    }

    #[test]
    fn clamps_before_the_first_and_after_the_last_key() {
        let before = sample_vec3(&times(), &positions(), Interpolation::Linear, -1.0).unwrap();
        assert!(glm::length(&before) < TOL);
        let after = sample_vec3(&times(), &positions(), Interpolation::Linear, 99.0).unwrap();
        assert!(glm::length(&(after - glm::vec3(2.0, 4.0, 0.0))) < TOL);
    }

    #[test]
    fn mismatched_track_lengths_yield_nothing() {
        assert!(sample_vec3(&times(), &positions()[..2].to_vec(), Interpolation::Linear, 0.5).is_none());
        assert!(sample_vec3(&[], &[], Interpolation::Linear, 0.5).is_none());
    }

    #[test]
    fn quat_midpoint_is_half_the_rotation() {
        let track_times = [0.0, 1.0];
        let rotations = [
            glm::quat_identity(),
            glm::quat_angle_axis(std::f32::consts::FRAC_PI_2, &glm::vec3(0.0, 1.0, 0.0)),
        ];
        let q = sample_quat(&track_times, &rotations, Interpolation::Linear, 0.5).unwrap();
        let rotated = glm::quat_rotate_vec3(&glm::quat_normalize(&q), &glm::vec3(0.0, 0.0, -1.0));
        let quarter = std::f32::consts::FRAC_PI_4;
        let expected = glm::vec3(-quarter.sin(), 0.0, -quarter.cos());
        assert!(glm::length(&(rotated - expected)) < 1e-4);
    }

    #[test]
    fn quat_takes_the_short_way_around() {
        let track_times = [0.0, 1.0];
        let target = glm::quat_angle_axis(0.2, &glm::vec3(0.0, 1.0, 0.0));
        // Same rotation, opposite sign: naive slerp would swing the long way.
        let rotations = [glm::quat_identity(), -target];
        let q = sample_quat(&track_times, &rotations, Interpolation::Linear, 0.5).unwrap();
        let rotated = glm::quat_rotate_vec3(&glm::quat_normalize(&q), &glm::vec3(0.0, 0.0, -1.0));
        let tenth = 0.1_f32;
        let expected = glm::vec3(-tenth.sin(), 0.0, -tenth.cos());
        assert!(glm::length(&(rotated - expected)) < 1e-4);
    }
}
