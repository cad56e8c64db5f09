use crate::model::{AnimationClip, ChannelValues, Model, Node};

use super::sampler;

/// Plays one clip at a time, looping, and writes sampled TRS back into the
/// node set. Node-rigid playback only; skinning is left to the rendering
/// substrate and not modelled here.
pub struct AnimationPlayer {
    clip: Option<usize>,
    time: f32,
    playing: bool,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self {
            clip: None,
            time: 0.0,
            playing: false,
        }
    }

    /// Select the first clip of a freshly loaded model, if it has any.
    pub fn init_from_model(&mut self, model: &Model) {
        self.clip = if model.animations.is_empty() {
            None
        } else {
            Some(0)
        };
        self.time = 0.0;
        self.playing = self.clip.is_some();
        if let Some(index) = self.clip {
            log::info!(
                "playing animation '{}' ({:.2}s, {} channels)",
                model.animations[index].name,
                model.animations[index].duration,
                model.animations[index].channels.len()
            );
        }
    }

    /// Advance by `dt` and apply the sampled values. Returns true when node
    /// transforms changed and the renderer needs a vertex refresh.
    pub fn update(&mut self, dt: f32, clips: &[AnimationClip], nodes: &mut [Node]) -> bool {
        if !self.playing {
            return false;
        }
        let Some(clip) = self.clip.and_then(|index| clips.get(index)) else {
            return false;
        };
        if clip.duration <= 0.0 {
            return false;
        }

        self.time = (self.time + dt) % clip.duration;

        let mut changed = false;
        for channel in &clip.channels {
            let Some(node) = nodes.get_mut(channel.node_index) else {
                continue;
            };
            match &channel.values {
                ChannelValues::Translations(values) => {
                    if let Some(v) =
                        sampler::sample_vec3(&channel.times, values, channel.interpolation, self.time)
                    {
                        node.translation = v;
                        changed = true;
                    }
                }
                ChannelValues::Rotations(values) => {
                    if let Some(q) =
                        sampler::sample_quat(&channel.times, values, channel.interpolation, self.time)
                    {
                        node.rotation = q;
                        changed = true;
                    }
                }
                ChannelValues::Scales(values) => {
                    if let Some(v) =
                        sampler::sample_vec3(&channel.times, values, channel.interpolation, self.time)
                    {
                        node.scale = v;
                        changed = true;
                    }
                }
            }
        }
        changed
    }
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Channel, Interpolation};
    use nalgebra_glm as glm;

    fn test_model() -> Model {
        let nodes = vec![Node {
            name: "animated".to_string(),
            parent: None,
            translation: glm::vec3(0.0, 0.0, 0.0),
            rotation: glm::quat_identity(),
            scale: glm::vec3(1.0, 1.0, 1.0),
        }];
        let clip = AnimationClip {
            name: "slide".to_string(),
            duration: 1.0,
            channels: vec![Channel {
                node_index: 0,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 1.0],
                values: ChannelValues::Translations(vec![
                    glm::vec3(0.0, 0.0, 0.0),
                    glm::vec3(2.0, 0.0, 0.0),
                ]),
            }],
        };
        Model {
            name: "test".to_string(),
            meshes: Vec::new(),
            nodes,
            lights: Vec::new(),
            animations: vec![clip],
            bounds: None,
        }
    }

    #[test]
    fn advances_and_writes_node_translation() {
        let mut model = test_model();
        let mut player = AnimationPlayer::new();
        player.init_from_model(&model);

        let changed = player.update(0.5, &model.animations, &mut model.nodes);
        assert!(changed);
        assert!(glm::length(&(model.nodes[0].translation - glm::vec3(1.0, 0.0, 0.0))) < 1e-5);
    }

    #[test]
    fn loops_past_the_clip_duration() {
        let mut model = test_model();
        let mut player = AnimationPlayer::new();
        player.init_from_model(&model);

        let _ = player.update(1.25, &model.animations, &mut model.nodes);
        assert!((player.time - 0.25).abs() < 1e-5);
    }

    #[test]
    fn does_nothing_without_clips() {
        let mut model = test_model();
        model.animations.clear();
        let mut player = AnimationPlayer::new();
        player.init_from_model(&model);

        assert!(!player.update(0.5, &model.animations, &mut model.nodes));
        assert!(glm::length(&model.nodes[0].translation) < 1e-6);
    }

    #[test]
    fn channel_pointing_at_a_missing_node_is_skipped() {
        let mut model = test_model();
        model.animations[0].channels[0].node_index = 99;
        let mut player = AnimationPlayer::new();
        player.init_from_model(&model);

        assert!(!player.update(0.5, &model.animations, &mut model.nodes));
    }
}
