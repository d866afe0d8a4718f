//! Keyword-driven placeholder scene layout.
//!
//! Turns a free-text prompt into a coarse object list the frontend can
//! drop into its 3D viewport while the real generation job runs out of
//! band. Each known keyword contributes one object at a random spot on
//! the stage floor.

use rand::Rng;
use serde::Serialize;

/// Keyword → placeable object name table. Scanned in order, so the
/// object list for a given prompt is stable apart from positions.
const OBJECT_LIBRARY: &[(&str, &str)] = &[
    ("plant", "pottedplant"),
    ("tree", "pottedplant"),
    ("vase", "vase"),
    ("chair", "chair"),
    ("table", "table"),
    ("lamp", "lamp"),
    ("sofa", "sofa"),
    ("carpet", "carpet"),
    ("stage", "stage"),
    ("wedding", "wedding"),
];

/// A single object placement in the generated layout.
#[derive(Debug, Clone, Serialize)]
pub struct ScenePlacement {
    pub name: String,
    /// `[x, y, z]`; y is always the floor.
    pub position: [f32; 3],
    /// Euler angles, currently always zero.
    pub rotation: [f32; 3],
}

/// Derive a placeholder object layout from a prompt.
///
/// Matching is case-insensitive substring search over the keyword table;
/// matched objects land at a uniform random x/z in -1..1 with y = 0.
/// Prompts matching nothing yield a single cube at the origin so the
/// client always has something to render.
pub fn objects_from_prompt(prompt: &str) -> Vec<ScenePlacement> {
    let prompt = prompt.to_lowercase();
    let mut rng = rand::rng();

    let mut objects: Vec<ScenePlacement> = OBJECT_LIBRARY
        .iter()
        .filter(|(keyword, _)| prompt.contains(keyword))
        .map(|(_, name)| ScenePlacement {
            name: (*name).to_string(),
            position: [
                rng.random_range(-1.0..=1.0),
                0.0,
                rng.random_range(-1.0..=1.0),
            ],
            rotation: [0.0, 0.0, 0.0],
        })
        .collect();

    if objects.is_empty() {
        objects.push(ScenePlacement {
            name: "cube".to_string(),
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
        });
    }

    objects
}
