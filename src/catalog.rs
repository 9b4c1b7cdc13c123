//! Toy archetypes and their procedural models
//!
//! Every toy in the bin is one of a fixed set of archetypes. An archetype
//! carries its display name, base color and a builder that produces the toy's
//! model as a list of round-cone primitives in toy-local space (origin at the
//! center of the collision sphere, +y up, +z facing the player).
//!
//! Adding an archetype means adding a `ToyKind` variant and one `CATALOG` row.

use glam::Vec3;

/// Toy archetype identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToyKind {
    Bear,
    Rabbit,
    Duck,
    Cat,
    Pig,
    Panda,
}

impl ToyKind {
    /// All kinds, in catalog order
    pub const ALL: [ToyKind; 6] = [
        ToyKind::Bear,
        ToyKind::Rabbit,
        ToyKind::Duck,
        ToyKind::Cat,
        ToyKind::Pig,
        ToyKind::Panda,
    ];

    /// Index into `CATALOG` (and the GPU kind id)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn archetype(self) -> &'static ToyArchetype {
        &CATALOG[self.index()]
    }

    pub fn display_name(self) -> &'static str {
        self.archetype().name
    }
}

/// Builds a toy model from the archetype's base color
pub type ModelBuilder = fn(base: [f32; 3]) -> ToyModel;

/// A catalog entry
#[derive(Debug, Clone, Copy)]
pub struct ToyArchetype {
    pub kind: ToyKind,
    pub name: &'static str,
    /// Base color as 0xRRGGBB
    pub color: u32,
    pub build: ModelBuilder,
}

impl ToyArchetype {
    /// Build this archetype's model
    pub fn model(&self) -> ToyModel {
        (self.build)(rgb(self.color))
    }
}

/// The archetype registry, indexed by `ToyKind::index`
pub static CATALOG: [ToyArchetype; 6] = [
    ToyArchetype {
        kind: ToyKind::Bear,
        name: "Bear",
        color: 0x8B4513,
        build: build_bear,
    },
    ToyArchetype {
        kind: ToyKind::Rabbit,
        name: "Bunny",
        color: 0xFFB6C1,
        build: build_rabbit,
    },
    ToyArchetype {
        kind: ToyKind::Duck,
        name: "Duckling",
        color: 0xFFFF00,
        build: build_duck,
    },
    ToyArchetype {
        kind: ToyKind::Cat,
        name: "Kitty",
        color: 0x808080,
        build: build_cat,
    },
    ToyArchetype {
        kind: ToyKind::Pig,
        name: "Piglet",
        color: 0xFFC0CB,
        build: build_pig,
    },
    ToyArchetype {
        kind: ToyKind::Panda,
        name: "Panda",
        color: 0x000000,
        build: build_panda,
    },
];

/// Convert 0xRRGGBB to linear-ish [r, g, b] in 0..1
pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

const BLACK: [f32; 3] = [0.02, 0.02, 0.02];
const WHITE: [f32; 3] = [0.95, 0.95, 0.95];

/// One primitive of a toy model: a cone between `a` and `b` with rounded
/// ends of radius `ra` and `rb`. A sphere when `a == b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPart {
    pub a: Vec3,
    pub b: Vec3,
    pub ra: f32,
    pub rb: f32,
    pub color: [f32; 3],
}

impl ModelPart {
    pub fn sphere(center: Vec3, radius: f32, color: [f32; 3]) -> Self {
        Self {
            a: center,
            b: center,
            ra: radius,
            rb: radius,
            color,
        }
    }

    /// A sphere stretched along one axis, approximated by a capsule
    pub fn stretched(center: Vec3, radius: f32, axis: Vec3, scale: f32, color: [f32; 3]) -> Self {
        let half = axis.normalize_or_zero() * radius * (scale - 1.0).max(0.0);
        Self {
            a: center - half,
            b: center + half,
            ra: radius,
            rb: radius,
            color,
        }
    }

    pub fn cone(a: Vec3, b: Vec3, ra: f32, rb: f32, color: [f32; 3]) -> Self {
        Self { a, b, ra, rb, color }
    }

    /// Farthest extent of this part from the model origin
    pub fn extent(&self) -> f32 {
        (self.a.length() + self.ra).max(self.b.length() + self.rb)
    }
}

/// A procedurally built toy model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToyModel {
    pub parts: Vec<ModelPart>,
}

impl ToyModel {
    fn with(parts: Vec<ModelPart>) -> Self {
        Self { parts }
    }

    /// Radius of a sphere around the origin enclosing every part
    pub fn bounding_radius(&self) -> f32 {
        self.parts.iter().map(ModelPart::extent).fold(0.0, f32::max)
    }
}

fn mirrored(x: f32, y: f32, z: f32) -> [Vec3; 2] {
    [Vec3::new(-x, y, z), Vec3::new(x, y, z)]
}

fn bear_limbs(color: [f32; 3]) -> impl Iterator<Item = ModelPart> {
    [
        Vec3::new(-0.4, -0.3, 0.2),
        Vec3::new(0.4, -0.3, 0.2),
        Vec3::new(-0.3, -0.5, -0.1),
        Vec3::new(0.3, -0.5, -0.1),
    ]
    .into_iter()
    .map(move |p| ModelPart::stretched(p, 0.15, Vec3::Y, 1.5, color))
}

fn build_bear(base: [f32; 3]) -> ToyModel {
    let mut parts = vec![
        ModelPart::stretched(Vec3::ZERO, 0.5, Vec3::Y, 1.2, base),
        ModelPart::sphere(Vec3::new(0.0, 0.7, 0.0), 0.35, base),
        ModelPart::sphere(Vec3::new(0.0, 0.68, 0.32), 0.03, BLACK),
    ];
    parts.extend(mirrored(0.25, 0.9, 0.1).map(|p| ModelPart::sphere(p, 0.12, base)));
    parts.extend(mirrored(0.12, 0.75, 0.3).map(|p| ModelPart::sphere(p, 0.05, BLACK)));
    parts.extend(bear_limbs(base));
    ToyModel::with(parts)
}

fn build_rabbit(base: [f32; 3]) -> ToyModel {
    let mut parts = vec![
        ModelPart::stretched(Vec3::ZERO, 0.4, Vec3::Y, 1.3, base),
        ModelPart::sphere(Vec3::new(0.0, 0.6, 0.0), 0.3, base),
        ModelPart::sphere(Vec3::new(0.0, 0.1, -0.45), 0.08, base),
    ];
    parts.extend(mirrored(0.15, 0.9, 0.0).map(|p| ModelPart::stretched(p, 0.08, Vec3::Y, 2.5, base)));
    parts.extend(mirrored(0.1, 0.65, 0.25).map(|p| ModelPart::sphere(p, 0.04, BLACK)));
    ToyModel::with(parts)
}

fn build_duck(base: [f32; 3]) -> ToyModel {
    let beak = rgb(0xFFA500);
    let mut parts = vec![
        ModelPart::stretched(Vec3::ZERO, 0.4, Vec3::Z, 1.3, base),
        ModelPart::sphere(Vec3::new(0.0, 0.5, 0.2), 0.25, base),
        ModelPart::cone(Vec3::new(0.0, 0.5, 0.33), Vec3::new(0.0, 0.5, 0.48), 0.05, 0.01, beak),
    ];
    parts.extend(mirrored(0.1, 0.55, 0.3).map(|p| ModelPart::sphere(p, 0.04, BLACK)));
    ToyModel::with(parts)
}

fn build_cat(base: [f32; 3]) -> ToyModel {
    let eye = rgb(0x00FF00);
    let mut parts = vec![
        ModelPart::stretched(Vec3::ZERO, 0.4, Vec3::Z, 1.4, base),
        ModelPart::sphere(Vec3::new(0.0, 0.55, 0.0), 0.28, base),
        // Tail sweeps up and back
        ModelPart::cone(Vec3::new(0.0, 0.1, -0.4), Vec3::new(0.0, 0.5, -0.8), 0.06, 0.03, base),
    ];
    parts.extend(mirrored(0.15, 0.72, 0.0).map(|p| {
        ModelPart::cone(p, p + Vec3::new(0.0, 0.15, 0.0), 0.08, 0.01, base)
    }));
    parts.extend(mirrored(0.1, 0.6, 0.25).map(|p| ModelPart::stretched(p, 0.05, Vec3::Y, 1.5, eye)));
    ToyModel::with(parts)
}

fn build_pig(base: [f32; 3]) -> ToyModel {
    let mut parts = vec![
        ModelPart::stretched(Vec3::ZERO, 0.45, Vec3::Z, 1.2, base),
        ModelPart::sphere(Vec3::new(0.0, 0.6, 0.0), 0.3, base),
        ModelPart::cone(Vec3::new(0.0, 0.55, 0.27), Vec3::new(0.0, 0.55, 0.37), 0.1, 0.08, base),
    ];
    parts.extend(mirrored(0.03, 0.55, 0.37).map(|p| ModelPart::sphere(p, 0.02, BLACK)));
    parts.extend(mirrored(0.12, 0.65, 0.25).map(|p| ModelPart::sphere(p, 0.04, BLACK)));
    parts.extend(mirrored(0.2, 0.8, 0.1).map(|p| ModelPart::sphere(p, 0.06, base)));
    ToyModel::with(parts)
}

/// Pandas ignore the base color: white body, black trim
fn build_panda(_base: [f32; 3]) -> ToyModel {
    let mut parts = vec![
        ModelPart::stretched(Vec3::ZERO, 0.5, Vec3::Y, 1.2, WHITE),
        ModelPart::sphere(Vec3::new(0.0, 0.7, 0.0), 0.35, WHITE),
        ModelPart::sphere(Vec3::new(0.0, 0.68, 0.32), 0.03, BLACK),
    ];
    parts.extend(mirrored(0.25, 0.9, 0.1).map(|p| ModelPart::sphere(p, 0.12, BLACK)));
    parts.extend(mirrored(0.15, 0.75, 0.27).map(|p| ModelPart::sphere(p, 0.09, BLACK)));
    parts.extend(mirrored(0.12, 0.75, 0.33).map(|p| ModelPart::sphere(p, 0.03, WHITE)));
    parts.extend(bear_limbs(BLACK));
    ToyModel::with(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_indexed_by_kind() {
        for kind in ToyKind::ALL {
            assert_eq!(kind.archetype().kind, kind);
        }
        assert_eq!(CATALOG.len(), ToyKind::ALL.len());
    }

    #[test]
    fn test_every_archetype_builds_a_model() {
        for archetype in &CATALOG {
            let model = archetype.model();
            assert!(!model.parts.is_empty(), "{} has no parts", archetype.name);
            let r = model.bounding_radius();
            assert!(r > 0.3 && r < 1.5, "{} bounding radius {}", archetype.name, r);
        }
    }

    #[test]
    fn test_rgb() {
        assert_eq!(rgb(0xFF0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgb(0x000000), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_panda_ignores_base_color() {
        let a = build_panda([1.0, 0.0, 0.0]);
        let b = build_panda([0.0, 1.0, 0.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stretched_part_spans_axis() {
        let part = ModelPart::stretched(Vec3::ZERO, 0.5, Vec3::Y, 1.2, WHITE);
        assert!((part.b.y - 0.1).abs() < 1e-6);
        assert!((part.a.y + 0.1).abs() < 1e-6);
        assert!((part.extent() - 0.6).abs() < 1e-6);
    }
}
