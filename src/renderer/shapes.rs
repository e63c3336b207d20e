//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors, with_alpha};
use crate::consts::TARGET_RADIUS;
use crate::sim::{Scene, Sprite};

/// Segments used for target circles
const TARGET_SEGMENTS: u32 = 32;
/// Outline width around targets (px)
const OUTLINE_WIDTH: f32 = 1.0;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let dir1 = Vec2::new(theta1.cos(), theta1.sin());
        let dir2 = Vec2::new(theta2.cos(), theta2.sin());
        let inner1 = center + dir1 * inner_radius;
        let outer1 = center + dir1 * outer_radius;
        let inner2 = center + dir2 * inner_radius;
        let outer2 = center + dir2 * outer_radius;

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// Generate vertices for an axis-aligned rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// One target: orange body with a thin dark outline, both faded
pub fn target(sprite: &Sprite) -> Vec<Vertex> {
    let mut vertices = circle(
        sprite.center,
        TARGET_RADIUS,
        with_alpha(colors::TARGET, sprite.alpha),
        TARGET_SEGMENTS,
    );
    vertices.extend(ring(
        sprite.center,
        TARGET_RADIUS - OUTLINE_WIDTH,
        TARGET_RADIUS,
        with_alpha(colors::TARGET_OUTLINE, sprite.alpha),
        TARGET_SEGMENTS,
    ));
    vertices
}

/// Vertices and clear color for a frame's scene
pub fn scene_vertices(scene: &Scene) -> (Vec<Vertex>, [f32; 4]) {
    match scene {
        Scene::Break { .. } => (Vec::new(), colors::BREAK_BACKGROUND),
        Scene::Play { sprites } => {
            let vertices = sprites
                .iter()
                .filter(|s| s.alpha > 0.0)
                .flat_map(target)
                .collect();
            (vertices, colors::BACKGROUND)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_vertex_count() {
        let v = circle(Vec2::ZERO, 10.0, [1.0; 4], 16);
        assert_eq!(v.len(), 48);
        // Every rim vertex sits on the radius
        for vertex in v.iter().skip(1).step_by(3) {
            let p = Vec2::from(vertex.position);
            assert!((p.length() - 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_target_alpha_follows_fade() {
        let sprite = Sprite {
            center: Vec2::new(300.0, 200.0),
            alpha: 0.5,
            label: "5".into(),
        };
        let v = target(&sprite);
        assert!(v.iter().all(|vertex| vertex.color[3] == 0.5));
    }

    #[test]
    fn test_scene_vertices() {
        let (v, clear) = scene_vertices(&Scene::Break { remaining_secs: 30 });
        assert!(v.is_empty());
        assert_eq!(clear, colors::BREAK_BACKGROUND);

        let sprites = vec![
            Sprite {
                center: Vec2::new(100.0, 100.0),
                alpha: 1.0,
                label: "1".into(),
            },
            Sprite {
                center: Vec2::new(200.0, 100.0),
                alpha: 0.0,
                label: "2".into(),
            },
        ];
        let (v, clear) = scene_vertices(&Scene::Play { sprites });
        assert_eq!(clear, colors::BACKGROUND);
        // Invisible sprite contributes nothing
        assert_eq!(v.len(), TARGET_SEGMENTS as usize * 9);
    }
}
