use bevy::prelude::*;
use bevy_isle_ground::{FlatGround, HeightField, HeightFieldMeshBuilder, Terrain};

/// Ground rising along X.
struct Slope;

impl Terrain for Slope {
    fn height(&self, x: f64, _z: f64) -> f64 {
        x * 0.5
    }
}

fn positions(mesh: &Mesh) -> Vec<[f32; 3]> {
    mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        .expect("mesh must have positions")
        .as_float3()
        .expect("positions must be Float32x3")
        .to_vec()
}

fn normals(mesh: &Mesh) -> Vec<[f32; 3]> {
    mesh.attribute(Mesh::ATTRIBUTE_NORMAL)
        .expect("mesh must have normals")
        .as_float3()
        .expect("normals must be Float32x3")
        .to_vec()
}

#[test]
fn vertex_count_matches_segments() {
    let mesh = HeightFieldMeshBuilder::new().build_terrain(&FlatGround::new(0.0), 10.0, 4);
    assert_eq!(mesh.count_vertices(), 5 * 5);
}

#[test]
fn index_count_matches_quads() {
    let mesh = HeightFieldMeshBuilder::new().build_terrain(&FlatGround::new(0.0), 10.0, 6);
    assert_eq!(
        mesh.indices().expect("mesh must have indices").len(),
        6 * 6 * 6
    );
}

#[test]
fn has_all_required_attributes() {
    let mesh = HeightFieldMeshBuilder::new().build_terrain(&FlatGround::new(0.0), 4.0, 2);
    assert!(mesh.attribute(Mesh::ATTRIBUTE_POSITION).is_some(), "missing POSITION");
    assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some(), "missing NORMAL");
    assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_some(), "missing UV_0");
}

#[test]
fn mesh_is_centred_on_the_origin() {
    let mesh = HeightFieldMeshBuilder::new().build_terrain(&FlatGround::new(3.0), 8.0, 4);
    let positions = positions(&mesh);
    assert_eq!(positions[0], [-4.0, 3.0, -4.0]);
    assert_eq!(*positions.last().unwrap(), [4.0, 3.0, 4.0]);
    // Centre vertex of a 5×5 grid.
    assert_eq!(positions[12], [0.0, 3.0, 0.0]);
}

#[test]
fn flat_normals_point_up() {
    let mesh = HeightFieldMeshBuilder::new().build_terrain(&FlatGround::new(0.0), 10.0, 4);
    for n in normals(&mesh) {
        assert!(n[1] > 0.99, "flat terrain normal y should be ~1.0, got {n:?}");
    }
}

#[test]
fn slope_normals_lean_away_from_the_rise() {
    let mesh = HeightFieldMeshBuilder::new().build_terrain(&Slope, 16.0, 8);
    for n in normals(&mesh) {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-5, "normal should be unit length, got {n:?}");
        assert!(n[0] < -0.01, "slope normal should tilt toward -X, got {n:?}");
    }
}

#[test]
fn uvs_scale_with_tile_size() {
    let mesh = HeightFieldMeshBuilder::new()
        .with_uv_tile_size(2.0)
        .build_terrain(&FlatGround::new(0.0), 8.0, 4);
    let uvs = match mesh.attribute(Mesh::ATTRIBUTE_UV_0).expect("mesh must have UV_0") {
        bevy::mesh::VertexAttributeValues::Float32x2(uvs) => uvs.clone(),
        other => panic!("unexpected UV format {other:?}"),
    };
    assert_eq!(uvs.len(), 25);
    assert_eq!(uvs[0], [-2.0, -2.0]);
}

#[test]
fn island_mesh_shows_voxel_terraces() {
    let field = HeightField::new(42, 2000.0, Vec::new());
    let step = field.profile().voxel_step as f32;
    let mesh = HeightFieldMeshBuilder::new().with_segments(32).build(&field);
    assert_eq!(mesh.count_vertices(), 33 * 33);
    for p in positions(&mesh) {
        assert_eq!(p[1].rem_euclid(step), 0.0, "vertex {p:?} off the terraces");
    }
}

#[test]
fn smooth_bake_follows_the_continuous_surface() {
    let field = HeightField::new(42, 2000.0, Vec::new());
    let mesh = HeightFieldMeshBuilder::new()
        .with_segments(16)
        .with_smooth_heights(true)
        .build(&field);
    let centre = positions(&mesh)[8 * 17 + 8];
    assert_eq!(centre[1], field.smooth_height(0.0, 0.0) as f32);
}

#[test]
#[should_panic]
fn panics_on_zero_segments() {
    HeightFieldMeshBuilder::new().build_terrain(&FlatGround::new(0.0), 10.0, 0);
}
