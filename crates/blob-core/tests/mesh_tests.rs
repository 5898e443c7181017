use blob_core::BlobMesh;
use glam::Vec3;

#[test]
fn uv_sphere_vertex_and_index_counts() {
    let mesh = BlobMesh::uv_sphere(1.0, 8, 6);
    // (w + 1) columns per row including the duplicated seam, (h + 1) rows.
    assert_eq!(mesh.vertex_count(), 9 * 7);
    // Two triangles per cell except the single-triangle pole rows.
    assert_eq!(mesh.index_count(), (2 * 8 * 6 - 2 * 8) * 3);
    assert_eq!(mesh.index_count() % 3, 0);
}

#[test]
fn uv_sphere_vertices_sit_on_the_radius() {
    let radius = 2.5;
    let mesh = BlobMesh::uv_sphere(radius, 16, 12);
    for p in mesh.base_positions() {
        assert!((p.length() - radius).abs() < 1e-4, "vertex off sphere: {p:?}");
    }
}

#[test]
fn uv_sphere_indices_are_in_range() {
    let mesh = BlobMesh::uv_sphere(1.0, 12, 9);
    let n = mesh.vertex_count() as u32;
    for &i in mesh.indices() {
        assert!(i < n, "index {i} out of range {n}");
    }
}

#[test]
fn sphere_normals_point_outward() {
    let mut mesh = BlobMesh::uv_sphere(1.0, 20, 14);
    mesh.recompute_normals();
    for v in mesh.vertices() {
        let p = Vec3::from(v.position);
        let n = Vec3::from(v.normal);
        assert!((n.length() - 1.0).abs() < 1e-4);
        assert!(
            n.dot(p.normalize()) > 0.5,
            "inward-facing normal at {p:?}: {n:?}"
        );
    }
}

#[test]
fn recomputed_normals_match_analytic_sphere_normals() {
    let mut mesh = BlobMesh::uv_sphere(1.0, 48, 32);
    mesh.recompute_normals();
    for v in mesh.vertices() {
        let p = Vec3::from(v.position);
        let n = Vec3::from(v.normal);
        // Away from the poles the accumulated normal should be very close to
        // the exact radial direction.
        if p.y.abs() < 0.9 {
            assert!(
                n.dot(p.normalize()) > 0.99,
                "normal deviates at {p:?}: {n:?}"
            );
        }
    }
}
