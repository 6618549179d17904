//! Collision-proxy meshes for visualizing and colliding against simulation bounds.
//!
//! - [`generate_icosphere`]: recursively subdivided icosahedron projected onto a sphere
//! - [`generate_capsule`]: two spheres joined by their tangent cone
//! - [`fast_sphere`] / [`fast_cylinder`]: pre-baked unit meshes, scaled on demand

use std::collections::HashMap;
use std::sync::OnceLock;

use glam::{Mat4, Quat, Vec2, Vec3};
use weft_types::constants::{CONE_RADIUS_EPSILON, EPSILON};

use crate::topology::ClothTopology;

/// Generates a sphere by subdividing an icosahedron `subdivisions` times.
///
/// Vertex count is `10 * 4^subdivisions + 2`, triangle count `20 * 4^subdivisions`.
pub fn generate_icosphere(subdivisions: u32, center: Vec3, radius: f32) -> ClothTopology {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let mut dirs: Vec<Vec3> = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ]
    .iter()
    .map(|v| Vec3::from_array(*v).normalize())
    .collect();

    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(&mut dirs, &mut midpoints, a, b);
            let bc = midpoint(&mut dirs, &mut midpoints, b, c);
            let ca = midpoint(&mut dirs, &mut midpoints, c, a);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    let mut topo = ClothTopology::with_capacity(dirs.len(), faces.len());
    for d in &dirs {
        let u = 0.5 + d.z.atan2(d.x) / std::f32::consts::TAU;
        let v = 0.5 - d.y.asin() / std::f32::consts::PI;
        topo.push_point(center + *d * radius, *d, Vec2::new(u, v), 1.0);
    }
    topo.triangles = faces;
    topo
}

/// Returns the index of the projected midpoint of edge `(a, b)`, creating it once.
fn midpoint(
    dirs: &mut Vec<Vec3>,
    cache: &mut HashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = if a < b { (a, b) } else { (b, a) };
    *cache.entry(key).or_insert_with(|| {
        let m = (dirs[a as usize] + dirs[b as usize]).normalize();
        dirs.push(m);
        (dirs.len() - 1) as u32
    })
}

/// One ring of a surface of revolution.
#[derive(Debug, Clone, Copy)]
struct ProfileRing {
    /// Ring centre on the axis.
    center: Vec3,
    /// Ring radius; zero collapses the ring to a pole vertex.
    radius: f32,
    /// Normal component along the axis.
    normal_axial: f32,
    /// Normal component along the radial direction.
    normal_radial: f32,
}

/// Sweeps `profile` around `axis`, connecting consecutive rings.
fn lathe(profile: &[ProfileRing], axis: Vec3, segments: usize) -> ClothTopology {
    let (u, v) = axis.any_orthonormal_pair();
    let mut topo = ClothTopology::with_capacity(profile.len() * segments, profile.len() * segments * 2);

    // Start index and vertex count per ring (poles have a single vertex).
    let mut rings: Vec<(u32, usize)> = Vec::with_capacity(profile.len());
    for (k, ring) in profile.iter().enumerate() {
        let start = topo.point_count() as u32;
        let tv = k as f32 / (profile.len() - 1).max(1) as f32;
        if ring.radius <= EPSILON {
            let normal = (axis * ring.normal_axial).try_normalize().unwrap_or(axis);
            topo.push_point(ring.center, normal, Vec2::new(0.5, tv), 1.0);
            rings.push((start, 1));
            continue;
        }
        for s in 0..segments {
            let angle = std::f32::consts::TAU * s as f32 / segments as f32;
            let (sin, cos) = angle.sin_cos();
            let radial = u * cos + v * sin;
            let normal = (axis * ring.normal_axial + radial * ring.normal_radial)
                .try_normalize()
                .unwrap_or(radial);
            topo.push_point(
                ring.center + radial * ring.radius,
                normal,
                Vec2::new(s as f32 / segments as f32, tv),
                1.0,
            );
        }
        rings.push((start, segments));
    }

    for (k, pair) in rings.windows(2).enumerate() {
        let (a_start, a_len) = pair[0];
        let (b_start, b_len) = pair[1];
        // Coincident rings only split normals (hard edges); no band between them.
        let (pa, pb) = (&profile[k], &profile[k + 1]);
        if pa.center.distance(pb.center) <= EPSILON && (pa.radius - pb.radius).abs() <= EPSILON {
            continue;
        }
        match (a_len, b_len) {
            (1, 1) => {}
            (1, _) => {
                for s in 0..segments as u32 {
                    let s1 = (s + 1) % segments as u32;
                    topo.triangles.push([a_start, b_start + s1, b_start + s]);
                }
            }
            (_, 1) => {
                for s in 0..segments as u32 {
                    let s1 = (s + 1) % segments as u32;
                    topo.triangles.push([a_start + s, a_start + s1, b_start]);
                }
            }
            _ => {
                for s in 0..segments as u32 {
                    let s1 = (s + 1) % segments as u32;
                    let i0 = a_start + s;
                    let i1 = a_start + s1;
                    let i2 = b_start + s;
                    let i3 = b_start + s1;
                    topo.triangles.push([i0, i1, i3]);
                    topo.triangles.push([i0, i3, i2]);
                }
            }
        }
    }

    topo
}

/// Generates the hull of two spheres joined by their common tangent cone.
///
/// Each sphere contributes `rings` latitude steps for its cap and
/// `segments` is the number of divisions around the axis. When the radii
/// differ by less than [`CONE_RADIUS_EPSILON`] the cone correction is skipped
/// and the band is a straight cylinder. When one sphere contains the other,
/// only the larger sphere is emitted.
pub fn generate_capsule(
    c0: Vec3,
    r0: f32,
    c1: Vec3,
    r1: f32,
    rings: usize,
    segments: usize,
) -> ClothTopology {
    assert!(rings >= 1 && segments >= 3, "capsule needs rings >= 1 and segments >= 3");

    let delta = c1 - c0;
    let d = delta.length();
    if d <= (r0 - r1).abs() + EPSILON {
        let (center, radius) = if r0 >= r1 { (c0, r0) } else { (c1, r1) };
        return generate_uv_sphere(center, radius, rings * 2, segments);
    }
    let axis = delta / d;

    // Latitude of the tangent circle, measured from each sphere's equator toward c1.
    let sin_theta = if (r0 - r1).abs() < CONE_RADIUS_EPSILON {
        0.0
    } else {
        (r0 - r1) / d
    };
    let theta = sin_theta.asin();
    let half_pi = std::f32::consts::FRAC_PI_2;

    let mut profile = Vec::with_capacity(2 * rings + 2);
    for k in 0..=rings {
        let phi = -half_pi + (theta + half_pi) * k as f32 / rings as f32;
        profile.push(sphere_ring(c0, r0, axis, phi));
    }
    for k in 0..=rings {
        let phi = theta + (half_pi - theta) * k as f32 / rings as f32;
        profile.push(sphere_ring(c1, r1, axis, phi));
    }

    lathe(&profile, axis, segments)
}

fn sphere_ring(center: Vec3, radius: f32, axis: Vec3, phi: f32) -> ProfileRing {
    let (sin, cos) = phi.sin_cos();
    ProfileRing {
        center: center + axis * (radius * sin),
        radius: radius * cos.max(0.0),
        normal_axial: sin,
        normal_radial: cos,
    }
}

/// Generates a latitude/longitude sphere around +Y.
pub fn generate_uv_sphere(center: Vec3, radius: f32, stacks: usize, segments: usize) -> ClothTopology {
    assert!(stacks >= 2 && segments >= 3, "sphere needs stacks >= 2 and segments >= 3");
    let half_pi = std::f32::consts::FRAC_PI_2;
    let profile: Vec<ProfileRing> = (0..=stacks)
        .map(|k| {
            let phi = -half_pi + std::f32::consts::PI * k as f32 / stacks as f32;
            sphere_ring(center, radius, Vec3::Y, phi)
        })
        .collect();
    lathe(&profile, Vec3::Y, segments)
}

/// Unit sphere at the origin, built once.
fn unit_sphere() -> &'static ClothTopology {
    static MESH: OnceLock<ClothTopology> = OnceLock::new();
    MESH.get_or_init(|| generate_icosphere(1, Vec3::ZERO, 1.0))
}

/// Unit capped cylinder from y = 0 to y = 1 with radius 1, built once.
fn unit_cylinder() -> &'static ClothTopology {
    static MESH: OnceLock<ClothTopology> = OnceLock::new();
    MESH.get_or_init(|| {
        let ring = |y: f32, radius: f32, normal_axial: f32, normal_radial: f32| ProfileRing {
            center: Vec3::new(0.0, y, 0.0),
            radius,
            normal_axial,
            normal_radial,
        };
        let profile = [
            ring(0.0, 0.0, -1.0, 0.0),
            ring(0.0, 1.0, -1.0, 0.0),
            ring(0.0, 1.0, 0.0, 1.0),
            ring(1.0, 1.0, 0.0, 1.0),
            ring(1.0, 1.0, 1.0, 0.0),
            ring(1.0, 0.0, 1.0, 0.0),
        ];
        lathe(&profile, Vec3::Y, 12)
    })
}

/// Pre-baked low-resolution sphere scaled to `radius` and moved to `center`.
pub fn fast_sphere(center: Vec3, radius: f32) -> ClothTopology {
    let mut topo = unit_sphere().clone();
    topo.transform(&Mat4::from_scale_rotation_translation(
        Vec3::splat(radius),
        Quat::IDENTITY,
        center,
    ));
    topo
}

/// Pre-baked low-resolution capped cylinder spanning `base` to `top`.
///
/// A zero-length span collapses to a flat disc at `base`.
pub fn fast_cylinder(base: Vec3, top: Vec3, radius: f32) -> ClothTopology {
    let span = top - base;
    let length = span.length();
    let rotation = match span.try_normalize() {
        Some(dir) => Quat::from_rotation_arc(Vec3::Y, dir),
        None => Quat::IDENTITY,
    };
    let mut topo = unit_cylinder().clone();
    topo.transform(&Mat4::from_scale_rotation_translation(
        Vec3::new(radius, length.max(EPSILON), radius),
        rotation,
        base,
    ));
    topo
}
