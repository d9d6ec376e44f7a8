use super::*;
use strata_blocks::config::{BlockDef, BlocksConfig};
use strata_world::{ChunkCoord, WorldDims};

fn make_test_registry() -> BlockRegistry {
    let blocks = vec![
        BlockDef {
            name: "stone".into(),
            id: Some(1),
            solid: Some(true),
            ..Default::default()
        },
        BlockDef {
            name: "glass".into(),
            id: Some(2),
            solid: Some(true),
            transparency: Some(1.0),
            render_neighbor_faces: Some(true),
            ..Default::default()
        },
        BlockDef {
            name: "leaves".into(),
            id: Some(3),
            solid: Some(true),
            transparency: Some(0.5),
            render_neighbor_faces: Some(true),
            ..Default::default()
        },
    ];
    BlockRegistry::from_config(BlocksConfig { blocks }).expect("registry")
}

fn empty_chunk(w: usize, h: usize) -> ChunkBuf {
    ChunkBuf::new_empty(ChunkCoord::new(0, 0), &WorldDims::new(w, h, 1))
}

#[test]
fn open_sky_is_fully_lit() {
    let reg = make_test_registry();
    let mut buf = empty_chunk(4, 8);
    compute_light(&mut buf, &reg, &LightingParams::default());
    assert!(buf.cells.iter().all(|c| c.light == 1.0));
}

#[test]
fn opaque_roof_darkens_column_below() {
    let reg = make_test_registry();
    let mut buf = empty_chunk(1, 6);
    buf.set_local_id(0, 4, 0, 1);
    compute_light(&mut buf, &reg, &LightingParams::default());
    assert_eq!(buf.light_local(0, 5, 0), 1.0);
    // Opaque cell gets the clamped ray, and 1-wide chunks give no side bleed.
    assert!((buf.light_local(0, 4, 0) - 0.92).abs() < 1e-6);
    assert!(buf.light_local(0, 3, 0) < buf.light_local(0, 4, 0));
}

#[test]
fn translucent_blocks_attenuate() {
    let reg = make_test_registry();
    let mut buf = empty_chunk(1, 4);
    buf.set_local_id(0, 3, 0, 3);
    buf.set_local_id(0, 1, 0, 2);
    let params = LightingParams {
        falloff: 0.08,
        ..Default::default()
    };
    compute_light(&mut buf, &reg, &params);
    assert_eq!(buf.light_local(0, 3, 0), 0.5);
    assert_eq!(buf.light_local(0, 2, 0), 0.5);
    assert_eq!(buf.light_local(0, 1, 0), 0.5);
    assert_eq!(buf.light_local(0, 0, 0), 0.5);
}

#[test]
fn light_bleeds_under_an_overhang() {
    let reg = make_test_registry();
    let mut buf = empty_chunk(4, 4);
    // Roof over x in 0..3 at y = 3; column x = 3 stays open.
    for x in 0..3 {
        for z in 0..4 {
            buf.set_local_id(x, 3, z, 1);
        }
    }
    let params = LightingParams::default();
    compute_light(&mut buf, &reg, &params);
    let open = buf.light_local(3, 1, 1);
    let one = buf.light_local(2, 1, 1);
    let two = buf.light_local(1, 1, 1);
    let three = buf.light_local(0, 1, 1);
    assert_eq!(open, 1.0);
    assert!((one - (1.0 - params.falloff)).abs() < 1e-6);
    assert!((two - (1.0 - 2.0 * params.falloff)).abs() < 1e-6);
    assert!((three - (1.0 - 3.0 * params.falloff)).abs() < 1e-6);
}

#[test]
fn recompute_is_idempotent() {
    let reg = make_test_registry();
    let mut buf = empty_chunk(4, 8);
    buf.set_local_id(1, 5, 1, 1);
    buf.set_local_id(2, 6, 2, 3);
    let params = LightingParams::default();
    compute_light(&mut buf, &reg, &params);
    let first = buf.cells.clone();
    compute_light(&mut buf, &reg, &params);
    assert_eq!(first, buf.cells);
}

#[test]
fn shade_maps_into_configured_range() {
    let p = LightingParams::default();
    assert_eq!(p.shade(0.0), MIN_LIGHT_LEVEL);
    assert!((p.shade(1.0) - MAX_LIGHT_LEVEL).abs() < 1e-6);
    assert_eq!(p.shade(-3.0), MIN_LIGHT_LEVEL);
}
